// ============================================================
// Layer 4 - Stroke File Loader
// ============================================================
// Reads IAM-OnDB style stroke files using roxmltree.
//
// The file structure looks like:
//   WhiteboardCaptureSession
//     └── StrokeSet
//           └── Stroke            (one per pen-down motion)
//                 └── Point x=".." y=".." time=".."
//
// Only the x and y attributes are used. Everything outside the
// StrokeSet (capture metadata, transcription) is ignored.
//
// Reference: roxmltree crate documentation
//            Rust Book §9 (Error Handling)

use std::{fs, path::Path};

use crate::domain::error::{PipelineError, PipelineResult};
use crate::domain::sample::{RawPoint, RawSample, Stroke};
use crate::domain::traits::StrokeSource;

/// Reads `*.xml` stroke files. Implements the StrokeSource trait
/// so the corpus splitter never sees XML.
#[derive(Debug, Clone, Default)]
pub struct IamXmlSource;

impl IamXmlSource {
    pub fn new() -> Self {
        Self
    }
}

impl StrokeSource for IamXmlSource {
    fn read_sample(&self, path: &Path) -> PipelineResult<RawSample> {
        let text = fs::read_to_string(path).map_err(|source| PipelineError::SourceIo {
            path: path.to_path_buf(),
            source,
        })?;
        parse_stroke_xml(&path.display().to_string(), &text)
    }

    fn accepts(&self, path: &Path) -> bool {
        path.extension().and_then(|e| e.to_str()) == Some("xml")
    }
}

/// Parse the StrokeSet of one XML document into a RawSample.
pub fn parse_stroke_xml(source: &str, text: &str) -> PipelineResult<RawSample> {
    let doc = roxmltree::Document::parse(text)
        .map_err(|e| PipelineError::malformed(source, format!("invalid XML: {e}")))?;

    let stroke_set = doc
        .descendants()
        .find(|n| n.has_tag_name("StrokeSet"))
        .ok_or_else(|| PipelineError::malformed(source, "no StrokeSet element"))?;

    let mut strokes = Vec::new();
    for stroke_node in stroke_set.children().filter(|n| n.is_element()) {
        let mut points = Vec::new();
        for point_node in stroke_node.children().filter(|n| n.is_element()) {
            let x = coordinate(source, &point_node, "x")?;
            let y = coordinate(source, &point_node, "y")?;
            points.push(RawPoint::new(x, y));
        }
        strokes.push(Stroke::new(points));
    }

    Ok(RawSample::new(source, strokes))
}

/// Read one integer coordinate attribute from a Point element.
fn coordinate(source: &str, node: &roxmltree::Node<'_, '_>, name: &str) -> PipelineResult<i32> {
    let raw = node.attribute(name).ok_or_else(|| {
        PipelineError::malformed(source, format!("point without '{name}' attribute"))
    })?;
    raw.trim().parse::<i32>().map_err(|_| {
        PipelineError::malformed(source, format!("'{name}' is not an integer: '{raw}'"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_XML: &str = r#"<?xml version="1.0"?>
<WhiteboardCaptureSession>
  <WhiteboardDescription>
    <SensorLocation corner="top_left"/>
  </WhiteboardDescription>
  <StrokeSet>
    <Stroke colour="black" start_time="769.05" end_time="769.17">
      <Point x="1073" y="1058" time="769.05"/>
      <Point x="1072" y="1085" time="769.07"/>
    </Stroke>
    <Stroke colour="black" start_time="769.39" end_time="769.46">
      <Point x="1105" y="1033" time="769.39"/>
    </Stroke>
  </StrokeSet>
</WhiteboardCaptureSession>"#;

    #[test]
    fn test_parses_strokes_in_order() {
        let sample = parse_stroke_xml("a.xml", SAMPLE_XML).unwrap();
        assert_eq!(sample.strokes.len(), 2);
        assert_eq!(sample.strokes[0].points[1], RawPoint::new(1072, 1085));
        assert_eq!(sample.strokes[1].points, vec![RawPoint::new(1105, 1033)]);
        assert_eq!(sample.point_count(), 3);
    }

    #[test]
    fn test_missing_stroke_set() {
        let err = parse_stroke_xml("b.xml", "<Session><Other/></Session>").unwrap_err();
        assert!(matches!(err, PipelineError::MalformedSample { .. }));
    }

    #[test]
    fn test_non_integer_coordinate() {
        let xml = r#"<StrokeSet><Stroke><Point x="1.5" y="2"/></Stroke></StrokeSet>"#;
        assert!(parse_stroke_xml("c.xml", xml).is_err());
    }

    #[test]
    fn test_empty_stroke_set_parses_to_no_strokes() {
        // Rejected later by the extractor, not by the parser
        let sample = parse_stroke_xml("d.xml", "<StrokeSet></StrokeSet>").unwrap();
        assert!(sample.strokes.is_empty());
    }

    #[test]
    fn test_accepts_only_xml() {
        let source = IamXmlSource::new();
        assert!(source.accepts(Path::new("lineStrokes/a01/a01-000/a01-000u-01.xml")));
        assert!(!source.accepts(Path::new("lineStrokes/readme.txt")));
    }

    #[test]
    fn test_missing_file_is_source_io() {
        let err = IamXmlSource::new()
            .read_sample(Path::new("/definitely/not/here.xml"))
            .unwrap_err();
        assert!(matches!(err, PipelineError::SourceIo { .. }));
    }
}
