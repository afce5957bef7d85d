// ============================================================
// Layer 6 - Plotly Canvas
// ============================================================
// A Canvas that collects one Scatter trace per stroke and writes
// the finished figure to a standalone HTML file.
//
// The y axis is anchored to x so handwriting keeps its aspect
// ratio; the y flip already happened in the renderer.
//
// Reference: plotly crate documentation (Plot, Scatter, Layout)

use anyhow::{Context, Result};
use plotly::{
    common::Mode,
    layout::{Axis, Layout},
    Plot, Scatter,
};
use std::{fs, path::{Path, PathBuf}};

use crate::domain::traits::Canvas;

pub struct PlotlyCanvas {
    plot:    Plot,
    output:  PathBuf,
    title:   String,
    strokes: usize,
}

impl PlotlyCanvas {
    pub fn new(output: impl Into<PathBuf>, title: impl Into<String>) -> Self {
        Self {
            plot:    Plot::new(),
            output:  output.into(),
            title:   title.into(),
            strokes: 0,
        }
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    pub fn stroke_count(&self) -> usize {
        self.strokes
    }
}

impl Canvas for PlotlyCanvas {
    fn draw_polyline(&mut self, xs: &[f64], ys: &[f64]) {
        let trace = Scatter::new(xs.to_vec(), ys.to_vec())
            .mode(Mode::Lines)
            .show_legend(false);
        self.plot.add_trace(trace);
        self.strokes += 1;
    }

    fn show(&mut self) -> Result<()> {
        let layout = Layout::new()
            .title(self.title.as_str())
            .x_axis(Axis::new().show_grid(false))
            .y_axis(Axis::new().show_grid(false).scale_anchor("x".to_string()));
        self.plot.set_layout(layout);

        if let Some(parent) = self.output.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Cannot create '{}'", parent.display()))?;
        }
        self.plot.write_html(&self.output);
        tracing::info!("Wrote {} strokes to '{}'", self.strokes, self.output.display());
        Ok(())
    }
}
