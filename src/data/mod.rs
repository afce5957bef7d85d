// ============================================================
// Layer 4 - Data Pipeline
// ============================================================
// This layer handles everything from raw stroke files all the
// way to tensor batches and back to drawable strokes.
//
// The pipeline flows in this order:
//
//   stroke .xml files
//       │
//       ▼
//   IamXmlSource      → reads files, yields RawSamples
//       │
//       ▼
//   CorpusSplitter    → train/test by manifest, runs the extractor
//       │
//       ▼
//   StrokeExtractor   → absolute points → clipped deltas + flag
//       │
//       ▼
//   (ArtifactStore)   → flat point matrix + length index on disk
//       │
//       ▼
//   SequenceIndexer   → lengths → offsets, slices samples back out
//       │
//       ▼
//   CutPadNormalizer  → [cut_len, N, 3] tensor + normalisation stats
//       │
//       ├──▶ StrokeDataset / StrokeBatcher → Burn batches
//       │
//       ▼
//   InverseRenderer   → deltas → absolute polylines on a Canvas
//
// Reference: Burn Book §4 (Datasets and Dataloaders)
//            Rust Book §13 (Iterators and Closures)

/// Reads IAM-OnDB stroke XML with roxmltree
pub mod loader;

/// Delta-encodes and clips one sample
pub mod extractor;

/// Manifest-driven train/test split and per-split extraction
pub mod splitter;

/// Lengths → offsets, per-sample slicing
pub mod indexer;

/// Truncates, normalises and pads into a time-major tensor
pub mod cutter;

/// Delta-encoded sample → drawable strokes
pub mod renderer;

/// Implements Burn's Dataset trait over a cut tensor
pub mod dataset;

/// Implements Burn's Batcher trait to create [T, B, 3] batches
pub mod batcher;
