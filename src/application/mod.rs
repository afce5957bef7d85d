// ============================================================
// Layer 2 - Application / Use Cases
// ============================================================
// This layer orchestrates the other layers to accomplish one
// command each: build a corpus, cut it into a tensor, plot a
// sample, or check a mask value.
//
// Rules for this layer:
//   - No array math here (that's Layer 4)
//   - No printing here (that's Layer 1)
//   - No direct file formats (that's Layer 6)
//   - Only workflow coordination
//
// Reference: Clean Architecture pattern
//            Rust Book §7 (Module System)

// Settings shared by every command
pub mod config;

// Raw stroke files → flat train/test artifacts
pub mod build_corpus_use_case;

// Flat artifacts → [cut_len, N, 3] tensor + stats
pub mod cut_use_case;

// One sample → HTML plot
pub mod plot_use_case;

// Mask sentinel collision count
pub mod check_mask_use_case;
