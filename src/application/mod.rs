// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// Orchestrates the other layers to accomplish one goal
// (training a summarizer or summarizing a text).
//
// Rules for this layer:
//   - No ML math or model code here
//   - No printing here (that's Layer 1)
//   - Only workflow coordination
//
// Reference: Clean Architecture pattern
//            Rust Book §7 (Module System)

use std::path::{Path, PathBuf};

// The training workflow
pub mod train_use_case;

// The inference workflow
pub mod predict_use_case;

/// Checkpoint location inside a run directory. The run directory
/// itself also holds metrics.csv, which must survive checkpoint
/// replacement.
pub const MODEL_SUBDIR: &str = "model";

pub fn model_dir(checkpoint_dir: impl AsRef<Path>) -> PathBuf {
    checkpoint_dir.as_ref().join(MODEL_SUBDIR)
}
