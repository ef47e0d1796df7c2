// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The application layer programs against these traits so the
// concrete loaders and persisted components can be swapped:
//   - TsvPairLoader implements PairSource
//   - Preprocessor and Vectorizer implement Persistable
//
// Reference: Rust Book §10 (Traits: Defining Shared Behaviour)

use std::path::Path;

use crate::domain::summary_pair::SummaryPair;
use crate::error::Result;

// ─── PairSource ───────────────────────────────────────────────────────────────
/// Any component that can provide (text, summary) training pairs.
pub trait PairSource {
    fn load_all(&self) -> Result<Vec<SummaryPair>>;
}

// ─── Persistable ──────────────────────────────────────────────────────────────
/// A checkpoint component whose state is written into, and read back
/// from, a checkpoint directory.
///
/// Implementations:
///   - Preprocessor → preprocessor.json
///   - Vectorizer   → vectorizer.json + one tokenizer file per side
pub trait Persistable: Sized {
    /// Write this component's files into `dir` (which must exist)
    fn save(&self, dir: &Path) -> Result<()>;

    /// Rebuild the component from the files in `dir`.
    /// Missing or malformed files are reported as format errors.
    fn load(dir: &Path) -> Result<Self>;
}
