// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Cross-cutting concerns used by several layers:
//
//   checkpoint.rs      — Saving and loading a complete Summarizer
//                        Metadata JSON plus one full-precision
//                        record per module, written through a
//                        staging directory so a checkpoint is
//                        either complete or absent.
//
//   tokenizer_store.rs — Word-level tokenizer fitting and
//                        persistence. Index 0 is padding, index 1
//                        is the OOV token.
//
//   files.rs           — JSON read/write helpers shared by every
//                        checkpoint component
//
//   metrics.rs         — Training metrics logging
//                        Epoch-level losses appended to a CSV file.
//
// Reference: Rust Book §7 (Modules)
//            Rust Book §9 (Error Handling)
//            Burn Book §5 (Checkpointing)

/// Summarizer checkpoint writer and loader
pub mod checkpoint;

/// JSON component helpers
pub mod files;

/// Tokenizer fitting, saving, and loading
pub mod tokenizer_store;

/// Training metrics CSV logger
pub mod metrics;
