// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything from raw text pairs to tensor batches:
//
//   pairs.tsv
//       │
//       ▼
//   TsvPairLoader     → reads (text, summary) pairs
//       │
//       ▼
//   Preprocessor      → normalises text, adds <start>/<end>
//       │
//       ▼
//   Vectorizer        → maps tokens to ids (encoder / decoder vocab)
//       │
//       ▼
//   SummaryDataset    → implements Burn's Dataset trait
//       │
//       ▼
//   SummaryBatcher    → pads samples into tensor batches
//
// Reference: Burn Book §4 (Datasets and Dataloaders)

/// Loads (text, summary) pairs from a TSV file
pub mod loader;

/// Normalises text and defines the special tokens
pub mod preprocessor;

/// Text ↔ index mapping for encoder and decoder
pub mod vectorizer;

/// Implements Burn's Dataset trait for vectorized pairs
pub mod dataset;

/// Implements Burn's Batcher trait with per-batch padding
pub mod batcher;

/// Seeded train/validation split
pub mod splitter;
