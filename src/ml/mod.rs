// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// Everything that touches tensors lives here.
//
//   model.rs      — Encoder / Decoder / Seq2Seq modules
//                   • Embedding → LSTM on both sides
//                   • Linear projection to decoder vocabulary
//                   • Teacher-forced cross-entropy loss
//
//   summarizer.rs — The Summarizer facade
//                   Owns config, text pipeline, weights and
//                   Adam state; train_step / predict / save / load
//
//   inferencer.rs — Greedy decoding, step logits exposed
//
//   trainer.rs    — Epoch loop over Burn DataLoaders with
//                   validation, metrics and checkpoints
//
// Reference: Burn Book §3 (Building Blocks)
//            Burn Book §5 (Training)
//            Sutskever et al. (2014) Sequence to Sequence Learning

/// Encoder-decoder LSTM architecture
pub mod model;

/// Summarizer lifecycle, training step and persistence entry points
pub mod summarizer;

/// Greedy decoder
pub mod inferencer;

/// Full training loop with validation and checkpointing
pub mod trainer;

#[cfg(test)]
pub(crate) mod test_support;

/// CPU backend used by the CLI: NdArray with autodiff for training
pub type CpuBackend = burn::backend::Autodiff<burn::backend::NdArray>;
