// ============================================================
// Layer 2 — Predict Use Case
// ============================================================
// Loads a trained summarizer from a run directory and
// produces summaries for new texts.

use anyhow::{Context, Result};
use std::path::Path;

use crate::application::model_dir;
use crate::ml::{inferencer::Prediction, summarizer::Summarizer, CpuBackend};

pub struct PredictUseCase {
    summarizer: Summarizer<CpuBackend>,
}

impl PredictUseCase {
    pub fn new(checkpoint_dir: impl AsRef<Path>) -> Result<Self> {
        let dir = model_dir(checkpoint_dir);
        let summarizer = Summarizer::load(&dir, &Default::default())
            .with_context(|| format!("Cannot load summarizer from '{}'", dir.display()))?;
        Ok(Self { summarizer })
    }

    pub fn summarize(&self, text: &str) -> Result<String> {
        Ok(self.summarizer.predict(text)?)
    }

    /// Summary plus preprocessed text, decoded ids and step logits
    pub fn summarize_with_details(&self, text: &str) -> Result<Prediction> {
        Ok(self.summarizer.predict_vectors(text, "")?)
    }
}
