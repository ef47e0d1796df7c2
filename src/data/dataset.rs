use burn::data::dataset::Dataset;
use serde::{Deserialize, Serialize};

/// One vectorized training pair. Sequences are unpadded;
/// the batcher pads them per batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummarySample {
    pub input_ids:  Vec<u32>,
    pub target_ids: Vec<u32>,
}

impl SummarySample {
    pub fn new(input_ids: Vec<u32>, target_ids: Vec<u32>) -> Self {
        Self { input_ids, target_ids }
    }

    /// Teacher forcing needs at least one input and one predicted token
    pub fn is_trainable(&self) -> bool {
        !self.input_ids.is_empty() && self.target_ids.len() >= 2
    }
}

pub struct SummaryDataset {
    samples: Vec<SummarySample>,
}

impl SummaryDataset {
    pub fn new(samples: Vec<SummarySample>) -> Self { Self { samples } }

    pub fn sample_count(&self) -> usize { self.samples.len() }
}

impl Dataset<SummarySample> for SummaryDataset {
    fn get(&self, index: usize) -> Option<SummarySample> {
        self.samples.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.samples.len()
    }
}
