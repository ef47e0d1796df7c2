// ============================================================
// Layer 4 — Summary Batcher
// ============================================================
// Implements Burn's Batcher trait to turn a Vec<SummarySample>
// into a pair of padded index tensors.
//
// Sequences in a batch have different lengths, so each side is
// right-padded with PAD_INDEX up to the longest sequence on that
// side:
//   source: [batch_size, max_input_len]
//   target: [batch_size, max_target_len]
//
// Padding positions in the target are ignored by the loss.
//
// Reference: Burn Book §4 (Batcher)

use burn::{
    data::dataloader::batcher::Batcher,
    prelude::*,
};

use crate::data::dataset::SummarySample;
use crate::infra::tokenizer_store::PAD_INDEX;

#[derive(Debug, Clone)]
pub struct SummaryBatch<B: Backend> {
    /// Encoder input ids, shape [batch_size, source_len]
    pub source: Tensor<B, 2, Int>,

    /// Decoder ids incl. start/end tokens, shape [batch_size, target_len]
    pub target: Tensor<B, 2, Int>,
}

#[derive(Clone, Debug)]
pub struct SummaryBatcher<B: Backend> {
    pub device: B::Device,
}

impl<B: Backend> SummaryBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }

    fn pad(&self, rows: Vec<&[u32]>) -> Tensor<B, 2, Int> {
        let batch_size = rows.len();
        let width      = rows.iter().map(|r| r.len()).max().unwrap_or(0).max(1);

        let flat: Vec<i32> = rows
            .iter()
            .flat_map(|row| {
                row.iter()
                    .map(|&id| id as i32)
                    .chain(std::iter::repeat(PAD_INDEX as i32))
                    .take(width)
            })
            .collect();

        Tensor::<B, 1, Int>::from_ints(flat.as_slice(), &self.device)
            .reshape([batch_size, width])
    }
}

impl<B: Backend> Batcher<SummarySample, SummaryBatch<B>> for SummaryBatcher<B> {
    fn batch(&self, items: Vec<SummarySample>) -> SummaryBatch<B> {
        let source = self.pad(items.iter().map(|s| s.input_ids.as_slice()).collect());
        let target = self.pad(items.iter().map(|s| s.target_ids.as_slice()).collect());
        SummaryBatch { source, target }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    #[test]
    fn test_pads_each_side_to_longest_row() {
        let batcher = SummaryBatcher::<NdArray>::new(Default::default());
        let batch = batcher.batch(vec![
            SummarySample::new(vec![5, 6, 7], vec![2, 3]),
            SummarySample::new(vec![8], vec![2, 4, 9, 3]),
        ]);

        assert_eq!(batch.source.dims(), [2, 3]);
        assert_eq!(batch.target.dims(), [2, 4]);

        let source: Vec<i64> = batch.source.into_data().convert::<i64>().to_vec().unwrap();
        assert_eq!(source, vec![5, 6, 7, 8, 0, 0]);
        let target: Vec<i64> = batch.target.into_data().convert::<i64>().to_vec().unwrap();
        assert_eq!(target, vec![2, 3, 0, 0, 2, 4, 9, 3]);
    }
}
