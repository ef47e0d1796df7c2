// ============================================================
// Layer 5 — Inferencer
// ============================================================
// Greedy decoding for a trained Seq2Seq model.
//
//   1. Encode the input ids, keep the final LSTM state
//   2. Feed the decoder the start token
//   3. Take the argmax of the logits as the next token
//   4. Feed that token back in, until the end token is
//      produced or max_prediction_len steps have run
//
// Every step's full logit vector is returned so two models can
// be compared numerically, not just by their decoded text.

use burn::prelude::*;

use crate::error::{Result, SummarizerError};
use crate::ml::model::Seq2Seq;

/// Output of one greedy decoding run.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    /// (input, target) after preprocessing
    pub preprocessed_text:  (String, String),
    /// Decoded tokens, end token stripped
    pub predicted_text:     String,
    /// Decoder ids produced, including the end token if reached
    pub predicted_sequence: Vec<u32>,
    /// One logit vector (decoder vocabulary size) per decoding step
    pub logits:             Vec<Vec<f32>>,
}

pub struct GreedyDecoder {
    pub start_id:           u32,
    pub end_id:             u32,
    pub max_prediction_len: usize,
}

impl GreedyDecoder {
    /// Decode from `input_ids`. Returns (sequence, per-step logits).
    pub fn decode<B: Backend>(
        &self,
        model:     &Seq2Seq<B>,
        input_ids: &[u32],
        device:    &B::Device,
    ) -> Result<(Vec<u32>, Vec<Vec<f32>>)> {
        if input_ids.is_empty() {
            return Err(SummarizerError::InvalidInput("Empty input sequence".to_string()));
        }

        let input_flat: Vec<i32> = input_ids.iter().map(|&x| x as i32).collect();
        let input = Tensor::<B, 1, Int>::from_ints(input_flat.as_slice(), device)
            .reshape([1, input_flat.len()]);

        let (_, mut state) = model.encoder.forward(input);

        let mut token    = self.start_id;
        let mut sequence = Vec::new();
        let mut logits   = Vec::new();

        for _ in 0..self.max_prediction_len {
            let step_input = Tensor::<B, 1, Int>::from_ints([token as i32], device)
                .reshape([1, 1]);
            let (step_logits, next_state) = model.decoder.forward(step_input, state);
            state = next_state;

            let [_, _, vocab] = step_logits.dims();
            let values: Vec<f32> = step_logits
                .reshape([vocab])
                .into_data()
                .convert::<f32>()
                .to_vec::<f32>()
                .map_err(|e| SummarizerError::Tensor(format!("Cannot read logits: {e:?}")))?;

            token = argmax(&values);
            sequence.push(token);
            logits.push(values);

            if token == self.end_id {
                break;
            }
        }

        tracing::debug!("Greedy decode produced {} tokens", sequence.len());
        Ok((sequence, logits))
    }
}

/// Index of the largest value; the first one wins on ties
fn argmax(values: &[f32]) -> u32 {
    let mut best = 0usize;
    for (i, &v) in values.iter().enumerate() {
        if v > values[best] {
            best = i;
        }
    }
    best as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::model::SummarizerConfig;
    use burn::backend::NdArray;

    #[test]
    fn test_argmax_prefers_first_maximum() {
        assert_eq!(argmax(&[0.1, 0.9, 0.9, -1.0]), 1);
        assert_eq!(argmax(&[3.0]), 0);
    }

    #[test]
    fn test_decode_respects_max_len_and_logit_width() {
        let device = Default::default();
        let model = SummarizerConfig::new()
            .with_lstm_size(4)
            .with_embedding_size(3)
            .init_model::<NdArray>(6, 8, &device);
        // an end id outside the vocabulary is never produced
        let decoder = GreedyDecoder { start_id: 2, end_id: 99, max_prediction_len: 5 };

        let (sequence, logits) = decoder.decode(&model, &[2, 3, 4], &device).unwrap();
        assert_eq!(sequence.len(), 5);
        assert_eq!(logits.len(), 5);
        assert!(logits.iter().all(|step| step.len() == 8));
        assert!(sequence.iter().all(|&id| id < 8));
    }

    #[test]
    fn test_empty_input_is_rejected() {
        let device = Default::default();
        let model = SummarizerConfig::new().init_model::<NdArray>(4, 4, &device);
        let decoder = GreedyDecoder { start_id: 2, end_id: 3, max_prediction_len: 5 };
        assert!(decoder.decode(&model, &[], &device).is_err());
    }
}
