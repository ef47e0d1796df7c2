use burn::{
    nn::{
        loss::CrossEntropyLossConfig,
        Embedding, EmbeddingConfig,
        Linear, LinearConfig,
        Lstm, LstmConfig, LstmState,
    },
    prelude::*,
};

use crate::infra::tokenizer_store::PAD_INDEX;

// #[derive(Config)] already generates Clone and Serialize/Deserialize,
// deriving them again gives conflicting impls.
#[derive(Config, Debug)]
pub struct SummarizerConfig {
    /// Hidden size of the encoder and decoder LSTMs
    #[config(default = 50)]
    pub lstm_size:                   usize,
    /// Maximum number of tokens produced by greedy decoding
    #[config(default = 20)]
    pub max_prediction_len:          usize,
    #[config(default = 50)]
    pub embedding_size:              usize,
    #[config(default = true)]
    pub embedding_encoder_trainable: bool,
    #[config(default = true)]
    pub embedding_decoder_trainable: bool,
    #[config(default = 1e-3)]
    pub learning_rate:               f64,
    /// Seeds the backend RNG before the weights are initialised
    #[config(default = 42)]
    pub seed:                        u64,
}

impl SummarizerConfig {
    /// Build the encoder/decoder pair for the given vocabulary sizes
    pub fn init_model<B: Backend>(
        &self,
        encoding_dim: usize,
        decoding_dim: usize,
        device:       &B::Device,
    ) -> Seq2Seq<B> {
        let encoder = Encoder {
            embedding: EmbeddingConfig::new(encoding_dim, self.embedding_size).init(device),
            lstm:      LstmConfig::new(self.embedding_size, self.lstm_size, true).init(device),
            embedding_trainable: self.embedding_encoder_trainable,
        };
        let decoder = Decoder {
            embedding:  EmbeddingConfig::new(decoding_dim, self.embedding_size).init(device),
            lstm:       LstmConfig::new(self.embedding_size, self.lstm_size, true).init(device),
            projection: LinearConfig::new(self.lstm_size, decoding_dim).init(device),
            embedding_trainable: self.embedding_decoder_trainable,
        };
        Seq2Seq { encoder: encoder.apply_trainable(), decoder: decoder.apply_trainable() }
    }
}

// ─── Encoder ──────────────────────────────────────────────────────────────────
#[derive(Module, Debug)]
pub struct Encoder<B: Backend> {
    pub embedding:           Embedding<B>,
    pub lstm:                Lstm<B>,
    pub embedding_trainable: bool,
}

impl<B: Backend> Encoder<B> {
    /// input_ids: [batch, seq_len] → outputs [batch, seq_len, lstm_size], final state
    pub fn forward(&self, input_ids: Tensor<B, 2, Int>) -> (Tensor<B, 3>, LstmState<B, 2>) {
        let embedded = self.embedding.forward(input_ids);
        self.lstm.forward(embedded, None)
    }

    /// Freeze the embedding table unless it is tagged trainable.
    /// Must be re-applied after weights are loaded from a record.
    pub fn apply_trainable(mut self) -> Self {
        if !self.embedding_trainable {
            self.embedding = self.embedding.no_grad();
        }
        self
    }

    /// Rows of the embedding table (encoder vocabulary size)
    pub fn vocab_size(&self) -> usize {
        self.embedding.weight.val().dims()[0]
    }
}

// ─── Decoder ──────────────────────────────────────────────────────────────────
#[derive(Module, Debug)]
pub struct Decoder<B: Backend> {
    pub embedding:           Embedding<B>,
    pub lstm:                Lstm<B>,
    pub projection:          Linear<B>,
    pub embedding_trainable: bool,
}

impl<B: Backend> Decoder<B> {
    /// input_ids: [batch, seq_len] → logits [batch, seq_len, vocab], next state
    pub fn forward(
        &self,
        input_ids: Tensor<B, 2, Int>,
        state:     LstmState<B, 2>,
    ) -> (Tensor<B, 3>, LstmState<B, 2>) {
        let embedded = self.embedding.forward(input_ids);
        let (hidden, state) = self.lstm.forward(embedded, Some(state));
        (self.projection.forward(hidden), state)
    }

    pub fn apply_trainable(mut self) -> Self {
        if !self.embedding_trainable {
            self.embedding = self.embedding.no_grad();
        }
        self
    }

    /// Rows of the embedding table (decoder vocabulary size)
    pub fn vocab_size(&self) -> usize {
        self.embedding.weight.val().dims()[0]
    }

    /// Output width of the logit projection
    pub fn output_size(&self) -> usize {
        self.projection.weight.val().dims()[1]
    }
}

// ─── Seq2Seq ──────────────────────────────────────────────────────────────────
// Encoder and decoder live in one module so a single optimizer
// tracks every parameter of both.
#[derive(Module, Debug)]
pub struct Seq2Seq<B: Backend> {
    pub encoder: Encoder<B>,
    pub decoder: Decoder<B>,
}

impl<B: Backend> Seq2Seq<B> {
    /// Teacher-forced cross-entropy loss.
    ///
    /// The decoder reads target[:, :-1] and is scored against target[:, 1:].
    /// Padding positions are excluded from the loss.
    /// target must have at least two columns.
    pub fn forward_loss(
        &self,
        source: Tensor<B, 2, Int>,
        target: Tensor<B, 2, Int>,
    ) -> Tensor<B, 1> {
        let [batch_size, target_len] = target.dims();
        let decoder_input  = target.clone().slice([0..batch_size, 0..target_len - 1]);
        let decoder_target = target.slice([0..batch_size, 1..target_len]);

        let (_, state)  = self.encoder.forward(source);
        let (logits, _) = self.decoder.forward(decoder_input, state);

        let [batch_size, steps, vocab] = logits.dims();
        let ce = CrossEntropyLossConfig::new()
            .with_pad_tokens(Some(vec![PAD_INDEX as usize]))
            .init(&logits.device());
        ce.forward(
            logits.reshape([batch_size * steps, vocab]),
            decoder_target.reshape([batch_size * steps]),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    fn ids(rows: &[&[i32]]) -> Tensor<TestBackend, 2, Int> {
        let width = rows[0].len();
        let flat: Vec<i32> = rows.iter().flat_map(|r| r.iter().copied()).collect();
        Tensor::<TestBackend, 1, Int>::from_ints(flat.as_slice(), &Default::default())
            .reshape([rows.len(), width])
    }

    #[test]
    fn test_shapes_follow_config() {
        let cfg = SummarizerConfig::new().with_lstm_size(6).with_embedding_size(4);
        let model = cfg.init_model::<TestBackend>(9, 7, &Default::default());

        assert_eq!(model.encoder.vocab_size(), 9);
        assert_eq!(model.decoder.vocab_size(), 7);
        assert_eq!(model.decoder.output_size(), 7);

        let (outputs, state) = model.encoder.forward(ids(&[&[1, 2, 3]]));
        assert_eq!(outputs.dims(), [1, 3, 6]);

        let (logits, _) = model.decoder.forward(ids(&[&[1, 2]]), state);
        assert_eq!(logits.dims(), [1, 2, 7]);
    }

    #[test]
    fn test_loss_is_finite_and_positive() {
        let cfg = SummarizerConfig::new().with_lstm_size(4).with_embedding_size(4);
        let model = cfg.init_model::<TestBackend>(5, 5, &Default::default());
        let loss: f64 = model
            .forward_loss(ids(&[&[2, 3]]), ids(&[&[2, 3, 4]]))
            .into_scalar()
            .elem::<f64>();
        assert!(loss.is_finite());
        assert!(loss > 0.0);
    }

    #[test]
    fn test_trainable_tags_follow_config() {
        let cfg = SummarizerConfig::new()
            .with_embedding_encoder_trainable(false)
            .with_embedding_decoder_trainable(true);
        let model = cfg.init_model::<TestBackend>(5, 5, &Default::default());
        assert!(!model.encoder.embedding_trainable);
        assert!(model.decoder.embedding_trainable);
    }
}
