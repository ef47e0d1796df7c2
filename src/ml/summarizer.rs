// ============================================================
// Layer 5 — Summarizer
// ============================================================
// Owns the complete model state:
//   - hyperparameters          (SummarizerConfig)
//   - preprocessor             (special tokens, text normalisation)
//   - vectorizer               (encoder / decoder vocabularies)
//   - encoder + decoder        (Seq2Seq module)
//   - Adam optimizer state     (moments per parameter)
//
// Lifecycle:
//
//   new() ──► init_model() ──► Uninitialized ──train_step()──► Ready
//                                                               ▲
//   load() ─────────────────────────────────────────────────────┘
//
// Only a Ready summarizer can be saved. Weights drawn at
// init_model are a random starting point, not a model.

use burn::{
    module::AutodiffModule,
    optim::{adaptor::OptimizerAdaptor, Adam, AdamConfig, GradientsParams, Optimizer},
    prelude::*,
    tensor::backend::AutodiffBackend,
};
use std::path::Path;

use crate::data::{batcher::SummaryBatch, preprocessor::Preprocessor, vectorizer::Vectorizer};
use crate::error::{Result, SummarizerError};
use crate::infra::checkpoint::CheckpointManager;
use crate::ml::inferencer::{GreedyDecoder, Prediction};
use crate::ml::model::{Decoder, Encoder, Seq2Seq, SummarizerConfig};

pub type SummarizerOptimizer<B> = OptimizerAdaptor<Adam, Seq2Seq<B>, B>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Weights have never been updated
    Uninitialized,
    /// At least one training step applied, or restored from a checkpoint
    Ready,
}

pub struct Summarizer<B: AutodiffBackend> {
    config:       SummarizerConfig,
    device:       B::Device,
    phase:        Phase,
    train_steps:  usize,
    preprocessor: Option<Preprocessor>,
    vectorizer:   Option<Vectorizer>,
    model:        Option<Seq2Seq<B>>,
    optimizer:    Option<SummarizerOptimizer<B>>,
}

impl<B: AutodiffBackend> Summarizer<B> {
    pub fn new(config: SummarizerConfig, device: B::Device) -> Self {
        Self {
            config,
            device,
            phase:        Phase::Uninitialized,
            train_steps:  0,
            preprocessor: None,
            vectorizer:   None,
            model:        None,
            optimizer:    None,
        }
    }

    /// Attach the text pipeline and build fresh weights sized to its vocabularies
    pub fn init_model(&mut self, preprocessor: Preprocessor, vectorizer: Vectorizer) {
        B::seed(self.config.seed);
        let model = self.config.init_model::<B>(
            vectorizer.encoding_dim(),
            vectorizer.decoding_dim(),
            &self.device,
        );
        tracing::info!(
            "Summarizer initialised: lstm_size={}, embedding_size={}, vocab={}/{}",
            self.config.lstm_size,
            self.config.embedding_size,
            vectorizer.encoding_dim(),
            vectorizer.decoding_dim(),
        );

        self.preprocessor = Some(preprocessor);
        self.vectorizer   = Some(vectorizer);
        self.model        = Some(model);
        self.optimizer    = Some(AdamConfig::new().init());
        self.phase        = Phase::Uninitialized;
        self.train_steps  = 0;
    }

    /// Reassemble a summarizer from restored parts. Always Ready.
    pub(crate) fn from_parts(
        config:       SummarizerConfig,
        device:       B::Device,
        train_steps:  usize,
        preprocessor: Preprocessor,
        vectorizer:   Vectorizer,
        model:        Seq2Seq<B>,
        optimizer:    SummarizerOptimizer<B>,
    ) -> Self {
        Self {
            config,
            device,
            phase:        Phase::Ready,
            train_steps,
            preprocessor: Some(preprocessor),
            vectorizer:   Some(vectorizer),
            model:        Some(model),
            optimizer:    Some(optimizer),
        }
    }

    // ── Accessors ─────────────────────────────────────────────────────────────

    pub fn config(&self) -> &SummarizerConfig { &self.config }

    pub fn lstm_size(&self) -> usize { self.config.lstm_size }

    pub fn max_prediction_len(&self) -> usize { self.config.max_prediction_len }

    pub fn phase(&self) -> Phase { self.phase }

    pub fn train_steps(&self) -> usize { self.train_steps }

    pub fn device(&self) -> &B::Device { &self.device }

    pub fn preprocessor(&self) -> Option<&Preprocessor> { self.preprocessor.as_ref() }

    pub fn vectorizer(&self) -> Option<&Vectorizer> { self.vectorizer.as_ref() }

    pub fn model(&self) -> Option<&Seq2Seq<B>> { self.model.as_ref() }

    pub fn encoder(&self) -> Option<&Encoder<B>> { self.model.as_ref().map(|m| &m.encoder) }

    pub fn decoder(&self) -> Option<&Decoder<B>> { self.model.as_ref().map(|m| &m.decoder) }

    pub fn optimizer(&self) -> Option<&SummarizerOptimizer<B>> { self.optimizer.as_ref() }

    // ── Training ──────────────────────────────────────────────────────────────

    /// Run one teacher-forced step on `batch` and return the loss.
    ///
    /// With `apply_gradients` the Adam update is applied and the
    /// summarizer becomes Ready; without it only the loss is computed.
    pub fn train_step(&mut self, batch: SummaryBatch<B>, apply_gradients: bool) -> Result<f64> {
        check_batch(&batch)?;
        let (Some(model), Some(optimizer)) = (self.model.as_mut(), self.optimizer.as_mut()) else {
            return Err(SummarizerError::NotInitialized);
        };

        let loss = model.forward_loss(batch.source, batch.target);
        let loss_val: f64 = loss.clone().into_scalar().elem::<f64>();

        if apply_gradients {
            let grads = loss.backward();
            let grads = GradientsParams::from_grads(grads, &*model);
            *model = optimizer.step(self.config.learning_rate, model.clone(), grads);

            self.train_steps += 1;
            if self.phase == Phase::Uninitialized {
                tracing::debug!("First training step applied, weights are ready");
            }
            self.phase = Phase::Ready;
        }

        Ok(loss_val)
    }

    /// Loss on `batch` without touching weights or optimizer state
    pub fn evaluate(&self, batch: SummaryBatch<B>) -> Result<f64> {
        check_batch(&batch)?;
        let model = self.model.as_ref().ok_or(SummarizerError::NotInitialized)?;
        let loss = model.forward_loss(batch.source, batch.target);
        Ok(loss.into_scalar().elem::<f64>())
    }

    // ── Inference ─────────────────────────────────────────────────────────────

    /// Summarize `text` and return the intermediate vectors.
    /// `target` is only preprocessed and reported back.
    pub fn predict_vectors(&self, text: &str, target: &str) -> Result<Prediction> {
        let (Some(preprocessor), Some(vectorizer), Some(model)) =
            (self.preprocessor.as_ref(), self.vectorizer.as_ref(), self.model.as_ref())
        else {
            return Err(SummarizerError::NotInitialized);
        };

        let preprocessed_text = preprocessor.process_pair(text, target);
        let input_ids = vectorizer.encode_input(&preprocessed_text.0)?;

        let decoder = GreedyDecoder {
            start_id:           vectorizer.decoder_token_id(&preprocessor.start_token)?,
            end_id:             vectorizer.decoder_token_id(&preprocessor.end_token)?,
            max_prediction_len: self.config.max_prediction_len,
        };
        let (predicted_sequence, logits) = decoder.decode(&model.valid(), &input_ids, &self.device)?;

        let text_ids: Vec<u32> = predicted_sequence
            .iter()
            .copied()
            .filter(|&id| id != decoder.end_id)
            .collect();
        let predicted_text = vectorizer.decode_output(&text_ids);

        Ok(Prediction { preprocessed_text, predicted_text, predicted_sequence, logits })
    }

    pub fn predict(&self, text: &str) -> Result<String> {
        Ok(self.predict_vectors(text, "")?.predicted_text)
    }

    // ── Persistence ───────────────────────────────────────────────────────────

    /// Write a complete checkpoint to `dir`, replacing any existing one
    pub fn save(&self, dir: impl AsRef<Path>) -> Result<()> {
        CheckpointManager::new(dir.as_ref()).save(self)
    }

    /// Restore a summarizer saved with `save`
    pub fn load(dir: impl AsRef<Path>, device: &B::Device) -> Result<Self> {
        CheckpointManager::new(dir.as_ref()).load(device)
    }
}

fn check_batch<B: Backend>(batch: &SummaryBatch<B>) -> Result<()> {
    let [_, target_len] = batch.target.dims();
    if target_len < 2 {
        return Err(SummarizerError::InvalidInput(format!(
            "Targets need at least 2 tokens for teacher forcing, got {target_len}"
        )));
    }
    Ok(())
}
