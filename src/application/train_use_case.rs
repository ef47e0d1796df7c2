// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Orchestrates the full training pipeline in order:
//
//   Step 1: Load text/summary pairs      (Layer 4 - data)
//   Step 2: Preprocess both sides        (Layer 4 - data)
//   Step 3: Fit encoder/decoder vocab    (Layer 6 - infra)
//   Step 4: Vectorize into samples       (Layer 4 - data)
//   Step 5: Split train/validation       (Layer 4 - data)
//   Step 6: Initialise the summarizer    (Layer 5 - ml)
//   Step 7: Run training loop            (Layer 5 - ml)
//
// Reference: Rust Book §13 (Iterators and Closures)
//            Burn Book §5 (Training)

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::application::model_dir;
use crate::data::{
    dataset::{SummaryDataset, SummarySample},
    loader::TsvPairLoader,
    preprocessor::Preprocessor,
    splitter::split_train_val,
    vectorizer::Vectorizer,
};
use crate::domain::traits::PairSource;
use crate::infra::{
    checkpoint::CheckpointManager,
    metrics::{EpochMetrics, MetricsLogger},
    tokenizer_store::fit_word_level,
};
use crate::ml::{
    model::SummarizerConfig,
    summarizer::Summarizer,
    trainer::{run_training, TrainingOptions},
    CpuBackend,
};

// ─── Training Configuration ──────────────────────────────────────────────────
// All settings for a training run. The model hyperparameters among
// them end up in the checkpoint metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    pub data_file:                PathBuf,
    pub checkpoint_dir:           PathBuf,
    pub epochs:                   usize,
    pub batch_size:               usize,
    pub lstm_size:                usize,
    pub embedding_size:           usize,
    pub max_prediction_len:       usize,
    pub learning_rate:            f64,
    /// Words kept per side, most frequent first; None keeps all
    pub max_vocab_size:           Option<usize>,
    pub train_fraction:           f64,
    pub seed:                     u64,
    pub freeze_encoder_embedding: bool,
    pub freeze_decoder_embedding: bool,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            data_file:                PathBuf::from("data/pairs.tsv"),
            checkpoint_dir:           PathBuf::from("checkpoints"),
            epochs:                   10,
            batch_size:               16,
            lstm_size:                50,
            embedding_size:           50,
            max_prediction_len:       20,
            learning_rate:            1e-3,
            max_vocab_size:           None,
            train_fraction:           0.8,
            seed:                     42,
            freeze_encoder_embedding: false,
            freeze_decoder_embedding: false,
        }
    }
}

impl TrainConfig {
    pub fn summarizer_config(&self) -> SummarizerConfig {
        SummarizerConfig::new()
            .with_lstm_size(self.lstm_size)
            .with_embedding_size(self.embedding_size)
            .with_max_prediction_len(self.max_prediction_len)
            .with_learning_rate(self.learning_rate)
            .with_seed(self.seed)
            .with_embedding_encoder_trainable(!self.freeze_encoder_embedding)
            .with_embedding_decoder_trainable(!self.freeze_decoder_embedding)
    }
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    /// Execute the full training pipeline end to end
    pub fn execute(&self) -> Result<Vec<EpochMetrics>> {
        let cfg = &self.config;

        // ── Step 1: Load pairs ───────────────────────────────────────────────
        tracing::info!("Loading pairs from '{}'", cfg.data_file.display());
        let pairs = TsvPairLoader::new(&cfg.data_file)
            .load_all()
            .context("Cannot load training pairs")?;
        if pairs.is_empty() {
            bail!("'{}' contains no text/summary pairs", cfg.data_file.display());
        }

        // ── Step 2: Preprocess ───────────────────────────────────────────────
        let preprocessor = Preprocessor::new();
        let (inputs, targets): (Vec<String>, Vec<String>) = pairs
            .iter()
            .map(|p| preprocessor.process_pair(&p.text, &p.summary))
            .unzip();

        // ── Step 3: Fit one vocabulary per side ──────────────────────────────
        let vectorizer = Vectorizer::new(
            fit_word_level(&inputs, cfg.max_vocab_size)?,
            fit_word_level(&targets, cfg.max_vocab_size)?,
        );
        tracing::info!(
            "Vocabulary sizes: encoder={}, decoder={}",
            vectorizer.encoding_dim(),
            vectorizer.decoding_dim()
        );

        // ── Step 4: Vectorize ────────────────────────────────────────────────
        let mut samples = Vec::with_capacity(pairs.len());
        for (input, target) in inputs.iter().zip(&targets) {
            let (input_ids, target_ids) = vectorizer.encode_pair(input, target)?;
            let sample = SummarySample::new(input_ids, target_ids);
            if sample.is_trainable() {
                samples.push(sample);
            }
        }
        tracing::info!("Built {} training samples", samples.len());

        // ── Step 5: Train / validation split ─────────────────────────────────
        let (train_samples, val_samples) = split_train_val(samples, cfg.train_fraction, cfg.seed);
        tracing::info!(
            "Split: {} train, {} validation",
            train_samples.len(),
            val_samples.len()
        );

        // ── Step 6: Initialise the summarizer ────────────────────────────────
        let mut summarizer = Summarizer::<CpuBackend>::new(cfg.summarizer_config(), Default::default());
        summarizer.init_model(preprocessor, vectorizer);

        // ── Step 7: Train ────────────────────────────────────────────────────
        let ckpt_manager = CheckpointManager::new(model_dir(&cfg.checkpoint_dir));
        let metrics      = MetricsLogger::new(&cfg.checkpoint_dir)?;
        let options = TrainingOptions {
            epochs:       cfg.epochs,
            batch_size:   cfg.batch_size,
            shuffle_seed: cfg.seed,
        };

        run_training(
            &mut summarizer,
            SummaryDataset::new(train_samples),
            SummaryDataset::new(val_samples),
            &options,
            &ckpt_manager,
            &metrics,
        )
    }
}
