// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the two subcommands, `train` and `predict`, and all
// their configurable flags.
//
// Reference: Rust Book §12 (Building a CLI Program)

use clap::{Args, Subcommand};
use std::path::PathBuf;

use crate::application::train_use_case::TrainConfig;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train a summarizer on tab separated text/summary pairs
    Train(TrainArgs),

    /// Summarize a text with a trained checkpoint
    Predict(PredictArgs),
}

#[derive(Args, Debug)]
pub struct TrainArgs {
    /// File with one `text<TAB>summary` pair per line
    #[arg(long, default_value = "data/pairs.tsv")]
    pub data_file: PathBuf,

    /// Run directory: receives the checkpoint and metrics.csv
    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: PathBuf,

    /// Number of full passes through the training data
    #[arg(long, default_value_t = 10)]
    pub epochs: usize,

    #[arg(long, default_value_t = 16)]
    pub batch_size: usize,

    /// Hidden size of the encoder and decoder LSTMs
    #[arg(long, default_value_t = 50)]
    pub lstm_size: usize,

    #[arg(long, default_value_t = 50)]
    pub embedding_size: usize,

    /// Maximum number of tokens generated per summary
    #[arg(long, default_value_t = 20)]
    pub max_prediction_len: usize,

    #[arg(long, default_value_t = 1e-3)]
    pub learning_rate: f64,

    /// Keep only the most frequent words on each side
    #[arg(long)]
    pub max_vocab_size: Option<usize>,

    /// Share of pairs used for training, the rest validates
    #[arg(long, default_value_t = 0.8)]
    pub train_fraction: f64,

    /// Seeds weight initialisation, the split, and batch shuffling
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Keep the encoder embedding fixed during training
    #[arg(long)]
    pub freeze_encoder_embedding: bool,

    /// Keep the decoder embedding fixed during training
    #[arg(long)]
    pub freeze_decoder_embedding: bool,
}

/// Boundary between Layer 1 and Layer 2: the application layer never sees clap types.
impl From<TrainArgs> for TrainConfig {
    fn from(a: TrainArgs) -> Self {
        TrainConfig {
            data_file:                a.data_file,
            checkpoint_dir:           a.checkpoint_dir,
            epochs:                   a.epochs,
            batch_size:               a.batch_size,
            lstm_size:                a.lstm_size,
            embedding_size:           a.embedding_size,
            max_prediction_len:       a.max_prediction_len,
            learning_rate:            a.learning_rate,
            max_vocab_size:           a.max_vocab_size,
            train_fraction:           a.train_fraction,
            seed:                     a.seed,
            freeze_encoder_embedding: a.freeze_encoder_embedding,
            freeze_decoder_embedding: a.freeze_decoder_embedding,
        }
    }
}

#[derive(Args, Debug)]
pub struct PredictArgs {
    /// The text to summarize
    #[arg(long)]
    pub text: String,

    /// Run directory written by `train`
    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: PathBuf,

    /// Also print the preprocessed input and the decoded ids
    #[arg(long)]
    pub verbose: bool,
}
