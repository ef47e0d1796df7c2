// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Entry point for all user interaction. Parses arguments with
// clap and delegates to Layer 2 (application).
//
//   1. `train`   — fits vocabularies and trains a summarizer
//   2. `predict` — loads a checkpoint and summarizes a text
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, PredictArgs, TrainArgs};

#[derive(Parser, Debug)]
#[command(
    name = "headline-summarizer",
    version = "0.1.0",
    about = "Train an LSTM encoder-decoder to write headlines, then summarize new texts."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Route the subcommand to its use case. The CLI layer never computes.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Train(args)   => run_train(args),
            Commands::Predict(args) => run_predict(args),
        }
    }
}

fn run_train(args: TrainArgs) -> Result<()> {
    use crate::application::train_use_case::TrainUseCase;

    tracing::info!("Starting training on pairs in: {}", args.data_file.display());
    let checkpoint_dir = args.checkpoint_dir.clone();
    let history = TrainUseCase::new(args.into()).execute()?;

    if let Some(last) = history.last() {
        println!(
            "Training complete: {} epochs, final val_loss={:.4}. Checkpoint saved under '{}'.",
            last.epoch,
            last.val_loss,
            checkpoint_dir.display()
        );
    }
    Ok(())
}

fn run_predict(args: PredictArgs) -> Result<()> {
    use crate::application::predict_use_case::PredictUseCase;

    let use_case = PredictUseCase::new(&args.checkpoint_dir)?;
    if args.verbose {
        let prediction = use_case.summarize_with_details(&args.text)?;
        println!("Input:   {}", prediction.preprocessed_text.0);
        println!("Ids:     {:?}", prediction.predicted_sequence);
        println!("Summary: {}", prediction.predicted_text);
    } else {
        println!("{}", use_case.summarize(&args.text)?);
    }
    Ok(())
}
