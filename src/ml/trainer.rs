// ============================================================
// Layer 5 — Training Loop
// ============================================================
// Epoch loop over Burn DataLoaders:
//
//   for each epoch:
//     1. shuffled training batches → Summarizer::train_step
//     2. validation batches        → Summarizer::evaluate
//     3. one metrics row
//     4. checkpoint (replaces the previous epoch's)
//
// The shuffle seed is explicit so two runs with the same
// configuration see batches in the same order.
//
// Reference: Burn Book §5, Kingma & Ba (2015) Adam

use anyhow::{bail, Context, Result};
use burn::{data::dataloader::DataLoaderBuilder, tensor::backend::AutodiffBackend};

use crate::data::{batcher::SummaryBatcher, dataset::SummaryDataset};
use crate::infra::checkpoint::CheckpointManager;
use crate::infra::metrics::{EpochMetrics, MetricsLogger};
use crate::ml::summarizer::Summarizer;

#[derive(Debug, Clone)]
pub struct TrainingOptions {
    pub epochs:       usize,
    pub batch_size:   usize,
    pub shuffle_seed: u64,
}

pub fn run_training<B: AutodiffBackend>(
    summarizer:    &mut Summarizer<B>,
    train_dataset: SummaryDataset,
    val_dataset:   SummaryDataset,
    options:       &TrainingOptions,
    ckpt_manager:  &CheckpointManager,
    metrics:       &MetricsLogger,
) -> Result<Vec<EpochMetrics>> {
    if train_dataset.sample_count() == 0 {
        bail!("No trainable samples: every pair needs a non-empty input and a target");
    }
    if options.batch_size == 0 {
        bail!("Batch size must be at least 1");
    }

    let device = summarizer.device().clone();

    // ── Training data loader ──────────────────────────────────────────────────
    let train_loader = DataLoaderBuilder::new(SummaryBatcher::<B>::new(device.clone()))
        .batch_size(options.batch_size)
        .shuffle(options.shuffle_seed)
        .num_workers(1)
        .build(train_dataset);

    // ── Validation data loader ────────────────────────────────────────────────
    let val_loader = DataLoaderBuilder::new(SummaryBatcher::<B>::new(device))
        .batch_size(options.batch_size)
        .num_workers(1)
        .build(val_dataset);

    let mut history = Vec::with_capacity(options.epochs);
    let mut best_val_loss = f64::INFINITY;

    for epoch in 1..=options.epochs {
        // ── Training phase ────────────────────────────────────────────────────
        let mut train_loss_sum = 0.0f64;
        let mut train_batches  = 0usize;
        for batch in train_loader.iter() {
            train_loss_sum += summarizer.train_step(batch, true)?;
            train_batches  += 1;
        }
        let avg_train_loss = if train_batches > 0 {
            train_loss_sum / train_batches as f64
        } else { f64::NAN };

        // ── Validation phase ──────────────────────────────────────────────────
        let mut val_loss_sum = 0.0f64;
        let mut val_batches  = 0usize;
        for batch in val_loader.iter() {
            val_loss_sum += summarizer.evaluate(batch)?;
            val_batches  += 1;
        }
        let avg_val_loss = if val_batches > 0 {
            val_loss_sum / val_batches as f64
        } else { f64::NAN };

        let row = EpochMetrics::new(epoch, avg_train_loss, avg_val_loss, summarizer.train_steps());
        println!(
            "Epoch {:>3}/{} | train_loss={:.4} | val_loss={:.4}{}",
            epoch,
            options.epochs,
            avg_train_loss,
            avg_val_loss,
            if row.is_improvement(best_val_loss) { " *" } else { "" },
        );
        if row.is_improvement(best_val_loss) {
            best_val_loss = row.val_loss;
        }
        metrics.log(&row)?;

        ckpt_manager
            .save(summarizer)
            .with_context(|| format!("Checkpoint for epoch {epoch} failed"))?;
        tracing::info!("Checkpoint saved for epoch {}", epoch);

        history.push(row);
    }

    tracing::info!("Training complete after {} steps", summarizer.train_steps());
    Ok(history)
}
