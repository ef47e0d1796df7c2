// ============================================================
// Layer 6 — Checkpoint Manager
// ============================================================
// Saves and restores the complete state of a Summarizer.
//
// What gets saved per checkpoint:
//   summarizer.json         — metadata: format version, hyperparameters
//                             (incl. trainable flags), vocab sizes, steps
//   preprocessor.json       — special tokens and text options
//   vectorizer.json         — truncation lengths
//   tokenizer_encoder.json  — encoder vocabulary
//   tokenizer_decoder.json  — decoder vocabulary
//   encoder.mpk             — encoder weights
//   decoder.mpk             — decoder weights
//   optimizer.mpk           — Adam moments keyed by parameter id
//
// Weights use NamedMpkFileRecorder with FullPrecisionSettings:
// a reloaded model must reproduce the original logits, which
// half precision (CompactRecorder) cannot guarantee.
//
// Writes are staged: every file goes into a sibling
// `.{name}.partial` directory, summarizer.json is written last,
// and the staging directory is then renamed over the target. The
// previous checkpoint sits at `.{name}.old` until that rename lands.
// A directory without summarizer.json is an incomplete checkpoint.
//
// Reference: Burn Book §5 (Records and Checkpointing)

use burn::{
    module::Module,
    optim::{AdamConfig, Optimizer},
    record::{FullPrecisionSettings, NamedMpkFileRecorder, Recorder, RecorderError},
    tensor::backend::AutodiffBackend,
};
use serde::{Deserialize, Serialize};
use std::{
    fs, io,
    path::{Path, PathBuf},
};

use crate::data::{preprocessor::Preprocessor, vectorizer::Vectorizer};
use crate::domain::traits::Persistable;
use crate::error::{Result, SummarizerError};
use crate::infra::files::{read_json, require_component, write_json};
use crate::ml::model::{Seq2Seq, SummarizerConfig};
use crate::ml::summarizer::{Phase, Summarizer, SummarizerOptimizer};

pub const METADATA_FILE: &str = "summarizer.json";
pub const ENCODER_FILE: &str = "encoder.mpk";
pub const DECODER_FILE: &str = "decoder.mpk";
pub const OPTIMIZER_FILE: &str = "optimizer.mpk";
pub const FORMAT_VERSION: u32 = 1;

type WeightRecorder = NamedMpkFileRecorder<FullPrecisionSettings>;

/// Contents of summarizer.json
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckpointMeta {
    pub format_version: u32,
    pub config:         SummarizerConfig,
    pub encoding_dim:   usize,
    pub decoding_dim:   usize,
    pub train_steps:    usize,
}

/// Reads and writes one checkpoint directory.
pub struct CheckpointManager {
    dir: PathBuf,
}

impl CheckpointManager {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// True if `dir` holds a committed checkpoint
    pub fn exists(&self) -> bool {
        self.dir.join(METADATA_FILE).is_file()
    }

    // ── Writer ────────────────────────────────────────────────────────────────

    /// Persist every component of `summarizer`, replacing any existing
    /// checkpoint at this directory. Fails before writing anything if
    /// the summarizer has never been trained.
    pub fn save<B: AutodiffBackend>(&self, summarizer: &Summarizer<B>) -> Result<()> {
        let (Some(preprocessor), Some(vectorizer), Some(model), Some(optimizer)) = (
            summarizer.preprocessor(),
            summarizer.vectorizer(),
            summarizer.model(),
            summarizer.optimizer(),
        ) else {
            return Err(SummarizerError::NotInitialized);
        };
        if summarizer.phase() != Phase::Ready {
            return Err(SummarizerError::NotTrained);
        }

        let meta = CheckpointMeta {
            format_version: FORMAT_VERSION,
            config:         summarizer.config().clone(),
            encoding_dim:   vectorizer.encoding_dim(),
            decoding_dim:   vectorizer.decoding_dim(),
            train_steps:    summarizer.train_steps(),
        };

        let staging = self.staging_dir()?;
        if staging.exists() {
            fs::remove_dir_all(&staging).map_err(|e| SummarizerError::io(&staging, e))?;
        }
        fs::create_dir_all(&staging).map_err(|e| SummarizerError::io(&staging, e))?;

        let written = write_parts(&staging, &meta, preprocessor, vectorizer, model, optimizer);
        if let Err(e) = written {
            fs::remove_dir_all(&staging).ok();
            return Err(e);
        }

        if let Err(e) = self.commit(&staging) {
            fs::remove_dir_all(&staging).ok();
            return Err(e);
        }
        tracing::info!(
            "Saved checkpoint to '{}' ({} training steps)",
            self.dir.display(),
            meta.train_steps
        );
        Ok(())
    }

    /// `.{name}.partial` next to the target directory
    fn staging_dir(&self) -> Result<PathBuf> {
        self.sibling("partial")
    }

    /// `.{name}.{suffix}` next to the target directory, parent created
    fn sibling(&self, suffix: &str) -> Result<PathBuf> {
        let name = self.dir.file_name().ok_or_else(|| {
            SummarizerError::InvalidInput(format!(
                "Checkpoint path '{}' has no directory name",
                self.dir.display()
            ))
        })?;
        let parent = self.dir.parent().unwrap_or_else(|| Path::new(""));
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| SummarizerError::io(parent, e))?;
        }
        Ok(parent.join(format!(".{}.{suffix}", name.to_string_lossy())))
    }

    /// Move `staging` into place. The previous checkpoint is parked at
    /// `.{name}.old` until the rename succeeds and restored if it fails.
    fn commit(&self, staging: &Path) -> Result<()> {
        if self.dir.exists() && !self.dir.is_dir() {
            return Err(SummarizerError::io(
                &self.dir,
                io::Error::new(io::ErrorKind::AlreadyExists, "exists and is not a directory"),
            ));
        }

        let backup = self.sibling("old")?;
        if backup.exists() {
            fs::remove_dir_all(&backup).map_err(|e| SummarizerError::io(&backup, e))?;
        }

        let had_previous = self.dir.is_dir();
        if had_previous {
            fs::rename(&self.dir, &backup).map_err(|e| SummarizerError::io(&self.dir, e))?;
        }

        if let Err(e) = fs::rename(staging, &self.dir) {
            if had_previous {
                fs::rename(&backup, &self.dir).ok();
            }
            return Err(SummarizerError::io(&self.dir, e));
        }

        if had_previous {
            if let Err(e) = fs::remove_dir_all(&backup) {
                tracing::warn!("Cannot remove previous checkpoint '{}': {e}", backup.display());
            }
        }
        Ok(())
    }

    // ── Loader ────────────────────────────────────────────────────────────────

    /// Rebuild a Ready summarizer from this directory
    pub fn load<B: AutodiffBackend>(&self, device: &B::Device) -> Result<Summarizer<B>> {
        if !self.dir.is_dir() {
            return Err(SummarizerError::NotFound(self.dir.clone()));
        }

        let meta: CheckpointMeta = read_json(&self.dir.join(METADATA_FILE))?;
        if meta.format_version != FORMAT_VERSION {
            return Err(SummarizerError::Format(format!(
                "Unsupported checkpoint format version {} (expected {})",
                meta.format_version, FORMAT_VERSION
            )));
        }

        let preprocessor = Preprocessor::load(&self.dir)?;
        let vectorizer   = Vectorizer::load(&self.dir)?;
        if vectorizer.encoding_dim() != meta.encoding_dim
            || vectorizer.decoding_dim() != meta.decoding_dim
        {
            return Err(SummarizerError::Format(format!(
                "Vocabulary sizes {}/{} do not match metadata {}/{}",
                vectorizer.encoding_dim(),
                vectorizer.decoding_dim(),
                meta.encoding_dim,
                meta.decoding_dim
            )));
        }

        let model     = self.load_model::<B>(&meta, device)?;
        let optimizer = self.load_optimizer::<B>(device)?;

        tracing::info!(
            "Loaded checkpoint from '{}' ({} training steps)",
            self.dir.display(),
            meta.train_steps
        );
        Ok(Summarizer::from_parts(
            meta.config,
            device.clone(),
            meta.train_steps,
            preprocessor,
            vectorizer,
            model,
            optimizer,
        ))
    }

    fn load_model<B: AutodiffBackend>(
        &self,
        meta:   &CheckpointMeta,
        device: &B::Device,
    ) -> Result<Seq2Seq<B>> {
        let recorder = WeightRecorder::new();
        let skeleton = meta.config.init_model::<B>(meta.encoding_dim, meta.decoding_dim, device);

        let encoder_path = self.component(ENCODER_FILE)?;
        let encoder = skeleton
            .encoder
            .load_file(encoder_path.clone(), &recorder, device)
            .map_err(|e| load_error(&encoder_path, e))?
            .apply_trainable();

        let decoder_path = self.component(DECODER_FILE)?;
        let decoder = skeleton
            .decoder
            .load_file(decoder_path.clone(), &recorder, device)
            .map_err(|e| load_error(&decoder_path, e))?
            .apply_trainable();

        if encoder.vocab_size() != meta.encoding_dim {
            return Err(SummarizerError::Format(format!(
                "Encoder embedding has {} rows, vocabulary has {}",
                encoder.vocab_size(),
                meta.encoding_dim
            )));
        }
        if decoder.vocab_size() != meta.decoding_dim || decoder.output_size() != meta.decoding_dim {
            return Err(SummarizerError::Format(format!(
                "Decoder weights sized {}/{}, vocabulary has {}",
                decoder.vocab_size(),
                decoder.output_size(),
                meta.decoding_dim
            )));
        }

        Ok(Seq2Seq { encoder, decoder })
    }

    fn load_optimizer<B: AutodiffBackend>(&self, device: &B::Device) -> Result<SummarizerOptimizer<B>> {
        let path = self.component(OPTIMIZER_FILE)?;
        let optimizer: SummarizerOptimizer<B> = AdamConfig::new().init();
        let record = <WeightRecorder as Recorder<B>>::load(&WeightRecorder::new(), path.clone(), device)
            .map_err(|e| load_error(&path, e))?;
        Ok(optimizer.load_record(record))
    }

    fn component(&self, name: &str) -> Result<PathBuf> {
        let path = self.dir.join(name);
        require_component(&path)?;
        Ok(path)
    }
}

fn write_parts<B: AutodiffBackend>(
    dir:          &Path,
    meta:         &CheckpointMeta,
    preprocessor: &Preprocessor,
    vectorizer:   &Vectorizer,
    model:        &Seq2Seq<B>,
    optimizer:    &SummarizerOptimizer<B>,
) -> Result<()> {
    preprocessor.save(dir)?;
    vectorizer.save(dir)?;

    let recorder = WeightRecorder::new();
    let encoder_path = dir.join(ENCODER_FILE);
    model
        .encoder
        .clone()
        .save_file(encoder_path.clone(), &recorder)
        .map_err(|e| save_error(&encoder_path, e))?;

    let decoder_path = dir.join(DECODER_FILE);
    model
        .decoder
        .clone()
        .save_file(decoder_path.clone(), &recorder)
        .map_err(|e| save_error(&decoder_path, e))?;

    let optimizer_path = dir.join(OPTIMIZER_FILE);
    <WeightRecorder as Recorder<B>>::record(&recorder, optimizer.to_record(), optimizer_path.clone())
        .map_err(|e| save_error(&optimizer_path, e))?;

    // Written last: its presence marks the checkpoint as complete
    write_json(&dir.join(METADATA_FILE), meta)
}

fn save_error(path: &Path, e: RecorderError) -> SummarizerError {
    SummarizerError::io(path, io::Error::new(io::ErrorKind::Other, format!("{e:?}")))
}

fn load_error(path: &Path, e: RecorderError) -> SummarizerError {
    SummarizerError::Format(format!("Cannot read '{}': {e:?}", path.display()))
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::batcher::{SummaryBatch, SummaryBatcher};
    use crate::data::dataset::SummarySample;
    use crate::infra::tokenizer_store::fit_word_level;
    use crate::ml::test_support::{tiny_summarizer, TestBackend};
    use burn::data::dataloader::batcher::Batcher;
    use tempfile::TempDir;

    fn batch(input: Vec<u32>, target: Vec<u32>) -> SummaryBatch<TestBackend> {
        SummaryBatcher::<TestBackend>::new(Default::default())
            .batch(vec![SummarySample::new(input, target)])
    }

    /// Summarizer after the single warm-up step `[[1,1,1]]` → `[[1,1,1]]`
    fn trained(encoder_trainable: bool, decoder_trainable: bool) -> Summarizer<TestBackend> {
        let mut s = tiny_summarizer(encoder_trainable, decoder_trainable);
        s.train_step(batch(vec![1, 1, 1], vec![1, 1, 1]), true).unwrap();
        s
    }

    fn assert_close(a: &[Vec<f32>], b: &[Vec<f32>], tol: f32) {
        assert_eq!(a.len(), b.len(), "different number of decoding steps");
        for (step_a, step_b) in a.iter().zip(b) {
            assert_eq!(step_a.len(), step_b.len());
            for (x, y) in step_a.iter().zip(step_b) {
                assert!((x - y).abs() <= tol, "logit {x} vs {y}");
            }
        }
    }

    /// Equivalence check: same outputs, same hyperparameters, every part present
    fn assert_equivalent(a: &Summarizer<TestBackend>, b: &Summarizer<TestBackend>, text: &str) {
        assert_eq!(a.lstm_size(), b.lstm_size());
        assert_eq!(a.max_prediction_len(), b.max_prediction_len());
        assert_eq!(a.config().embedding_size, b.config().embedding_size);
        assert_eq!(a.config().learning_rate, b.config().learning_rate);
        assert!(b.preprocessor().is_some());
        assert!(b.vectorizer().is_some());
        assert!(b.optimizer().is_some());
        assert_eq!(
            a.encoder().unwrap().embedding_trainable,
            b.encoder().unwrap().embedding_trainable
        );
        assert_eq!(
            a.decoder().unwrap().embedding_trainable,
            b.decoder().unwrap().embedding_trainable
        );

        let pred_a = a.predict_vectors(text, "").unwrap();
        let pred_b = b.predict_vectors(text, "").unwrap();
        assert_close(&pred_a.logits, &pred_b.logits, 1e-6);
        assert_eq!(pred_a.predicted_sequence, pred_b.predicted_sequence);
    }

    #[test]
    fn test_serde_happy_path() {
        let tmp = TempDir::new().unwrap();
        let summarizer = trained(true, false);

        let save_dir = tmp.path().join("summarizer_serde_happy_path");
        summarizer.save(&save_dir).unwrap();
        let loaded = Summarizer::<TestBackend>::load(&save_dir, &Default::default()).unwrap();

        assert_eq!(loaded.lstm_size(), 10);
        assert_eq!(loaded.max_prediction_len(), 10);
        assert!(loaded.preprocessor().is_some());
        assert!(loaded.vectorizer().is_some());
        assert!(loaded.encoder().is_some());
        assert!(loaded.decoder().is_some());
        assert!(loaded.encoder().unwrap().embedding_trainable);
        assert!(!loaded.decoder().unwrap().embedding_trainable);
        assert!(loaded.optimizer().is_some());
        assert_eq!(loaded.phase(), Phase::Ready);
        assert_eq!(loaded.train_steps(), 1);

        let pred = summarizer.predict_vectors("a c", "").unwrap();
        let pred_loaded = loaded.predict_vectors("a c", "").unwrap();
        assert_close(&pred.logits, &pred_loaded.logits, 1e-6);
    }

    #[test]
    fn test_trainable_flags_survive_every_combination() {
        let tmp = TempDir::new().unwrap();
        for (i, (enc, dec)) in [(true, true), (true, false), (false, true), (false, false)]
            .into_iter()
            .enumerate()
        {
            let summarizer = trained(enc, dec);
            let dir = tmp.path().join(format!("flags_{i}"));
            summarizer.save(&dir).unwrap();

            let loaded = Summarizer::<TestBackend>::load(&dir, &Default::default()).unwrap();
            assert_eq!(loaded.encoder().unwrap().embedding_trainable, enc);
            assert_eq!(loaded.decoder().unwrap().embedding_trainable, dec);
            assert_eq!(loaded.config().embedding_encoder_trainable, enc);
            assert_eq!(loaded.config().embedding_decoder_trainable, dec);
            assert_equivalent(&summarizer, &loaded, "a b c");
        }
    }

    #[test]
    fn test_loading_twice_gives_equivalent_models() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("ckpt");
        trained(true, true).save(&dir).unwrap();

        let first  = Summarizer::<TestBackend>::load(&dir, &Default::default()).unwrap();
        let second = Summarizer::<TestBackend>::load(&dir, &Default::default()).unwrap();
        assert_equivalent(&first, &second, "c b a c");
    }

    #[test]
    fn test_optimizer_state_is_restored() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("ckpt");
        let mut original = trained(true, true);
        original.train_step(batch(vec![5, 2, 4, 6], vec![5, 3, 6]), true).unwrap();
        original.save(&dir).unwrap();

        let mut loaded = Summarizer::<TestBackend>::load(&dir, &Default::default()).unwrap();
        assert_eq!(loaded.train_steps(), 2);

        // Adam's moments and step counters decide the next update, so the
        // loss of the step after it only agrees if they were restored
        original.train_step(batch(vec![5, 4, 6], vec![5, 2, 3, 6]), true).unwrap();
        loaded.train_step(batch(vec![5, 4, 6], vec![5, 2, 3, 6]), true).unwrap();
        let loss_a = original.evaluate(batch(vec![5, 2, 4, 6], vec![5, 3, 6])).unwrap();
        let loss_b = loaded.evaluate(batch(vec![5, 2, 4, 6], vec![5, 3, 6])).unwrap();
        assert!((loss_a - loss_b).abs() < 1e-5, "loss {loss_a} vs {loss_b}");

        let pred_a = original.predict_vectors("a c", "").unwrap();
        let pred_b = loaded.predict_vectors("a c", "").unwrap();
        assert_close(&pred_a.logits, &pred_b.logits, 1e-5);
    }

    #[test]
    fn test_save_before_training_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("untrained");
        let summarizer = tiny_summarizer(true, true);

        let err = summarizer.save(&dir).unwrap_err();
        assert!(matches!(err, SummarizerError::NotTrained));
        assert!(!dir.exists());
        assert_eq!(fs::read_dir(tmp.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_save_without_init_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let summarizer = Summarizer::<TestBackend>::new(SummarizerConfig::new(), Default::default());
        let err = summarizer.save(tmp.path().join("x")).unwrap_err();
        assert!(matches!(err, SummarizerError::NotInitialized));
    }

    #[test]
    fn test_save_overwrites_existing_checkpoint() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("ckpt");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("stale.txt"), "old").unwrap();

        let summarizer = trained(true, true);
        summarizer.save(&dir).unwrap();
        summarizer.save(&dir).unwrap();

        assert!(!dir.join("stale.txt").exists());
        assert!(CheckpointManager::new(&dir).exists());
        assert!(!tmp.path().join(".ckpt.partial").exists());
        assert!(!tmp.path().join(".ckpt.old").exists());
    }

    #[test]
    fn test_unwritable_parent_is_io_error() {
        let tmp = TempDir::new().unwrap();
        let blocker = tmp.path().join("blocker");
        fs::write(&blocker, "not a directory").unwrap();

        let err = trained(true, true).save(blocker.join("ckpt")).unwrap_err();
        assert!(matches!(err, SummarizerError::Io { .. }), "{err}");
        assert_eq!(fs::read_to_string(&blocker).unwrap(), "not a directory");
    }

    #[test]
    fn test_failed_commit_leaves_no_staging_directory() {
        let tmp = TempDir::new().unwrap();
        let target = tmp.path().join("ckpt");
        fs::write(&target, "a regular file").unwrap();

        let err = trained(true, true).save(&target).unwrap_err();
        assert!(matches!(err, SummarizerError::Io { .. }), "{err}");

        let names: Vec<String> = fs::read_dir(tmp.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["ckpt".to_string()]);
        assert_eq!(fs::read_to_string(&target).unwrap(), "a regular file");
    }

    #[test]
    fn test_missing_directory_is_not_found() {
        let tmp = TempDir::new().unwrap();
        let err = Summarizer::<TestBackend>::load(tmp.path().join("nope"), &Default::default())
            .err()
            .unwrap();
        assert!(matches!(err, SummarizerError::NotFound(_)));
    }

    #[test]
    fn test_incomplete_checkpoint_is_format_error() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("ckpt");
        trained(true, true).save(&dir).unwrap();
        fs::remove_file(dir.join(DECODER_FILE)).unwrap();

        let err = Summarizer::<TestBackend>::load(&dir, &Default::default()).err().unwrap();
        assert!(err.is_format(), "{err}");
    }

    #[test]
    fn test_missing_metadata_is_format_error() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("ckpt");
        trained(true, true).save(&dir).unwrap();
        fs::remove_file(dir.join(METADATA_FILE)).unwrap();

        assert!(!CheckpointManager::new(&dir).exists());
        let err = Summarizer::<TestBackend>::load(&dir, &Default::default()).err().unwrap();
        assert!(err.is_format());
    }

    #[test]
    fn test_inconsistent_vocabulary_size_is_format_error() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("ckpt");
        trained(true, true).save(&dir).unwrap();

        let path = dir.join(METADATA_FILE);
        let mut meta: CheckpointMeta = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        meta.encoding_dim += 3;
        fs::write(&path, serde_json::to_string(&meta).unwrap()).unwrap();

        let err = Summarizer::<TestBackend>::load(&dir, &Default::default()).err().unwrap();
        assert!(err.is_format());
    }

    #[test]
    fn test_weights_from_other_vocabulary_are_rejected() {
        let tmp = TempDir::new().unwrap();
        let small = tmp.path().join("small");
        let large = tmp.path().join("large");
        trained(true, true).save(&small).unwrap();

        // Same architecture, bigger encoder vocabulary
        let mut other = tiny_summarizer(true, true);
        let words = vec!["a b c d e f g h <start> <end>".to_string()];
        other.init_model(
            Preprocessor::new(),
            Vectorizer::new(fit_word_level(&words, None).unwrap(), fit_word_level(&words, None).unwrap()),
        );
        other.train_step(batch(vec![1, 1, 1], vec![1, 1, 1]), true).unwrap();
        other.save(&large).unwrap();

        fs::copy(large.join(ENCODER_FILE), small.join(ENCODER_FILE)).unwrap();
        let err = Summarizer::<TestBackend>::load(&small, &Default::default()).err().unwrap();
        assert!(err.is_format(), "{err}");
    }

    #[test]
    fn test_unsupported_format_version_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("ckpt");
        trained(true, true).save(&dir).unwrap();

        let path = dir.join(METADATA_FILE);
        let mut meta: CheckpointMeta = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        meta.format_version = FORMAT_VERSION + 1;
        fs::write(&path, serde_json::to_string(&meta).unwrap()).unwrap();

        assert!(Summarizer::<TestBackend>::load(&dir, &Default::default()).err().unwrap().is_format());
    }
}
