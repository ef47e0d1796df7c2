// ============================================================
// Layer 6 — Tokenizer Store
// ============================================================
// Fits word-level vocabularies and persists them.
//
// The vocabulary is written straight into a HuggingFace tokenizer
// JSON document and loaded with Tokenizer::from_str, which keeps
// us clear of the trainer/ModelWrapper type juggling in
// tokenizers 0.15.
//
// Index layout (shared by the encoder and decoder sides):
//   0      <pad>   padding, ignored by the loss
//   1      <unk>   any word not seen while fitting
//   2..    words by descending frequency, ties by first appearance
//
// Words are split on whitespace only, so special tokens such as
// "<start>" survive as single vocabulary entries.

use std::{collections::HashMap, fs, path::PathBuf, str::FromStr};
use tokenizers::Tokenizer;

use crate::error::{Result, SummarizerError};
use crate::infra::files::require_component;

pub const PAD_TOKEN: &str = "<pad>";
pub const UNK_TOKEN: &str = "<unk>";
pub const PAD_INDEX: u32 = 0;
pub const UNK_INDEX: u32 = 1;

/// Reads and writes named tokenizer files inside one directory.
pub struct TokenizerStore {
    dir: PathBuf,
}

impl TokenizerStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.json"))
    }

    /// Save `tokenizer` as `{dir}/{name}.json`
    pub fn save(&self, name: &str, tokenizer: &Tokenizer) -> Result<()> {
        let path = self.path(name);
        let json = tokenizer
            .to_string(true)
            .map_err(|e| SummarizerError::Tokenizer(format!("Cannot serialise '{name}': {e}")))?;
        fs::write(&path, json).map_err(|e| SummarizerError::io(&path, e))?;
        tracing::debug!("Saved tokenizer to '{}'", path.display());
        Ok(())
    }

    /// Load a previously saved tokenizer
    pub fn load(&self, name: &str) -> Result<Tokenizer> {
        let path = self.path(name);
        require_component(&path)?;
        Tokenizer::from_file(&path).map_err(|e| {
            SummarizerError::Format(format!("Cannot load tokenizer '{}': {e}", path.display()))
        })
    }
}

/// Build a word-level tokenizer from already-preprocessed texts.
///
/// `max_words` caps the number of fitted words (padding and OOV
/// entries are not counted against it).
pub fn fit_word_level(texts: &[String], max_words: Option<usize>) -> Result<Tokenizer> {
    // ── Step 1: Count words, remembering first appearance ─────────────────────
    let mut freq: HashMap<String, (usize, usize)> = HashMap::new();
    let mut seen = 0usize;

    for text in texts {
        for word in text.split_whitespace() {
            let w = word.to_lowercase();
            if w == PAD_TOKEN || w == UNK_TOKEN {
                continue;
            }
            let entry = freq.entry(w).or_insert_with(|| {
                seen += 1;
                (0, seen)
            });
            entry.0 += 1;
        }
    }

    let mut words: Vec<(String, (usize, usize))> = freq.into_iter().collect();
    words.sort_by(|(_, (freq_a, first_a)), (_, (freq_b, first_b))| {
        freq_b.cmp(freq_a).then(first_a.cmp(first_b))
    });
    if let Some(max_words) = max_words {
        words.truncate(max_words);
    }

    // ── Step 2: Build vocab JSON ──────────────────────────────────────────────
    let mut vocab = serde_json::Map::new();
    vocab.insert(PAD_TOKEN.to_string(), serde_json::json!(PAD_INDEX));
    vocab.insert(UNK_TOKEN.to_string(), serde_json::json!(UNK_INDEX));
    for (id, (word, _)) in words.iter().enumerate() {
        vocab.insert(word.clone(), serde_json::json!(id as u32 + 2));
    }
    let vocab_len = vocab.len();

    // ── Step 3: Tokenizer JSON in HuggingFace format ─────────────────────────
    let tokenizer_json = serde_json::json!({
        "version": "1.0",
        "truncation": null,
        "padding": null,
        "added_tokens": [],
        "normalizer": { "type": "Lowercase" },
        "pre_tokenizer": { "type": "WhitespaceSplit" },
        "post_processor": null,
        "decoder": null,
        "model": {
            "type": "WordLevel",
            "vocab": vocab,
            "unk_token": UNK_TOKEN
        }
    });

    let tokenizer = Tokenizer::from_str(&tokenizer_json.to_string())
        .map_err(|e| SummarizerError::Tokenizer(format!("Cannot build tokenizer: {e}")))?;

    tracing::info!("Fitted word-level vocabulary with {} entries", vocab_len);
    Ok(tokenizer)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn ids(tokenizer: &Tokenizer, text: &str) -> Vec<u32> {
        tokenizer.encode(text, false).unwrap().get_ids().to_vec()
    }

    #[test]
    fn test_frequency_then_first_appearance_order() {
        let texts = vec!["b a c".to_string(), "a c".to_string()];
        let tok = fit_word_level(&texts, None).unwrap();
        // a and c appear twice (a first), b once
        assert_eq!(tok.token_to_id("a"), Some(2));
        assert_eq!(tok.token_to_id("c"), Some(3));
        assert_eq!(tok.token_to_id("b"), Some(4));
        assert_eq!(tok.get_vocab_size(true), 5);
    }

    #[test]
    fn test_special_tokens_are_single_words() {
        let texts = vec!["a b c <start> <end>".to_string()];
        let tok = fit_word_level(&texts, None).unwrap();
        assert_eq!(ids(&tok, "<start> a c <end>"), vec![5, 2, 4, 6]);
    }

    #[test]
    fn test_unknown_words_map_to_oov() {
        let texts = vec!["a b".to_string()];
        let tok = fit_word_level(&texts, None).unwrap();
        assert_eq!(ids(&tok, "a zebra"), vec![2, UNK_INDEX]);
    }

    #[test]
    fn test_max_words_truncates_rare_words() {
        let texts = vec!["a a b".to_string()];
        let tok = fit_word_level(&texts, Some(1)).unwrap();
        assert_eq!(tok.get_vocab_size(true), 3);
        assert_eq!(tok.token_to_id("b"), None);
    }

    #[test]
    fn test_store_round_trip_keeps_ids() {
        let dir = tempfile::tempdir().unwrap();
        let store = TokenizerStore::new(dir.path());
        let tok = fit_word_level(&["x y z".to_string()], None).unwrap();
        store.save("side", &tok).unwrap();

        let loaded = store.load("side").unwrap();
        assert_eq!(ids(&loaded, "z y x q"), ids(&tok, "z y x q"));
    }

    #[test]
    fn test_missing_tokenizer_is_format_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = TokenizerStore::new(dir.path());
        assert!(store.load("absent").unwrap_err().is_format());
    }
}
