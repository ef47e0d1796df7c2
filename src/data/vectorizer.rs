// ============================================================
// Layer 4 — Vectorizer
// ============================================================
// Bidirectional text ↔ index mapping for both sides of the
// sequence-to-sequence model:
//   - encoder side: source text → input ids
//   - decoder side: summary text ↔ target ids
//
// The two sides own independent tokenizers. They may be clones
// of the same fitted tokenizer (shared vocabulary) or fitted on
// different corpora; either way each is persisted separately.

use serde::{Deserialize, Serialize};
use std::{fmt, path::Path};
use tokenizers::Tokenizer;

use crate::domain::traits::Persistable;
use crate::error::{Result, SummarizerError};
use crate::infra::files::{read_json, write_json};
use crate::infra::tokenizer_store::{TokenizerStore, PAD_INDEX, UNK_TOKEN};

pub const VECTORIZER_FILE: &str = "vectorizer.json";
pub const ENCODER_TOKENIZER: &str = "tokenizer_encoder";
pub const DECODER_TOKENIZER: &str = "tokenizer_decoder";

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
struct VectorizerSettings {
    max_input_len:  Option<usize>,
    max_output_len: Option<usize>,
}

#[derive(Clone)]
pub struct Vectorizer {
    encoder_tokenizer: Tokenizer,
    decoder_tokenizer: Tokenizer,
    max_input_len:     Option<usize>,
    max_output_len:    Option<usize>,
}

impl Vectorizer {
    pub fn new(encoder_tokenizer: Tokenizer, decoder_tokenizer: Tokenizer) -> Self {
        Self {
            encoder_tokenizer,
            decoder_tokenizer,
            max_input_len:  None,
            max_output_len: None,
        }
    }

    /// Truncate encoded inputs / outputs to at most these lengths
    pub fn with_max_lengths(mut self, max_input_len: Option<usize>, max_output_len: Option<usize>) -> Self {
        self.max_input_len  = max_input_len;
        self.max_output_len = max_output_len;
        self
    }

    /// Encoder vocabulary size, padding and OOV included
    pub fn encoding_dim(&self) -> usize {
        self.encoder_tokenizer.get_vocab_size(true)
    }

    /// Decoder vocabulary size, padding and OOV included
    pub fn decoding_dim(&self) -> usize {
        self.decoder_tokenizer.get_vocab_size(true)
    }

    pub fn max_input_len(&self) -> Option<usize> {
        self.max_input_len
    }

    pub fn max_output_len(&self) -> Option<usize> {
        self.max_output_len
    }

    pub fn encode_input(&self, text: &str) -> Result<Vec<u32>> {
        encode(&self.encoder_tokenizer, text, self.max_input_len)
    }

    pub fn encode_output(&self, text: &str) -> Result<Vec<u32>> {
        encode(&self.decoder_tokenizer, text, self.max_output_len)
    }

    pub fn encode_pair(&self, text: &str, summary: &str) -> Result<(Vec<u32>, Vec<u32>)> {
        Ok((self.encode_input(text)?, self.encode_output(summary)?))
    }

    /// Map decoder ids back to a space separated string, skipping padding
    pub fn decode_output(&self, ids: &[u32]) -> String {
        ids.iter()
            .filter(|&&id| id != PAD_INDEX)
            .map(|&id| {
                self.decoder_tokenizer
                    .id_to_token(id)
                    .unwrap_or_else(|| UNK_TOKEN.to_string())
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Decoder-side index of a token such as the start or end token
    pub fn decoder_token_id(&self, token: &str) -> Result<u32> {
        self.decoder_tokenizer.token_to_id(token).ok_or_else(|| {
            SummarizerError::InvalidInput(format!("Token '{token}' is not in the decoder vocabulary"))
        })
    }
}

fn encode(tokenizer: &Tokenizer, text: &str, max_len: Option<usize>) -> Result<Vec<u32>> {
    let encoding = tokenizer
        .encode(text, false)
        .map_err(|e| SummarizerError::Tokenizer(format!("Cannot encode '{text}': {e}")))?;
    let mut ids = encoding.get_ids().to_vec();
    if let Some(max_len) = max_len {
        ids.truncate(max_len);
    }
    Ok(ids)
}

impl fmt::Debug for Vectorizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Vectorizer")
            .field("encoding_dim", &self.encoding_dim())
            .field("decoding_dim", &self.decoding_dim())
            .field("max_input_len", &self.max_input_len)
            .field("max_output_len", &self.max_output_len)
            .finish()
    }
}

impl Persistable for Vectorizer {
    fn save(&self, dir: &Path) -> Result<()> {
        let store = TokenizerStore::new(dir);
        store.save(ENCODER_TOKENIZER, &self.encoder_tokenizer)?;
        store.save(DECODER_TOKENIZER, &self.decoder_tokenizer)?;
        let settings = VectorizerSettings {
            max_input_len:  self.max_input_len,
            max_output_len: self.max_output_len,
        };
        write_json(&dir.join(VECTORIZER_FILE), &settings)
    }

    fn load(dir: &Path) -> Result<Self> {
        let store = TokenizerStore::new(dir);
        let settings: VectorizerSettings = read_json(&dir.join(VECTORIZER_FILE))?;
        let vectorizer = Vectorizer::new(store.load(ENCODER_TOKENIZER)?, store.load(DECODER_TOKENIZER)?)
            .with_max_lengths(settings.max_input_len, settings.max_output_len);
        Ok(vectorizer)
    }
}
