// ============================================================
// Layer 4 — Text Preprocessor
// ============================================================
// Turns raw (text, summary) pairs into the normalised token
// strings the vectorizer expects, and defines the special
// start / end tokens the decoder is trained to emit.
//
// Processing steps (applied in order):
//   1. clean(): normalise whitespace and control characters
//   2. lowercase (optional)
//   3. drop filtered characters, pad punctuation with spaces
//   4. replace digits with '#' (optional)
//   5. collapse whitespace
//   6. wrap with <start> ... <end>
//      - targets always, inputs only if add_input_start_end
//
// The preprocessor is part of every checkpoint: a model trained
// with one set of special tokens cannot be decoded with another.
//
// Reference: Rust Book §8 (Strings in Rust)
//            Rust Book §13 (Iterators)

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::domain::traits::Persistable;
use crate::error::Result;
use crate::infra::files::{read_json, write_json};

pub const PREPROCESSOR_FILE: &str = "preprocessor.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preprocessor {
    pub start_token:         String,
    pub end_token:           String,
    pub lower_case:          bool,
    pub hash_numbers:        bool,
    pub add_input_start_end: bool,
    /// Characters split off into their own token
    pub punctuation:         String,
    /// Characters removed from the text
    pub filter:              String,
}

impl Default for Preprocessor {
    fn default() -> Self {
        Self {
            start_token:         "<start>".to_string(),
            end_token:           "<end>".to_string(),
            lower_case:          true,
            hash_numbers:        true,
            add_input_start_end: true,
            punctuation:         "!.?,".to_string(),
            filter:              "\"$%&()*+/:;<=>@[\\]^_`{|}~".to_string(),
        }
    }
}

impl Preprocessor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tokens(start_token: impl Into<String>, end_token: impl Into<String>) -> Self {
        Self {
            start_token: start_token.into(),
            end_token:   end_token.into(),
            ..Self::default()
        }
    }

    /// Preprocess a (text, summary) pair
    pub fn process_pair(&self, text: &str, summary: &str) -> (String, String) {
        (self.process_input(text), self.process_target(summary))
    }

    /// Encoder-side text
    pub fn process_input(&self, text: &str) -> String {
        let body = self.normalize(text);
        if self.add_input_start_end {
            self.wrap(&body)
        } else {
            body
        }
    }

    /// Decoder-side text, always wrapped with start/end tokens
    pub fn process_target(&self, text: &str) -> String {
        let body = self.normalize(text);
        self.wrap(&body)
    }

    fn wrap(&self, body: &str) -> String {
        if body.is_empty() {
            format!("{} {}", self.start_token, self.end_token)
        } else {
            format!("{} {} {}", self.start_token, body, self.end_token)
        }
    }

    fn normalize(&self, text: &str) -> String {
        let cleaned = self.clean(text);
        let cleaned = if self.lower_case { cleaned.to_lowercase() } else { cleaned };

        let mut out = String::with_capacity(cleaned.len());
        for c in cleaned.chars() {
            if self.filter.contains(c) {
                out.push(' ');
            } else if self.punctuation.contains(c) {
                out.push(' ');
                out.push(c);
                out.push(' ');
            } else if self.hash_numbers && c.is_ascii_digit() {
                out.push('#');
            } else {
                out.push(c);
            }
        }

        out.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    /// Clean a raw text string for downstream tokenisation.
    pub fn clean(&self, text: &str) -> String {

        // ── Step 1: Normalise individual characters ───────────────────────────
        let step1: String = text
            .chars()
            .map(|c| match c {
                '\t' => ' ',
                // Non-breaking space
                '\u{00A0}' => ' ',
                // Zero-width space
                '\u{200B}' => ' ',
                // Byte order mark
                '\u{FEFF}' => ' ',
                '\r' => '\n',
                c if c.is_control() && c != '\n' => ' ',
                c => c,
            })
            .collect();

        // ── Step 2: Collapse spaces per line ─────────────────────────────────
        let step2: String = step1
            .lines()
            .map(|line| {
                let mut out        = String::with_capacity(line.len());
                let mut last_space = false;

                for c in line.chars() {
                    if c == ' ' {
                        if !last_space {
                            out.push(' ');
                        }
                        last_space = true;
                    } else {
                        out.push(c);
                        last_space = false;
                    }
                }

                out.trim().to_string()
            })
            .collect::<Vec<_>>()
            .join("\n");

        // ── Step 3: Collapse excessive blank lines ────────────────────────────
        let mut result        = String::with_capacity(step2.len());
        let mut newline_count = 0usize;

        for c in step2.chars() {
            if c == '\n' {
                newline_count += 1;
                if newline_count <= 2 {
                    result.push(c);
                }
            } else {
                newline_count = 0;
                result.push(c);
            }
        }

        result.trim().to_string()
    }
}

impl Persistable for Preprocessor {
    fn save(&self, dir: &Path) -> Result<()> {
        write_json(&dir.join(PREPROCESSOR_FILE), self)
    }

    fn load(dir: &Path) -> Result<Self> {
        read_json(&dir.join(PREPROCESSOR_FILE))
    }
}
