// ============================================================
// Layer 3 — SummaryPair Domain Type
// ============================================================
// One training example for abstractive summarization:
//   - the full source text
//   - the reference summary (headline) for that text
//
// Unlike extractive approaches, the summary does not have to
// appear verbatim in the text. The decoder generates it token
// by token from the target vocabulary.
//
// Example:
//   text:    "The central bank raised interest rates by 0.5 points"
//   summary: "Rates go up"

use serde::{Deserialize, Serialize};

/// A (text, summary) pair before any preprocessing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryPair {
    /// The text to be summarized
    pub text: String,

    /// The reference summary
    pub summary: String,
}

impl SummaryPair {
    pub fn new(text: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            text:    text.into(),
            summary: summary.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_accepts_str_and_string() {
        let pair = SummaryPair::new("the bank raised rates", String::from("rates up"));
        assert_eq!(pair.text, "the bank raised rates");
        assert_eq!(pair.summary, "rates up");
    }
}
