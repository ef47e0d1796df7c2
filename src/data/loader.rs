// ============================================================
// Layer 4 — Pair Loader
// ============================================================
// Loads (text, summary) pairs from a tab separated file:
//
//   <text>\t<summary>
//
// One pair per line. Blank lines are ignored, and lines without
// a tab (or with an empty side) are skipped with a warning so
// one bad line does not abort a training run.

use std::{fs, path::PathBuf};

use crate::domain::summary_pair::SummaryPair;
use crate::domain::traits::PairSource;
use crate::error::{Result, SummarizerError};

pub struct TsvPairLoader {
    path: PathBuf,
}

impl TsvPairLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl PairSource for TsvPairLoader {
    fn load_all(&self) -> Result<Vec<SummaryPair>> {
        if !self.path.exists() {
            return Err(SummarizerError::NotFound(self.path.clone()));
        }
        let content = fs::read_to_string(&self.path)
            .map_err(|e| SummarizerError::io(&self.path, e))?;

        let pairs = parse_pairs(&content);
        tracing::info!("Loaded {} pairs from '{}'", pairs.len(), self.path.display());
        Ok(pairs)
    }
}

fn parse_pairs(content: &str) -> Vec<SummaryPair> {
    let mut pairs = Vec::new();
    for (line_no, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match line.split_once('\t') {
            Some((text, summary)) if !text.trim().is_empty() && !summary.trim().is_empty() => {
                pairs.push(SummaryPair::new(text.trim(), summary.trim()));
            }
            _ => tracing::warn!("Skipping malformed line {}", line_no + 1),
        }
    }
    pairs
}
