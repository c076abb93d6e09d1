// src/core/classifier.rs
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;
use serde::Serialize;
use tracing::debug;

use super::contexts::ContextRuleSet;
use super::workers::map_files;

/// Tokens found in one file under the enabled context rules
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileTokenSet {
    pub path: PathBuf,
    pub tokens: BTreeSet<String>,
}

/// What happened to one file during classification
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    /// The file was read; the set may be empty
    Extracted(BTreeSet<String>),
    /// The file could not be read and contributes nothing
    Skipped { reason: String },
}

#[derive(Debug, Clone)]
pub struct FileExtraction {
    pub path: PathBuf,
    pub outcome: FileOutcome,
}

impl FileExtraction {
    /// The token set, if the file was processed
    pub fn token_set(&self) -> Option<FileTokenSet> {
        match &self.outcome {
            FileOutcome::Extracted(tokens) => Some(FileTokenSet {
                path: self.path.clone(),
                tokens: tokens.clone(),
            }),
            FileOutcome::Skipped { .. } => None,
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self.outcome, FileOutcome::Skipped { .. })
    }
}

/// Union of the tokens every rule in `rules` accepts in `text`
pub fn extract(text: &str, rules: &ContextRuleSet) -> BTreeSet<String> {
    let mut tokens = BTreeSet::new();

    for rule in rules.iter() {
        for (_, token) in rule.tokens(text) {
            if !tokens.contains(token) {
                tokens.insert(token.to_string());
            }
        }
    }

    tokens
}

/// Classify many files concurrently. Output order follows `paths`.
pub async fn extract_files(paths: &[PathBuf], rules: Arc<ContextRuleSet>, concurrency: usize) -> Vec<FileExtraction> {
    if rules.is_empty() {
        debug!("No context rules enabled; every file yields an empty token set");
    }

    let results = map_files(paths, concurrency, move |_, content| extract(&content, &rules)).await;

    results
        .into_iter()
        .map(|(path, result)| FileExtraction {
            path,
            outcome: match result {
                Ok(tokens) => FileOutcome::Extracted(tokens),
                Err(e) => FileOutcome::Skipped { reason: e.to_string() },
            },
        })
        .collect()
}
