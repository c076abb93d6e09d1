// src/core/aggregator.rs
use std::path::PathBuf;
use serde::Serialize;

use super::classifier::FileTokenSet;
use super::validation::ValiditySets;

/// Per-file breakdown of classified tokens
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileReport {
    pub file: PathBuf,
    pub candidates: Vec<String>,
    pub valid_classes: Vec<String>,
    pub invalid_classes: Vec<String>,
}

impl FileReport {
    pub fn has_invalid(&self) -> bool {
        !self.invalid_classes.is_empty()
    }
}

/// Fold file token sets into reports, keeping input order.
///
/// Tokens that were never classified (they were not trusted candidates) are
/// left out, so `valid_classes ∪ invalid_classes == candidates` for every
/// report. Files left with no classified token are dropped.
pub fn aggregate(by_file: &[FileTokenSet], sets: &ValiditySets) -> Vec<FileReport> {
    let mut reports = Vec::new();

    for entry in by_file {
        let mut report = FileReport {
            file: entry.path.clone(),
            candidates: Vec::new(),
            valid_classes: Vec::new(),
            invalid_classes: Vec::new(),
        };

        for token in &entry.tokens {
            if sets.is_valid(token) {
                report.valid_classes.push(token.clone());
            } else if sets.is_invalid(token) {
                report.invalid_classes.push(token.clone());
            } else {
                continue;
            }
            report.candidates.push(token.clone());
        }

        if !report.candidates.is_empty() {
            reports.push(report);
        }
    }

    reports
}
