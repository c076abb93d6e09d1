// src/core/filter.rs
use std::collections::HashSet;

use super::classifier::FileTokenSet;

/// Result of intersecting the pre-scanner output with context extraction
#[derive(Debug, Clone, Default)]
pub struct FilteredCandidates {
    /// Raw candidates that also appeared in some recognised context
    pub trusted: Vec<String>,
    /// Files that contributed at least one token
    pub by_file: Vec<FileTokenSet>,
}

/// Keep only raw candidates seen inside a recognised context.
///
/// Nothing is invented: `trusted` is a subsequence of `raw` and `by_file`
/// is a subset of `file_sets`.
pub fn filter_candidates(raw: &[String], file_sets: Vec<FileTokenSet>) -> FilteredCandidates {
    let universe: HashSet<&str> = file_sets
        .iter()
        .flat_map(|set| set.tokens.iter().map(String::as_str))
        .collect();

    let trusted = raw
        .iter()
        .filter(|candidate| universe.contains(candidate.as_str()))
        .cloned()
        .collect();

    let by_file = file_sets.into_iter().filter(|set| !set.tokens.is_empty()).collect();

    FilteredCandidates { trusted, by_file }
}
