// src/core/validation.rs
use std::collections::BTreeSet;
use tracing::debug;

use super::design_system::ClassOracle;

/// Classes that are valid hooks but generate no declarations on their own
pub const MARKER_CLASSES: &[&str] = &["group", "peer"];

/// Disjoint valid / invalid partitions of the trusted candidates
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValiditySets {
    pub valid: BTreeSet<String>,
    pub invalid: BTreeSet<String>,
}

impl ValiditySets {
    pub fn is_valid(&self, candidate: &str) -> bool {
        self.valid.contains(candidate)
    }

    pub fn is_invalid(&self, candidate: &str) -> bool {
        self.invalid.contains(candidate)
    }
}

/// Decides validity, consulting the oracle only for non-marker tokens
pub struct Validator<'a> {
    oracle: &'a dyn ClassOracle,
    extra_markers: &'a [String],
}

impl<'a> Validator<'a> {
    pub fn new(oracle: &'a dyn ClassOracle, extra_markers: &'a [String]) -> Self {
        Self { oracle, extra_markers }
    }

    /// `group`, `peer` and their named forms (`group/sidebar`)
    pub fn is_marker(&self, candidate: &str) -> bool {
        let base = match candidate.split_once('/') {
            Some((base, name)) if !name.is_empty() => base,
            Some(_) => return false,
            None => candidate,
        };
        MARKER_CLASSES.contains(&base) || self.extra_markers.iter().any(|m| m == candidate)
    }

    pub fn check(&self, candidate: &str) -> bool {
        self.is_marker(candidate) || self.oracle.is_valid(candidate)
    }

    /// Partition `trusted`. Each distinct string reaches the oracle once.
    pub fn classify(&self, trusted: &[String]) -> ValiditySets {
        let distinct: BTreeSet<&str> = trusted.iter().map(String::as_str).collect();
        let mut sets = ValiditySets::default();

        for candidate in distinct {
            if self.check(candidate) {
                sets.valid.insert(candidate.to_string());
            } else {
                sets.invalid.insert(candidate.to_string());
            }
        }

        debug!(
            "Classified {} distinct candidates: {} valid, {} invalid",
            sets.valid.len() + sets.invalid.len(),
            sets.valid.len(),
            sets.invalid.len()
        );
        sets
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Mutex;
    use crate::core::design_system::{OutputRule, ParsedCandidate};

    /// Accepts a fixed list and records every lookup
    struct FixedOracle {
        known: HashSet<&'static str>,
        calls: Mutex<Vec<String>>,
    }

    impl FixedOracle {
        fn new(known: &[&'static str]) -> Self {
            Self { known: known.iter().copied().collect(), calls: Mutex::new(Vec::new()) }
        }
    }

    impl ClassOracle for FixedOracle {
        fn parse(&self, _candidate: &str) -> Vec<ParsedCandidate> {
            Vec::new()
        }

        fn compile(&self, _parsed: &ParsedCandidate) -> Vec<OutputRule> {
            Vec::new()
        }

        fn is_valid(&self, candidate: &str) -> bool {
            self.calls.lock().unwrap().push(candidate.to_string());
            self.known.contains(candidate)
        }
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_markers_valid_without_oracle() {
        let oracle = FixedOracle::new(&[]);
        let validator = Validator::new(&oracle, &[]);
        let sets = validator.classify(&strings(&["group", "peer", "group/card", "peer/input"]));

        assert_eq!(sets.valid.len(), 4);
        assert!(sets.invalid.is_empty());
        assert!(oracle.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_malformed_named_marker_goes_to_oracle() {
        let oracle = FixedOracle::new(&[]);
        let validator = Validator::new(&oracle, &[]);
        assert!(!validator.check("group/"));
        assert!(!validator.check("groups"));
    }

    #[test]
    fn test_oracle_called_once_per_distinct_candidate() {
        let oracle = FixedOracle::new(&["flex"]);
        let validator = Validator::new(&oracle, &[]);
        let sets = validator.classify(&strings(&["flex", "bogus", "flex", "bogus", "flex"]));

        let mut calls = oracle.calls.lock().unwrap().clone();
        calls.sort();
        assert_eq!(calls, strings(&["bogus", "flex"]));
        assert!(sets.is_valid("flex"));
        assert!(sets.is_invalid("bogus"));
    }

    #[test]
    fn test_every_candidate_classified_exactly_once() {
        let oracle = FixedOracle::new(&["a", "c"]);
        let extra = strings(&["js-hook"]);
        let validator = Validator::new(&oracle, &extra);
        let trusted = strings(&["a", "b", "c", "js-hook", "group"]);
        let sets = validator.classify(&trusted);

        for candidate in &trusted {
            assert!(sets.is_valid(candidate) ^ sets.is_invalid(candidate), "{candidate}");
        }
        assert!(sets.valid.is_disjoint(&sets.invalid));
    }
}
