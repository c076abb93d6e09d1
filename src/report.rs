// src/report.rs
use serde::Serialize;
use std::fmt::Write as _;

use crate::core::{CountOutcome, FileReport, ScanOutcome};
use crate::error::Result;

#[derive(Debug, Serialize)]
struct Summary {
    files: usize,
    candidates: usize,
    valid: usize,
    invalid: usize,
}

/// Machine-readable check report
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CheckReport<'a> {
    summary: Summary,
    invalid_classes: &'a [String],
    valid_classes: &'a [String],
    /// Empty when context-aware scanning is off
    by_file: &'a [FileReport],
    warnings: &'a [String],
}

pub fn check_json(outcome: &ScanOutcome) -> Result<String> {
    let report = CheckReport {
        summary: Summary {
            files: outcome.by_file.as_ref().map_or(0, Vec::len),
            candidates: outcome.all_candidates.len(),
            valid: outcome.valid.len(),
            invalid: outcome.invalid.len(),
        },
        invalid_classes: &outcome.invalid,
        valid_classes: &outcome.valid,
        by_file: outcome.by_file.as_deref().unwrap_or_default(),
        warnings: &outcome.warnings,
    };
    Ok(serde_json::to_string_pretty(&report)?)
}

pub fn count_json(outcome: &CountOutcome) -> Result<String> {
    Ok(serde_json::to_string_pretty(outcome)?)
}

/// Human report: invalid classes grouped by file, then a one-line summary
pub fn check_human(outcome: &ScanOutcome) -> String {
    let mut out = String::new();

    match &outcome.by_file {
        Some(reports) => {
            for report in reports.iter().filter(|r| r.has_invalid()) {
                let _ = writeln!(out, "{}", report.file.display());
                for class in &report.invalid_classes {
                    let _ = writeln!(out, "  ✗ {}", class);
                }
                out.push('\n');
            }
        }
        None if outcome.has_invalid() => {
            for class in &outcome.invalid {
                let _ = writeln!(out, "  ✗ {}", class);
            }
            out.push('\n');
        }
        None => {}
    }

    for path in &outcome.skipped_files {
        let _ = writeln!(out, "⚠️  Skipped unreadable file {}", path.display());
    }

    if outcome.has_invalid() {
        let files = outcome
            .by_file
            .as_ref()
            .map(|reports| reports.iter().filter(|r| r.has_invalid()).count());
        let _ = match files {
            Some(files) => writeln!(
                out,
                "❌ Found {} invalid classes in {} files ({} candidates checked)",
                outcome.invalid.len(),
                files,
                outcome.all_candidates.len()
            ),
            None => writeln!(
                out,
                "❌ Found {} invalid classes ({} candidates checked)",
                outcome.invalid.len(),
                outcome.all_candidates.len()
            ),
        };
    } else {
        let _ = writeln!(out, "✅ All {} classes are valid", outcome.all_candidates.len());
    }

    out
}

pub fn count_human(outcome: &CountOutcome) -> String {
    let mut out = String::new();
    let validity = if outcome.is_valid { "valid" } else { "invalid" };

    let _ = writeln!(
        out,
        "{} ({}): {} occurrences in {} files",
        outcome.class_name, validity, outcome.total_occurrences, outcome.files_with_occurrences
    );
    for file in &outcome.files {
        let _ = writeln!(out, "\n{} ({})", file.file.display(), file.count);
        for occurrence in &file.occurrences {
            let _ = writeln!(out, "  {}:{}  {}", occurrence.line, occurrence.column, occurrence.context);
        }
    }

    out
}
