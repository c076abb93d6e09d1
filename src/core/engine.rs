// src/core/engine.rs
use anyhow::{bail, Context as _, Result};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

use crate::config::Config;
use super::aggregator::{aggregate, FileReport};
use super::classifier::extract_files;
use super::contexts::{ContextRuleSet, EnabledContexts};
use super::design_system::{CssSource, DesignSystemLoader};
use super::filter::filter_candidates;
use super::locator::{locate, Occurrence};
use super::scanner::{CandidateSource, GlobScanner, SourceEntry};
use super::validation::Validator;
use super::workers::map_files;

/// Inputs of one validation scan
#[derive(Debug, Clone)]
pub struct ScanRequest {
    pub patterns: Vec<String>,
    pub css: Option<CssSource>,
    pub contexts: EnabledContexts,
    /// When false the raw pre-scanner output is validated unfiltered
    pub context_aware: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ScanOutcome {
    /// Trusted candidates, sorted and unique
    pub all_candidates: Vec<String>,
    pub valid: Vec<String>,
    pub invalid: Vec<String>,
    /// Per-file breakdown, absent when context-aware scanning is off
    pub by_file: Option<Vec<FileReport>>,
    /// Files listed by the pre-scanner that could not be read
    pub skipped_files: Vec<PathBuf>,
    /// Design system diagnostics
    pub warnings: Vec<String>,
}

impl ScanOutcome {
    pub fn has_invalid(&self) -> bool {
        !self.invalid.is_empty()
    }
}

/// Inputs of one occurrence count
#[derive(Debug, Clone)]
pub struct CountRequest {
    pub patterns: Vec<String>,
    pub class_name: String,
    pub css: Option<CssSource>,
    pub contexts: EnabledContexts,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileOccurrences {
    pub file: PathBuf,
    pub count: usize,
    pub occurrences: Vec<Occurrence>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CountOutcome {
    pub class_name: String,
    pub is_valid: bool,
    pub total_occurrences: usize,
    pub files_with_occurrences: usize,
    pub files: Vec<FileOccurrences>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// Main orchestration engine: pre-scan, classify, filter, validate, aggregate
pub struct Engine {
    config: Config,
    source: Box<dyn CandidateSource>,
}

impl Engine {
    /// Create an engine backed by the file system scanner
    pub fn new(config: Config) -> Self {
        debug!("Using configuration: {:?}", config);
        let source = Box::new(GlobScanner::new(config.scan.concurrency));
        Self::with_source(config, source)
    }

    pub fn with_source(config: Config, source: Box<dyn CandidateSource>) -> Self {
        Self { config, source }
    }

    /// A scan request seeded from the configuration file
    pub fn scan_request(&self, patterns: Vec<String>) -> ScanRequest {
        ScanRequest {
            patterns,
            css: self.config.css.clone().map(CssSource::Path),
            contexts: self.config.contexts,
            context_aware: self.config.scan.context_aware,
        }
    }

    /// A count request seeded from the configuration file
    pub fn count_request(&self, patterns: Vec<String>, class_name: String) -> CountRequest {
        CountRequest {
            patterns,
            class_name,
            css: self.config.css.clone().map(CssSource::Path),
            contexts: self.config.contexts,
        }
    }

    pub async fn scan(&self, request: ScanRequest) -> Result<ScanOutcome> {
        let css = check_css(request.css)?;
        let entries = parse_entries(&request.patterns)?;
        let loader = DesignSystemLoader::new(css);
        let system = loader.load().await?;

        info!("🔍 Scanning {} source patterns", entries.len());
        let raw = self.source.scan(&entries).await.context("Pre-scan failed")?;
        debug!("Pre-scanner produced {} raw candidates", raw.len());

        let mut outcome = ScanOutcome {
            warnings: system.warnings().to_vec(),
            ..ScanOutcome::default()
        };

        let (trusted, file_sets) = if request.context_aware {
            let files = self.source.files(&entries).await.context("Listing source files failed")?;
            let rules = Arc::new(ContextRuleSet::new(&request.contexts)?);
            debug!(
                "Classifying {} files with {} context rules ({})",
                files.len(),
                rules.len(),
                request.contexts.enabled_names().join(", ")
            );

            let extractions = extract_files(&files, rules, self.config.scan.concurrency).await;
            outcome.skipped_files = extractions.iter().filter(|e| e.is_skipped()).map(|e| e.path.clone()).collect();
            let filtered = filter_candidates(&raw, extractions.iter().filter_map(|e| e.token_set()).collect());
            (filtered.trusted, Some(filtered.by_file))
        } else {
            debug!("Context-aware scanning disabled, validating raw candidates");
            (raw, None)
        };

        let validator = Validator::new(&*system, &self.config.validation.extra_markers);
        let sets = validator.classify(&trusted);

        outcome.by_file = file_sets.map(|file_sets| aggregate(&file_sets, &sets));
        outcome.all_candidates = trusted;
        outcome.valid = sets.valid.into_iter().collect();
        outcome.invalid = sets.invalid.into_iter().collect();

        info!(
            "📊 {} candidates: {} valid, {} invalid",
            outcome.all_candidates.len(),
            outcome.valid.len(),
            outcome.invalid.len()
        );
        Ok(outcome)
    }

    pub async fn count(&self, request: CountRequest) -> Result<CountOutcome> {
        if request.class_name.trim().is_empty() {
            bail!("No class name given to count");
        }
        let css = check_css(request.css)?;
        let entries = parse_entries(&request.patterns)?;
        let loader = DesignSystemLoader::new(css);
        let system = loader.load().await?;

        let validator = Validator::new(&*system, &self.config.validation.extra_markers);
        let is_valid = validator.check(&request.class_name);

        let files = self.source.files(&entries).await.context("Listing source files failed")?;
        info!("🔎 Counting {} across {} files", request.class_name, files.len());

        let rules = Arc::new(ContextRuleSet::new(&request.contexts)?);
        let target = request.class_name.clone();
        let located = map_files(&files, self.config.scan.concurrency, move |_, text| {
            locate(&text, &target, &rules)
        })
        .await;

        let files: Vec<FileOccurrences> = located
            .into_iter()
            .filter_map(|(file, result)| {
                let occurrences = result.ok()?;
                (!occurrences.is_empty()).then(|| FileOccurrences { file, count: occurrences.len(), occurrences })
            })
            .collect();

        Ok(CountOutcome {
            class_name: request.class_name,
            is_valid,
            total_occurrences: files.iter().map(|f| f.count).sum(),
            files_with_occurrences: files.len(),
            files,
            warnings: system.warnings().to_vec(),
        })
    }
}

/// Configuration errors are raised before any file is touched
fn check_css(css: Option<CssSource>) -> Result<CssSource> {
    let Some(css) = css else {
        bail!("No CSS configuration given: pass --path or set `css` in twlint.toml");
    };
    if let CssSource::Path(path) = &css {
        if !path.is_file() {
            bail!("CSS configuration {} does not exist", path.display());
        }
    }
    Ok(css)
}

fn parse_entries(patterns: &[String]) -> Result<Vec<SourceEntry>> {
    if patterns.is_empty() {
        bail!("No files given to scan");
    }
    if patterns.iter().all(|p| p.starts_with('!')) {
        bail!("Only negated patterns given; nothing to scan");
    }
    patterns
        .iter()
        .map(|p| SourceEntry::parse(p).with_context(|| format!("Invalid file pattern {}", p)))
        .collect()
}
