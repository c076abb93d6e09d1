// src/core/scanner.rs
use async_trait::async_trait;
use ignore::overrides::OverrideBuilder;
use ignore::WalkBuilder;
use std::collections::BTreeSet;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info};

use super::workers::map_files;
use crate::error::{Result, TwlintError};

const GLOB_CHARS: &[char] = &['*', '?', '[', '{'];

/// Characters a class name cannot contain; raw text is cut on them
const SEPARATORS: &[char] = &['"', '\'', '`', '<', '>', '{', '}', ';', '=', ','];

/// One file argument: a base directory and a glob anchored to it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceEntry {
    pub base: PathBuf,
    pub pattern: String,
    pub negated: bool,
}

impl SourceEntry {
    /// Parse `src/**/*.tsx`, `!src/gen/**`, `~/site`, a directory or a file
    pub fn parse(arg: &str) -> Result<Self> {
        let (negated, raw) = match arg.strip_prefix('!') {
            Some(rest) => (true, rest),
            None => (false, arg),
        };
        if raw.trim().is_empty() {
            return Err(TwlintError::InvalidSource {
                pattern: arg.to_string(),
                reason: "empty pattern".to_string(),
            });
        }

        let path = expand_tilde(raw)?;
        let components: Vec<String> = path
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();

        match components.iter().position(|c| c.contains(GLOB_CHARS)) {
            Some(first_glob) => {
                let base: PathBuf = components[..first_glob].iter().collect();
                Ok(Self {
                    base: if base.as_os_str().is_empty() { PathBuf::from(".") } else { base },
                    pattern: components[first_glob..].join("/"),
                    negated,
                })
            }
            None if path.is_dir() => Ok(Self { base: path, pattern: "**/*".to_string(), negated }),
            None => {
                let name = path.file_name().ok_or_else(|| TwlintError::InvalidSource {
                    pattern: arg.to_string(),
                    reason: "not a file, directory or glob".to_string(),
                })?;
                let base = match path.parent() {
                    Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
                    _ => PathBuf::from("."),
                };
                Ok(Self { base, pattern: name.to_string_lossy().into_owned(), negated })
            }
        }
    }

    fn is_literal(&self) -> bool {
        !self.pattern.contains(GLOB_CHARS)
    }
}

fn expand_tilde(raw: &str) -> Result<PathBuf> {
    let Some(rest) = raw.strip_prefix('~') else {
        return Ok(PathBuf::from(raw));
    };
    if !(rest.is_empty() || rest.starts_with('/')) {
        return Ok(PathBuf::from(raw));
    }
    let home = std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .ok_or_else(|| TwlintError::InvalidSource {
            pattern: raw.to_string(),
            reason: "cannot expand ~ without a home directory".to_string(),
        })?;
    Ok(PathBuf::from(home).join(rest.trim_start_matches('/')))
}

/// Lists the files to scan and extracts raw candidates from them
#[async_trait]
pub trait CandidateSource: Send + Sync {
    /// Files selected by the entries, sorted and deduplicated
    async fn files(&self, sources: &[SourceEntry]) -> Result<Vec<PathBuf>>;

    /// Every candidate string found in those files, sorted and deduplicated
    async fn scan(&self, sources: &[SourceEntry]) -> Result<Vec<String>>;
}

/// Walks the file system honouring `.gitignore`
pub struct GlobScanner {
    concurrency: usize,
}

impl GlobScanner {
    pub fn new(concurrency: usize) -> Self {
        Self { concurrency: concurrency.max(1) }
    }

    fn walk(entry: &SourceEntry) -> Result<Vec<PathBuf>> {
        if entry.is_literal() {
            let path = entry.base.join(&entry.pattern);
            if path.is_file() {
                return Ok(vec![normalize(&path)]);
            }
        }
        if !entry.base.is_dir() {
            debug!("Source base {} does not exist", entry.base.display());
            return Ok(Vec::new());
        }

        let mut overrides = OverrideBuilder::new(&entry.base);
        overrides
            .add(&format!("/{}", entry.pattern))
            .map_err(|e| TwlintError::InvalidSource { pattern: entry.pattern.clone(), reason: e.to_string() })?;
        let overrides = overrides
            .build()
            .map_err(|e| TwlintError::InvalidSource { pattern: entry.pattern.clone(), reason: e.to_string() })?;

        let walker = WalkBuilder::new(&entry.base)
            .hidden(false)
            .git_ignore(true)
            .overrides(overrides)
            .build();

        let mut files = Vec::new();
        for dir_entry in walker {
            let dir_entry = dir_entry.map_err(|e| TwlintError::FileSystem(e.to_string()))?;
            if dir_entry.file_type().is_some_and(|t| t.is_file()) {
                files.push(normalize(dir_entry.path()));
            }
        }
        Ok(files)
    }
}

/// Drop a leading `./` so walks from different bases compare equal
fn normalize(path: &Path) -> PathBuf {
    path.components().filter(|c| !matches!(c, Component::CurDir)).collect()
}

#[async_trait]
impl CandidateSource for GlobScanner {
    async fn files(&self, sources: &[SourceEntry]) -> Result<Vec<PathBuf>> {
        let mut selected = BTreeSet::new();
        let mut excluded = BTreeSet::new();

        for entry in sources {
            let found = Self::walk(entry)?;
            debug!("{}{} under {} matched {} files", if entry.negated { "!" } else { "" }, entry.pattern, entry.base.display(), found.len());
            if entry.negated {
                excluded.extend(found);
            } else {
                selected.extend(found);
            }
        }

        Ok(selected.difference(&excluded).cloned().collect())
    }

    async fn scan(&self, sources: &[SourceEntry]) -> Result<Vec<String>> {
        let files = self.files(sources).await?;
        info!("🔍 Pre-scanning {} files for candidates", files.len());

        let mut candidates = BTreeSet::new();
        for (_, result) in map_files(&files, self.concurrency, |_, text| raw_candidates(&text)).await {
            if let Ok(found) = result {
                candidates.extend(found);
            }
        }
        Ok(candidates.into_iter().collect())
    }
}

/// Over-inclusive candidate extraction: whitespace-separated chunks plus
/// their pieces between quote and markup characters. Pieces are cut both
/// anywhere and only outside `[...]`, so arbitrary values holding quotes,
/// `=` or `,` survive next to an attribute quote. Pieces without an ASCII
/// letter, or not starting like a class, are dropped.
pub fn raw_candidates(text: &str) -> BTreeSet<String> {
    let mut found = BTreeSet::new();

    for chunk in text.split_whitespace() {
        let mut keep = |piece: &str| {
            if looks_like_class(piece) {
                found.insert(piece.to_string());
            }
        };
        keep(chunk);
        if chunk.contains(SEPARATORS) {
            chunk.split(SEPARATORS).for_each(&mut keep);
            split_outside_brackets(chunk).into_iter().for_each(&mut keep);
        }
    }

    found
}

/// Split on separators at bracket depth zero; an unclosed `[` keeps the rest
/// of the chunk together
fn split_outside_brackets(chunk: &str) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut start = 0;
    let mut depth = 0usize;
    for (i, c) in chunk.char_indices() {
        match c {
            '[' => depth += 1,
            ']' => depth = depth.saturating_sub(1),
            c if depth == 0 && SEPARATORS.contains(&c) => {
                pieces.push(&chunk[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    pieces.push(&chunk[start..]);
    pieces
}

fn looks_like_class(piece: &str) -> bool {
    let Some(first) = piece.chars().next() else {
        return false;
    };
    (first.is_ascii_alphanumeric() || matches!(first, '-' | '!' | '[' | '@' | '*' | '_'))
        && piece.chars().any(|c| c.is_ascii_alphabetic())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::prelude::*;
    use assert_fs::TempDir;

    #[test]
    fn test_parse_glob_entries() {
        let entry = SourceEntry::parse("src/**/*.tsx").unwrap();
        assert_eq!(entry.base, PathBuf::from("src"));
        assert_eq!(entry.pattern, "**/*.tsx");
        assert!(!entry.negated);

        let entry = SourceEntry::parse("!*.test.ts").unwrap();
        assert_eq!(entry.base, PathBuf::from("."));
        assert!(entry.negated);

        assert!(SourceEntry::parse("!").is_err());
    }

    #[test]
    fn test_parse_tilde_and_literal_file() {
        let home = std::env::var("HOME").unwrap();
        let entry = SourceEntry::parse("~/site/*.html").unwrap();
        assert_eq!(entry.base, PathBuf::from(home).join("site"));

        let entry = SourceEntry::parse("pages/index.html").unwrap();
        assert_eq!(entry.base, PathBuf::from("pages"));
        assert_eq!(entry.pattern, "index.html");
    }

    #[test]
    fn test_raw_candidates_are_over_inclusive() {
        let found = raw_candidates(r#"<div class="flex p-4" data-x={cn('hover:bg-red-500', x)}>42 w-[calc(100%-2rem)]"#);
        for expected in ["flex", "p-4", "hover:bg-red-500", "w-[calc(100%-2rem)]", "div", "class"] {
            assert!(found.contains(expected), "{expected}");
        }
        assert!(!found.contains("42"));
    }

    #[test]
    fn test_arbitrary_values_survive_next_to_quotes() {
        let classes = ["grid-cols-[1fr,2fr]", "data-[state=open]:block", "bg-[url('/a.png')]", "before:content-['x']"];
        for class in classes {
            let leading = raw_candidates(&format!(r#"<div class="{class} flex">"#));
            let trailing = raw_candidates(&format!(r#"<div class="flex {class}">"#));
            let middle = raw_candidates(&format!(r#"<div class="flex {class} grid">"#));
            let single_quoted = raw_candidates(&format!("<div class='{class}'>"));
            for found in [leading, trailing, middle, single_quoted] {
                assert!(found.contains(class), "{class} missing from {found:?}");
            }
        }
    }

    #[test]
    fn test_split_outside_brackets() {
        assert_eq!(split_outside_brackets(r#"class="a-[x,y]""#), vec!["class", "", "a-[x,y]", ""]);
        assert_eq!(split_outside_brackets("cn('p-4',"), vec!["cn(", "p-4", "", ""]);
        assert_eq!(split_outside_brackets("w-[1,2"), vec!["w-[1,2"]);
    }

    #[tokio::test]
    async fn test_globs_directories_and_negation() {
        let temp = TempDir::new().unwrap();
        temp.child("src/app.tsx").write_str("<a className=\"flex\" />").unwrap();
        temp.child("src/gen/out.tsx").write_str("<a className=\"grid\" />").unwrap();
        temp.child("src/style.css").write_str(".x { @apply block; }").unwrap();
        let root = temp.path().display();

        let sources = vec![
            SourceEntry::parse(&format!("{root}/src/**/*.tsx")).unwrap(),
            SourceEntry::parse(&format!("!{root}/src/gen/**")).unwrap(),
        ];
        let scanner = GlobScanner::new(4);
        let files = scanner.files(&sources).await.unwrap();
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("src/app.tsx"));

        let whole_dir = vec![SourceEntry::parse(&format!("{root}/src")).unwrap()];
        assert_eq!(scanner.files(&whole_dir).await.unwrap().len(), 3);

        let candidates = scanner.scan(&sources).await.unwrap();
        assert!(candidates.contains(&"flex".to_string()));
        assert!(!candidates.contains(&"grid".to_string()));
    }
}
