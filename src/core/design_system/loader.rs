// src/core/design_system/loader.rs
use regex::Regex;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use super::{DesignSystem, VariantEffect};
use crate::core::contexts::find_closing;
use crate::error::{Result, TwlintError};

const MAX_IMPORT_DEPTH: usize = 16;

/// Where the CSS configuration comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CssSource {
    Path(PathBuf),
    Inline(String),
}

impl CssSource {
    /// Directory relative imports are resolved against
    fn base_dir(&self) -> PathBuf {
        match self {
            CssSource::Path(path) => path.parent().map(Path::to_path_buf).unwrap_or_default(),
            CssSource::Inline(_) => PathBuf::from("."),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            CssSource::Path(path) => path.display().to_string(),
            CssSource::Inline(_) => "<inline css>".to_string(),
        }
    }
}

/// Builds the design system once and hands out the shared result.
/// Concurrent callers of `load` wait on the same initialisation.
#[derive(Debug)]
pub struct DesignSystemLoader {
    source: CssSource,
    cell: OnceCell<Arc<DesignSystem>>,
}

impl DesignSystemLoader {
    pub fn new(source: CssSource) -> Self {
        Self { source, cell: OnceCell::new() }
    }

    pub async fn load(&self) -> Result<Arc<DesignSystem>> {
        let system = self.cell.get_or_try_init(|| self.build()).await?;
        Ok(Arc::clone(system))
    }

    async fn build(&self) -> Result<Arc<DesignSystem>> {
        let (css, origin) = match &self.source {
            CssSource::Path(path) => {
                let css = tokio::fs::read_to_string(path).await.map_err(|e| {
                    TwlintError::Config(format!("Cannot read CSS configuration {}: {}", path.display(), e))
                })?;
                (css, Some(path.clone()))
            }
            CssSource::Inline(css) => (css.clone(), None),
        };
        let base = self.source.base_dir();
        let description = self.source.describe();

        info!("🎨 Loading design system from {}", description);
        let system = tokio::task::spawn_blocking(move || {
            let mut parser = CssParser::new()?;
            Ok::<_, TwlintError>(parser.build(&css, &base, origin, &description))
        })
        .await
        .map_err(|e| TwlintError::DesignSystem(format!("Design system loading was interrupted: {}", e)))??;

        debug!(
            "Design system ready: {} custom utilities, {} custom variants, {} warnings",
            system.custom_utilities.len() + system.custom_functional.len(),
            system.custom_variants.len(),
            system.warnings().len()
        );
        Ok(Arc::new(system))
    }
}

/// Reads the directives of a Tailwind v4 CSS configuration
struct CssParser {
    comment_regex: Regex,
    directive_regex: Regex,
    import_target_regex: Regex,
    utility_name_regex: Regex,
    system: DesignSystem,
    visited: HashSet<PathBuf>,
    saw_tailwind: bool,
}

impl CssParser {
    fn new() -> Result<Self> {
        Ok(Self {
            comment_regex: Regex::new(r"(?s)/\*.*?\*/")?,
            directive_regex: Regex::new(r"@(import|reference|plugin|config|theme|utility|custom-variant)\b")?,
            import_target_regex: Regex::new(r#"^(?:url\(\s*)?["']([^"']+)["']"#)?,
            utility_name_regex: Regex::new(r"^-?[A-Za-z][A-Za-z0-9_-]*(?:-\*)?$")?,
            system: DesignSystem::new(),
            visited: HashSet::new(),
            saw_tailwind: false,
        })
    }

    fn build(&mut self, css: &str, base: &Path, origin: Option<PathBuf>, description: &str) -> DesignSystem {
        if let Some(origin) = origin {
            self.visited.insert(canonical(origin));
        }
        self.process(css, base, 0);

        if !self.saw_tailwind {
            self.system.warn(format!(
                "{} does not import \"tailwindcss\"; validating against the built-in base anyway",
                description
            ));
        }
        std::mem::take(&mut self.system)
    }

    fn process(&mut self, css: &str, base: &Path, depth: usize) {
        let css = self.comment_regex.replace_all(css, "").into_owned();
        let mut cursor = 0;

        while let Some(found) = self.directive_regex.find_at(&css, cursor) {
            let directive = &css[found.start() + 1..found.end()];
            let rest = found.end();
            cursor = match directive {
                "import" | "reference" => self.import(&css, rest, base, depth),
                "plugin" | "config" => self.unsupported(&css, directive, rest),
                "theme" => self.theme(&css, rest),
                "utility" => self.utility(&css, rest),
                _ => self.custom_variant(&css, rest),
            };
        }
    }

    fn import(&mut self, css: &str, from: usize, base: &Path, depth: usize) -> usize {
        let end = statement_end(css, from);
        let prelude = css[from..end].trim().trim_end_matches(';').trim();
        let Some(target) = self.import_target_regex.captures(prelude).and_then(|c| c.get(1)) else {
            self.system.warn(format!("Ignoring malformed @import: {}", prelude));
            return end;
        };
        let target = target.as_str();

        if target == "tailwindcss" || target.starts_with("tailwindcss/") {
            self.saw_tailwind = true;
            return end;
        }
        if !(target.starts_with("./") || target.starts_with("../") || target.ends_with(".css")) {
            self.system.warn(format!("Package import \"{}\" is not resolved; skipped", target));
            return end;
        }

        let path = canonical(base.join(target));
        if !self.visited.insert(path.clone()) {
            debug!("Skipping already imported stylesheet {}", path.display());
            return end;
        }
        if depth >= MAX_IMPORT_DEPTH {
            self.system.warn(format!("Import of {} is nested too deeply; skipped", path.display()));
            return end;
        }

        match std::fs::read_to_string(&path) {
            Ok(imported) => {
                debug!("Importing stylesheet {}", path.display());
                let nested_base = path.parent().map(Path::to_path_buf).unwrap_or_default();
                self.process(&imported, &nested_base, depth + 1);
            }
            Err(e) => self.system.warn(format!("Cannot read imported stylesheet {}: {}", path.display(), e)),
        }
        end
    }

    fn unsupported(&mut self, css: &str, directive: &str, from: usize) -> usize {
        let end = statement_end(css, from);
        let target = css[from..end].trim().trim_end_matches(';').trim();
        self.system.warn(format!(
            "@{} {} is not supported; continuing without it",
            directive, target
        ));
        end
    }

    fn theme(&mut self, css: &str, from: usize) -> usize {
        let Some((body, end)) = block_body(css, from) else {
            self.system.warn("Unterminated @theme block");
            return css.len();
        };
        for (name, value) in declarations(body) {
            if !name.starts_with("--") {
                continue;
            }
            if !self.system.theme_mut().apply_variable(&name, &value) {
                debug!("Theme variable {} belongs to no utility namespace", name);
            }
        }
        end
    }

    fn utility(&mut self, css: &str, from: usize) -> usize {
        let Some((body, end)) = block_body(css, from) else {
            self.system.warn("Unterminated @utility block");
            return css.len();
        };
        let name = css[from..].split('{').next().unwrap_or_default().trim();
        if !self.utility_name_regex.is_match(name) {
            self.system.warn(format!("Invalid @utility name \"{}\"", name));
            return end;
        }

        debug!("Registering custom utility {}", name);
        self.system.add_utility(name, declarations(body));
        end
    }

    /// `@custom-variant name (selector);` or `@custom-variant name { ... }`
    fn custom_variant(&mut self, css: &str, from: usize) -> usize {
        let statement = statement_end(css, from);
        let block = css[from..].find('{').map(|i| from + i);

        let (name, effect, end) = match block {
            Some(open) if open < statement => {
                let Some((body, end)) = block_body(css, from) else {
                    self.system.warn("Unterminated @custom-variant block");
                    return css.len();
                };
                let name = css[from..open].trim();
                let prelude = body.split('{').next().unwrap_or_default().trim();
                (name, variant_effect(prelude), end)
            }
            _ => {
                let text = css[from..statement].trim().trim_end_matches(';').trim();
                let (name, rule) = text.split_once(char::is_whitespace).unwrap_or((text, ""));
                let rule = rule.trim();
                let inner = rule.strip_prefix('(').and_then(|r| r.strip_suffix(')')).unwrap_or(rule);
                (name, variant_effect(inner.trim()), statement)
            }
        };

        match effect {
            Some(effect) if !name.is_empty() => {
                debug!("Registering custom variant {}", name);
                self.system.add_variant(name, effect);
            }
            _ => self.system.warn(format!("Cannot understand @custom-variant {}", name)),
        }
        end
    }
}

fn canonical(path: PathBuf) -> PathBuf {
    std::fs::canonicalize(&path).unwrap_or(path)
}

fn variant_effect(rule: &str) -> Option<VariantEffect> {
    if rule.starts_with('@') {
        Some(VariantEffect::AtRule(rule.to_string()))
    } else if rule.contains('&') {
        Some(VariantEffect::Selector(rule.to_string()))
    } else {
        None
    }
}

/// Index just past the `;` ending the statement that starts at `from`
fn statement_end(css: &str, from: usize) -> usize {
    css[from..].find(';').map_or(css.len(), |i| from + i + 1)
}

/// Body of the block whose `{` follows `from`, and the index just past its `}`
fn block_body(css: &str, from: usize) -> Option<(&str, usize)> {
    let open = from + css[from..].find('{')?;
    let close = find_closing(css, open + 1, b'{', b'}')?;
    Some((&css[open + 1..close], close + 1))
}

/// Top-level `name: value;` pairs of a block body. Nested blocks are
/// skipped; bare at-rules such as `@apply flex` become `("@apply", "flex")`.
fn declarations(body: &str) -> Vec<(String, String)> {
    let mut found = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;

    let flush = |text: &str, found: &mut Vec<(String, String)>| {
        let text = text.trim();
        if text.starts_with('@') {
            let (name, value) = text.split_once(char::is_whitespace).unwrap_or((text, ""));
            found.push((name.to_string(), value.trim().to_string()));
        } else if let Some((name, value)) = text.split_once(':') {
            found.push((name.trim().to_string(), value.trim().to_string()));
        }
    };

    for c in body.chars() {
        match c {
            '{' => {
                depth += 1;
                current.clear();
            }
            '}' => depth = depth.saturating_sub(1),
            ';' if depth == 0 => {
                flush(&current, &mut found);
                current.clear();
            }
            _ if depth == 0 => current.push(c),
            _ => {}
        }
    }
    flush(&current, &mut found);
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::design_system::ClassOracle;
    use tempfile::TempDir;

    async fn inline(css: &str) -> Arc<DesignSystem> {
        DesignSystemLoader::new(CssSource::Inline(css.to_string())).load().await.unwrap()
    }

    #[tokio::test]
    async fn test_default_import_validates_core_utilities() {
        let system = inline("@import \"tailwindcss\";").await;
        assert!(system.is_valid("flex"));
        assert!(system.is_valid("items-center"));
        assert!(!system.is_valid("bg-opacity-50"));
        assert!(system.warnings().is_empty());
    }

    #[tokio::test]
    async fn test_theme_extension_and_reset() {
        let system = inline(
            r#"
            @import "tailwindcss";
            /* brand palette */
            @theme {
                --color-*: initial;
                --color-brand: #0f766e;
                --breakpoint-3xl: 120rem;
            }
            "#,
        )
        .await;
        assert!(system.is_valid("bg-brand"));
        assert!(system.is_valid("3xl:flex"));
        assert!(!system.is_valid("bg-red-500"));
    }

    #[tokio::test]
    async fn test_missing_import_and_plugins_warn() {
        let system = inline("@plugin \"@tailwindcss/typography\";\n@config \"./tailwind.config.js\";").await;
        assert_eq!(system.warnings().len(), 3);
        assert!(system.warnings().iter().any(|w| w.contains("@plugin")));
        assert!(system.is_valid("flex"));
    }

    #[tokio::test]
    async fn test_custom_utilities_and_variants() {
        let system = inline(
            r#"
            @import "tailwindcss";
            @custom-variant theme-midnight (&:where([data-theme=midnight] *));
            @custom-variant pointer-fine { @media (pointer: fine) { @slot; } }
            @utility content-auto { content-visibility: auto; }
            @utility tab-* { tab-size: --value(integer, --tab-size-*); }
            @theme { --tab-size-github: 8; }
            @utility btn { @apply px-4 py-2; &:hover { opacity: 0.9; } }
            "#,
        )
        .await;
        assert!(system.is_valid("theme-midnight:content-auto"));
        assert!(system.is_valid("pointer-fine:flex"));
        assert!(system.is_valid("tab-4"));
        assert!(system.is_valid("tab-github"));
        assert!(!system.is_valid("tab-wide"));
        assert!(system.is_valid("btn"));
        assert!(system.warnings().is_empty());
    }

    #[tokio::test]
    async fn test_relative_imports() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("theme.css"), "@theme { --color-brand: #123456; }\n@import \"./app.css\";").unwrap();
        let app = dir.path().join("app.css");
        std::fs::write(&app, "@import \"tailwindcss\";\n@import \"./theme.css\";\n@import \"./missing.css\";").unwrap();

        let system = DesignSystemLoader::new(CssSource::Path(app)).load().await.unwrap();
        assert!(system.is_valid("text-brand"));
        assert_eq!(system.warnings().len(), 1);
        assert!(system.warnings()[0].contains("missing.css"));
    }

    #[tokio::test]
    async fn test_unreadable_primary_path_is_config_error() {
        let loader = DesignSystemLoader::new(CssSource::Path(PathBuf::from("/nonexistent/app.css")));
        assert!(matches!(loader.load().await, Err(TwlintError::Config(_))));
    }

    #[tokio::test]
    async fn test_concurrent_loads_share_one_system() {
        let loader = Arc::new(DesignSystemLoader::new(CssSource::Inline("@import \"tailwindcss\";".into())));
        let (a, b) = tokio::join!(loader.load(), loader.load());
        assert!(Arc::ptr_eq(&a.unwrap(), &b.unwrap()));
    }

    #[test]
    fn test_declarations_skip_nested_blocks() {
        let found = declarations("--a: 1; @keyframes x { to { opacity: 0; } } --b: 2");
        assert_eq!(
            found,
            vec![("--a".to_string(), "1".to_string()), ("--b".to_string(), "2".to_string())]
        );
    }
}
