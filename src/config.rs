use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::core::EnabledContexts;
use crate::core::default_concurrency;
use crate::error::{Result, TwlintError};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Default CSS configuration entry point, used when `--path` is absent
    pub css: Option<PathBuf>,

    /// Which syntactic contexts count as class-list sources
    pub contexts: EnabledContexts,

    /// File scanning settings
    pub scan: ScanConfig,

    /// Validation settings
    pub validation: ValidationConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Maximum number of files read at once
    pub concurrency: usize,

    /// Intersect raw candidates with context-classified tokens.
    /// When false every raw candidate is validated.
    pub context_aware: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            context_aware: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Tokens accepted as valid without consulting the design system,
    /// e.g. JavaScript hooks like `js-toggle`
    pub extra_markers: Vec<String>,
}

impl Config {
    /// Load configuration from file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| TwlintError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration with fallback to default
    pub fn load_or_default<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        match path {
            Some(p) => {
                if p.as_ref().exists() {
                    Self::load(p)
                } else {
                    Err(TwlintError::Config(format!(
                        "Configuration file {} does not exist",
                        p.as_ref().display()
                    )))
                }
            }
            None => {
                // Try common config file locations
                let candidates = ["twlint.toml", ".twlint.toml"];

                for candidate in &candidates {
                    if Path::new(candidate).exists() {
                        return Self::load(candidate);
                    }
                }

                Ok(Self::default())
            }
        }
    }

    fn validate(&self) -> Result<()> {
        if self.scan.concurrency == 0 {
            return Err(TwlintError::Config("scan.concurrency must be at least 1".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert!(config.css.is_none());
        assert!(config.scan.context_aware);
        assert!(config.scan.concurrency >= 1);
        assert!(config.contexts.html);
        assert!(!config.contexts.css_selectors);
    }

    #[test]
    fn test_load_partial_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("twlint.toml");
        std::fs::write(
            &path,
            r#"
css = "src/app.css"

[contexts]
svelte = false

[validation]
extra_markers = ["js-toggle"]
"#,
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.css, Some(PathBuf::from("src/app.css")));
        assert!(!config.contexts.svelte);
        assert!(config.contexts.jsx);
        assert_eq!(config.validation.extra_markers, vec!["js-toggle"]);
        assert!(config.scan.context_aware);
    }

    #[test]
    fn test_invalid_files_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("twlint.toml");
        std::fs::write(&path, "[scan]\nconcurrency = 0\n").unwrap();
        assert!(matches!(Config::load(&path), Err(TwlintError::Config(_))));

        std::fs::write(&path, "css = [").unwrap();
        assert!(Config::load(&path).is_err());

        let missing = dir.path().join("absent.toml");
        assert!(Config::load_or_default(Some(&missing)).is_err());
    }
}
