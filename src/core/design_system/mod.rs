// src/core/design_system/mod.rs
//! The class oracle: a Tailwind v4 style design system built from a CSS
//! configuration, able to parse a candidate and generate its rules.

pub mod candidate;
pub mod loader;
pub mod theme;
pub mod utilities;
pub mod variants;

use std::collections::HashMap;
use tracing::warn;

pub use candidate::{parse_candidate, ParsedCandidate};
pub use loader::{CssSource, DesignSystemLoader};
pub use theme::Theme;
pub use utilities::Functional;
pub use variants::VariantEffect;

/// One generated style rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputRule {
    pub selector: String,
    /// Wrapping at-rules, innermost first
    pub at_rules: Vec<String>,
    pub declarations: Vec<(String, String)>,
}

/// Judges whether a candidate string is a real utility class.
///
/// A candidate may parse into several interpretations; it is valid when at
/// least one of them generates a rule.
pub trait ClassOracle: Send + Sync {
    /// Every interpretation of `candidate`, empty when it does not parse
    fn parse(&self, candidate: &str) -> Vec<ParsedCandidate>;

    /// Rules generated for one interpretation
    fn compile(&self, parsed: &ParsedCandidate) -> Vec<OutputRule>;

    fn is_valid(&self, candidate: &str) -> bool {
        self.parse(candidate).iter().any(|parsed| !self.compile(parsed).is_empty())
    }
}

/// Loaded design system: the built-in base plus whatever the CSS
/// configuration added
#[derive(Debug, Clone)]
pub struct DesignSystem {
    pub(crate) theme: Theme,
    pub(crate) custom_utilities: HashMap<String, Vec<(String, String)>>,
    pub(crate) custom_functional: HashMap<String, Vec<(String, String)>>,
    pub(crate) custom_variants: HashMap<String, VariantEffect>,
    statics: HashMap<&'static str, &'static [(&'static str, &'static str)]>,
    functionals: HashMap<&'static str, Functional>,
    warnings: Vec<String>,
}

impl Default for DesignSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl DesignSystem {
    /// The built-in base with the default theme
    pub fn new() -> Self {
        let mut functionals: HashMap<&'static str, Functional> = HashMap::new();
        for functional in utilities::functional_utilities() {
            match functionals.get_mut(functional.root) {
                Some(existing) => existing.arms.extend(functional.arms),
                None => {
                    functionals.insert(functional.root, functional);
                }
            }
        }

        Self {
            theme: Theme::builtin(),
            custom_utilities: HashMap::new(),
            custom_functional: HashMap::new(),
            custom_variants: HashMap::new(),
            statics: utilities::STATIC_UTILITIES.iter().copied().collect(),
            functionals,
            warnings: Vec::new(),
        }
    }

    pub(crate) fn theme_mut(&mut self) -> &mut Theme {
        &mut self.theme
    }

    /// Diagnostics collected while loading the CSS configuration
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub(crate) fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        warn!("⚠️  {}", message);
        self.warnings.push(message);
    }

    pub fn has_static(&self, name: &str) -> bool {
        self.statics.contains_key(name) || self.custom_utilities.contains_key(name)
    }

    pub fn has_functional_root(&self, root: &str) -> bool {
        self.functionals.contains_key(root) || self.custom_functional.contains_key(root)
    }

    pub(crate) fn static_utility(&self, name: &str) -> Option<&'static [(&'static str, &'static str)]> {
        self.statics.get(name).copied()
    }

    pub(crate) fn functional(&self, root: &str) -> Option<&Functional> {
        self.functionals.get(root)
    }

    pub(crate) fn add_utility(&mut self, name: &str, declarations: Vec<(String, String)>) {
        match name.strip_suffix("-*") {
            Some(root) => self.custom_functional.insert(root.to_string(), declarations),
            None => self.custom_utilities.insert(name.to_string(), declarations),
        };
    }

    pub(crate) fn add_variant(&mut self, name: &str, effect: VariantEffect) {
        self.custom_variants.insert(name.to_string(), effect);
    }
}

impl ClassOracle for DesignSystem {
    fn parse(&self, candidate: &str) -> Vec<ParsedCandidate> {
        parse_candidate(candidate, self)
    }

    fn compile(&self, parsed: &ParsedCandidate) -> Vec<OutputRule> {
        utilities::compile(self, parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_valid_ors_interpretations() {
        let system = DesignSystem::new();
        // `border-x-2` parses as `border` + `x-2` (fails) and `border-x` + `2`
        assert!(system.parse("border-x-2").len() >= 2);
        assert!(system.is_valid("border-x-2"));
    }

    #[test]
    fn test_custom_utilities_and_variants() {
        let mut system = DesignSystem::new();
        system.add_utility("content-auto", vec![("content-visibility".into(), "auto".into())]);
        system.add_utility("tab-*", vec![("tab-size".into(), "--value(integer)".into())]);
        system.add_variant("theme-midnight", VariantEffect::Selector("&:where([data-theme=midnight] *)".into()));

        assert!(system.is_valid("content-auto"));
        assert!(system.is_valid("tab-4"));
        assert!(!system.is_valid("tab-wide"));
        assert!(system.is_valid("theme-midnight:content-auto"));
        assert!(!system.is_valid("theme-noon:content-auto"));
    }

    #[test]
    fn test_warnings_are_retained() {
        let mut system = DesignSystem::new();
        system.warn("plugin skipped");
        assert_eq!(system.warnings(), ["plugin skipped".to_string()]);
    }
}
