//! Syntactic contexts in which class lists legitimately appear
//!
//! Every context owns one or more rules in the declarative rule table
//! (`rules.rs`). Contexts are switched on and off through [`EnabledContexts`];
//! adding a new templating convention means adding rows to the table.

mod rules;
mod spans;

pub use rules::ContextRuleSet;
pub use spans::find_closing;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// A named syntactic context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Context {
    /// `class="..."` attributes
    Html,
    /// `className="..."` and `className={...}` bindings
    Jsx,
    /// String arguments of class-joining helpers (`cn`, `clsx`, `twMerge`, ...)
    Helpers,
    /// Backtick literals inside class bindings and helper calls
    TemplateLiterals,
    /// `:class` / `v-bind:class`
    Vue,
    /// `[class]`, `[ngClass]` and `[class.name]`
    Angular,
    /// `x-bind:class`
    Alpine,
    /// `class:name` directives
    Svelte,
    /// `@apply` at-rules
    Apply,
    /// Raw `.name` selectors in stylesheets
    CssSelectors,
}

impl Context {
    pub const ALL: [Context; 10] = [
        Context::Html,
        Context::Jsx,
        Context::Helpers,
        Context::TemplateLiterals,
        Context::Vue,
        Context::Angular,
        Context::Alpine,
        Context::Svelte,
        Context::Apply,
        Context::CssSelectors,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Context::Html => "html",
            Context::Jsx => "jsx",
            Context::Helpers => "helpers",
            Context::TemplateLiterals => "template-literals",
            Context::Vue => "vue",
            Context::Angular => "angular",
            Context::Alpine => "alpine",
            Context::Svelte => "svelte",
            Context::Apply => "apply",
            Context::CssSelectors => "css-selectors",
        }
    }
}

/// Per-context switches. Everything is on by default except raw CSS
/// selectors, which flood plain stylesheets with false positives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnabledContexts {
    pub html: bool,
    pub jsx: bool,
    pub helpers: bool,
    pub template_literals: bool,
    pub vue: bool,
    pub angular: bool,
    pub alpine: bool,
    pub svelte: bool,
    pub apply: bool,
    pub css_selectors: bool,
}

impl Default for EnabledContexts {
    fn default() -> Self {
        Self {
            html: true,
            jsx: true,
            helpers: true,
            template_literals: true,
            vue: true,
            angular: true,
            alpine: true,
            svelte: true,
            apply: true,
            css_selectors: false,
        }
    }
}

impl EnabledContexts {
    /// Every context, including the opt-in ones
    pub fn all() -> Self {
        let mut contexts = Self::default();
        contexts.css_selectors = true;
        contexts
    }

    pub fn is_enabled(&self, context: Context) -> bool {
        match context {
            Context::Html => self.html,
            Context::Jsx => self.jsx,
            Context::Helpers => self.helpers,
            Context::TemplateLiterals => self.template_literals,
            Context::Vue => self.vue,
            Context::Angular => self.angular,
            Context::Alpine => self.alpine,
            Context::Svelte => self.svelte,
            Context::Apply => self.apply,
            Context::CssSelectors => self.css_selectors,
        }
    }

    pub fn set(&mut self, context: Context, enabled: bool) {
        let flag = match context {
            Context::Html => &mut self.html,
            Context::Jsx => &mut self.jsx,
            Context::Helpers => &mut self.helpers,
            Context::TemplateLiterals => &mut self.template_literals,
            Context::Vue => &mut self.vue,
            Context::Angular => &mut self.angular,
            Context::Alpine => &mut self.alpine,
            Context::Svelte => &mut self.svelte,
            Context::Apply => &mut self.apply,
            Context::CssSelectors => &mut self.css_selectors,
        };
        *flag = enabled;
    }

    /// Names of the enabled contexts, for logging
    pub fn enabled_names(&self) -> Vec<&'static str> {
        Context::ALL
            .iter()
            .filter(|c| self.is_enabled(**c))
            .map(|c| c.name())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_disables_css_selectors_only() {
        let contexts = EnabledContexts::default();
        for context in Context::ALL {
            assert_eq!(contexts.is_enabled(context), context != Context::CssSelectors);
        }
    }

    #[test]
    fn test_set_and_names() {
        let mut contexts = EnabledContexts::default();
        contexts.set(Context::Vue, false);
        contexts.set(Context::CssSelectors, true);
        let names = contexts.enabled_names();
        assert!(!names.contains(&"vue"));
        assert!(names.contains(&"css-selectors"));
    }

    #[test]
    fn test_deserialize_partial_toml() {
        let contexts: EnabledContexts = toml::from_str("angular = false").unwrap();
        assert!(!contexts.angular);
        assert!(contexts.html);
        assert!(!contexts.css_selectors);
    }
}
