// src/core/contexts/rules.rs
use regex::{Captures, Match, Regex};

use crate::error::Result;
use super::spans::{find_closing, split_interpolations, string_literals, ClassSpan, Interpolation, LiteralKinds};
use super::{Context, EnabledContexts};

/// Class-joining helpers whose string arguments are class lists
pub const HELPER_FUNCTIONS: &[&str] = &[
    "cn", "clsx", "classnames", "classNames", "cx", "twMerge", "twJoin", "cva", "tv",
];

/// Words that show up between quotes when naive literal scanning catches code
const CODE_KEYWORDS: &[&str] = &["const", "let", "var", "if", "else", "return", "function"];

/// Capture groups that may hold a rule's value, in lookup order
const VALUE_GROUPS: &[&str] = &["v", "dq", "sq"];

/// How a rule turns a regex match into class-list spans
#[derive(Debug, Clone, Copy)]
pub enum Extractor {
    /// The captured value is itself a class list
    Value(Interpolation),
    /// The captured value is an expression; its string literals are class lists
    Literals(LiteralKinds),
    /// The match ends just after `open`; string literals up to the balanced
    /// `close` are class lists
    Balanced { open: u8, close: u8, kinds: LiteralKinds },
    /// The captured identifier follows a `.` that does not continue a word
    Selector,
}

/// Which split fragments a rule accepts as tokens
#[derive(Debug, Clone, Copy)]
pub struct TokenPolicy {
    /// Apply the character-class, ternary and keyword checks
    pub strict: bool,
    /// Fragments this rule always rejects
    pub deny: &'static [&'static str],
}

impl TokenPolicy {
    const LOOSE: TokenPolicy = TokenPolicy { strict: false, deny: &[] };

    const fn strict(deny: &'static [&'static str]) -> Self {
        Self { strict: true, deny }
    }

    pub fn accepts(&self, token: &str) -> bool {
        if token.is_empty() || self.deny.contains(&token) {
            return false;
        }
        if !self.strict {
            return true;
        }

        // Ternary pieces: `?`, a lone `:`, or `cond:` / `:value` halves
        if token.contains('?') || token.starts_with(':') || token.ends_with(':') {
            return false;
        }
        if CODE_KEYWORDS.contains(&token) {
            return false;
        }

        token.chars().any(|c| c.is_ascii_alphanumeric()) && has_class_chars(token)
    }
}

/// Anything goes inside `[...]`; outside, only characters a class can carry
fn has_class_chars(token: &str) -> bool {
    let mut depth = 0usize;
    token.chars().all(|c| match c {
        '[' => {
            depth += 1;
            true
        }
        ']' => {
            depth = depth.saturating_sub(1);
            true
        }
        _ => depth > 0 || is_class_char(c),
    })
}

fn is_class_char(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || matches!(c, '-' | '_' | ':' | '/' | '[' | ']' | '(' | ')' | '%' | '.' | '@' | '*')
}

/// One row of the rule table, before compilation
struct RuleDef {
    context: Context,
    name: &'static str,
    pattern: String,
    extractor: Extractor,
    policy: TokenPolicy,
}

fn rule_defs() -> Vec<RuleDef> {
    let quoted = r#"(?:"(?P<dq>[^"]*)"|'(?P<sq>[^']*)')"#;
    let helpers = HELPER_FUNCTIONS.join("|");
    let binding_deny: &'static [&'static str] = &["className", "class"];

    vec![
        RuleDef {
            context: Context::Html,
            name: "class-attribute",
            pattern: format!(r#"(?:^|[\s<"'])class\s*=\s*{quoted}"#),
            extractor: Extractor::Value(Interpolation::Braces),
            policy: TokenPolicy::LOOSE,
        },
        RuleDef {
            context: Context::Jsx,
            name: "classname-literal",
            pattern: format!(r"\bclassName\s*=\s*\{{?\s*{quoted}"),
            extractor: Extractor::Value(Interpolation::None),
            policy: TokenPolicy::LOOSE,
        },
        RuleDef {
            context: Context::Jsx,
            name: "classname-expression",
            pattern: r"\b(?:className|class)\s*=\s*\{".to_string(),
            extractor: Extractor::Balanced { open: b'{', close: b'}', kinds: LiteralKinds::Quoted },
            policy: TokenPolicy::strict(binding_deny),
        },
        RuleDef {
            context: Context::Helpers,
            name: "helper-call",
            pattern: format!(r"\b(?:{helpers})\s*\("),
            extractor: Extractor::Balanced { open: b'(', close: b')', kinds: LiteralKinds::Quoted },
            policy: TokenPolicy::strict(binding_deny),
        },
        RuleDef {
            context: Context::TemplateLiterals,
            name: "template-binding",
            pattern: r"\b(?:className|class)\s*=\s*\{".to_string(),
            extractor: Extractor::Balanced { open: b'{', close: b'}', kinds: LiteralKinds::Template },
            policy: TokenPolicy::strict(binding_deny),
        },
        RuleDef {
            context: Context::TemplateLiterals,
            name: "template-helper-call",
            pattern: format!(r"\b(?:{helpers})\s*\("),
            extractor: Extractor::Balanced { open: b'(', close: b')', kinds: LiteralKinds::Template },
            policy: TokenPolicy::strict(binding_deny),
        },
        RuleDef {
            context: Context::Vue,
            name: "vue-class-binding",
            pattern: format!(r"(?:^|\s)(?:v-bind)?:class\s*=\s*{quoted}"),
            extractor: Extractor::Literals(LiteralKinds::Quoted),
            policy: TokenPolicy::strict(binding_deny),
        },
        RuleDef {
            context: Context::Angular,
            name: "angular-class-binding",
            pattern: format!(r"\[(?:class|ngClass)\]\s*=\s*{quoted}"),
            extractor: Extractor::Literals(LiteralKinds::Quoted),
            policy: TokenPolicy::strict(binding_deny),
        },
        RuleDef {
            context: Context::Angular,
            name: "angular-class-toggle",
            pattern: r"\[class\.(?P<v>[^\]\s=]+)\]".to_string(),
            extractor: Extractor::Value(Interpolation::None),
            policy: TokenPolicy::strict(&[]),
        },
        RuleDef {
            context: Context::Alpine,
            name: "alpine-class-binding",
            pattern: format!(r"\bx-bind:class\s*=\s*{quoted}"),
            extractor: Extractor::Literals(LiteralKinds::Quoted),
            policy: TokenPolicy::strict(binding_deny),
        },
        RuleDef {
            context: Context::Svelte,
            name: "svelte-class-directive",
            pattern: r"(?:^|\s)class:(?P<v>[^\s=/>{}]+)".to_string(),
            extractor: Extractor::Value(Interpolation::None),
            policy: TokenPolicy::strict(&["list"]),
        },
        RuleDef {
            context: Context::Apply,
            name: "apply-directive",
            pattern: r"@apply\s+(?P<v>[^;{}]+);".to_string(),
            extractor: Extractor::Value(Interpolation::None),
            policy: TokenPolicy { strict: false, deny: &["!important"] },
        },
        RuleDef {
            context: Context::CssSelectors,
            name: "css-selector",
            pattern: r"\.(?P<v>-?[A-Za-z_][A-Za-z0-9_-]*)(?:[\s{:,)]|$)".to_string(),
            extractor: Extractor::Selector,
            policy: TokenPolicy::LOOSE,
        },
    ]
}

/// A compiled context rule
#[derive(Debug, Clone)]
pub struct ContextRule {
    pub context: Context,
    pub name: &'static str,
    regex: Regex,
    extractor: Extractor,
    policy: TokenPolicy,
}

impl ContextRule {
    /// Static class-list spans this rule recognises in `text`
    pub fn spans(&self, text: &str) -> Vec<ClassSpan> {
        let mut spans = Vec::new();

        for caps in self.regex.captures_iter(text) {
            let Some(whole) = caps.get(0) else { continue };

            match self.extractor {
                Extractor::Value(mode) => {
                    if let Some(value) = value_group(&caps) {
                        spans.extend(split_interpolations(text, value.start(), value.end(), mode));
                    }
                }
                Extractor::Literals(kinds) => {
                    if let Some(value) = value_group(&caps) {
                        spans.extend(string_literals(text, value.start(), value.end(), kinds));
                    }
                }
                Extractor::Balanced { open, close, kinds } => {
                    // An unclosed body runs to the end of the text, so the first
                    // line of a multi-line call still counts when scanning by line
                    let body_end = find_closing(text, whole.end(), open, close).unwrap_or(text.len());
                    spans.extend(string_literals(text, whole.end(), body_end, kinds));
                }
                Extractor::Selector => {
                    let dot = whole.start();
                    let continues_word = dot > 0 && {
                        let before = text.as_bytes()[dot - 1];
                        before.is_ascii_alphanumeric() || matches!(before, b'_' | b'-' | b'.')
                    };
                    if let (false, Some(value)) = (continues_word, value_group(&caps)) {
                        spans.push(ClassSpan::new(value.start(), value.end()));
                    }
                }
            }
        }

        spans
    }

    /// Accepted tokens in `text` with their byte offsets
    pub fn tokens<'a>(&self, text: &'a str) -> Vec<(usize, &'a str)> {
        self.spans(text)
            .iter()
            .flat_map(|span| span.tokens(text))
            .filter(|(_, token)| self.policy.accepts(token))
            .collect()
    }
}

fn value_group<'t>(caps: &Captures<'t>) -> Option<Match<'t>> {
    VALUE_GROUPS.iter().find_map(|name| caps.name(name))
}

/// The compiled rules for one context configuration
#[derive(Debug, Clone)]
pub struct ContextRuleSet {
    rules: Vec<ContextRule>,
}

impl ContextRuleSet {
    /// Compile the rules of every enabled context
    pub fn new(enabled: &EnabledContexts) -> Result<Self> {
        let mut rules = Vec::new();

        for def in rule_defs() {
            if !enabled.is_enabled(def.context) {
                continue;
            }
            rules.push(ContextRule {
                context: def.context,
                name: def.name,
                regex: Regex::new(&def.pattern)?,
                extractor: def.extractor,
                policy: def.policy,
            });
        }

        Ok(Self { rules })
    }

    pub fn iter(&self) -> impl Iterator<Item = &ContextRule> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(name: &str) -> ContextRule {
        let set = ContextRuleSet::new(&EnabledContexts::all()).unwrap();
        let found = set.iter().find(|r| r.name == name).unwrap().clone();
        found
    }

    fn tokens(rule_name: &str, text: &str) -> Vec<String> {
        rule(rule_name).tokens(text).into_iter().map(|(_, t)| t.to_string()).collect()
    }

    #[test]
    fn test_all_rule_patterns_compile() {
        let set = ContextRuleSet::new(&EnabledContexts::all()).unwrap();
        assert_eq!(set.len(), rule_defs().len());
    }

    #[test]
    fn test_disabled_contexts_have_no_rules() {
        let set = ContextRuleSet::new(&EnabledContexts::default()).unwrap();
        assert!(set.iter().all(|r| r.context != Context::CssSelectors));
    }

    #[test]
    fn test_strict_policy_rejects_code_fragments() {
        let policy = TokenPolicy::strict(&["className"]);
        assert!(policy.accepts("hover:bg-red-500"));
        assert!(policy.accepts("w-[calc(100%-1rem)]"));
        assert!(!policy.accepts("?"));
        assert!(!policy.accepts(":"));
        assert!(!policy.accepts("isOpen:"));
        assert!(!policy.accepts("const"));
        assert!(!policy.accepts("className"));
        assert!(!policy.accepts("a=b"));
        assert!(policy.accepts("data-[state=open]:block"));
        assert!(policy.accepts("bg-[url('/a.png')]"));
        assert!(!policy.accepts("x]=y"));
        assert!(!policy.accepts("--"));
    }

    #[test]
    fn test_html_attribute_does_not_match_classname() {
        assert_eq!(tokens("class-attribute", r#"<div class="flex p-4">"#), vec!["flex", "p-4"]);
        assert!(tokens("class-attribute", r#"<div className="flex">"#).is_empty());
        assert!(tokens("class-attribute", r#"<div :class="'flex'">"#).is_empty());
    }

    #[test]
    fn test_helper_call_arguments() {
        let found = tokens("helper-call", r#"cn("px-2 py-1", isOpen && 'block', { hidden: x })"#);
        assert_eq!(found, vec!["px-2", "py-1", "block"]);
    }

    #[test]
    fn test_vue_binding_literals() {
        let found = tokens("vue-class-binding", r#"<p :class="{ 'text-red-500': bad, 'font-bold': strong }">"#);
        assert_eq!(found, vec!["text-red-500", "font-bold"]);
    }

    #[test]
    fn test_angular_toggle_and_svelte_directive() {
        assert_eq!(tokens("angular-class-toggle", r#"<li [class.bg-blue-100]="sel">"#), vec!["bg-blue-100"]);
        assert_eq!(tokens("svelte-class-directive", "<li class:underline={active}>"), vec!["underline"]);
        assert!(tokens("svelte-class-directive", "<li class:list={items}>").is_empty());
    }

    #[test]
    fn test_apply_directive_drops_important() {
        assert_eq!(tokens("apply-directive", ".btn { @apply px-4 py-2 !important; }"), vec!["px-4", "py-2"]);
    }

    #[test]
    fn test_css_selector_ignores_numbers() {
        let found = tokens("css-selector", ".card { opacity: 0.5; }\n.title:hover {}");
        assert_eq!(found, vec!["card", "title"]);
    }
}
