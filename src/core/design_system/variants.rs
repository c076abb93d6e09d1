// src/core/design_system/variants.rs
use super::candidate::{split_top_level, top_level_positions};
use super::{DesignSystem, OutputRule};

/// What a variant does to the rule a utility generates
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VariantEffect {
    /// Selector template; `&` stands for the utility's own selector
    Selector(String),
    /// Wrapping at-rule
    AtRule(String),
}

impl VariantEffect {
    pub fn apply(&self, rule: &mut OutputRule) {
        match self {
            VariantEffect::Selector(template) => rule.selector = template.replace('&', &rule.selector),
            VariantEffect::AtRule(at_rule) => rule.at_rules.push(at_rule.clone()),
        }
    }

    /// The part of a plain `&...` selector after the `&`, used by compound
    /// variants such as `group-hover` and `not-first`
    fn pseudo_suffix(&self) -> Option<&str> {
        match self {
            VariantEffect::Selector(template) => {
                let suffix = template.strip_prefix('&')?;
                (!suffix.contains('&')).then_some(suffix)
            }
            VariantEffect::AtRule(_) => None,
        }
    }
}

const PSEUDO_CLASSES: &[(&str, &str)] = &[
    ("hover", ":hover"),
    ("focus", ":focus"),
    ("focus-visible", ":focus-visible"),
    ("focus-within", ":focus-within"),
    ("active", ":active"),
    ("visited", ":visited"),
    ("target", ":target"),
    ("disabled", ":disabled"),
    ("enabled", ":enabled"),
    ("checked", ":checked"),
    ("indeterminate", ":indeterminate"),
    ("default", ":default"),
    ("required", ":required"),
    ("optional", ":optional"),
    ("valid", ":valid"),
    ("invalid", ":invalid"),
    ("user-valid", ":user-valid"),
    ("user-invalid", ":user-invalid"),
    ("in-range", ":in-range"),
    ("out-of-range", ":out-of-range"),
    ("placeholder-shown", ":placeholder-shown"),
    ("autofill", ":autofill"),
    ("read-only", ":read-only"),
    ("empty", ":empty"),
    ("first", ":first-child"),
    ("last", ":last-child"),
    ("only", ":only-child"),
    ("odd", ":nth-child(odd)"),
    ("even", ":nth-child(even)"),
    ("first-of-type", ":first-of-type"),
    ("last-of-type", ":last-of-type"),
    ("only-of-type", ":only-of-type"),
    ("open", ":is([open], :popover-open, :open)"),
    ("inert", ":is([inert], [inert] *)"),
    ("before", "::before"),
    ("after", "::after"),
    ("placeholder", "::placeholder"),
    ("file", "::file-selector-button"),
    ("marker", "::marker"),
    ("selection", "::selection"),
    ("first-line", "::first-line"),
    ("first-letter", "::first-letter"),
    ("backdrop", "::backdrop"),
    ("details-content", "::details-content"),
];

const AT_RULE_VARIANTS: &[(&str, &str)] = &[
    ("dark", "@media (prefers-color-scheme: dark)"),
    ("print", "@media print"),
    ("motion-safe", "@media (prefers-reduced-motion: no-preference)"),
    ("motion-reduce", "@media (prefers-reduced-motion: reduce)"),
    ("contrast-more", "@media (prefers-contrast: more)"),
    ("contrast-less", "@media (prefers-contrast: less)"),
    ("portrait", "@media (orientation: portrait)"),
    ("landscape", "@media (orientation: landscape)"),
    ("forced-colors", "@media (forced-colors: active)"),
    ("noscript", "@media (scripting: none)"),
    ("starting", "@starting-style"),
];

const SELECTOR_VARIANTS: &[(&str, &str)] = &[
    ("*", ":is(& > *)"),
    ("**", ":is(& *)"),
    ("rtl", "&:where(:dir(rtl), [dir=\"rtl\"], [dir=\"rtl\"] *)"),
    ("ltr", "&:where(:dir(ltr), [dir=\"ltr\"], [dir=\"ltr\"] *)"),
];

const ARIA_STATES: &[&str] = &[
    "busy", "checked", "disabled", "expanded", "hidden", "pressed", "readonly", "required", "selected",
];

/// Resolve one variant segment, `None` when it is not a known variant
pub fn parse_variant(raw: &str, system: &DesignSystem) -> Option<VariantEffect> {
    if raw.is_empty() {
        return None;
    }
    if let Some(custom) = system.custom_variants.get(raw) {
        return Some(custom.clone());
    }
    if let Some((_, pseudo)) = PSEUDO_CLASSES.iter().find(|(name, _)| *name == raw) {
        return Some(VariantEffect::Selector(format!("&{pseudo}")));
    }
    if let Some((_, at_rule)) = AT_RULE_VARIANTS.iter().find(|(name, _)| *name == raw) {
        return Some(VariantEffect::AtRule(at_rule.to_string()));
    }
    if let Some((_, template)) = SELECTOR_VARIANTS.iter().find(|(name, _)| *name == raw) {
        return Some(VariantEffect::Selector(template.to_string()));
    }
    if let Some(inner) = bracketed(raw) {
        return arbitrary_variant(inner);
    }
    if let Some(effect) = breakpoint_variant(raw, system) {
        return Some(effect);
    }
    if let Some(query) = raw.strip_prefix('@') {
        return container_variant(query, system);
    }

    let dash = *top_level_positions(raw, '-').first()?;
    let (prefix, rest) = (&raw[..dash], &raw[dash + 1..]);
    match prefix {
        "group" => relational_variant(rest, "group", " *", system),
        "peer" => relational_variant(rest, "peer", " ~ *", system),
        "not" => {
            let suffix = inner_selector(rest, system)?;
            Some(VariantEffect::Selector(format!("&:not({suffix})")))
        }
        "has" => {
            let suffix = inner_selector(rest, system)?;
            Some(VariantEffect::Selector(format!("&:has(*{suffix})")))
        }
        "in" => {
            let suffix = inner_selector(rest, system)?;
            Some(VariantEffect::Selector(format!(":where(*{suffix}) &")))
        }
        "aria" => {
            if let Some(inner) = bracketed(rest) {
                Some(VariantEffect::Selector(format!("&[aria-{inner}]")))
            } else if ARIA_STATES.contains(&rest) {
                Some(VariantEffect::Selector(format!("&[aria-{rest}=\"true\"]")))
            } else {
                None
            }
        }
        "data" => {
            let attribute = bracketed(rest).unwrap_or(rest);
            is_attribute_name(attribute.split('=').next().unwrap_or(""))
                .then(|| VariantEffect::Selector(format!("&[data-{attribute}]")))
        }
        "supports" => {
            if let Some(inner) = bracketed(rest) {
                Some(VariantEffect::AtRule(format!("@supports ({inner})")))
            } else {
                is_attribute_name(rest).then(|| VariantEffect::AtRule(format!("@supports ({rest}: var(--tw))")))
            }
        }
        "nth" => {
            let expression = bracketed(rest).or_else(|| rest.chars().all(|c| c.is_ascii_digit()).then_some(rest))?;
            Some(VariantEffect::Selector(format!("&:nth-child({expression})")))
        }
        _ => None,
    }
}

fn bracketed(text: &str) -> Option<&str> {
    let inner = text.strip_prefix('[')?.strip_suffix(']')?;
    (!inner.is_empty()).then_some(inner)
}

fn is_attribute_name(text: &str) -> bool {
    !text.is_empty() && text.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// `[&>*]`, `[@media(hover:hover)]`
fn arbitrary_variant(inner: &str) -> Option<VariantEffect> {
    let inner = inner.replace('_', " ");
    if inner.starts_with('@') {
        Some(VariantEffect::AtRule(inner))
    } else if inner.contains('&') {
        Some(VariantEffect::Selector(inner))
    } else {
        None
    }
}

/// `md`, `max-lg`, `min-[900px]`
fn breakpoint_variant(raw: &str, system: &DesignSystem) -> Option<VariantEffect> {
    if let Some(width) = system.theme.get("breakpoint", raw) {
        return Some(VariantEffect::AtRule(format!("@media (width >= {width})")));
    }
    let (operator, rest) = if let Some(rest) = raw.strip_prefix("max-") {
        ("<", rest)
    } else if let Some(rest) = raw.strip_prefix("min-") {
        (">=", rest)
    } else {
        return None;
    };
    let width = match bracketed(rest) {
        Some(arbitrary) => arbitrary.to_string(),
        None => system.theme.get("breakpoint", rest)?.to_string(),
    };
    Some(VariantEffect::AtRule(format!("@media (width {operator} {width})")))
}

/// `@md`, `@max-md`, `@[400px]`, with an optional `/name`
fn container_variant(query: &str, system: &DesignSystem) -> Option<VariantEffect> {
    let query = split_top_level(query, '/').first().copied().unwrap_or(query);
    let (operator, size) = match query.strip_prefix("max-") {
        Some(rest) => ("<", rest),
        None => (">=", query.strip_prefix("min-").unwrap_or(query)),
    };
    let width = match bracketed(size) {
        Some(arbitrary) => arbitrary.to_string(),
        None => system.theme.get("container", size)?.to_string(),
    };
    Some(VariantEffect::AtRule(format!("@container (width {operator} {width})")))
}

/// Pseudo suffix of a nested variant, or the contents of `[...]`
fn inner_selector(raw: &str, system: &DesignSystem) -> Option<String> {
    if let Some(inner) = bracketed(raw) {
        return Some(inner.replace('_', " ").replace('&', ""));
    }
    parse_variant(raw, system)?.pseudo_suffix().map(str::to_string)
}

/// `group-hover`, `peer-checked/email`, `group-[.active]`
fn relational_variant(rest: &str, marker: &str, combinator: &str, system: &DesignSystem) -> Option<VariantEffect> {
    let (inner, name) = match top_level_positions(rest, '/').last() {
        Some(&slash) => (&rest[..slash], Some(&rest[slash + 1..])),
        None => (rest, None),
    };
    let marker_selector = match name {
        Some(name) if is_attribute_name(name) => format!(".{marker}\\/{name}"),
        Some(_) => return None,
        None => format!(".{marker}"),
    };
    let suffix = inner_selector(inner, system)?;
    Some(VariantEffect::Selector(format!("&:is(:where({marker_selector}){suffix}{combinator})")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(raw: &str) -> Option<VariantEffect> {
        parse_variant(raw, &DesignSystem::new())
    }

    #[test]
    fn test_simple_variants() {
        assert_eq!(parse("hover"), Some(VariantEffect::Selector("&:hover".into())));
        assert_eq!(parse("md"), Some(VariantEffect::AtRule("@media (width >= 48rem)".into())));
        assert_eq!(parse("max-sm"), Some(VariantEffect::AtRule("@media (width < 40rem)".into())));
        assert!(matches!(parse("dark"), Some(VariantEffect::AtRule(_))));
        assert_eq!(parse("wobble"), None);
        assert_eq!(parse("max-huge"), None);
    }

    #[test]
    fn test_compound_variants() {
        assert_eq!(
            parse("group-hover"),
            Some(VariantEffect::Selector("&:is(:where(.group):hover *)".into()))
        );
        assert_eq!(
            parse("peer-checked/email"),
            Some(VariantEffect::Selector("&:is(:where(.peer\\/email):checked ~ *)".into()))
        );
        assert_eq!(parse("not-first"), Some(VariantEffect::Selector("&:not(:first-child)".into())));
        assert_eq!(parse("group-dark"), None);
    }

    #[test]
    fn test_attribute_and_arbitrary_variants() {
        assert_eq!(parse("aria-expanded"), Some(VariantEffect::Selector("&[aria-expanded=\"true\"]".into())));
        assert_eq!(parse("aria-nonsense"), None);
        assert_eq!(parse("data-[state=open]"), Some(VariantEffect::Selector("&[data-state=open]".into())));
        assert_eq!(parse("[&>*]"), Some(VariantEffect::Selector("&>*".into())));
        assert_eq!(parse("[.foo]"), None);
        assert!(matches!(parse("@lg"), Some(VariantEffect::AtRule(_))));
        assert!(matches!(parse("supports-[display:grid]"), Some(VariantEffect::AtRule(_))));
    }

    #[test]
    fn test_apply_to_rule() {
        let mut rule = OutputRule { selector: ".x".into(), at_rules: vec![], declarations: vec![] };
        VariantEffect::Selector("&:hover".into()).apply(&mut rule);
        VariantEffect::AtRule("@media print".into()).apply(&mut rule);
        assert_eq!(rule.selector, ".x:hover");
        assert_eq!(rule.at_rules, vec!["@media print"]);
    }
}
