// src/core/design_system/candidate.rs
//! Candidate parsing: variants, important markers, negatives, and every
//! plausible root/value split of the utility part.

use super::variants::{parse_variant, VariantEffect};
use super::DesignSystem;

/// A value written after a utility root
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CandidateValue {
    /// `red-500`, `4`, `1/2`
    Named(String),
    /// `[...]` or `(--var)`, already unwrapped
    Arbitrary(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UtilityRef {
    Static(String),
    Functional {
        root: String,
        value: Option<CandidateValue>,
        modifier: Option<CandidateValue>,
    },
    ArbitraryProperty { property: String, value: String },
}

/// One interpretation of a candidate string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCandidate {
    pub raw: String,
    pub variants: Vec<VariantEffect>,
    pub utility: UtilityRef,
    pub important: bool,
    pub negative: bool,
}

/// All interpretations of `raw`; empty when nothing parses
pub fn parse_candidate(raw: &str, system: &DesignSystem) -> Vec<ParsedCandidate> {
    if raw.is_empty() || raw.chars().any(char::is_whitespace) {
        return Vec::new();
    }

    let segments = split_top_level(raw, ':');
    let Some((base, variant_parts)) = segments.split_last() else {
        return Vec::new();
    };

    let mut variants = Vec::with_capacity(variant_parts.len());
    for part in variant_parts {
        match parse_variant(part, system) {
            Some(variant) => variants.push(variant),
            None => return Vec::new(),
        }
    }

    let (base, important) = strip_important(base);
    if base.is_empty() {
        return Vec::new();
    }

    let make = |utility: UtilityRef, negative: bool| ParsedCandidate {
        raw: raw.to_string(),
        variants: variants.clone(),
        utility,
        important,
        negative,
    };
    let mut parsed = Vec::new();

    if let Some(inner) = base.strip_prefix('[').and_then(|b| b.strip_suffix(']')) {
        if let Some(utility) = parse_arbitrary_property(inner) {
            parsed.push(make(utility, false));
        }
        return parsed;
    }

    if system.has_static(base) {
        parsed.push(make(UtilityRef::Static(base.to_string()), false));
    }

    let (body, negative) = match base.strip_prefix('-') {
        Some(rest) => (rest, true),
        None => (base, false),
    };

    if system.has_functional_root(body) {
        parsed.push(make(functional(body, None, None), negative));
    }

    for dash in top_level_positions(body, '-') {
        let (root, rest) = (&body[..dash], &body[dash + 1..]);
        if root.is_empty() || rest.is_empty() || !system.has_functional_root(root) {
            continue;
        }

        if let Some(value) = parse_value(rest) {
            parsed.push(make(functional(root, Some(value), None), negative));
        }
        if let Some(&slash) = top_level_positions(rest, '/').last() {
            let (value, modifier) = (&rest[..slash], &rest[slash + 1..]);
            if let (Some(value), Some(modifier)) = (parse_value(value), parse_value(modifier)) {
                parsed.push(make(functional(root, Some(value), Some(modifier)), negative));
            }
        }
    }

    parsed
}

fn functional(root: &str, value: Option<CandidateValue>, modifier: Option<CandidateValue>) -> UtilityRef {
    UtilityRef::Functional { root: root.to_string(), value, modifier }
}

/// `!flex` and `flex!` both mark the utility important
fn strip_important(base: &str) -> (&str, bool) {
    if let Some(rest) = base.strip_prefix('!') {
        (rest, true)
    } else if let Some(rest) = base.strip_suffix('!') {
        (rest, true)
    } else {
        (base, false)
    }
}

/// `[mask-type:luminance]`
fn parse_arbitrary_property(inner: &str) -> Option<UtilityRef> {
    let (property, value) = inner.split_once(':')?;
    let valid_property = !property.is_empty()
        && property.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        && !property.starts_with(|c: char| c.is_ascii_digit());
    if !valid_property || value.is_empty() {
        return None;
    }
    Some(UtilityRef::ArbitraryProperty {
        property: property.to_string(),
        value: value.replace('_', " "),
    })
}

pub(super) fn parse_value(text: &str) -> Option<CandidateValue> {
    if let Some(inner) = text.strip_prefix('[').and_then(|t| t.strip_suffix(']')) {
        if inner.is_empty() || !balanced(inner) {
            return None;
        }
        return Some(CandidateValue::Arbitrary(inner.replace('_', " ")));
    }
    if let Some(inner) = text.strip_prefix('(').and_then(|t| t.strip_suffix(')')) {
        // `bg-(--brand)` shorthand for `bg-[var(--brand)]`, `bg-(image:--x)` keeps its type hint
        let (hint, variable) = match inner.split_once(':') {
            Some((hint, variable)) => (Some(hint), variable),
            None => (None, inner),
        };
        if !variable.starts_with("--") || variable.len() <= 2 {
            return None;
        }
        return Some(CandidateValue::Arbitrary(match hint {
            Some(hint) if !hint.is_empty() => format!("{hint}:var({variable})"),
            Some(_) => return None,
            None => format!("var({variable})"),
        }));
    }

    let simple = !text.is_empty()
        && text.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '/' | '%'));
    simple.then(|| CandidateValue::Named(text.to_string()))
}

fn balanced(text: &str) -> bool {
    let mut depth = 0i32;
    for c in text.chars() {
        match c {
            '[' | '(' => depth += 1,
            ']' | ')' => {
                depth -= 1;
                if depth < 0 {
                    return false;
                }
            }
            _ => {}
        }
    }
    depth == 0
}

/// Byte positions of `sep` outside `[...]` and `(...)`
pub(super) fn top_level_positions(text: &str, sep: char) -> Vec<usize> {
    let mut depth = 0i32;
    let mut positions = Vec::new();
    for (i, c) in text.char_indices() {
        match c {
            '[' | '(' => depth += 1,
            ']' | ')' => depth -= 1,
            c if c == sep && depth == 0 && i > 0 => positions.push(i),
            _ => {}
        }
    }
    positions
}

/// Split on `sep` outside brackets; a leading separator yields an empty part
pub(super) fn split_top_level(text: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut depth = 0i32;
    for (i, c) in text.char_indices() {
        match c {
            '[' | '(' => depth += 1,
            ']' | ')' => depth -= 1,
            c if c == sep && depth == 0 => {
                parts.push(&text[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&text[start..]);
    parts
}
