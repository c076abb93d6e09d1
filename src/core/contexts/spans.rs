// src/core/contexts/spans.rs
//! Delimiter-aware text scanning shared by the context rules.
//!
//! Rules never parse a full grammar. They locate an opening construct with a
//! regex and then use the helpers here to find where it ends, which string
//! literals it contains, and which parts are template interpolation rather
//! than static class-list text.

/// A byte range of static class-list text.
///
/// `glued_start` / `glued_end` mark edges that touch an interpolation with no
/// whitespace in between. A token on such an edge is only part of a class
/// name (`bg-${tone}-500`) and is discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassSpan {
    pub start: usize,
    pub end: usize,
    pub glued_start: bool,
    pub glued_end: bool,
}

impl ClassSpan {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end, glued_start: false, glued_end: false }
    }

    /// Whitespace-separated tokens with their absolute byte offsets.
    pub fn tokens<'a>(&self, text: &'a str) -> Vec<(usize, &'a str)> {
        let slice = &text[self.start..self.end];
        let mut bounds = Vec::new();
        let mut token_start = None;

        for (i, ch) in slice.char_indices() {
            if ch.is_whitespace() {
                if let Some(s) = token_start.take() {
                    bounds.push((s, i));
                }
            } else if token_start.is_none() {
                token_start = Some(i);
            }
        }
        if let Some(s) = token_start {
            bounds.push((s, slice.len()));
        }

        if self.glued_start && bounds.first().is_some_and(|&(s, _)| s == 0) {
            bounds.remove(0);
        }
        if self.glued_end && bounds.last().is_some_and(|&(_, e)| e == slice.len()) {
            bounds.pop();
        }

        bounds
            .into_iter()
            .map(|(s, e)| (self.start + s, &slice[s..e]))
            .collect()
    }
}

/// Which embedded expressions are cut out of a class-list value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interpolation {
    /// Plain literal, nothing is removed
    None,
    /// `${...}` only (template literals)
    Dollar,
    /// `${...}`, `{...}`, `{{...}}` and `{%...%}` (HTML-ish template languages)
    Braces,
}

/// Which string literal forms count as class lists inside an expression
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralKinds {
    /// `"..."` and `'...'`
    Quoted,
    /// Backtick template literals
    Template,
}

/// Find the byte index of the delimiter closing a construct whose body starts
/// at `from`. Quoted strings inside the body are skipped.
pub fn find_closing(text: &str, from: usize, open: u8, close: u8) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut depth = 1usize;
    let mut i = from;

    while i < bytes.len() {
        let b = bytes[i];
        if b == b'"' || b == b'\'' || b == b'`' {
            i = skip_string(text, i)?;
            continue;
        }
        if b == open {
            depth += 1;
        } else if b == close {
            depth -= 1;
            if depth == 0 {
                return Some(i);
            }
        }
        i += 1;
    }

    None
}

/// Index just past the string literal opening at `quote_at`
fn skip_string(text: &str, quote_at: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    let quote = bytes[quote_at];
    let mut i = quote_at + 1;

    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'$' if quote == b'`' && bytes.get(i + 1) == Some(&b'{') => {
                i = find_closing(text, i + 2, b'{', b'}')? + 1;
            }
            b if b == quote => return Some(i + 1),
            _ => i += 1,
        }
    }

    None
}

/// Split `text[start..end]` into static spans, dropping interpolations.
pub fn split_interpolations(text: &str, start: usize, end: usize, mode: Interpolation) -> Vec<ClassSpan> {
    if mode == Interpolation::None {
        return vec![ClassSpan::new(start, end)];
    }

    let bytes = text.as_bytes();
    let mut spans = Vec::new();
    let mut current = ClassSpan::new(start, start);
    let mut i = start;

    while i < end {
        let opens_dollar = bytes[i] == b'$' && i + 1 < end && bytes[i + 1] == b'{';
        let opens_brace = mode == Interpolation::Braces && bytes[i] == b'{';

        if opens_dollar || opens_brace {
            let body = if opens_dollar { i + 2 } else { i + 1 };
            let close = find_closing(&text[..end], body, b'{', b'}').unwrap_or(end.saturating_sub(1));

            current.end = i;
            current.glued_end = i > start && !bytes[i - 1].is_ascii_whitespace();
            if current.end > current.start {
                spans.push(current);
            }

            let resume = (close + 1).min(end);
            current = ClassSpan::new(resume, resume);
            current.glued_start = resume < end && !bytes[resume].is_ascii_whitespace();
            i = resume;
            continue;
        }
        i += 1;
    }

    current.end = end;
    if current.end > current.start {
        spans.push(current);
    }
    spans
}

/// String literals found in `text[start..end]`, as static spans.
pub fn string_literals(text: &str, start: usize, end: usize, kinds: LiteralKinds) -> Vec<ClassSpan> {
    let bytes = text.as_bytes();
    let scope = &text[..end];
    let mut spans = Vec::new();
    let mut i = start;

    while i < end {
        let b = bytes[i];
        if b != b'"' && b != b'\'' && b != b'`' {
            i += 1;
            continue;
        }

        // Unterminated literal: nothing after it can be trusted
        let Some(after) = skip_string(scope, i) else { break };
        let inner = (i + 1, after - 1);

        match (kinds, b) {
            (LiteralKinds::Quoted, b'"' | b'\'') => spans.push(ClassSpan::new(inner.0, inner.1)),
            (LiteralKinds::Template, b'`') => {
                spans.extend(split_interpolations(text, inner.0, inner.1, Interpolation::Dollar))
            }
            _ => {}
        }
        i = after;
    }

    spans
}
