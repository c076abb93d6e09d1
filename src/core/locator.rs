// src/core/locator.rs
use std::collections::BTreeMap;
use serde::Serialize;

use super::contexts::ContextRuleSet;

/// One position where a token appears inside a recognised context
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Occurrence {
    /// 1-based line
    pub line: usize,
    /// 1-based column, in characters, of the token's first character
    pub column: usize,
    /// The trimmed source line
    pub context: String,
}

/// Every position of `target` inside a recognised context, ordered by
/// (line, column) with duplicates removed.
///
/// Works line by line so positions stay exact; a construct that spans
/// several lines is only seen where its opening line carries the token.
pub fn locate(text: &str, target: &str, rules: &ContextRuleSet) -> Vec<Occurrence> {
    if target.is_empty() {
        return Vec::new();
    }

    let mut found: BTreeMap<(usize, usize), Occurrence> = BTreeMap::new();

    for (index, line) in text.lines().enumerate() {
        if !contains_word(line, target) {
            continue;
        }

        for rule in rules.iter() {
            for (offset, token) in rule.tokens(line) {
                if token != target {
                    continue;
                }
                let line_no = index + 1;
                let column = line[..offset].chars().count() + 1;
                found.entry((line_no, column)).or_insert_with(|| Occurrence {
                    line: line_no,
                    column,
                    context: line.trim().to_string(),
                });
            }
        }
    }

    found.into_values().collect()
}

/// Characters that continue a class name on either side of a match
fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '-' | '_' | ':' | '/' | '[' | ']' | '!' | '@' | '%' | '*')
}

/// `target` occurs in `line` and is not a piece of a longer class name
pub fn contains_word(line: &str, target: &str) -> bool {
    line.match_indices(target).any(|(start, _)| {
        let end = start + target.len();
        let before_ok = line[..start].chars().next_back().map_or(true, |c| !is_word_char(c));
        let after_ok = line[end..].chars().next().map_or(true, |c| !is_word_char(c));
        before_ok && after_ok
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::contexts::EnabledContexts;

    fn rules() -> ContextRuleSet {
        ContextRuleSet::new(&EnabledContexts::default()).unwrap()
    }

    #[test]
    fn test_attribute_and_directive_lines() {
        let text = "<html>\n<body>\n  <div class=\"p-2 text-sm\">hi</div>\n</body>\n<style>\n.note {\n  @apply text-sm;\n}\n</style>\n";
        let found = locate(text, "text-sm", &rules());

        assert_eq!(found.len(), 2);
        assert_eq!((found[0].line, found[0].column), (3, 19));
        assert_eq!((found[1].line, found[1].column), (7, 10));
        assert_eq!(found[1].context, "@apply text-sm;");
    }

    #[test]
    fn test_whole_word_only() {
        let text = r#"<div class="text-sm-wide md:text-sm"></div>"#;
        assert!(locate(text, "text-sm", &rules()).is_empty());
        assert!(!contains_word("text-sm-wide", "text-sm"));
        assert!(contains_word("\"text-sm\"", "text-sm"));
    }

    #[test]
    fn test_overlapping_rules_deduplicate() {
        // Both the JSX expression rule and the helper rule see "flex"
        let text = r#"<div className={cn("flex gap-2")} />"#;
        let found = locate(text, "flex", &rules());
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].column, 21);
    }

    #[test]
    fn test_sorted_by_line_then_column() {
        let text = "<a class=\"x flex\"></a><b class=\"flex\"></b>\n<i class=\"flex\"></i>";
        let found = locate(text, "flex", &rules());
        let positions: Vec<(usize, usize)> = found.iter().map(|o| (o.line, o.column)).collect();
        assert_eq!(positions, vec![(1, 13), (1, 33), (2, 11)]);
    }

    #[test]
    fn test_outside_any_context_is_ignored() {
        let text = "const flex = true;\n// flex";
        assert!(locate(text, "flex", &rules()).is_empty());
    }

    #[test]
    fn test_columns_count_characters() {
        let text = r#"<p title="é" class="flex"></p>"#;
        let found = locate(text, "flex", &rules());
        assert_eq!(found[0].column, 21);
    }
}
