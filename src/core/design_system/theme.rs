// src/core/design_system/theme.rs
use std::collections::{BTreeMap, HashMap};

/// Theme namespaces understood in `@theme` blocks, longest first so that
/// `--font-weight-*` is not mistaken for `--font-*`
pub const NAMESPACES: &[&str] = &[
    "inset-shadow",
    "drop-shadow",
    "font-weight",
    "perspective",
    "breakpoint",
    "container",
    "tracking",
    "leading",
    "spacing",
    "animate",
    "aspect",
    "radius",
    "shadow",
    "color",
    "text",
    "font",
    "blur",
    "ease",
];

const COLOR_FAMILIES: &[&str] = &[
    "red", "orange", "amber", "yellow", "lime", "green", "emerald", "teal", "cyan", "sky", "blue",
    "indigo", "violet", "purple", "fuchsia", "pink", "rose", "slate", "gray", "zinc", "neutral",
    "stone",
];

const COLOR_SHADES: &[&str] = &["50", "100", "200", "300", "400", "500", "600", "700", "800", "900", "950"];

/// Theme values grouped by namespace
#[derive(Debug, Clone, Default)]
pub struct Theme {
    namespaces: HashMap<String, BTreeMap<String, String>>,
    /// Variables outside every known namespace, keyed without the `--`
    extra: BTreeMap<String, String>,
}

impl Theme {
    /// The default theme shipped with the base definitions
    pub fn builtin() -> Self {
        let mut theme = Self::default();

        for family in COLOR_FAMILIES {
            for shade in COLOR_SHADES {
                let key = format!("{family}-{shade}");
                let value = format!("var(--tw-palette-{key})");
                theme.insert("color", &key, &value);
            }
        }
        theme.insert("color", "black", "#000");
        theme.insert("color", "white", "#fff");

        theme.fill("breakpoint", &[("sm", "40rem"), ("md", "48rem"), ("lg", "64rem"), ("xl", "80rem"), ("2xl", "96rem")]);
        theme.fill(
            "container",
            &[
                ("3xs", "16rem"), ("2xs", "18rem"), ("xs", "20rem"), ("sm", "24rem"), ("md", "28rem"),
                ("lg", "32rem"), ("xl", "36rem"), ("2xl", "42rem"), ("3xl", "48rem"), ("4xl", "56rem"),
                ("5xl", "64rem"), ("6xl", "72rem"), ("7xl", "80rem"),
            ],
        );
        theme.fill(
            "text",
            &[
                ("xs", "0.75rem"), ("sm", "0.875rem"), ("base", "1rem"), ("lg", "1.125rem"), ("xl", "1.25rem"),
                ("2xl", "1.5rem"), ("3xl", "1.875rem"), ("4xl", "2.25rem"), ("5xl", "3rem"), ("6xl", "3.75rem"),
                ("7xl", "4.5rem"), ("8xl", "6rem"), ("9xl", "8rem"),
            ],
        );
        theme.fill("font", &[("sans", "ui-sans-serif, system-ui, sans-serif"), ("serif", "ui-serif, Georgia, serif"), ("mono", "ui-monospace, monospace")]);
        theme.fill(
            "font-weight",
            &[
                ("thin", "100"), ("extralight", "200"), ("light", "300"), ("normal", "400"), ("medium", "500"),
                ("semibold", "600"), ("bold", "700"), ("extrabold", "800"), ("black", "900"),
            ],
        );
        theme.fill("tracking", &[("tighter", "-0.05em"), ("tight", "-0.025em"), ("normal", "0em"), ("wide", "0.025em"), ("wider", "0.05em"), ("widest", "0.1em")]);
        theme.fill("leading", &[("tight", "1.25"), ("snug", "1.375"), ("normal", "1.5"), ("relaxed", "1.625"), ("loose", "2")]);
        theme.fill(
            "radius",
            &[
                ("xs", "0.125rem"), ("sm", "0.25rem"), ("md", "0.375rem"), ("lg", "0.5rem"), ("xl", "0.75rem"),
                ("2xl", "1rem"), ("3xl", "1.5rem"), ("4xl", "2rem"),
            ],
        );
        for ns in ["shadow", "drop-shadow"] {
            for key in ["2xs", "xs", "sm", "md", "lg", "xl", "2xl"] {
                theme.insert(ns, key, &format!("var(--tw-{ns}-{key})"));
            }
        }
        for key in ["2xs", "xs", "sm"] {
            theme.insert("inset-shadow", key, &format!("var(--tw-inset-shadow-{key})"));
        }
        theme.fill("blur", &[("xs", "4px"), ("sm", "8px"), ("md", "12px"), ("lg", "16px"), ("xl", "24px"), ("2xl", "40px"), ("3xl", "64px")]);
        theme.fill("perspective", &[("dramatic", "100px"), ("near", "300px"), ("normal", "500px"), ("midrange", "800px"), ("distant", "1200px")]);
        theme.fill("aspect", &[("video", "16 / 9")]);
        theme.fill("ease", &[("in", "cubic-bezier(0.4, 0, 1, 1)"), ("out", "cubic-bezier(0, 0, 0.2, 1)"), ("in-out", "cubic-bezier(0.4, 0, 0.2, 1)")]);
        theme.fill("animate", &[("spin", "spin 1s linear infinite"), ("ping", "ping 1s cubic-bezier(0, 0, 0.2, 1) infinite"), ("pulse", "pulse 2s cubic-bezier(0.4, 0, 0.6, 1) infinite"), ("bounce", "bounce 1s infinite")]);

        theme
    }

    fn fill(&mut self, namespace: &str, entries: &[(&str, &str)]) {
        for (key, value) in entries {
            self.insert(namespace, key, value);
        }
    }

    pub fn insert(&mut self, namespace: &str, key: &str, value: &str) {
        self.namespaces
            .entry(namespace.to_string())
            .or_default()
            .insert(key.to_string(), value.to_string());
    }

    pub fn get(&self, namespace: &str, key: &str) -> Option<&str> {
        self.namespaces.get(namespace)?.get(key).map(String::as_str)
    }

    pub fn contains(&self, namespace: &str, key: &str) -> bool {
        self.get(namespace, key).is_some()
    }

    /// Entries of one namespace, ordered by key
    pub fn entries(&self, namespace: &str) -> impl Iterator<Item = (&str, &str)> {
        self.namespaces
            .get(namespace)
            .into_iter()
            .flat_map(|values| values.iter().map(|(k, v)| (k.as_str(), v.as_str())))
    }

    /// Look up a full variable name such as `--tab-size-github`
    pub fn variable(&self, name: &str) -> Option<&str> {
        let name = name.trim_start_matches("--");
        let known = NAMESPACES.iter().find_map(|ns| {
            let key = name.strip_prefix(*ns)?.strip_prefix('-')?;
            self.get(ns, key)
        });
        known.or_else(|| self.extra.get(name).map(String::as_str))
    }

    /// Apply one `--name: value` declaration from an `@theme` block.
    /// Returns false when the variable belongs to no known namespace.
    pub fn apply_variable(&mut self, name: &str, value: &str) -> bool {
        let name = name.trim_start_matches("--");
        let value = value.trim();

        if name == "*" {
            if value == "initial" {
                self.namespaces.clear();
                self.extra.clear();
            }
            return true;
        }

        let Some(namespace) = NAMESPACES.iter().find(|ns| {
            name == **ns || name.strip_prefix(**ns).is_some_and(|rest| rest.starts_with('-'))
        }) else {
            if value == "initial" {
                self.extra.remove(name);
            } else {
                self.extra.insert(name.to_string(), value.to_string());
            }
            return false;
        };

        let key = name[namespace.len()..].trim_start_matches('-');
        if key == "*" {
            if value == "initial" {
                self.namespaces.remove(*namespace);
            }
            return true;
        }
        // Bare `--spacing` and sub-properties like `--text-lg--line-height`
        if key.is_empty() || key.contains("--") {
            return true;
        }

        if value == "initial" {
            if let Some(values) = self.namespaces.get_mut(*namespace) {
                values.remove(key);
            }
        } else {
            self.insert(namespace, key, value);
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_palette() {
        let theme = Theme::builtin();
        assert!(theme.contains("color", "red-500"));
        assert!(theme.contains("color", "stone-950"));
        assert!(!theme.contains("color", "primary"));
        assert_eq!(theme.get("breakpoint", "md"), Some("48rem"));
    }

    #[test]
    fn test_apply_variable_namespaces() {
        let mut theme = Theme::builtin();
        assert!(theme.apply_variable("--color-primary", "#3b82f6"));
        assert!(theme.apply_variable("--font-weight-heavy", "950"));
        assert!(theme.apply_variable("--text-huge--line-height", "1"));
        assert!(!theme.apply_variable("--my-custom-thing", "1px"));

        assert!(theme.contains("color", "primary"));
        assert!(theme.contains("font-weight", "heavy"));
        assert!(!theme.contains("font", "weight-heavy"));
        assert!(!theme.contains("text", "huge--line-height"));
        assert_eq!(theme.variable("--my-custom-thing"), Some("1px"));
        assert_eq!(theme.variable("--color-primary"), Some("#3b82f6"));
    }

    #[test]
    fn test_namespace_reset() {
        let mut theme = Theme::builtin();
        theme.apply_variable("--color-*", "initial");
        theme.apply_variable("--color-brand", "red");
        assert!(!theme.contains("color", "red-500"));
        assert!(theme.contains("color", "brand"));

        theme.apply_variable("--*", "initial");
        assert!(!theme.contains("color", "brand"));
        assert_eq!(theme.entries("text").count(), 0);
    }
}
