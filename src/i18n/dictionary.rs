//! Translation dictionaries and dotted key-path lookup.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

/// What: Immutable translation dictionary for one language.
///
/// Details:
/// - Stores the nested document as it was loaded (object of objects).
/// - Leaves are strings, or attribute bundles (objects whose values are all strings).
/// - An empty dictionary is what failed loads degrade to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dictionary {
    root: Map<String, Value>,
}

/// Value found at the end of a key path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Leaf<'a> {
    /// Plain string leaf.
    Text(&'a str),
    /// Attribute bundle: attribute name -> value.
    Attributes(BTreeMap<&'a str, &'a str>),
}

impl<'a> Leaf<'a> {
    /// What: Return the string if this leaf is a plain text leaf.
    #[must_use]
    pub const fn as_text(&self) -> Option<&'a str> {
        match self {
            Self::Text(s) => Some(*s),
            Self::Attributes(_) => None,
        }
    }
}

impl Dictionary {
    /// What: Create an empty dictionary.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// What: Build a dictionary from a parsed document.
    ///
    /// Inputs:
    /// - `value`: Parsed JSON/YAML document
    ///
    /// Output:
    /// - `Some(Dictionary)` when the top level is an object, `None` otherwise
    #[must_use]
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(root) => Some(Self { root }),
            _ => None,
        }
    }

    /// What: Check whether the dictionary has no entries at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    /// What: Count string leaves reachable from the root.
    ///
    /// Details:
    /// - Attribute bundles count one per attribute, since each entry is a string leaf.
    #[must_use]
    pub fn leaf_count(&self) -> usize {
        fn count(map: &Map<String, Value>) -> usize {
            map.values()
                .map(|v| match v {
                    Value::String(_) => 1,
                    Value::Object(inner) => count(inner),
                    _ => 0,
                })
                .sum()
        }
        count(&self.root)
    }

    /// What: Flatten the dictionary into dot-notation keys.
    ///
    /// Output:
    /// - Sorted list of every key path that resolves to a string
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        fn walk(map: &Map<String, Value>, prefix: &str, out: &mut Vec<String>) {
            for (key, value) in map {
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };
                match value {
                    Value::String(_) => out.push(path),
                    Value::Object(inner) => walk(inner, &path, out),
                    _ => {}
                }
            }
        }
        let mut out = Vec::new();
        walk(&self.root, "", &mut out);
        out.sort();
        out
    }

    /// What: Resolve a dotted key path to a leaf.
    ///
    /// Inputs:
    /// - `key_path`: Dot-notation key (e.g., "nav.home")
    ///
    /// Output:
    /// - `Some(Leaf)` when every segment exists and the final value is a string or
    ///   an attribute bundle, `None` otherwise
    ///
    /// Details:
    /// - Cannot descend into a string: "a.b.c" is absent when "a.b" is a string.
    /// - Empty key paths and empty segments are absent.
    #[must_use]
    pub fn resolve(&self, key_path: &str) -> Option<Leaf<'_>> {
        if key_path.is_empty() {
            return None;
        }
        let mut segments = key_path.split('.');
        let first = segments.next()?;
        let mut current = self.root.get(first)?;
        for segment in segments {
            match current {
                Value::Object(map) => current = map.get(segment)?,
                _ => return None,
            }
        }
        match current {
            Value::String(s) => Some(Leaf::Text(s)),
            Value::Object(map) => as_bundle(map).map(Leaf::Attributes),
            _ => None,
        }
    }

    /// What: Resolve a key path and accept only plain string leaves.
    #[must_use]
    pub fn text(&self, key_path: &str) -> Option<&str> {
        self.resolve(key_path).and_then(|leaf| leaf.as_text())
    }
}

/// What: Interpret an object as an attribute bundle.
///
/// Details:
/// - Every value must be a string; an empty object is not a bundle.
fn as_bundle(map: &Map<String, Value>) -> Option<BTreeMap<&str, &str>> {
    if map.is_empty() {
        return None;
    }
    map.iter()
        .map(|(name, value)| value.as_str().map(|v| (name.as_str(), v)))
        .collect()
}

/// What: Resolve a key path against a dictionary.
///
/// Inputs:
/// - `dictionary`: Dictionary to search
/// - `key_path`: Dot-notation key
///
/// Output:
/// - Leaf value, or `None` when absent (absence is a normal outcome)
#[must_use]
pub fn resolve<'a>(dictionary: &'a Dictionary, key_path: &str) -> Option<Leaf<'a>> {
    dictionary.resolve(key_path)
}

/// What: Substitute positional `{}` placeholders in a translated string.
///
/// Inputs:
/// - `template`: Translated string
/// - `args`: Format arguments (as Display trait objects)
///
/// Output:
/// - String with the first `{}` replaced by the first argument, and so on
///
/// Details:
/// - Surplus arguments are ignored; surplus placeholders are left as-is.
#[must_use]
pub fn format_placeholders(template: &str, args: &[&dyn std::fmt::Display]) -> String {
    let mut result = template.to_string();
    for arg in args {
        result = result.replacen("{}", &arg.to_string(), 1);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn dict(value: Value) -> Dictionary {
        Dictionary::from_value(value).expect("test dictionary must be an object")
    }

    #[test]
    fn test_resolve_nested_string() {
        let d = dict(json!({"a": {"b": "Hello"}}));
        assert_eq!(resolve(&d, "a.b"), Some(Leaf::Text("Hello")));
        assert_eq!(resolve(&d, "a.c"), None);
        assert_eq!(resolve(&d, "a.b.c"), None);
    }

    #[test]
    fn test_resolve_rejects_non_leaf_types() {
        let d = dict(json!({
            "n": 3,
            "list": ["x", "y"],
            "empty": {},
            "mixed": {"title": "T", "nested": {"x": "y"}}
        }));
        assert_eq!(d.resolve("n"), None);
        assert_eq!(d.resolve("list"), None);
        assert_eq!(d.resolve("empty"), None);
        assert_eq!(d.resolve("mixed"), None);
        assert_eq!(d.resolve("mixed.title"), Some(Leaf::Text("T")));
        assert_eq!(d.resolve(""), None);
        assert_eq!(d.resolve("mixed."), None);
    }

    #[test]
    fn test_resolve_attribute_bundle() {
        let d = dict(json!({"search": {"input": {"placeholder": "Find", "aria-label": "Search"}}}));
        let leaf = d.resolve("search.input").expect("bundle should resolve");
        let Leaf::Attributes(attrs) = leaf else {
            panic!("expected attribute bundle");
        };
        assert_eq!(attrs.get("placeholder"), Some(&"Find"));
        assert_eq!(attrs.get("aria-label"), Some(&"Search"));
        assert_eq!(d.text("search.input"), None);
        assert_eq!(d.text("search.input.placeholder"), Some("Find"));
    }

    #[test]
    fn test_from_value_requires_object() {
        assert!(Dictionary::from_value(json!(["a"])).is_none());
        assert!(Dictionary::from_value(json!("a")).is_none());
        assert!(Dictionary::from_value(json!({})).is_some_and(|d| d.is_empty()));
    }

    #[test]
    fn test_keys_and_leaf_count() {
        let d = dict(json!({"nav": {"home": "Home", "tools": "Tools"}, "title": "Site", "n": 1}));
        assert_eq!(d.keys(), vec!["nav.home", "nav.tools", "title"]);
        assert_eq!(d.leaf_count(), 3);
    }

    #[test]
    fn test_format_placeholders() {
        assert_eq!(
            format_placeholders("{} of {} files", &[&3, &"10"]),
            "3 of 10 files"
        );
        assert_eq!(format_placeholders("no args {}", &[]), "no args {}");
        assert_eq!(format_placeholders("plain", &[&1]), "plain");
    }
}
