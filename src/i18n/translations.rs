//! Fallback-chain lookup over loaded dictionaries.

use std::collections::BTreeMap;

use crate::i18n::dictionary::{Dictionary, Leaf};

/// What: Snapshot of the dictionaries a lookup may consult.
///
/// Details:
/// - Tiers: active dictionary -> default-language dictionary -> raw key path.
/// - `default` is `None` when the default language is the active one or has not loaded.
#[derive(Debug, Clone, Copy)]
pub struct FallbackChain<'a> {
    active: &'a Dictionary,
    default: Option<&'a Dictionary>,
}

impl<'a> FallbackChain<'a> {
    /// What: Build a chain from the active and default dictionaries.
    #[must_use]
    pub const fn new(active: &'a Dictionary, default: Option<&'a Dictionary>) -> Self {
        Self { active, default }
    }

    /// What: Look up a display string, never failing.
    ///
    /// Output:
    /// - Active value, else default-language value, else the key path itself
    #[must_use]
    pub fn text(&self, key: &str) -> String {
        translate_with_fallback(key, self.active, self.default)
    }

    /// What: Look up an attribute bundle through the first two tiers.
    ///
    /// Output:
    /// - Attribute name -> value, or `None` when neither dictionary has a bundle at `key`
    #[must_use]
    pub fn bundle(&self, key: &str) -> Option<BTreeMap<&'a str, &'a str>> {
        let from = |d: &'a Dictionary| match d.resolve(key) {
            Some(Leaf::Attributes(attrs)) => Some(attrs),
            _ => None,
        };
        from(self.active).or_else(|| self.default.and_then(from))
    }
}

/// What: Look up a translation in a single dictionary.
///
/// Inputs:
/// - `key`: Dot-notation key (e.g., "nav.home")
/// - `dictionary`: Dictionary to search
///
/// Output:
/// - `Option<String>` containing translation or None if not found
#[must_use]
pub fn translate(key: &str, dictionary: &Dictionary) -> Option<String> {
    dictionary.text(key).map(str::to_string)
}

/// What: Look up a translation through the fallback chain.
///
/// Inputs:
/// - `key`: Dot-notation key
/// - `active`: Dictionary of the active language
/// - `default`: Dictionary of the default language, if loaded
///
/// Output:
/// - Translated string (from active or default, or key itself if both missing)
///
/// Details:
/// - Logs at debug level so missing keys are discoverable without flooding logs
pub fn translate_with_fallback(
    key: &str,
    active: &Dictionary,
    default: Option<&Dictionary>,
) -> String {
    if let Some(translation) = active.text(key) {
        return translation.to_string();
    }

    if let Some(translation) = default.and_then(|d| d.text(key)) {
        tracing::debug!(
            "Translation key '{}' not found in active language, using default",
            key
        );
        return translation.to_string();
    }

    tracing::debug!(
        "Missing translation key: '{}'. Returning key as-is. Please add this key to the dictionaries.",
        key
    );
    key.to_string()
}
