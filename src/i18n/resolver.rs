//! Language resolution: alias chains and initial-language selection.

use std::collections::{BTreeMap, HashSet};

use crate::config::I18nConfig;
use crate::i18n::detection::match_supported;

/// Longest alias chain followed before giving up.
const MAX_ALIAS_STEPS: usize = 10;

/// What: Follow the alias chain for `lang` until a supported language is reached.
///
/// Inputs:
/// - `lang`: Initial language code
/// - `aliases`: Map of code -> alias target
/// - `supported`: Supported language codes
///
/// Output:
/// - `Some(code)` of a supported language, or `None` if the chain ends elsewhere
///
/// Details:
/// - Aliases are followed before checking support, so `zh-CN: zh` always maps.
/// - Cycles and chains longer than ten steps resolve to `None`.
fn follow_aliases(
    lang: &str,
    aliases: &BTreeMap<String, String>,
    supported: &[String],
) -> Option<String> {
    let mut current = lang.to_string();
    let mut visited = HashSet::new();

    while visited.insert(current.clone()) {
        if let Some(target) = aliases.get(&current) {
            tracing::debug!("Language '{}' aliases to '{}'", current, target);
            current.clone_from(target);
        } else if supported.contains(&current) {
            return Some(current);
        } else {
            tracing::debug!("Language '{}' has no alias and is not supported", current);
            return None;
        }

        if visited.len() > MAX_ALIAS_STEPS {
            tracing::warn!(
                "Alias chain too long ({} steps) for language '{}'",
                visited.len(),
                lang
            );
            return None;
        }
    }

    tracing::warn!("Detected cycle in alias chain for language '{}'", lang);
    None
}

/// What: Language resolver over a configuration.
#[derive(Debug, Clone, Copy)]
pub struct LanguageResolver<'a> {
    config: &'a I18nConfig,
}

impl<'a> LanguageResolver<'a> {
    /// What: Create a resolver for `config`.
    #[must_use]
    pub const fn new(config: &'a I18nConfig) -> Self {
        Self { config }
    }

    /// What: Map a requested code to a supported one, if possible.
    ///
    /// Output:
    /// - Supported code after trimming and alias resolution, or `None`
    #[must_use]
    pub fn supported(&self, lang: &str) -> Option<String> {
        let lang = lang.trim();
        if lang.is_empty() {
            return None;
        }
        follow_aliases(lang, &self.config.aliases, &self.config.supported)
    }

    /// What: Map a requested code to a supported one, or the default language.
    #[must_use]
    pub fn canonicalize(&self, lang: &str) -> String {
        self.supported(lang).unwrap_or_else(|| {
            if !lang.trim().is_empty() {
                tracing::warn!(
                    "Language '{}' is not supported, using default '{}'",
                    lang.trim(),
                    self.config.default_language
                );
            }
            self.config.default_language.clone()
        })
    }

    /// What: Choose the language to activate at boot.
    ///
    /// Inputs:
    /// - `stored`: Persisted preference, if any
    /// - `candidates`: Locale candidates in priority order (used only when detection is enabled)
    ///
    /// Output:
    /// - Supported language code
    ///
    /// Details:
    /// - A stored preference wins when supported; an unsupported one yields the default.
    /// - The locale guess (if enabled) is consulted only when nothing is stored.
    #[must_use]
    pub fn initial_language(&self, stored: Option<&str>, candidates: &[String]) -> String {
        if let Some(stored) = stored {
            if let Some(lang) = self.supported(stored) {
                tracing::debug!("Using stored language preference '{}'", lang);
                return lang;
            }
            tracing::warn!(
                "Stored language preference '{}' is not supported, using default: {}",
                stored,
                self.config.default_language
            );
            return self.config.default_language.clone();
        }

        if self.config.detect_locale {
            let mapped: Vec<String> = candidates
                .iter()
                .map(|c| self.supported(c).unwrap_or_else(|| c.clone()))
                .collect();
            if let Some(lang) = match_supported(&mapped, &self.config.supported) {
                tracing::debug!("Detected language '{}' from locale {:?}", lang, candidates);
                return lang;
            }
            tracing::debug!(
                "Locale detection found no supported language, using default: {}",
                self.config.default_language
            );
        }

        self.config.default_language.clone()
    }
}
