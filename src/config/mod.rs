//! i18n configuration (`i18n.yml`) loading and normalization.
//!
//! ```yaml
//! base: /i18n/
//! default_language: en
//! supported: [en, zh]
//! preference_key: lang
//! detect_locale: false
//! format: json
//! aliases:
//!   zh-CN: zh
//! ```

mod paths;

pub use paths::{config_dir, preferences_path, resolve_config_path};

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::i18n::loader::{DictionaryFormat, is_valid_language_code};

/// Errors raised while reading the configuration file.
#[derive(Debug)]
pub enum ConfigError {
    /// The file could not be read.
    Io(std::io::Error),
    /// The YAML content could not be parsed into `I18nConfig`.
    Parse(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "failed to read i18n config: {e}"),
            Self::Parse(msg) => write!(f, "failed to parse i18n config: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Parse(_) => None,
        }
    }
}

/// Translator configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct I18nConfig {
    /// Base location of dictionary resources: a directory path or an http(s) URL.
    pub base: String,
    /// Language used as the fallback tier and when nothing else applies.
    pub default_language: String,
    /// Languages the site ships dictionaries for.
    pub supported: Vec<String>,
    /// Preference key the active language is persisted under.
    pub preference_key: String,
    /// Guess the initial language from the locale when no preference is stored.
    pub detect_locale: bool,
    /// Resource format.
    pub format: DictionaryFormat,
    /// Language code aliases (e.g., `zh-CN: zh`), followed as a chain.
    pub aliases: BTreeMap<String, String>,
}

impl Default for I18nConfig {
    fn default() -> Self {
        Self {
            base: "/i18n/".to_string(),
            default_language: "en".to_string(),
            supported: vec!["en".to_string()],
            preference_key: "lang".to_string(),
            detect_locale: false,
            format: DictionaryFormat::Json,
            aliases: BTreeMap::new(),
        }
    }
}

impl I18nConfig {
    /// What: Parse configuration from YAML text.
    ///
    /// # Errors
    /// - Returns `ConfigError::Parse` when the YAML is invalid or has wrongly typed fields
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let mut config: Self =
            serde_norway::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.normalize();
        Ok(config)
    }

    /// What: Load configuration from a YAML file.
    ///
    /// # Errors
    /// - Returns `ConfigError::Io` when the file cannot be read
    /// - Returns `ConfigError::Parse` when its content is invalid
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
        let config = Self::from_yaml(&content)?;
        tracing::debug!(
            path = %path.display(),
            default = %config.default_language,
            supported = ?config.supported,
            "Loaded i18n config"
        );
        Ok(config)
    }

    /// What: Normalize values parsed from the configuration file.
    ///
    /// Details:
    /// - Trims codes, drops invalid or duplicate supported languages.
    /// - Resets an invalid default language to "en" and makes sure it is supported.
    /// - Empty preference key falls back to "lang".
    pub fn normalize(&mut self) {
        self.default_language = self.default_language.trim().to_string();
        if !is_valid_language_code(&self.default_language) {
            tracing::warn!(
                "Invalid default_language '{}' in i18n config, using 'en'",
                self.default_language
            );
            self.default_language = "en".to_string();
        }

        let mut supported: Vec<String> = Vec::with_capacity(self.supported.len() + 1);
        for lang in &self.supported {
            let lang = lang.trim();
            if !is_valid_language_code(lang) {
                tracing::warn!("Ignoring invalid supported language '{}'", lang);
                continue;
            }
            if !supported.iter().any(|s| s == lang) {
                supported.push(lang.to_string());
            }
        }
        if !supported.contains(&self.default_language) {
            supported.insert(0, self.default_language.clone());
        }
        self.supported = supported;

        self.preference_key = self.preference_key.trim().to_string();
        if self.preference_key.is_empty() {
            self.preference_key = "lang".to_string();
        }
        self.base = self.base.trim().to_string();
    }

    /// What: Check whether `lang` is one of the supported languages.
    #[must_use]
    pub fn is_supported(&self, lang: &str) -> bool {
        self.supported.iter().any(|s| s == lang)
    }

    /// What: Whether `base` points at an HTTP location rather than a directory.
    #[must_use]
    pub fn is_remote(&self) -> bool {
        self.base.starts_with("http://") || self.base.starts_with("https://")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_when_empty() {
        let config = I18nConfig::from_yaml("").expect("empty config should parse");
        assert_eq!(config, I18nConfig::default());
        assert_eq!(config.base, "/i18n/");
        assert_eq!(config.preference_key, "lang");
    }

    #[test]
    fn test_parse_full_config() {
        let yaml = r"
base: https://example.org/i18n/
default_language: en
supported: [en, zh, ' de ', 'bad code', zh]
preference_key: site-lang
detect_locale: true
format: yaml
aliases:
  zh-CN: zh
";
        let config = I18nConfig::from_yaml(yaml).expect("config should parse");
        assert_eq!(config.supported, vec!["en", "zh", "de"]);
        assert_eq!(config.preference_key, "site-lang");
        assert!(config.detect_locale);
        assert_eq!(config.format, DictionaryFormat::Yaml);
        assert_eq!(config.aliases.get("zh-CN"), Some(&"zh".to_string()));
        assert!(config.is_remote());
    }

    #[test]
    fn test_default_language_always_supported() {
        let config = I18nConfig::from_yaml("default_language: zh\nsupported: [en]\n")
            .expect("config should parse");
        assert_eq!(config.supported, vec!["zh", "en"]);
        assert!(config.is_supported("zh"));
        assert!(!config.is_remote());
    }

    #[test]
    fn test_invalid_config_reports_parse_error() {
        let err = I18nConfig::from_yaml("supported: {en: [").expect_err("invalid YAML");
        assert!(matches!(err, ConfigError::Parse(_)));
        let err = I18nConfig::from_yaml("detect_locale: [1, 2]").expect_err("wrong type");
        assert!(err.to_string().contains("parse"));
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory for test");
        let path = temp_dir.path().join("i18n.yml");
        std::fs::write(&path, "default_language: de\n").expect("Failed to write test config");
        let config = I18nConfig::load(&path).expect("config should load");
        assert_eq!(config.default_language, "de");

        let missing = I18nConfig::load(&temp_dir.path().join("missing.yml"));
        assert!(matches!(missing, Err(ConfigError::Io(_))));
    }
}
