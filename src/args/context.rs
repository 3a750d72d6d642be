//! Configuration, dictionary source and preference store shared by the commands.

use std::error::Error;
use std::path::PathBuf;

use site_i18n::config::{I18nConfig, preferences_path, resolve_config_path};
use site_i18n::i18n::{DictionaryFormat, DictionarySource, DirectorySource, HttpSource, LoadError};
use site_i18n::preferences::{FilePreferences, MemoryPreferences, PreferenceStore};

use crate::args::Args;
use crate::args::utils::local_base_dir;

/// Dictionary source selected from the configured base.
pub enum ConfiguredSource {
    /// Local directory.
    Directory(DirectorySource),
    /// HTTP base URL.
    Http(HttpSource),
}

impl DictionarySource for ConfiguredSource {
    fn location(&self, lang: &str) -> String {
        match self {
            Self::Directory(s) => s.location(lang),
            Self::Http(s) => s.location(lang),
        }
    }

    fn format(&self) -> DictionaryFormat {
        match self {
            Self::Directory(s) => s.format(),
            Self::Http(s) => s.format(),
        }
    }

    async fn fetch(&self, lang: &str) -> Result<Vec<u8>, LoadError> {
        match self {
            Self::Directory(s) => s.fetch(lang).await,
            Self::Http(s) => s.fetch(lang).await,
        }
    }
}

/// Resolved command context.
pub struct Context {
    /// Normalized configuration.
    pub config: I18nConfig,
    /// Preference file.
    pub preferences_path: PathBuf,
    root: PathBuf,
}

impl Context {
    /// What: Build the context from command-line arguments.
    ///
    /// Details:
    /// - A missing or invalid config file is logged and replaced by defaults.
    /// - `--base` overrides the configured base.
    pub fn from_args(args: &Args) -> Self {
        let mut config = match resolve_config_path(args.config.as_deref()) {
            Some(path) => I18nConfig::load(&path).unwrap_or_else(|e| {
                tracing::warn!(path = %path.display(), error = %e, "Using default i18n config");
                I18nConfig::default()
            }),
            None => {
                if let Some(explicit) = &args.config {
                    tracing::warn!(path = %explicit.display(), "Config file not found, using defaults");
                } else {
                    tracing::debug!("No i18n config found, using defaults");
                }
                I18nConfig::default()
            }
        };
        if let Some(base) = &args.base {
            config.base = base.trim().to_string();
        }
        let preferences_path = args.preferences.clone().unwrap_or_else(preferences_path);
        Self {
            config,
            preferences_path,
            root: args.root.clone(),
        }
    }

    /// What: Dictionary source for the configured base.
    ///
    /// # Errors
    /// - Returns `Err` when the HTTP client cannot be created.
    pub fn source(&self) -> Result<ConfiguredSource, Box<dyn Error + Send + Sync>> {
        if self.config.is_remote() {
            let source = HttpSource::new(&self.config.base, self.config.format)?;
            tracing::debug!(base = %self.config.base, "Fetching dictionaries over HTTP");
            Ok(ConfiguredSource::Http(source))
        } else {
            let dir = local_base_dir(&self.config.base, &self.root);
            tracing::debug!(dir = %dir.display(), "Reading dictionaries from directory");
            Ok(ConfiguredSource::Directory(DirectorySource::new(
                dir,
                self.config.format,
            )))
        }
    }

    /// What: Persistent preference store.
    pub fn file_preferences(&self) -> FilePreferences {
        FilePreferences::new(self.preferences_path.clone())
    }

    /// What: Read-only view of the preferences for one command, optionally pinned to `lang`.
    ///
    /// Details:
    /// - Writes made through the returned store never reach the preference file.
    pub fn scratch_preferences(&self, lang: Option<&str>) -> MemoryPreferences {
        let key = &self.config.preference_key;
        match lang.map(str::to_string).or_else(|| self.file_preferences().get(key)) {
            Some(value) => MemoryPreferences::with(key, &value),
            None => MemoryPreferences::new(),
        }
    }
}
