//! Dictionary resource fetching and parsing.

use std::fmt;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::i18n::dictionary::Dictionary;

/// Why a dictionary could not be loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    /// The language code failed validation before any fetch was attempted.
    InvalidLanguage(String),
    /// The resource could not be retrieved (missing file, I/O error, HTTP failure).
    Unavailable {
        /// Location that was requested.
        location: String,
        /// Underlying cause.
        reason: String,
    },
    /// The resource was retrieved but is not a valid dictionary document.
    Malformed {
        /// Location that was requested.
        location: String,
        /// Underlying cause.
        reason: String,
    },
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidLanguage(code) => write!(
                f,
                "invalid language code '{code}'; expected language[-region] (e.g. 'en', 'zh-CN')"
            ),
            Self::Unavailable { location, reason } => {
                write!(f, "dictionary unavailable at {location}: {reason}")
            }
            Self::Malformed { location, reason } => {
                write!(f, "malformed dictionary at {location}: {reason}")
            }
        }
    }
}

impl std::error::Error for LoadError {}

/// On-disk/over-the-wire format of dictionary resources.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DictionaryFormat {
    /// `{lang}.json`
    #[default]
    Json,
    /// `{lang}.yml`
    Yaml,
}

impl DictionaryFormat {
    /// What: File extension used for resources in this format.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Yaml => "yml",
        }
    }
}

/// What: Retrieve the raw bytes of a language resource.
///
/// Details:
/// - Implementations only fetch; parsing and caching happen in `DictionaryCache`.
/// - A fetch is a plain read (file read or HTTP GET) with no side effects.
pub trait DictionarySource: Send + Sync {
    /// Human-readable location of the resource for `lang`, used in diagnostics.
    fn location(&self, lang: &str) -> String;

    /// Format of the resources this source serves.
    fn format(&self) -> DictionaryFormat;

    /// Fetch the raw resource for `lang`.
    fn fetch(&self, lang: &str) -> impl Future<Output = Result<Vec<u8>, LoadError>> + Send;
}

/// Dictionaries read from a local directory (`{dir}/{lang}.{ext}`).
#[derive(Debug, Clone)]
pub struct DirectorySource {
    dir: PathBuf,
    format: DictionaryFormat,
}

impl DirectorySource {
    /// What: Create a source reading from `dir`.
    #[must_use]
    pub const fn new(dir: PathBuf, format: DictionaryFormat) -> Self {
        Self { dir, format }
    }

    /// What: Directory the resources are read from.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, lang: &str) -> PathBuf {
        self.dir
            .join(format!("{lang}.{}", self.format.extension()))
    }
}

impl DictionarySource for DirectorySource {
    fn location(&self, lang: &str) -> String {
        self.path_for(lang).display().to_string()
    }

    fn format(&self) -> DictionaryFormat {
        self.format
    }

    async fn fetch(&self, lang: &str) -> Result<Vec<u8>, LoadError> {
        let path = self.path_for(lang);
        tokio::fs::read(&path)
            .await
            .map_err(|e| LoadError::Unavailable {
                location: path.display().to_string(),
                reason: e.to_string(),
            })
    }
}

/// Dictionaries fetched over HTTP from a base URL (`{base}{lang}.{ext}`).
#[derive(Debug, Clone)]
pub struct HttpSource {
    base_url: String,
    format: DictionaryFormat,
    client: reqwest::Client,
}

impl HttpSource {
    /// What: Create a source fetching from `base_url`.
    ///
    /// Inputs:
    /// - `base_url`: Absolute base location (e.g., `https://example.org/i18n/`)
    /// - `format`: Resource format
    ///
    /// Output:
    /// - `HttpSource`, or an error string if the HTTP client cannot be built
    ///
    /// # Errors
    /// - Returns `Err` when the underlying `reqwest` client fails to build (TLS backend issues)
    pub fn new(base_url: &str, format: DictionaryFormat) -> Result<Self, String> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(30))
            .user_agent(format!("site-i18n/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| format!("Failed to create HTTP client: {e}"))?;
        let mut base_url = base_url.trim().to_string();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        Ok(Self {
            base_url,
            format,
            client,
        })
    }

    fn url_for(&self, lang: &str) -> String {
        format!("{}{lang}.{}", self.base_url, self.format.extension())
    }
}

impl DictionarySource for HttpSource {
    fn location(&self, lang: &str) -> String {
        self.url_for(lang)
    }

    fn format(&self) -> DictionaryFormat {
        self.format
    }

    async fn fetch(&self, lang: &str) -> Result<Vec<u8>, LoadError> {
        let url = self.url_for(lang);
        let unavailable = |reason: String| LoadError::Unavailable {
            location: url.clone(),
            reason,
        };
        // Always revalidate with the origin.
        let response = self
            .client
            .get(&url)
            .header(reqwest::header::CACHE_CONTROL, "no-cache")
            .send()
            .await
            .map_err(|e| unavailable(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(unavailable(format!("HTTP {status}")));
        }
        let body = response
            .bytes()
            .await
            .map_err(|e| unavailable(e.to_string()))?;
        Ok(body.to_vec())
    }
}

/// What: Validate a language code before it is used to build a resource location.
///
/// Inputs:
/// - `lang`: Language code to validate
///
/// Output:
/// - `true` if format looks valid, `false` otherwise
///
/// Details:
/// - Alphanumeric segments separated by single hyphens, at most 20 chars.
/// - Keeps path separators and dots out of file names and URLs.
#[must_use]
pub fn is_valid_language_code(lang: &str) -> bool {
    if lang.is_empty() || lang.len() > 20 {
        return false;
    }

    lang.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        && !lang.starts_with('-')
        && !lang.ends_with('-')
        && !lang.contains("--")
}

/// What: Parse raw resource bytes into a `Dictionary`.
///
/// Inputs:
/// - `bytes`: Resource content
/// - `format`: Resource format
/// - `location`: Resource location (for error messages)
///
/// Output:
/// - `Result<Dictionary, LoadError>`
///
/// # Errors
/// - Returns `LoadError::Malformed` when the content is not valid UTF-8, cannot be parsed,
///   or its top level is not a mapping
pub fn parse_dictionary(
    bytes: &[u8],
    format: DictionaryFormat,
    location: &str,
) -> Result<Dictionary, LoadError> {
    let malformed = |reason: String| LoadError::Malformed {
        location: location.to_string(),
        reason,
    };
    let text = std::str::from_utf8(bytes).map_err(|e| malformed(e.to_string()))?;
    if text.trim().is_empty() {
        return Err(malformed("resource is empty".to_string()));
    }
    let value: serde_json::Value = match format {
        DictionaryFormat::Json => {
            serde_json::from_str(text).map_err(|e| malformed(format!("invalid JSON: {e}")))?
        }
        DictionaryFormat::Yaml => {
            serde_norway::from_str(text).map_err(|e| malformed(format!("invalid YAML: {e}")))?
        }
    };
    Dictionary::from_value(value).ok_or_else(|| malformed("top level is not a mapping".to_string()))
}

/// What: Fetch and parse the dictionary for `lang` without any caching.
///
/// # Errors
/// - `LoadError::InvalidLanguage` for malformed codes
/// - `LoadError::Unavailable` / `LoadError::Malformed` as reported by the source and parser
pub async fn fetch_dictionary<S: DictionarySource>(
    source: &S,
    lang: &str,
) -> Result<Dictionary, LoadError> {
    if !is_valid_language_code(lang) {
        return Err(LoadError::InvalidLanguage(lang.to_string()));
    }
    let location = source.location(lang);
    let bytes = source.fetch(lang).await?;
    parse_dictionary(&bytes, source.format(), &location)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_parse_json_dictionary() {
        let json = br#"{"nav": {"home": "Home"}, "title": "Tools"}"#;
        let d = parse_dictionary(json, DictionaryFormat::Json, "en.json")
            .expect("Failed to parse test dictionary");
        assert_eq!(d.text("nav.home"), Some("Home"));
        assert_eq!(d.text("title"), Some("Tools"));
    }

    #[test]
    fn test_parse_yaml_dictionary() {
        let yaml = b"nav:\n  home: \"Startseite\"\n";
        let d = parse_dictionary(yaml, DictionaryFormat::Yaml, "de.yml")
            .expect("Failed to parse test YAML dictionary");
        assert_eq!(d.text("nav.home"), Some("Startseite"));
    }

    #[test]
    fn test_parse_malformed_dictionary() {
        let err = parse_dictionary(b"{\"nav\": ", DictionaryFormat::Json, "zh.json")
            .expect_err("truncated JSON must not parse");
        assert!(matches!(err, LoadError::Malformed { .. }));
        assert!(err.to_string().contains("zh.json"));

        let err = parse_dictionary(b"[1, 2]", DictionaryFormat::Json, "zh.json")
            .expect_err("array top level is not a dictionary");
        assert!(err.to_string().contains("not a mapping"));

        let err = parse_dictionary(b"  \n", DictionaryFormat::Json, "zh.json")
            .expect_err("empty resource is malformed");
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn test_is_valid_language_code() {
        assert!(is_valid_language_code("en"));
        assert!(is_valid_language_code("zh-CN"));
        assert!(is_valid_language_code("zh-Hans-CN"));

        assert!(!is_valid_language_code(""));
        assert!(!is_valid_language_code("-en"));
        assert!(!is_valid_language_code("en-"));
        assert!(!is_valid_language_code("en--US"));
        assert!(!is_valid_language_code("../en"));
        assert!(!is_valid_language_code("en.json"));
        assert!(!is_valid_language_code(&"x".repeat(21)));
    }

    #[tokio::test]
    async fn test_directory_source_fetch() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory for test");
        fs::write(temp_dir.path().join("en.json"), r#"{"hello": "Hello"}"#)
            .expect("Failed to write test dictionary");
        let source = DirectorySource::new(temp_dir.path().to_path_buf(), DictionaryFormat::Json);

        let d = fetch_dictionary(&source, "en")
            .await
            .expect("Failed to load test dictionary");
        assert_eq!(d.text("hello"), Some("Hello"));

        let missing = fetch_dictionary(&source, "fr").await;
        assert!(matches!(missing, Err(LoadError::Unavailable { .. })));

        let invalid = fetch_dictionary(&source, "../etc").await;
        assert!(matches!(invalid, Err(LoadError::InvalidLanguage(_))));
    }

    #[test]
    fn test_http_source_normalizes_base() {
        let source = HttpSource::new("https://example.org/i18n", DictionaryFormat::Json)
            .expect("Failed to build HTTP source");
        assert_eq!(source.location("zh"), "https://example.org/i18n/zh.json");
    }
}
