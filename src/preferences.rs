//! Durable key/value storage for the user's language preference.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

/// Error writing a preference.
#[derive(Debug)]
pub struct PreferenceError {
    path: PathBuf,
    source: std::io::Error,
}

impl fmt::Display for PreferenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "failed to write preferences to {}: {}",
            self.path.display(),
            self.source
        )
    }
}

impl std::error::Error for PreferenceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

/// What: Durable key/value store read at boot and written on every language switch.
pub trait PreferenceStore: Send + Sync {
    /// Read the value stored under `key`.
    fn get(&self, key: &str) -> Option<String>;

    /// Store `value` under `key`.
    ///
    /// # Errors
    /// - Returns `PreferenceError` when the value cannot be persisted
    fn set(&self, key: &str, value: &str) -> Result<(), PreferenceError>;
}

/// In-memory preferences, for tests and embedding.
#[derive(Debug, Default)]
pub struct MemoryPreferences {
    values: Mutex<BTreeMap<String, String>>,
}

impl MemoryPreferences {
    /// What: Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// What: Create a store pre-populated with one entry.
    #[must_use]
    pub fn with(key: &str, value: &str) -> Self {
        let store = Self::new();
        store
            .values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        store
    }
}

impl PreferenceStore for MemoryPreferences {
    fn get(&self, key: &str) -> Option<String> {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PreferenceError> {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Preferences persisted as `key = value` lines.
///
/// Comments (`#`) and unrelated keys already present in the file are preserved on write.
#[derive(Debug)]
pub struct FilePreferences {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FilePreferences {
    /// What: Create a store backed by the file at `path` (created on first write).
    #[must_use]
    pub const fn new(path: PathBuf) -> Self {
        Self {
            path,
            write_lock: Mutex::new(()),
        }
    }

    /// What: Backing file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// What: Split a `key = value` line, ignoring blanks and comments.
fn parse_line(line: &str) -> Option<(&str, &str)> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return None;
    }
    let (key, value) = trimmed.split_once('=')?;
    Some((key.trim(), value.trim()))
}

impl PreferenceStore for FilePreferences {
    fn get(&self, key: &str) -> Option<String> {
        let content = fs::read_to_string(&self.path).ok()?;
        content
            .lines()
            .filter_map(parse_line)
            .filter(|(k, _)| *k == key)
            .last()
            .map(|(_, v)| v.to_string())
            .filter(|v| !v.is_empty())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PreferenceError> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let err = |source| PreferenceError {
            path: self.path.clone(),
            source,
        };
        let existing = fs::read_to_string(&self.path).unwrap_or_default();
        let mut replaced = false;
        let mut lines: Vec<String> = Vec::new();
        for line in existing.lines() {
            if matches!(parse_line(line), Some((k, _)) if k == key) {
                if !replaced {
                    lines.push(format!("{key} = {value}"));
                    replaced = true;
                }
                continue;
            }
            lines.push(line.to_string());
        }
        if !replaced {
            lines.push(format!("{key} = {value}"));
        }
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(err)?;
        }
        let mut out = lines.join("\n");
        out.push('\n');
        fs::write(&self.path, out).map_err(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn memory_preferences_round_trip() {
        let store = MemoryPreferences::with("lang", "zh");
        assert_eq!(store.get("lang"), Some("zh".to_string()));
        store.set("lang", "en").expect("memory store never fails");
        assert_eq!(store.get("lang"), Some("en".to_string()));
        assert_eq!(store.get("other"), None);
    }

    #[test]
    fn file_preferences_preserve_other_lines() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory for test");
        let path = temp_dir.path().join("nested").join("preferences.conf");
        let store = FilePreferences::new(path.clone());
        assert_eq!(store.get("lang"), None);

        store.set("lang", "zh").expect("Failed to write preferences");
        assert_eq!(store.get("lang"), Some("zh".to_string()));

        fs::write(&path, "# site prefs\ntheme = dark\nlang = zh\nlang = de\n")
            .expect("Failed to write test preferences");
        assert_eq!(store.get("lang"), Some("de".to_string()));

        store.set("lang", "en").expect("Failed to write preferences");
        let content = fs::read_to_string(&path).expect("Failed to read preferences");
        assert_eq!(content, "# site prefs\ntheme = dark\nlang = en\n");
        assert_eq!(store.get("theme"), Some("dark".to_string()));
    }

    #[test]
    fn file_preferences_empty_value_is_absent() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory for test");
        let path = temp_dir.path().join("preferences.conf");
        fs::write(&path, "lang =\n").expect("Failed to write test preferences");
        assert_eq!(FilePreferences::new(path).get("lang"), None);
    }
}
