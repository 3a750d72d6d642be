use std::env;
use std::path::{Path, PathBuf};

/// Directory name used under the XDG config base.
const APP_DIR: &str = "site-i18n";

/// Resolve an XDG base directory from environment or default to `$HOME` + segments.
///
/// Inputs:
/// - `var`: Environment variable to check (e.g., `XDG_CONFIG_HOME`).
/// - `home_default`: Fallback path segments relative to `$HOME` if `var` is unset/empty.
///
/// Output: Resolved base directory path.
fn xdg_base_dir(var: &str, home_default: &[&str]) -> PathBuf {
    if let Ok(p) = env::var(var)
        && !p.trim().is_empty()
    {
        return PathBuf::from(p);
    }
    let home = env::var("HOME").unwrap_or_else(|_| ".".to_string());
    let mut base = PathBuf::from(home);
    for seg in home_default {
        base = base.join(seg);
    }
    base
}

/// Config directory: `$XDG_CONFIG_HOME/site-i18n`, or `$HOME/.config/site-i18n`.
#[must_use]
pub fn config_dir() -> PathBuf {
    xdg_base_dir("XDG_CONFIG_HOME", &[".config"]).join(APP_DIR)
}

/// Default location of the persisted language preference file.
#[must_use]
pub fn preferences_path() -> PathBuf {
    config_dir().join("preferences.conf")
}

/// Determine the i18n config file, searching in priority order.
///
/// Inputs:
/// - `explicit`: Path given on the command line, if any.
///
/// Output: First existing candidate, or `None` (callers fall back to defaults).
///
/// Details:
/// - An explicit path is returned only if it exists.
/// - Then `$XDG_CONFIG_HOME/site-i18n/i18n.yml`, then `$HOME/.config/site-i18n/i18n.yml`.
#[must_use]
pub fn resolve_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(p) = explicit {
        return p.is_file().then(|| p.to_path_buf());
    }
    let mut candidates: Vec<PathBuf> = Vec::new();
    if let Ok(xdg) = env::var("XDG_CONFIG_HOME")
        && !xdg.trim().is_empty()
    {
        candidates.push(Path::new(&xdg).join(APP_DIR).join("i18n.yml"));
    }
    if let Ok(home) = env::var("HOME") {
        candidates.push(
            Path::new(&home)
                .join(".config")
                .join(APP_DIR)
                .join("i18n.yml"),
        );
    }
    candidates.into_iter().find(|p| p.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn explicit_config_path_must_exist() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory for test");
        let path = temp_dir.path().join("i18n.yml");
        assert_eq!(resolve_config_path(Some(&path)), None);
        std::fs::write(&path, "").expect("Failed to write test config");
        assert_eq!(resolve_config_path(Some(&path)), Some(path));
    }

    #[test]
    fn preferences_live_under_config_dir() {
        assert!(preferences_path().starts_with(config_dir()));
        assert!(config_dir().ends_with(APP_DIR));
    }
}
