//! Shared utilities for argument processing.

/// What: Determine the log level based on command-line arguments and environment variables.
///
/// Inputs:
/// - `args`: Parsed command-line arguments.
///
/// Output:
/// - Log level string (trace, debug, info, warn, error).
///
/// Details:
/// - Verbose flag overrides `log_level` argument.
/// - `SITE_I18N_TRACE=1` enables TRACE level for tracing dictionary loads.
pub fn determine_log_level(args: &crate::args::Args) -> String {
    if args.verbose {
        "debug".to_string()
    } else if std::env::var("SITE_I18N_TRACE").ok().as_deref() == Some("1") {
        "trace".to_string()
    } else {
        args.log_level.clone()
    }
}

/// What: Resolve a local dictionary base against the site root.
///
/// Inputs:
/// - `base`: Configured base (e.g., `/i18n/` or `public/i18n`).
/// - `root`: Site root directory.
///
/// Output:
/// - Directory to read dictionaries from.
///
/// Details:
/// - Site-absolute bases (leading `/`) are taken relative to `root`, the way a web
///   server maps them.
pub fn local_base_dir(base: &str, root: &std::path::Path) -> std::path::PathBuf {
    let trimmed = base.trim();
    trimmed
        .strip_prefix('/')
        .map_or_else(|| root.join(trimmed), |rel| root.join(rel))
}
