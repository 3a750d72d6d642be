//! site-i18n binary entrypoint: logging setup and command dispatch.

mod args;

use std::fmt;
use std::path::Path;
use std::process::ExitCode;
use std::sync::OnceLock;

use clap::Parser;

struct SiteTimer;

impl tracing_subscriber::fmt::time::FormatTime for SiteTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> fmt::Result {
        // "YYYY-MM-DD-T HH:MM:SS"
        let ts = chrono::Local::now().format("%Y-%m-%d-T %H:%M:%S").to_string();
        w.write_str(&ts)
    }
}

static LOG_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();

/// What: Initialize the tracing subscriber.
///
/// Inputs:
/// - `level`: Default filter when `RUST_LOG` is not set.
/// - `log_file`: Optional file that receives log output instead of stderr.
///
/// Details:
/// - Falls back to stderr when the log file cannot be opened.
/// - stdout is left to command output.
fn init_logging(level: &str, log_file: Option<&Path>) {
    let env_filter = || {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level))
    };

    let Some(log_path) = log_file else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter())
            .with_target(false)
            .with_writer(std::io::stderr)
            .with_timer(SiteTimer)
            .init();
        return;
    };

    if let Some(parent) = log_path.parent()
        && !parent.as_os_str().is_empty()
    {
        let _ = std::fs::create_dir_all(parent);
    }
    match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
    {
        Ok(file) => {
            let (non_blocking, guard) = tracing_appender::non_blocking(file);
            tracing_subscriber::fmt()
                .with_env_filter(env_filter())
                .with_target(false)
                .with_ansi(false)
                .with_writer(non_blocking)
                .with_timer(SiteTimer)
                .init();
            let _ = LOG_GUARD.set(guard);
            tracing::info!(path = %log_path.display(), "logging initialized");
        }
        Err(e) => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter())
                .with_target(false)
                .with_writer(std::io::stderr)
                .with_timer(SiteTimer)
                .init();
            tracing::warn!(error = %e, "failed to open log file; using stderr");
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = args::Args::parse();
    init_logging(&args::determine_log_level(&args), args.log_file.as_deref());

    tracing::debug!(command = ?args.command, "site-i18n starting");
    match args::process_args(&args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "Command failed");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    /// What: `FormatTime` impl writes a timestamp in the expected shape
    ///
    /// - Input: Tracing writer buffer
    /// - Output: Buffer holds "YYYY-MM-DD-T HH:MM:SS"
    #[test]
    fn site_timer_formats_time() {
        use tracing_subscriber::fmt::time::FormatTime;
        let mut buf = String::new();
        let mut writer = tracing_subscriber::fmt::format::Writer::new(&mut buf);
        super::SiteTimer
            .format_time(&mut writer)
            .expect("formatting into a String cannot fail");
        assert_eq!(buf.len(), "2026-01-01-T 00:00:00".len());
        assert_eq!(&buf[10..13], "-T ");
    }
}
