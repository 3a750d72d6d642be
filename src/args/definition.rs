//! Command-line argument definition and processing.

use std::error::Error;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// site-i18n - Translate declarative `data-i18n` pages and manage the stored language
#[derive(Parser, Debug)]
#[command(name = "site-i18n")]
#[command(version)]
#[command(about = "Translate declarative data-i18n pages and manage the stored language", long_about = None)]
pub struct Args {
    /// Set the logging level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", global = true)]
    pub log_level: String,

    /// Enable verbose output (equivalent to --log-level debug)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Append log output to this file instead of stderr
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    /// i18n configuration file (default: ~/.config/site-i18n/i18n.yml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the dictionary base (directory or http(s) URL)
    #[arg(short, long, global = true)]
    pub base: Option<String>,

    /// Site root that site-absolute local bases (e.g. /i18n/) are resolved against
    #[arg(long, default_value = ".", global = true)]
    pub root: PathBuf,

    /// Preference file (default: ~/.config/site-i18n/preferences.conf)
    #[arg(long, global = true)]
    pub preferences: Option<PathBuf>,

    /// Command to run
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Translate an HTML page and write the result
    Render {
        /// HTML page to translate
        input: PathBuf,
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Language to render (default: stored preference, locale or default language)
        #[arg(short, long)]
        lang: Option<String>,
    },
    /// Print the display string for a key path
    Lookup {
        /// Dot-notation key path (e.g. nav.home)
        key: String,
        /// Values substituted into `{}` placeholders, in order
        args: Vec<String>,
        /// Language to look up in (default: stored preference, locale or default language)
        #[arg(short, long)]
        lang: Option<String>,
    },
    /// Persist the preferred language
    Switch {
        /// Language code (aliases are resolved)
        lang: String,
    },
}

/// What: Dispatch the parsed command.
///
/// Inputs:
/// - `args`: Parsed command-line arguments.
///
/// Output:
/// - `Ok(())` when the command completed.
///
/// # Errors
/// - Propagates I/O errors from reading pages and writing output, and HTTP client setup failures.
pub async fn process_args(args: &Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    use crate::args::{lookup, render, switch};

    let context = crate::args::context::Context::from_args(args);
    match &args.command {
        Command::Render {
            input,
            output,
            lang,
        } => render::handle_render(&context, input, output.as_deref(), lang.as_deref()).await,
        Command::Lookup { key, args, lang } => {
            lookup::handle_lookup(&context, key, args, lang.as_deref()).await
        }
        Command::Switch { lang } => switch::handle_switch(&context, lang).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_render_with_global_flags() {
        let args = Args::try_parse_from([
            "site-i18n",
            "render",
            "index.html",
            "--lang",
            "zh",
            "-o",
            "out.html",
            "--verbose",
            "--base",
            "public/i18n",
        ])
        .expect("arguments should parse");
        assert!(args.verbose);
        assert_eq!(args.base.as_deref(), Some("public/i18n"));
        match args.command {
            Command::Render {
                input,
                output,
                lang,
            } => {
                assert_eq!(input, PathBuf::from("index.html"));
                assert_eq!(output, Some(PathBuf::from("out.html")));
                assert_eq!(lang.as_deref(), Some("zh"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn parses_lookup_arguments() {
        let args = Args::try_parse_from(["site-i18n", "lookup", "files.count", "3"])
            .expect("arguments should parse");
        assert_eq!(args.log_level, "info");
        match args.command {
            Command::Lookup { key, args, lang } => {
                assert_eq!(key, "files.count");
                assert_eq!(args, vec!["3".to_string()]);
                assert_eq!(lang, None);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn requires_a_command() {
        assert!(Args::try_parse_from(["site-i18n"]).is_err());
    }
}
