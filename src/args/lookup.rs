//! Lookup command: print one display string.

use std::error::Error;
use std::fmt::Display;

use site_i18n::document::PageDocument;
use site_i18n::i18n::{Translator, format_placeholders};
use tokio::sync::Mutex;

use crate::args::context::Context;

/// What: Print the display string for `key` through the fallback chain.
///
/// Inputs:
/// - `context`: Command context.
/// - `key`: Dot-notation key path.
/// - `args`: Values for `{}` placeholders.
/// - `lang`: Language to use; the boot language when `None`.
///
/// # Errors
/// - Returns `Err` when the dictionary source cannot be created.
pub async fn handle_lookup(
    context: &Context,
    key: &str,
    args: &[String],
    lang: Option<&str>,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let translator = Translator::new(
        context.config.clone(),
        context.source()?,
        context.scratch_preferences(lang),
    );
    let doc = Mutex::new(PageDocument::default());
    translator.boot(&doc).await;

    let value = translator.lookup_with_fallback(key).await;
    let args: Vec<&dyn Display> = args.iter().map(|a| a as &dyn Display).collect();
    println!("{}", format_placeholders(&value, &args));
    Ok(())
}
