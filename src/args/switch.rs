//! Switch command: persist the preferred language.

use std::error::Error;

use site_i18n::document::PageDocument;
use site_i18n::i18n::Translator;
use tokio::sync::Mutex;

use crate::args::context::Context;

/// What: Activate `lang` and persist it to the preference file.
///
/// Inputs:
/// - `context`: Command context.
/// - `lang`: Requested language; aliases are followed, unsupported codes use the default.
///
/// # Errors
/// - Returns `Err` when the dictionary source cannot be created.
///
/// Details:
/// - The dictionary is loaded before the preference is written.
pub async fn handle_switch(context: &Context, lang: &str) -> Result<(), Box<dyn Error + Send + Sync>> {
    let translator = Translator::new(
        context.config.clone(),
        context.source()?,
        context.file_preferences(),
    );
    let doc = Mutex::new(PageDocument::default());
    translator.set_language(lang, &doc).await;

    let active = translator.current_language();
    if !translator.cache().contains(&active) {
        tracing::warn!(language = %active, "Dictionary could not be loaded; pages will show fallback text");
    }
    if active != lang.trim() {
        println!("'{}' resolved to '{active}'", lang.trim());
    }
    println!(
        "Language set to '{active}' ({})",
        context.preferences_path.display()
    );
    Ok(())
}
