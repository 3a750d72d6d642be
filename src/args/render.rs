//! Render command: translate an HTML page ahead of time.

use std::error::Error;
use std::path::Path;

use site_i18n::document::PageDocument;
use site_i18n::i18n::Translator;
use tokio::sync::Mutex;

use crate::args::context::Context;

/// What: Translate the page at `input` and write the result.
///
/// Inputs:
/// - `context`: Command context.
/// - `input`: HTML page to translate.
/// - `output`: Destination file; stdout when `None`.
/// - `lang`: Language to render; the boot language when `None`.
///
/// Output:
/// - `Ok(())` when the page was written.
///
/// # Errors
/// - Returns `Err` when the page cannot be read or the output cannot be written.
///
/// Details:
/// - The stored preference is read but never rewritten.
/// - Missing dictionaries do not fail the command; unresolved keys render as key paths.
pub async fn handle_render(
    context: &Context,
    input: &Path,
    output: Option<&Path>,
    lang: Option<&str>,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let markup = tokio::fs::read_to_string(input).await?;
    let translator = Translator::new(
        context.config.clone(),
        context.source()?,
        context.scratch_preferences(lang),
    );
    let doc = Mutex::new(PageDocument::parse(&markup));
    let language = translator.boot(&doc).await;
    let html = doc.into_inner().to_html();

    match output {
        Some(path) => {
            tokio::fs::write(path, html).await?;
            tracing::info!(
                input = %input.display(),
                output = %path.display(),
                language = %language,
                "Rendered page"
            );
        }
        None => {
            use std::io::Write;
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(html.as_bytes())?;
            stdout.flush()?;
        }
    }
    Ok(())
}
