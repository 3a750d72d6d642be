//! Internationalization (i18n) for statically served pages.
//!
//! This module resolves dictionary keys, binds translations into a page document and
//! switches the active language at runtime.
//!
//! # Overview
//!
//! - **Dictionaries**: One nested JSON (or YAML) resource per language, `{base}/{lang}.json`.
//!   Keys are dot-notation paths into the tree (`nav.home`).
//! - **Fallback Chain**: Active language -> default language -> the key path itself.
//!   A lookup never fails.
//! - **Cache**: Each language is fetched at most once per translator; concurrent loads
//!   share one fetch. Failed loads are not cached.
//! - **Bindings**: Elements declare what to translate with `data-i18n*` attributes
//!   (see [`binder`]).
//! - **Language Switch**: `Translator::set_language` loads, swaps, persists and re-renders.
//!   Overlapping calls resolve last-call-wins.
//! - **Dynamic Content**: `Translator::observe_dynamic_content` returns an [`Observer`]
//!   that translates elements inserted after the initial pass.
//!
//! # Usage
//!
//! ```rust,no_run
//! use site_i18n::config::I18nConfig;
//! use site_i18n::document::PageDocument;
//! use site_i18n::i18n::{DirectorySource, DictionaryFormat, Translator};
//! use site_i18n::preferences::MemoryPreferences;
//! use tokio::sync::Mutex;
//!
//! # async fn demo() {
//! let source = DirectorySource::new("public/i18n".into(), DictionaryFormat::Json);
//! let translator = Translator::new(I18nConfig::default(), source, MemoryPreferences::new());
//! let doc = Mutex::new(PageDocument::parse("<html><body><h1 data-i18n=\"nav.home\"></h1></body></html>"));
//!
//! translator.boot(&doc).await;
//! translator.set_language("zh", &doc).await;
//! let label = translator.t("nav.home");
//! # let _ = label;
//! # }
//! ```
//!
//! # Error Handling
//!
//! - Unavailable or malformed dictionaries are logged and replaced by an empty dictionary
//! - Unsupported language codes resolve through aliases, then to the default language
//! - Missing keys return the key path and log debug messages
//! - Preference write failures are logged; the switch still completes

pub mod binder;
pub mod cache;
pub mod detection;
pub mod dictionary;
pub mod loader;
mod observer;
mod resolver;
pub mod translations;
mod translator;

pub use cache::DictionaryCache;
pub use detection::{match_supported, parse_accept_language, system_locale_candidates};
pub use dictionary::{Dictionary, Leaf, format_placeholders, resolve};
pub use loader::{
    DictionaryFormat, DictionarySource, DirectorySource, HttpSource, LoadError, fetch_dictionary,
};
pub use observer::Observer;
pub use resolver::LanguageResolver;
pub use translations::{FallbackChain, translate, translate_with_fallback};
pub use translator::{ActiveLanguage, Translator};
