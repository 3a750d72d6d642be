//! Library entry for site-i18n: dictionary resolution, page bindings and language switching.

pub mod config;
pub mod document;
pub mod i18n;
pub mod preferences;
