//! Active-language state and the language switch transition.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex as StdMutex, PoisonError, RwLock};

use tokio::sync::Mutex;

use crate::config::I18nConfig;
use crate::document::{Document, Observable};
use crate::i18n::binder::{self, ATTR_LANG_SWITCH};
use crate::i18n::cache::DictionaryCache;
use crate::i18n::detection::system_locale_candidates;
use crate::i18n::dictionary::{Dictionary, format_placeholders};
use crate::i18n::loader::DictionarySource;
use crate::i18n::observer::Observer;
use crate::i18n::resolver::LanguageResolver;
use crate::i18n::translations::{FallbackChain, translate_with_fallback};
use crate::preferences::PreferenceStore;

/// What: Snapshot of the active language and its dictionary.
#[derive(Debug, Clone)]
pub struct ActiveLanguage {
    /// Active language code.
    pub lang: String,
    /// Dictionary applied to the document.
    pub dictionary: Arc<Dictionary>,
}

/// What: Owner of the page's language state.
///
/// Details:
/// - Holds the configuration, the dictionary cache, the preference store and the
///   active language; `set_language` is the only transition.
/// - Overlapping `set_language` calls resolve last-call-wins: each call takes a
///   request token when issued. When its dictionaries are ready, a call does
///   nothing if a newer call was already applied or is still in flight.
/// - A call whose future is dropped withdraws its token, so it no longer blocks
///   older calls that are still running.
pub struct Translator<S, P> {
    config: I18nConfig,
    cache: DictionaryCache<S>,
    preferences: P,
    state: RwLock<ActiveLanguage>,
    next_request: AtomicU64,
    last_applied: AtomicU64,
    in_flight: StdMutex<BTreeSet<u64>>,
    locale_candidates: Option<Vec<String>>,
}

/// Token of a `set_language` call that has not finished; withdrawn on drop.
struct PendingRequest<'a> {
    in_flight: &'a StdMutex<BTreeSet<u64>>,
    token: u64,
}

impl<'a> PendingRequest<'a> {
    fn register(in_flight: &'a StdMutex<BTreeSet<u64>>, token: u64) -> Self {
        in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(token);
        Self { in_flight, token }
    }
}

impl Drop for PendingRequest<'_> {
    fn drop(&mut self) {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.token);
    }
}

impl<S: DictionarySource, P: PreferenceStore> Translator<S, P> {
    /// What: Create a translator; nothing is loaded or applied until `boot`/`set_language`.
    ///
    /// Inputs:
    /// - `config`: Normalized i18n configuration
    /// - `source`: Where dictionaries are fetched from
    /// - `preferences`: Where the chosen language is persisted
    #[must_use]
    pub fn new(config: I18nConfig, source: S, preferences: P) -> Self {
        let state = ActiveLanguage {
            lang: config.default_language.clone(),
            dictionary: Arc::new(Dictionary::empty()),
        };
        Self {
            config,
            cache: DictionaryCache::new(source),
            preferences,
            state: RwLock::new(state),
            next_request: AtomicU64::new(0),
            last_applied: AtomicU64::new(0),
            in_flight: StdMutex::new(BTreeSet::new()),
            locale_candidates: None,
        }
    }

    /// What: Use explicit locale candidates (e.g., from `Accept-Language`) instead of the
    /// environment when detecting the initial language.
    #[must_use]
    pub fn with_locale_candidates(mut self, candidates: Vec<String>) -> Self {
        self.locale_candidates = Some(candidates);
        self
    }

    /// What: Configuration in use.
    #[must_use]
    pub const fn config(&self) -> &I18nConfig {
        &self.config
    }

    /// What: Dictionary cache.
    #[must_use]
    pub const fn cache(&self) -> &DictionaryCache<S> {
        &self.cache
    }

    /// What: Preference store.
    #[must_use]
    pub const fn preferences(&self) -> &P {
        &self.preferences
    }

    /// What: Snapshot of the active state.
    #[must_use]
    pub fn active(&self) -> ActiveLanguage {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// What: Code of the active language.
    #[must_use]
    pub fn current_language(&self) -> String {
        self.active().lang
    }

    /// What: Language to activate at boot.
    ///
    /// Details:
    /// - Stored preference -> locale guess (when `detect_locale` is set) -> default.
    #[must_use]
    pub fn initial_language(&self) -> String {
        let stored = self.preferences.get(&self.config.preference_key);
        let candidates = if self.config.detect_locale {
            self.locale_candidates
                .clone()
                .unwrap_or_else(system_locale_candidates)
        } else {
            Vec::new()
        };
        LanguageResolver::new(&self.config).initial_language(stored.as_deref(), &candidates)
    }

    /// What: Load the dictionary for `lang`, from cache when possible.
    ///
    /// Output:
    /// - Shared dictionary; empty if it could not be fetched or parsed
    pub async fn load_dictionary(&self, lang: &str) -> Arc<Dictionary> {
        self.cache.load(lang).await
    }

    /// What: Cached default-language dictionary, unless it is already the active tier.
    ///
    /// Details:
    /// - Compared by identity, so the empty placeholder before boot or after a failed
    ///   load never hides a default dictionary that is cached since.
    fn default_tier(&self, active: &ActiveLanguage) -> Option<Arc<Dictionary>> {
        self.cache
            .get(&self.config.default_language)
            .filter(|default| !Arc::ptr_eq(default, &active.dictionary))
    }

    /// What: Look up a display string: active -> default language -> key path.
    ///
    /// Details:
    /// - Loads the default-language dictionary on demand if it is not cached yet.
    /// - Never fails.
    pub async fn lookup_with_fallback(&self, key: &str) -> String {
        let active = self.active();
        if let Some(text) = active.dictionary.text(key) {
            return text.to_string();
        }
        let default = self.cache.load(&self.config.default_language).await;
        let default = (!Arc::ptr_eq(&default, &active.dictionary)).then_some(default);
        translate_with_fallback(key, &active.dictionary, default.as_deref())
    }

    /// What: Synchronous lookup using only dictionaries that are already loaded.
    #[must_use]
    pub fn t(&self, key: &str) -> String {
        let active = self.active();
        let default = self.default_tier(&active);
        translate_with_fallback(key, &active.dictionary, default.as_deref())
    }

    /// What: Synchronous lookup with positional `{}` substitution.
    #[must_use]
    pub fn t_fmt(&self, key: &str, args: &[&dyn std::fmt::Display]) -> String {
        format_placeholders(&self.t(key), args)
    }

    /// What: Apply bindings in `scope` using the active state.
    ///
    /// Output:
    /// - Number of facets written
    pub fn apply_bindings<D: Document>(&self, doc: &mut D, scope: D::Node) -> usize {
        let active = self.active();
        let default = self.default_tier(&active);
        let chain = FallbackChain::new(&active.dictionary, default.as_deref());
        binder::apply_bindings(doc, scope, &chain)
    }

    /// What: Switch the active language and re-render the document.
    ///
    /// Inputs:
    /// - `lang`: Requested language (aliases are resolved; unsupported codes use the default)
    /// - `doc`: Document to update
    ///
    /// Output:
    /// - `true` if this call's language was applied, `false` if a newer call superseded it
    ///   (a newer call already applied, or still in flight when this one is ready)
    ///
    /// Details:
    /// - Loads the target and default dictionaries before touching any state.
    /// - Swap, persist, apply and `<html lang>` update happen under the document lock,
    ///   so no partially applied pass is observable.
    /// - Load and persistence failures are logged and degrade to the fallback chain.
    pub async fn set_language<D: Document>(&self, lang: &str, doc: &Mutex<D>) -> bool {
        let token = self.next_request.fetch_add(1, Ordering::SeqCst) + 1;
        let _pending = PendingRequest::register(&self.in_flight, token);
        let lang = LanguageResolver::new(&self.config).canonicalize(lang);

        let dictionary = self.cache.load(&lang).await;
        if lang != self.config.default_language {
            // Keep the fallback tier resident before switching.
            let _ = self.cache.load(&self.config.default_language).await;
        }

        let mut doc = doc.lock().await;
        if self.is_superseded(token) {
            tracing::debug!(language = %lang, token, "Language switch superseded by a newer request");
            return false;
        }
        self.last_applied.store(token, Ordering::SeqCst);

        {
            let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
            *state = ActiveLanguage {
                lang: lang.clone(),
                dictionary,
            };
        }

        if let Err(e) = self.preferences.set(&self.config.preference_key, &lang) {
            tracing::warn!(error = %e, "Failed to persist language preference");
        }

        let root = doc.root();
        let written = self.apply_bindings(&mut *doc, root);
        doc.set_language(&lang);
        tracing::info!(language = %lang, bindings = written, "Language applied");
        true
    }

    /// What: Whether a call newer than `token` was applied or is still running.
    ///
    /// Details:
    /// - Only called with the document lock held, which serializes every apply.
    fn is_superseded(&self, token: u64) -> bool {
        if self.last_applied.load(Ordering::SeqCst) > token {
            return true;
        }
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .range(token + 1..)
            .next()
            .is_some()
    }

    /// What: Activate the language chosen at boot and render the document.
    ///
    /// Output:
    /// - The language that was activated
    pub async fn boot<D: Document>(&self, doc: &Mutex<D>) -> String {
        let lang = self.initial_language();
        tracing::debug!(language = %lang, "Booting translator");
        self.set_language(&lang, doc).await;
        self.current_language()
    }

    /// What: Language switch controls present in the document.
    #[must_use]
    pub fn language_switches<D: Document>(&self, doc: &D) -> Vec<(D::Node, String)> {
        binder::language_switches(doc, doc.root())
    }

    /// What: Handle activation of a language switch control.
    ///
    /// Output:
    /// - `None` if `node` is not a switch control, otherwise the result of `set_language`
    ///
    /// Details:
    /// - A control with an empty code switches to the default language.
    pub async fn activate_switch<D: Document>(&self, doc: &Mutex<D>, node: D::Node) -> Option<bool> {
        let target = {
            let guard = doc.lock().await;
            guard.attribute(node, ATTR_LANG_SWITCH).map(str::trim).map(|lang| {
                if lang.is_empty() {
                    self.config.default_language.clone()
                } else {
                    lang.to_string()
                }
            })
        }?;
        Some(self.set_language(&target, doc).await)
    }

    /// What: Subscribe to dynamic content changes in `doc`.
    ///
    /// Output:
    /// - `Observer` that re-applies bindings only to inserted or re-declared elements
    pub fn observe_dynamic_content<D: Observable>(&self, doc: &mut D) -> Observer<'_, S, P, D> {
        Observer::new(self, doc.subscribe())
    }
}
