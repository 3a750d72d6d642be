//! Session-scoped dictionary cache with single-flight loading.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::OnceCell;

use crate::i18n::dictionary::Dictionary;
use crate::i18n::loader::{DictionarySource, fetch_dictionary};

/// Cell shared by every caller loading the same language.
type Slot = Arc<OnceCell<Arc<Dictionary>>>;

/// What: Cache of loaded dictionaries keyed by language code.
///
/// Details:
/// - Grows monotonically and is never evicted.
/// - Concurrent first loads of one language share a single fetch.
/// - Failed loads are not stored, so a later call may retry the fetch.
pub struct DictionaryCache<S> {
    source: S,
    slots: Mutex<HashMap<String, Slot>>,
}

impl<S: DictionarySource> DictionaryCache<S> {
    /// What: Create an empty cache over `source`.
    #[must_use]
    pub fn new(source: S) -> Self {
        Self {
            source,
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// What: Source the cache loads from.
    #[must_use]
    pub const fn source(&self) -> &S {
        &self.source
    }

    fn slot(&self, lang: &str) -> Slot {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(slots.entry(lang.to_string()).or_default())
    }

    /// What: Return the dictionary for `lang` if it has already been loaded.
    #[must_use]
    pub fn get(&self, lang: &str) -> Option<Arc<Dictionary>> {
        let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots.get(lang).and_then(|slot| slot.get().cloned())
    }

    /// What: Check whether `lang` has a loaded dictionary.
    #[must_use]
    pub fn contains(&self, lang: &str) -> bool {
        self.get(lang).is_some()
    }

    /// What: Load the dictionary for `lang`, using the cache if available.
    ///
    /// Inputs:
    /// - `lang`: Language code to load
    ///
    /// Output:
    /// - Shared dictionary; an empty one when fetching or parsing failed
    ///
    /// Details:
    /// - A second caller arriving while the first fetch is pending awaits that fetch.
    /// - Failures are logged with `tracing::warn!` and never returned.
    pub async fn load(&self, lang: &str) -> Arc<Dictionary> {
        let slot = self.slot(lang);
        let loaded = slot
            .get_or_try_init(|| async {
                let dictionary = fetch_dictionary(&self.source, lang).await?;
                tracing::debug!(
                    "Loaded dictionary '{}' with {} translation keys",
                    lang,
                    dictionary.leaf_count()
                );
                Ok::<_, crate::i18n::loader::LoadError>(Arc::new(dictionary))
            })
            .await;
        match loaded {
            Ok(dictionary) => Arc::clone(dictionary),
            Err(e) => {
                tracing::warn!(language = %lang, error = %e, "Failed to load dictionary");
                Arc::new(Dictionary::empty())
            }
        }
    }

    /// What: Languages currently held in the cache.
    #[must_use]
    pub fn loaded_languages(&self) -> Vec<String> {
        let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        let mut langs: Vec<String> = slots
            .iter()
            .filter(|(_, slot)| slot.initialized())
            .map(|(lang, _)| lang.clone())
            .collect();
        langs.sort();
        langs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::loader::{DictionaryFormat, LoadError};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Source serving fixed documents and counting fetches.
    struct CountingSource {
        fetches: AtomicUsize,
    }

    impl DictionarySource for CountingSource {
        fn location(&self, lang: &str) -> String {
            format!("mem://{lang}.json")
        }

        fn format(&self) -> DictionaryFormat {
            DictionaryFormat::Json
        }

        async fn fetch(&self, lang: &str) -> Result<Vec<u8>, LoadError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            tokio::task::yield_now().await;
            match lang {
                "en" => Ok(br#"{"hello": "Hello"}"#.to_vec()),
                "zh" => Ok(br#"{"hello": "Ni hao"}"#.to_vec()),
                "bad" => Ok(b"{not json".to_vec()),
                _ => Err(LoadError::Unavailable {
                    location: self.location(lang),
                    reason: "not found".to_string(),
                }),
            }
        }
    }

    fn cache() -> DictionaryCache<CountingSource> {
        DictionaryCache::new(CountingSource {
            fetches: AtomicUsize::new(0),
        })
    }

    #[tokio::test]
    async fn test_concurrent_loads_share_one_fetch() {
        let cache = cache();
        let (a, b) = futures::join!(cache.load("zh"), cache.load("zh"));
        assert_eq!(a.text("hello"), Some("Ni hao"));
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(cache.source().fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_cached_load_does_not_refetch() {
        let cache = cache();
        let _ = cache.load("en").await;
        let again = cache.load("en").await;
        assert_eq!(again.text("hello"), Some("Hello"));
        assert_eq!(cache.source().fetches.load(Ordering::SeqCst), 1);
        assert!(cache.contains("en"));
        assert_eq!(cache.loaded_languages(), vec!["en".to_string()]);
    }

    #[tokio::test]
    async fn test_failed_load_yields_empty_and_is_not_cached() {
        let cache = cache();
        let d = cache.load("bad").await;
        assert!(d.is_empty());
        assert!(!cache.contains("bad"));

        let missing = cache.load("fr").await;
        assert!(missing.is_empty());
        let _ = cache.load("fr").await;
        assert_eq!(cache.source().fetches.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_invalid_code_never_reaches_source() {
        let cache = cache();
        let d = cache.load("en/../zh").await;
        assert!(d.is_empty());
        assert_eq!(cache.source().fetches.load(Ordering::SeqCst), 0);
    }
}
