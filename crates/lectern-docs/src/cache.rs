//! Process-wide descriptor document cache.
//!
//! Holds at most one generated-and-enriched document together with the time
//! it was generated. Callers ask for the current document and supply a
//! generator that is invoked only when the cache is empty, when the cached
//! record was built for another API version, or when regeneration is forced.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, SubsecRound, Utc};
use parking_lot::RwLock;

use crate::document::Document;

/// A generated document and the moment it was generated.
#[derive(Debug, Clone)]
pub struct CachedDocument {
    /// The enriched document. Never mutated once cached.
    pub document: Arc<Document>,
    /// Generation time, truncated to whole seconds to match HTTP dates.
    pub generated_at: DateTime<Utc>,
    /// API version the document was generated for, if any.
    pub api_version: Option<String>,
}

impl CachedDocument {
    fn matches(&self, api_version: Option<&str>) -> bool {
        match api_version {
            None => true,
            Some(version) => self.api_version.as_deref() == Some(version),
        }
    }
}

/// Cache statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Requests answered from the cached record.
    pub hits: u64,
    /// Generator invocations that produced a new record.
    pub regenerations: u64,
}

/// Single-record document cache with atomic whole-record replacement.
///
/// The generator always runs with no lock held; only the final pointer swap
/// takes the write lock. Readers therefore see either the previous record or
/// the new one, never a partially built state.
///
/// Concurrent misses are not coalesced. When several callers find the cache
/// empty at the same time each of them runs the generator, and the record
/// stored last wins. Generation is idempotent for an unchanged source, so
/// the redundant work is accepted in exchange for never blocking a reader
/// behind a slow generator.
#[derive(Debug, Default)]
pub struct DocumentCache {
    record: RwLock<Option<Arc<CachedDocument>>>,
    hits: AtomicU64,
    regenerations: AtomicU64,
}

impl DocumentCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current document, generating it first if needed.
    ///
    /// The generator runs when `force_regenerate` is set or nothing has been
    /// generated yet. A generator error leaves the cache unchanged.
    pub fn get_document<F, E>(
        &self,
        force_regenerate: bool,
        generator: F,
    ) -> Result<Arc<CachedDocument>, E>
    where
        F: FnOnce() -> Result<Document, E>,
    {
        self.get_or_generate(None, force_regenerate, generator)
    }

    /// Like [`get_document`](Self::get_document), keyed by API version.
    ///
    /// A record generated for a different version counts as a miss, so the
    /// single slot never serves one version's document for another.
    pub fn get_versioned_document<F, E>(
        &self,
        api_version: &str,
        force_regenerate: bool,
        generator: F,
    ) -> Result<Arc<CachedDocument>, E>
    where
        F: FnOnce() -> Result<Document, E>,
    {
        self.get_or_generate(Some(api_version), force_regenerate, generator)
    }

    fn get_or_generate<F, E>(
        &self,
        api_version: Option<&str>,
        force_regenerate: bool,
        generator: F,
    ) -> Result<Arc<CachedDocument>, E>
    where
        F: FnOnce() -> Result<Document, E>,
    {
        if !force_regenerate {
            if let Some(record) = self.current().filter(|r| r.matches(api_version)) {
                self.hits.fetch_add(1, Ordering::Relaxed);
                metrics::counter!("lectern_docs_cache_hits_total").increment(1);
                tracing::debug!(api_version = ?api_version, "serving cached descriptor document");
                return Ok(record);
            }
        }

        let document = generator()?;
        let record = Arc::new(CachedDocument {
            document: Arc::new(document),
            generated_at: Utc::now().trunc_subsecs(0),
            api_version: api_version.map(str::to_string),
        });
        *self.record.write() = Some(Arc::clone(&record));

        self.regenerations.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("lectern_docs_regenerations_total").increment(1);
        tracing::info!(
            api_version = ?api_version,
            forced = force_regenerate,
            generated_at = %record.generated_at,
            "regenerated descriptor document"
        );
        Ok(record)
    }

    /// The current record, if any.
    pub fn current(&self) -> Option<Arc<CachedDocument>> {
        self.record.read().clone()
    }

    /// Generation time of the record for `api_version`, if one is cached.
    pub fn last_modified(&self, api_version: &str) -> Option<DateTime<Utc>> {
        self.current()
            .filter(|r| r.matches(Some(api_version)))
            .map(|r| r.generated_at)
    }

    /// Drops the cached record. The next request regenerates.
    pub fn invalidate(&self) {
        *self.record.write() = None;
    }

    /// Hit and regeneration counts since creation.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            regenerations: self.regenerations.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Schema;
    use std::convert::Infallible;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Barrier;
    use std::thread;

    fn doc(title: &str) -> Document {
        Document::new(title, "V1").definition(title, Schema::object())
    }

    #[test]
    fn test_first_call_generates() {
        let cache = DocumentCache::new();
        assert!(cache.current().is_none());

        let record = cache
            .get_document(false, || Ok::<_, Infallible>(doc("A")))
            .unwrap();
        assert_eq!(record.document.info.title, "A");
        assert_eq!(record.generated_at.timestamp_subsec_nanos(), 0);
        assert_eq!(cache.stats().regenerations, 1);
    }

    #[test]
    fn test_second_call_is_served_from_cache() {
        let cache = DocumentCache::new();
        let calls = AtomicUsize::new(0);
        let generate = || {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok::<_, Infallible>(doc("A"))
        };

        let first = cache.get_document(false, generate).unwrap();
        let second = cache.get_document(false, generate).unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(
            cache.stats(),
            CacheStats {
                hits: 1,
                regenerations: 1
            }
        );
    }

    #[test]
    fn test_forced_regeneration_replaces_record() {
        let cache = DocumentCache::new();
        let calls = AtomicUsize::new(0);

        for _ in 0..2 {
            cache
                .get_document(true, || {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, Infallible>(doc("A"))
                })
                .unwrap();
        }

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_generator_error_leaves_cache_unchanged() {
        let cache = DocumentCache::new();
        cache
            .get_document(false, || Ok::<_, &str>(doc("A")))
            .unwrap();

        let result = cache.get_document(true, || Err::<Document, _>("boom"));
        assert_eq!(result.unwrap_err(), "boom");
        assert_eq!(cache.current().unwrap().document.info.title, "A");
    }

    #[test]
    fn test_version_mismatch_is_a_miss() {
        let cache = DocumentCache::new();
        cache
            .get_versioned_document("V1", false, || Ok::<_, Infallible>(doc("one")))
            .unwrap();
        let v2 = cache
            .get_versioned_document("V2", false, || Ok::<_, Infallible>(doc("two")))
            .unwrap();

        assert_eq!(v2.document.info.title, "two");
        assert!(cache.last_modified("V1").is_none());
        assert!(cache.last_modified("V2").is_some());
    }

    #[test]
    fn test_invalidate() {
        let cache = DocumentCache::new();
        cache
            .get_document(false, || Ok::<_, Infallible>(doc("A")))
            .unwrap();
        cache.invalidate();
        assert!(cache.current().is_none());
    }

    #[test]
    fn test_concurrent_misses_race_without_corruption() {
        let cache = Arc::new(DocumentCache::new());
        let calls = Arc::new(AtomicUsize::new(0));
        let barrier = Arc::new(Barrier::new(2));

        let writers: Vec<_> = ["A", "B"]
            .into_iter()
            .map(|title| {
                let cache = Arc::clone(&cache);
                let calls = Arc::clone(&calls);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    cache
                        .get_document(false, || {
                            calls.fetch_add(1, Ordering::SeqCst);
                            // Both callers are inside the generator before either stores.
                            barrier.wait();
                            Ok::<_, Infallible>(doc(title))
                        })
                        .unwrap()
                })
            })
            .collect();

        let reader = {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                for _ in 0..10_000 {
                    if let Some(record) = cache.current() {
                        let title = &record.document.info.title;
                        assert!(title == "A" || title == "B");
                        assert!(record.document.definitions.contains_key(title.as_str()));
                    }
                }
            })
        };

        for writer in writers {
            writer.join().unwrap();
        }
        reader.join().unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        let last = cache.current().unwrap();
        assert!(["A", "B"].contains(&last.document.info.title.as_str()));
        assert_eq!(cache.stats().regenerations, 2);
    }
}
