//! Generate, enrich, cache.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::cache::{CachedDocument, DocumentCache};
use crate::enrich::SchemaEnricher;
use crate::error::DocsResult;
use crate::generator::DocumentGenerator;

/// Produces cached, enriched documents on demand.
///
/// Every document that reaches the cache has been through exactly one
/// enrichment pass.
pub struct DocumentPipeline {
    generator: Arc<dyn DocumentGenerator>,
    enricher: Option<SchemaEnricher>,
    cache: DocumentCache,
}

impl std::fmt::Debug for DocumentPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentPipeline")
            .field("enricher", &self.enricher)
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

impl DocumentPipeline {
    /// Creates a pipeline that serves generated documents without enrichment.
    pub fn new(generator: Arc<dyn DocumentGenerator>) -> Self {
        Self {
            generator,
            enricher: None,
            cache: DocumentCache::new(),
        }
    }

    /// Enriches every generated document with `enricher`.
    #[must_use]
    pub fn with_enricher(mut self, enricher: SchemaEnricher) -> Self {
        self.enricher = Some(enricher);
        self
    }

    /// Returns the document for `api_version`.
    ///
    /// Regenerates when `force_regenerate` is set, when nothing is cached, or
    /// when the cached record belongs to another version.
    pub fn document(
        &self,
        root_url: &str,
        api_version: &str,
        force_regenerate: bool,
    ) -> DocsResult<Arc<CachedDocument>> {
        self.cache
            .get_versioned_document(api_version, force_regenerate, || {
                let mut document = self.generator.generate(root_url, api_version)?;
                if let Some(enricher) = &self.enricher {
                    enricher.enrich(&mut document);
                }
                Ok(document)
            })
    }

    /// Generation time of the cached document for `api_version`.
    pub fn last_modified(&self, api_version: &str) -> Option<DateTime<Utc>> {
        self.cache.last_modified(api_version)
    }

    /// The underlying cache.
    pub fn cache(&self) -> &DocumentCache {
        &self.cache
    }
}
