//! Schema enrichment from XML documentation.
//!
//! Walks every schema in a document's `definitions`, resolves the member it
//! was generated from and copies the matching summary and example into the
//! schema. Properties get the same treatment through their backing members.
//! Values are overwritten, never appended, so enriching twice is the same as
//! enriching once.

use std::sync::Arc;

use serde_json::Value;

use crate::document::{Document, Schema};
use crate::member::TypeMetadataResolver;
use crate::xmldoc::{DocumentationEntry, DocumentationIndex};

/// Counters describing one enrichment pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnrichmentStats {
    /// Schemas whose type had a documentation entry.
    pub types_documented: usize,
    /// Properties whose backing member had a documentation entry.
    pub properties_documented: usize,
    /// Properties with no resolvable backing member.
    pub properties_unresolved: usize,
}

/// Merges documentation entries into generated schemas.
#[derive(Clone)]
pub struct SchemaEnricher {
    resolver: Arc<dyn TypeMetadataResolver>,
    index: Arc<DocumentationIndex>,
}

impl std::fmt::Debug for SchemaEnricher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaEnricher")
            .field("documented_members", &self.index.len())
            .finish_non_exhaustive()
    }
}

impl SchemaEnricher {
    /// Creates an enricher over a resolver and documentation index.
    pub fn new(resolver: Arc<dyn TypeMetadataResolver>, index: Arc<DocumentationIndex>) -> Self {
        Self { resolver, index }
    }

    /// The documentation index this enricher reads from.
    pub fn index(&self) -> &DocumentationIndex {
        &self.index
    }

    /// Enriches every schema in `document` in place.
    pub fn enrich(&self, document: &mut Document) -> EnrichmentStats {
        enrich(document, self.resolver.as_ref(), &self.index)
    }
}

/// Enriches every schema in `document` in place.
///
/// Types and properties that cannot be resolved to a member, or that have no
/// documentation, are left untouched.
pub fn enrich(
    document: &mut Document,
    resolver: &dyn TypeMetadataResolver,
    index: &DocumentationIndex,
) -> EnrichmentStats {
    let mut stats = EnrichmentStats::default();

    for (schema_name, schema) in &mut document.definitions {
        match resolver.type_member_id(schema_name) {
            Some(type_id) => {
                if let Some(entry) = index.lookup(&type_id) {
                    apply_entry(schema, entry);
                    stats.types_documented += 1;
                }
            }
            None => {
                tracing::debug!(schema = %schema_name, "schema has no resolvable type, skipping");
            }
        }

        for (property_name, property) in &mut schema.properties {
            let Some(member_id) = resolver.property_member_id(schema_name, property_name) else {
                stats.properties_unresolved += 1;
                tracing::trace!(
                    schema = %schema_name,
                    property = %property_name,
                    "property has no backing member, skipping"
                );
                continue;
            };
            if let Some(entry) = index.lookup(&member_id) {
                apply_entry(property, entry);
                stats.properties_documented += 1;
            }
        }
    }

    tracing::debug!(
        types = stats.types_documented,
        properties = stats.properties_documented,
        unresolved = stats.properties_unresolved,
        "enriched descriptor document"
    );
    stats
}

fn apply_entry(schema: &mut Schema, entry: &DocumentationEntry) {
    if let Some(summary) = &entry.summary {
        schema.description = Some(summary.clone());
    }
    if let Some(example) = &entry.example {
        schema.example = Some(Value::String(example.clone()));
    }
}
