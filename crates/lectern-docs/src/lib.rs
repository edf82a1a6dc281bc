//! # Lectern Docs
//!
//! Descriptor document generation, enrichment and caching for Lectern.
//!
//! This crate provides:
//! - **Document model**: Swagger 2.0 style types with vendor extension support
//! - **Documentation index**: point lookups into XML documentation files
//! - **Schema enrichment**: summaries and examples merged into schemas
//! - **Document cache**: a single record with atomic replacement
//! - **Formatters**: JSON output with flattened `x-` extensions
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use lectern_docs::{
//!     DocumentPipeline, DocumentationIndex, RegistryGenerator, SchemaEnricher, TypeRegistry,
//! };
//!
//! let registry = Arc::new(TypeRegistry::from_file("types.toml")?);
//! let index = Arc::new(DocumentationIndex::from_file("Shop.xml")?);
//!
//! let pipeline = DocumentPipeline::new(Arc::new(RegistryGenerator::new(registry.clone())))
//!     .with_enricher(SchemaEnricher::new(registry, index));
//!
//! let record = pipeline.document("https://api.example.com", "V1", false)?;
//! println!("generated at {}", record.generated_at);
//! ```

mod cache;
mod document;
mod enrich;
mod error;
mod format;
mod generator;
mod member;
mod pipeline;
mod registry;
mod xmldoc;

pub use cache::{CacheStats, CachedDocument, DocumentCache};
pub use document::{
    Contact, Document, Info, License, Operation, Parameter, ParameterIn, PathItem, Response,
    Schema, SchemaType, Tag, VendorExtensions, SWAGGER_VERSION, VENDOR_EXTENSIONS_KEY,
    VENDOR_EXTENSION_PREFIX,
};
pub use enrich::{enrich, EnrichmentStats, SchemaEnricher};
pub use error::{DocsError, DocsResult};
pub use format::{
    default_formatters, flatten_vendor_extensions, nest_vendor_extensions, DescriptorFormatter,
    JsonFormatter, JsonFormatting, SharedFormatter, JSON_MEDIA_TYPES,
};
pub use generator::{DocumentGenerator, RegistryGenerator};
pub use member::{normalize_qualified_name, MemberId, MemberKind, TypeMetadataResolver};
pub use pipeline::DocumentPipeline;
pub use registry::{
    DescriptorTable, OperationDescriptor, PropertyDescriptor, TypeDescriptor, TypeRegistry,
    VersionDescriptor,
};
pub use xmldoc::{DocumentationEntry, DocumentationIndex};
