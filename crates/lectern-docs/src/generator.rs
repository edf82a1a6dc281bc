//! Document generation.
//!
//! [`DocumentGenerator`] is the seam to whatever knows the service's routes
//! and types. [`RegistryGenerator`] is the implementation driven by a
//! [`TypeRegistry`].

use std::sync::{Arc, OnceLock};

use regex::Regex;

use crate::document::{Document, Operation, Parameter, Response, Schema, Tag};
use crate::error::{DocsError, DocsResult};
use crate::registry::{OperationDescriptor, TypeRegistry};

/// Builds raw, not yet enriched, descriptor documents.
pub trait DocumentGenerator: Send + Sync {
    /// Generates the document for `api_version`, served from `root_url`.
    ///
    /// Fails with [`DocsError::UnknownApiVersion`] when the version does not
    /// exist.
    fn generate(&self, root_url: &str, api_version: &str) -> DocsResult<Document>;
}

/// Generator over a descriptor table.
#[derive(Debug, Clone)]
pub struct RegistryGenerator {
    registry: Arc<TypeRegistry>,
}

impl RegistryGenerator {
    /// Creates a generator over a shared registry.
    pub fn new(registry: Arc<TypeRegistry>) -> Self {
        Self { registry }
    }

    fn operation(descriptor: &OperationDescriptor) -> Operation {
        let mut operation = Operation::new(&descriptor.operation_id);
        operation.summary.clone_from(&descriptor.summary);
        operation.tags.clone_from(&descriptor.tags);
        operation.deprecated = descriptor.deprecated;
        operation.parameters = extract_path_parameters(&descriptor.path);

        let response = Response::new("Success");
        let response = match &descriptor.response {
            Some(schema) => response.with_schema(Schema::definition_ref(schema)),
            None => response,
        };
        operation.responses.insert("200".to_string(), response);
        operation
    }
}

impl DocumentGenerator for RegistryGenerator {
    fn generate(&self, root_url: &str, api_version: &str) -> DocsResult<Document> {
        let version = self
            .registry
            .version(api_version)
            .ok_or_else(|| DocsError::unknown_api_version(api_version, self.registry.versions()))?;
        let table = self.registry.table();

        let title = version.title.as_ref().unwrap_or(&table.title);
        let mut document = Document::new(title, &version.version);
        document.info.description = version
            .description
            .clone()
            .or_else(|| table.description.clone());
        apply_root_url(&mut document, root_url);
        document.produces = vec!["application/json".to_string()];

        let schema_names: Vec<&str> = if version.schemas.is_empty() {
            table.types.iter().map(|t| t.schema.as_str()).collect()
        } else {
            version.schemas.iter().map(String::as_str).collect()
        };
        for name in schema_names {
            let schema = self
                .registry
                .schema(name)
                .ok_or_else(|| DocsError::invalid_descriptor(name, "schema is not described"))?;
            document.definitions.insert(name.to_string(), schema);
        }

        for descriptor in &version.operations {
            let item = document
                .paths
                .entry(descriptor.path.clone())
                .or_default();
            let slot = item.operation_mut(&descriptor.method).ok_or_else(|| {
                DocsError::invalid_descriptor(
                    &descriptor.operation_id,
                    format!("unsupported HTTP method: {}", descriptor.method),
                )
            })?;
            *slot = Some(Self::operation(descriptor));

            for tag in &descriptor.tags {
                if !document.tags.iter().any(|t| &t.name == tag) {
                    document.tags.push(Tag {
                        name: tag.clone(),
                        description: None,
                    });
                }
            }
        }

        Ok(document)
    }
}

/// Splits a root URL into `schemes`, `host` and `basePath`.
fn apply_root_url(document: &mut Document, root_url: &str) {
    let (scheme, rest) = match root_url.split_once("://") {
        Some((scheme, rest)) => (Some(scheme), rest),
        None => (None, root_url),
    };
    let (host, base_path) = match rest.find('/') {
        Some(i) => (&rest[..i], rest[i..].trim_end_matches('/')),
        None => (rest, ""),
    };

    if let Some(scheme) = scheme.filter(|s| !s.is_empty()) {
        document.schemes = vec![scheme.to_ascii_lowercase()];
    }
    if !host.is_empty() {
        document.host = Some(host.to_string());
    }
    if !base_path.is_empty() {
        document.base_path = Some(base_path.to_string());
    }
}

/// Extract path parameters from a path template like `/widgets/{id}`.
fn extract_path_parameters(path: &str) -> Vec<Parameter> {
    static PARAM: OnceLock<Regex> = OnceLock::new();
    let regex = PARAM.get_or_init(|| Regex::new(r"\{([^}/]+)\}").expect("valid regex"));

    regex
        .captures_iter(path)
        .filter_map(|cap| cap.get(1))
        .map(|name| Parameter::path(name.as_str()))
        .collect()
}
