//! Wires configuration, descriptor sources and the server together.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use lectern_config::LecternConfig;
use lectern_docs::{
    default_formatters, DocumentPipeline, DocumentationIndex, RegistryGenerator, SchemaEnricher,
    TypeMetadataResolver, TypeRegistry,
};
use lectern_server::{DocsResponder, ResponderOptions, Server, ServerConfig};

/// A fully loaded Lectern instance, ready to serve.
#[derive(Debug)]
pub struct Application {
    config: LecternConfig,
    registry: Arc<TypeRegistry>,
    index: Arc<DocumentationIndex>,
}

impl Application {
    /// Loads the descriptor table and documentation files named by `config`.
    pub fn from_config(config: LecternConfig) -> Result<Self> {
        let descriptor_path = config
            .docs
            .descriptor_path
            .as_deref()
            .context("docs.descriptor_path must name a type descriptor table")?;

        let registry = TypeRegistry::from_file(descriptor_path).with_context(|| {
            format!(
                "failed to load descriptor table {}",
                descriptor_path.display()
            )
        })?;

        let index = DocumentationIndex::from_files(&config.docs.documentation_paths)
            .context("failed to load documentation files")?;
        if index.is_empty() && !config.docs.documentation_paths.is_empty() {
            tracing::warn!("documentation files contain no members");
        }

        Ok(Self {
            config,
            registry: Arc::new(registry),
            index: Arc::new(index),
        })
    }

    /// The loaded configuration.
    pub fn config(&self) -> &LecternConfig {
        &self.config
    }

    /// What was loaded, for `--check` and startup logs.
    pub fn summary(&self) -> Summary {
        Summary {
            http_addr: self.config.server.http_addr.clone(),
            route: self.config.docs.route.clone(),
            versions: self.registry.versions(),
            types: self.registry.table().types.len(),
            documented_members: self.index.len(),
            no_caching: self.config.docs.no_caching,
        }
    }

    /// Builds the document pipeline: generate, enrich, cache.
    pub fn pipeline(&self) -> DocumentPipeline {
        let generator = Arc::new(RegistryGenerator::new(Arc::clone(&self.registry)));
        DocumentPipeline::new(generator).with_enricher(SchemaEnricher::new(
            Arc::clone(&self.registry) as Arc<dyn TypeMetadataResolver>,
            Arc::clone(&self.index),
        ))
    }

    /// Builds the HTTP server.
    pub fn into_server(self) -> Result<Server> {
        let docs = &self.config.docs;
        let responder = DocsResponder::new(
            Arc::new(self.pipeline()),
            default_formatters(docs.json_formatting),
        )
        .with_options(ResponderOptions {
            no_caching: docs.no_caching,
            cors_allow_origin: docs.effective_cors_origin().map(str::to_string),
        });

        let server = &self.config.server;
        let mut server_config = ServerConfig::builder()
            .http_addr(&server.http_addr)
            .docs_route(&docs.route)
            .shutdown_timeout(Duration::from_secs(server.shutdown_timeout_secs))
            .request_timeout(Duration::from_millis(server.request_timeout_ms));
        if let Some(root_url) = &docs.root_url {
            server_config = server_config.root_url(root_url);
        }

        Server::builder(responder)
            .config(server_config.build())
            .service(&self.config.telemetry.service_name, crate::VERSION)
            .metrics_endpoint(self.config.telemetry.metrics.enabled)
            .build()
            .context("failed to build server")
    }
}

/// Startup summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    /// Listen address.
    pub http_addr: String,
    /// Descriptor route template.
    pub route: String,
    /// Declared API versions.
    pub versions: Vec<String>,
    /// Number of described types.
    pub types: usize,
    /// Number of documented members across all documentation files.
    pub documented_members: usize,
    /// Whether every request regenerates the document.
    pub no_caching: bool,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "listen:        {}", self.http_addr)?;
        writeln!(f, "route:         {}", self.route)?;
        writeln!(f, "versions:      {}", self.versions.join(", "))?;
        writeln!(f, "types:         {}", self.types)?;
        writeln!(f, "documented:    {}", self.documented_members)?;
        write!(f, "caching:       {}", if self.no_caching { "off" } else { "on" })
    }
}
