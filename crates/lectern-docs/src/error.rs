//! Error types for the documentation crate.
//!
//! This module defines errors that can occur while generating, enriching,
//! caching and serializing descriptor documents.

use thiserror::Error;

/// Errors that can occur during documentation generation.
#[derive(Debug, Error)]
pub enum DocsError {
    /// Failed to serialize or deserialize a descriptor document.
    #[error("Failed to serialize descriptor document: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// The requested API version is not known to the document generator.
    #[error("Unknown API version '{version}'")]
    UnknownApiVersion {
        /// The version that was requested.
        version: String,
        /// Versions the generator does know about.
        known: Vec<String>,
    },

    /// The XML documentation source could not be parsed.
    #[error("Failed to parse documentation source: {reason}")]
    DocumentationParse {
        /// The reason the source was rejected.
        reason: String,
    },

    /// The type descriptor table could not be parsed.
    #[error("Failed to parse type descriptor table: {reason}")]
    DescriptorParse {
        /// The reason the table was rejected.
        reason: String,
    },

    /// A type descriptor is internally inconsistent.
    #[error("Invalid descriptor for '{schema}': {reason}")]
    InvalidDescriptor {
        /// The schema the descriptor belongs to.
        schema: String,
        /// What is wrong with it.
        reason: String,
    },

    /// IO error when reading documentation or descriptor files.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl DocsError {
    /// Creates an unknown API version error.
    pub fn unknown_api_version(version: impl Into<String>, known: Vec<String>) -> Self {
        Self::UnknownApiVersion {
            version: version.into(),
            known,
        }
    }

    /// Creates a documentation parse error.
    pub fn documentation_parse(reason: impl Into<String>) -> Self {
        Self::DocumentationParse {
            reason: reason.into(),
        }
    }

    /// Creates a descriptor parse error.
    pub fn descriptor_parse(reason: impl Into<String>) -> Self {
        Self::DescriptorParse {
            reason: reason.into(),
        }
    }

    /// Creates an invalid descriptor error.
    pub fn invalid_descriptor(schema: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidDescriptor {
            schema: schema.into(),
            reason: reason.into(),
        }
    }

    /// Returns `true` if this error means the requested version does not exist.
    pub fn is_unknown_api_version(&self) -> bool {
        matches!(self, Self::UnknownApiVersion { .. })
    }
}

/// Result type for documentation operations.
pub type DocsResult<T> = Result<T, DocsError>;
