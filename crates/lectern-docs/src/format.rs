//! Descriptor serializers.
//!
//! A [`DescriptorFormatter`] turns a [`Document`] into response bytes for the
//! media types it advertises. The JSON formatter omits absent values and
//! flattens vendor extensions: serde writes each object's extension map under
//! [`VENDOR_EXTENSIONS_KEY`], and [`flatten_vendor_extensions`] hoists those
//! entries into the surrounding object as sibling keys. The inverse,
//! [`nest_vendor_extensions`], lets serialized documents be read back.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::document::{Document, VENDOR_EXTENSIONS_KEY, VENDOR_EXTENSION_PREFIX};
use crate::error::{DocsError, DocsResult};

/// Media types served by [`JsonFormatter`], most specific first.
pub const JSON_MEDIA_TYPES: &[&str] = &["application/json", "text/json"];

/// Serializes descriptor documents for a set of media types.
pub trait DescriptorFormatter: Send + Sync + fmt::Debug {
    /// Media types this formatter can produce. The first is its default.
    fn media_types(&self) -> &[&'static str];

    /// Serializes a document.
    fn serialize(&self, document: &Document) -> DocsResult<Bytes>;

    /// Returns `true` if this formatter can produce `media_type`.
    fn supports(&self, media_type: &str) -> bool {
        self.media_types()
            .iter()
            .any(|supported| supported.eq_ignore_ascii_case(media_type))
    }
}

/// Shared, type-erased formatter.
pub type SharedFormatter = Arc<dyn DescriptorFormatter>;

/// Output layout of the JSON formatter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JsonFormatting {
    /// Single line, no insignificant whitespace.
    #[default]
    Compact,
    /// Pretty printed with two-space indentation.
    Indented,
}

impl FromStr for JsonFormatting {
    type Err = DocsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "compact" | "none" => Ok(Self::Compact),
            "indented" | "pretty" => Ok(Self::Indented),
            other => Err(DocsError::invalid_descriptor(
                "json_formatting",
                format!("unknown formatting '{other}', expected compact or indented"),
            )),
        }
    }
}

/// JSON serializer for descriptor documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFormatter {
    formatting: JsonFormatting,
}

impl JsonFormatter {
    /// Creates a formatter with the given layout.
    pub fn new(formatting: JsonFormatting) -> Self {
        Self { formatting }
    }

    /// The configured layout.
    pub fn formatting(&self) -> JsonFormatting {
        self.formatting
    }

    /// Converts a document to its wire-form JSON tree.
    pub fn to_value(document: &Document) -> DocsResult<Value> {
        let mut value = serde_json::to_value(document)?;
        flatten_vendor_extensions(&mut value);
        Ok(value)
    }

    /// Parses a document from wire-form JSON.
    pub fn deserialize(bytes: &[u8]) -> DocsResult<Document> {
        let mut value: Value = serde_json::from_slice(bytes)?;
        nest_vendor_extensions(&mut value);
        Ok(serde_json::from_value(value)?)
    }
}

impl DescriptorFormatter for JsonFormatter {
    fn media_types(&self) -> &[&'static str] {
        JSON_MEDIA_TYPES
    }

    fn serialize(&self, document: &Document) -> DocsResult<Bytes> {
        let value = Self::to_value(document)?;
        let body = match self.formatting {
            JsonFormatting::Compact => serde_json::to_vec(&value)?,
            JsonFormatting::Indented => serde_json::to_vec_pretty(&value)?,
        };
        Ok(Bytes::from(body))
    }
}

/// The formatter set registered by default: a single JSON formatter.
pub fn default_formatters(formatting: JsonFormatting) -> Vec<SharedFormatter> {
    vec![Arc::new(JsonFormatter::new(formatting))]
}

/// What a position in the serialized tree holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Node {
    /// A model object (document, schema, operation, ...), or an array of them.
    Model,
    /// A name-keyed map of model objects: `paths`, `definitions`,
    /// `properties`, `responses`. Its keys are names, never extensions.
    ModelMap,
    /// Caller-supplied JSON that is written exactly as given.
    Opaque,
}

impl Node {
    fn of_member(key: &str) -> Self {
        match key {
            "paths" | "definitions" | "properties" | "responses" => Self::ModelMap,
            "example" | "enum" | "default" => Self::Opaque,
            _ => Self::Model,
        }
    }
}

/// Hoists vendor extension maps into their parent objects.
///
/// `value` is a serialized [`Document`] (or any model object inside one).
/// Every `$vendorExtensions` member of a model object is replaced, in place,
/// by its entries. Entries without the `x-` prefix are dropped with a
/// warning. Model members whose value is `null` are removed. Extension
/// values, examples and enum values are copied untouched.
pub fn flatten_vendor_extensions(value: &mut Value) {
    flatten_node(value, Node::Model);
}

fn flatten_node(value: &mut Value, node: Node) {
    match (node, value) {
        (Node::Opaque, _) => {}
        (Node::Model, Value::Object(map)) => {
            let members = std::mem::take(map);
            for (key, mut member) in members {
                if key == VENDOR_EXTENSIONS_KEY {
                    hoist_extensions(map, member);
                    continue;
                }
                if member.is_null() {
                    continue;
                }
                flatten_node(&mut member, Node::of_member(&key));
                map.insert(key, member);
            }
        }
        (Node::ModelMap, Value::Object(map)) => {
            map.values_mut().for_each(|member| flatten_node(member, Node::Model));
        }
        (_, Value::Array(items)) => {
            items.iter_mut().for_each(|item| flatten_node(item, Node::Model));
        }
        _ => {}
    }
}

fn hoist_extensions(target: &mut Map<String, Value>, extensions: Value) {
    let Value::Object(extensions) = extensions else {
        tracing::warn!("vendor extension container is not an object, dropping it");
        return;
    };
    for (key, value) in extensions {
        if !key.starts_with(VENDOR_EXTENSION_PREFIX) {
            tracing::warn!(key = %key, "vendor extension without x- prefix, dropping it");
            continue;
        }
        target.insert(key, value);
    }
}

/// Gathers `x-` prefixed sibling keys back under `$vendorExtensions`.
///
/// Inverse of [`flatten_vendor_extensions`]. Only members of model objects
/// are gathered: a schema property or definition whose name starts with
/// `x-` stays where it is, and extension values are not descended into.
pub fn nest_vendor_extensions(value: &mut Value) {
    nest_node(value, Node::Model);
}

fn nest_node(value: &mut Value, node: Node) {
    match (node, value) {
        (Node::Opaque, _) => {}
        (Node::Model, Value::Object(map)) => {
            let members = std::mem::take(map);
            let mut extensions = Map::new();
            for (key, mut member) in members {
                if key.starts_with(VENDOR_EXTENSION_PREFIX) {
                    extensions.insert(key, member);
                } else {
                    nest_node(&mut member, Node::of_member(&key));
                    map.insert(key, member);
                }
            }
            if !extensions.is_empty() {
                map.insert(VENDOR_EXTENSIONS_KEY.to_string(), Value::Object(extensions));
            }
        }
        (Node::ModelMap, Value::Object(map)) => {
            map.values_mut().for_each(|member| nest_node(member, Node::Model));
        }
        (_, Value::Array(items)) => {
            items.iter_mut().for_each(|item| nest_node(item, Node::Model));
        }
        _ => {}
    }
}
