//! Type descriptor table.
//!
//! The descriptor table is the startup-time description of every type the
//! service exposes: the schema name it is published under, its qualified
//! type name, and the properties it carries together with the members
//! backing them. It drives both the reference [`RegistryGenerator`] and
//! member identifier resolution during enrichment.
//!
//! Tables are written in TOML or JSON:
//!
//! ```toml
//! title = "Shop API"
//!
//! [[types]]
//! schema = "Widget"
//! type_name = "Shop.Catalog.Widget"
//!
//! [[types.properties]]
//! name = "name"
//! member = "Name"
//! type = "string"
//! required = true
//!
//! [[versions]]
//! version = "V1"
//! schemas = ["Widget"]
//! ```
//!
//! [`RegistryGenerator`]: crate::generator::RegistryGenerator

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::document::{Schema, SchemaType};
use crate::error::{DocsError, DocsResult};
use crate::member::{MemberId, TypeMetadataResolver};

/// Root of a descriptor table file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DescriptorTable {
    /// Document title used when a version does not override it.
    #[serde(default = "default_title")]
    pub title: String,
    /// Document description used when a version does not override it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Described types.
    #[serde(default)]
    pub types: Vec<TypeDescriptor>,
    /// Published API versions.
    #[serde(default)]
    pub versions: Vec<VersionDescriptor>,
}

fn default_title() -> String {
    "API".to_string()
}

/// One described type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TypeDescriptor {
    /// Key of the schema in the document's `definitions`.
    pub schema: String,
    /// Fully qualified type name, e.g. `Shop.Catalog.Widget`.
    pub type_name: String,
    /// Properties in publication order.
    #[serde(default)]
    pub properties: Vec<PropertyDescriptor>,
}

/// One property of a described type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PropertyDescriptor {
    /// Name the property is published under.
    pub name: String,
    /// Backing member name. Defaults to `name`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member: Option<String>,
    /// `true` when no member backs the property.
    #[serde(default)]
    pub synthetic: bool,
    /// Primitive type.
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub property_type: Option<SchemaType>,
    /// Format, e.g. `int32` or `date-time`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    /// Schema name this property refers to.
    #[serde(default, rename = "ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    /// Item type for arrays of primitives.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<SchemaType>,
    /// Item schema name for arrays of described types.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items_ref: Option<String>,
    /// Whether the property is required.
    #[serde(default)]
    pub required: bool,
    /// Whether the property is read only.
    #[serde(default)]
    pub read_only: bool,
}

impl PropertyDescriptor {
    /// Name of the backing member, or `None` for synthetic properties.
    pub fn backing_member(&self) -> Option<&str> {
        if self.synthetic {
            None
        } else {
            Some(self.member.as_deref().unwrap_or(&self.name))
        }
    }

    fn to_schema(&self) -> Schema {
        let mut schema = if let Some(reference) = &self.reference {
            Schema::definition_ref(reference)
        } else if self.items.is_some() || self.items_ref.is_some() {
            let items = match (&self.items_ref, self.items) {
                (Some(reference), _) => Schema::definition_ref(reference),
                (None, Some(item_type)) => Schema::of_type(item_type),
                (None, None) => Schema::default(),
            };
            Schema::array(items)
        } else {
            Schema {
                schema_type: self.property_type,
                ..Schema::default()
            }
        };
        schema.format.clone_from(&self.format);
        schema.read_only = self.read_only;
        schema
    }
}

/// One published API version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VersionDescriptor {
    /// Version key as it appears in the request path.
    pub version: String,
    /// Title override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Description override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Schemas published in this version. Empty means all of them.
    #[serde(default)]
    pub schemas: Vec<String>,
    /// Operations published in this version.
    #[serde(default)]
    pub operations: Vec<OperationDescriptor>,
}

/// One published operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OperationDescriptor {
    /// Path template, e.g. `/widgets/{id}`.
    pub path: String,
    /// HTTP method.
    pub method: String,
    /// Operation identifier.
    pub operation_id: String,
    /// Short summary.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Tags for grouping.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Schema name of the success response body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    /// Whether the operation is deprecated.
    #[serde(default)]
    pub deprecated: bool,
}

/// Validated, indexed descriptor table.
#[derive(Debug, Clone)]
pub struct TypeRegistry {
    table: DescriptorTable,
    by_schema: HashMap<String, usize>,
}

impl TypeRegistry {
    /// Validates and indexes a table.
    ///
    /// Rejects duplicate schemas, duplicate property names within a type,
    /// duplicate versions (compared case-insensitively) and references to
    /// schemas the table does not describe.
    pub fn from_table(table: DescriptorTable) -> DocsResult<Self> {
        let mut by_schema = HashMap::with_capacity(table.types.len());
        for (position, descriptor) in table.types.iter().enumerate() {
            if by_schema.insert(descriptor.schema.clone(), position).is_some() {
                return Err(DocsError::invalid_descriptor(
                    &descriptor.schema,
                    "schema is described more than once",
                ));
            }
        }

        let registry = Self { table, by_schema };
        registry.validate()?;
        Ok(registry)
    }

    /// Parses a TOML table.
    pub fn from_toml_str(content: &str) -> DocsResult<Self> {
        let table: DescriptorTable =
            toml::from_str(content).map_err(|e| DocsError::descriptor_parse(e.to_string()))?;
        Self::from_table(table)
    }

    /// Parses a JSON table.
    pub fn from_json_str(content: &str) -> DocsResult<Self> {
        let table: DescriptorTable = serde_json::from_str(content)
            .map_err(|e| DocsError::descriptor_parse(e.to_string()))?;
        Self::from_table(table)
    }

    /// Loads a table, choosing the format from the file extension.
    pub fn from_file(path: impl AsRef<Path>) -> DocsResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase);

        let registry = match extension.as_deref() {
            Some("toml") => Self::from_toml_str(&content)?,
            Some("json") => Self::from_json_str(&content)?,
            _ => {
                return Err(DocsError::descriptor_parse(format!(
                    "unsupported descriptor file format: {}",
                    path.display()
                )))
            }
        };

        tracing::info!(
            path = %path.display(),
            types = registry.table.types.len(),
            versions = registry.table.versions.len(),
            "loaded type descriptor table"
        );
        Ok(registry)
    }

    fn validate(&self) -> DocsResult<()> {
        for descriptor in &self.table.types {
            let mut seen = std::collections::HashSet::new();
            for property in &descriptor.properties {
                if !seen.insert(property.name.as_str()) {
                    return Err(DocsError::invalid_descriptor(
                        &descriptor.schema,
                        format!("duplicate property '{}'", property.name),
                    ));
                }
                for target in [&property.reference, &property.items_ref].into_iter().flatten() {
                    self.require_schema(&descriptor.schema, target)?;
                }
            }
        }

        let mut versions = std::collections::HashSet::new();
        for version in &self.table.versions {
            if !versions.insert(version.version.to_uppercase()) {
                return Err(DocsError::invalid_descriptor(
                    &version.version,
                    "version is declared more than once",
                ));
            }
            for schema in &version.schemas {
                self.require_schema(&version.version, schema)?;
            }
            for operation in &version.operations {
                if let Some(response) = &operation.response {
                    self.require_schema(&operation.operation_id, response)?;
                }
            }
        }
        Ok(())
    }

    fn require_schema(&self, owner: &str, schema: &str) -> DocsResult<()> {
        if self.by_schema.contains_key(schema) {
            Ok(())
        } else {
            Err(DocsError::invalid_descriptor(
                owner,
                format!("references undescribed schema '{schema}'"),
            ))
        }
    }

    /// The underlying table.
    pub fn table(&self) -> &DescriptorTable {
        &self.table
    }

    /// Looks up a type descriptor by schema name.
    pub fn type_descriptor(&self, schema: &str) -> Option<&TypeDescriptor> {
        self.by_schema.get(schema).map(|&i| &self.table.types[i])
    }

    /// Builds the schema for a described type.
    pub fn schema(&self, name: &str) -> Option<Schema> {
        let descriptor = self.type_descriptor(name)?;
        let mut schema = Schema::object();
        for property in &descriptor.properties {
            schema
                .properties
                .insert(property.name.clone(), property.to_schema());
            if property.required {
                schema.required.push(property.name.clone());
            }
        }
        Some(schema)
    }

    /// Finds a version, ignoring ASCII case.
    pub fn version(&self, version: &str) -> Option<&VersionDescriptor> {
        self.table
            .versions
            .iter()
            .find(|v| v.version.eq_ignore_ascii_case(version))
    }

    /// All declared version keys, in declaration order.
    pub fn versions(&self) -> Vec<String> {
        self.table.versions.iter().map(|v| v.version.clone()).collect()
    }
}

impl TypeMetadataResolver for TypeRegistry {
    fn type_member_id(&self, schema_name: &str) -> Option<MemberId> {
        self.type_descriptor(schema_name)
            .map(|descriptor| MemberId::for_type(&descriptor.type_name))
    }

    fn property_member_id(&self, schema_name: &str, property_name: &str) -> Option<MemberId> {
        let descriptor = self.type_descriptor(schema_name)?;
        let member = descriptor
            .properties
            .iter()
            .find(|p| p.name == property_name)?
            .backing_member()?;
        Some(MemberId::for_property(&descriptor.type_name, member))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &str = r#"
title = "Shop API"

[[types]]
schema = "Widget"
type_name = "Shop.Catalog.Widget"

[[types.properties]]
name = "name"
member = "Name"
type = "string"
required = true

[[types.properties]]
name = "tags"
items = "string"

[[types.properties]]
name = "parent"
ref = "Widget"

[[types.properties]]
name = "_links"
synthetic = true
type = "object"

[[versions]]
version = "V1"
schemas = ["Widget"]
"#;

    #[test]
    fn test_parse_toml_table() {
        let registry = TypeRegistry::from_toml_str(TABLE).unwrap();
        assert_eq!(registry.table().title, "Shop API");
        assert_eq!(registry.versions(), vec!["V1".to_string()]);
        assert!(registry.version("v1").is_some());
        assert!(registry.version("V2").is_none());
    }

    #[test]
    fn test_schema_from_descriptor() {
        let registry = TypeRegistry::from_toml_str(TABLE).unwrap();
        let schema = registry.schema("Widget").unwrap();

        assert_eq!(schema.schema_type, Some(SchemaType::Object));
        assert_eq!(schema.required, vec!["name".to_string()]);
        assert_eq!(
            schema.properties["tags"].items.as_deref().unwrap().schema_type,
            Some(SchemaType::String)
        );
        assert_eq!(
            schema.properties["parent"].reference.as_deref(),
            Some("#/definitions/Widget")
        );
        assert!(registry.schema("Gadget").is_none());
    }

    #[test]
    fn test_member_resolution() {
        let registry = TypeRegistry::from_toml_str(TABLE).unwrap();

        assert_eq!(
            registry.type_member_id("Widget").unwrap().as_str(),
            "T:Shop.Catalog.Widget"
        );
        assert_eq!(
            registry.property_member_id("Widget", "name").unwrap().as_str(),
            "P:Shop.Catalog.Widget.Name"
        );
        // Member defaults to the published name.
        assert_eq!(
            registry.property_member_id("Widget", "tags").unwrap().as_str(),
            "P:Shop.Catalog.Widget.tags"
        );
        assert!(registry.property_member_id("Widget", "_links").is_none());
        assert!(registry.property_member_id("Widget", "missing").is_none());
        assert!(registry.type_member_id("Gadget").is_none());
    }

    #[test]
    fn test_json_table() {
        let registry = TypeRegistry::from_json_str(
            r#"{"types": [{"schema": "A", "type_name": "Ns.A"}], "versions": [{"version": "V1"}]}"#,
        )
        .unwrap();
        assert_eq!(registry.table().title, "API");
        assert!(registry.schema("A").unwrap().properties.is_empty());
    }

    #[test]
    fn test_rejects_duplicate_schema() {
        let err = TypeRegistry::from_json_str(
            r#"{"types": [{"schema": "A", "type_name": "A"}, {"schema": "A", "type_name": "B"}]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, DocsError::InvalidDescriptor { .. }));
    }

    #[test]
    fn test_rejects_dangling_reference() {
        let err = TypeRegistry::from_json_str(
            r#"{"types": [{"schema": "A", "type_name": "A",
                "properties": [{"name": "b", "ref": "B"}]}]}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("'B'"));
    }

    #[test]
    fn test_rejects_duplicate_version() {
        let err =
            TypeRegistry::from_json_str(r#"{"versions": [{"version": "v1"}, {"version": "V1"}]}"#)
                .unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn test_rejects_unknown_fields() {
        let err = TypeRegistry::from_toml_str("titel = \"typo\"").unwrap_err();
        assert!(matches!(err, DocsError::DescriptorParse { .. }));
    }

    #[test]
    fn test_from_file_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let toml_path = dir.path().join("types.toml");
        std::fs::write(&toml_path, TABLE).unwrap();
        assert!(TypeRegistry::from_file(&toml_path).is_ok());

        let yaml_path = dir.path().join("types.yaml");
        std::fs::write(&yaml_path, "title: x").unwrap();
        assert!(matches!(
            TypeRegistry::from_file(&yaml_path),
            Err(DocsError::DescriptorParse { .. })
        ));
    }
}
