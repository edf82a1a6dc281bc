//! Member identifiers and the type metadata seam.
//!
//! A [`MemberId`] is the join key between a schema (or one of its
//! properties) and an entry in the XML documentation source. It uses the
//! documentation-file convention of a one-letter kind prefix followed by the
//! fully qualified member name:
//!
//! | Member   | Identifier                        |
//! |----------|-----------------------------------|
//! | type     | `T:Shop.Catalog.Widget`           |
//! | property | `P:Shop.Catalog.Widget.Name`      |
//! | field    | `F:Shop.Catalog.Widget.MaxLength` |
//!
//! Identifiers are a pure function of the descriptor they are built from, so
//! the same member always yields the same key in every process.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Kind of member an identifier names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberKind {
    /// A type (`T:`).
    Type,
    /// A property (`P:`).
    Property,
    /// A field (`F:`).
    Field,
}

impl MemberKind {
    /// Returns the one-letter prefix for this kind.
    pub const fn prefix(self) -> char {
        match self {
            Self::Type => 'T',
            Self::Property => 'P',
            Self::Field => 'F',
        }
    }

    fn from_prefix(prefix: char) -> Option<Self> {
        match prefix {
            'T' => Some(Self::Type),
            'P' => Some(Self::Property),
            'F' => Some(Self::Field),
            _ => None,
        }
    }
}

/// Stable identifier of a documented member.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemberId(String);

impl MemberId {
    /// Identifier for a type.
    ///
    /// ```
    /// use lectern_docs::MemberId;
    ///
    /// let id = MemberId::for_type("shop::catalog::Widget");
    /// assert_eq!(id.as_str(), "T:shop.catalog.Widget");
    /// ```
    pub fn for_type(qualified_name: &str) -> Self {
        Self::build(MemberKind::Type, &normalize_qualified_name(qualified_name))
    }

    /// Identifier for a property declared on `declaring_type`.
    pub fn for_property(declaring_type: &str, property: &str) -> Self {
        Self::member(MemberKind::Property, declaring_type, property)
    }

    /// Identifier for a field declared on `declaring_type`.
    pub fn for_field(declaring_type: &str, field: &str) -> Self {
        Self::member(MemberKind::Field, declaring_type, field)
    }

    /// Parses an identifier as it appears in a documentation file.
    ///
    /// Returns `None` when the prefix is missing or unknown.
    pub fn parse(raw: &str) -> Option<Self> {
        let mut chars = raw.chars();
        let prefix = chars.next()?;
        MemberKind::from_prefix(prefix)?;
        if chars.next()? != ':' || raw.len() <= 2 {
            return None;
        }
        Some(Self(raw.to_string()))
    }

    /// The member kind.
    pub fn kind(&self) -> MemberKind {
        self.0
            .chars()
            .next()
            .and_then(MemberKind::from_prefix)
            .unwrap_or(MemberKind::Type)
    }

    /// The qualified name without the kind prefix.
    pub fn qualified_name(&self) -> &str {
        self.0.get(2..).unwrap_or_default()
    }

    /// The unqualified member name, e.g. `Widget` for `T:Shop.Widget`.
    ///
    /// Any parameter list or generic arity suffix is dropped.
    pub fn short_name(&self) -> &str {
        short_member_name(self.qualified_name())
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn member(kind: MemberKind, declaring_type: &str, name: &str) -> Self {
        let declaring = normalize_qualified_name(declaring_type);
        Self::build(kind, &format!("{declaring}.{}", name.trim()))
    }

    fn build(kind: MemberKind, qualified: &str) -> Self {
        Self(format!("{}:{qualified}", kind.prefix()))
    }
}

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for MemberId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Normalizes a qualified type name into dotted form.
///
/// Rust path separators (`::`) and nested-type markers (`+`) both become `.`.
pub fn normalize_qualified_name(name: &str) -> String {
    name.trim().replace("::", ".").replace('+', ".")
}

/// Returns the last dotted segment of a (possibly parameterized) member name.
pub(crate) fn short_member_name(qualified: &str) -> &str {
    let without_params = qualified.split('(').next().unwrap_or(qualified);
    let last = without_params.rsplit('.').next().unwrap_or(without_params);
    last.split('`').next().unwrap_or(last)
}

/// Resolves schemas back to the members they were generated from.
///
/// Implemented by whatever built the raw document. Both lookups are keyed by
/// the names used inside the document: the schema's key in
/// `definitions` and the property's key in `properties`. A property with no
/// backing member (a synthetic or computed entry) resolves to `None`; that
/// is never an error.
pub trait TypeMetadataResolver: Send + Sync {
    /// Identifier of the type a schema was generated from.
    fn type_member_id(&self, schema_name: &str) -> Option<MemberId>;

    /// Identifier of the member backing a schema property.
    fn property_member_id(&self, schema_name: &str, property_name: &str) -> Option<MemberId>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_identifier() {
        assert_eq!(MemberId::for_type("Widget").as_str(), "T:Widget");
        assert_eq!(
            MemberId::for_type("Shop.Catalog+Widget").as_str(),
            "T:Shop.Catalog.Widget"
        );
    }

    #[test]
    fn test_property_identifier() {
        let id = MemberId::for_property("shop::Widget", "Name");
        assert_eq!(id.as_str(), "P:shop.Widget.Name");
        assert_eq!(id.kind(), MemberKind::Property);
        assert_eq!(id.short_name(), "Name");
    }

    #[test]
    fn test_field_identifier() {
        let id = MemberId::for_field("Widget", "MaxLength");
        assert_eq!(id.to_string(), "F:Widget.MaxLength");
        assert_eq!(id.kind(), MemberKind::Field);
    }

    #[test]
    fn test_identifier_is_deterministic() {
        let a = MemberId::for_property(" Shop::Widget ", "Name");
        let b = MemberId::for_property("Shop.Widget", "Name");
        assert_eq!(a, b);
    }

    #[test]
    fn test_parse() {
        let id = MemberId::parse("T:Shop.Widget").unwrap();
        assert_eq!(id.kind(), MemberKind::Type);
        assert_eq!(id.qualified_name(), "Shop.Widget");

        assert!(MemberId::parse("Shop.Widget").is_none());
        assert!(MemberId::parse("X:Shop.Widget").is_none());
        assert!(MemberId::parse("T:").is_none());
    }

    #[test]
    fn test_short_name_drops_arity_and_parameters() {
        assert_eq!(short_member_name("Shop.Page`1"), "Page");
        assert_eq!(short_member_name("Shop.Widget.Resize(System.Int32)"), "Resize");
        assert_eq!(short_member_name("Widget"), "Widget");
    }
}
