//! XML documentation index.
//!
//! Parses documentation files in the `<doc><members><member name="...">`
//! layout and answers point lookups by [`MemberId`]. Each member may carry a
//! `<summary>` and an `<example>` block; both are reduced to plain text.
//!
//! The file is parsed once into an owned tree and indexed by the `name`
//! attribute of every `/doc/members/member` node. After construction the
//! index is immutable, so it can be shared behind an `Arc` and queried from
//! any number of threads without locking.
//!
//! ```
//! use lectern_docs::{DocumentationIndex, MemberId};
//!
//! let index = DocumentationIndex::from_xml(
//!     r#"<doc><members>
//!          <member name="T:Widget"><summary>A widget</summary></member>
//!        </members></doc>"#,
//! )?;
//!
//! let entry = index.lookup(&MemberId::for_type("Widget")).unwrap();
//! assert_eq!(entry.summary.as_deref(), Some("A widget"));
//! assert!(entry.example.is_none());
//! # Ok::<(), lectern_docs::DocsError>(())
//! ```

use std::collections::HashMap;
use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{DocsError, DocsResult};
use crate::member::{short_member_name, MemberId};

const SUMMARY_TAG: &str = "summary";
const EXAMPLE_TAG: &str = "example";

/// Documentation found for one member.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentationEntry {
    /// Plain-text summary, if the member has a `<summary>`. An empty
    /// element yields an empty string.
    pub summary: Option<String>,
    /// Plain-text example, if the member has an `<example>`.
    pub example: Option<String>,
}

/// Point-lookup index over one or more XML documentation files.
#[derive(Debug, Clone, Default)]
pub struct DocumentationIndex {
    entries: HashMap<String, DocumentationEntry>,
}

impl DocumentationIndex {
    /// An index with no entries. Every lookup misses.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parses an XML documentation source held in memory.
    pub fn from_xml(xml: &str) -> DocsResult<Self> {
        let root = parse_tree(xml)?;
        let mut entries = HashMap::new();

        if root.name != "doc" {
            tracing::warn!(
                root = %root.name,
                "documentation source has no <doc> root, ignoring it"
            );
            return Ok(Self { entries });
        }

        let members = root
            .child_elements("members")
            .flat_map(|members| members.child_elements("member"));

        for member in members {
            let Some(name) = member.attribute("name") else {
                continue;
            };
            if entries.contains_key(name) {
                tracing::debug!(member = name, "duplicate documentation member, keeping the first");
                continue;
            }
            let entry = DocumentationEntry {
                summary: member.first_child(SUMMARY_TAG).map(extract_content),
                example: member.first_child(EXAMPLE_TAG).map(extract_content),
            };
            entries.insert(name.to_string(), entry);
        }

        Ok(Self { entries })
    }

    /// Reads and parses a documentation file.
    pub fn from_file(path: impl AsRef<Path>) -> DocsResult<Self> {
        let path = path.as_ref();
        let xml = std::fs::read_to_string(path)?;
        let index = Self::from_xml(&xml)?;
        tracing::info!(
            path = %path.display(),
            members = index.len(),
            "loaded documentation source"
        );
        Ok(index)
    }

    /// Reads several documentation files into one index.
    ///
    /// Files are merged in order; the first file documenting a member wins.
    pub fn from_files<I, P>(paths: I) -> DocsResult<Self>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        paths
            .into_iter()
            .try_fold(Self::empty(), |index, path| Ok(index.merge(Self::from_file(path)?)))
    }

    /// Merges `other` into this index. Existing entries take precedence.
    #[must_use]
    pub fn merge(mut self, other: Self) -> Self {
        for (name, entry) in other.entries {
            self.entries.entry(name).or_insert(entry);
        }
        self
    }

    /// Looks up the documentation for a member.
    pub fn lookup(&self, member: &MemberId) -> Option<&DocumentationEntry> {
        self.entries.get(member.as_str())
    }

    /// Number of documented members.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no member is documented.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Reduces the inner markup of a documentation node to plain text.
///
/// Cross references render as the short member name, `langword` references
/// as the keyword, and parameter references as the parameter name. Any other
/// tag is dropped in favor of its text. Whitespace is collapsed to single
/// spaces.
fn extract_content(element: &XmlElement) -> String {
    let mut raw = String::new();
    for child in &element.children {
        render_inline(child, &mut raw);
    }
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn render_inline(node: &XmlNode, out: &mut String) {
    let element = match node {
        XmlNode::Text(text) => {
            out.push_str(text);
            return;
        }
        XmlNode::Element(element) => element,
    };

    match element.name.as_str() {
        "see" | "seealso" if element.children.is_empty() => {
            if let Some(cref) = element.attribute("cref") {
                let name = cref.split_once(':').map_or(cref, |(_, rest)| rest);
                out.push_str(short_member_name(name));
            } else if let Some(word) = element.attribute("langword") {
                out.push_str(word);
            } else if let Some(href) = element.attribute("href") {
                out.push_str(href);
            }
        }
        "paramref" | "typeparamref" => {
            if let Some(name) = element.attribute("name") {
                out.push_str(name);
            }
        }
        "para" | "br" => {
            out.push(' ');
            render_children(element, out);
            out.push(' ');
        }
        _ => render_children(element, out),
    }
}

fn render_children(element: &XmlElement, out: &mut String) {
    for child in &element.children {
        render_inline(child, out);
    }
}

#[derive(Debug)]
enum XmlNode {
    Element(XmlElement),
    Text(String),
}

#[derive(Debug)]
struct XmlElement {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<XmlNode>,
}

impl XmlElement {
    fn from_start(start: &BytesStart<'_>) -> DocsResult<Self> {
        let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
        let mut attributes = Vec::new();
        for attribute in start.attributes() {
            let attribute =
                attribute.map_err(|e| DocsError::documentation_parse(e.to_string()))?;
            let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
            let value = attribute
                .unescape_value()
                .map_err(|e| DocsError::documentation_parse(e.to_string()))?
                .into_owned();
            attributes.push((key, value));
        }
        Ok(Self {
            name,
            attributes,
            children: Vec::new(),
        })
    }

    fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    fn child_elements<'a, 'b>(
        &'a self,
        name: &'b str,
    ) -> impl Iterator<Item = &'a XmlElement> + 'b
    where
        'a: 'b,
    {
        self.children.iter().filter_map(move |child| match child {
            XmlNode::Element(element) if element.name == name => Some(element),
            _ => None,
        })
    }

    fn first_child(&self, name: &str) -> Option<&XmlElement> {
        self.child_elements(name).next()
    }
}

fn parse_tree(xml: &str) -> DocsResult<XmlElement> {
    let mut reader = Reader::from_str(xml);
    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;

    loop {
        let event = match reader.read_event() {
            Ok(event) => event,
            Err(e) => {
                return Err(DocsError::documentation_parse(format!(
                    "{e} (at byte {})",
                    reader.buffer_position()
                )));
            }
        };

        match event {
            Event::Start(start) => stack.push(XmlElement::from_start(&start)?),
            Event::Empty(start) => {
                let element = XmlElement::from_start(&start)?;
                attach(&mut stack, &mut root, element);
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| DocsError::documentation_parse("unbalanced closing tag"))?;
                attach(&mut stack, &mut root, element);
            }
            Event::Text(text) => {
                if let Some(parent) = stack.last_mut() {
                    let text = text
                        .unescape()
                        .map_err(|e| DocsError::documentation_parse(e.to_string()))?;
                    parent.children.push(XmlNode::Text(text.into_owned()));
                }
            }
            Event::CData(data) => {
                if let Some(parent) = stack.last_mut() {
                    let text = String::from_utf8_lossy(&data.into_inner()).into_owned();
                    parent.children.push(XmlNode::Text(text));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(DocsError::documentation_parse(format!(
            "unclosed element <{}>",
            open.name
        )));
    }
    root.ok_or_else(|| DocsError::documentation_parse("no root element"))
}

fn attach(stack: &mut [XmlElement], root: &mut Option<XmlElement>, element: XmlElement) {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(XmlNode::Element(element));
    } else if root.is_none() {
        *root = Some(element);
    }
}
