//! Owned XML tree for one catalog document, plus its codec.
//!
//! # Responsibility
//! - Parse a catalog document into a lossless tree of plain owned nodes.
//! - Expose the catalog view (groups, items, fields) over that tree.
//! - Serialize the whole tree back out.
//!
//! # Invariants
//! - Every node survives a parse/serialize cycle: attributes, comments,
//!   processing instructions, CDATA, whitespace and elements the catalog
//!   does not interpret.
//! - Text is kept in its escaped source form, so untouched text is written
//!   back byte-for-byte.
//! - Nodes inserted by the store follow the indentation of their siblings.

use crate::model::category::{Category, DefaultItem};
use crate::model::item::CatalogItem;
use quick_xml::escape::{escape, unescape};
use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const ROOT_TAG: &str = "catalog";
pub const ITEM_TAG: &str = "item";
pub const KEY_ATTR: &str = "key";
pub const FIELD_NAME: &str = "name";
pub const FIELD_UNIT: &str = "unit";
pub const FIELD_LATEST_PRICE: &str = "latest_price";
pub const FIELD_CONSUMPTION: &str = "consumption";

const INDENT: &str = "  ";

// Nesting level of each catalog node below the document.
const GROUP_DEPTH: usize = 1;
const ITEM_DEPTH: usize = 2;
const FIELD_DEPTH: usize = 3;

/// Codec error for catalog documents.
#[derive(Debug)]
pub enum DocumentError {
    Xml(quick_xml::Error),
    MissingRoot,
    Truncated,
    UnexpectedEnd,
    InvalidPrice { key: String, value: String },
}

impl Display for DocumentError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Xml(err) => write!(f, "malformed catalog xml: {err}"),
            Self::MissingRoot => write!(f, "catalog xml has no root element"),
            Self::Truncated => write!(f, "catalog xml ends before all elements are closed"),
            Self::UnexpectedEnd => write!(f, "catalog xml closes an element that was never opened"),
            Self::InvalidPrice { key, value } => {
                write!(f, "item `{key}` has non-numeric latest_price `{value}`")
            }
        }
    }
}

impl Error for DocumentError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Xml(err) => Some(err),
            _ => None,
        }
    }
}

impl From<quick_xml::Error> for DocumentError {
    fn from(value: quick_xml::Error) -> Self {
        Self::Xml(value)
    }
}

impl From<quick_xml::events::attributes::AttrError> for DocumentError {
    fn from(value: quick_xml::events::attributes::AttrError) -> Self {
        Self::Xml(value.into())
    }
}

impl From<quick_xml::escape::EscapeError> for DocumentError {
    fn from(value: quick_xml::escape::EscapeError) -> Self {
        Self::Xml(value.into())
    }
}

/// One node of the document tree. Text-like variants hold raw source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    /// Escaped character data.
    Text(String),
    CData(String),
    Comment(String),
    ProcessingInstruction(String),
    DocType(String),
}

impl Node {
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Self::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            Self::Element(element) => Some(element),
            _ => None,
        }
    }

    fn is_whitespace(&self) -> bool {
        matches!(self, Self::Text(text) if text.trim().is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    /// Unescaped attribute values in source order.
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
    /// Written as `<name/>` while it has no children.
    pub self_closing: bool,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
            self_closing: true,
        }
    }

    /// Element holding only `text` (unescaped input).
    pub fn with_text(name: impl Into<String>, text: &str) -> Self {
        let mut element = Self::new(name);
        element.set_text(text);
        element
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn set_attribute(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attributes.iter_mut().find(|(key, _)| key == name) {
            Some((_, current)) => *current = value,
            None => self.attributes.push((name.to_string(), value)),
        }
    }

    /// Child elements in document order.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(Node::as_element)
    }

    /// First child element named `name`.
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.elements().find(|element| element.name == name)
    }

    pub fn child_mut(&mut self, name: &str) -> Option<&mut Element> {
        self.children
            .iter_mut()
            .filter_map(Node::as_element_mut)
            .find(|element| element.name == name)
    }

    /// Unescaped direct character data (text and CDATA children).
    pub fn text(&self) -> Result<String, DocumentError> {
        let mut text = String::new();
        for child in &self.children {
            match child {
                Node::Text(raw) => text.push_str(&unescape(raw)?),
                Node::CData(raw) => text.push_str(raw),
                _ => {}
            }
        }
        Ok(text)
    }

    /// Replaces direct character data with `text`, keeping other children.
    pub fn set_text(&mut self, text: &str) {
        self.children
            .retain(|child| !matches!(child, Node::Text(_) | Node::CData(_)));
        self.children.insert(0, Node::Text(escape(text).into_owned()));
    }

    /// Appends `node` as a child sitting at nesting level `depth`.
    ///
    /// An element laid out one child per line gets the new node on its own
    /// line; a compact element stays compact.
    pub fn append_child(&mut self, depth: usize, node: Node) {
        let line_break = |level: usize| Node::Text(format!("\n{}", INDENT.repeat(level)));

        if self.children.is_empty() {
            self.children.push(line_break(depth));
            self.children.push(node);
            self.children.push(line_break(depth.saturating_sub(1)));
        } else if self.children.last().is_some_and(Node::is_whitespace) {
            let at = self.children.len() - 1;
            self.children.insert(at, node);
            self.children.insert(at, line_break(depth));
        } else {
            self.children.push(node);
        }
    }

    /// `key` attribute when this element is a catalog item.
    pub fn item_key(&self) -> Option<&str> {
        if self.name == ITEM_TAG {
            self.attribute(KEY_ATTR)
        } else {
            None
        }
    }

    fn field_text(&self, field: &str) -> Result<Option<String>, DocumentError> {
        self.child(field).map(Element::text).transpose()
    }

    /// Sets one item field, appending the field element when absent.
    pub fn set_field(&mut self, field: &str, text: &str) {
        match self.child_mut(field) {
            Some(element) => element.set_text(text),
            None => self.append_child(FIELD_DEPTH, Node::Element(Element::with_text(field, text))),
        }
    }

    /// Builds the typed snapshot of an item element.
    ///
    /// `name` and `unit` are trimmed, a missing or blank `latest_price`
    /// reads as `0.0`, and an empty `consumption` is treated as absent.
    pub fn to_catalog_item(&self) -> Result<CatalogItem, DocumentError> {
        let key = self.attribute(KEY_ATTR).map(str::to_string);
        let price_text = self.field_text(FIELD_LATEST_PRICE)?.unwrap_or_default();
        let price_text = price_text.trim();
        let latest_price = if price_text.is_empty() {
            0.0
        } else {
            price_text
                .parse::<f64>()
                .map_err(|_| DocumentError::InvalidPrice {
                    key: key.clone().unwrap_or_default(),
                    value: price_text.to_string(),
                })?
        };

        let trimmed = |field: &str| -> Result<String, DocumentError> {
            Ok(self
                .field_text(field)?
                .map(|value| value.trim().to_string())
                .unwrap_or_default())
        };

        Ok(CatalogItem {
            key,
            name: trimmed(FIELD_NAME)?,
            unit: trimmed(FIELD_UNIT)?,
            latest_price,
            consumption: self
                .field_text(FIELD_CONSUMPTION)?
                .filter(|value| !value.is_empty()),
        })
    }

    /// Item element for a healing default, fields laid out one per line.
    pub fn from_default(default: &DefaultItem) -> Self {
        let mut item = Self::new(ITEM_TAG);
        item.set_attribute(KEY_ATTR, default.key);
        for (field, text) in [
            (FIELD_NAME, default.name),
            (FIELD_UNIT, default.unit),
            (FIELD_LATEST_PRICE, default.price),
        ] {
            item.append_child(FIELD_DEPTH, Node::Element(Element::with_text(field, text)));
        }
        item
    }
}

/// Whole catalog document as an owned tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogDocument {
    /// Top-level nodes before the root element (the XML declaration excluded).
    pub prolog: Vec<Node>,
    pub root: Element,
    /// Top-level nodes after the root element.
    pub epilog: Vec<Node>,
}

impl CatalogDocument {
    /// Minimal document: every required group present and empty.
    pub fn empty(category: Category) -> Self {
        let mut root = Element::new(ROOT_TAG);
        for &tag in category.groups() {
            root.append_child(GROUP_DEPTH, Node::Element(Element::new(tag)));
        }
        Self {
            prolog: vec![Node::Text("\n".to_string())],
            root,
            epilog: vec![Node::Text("\n".to_string())],
        }
    }

    /// First group element named `tag`.
    pub fn group(&self, tag: &str) -> Option<&Element> {
        self.root.child(tag)
    }

    pub fn group_mut(&mut self, tag: &str) -> Option<&mut Element> {
        self.root.child_mut(tag)
    }

    /// Appends an empty group element to the root.
    pub fn add_group(&mut self, tag: &str) {
        self.root
            .append_child(GROUP_DEPTH, Node::Element(Element::new(tag)));
    }

    /// Appends `item` to the first group named `tag`. Returns false when
    /// there is no such group.
    pub fn push_item(&mut self, tag: &str, item: Element) -> bool {
        match self.group_mut(tag) {
            Some(group) => {
                group.append_child(ITEM_DEPTH, Node::Element(item));
                true
            }
            None => false,
        }
    }

    /// Whether any item in any group carries `key`.
    pub fn contains_key(&self, key: &str) -> bool {
        self.root
            .elements()
            .flat_map(Element::elements)
            .any(|item| item.item_key() == Some(key))
    }

    /// First item with `key`, scanning only `groups` in the given order.
    pub fn find_item_mut(&mut self, groups: &[&str], key: &str) -> Option<&mut Element> {
        let (group_index, item_index) = groups.iter().find_map(|tag| {
            let group_index = self
                .root
                .children
                .iter()
                .position(|node| node.as_element().is_some_and(|e| e.name == *tag))?;
            let item_index = self.root.children[group_index]
                .as_element()?
                .children
                .iter()
                .position(|node| {
                    node.as_element()
                        .is_some_and(|item| item.item_key() == Some(key))
                })?;
            Some((group_index, item_index))
        })?;

        self.root.children[group_index]
            .as_element_mut()?
            .children[item_index]
            .as_element_mut()
    }

    /// Parses a document from XML text.
    pub fn parse(xml: &str) -> Result<Self, DocumentError> {
        let mut reader = Reader::from_str(xml);

        let mut prolog: Vec<Node> = Vec::new();
        let mut epilog: Vec<Node> = Vec::new();
        let mut root: Option<Element> = None;
        let mut open: Vec<Element> = Vec::new();

        loop {
            let node = match reader.read_event()? {
                Event::Start(start) => {
                    open.push(element_from(&start, false)?);
                    continue;
                }
                Event::Empty(start) => Node::Element(element_from(&start, true)?),
                Event::End(_) => Node::Element(open.pop().ok_or(DocumentError::UnexpectedEnd)?),
                Event::Text(text) => Node::Text(raw_text(&text)),
                Event::CData(data) => Node::CData(String::from_utf8_lossy(&data).into_owned()),
                Event::Comment(text) => Node::Comment(raw_text(&text)),
                Event::PI(text) => Node::ProcessingInstruction(raw_text(&text)),
                Event::DocType(text) => Node::DocType(raw_text(&text)),
                Event::Decl(_) => continue,
                Event::Eof => break,
            };

            match (open.last_mut(), node) {
                (Some(parent), node) => parent.children.push(node),
                (None, Node::Element(element)) if root.is_none() => root = Some(element),
                (None, node) if root.is_none() => prolog.push(node),
                (None, node) => epilog.push(node),
            }
        }

        if !open.is_empty() {
            return Err(DocumentError::Truncated);
        }
        let root = root.ok_or(DocumentError::MissingRoot)?;
        Ok(Self {
            prolog,
            root,
            epilog,
        })
    }

    /// Serializes the document behind a UTF-8 XML declaration.
    pub fn to_xml(&self) -> Result<String, DocumentError> {
        let mut writer = Writer::new(Vec::new());
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

        if !self.prolog.first().is_some_and(Node::is_whitespace) {
            writer.write_event(Event::Text(BytesText::from_escaped("\n")))?;
        }
        for node in &self.prolog {
            write_node(&mut writer, node)?;
        }
        write_element(&mut writer, &self.root)?;
        if self.epilog.is_empty() {
            writer.write_event(Event::Text(BytesText::from_escaped("\n")))?;
        }
        for node in &self.epilog {
            write_node(&mut writer, node)?;
        }

        Ok(String::from_utf8_lossy(&writer.into_inner()).into_owned())
    }
}

fn raw_text(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

fn element_from(start: &BytesStart<'_>, self_closing: bool) -> Result<Element, DocumentError> {
    let mut element = Element::new(raw_text(start.name().as_ref()));
    element.self_closing = self_closing;
    for attribute in start.attributes() {
        let attribute = attribute?;
        element.attributes.push((
            raw_text(attribute.key.as_ref()),
            attribute.unescape_value()?.into_owned(),
        ));
    }
    Ok(element)
}

fn write_node(writer: &mut Writer<Vec<u8>>, node: &Node) -> Result<(), DocumentError> {
    match node {
        Node::Element(element) => return write_element(writer, element),
        Node::Text(raw) => writer.write_event(Event::Text(BytesText::from_escaped(raw.as_str())))?,
        Node::CData(raw) => writer.write_event(Event::CData(BytesCData::new(raw.as_str())))?,
        Node::Comment(raw) => {
            writer.write_event(Event::Comment(BytesText::from_escaped(raw.as_str())))?
        }
        Node::ProcessingInstruction(raw) => {
            writer.write_event(Event::PI(BytesText::from_escaped(raw.as_str())))?
        }
        Node::DocType(raw) => {
            writer.write_event(Event::DocType(BytesText::from_escaped(raw.as_str())))?
        }
    }
    Ok(())
}

fn write_element(writer: &mut Writer<Vec<u8>>, element: &Element) -> Result<(), DocumentError> {
    let mut start = BytesStart::new(element.name.as_str());
    for (key, value) in &element.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }

    if element.children.is_empty() && element.self_closing {
        writer.write_event(Event::Empty(start))?;
        return Ok(());
    }

    writer.write_event(Event::Start(start))?;
    for child in &element.children {
        write_node(writer, child)?;
    }
    writer.write_event(Event::End(BytesEnd::new(element.name.as_str())))?;
    Ok(())
}
