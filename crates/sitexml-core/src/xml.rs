//! Minimal owned XML tree.
//!
//! Parsing and serialization go through `quick-xml`; everything above this module
//! only sees [`Document`] and [`Element`]. Queries are slash-separated element paths
//! with an optional attribute-equality predicate on the last step, evaluated in
//! document order.

use std::io;

use quick_xml::encoding::{Decoder, EncodingError};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};
use thiserror::Error;

#[derive(Debug, Error)]
#[error("{0}")]
pub struct XmlError(String);

impl From<quick_xml::Error> for XmlError {
    fn from(e: quick_xml::Error) -> Self {
        Self(e.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for XmlError {
    fn from(e: quick_xml::events::attributes::AttrError) -> Self {
        Self(e.to_string())
    }
}

impl From<EncodingError> for XmlError {
    fn from(e: EncodingError) -> Self {
        Self(e.to_string())
    }
}

/// Attribute equality predicate, e.g. `[@name='org.eclipse.equinox.p2.name']`
#[derive(Debug, Clone, Copy)]
pub struct AttrEq<'p> {
    pub name: &'p str,
    pub value: &'p str,
}

impl<'p> AttrEq<'p> {
    pub fn new(name: &'p str, value: &'p str) -> Self {
        Self { name, value }
    }

    fn matches(&self, element: &Element) -> bool {
        element.attribute(self.name) == Some(self.value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<Element>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_attribute(mut self, name: &str, value: &str) -> Self {
        self.set_attribute(name, value);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Set an attribute, replacing an existing value in place
    pub fn set_attribute(&mut self, name: &str, value: &str) {
        match self.attributes.iter_mut().find(|(k, _)| k == name) {
            Some((_, v)) => *v = value.to_string(),
            None => self
                .attributes
                .push((name.to_string(), value.to_string())),
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn children(&self) -> &[Element] {
        &self.children
    }

    /// Append a child and return a handle to it
    pub fn push_child(&mut self, child: Element) -> &mut Element {
        self.children.push(child);
        let last = self.children.len() - 1;
        &mut self.children[last]
    }

    /// Select descendants along `path` (relative to this element)
    pub fn select(&self, path: &str, filter: Option<AttrEq<'_>>) -> Vec<&Element> {
        let steps = split_path(path);
        let mut out = Vec::new();
        collect(self, &steps, filter, &mut Vec::new(), &mut out);
        out.into_iter().map(|s| s.element).collect()
    }

    /// First descendant along `path` in document order
    pub fn find(&self, path: &str, filter: Option<AttrEq<'_>>) -> Option<&Element> {
        self.select(path, filter).into_iter().next()
    }
}

/// A query match together with the chain of elements above it (root first)
#[derive(Debug, Clone)]
pub struct Selected<'a> {
    pub element: &'a Element,
    ancestors: Vec<&'a Element>,
}

impl<'a> Selected<'a> {
    /// Walk up `levels` steps; `ancestor(1)` is the parent
    pub fn ancestor(&self, levels: usize) -> Option<&'a Element> {
        if levels == 0 {
            return Some(self.element);
        }
        self.ancestors
            .len()
            .checked_sub(levels)
            .map(|i| self.ancestors[i])
    }
}

/// A parsed document. An empty document has no root and matches nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    root: Option<Element>,
}

impl Document {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_root(root: Element) -> Self {
        Self { root: Some(root) }
    }

    pub fn root(&self) -> Option<&Element> {
        self.root.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Parse a complete document. Names and attribute values are decoded with the
    /// encoding named in the XML declaration (UTF-8 when absent).
    pub fn parse(bytes: &[u8]) -> Result<Self, XmlError> {
        let mut reader = Reader::from_reader(bytes);
        reader.config_mut().trim_text(true);

        let mut stack: Vec<Element> = Vec::new();
        let mut root = None;

        loop {
            match reader.read_event()? {
                Event::Start(start) => stack.push(element_from(&start, reader.decoder())?),
                Event::Empty(start) => {
                    let element = element_from(&start, reader.decoder())?;
                    attach(&mut stack, &mut root, element)?;
                }
                Event::End(_) => {
                    let element = stack
                        .pop()
                        .ok_or_else(|| XmlError("unexpected closing tag".to_string()))?;
                    attach(&mut stack, &mut root, element)?;
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if let Some(open) = stack.last() {
            return Err(XmlError(format!("unclosed element <{}>", open.name)));
        }
        match root {
            Some(root) => Ok(Self::with_root(root)),
            None => Err(XmlError("document has no root element".to_string())),
        }
    }

    /// Absolute query: the first step must name the root element
    pub fn select(&self, path: &str, filter: Option<AttrEq<'_>>) -> Vec<Selected<'_>> {
        let Some(root) = &self.root else {
            return Vec::new();
        };
        let steps = split_path(path);
        let Some((first, rest)) = steps.split_first() else {
            return Vec::new();
        };
        if root.name != *first {
            return Vec::new();
        }

        let mut out = Vec::new();
        collect(root, rest, filter, &mut Vec::new(), &mut out);
        out
    }
}

/// Render `root` as UTF-8 text with a declaration and two-space indentation
pub fn render(root: &Element) -> io::Result<String> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    write_element(&mut writer, root)?;

    let mut bytes = writer.into_inner();
    bytes.push(b'\n');
    String::from_utf8(bytes).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

fn split_path(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

fn collect<'a>(
    element: &'a Element,
    steps: &[&str],
    filter: Option<AttrEq<'_>>,
    chain: &mut Vec<&'a Element>,
    out: &mut Vec<Selected<'a>>,
) {
    match steps.split_first() {
        None => {
            if filter.map_or(true, |f| f.matches(element)) {
                out.push(Selected {
                    element,
                    ancestors: chain.clone(),
                });
            }
        }
        Some((step, rest)) => {
            chain.push(element);
            for child in element.children.iter().filter(|c| c.name == *step) {
                collect(child, rest, filter, chain, out);
            }
            chain.pop();
        }
    }
}

fn element_from(start: &BytesStart<'_>, decoder: Decoder) -> Result<Element, XmlError> {
    let mut element = Element::new(decoder.decode(start.name().as_ref())?.into_owned());
    for attr in start.attributes() {
        let attr = attr?;
        let key = decoder.decode(attr.key.as_ref())?;
        let value = attr.decode_and_unescape_value(decoder)?;
        element.set_attribute(&key, &value);
    }
    Ok(element)
}

fn attach(
    stack: &mut [Element],
    root: &mut Option<Element>,
    element: Element,
) -> Result<(), XmlError> {
    match stack.last_mut() {
        Some(parent) => {
            parent.children.push(element);
            Ok(())
        }
        None if root.is_none() => {
            *root = Some(element);
            Ok(())
        }
        None => Err(XmlError(format!(
            "multiple root elements (found <{}>)",
            element.name
        ))),
    }
}

fn write_element<W: io::Write>(writer: &mut Writer<W>, element: &Element) -> io::Result<()> {
    let mut start = BytesStart::new(element.name.as_str());
    for (key, value) in &element.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }

    if element.children.is_empty() {
        writer.write_event(Event::Empty(start))?;
        return Ok(());
    }

    writer.write_event(Event::Start(start))?;
    for child in &element.children {
        write_element(writer, child)?;
    }
    writer.write_event(Event::End(BytesEnd::new(element.name.as_str())))?;
    Ok(())
}
