// Minimal owned XML tree
//
// PAN-OS answers every XML API call with a `<response>` document. We parse
// it once into an owned element tree so the config walker in `panconf-core`
// can navigate it without holding on to the response buffer.

use std::collections::BTreeMap;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::QName;

use crate::error::Error;

/// An owned XML element: tag, attributes, trimmed text, and child elements.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct XmlElement {
    pub name: String,
    pub attributes: BTreeMap<String, String>,
    pub text: Option<String>,
    pub children: Vec<XmlElement>,
}

impl XmlElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Attribute value by name.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// The `name` attribute carried by every `<entry>` in the config tree.
    pub fn entry_name(&self) -> Option<&str> {
        self.attr("name")
    }

    /// Trimmed text content, if non-empty.
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// First direct child with the given tag.
    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.children.iter().find(|c| c.name == name)
    }

    /// All direct children with the given tag, in document order.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlElement> {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Walk a `/`-separated path of child tags. An empty path is `self`.
    pub fn find(&self, path: &str) -> Option<&XmlElement> {
        path.split('/')
            .filter(|segment| !segment.is_empty())
            .try_fold(self, |current, segment| current.child(segment))
    }

    /// Text of the element at `path`.
    pub fn text_at(&self, path: &str) -> Option<&str> {
        self.find(path).and_then(XmlElement::text)
    }

    /// The `<entry>` children of the element at `path`.
    pub fn entries_at<'a>(&'a self, path: &str) -> Vec<&'a XmlElement> {
        self.find(path)
            .map(|node| node.children_named("entry").collect())
            .unwrap_or_default()
    }

    /// Builder helper: add an attribute.
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Builder helper: set the text content.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Builder helper: append a child element.
    pub fn with_child(mut self, child: XmlElement) -> Self {
        self.children.push(child);
        self
    }
}

/// Parse an XML document into its root element.
pub fn parse(xml: &str) -> Result<XmlElement, Error> {
    // Untrimmed: values keep their whitespace; indentation is dropped in `push_text`.
    let mut reader = Reader::from_str(xml);

    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;

    loop {
        match reader.read_event().map_err(|e| malformed(xml, &e))? {
            Event::Start(e) => stack.push(start_element(&e, xml)?),
            Event::Empty(e) => {
                let node = start_element(&e, xml)?;
                attach(&mut stack, &mut root, node, xml)?;
            }
            Event::Text(t) => {
                if let Some(current) = stack.last_mut() {
                    let text = t.unescape().map_err(|e| malformed(xml, &e))?;
                    push_text(current, &text);
                }
            }
            Event::CData(t) => {
                if let Some(current) = stack.last_mut() {
                    let text = String::from_utf8_lossy(t.as_ref()).into_owned();
                    push_text(current, &text);
                }
            }
            Event::End(_) => {
                let node = stack
                    .pop()
                    .ok_or_else(|| malformed(xml, "closing tag without open tag"))?;
                attach(&mut stack, &mut root, node, xml)?;
            }
            Event::Eof => break,
            Event::Decl(_) | Event::PI(_) | Event::DocType(_) | Event::Comment(_) => {}
        }
    }

    if !stack.is_empty() {
        return Err(malformed(xml, "unclosed element at end of document"));
    }
    root.ok_or_else(|| malformed(xml, "no root element"))
}

fn start_element(e: &BytesStart<'_>, xml: &str) -> Result<XmlElement, Error> {
    let mut node = XmlElement::new(qname(e.name()));
    for attr in e.attributes() {
        let attr = attr.map_err(|err| malformed(xml, &err))?;
        let value = attr.unescape_value().map_err(|err| malformed(xml, &err))?;
        node.attributes.insert(qname(attr.key), value.into_owned());
    }
    Ok(node)
}

fn attach(
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
    node: XmlElement,
    xml: &str,
) -> Result<(), Error> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(node);
        Ok(())
    } else if root.is_none() {
        *root = Some(node);
        Ok(())
    } else {
        Err(malformed(xml, "multiple top-level elements"))
    }
}

fn push_text(node: &mut XmlElement, text: &str) {
    if text.trim().is_empty() {
        return;
    }
    match &mut node.text {
        Some(existing) => existing.push_str(text),
        None => node.text = Some(text.to_owned()),
    }
}

fn qname(name: QName<'_>) -> String {
    String::from_utf8_lossy(name.as_ref()).into_owned()
}

fn malformed(body: &str, reason: &(impl std::fmt::Display + ?Sized)) -> Error {
    let preview: String = body.chars().take(200).collect();
    Error::Xml {
        message: format!("{reason} (body preview: {preview:?})"),
        body: body.to_owned(),
    }
}
