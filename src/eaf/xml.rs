/*!
 * Generic XML element tree for the parts of a document the model does not
 * interpret (HEADER, CONSTRAINT, LANGUAGE, CONTROLLED_VOCABULARY, ...).
 *
 * Elements are captured from roxmltree and written back with quick-xml, so
 * pass-through content survives a load/write cycle.
 */

use std::io::Write;

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use serde::{Deserialize, Serialize};

use crate::document::model::Attributes;
use crate::errors::DocumentError;

/// Child of an element
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum XmlNode {
    Element(XmlElement),
    Text(String),
}

/// An XML element with ordered attributes and children.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct XmlElement {
    pub name: String,
    pub attributes: Attributes,
    pub children: Vec<XmlNode>,
}

impl XmlElement {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    pub fn with_attribute(mut self, name: &str, value: &str) -> Self {
        self.set_attribute(name, value);
        self
    }

    pub fn with_child(mut self, child: XmlElement) -> Self {
        self.children.push(XmlNode::Element(child));
        self
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.children.push(XmlNode::Text(text.to_string()));
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Set an attribute in place, appending it when absent
    pub fn set_attribute(&mut self, name: &str, value: &str) {
        match self.attributes.iter_mut().find(|(key, _)| key == name) {
            Some((_, existing)) => *existing = value.to_string(),
            None => self.attributes.push((name.to_string(), value.to_string())),
        }
    }

    /// Element children, skipping text
    pub fn elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|child| match child {
            XmlNode::Element(element) => Some(element),
            XmlNode::Text(_) => None,
        })
    }

    pub fn elements_mut(&mut self) -> impl Iterator<Item = &mut XmlElement> {
        self.children.iter_mut().filter_map(|child| match child {
            XmlNode::Element(element) => Some(element),
            XmlNode::Text(_) => None,
        })
    }

    /// Concatenated text content of direct children
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|child| match child {
                XmlNode::Text(text) => Some(text.as_str()),
                XmlNode::Element(_) => None,
            })
            .collect()
    }

    /// Capture a parsed element and its subtree
    pub fn from_node(node: roxmltree::Node) -> Self {
        let mut element = Self::new(node.tag_name().name());
        element.attributes = node_attributes(&node);

        let has_elements = node.children().any(|child| child.is_element());
        for child in node.children() {
            if child.is_element() {
                element.children.push(XmlNode::Element(Self::from_node(child)));
            } else if let Some(text) = child.text().filter(|_| child.is_text()) {
                // indentation between elements is regenerated on write
                if has_elements && text.trim().is_empty() {
                    continue;
                }
                element.children.push(XmlNode::Text(text.to_string()));
            }
        }
        element
    }

    /// Write the element and its subtree
    pub fn write<W: Write>(&self, writer: &mut Writer<W>) -> Result<(), DocumentError> {
        let start = start_tag(&self.name, &self.attributes);
        if self.children.is_empty() {
            writer.write_event(Event::Empty(start))?;
            return Ok(());
        }

        writer.write_event(Event::Start(start))?;
        for child in &self.children {
            match child {
                XmlNode::Element(element) => element.write(writer)?,
                XmlNode::Text(text) => writer.write_event(Event::Text(BytesText::new(text)))?,
            }
        }
        writer.write_event(Event::End(BytesEnd::new(self.name.as_str())))?;
        Ok(())
    }
}

/// Opening tag with attributes in the given order
pub(crate) fn start_tag<'a>(name: &'a str, attributes: &'a Attributes) -> BytesStart<'a> {
    BytesStart::new(name).with_attributes(attributes.iter().map(|(k, v)| (k.as_str(), v.as_str())))
}

/// Attributes of a parsed element with namespace prefixes restored.
///
/// Namespace declarations are only present on the element that declares
/// them, so for the root element they come first.
pub(crate) fn node_attributes(node: &roxmltree::Node) -> Attributes {
    let mut attributes = Attributes::new();

    let inherited: Vec<&str> = node
        .parent_element()
        .map(|parent| parent.namespaces().map(|ns| ns.uri()).collect())
        .unwrap_or_default();
    for namespace in node.namespaces() {
        if namespace.name() == Some("xml") || inherited.contains(&namespace.uri()) {
            continue;
        }
        let key = match namespace.name() {
            Some(prefix) => format!("xmlns:{}", prefix),
            None => "xmlns".to_string(),
        };
        attributes.push((key, namespace.uri().to_string()));
    }

    for attribute in node.attributes() {
        let key = match attribute.namespace().and_then(|uri| node.lookup_prefix(uri)) {
            Some(prefix) if !prefix.is_empty() => format!("{}:{}", prefix, attribute.name()),
            _ => attribute.name().to_string(),
        };
        attributes.push((key, attribute.value().to_string()));
    }
    attributes
}
