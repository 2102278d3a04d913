//! Minimal owned XML tree over quick-xml events.
//!
//! Start tags keep their raw bytes (attribute order and quoting survive a
//! round trip). Character data is stored decoded; on output only `<`, `>` and
//! `&` are escaped. Declarations, comments, CDATA, processing instructions and
//! unknown entity references pass through as raw events.

use std::borrow::Cow;
use std::io;

use quick_xml::events::{BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

#[derive(Debug, Clone, PartialEq)]
pub enum XmlNode {
    Element(XmlElement),
    Text(String),
    Raw(Event<'static>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct XmlElement {
    pub start: BytesStart<'static>,
    pub children: Vec<XmlNode>,
    /// Written as `<x/>` when it still has no children.
    pub self_closing: bool,
}

impl XmlElement {
    pub fn new(name: &str) -> Self {
        Self {
            start: BytesStart::new(name.to_string()),
            children: Vec::new(),
            self_closing: true,
        }
    }

    pub fn with_attribute(mut self, key: &str, value: &str) -> Self {
        self.start.push_attribute((key, value));
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(XmlNode::Text(text.into()));
        self.self_closing = false;
        self
    }

    /// Qualified name, e.g. `w:p`.
    pub fn name(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(self.start.name().into_inner())
    }

    /// Local part of the name, e.g. `p` for `w:p`.
    pub fn local_name(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(self.start.local_name().into_inner())
    }

    /// Namespace prefix including the colon (`w:`), or empty.
    pub fn prefix(&self) -> String {
        let name = self.name();
        match name.split_once(':') {
            Some((prefix, _)) => format!("{prefix}:"),
            None => String::new(),
        }
    }

    pub fn is(&self, local: &str) -> bool {
        self.local_name() == local
    }

    pub fn child_elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|c| match c {
            XmlNode::Element(e) => Some(e),
            _ => None,
        })
    }

    pub fn child_elements_mut(&mut self) -> impl Iterator<Item = &mut XmlElement> {
        self.children.iter_mut().filter_map(|c| match c {
            XmlNode::Element(e) => Some(e),
            _ => None,
        })
    }

    /// Concatenated character data of direct text children.
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|c| match c {
                XmlNode::Text(t) => Some(t.as_str()),
                _ => None,
            })
            .collect()
    }
}

/// A parsed XML part: prolog nodes, root element, trailing nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct XmlDocument {
    pub nodes: Vec<XmlNode>,
}

impl XmlDocument {
    pub fn parse(xml: &str) -> Result<Self, String> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(false);

        let mut stack: Vec<XmlElement> = Vec::new();
        let mut top: Vec<XmlNode> = Vec::new();

        fn push(stack: &mut [XmlElement], top: &mut Vec<XmlNode>, node: XmlNode) {
            let siblings = match stack.last_mut() {
                Some(parent) => &mut parent.children,
                None => top,
            };
            // Adjacent text and entity references merge into one text node
            if let XmlNode::Text(ref text) = node {
                if let Some(XmlNode::Text(prev)) = siblings.last_mut() {
                    prev.push_str(text);
                    return;
                }
            }
            siblings.push(node);
        }

        loop {
            let event = reader
                .read_event()
                .map_err(|e| format!("at byte {}: {e}", reader.error_position()))?;
            match event {
                Event::Start(start) => stack.push(XmlElement {
                    start: start.into_owned(),
                    children: Vec::new(),
                    self_closing: false,
                }),
                Event::End(_) => {
                    let element = stack
                        .pop()
                        .ok_or_else(|| "unexpected closing tag".to_string())?;
                    push(&mut stack, &mut top, XmlNode::Element(element));
                }
                Event::Empty(start) => push(
                    &mut stack,
                    &mut top,
                    XmlNode::Element(XmlElement {
                        start: start.into_owned(),
                        children: Vec::new(),
                        self_closing: true,
                    }),
                ),
                Event::Text(text) => {
                    let decoded = text.decode().map_err(|e| e.to_string())?;
                    push(&mut stack, &mut top, XmlNode::Text(decoded.into_owned()));
                }
                Event::GeneralRef(reference) => {
                    let resolved = match reference.resolve_char_ref().map_err(|e| e.to_string())? {
                        Some(ch) => Some(ch.to_string()),
                        None => {
                            let name = reference.decode().map_err(|e| e.to_string())?;
                            quick_xml::escape::resolve_xml_entity(&name).map(str::to_string)
                        }
                    };
                    let node = match resolved {
                        Some(text) => XmlNode::Text(text),
                        None => XmlNode::Raw(Event::GeneralRef(reference.into_owned())),
                    };
                    push(&mut stack, &mut top, node);
                }
                Event::Eof => break,
                other => push(&mut stack, &mut top, XmlNode::Raw(other.into_owned())),
            }
        }

        if let Some(open) = stack.last() {
            return Err(format!("unclosed element <{}>", open.name()));
        }

        Ok(Self { nodes: top })
    }

    pub fn root(&self) -> Option<&XmlElement> {
        self.nodes.iter().find_map(|n| match n {
            XmlNode::Element(e) => Some(e),
            _ => None,
        })
    }

    pub fn root_mut(&mut self) -> Option<&mut XmlElement> {
        self.nodes.iter_mut().find_map(|n| match n {
            XmlNode::Element(e) => Some(e),
            _ => None,
        })
    }

    pub fn to_bytes(&self) -> io::Result<Vec<u8>> {
        let mut writer = Writer::new(Vec::new());
        for node in &self.nodes {
            write_node(&mut writer, node)?;
        }
        Ok(writer.into_inner())
    }
}

fn write_node(writer: &mut Writer<Vec<u8>>, node: &XmlNode) -> io::Result<()> {
    match node {
        XmlNode::Element(e) if e.self_closing && e.children.is_empty() => {
            writer.write_event(Event::Empty(e.start.borrow()))
        }
        XmlNode::Element(e) => {
            writer.write_event(Event::Start(e.start.borrow()))?;
            for child in &e.children {
                write_node(writer, child)?;
            }
            writer.write_event(Event::End(e.start.to_end()))
        }
        XmlNode::Text(text) => {
            let escaped = quick_xml::escape::partial_escape(text.as_str());
            writer.write_event(Event::Text(BytesText::from_escaped(escaped)))
        }
        XmlNode::Raw(event) => writer.write_event(event.borrow()),
    }
}
