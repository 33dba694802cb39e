//! Owned markup tree built from `quick-xml` events.
//!
//! Every dialect the walker understands (WordprocessingML, DrawingML,
//! SpreadsheetML, OpenDocument, Confluence storage format) is parsed into the
//! same [`Element`] / [`MarkupNode`] tree. Qualified names are kept verbatim
//! (`w:p`, `ac:structured-macro`) since dispatch tables key on them.
//!
//! Parsing is lenient: mismatched end tags are tolerated, unclosed elements are
//! closed at end of input, and unknown entities are kept as written. Storage
//! format pages routinely use HTML entities such as `&nbsp;` that are not
//! declared anywhere.

use crate::error::{AnyExtractError, Result};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

/// Name of the synthetic element holding a document's top-level nodes.
pub const DOCUMENT_ROOT: &str = "#document";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkupNode {
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<MarkupNode>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Attribute value by qualified name.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Direct child elements, in order.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|child| match child {
            MarkupNode::Element(element) => Some(element),
            MarkupNode::Text(_) => None,
        })
    }

    /// First direct child element named `name`.
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.elements().find(|element| element.name == name)
    }

    /// First descendant element named `name`, in document order.
    pub fn find(&self, name: &str) -> Option<&Element> {
        for element in self.elements() {
            if element.name == name {
                return Some(element);
            }
            if let Some(found) = element.find(name) {
                return Some(found);
            }
        }
        None
    }

    /// All descendant elements named `name`, in document order.
    ///
    /// Matches are not searched further, so a `w:p` nested inside another
    /// matching `w:p` is returned only through its ancestor.
    pub fn find_all<'a>(&'a self, name: &str) -> Vec<&'a Element> {
        let mut found = Vec::new();
        self.collect_named(name, &mut found);
        found
    }

    fn collect_named<'a>(&'a self, name: &str, found: &mut Vec<&'a Element>) {
        for element in self.elements() {
            if element.name == name {
                found.push(element);
            } else {
                element.collect_named(name, found);
            }
        }
    }

    /// Concatenated text of all descendant text nodes.
    pub fn text(&self) -> String {
        let mut out = String::new();
        self.push_text(&mut out);
        out
    }

    fn push_text(&self, out: &mut String) {
        for child in &self.children {
            match child {
                MarkupNode::Text(text) => out.push_str(text),
                MarkupNode::Element(element) => element.push_text(out),
            }
        }
    }
}

/// Parse markup into a tree rooted at a synthetic [`DOCUMENT_ROOT`] element.
///
/// # Errors
///
/// `MalformedDocument` when the tokenizer fails or nesting exceeds `max_depth`.
pub fn parse_markup(bytes: &[u8], max_depth: usize) -> Result<Element> {
    let mut reader = Reader::from_reader(bytes);
    reader.config_mut().trim_text(false);
    reader.config_mut().check_end_names = false;

    let mut stack: Vec<Element> = vec![Element::new(DOCUMENT_ROOT)];
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                if stack.len() > max_depth {
                    return Err(AnyExtractError::malformed_document(format!(
                        "Markup nesting exceeds {} levels at position {}",
                        max_depth,
                        reader.buffer_position()
                    )));
                }
                stack.push(start_element(&e));
            }
            Ok(Event::Empty(e)) => {
                let element = start_element(&e);
                push_node(&mut stack, MarkupNode::Element(element));
            }
            Ok(Event::End(e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                close_element(&mut stack, &name);
            }
            Ok(Event::Text(e)) => {
                push_text(&mut stack, &String::from_utf8_lossy(e.as_ref()));
            }
            Ok(Event::CData(e)) => {
                push_text(&mut stack, &String::from_utf8_lossy(&e));
            }
            Ok(Event::GeneralRef(e)) => {
                let name = String::from_utf8_lossy(&e).into_owned();
                push_text(&mut stack, &resolve_entity(&name));
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(AnyExtractError::malformed_document(format!(
                    "Markup parsing error at position {}: {}",
                    reader.buffer_position(),
                    e
                )));
            }
            _ => {}
        }
        buf.clear();
    }

    while stack.len() > 1 {
        if let Some(element) = stack.pop() {
            push_node(&mut stack, MarkupNode::Element(element));
        }
    }

    stack
        .pop()
        .ok_or_else(|| AnyExtractError::malformed_document("Markup tree lost its root"))
}

fn start_element(e: &BytesStart<'_>) -> Element {
    let mut element = Element::new(String::from_utf8_lossy(e.name().as_ref()).into_owned());
    for attr in e.attributes().with_checks(false).flatten() {
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let raw = String::from_utf8_lossy(attr.value.as_ref());
        element.attributes.push((key, unescape(&raw)));
    }
    element
}

fn push_node(stack: &mut [Element], node: MarkupNode) {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(node);
    }
}

fn push_text(stack: &mut [Element], text: &str) {
    if text.is_empty() {
        return;
    }
    if let Some(parent) = stack.last_mut() {
        if let Some(MarkupNode::Text(previous)) = parent.children.last_mut() {
            previous.push_str(text);
        } else {
            parent.children.push(MarkupNode::Text(text.to_string()));
        }
    }
}

/// Close the nearest open element named `name`, closing anything opened after
/// it. A stray end tag with no open counterpart is ignored.
fn close_element(stack: &mut Vec<Element>, name: &str) {
    let Some(position) = stack.iter().skip(1).rposition(|element| element.name == name) else {
        return;
    };
    let target = position + 1;
    while stack.len() > target {
        if let Some(element) = stack.pop() {
            push_node(stack, MarkupNode::Element(element));
        }
    }
}

fn resolve_entity(name: &str) -> String {
    if let Some(code) = name.strip_prefix('#') {
        let parsed = match code.strip_prefix('x').or_else(|| code.strip_prefix('X')) {
            Some(hex) => u32::from_str_radix(hex, 16).ok(),
            None => code.parse::<u32>().ok(),
        };
        if let Some(ch) = parsed.and_then(char::from_u32) {
            return ch.to_string();
        }
        return format!("&{};", name);
    }

    match name {
        "amp" => "&",
        "lt" => "<",
        "gt" => ">",
        "quot" => "\"",
        "apos" => "'",
        "nbsp" => "\u{a0}",
        "ndash" => "\u{2013}",
        "mdash" => "\u{2014}",
        "hellip" => "\u{2026}",
        "rsquo" => "\u{2019}",
        "lsquo" => "\u{2018}",
        "rdquo" => "\u{201d}",
        "ldquo" => "\u{201c}",
        "copy" => "\u{a9}",
        "reg" => "\u{ae}",
        "trade" => "\u{2122}",
        "euro" => "\u{20ac}",
        _ => return format!("&{};", name),
    }
    .to_string()
}

/// Replace entity references inside an attribute value.
fn unescape(raw: &str) -> String {
    if !raw.contains('&') {
        return raw.to_string();
    }

    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(start) = rest.find('&') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        match after.find(';') {
            Some(end) if end > 0 && !after[..end].contains(char::is_whitespace) => {
                out.push_str(&resolve_entity(&after[..end]));
                rest = &after[end + 1..];
            }
            _ => {
                out.push('&');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}
