// src/client/xml.rs
// Minimal element tree built from quick-xml events

use crate::schema::{QName, XSI_NS};
use quick_xml::Reader;
use quick_xml::escape::{resolve_predefined_entity, unescape};
use quick_xml::events::{BytesStart, Event};
use std::collections::BTreeMap;

pub const SOAP_ENV_NS: &str = "http://schemas.xmlsoap.org/soap/envelope/";

/// Parsed element with its in-scope namespace bindings
#[derive(Debug, Clone, Default)]
pub struct Element {
    pub local: String,
    pub namespace: Option<String>,
    attributes: Vec<(String, String)>,
    scope: BTreeMap<String, String>,
    pub children: Vec<Element>,
    pub text: String,
}

impl Element {
    /// Attribute value by namespace and local name
    pub fn attribute(&self, namespace: &str, local: &str) -> Option<&str> {
        self.attributes.iter().find_map(|(key, value)| {
            let (prefix, name) = key.split_once(':')?;
            (name == local && self.scope.get(prefix).map(String::as_str) == Some(namespace))
                .then_some(value.as_str())
        })
    }

    /// Unprefixed attribute value by local name
    pub fn attr(&self, local: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find_map(|(key, value)| (key == local).then_some(value.as_str()))
    }

    /// True when the element is `{namespace}local`
    pub fn is(&self, namespace: &str, local: &str) -> bool {
        self.local == local && self.namespace.as_deref() == Some(namespace)
    }

    /// Children named `{namespace}local`
    pub fn children_in<'a>(&'a self, namespace: &'a str, local: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |c| c.is(namespace, local))
    }

    /// Resolve a prefixed lexical name (`ext:ExtensionClass`) against the scope
    pub fn resolve_qname(&self, lexical: &str) -> Option<QName> {
        let (prefix, local) = lexical.split_once(':').unwrap_or(("", lexical));
        self.scope.get(prefix).map(|ns| QName::new(ns.as_str(), local))
    }

    pub fn is_nil(&self) -> bool {
        matches!(self.attribute(XSI_NS, "nil"), Some("true") | Some("1"))
    }

    pub fn child(&self, local: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.local == local)
    }

    pub fn children_named<'a>(&'a self, local: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |c| c.local == local)
    }
}

fn open(start: &BytesStart<'_>, parent: Option<&Element>) -> Result<Element, String> {
    let name = std::str::from_utf8(start.name().as_ref())
        .map_err(|e| format!("element name is not UTF-8: {}", e))?
        .to_string();
    let (prefix, local) = match name.split_once(':') {
        Some((prefix, local)) => (prefix.to_string(), local.to_string()),
        None => (String::new(), name),
    };

    let mut scope = parent.map(|p| p.scope.clone()).unwrap_or_default();
    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|e| format!("bad attribute on <{}>: {}", local, e))?;
        let key = std::str::from_utf8(attr.key.as_ref())
            .map_err(|e| format!("attribute name is not UTF-8: {}", e))?
            .to_string();
        let raw = std::str::from_utf8(&attr.value).map_err(|e| format!("attribute value is not UTF-8: {}", e))?;
        let value = unescape(raw).map_err(|e| e.to_string())?.into_owned();
        if key == "xmlns" {
            scope.insert(String::new(), value);
        } else if let Some(bound) = key.strip_prefix("xmlns:") {
            scope.insert(bound.to_string(), value);
        } else {
            attributes.push((key, value));
        }
    }

    Ok(Element {
        namespace: scope.get(&prefix).cloned(),
        local,
        attributes,
        scope,
        children: Vec::new(),
        text: String::new(),
    })
}

fn close(element: Element, stack: &mut [Element], root: &mut Option<Element>) -> Result<(), String> {
    match stack.last_mut() {
        Some(parent) => {
            parent.children.push(element);
            Ok(())
        }
        None if root.is_none() => {
            *root = Some(element);
            Ok(())
        }
        None => Err("document has more than one root element".to_string()),
    }
}

/// Parse a complete document into its root element
pub fn parse(xml: &str) -> Result<Element, String> {
    let mut reader = Reader::from_str(xml);
    let mut stack: Vec<Element> = Vec::new();
    let mut root = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let element = open(&e, stack.last())?;
                stack.push(element);
            }
            Ok(Event::Empty(e)) => {
                let element = open(&e, stack.last())?;
                close(element, &mut stack, &mut root)?;
            }
            Ok(Event::End(_)) => {
                let element = stack.pop().ok_or("unbalanced end tag")?;
                close(element, &mut stack, &mut root)?;
            }
            Ok(Event::Text(e)) => {
                if let Some(current) = stack.last_mut() {
                    let raw = std::str::from_utf8(&e).map_err(|err| format!("text is not UTF-8: {}", err))?;
                    current.text.push_str(&unescape(raw).map_err(|err| err.to_string())?);
                }
            }
            Ok(Event::CData(e)) => {
                if let Some(current) = stack.last_mut() {
                    let raw = std::str::from_utf8(&e).map_err(|err| format!("CDATA is not UTF-8: {}", err))?;
                    current.text.push_str(raw);
                }
            }
            Ok(Event::GeneralRef(e)) => {
                let Some(current) = stack.last_mut() else { continue };
                if let Some(ch) = e.resolve_char_ref().map_err(|err| err.to_string())? {
                    current.text.push(ch);
                } else {
                    let name = std::str::from_utf8(&e).map_err(|err| format!("entity is not UTF-8: {}", err))?;
                    let resolved = resolve_predefined_entity(name).ok_or_else(|| format!("unknown entity &{};", name))?;
                    current.text.push_str(resolved);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(format!("XML error at {}: {}", reader.error_position(), e)),
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(format!("unclosed element <{}>", open.local));
    }
    root.ok_or_else(|| "empty document".to_string())
}
