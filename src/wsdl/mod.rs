// src/wsdl/mod.rs
// WSDL retrieval: inventory probe, catalog coverage and the schema registry

pub mod registry;

use crate::error::{HarnessError, Result};
use crate::http::fetch_text;
use crate::schema::{QName, SchemaRegistry};
use quick_xml::Reader;
use quick_xml::escape::unescape;
use quick_xml::events::{BytesStart, Event};
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::{debug, info};

/// Operations and types a service publishes
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Inventory {
    pub target_namespace: String,
    pub service_name: Option<String>,
    /// `soap:address` location, when the WSDL declares one
    pub address: Option<String>,
    pub operations: BTreeSet<String>,
    pub types: BTreeSet<QName>,
}

/// Catalog coverage of a published inventory
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Coverage {
    /// Published operations with at least one scenario
    pub covered: Vec<String>,
    /// Published operations no scenario exercises
    pub uncovered: Vec<String>,
    /// Scenario operations the service does not publish
    pub unpublished: Vec<String>,
}

impl Coverage {
    pub fn is_complete(&self) -> bool {
        self.uncovered.is_empty() && self.unpublished.is_empty()
    }
}

impl Inventory {
    /// Compare against the operations a scenario catalog exercises
    pub fn coverage<'a>(&self, scenario_operations: impl IntoIterator<Item = &'a str>) -> Coverage {
        let exercised: BTreeSet<&str> = scenario_operations.into_iter().collect();
        let mut coverage = Coverage::default();
        for op in &self.operations {
            if exercised.contains(op.as_str()) {
                coverage.covered.push(op.clone());
            } else {
                coverage.uncovered.push(op.clone());
            }
        }
        coverage.unpublished = exercised
            .into_iter()
            .filter(|op| !self.operations.contains(*op))
            .map(str::to_string)
            .collect();
        coverage
    }
}

/// Fetch and parse the WSDL at `url`
pub async fn probe(http: &reqwest::Client, url: &str) -> Result<Inventory> {
    let document = fetch_text(http, url).await?;
    let inventory = parse(&document)?;
    info!(
        url,
        namespace = %inventory.target_namespace,
        operations = inventory.operations.len(),
        types = inventory.types.len(),
        "WSDL probed"
    );
    Ok(inventory)
}

/// Fetch the WSDL at `url` and build the schema registry it describes.
///
/// Fetch and parse failures both surface as `SchemaResolution`: without
/// the published schema no type can be resolved.
pub async fn load_schema(http: &reqwest::Client, url: &str) -> Result<SchemaRegistry> {
    let document = fetch_text(http, url)
        .await
        .map_err(|e| HarnessError::resolution(url, format!("WSDL fetch failed: {}", e)))?;
    let schema = registry::build(&document)
        .map_err(|e| HarnessError::resolution(url, format!("WSDL is unusable: {}", e)))?;
    info!(
        url,
        types = schema.type_count(),
        operations = schema.operation_names().len(),
        "Loaded service schema"
    );
    Ok(schema)
}

/// Where the reader is inside the document
#[derive(Default)]
struct Cursor {
    /// targetNamespace of each open `schema` element
    schemas: Vec<String>,
    in_port_type: bool,
}

/// Parse a WSDL 1.1 document into its inventory
pub fn parse(document: &str) -> Result<Inventory> {
    let mut reader = Reader::from_str(document);
    let mut inventory = Inventory::default();
    let mut cursor = Cursor::default();
    let mut saw_definitions = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                saw_definitions |= visit(&e, &mut inventory, &mut cursor, true)?;
            }
            Ok(Event::Empty(e)) => {
                saw_definitions |= visit(&e, &mut inventory, &mut cursor, false)?;
            }
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"schema" => {
                    cursor.schemas.pop();
                }
                b"portType" => cursor.in_port_type = false,
                _ => {}
            },
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(HarnessError::Wsdl(format!(
                    "XML error at byte {}: {}",
                    reader.buffer_position(),
                    e
                )));
            }
        }
    }

    if !saw_definitions {
        return Err(HarnessError::Wsdl("document has no wsdl:definitions element".to_string()));
    }
    debug!(operations = ?inventory.operations, "Parsed WSDL");
    Ok(inventory)
}

/// Record what one opening tag contributes; returns true for `definitions`
fn visit(start: &BytesStart<'_>, inventory: &mut Inventory, cursor: &mut Cursor, opens: bool) -> Result<bool> {
    let local = start.local_name();
    match local.as_ref() {
        b"definitions" => {
            inventory.target_namespace = attribute(start, "targetNamespace")?.unwrap_or_default();
            return Ok(true);
        }
        b"schema" if opens => {
            let namespace = attribute(start, "targetNamespace")?
                .or_else(|| cursor.schemas.last().cloned())
                .unwrap_or_else(|| inventory.target_namespace.clone());
            cursor.schemas.push(namespace);
        }
        b"complexType" | b"simpleType" => {
            if let (Some(namespace), Some(name)) = (cursor.schemas.last(), attribute(start, "name")?) {
                inventory.types.insert(QName::new(namespace.as_str(), name));
            }
        }
        b"portType" if opens => cursor.in_port_type = true,
        b"operation" if cursor.in_port_type => {
            if let Some(name) = attribute(start, "name")? {
                inventory.operations.insert(name);
            }
        }
        b"service" => inventory.service_name = attribute(start, "name")?,
        b"address" => inventory.address = attribute(start, "location")?,
        _ => {}
    }
    Ok(false)
}

fn attribute(start: &BytesStart<'_>, name: &str) -> Result<Option<String>> {
    for attr in start.attributes() {
        let attr = attr.map_err(|e| HarnessError::Wsdl(format!("bad attribute: {}", e)))?;
        if attr.key.local_name().as_ref() != name.as_bytes() || attr.key.prefix().is_some() {
            continue;
        }
        let raw = std::str::from_utf8(&attr.value)
            .map_err(|e| HarnessError::Wsdl(format!("attribute value is not UTF-8: {}", e)))?;
        let value = unescape(raw).map_err(|e| HarnessError::Wsdl(e.to_string()))?;
        return Ok(Some(value.into_owned()));
    }
    Ok(None)
}
