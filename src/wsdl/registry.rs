// src/wsdl/registry.rs
// Schema registry built from a document/literal WSDL 1.1 description

use crate::client::xml::{self, Element};
use crate::error::{HarnessError, Result};
use crate::schema::{
    BodyStyle, FieldDescriptor, OperationDescriptor, Param, QName, ScalarKind, SchemaRegistry, TypeDescriptor,
    TypeRef, TypeShape, XS_NS,
};
use std::collections::HashMap;
use tracing::{debug, warn};

pub const WSDL_NS: &str = "http://schemas.xmlsoap.org/wsdl/";
pub const WSDL_SOAP_NS: &str = "http://schemas.xmlsoap.org/wsdl/soap/";

fn wsdl_error(message: impl Into<String>) -> HarnessError {
    HarnessError::Wsdl(message.into())
}

/// Top-level `xs:element` declaration
#[derive(Debug, Clone)]
enum ElementDecl {
    Typed(TypeRef),
    /// Anonymous complex type declared inline
    Inline(Vec<FieldDescriptor>),
}

/// One `wsdl:part`, keyed by the element it references
#[derive(Debug, Clone)]
struct Part {
    name: String,
    element: Option<QName>,
}

/// Operation as declared on the portType and binding
#[derive(Debug, Default)]
struct Declared {
    input: Option<QName>,
    output: Option<QName>,
    in_headers: Vec<(QName, String)>,
    out_headers: Vec<(QName, String)>,
}

/// Parse a WSDL document into the types and operations it publishes.
///
/// Types or operations the harness cannot model (rpc parts, several
/// arguments, anonymous field types) are skipped with a warning so the
/// rest of the service stays usable. Structural problems are errors.
pub fn build(document: &str) -> Result<SchemaRegistry> {
    let root = xml::parse(document).map_err(wsdl_error)?;
    if !root.is(WSDL_NS, "definitions") {
        return Err(wsdl_error(format!("expected wsdl:definitions, found <{}>", root.local)));
    }
    let target = root
        .attr("targetNamespace")
        .ok_or_else(|| wsdl_error("definitions has no targetNamespace"))?;

    let mut registry = SchemaRegistry::new(target);
    let schemas: Vec<&Element> = root
        .children_in(WSDL_NS, "types")
        .flat_map(|types| types.children_in(XS_NS, "schema"))
        .collect();

    let mut elements = HashMap::new();
    for schema in &schemas {
        let namespace = schema.attr("targetNamespace").unwrap_or(target);
        for decl in schema.children_in(XS_NS, "element") {
            let Some(name) = decl.attr("name") else { continue };
            let name = QName::new(namespace, name);
            match element_decl(decl, &name) {
                Ok(parsed) => {
                    elements.insert(name, parsed);
                }
                Err(e) => warn!(element = %name, error = %e, "Skipping element declaration"),
            }
        }
    }

    for schema in &schemas {
        let namespace = schema.attr("targetNamespace").unwrap_or(target);
        for child in &schema.children {
            let Some(local) = child.attr("name") else { continue };
            let name = QName::new(namespace, local);
            let parsed = if child.is(XS_NS, "complexType") {
                complex_type(child, &name, &elements)
            } else if child.is(XS_NS, "simpleType") {
                simple_type(child, &name)
            } else {
                continue;
            };
            match parsed {
                Ok(descriptor) => registry.add_type(descriptor),
                Err(e) => warn!(type_name = %name, error = %e, "Skipping type"),
            }
        }
    }

    let messages = messages(&root, target)?;
    for (name, declared) in operations(&root)? {
        match operation(&name, &declared, &messages, &elements, &registry) {
            Ok(op) => registry.add_operation(op),
            Err(e) => warn!(operation = %name, error = %e, "Skipping operation"),
        }
    }

    debug!(
        namespace = target,
        types = registry.type_count(),
        operations = registry.operation_names().len(),
        "Schema registry built from WSDL"
    );
    Ok(registry)
}

// ============================================================================
// XML Schema
// ============================================================================

fn type_ref(context: &Element, lexical: &str) -> Result<TypeRef> {
    let name = context
        .resolve_qname(lexical)
        .ok_or_else(|| wsdl_error(format!("unbound prefix in '{}'", lexical)))?;
    if name.namespace == XS_NS {
        return ScalarKind::from_xsd_name(&name.local)
            .map(TypeRef::Builtin)
            .ok_or_else(|| wsdl_error(format!("unsupported built-in type xs:{}", name.local)));
    }
    Ok(TypeRef::Named(name))
}

fn element_decl(decl: &Element, name: &QName) -> Result<ElementDecl> {
    if let Some(lexical) = decl.attr("type") {
        return type_ref(decl, lexical).map(ElementDecl::Typed);
    }
    match decl.children_in(XS_NS, "complexType").next() {
        Some(inline) => {
            let (base, fields) = record_body(inline, name, &HashMap::new())?;
            if base.is_some() {
                return Err(wsdl_error("anonymous extension types are not supported"));
            }
            Ok(ElementDecl::Inline(fields))
        }
        None => Err(wsdl_error("element has neither a type nor an inline complexType")),
    }
}

fn complex_type(decl: &Element, name: &QName, elements: &HashMap<QName, ElementDecl>) -> Result<TypeDescriptor> {
    let (base, fields) = record_body(decl, name, elements)?;
    Ok(TypeDescriptor::record(name.clone(), base, fields))
}

/// Base type and own fields of a complexType body
fn record_body(
    decl: &Element,
    owner: &QName,
    elements: &HashMap<QName, ElementDecl>,
) -> Result<(Option<QName>, Vec<FieldDescriptor>)> {
    let extension = decl
        .children_in(XS_NS, "complexContent")
        .flat_map(|content| content.children_in(XS_NS, "extension"))
        .next();

    let (base, body) = match extension {
        Some(ext) => {
            let lexical = ext
                .attr("base")
                .ok_or_else(|| wsdl_error("extension without a base"))?;
            let base = match type_ref(ext, lexical) {
                Ok(TypeRef::Named(base)) => Some(base),
                // xs:anyType and friends
                _ => None,
            };
            (base, ext)
        }
        None => (None, decl),
    };

    let mut fields = Vec::new();
    for group in body
        .children
        .iter()
        .filter(|c| c.is(XS_NS, "sequence") || c.is(XS_NS, "all"))
    {
        for particle in group.children_in(XS_NS, "element") {
            fields.push(field(particle, owner, elements)?);
        }
    }
    Ok((base, fields))
}

fn field(particle: &Element, owner: &QName, elements: &HashMap<QName, ElementDecl>) -> Result<FieldDescriptor> {
    let (name, type_ref) = match (particle.attr("name"), particle.attr("ref")) {
        (Some(name), _) => {
            let lexical = particle
                .attr("type")
                .ok_or_else(|| wsdl_error(format!("field '{}' of {} has an anonymous type", name, owner)))?;
            (name.to_string(), type_ref(particle, lexical)?)
        }
        (None, Some(reference)) => {
            let target = particle
                .resolve_qname(reference)
                .ok_or_else(|| wsdl_error(format!("unbound prefix in ref '{}'", reference)))?;
            match elements.get(&target) {
                Some(ElementDecl::Typed(type_ref)) => (target.local.clone(), type_ref.clone()),
                _ => return Err(wsdl_error(format!("ref to unusable element {}", target))),
            }
        }
        (None, None) => return Err(wsdl_error(format!("unnamed field in {}", owner))),
    };

    let optional = particle.attr("minOccurs") == Some("0");
    let repeated = match particle.attr("maxOccurs") {
        Some("unbounded") => true,
        Some(n) => n.parse::<u64>().map(|n| n > 1).unwrap_or(false),
        None => false,
    };

    let mut descriptor = FieldDescriptor::new(owner, &name, type_ref);
    if particle.attr("nillable") != Some("true") && !optional {
        descriptor = descriptor.non_nillable();
    }
    if repeated {
        descriptor = descriptor.repeated();
    }
    Ok(descriptor)
}

fn simple_type(decl: &Element, name: &QName) -> Result<TypeDescriptor> {
    let restriction = decl
        .children_in(XS_NS, "restriction")
        .next()
        .ok_or_else(|| wsdl_error("only restriction simple types are supported"))?;
    let values: Vec<&str> = restriction
        .children_in(XS_NS, "enumeration")
        .filter_map(|facet| facet.attr("value"))
        .collect();
    if !values.is_empty() {
        return Ok(TypeDescriptor::enumeration(name.clone(), &values));
    }

    let lexical = restriction
        .attr("base")
        .ok_or_else(|| wsdl_error("restriction without a base"))?;
    match type_ref(restriction, lexical)? {
        TypeRef::Builtin(kind) => Ok(TypeDescriptor::scalar(name.clone(), kind)),
        TypeRef::Named(base) => Err(wsdl_error(format!("restriction of a named type ({}) is not supported", base))),
    }
}

// ============================================================================
// Messages, portType and binding
// ============================================================================

fn messages(root: &Element, target: &str) -> Result<HashMap<QName, Vec<Part>>> {
    let mut messages = HashMap::new();
    for message in root.children_in(WSDL_NS, "message") {
        let name = message
            .attr("name")
            .ok_or_else(|| wsdl_error("message without a name"))?;
        let mut parts = Vec::new();
        for part in message.children_in(WSDL_NS, "part") {
            let element = match part.attr("element") {
                Some(lexical) => Some(
                    part.resolve_qname(lexical)
                        .ok_or_else(|| wsdl_error(format!("unbound prefix in '{}'", lexical)))?,
                ),
                None => None,
            };
            parts.push(Part {
                name: part.attr("name").unwrap_or_default().to_string(),
                element,
            });
        }
        messages.insert(QName::new(target, name), parts);
    }
    Ok(messages)
}

fn message_ref(context: &Element) -> Result<Option<QName>> {
    match context.attr("message") {
        Some(lexical) => context
            .resolve_qname(lexical)
            .map(Some)
            .ok_or_else(|| wsdl_error(format!("unbound prefix in '{}'", lexical))),
        None => Ok(None),
    }
}

/// `soap:header` references of one binding input or output
fn headers(direction: Option<&Element>) -> Result<Vec<(QName, String)>> {
    let mut found = Vec::new();
    let Some(direction) = direction else { return Ok(found) };
    for header in direction.children_in(WSDL_SOAP_NS, "header") {
        if let Some(message) = message_ref(header)? {
            found.push((message, header.attr("part").unwrap_or_default().to_string()));
        }
    }
    Ok(found)
}

/// Operations in portType order, merged with their binding headers
fn operations(root: &Element) -> Result<Vec<(String, Declared)>> {
    let mut declared: Vec<(String, Declared)> = Vec::new();
    for port_type in root.children_in(WSDL_NS, "portType") {
        for op in port_type.children_in(WSDL_NS, "operation") {
            let Some(name) = op.attr("name") else { continue };
            let input = match op.children_in(WSDL_NS, "input").next() {
                Some(input) => message_ref(input)?,
                None => None,
            };
            let output = match op.children_in(WSDL_NS, "output").next() {
                Some(output) => message_ref(output)?,
                None => None,
            };
            declared.push((
                name.to_string(),
                Declared {
                    input,
                    output,
                    ..Default::default()
                },
            ));
        }
    }

    for binding in root.children_in(WSDL_NS, "binding") {
        for op in binding.children_in(WSDL_NS, "operation") {
            let Some(name) = op.attr("name") else { continue };
            let Some((_, entry)) = declared.iter_mut().find(|(n, _)| n == name) else {
                continue;
            };
            entry.in_headers = headers(op.children_in(WSDL_NS, "input").next())?;
            entry.out_headers = headers(op.children_in(WSDL_NS, "output").next())?;
        }
    }
    Ok(declared)
}

/// Record fields behind an element, when it names or inlines a record type
fn wrapper_fields(decl: &ElementDecl, registry: &SchemaRegistry) -> Option<Vec<FieldDescriptor>> {
    match decl {
        ElementDecl::Inline(fields) => Some(fields.clone()),
        ElementDecl::Typed(TypeRef::Named(name)) => match &registry.get_type(name)?.shape {
            TypeShape::Record { .. } => registry.flatten(name),
            _ => None,
        },
        ElementDecl::Typed(TypeRef::Builtin(_)) => None,
    }
}

/// Body layout of one message: style plus its single parameter
fn body(
    message: Option<&QName>,
    wrapper: &str,
    messages: &HashMap<QName, Vec<Part>>,
    elements: &HashMap<QName, ElementDecl>,
    registry: &SchemaRegistry,
) -> Result<(BodyStyle, Option<Param>)> {
    let Some(message) = message else {
        return Ok((BodyStyle::Empty, None));
    };
    let parts = messages
        .get(message)
        .ok_or_else(|| wsdl_error(format!("message {} is not declared", message)))?;
    let part = match parts.as_slice() {
        [] => return Ok((BodyStyle::Empty, None)),
        [part] => part,
        _ => return Err(wsdl_error(format!("message {} has several parts", message))),
    };
    let element = part
        .element
        .as_ref()
        .ok_or_else(|| wsdl_error(format!("part '{}' is not document/literal", part.name)))?;
    let decl = elements
        .get(element)
        .ok_or_else(|| wsdl_error(format!("element {} is not declared", element)))?;

    if element.local == wrapper
        && let Some(fields) = wrapper_fields(decl, registry)
    {
        return match fields.as_slice() {
            [] => Ok((BodyStyle::Empty, None)),
            [only] => {
                let mut param = Param::new(&only.name, only.type_ref.clone());
                param.repeated = only.repeated;
                Ok((BodyStyle::Wrapped, Some(param)))
            }
            _ => Err(wsdl_error(format!("{} wraps more than one argument", element))),
        };
    }

    match decl {
        ElementDecl::Typed(type_ref) => Ok((BodyStyle::Bare, Some(Param::new(&element.local, type_ref.clone())))),
        ElementDecl::Inline(_) => Err(wsdl_error(format!("bare element {} has an anonymous type", element))),
    }
}

/// Header type carried by a `soap:header` message part
fn header_type(
    (message, part_name): &(QName, String),
    messages: &HashMap<QName, Vec<Part>>,
    elements: &HashMap<QName, ElementDecl>,
) -> Result<QName> {
    let part = messages
        .get(message)
        .and_then(|parts| parts.iter().find(|p| &p.name == part_name || part_name.is_empty()))
        .ok_or_else(|| wsdl_error(format!("header part {}/{} is not declared", message, part_name)))?;
    let element = part
        .element
        .as_ref()
        .ok_or_else(|| wsdl_error(format!("header part '{}' has no element", part.name)))?;
    match elements.get(element) {
        Some(ElementDecl::Typed(TypeRef::Named(name))) => Ok(name.clone()),
        _ => Err(wsdl_error(format!("header element {} is not a named record", element))),
    }
}

fn operation(
    name: &str,
    declared: &Declared,
    messages: &HashMap<QName, Vec<Part>>,
    elements: &HashMap<QName, ElementDecl>,
    registry: &SchemaRegistry,
) -> Result<OperationDescriptor> {
    let (style, input) = body(declared.input.as_ref(), name, messages, elements, registry)?;
    let (_, output) = body(
        declared.output.as_ref(),
        &format!("{}Response", name),
        messages,
        elements,
        registry,
    )?;

    let mut op = OperationDescriptor::new(name).style(style);
    op.input = input;
    op.output = output;
    for header in &declared.in_headers {
        op = op.in_header(header_type(header, messages, elements)?);
    }
    for header in &declared.out_headers {
        op = op.out_header(header_type(header, messages, elements)?);
    }
    Ok(op)
}

#[cfg(test)]
mod tests {
    use super::*;

    const WSDL: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<wsdl:definitions xmlns:wsdl="http://schemas.xmlsoap.org/wsdl/"
                  xmlns:soap="http://schemas.xmlsoap.org/wsdl/soap/"
                  xmlns:xs="http://www.w3.org/2001/XMLSchema"
                  xmlns:tns="spyne.test.interop.server"
                  xmlns:s0="punk.tunk" xmlns:s1="bar"
                  targetNamespace="spyne.test.interop.server" name="InteropService">
  <wsdl:types>
    <xs:schema targetNamespace="punk.tunk" elementFormDefault="qualified">
      <xs:complexType name="NestedClass">
        <xs:sequence>
          <xs:element name="i" type="xs:integer" minOccurs="0" nillable="true"/>
          <xs:element name="ai" type="tns:integerArray" minOccurs="0" nillable="true"/>
        </xs:sequence>
      </xs:complexType>
    </xs:schema>
    <xs:schema targetNamespace="bar" elementFormDefault="qualified">
      <xs:complexType name="ExtensionClass">
        <xs:complexContent>
          <xs:extension base="s0:NestedClass">
            <xs:sequence>
              <xs:element name="q" type="xs:integer" minOccurs="0" nillable="true"/>
            </xs:sequence>
          </xs:extension>
        </xs:complexContent>
      </xs:complexType>
    </xs:schema>
    <xs:schema targetNamespace="spyne.test.interop.server" elementFormDefault="qualified">
      <xs:complexType name="integerArray">
        <xs:sequence>
          <xs:element name="integer" type="xs:integer" minOccurs="0" maxOccurs="unbounded" nillable="true"/>
        </xs:sequence>
      </xs:complexType>
      <xs:complexType name="NonNillable">
        <xs:sequence>
          <xs:element name="s" type="xs:string"/>
        </xs:sequence>
      </xs:complexType>
      <xs:complexType name="InHeader">
        <xs:sequence>
          <xs:element name="s" type="xs:string" minOccurs="0" nillable="true"/>
        </xs:sequence>
      </xs:complexType>
      <xs:simpleType name="DaysOfWeekEnum">
        <xs:restriction base="xs:string">
          <xs:enumeration value="Monday"/>
          <xs:enumeration value="Tuesday"/>
        </xs:restriction>
      </xs:simpleType>
      <xs:complexType name="Weird">
        <xs:sequence>
          <xs:element name="x" type="xs:anyType"/>
        </xs:sequence>
      </xs:complexType>
      <xs:complexType name="echo_extension_class">
        <xs:sequence>
          <xs:element name="ec" type="s1:ExtensionClass" minOccurs="0" nillable="true"/>
        </xs:sequence>
      </xs:complexType>
      <xs:complexType name="echo_extension_classResponse">
        <xs:sequence>
          <xs:element name="echo_extension_classResult" type="s1:ExtensionClass" minOccurs="0" nillable="true"/>
        </xs:sequence>
      </xs:complexType>
      <xs:element name="echo_extension_class" type="tns:echo_extension_class"/>
      <xs:element name="echo_extension_classResponse" type="tns:echo_extension_classResponse"/>
      <xs:element name="echo_in_header">
        <xs:complexType><xs:sequence/></xs:complexType>
      </xs:element>
      <xs:element name="echo_in_headerResponse">
        <xs:complexType>
          <xs:sequence>
            <xs:element name="echo_in_headerResult" type="tns:InHeader" minOccurs="0" nillable="true"/>
          </xs:sequence>
        </xs:complexType>
      </xs:element>
      <xs:element name="InHeader" type="tns:InHeader"/>
      <xs:element name="echo_simple_bare" type="xs:string"/>
      <xs:element name="echo_simple_bareResponse" type="xs:string"/>
      <xs:element name="two_args">
        <xs:complexType>
          <xs:sequence>
            <xs:element name="a" type="xs:string"/>
            <xs:element name="b" type="xs:string"/>
          </xs:sequence>
        </xs:complexType>
      </xs:element>
    </xs:schema>
  </wsdl:types>
  <wsdl:message name="echo_extension_class"><wsdl:part name="echo_extension_class" element="tns:echo_extension_class"/></wsdl:message>
  <wsdl:message name="echo_extension_classResponse"><wsdl:part name="echo_extension_classResponse" element="tns:echo_extension_classResponse"/></wsdl:message>
  <wsdl:message name="echo_in_header"><wsdl:part name="echo_in_header" element="tns:echo_in_header"/></wsdl:message>
  <wsdl:message name="echo_in_headerResponse"><wsdl:part name="echo_in_headerResponse" element="tns:echo_in_headerResponse"/></wsdl:message>
  <wsdl:message name="InHeader"><wsdl:part name="InHeader" element="tns:InHeader"/></wsdl:message>
  <wsdl:message name="echo_simple_bare"><wsdl:part name="echo_simple_bare" element="tns:echo_simple_bare"/></wsdl:message>
  <wsdl:message name="echo_simple_bareResponse"><wsdl:part name="echo_simple_bareResponse" element="tns:echo_simple_bareResponse"/></wsdl:message>
  <wsdl:message name="two_args"><wsdl:part name="two_args" element="tns:two_args"/></wsdl:message>
  <wsdl:portType name="Application">
    <wsdl:operation name="echo_extension_class">
      <wsdl:input message="tns:echo_extension_class"/>
      <wsdl:output message="tns:echo_extension_classResponse"/>
    </wsdl:operation>
    <wsdl:operation name="echo_in_header">
      <wsdl:input message="tns:echo_in_header"/>
      <wsdl:output message="tns:echo_in_headerResponse"/>
    </wsdl:operation>
    <wsdl:operation name="echo_simple_bare">
      <wsdl:input message="tns:echo_simple_bare"/>
      <wsdl:output message="tns:echo_simple_bareResponse"/>
    </wsdl:operation>
    <wsdl:operation name="two_args">
      <wsdl:input message="tns:two_args"/>
    </wsdl:operation>
  </wsdl:portType>
  <wsdl:binding name="Application" type="tns:Application">
    <soap:binding style="document" transport="http://schemas.xmlsoap.org/soap/http"/>
    <wsdl:operation name="echo_in_header">
      <soap:operation soapAction="echo_in_header" style="document"/>
      <wsdl:input>
        <soap:body use="literal"/>
        <soap:header use="literal" message="tns:InHeader" part="InHeader"/>
      </wsdl:input>
      <wsdl:output><soap:body use="literal"/></wsdl:output>
    </wsdl:operation>
  </wsdl:binding>
</wsdl:definitions>"#;

    // ========================================================================
    // Types
    // ========================================================================

    #[test]
    fn test_extension_and_fields() {
        let registry = build(WSDL).unwrap();
        assert_eq!(registry.service_namespace(), "spyne.test.interop.server");
        let ext = QName::new("bar", "ExtensionClass");
        assert!(registry.is_derived_from(&ext, &QName::new("punk.tunk", "NestedClass")));

        let fields = registry.flatten(&ext).unwrap();
        let names: Vec<&str> = fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["i", "ai", "q"]);
        assert_eq!(fields[0].declared_on.namespace, "punk.tunk");
        assert_eq!(
            fields[1].type_ref,
            TypeRef::Named(QName::new("spyne.test.interop.server", "integerArray"))
        );
    }

    #[test]
    fn test_occurrence_and_nillable_facets() {
        let registry = build(WSDL).unwrap();
        let array = registry
            .get_type(&QName::new("spyne.test.interop.server", "integerArray"))
            .unwrap();
        assert!(array.fields()[0].repeated);
        assert!(array.fields()[0].nillable);

        let strict = registry
            .get_type(&QName::new("spyne.test.interop.server", "NonNillable"))
            .unwrap();
        assert!(!strict.fields()[0].nillable);
        assert!(!strict.fields()[0].repeated);
    }

    #[test]
    fn test_enumeration_and_skipped_types() {
        let registry = build(WSDL).unwrap();
        let days = registry
            .get_type(&QName::new("spyne.test.interop.server", "DaysOfWeekEnum"))
            .unwrap();
        assert_eq!(
            days.shape,
            TypeShape::Enumeration {
                values: vec!["Monday".to_string(), "Tuesday".to_string()]
            }
        );
        assert!(registry.get_type(&QName::new("spyne.test.interop.server", "Weird")).is_none());
    }

    // ========================================================================
    // Operations
    // ========================================================================

    #[test]
    fn test_wrapped_operation() {
        let registry = build(WSDL).unwrap();
        let op = registry.operation("echo_extension_class").unwrap();
        assert_eq!(op.style, BodyStyle::Wrapped);
        let input = op.input.as_ref().unwrap();
        assert_eq!(input.name, "ec");
        assert_eq!(input.type_ref, TypeRef::Named(QName::new("bar", "ExtensionClass")));
        assert_eq!(op.output.as_ref().unwrap().name, "echo_extension_classResult");
    }

    #[test]
    fn test_empty_input_with_header() {
        let registry = build(WSDL).unwrap();
        let op = registry.operation("echo_in_header").unwrap();
        assert_eq!(op.style, BodyStyle::Empty);
        assert!(op.input.is_none());
        assert_eq!(op.in_headers, vec![QName::new("spyne.test.interop.server", "InHeader")]);
        assert_eq!(op.output.as_ref().unwrap().name, "echo_in_headerResult");
    }

    #[test]
    fn test_bare_operation() {
        let registry = build(WSDL).unwrap();
        let op = registry.operation("echo_simple_bare").unwrap();
        assert_eq!(op.style, BodyStyle::Bare);
        assert_eq!(op.input.as_ref().unwrap().type_ref, TypeRef::Builtin(ScalarKind::String));
    }

    #[test]
    fn test_unsupported_operation_is_skipped() {
        let registry = build(WSDL).unwrap();
        assert!(registry.operation("two_args").is_none());
        assert_eq!(registry.operation_names().len(), 3);
    }

    #[test]
    fn test_not_a_wsdl() {
        assert!(matches!(build("<html/>"), Err(HarnessError::Wsdl(_))));
        assert!(matches!(build("<definitions"), Err(HarnessError::Wsdl(_))));
    }
}
