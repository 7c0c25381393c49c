// src/client/codec.rs
// SOAP 1.1 document/literal envelope encoding and decoding

use super::xml::{self, Element, SOAP_ENV_NS};
use super::{ClientError, OperationCall, Response};
use crate::schema::{
    BodyStyle, OperationDescriptor, Param, QName, ScalarKind, SchemaRegistry, TypeRef, TypeShape, XSI_NS,
};
use crate::utils::join_path;
use crate::value::{Integer, Record, Value};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use chrono::{FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use quick_xml::escape::escape;
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CodecError {
    /// The value violates the schema (nil in a non-nillable field, wrong kind, ...)
    #[error("validation error at {path}: {message}")]
    Validation { path: String, message: String },

    /// The document is not a well-formed message for this schema
    #[error("{0}")]
    Malformed(String),

    #[error("unknown operation '{0}'")]
    UnknownOperation(String),
}

fn invalid(path: &str, message: impl Into<String>) -> CodecError {
    CodecError::Validation {
        path: if path.is_empty() { "<root>".to_string() } else { path.to_string() },
        message: message.into(),
    }
}

fn malformed(message: impl Into<String>) -> CodecError {
    CodecError::Malformed(message.into())
}

/// Lexical form used when writing temporal values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemporalForm {
    /// Whole seconds; fractional parts are dropped
    Seconds,
    /// Full precision
    Full,
    /// Full precision with a trailing `Z` designator
    Zulu,
}

/// Decoded request or successful response
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub operation: String,
    pub body: Option<Value>,
    pub headers: Vec<Value>,
}

/// Decoded response: a message or a SOAP fault
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Message(Message),
    Fault {
        code: String,
        message: String,
        actor: Option<String>,
    },
}

/// Element names are written qualified (`elementFormDefault="qualified"`):
/// the service namespace is bound to `tns`, every other schema namespace to
/// `ns0`, `ns1`, ... in sorted order.
pub struct Codec<'a> {
    schema: &'a SchemaRegistry,
    temporal: TemporalForm,
    prefixes: BTreeMap<String, String>,
}

impl<'a> Codec<'a> {
    pub fn new(schema: &'a SchemaRegistry, temporal: TemporalForm) -> Self {
        let mut prefixes = BTreeMap::new();
        prefixes.insert(schema.service_namespace().to_string(), "tns".to_string());
        for namespace in schema.namespaces() {
            if !prefixes.contains_key(namespace) {
                let prefix = format!("ns{}", prefixes.len() - 1);
                prefixes.insert(namespace.to_string(), prefix);
            }
        }
        Self {
            schema,
            temporal,
            prefixes,
        }
    }

    /// Prefixed element name; names outside the schema's namespaces stay unqualified
    fn tag(&self, namespace: &str, local: &str) -> String {
        match self.prefixes.get(namespace) {
            Some(prefix) => format!("{}:{}", prefix, local),
            None => local.to_string(),
        }
    }

    fn service_tag(&self, local: &str) -> String {
        self.tag(self.schema.service_namespace(), local)
    }

    fn envelope(&self, headers: &str, body: &str) -> String {
        let bindings: String = self
            .prefixes
            .iter()
            .map(|(namespace, prefix)| format!(" xmlns:{}=\"{}\"", prefix, escape(namespace.as_str())))
            .collect();
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?><soap:Envelope xmlns:soap="{}" xmlns:xsi="{}"{}><soap:Header>{}</soap:Header><soap:Body>{}</soap:Body></soap:Envelope>"#,
            SOAP_ENV_NS, XSI_NS, bindings, headers, body
        )
    }

    // ========================================================================
    // Client side
    // ========================================================================

    /// Request envelope for one call; schema violations surface as validation errors
    pub fn request_for(&self, op: &OperationDescriptor, call: &OperationCall) -> Result<String, ClientError> {
        self.encode_request(op, call.argument.as_ref(), &call.headers)
            .map_err(|e| match e {
                CodecError::Validation { path, message } => ClientError::Validation { path, message },
                other => ClientError::Protocol(other.to_string()),
            })
    }

    /// Decode the response envelope of one call
    pub fn response_from(&self, op: &OperationDescriptor, xml_text: &str) -> Result<Response, ClientError> {
        match self.decode_response(op, xml_text) {
            Ok(Reply::Message(message)) => Ok(Response {
                body: message.body,
                headers: message.headers,
            }),
            Ok(Reply::Fault { code, message, actor }) => Err(ClientError::Fault { code, message, actor }),
            Err(e) => Err(ClientError::MalformedResponse(e.to_string())),
        }
    }

    // ========================================================================
    // Encoding
    // ========================================================================

    pub fn encode_request(
        &self,
        op: &OperationDescriptor,
        argument: Option<&Value>,
        headers: &[Value],
    ) -> Result<String, CodecError> {
        if argument.is_some() && op.input.is_none() {
            return Err(invalid(&op.name, "operation takes no argument"));
        }
        let headers = self.write_headers(headers, &op.in_headers)?;
        let body = self.write_body(&op.name, op.style, op.input.as_ref(), argument)?;
        Ok(self.envelope(&headers, &body))
    }

    pub fn encode_response(
        &self,
        op: &OperationDescriptor,
        result: Option<&Value>,
        headers: &[Value],
    ) -> Result<String, CodecError> {
        let headers = self.write_headers(headers, &op.out_headers)?;
        let body = self.write_body(
            &format!("{}Response", op.name),
            response_style(op.style),
            op.output.as_ref(),
            result,
        )?;
        Ok(self.envelope(&headers, &body))
    }

    /// Response whose single result carries `text` verbatim, bypassing type checks
    pub fn encode_raw_response(&self, op: &OperationDescriptor, text: &str) -> String {
        let tag = self.service_tag(&format!("{}Response", op.name));
        let body = match (&op.output, response_style(op.style)) {
            (Some(param), BodyStyle::Wrapped) => format!(
                "<{tag}><{p}>{text}</{p}></{tag}>",
                tag = tag,
                p = self.service_tag(&param.name),
                text = escape(text)
            ),
            _ => format!("<{tag}>{text}</{tag}>", tag = tag, text = escape(text)),
        };
        self.envelope("", &body)
    }

    pub fn encode_fault(&self, code: &str, message: &str, actor: Option<&str>) -> String {
        let actor = actor
            .map(|a| format!("<faultactor>{}</faultactor>", escape(a)))
            .unwrap_or_default();
        let body = format!(
            "<soap:Fault><faultcode>{}</faultcode><faultstring>{}</faultstring>{}</soap:Fault>",
            escape(code),
            escape(message),
            actor
        );
        self.envelope("", &body)
    }

    fn write_headers(&self, headers: &[Value], allowed: &[QName]) -> Result<String, CodecError> {
        let mut out = String::new();
        for header in headers {
            let Value::Record(record) = header else {
                return Err(invalid("Header", format!("header must be a record, got {}", header.summary())));
            };
            if !allowed.contains(&record.type_name) {
                return Err(invalid(
                    "Header",
                    format!("{} is not a header of this operation", record.type_name),
                ));
            }
            let tag = self.tag(&record.type_name.namespace, &record.type_name.local);
            self.write_element(
                &mut out,
                &tag,
                &TypeRef::Named(record.type_name.clone()),
                header,
                &record.type_name.local,
            )?;
        }
        Ok(out)
    }

    fn write_body(
        &self,
        element: &str,
        style: BodyStyle,
        param: Option<&Param>,
        value: Option<&Value>,
    ) -> Result<String, CodecError> {
        let tag = self.service_tag(element);
        let (Some(param), Some(value), false) = (param, value, style == BodyStyle::Empty) else {
            return Ok(format!("<{}/>", tag));
        };

        let mut out = String::new();
        match style {
            BodyStyle::Bare if !param.repeated => {
                self.write_element(&mut out, &tag, &param.type_ref, value, &param.name)?;
            }
            _ => {
                out.push_str(&format!("<{}>", tag));
                let part = self.service_tag(&param.name);
                self.write_slot(&mut out, &part, &param.type_ref, param.repeated, value, &param.name)?;
                out.push_str(&format!("</{}>", tag));
            }
        }
        Ok(out)
    }

    fn write_slot(
        &self,
        out: &mut String,
        tag: &str,
        type_ref: &TypeRef,
        repeated: bool,
        value: &Value,
        path: &str,
    ) -> Result<(), CodecError> {
        if !repeated {
            return self.write_element(out, tag, type_ref, value, path);
        }
        match value {
            Value::Null => Ok(()),
            Value::Array(items) => items.iter().enumerate().try_for_each(|(i, item)| {
                self.write_element(out, tag, type_ref, item, &join_path(path, &i.to_string()))
            }),
            other => Err(invalid(path, format!("expected an array, got {}", other.summary()))),
        }
    }

    fn write_element(
        &self,
        out: &mut String,
        tag: &str,
        type_ref: &TypeRef,
        value: &Value,
        path: &str,
    ) -> Result<(), CodecError> {
        if value.is_null() {
            out.push_str(&format!("<{} xsi:nil=\"true\"/>", tag));
            return Ok(());
        }

        let declared = match type_ref {
            TypeRef::Builtin(kind) => {
                let text = self.scalar_text(*kind, value, path)?;
                out.push_str(&format!("<{tag}>{text}</{tag}>", tag = tag, text = text));
                return Ok(());
            }
            TypeRef::Named(name) => self
                .schema
                .get_type(name)
                .ok_or_else(|| invalid(path, format!("{} is not in the schema", name)))?,
        };

        match &declared.shape {
            TypeShape::Scalar(kind) => {
                let text = self.scalar_text(*kind, value, path)?;
                out.push_str(&format!("<{tag}>{text}</{tag}>", tag = tag, text = text));
            }
            TypeShape::Enumeration { values } => match value {
                Value::String(literal) if values.contains(literal) => {
                    out.push_str(&format!("<{tag}>{text}</{tag}>", tag = tag, text = escape(literal.as_str())));
                }
                other => {
                    return Err(invalid(
                        path,
                        format!("{} is not a valid {}", other.summary(), declared.name),
                    ));
                }
            },
            TypeShape::Record { .. } => {
                let Value::Record(record) = value else {
                    return Err(invalid(path, format!("expected {}, got {}", declared.name, value.summary())));
                };
                self.write_record(out, tag, &declared.name, record, path)?;
            }
        }
        Ok(())
    }

    fn write_record(
        &self,
        out: &mut String,
        tag: &str,
        declared: &QName,
        record: &Record,
        path: &str,
    ) -> Result<(), CodecError> {
        if !self.schema.is_derived_from(&record.type_name, declared) {
            return Err(invalid(
                path,
                format!("{} cannot stand in for {}", record.type_name, declared),
            ));
        }
        let fields = self
            .schema
            .flatten(&record.type_name)
            .ok_or_else(|| invalid(path, format!("{} is not in the schema", record.type_name)))?;
        if let Some(unknown) = record.fields.keys().find(|name| !fields.iter().any(|f| &f.name == *name)) {
            return Err(invalid(
                &join_path(path, unknown),
                format!("{} has no field '{}'", record.type_name, unknown),
            ));
        }

        out.push('<');
        out.push_str(tag);
        if &record.type_name != declared {
            match self.prefixes.get(&record.type_name.namespace) {
                Some(prefix) => out.push_str(&format!(" xsi:type=\"{}:{}\"", prefix, record.type_name.local)),
                None => out.push_str(&format!(
                    " xmlns:ext=\"{}\" xsi:type=\"ext:{}\"",
                    escape(record.type_name.namespace.as_str()),
                    record.type_name.local
                )),
            }
        }
        out.push('>');

        for field in &fields {
            let field_path = join_path(path, &field.name);
            match record.fields.get(&field.name) {
                None | Some(Value::Null) if !field.nillable && !field.repeated => {
                    return Err(invalid(&field_path, "non-nillable field is not set"));
                }
                None => {}
                Some(value) => {
                    let field_tag = self.tag(&field.declared_on.namespace, &field.name);
                    self.write_slot(out, &field_tag, &field.type_ref, field.repeated, value, &field_path)?;
                }
            }
        }

        out.push_str(&format!("</{}>", tag));
        Ok(())
    }

    fn scalar_text(&self, kind: ScalarKind, value: &Value, path: &str) -> Result<String, CodecError> {
        let suffix = if self.temporal == TemporalForm::Zulu { "Z" } else { "" };
        let fraction = if self.temporal == TemporalForm::Seconds { "" } else { "%.f" };
        let text = match (kind, value) {
            (ScalarKind::Integer, Value::Integer(n)) => n.to_string(),
            (ScalarKind::String, Value::String(s)) => escape(s.as_str()).into_owned(),
            (ScalarKind::Boolean, Value::Boolean(b)) => b.to_string(),
            (ScalarKind::Float, Value::Float(f)) => format_float(*f),
            (ScalarKind::Date, Value::Date(d)) => format!("{}{}", d.format("%Y-%m-%d"), suffix),
            (ScalarKind::Time, Value::Time(t)) => {
                format!("{}{}", t.format(&format!("%H:%M:%S{}", fraction)), suffix)
            }
            (ScalarKind::DateTime, Value::DateTime(dt)) => {
                format!("{}{}", dt.format(&format!("%Y-%m-%dT%H:%M:%S{}", fraction)), suffix)
            }
            (ScalarKind::Bytes, Value::Bytes(bytes)) => STANDARD.encode(bytes),
            (kind, other) => {
                return Err(invalid(path, format!("expected {}, got {}", kind, other.summary())));
            }
        };
        Ok(text)
    }

    // ========================================================================
    // Decoding
    // ========================================================================

    fn open_envelope(xml_text: &str) -> Result<Element, CodecError> {
        let root = xml::parse(xml_text).map_err(CodecError::Malformed)?;
        if root.local != "Envelope" || root.namespace.as_deref() != Some(SOAP_ENV_NS) {
            return Err(malformed(format!("expected a SOAP envelope, found <{}>", root.local)));
        }
        Ok(root)
    }

    fn body_payload(envelope: &Element) -> Result<&Element, CodecError> {
        let body = envelope
            .child("Body")
            .ok_or_else(|| malformed("envelope has no Body"))?;
        body.children
            .first()
            .ok_or_else(|| malformed("Body is empty"))
    }

    pub fn decode_request(&self, xml_text: &str) -> Result<Message, CodecError> {
        let envelope = Self::open_envelope(xml_text)?;
        let payload = Self::body_payload(&envelope)?;
        let op = self
            .schema
            .operation(&payload.local)
            .ok_or_else(|| CodecError::UnknownOperation(payload.local.clone()))?;

        let headers = self.read_headers(&envelope, &op.in_headers)?;
        let body = self.read_body(payload, op.style, op.input.as_ref())?;
        Ok(Message {
            operation: op.name.clone(),
            body,
            headers,
        })
    }

    pub fn decode_response(&self, op: &OperationDescriptor, xml_text: &str) -> Result<Reply, CodecError> {
        let envelope = Self::open_envelope(xml_text)?;
        let payload = Self::body_payload(&envelope)?;

        if payload.local == "Fault" && in_namespace(payload, SOAP_ENV_NS) {
            let text = |name: &str| payload.child(name).map(|c| c.text.trim().to_string());
            return Ok(Reply::Fault {
                code: text("faultcode").unwrap_or_default(),
                message: text("faultstring").unwrap_or_default(),
                actor: text("faultactor"),
            });
        }

        let expected = format!("{}Response", op.name);
        if payload.local != expected {
            return Err(malformed(format!("expected <{}>, found <{}>", expected, payload.local)));
        }

        let headers = self.read_headers(&envelope, &op.out_headers)?;
        let body = self.read_body(payload, response_style(op.style), op.output.as_ref())?;
        Ok(Reply::Message(Message {
            operation: op.name.clone(),
            body,
            headers,
        }))
    }

    fn read_headers(&self, envelope: &Element, allowed: &[QName]) -> Result<Vec<Value>, CodecError> {
        let Some(header) = envelope.child("Header") else {
            return Ok(Vec::new());
        };
        header
            .children
            .iter()
            .map(|entry| {
                let type_name = allowed
                    .iter()
                    .find(|name| name.local == entry.local && entry.namespace.as_deref() == Some(name.namespace.as_str()))
                    .ok_or_else(|| {
                        let namespace = entry.namespace.as_deref().unwrap_or("");
                        malformed(format!("unexpected header {{{}}}{}", namespace, entry.local))
                    })?;
                self.read_element(entry, &TypeRef::Named(type_name.clone()), &entry.local)
            })
            .collect()
    }

    fn read_body(
        &self,
        payload: &Element,
        style: BodyStyle,
        param: Option<&Param>,
    ) -> Result<Option<Value>, CodecError> {
        let Some(param) = param else { return Ok(None) };
        match style {
            BodyStyle::Empty => Ok(None),
            BodyStyle::Bare if !param.repeated => {
                if payload.children.is_empty() && payload.text.is_empty() && !payload.is_nil() {
                    return Ok(None);
                }
                self.read_element(payload, &param.type_ref, &param.name).map(Some)
            }
            _ => {
                let service_ns = self.schema.service_namespace();
                let parts: Vec<&Element> = payload
                    .children_named(&param.name)
                    .filter(|part| in_namespace(part, service_ns))
                    .collect();
                if param.repeated {
                    return parts
                        .iter()
                        .enumerate()
                        .map(|(i, part)| {
                            self.read_element(part, &param.type_ref, &join_path(&param.name, &i.to_string()))
                        })
                        .collect::<Result<Vec<_>, _>>()
                        .map(|items| Some(Value::Array(items)));
                }
                match parts.as_slice() {
                    [] => Ok(None),
                    [part] => self.read_element(part, &param.type_ref, &param.name).map(Some),
                    _ => Err(malformed(format!("'{}' appears more than once", param.name))),
                }
            }
        }
    }

    fn read_element(&self, element: &Element, type_ref: &TypeRef, path: &str) -> Result<Value, CodecError> {
        if element.is_nil() {
            return Ok(Value::Null);
        }
        let declared = match type_ref {
            TypeRef::Builtin(kind) => return parse_scalar(*kind, &element.text, path),
            TypeRef::Named(name) => self
                .schema
                .get_type(name)
                .ok_or_else(|| malformed(format!("{} is not in the schema", name)))?,
        };

        match &declared.shape {
            TypeShape::Scalar(kind) => parse_scalar(*kind, &element.text, path),
            TypeShape::Enumeration { values } => {
                let literal = element.text.trim();
                if values.iter().any(|v| v == literal) {
                    Ok(Value::String(literal.to_string()))
                } else {
                    Err(malformed(format!("{}: '{}' is not a valid {}", path, literal, declared.name)))
                }
            }
            TypeShape::Record { .. } => self.read_record(element, &declared.name, path),
        }
    }

    fn read_record(&self, element: &Element, declared: &QName, path: &str) -> Result<Value, CodecError> {
        let concrete = match element.attribute(XSI_NS, "type") {
            Some(lexical) => {
                let name = element
                    .resolve_qname(lexical)
                    .ok_or_else(|| malformed(format!("{}: unbound prefix in xsi:type '{}'", path, lexical)))?;
                if !self.schema.is_derived_from(&name, declared) {
                    return Err(malformed(format!("{}: {} does not extend {}", path, name, declared)));
                }
                name
            }
            None => declared.clone(),
        };
        let fields = self
            .schema
            .flatten(&concrete)
            .ok_or_else(|| malformed(format!("{} is not in the schema", concrete)))?;

        let mut record = Record::new(concrete.clone());
        for child in &element.children {
            let field = fields
                .iter()
                .find(|f| f.name == child.local && in_namespace(child, &f.declared_on.namespace))
                .ok_or_else(|| malformed(format!("{}: unexpected element <{}>", path, child.local)))?;
            let field_path = join_path(path, &field.name);
            if field.repeated {
                let index = match record.fields.get(&field.name) {
                    Some(Value::Array(items)) => items.len(),
                    _ => 0,
                };
                let item = self.read_element(child, &field.type_ref, &join_path(&field_path, &index.to_string()))?;
                match record
                    .fields
                    .entry(field.name.clone())
                    .or_insert_with(|| Value::Array(Vec::new()))
                {
                    Value::Array(items) => items.push(item),
                    slot => *slot = Value::Array(vec![item]),
                }
            } else {
                if record.fields.contains_key(&field.name) {
                    return Err(malformed(format!("{}: '{}' appears more than once", path, field.name)));
                }
                let value = self.read_element(child, &field.type_ref, &field_path)?;
                record.fields.insert(field.name.clone(), value);
            }
        }

        for field in &fields {
            if field.repeated {
                record
                    .fields
                    .entry(field.name.clone())
                    .or_insert_with(|| Value::Array(Vec::new()));
            } else if !field.nillable && record.fields.get(&field.name).is_none_or(Value::is_null) {
                return Err(invalid(&join_path(path, &field.name), "non-nillable field is not set"));
            }
        }
        Ok(Value::Record(record))
    }
}

/// True for elements in `namespace`, or unqualified ones
fn in_namespace(element: &Element, namespace: &str) -> bool {
    element.namespace.as_deref().is_none_or(|ns| ns == namespace)
}

/// Operations without input still answer with a wrapped result
fn response_style(style: BodyStyle) -> BodyStyle {
    match style {
        BodyStyle::Empty => BodyStyle::Wrapped,
        other => other,
    }
}

fn format_float(f: f64) -> String {
    if f.is_nan() {
        "NaN".to_string()
    } else if f.is_infinite() {
        if f > 0.0 { "INF".to_string() } else { "-INF".to_string() }
    } else {
        f.to_string()
    }
}

fn parse_scalar(kind: ScalarKind, text: &str, path: &str) -> Result<Value, CodecError> {
    let bad = || malformed(format!("{}: '{}' is not a valid {}", path, crate::utils::truncate(text, 32), kind));
    if kind == ScalarKind::String {
        return Ok(Value::String(text.to_string()));
    }

    let trimmed = text.trim();
    let (temporal, offset) = split_zone(trimmed);
    let value = match kind {
        ScalarKind::Integer => Value::Integer(Integer::parse(trimmed).ok_or_else(bad)?),
        ScalarKind::Boolean => match trimmed {
            "true" | "1" => Value::Boolean(true),
            "false" | "0" => Value::Boolean(false),
            _ => return Err(bad()),
        },
        ScalarKind::Float => Value::Float(match trimmed {
            "INF" => f64::INFINITY,
            "-INF" => f64::NEG_INFINITY,
            "NaN" => f64::NAN,
            other => other.parse().map_err(|_| bad())?,
        }),
        // A date keeps its calendar day whatever the zone
        ScalarKind::Date => Value::Date(NaiveDate::parse_from_str(temporal, "%Y-%m-%d").map_err(|_| bad())?),
        ScalarKind::Time => {
            let local = NaiveTime::parse_from_str(temporal, "%H:%M:%S%.f").map_err(|_| bad())?;
            let offset = offset.ok_or_else(bad)?;
            Value::Time(local - TimeDelta::seconds(i64::from(offset.local_minus_utc())))
        }
        ScalarKind::DateTime => {
            let local = NaiveDateTime::parse_from_str(temporal, "%Y-%m-%dT%H:%M:%S%.f").map_err(|_| bad())?;
            let offset = offset.ok_or_else(bad)?;
            let utc = local.checked_sub_signed(TimeDelta::seconds(i64::from(offset.local_minus_utc())));
            Value::DateTime(utc.ok_or_else(bad)?)
        }
        ScalarKind::Bytes => Value::Bytes(STANDARD.decode(trimmed).map_err(|_| bad())?),
        ScalarKind::String => Value::String(text.to_string()),
    };
    Ok(value)
}

/// Split an xsd timezone suffix (`Z`, `+hh:mm`, `-hh:mm`) off a temporal
/// literal. No suffix means UTC. The offset is `None` when the suffix is
/// out of range.
fn split_zone(text: &str) -> (&str, Option<FixedOffset>) {
    if let Some(rest) = text.strip_suffix('Z') {
        return (rest, FixedOffset::east_opt(0));
    }
    let bytes = text.as_bytes();
    let n = bytes.len();
    if n < 6 || !matches!(bytes[n - 6], b'+' | b'-') || bytes[n - 3] != b':' {
        return (text, FixedOffset::east_opt(0));
    }
    let (rest, zone) = text.split_at(n - 6);
    let digits = |range: std::ops::Range<usize>| -> Option<i32> {
        let part = zone.get(range)?;
        if part.bytes().all(|b| b.is_ascii_digit()) { part.parse().ok() } else { None }
    };
    let (Some(hours), Some(minutes)) = (digits(1..3), digits(4..6)) else {
        return (rest, None);
    };
    if hours > 14 || minutes > 59 {
        return (rest, None);
    }
    let seconds = (hours * 60 + minutes) * 60;
    let offset = if bytes[n - 6] == b'-' {
        FixedOffset::west_opt(seconds)
    } else {
        FixedOffset::east_opt(seconds)
    };
    (rest, offset)
}
