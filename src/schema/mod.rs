// src/schema/mod.rs
// Schema model: qualified names, type descriptors and operation signatures

pub mod locator;

pub use locator::TypeLocator;

use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use std::fmt;

/// XML Schema instance namespace (xsi:nil, xsi:type)
pub const XSI_NS: &str = "http://www.w3.org/2001/XMLSchema-instance";

/// XML Schema namespace for built-in types
pub const XS_NS: &str = "http://www.w3.org/2001/XMLSchema";

/// Namespace-qualified type name, rendered in Clark notation `{ns}local`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct QName {
    pub namespace: String,
    pub local: String,
}

impl QName {
    pub fn new(namespace: impl Into<String>, local: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            local: local.into(),
        }
    }

    /// Parse `{namespace}local`; a bare name gets an empty namespace
    pub fn parse(s: &str) -> Option<Self> {
        match s.strip_prefix('{') {
            Some(rest) => {
                let (ns, local) = rest.split_once('}')?;
                if local.is_empty() {
                    return None;
                }
                Some(Self::new(ns, local))
            }
            None if !s.is_empty() => Some(Self::new("", s)),
            None => None,
        }
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}}}{}", self.namespace, self.local)
    }
}

/// Built-in scalar kinds the harness knows how to compare
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalarKind {
    Integer,
    String,
    Boolean,
    Float,
    Date,
    Time,
    DateTime,
    Bytes,
}

impl ScalarKind {
    /// Date, time and datetime share the sub-second tolerance rule
    pub fn is_temporal(self) -> bool {
        matches!(self, Self::Date | Self::Time | Self::DateTime)
    }

    /// XML Schema local name for this kind
    pub fn xsd_name(self) -> &'static str {
        match self {
            Self::Integer => "integer",
            Self::String => "string",
            Self::Boolean => "boolean",
            Self::Float => "double",
            Self::Date => "date",
            Self::Time => "time",
            Self::DateTime => "dateTime",
            Self::Bytes => "base64Binary",
        }
    }

    /// Map an XML Schema built-in local name to a kind
    pub fn from_xsd_name(name: &str) -> Option<Self> {
        match name {
            "integer" | "int" | "long" | "short" | "byte" | "nonNegativeInteger"
            | "positiveInteger" | "unsignedInt" | "unsignedLong" => Some(Self::Integer),
            "string" | "normalizedString" | "token" | "anyURI" => Some(Self::String),
            "boolean" => Some(Self::Boolean),
            "float" | "double" | "decimal" => Some(Self::Float),
            "date" => Some(Self::Date),
            "time" => Some(Self::Time),
            "dateTime" => Some(Self::DateTime),
            "base64Binary" => Some(Self::Bytes),
            _ => None,
        }
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.xsd_name())
    }
}

/// Reference from a field or parameter to its type
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum TypeRef {
    Builtin(ScalarKind),
    Named(QName),
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Builtin(kind) => write!(f, "xs:{}", kind),
            TypeRef::Named(name) => write!(f, "{}", name),
        }
    }
}

/// One element of a record type
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldDescriptor {
    pub name: String,
    pub type_ref: TypeRef,
    /// `false` means an absent or nil value is a validation error
    pub nillable: bool,
    /// maxOccurs > 1; the value is an ordered array
    pub repeated: bool,
    /// Type that declared the field (differs from the owner for inherited fields)
    pub declared_on: QName,
}

impl FieldDescriptor {
    pub fn new(declared_on: &QName, name: &str, type_ref: TypeRef) -> Self {
        Self {
            name: name.to_string(),
            type_ref,
            nillable: true,
            repeated: false,
            declared_on: declared_on.clone(),
        }
    }

    pub fn non_nillable(mut self) -> Self {
        self.nillable = false;
        self
    }

    pub fn repeated(mut self) -> Self {
        self.repeated = true;
        self
    }
}

/// Structural shape of a named schema type
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum TypeShape {
    /// Simple type restricting a built-in without enumeration facets
    Scalar(ScalarKind),
    /// String restriction with a closed set of literals
    Enumeration { values: Vec<String> },
    /// Complex type; `base` is set for complexContent extensions
    Record {
        base: Option<QName>,
        fields: Vec<FieldDescriptor>,
    },
}

/// A constructible schema type
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeDescriptor {
    pub name: QName,
    pub shape: TypeShape,
}

impl TypeDescriptor {
    pub fn scalar(name: QName, kind: ScalarKind) -> Self {
        Self {
            name,
            shape: TypeShape::Scalar(kind),
        }
    }

    pub fn enumeration(name: QName, values: &[&str]) -> Self {
        Self {
            name,
            shape: TypeShape::Enumeration {
                values: values.iter().map(|v| v.to_string()).collect(),
            },
        }
    }

    pub fn record(name: QName, base: Option<QName>, fields: Vec<FieldDescriptor>) -> Self {
        Self {
            name,
            shape: TypeShape::Record { base, fields },
        }
    }

    pub fn is_record(&self) -> bool {
        matches!(self.shape, TypeShape::Record { .. })
    }

    pub fn base(&self) -> Option<&QName> {
        match &self.shape {
            TypeShape::Record { base, .. } => base.as_ref(),
            _ => None,
        }
    }

    /// Fields of a record descriptor (empty for simple types)
    pub fn fields(&self) -> &[FieldDescriptor] {
        match &self.shape {
            TypeShape::Record { fields, .. } => fields,
            _ => &[],
        }
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields().iter().find(|f| f.name == name)
    }
}

/// How an operation lays out its message body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyStyle {
    /// Arguments wrapped in an element named after the operation
    #[default]
    Wrapped,
    /// The single argument is the body element itself
    Bare,
    /// No body payload
    Empty,
}

/// Input or output part of an operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Param {
    pub name: String,
    pub type_ref: TypeRef,
    pub repeated: bool,
}

impl Param {
    pub fn new(name: &str, type_ref: TypeRef) -> Self {
        Self {
            name: name.to_string(),
            type_ref,
            repeated: false,
        }
    }

    pub fn repeated(mut self) -> Self {
        self.repeated = true;
        self
    }
}

/// Signature of a published operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OperationDescriptor {
    pub name: String,
    pub style: BodyStyle,
    pub input: Option<Param>,
    pub output: Option<Param>,
    /// Header types the operation accepts
    pub in_headers: Vec<QName>,
    /// Header types the operation returns
    pub out_headers: Vec<QName>,
}

impl OperationDescriptor {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            style: BodyStyle::Wrapped,
            input: None,
            output: None,
            in_headers: Vec::new(),
            out_headers: Vec::new(),
        }
    }

    pub fn input(mut self, param: Param) -> Self {
        self.input = Some(param);
        self
    }

    pub fn output(mut self, param: Param) -> Self {
        self.output = Some(param);
        self
    }

    pub fn style(mut self, style: BodyStyle) -> Self {
        self.style = style;
        self
    }

    pub fn in_header(mut self, name: QName) -> Self {
        self.in_headers.push(name);
        self
    }

    pub fn out_header(mut self, name: QName) -> Self {
        self.out_headers.push(name);
        self
    }
}

/// Published schema of one service: named types plus operations.
///
/// Types are stored as declared (own fields only); `flatten` walks the
/// extension chain when a consumer needs the full field list.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    service_namespace: String,
    types: HashMap<QName, TypeDescriptor>,
    operations: HashMap<String, OperationDescriptor>,
}

impl SchemaRegistry {
    pub fn new(service_namespace: impl Into<String>) -> Self {
        Self {
            service_namespace: service_namespace.into(),
            types: HashMap::new(),
            operations: HashMap::new(),
        }
    }

    pub fn service_namespace(&self) -> &str {
        &self.service_namespace
    }

    pub fn add_type(&mut self, descriptor: TypeDescriptor) {
        self.types.insert(descriptor.name.clone(), descriptor);
    }

    pub fn add_operation(&mut self, operation: OperationDescriptor) {
        self.operations.insert(operation.name.clone(), operation);
    }

    pub fn get_type(&self, name: &QName) -> Option<&TypeDescriptor> {
        self.types.get(name)
    }

    pub fn operation(&self, name: &str) -> Option<&OperationDescriptor> {
        self.operations.get(name)
    }

    /// Operation names, sorted
    pub fn operation_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.operations.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Namespaces that declare at least one type, sorted
    pub fn namespaces(&self) -> BTreeSet<&str> {
        self.types.keys().map(|name| name.namespace.as_str()).collect()
    }

    pub fn type_count(&self) -> usize {
        self.types.len()
    }

    /// Full field list of a record type, inherited fields first.
    ///
    /// Returns `None` when the type or any base in its chain is unknown, or
    /// when the chain loops back on itself.
    pub fn flatten(&self, name: &QName) -> Option<Vec<FieldDescriptor>> {
        let mut chain = Vec::new();
        let mut current = Some(name);
        while let Some(type_name) = current {
            if chain.iter().any(|d: &&TypeDescriptor| &d.name == type_name) {
                return None;
            }
            let descriptor = self.types.get(type_name)?;
            chain.push(descriptor);
            current = descriptor.base();
        }

        let mut fields = Vec::new();
        for descriptor in chain.iter().rev() {
            fields.extend(descriptor.fields().iter().cloned());
        }
        Some(fields)
    }

    /// True when `derived` equals `base` or extends it (transitively)
    pub fn is_derived_from(&self, derived: &QName, base: &QName) -> bool {
        let mut current = Some(derived);
        let mut hops = 0;
        while let Some(name) = current {
            if name == base {
                return true;
            }
            hops += 1;
            if hops > self.types.len() {
                return false;
            }
            current = self.types.get(name).and_then(TypeDescriptor::base);
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_registry() -> SchemaRegistry {
        let base = QName::new("a", "Base");
        let derived = QName::new("b", "Derived");
        let mut registry = SchemaRegistry::new("a");
        registry.add_type(TypeDescriptor::record(
            base.clone(),
            None,
            vec![FieldDescriptor::new(&base, "i", TypeRef::Builtin(ScalarKind::Integer))],
        ));
        registry.add_type(TypeDescriptor::record(
            derived.clone(),
            Some(base.clone()),
            vec![FieldDescriptor::new(&derived, "q", TypeRef::Builtin(ScalarKind::String))],
        ));
        registry
    }

    #[test]
    fn test_qname_parse_clark_notation() {
        let name = QName::parse("{spyne.test.interop.server}SimpleClass").unwrap();
        assert_eq!(name.namespace, "spyne.test.interop.server");
        assert_eq!(name.local, "SimpleClass");
        assert_eq!(name.to_string(), "{spyne.test.interop.server}SimpleClass");
    }

    #[test]
    fn test_qname_parse_rejects_malformed() {
        assert!(QName::parse("{ns").is_none());
        assert!(QName::parse("{ns}").is_none());
        assert!(QName::parse("").is_none());
        assert_eq!(QName::parse("bare").unwrap().namespace, "");
    }

    #[test]
    fn test_flatten_puts_inherited_fields_first() {
        let registry = sample_registry();
        let fields = registry.flatten(&QName::new("b", "Derived")).unwrap();
        let names: Vec<&str> = fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["i", "q"]);
        assert_eq!(fields[0].declared_on, QName::new("a", "Base"));
    }

    #[test]
    fn test_flatten_unknown_base_is_none() {
        let mut registry = SchemaRegistry::new("a");
        let orphan = QName::new("a", "Orphan");
        registry.add_type(TypeDescriptor::record(
            orphan.clone(),
            Some(QName::new("a", "Missing")),
            Vec::new(),
        ));
        assert!(registry.flatten(&orphan).is_none());
    }

    #[test]
    fn test_is_derived_from() {
        let registry = sample_registry();
        let base = QName::new("a", "Base");
        let derived = QName::new("b", "Derived");
        assert!(registry.is_derived_from(&derived, &base));
        assert!(registry.is_derived_from(&base, &base));
        assert!(!registry.is_derived_from(&base, &derived));
    }

    #[test]
    fn test_namespaces_are_sorted_and_unique() {
        let registry = sample_registry();
        assert_eq!(registry.namespaces().into_iter().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn test_scalar_kind_xsd_names() {
        assert_eq!(ScalarKind::from_xsd_name("int"), Some(ScalarKind::Integer));
        assert_eq!(ScalarKind::from_xsd_name("dateTime"), Some(ScalarKind::DateTime));
        assert_eq!(ScalarKind::from_xsd_name("anyType"), None);
        assert!(ScalarKind::Time.is_temporal());
        assert!(!ScalarKind::Float.is_temporal());
    }
}
