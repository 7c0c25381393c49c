// src/builder.rs
// Value Builder - turns declarative fixtures into schema-shaped value trees

use crate::error::{HarnessError, Result};
use crate::schema::locator::Resolved;
use crate::schema::{FieldDescriptor, QName, ScalarKind, TypeDescriptor, TypeLocator, TypeRef, TypeShape};
use crate::utils::join_path;
use crate::value::{Integer, Record, Value};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use std::sync::Arc;

/// Default bound on record nesting while building
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// Declarative description of the value a scenario wants to send
#[derive(Debug, Clone, PartialEq)]
pub enum Fixture {
    /// Nil / terminating sentinel
    Null,
    /// Literal scalar
    Scalar(Value),
    /// Record of the declared type
    Record(Vec<(String, Fixture)>),
    /// Record of an explicit (usually derived) type
    Typed {
        type_name: QName,
        fields: Vec<(String, Fixture)>,
    },
    /// Ordered elements of a repeated field or parameter
    List(Vec<Fixture>),
}

impl Fixture {
    pub fn record<I, K>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, Fixture)>,
        K: Into<String>,
    {
        Fixture::Record(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn typed<I, K>(type_name: QName, fields: I) -> Self
    where
        I: IntoIterator<Item = (K, Fixture)>,
        K: Into<String>,
    {
        Fixture::Typed {
            type_name,
            fields: fields.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    pub fn list<I, T>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Fixture>,
    {
        Fixture::List(items.into_iter().map(Into::into).collect())
    }

    fn describe(&self) -> &'static str {
        match self {
            Fixture::Null => "null",
            Fixture::Scalar(_) => "scalar",
            Fixture::Record(_) => "record",
            Fixture::Typed { .. } => "typed record",
            Fixture::List(_) => "list",
        }
    }
}

macro_rules! fixture_from_scalar {
    ($($t:ty),* $(,)?) => {
        $(
            impl From<$t> for Fixture {
                fn from(v: $t) -> Self {
                    Fixture::Scalar(Value::from(v))
                }
            }
        )*
    };
}

fixture_from_scalar!(
    i64,
    i32,
    Integer,
    &str,
    String,
    bool,
    f64,
    NaiveDate,
    NaiveTime,
    NaiveDateTime,
    Vec<u8>,
);

impl From<Value> for Fixture {
    fn from(v: Value) -> Self {
        match v {
            Value::Null => Fixture::Null,
            other => Fixture::Scalar(other),
        }
    }
}

/// Builds value trees against descriptors resolved by a [`TypeLocator`]
pub struct ValueBuilder<'a> {
    locator: &'a TypeLocator,
    max_depth: usize,
}

impl<'a> ValueBuilder<'a> {
    pub fn new(locator: &'a TypeLocator) -> Self {
        Self {
            locator,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Zero-valued instance: an empty record, or null for simple types
    pub fn empty(&self, descriptor: &TypeDescriptor) -> Value {
        if descriptor.is_record() {
            Value::Record(Record::new(descriptor.name.clone()))
        } else {
            Value::Null
        }
    }

    /// Start a field-by-field builder for a record descriptor
    pub fn record(&self, descriptor: Arc<TypeDescriptor>) -> Result<RecordBuilder<'a>> {
        RecordBuilder::new(self.locator, descriptor)
    }

    /// Build a value of `descriptor` populated from `fixture`
    pub fn build(&self, descriptor: &TypeDescriptor, fixture: &Fixture) -> Result<Value> {
        self.build_named(descriptor, fixture, "", 0)
    }

    /// Build a value for a field or parameter reference
    pub fn build_ref(&self, type_ref: &TypeRef, repeated: bool, fixture: &Fixture) -> Result<Value> {
        self.build_slot(type_ref, repeated, fixture, "", 0)
    }

    fn build_slot(
        &self,
        type_ref: &TypeRef,
        repeated: bool,
        fixture: &Fixture,
        path: &str,
        depth: usize,
    ) -> Result<Value> {
        if !repeated {
            return self.build_single(type_ref, fixture, path, depth);
        }
        match fixture {
            Fixture::Null => Ok(Value::Null),
            Fixture::List(items) => items
                .iter()
                .enumerate()
                .map(|(i, item)| {
                    self.build_single(type_ref, item, &join_path(path, &i.to_string()), depth)
                })
                .collect::<Result<Vec<_>>>()
                .map(Value::Array),
            other => Err(HarnessError::fixture(
                type_ref,
                format!("repeated slot '{}' needs a list, got {}", path, other.describe()),
            )),
        }
    }

    fn build_single(&self, type_ref: &TypeRef, fixture: &Fixture, path: &str, depth: usize) -> Result<Value> {
        if matches!(fixture, Fixture::Null) {
            return Ok(Value::Null);
        }
        match self.locator.resolve_ref(type_ref)? {
            Resolved::Scalar(kind) => coerce_scalar(kind, fixture, &type_ref.to_string(), path),
            Resolved::Named(descriptor) => self.build_named(&descriptor, fixture, path, depth),
        }
    }

    fn build_named(
        &self,
        descriptor: &TypeDescriptor,
        fixture: &Fixture,
        path: &str,
        depth: usize,
    ) -> Result<Value> {
        if matches!(fixture, Fixture::Null) {
            return Ok(Value::Null);
        }
        match &descriptor.shape {
            TypeShape::Scalar(kind) => coerce_scalar(*kind, fixture, &descriptor.name.to_string(), path),
            TypeShape::Enumeration { values } => match fixture {
                Fixture::Scalar(Value::String(literal)) if values.contains(literal) => {
                    Ok(Value::String(literal.clone()))
                }
                Fixture::Scalar(Value::String(literal)) => Err(HarnessError::fixture(
                    &descriptor.name,
                    format!("'{}' is not one of {:?}", literal, values),
                )),
                other => Err(HarnessError::fixture(
                    &descriptor.name,
                    format!("enumeration at '{}' needs a string literal, got {}", path, other.describe()),
                )),
            },
            TypeShape::Record { .. } => {
                if depth >= self.max_depth {
                    return Err(HarnessError::NestingTooDeep {
                        limit: self.max_depth,
                        path: path.to_string(),
                    });
                }
                let (concrete, fields) = match fixture {
                    Fixture::Record(fields) => (self.locator.resolve_qname(&descriptor.name)?, fields),
                    Fixture::Typed { type_name, fields } => {
                        if !self.locator.is_derived_from(type_name, &descriptor.name) {
                            return Err(HarnessError::fixture(
                                &descriptor.name,
                                format!("{} does not extend the declared type", type_name),
                            ));
                        }
                        (self.locator.resolve_qname(type_name)?, fields)
                    }
                    other => {
                        return Err(HarnessError::fixture(
                            &descriptor.name,
                            format!("record at '{}' needs field data, got {}", path, other.describe()),
                        ));
                    }
                };

                let mut builder = RecordBuilder::new(self.locator, concrete.clone())?;
                for (name, field_fixture) in fields {
                    let field = concrete.field(name).ok_or_else(|| {
                        HarnessError::fixture(&concrete.name, format!("unknown field '{}'", name))
                    })?;
                    let value = self.build_slot(
                        &field.type_ref,
                        field.repeated,
                        field_fixture,
                        &join_path(path, name),
                        depth + 1,
                    )?;
                    builder = builder.set(name, value)?;
                }
                Ok(builder.finish())
            }
        }
    }
}

fn coerce_scalar(kind: ScalarKind, fixture: &Fixture, type_name: &str, path: &str) -> Result<Value> {
    match fixture {
        Fixture::Scalar(value) if value.scalar_kind() == Some(kind) => Ok(value.clone()),
        Fixture::Scalar(Value::Integer(n)) if kind == ScalarKind::Float => n
            .to_i64()
            .map(|i| Value::Float(i as f64))
            .ok_or_else(|| HarnessError::fixture(type_name, format!("integer at '{}' does not fit a float", path))),
        Fixture::Scalar(value) => Err(HarnessError::fixture(
            type_name,
            format!(
                "'{}' expects {}, got {}",
                path,
                kind,
                value.scalar_kind().map(|k| k.to_string()).unwrap_or_else(|| "non-scalar".into())
            ),
        )),
        other => Err(HarnessError::fixture(
            type_name,
            format!("'{}' expects a {} literal, got {}", path, kind, other.describe()),
        )),
    }
}

/// Field-by-field record construction validated against the descriptor.
///
/// Only names present in the (flattened) descriptor can be set, so a typo
/// is an error instead of a silently ignored attribute.
pub struct RecordBuilder<'a> {
    locator: &'a TypeLocator,
    descriptor: Arc<TypeDescriptor>,
    record: Record,
}

impl<'a> RecordBuilder<'a> {
    pub fn new(locator: &'a TypeLocator, descriptor: Arc<TypeDescriptor>) -> Result<Self> {
        if !descriptor.is_record() {
            return Err(HarnessError::fixture(&descriptor.name, "not a record type"));
        }
        let record = Record::new(descriptor.name.clone());
        Ok(Self {
            locator,
            descriptor,
            record,
        })
    }

    /// Set a field, replacing any previous value
    pub fn set(mut self, field: &str, value: impl Into<Value>) -> Result<Self> {
        let value = value.into();
        let descriptor = self.field_descriptor(field)?;
        self.check_slot(descriptor, &value)?;
        self.record.fields.insert(field.to_string(), value);
        Ok(self)
    }

    /// Append one element to a repeated field, keeping insertion order
    pub fn push(mut self, field: &str, value: impl Into<Value>) -> Result<Self> {
        let value = value.into();
        let descriptor = self.field_descriptor(field)?;
        if !descriptor.repeated {
            return Err(HarnessError::fixture(
                &self.descriptor.name,
                format!("field '{}' is not repeated", field),
            ));
        }
        self.check_single(descriptor, &value)?;
        let slot = self
            .record
            .fields
            .entry(field.to_string())
            .or_insert_with(|| Value::Array(Vec::new()));
        match slot {
            Value::Array(items) => items.push(value),
            other => *other = Value::Array(vec![value]),
        }
        Ok(self)
    }

    pub fn finish(self) -> Value {
        Value::Record(self.record)
    }

    fn field_descriptor(&self, field: &str) -> Result<&FieldDescriptor> {
        self.descriptor.field(field).ok_or_else(|| {
            HarnessError::fixture(&self.descriptor.name, format!("unknown field '{}'", field))
        })
    }

    fn check_slot(&self, field: &FieldDescriptor, value: &Value) -> Result<()> {
        match (field.repeated, value) {
            // Null stays settable on every field so scenarios can provoke
            // non-nillable violations on purpose.
            (_, Value::Null) => Ok(()),
            (true, Value::Array(items)) => items.iter().try_for_each(|item| self.check_single(field, item)),
            (true, _) => Err(HarnessError::fixture(
                &self.descriptor.name,
                format!("field '{}' is repeated and needs an array", field.name),
            )),
            (false, _) => self.check_single(field, value),
        }
    }

    fn check_single(&self, field: &FieldDescriptor, value: &Value) -> Result<()> {
        if value.is_null() {
            return Ok(());
        }
        let mismatch = |reason: String| HarnessError::fixture(&self.descriptor.name, reason);
        match self.locator.resolve_ref(&field.type_ref)? {
            Resolved::Scalar(kind) => expect_kind(kind, value, &field.name).map_err(mismatch),
            Resolved::Named(target) => match &target.shape {
                TypeShape::Scalar(kind) => expect_kind(*kind, value, &field.name).map_err(mismatch),
                TypeShape::Enumeration { values } => match value {
                    Value::String(s) if values.contains(s) => Ok(()),
                    _ => Err(mismatch(format!(
                        "field '{}' takes one of {:?}, got {}",
                        field.name,
                        values,
                        value.summary()
                    ))),
                },
                TypeShape::Record { .. } => match value {
                    Value::Record(record) if self.locator.is_derived_from(&record.type_name, &target.name) => {
                        Ok(())
                    }
                    _ => Err(mismatch(format!(
                        "field '{}' takes {}, got {}",
                        field.name,
                        target.name,
                        value.summary()
                    ))),
                },
            },
        }
    }
}

fn expect_kind(kind: ScalarKind, value: &Value, field: &str) -> std::result::Result<(), String> {
    if value.scalar_kind() == Some(kind) {
        Ok(())
    } else {
        Err(format!("field '{}' takes {}, got {}", field, kind, value.summary()))
    }
}
