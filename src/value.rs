// src/value.rs
// Native value tree exchanged with the client

use crate::schema::{QName, ScalarKind};
use crate::utils::truncate;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Arbitrary-precision integer (`xs:integer`) kept in canonical decimal form.
///
/// Canonical means no leading zeros, no `+`, and no negative zero, so
/// equality on the representation is numeric equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Integer {
    negative: bool,
    digits: String,
}

const LIMB_BASE: u64 = 1_000_000_000;
const LIMB_DIGITS: usize = 9;

impl Integer {
    /// Parse a decimal literal with optional sign
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        let (negative, body) = match s.as_bytes().first()? {
            b'-' => (true, &s[1..]),
            b'+' => (false, &s[1..]),
            _ => (false, s),
        };
        if body.is_empty() || !body.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let trimmed = body.trim_start_matches('0');
        let digits = if trimmed.is_empty() { "0" } else { trimmed };
        Some(Self {
            negative: negative && digits != "0",
            digits: digits.to_string(),
        })
    }

    /// `base` raised to `exp`, exactly
    pub fn pow(base: u32, exp: u32) -> Self {
        let mut result: Vec<u64> = vec![1];
        let mut square: Vec<u64> = vec![u64::from(base) % LIMB_BASE];
        if u64::from(base) >= LIMB_BASE {
            square.push(u64::from(base) / LIMB_BASE);
        }
        let mut e = exp;
        while e > 0 {
            if e & 1 == 1 {
                result = mul_limbs(&result, &square);
            }
            e >>= 1;
            if e > 0 {
                square = mul_limbs(&square, &square);
            }
        }
        Self {
            negative: false,
            digits: limbs_to_decimal(&result),
        }
    }

    pub fn is_negative(&self) -> bool {
        self.negative
    }

    /// Number of decimal digits, sign excluded
    pub fn digit_count(&self) -> usize {
        self.digits.len()
    }

    pub fn to_i64(&self) -> Option<i64> {
        self.to_string().parse().ok()
    }
}

impl From<i64> for Integer {
    fn from(n: i64) -> Self {
        Self {
            negative: n < 0,
            digits: n.unsigned_abs().to_string(),
        }
    }
}

impl fmt::Display for Integer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negative {
            f.write_str("-")?;
        }
        f.write_str(&self.digits)
    }
}

/// Schoolbook multiplication over little-endian base-1e9 limbs
fn mul_limbs(a: &[u64], b: &[u64]) -> Vec<u64> {
    let mut out = vec![0u64; a.len() + b.len()];
    for (i, &x) in a.iter().enumerate() {
        if x == 0 {
            continue;
        }
        let mut carry = 0u64;
        for (j, &y) in b.iter().enumerate() {
            let cur = out[i + j] + x * y + carry;
            out[i + j] = cur % LIMB_BASE;
            carry = cur / LIMB_BASE;
        }
        let mut k = i + b.len();
        while carry > 0 {
            let cur = out[k] + carry;
            out[k] = cur % LIMB_BASE;
            carry = cur / LIMB_BASE;
            k += 1;
        }
    }
    while out.len() > 1 && out.last() == Some(&0) {
        out.pop();
    }
    out
}

fn limbs_to_decimal(limbs: &[u64]) -> String {
    let mut out = String::with_capacity(limbs.len() * LIMB_DIGITS);
    let mut iter = limbs.iter().rev();
    if let Some(top) = iter.next() {
        out.push_str(&top.to_string());
    }
    for limb in iter {
        out.push_str(&format!("{:0width$}", limb, width = LIMB_DIGITS));
    }
    out
}

/// A record instance: concrete type plus the fields that were set.
///
/// Fields never set are absent; a field explicitly set to `Value::Null`
/// carries the nil sentinel.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub type_name: QName,
    pub fields: BTreeMap<String, Value>,
}

impl Record {
    pub fn new(type_name: QName) -> Self {
        Self {
            type_name,
            fields: BTreeMap::new(),
        }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn with(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(field.to_string(), value.into());
        self
    }
}

/// Recursive value tree
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Integer(Integer),
    String(String),
    Boolean(bool),
    Float(f64),
    Date(NaiveDate),
    Time(NaiveTime),
    DateTime(NaiveDateTime),
    Bytes(Vec<u8>),
    Array(Vec<Value>),
    Record(Record),
}

impl Value {
    /// Scalar kind of this value, `None` for null, arrays and records
    pub fn scalar_kind(&self) -> Option<ScalarKind> {
        match self {
            Value::Integer(_) => Some(ScalarKind::Integer),
            Value::String(_) => Some(ScalarKind::String),
            Value::Boolean(_) => Some(ScalarKind::Boolean),
            Value::Float(_) => Some(ScalarKind::Float),
            Value::Date(_) => Some(ScalarKind::Date),
            Value::Time(_) => Some(ScalarKind::Time),
            Value::DateTime(_) => Some(ScalarKind::DateTime),
            Value::Bytes(_) => Some(ScalarKind::Bytes),
            Value::Null | Value::Array(_) | Value::Record(_) => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Value::Record(record) => Some(record),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Walk a dotted path such as `simple.SimpleClass.0.s`
    pub fn path(&self, path: &str) -> Option<&Value> {
        let mut current = self;
        for segment in path.split('.').filter(|s| !s.is_empty()) {
            current = match current {
                Value::Record(record) => record.fields.get(segment)?,
                Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(current)
    }

    /// Nesting depth: scalars and null are 0, containers add one level
    pub fn depth(&self) -> usize {
        match self {
            Value::Array(items) => 1 + items.iter().map(Value::depth).max().unwrap_or(0),
            Value::Record(record) => {
                1 + record.fields.values().map(Value::depth).max().unwrap_or(0)
            }
            _ => 0,
        }
    }

    /// Short rendering for diffs and logs; long payloads are truncated
    pub fn summary(&self) -> String {
        const MAX: usize = 64;
        match self {
            Value::Null => "null".to_string(),
            Value::Integer(n) => {
                let text = n.to_string();
                if text.len() > MAX {
                    format!("{} ({} digits)", truncate(&text, MAX), n.digit_count())
                } else {
                    text
                }
            }
            Value::String(s) => {
                let count = s.chars().count();
                if count > MAX {
                    format!("{:?} ({} chars)", truncate(s, MAX), count)
                } else {
                    format!("{:?}", s)
                }
            }
            Value::Boolean(b) => b.to_string(),
            Value::Float(f) => f.to_string(),
            Value::Date(d) => d.to_string(),
            Value::Time(t) => t.to_string(),
            Value::DateTime(dt) => dt.to_string(),
            Value::Bytes(bytes) => format!("bytes[{}]", bytes.len()),
            Value::Array(items) => format!("array[{}]", items.len()),
            Value::Record(record) => format!("{} {{{} fields}}", record.type_name, record.fields.len()),
        }
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(Integer::from(n))
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Integer(Integer::from(i64::from(n)))
    }
}

impl From<Integer> for Value {
    fn from(n: Integer) -> Self {
        Value::Integer(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<NaiveDate> for Value {
    fn from(d: NaiveDate) -> Self {
        Value::Date(d)
    }
}

impl From<NaiveTime> for Value {
    fn from(t: NaiveTime) -> Self {
        Value::Time(t)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(dt: NaiveDateTime) -> Self {
        Value::DateTime(dt)
    }
}

impl From<Vec<u8>> for Value {
    fn from(bytes: Vec<u8>) -> Self {
        Value::Bytes(bytes)
    }
}

impl From<Record> for Value {
    fn from(record: Record) -> Self {
        Value::Record(record)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map(Into::into).unwrap_or(Value::Null)
    }
}

/// JSON form used by the report writer; large scalars keep full fidelity
impl Serialize for Value {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::{SerializeMap, SerializeSeq};
        match self {
            Value::Null => serializer.serialize_none(),
            Value::Integer(n) => serializer.serialize_str(&n.to_string()),
            Value::String(s) => serializer.serialize_str(s),
            Value::Boolean(b) => serializer.serialize_bool(*b),
            Value::Float(f) => serializer.serialize_f64(*f),
            Value::Date(d) => serializer.serialize_str(&d.to_string()),
            Value::Time(t) => serializer.serialize_str(&t.to_string()),
            Value::DateTime(dt) => serializer.serialize_str(&dt.to_string()),
            Value::Bytes(bytes) => {
                use base64::Engine as _;
                serializer.serialize_str(&base64::engine::general_purpose::STANDARD.encode(bytes))
            }
            Value::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Record(record) => {
                let mut map = serializer.serialize_map(Some(record.fields.len() + 1))?;
                map.serialize_entry("@type", &record.type_name.to_string())?;
                for (name, value) in &record.fields {
                    map.serialize_entry(name, value)?;
                }
                map.end()
            }
        }
    }
}
