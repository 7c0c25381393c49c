// src/equivalence.rs
// Equivalence Checker - compares sent values with round-tripped ones

use crate::schema::locator::Resolved;
use crate::schema::{ScalarKind, TypeDescriptor, TypeLocator, TypeRef, TypeShape};
use crate::utils::join_path;
use crate::value::Value;
use chrono::Timelike;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// Predicate deciding whether two scalars of one kind are equivalent
pub type ComparisonRule = fn(&Value, &Value) -> bool;

/// Strict equality; NaN equals NaN so float echoes compare by value
pub fn exact(expected: &Value, actual: &Value) -> bool {
    match (expected, actual) {
        (Value::Float(a), Value::Float(b)) => a == b || (a.is_nan() && b.is_nan()),
        _ => expected == actual,
    }
}

/// Equality after discarding sub-second components.
///
/// The client drops microseconds when it serializes temporal values, so a
/// fractional part on either side is not evidence about the service.
pub fn ignore_subsecond(expected: &Value, actual: &Value) -> bool {
    match (expected, actual) {
        (Value::Time(a), Value::Time(b)) => a.with_nanosecond(0) == b.with_nanosecond(0),
        (Value::DateTime(a), Value::DateTime(b)) => a.with_nanosecond(0) == b.with_nanosecond(0),
        _ => exact(expected, actual),
    }
}

/// Per-kind comparison rules
#[derive(Debug, Clone)]
pub struct ComparisonRules {
    rules: HashMap<ScalarKind, ComparisonRule>,
}

impl ComparisonRules {
    /// Temporal kinds ignore sub-second precision, everything else is exact
    pub fn tolerant() -> Self {
        let mut rules = Self::strict();
        for kind in [ScalarKind::Date, ScalarKind::Time, ScalarKind::DateTime] {
            rules.rules.insert(kind, ignore_subsecond as ComparisonRule);
        }
        rules
    }

    /// Exact comparison for every kind
    pub fn strict() -> Self {
        let kinds = [
            ScalarKind::Integer,
            ScalarKind::String,
            ScalarKind::Boolean,
            ScalarKind::Float,
            ScalarKind::Date,
            ScalarKind::Time,
            ScalarKind::DateTime,
            ScalarKind::Bytes,
        ];
        Self {
            rules: kinds.into_iter().map(|k| (k, exact as ComparisonRule)).collect(),
        }
    }

    pub fn with_rule(mut self, kind: ScalarKind, rule: ComparisonRule) -> Self {
        self.rules.insert(kind, rule);
        self
    }

    pub fn compare(&self, kind: ScalarKind, expected: &Value, actual: &Value) -> bool {
        let rule = self.rules.get(&kind).copied().unwrap_or(exact as ComparisonRule);
        rule(expected, actual)
    }
}

impl Default for ComparisonRules {
    fn default() -> Self {
        Self::tolerant()
    }
}

/// One differing location in a value tree
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldDiff {
    pub path: String,
    pub expected: String,
    pub actual: String,
    pub reason: String,
}

/// Field-level diff produced when round-tripped values differ
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Mismatch {
    pub diffs: Vec<FieldDiff>,
}

impl Mismatch {
    pub fn is_empty(&self) -> bool {
        self.diffs.is_empty()
    }

    fn push(&mut self, path: &str, expected: &Value, actual: &Value, reason: impl Into<String>) {
        self.diffs.push(FieldDiff {
            path: if path.is_empty() { "<root>".to_string() } else { path.to_string() },
            expected: expected.summary(),
            actual: actual.summary(),
            reason: reason.into(),
        });
    }
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, diff) in self.diffs.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(
                f,
                "  {}: expected {}, got {} ({})",
                diff.path, diff.expected, diff.actual, diff.reason
            )?;
        }
        Ok(())
    }
}

impl std::error::Error for Mismatch {}

/// Structural, schema-guided comparison of value trees
pub struct EquivalenceChecker<'a> {
    locator: &'a TypeLocator,
    rules: ComparisonRules,
}

impl<'a> EquivalenceChecker<'a> {
    pub fn new(locator: &'a TypeLocator) -> Self {
        Self {
            locator,
            rules: ComparisonRules::tolerant(),
        }
    }

    pub fn with_rules(mut self, rules: ComparisonRules) -> Self {
        self.rules = rules;
        self
    }

    /// Compare against a named descriptor
    pub fn check_type(&self, expected: &Value, actual: &Value, descriptor: &TypeDescriptor) -> Result<(), Mismatch> {
        self.check(expected, actual, &TypeRef::Named(descriptor.name.clone()), false)
    }

    /// Compare a value of a field or parameter slot
    pub fn check(&self, expected: &Value, actual: &Value, type_ref: &TypeRef, repeated: bool) -> Result<(), Mismatch> {
        let mut mismatch = Mismatch::default();
        self.walk_slot(expected, actual, type_ref, repeated, "", &mut mismatch);
        if mismatch.is_empty() { Ok(()) } else { Err(mismatch) }
    }

    pub fn equivalent(&self, expected: &Value, actual: &Value, type_ref: &TypeRef, repeated: bool) -> bool {
        self.check(expected, actual, type_ref, repeated).is_ok()
    }

    fn walk_slot(
        &self,
        expected: &Value,
        actual: &Value,
        type_ref: &TypeRef,
        repeated: bool,
        path: &str,
        out: &mut Mismatch,
    ) {
        if !repeated {
            self.walk(expected, actual, type_ref, path, out);
            return;
        }
        // An empty repeated slot and an absent one look the same on the wire
        let empty: &[Value] = &[];
        let expected_items = match expected {
            Value::Null => empty,
            Value::Array(items) => items.as_slice(),
            other => {
                out.push(path, other, actual, "expected value is not an array");
                return;
            }
        };
        let actual_items = match actual {
            Value::Null => empty,
            Value::Array(items) => items.as_slice(),
            other => {
                out.push(path, expected, other, "not an array");
                return;
            }
        };
        if expected_items.len() != actual_items.len() {
            out.push(
                path,
                expected,
                actual,
                format!("length {} != {}", expected_items.len(), actual_items.len()),
            );
            return;
        }
        for (i, (e, a)) in expected_items.iter().zip(actual_items).enumerate() {
            self.walk(e, a, type_ref, &join_path(path, &i.to_string()), out);
        }
    }

    fn walk(&self, expected: &Value, actual: &Value, type_ref: &TypeRef, path: &str, out: &mut Mismatch) {
        match (expected, actual) {
            (Value::Null, Value::Null) => return,
            (Value::Null, _) => {
                out.push(path, expected, actual, "expected nil");
                return;
            }
            (_, Value::Null) => {
                out.push(path, expected, actual, "missing");
                return;
            }
            _ => {}
        }

        let resolved = match self.locator.resolve_ref(type_ref) {
            Ok(resolved) => resolved,
            Err(e) => {
                out.push(path, expected, actual, e.to_string());
                return;
            }
        };

        match resolved {
            Resolved::Scalar(kind) => self.compare_scalar(kind, expected, actual, path, out),
            Resolved::Named(descriptor) => match &descriptor.shape {
                TypeShape::Scalar(kind) => self.compare_scalar(*kind, expected, actual, path, out),
                TypeShape::Enumeration { .. } => {
                    if !exact(expected, actual) {
                        out.push(path, expected, actual, "enumeration literal differs");
                    }
                }
                TypeShape::Record { .. } => self.compare_record(expected, actual, path, out),
            },
        }
    }

    fn compare_scalar(&self, kind: ScalarKind, expected: &Value, actual: &Value, path: &str, out: &mut Mismatch) {
        if expected.scalar_kind() != actual.scalar_kind() {
            out.push(path, expected, actual, format!("expected {}", kind));
            return;
        }
        if !self.rules.compare(kind, expected, actual) {
            let reason = if kind.is_temporal() {
                format!("{} differs beyond sub-second tolerance", kind)
            } else {
                format!("{} differs", kind)
            };
            out.push(path, expected, actual, reason);
        }
    }

    fn compare_record(&self, expected: &Value, actual: &Value, path: &str, out: &mut Mismatch) {
        let (Value::Record(e), Value::Record(a)) = (expected, actual) else {
            out.push(path, expected, actual, "expected a record");
            return;
        };
        if e.type_name != a.type_name {
            out.push(
                path,
                expected,
                actual,
                format!("type {} != {}", e.type_name, a.type_name),
            );
            return;
        }
        // Fields come from the concrete type so extension fields are covered
        let concrete = match self.locator.resolve_qname(&e.type_name) {
            Ok(descriptor) => descriptor,
            Err(err) => {
                out.push(path, expected, actual, err.to_string());
                return;
            }
        };
        for (name, expected_field) in &e.fields {
            let field_path = join_path(path, name);
            let Some(field) = concrete.field(name) else {
                out.push(&field_path, expected_field, &Value::Null, "field not in schema");
                continue;
            };
            let actual_field = a.fields.get(name).unwrap_or(&Value::Null);
            self.walk_slot(expected_field, actual_field, &field.type_ref, field.repeated, &field_path, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::loopback::LoopbackClient;
    use crate::client::loopback::schema::{EXTENSION_NS, NESTED_NS, SERVICE_NS};
    use crate::schema::QName;
    use crate::value::{Integer, Record};
    use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
    use std::sync::Arc;

    fn locator() -> TypeLocator {
        TypeLocator::new(Arc::new(LoopbackClient::new()))
    }

    fn dt(micro: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2010, 6, 2)
            .unwrap()
            .and_hms_micro_opt(13, 45, 10, micro)
            .unwrap()
    }

    fn simple(i: i64, s: &str) -> Value {
        Value::Record(Record::new(QName::new(SERVICE_NS, "SimpleClass")).with("i", i).with("s", s))
    }

    // ============================================================================
    // Scalar rules
    // ============================================================================

    #[test]
    fn test_boolean_round_trip_exact() {
        let locator = locator();
        let checker = EquivalenceChecker::new(&locator);
        let t = TypeRef::Builtin(ScalarKind::Boolean);
        assert!(checker.equivalent(&true.into(), &true.into(), &t, false));
        assert!(checker.equivalent(&false.into(), &false.into(), &t, false));
        assert!(!checker.equivalent(&true.into(), &false.into(), &t, false));
    }

    #[test]
    fn test_datetime_ignores_subsecond() {
        let locator = locator();
        let checker = EquivalenceChecker::new(&locator);
        let t = TypeRef::Builtin(ScalarKind::DateTime);
        assert!(checker.equivalent(&dt(0).into(), &dt(0).into(), &t, false));
        assert!(checker.equivalent(&dt(123_456).into(), &dt(0).into(), &t, false));
        let later = dt(0) + chrono::Duration::seconds(1);
        assert!(!checker.equivalent(&dt(0).into(), &later.into(), &t, false));
    }

    #[test]
    fn test_time_ignores_subsecond() {
        let locator = locator();
        let checker = EquivalenceChecker::new(&locator);
        let t = TypeRef::Builtin(ScalarKind::Time);
        let a = NaiveTime::from_hms_micro_opt(1, 1, 1, 100).unwrap();
        let b = NaiveTime::from_hms_opt(1, 1, 1).unwrap();
        assert!(checker.equivalent(&a.into(), &b.into(), &t, false));
    }

    #[test]
    fn test_strict_rules_flag_subsecond_loss() {
        let locator = locator();
        let checker = EquivalenceChecker::new(&locator).with_rules(ComparisonRules::strict());
        let t = TypeRef::Builtin(ScalarKind::DateTime);
        assert!(!checker.equivalent(&dt(1).into(), &dt(0).into(), &t, false));
    }

    #[test]
    fn test_float_exact_and_nan() {
        assert!(exact(&Value::Float(3.141592653), &Value::Float(3.141592653)));
        assert!(!exact(&Value::Float(12.34), &Value::Float(12.340000001)));
        assert!(exact(&Value::Float(f64::NAN), &Value::Float(f64::NAN)));
    }

    #[test]
    fn test_kind_mismatch_is_reported() {
        let locator = locator();
        let checker = EquivalenceChecker::new(&locator);
        let err = checker
            .check(&Value::from(1), &Value::from("1"), &TypeRef::Builtin(ScalarKind::Integer), false)
            .unwrap_err();
        assert_eq!(err.diffs[0].path, "<root>");
        assert!(err.diffs[0].reason.contains("integer"));
    }

    #[test]
    fn test_huge_values_compare_exactly() {
        let locator = locator();
        let checker = EquivalenceChecker::new(&locator);
        let int = TypeRef::Builtin(ScalarKind::Integer);
        let big = Value::from(Integer::pow(2, 100_000));
        assert!(checker.equivalent(&big, &big.clone(), &int, false));
        // 2^100000 ends in 6; bump the last digit
        let digits = Integer::pow(2, 100_000).to_string();
        let off_by_one = Value::from(Integer::parse(&format!("{}7", &digits[..digits.len() - 1])).unwrap());
        assert!(!checker.equivalent(&big, &off_by_one, &int, false));

        let s = TypeRef::Builtin(ScalarKind::String);
        let long = Value::from("0123456789abcdef".repeat(16384));
        let mut altered = "0123456789abcdef".repeat(16384);
        altered.replace_range(200_000..200_001, "X");
        assert!(checker.equivalent(&long, &long.clone(), &s, false));
        let err = checker.check(&long, &Value::from(altered), &s, false).unwrap_err();
        assert!(err.to_string().contains("262144 chars"));
    }

    // ============================================================================
    // Structural rules
    // ============================================================================

    #[test]
    fn test_array_order_matters() {
        let locator = locator();
        let checker = EquivalenceChecker::new(&locator);
        let t = TypeRef::Builtin(ScalarKind::Integer);
        let a = Value::Array((1..=5).map(Value::from).collect());
        let b = Value::Array([1, 2, 4, 3, 5].into_iter().map(Value::from).collect());
        let short = Value::Array((1..=4).map(Value::from).collect());
        assert!(checker.equivalent(&a, &a.clone(), &t, true));
        let err = checker.check(&a, &b, &t, true).unwrap_err();
        assert_eq!(err.diffs.len(), 2);
        assert_eq!(err.diffs[0].path, "2");
        assert!(checker.check(&a, &short, &t, true).unwrap_err().diffs[0].reason.contains("length"));
    }

    #[test]
    fn test_empty_array_matches_absent() {
        let locator = locator();
        let checker = EquivalenceChecker::new(&locator);
        let t = TypeRef::Builtin(ScalarKind::String);
        assert!(checker.equivalent(&Value::Array(vec![]), &Value::Null, &t, true));
    }

    #[test]
    fn test_record_ignores_unset_fields() {
        let locator = locator();
        let checker = EquivalenceChecker::new(&locator);
        let t = TypeRef::Named(QName::new(SERVICE_NS, "SimpleClass"));
        let expected = Value::Record(Record::new(QName::new(SERVICE_NS, "SimpleClass")).with("i", 45));
        assert!(checker.equivalent(&expected, &simple(45, "anything"), &t, false));
        assert!(!checker.equivalent(&simple(45, "asd"), &simple(45, "qwe"), &t, false));
    }

    #[test]
    fn test_self_reference_terminator_checked() {
        let locator = locator();
        let checker = EquivalenceChecker::new(&locator);
        let name = QName::new(SERVICE_NS, "ClassWithSelfReference");
        let expected = Value::Record(
            Record::new(name.clone())
                .with("i", 45)
                .with("sr", Record::new(name.clone()).with("i", 50).with("sr", Value::Null)),
        );
        let truncated = Value::Record(
            Record::new(name.clone())
                .with("i", 45)
                .with("sr", Record::new(name.clone()).with("i", 50)),
        );
        let overgrown = Value::Record(
            Record::new(name.clone()).with("i", 45).with(
                "sr",
                Record::new(name.clone())
                    .with("i", 50)
                    .with("sr", Record::new(name.clone()).with("i", 1)),
            ),
        );
        let t = TypeRef::Named(name);
        assert!(checker.equivalent(&expected, &truncated, &t, false));
        let err = checker.check(&expected, &overgrown, &t, false).unwrap_err();
        assert_eq!(err.diffs[0].path, "sr.sr");
        assert_eq!(err.diffs[0].reason, "expected nil");
    }

    #[test]
    fn test_extension_fields_checked() {
        let locator = locator();
        let checker = EquivalenceChecker::new(&locator);
        let ext = QName::new(EXTENSION_NS, "ExtensionClass");
        let expected = Value::Record(Record::new(ext.clone()).with("i", 45).with("q", 5));
        let wrong_ext = Value::Record(Record::new(ext.clone()).with("i", 45).with("q", 6));
        let t = TypeRef::Named(QName::new(NESTED_NS, "NestedClass"));
        let err = checker.check(&expected, &wrong_ext, &t, false).unwrap_err();
        assert_eq!(err.diffs.len(), 1);
        assert_eq!(err.diffs[0].path, "q");

        let lost_subtype = Value::Record(Record::new(QName::new(NESTED_NS, "NestedClass")).with("i", 45));
        let err = checker.check(&expected, &lost_subtype, &t, false).unwrap_err();
        assert!(err.diffs[0].reason.starts_with("type"));
    }

    #[test]
    fn test_mismatch_display_lists_paths() {
        let locator = locator();
        let checker = EquivalenceChecker::new(&locator);
        let t = TypeRef::Named(QName::new(SERVICE_NS, "SimpleClass"));
        let err = checker.check(&simple(1, "a"), &simple(2, "b"), &t, false).unwrap_err();
        let rendered = err.to_string();
        assert!(rendered.contains("i: expected 1, got 2"));
        assert!(rendered.contains("s: expected \"a\", got \"b\""));
    }
}
