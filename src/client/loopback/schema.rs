// src/client/loopback/schema.rs
// Published schema of the interop service

use crate::schema::{
    BodyStyle, FieldDescriptor, OperationDescriptor, Param, QName, ScalarKind, SchemaRegistry,
    TypeDescriptor, TypeRef,
};

/// Target namespace of the interop service
pub const SERVICE_NS: &str = "spyne.test.interop.server";
/// Namespace of `NestedClass`
pub const NESTED_NS: &str = "punk.tunk";
/// Namespace of `ExtensionClass`
pub const EXTENSION_NS: &str = "bar";
/// Namespace of `NonNillableClass`
pub const NON_NILLABLE_NS: &str = "hunk.sunk";

fn builtin(kind: ScalarKind) -> TypeRef {
    TypeRef::Builtin(kind)
}

fn named(namespace: &str, local: &str) -> TypeRef {
    TypeRef::Named(QName::new(namespace, local))
}

fn tns(local: &str) -> TypeRef {
    named(SERVICE_NS, local)
}

/// Record type with fields given as `(name, type)` pairs
fn record(namespace: &str, local: &str, base: Option<QName>, fields: &[(&str, TypeRef)]) -> TypeDescriptor {
    let name = QName::new(namespace, local);
    let fields = fields
        .iter()
        .map(|(field, type_ref)| FieldDescriptor::new(&name, field, type_ref.clone()))
        .collect();
    TypeDescriptor::record(name, base, fields)
}

/// Record type wrapping one repeated field (the `*Array` types)
fn array_of(local: &str, field: &str, item: TypeRef) -> TypeDescriptor {
    let name = QName::new(SERVICE_NS, local);
    let fields = vec![FieldDescriptor::new(&name, field, item).repeated()];
    TypeDescriptor::record(name, None, fields)
}

/// Operation echoing one argument of `type_ref`
fn echo(name: &str, param: &str, type_ref: TypeRef) -> OperationDescriptor {
    OperationDescriptor::new(name)
        .input(Param::new(param, type_ref.clone()))
        .output(Param::new(&format!("{}Result", name), type_ref))
}

fn no_input(name: &str) -> OperationDescriptor {
    OperationDescriptor::new(name).style(BodyStyle::Empty)
}

fn types() -> Vec<TypeDescriptor> {
    use ScalarKind::*;

    let non_nillable_name = QName::new(NON_NILLABLE_NS, "NonNillableClass");
    let non_nillable = TypeDescriptor::record(
        non_nillable_name.clone(),
        None,
        vec![
            FieldDescriptor::new(&non_nillable_name, "dt", builtin(DateTime)).non_nillable(),
            FieldDescriptor::new(&non_nillable_name, "i", builtin(Integer)).non_nillable(),
            FieldDescriptor::new(&non_nillable_name, "s", builtin(String)).non_nillable(),
        ],
    );

    vec![
        record(SERVICE_NS, "SimpleClass", None, &[("i", builtin(Integer)), ("s", builtin(String))]),
        record(
            SERVICE_NS,
            "ClassWithSelfReference",
            None,
            &[("i", builtin(Integer)), ("sr", tns("ClassWithSelfReference"))],
        ),
        record(
            SERVICE_NS,
            "OtherClass",
            None,
            &[("dt", builtin(DateTime)), ("d", builtin(Float)), ("b", builtin(Boolean))],
        ),
        array_of("integerArray", "integer", builtin(Integer)),
        array_of("stringArray", "string", builtin(String)),
        array_of("SimpleClassArray", "SimpleClass", tns("SimpleClass")),
        TypeDescriptor::enumeration(
            QName::new(SERVICE_NS, "DaysOfWeekEnum"),
            &["Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday", "Sunday"],
        ),
        record(SERVICE_NS, "InHeader", None, &[("s", builtin(String)), ("i", builtin(Integer))]),
        record(
            SERVICE_NS,
            "InTraceHeader",
            None,
            &[("client", builtin(String)), ("callDate", builtin(DateTime))],
        ),
        record(SERVICE_NS, "OutHeader", None, &[("dt", builtin(DateTime)), ("f", builtin(Float))]),
        record(
            SERVICE_NS,
            "OutTraceHeader",
            None,
            &[("receiptDate", builtin(DateTime)), ("returnDate", builtin(DateTime))],
        ),
        TypeDescriptor::enumeration(QName::new(SERVICE_NS, "RoleEnum"), &["MEMBER", "ADMIN"]),
        array_of("RoleEnumArray", "RoleEnum", tns("RoleEnum")),
        record(
            SERVICE_NS,
            "ComplexReturn",
            None,
            &[
                ("resultCode", builtin(Integer)),
                ("resultDescription", builtin(String)),
                ("transactionId", builtin(Integer)),
                ("roles", tns("RoleEnumArray")),
            ],
        ),
        record(
            NESTED_NS,
            "NestedClass",
            None,
            &[
                ("i", builtin(Integer)),
                ("s", builtin(String)),
                ("f", builtin(Float)),
                ("ai", tns("integerArray")),
                ("simple", tns("SimpleClassArray")),
                ("other", tns("OtherClass")),
            ],
        ),
        record(
            EXTENSION_NS,
            "ExtensionClass",
            Some(QName::new(NESTED_NS, "NestedClass")),
            &[
                ("p", named(NON_NILLABLE_NS, "NonNillableClass")),
                ("l", builtin(DateTime)),
                ("q", builtin(Integer)),
            ],
        ),
        non_nillable,
    ]
}

fn operations() -> Vec<OperationDescriptor> {
    use ScalarKind::*;

    let in_header = QName::new(SERVICE_NS, "InHeader");
    let in_trace_header = QName::new(SERVICE_NS, "InTraceHeader");
    let out_header = QName::new(SERVICE_NS, "OutHeader");
    let out_trace_header = QName::new(SERVICE_NS, "OutTraceHeader");

    vec![
        echo("echo_datetime", "dt", builtin(DateTime)),
        echo("echo_datetime_with_invalid_format", "dt", builtin(DateTime)),
        echo("echo_date", "d", builtin(Date)),
        echo("echo_date_with_invalid_format", "d", builtin(Date)),
        echo("echo_time", "t", builtin(Time)),
        echo("echo_time_with_invalid_format", "t", builtin(Time)),
        OperationDescriptor::new("echo_simple_boolean_array")
            .input(Param::new("b", builtin(Boolean)).repeated())
            .output(Param::new("echo_simple_boolean_arrayResult", builtin(Boolean)).repeated()),
        echo("echo_boolean", "b", builtin(Boolean)),
        echo("echo_enum", "day", tns("DaysOfWeekEnum")),
        echo("echo_bytearray", "data", builtin(Bytes)),
        OperationDescriptor::new("non_nillable").input(Param::new("nn", named(NON_NILLABLE_NS, "NonNillableClass"))),
        echo("echo_integer_array", "ia", tns("integerArray")),
        no_input("echo_in_header")
            .in_header(in_header.clone())
            .output(Param::new("echo_in_headerResult", TypeRef::Named(in_header.clone()))),
        no_input("echo_in_complex_header")
            .in_header(in_header.clone())
            .in_header(in_trace_header.clone())
            .out_header(in_header)
            .out_header(in_trace_header),
        no_input("send_out_header").out_header(out_header.clone()),
        no_input("send_out_complex_header")
            .out_header(out_header)
            .out_header(out_trace_header),
        echo("echo_string", "s", builtin(String)),
        echo("echo_simple_class", "sc", tns("SimpleClass")),
        echo("echo_class_with_self_reference", "sr", tns("ClassWithSelfReference")),
        echo("echo_nested_class", "nc", named(NESTED_NS, "NestedClass")),
        no_input("huge_number").output(Param::new("huge_numberResult", builtin(Integer))),
        no_input("long_string").output(Param::new("long_stringResult", builtin(String))),
        no_input("test_empty"),
        echo("echo_extension_class", "ec", named(EXTENSION_NS, "ExtensionClass")),
        no_input("python_exception"),
        no_input("soap_exception"),
        no_input("complex_return").output(Param::new("complex_returnResult", tns("ComplexReturn"))),
        no_input("return_invalid_data").output(Param::new("return_invalid_dataResult", builtin(Integer))),
        echo("custom_messages", "s", builtin(String)),
        echo("echo_simple_bare", "s", builtin(String)).style(BodyStyle::Bare),
        OperationDescriptor::new("echo_complex_bare")
            .style(BodyStyle::Bare)
            .input(Param::new("string", builtin(String)).repeated())
            .output(Param::new("string", builtin(String)).repeated()),
    ]
}

/// Schema the interop service publishes in its WSDL
pub fn interop_schema() -> SchemaRegistry {
    let mut registry = SchemaRegistry::new(SERVICE_NS);
    for descriptor in types() {
        registry.add_type(descriptor);
    }
    for operation in operations() {
        registry.add_operation(operation);
    }
    registry
}
