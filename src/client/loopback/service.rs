// src/client/loopback/service.rs
// In-process rendition of the interop service's operations

use crate::client::codec::{Codec, CodecError, Message, TemporalForm};
use super::schema::SERVICE_NS;
use crate::schema::{OperationDescriptor, QName, SchemaRegistry};
use crate::value::{Integer, Record, Value};
use chrono::NaiveDate;
use std::sync::{Arc, OnceLock};
use tracing::debug;

pub const VALIDATION_FAULT: &str = "soap:Client.ValidationError";
pub const SCHEMA_FAULT: &str = "soap:Client.SchemaValidationError";
pub const NOT_FOUND_FAULT: &str = "soap:Client.ResourceNotFound";
pub const SERVER_FAULT: &str = "soap:Server";

/// Exponent of the `huge_number` result (2^100000)
pub const HUGE_NUMBER_EXPONENT: u32 = 100_000;
/// Block repeated to build the `long_string` result
pub const LONG_STRING_BLOCK: &str = "0123456789abcdef";
pub const LONG_STRING_REPEAT: usize = 16384;

fn huge_number() -> &'static Integer {
    static HUGE: OnceLock<Integer> = OnceLock::new();
    HUGE.get_or_init(|| Integer::pow(2, HUGE_NUMBER_EXPONENT))
}

/// What an operation produced
enum Handled {
    Result {
        body: Option<Value>,
        headers: Vec<Value>,
        form: TemporalForm,
    },
    /// Result text written verbatim, even if it violates the schema
    Raw(String),
    Fault {
        code: &'static str,
        message: String,
        actor: Option<&'static str>,
    },
}

impl Handled {
    fn body(body: Option<Value>) -> Self {
        Handled::Result {
            body,
            headers: Vec::new(),
            form: TemporalForm::Full,
        }
    }

    fn headers(headers: Vec<Value>) -> Self {
        Handled::Result {
            body: None,
            headers,
            form: TemporalForm::Full,
        }
    }
}

/// Serves SOAP envelopes against the interop schema
pub struct InteropService {
    schema: Arc<SchemaRegistry>,
}

impl InteropService {
    pub fn new(schema: Arc<SchemaRegistry>) -> Self {
        Self { schema }
    }

    /// Handle one request envelope and produce the response envelope
    pub fn handle(&self, request: &str) -> String {
        let codec = Codec::new(&self.schema, TemporalForm::Full);
        let message = match codec.decode_request(request) {
            Ok(message) => message,
            Err(CodecError::Validation { path, message }) => {
                return codec.encode_fault(VALIDATION_FAULT, &format!("{}: {}", path, message), None);
            }
            Err(CodecError::UnknownOperation(name)) => {
                return codec.encode_fault(NOT_FOUND_FAULT, &format!("Requested resource '{}' not found", name), None);
            }
            Err(CodecError::Malformed(reason)) => return codec.encode_fault(SCHEMA_FAULT, &reason, None),
        };

        let Some(op) = self.schema.operation(&message.operation) else {
            return codec.encode_fault(NOT_FOUND_FAULT, &message.operation, None);
        };
        debug!(operation = %op.name, "Loopback service dispatch");

        match dispatch(message) {
            Handled::Result { body, headers, form } => Codec::new(&self.schema, form)
                .encode_response(op, body.as_ref(), &headers)
                .unwrap_or_else(|e| codec.encode_fault(SERVER_FAULT, &e.to_string(), None)),
            Handled::Raw(text) => codec.encode_raw_response(op, &text),
            Handled::Fault { code, message, actor } => codec.encode_fault(code, &message, actor),
        }
    }

    pub fn operation(&self, name: &str) -> Option<&OperationDescriptor> {
        self.schema.operation(name)
    }
}

fn midnight_2000() -> chrono::NaiveDateTime {
    NaiveDate::from_ymd_opt(2000, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or_default()
}

fn at_micro(micro: u32) -> chrono::NaiveDateTime {
    NaiveDate::from_ymd_opt(2000, 1, 1)
        .and_then(|d| d.and_hms_micro_opt(1, 1, 1, micro))
        .unwrap_or_default()
}

fn out_header() -> Value {
    Value::Record(
        Record::new(QName::new(SERVICE_NS, "OutHeader"))
            .with("dt", midnight_2000())
            .with("f", 3.141592653),
    )
}

fn dispatch(message: Message) -> Handled {
    let Message { operation, body, headers } = message;
    match operation.as_str() {
        "echo_datetime_with_invalid_format" | "echo_date_with_invalid_format" | "echo_time_with_invalid_format" => {
            Handled::Result {
                body,
                headers: Vec::new(),
                form: TemporalForm::Zulu,
            }
        }
        "echo_datetime" | "echo_date" | "echo_time" | "echo_simple_boolean_array" | "echo_boolean"
        | "echo_enum" | "echo_bytearray" | "echo_integer_array" | "echo_string" | "echo_simple_class"
        | "echo_class_with_self_reference" | "echo_nested_class" | "echo_extension_class"
        | "custom_messages" | "echo_simple_bare" | "echo_complex_bare" => Handled::body(body),
        "non_nillable" | "test_empty" => Handled::body(None),
        "echo_in_header" => Handled::body(headers.into_iter().next()),
        "echo_in_complex_header" => Handled::headers(headers),
        "send_out_header" => Handled::headers(vec![out_header()]),
        "send_out_complex_header" => Handled::headers(vec![
            out_header(),
            Value::Record(
                Record::new(QName::new(SERVICE_NS, "OutTraceHeader"))
                    .with("receiptDate", at_micro(1))
                    .with("returnDate", at_micro(100)),
            ),
        ]),
        "huge_number" => Handled::body(Some(Value::Integer(huge_number().clone()))),
        "long_string" => Handled::body(Some(Value::String(LONG_STRING_BLOCK.repeat(LONG_STRING_REPEAT)))),
        "python_exception" => Handled::Fault {
            code: SERVER_FAULT,
            message: "InternalError: Possible something.".to_string(),
            actor: None,
        },
        "soap_exception" => Handled::Fault {
            code: "soap:Plausible",
            message: "A plausible fault".to_string(),
            actor: Some("http://faultactor.example.com"),
        },
        "complex_return" => {
            let roles = Record::new(QName::new(SERVICE_NS, "RoleEnumArray"))
                .with("RoleEnum", Value::Array(vec![Value::from("MEMBER")]));
            Handled::body(Some(Value::Record(
                Record::new(QName::new(SERVICE_NS, "ComplexReturn"))
                    .with("resultCode", 1)
                    .with("resultDescription", "Test")
                    .with("transactionId", 123)
                    .with("roles", roles),
            )))
        }
        "return_invalid_data" => Handled::Raw("a".to_string()),
        other => Handled::Fault {
            code: NOT_FOUND_FAULT,
            message: format!("Requested resource '{}' not found", other),
            actor: None,
        },
    }
}
