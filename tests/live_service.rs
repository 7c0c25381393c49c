// tests/live_service.rs
// Runner, invoker and server lifecycle over real HTTP against a local stub service

use soap_interop::client::loopback::schema::interop_schema;
use soap_interop::client::loopback::service::InteropService;
use soap_interop::client::{ClientError, HttpClient, OperationCall, SoapClient};
use soap_interop::config::HarnessConfig;
use soap_interop::http::create_shared_client;
use soap_interop::invoker::{OperationInvoker, Outcome};
use soap_interop::scenario::{RunnerConfig, Scenario, ScenarioRunner, ScenarioStatus, interop_catalog};
use soap_interop::schema::BodyStyle;
use soap_interop::value::Value;
use soap_interop::{HarnessError, server};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

const WSDL: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<wsdl:definitions xmlns:wsdl="http://schemas.xmlsoap.org/wsdl/"
                  xmlns:soap="http://schemas.xmlsoap.org/wsdl/soap/"
                  xmlns:xs="http://www.w3.org/2001/XMLSchema"
                  xmlns:tns="spyne.test.interop.server"
                  targetNamespace="spyne.test.interop.server" name="Application">
  <wsdl:types>
    <xs:schema targetNamespace="spyne.test.interop.server" elementFormDefault="qualified">
      <xs:complexType name="SimpleClass">
        <xs:sequence>
          <xs:element name="i" type="xs:integer" minOccurs="0" nillable="true"/>
          <xs:element name="s" type="xs:string" minOccurs="0" nillable="true"/>
        </xs:sequence>
      </xs:complexType>
      <xs:complexType name="echo_string">
        <xs:sequence><xs:element name="s" type="xs:string" minOccurs="0" nillable="true"/></xs:sequence>
      </xs:complexType>
      <xs:complexType name="echo_stringResponse">
        <xs:sequence><xs:element name="echo_stringResult" type="xs:string" minOccurs="0" nillable="true"/></xs:sequence>
      </xs:complexType>
      <xs:complexType name="echo_simple_class">
        <xs:sequence><xs:element name="sc" type="tns:SimpleClass" minOccurs="0" nillable="true"/></xs:sequence>
      </xs:complexType>
      <xs:complexType name="echo_simple_classResponse">
        <xs:sequence><xs:element name="echo_simple_classResult" type="tns:SimpleClass" minOccurs="0" nillable="true"/></xs:sequence>
      </xs:complexType>
      <xs:complexType name="echo_datetime">
        <xs:sequence><xs:element name="dt" type="xs:dateTime" minOccurs="0" nillable="true"/></xs:sequence>
      </xs:complexType>
      <xs:complexType name="echo_datetimeResponse">
        <xs:sequence><xs:element name="echo_datetimeResult" type="xs:dateTime" minOccurs="0" nillable="true"/></xs:sequence>
      </xs:complexType>
      <xs:complexType name="soap_exception"><xs:sequence/></xs:complexType>
      <xs:complexType name="soap_exceptionResponse"><xs:sequence/></xs:complexType>
      <xs:complexType name="return_invalid_data"><xs:sequence/></xs:complexType>
      <xs:complexType name="return_invalid_dataResponse">
        <xs:sequence><xs:element name="return_invalid_dataResult" type="xs:integer" minOccurs="0" nillable="true"/></xs:sequence>
      </xs:complexType>
      <xs:element name="echo_string" type="tns:echo_string"/>
      <xs:element name="echo_stringResponse" type="tns:echo_stringResponse"/>
      <xs:element name="echo_simple_class" type="tns:echo_simple_class"/>
      <xs:element name="echo_simple_classResponse" type="tns:echo_simple_classResponse"/>
      <xs:element name="echo_datetime" type="tns:echo_datetime"/>
      <xs:element name="echo_datetimeResponse" type="tns:echo_datetimeResponse"/>
      <xs:element name="soap_exception" type="tns:soap_exception"/>
      <xs:element name="soap_exceptionResponse" type="tns:soap_exceptionResponse"/>
      <xs:element name="return_invalid_data" type="tns:return_invalid_data"/>
      <xs:element name="return_invalid_dataResponse" type="tns:return_invalid_dataResponse"/>
    </xs:schema>
  </wsdl:types>
  <wsdl:message name="echo_string"><wsdl:part name="echo_string" element="tns:echo_string"/></wsdl:message>
  <wsdl:message name="echo_stringResponse"><wsdl:part name="echo_stringResponse" element="tns:echo_stringResponse"/></wsdl:message>
  <wsdl:message name="echo_simple_class"><wsdl:part name="echo_simple_class" element="tns:echo_simple_class"/></wsdl:message>
  <wsdl:message name="echo_simple_classResponse"><wsdl:part name="echo_simple_classResponse" element="tns:echo_simple_classResponse"/></wsdl:message>
  <wsdl:message name="echo_datetime"><wsdl:part name="echo_datetime" element="tns:echo_datetime"/></wsdl:message>
  <wsdl:message name="echo_datetimeResponse"><wsdl:part name="echo_datetimeResponse" element="tns:echo_datetimeResponse"/></wsdl:message>
  <wsdl:message name="soap_exception"><wsdl:part name="soap_exception" element="tns:soap_exception"/></wsdl:message>
  <wsdl:message name="soap_exceptionResponse"><wsdl:part name="soap_exceptionResponse" element="tns:soap_exceptionResponse"/></wsdl:message>
  <wsdl:message name="return_invalid_data"><wsdl:part name="return_invalid_data" element="tns:return_invalid_data"/></wsdl:message>
  <wsdl:message name="return_invalid_dataResponse"><wsdl:part name="return_invalid_dataResponse" element="tns:return_invalid_dataResponse"/></wsdl:message>
  <wsdl:portType name="Application">
    <wsdl:operation name="echo_string">
      <wsdl:input message="tns:echo_string"/><wsdl:output message="tns:echo_stringResponse"/>
    </wsdl:operation>
    <wsdl:operation name="echo_simple_class">
      <wsdl:input message="tns:echo_simple_class"/><wsdl:output message="tns:echo_simple_classResponse"/>
    </wsdl:operation>
    <wsdl:operation name="echo_datetime">
      <wsdl:input message="tns:echo_datetime"/><wsdl:output message="tns:echo_datetimeResponse"/>
    </wsdl:operation>
    <wsdl:operation name="soap_exception">
      <wsdl:input message="tns:soap_exception"/><wsdl:output message="tns:soap_exceptionResponse"/>
    </wsdl:operation>
    <wsdl:operation name="return_invalid_data">
      <wsdl:input message="tns:return_invalid_data"/><wsdl:output message="tns:return_invalid_dataResponse"/>
    </wsdl:operation>
  </wsdl:portType>
  <wsdl:service name="Application">
    <wsdl:port name="Application" binding="tns:Application">
      <soap:address location="http://localhost:9754/"/>
    </wsdl:port>
  </wsdl:service>
</wsdl:definitions>"#;

const PUBLISHED: &[&str] = &[
    "echo_string",
    "echo_simple_class",
    "echo_datetime",
    "soap_exception",
    "return_invalid_data",
];

// ============================================================================
// Stub service
// ============================================================================

struct Stub {
    endpoint: String,
    /// SOAPAction header of every POST, in arrival order
    actions: Arc<Mutex<Vec<String>>>,
}

/// Read one request: header block and Content-Length body
async fn read_request(socket: &mut TcpStream) -> (String, String) {
    let mut data = Vec::new();
    let mut buf = [0u8; 8192];
    loop {
        let n = socket.read(&mut buf).await.unwrap_or(0);
        if n == 0 {
            break;
        }
        data.extend_from_slice(&buf[..n]);
        let Some(end) = data.windows(4).position(|w| w == b"\r\n\r\n") else {
            continue;
        };
        let head = String::from_utf8_lossy(&data[..end]).into_owned();
        let length = header(&head, "content-length")
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(0);
        if data.len() >= end + 4 + length {
            let body = String::from_utf8_lossy(&data[end + 4..end + 4 + length]).into_owned();
            return (head, body);
        }
    }
    (String::from_utf8_lossy(&data).into_owned(), String::new())
}

fn header(head: &str, name: &str) -> Option<String> {
    head.lines()
        .filter_map(|line| line.split_once(':'))
        .find(|(key, _)| key.trim().eq_ignore_ascii_case(name))
        .map(|(_, value)| value.trim().to_string())
}

/// Serve the WSDL on GET with `wsdl_status` and answer POSTs from the
/// in-process interop service
async fn start_stub(wsdl_status: &'static str) -> Stub {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let endpoint = format!("http://{}/", listener.local_addr().unwrap());
    let actions = Arc::new(Mutex::new(Vec::new()));
    let seen = actions.clone();
    let service = Arc::new(InteropService::new(Arc::new(interop_schema())));

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let service = service.clone();
            let seen = seen.clone();
            tokio::spawn(async move {
                let (head, body) = read_request(&mut socket).await;
                let (status, reply) = if head.starts_with("GET") {
                    (wsdl_status, WSDL.to_string())
                } else {
                    if let Some(action) = header(&head, "soapaction") {
                        seen.lock().unwrap().push(action);
                    }
                    let reply = service.handle(&body);
                    let status = if reply.contains("<soap:Fault>") {
                        "500 Internal Server Error"
                    } else {
                        "200 OK"
                    };
                    (status, reply)
                };
                let response = format!(
                    "HTTP/1.1 {}\r\nContent-Type: text/xml; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    reply.len(),
                    reply
                );
                let _ = socket.write_all(response.as_bytes()).await;
            });
        }
    });

    Stub { endpoint, actions }
}

fn config(endpoint: &str) -> HarnessConfig {
    HarnessConfig {
        endpoint: endpoint.to_string(),
        startup_timeout: Duration::from_secs(2),
        request_timeout: Duration::from_secs(10),
        ..Default::default()
    }
}

async fn closed_endpoint() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}/", addr)
}

// ============================================================================
// Round trips
// ============================================================================

#[tokio::test]
async fn test_catalog_scenarios_pass_over_http() {
    let stub = start_stub("200 OK").await;
    let (managed, client) = server::connect(&config(&stub.endpoint)).await.unwrap();
    assert!(!managed.is_spawned());

    let scenarios: Vec<Scenario> = interop_catalog()
        .into_iter()
        .filter(|s| PUBLISHED.contains(&s.operation.as_str()))
        .collect();
    assert_eq!(scenarios.len(), 6);

    let results = ScenarioRunner::new(Arc::new(client), RunnerConfig::default())
        .run_scenarios(&scenarios)
        .await;
    for result in &results {
        assert_eq!(
            result.status,
            ScenarioStatus::Passed,
            "{}: {:?} {:?}",
            result.scenario_name,
            result.error,
            result.diffs
        );
    }

    // One POST per scenario, each tagged with its operation
    let actions = stub.actions.lock().unwrap().clone();
    assert_eq!(actions.len(), scenarios.len());
    assert!(actions.contains(&"\"echo_simple_class\"".to_string()));
    managed.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_schema_comes_from_the_wsdl() {
    let stub = start_stub("200 OK").await;
    let client = HttpClient::connect(create_shared_client(Duration::from_secs(5)), &config(&stub.endpoint))
        .await
        .unwrap();
    let schema = client.schema();
    assert_eq!(schema.operation_names(), {
        let mut names = PUBLISHED.to_vec();
        names.sort_unstable();
        names
    });
    assert_eq!(schema.operation("soap_exception").unwrap().style, BodyStyle::Empty);
    assert!(schema.operation("echo_nested_class").is_none());
}

#[tokio::test]
async fn test_echo_string_over_http() {
    let stub = start_stub("200 OK").await;
    let client = HttpClient::connect(create_shared_client(Duration::from_secs(5)), &config(&stub.endpoint))
        .await
        .unwrap();
    let outcome = OperationInvoker::new(Arc::new(client))
        .invoke(&OperationCall::new("echo_string").with_argument(Value::from("héllo <&>")))
        .await
        .unwrap();
    assert_eq!(
        outcome,
        Outcome::Success {
            result: Some(Value::from("héllo <&>")),
            headers: vec![]
        }
    );
}

// ============================================================================
// Server lifecycle
// ============================================================================

#[tokio::test]
async fn test_answering_endpoint_is_reused() {
    let stub = start_stub("200 OK").await;
    let mut config = config(&stub.endpoint);
    // Would fail if the harness tried to start anything
    config.server_command = Some("exit 1".to_string());

    let http = create_shared_client(Duration::from_secs(5));
    let managed = server::ensure_running(&http, &config).await.unwrap();
    assert!(!managed.is_spawned());
    assert_eq!(managed.wsdl_url, config.wsdl_url());
    managed.shutdown().await.unwrap();

    // Shutdown leaves a reused server running
    assert!(soap_interop::http::answers(&http, &config.wsdl_url()).await);
}

// ============================================================================
// Failures
// ============================================================================

#[tokio::test]
async fn test_wsdl_error_status_is_schema_resolution() {
    let stub = start_stub("500 Internal Server Error").await;
    let err = HttpClient::connect(create_shared_client(Duration::from_secs(5)), &config(&stub.endpoint))
        .await
        .err()
        .unwrap();
    assert!(matches!(err, HarnessError::SchemaResolution { ref reason, .. } if reason.contains("WSDL fetch failed")));
}

#[tokio::test]
async fn test_unreachable_wsdl_is_schema_resolution() {
    let endpoint = closed_endpoint().await;
    let err = HttpClient::connect(create_shared_client(Duration::from_secs(5)), &config(&endpoint))
        .await
        .err()
        .unwrap();
    assert!(matches!(err, HarnessError::SchemaResolution { .. }));
}

#[tokio::test]
async fn test_connection_refused_propagates_as_transport() {
    let endpoint = closed_endpoint().await;
    let client = HttpClient::with_schema(
        create_shared_client(Duration::from_secs(5)),
        endpoint,
        interop_schema(),
        Duration::from_secs(5),
    );
    let client = Arc::new(client);

    let err = OperationInvoker::new(client.clone())
        .invoke(&OperationCall::new("echo_string").with_argument(Value::from("x")))
        .await
        .unwrap_err();
    assert!(matches!(err, HarnessError::Client(ClientError::Transport(_))));

    let scenarios: Vec<Scenario> = interop_catalog()
        .into_iter()
        .filter(|s| s.name == "echo_string")
        .collect();
    let results = ScenarioRunner::new(client, RunnerConfig::default())
        .run_scenarios(&scenarios)
        .await;
    assert_eq!(results[0].status, ScenarioStatus::Failed);
    assert!(!results[0].harness_bug);
    assert!(results[0].error.as_deref().unwrap_or("").contains("transport error"));
}

#[tokio::test]
async fn test_dead_endpoint_without_command_fails_to_connect() {
    let endpoint = closed_endpoint().await;
    let err = server::connect(&config(&endpoint)).await.err().unwrap();
    assert!(matches!(err, HarnessError::ServerStartup(_)));
}
