//! End-to-end tests: recorded edge events through `EdgeHandler`.

use std::io::Read;
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use edge_core::{BodyEncoding, EdgeConfig, Event, HeaderEntry, Request, Response};
use edge_observability::{LogLevel, MemorySink, StructuredLogger};
use edge_security::{
    parse_policy, redirect_body, Disposition, EdgeHandler, PassThroughReason, Policy,
    ProcessError, ResponseProcessor, DEFAULT_DIRECTIVES, HSTS_VALUE,
};
use flate2::read::GzDecoder;

const CONFIG: &str = include_str!("fixtures/config.json");
const SDK_EVENT: &str = include_str!("fixtures/sdk_response.json");
const NOT_FOUND_EVENT: &str = include_str!("fixtures/not_found_response.json");

fn config() -> Arc<EdgeConfig> {
    let config = EdgeConfig::from_json(CONFIG).unwrap();
    config.validate().unwrap();
    Arc::new(config)
}

fn handler() -> (EdgeHandler, Arc<MemorySink>) {
    let sink = Arc::new(MemorySink::new());
    let logger = StructuredLogger::new(sink.clone()).with_min_level(LogLevel::Debug);
    (EdgeHandler::new(config(), logger), sink)
}

fn event(host: &str, path: &str, status: u16) -> Event {
    Event::new(
        Some(Request::new(path).with_host(host)),
        Some(Response::new(status)),
    )
}

fn csp(response: &Response) -> Vec<String> {
    response
        .header("content-security-policy")
        .map(|v| parse_policy(v).into_iter().map(String::from).collect())
        .unwrap_or_default()
}

fn assert_basic_headers(response: &Response) {
    assert_eq!(response.header("strict-transport-security"), Some(HSTS_VALUE));
    assert_eq!(response.header("x-content-type-options"), Some("nosniff"));
    assert_eq!(response.header("x-xss-protection"), Some("1; mode=block"));
}

fn decoded_body(response: &Response) -> String {
    let body = response.body.as_deref().unwrap();
    match response.body_encoding {
        Some(BodyEncoding::Base64) => {
            let bytes = STANDARD.decode(body).unwrap();
            let mut out = String::new();
            GzDecoder::new(bytes.as_slice()).read_to_string(&mut out).unwrap();
            out
        }
        _ => body.to_string(),
    }
}

// === Scenario Tests ===

#[test]
fn test_key_manager_scenario() {
    let (handler, _) = handler();

    let response = handler
        .handle(event("km.example.com", "/a/index.html", 200))
        .unwrap();

    assert_basic_headers(&response);
    let policy = csp(&response);
    let scripts: Vec<&String> = policy.iter().filter(|d| d.starts_with("script-src")).collect();
    assert_eq!(
        scripts,
        vec!["script-src https://js.example.com/a/ost-sdk-key-manager-script.js"]
    );
    assert!(!policy.iter().any(|d| d.starts_with("frame-src")));
    assert!(!policy.iter().any(|d| d.starts_with("connect-src")));
    assert_eq!(&policy[..DEFAULT_DIRECTIVES.len()], &DEFAULT_DIRECTIVES[..]);
}

#[test]
fn test_sdk_event_fixture() {
    let (handler, sink) = handler();

    let response = handler.handle(Event::from_json(SDK_EVENT).unwrap()).unwrap();

    assert_basic_headers(&response);
    let policy = csp(&response);
    let n = DEFAULT_DIRECTIVES.len();
    assert_eq!(&policy[..n], &DEFAULT_DIRECTIVES[..]);
    assert_eq!(
        &policy[n..],
        &[
            "script-src https://js.example.com/sdk/v1/ost-sdk-iframe-script.js",
            "frame-src https://*.example.com/sdk/v1/index.html",
            "connect-src https://api.example.com/",
        ]
    );

    // Untouched origin headers survive.
    assert_eq!(response.header("server"), Some("AmazonS3"));
    assert_eq!(response.header("content-type"), Some("text/html"));
    assert_eq!(response.status_description.as_deref(), Some("OK"));
    assert!(sink.has_code("policy_matched"));
}

#[test]
fn test_not_found_scenario() {
    let (handler, sink) = handler();

    let response = handler
        .handle(Event::from_json(NOT_FOUND_EVENT).unwrap())
        .unwrap();

    assert_basic_headers(&response);
    assert_eq!(response.header("content-type"), Some("text/html; charset=utf-8"));
    assert_eq!(response.header("content-encoding"), Some("gzip"));
    assert_eq!(response.body_encoding, Some(BodyEncoding::Base64));
    assert_eq!(decoded_body(&response), redirect_body("about:blank"));
    assert!(csp(&response).is_empty());
    assert!(!sink.has_code("csp_set"));
}

#[test]
fn test_every_failure_status_gets_redirect_page() {
    let (handler, _) = handler();

    for status in [400, 401, 403, 404, 451, 499, 500, 502, 503, 599] {
        for host in ["km.example.com", "sdk.example.com", "cdn.example.com"] {
            let response = handler.handle(event(host, "/index.html", status)).unwrap();
            assert_basic_headers(&response);
            assert_eq!(decoded_body(&response), redirect_body("about:blank"));
            assert!(csp(&response).is_empty(), "status {} host {}", status, host);
        }
    }
}

#[test]
fn test_non_failure_statuses_keep_body() {
    let (handler, _) = handler();

    for status in [200, 204, 301, 304, 399, 600] {
        let response = handler.handle(event("sdk.example.com", "/", status)).unwrap();
        assert!(response.body.is_none());
        assert_eq!(csp(&response).len(), DEFAULT_DIRECTIVES.len() + 3);
    }
}

// === Defensive Path Tests ===

#[test]
fn test_missing_request_returns_original_response() {
    let (handler, sink) = handler();
    let original = Response::new(200);

    let mut calls = 0;
    handler.invoke(Event::new(None, Some(original.clone())), |err, response| {
        calls += 1;
        assert!(err.is_none());
        assert_eq!(response.as_ref(), Some(&original));
    });

    assert_eq!(calls, 1);
    assert!(sink.has_code("request_missing"));
}

#[test]
fn test_missing_headers_returns_original_response() {
    let (handler, _) = handler();
    let mut json: serde_json::Value = serde_json::from_str(SDK_EVENT).unwrap();
    json["Records"][0]["cf"]["response"]
        .as_object_mut()
        .unwrap()
        .remove("headers");
    let event: Event = serde_json::from_value(json).unwrap();
    let original = event.response().cloned();

    let response = handler.handle(event).unwrap();
    assert_eq!(Some(response), original);
}

#[test]
fn test_missing_response_is_reported() {
    let (handler, sink) = handler();
    let mut event = event("km.example.com", "/", 200);
    event.take_response();

    assert_eq!(handler.handle(event), Err(ProcessError::MissingResponse));
    assert_eq!(sink.at_least(LogLevel::Error)[0].alarm.as_deref(), Some("EDGE_ALARM"));
}

// === Processor Dispositions ===

#[test]
fn test_dispositions() {
    let logger = StructuredLogger::new(Arc::new(MemorySink::new()));
    let processor = ResponseProcessor::new(config(), logger);
    let secured = |policies: Vec<Policy>| Disposition::Secured { policies };

    let cases = [
        (event("km.example.com", "/", 200), secured(vec![Policy::KeyManager])),
        (event("sdk.example.com", "/", 200), secured(vec![Policy::Sdk])),
        (event("cdn.example.com", "/", 200), secured(vec![])),
        (event("km.example.com", "/", 503), Disposition::ErrorPage),
        (
            Event::new(Some(Request::new("/")), Some(Response::new(200))),
            Disposition::PassedThrough { reason: PassThroughReason::UnresolvedHost },
        ),
    ];

    for (mut event, expected) in cases {
        assert_eq!(processor.process(&mut event).unwrap(), expected);
    }
}

#[test]
fn test_output_keeps_platform_header_shape() {
    let (handler, _) = handler();
    let response = handler.handle(Event::from_json(SDK_EVENT).unwrap()).unwrap();

    for (name, entries) in response.headers.as_ref().unwrap() {
        assert_eq!(name, &name.to_ascii_lowercase());
        assert_eq!(entries.len(), 1, "header {}", name);
    }

    let csp_entry = response.headers.as_ref().unwrap().get("content-security-policy").unwrap();
    assert_eq!(csp_entry[0].key.as_deref(), Some("Content-Security-Policy"));

    let json = serde_json::to_value(&response).unwrap();
    assert_eq!(json["status"], "200");
    let etag = HeaderEntry::new("ETag", "\"b1946ac92492d2347c6235b4d2611184\"");
    assert_eq!(json["headers"]["etag"][0], serde_json::to_value(etag).unwrap());
}
