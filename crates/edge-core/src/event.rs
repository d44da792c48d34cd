//! Edge trigger event: the request/response pair handed to a response hook.

use http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::headers::HeaderMap;

/// Inbound event delivered by the edge platform.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Trigger records; only the first one is processed.
    #[serde(rename = "Records", default)]
    pub records: Vec<Record>,
}

/// A single trigger record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Content-delivery payload.
    pub cf: CfRecord,
}

/// Content-delivery payload of a record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CfRecord {
    /// Distribution metadata, passed through untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<Value>,
    /// The viewer request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request: Option<Request>,
    /// The response about to be returned to the viewer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<Response>,
}

/// The viewer request as seen by the response hook.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Request {
    /// Request path (e.g., "/sdk/v1/index.html").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    /// Request headers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<HeaderMap>,
    /// Fields this layer does not interpret (method, clientIp, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Request {
    /// Create a request for a path.
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: Some(uri.into()),
            headers: Some(HeaderMap::new()),
            extra: Map::new(),
        }
    }

    /// Set the `host` header.
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.headers
            .get_or_insert_with(HeaderMap::new)
            .set("Host", host);
        self
    }
}

/// Body encoding of a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BodyEncoding {
    /// Body is plain text.
    Text,
    /// Body is base64-encoded bytes.
    Base64,
}

/// The response record mutated by the security handlers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    /// HTTP status code. Accepted as a number or numeric string, written
    /// back as a string.
    #[serde(with = "status_format")]
    pub status: u16,
    /// Reason phrase.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_description: Option<String>,
    /// Response headers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<HeaderMap>,
    /// Replacement body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    /// Encoding of `body`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_encoding: Option<BodyEncoding>,
    /// Fields this layer does not interpret.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Response {
    /// Create a response with an empty header map.
    pub fn new(status: u16) -> Self {
        Self {
            status,
            status_description: None,
            headers: Some(HeaderMap::new()),
            body: None,
            body_encoding: None,
            extra: Map::new(),
        }
    }

    /// Typed status code, if the numeric value is a valid HTTP status.
    pub fn status_code(&self) -> Option<StatusCode> {
        StatusCode::from_u16(self.status).ok()
    }

    /// Check if the status is a client or server error (400-599).
    pub fn is_error(&self) -> bool {
        self.status_code()
            .is_some_and(|code| code.is_client_error() || code.is_server_error())
    }

    /// Headers, created empty if absent.
    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        self.headers.get_or_insert_with(HeaderMap::new)
    }

    /// First value of a lower-case header name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.as_ref()?.first_value(name)
    }
}

impl Event {
    /// Build a single-record event.
    pub fn new(request: Option<Request>, response: Option<Response>) -> Self {
        Self {
            records: vec![Record {
                cf: CfRecord {
                    config: None,
                    request,
                    response,
                },
            }],
        }
    }

    /// Parse an event from JSON.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// The request of the first record.
    pub fn request(&self) -> Option<&Request> {
        self.records.first()?.cf.request.as_ref()
    }

    /// The response of the first record.
    pub fn response(&self) -> Option<&Response> {
        self.records.first()?.cf.response.as_ref()
    }

    /// Borrow the request immutably and the response mutably.
    pub fn parts_mut(&mut self) -> (Option<&Request>, Option<&mut Response>) {
        match self.records.first_mut() {
            Some(record) => (record.cf.request.as_ref(), record.cf.response.as_mut()),
            None => (None, None),
        }
    }

    /// Take the response out of the first record.
    pub fn take_response(&mut self) -> Option<Response> {
        self.records.first_mut()?.cf.response.take()
    }
}

mod status_format {
    use serde::{de, Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawStatus {
        Number(u16),
        Text(String),
    }

    pub fn serialize<S: Serializer>(status: &u16, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&status.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u16, D::Error> {
        match RawStatus::deserialize(deserializer)? {
            RawStatus::Number(n) => Ok(n),
            RawStatus::Text(text) => text
                .trim()
                .parse()
                .map_err(|_| de::Error::custom(format!("invalid status code: {:?}", text))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "Records": [{
            "cf": {
                "config": {"distributionId": "EDFDVBD6EXAMPLE"},
                "request": {
                    "clientIp": "203.0.113.178",
                    "method": "GET",
                    "uri": "/index.html",
                    "headers": {"host": [{"key": "Host", "value": "sdk.example.com"}]}
                },
                "response": {
                    "status": "200",
                    "statusDescription": "OK",
                    "headers": {"server": [{"key": "Server", "value": "AmazonS3"}]}
                }
            }
        }]
    }"#;

    // === Parsing Tests ===

    #[test]
    fn test_parse_sample_event() {
        let event = Event::from_json(SAMPLE).unwrap();

        let request = event.request().unwrap();
        assert_eq!(request.uri.as_deref(), Some("/index.html"));
        assert_eq!(request.extra["method"], "GET");

        let response = event.response().unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(response.header("server"), Some("AmazonS3"));
    }

    #[test]
    fn test_status_accepts_number() {
        let response: Response = serde_json::from_str(r#"{"status": 404}"#).unwrap();
        assert_eq!(response.status, 404);
        assert!(response.headers.is_none());
    }

    #[test]
    fn test_status_rejects_garbage() {
        let result: Result<Response, _> = serde_json::from_str(r#"{"status": "ok"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_status_written_as_string() {
        let json = serde_json::to_value(Response::new(302)).unwrap();
        assert_eq!(json["status"], "302");
    }

    #[test]
    fn test_unknown_fields_preserved() {
        let event = Event::from_json(SAMPLE).unwrap();
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["Records"][0]["cf"]["config"]["distributionId"], "EDFDVBD6EXAMPLE");
        assert_eq!(json["Records"][0]["cf"]["request"]["clientIp"], "203.0.113.178");
        assert_eq!(json["Records"][0]["cf"]["response"]["statusDescription"], "OK");
    }

    // === Status Classification Tests ===

    #[test]
    fn test_is_error() {
        assert!(!Response::new(200).is_error());
        assert!(!Response::new(399).is_error());
        assert!(Response::new(400).is_error());
        assert!(Response::new(404).is_error());
        assert!(Response::new(599).is_error());
        assert!(!Response::new(600).is_error());
    }

    // === Accessor Tests ===

    #[test]
    fn test_parts_mut_on_empty_event() {
        let mut event = Event::default();
        let (request, response) = event.parts_mut();
        assert!(request.is_none());
        assert!(response.is_none());
    }

    #[test]
    fn test_take_response() {
        let mut event = Event::new(None, Some(Response::new(200)));
        assert!(event.take_response().is_some());
        assert!(event.response().is_none());
    }

    #[test]
    fn test_request_with_host() {
        let request = Request::new("/").with_host("km.example.com");
        let headers = request.headers.unwrap();
        assert_eq!(headers.first_value("host"), Some("km.example.com"));
    }
}
