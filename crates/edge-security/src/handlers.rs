//! Response handler interface.

use edge_core::Response;

/// Host and path a response was requested for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestTarget {
    /// Resolved `host` header value.
    pub host: String,
    /// Request URI, `/` when absent.
    pub path: String,
}

impl RequestTarget {
    /// Create a request target.
    pub fn new(host: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            path: path.into(),
        }
    }
}

/// A step that mutates a response in place.
pub trait ResponseHandler: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Apply the handler to `response`.
    fn apply(&self, response: &mut Response, target: &RequestTarget);
}
