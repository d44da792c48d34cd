//! Baseline security headers added to every response.

use edge_core::Response;

use crate::handlers::{RequestTarget, ResponseHandler};
use crate::headers::header_names;

/// HSTS for two years, subdomains included, preload-eligible.
pub const HSTS_VALUE: &str = "max-age=63072000; includeSubdomains; preload";
/// Disable MIME sniffing.
pub const NOSNIFF_VALUE: &str = "nosniff";
/// XSS auditor in block mode.
pub const XSS_PROTECTION_VALUE: &str = "1; mode=block";

/// Set the baseline headers, overwriting previous values.
pub fn apply_basic_headers(response: &mut Response) {
    let headers = response.headers_mut();
    headers.set(header_names::STRICT_TRANSPORT_SECURITY, HSTS_VALUE);
    headers.set(header_names::X_CONTENT_TYPE_OPTIONS, NOSNIFF_VALUE);
    headers.set(header_names::X_XSS_PROTECTION, XSS_PROTECTION_VALUE);
}

/// Handler form of [`apply_basic_headers`].
#[derive(Debug, Clone, Copy, Default)]
pub struct BasicHeaders;

impl ResponseHandler for BasicHeaders {
    fn name(&self) -> &'static str {
        "basic_headers"
    }

    fn apply(&self, response: &mut Response, _target: &RequestTarget) {
        apply_basic_headers(response);
    }
}
