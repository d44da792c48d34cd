//! Header names written by the security handlers.
//!
//! Values here are display-cased; the header map stores them under their
//! lower-case form, which matches the `http` crate's constants.

/// Display-cased header names.
pub mod header_names {
    /// HSTS.
    pub const STRICT_TRANSPORT_SECURITY: &str = "Strict-Transport-Security";
    /// MIME sniffing protection.
    pub const X_CONTENT_TYPE_OPTIONS: &str = "X-Content-Type-Options";
    /// Legacy XSS auditor.
    pub const X_XSS_PROTECTION: &str = "X-XSS-Protection";
    /// CSP.
    pub const CONTENT_SECURITY_POLICY: &str = "Content-Security-Policy";
    pub const CONTENT_TYPE: &str = "Content-Type";
    pub const CONTENT_ENCODING: &str = "Content-Encoding";
}

#[cfg(test)]
mod tests {
    use super::header_names::*;

    #[test]
    fn test_names_match_http_constants() {
        let pairs = [
            (STRICT_TRANSPORT_SECURITY, http::header::STRICT_TRANSPORT_SECURITY),
            (X_CONTENT_TYPE_OPTIONS, http::header::X_CONTENT_TYPE_OPTIONS),
            (X_XSS_PROTECTION, http::header::X_XSS_PROTECTION),
            (CONTENT_SECURITY_POLICY, http::header::CONTENT_SECURITY_POLICY),
            (CONTENT_TYPE, http::header::CONTENT_TYPE),
            (CONTENT_ENCODING, http::header::CONTENT_ENCODING),
        ];

        for (display, name) in pairs {
            assert_eq!(display.to_ascii_lowercase(), name.as_str());
        }
    }
}
