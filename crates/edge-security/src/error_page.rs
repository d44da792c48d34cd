//! Error page: replaces 4xx/5xx bodies with an inline redirect.
//!
//! No CSP is added on this path. A `script-src` policy would block the
//! inline redirect script.

use std::io::Write;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use edge_core::{BodyEncoding, Response};
use edge_observability::StructuredLogger;
use flate2::write::GzEncoder;
use flate2::Compression;

use crate::handlers::{RequestTarget, ResponseHandler};
use crate::headers::header_names;

/// Content type of the redirect page.
pub const HTML_CONTENT_TYPE: &str = "text/html; charset=utf-8";

/// Errors from body compression.
#[derive(Debug, thiserror::Error)]
pub enum CompressionError {
    #[error("compression failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("compression failed: {0}")]
    Other(String),
}

/// Compresses response bodies.
pub trait BodyCompressor: Send + Sync {
    /// Value for the `content-encoding` header.
    fn content_encoding(&self) -> &'static str;

    /// Compress `body`.
    fn compress(&self, body: &[u8]) -> Result<Vec<u8>, CompressionError>;
}

/// Gzip compressor backed by `flate2`.
#[derive(Debug, Clone, Copy)]
pub struct GzipCompressor {
    level: Compression,
}

impl GzipCompressor {
    /// Create a gzip compressor with an explicit level.
    pub fn new(level: Compression) -> Self {
        Self { level }
    }
}

impl Default for GzipCompressor {
    fn default() -> Self {
        Self::new(Compression::default())
    }
}

impl BodyCompressor for GzipCompressor {
    fn content_encoding(&self) -> &'static str {
        "gzip"
    }

    fn compress(&self, body: &[u8]) -> Result<Vec<u8>, CompressionError> {
        let mut encoder = GzEncoder::new(Vec::new(), self.level);
        encoder.write_all(body)?;
        Ok(encoder.finish()?)
    }
}

/// Inline script that navigates the browser to `redirect_url`.
pub fn redirect_body(redirect_url: &str) -> String {
    format!(
        r#"<script type="text/javascript">window.location="{}"</script>"#,
        redirect_url
    )
}

/// Rewrites failure responses into a redirect page.
pub struct ErrorResponder {
    body: String,
    compressor: Box<dyn BodyCompressor>,
    logger: StructuredLogger,
}

impl std::fmt::Debug for ErrorResponder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErrorResponder")
            .field("body", &self.body)
            .field("content_encoding", &self.compressor.content_encoding())
            .finish_non_exhaustive()
    }
}

impl ErrorResponder {
    /// Create a responder redirecting to `redirect_url`, gzip-compressed.
    pub fn new(redirect_url: &str, logger: StructuredLogger) -> Self {
        Self {
            body: redirect_body(redirect_url),
            compressor: Box::new(GzipCompressor::default()),
            logger,
        }
    }

    /// Replace the body compressor.
    pub fn with_compressor(mut self, compressor: Box<dyn BodyCompressor>) -> Self {
        self.compressor = compressor;
        self
    }

    /// The uncompressed redirect page.
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Rewrite `response` into the redirect page.
    pub fn respond(&self, response: &mut Response) {
        response
            .headers_mut()
            .set(header_names::CONTENT_TYPE, HTML_CONTENT_TYPE);

        match self.compressor.compress(self.body.as_bytes()) {
            Ok(compressed) => {
                response.body = Some(STANDARD.encode(compressed));
                response.body_encoding = Some(BodyEncoding::Base64);
                response.headers_mut().set(
                    header_names::CONTENT_ENCODING,
                    self.compressor.content_encoding(),
                );
            }
            Err(e) => {
                self.logger
                    .error_builder("could not compress error page, sending plain body")
                    .code("compress_failed")
                    .field("error", e.to_string())
                    .emit();

                response.body = Some(self.body.clone());
                response.body_encoding = Some(BodyEncoding::Text);
                response
                    .headers_mut()
                    .remove(http::header::CONTENT_ENCODING.as_str());
            }
        }
    }
}

impl ResponseHandler for ErrorResponder {
    fn name(&self) -> &'static str {
        "error_page"
    }

    fn apply(&self, response: &mut Response, _target: &RequestTarget) {
        self.respond(response);
    }
}
