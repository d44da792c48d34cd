//! Security headers and Content-Security-Policy for edge responses.
//!
//! This crate provides:
//! - `apply_basic_headers` - HSTS, nosniff and XSS protection on every response
//! - `ErrorResponder` - 4xx/5xx bodies replaced by an inline redirect page
//! - `KeyManagerPolicy` / `SdkPolicy` - host-specific CSP builders
//! - `ResponseProcessor` - Classifies a response and applies the handlers
//! - `EdgeHandler` - Invocation boundary that always hands the response back
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use edge_core::{EdgeConfig, Event};
//! use edge_observability::{LogFormat, StderrSink, StructuredLogger};
//! use edge_security::EdgeHandler;
//!
//! let config = Arc::new(EdgeConfig::load_validated("edge.toml")?);
//! let logger = StructuredLogger::new(Arc::new(StderrSink::new(LogFormat::Json)));
//! let handler = EdgeHandler::new(config, logger);
//!
//! let response = handler.handle(Event::from_json(&payload)?)?;
//! ```

mod basic;
mod boundary;
mod csp;
mod error_page;
mod handlers;
mod headers;
mod key_manager;
mod processor;
mod sdk;
mod trim;

pub use basic::*;
pub use boundary::*;
pub use csp::*;
pub use error_page::*;
pub use handlers::*;
pub use headers::*;
pub use key_manager::*;
pub use processor::*;
pub use sdk::*;
pub use trim::*;
