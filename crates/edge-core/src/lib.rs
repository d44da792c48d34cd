//! Core abstractions for the edge response security layer.
//!
//! This crate provides the fundamental types:
//! - `Event` - The edge trigger record (request + response pair)
//! - `Request` / `Response` - The records handlers inspect and mutate
//! - `HeaderMap` - Headers in the edge platform's `[{key, value}]` shape
//! - `EdgeConfig` - Static, process-wide configuration

mod config;
mod event;
mod headers;

pub use config::*;
pub use event::*;
pub use headers::*;
