//! Observability infrastructure for the edge response security layer.
//!
//! This crate provides:
//! - `LogEvent` - A structured event (level, tag, code, fields)
//! - `EventSink` - Where events go (stderr, `tracing`, memory)
//! - `StructuredLogger` - Tagged logger handed to every component
//!
//! Components never print directly; they emit events through an injected
//! sink so decision logic stays testable without capturing output.

mod logging;
mod sink;

pub use logging::*;
pub use sink::*;
