//! Outer invocation boundary.
//!
//! Whatever happens inside the processor, the platform gets its response
//! back whenever one exists. Only a missing response is reported as an
//! error.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use edge_core::{EdgeConfig, Event, Response};
use edge_observability::StructuredLogger;

use crate::processor::{ProcessError, ResponseProcessor};

/// Entry point for one edge invocation.
#[derive(Debug)]
pub struct EdgeHandler {
    processor: ResponseProcessor,
    logger: StructuredLogger,
}

impl EdgeHandler {
    /// Create a handler from configuration and a logger.
    pub fn new(config: Arc<EdgeConfig>, logger: StructuredLogger) -> Self {
        let boundary_logger = logger
            .scoped("handler")
            .with_alarm_tag(config.alarm_log_tag.clone());

        Self {
            processor: ResponseProcessor::new(config, logger),
            logger: boundary_logger,
        }
    }

    /// Wrap an existing processor.
    pub fn from_processor(processor: ResponseProcessor, logger: StructuredLogger) -> Self {
        let logger = logger
            .scoped("handler")
            .with_alarm_tag(processor.config().alarm_log_tag.clone());
        Self { processor, logger }
    }

    /// The wrapped processor.
    pub fn processor(&self) -> &ResponseProcessor {
        &self.processor
    }

    /// Process an event and return its response.
    ///
    /// A fault inside the processor is logged and the response, possibly
    /// partially rewritten, is still returned.
    pub fn handle(&self, mut event: Event) -> Result<Response, ProcessError> {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.processor.process(&mut event)));

        match outcome {
            Ok(Ok(disposition)) => {
                self.logger
                    .debug_builder("response processed")
                    .code("processed")
                    .field("disposition", disposition.to_string())
                    .emit();
            }
            Ok(Err(e)) => return Err(e),
            Err(payload) => {
                self.logger
                    .error_builder("unexpected fault while processing response, passing it through")
                    .code("unexpected_fault")
                    .field("fault", panic_message(payload.as_ref()))
                    .emit();
            }
        }

        event.take_response().ok_or(ProcessError::MissingResponse)
    }

    /// Callback form of [`handle`](Self::handle), shaped like the platform's
    /// `(error, response)` completion. The callback runs exactly once.
    pub fn invoke<F>(&self, event: Event, callback: F)
    where
        F: FnOnce(Option<ProcessError>, Option<Response>),
    {
        match self.handle(event) {
            Ok(response) => callback(None, Some(response)),
            Err(e) => callback(Some(e), None),
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown fault".to_string()
    }
}
