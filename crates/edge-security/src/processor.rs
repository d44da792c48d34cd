//! Response processor: classifies a response and applies the handlers.
//!
//! ```text
//! Start -> ValidateResponse -> ValidateRequest -> ValidateHeaders
//!       -> ResolveHost -> ApplyBasicHeaders -> ErrorPage | Policies -> Done
//! ```
//!
//! Failure statuses take the error page and stop: a CSP layered on top
//! would block the page's inline redirect. Otherwise the key-manager and
//! SDK prefixes are tested independently, so a host matching both gets
//! both policies and the SDK one, written last, wins.

use std::fmt;
use std::sync::Arc;

use edge_core::{EdgeConfig, Event, Request, Response};
use edge_observability::StructuredLogger;
use serde::Serialize;

use crate::basic::BasicHeaders;
use crate::error_page::{BodyCompressor, ErrorResponder};
use crate::handlers::{RequestTarget, ResponseHandler};
use crate::key_manager::KeyManagerPolicy;
use crate::sdk::SdkPolicy;

/// Upper-case spelling some clients send for the host header.
const HOST_UPPER: &str = "HOST";

/// Errors that stop processing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProcessError {
    /// The event carries no response; the trigger is misconfigured.
    #[error("could not access response object; check the edge trigger configuration")]
    MissingResponse,
}

/// Why a response was passed through untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PassThroughReason {
    MissingRequest,
    MissingHeaders,
    UnresolvedHost,
}

impl PassThroughReason {
    /// Stable log code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingRequest => "request_missing",
            Self::MissingHeaders => "headers_missing",
            Self::UnresolvedHost => "host_unresolved",
        }
    }
}

impl fmt::Display for PassThroughReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingRequest => write!(f, "request is missing"),
            Self::MissingHeaders => write!(f, "response headers are missing"),
            Self::UnresolvedHost => write!(f, "request host could not be determined"),
        }
    }
}

/// Content-Security-Policy applied to a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Policy {
    KeyManager,
    Sdk,
}

/// What the processor did with a response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Disposition {
    /// Response returned unmodified.
    PassedThrough { reason: PassThroughReason },
    /// Basic headers plus the error redirect page.
    ErrorPage,
    /// Basic headers plus zero or more policies, in application order.
    Secured { policies: Vec<Policy> },
}

impl fmt::Display for Disposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PassedThrough { reason } => write!(f, "passed through ({})", reason),
            Self::ErrorPage => write!(f, "error page"),
            Self::Secured { policies } if policies.is_empty() => write!(f, "basic headers"),
            Self::Secured { policies } => write!(f, "secured with {:?}", policies),
        }
    }
}

/// Applies the security handlers to one response per call.
///
/// Holds no per-invocation state; one processor serves every invocation.
#[derive(Debug)]
pub struct ResponseProcessor {
    config: Arc<EdgeConfig>,
    logger: StructuredLogger,
    basic: BasicHeaders,
    error_page: ErrorResponder,
    key_manager: KeyManagerPolicy,
    sdk: SdkPolicy,
}

impl ResponseProcessor {
    /// Create a processor. Error-level events carry the configured alarm tag.
    pub fn new(config: Arc<EdgeConfig>, logger: StructuredLogger) -> Self {
        let logger = logger.with_alarm_tag(config.alarm_log_tag.clone());

        Self {
            error_page: ErrorResponder::new(&config.redirect_url, logger.scoped("error_page")),
            key_manager: KeyManagerPolicy::new(&config, logger.scoped("key_manager")),
            sdk: SdkPolicy::new(&config, logger.scoped("sdk")),
            basic: BasicHeaders,
            logger: logger.scoped("processor"),
            config,
        }
    }

    /// Replace the error page body compressor.
    pub fn with_compressor(mut self, compressor: Box<dyn BodyCompressor>) -> Self {
        self.error_page = self.error_page.with_compressor(compressor);
        self
    }

    /// The configuration this processor was built with.
    pub fn config(&self) -> &EdgeConfig {
        &self.config
    }

    /// Process the first record of an event in place.
    pub fn process(&self, event: &mut Event) -> Result<Disposition, ProcessError> {
        let (request, response) = event.parts_mut();

        let Some(response) = response else {
            self.logger
                .error_builder("response is missing")
                .code("response_missing")
                .emit();
            return Err(ProcessError::MissingResponse);
        };

        Ok(self.process_response(request, response))
    }

    /// Process a response for an optional request.
    pub fn process_response(&self, request: Option<&Request>, response: &mut Response) -> Disposition {
        let Some(request) = request else {
            return self.pass_through(PassThroughReason::MissingRequest);
        };

        if response.headers.is_none() {
            return self.pass_through(PassThroughReason::MissingHeaders);
        }

        let Some(host) = self.resolve_host(request) else {
            return self.pass_through(PassThroughReason::UnresolvedHost);
        };

        let target = RequestTarget::new(host, resolve_path(request));
        self.apply(response, &target)
    }

    /// Resolve the request host from the `host` header, falling back to `HOST`.
    ///
    /// With several values the first one wins and a warning is logged.
    pub fn resolve_host(&self, request: &Request) -> Option<String> {
        let headers = request.headers.as_ref()?;
        let hosts = headers
            .get(http::header::HOST.as_str())
            .or_else(|| headers.get(HOST_UPPER))?;

        if hosts.len() > 1 {
            let values: Vec<&str> = hosts.iter().map(|h| h.value.as_str()).collect();
            self.logger
                .warn_builder("multiple hosts in request header")
                .code("host_multiple")
                .field_json("hosts", serde_json::json!(values))
                .emit();
        }

        let host = hosts.first()?.value.as_str();
        if host.is_empty() {
            None
        } else {
            Some(host.to_string())
        }
    }

    /// Run the handlers for a resolved target.
    pub fn apply(&self, response: &mut Response, target: &RequestTarget) -> Disposition {
        self.logger.debug("adding basic headers");
        self.basic.apply(response, target);

        if response.is_error() {
            self.logger
                .info_builder("redirecting to error page")
                .code("error_page")
                .field_i64("status", i64::from(response.status))
                .emit();
            self.error_page.apply(response, target);
            return Disposition::ErrorPage;
        }

        let mut policies = Vec::new();

        if target.host.starts_with(&self.config.km_host) {
            self.log_policy(self.key_manager.name(), target);
            self.key_manager.apply(response, target);
            policies.push(Policy::KeyManager);
        }

        if target.host.starts_with(&self.config.sdk_host) {
            self.log_policy(self.sdk.name(), target);
            self.sdk.apply(response, target);
            policies.push(Policy::Sdk);
        }

        Disposition::Secured { policies }
    }

    fn log_policy(&self, handler: &str, target: &RequestTarget) {
        self.logger
            .info_builder("applying content security policy")
            .code("policy_matched")
            .field("handler", handler)
            .field("host", target.host.as_str())
            .field("path", target.path.as_str())
            .emit();
    }

    fn pass_through(&self, reason: PassThroughReason) -> Disposition {
        self.logger
            .error_builder(format!("{}, passing response through", reason))
            .code(reason.code())
            .emit();
        Disposition::PassedThrough { reason }
    }
}

/// Request path, `/` when absent or empty.
pub fn resolve_path(request: &Request) -> String {
    match request.uri.as_deref() {
        Some(uri) if !uri.is_empty() => uri.to_string(),
        _ => "/".to_string(),
    }
}
