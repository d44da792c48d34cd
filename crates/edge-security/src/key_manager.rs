//! CSP for the key-manager host.

use edge_core::{EdgeConfig, Response};
use edge_observability::StructuredLogger;

use crate::csp::{default_directives, join_origin, replace_index, CspDirectives};
use crate::handlers::{RequestTarget, ResponseHandler};
use crate::headers::header_names;
use crate::trim::{trim_leading, SEPARATORS};

/// Script served next to the key-manager page.
pub const KEY_MANAGER_SCRIPT: &str = "/ost-sdk-key-manager-script.js";

/// Allows exactly one script: the key-manager script for the requested page.
#[derive(Debug, Clone)]
pub struct KeyManagerPolicy {
    js_origin: String,
    logger: StructuredLogger,
}

impl KeyManagerPolicy {
    /// Create the policy builder.
    pub fn new(config: &EdgeConfig, logger: StructuredLogger) -> Self {
        Self {
            js_origin: config.js_origin.clone(),
            logger,
        }
    }

    /// Build the directive list for a request path.
    pub fn directives(&self, path: &str) -> CspDirectives {
        let script_path = replace_index(path, KEY_MANAGER_SCRIPT);
        let script = join_origin(&self.js_origin, trim_leading(&script_path, SEPARATORS));

        let mut directives = default_directives();
        directives.push(format!("script-src {}", script));
        directives
    }
}

impl ResponseHandler for KeyManagerPolicy {
    fn name(&self) -> &'static str {
        "key_manager"
    }

    fn apply(&self, response: &mut Response, target: &RequestTarget) {
        let policy = self.directives(&target.path).to_header_value();

        self.logger
            .info_builder("content security policy set")
            .code("csp_set")
            .field("policy", policy.as_str())
            .emit();

        response
            .headers_mut()
            .set(header_names::CONTENT_SECURITY_POLICY, policy);
    }
}
