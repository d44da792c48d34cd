//! CSP for the SDK iframe host.

use edge_core::{EdgeConfig, Response};
use edge_observability::StructuredLogger;

use crate::csp::{default_directives, join_origin, replace_index, CspDirectives};
use crate::handlers::{RequestTarget, ResponseHandler};
use crate::headers::header_names;
use crate::trim::{trim_both, trim_trailing, SEPARATORS};

/// Script served next to the SDK iframe page.
pub const SDK_SCRIPT: &str = "/ost-sdk-iframe-script.js";

/// Allows the SDK script, key-manager frames on any subdomain of the
/// key-manager domain, and calls to the platform API.
#[derive(Debug, Clone)]
pub struct SdkPolicy {
    js_origin: String,
    km_domain: String,
    api_origin: String,
    logger: StructuredLogger,
}

impl SdkPolicy {
    /// Create the policy builder.
    pub fn new(config: &EdgeConfig, logger: StructuredLogger) -> Self {
        Self {
            js_origin: config.js_origin.clone(),
            km_domain: config.sdk_km_main_domain.clone(),
            api_origin: config.platform_api_origin.clone(),
            logger,
        }
    }

    /// Build the directive list for a request path.
    ///
    /// Order: baseline, `script-src`, `frame-src`, `connect-src`.
    pub fn directives(&self, path: &str) -> CspDirectives {
        let mut directives = default_directives();

        let script_path = replace_index(path, SDK_SCRIPT);
        let script = join_origin(&self.js_origin, trim_both(&script_path, SEPARATORS));
        directives.push(format!("script-src {}", script));

        // The key manager is served from the same path as the SDK page.
        let frame_origin = format!("https://*.{}", trim_trailing(&self.km_domain, SEPARATORS));
        let frame = join_origin(&frame_origin, trim_both(path, SEPARATORS));
        directives.push(format!("frame-src {}", frame));

        let api = join_origin(&self.api_origin, "");
        directives.push(format!("connect-src {}", api));

        directives
    }
}

impl ResponseHandler for SdkPolicy {
    fn name(&self) -> &'static str {
        "sdk"
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
