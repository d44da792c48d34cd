//! Static, process-wide configuration.
//!
//! Loaded once at startup and shared immutably with every component.
//! All keys are required and have no defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors from loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {message}")]
    Parse { path: String, message: String },

    #[error("missing required config key: {0}")]
    Missing(&'static str),

    #[error("{key} must be an absolute http(s) origin, got {value:?}")]
    InvalidOrigin { key: &'static str, value: String },

    #[error("REDIRECT_URL cannot be embedded in the redirect script: {0:?}")]
    UnsafeRedirect(String),
}

/// Names of every configuration key, in declaration order.
pub const CONFIG_KEYS: [&str; 7] = [
    "ALARM_LOG_TAG",
    "SDK_S3_HOST",
    "KM_S3_HOST",
    "JS_ORIGIN",
    "SDK_KM_MAIN_DOMAIN",
    "PLATFORM_API_ORIGIN",
    "REDIRECT_URL",
];

/// Edge response layer configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeConfig {
    /// Tag attached to error-level log events so alarms can match them.
    #[serde(rename = "ALARM_LOG_TAG")]
    pub alarm_log_tag: String,
    /// Host prefix of the SDK iframe bucket.
    #[serde(rename = "SDK_S3_HOST")]
    pub sdk_host: String,
    /// Host prefix of the key-manager bucket.
    #[serde(rename = "KM_S3_HOST")]
    pub km_host: String,
    /// Origin serving the SDK and key-manager scripts.
    #[serde(rename = "JS_ORIGIN")]
    pub js_origin: String,
    /// Domain whose subdomains may be framed by the SDK iframe.
    #[serde(rename = "SDK_KM_MAIN_DOMAIN")]
    pub sdk_km_main_domain: String,
    /// Platform API origin the SDK may connect to.
    #[serde(rename = "PLATFORM_API_ORIGIN")]
    pub platform_api_origin: String,
    /// Where error pages send the browser.
    #[serde(rename = "REDIRECT_URL")]
    pub redirect_url: String,
}

impl EdgeConfig {
    /// Load config from a file.
    ///
    /// Files ending in `.json` are parsed as JSON, everything else as TOML.
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let display = path.display().to_string();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: display.clone(),
            source,
        })?;

        let is_json = path.extension().is_some_and(|ext| ext == "json");
        if is_json {
            Self::from_json(&content).map_err(|e| ConfigError::Parse {
                path: display,
                message: e.to_string(),
            })
        } else {
            Self::from_toml(&content).map_err(|e| ConfigError::Parse {
                path: display,
                message: e.to_string(),
            })
        }
    }

    /// Load and validate config from a file.
    pub fn load_validated(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let config = Self::load(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse config from a JSON document.
    pub fn from_json(content: &str) -> serde_json::Result<Self> {
        serde_json::from_str(content)
    }

    /// Parse config from a TOML document.
    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Read config from environment variables named after the keys.
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from any key lookup.
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &'static str| lookup(key).ok_or(ConfigError::Missing(key));

        Ok(Self {
            alarm_log_tag: get("ALARM_LOG_TAG")?,
            sdk_host: get("SDK_S3_HOST")?,
            km_host: get("KM_S3_HOST")?,
            js_origin: get("JS_ORIGIN")?,
            sdk_km_main_domain: get("SDK_KM_MAIN_DOMAIN")?,
            platform_api_origin: get("PLATFORM_API_ORIGIN")?,
            redirect_url: get("REDIRECT_URL")?,
        })
    }

    /// Value of a key by its configuration name.
    pub fn get(&self, key: &str) -> Option<&str> {
        let value = match key {
            "ALARM_LOG_TAG" => &self.alarm_log_tag,
            "SDK_S3_HOST" => &self.sdk_host,
            "KM_S3_HOST" => &self.km_host,
            "JS_ORIGIN" => &self.js_origin,
            "SDK_KM_MAIN_DOMAIN" => &self.sdk_km_main_domain,
            "PLATFORM_API_ORIGIN" => &self.platform_api_origin,
            "REDIRECT_URL" => &self.redirect_url,
            _ => return None,
        };
        Some(value.as_str())
    }

    /// Check that every key is usable.
    pub fn validate(&self) -> ConfigResult<()> {
        for key in CONFIG_KEYS {
            if self.get(key).map_or(true, |v| v.trim().is_empty()) {
                return Err(ConfigError::Missing(key));
            }
        }

        check_origin("JS_ORIGIN", &self.js_origin)?;
        check_origin("PLATFORM_API_ORIGIN", &self.platform_api_origin)?;

        // The URL is interpolated into a double-quoted script string.
        let unsafe_char = |c: char| matches!(c, '"' | '<' | '>' | '\\' | '\n' | '\r');
        if self.redirect_url.contains(unsafe_char) {
            return Err(ConfigError::UnsafeRedirect(self.redirect_url.clone()));
        }

        Ok(())
    }
}

fn check_origin(key: &'static str, value: &str) -> ConfigResult<()> {
    let has_host = value
        .strip_prefix("https://")
        .or_else(|| value.strip_prefix("http://"))
        .is_some_and(|rest| !rest.trim_matches('/').is_empty());

    if has_host {
        Ok(())
    } else {
        Err(ConfigError::InvalidOrigin {
            key,
            value: value.to_string(),
        })
    }
}

/// Generate a default `edge.toml` config file.
pub fn generate_default_config() -> String {
    r#"# Edge response security configuration.
# Every key is required.

# Tag attached to error-level log events.
ALARM_LOG_TAG = "EDGE_ALARM"

# Host prefixes used to classify requests.
SDK_S3_HOST = "sdk."
KM_S3_HOST = "km."

# Origin serving the SDK iframe and key-manager scripts.
JS_ORIGIN = "https://js.example.com"

# Subdomains of this domain may be framed by the SDK iframe.
SDK_KM_MAIN_DOMAIN = "example.com"

# API the SDK iframe may connect to.
PLATFORM_API_ORIGIN = "https://api.example.com"

# Error pages redirect the browser here.
REDIRECT_URL = "about:blank"
"#
    .to_string()
}
