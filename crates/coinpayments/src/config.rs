// ============================================================================
// COINPAYMENTS - Configuration
// ============================================================================
// Protocol constants and client configuration.

use serde::{Deserialize, Serialize};

/// Production API endpoint
pub const API_URL: &str = "https://www.coinpayments.net/api.php";

/// Response format requested on every call
pub const API_FORMAT: &str = "json";

/// Protocol version sent on every call
pub const API_VERSION: &str = "1";

/// Envelope `error` value for a successful call
pub const API_SUCCESS: &str = "ok";

/// Header carrying the hex HMAC, both outbound and on IPNs
pub const HMAC_HEADER: &str = "HMAC";

/// Client configuration
///
/// Every field has a default, so a partial JSON document is enough:
///
/// ```
/// use coinpayments::ClientConfig;
///
/// let config: ClientConfig = serde_json::from_str(r#"{"timeout_seconds": 10}"#).unwrap();
/// assert_eq!(config.timeout_seconds, 10);
/// assert_eq!(config.api_url, coinpayments::config::API_URL);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// API endpoint the signed form is posted to.
    ///
    /// Default: [`API_URL`]
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// User-Agent header sent with every call.
    ///
    /// Default: `coinpayments-rs/<crate version>`
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Request timeout used when the client builds its own transport.
    /// Ignored when an HTTP client is injected.
    ///
    /// Default: `30`
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

fn default_api_url() -> String {
    API_URL.to_string()
}

fn default_user_agent() -> String {
    format!("coinpayments-rs/{}", env!("CARGO_PKG_VERSION"))
}

fn default_timeout() -> u64 {
    30
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            user_agent: default_user_agent(),
            timeout_seconds: default_timeout(),
        }
    }
}

impl ClientConfig {
    /// Configuration pointing at a different endpoint (mock servers, proxies)
    pub fn with_api_url(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            ..Default::default()
        }
    }
}
