// ============================================================================
// COINPAYMENTS - Error Types
// ============================================================================

use thiserror::Error;

/// Broad classification of a [`CoinPaymentsError`].
///
/// Callers that only need to decide between "retry", "fix the request" and
/// "reject the notification" can match on this instead of every variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The keyed-hash primitive rejected its input.
    Signing,
    /// Network failure or a non-200 HTTP status.
    Transport,
    /// The response did not match the expected envelope or result shape.
    Protocol,
    /// The API answered with a non-"ok" error field.
    Application,
    /// An IPN failed HMAC verification.
    Authentication,
    /// A narrowed IPN view was requested for the wrong `ipn_type`.
    VariantMismatch,
    /// The client itself is misconfigured.
    Configuration,
}

#[derive(Error, Debug)]
pub enum CoinPaymentsError {
    // ==================== Signing Errors ====================
    #[error("HMAC signing failed: {0}")]
    Signing(String),

    // ==================== Transport Errors ====================
    #[error("Network request failed: {0}")]
    Network(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("API call returned unexpected status {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    // ==================== Protocol Errors ====================
    #[error("Malformed response envelope: {0}")]
    MalformedEnvelope(String),

    #[error("Malformed result for command '{command}': {reason}")]
    MalformedResult { command: String, reason: String },

    // ==================== Application Errors ====================
    #[error("API error for command '{command}': {message}")]
    Api { command: String, message: String },

    // ==================== IPN Errors ====================
    #[error("IPN HMAC header missing")]
    MissingIpnSignature,

    #[error("Could not validate IPN HMAC")]
    IpnSignatureMismatch,

    #[error("IPN type is '{actual}', not '{expected}'")]
    IpnTypeMismatch {
        expected: &'static str,
        actual: String,
    },

    // ==================== Configuration Errors ====================
    #[error("Configuration error: {0}")]
    Config(String),
}

impl CoinPaymentsError {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoinPaymentsError::Signing(_) => ErrorKind::Signing,
            CoinPaymentsError::Network(_)
            | CoinPaymentsError::Timeout(_)
            | CoinPaymentsError::UnexpectedStatus { .. } => ErrorKind::Transport,
            CoinPaymentsError::MalformedEnvelope(_)
            | CoinPaymentsError::MalformedResult { .. } => ErrorKind::Protocol,
            CoinPaymentsError::Api { .. } => ErrorKind::Application,
            CoinPaymentsError::MissingIpnSignature | CoinPaymentsError::IpnSignatureMismatch => {
                ErrorKind::Authentication
            }
            CoinPaymentsError::IpnTypeMismatch { .. } => ErrorKind::VariantMismatch,
            CoinPaymentsError::Config(_) => ErrorKind::Configuration,
        }
    }

    /// Transport failures may succeed when retried; nothing else will.
    pub fn is_recoverable(&self) -> bool {
        self.kind() == ErrorKind::Transport
    }

    /// Server-reported message for application failures
    pub fn api_message(&self) -> Option<&str> {
        match self {
            CoinPaymentsError::Api { message, .. } => Some(message),
            _ => None,
        }
    }

    /// Stable error code for this error type
    pub fn code(&self) -> &'static str {
        match self {
            CoinPaymentsError::Signing(_) => "CP_SIGNING",
            CoinPaymentsError::Network(_) => "CP_NETWORK",
            CoinPaymentsError::Timeout(_) => "CP_TIMEOUT",
            CoinPaymentsError::UnexpectedStatus { .. } => "CP_UNEXPECTED_STATUS",
            CoinPaymentsError::MalformedEnvelope(_) => "CP_MALFORMED_ENVELOPE",
            CoinPaymentsError::MalformedResult { .. } => "CP_MALFORMED_RESULT",
            CoinPaymentsError::Api { .. } => "CP_API",
            CoinPaymentsError::MissingIpnSignature => "CP_IPN_MISSING_HMAC",
            CoinPaymentsError::IpnSignatureMismatch => "CP_IPN_BAD_HMAC",
            CoinPaymentsError::IpnTypeMismatch { .. } => "CP_IPN_TYPE_MISMATCH",
            CoinPaymentsError::Config(_) => "CP_CONFIG",
        }
    }
}

impl From<reqwest::Error> for CoinPaymentsError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            CoinPaymentsError::Timeout(err.to_string())
        } else {
            CoinPaymentsError::Network(err.to_string())
        }
    }
}
