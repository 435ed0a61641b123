// ============================================================================
// COINPAYMENTS - API Client
// ============================================================================
// Signed request engine shared by every API command.
//
// Each call:
// 1. merges the reserved fields (key, version, format, cmd) into the params
// 2. form-encodes them once; those bytes are both the body and HMAC input
// 3. POSTs with the HMAC header
// 4. requires HTTP 200 and an envelope whose `error` is "ok"
// 5. decodes `result` into the caller's type
// ============================================================================

use crate::config::{ClientConfig, API_FORMAT, API_SUCCESS, API_VERSION, HMAC_HEADER};
use crate::error::CoinPaymentsError;
use crate::ipn::{Ipn, IpnDecoder};
use crate::params::Params;
use crate::signer::HmacSigner;
use crate::Result;
use reqwest::header::{HeaderMap, ACCEPT, CONTENT_TYPE, USER_AGENT};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

/// A fully encoded and signed request, ready to send
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedRequest {
    pub command: String,
    /// Exact bytes posted as the request body
    pub body: String,
    /// Hex HMAC-SHA512 of `body`
    pub hmac: String,
}

#[derive(Deserialize)]
struct Envelope {
    error: String,
    #[serde(default)]
    result: serde_json::Value,
}

// ============================================================================
// CLIENT
// ============================================================================

/// CoinPayments API client
///
/// Cheap to clone; clones share the HTTP connection pool. Safe to use from
/// many tasks at once.
#[derive(Debug, Clone)]
pub struct Client {
    config: ClientConfig,
    http: reqwest::Client,
    public_key: String,
    signer: HmacSigner,
    ipn: IpnDecoder,
}

impl Client {
    /// Create a client for the production endpoint
    pub fn new(public_key: impl Into<String>, private_key: impl Into<String>) -> Result<Self> {
        Self::from_config(public_key, private_key, ClientConfig::default())
    }

    /// Create a client with explicit configuration
    pub fn from_config(
        public_key: impl Into<String>,
        private_key: impl Into<String>,
        config: ClientConfig,
    ) -> Result<Self> {
        let public_key = public_key.into();
        let private_key = private_key.into();

        if public_key.is_empty() {
            return Err(CoinPaymentsError::Config("public key is empty".to_string()));
        }
        if private_key.is_empty() {
            return Err(CoinPaymentsError::Config("private key is empty".to_string()));
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| {
                CoinPaymentsError::Config(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            config,
            http,
            public_key,
            signer: HmacSigner::new(private_key),
            ipn: IpnDecoder::unverified(),
        })
    }

    /// Use a caller-provided HTTP client (timeouts, proxies, TLS settings)
    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    /// Verify IPNs against this secret
    pub fn with_ipn_secret(mut self, secret: impl Into<String>) -> Self {
        self.ipn = IpnDecoder::new(secret);
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn public_key(&self) -> &str {
        &self.public_key
    }

    pub fn ipn_decoder(&self) -> &IpnDecoder {
        &self.ipn
    }

    // ==================== Signing ====================

    /// Merge the reserved fields into `params`, encode and sign.
    pub fn sign_request(&self, command: &str, params: Params) -> Result<SignedRequest> {
        let params = params.seal([
            ("key", self.public_key.as_str()),
            ("version", API_VERSION),
            ("format", API_FORMAT),
            ("cmd", command),
        ]);

        let body = params.encode();
        let hmac = self.signer.sign(body.as_bytes())?;

        Ok(SignedRequest {
            command: command.to_string(),
            body,
            hmac,
        })
    }

    // ==================== Calls ====================

    /// Run `command` and decode its `result` into `T`.
    pub async fn call<T: DeserializeOwned>(&self, command: &str, params: Params) -> Result<T> {
        let request = self.sign_request(command, params)?;

        debug!("Calling API command: {}", command);

        let response = self
            .http
            .post(&self.config.api_url)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .header(ACCEPT, "application/json")
            .header(USER_AGENT, &self.config.user_agent)
            .header(HMAC_HEADER, &request.hmac)
            .body(request.body)
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => {
                let body = response.bytes().await?;
                decode_envelope(command, &body)
            }
            status => {
                let body = response.text().await.unwrap_or_default();
                warn!("API command {} returned HTTP {}", command, status);
                Err(CoinPaymentsError::UnexpectedStatus {
                    status: status.as_u16(),
                    body,
                })
            }
        }
    }

    // ==================== IPN ====================

    /// Verify and decode an IPN body.
    ///
    /// `signature` is the `HMAC` header value. Without an IPN secret the body
    /// is decoded unverified.
    pub fn parse_ipn(&self, raw_body: &[u8], signature: Option<&str>) -> Result<Ipn> {
        self.ipn.parse(raw_body, signature)
    }

    /// Verify and decode an IPN, reading the `HMAC` header from `headers`.
    pub fn parse_ipn_request(&self, headers: &HeaderMap, raw_body: &[u8]) -> Result<Ipn> {
        self.ipn.parse_request(headers, raw_body)
    }
}

/// Validate the envelope and decode `result`.
///
/// `result` is only looked at once `error` is the success sentinel.
pub(crate) fn decode_envelope<T: DeserializeOwned>(command: &str, body: &[u8]) -> Result<T> {
    let envelope: Envelope = serde_json::from_slice(body)
        .map_err(|e| CoinPaymentsError::MalformedEnvelope(e.to_string()))?;

    if envelope.error != API_SUCCESS {
        warn!("API command {} rejected: {}", command, envelope.error);
        return Err(CoinPaymentsError::Api {
            command: command.to_string(),
            message: envelope.error,
        });
    }

    serde_json::from_value(envelope.result).map_err(|e| CoinPaymentsError::MalformedResult {
        command: command.to_string(),
        reason: e.to_string(),
    })
}
