//! Integration Test Runner
//!
//! Entry point for the end-to-end tests. Every test talks to a local mock
//! server, so no network access or real API keys are needed.
//!
//! Run all tests:
//! ```bash
//! cargo test --test integration
//! ```
//!
//! Run a specific module:
//! ```bash
//! cargo test --test integration api_flow
//! cargo test --test integration ipn_flow
//! ```
//!
//! Test categories:
//! - `api_flow`: signed calls against a mock API (headers, body, envelopes)
//! - `ipn_flow`: IPN verification and decoding, including a checkout round trip

mod api_flow;

use coinpayments::{Client, ClientConfig};
use wiremock::MockServer;

pub const PUBLIC_KEY: &str = "pub";
pub const PRIVATE_KEY: &str = "testkey";
pub const IPN_SECRET: &str = "ipnsecret";

/// Client pointed at `server` with the shared test keys
pub fn client_for(server: &MockServer) -> Client {
    Client::from_config(
        PUBLIC_KEY,
        PRIVATE_KEY,
        ClientConfig::with_api_url(server.uri()),
    )
    .expect("Failed to create client")
}
