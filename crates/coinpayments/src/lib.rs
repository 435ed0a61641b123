// ============================================================================
// COINPAYMENTS - Merchant API Client
// ============================================================================
// Signed client for the CoinPayments merchant API.
//
// Key insight: the API is one endpoint. Every command is a form POST whose
// exact body is HMAC-SHA512 signed with the private key, and every IPN is a
// form body signed the same way with the IPN secret.
//
// Features:
// - Canonical request encoding and signing
// - Response envelope validation ("ok" sentinel)
// - Typed commands (rates, balances, transactions, withdrawals, $PayByName)
// - IPN verification and decoding into typed variants
// ============================================================================

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod ipn;
pub mod params;
pub mod signer;

pub use api::*;
pub use client::{Client, SignedRequest};
pub use config::ClientConfig;
pub use error::{CoinPaymentsError, ErrorKind};
pub use ipn::{
    ApiIpn, BuyerInfo, ButtonIpn, CartIpn, CartItem, DepositIpn, DonationIpn, Ipn, IpnDecoder,
    IpnHeader, IpnPayload, PaymentStatus, ShippingInfo, SimpleIpn, WithdrawalIpn,
};
pub use params::{OptionalValue, Params};
pub use signer::HmacSigner;

/// Re-export for convenience
pub type Result<T> = std::result::Result<T, CoinPaymentsError>;
