// ============================================================================
// COINPAYMENTS - Payment Commands
// ============================================================================
// Checkout transactions and callback addresses.
// ============================================================================

use super::{build_params, unix_time, KeyedResult};
use crate::client::Client;
use crate::params::OptionalValue;
use crate::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ============================================================================
// DATA TYPES
// ============================================================================

/// Result of `create_transaction`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CreatedTransaction {
    /// Amount the buyer must send, in `currency2`
    pub amount: String,
    pub address: String,
    pub dest_tag: String,
    pub txn_id: String,
    pub confirms_needed: String,
    /// Seconds before the buyer's payment window closes
    pub timeout: i64,
    pub checkout_url: String,
    pub status_url: String,
    pub qrcode_url: String,
}

/// Result of `get_callback_address`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CallbackAddress {
    pub address: String,
    pub pubkey: String,
    pub dest_tag: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckoutInfo {
    pub currency: String,
    pub amount: i64,
    pub test: i64,
    pub item_number: String,
    pub item_name: String,
    pub details: Vec<serde_json::Value>,
    pub invoice: String,
    pub custom: String,
    pub ipn_url: String,
    pub amountf: serde_json::Value,
}

/// Result of `get_tx_info`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TxInfo {
    pub time_created: i64,
    pub time_expires: i64,
    /// < 0 failed, 0..100 pending, >= 100 complete
    pub status: i64,
    pub status_text: String,
    #[serde(rename = "type")]
    pub tx_type: String,
    pub coin: String,
    pub amount: i64,
    pub amountf: String,
    pub received: i64,
    pub receivedf: String,
    #[serde(rename = "recv_confirms")]
    pub received_confirms: i64,
    pub payment_address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checkout: Option<CheckoutInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipping: Option<serde_json::Value>,
}

impl TxInfo {
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        unix_time(self.time_created)
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        unix_time(self.time_expires)
    }

    pub fn is_complete(&self) -> bool {
        self.status >= 100
    }

    pub fn is_failed(&self) -> bool {
        self.status < 0
    }
}

/// One transaction in the `get_tx_info_multi` result
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TxInfoMultiEntry {
    /// "ok" or a per-transaction error
    pub error: String,
    pub time_created: i64,
    pub time_expires: i64,
    pub status: i64,
    pub status_text: String,
    #[serde(rename = "type")]
    pub tx_type: String,
    pub coin: String,
    pub amount: i64,
    pub amountf: String,
    pub received: i64,
    #[serde(alias = "recievedf")]
    pub receivedf: String,
    #[serde(rename = "recv_confirms")]
    pub received_confirms: i64,
    pub payment_address: String,
}

impl TxInfoMultiEntry {
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        unix_time(self.time_created)
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        unix_time(self.time_expires)
    }
}

/// Result of `get_tx_info_multi`, keyed by transaction id
pub type TxInfoMulti = HashMap<String, TxInfoMultiEntry>;

// ============================================================================
// COMMANDS
// ============================================================================

impl Client {
    /// Create a checkout transaction.
    ///
    /// `currency1` is the price currency, `currency2` the coin the buyer pays
    /// with. Typical optionals: [`OptionalValue::ipn_url`],
    /// [`OptionalValue::invoice`], [`OptionalValue::custom`],
    /// [`OptionalValue::item_name`], [`OptionalValue::buyer_name`].
    pub async fn create_transaction(
        &self,
        amount: &str,
        currency1: &str,
        currency2: &str,
        buyer_email: &str,
        optionals: impl IntoIterator<Item = OptionalValue>,
    ) -> Result<CreatedTransaction> {
        self.call(
            "create_transaction",
            build_params(
                &[
                    ("amount", amount),
                    ("currency1", currency1),
                    ("currency2", currency2),
                    ("buyer_email", buyer_email),
                ],
                optionals,
            ),
        )
        .await
    }

    /// Address whose deposits are reported through `deposit` IPNs
    pub async fn get_callback_address(
        &self,
        currency: &str,
        optionals: impl IntoIterator<Item = OptionalValue>,
    ) -> Result<CallbackAddress> {
        self.call(
            "get_callback_address",
            build_params(&[("currency", currency)], optionals),
        )
        .await
    }

    pub async fn get_tx_info(
        &self,
        txid: &str,
        optionals: impl IntoIterator<Item = OptionalValue>,
    ) -> Result<TxInfo> {
        self.call("get_tx_info", build_params(&[("txid", txid)], optionals))
            .await
    }

    /// Status of several transactions; `txids` is pipe-separated (`a|b|c`).
    pub async fn get_tx_info_multi(
        &self,
        txids: &str,
        optionals: impl IntoIterator<Item = OptionalValue>,
    ) -> Result<TxInfoMulti> {
        self.call::<KeyedResult<TxInfoMultiEntry>>(
            "get_tx_info_multi",
            build_params(&[("txid", txids)], optionals),
        )
        .await
        .map(KeyedResult::into_map)
    }

    pub async fn get_tx_ids(
        &self,
        optionals: impl IntoIterator<Item = OptionalValue>,
    ) -> Result<Vec<String>> {
        self.call("get_tx_ids", build_params(&[], optionals)).await
    }
}
