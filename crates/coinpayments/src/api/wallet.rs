// ============================================================================
// COINPAYMENTS - Wallet Commands
// ============================================================================
// Balances, deposit addresses, transfers, withdrawals and conversions.
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

/// One coin in the `balances` result
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoinBalance {
    /// Balance in Satoshis (or the coin's smallest unit)
    pub balance: i64,
    /// Balance as a decimal string
    pub balancef: String,
    pub status: String,
}

/// Result of `balances`, keyed by coin ticker
pub type Balances = HashMap<String, CoinBalance>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DepositAddress {
    pub address: String,
    pub pubkey: String,
    /// Destination tag / memo for coins that need one
    pub dest_tag: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransferResult {
    pub id: String,
    pub status: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WithdrawalResult {
    pub id: String,
    /// 0 = awaiting email confirmation, 1 = queued
    pub status: i64,
    pub amount: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionResult {
    pub id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertLimits {
    pub min: String,
    pub max: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WithdrawalHistoryEntry {
    pub id: String,
    pub time_created: i64,
    pub status: i64,
    pub status_text: String,
    pub coin: String,
    pub amount: i64,
    pub amountf: String,
    pub note: String,
    pub send_address: String,
    pub send_dest_tag: String,
    pub send_txid: String,
}

impl WithdrawalHistoryEntry {
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        unix_time(self.time_created)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WithdrawalInfo {
    pub time_created: i64,
    pub status: i64,
    pub status_text: String,
    pub coin: String,
    pub amount: i64,
    pub amountf: String,
    pub note: String,
    pub send_address: String,
    pub send_txid: String,
}

impl WithdrawalInfo {
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        unix_time(self.time_created)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionInfo {
    /// Unix timestamp, sent as a string by this command
    pub time_created: String,
    pub status: i64,
    pub status_text: String,
    pub coin1: String,
    pub coin2: String,
    pub amount_sent: i64,
    pub amount_sentf: String,
    pub received: i64,
    pub receivedf: String,
}

impl ConversionInfo {
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.time_created.parse().ok().and_then(unix_time)
    }
}

// ============================================================================
// COMMANDS
// ============================================================================

impl Client {
    /// Coin balances, keyed by ticker.
    ///
    /// `OptionalValue::new("all", "1")` includes coins with a zero balance.
    pub async fn balances(
        &self,
        optionals: impl IntoIterator<Item = OptionalValue>,
    ) -> Result<Balances> {
        self.call::<KeyedResult<CoinBalance>>("balances", build_params(&[], optionals))
            .await
            .map(KeyedResult::into_map)
    }

    /// Address for depositing `currency` into the account wallet
    pub async fn get_deposit_address(
        &self,
        currency: &str,
        optionals: impl IntoIterator<Item = OptionalValue>,
    ) -> Result<DepositAddress> {
        self.call(
            "get_deposit_address",
            build_params(&[("currency", currency)], optionals),
        )
        .await
    }

    /// Transfer to another CoinPayments account.
    ///
    /// The recipient goes in an optional value: `merchant` or `pbntag`.
    pub async fn create_transfer(
        &self,
        amount: &str,
        currency: &str,
        optionals: impl IntoIterator<Item = OptionalValue>,
    ) -> Result<TransferResult> {
        self.call(
            "create_transfer",
            build_params(&[("amount", amount), ("currency", currency)], optionals),
        )
        .await
    }

    /// Withdraw to an external address (`OptionalValue::address`) or a
    /// `$PayByName` tag.
    pub async fn create_withdrawal(
        &self,
        amount: &str,
        currency: &str,
        optionals: impl IntoIterator<Item = OptionalValue>,
    ) -> Result<WithdrawalResult> {
        self.call(
            "create_withdrawal",
            build_params(&[("amount", amount), ("currency", currency)], optionals),
        )
        .await
    }

    pub async fn cancel_withdrawal(
        &self,
        id: &str,
        optionals: impl IntoIterator<Item = OptionalValue>,
    ) -> Result<serde_json::Value> {
        self.call("cancel_withdrawal", build_params(&[("id", id)], optionals))
            .await
    }

    /// Convert `amount` of `from` into `to`
    pub async fn convert(
        &self,
        amount: &str,
        from: &str,
        to: &str,
        optionals: impl IntoIterator<Item = OptionalValue>,
    ) -> Result<ConversionResult> {
        self.call(
            "convert",
            build_params(&[("amount", amount), ("from", from), ("to", to)], optionals),
        )
        .await
    }

    pub async fn convert_limits(
        &self,
        from: &str,
        to: &str,
        optionals: impl IntoIterator<Item = OptionalValue>,
    ) -> Result<ConvertLimits> {
        self.call(
            "convert_limits",
            build_params(&[("from", from), ("to", to)], optionals),
        )
        .await
    }

    /// Withdrawal history; page with `limit` and `start` optional values
    pub async fn get_withdrawal_history(
        &self,
        optionals: impl IntoIterator<Item = OptionalValue>,
    ) -> Result<Vec<WithdrawalHistoryEntry>> {
        self.call("get_withdrawal_history", build_params(&[], optionals))
            .await
    }

    pub async fn get_withdrawal_info(
        &self,
        id: &str,
        optionals: impl IntoIterator<Item = OptionalValue>,
    ) -> Result<WithdrawalInfo> {
        self.call("get_withdrawal_info", build_params(&[("id", id)], optionals))
            .await
    }

    pub async fn get_conversion_info(
        &self,
        id: &str,
        optionals: impl IntoIterator<Item = OptionalValue>,
    ) -> Result<ConversionInfo> {
        self.call("get_conversion_info", build_params(&[("id", id)], optionals))
            .await
    }
}
