// ============================================================================
// COINPAYMENTS - Account Information
// ============================================================================

use super::{build_params, unix_time, KeyedResult};
use crate::client::Client;
use crate::params::OptionalValue;
use crate::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Result of `get_basic_info`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BasicInfo {
    pub username: String,
    pub merchant_id: String,
    pub email: String,
    pub public_name: String,
}

/// One coin in the `rates` result
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoinRate {
    pub is_fiat: i64,
    /// Exchange rate to BTC, as a decimal string
    pub rate_btc: String,
    /// Unix timestamp of the last rate update, as a string
    pub last_update: String,
    pub tx_fee: String,
    pub status: String,
    pub name: String,
    pub confirms: String,
    pub capabilities: Vec<String>,
    pub accepted: i64,
}

impl CoinRate {
    pub fn is_accepted(&self) -> bool {
        self.accepted != 0
    }

    pub fn last_updated_at(&self) -> Option<DateTime<Utc>> {
        self.last_update.parse().ok().and_then(unix_time)
    }
}

/// Result of `rates`, keyed by coin ticker
pub type Rates = HashMap<String, CoinRate>;

impl Client {
    /// Account name, merchant id and email
    pub async fn get_basic_info(
        &self,
        optionals: impl IntoIterator<Item = OptionalValue>,
    ) -> Result<BasicInfo> {
        self.call("get_basic_info", build_params(&[], optionals)).await
    }

    /// Exchange rates for all coins.
    ///
    /// Pass `OptionalValue::new("accepted", "1")` to restrict the list to
    /// coins enabled on the account, or `("short", "1")` for a shorter result.
    pub async fn rates(&self, optionals: impl IntoIterator<Item = OptionalValue>) -> Result<Rates> {
        self.call::<KeyedResult<CoinRate>>("rates", build_params(&[], optionals))
            .await
            .map(KeyedResult::into_map)
    }
}
