//! Typed API commands.
//!
//! Every command is a thin wrapper around [`Client::call`](crate::Client::call):
//! required arguments become parameters, optional values are applied on top,
//! and `result` is decoded into the command's response type.

pub mod info;
pub mod paybyname;
pub mod payments;
pub mod wallet;

use crate::params::{OptionalValue, Params};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::HashMap;

pub use info::{BasicInfo, CoinRate, Rates};
pub use paybyname::{PbnCoupon, PbnFeedback, PbnInfo, PbnTag};
pub use payments::{
    CallbackAddress, CheckoutInfo, CreatedTransaction, TxInfo, TxInfoMulti, TxInfoMultiEntry,
};
pub use wallet::{
    Balances, CoinBalance, ConversionInfo, ConversionResult, ConvertLimits, DepositAddress,
    TransferResult, WithdrawalHistoryEntry, WithdrawalInfo, WithdrawalResult,
};

/// Required parameters first, then the caller's optional values in order.
fn build_params(
    required: &[(&str, &str)],
    optionals: impl IntoIterator<Item = OptionalValue>,
) -> Params {
    let mut params: Params = required.iter().copied().collect();
    params.apply(optionals);
    params
}

/// Result keyed by coin or transaction id.
///
/// The server encodes an empty keyed result as `[]` rather than `{}`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum KeyedResult<V> {
    Map(HashMap<String, V>),
    Empty([(); 0]),
}

impl<V> KeyedResult<V> {
    pub(crate) fn into_map(self) -> HashMap<String, V> {
        match self {
            KeyedResult::Map(map) => map,
            KeyedResult::Empty([]) => HashMap::new(),
        }
    }
}

/// Unix seconds as a UTC timestamp; zero and negative mean "not set".
fn unix_time(seconds: i64) -> Option<DateTime<Utc>> {
    if seconds <= 0 {
        return None;
    }
    DateTime::from_timestamp(seconds, 0)
}
