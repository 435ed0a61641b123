// ============================================================================
// COINPAYMENTS - $PayByName Commands
// ============================================================================
// Registration and lookup of $PayByName tags.
//
// Tag management commands (buy/claim/update/renew/delete) answer with an
// empty result on success; those are returned as raw JSON.
// ============================================================================

use super::{build_params, unix_time};
use crate::client::Client;
use crate::params::OptionalValue;
use crate::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PbnFeedback {
    pub pos: i64,
    pub neg: i64,
    pub neut: String,
    pub total: i64,
    pub percent: String,
}

/// Result of `get_pbn_info`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PbnInfo {
    pub pbntag: String,
    pub merchant: String,
    pub profile_name: String,
    pub profile_url: String,
    pub profile_email: String,
    pub profile_image: String,
    pub member_since: i64,
    pub feedback: PbnFeedback,
}

impl PbnInfo {
    pub fn member_since_at(&self) -> Option<DateTime<Utc>> {
        unix_time(self.member_since)
    }
}

/// One entry of `get_pbn_list`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PbnTag {
    pub tagid: String,
    /// Empty until the tag has been claimed
    #[serde(alias = "pbgtag")]
    pub pbntag: String,
    pub time_expires: i64,
}

impl PbnTag {
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        unix_time(self.time_expires)
    }

    pub fn is_claimed(&self) -> bool {
        !self.pbntag.is_empty()
    }
}

/// Result of `claim_pbn_coupon`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PbnCoupon {
    pub tagid: String,
}

impl Client {
    /// Public profile of a tag (with or without the leading `$`)
    pub async fn get_pbn_info(
        &self,
        pbntag: &str,
        optionals: impl IntoIterator<Item = OptionalValue>,
    ) -> Result<PbnInfo> {
        self.call("get_pbn_info", build_params(&[("pbntag", pbntag)], optionals))
            .await
    }

    /// Tags owned by the account, claimed or not
    pub async fn get_pbn_list(
        &self,
        optionals: impl IntoIterator<Item = OptionalValue>,
    ) -> Result<Vec<PbnTag>> {
        self.call("get_pbn_list", build_params(&[], optionals)).await
    }

    /// Buy tag slots paid in `coin`; `num` sets how many
    pub async fn buy_pbn_tags(
        &self,
        coin: &str,
        optionals: impl IntoIterator<Item = OptionalValue>,
    ) -> Result<serde_json::Value> {
        self.call("buy_pbn_tags", build_params(&[("coin", coin)], optionals))
            .await
    }

    pub async fn claim_pbn_tag(
        &self,
        tagid: &str,
        name: &str,
        optionals: impl IntoIterator<Item = OptionalValue>,
    ) -> Result<serde_json::Value> {
        self.call(
            "claim_pbn_tag",
            build_params(&[("tagid", tagid), ("name", name)], optionals),
        )
        .await
    }

    /// Update the tag profile: `name`, `email`, `url`, `image` optionals
    pub async fn update_pbn_tag(
        &self,
        tagid: &str,
        optionals: impl IntoIterator<Item = OptionalValue>,
    ) -> Result<serde_json::Value> {
        self.call("update_pbn_tag", build_params(&[("tagid", tagid)], optionals))
            .await
    }

    pub async fn renew_pbn_tag(
        &self,
        tagid: &str,
        coin: &str,
        optionals: impl IntoIterator<Item = OptionalValue>,
    ) -> Result<serde_json::Value> {
        self.call(
            "renew_pbn_tag",
            build_params(&[("tagid", tagid), ("coin", coin)], optionals),
        )
        .await
    }

    pub async fn delete_pbn_tag(
        &self,
        tagid: &str,
        optionals: impl IntoIterator<Item = OptionalValue>,
    ) -> Result<serde_json::Value> {
        self.call("delete_pbn_tag", build_params(&[("tagid", tagid)], optionals))
            .await
    }

    pub async fn claim_pbn_coupon(
        &self,
        coupon: &str,
        optionals: impl IntoIterator<Item = OptionalValue>,
    ) -> Result<PbnCoupon> {
        self.call("claim_pbn_coupon", build_params(&[("coupon", coupon)], optionals))
            .await
    }
}
