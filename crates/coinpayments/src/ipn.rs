// ============================================================================
// COINPAYMENTS - IPN Decoder
// ============================================================================
// Authenticates and decodes Instant Payment Notifications.
//
// An IPN is a form-encoded POST sent to the merchant's server. Its `HMAC`
// header is the hex HMAC-SHA512 of the raw body keyed by the IPN secret.
// The body is verified first and only then parsed; `ipn_type` selects which
// field group is present.
// ============================================================================

use crate::config::HMAC_HEADER;
use crate::error::CoinPaymentsError;
use crate::params::Params;
use crate::signer::HmacSigner;
use crate::Result;
use reqwest::header::HeaderMap;
use serde::Serialize;
use tracing::{debug, warn};

pub const IPN_TYPE_SIMPLE: &str = "simple";
pub const IPN_TYPE_BUTTON: &str = "button";
pub const IPN_TYPE_CART: &str = "cart";
pub const IPN_TYPE_DONATION: &str = "donation";
pub const IPN_TYPE_DEPOSIT: &str = "deposit";
pub const IPN_TYPE_WITHDRAWAL: &str = "withdrawal";
pub const IPN_TYPE_API: &str = "api";

// ============================================================================
// FIELD GROUPS
// ============================================================================
// All values stay strings, even amounts and counters. Absent keys are empty.

/// Fields present on every IPN
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IpnHeader {
    pub version: String,
    pub ipn_type: String,
    pub mode: String,
    pub id: String,
    pub merchant: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BuyerInfo {
    pub first_name: String,
    pub last_name: String,
    pub company: String,
    pub email: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ShippingInfo {
    pub address1: String,
    pub address2: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub country: String,
    pub country_name: String,
    pub phone: String,
}

/// Payment state shared by the checkout-style notifications
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PaymentStatus {
    pub status: String,
    pub status_text: String,
    pub txn_id: String,
    pub currency1: String,
    pub currency2: String,
    pub amount1: String,
    pub amount2: String,
    pub fee: String,
    /// Payout transaction id, once the coins have been sent on
    pub send_tx: String,
    pub received_amount: String,
    pub received_confirms: String,
}

/// Simple button checkout
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SimpleIpn {
    pub buyer: BuyerInfo,
    pub shipping: ShippingInfo,
    pub payment: PaymentStatus,
    pub subtotal: String,
    pub shipping_cost: String,
    pub tax: String,
    pub net: String,
    pub item_amount: String,
    pub item_name: String,
    pub item_desc: String,
    pub item_number: String,
    pub invoice: String,
    pub custom: String,
    pub on1: String,
    pub ov1: String,
    pub on2: String,
    pub ov2: String,
}

/// Advanced button checkout
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ButtonIpn {
    pub buyer: BuyerInfo,
    pub shipping: ShippingInfo,
    pub payment: PaymentStatus,
    pub subtotal: String,
    pub shipping_cost: String,
    pub tax: String,
    pub net: String,
    pub item_amount: String,
    pub item_name: String,
    pub quantity: String,
    pub item_number: String,
    pub invoice: String,
    pub custom: String,
    pub on1: String,
    pub ov1: String,
    pub on2: String,
    pub ov2: String,
    pub extra: String,
}

/// One line of a shopping cart checkout
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CartItem {
    pub name: String,
    pub amount: String,
    pub quantity: String,
    pub number: String,
    pub on1: String,
    pub ov1: String,
    pub on2: String,
    pub ov2: String,
}

/// Shopping cart checkout
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CartIpn {
    pub buyer: BuyerInfo,
    pub shipping: ShippingInfo,
    pub payment: PaymentStatus,
    pub subtotal: String,
    pub shipping_cost: String,
    pub tax: String,
    pub items: Vec<CartItem>,
    pub invoice: String,
    pub custom: String,
    pub extra: String,
}

/// Donation button checkout
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DonationIpn {
    pub buyer: BuyerInfo,
    pub shipping: ShippingInfo,
    pub payment: PaymentStatus,
    pub subtotal: String,
    pub shipping_cost: String,
    pub tax: String,
    pub net: String,
    pub item_name: String,
    pub item_number: String,
    pub invoice: String,
    pub custom: String,
    pub on1: String,
    pub ov1: String,
    pub on2: String,
    pub ov2: String,
    pub extra: String,
}

/// Deposit to a callback address
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DepositIpn {
    pub txn_id: String,
    pub address: String,
    pub dest_tag: String,
    pub status: String,
    pub status_text: String,
    pub currency: String,
    pub confirms: String,
    pub amount: String,
    pub amounti: String,
    pub fee: String,
    pub feei: String,
    pub fiat_coin: String,
    pub fiat_amount: String,
    pub fiat_amounti: String,
    pub fiat_fee: String,
    pub fiat_feei: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WithdrawalIpn {
    pub id: String,
    pub status: String,
    pub status_text: String,
    pub address: String,
    pub txn_id: String,
    pub currency: String,
    pub amount: String,
    pub amounti: String,
}

/// Transaction created through `create_transaction`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ApiIpn {
    pub payment: PaymentStatus,
    pub buyer_name: String,
    pub email: String,
    pub item_name: String,
    pub item_number: String,
    pub invoice: String,
    pub custom: String,
}

/// The field group selected by `ipn_type`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "fields", rename_all = "snake_case")]
pub enum IpnPayload {
    Simple(SimpleIpn),
    Button(ButtonIpn),
    Cart(CartIpn),
    Donation(DonationIpn),
    Deposit(DepositIpn),
    Withdrawal(WithdrawalIpn),
    Api(ApiIpn),
    /// `ipn_type` not known to this library; only the header is populated
    Unknown,
}

/// A verified, decoded notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ipn {
    header: IpnHeader,
    payload: IpnPayload,
}

impl Ipn {
    pub fn header(&self) -> &IpnHeader {
        &self.header
    }

    /// The raw discriminator
    pub fn ipn_type(&self) -> &str {
        &self.header.ipn_type
    }

    pub fn payload(&self) -> &IpnPayload {
        &self.payload
    }

    pub fn into_parts(self) -> (IpnHeader, IpnPayload) {
        (self.header, self.payload)
    }

    pub fn is_known_type(&self) -> bool {
        !matches!(self.payload, IpnPayload::Unknown)
    }

    fn mismatch(&self, expected: &'static str) -> CoinPaymentsError {
        CoinPaymentsError::IpnTypeMismatch {
            expected,
            actual: self.header.ipn_type.clone(),
        }
    }

    pub fn as_simple(&self) -> Result<&SimpleIpn> {
        match &self.payload {
            IpnPayload::Simple(ipn) => Ok(ipn),
            _ => Err(self.mismatch(IPN_TYPE_SIMPLE)),
        }
    }

    pub fn as_button(&self) -> Result<&ButtonIpn> {
        match &self.payload {
            IpnPayload::Button(ipn) => Ok(ipn),
            _ => Err(self.mismatch(IPN_TYPE_BUTTON)),
        }
    }

    pub fn as_cart(&self) -> Result<&CartIpn> {
        match &self.payload {
            IpnPayload::Cart(ipn) => Ok(ipn),
            _ => Err(self.mismatch(IPN_TYPE_CART)),
        }
    }

    pub fn as_donation(&self) -> Result<&DonationIpn> {
        match &self.payload {
            IpnPayload::Donation(ipn) => Ok(ipn),
            _ => Err(self.mismatch(IPN_TYPE_DONATION)),
        }
    }

    pub fn as_deposit(&self) -> Result<&DepositIpn> {
        match &self.payload {
            IpnPayload::Deposit(ipn) => Ok(ipn),
            _ => Err(self.mismatch(IPN_TYPE_DEPOSIT)),
        }
    }

    pub fn as_withdrawal(&self) -> Result<&WithdrawalIpn> {
        match &self.payload {
            IpnPayload::Withdrawal(ipn) => Ok(ipn),
            _ => Err(self.mismatch(IPN_TYPE_WITHDRAWAL)),
        }
    }

    pub fn as_api(&self) -> Result<&ApiIpn> {
        match &self.payload {
            IpnPayload::Api(ipn) => Ok(ipn),
            _ => Err(self.mismatch(IPN_TYPE_API)),
        }
    }
}

// ============================================================================
// DECODER
// ============================================================================

/// Verifies and decodes IPN bodies.
///
/// Without a secret, bodies are decoded unverified. Whether that is
/// acceptable is the integrator's decision.
#[derive(Debug, Clone, Default)]
pub struct IpnDecoder {
    signer: Option<HmacSigner>,
}

impl IpnDecoder {
    /// Decoder that requires a valid HMAC keyed by `secret`.
    /// An empty secret disables verification.
    pub fn new(secret: impl Into<String>) -> Self {
        let secret = secret.into();
        if secret.is_empty() {
            warn!("Empty IPN secret, notifications will not be verified");
            return Self::unverified();
        }
        Self {
            signer: Some(HmacSigner::new(secret)),
        }
    }

    /// Decoder that skips HMAC verification
    pub fn unverified() -> Self {
        Self { signer: None }
    }

    pub fn verifies_signatures(&self) -> bool {
        self.signer.is_some()
    }

    /// Verify `raw_body` against `signature` and decode it.
    ///
    /// `raw_body` must be the exact bytes received; `signature` is the value
    /// of the `HMAC` header.
    pub fn parse(&self, raw_body: &[u8], signature: Option<&str>) -> Result<Ipn> {
        match &self.signer {
            Some(signer) => {
                let signature = signature.ok_or_else(|| {
                    warn!("IPN rejected: no HMAC header");
                    CoinPaymentsError::MissingIpnSignature
                })?;
                if !signer.verify(raw_body, signature)? {
                    warn!("IPN rejected: HMAC mismatch");
                    return Err(CoinPaymentsError::IpnSignatureMismatch);
                }
            }
            None => debug!("No IPN secret configured, skipping HMAC check"),
        }

        let ipn = decode(&Params::decode(raw_body));
        debug!(
            "Decoded IPN {} of type '{}'",
            ipn.header.id, ipn.header.ipn_type
        );
        Ok(ipn)
    }

    /// Same as [`parse`](Self::parse), reading the signature from `headers`.
    pub fn parse_request(&self, headers: &HeaderMap, raw_body: &[u8]) -> Result<Ipn> {
        let signature = headers
            .get(HMAC_HEADER)
            .map(|value| value.to_str().unwrap_or_default());
        self.parse(raw_body, signature)
    }
}

fn field(form: &Params, key: &str) -> String {
    form.get(key).unwrap_or_default().to_string()
}

fn decode(form: &Params) -> Ipn {
    let header = IpnHeader {
        version: field(form, "ipn_version"),
        ipn_type: field(form, "ipn_type"),
        mode: field(form, "ipn_mode"),
        id: field(form, "ipn_id"),
        merchant: field(form, "merchant"),
    };

    let payload = match header.ipn_type.as_str() {
        IPN_TYPE_SIMPLE => IpnPayload::Simple(SimpleIpn {
            buyer: buyer(form),
            shipping: shipping(form),
            payment: payment_status(form),
            subtotal: field(form, "subtotal"),
            shipping_cost: field(form, "shipping"),
            tax: field(form, "tax"),
            net: field(form, "net"),
            item_amount: field(form, "item_amount"),
            item_name: field(form, "item_name"),
            item_desc: field(form, "item_desc"),
            item_number: field(form, "item_number"),
            invoice: field(form, "invoice"),
            custom: field(form, "custom"),
            on1: field(form, "on1"),
            ov1: field(form, "ov1"),
            on2: field(form, "on2"),
            ov2: field(form, "ov2"),
        }),
        IPN_TYPE_BUTTON => IpnPayload::Button(ButtonIpn {
            buyer: buyer(form),
            shipping: shipping(form),
            payment: payment_status(form),
            subtotal: field(form, "subtotal"),
            shipping_cost: field(form, "shipping"),
            tax: field(form, "tax"),
            net: field(form, "net"),
            item_amount: field(form, "item_amount"),
            item_name: field(form, "item_name"),
            quantity: field(form, "quantity"),
            item_number: field(form, "item_number"),
            invoice: field(form, "invoice"),
            custom: field(form, "custom"),
            on1: field(form, "on1"),
            ov1: field(form, "ov1"),
            on2: field(form, "on2"),
            ov2: field(form, "ov2"),
            extra: field(form, "extra"),
        }),
        IPN_TYPE_CART => IpnPayload::Cart(CartIpn {
            buyer: buyer(form),
            shipping: shipping(form),
            payment: payment_status(form),
            subtotal: field(form, "subtotal"),
            shipping_cost: field(form, "shipping"),
            tax: field(form, "tax"),
            items: cart_items(form),
            invoice: field(form, "invoice"),
            custom: field(form, "custom"),
            extra: field(form, "extra"),
        }),
        IPN_TYPE_DONATION => IpnPayload::Donation(DonationIpn {
            buyer: buyer(form),
            shipping: shipping(form),
            payment: payment_status(form),
            subtotal: field(form, "subtotal"),
            shipping_cost: field(form, "shipping"),
            tax: field(form, "tax"),
            net: field(form, "net"),
            item_name: field(form, "item_name"),
            item_number: field(form, "item_number"),
            invoice: field(form, "invoice"),
            custom: field(form, "custom"),
            on1: field(form, "on1"),
            ov1: field(form, "ov1"),
            on2: field(form, "on2"),
            ov2: field(form, "ov2"),
            extra: field(form, "extra"),
        }),
        IPN_TYPE_DEPOSIT => IpnPayload::Deposit(DepositIpn {
            txn_id: field(form, "txn_id"),
            address: field(form, "address"),
            dest_tag: field(form, "dest_tag"),
            status: field(form, "status"),
            status_text: field(form, "status_text"),
            currency: field(form, "currency"),
            confirms: field(form, "confirms"),
            amount: field(form, "amount"),
            amounti: field(form, "amounti"),
            fee: field(form, "fee"),
            feei: field(form, "feei"),
            fiat_coin: field(form, "fiat_coin"),
            fiat_amount: field(form, "fiat_amount"),
            fiat_amounti: field(form, "fiat_amounti"),
            fiat_fee: field(form, "fiat_fee"),
            fiat_feei: field(form, "fiat_feei"),
        }),
        IPN_TYPE_WITHDRAWAL => IpnPayload::Withdrawal(WithdrawalIpn {
            id: field(form, "id"),
            status: field(form, "status"),
            status_text: field(form, "status_text"),
            address: field(form, "address"),
            txn_id: field(form, "txn_id"),
            currency: field(form, "currency"),
            amount: field(form, "amount"),
            amounti: field(form, "amounti"),
        }),
        IPN_TYPE_API => IpnPayload::Api(ApiIpn {
            payment: payment_status(form),
            buyer_name: field(form, "buyer_name"),
            email: field(form, "email"),
            item_name: field(form, "item_name"),
            item_number: field(form, "item_number"),
            invoice: field(form, "invoice"),
            custom: field(form, "custom"),
        }),
        other => {
            debug!("Unrecognized IPN type '{}'", other);
            IpnPayload::Unknown
        }
    };

    Ipn { header, payload }
}

fn buyer(form: &Params) -> BuyerInfo {
    BuyerInfo {
        first_name: field(form, "first_name"),
        last_name: field(form, "last_name"),
        company: field(form, "company"),
        email: field(form, "email"),
    }
}

fn shipping(form: &Params) -> ShippingInfo {
    ShippingInfo {
        address1: field(form, "address1"),
        address2: field(form, "address2"),
        city: field(form, "city"),
        state: field(form, "state"),
        zip: field(form, "zip"),
        country: field(form, "country"),
        country_name: field(form, "country_name"),
        phone: field(form, "phone"),
    }
}

fn payment_status(form: &Params) -> PaymentStatus {
    PaymentStatus {
        status: field(form, "status"),
        status_text: field(form, "status_text"),
        txn_id: field(form, "txn_id"),
        currency1: field(form, "currency1"),
        currency2: field(form, "currency2"),
        amount1: field(form, "amount1"),
        amount2: field(form, "amount2"),
        fee: field(form, "fee"),
        send_tx: field(form, "send_tx"),
        received_amount: field(form, "received_amount"),
        received_confirms: field(form, "received_confirms"),
    }
}

// Cart lines are numbered from 1; the list ends at the first index with
// neither a name nor an amount.
fn cart_items(form: &Params) -> Vec<CartItem> {
    let mut items = Vec::new();
    for index in 1usize.. {
        let name_key = format!("item_name_{}", index);
        let amount_key = format!("item_amount_{}", index);
        if !form.contains_key(&name_key) && !form.contains_key(&amount_key) {
            break;
        }
        items.push(CartItem {
            name: field(form, &name_key),
            amount: field(form, &amount_key),
            quantity: field(form, &format!("item_quantity_{}", index)),
            number: field(form, &format!("item_number_{}", index)),
            on1: field(form, &format!("item_on1_{}", index)),
            ov1: field(form, &format!("item_ov1_{}", index)),
            on2: field(form, &format!("item_on2_{}", index)),
            ov2: field(form, &format!("item_ov2_{}", index)),
        });
    }
    items
}
