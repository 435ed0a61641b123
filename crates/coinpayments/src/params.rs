// ============================================================================
// COINPAYMENTS - Request Parameters
// ============================================================================
// Flat key/value request parameters, the per-call OptionalValue modifiers
// and the canonical form encoding that is both body and HMAC input.
// ============================================================================

use std::collections::BTreeMap;
use std::fmt;
use tracing::warn;
use url::form_urlencoded;

/// Keys written by the client on every call. Caller values for these are
/// always overwritten.
pub const RESERVED_KEYS: [&str; 4] = ["cmd", "format", "key", "version"];

/// Request parameters, kept sorted by key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    values: BTreeMap<String, String>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a parameter, replacing any previous value for the key
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.values.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.values.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Apply modifiers in order; later ones win.
    pub fn apply(&mut self, optionals: impl IntoIterator<Item = OptionalValue>) -> &mut Self {
        for optional in optionals {
            optional.apply(self);
        }
        self
    }

    /// Canonical `application/x-www-form-urlencoded` encoding, keys ascending.
    ///
    /// ```
    /// use coinpayments::Params;
    ///
    /// let mut params = Params::new();
    /// params.set("version", "1").set("cmd", "rates");
    /// assert_eq!(params.encode(), "cmd=rates&version=1");
    /// ```
    pub fn encode(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (key, value) in &self.values {
            serializer.append_pair(key, value);
        }
        serializer.finish()
    }

    /// Parse a form-encoded body. When a key repeats, the first value wins.
    pub fn decode(input: &[u8]) -> Self {
        let mut values = BTreeMap::new();
        for (key, value) in form_urlencoded::parse(input) {
            values
                .entry(key.into_owned())
                .or_insert_with(|| value.into_owned());
        }
        Self { values }
    }

    /// Write the reserved protocol fields last so nothing can override them.
    pub(crate) fn seal(mut self, reserved: [(&'static str, &str); 4]) -> Self {
        for (key, value) in reserved {
            debug_assert!(RESERVED_KEYS.contains(&key));
            if let Some(previous) = self.values.get(key) {
                if previous != value {
                    warn!("Ignoring caller value for reserved parameter '{}'", key);
                }
            }
            self.values.insert(key.to_string(), value.to_string());
        }
        self
    }
}

impl<K, V> FromIterator<(K, V)> for Params
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Params::new();
        for (key, value) in iter {
            params.set(key, value);
        }
        params
    }
}

// ============================================================================
// OPTIONAL VALUES
// ============================================================================

type Modifier = Box<dyn FnOnce(&mut Params) + Send>;

/// A per-call modifier applied to the request parameters before encoding.
///
/// Modifiers run in the order given and may override command defaults, but
/// never the reserved protocol fields.
pub struct OptionalValue(Modifier);

impl OptionalValue {
    /// Set `key` to `value`
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        let value = value.into();
        Self(Box::new(move |params: &mut Params| {
            params.set(key, value);
        }))
    }

    /// Arbitrary edit of the parameter collection
    pub fn from_fn(f: impl FnOnce(&mut Params) + Send + 'static) -> Self {
        Self(Box::new(f))
    }

    pub fn apply(self, params: &mut Params) {
        (self.0)(params)
    }

    /// URL that receives IPNs for this call
    pub fn ipn_url(url: impl Into<String>) -> Self {
        Self::new("ipn_url", url)
    }

    pub fn invoice(invoice: impl Into<String>) -> Self {
        Self::new("invoice", invoice)
    }

    pub fn custom(custom: impl Into<String>) -> Self {
        Self::new("custom", custom)
    }

    pub fn item_name(name: impl Into<String>) -> Self {
        Self::new("item_name", name)
    }

    pub fn item_number(number: impl Into<String>) -> Self {
        Self::new("item_number", number)
    }

    pub fn buyer_name(name: impl Into<String>) -> Self {
        Self::new("buyer_name", name)
    }

    /// Destination address for withdrawals and callback payouts
    pub fn address(address: impl Into<String>) -> Self {
        Self::new("address", address)
    }

    pub fn dest_tag(tag: impl Into<String>) -> Self {
        Self::new("dest_tag", tag)
    }

    pub fn note(note: impl Into<String>) -> Self {
        Self::new("note", note)
    }

    /// Skip the email confirmation step on withdrawals and transfers
    pub fn auto_confirm(enabled: bool) -> Self {
        Self::new("auto_confirm", if enabled { "1" } else { "0" })
    }
}

impl fmt::Debug for OptionalValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("OptionalValue(..)")
    }
}
