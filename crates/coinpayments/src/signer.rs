// ============================================================================
// COINPAYMENTS - HMAC Signer
// ============================================================================
// HMAC-SHA512 over raw bytes, lowercase hex output.
//
// Two independent signers exist per client:
// - private API key  -> signs outbound request bodies
// - IPN secret       -> verifies inbound notification bodies
// ============================================================================

use crate::error::CoinPaymentsError;
use crate::Result;
use hmac::{Hmac, Mac};
use sha2::Sha512;
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

type HmacSha512 = Hmac<Sha512>;

/// Secret key material that is wiped from memory when dropped
/// and never shown by `Debug`.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub(crate) struct SecretKey(String);

impl SecretKey {
    pub(crate) fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    fn expose(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKey(***)")
    }
}

/// Keyed HMAC-SHA512 signer
#[derive(Debug, Clone)]
pub struct HmacSigner {
    key: SecretKey,
}

impl HmacSigner {
    /// Create a signer for the given key
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: SecretKey::new(key),
        }
    }

    /// Lowercase hex HMAC-SHA512 of `message`
    ///
    /// # Example
    /// ```
    /// use coinpayments::HmacSigner;
    ///
    /// let signer = HmacSigner::new("testkey");
    /// let sig = signer.sign(b"cmd=rates&format=json&key=pub&version=1").unwrap();
    /// assert_eq!(sig.len(), 128);
    /// ```
    pub fn sign(&self, message: &[u8]) -> Result<String> {
        let mut mac = HmacSha512::new_from_slice(self.key.expose())
            .map_err(|e| CoinPaymentsError::Signing(e.to_string()))?;
        mac.update(message);
        Ok(hex::encode(mac.finalize().into_bytes()))
    }

    /// Check `signature` against the HMAC of `message`.
    ///
    /// The comparison is exact on the hex string (an uppercase signature does
    /// not match) and runs in constant time.
    pub fn verify(&self, message: &[u8], signature: &str) -> Result<bool> {
        let expected = self.sign(message)?;
        Ok(constant_time_eq(expected.as_bytes(), signature.as_bytes()))
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b) {
        diff |= x ^ y;
    }
    diff == 0
}
