//! Tripay request and callback signatures.
//!
//! Outbound requests are signed over a canonical string whose layout
//! depends on whether an amount is present:
//!
//! - `merchant_code + merchant_ref + amount` for closed-payment invoices
//! - `merchant_code + channel + merchant_ref` for channel-scoped requests
//!
//! Callbacks are signed over the raw request body, byte for byte.

use anyhow::Result;
use service_core::utils::{sign_hmac_sha256, verify_hmac_sha256};

/// Inputs to an outbound Tripay signature.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TripaySignature {
    pub merchant_code: String,
    pub merchant_ref: String,
    pub amount: i64,
    pub channel: String,
}

impl TripaySignature {
    pub fn canonical_string(&self) -> String {
        if self.amount != 0 {
            format!("{}{}{}", self.merchant_code, self.merchant_ref, self.amount)
        } else {
            format!("{}{}{}", self.merchant_code, self.channel, self.merchant_ref)
        }
    }

    pub fn sign(&self, private_key: &str) -> Result<String> {
        sign_hmac_sha256(private_key.as_bytes(), self.canonical_string().as_bytes())
    }
}

/// Check `X-Callback-Signature` against the raw callback body.
pub fn verify_callback_signature(private_key: &str, raw_body: &[u8], signature: &str) -> Result<bool> {
    verify_hmac_sha256(private_key.as_bytes(), raw_body, signature)
}
