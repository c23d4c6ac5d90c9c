//! Slack request signing verification.
//!
//! Slack signs every webhook with the app's signing secret:
//! `v0=` + hex(HMAC-SHA256(secret, "v0:{timestamp}:{body}")). Requests whose
//! timestamp falls outside the tolerance window are rejected to limit replay.

use chrono::Utc;
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use tracing::debug;

use crate::{AppError, Result};

/// Header carrying the request signature.
pub const SIGNATURE_HEADER: &str = "x-slack-signature";
/// Header carrying the request timestamp (unix seconds).
pub const TIMESTAMP_HEADER: &str = "x-slack-request-timestamp";

type HmacSha256 = Hmac<Sha256>;

/// Verifies inbound requests against the signing secret.
#[derive(Clone)]
pub struct SignatureVerifier {
    signing_secret: SecretString,
    tolerance_seconds: u64,
}

impl std::fmt::Debug for SignatureVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignatureVerifier")
            .field("signing_secret", &"[REDACTED]")
            .field("tolerance_seconds", &self.tolerance_seconds)
            .finish()
    }
}

impl SignatureVerifier {
    /// Create a verifier with the given replay tolerance.
    #[must_use]
    pub fn new(signing_secret: SecretString, tolerance_seconds: u64) -> Self {
        Self {
            signing_secret,
            tolerance_seconds,
        }
    }

    /// Verify a request against the current wall clock.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Signature` on a malformed or stale timestamp or a
    /// signature mismatch.
    pub fn verify(&self, timestamp: &str, body: &[u8], signature: &str) -> Result<()> {
        self.verify_at(timestamp, body, signature, Utc::now().timestamp())
    }

    /// Verify a request as of `now` (unix seconds).
    ///
    /// # Errors
    ///
    /// Returns `AppError::Signature` on a malformed or stale timestamp or a
    /// signature mismatch.
    pub fn verify_at(&self, timestamp: &str, body: &[u8], signature: &str, now: i64) -> Result<()> {
        let ts: i64 = timestamp
            .trim()
            .parse()
            .map_err(|_| AppError::Signature(format!("invalid timestamp {timestamp:?}")))?;

        if now.abs_diff(ts) > self.tolerance_seconds {
            return Err(AppError::Signature("request timestamp outside tolerance".into()));
        }

        let expected = self.sign(timestamp, body)?;
        if !constant_time_eq(expected.as_bytes(), signature.as_bytes()) {
            return Err(AppError::Signature("signature mismatch".into()));
        }

        debug!("slack signature verified");
        Ok(())
    }

    /// Compute the `v0=` signature for a timestamp and body.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Signature` if the HMAC cannot be keyed.
    pub fn sign(&self, timestamp: &str, body: &[u8]) -> Result<String> {
        let mut mac = HmacSha256::new_from_slice(self.signing_secret.expose_secret().as_bytes())
            .map_err(|err| AppError::Signature(err.to_string()))?;
        mac.update(b"v0:");
        mac.update(timestamp.as_bytes());
        mac.update(b":");
        mac.update(body);
        Ok(format!("v0={}", hex::encode(mac.finalize().into_bytes())))
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
