//! Slack request signing (`v0` HMAC-SHA256 over `v0:{timestamp}:{body}`).

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

pub const SIGNATURE_HEADER: &str = "x-slack-signature";
pub const TIMESTAMP_HEADER: &str = "x-slack-request-timestamp";
/// Requests older than this are treated as replays.
pub const MAX_REQUEST_AGE_SECS: u64 = 60 * 5;
const VERSION: &str = "v0";

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SignatureError {
    #[error("missing `{0}` header")]
    MissingHeader(&'static str),
    #[error("request timestamp is not a unix timestamp")]
    InvalidTimestamp,
    #[error("request timestamp is outside the accepted window")]
    Stale,
    #[error("signature is not a v0 hex digest")]
    Malformed,
    #[error("signature does not match request body")]
    Mismatch,
}

#[derive(Clone)]
pub struct SignatureVerifier {
    signing_secret: SecretString,
}

impl SignatureVerifier {
    pub fn new(signing_secret: SecretString) -> Self {
        Self { signing_secret }
    }

    pub fn verify(
        &self,
        timestamp: Option<&str>,
        signature: Option<&str>,
        body: &[u8],
        now_unix: i64,
    ) -> Result<(), SignatureError> {
        let timestamp = timestamp.ok_or(SignatureError::MissingHeader(TIMESTAMP_HEADER))?;
        let signature = signature.ok_or(SignatureError::MissingHeader(SIGNATURE_HEADER))?;

        let sent_at: i64 =
            timestamp.trim().parse().map_err(|_| SignatureError::InvalidTimestamp)?;
        if now_unix.abs_diff(sent_at) > MAX_REQUEST_AGE_SECS {
            return Err(SignatureError::Stale);
        }

        let digest = signature
            .strip_prefix("v0=")
            .and_then(|hex_digest| hex::decode(hex_digest).ok())
            .ok_or(SignatureError::Malformed)?;

        self.mac_for(timestamp.trim(), body)?
            .verify_slice(&digest)
            .map_err(|_| SignatureError::Mismatch)
    }

    /// Computes the `v0=` signature Slack would send for this timestamp and body.
    pub fn sign(&self, timestamp: &str, body: &[u8]) -> Result<String, SignatureError> {
        let mac = self.mac_for(timestamp, body)?;
        Ok(format!("{VERSION}={}", hex::encode(mac.finalize().into_bytes())))
    }

    fn mac_for(&self, timestamp: &str, body: &[u8]) -> Result<HmacSha256, SignatureError> {
        let mut mac = HmacSha256::new_from_slice(self.signing_secret.expose_secret().as_bytes())
            .map_err(|_| SignatureError::Malformed)?;
        mac.update(VERSION.as_bytes());
        mac.update(b":");
        mac.update(timestamp.as_bytes());
        mac.update(b":");
        mac.update(body);
        Ok(mac)
    }
}

#[cfg(test)]
mod tests {
    use secrecy::SecretString;

    use super::{SignatureError, SignatureVerifier};

    const NOW: i64 = 1_760_000_000;
    const BODY: &[u8] = b"command=%2Fdocs&text=browse&user_id=U1";

    fn verifier() -> SignatureVerifier {
        SignatureVerifier::new(SecretString::from("8f742231b10e8888abcd99yyyzzz85a5".to_owned()))
    }

    #[test]
    fn accepts_a_correctly_signed_request() {
        let verifier = verifier();
        let timestamp = NOW.to_string();
        let signature = verifier.sign(&timestamp, BODY).expect("sign");

        assert!(signature.starts_with("v0="));
        assert_eq!(verifier.verify(Some(timestamp.as_str()), Some(signature.as_str()), BODY, NOW), Ok(()));
    }

    #[test]
    fn rejects_tampered_body_and_foreign_secret() {
        let verifier = verifier();
        let timestamp = NOW.to_string();
        let signature = verifier.sign(&timestamp, BODY).expect("sign");

        assert_eq!(
            verifier.verify(Some(timestamp.as_str()), Some(signature.as_str()), b"command=%2Fdocs&text=share", NOW),
            Err(SignatureError::Mismatch)
        );

        let other = SignatureVerifier::new(SecretString::from("another-secret".to_owned()));
        assert_eq!(
            other.verify(Some(timestamp.as_str()), Some(signature.as_str()), BODY, NOW),
            Err(SignatureError::Mismatch)
        );
    }

    #[test]
    fn rejects_requests_older_than_five_minutes() {
        let verifier = verifier();
        let old = (NOW - 301).to_string();
        let signature = verifier.sign(&old, BODY).expect("sign");
        assert_eq!(
            verifier.verify(Some(old.as_str()), Some(signature.as_str()), BODY, NOW),
            Err(SignatureError::Stale)
        );

        let recent = (NOW - 299).to_string();
        let signature = verifier.sign(&recent, BODY).expect("sign");
        assert_eq!(verifier.verify(Some(recent.as_str()), Some(signature.as_str()), BODY, NOW), Ok(()));
    }

    #[test]
    fn extreme_timestamps_are_stale_rather_than_overflowing() {
        let verifier = verifier();
        for timestamp in ["-9223372036854775808", "9223372036854775807"] {
            assert_eq!(
                verifier.verify(Some(timestamp), Some("v0=00"), BODY, NOW),
                Err(SignatureError::Stale),
                "{timestamp}"
            );
        }
    }

    #[test]
    fn reports_missing_and_malformed_headers() {
        let verifier = verifier();
        let timestamp = NOW.to_string();
        assert_eq!(
            verifier.verify(None, Some("v0=00"), BODY, NOW),
            Err(SignatureError::MissingHeader("x-slack-request-timestamp"))
        );
        assert_eq!(
            verifier.verify(Some(timestamp.as_str()), None, BODY, NOW),
            Err(SignatureError::MissingHeader("x-slack-signature"))
        );
        assert_eq!(
            verifier.verify(Some("yesterday"), Some("v0=00"), BODY, NOW),
            Err(SignatureError::InvalidTimestamp)
        );
        assert_eq!(
            verifier.verify(Some(timestamp.as_str()), Some("v1=zz"), BODY, NOW),
            Err(SignatureError::Malformed)
        );
    }
}
