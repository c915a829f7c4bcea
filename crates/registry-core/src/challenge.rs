//! Authentication challenge verification
//!
//! A caller proves possession of an application's shared secret by sending a
//! nonce together with `HMAC-SHA256(secret, nonce)`. The registry recomputes
//! the keyed hash over the nonce and compares it to the supplied challenge.
//!
//! # Security Properties
//!
//! - Comparison uses the `subtle` crate for constant-time equality
//! - Nonce and challenge travel hex-encoded; a challenge that is not valid
//!   hex can never match and verifies as `false`

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::error::{RegistryError, Result};

type HmacSha256 = Hmac<Sha256>;

fn compute_bytes(secret: &str, nonce_hex: &str) -> Result<Vec<u8>> {
    let nonce = hex::decode(nonce_hex)
        .map_err(|e| RegistryError::Invalid(format!("invalid nonce encoding: {e}")))?;

    // HMAC accepts keys of any length
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| RegistryError::Invalid(format!("invalid hmac key: {e}")))?;
    mac.update(&nonce);
    Ok(mac.finalize().into_bytes().to_vec())
}

/// Compute the expected challenge for a nonce, hex-encoded
///
/// Returns `Invalid` if the nonce is not valid hex.
pub fn compute_challenge(secret: &str, nonce_hex: &str) -> Result<String> {
    Ok(hex::encode(compute_bytes(secret, nonce_hex)?))
}

/// Verify a supplied challenge against the expected keyed hash of the nonce
///
/// The comparison runs over the decoded bytes in constant time. A malformed
/// challenge verifies as `false`; a malformed nonce is the caller's error.
pub fn verify_challenge(secret: &str, nonce_hex: &str, challenge_hex: &str) -> Result<bool> {
    let expected = compute_bytes(secret, nonce_hex)?;

    let supplied = match hex::decode(challenge_hex) {
        Ok(bytes) => bytes,
        Err(_) => return Ok(false),
    };

    if supplied.len() != expected.len() {
        return Ok(false);
    }
    Ok(expected.ct_eq(&supplied).into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_challenge_verifies() {
        let challenge = compute_challenge("s3cret", "deadbeef").unwrap();
        assert!(verify_challenge("s3cret", "deadbeef", &challenge).unwrap());
    }

    #[test]
    fn single_bit_mutation_fails() {
        let challenge = compute_challenge("s3cret", "deadbeef").unwrap();
        let mut bytes = hex::decode(&challenge).unwrap();
        bytes[0] ^= 0x01;
        assert!(!verify_challenge("s3cret", "deadbeef", &hex::encode(bytes)).unwrap());
    }

    #[test]
    fn wrong_secret_fails() {
        let challenge = compute_challenge("s3cret", "deadbeef").unwrap();
        assert!(!verify_challenge("other", "deadbeef", &challenge).unwrap());
    }

    #[test]
    fn malformed_challenge_is_false_not_error() {
        assert!(!verify_challenge("s3cret", "deadbeef", "zz-not-hex").unwrap());
        assert!(!verify_challenge("s3cret", "deadbeef", "beef").unwrap());
    }

    #[test]
    fn malformed_nonce_is_an_error() {
        let err = verify_challenge("s3cret", "not hex!", "beef").unwrap_err();
        assert!(matches!(err, RegistryError::Invalid(_)));
    }
}
