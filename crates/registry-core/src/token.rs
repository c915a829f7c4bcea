//! Identity token verification
//!
//! An identity token is a JWT carrying the acting user principal in its
//! `sub` claim. Applications authenticate with credentials; the token is the
//! extra proof required by operations whose authorization depends on
//! ownership. Only claim *use* lives here; token issuance belongs to the
//! external accounts service.

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::error::{RegistryError, Result};

/// Wire claims of an identity token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Acting user principal
    pub sub: String,
    /// Expiration, unix seconds
    pub exp: i64,
}

/// A verified identity token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityToken {
    /// The user principal the caller is acting for
    pub subject: String,
}

/// Verifies identity tokens against a shared HS256 key
#[derive(Clone)]
pub struct TokenVerifier {
    key: DecodingKey,
}

impl TokenVerifier {
    /// Create a verifier for the given HS256 key material
    pub fn new(key: &[u8]) -> Self {
        Self {
            key: DecodingKey::from_secret(key),
        }
    }

    /// Verify a token and extract the acting subject
    ///
    /// Any verification failure (bad signature, expired, malformed) is an
    /// authentication failure, so it surfaces as `Forbidden`.
    pub fn verify(&self, token: &str) -> Result<IdentityToken> {
        let validation = Validation::new(Algorithm::HS256);
        let data = decode::<Claims>(token, &self.key, &validation)
            .map_err(|_| RegistryError::Forbidden)?;

        if data.claims.sub.is_empty() {
            return Err(RegistryError::Forbidden);
        }

        Ok(IdentityToken {
            subject: data.claims.sub,
        })
    }
}

impl std::fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenVerifier").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn sign(sub: &str, key: &[u8], exp: i64) -> String {
        encode(
            &Header::new(Algorithm::HS256),
            &Claims {
                sub: sub.to_string(),
                exp,
            },
            &EncodingKey::from_secret(key),
        )
        .unwrap()
    }

    fn far_future() -> i64 {
        chrono::Utc::now().timestamp() + 3600
    }

    #[test]
    fn valid_token_yields_subject() {
        let verifier = TokenVerifier::new(b"k");
        let token = sign("alice", b"k", far_future());
        assert_eq!(verifier.verify(&token).unwrap().subject, "alice");
    }

    #[test]
    fn wrong_key_is_forbidden() {
        let verifier = TokenVerifier::new(b"k");
        let token = sign("alice", b"other", far_future());
        assert_eq!(verifier.verify(&token).unwrap_err(), RegistryError::Forbidden);
    }

    #[test]
    fn expired_token_is_forbidden() {
        let verifier = TokenVerifier::new(b"k");
        let token = sign("alice", b"k", chrono::Utc::now().timestamp() - 600);
        assert_eq!(verifier.verify(&token).unwrap_err(), RegistryError::Forbidden);
    }

    #[test]
    fn garbage_is_forbidden() {
        let verifier = TokenVerifier::new(b"k");
        assert_eq!(
            verifier.verify("not-a-jwt").unwrap_err(),
            RegistryError::Forbidden
        );
    }
}
