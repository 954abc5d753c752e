use async_trait::async_trait;
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use std::{error::Error as StdError, fmt};

use crate::services::auth::credential::Token;

use super::{ValidationOutcome, ValidationRule};

/// Verification key material for access tokens.
#[derive(Clone)]
pub enum VerificationKey {
    /// Ed25519 public key, PEM encoded (EdDSA tokens).
    Ed25519Pem(String),
    /// Shared secret (HS256 tokens).
    HmacSecret(String),
}

impl fmt::Debug for VerificationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Do not print key material
        match self {
            Self::Ed25519Pem(_) => f.write_str("Ed25519Pem(..)"),
            Self::HmacSecret(_) => f.write_str("HmacSecret(..)"),
        }
    }
}

#[derive(Debug)]
pub enum JwtRuleError {
    InvalidKey(jsonwebtoken::errors::Error),
    EmptyIssuer,
}

impl fmt::Display for JwtRuleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidKey(e) => write!(f, "invalid verification key: {}", e),
            Self::EmptyIssuer => write!(f, "issuer must not be empty"),
        }
    }
}

impl StdError for JwtRuleError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::InvalidKey(e) => Some(e),
            _ => None,
        }
    }
}

/// Signature, issuer and audience verification, delegated to `jsonwebtoken`.
///
/// `exp` is deliberately not validated here; see `ExpirationRule`.
#[derive(Clone)]
pub struct JwtSignatureRule {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl fmt::Debug for JwtSignatureRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtSignatureRule")
            .field("validation", &self.validation)
            .finish()
    }
}

impl JwtSignatureRule {
    pub fn new(
        key: &VerificationKey,
        issuer: &str,
        audience: Option<&str>,
    ) -> Result<Self, JwtRuleError> {
        if issuer.trim().is_empty() {
            return Err(JwtRuleError::EmptyIssuer);
        }

        let (decoding_key, algorithm) = match key {
            VerificationKey::Ed25519Pem(pem) => (
                DecodingKey::from_ed_pem(pem.as_bytes()).map_err(JwtRuleError::InvalidKey)?,
                Algorithm::EdDSA,
            ),
            VerificationKey::HmacSecret(secret) => {
                (DecodingKey::from_secret(secret.as_bytes()), Algorithm::HS256)
            }
        };

        let mut validation = Validation::new(algorithm);
        validation.validate_exp = false;
        validation.set_issuer(&[issuer]);

        match audience {
            Some(aud) => {
                validation.set_audience(&[aud]);
                validation.set_required_spec_claims(&["iss", "aud"]);
            }
            None => {
                validation.validate_aud = false;
                validation.set_required_spec_claims(&["iss"]);
            }
        }

        Ok(Self {
            decoding_key,
            validation,
        })
    }
}

#[async_trait]
impl ValidationRule for JwtSignatureRule {
    fn name(&self) -> &'static str {
        "jwt-signature"
    }

    async fn evaluate(&self, token: &Token) -> ValidationOutcome {
        match jsonwebtoken::decode::<serde_json::Value>(
            token.raw(),
            &self.decoding_key,
            &self.validation,
        ) {
            Ok(data) => {
                // `sub` is optional for client-credential tokens, but never blank
                let blank_sub = data
                    .claims
                    .get("sub")
                    .and_then(|v| v.as_str())
                    .is_some_and(|s| s.trim().is_empty());
                if blank_sub {
                    return ValidationOutcome::failure("empty 'sub' claim");
                }
                ValidationOutcome::Success(token.claims().clone())
            }
            Err(e) => ValidationOutcome::failure(format!("jwt verification failed: {}", e)),
        }
    }
}
