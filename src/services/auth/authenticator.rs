use axum::http::{HeaderMap, header};
use tracing::{debug, warn};

use crate::services::auth::credential::{BearerCredential, CredentialError};
use crate::services::auth::principal::Principal;
use crate::services::auth::rules::{ValidationChain, ValidationOutcome};

#[derive(Debug, thiserror::Error)]
pub enum AuthnError {
    #[error("no bearer credential presented")]
    NoCredential,
    #[error("malformed token: {0}")]
    MalformedToken(#[from] CredentialError),
    #[error("token validation failed: {}", .0.join("; "))]
    ValidationFailed(Vec<String>),
}

/// Turns the `Authorization` headers of a request into a [`Principal`].
///
/// Several header instances may be present. They are tried in order and the
/// first one that validates wins; a bad value only fails itself.
#[derive(Debug)]
pub struct TokenAuthenticator {
    chain: ValidationChain,
}

impl TokenAuthenticator {
    pub fn new(chain: ValidationChain) -> Self {
        Self { chain }
    }

    pub async fn authenticate(&self, headers: &HeaderMap) -> Result<Principal, AuthnError> {
        // HeaderMap names are case-insensitive
        let values: Vec<_> = headers.get_all(header::AUTHORIZATION).iter().collect();
        if values.is_empty() {
            return Err(AuthnError::NoCredential);
        }

        let mut last_err = AuthnError::NoCredential;

        for (index, value) in values.into_iter().enumerate() {
            let attempt = match value.to_str() {
                Ok(v) => self.authenticate_value(v).await,
                Err(_) => Err(CredentialError::InvalidHeaderEncoding.into()),
            };

            match attempt {
                Ok(principal) => {
                    debug!(index, subject = ?principal.subject(), "bearer token validated");
                    return Ok(principal);
                }
                Err(err) => {
                    warn!(index, error = %err, "bearer token rejected");
                    last_err = err;
                }
            }
        }

        Err(last_err)
    }

    pub async fn is_authenticated(&self, headers: &HeaderMap) -> bool {
        self.authenticate(headers).await.is_ok()
    }

    async fn authenticate_value(&self, value: &str) -> Result<Principal, AuthnError> {
        let token = BearerCredential::parse(value)?.decode()?;

        match self.chain.evaluate(&token).await {
            ValidationOutcome::Success(claims) => Ok(Principal::from_claims(claims)),
            ValidationOutcome::Failure(reasons) => Err(AuthnError::ValidationFailed(reasons)),
        }
    }
}
