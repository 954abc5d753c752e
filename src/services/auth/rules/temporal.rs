use std::sync::Arc;

use async_trait::async_trait;

use crate::services::auth::clock::Clock;
use crate::services::auth::credential::Token;

use super::{ValidationOutcome, ValidationRule};

pub const ISSUED_AFTER_EXPIRATION: &str = "issued-at after expiration";
pub const NOW_BEFORE_ISSUED_AT: &str = "current time before issued-at";

/// Orders `iat` against `exp` and the clock.
///
/// Only applies when the token carries `exp`. Whether `exp` has already passed
/// is [`ExpirationRule`](super::ExpirationRule)'s job.
#[derive(Debug, Clone)]
pub struct TemporalRule {
    clock: Arc<dyn Clock>,
}

impl TemporalRule {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }
}

#[async_trait]
impl ValidationRule for TemporalRule {
    fn name(&self) -> &'static str {
        "temporal"
    }

    async fn evaluate(&self, token: &Token) -> ValidationOutcome {
        let claims = token.claims();

        if let Some(expiration) = claims.expiration {
            if claims.issued_at > expiration {
                return ValidationOutcome::failure(ISSUED_AFTER_EXPIRATION);
            }
            // chrono keeps both sides in UTC
            if self.clock.now() < claims.issued_at {
                return ValidationOutcome::failure(NOW_BEFORE_ISSUED_AT);
            }
        }

        ValidationOutcome::Success(claims.clone())
    }
}
