use std::sync::Arc;

use async_trait::async_trait;
use chrono::Duration;

use crate::services::auth::clock::Clock;
use crate::services::auth::credential::Token;

use super::{ValidationOutcome, ValidationRule};

/// Sole owner of the `now > exp` check. The JWT rule runs with `exp`
/// validation turned off.
#[derive(Debug, Clone)]
pub struct ExpirationRule {
    clock: Arc<dyn Clock>,
    leeway: Duration,
}

impl ExpirationRule {
    pub fn new(clock: Arc<dyn Clock>, leeway: Duration) -> Self {
        Self { clock, leeway }
    }
}

#[async_trait]
impl ValidationRule for ExpirationRule {
    fn name(&self) -> &'static str {
        "expiration"
    }

    async fn evaluate(&self, token: &Token) -> ValidationOutcome {
        let claims = token.claims();

        let Some(expiration) = claims.expiration else {
            return ValidationOutcome::failure("missing expiration");
        };

        // `exp` is untrusted here; a deadline past the representable range
        // simply never passes.
        let Some(deadline) = expiration.checked_add_signed(self.leeway) else {
            return ValidationOutcome::Success(claims.clone());
        };

        if self.clock.now() > deadline {
            return ValidationOutcome::failure("current time after expiration");
        }

        ValidationOutcome::Success(claims.clone())
    }
}
