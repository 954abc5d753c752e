//! Token validation rules and the ordered chain that combines them.
//!
//! Every rule sees the same decoded token. The chain runs all of them in
//! order and merges their failure reasons, so one response can explain every
//! problem with a credential.

pub mod expiration;
pub mod jwt;
pub mod temporal;

use std::{fmt, sync::Arc, time::Duration};

use async_trait::async_trait;

use crate::services::auth::claims::ClaimsSet;
use crate::services::auth::clock::Clock;
use crate::services::auth::credential::Token;

pub use expiration::ExpirationRule;
pub use jwt::{JwtRuleError, JwtSignatureRule, VerificationKey};
pub use temporal::TemporalRule;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationOutcome {
    Success(ClaimsSet),
    Failure(Vec<String>),
}

impl ValidationOutcome {
    pub fn failure(reason: impl Into<String>) -> Self {
        Self::Failure(vec![reason.into()])
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}

/// One check over a decoded token.
///
/// Implementations may perform I/O (e.g. fetching signing keys); the chain
/// bounds each call with a timeout.
#[async_trait]
pub trait ValidationRule: Send + Sync {
    fn name(&self) -> &'static str;

    async fn evaluate(&self, token: &Token) -> ValidationOutcome;
}

pub struct ValidationChain {
    rules: Vec<Box<dyn ValidationRule>>,
    rule_timeout: Duration,
}

impl fmt::Debug for ValidationChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidationChain")
            .field("rules", &self.rule_names())
            .field("rule_timeout", &self.rule_timeout)
            .finish()
    }
}

impl ValidationChain {
    pub fn new(rule_timeout: Duration) -> Self {
        Self {
            rules: Vec::new(),
            rule_timeout,
        }
    }

    /// Chain pre-seeded with the built-in time rules: issued-at ordering
    /// first, then expiration against the clock.
    pub fn with_time_rules(
        clock: Arc<dyn Clock>,
        expiration_leeway: chrono::Duration,
        rule_timeout: Duration,
    ) -> Self {
        Self::new(rule_timeout)
            .with_rule(TemporalRule::new(clock.clone()))
            .with_rule(ExpirationRule::new(clock, expiration_leeway))
    }

    pub fn with_rule(mut self, rule: impl ValidationRule + 'static) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    pub async fn evaluate(&self, token: &Token) -> ValidationOutcome {
        // An empty chain would accept anything.
        if self.rules.is_empty() {
            return ValidationOutcome::failure("no validation rules configured");
        }

        let mut reasons = Vec::new();

        for rule in &self.rules {
            match tokio::time::timeout(self.rule_timeout, rule.evaluate(token)).await {
                Ok(ValidationOutcome::Success(_)) => {}
                Ok(ValidationOutcome::Failure(mut r)) => reasons.append(&mut r),
                Err(_) => {
                    tracing::warn!(rule = rule.name(), "validation rule timed out");
                    reasons.push(format!("validation rule {} timed out", rule.name()));
                }
            }
        }

        if reasons.is_empty() {
            ValidationOutcome::Success(token.claims().clone())
        } else {
            ValidationOutcome::Failure(reasons)
        }
    }
}
