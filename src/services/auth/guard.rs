//! Per-request access pipeline: preflight bypass, authentication, then
//! scope authorization.

use axum::http::{HeaderMap, Method};

use crate::services::auth::authenticator::{AuthnError, TokenAuthenticator};
use crate::services::auth::decision::{
    AuthorizationDecision, AuthorizationDecisionEngine, DenyReason,
};
use crate::services::auth::principal::Principal;

/// Terminal state of one request in the pipeline.
#[derive(Debug)]
pub enum GuardOutcome {
    /// `OPTIONS` request; nothing was checked.
    Preflight,
    Authorized(Principal),
    /// Maps to 401.
    Unauthenticated(AuthnError),
    /// Maps to 403.
    Forbidden(DenyReason),
}

#[derive(Debug)]
pub struct AccessGuard {
    authenticator: TokenAuthenticator,
    engine: AuthorizationDecisionEngine,
}

impl AccessGuard {
    pub fn new(authenticator: TokenAuthenticator, engine: AuthorizationDecisionEngine) -> Self {
        Self {
            authenticator,
            engine,
        }
    }

    /// `path` is relative to the management API base path.
    pub async fn check(&self, method: &Method, path: &str, headers: &HeaderMap) -> GuardOutcome {
        if AuthorizationDecisionEngine::is_preflight(method) {
            return GuardOutcome::Preflight;
        }

        let principal = match self.authenticator.authenticate(headers).await {
            Ok(principal) => principal,
            Err(err) => return GuardOutcome::Unauthenticated(err),
        };

        match self.engine.decide(principal.scopes(), path, method) {
            AuthorizationDecision::Allow => GuardOutcome::Authorized(principal),
            AuthorizationDecision::Deny(reason) => GuardOutcome::Forbidden(reason),
        }
    }
}
