/// Factory: build the `AccessGuard` from application settings.
use std::{sync::Arc, time::Duration};

use crate::error::AppError;
use crate::services::auth::clock::Clock;
use crate::services::auth::decision::AuthorizationDecisionEngine;
use crate::services::auth::guard::AccessGuard;
use crate::services::auth::policy::ScopePolicyTable;
use crate::services::auth::rules::{JwtSignatureRule, ValidationChain, VerificationKey};
use crate::services::auth::TokenAuthenticator;

#[derive(Debug, Clone)]
pub struct AuthSettings {
    pub issuer: String,
    pub audience: Option<String>,
    pub key: VerificationKey,
    /// Grace period past `exp`.
    pub leeway: chrono::Duration,
    pub rule_timeout: Duration,
}

pub fn build_access_guard(
    settings: &AuthSettings,
    clock: Arc<dyn Clock>,
) -> Result<AccessGuard, AppError> {
    let signature = JwtSignatureRule::new(
        &settings.key,
        &settings.issuer,
        settings.audience.as_deref(),
    )
    .map_err(|e| {
        tracing::error!(error = %e, "failed to build jwt signature rule");
        AppError::Internal
    })?;

    let chain = ValidationChain::with_time_rules(clock, settings.leeway, settings.rule_timeout)
        .with_rule(signature);

    let table = ScopePolicyTable::management_api().map_err(|e| {
        tracing::error!(error = %e, "invalid scope policy table");
        AppError::Internal
    })?;

    tracing::info!(
        rules = ?chain.rule_names(),
        routes = table.len(),
        issuer = %settings.issuer,
        "API authentication: using bearer token"
    );

    Ok(AccessGuard::new(
        TokenAuthenticator::new(chain),
        AuthorizationDecisionEngine::new(Arc::new(table)),
    ))
}
