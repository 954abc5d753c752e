use std::{collections::BTreeSet, sync::Arc};

use axum::http::Method;

use crate::services::auth::policy::ScopePolicyTable;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorizationDecision {
    Allow,
    Deny(DenyReason),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DenyReason {
    #[error("no scope policy registered for route")]
    UnmappedRoute,
    #[error("missing scopes: {}", .missing.join(", "))]
    InsufficientScope { missing: Vec<String> },
}

/// Grants a route only when the principal holds every scope it requires.
#[derive(Debug, Clone)]
pub struct AuthorizationDecisionEngine {
    table: Arc<ScopePolicyTable>,
}

impl AuthorizationDecisionEngine {
    pub fn new(table: Arc<ScopePolicyTable>) -> Self {
        Self { table }
    }

    /// CORS preflight carries no credentials and is never checked.
    pub fn is_preflight(method: &Method) -> bool {
        *method == Method::OPTIONS
    }

    /// `granted` must already be normalized (see `Principal::scopes`).
    pub fn decide(
        &self,
        granted: &BTreeSet<String>,
        path: &str,
        method: &Method,
    ) -> AuthorizationDecision {
        if Self::is_preflight(method) {
            return AuthorizationDecision::Allow;
        }

        let required = self.table.lookup(path, method);
        if required.is_empty() {
            return AuthorizationDecision::Deny(DenyReason::UnmappedRoute);
        }

        let missing: Vec<String> = required.difference(granted).cloned().collect();
        if missing.is_empty() {
            AuthorizationDecision::Allow
        } else {
            AuthorizationDecision::Deny(DenyReason::InsufficientScope { missing })
        }
    }
}
