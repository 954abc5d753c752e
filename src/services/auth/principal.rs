use std::collections::BTreeSet;

use crate::services::auth::claims::ClaimsSet;

/// Reduce a granted scope to its last dot-separated segment.
///
/// `"tenant.assetRead"` -> `"assetRead"`; a scope without dots is unchanged.
pub fn normalize_scope(raw: &str) -> &str {
    raw.rsplit('.').next().unwrap_or(raw)
}

/// Authenticated identity for a single request.
///
/// Built by the authenticator and handed to the authorization step by value.
/// It lives in that request's extensions afterwards and nowhere else.
#[derive(Debug, Clone)]
pub struct Principal {
    claims: ClaimsSet,
    scopes: BTreeSet<String>,
}

impl Principal {
    pub fn from_claims(claims: ClaimsSet) -> Self {
        let scopes = claims
            .scopes
            .iter()
            .map(|s| normalize_scope(s.trim()))
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();

        Self { claims, scopes }
    }

    pub fn claims(&self) -> &ClaimsSet {
        &self.claims
    }

    /// Normalized granted scopes.
    pub fn scopes(&self) -> &BTreeSet<String> {
        &self.scopes
    }

    pub fn subject(&self) -> Option<&str> {
        self.claims.subject.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn normalize_keeps_last_segment() {
        assert_eq!(normalize_scope("tenant.assetWrite"), "assetWrite");
        assert_eq!(normalize_scope("a.b.c.catalogRead"), "catalogRead");
        assert_eq!(normalize_scope("assetRead"), "assetRead");
        assert_eq!(normalize_scope("tenant."), "");
    }

    #[test]
    fn principal_scopes_are_normalized_and_deduplicated() {
        let mut claims = ClaimsSet::at(Utc::now(), None);
        claims.scopes = vec![
            "t1.assetRead".into(),
            "t2.assetRead".into(),
            "catalogRead".into(),
            "broken.".into(),
        ];

        let principal = Principal::from_claims(claims);
        let scopes: Vec<_> = principal.scopes().iter().map(String::as_str).collect();
        assert_eq!(scopes, vec!["assetRead", "catalogRead"]);
        // raw claims are kept as issued
        assert_eq!(principal.claims().scopes.len(), 4);
    }
}
