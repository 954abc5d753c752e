use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Decoded claim set of a bearer credential.
///
/// Only the claims the pipeline reasons about are lifted out of the payload.
/// Signature, issuer and audience checks operate on the raw token instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimsSet {
    pub issued_at: DateTime<Utc>,
    pub expiration: Option<DateTime<Utc>>,
    /// Raw scope strings in token order (not normalized).
    pub scopes: Vec<String>,
    pub subject: Option<String>,
    pub issuer: Option<String>,
}

/// `scope` is an array in XSUAA tokens and a space-separated string in
/// plain OAuth2 access tokens.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum ScopeClaim {
    List(Vec<String>),
    Spaced(String),
}

impl ScopeClaim {
    pub(crate) fn into_vec(self) -> Vec<String> {
        match self {
            ScopeClaim::List(list) => list,
            ScopeClaim::Spaced(s) => s.split_whitespace().map(str::to_string).collect(),
        }
    }
}

/// NumericDate (RFC 7519 §2): seconds since the epoch, possibly fractional.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(untagged)]
pub(crate) enum NumericDate {
    Seconds(i64),
    Fractional(f64),
}

impl NumericDate {
    /// Whole seconds, truncated. `None` for non-finite or out-of-range values.
    pub(crate) fn whole_seconds(self) -> Option<i64> {
        match self {
            NumericDate::Seconds(s) => Some(s),
            NumericDate::Fractional(f) => {
                let t = f.trunc();
                (t.is_finite() && t >= i64::MIN as f64 && t < i64::MAX as f64).then_some(t as i64)
            }
        }
    }
}

/// Wire shape of the JWT payload.
#[derive(Debug, Deserialize)]
pub(crate) struct RawClaims {
    #[serde(default)]
    pub iss: Option<String>,
    #[serde(default)]
    pub sub: Option<String>,
    #[serde(default)]
    pub iat: Option<NumericDate>,
    #[serde(default)]
    pub exp: Option<NumericDate>,
    #[serde(default)]
    pub scope: Option<ScopeClaim>,
}

#[cfg(test)]
impl ClaimsSet {
    pub fn at(issued_at: DateTime<Utc>, expiration: Option<DateTime<Utc>>) -> Self {
        Self {
            issued_at,
            expiration,
            scopes: Vec::new(),
            subject: None,
            issuer: None,
        }
    }
}
