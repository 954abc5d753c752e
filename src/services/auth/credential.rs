//! Bearer credential extraction and claim decoding.
//!
//! Decoding here is structural only: split the compact JWS, base64url-decode
//! the payload and lift the claims. Whether the token can be trusted is the
//! validation chain's call.

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, Utc};

use crate::services::auth::claims::{ClaimsSet, NumericDate, RawClaims};

#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("header value is not visible ascii")]
    InvalidHeaderEncoding,
    #[error("missing Bearer scheme")]
    MissingScheme,
    #[error("empty bearer token")]
    EmptyToken,
    #[error("token is not a compact JWS")]
    NotCompactJws,
    #[error("invalid base64url payload: {0}")]
    Payload(#[from] base64::DecodeError),
    #[error("invalid claims json: {0}")]
    Claims(#[from] serde_json::Error),
    #[error("missing required claim: {0}")]
    MissingClaim(&'static str),
    #[error("timestamp out of range in claim: {0}")]
    TimestampOutOfRange(&'static str),
}

/// Opaque token carried after the `Bearer` scheme of an `Authorization` value.
#[derive(Clone, PartialEq, Eq)]
pub struct BearerCredential(String);

impl std::fmt::Debug for BearerCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print the token itself
        f.write_str("BearerCredential(..)")
    }
}

impl BearerCredential {
    /// Parse an `Authorization` header value. The scheme is matched
    /// case-insensitively.
    pub fn parse(header_value: &str) -> Result<Self, CredentialError> {
        let value = header_value.trim();
        let (scheme, token) = value
            .split_once(char::is_whitespace)
            .ok_or(CredentialError::MissingScheme)?;

        if !scheme.eq_ignore_ascii_case("bearer") {
            return Err(CredentialError::MissingScheme);
        }

        let token = token.trim();
        if token.is_empty() {
            return Err(CredentialError::EmptyToken);
        }

        Ok(Self(token.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Decode the claim set without verifying anything.
    pub fn decode(self) -> Result<Token, CredentialError> {
        let mut parts = self.0.split('.');
        let (Some(_header), Some(payload), Some(_signature), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(CredentialError::NotCompactJws);
        };

        let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('='))?;
        let raw: RawClaims = serde_json::from_slice(&bytes)?;

        let issued_at = timestamp(raw.iat.ok_or(CredentialError::MissingClaim("iat"))?, "iat")?;
        let expiration = raw.exp.map(|exp| timestamp(exp, "exp")).transpose()?;

        let claims = ClaimsSet {
            issued_at,
            expiration,
            scopes: raw.scope.map(|s| s.into_vec()).unwrap_or_default(),
            subject: raw.sub,
            issuer: raw.iss,
        };

        Ok(Token {
            raw: self.0,
            claims,
        })
    }
}

fn timestamp(date: NumericDate, claim: &'static str) -> Result<DateTime<Utc>, CredentialError> {
    date.whole_seconds()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .ok_or(CredentialError::TimestampOutOfRange(claim))
}

/// A structurally decoded, not yet trusted, token.
#[derive(Clone)]
pub struct Token {
    raw: String,
    claims: ClaimsSet,
}

impl std::fmt::Debug for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Token")
            .field("claims", &self.claims)
            .finish_non_exhaustive()
    }
}

impl Token {
    /// Compact serialization, as needed by signature verification.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn claims(&self) -> &ClaimsSet {
        &self.claims
    }

    #[cfg(test)]
    pub fn from_claims(claims: ClaimsSet) -> Self {
        Self {
            raw: String::new(),
            claims,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compact(payload: &str) -> String {
        format!(
            "{}.{}.sig",
            URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#),
            URL_SAFE_NO_PAD.encode(payload)
        )
    }

    #[test]
    fn parse_accepts_case_insensitive_scheme() {
        let cred = BearerCredential::parse("bearer abc.def.ghi").unwrap();
        assert_eq!(cred.as_str(), "abc.def.ghi");

        let cred = BearerCredential::parse("  BEARER   abc.def.ghi ").unwrap();
        assert_eq!(cred.as_str(), "abc.def.ghi");
    }

    #[test]
    fn parse_rejects_missing_scheme_and_empty_token() {
        assert!(matches!(
            BearerCredential::parse("abc.def.ghi"),
            Err(CredentialError::MissingScheme)
        ));
        assert!(matches!(
            BearerCredential::parse("Basic dXNlcjpwdw=="),
            Err(CredentialError::MissingScheme)
        ));
        assert!(matches!(
            BearerCredential::parse("Bearer    "),
            Err(CredentialError::MissingScheme | CredentialError::EmptyToken)
        ));
    }

    #[test]
    fn decode_lifts_claims() {
        let token = compact(
            r#"{"iss":"https://issuer","sub":"client-1","iat":1700000000,"exp":1700003600,"scope":["t.assetRead"]}"#,
        );
        let token = BearerCredential::parse(&format!("Bearer {token}"))
            .unwrap()
            .decode()
            .unwrap();

        let claims = token.claims();
        assert_eq!(claims.issued_at.timestamp(), 1_700_000_000);
        assert_eq!(claims.expiration.map(|e| e.timestamp()), Some(1_700_003_600));
        assert_eq!(claims.scopes, vec!["t.assetRead"]);
        assert_eq!(claims.subject.as_deref(), Some("client-1"));
        assert_eq!(claims.issuer.as_deref(), Some("https://issuer"));
    }

    #[test]
    fn decode_accepts_fractional_timestamps() {
        let token = BearerCredential::parse(&format!(
            "Bearer {}",
            compact(r#"{"iat":1700000000.5,"exp":1700003600.999}"#)
        ))
        .unwrap()
        .decode()
        .unwrap();

        assert_eq!(token.claims().issued_at.timestamp(), 1_700_000_000);
        assert_eq!(
            token.claims().expiration.map(|e| e.timestamp()),
            Some(1_700_003_600)
        );
    }

    #[test]
    fn decode_rejects_unrepresentable_timestamps() {
        for payload in [
            format!(r#"{{"iat":0,"exp":{}}}"#, i64::MAX),
            r#"{"iat":0,"exp":1e300}"#.to_string(),
            format!(r#"{{"iat":{},"exp":0}}"#, i64::MIN),
            r#"{"iat":0,"exp":18446744073709551615}"#.to_string(),
        ] {
            let cred = BearerCredential::parse(&format!("Bearer {}", compact(&payload))).unwrap();
            assert!(
                matches!(cred.decode(), Err(CredentialError::TimestampOutOfRange(_))),
                "{payload}"
            );
        }
    }

    #[test]
    fn decode_rejects_structurally_invalid_tokens() {
        let not_jws = BearerCredential::parse("Bearer not-a-jwt").unwrap();
        assert!(matches!(not_jws.decode(), Err(CredentialError::NotCompactJws)));

        let bad_payload = BearerCredential::parse("Bearer a.%%%.c").unwrap();
        assert!(matches!(bad_payload.decode(), Err(CredentialError::Payload(_))));

        let bad_json = BearerCredential::parse(&format!("Bearer {}", compact("[1,2"))).unwrap();
        assert!(matches!(bad_json.decode(), Err(CredentialError::Claims(_))));

        let no_iat =
            BearerCredential::parse(&format!("Bearer {}", compact(r#"{"exp":1}"#))).unwrap();
        assert!(matches!(
            no_iat.decode(),
            Err(CredentialError::MissingClaim("iat"))
        ));
    }
}
