//! Token minting helpers shared by unit and router tests.

use std::{sync::Arc, time::Duration};

use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde_json::{Value, json};

use crate::services::auth::clock::SystemClock;
use crate::services::auth::factory::{AuthSettings, build_access_guard};
use crate::services::auth::guard::AccessGuard;
use crate::services::auth::rules::{JwtSignatureRule, ValidationChain, VerificationKey};
use crate::services::auth::TokenAuthenticator;

pub const ISSUER: &str = "https://issuer.test";
pub const SECRET: &str = "test-secret-with-enough-entropy-0123456789";

pub fn mint(claims: Value) -> String {
    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap()
}

/// Compact JWS with a well-formed payload and a garbage signature.
pub fn unsigned_bearer(claims: Value) -> String {
    use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};

    format!(
        "Bearer {}.{}.c2ln",
        URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#),
        URL_SAFE_NO_PAD.encode(claims.to_string())
    )
}

pub fn bearer(claims: Value) -> String {
    format!("Bearer {}", mint(claims))
}

/// Claims valid for the next hour.
pub fn valid_claims(scopes: &[&str]) -> Value {
    let now = chrono::Utc::now().timestamp();
    json!({
        "iss": ISSUER,
        "sub": "client-1",
        "iat": now - 10,
        "exp": now + 3600,
        "scope": scopes,
    })
}

pub fn settings() -> AuthSettings {
    AuthSettings {
        issuer: ISSUER.to_string(),
        audience: None,
        key: VerificationKey::HmacSecret(SECRET.to_string()),
        leeway: chrono::Duration::zero(),
        rule_timeout: Duration::from_secs(1),
    }
}

pub fn authenticator() -> TokenAuthenticator {
    authenticator_with_leeway(chrono::Duration::zero())
}

pub fn authenticator_with_leeway(leeway: chrono::Duration) -> TokenAuthenticator {
    let chain = ValidationChain::with_time_rules(
        Arc::new(SystemClock),
        leeway,
        Duration::from_secs(1),
    )
    .with_rule(
        JwtSignatureRule::new(&VerificationKey::HmacSecret(SECRET.to_string()), ISSUER, None)
            .unwrap(),
    );
    TokenAuthenticator::new(chain)
}

pub fn guard() -> AccessGuard {
    build_access_guard(&settings(), Arc::new(SystemClock)).unwrap()
}
