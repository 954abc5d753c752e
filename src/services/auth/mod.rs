pub mod authenticator;
pub mod claims;
pub mod clock;
pub mod credential;
pub mod decision;
pub mod factory;
pub mod guard;
pub mod policy;
pub mod principal;
pub mod rules;

#[cfg(test)]
pub mod test_support;

pub use authenticator::{AuthnError, TokenAuthenticator};
pub use factory::{AuthSettings, build_access_guard};
pub use guard::{AccessGuard, GuardOutcome};
pub use principal::Principal;
