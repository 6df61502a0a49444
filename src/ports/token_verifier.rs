//! Token verifier port.
//!
//! Abstracts the identity provider: given a bearer token, yield the stable
//! user identity. The provider itself (issuer, signing keys, claims layout)
//! lives behind an adapter.

use async_trait::async_trait;

use crate::domain::foundation::{AuthError, AuthenticatedUser};

/// Port for bearer-token validation.
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    /// Validates a token and returns the authenticated user.
    async fn verify(&self, token: &str) -> Result<AuthenticatedUser, AuthError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_verifier_is_object_safe() {
        fn _accepts_dyn(_verifier: &dyn TokenVerifier) {}
    }
}
