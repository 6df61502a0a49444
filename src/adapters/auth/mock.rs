//! Mock token verifier for tests.

use async_trait::async_trait;

use crate::domain::foundation::{AuthError, AuthenticatedUser, UserId};
use crate::ports::TokenVerifier;

/// Accepts tokens of the form `user:<id>` and rejects everything else.
#[derive(Debug, Clone, Default)]
pub struct MockTokenVerifier;

impl MockTokenVerifier {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl TokenVerifier for MockTokenVerifier {
    async fn verify(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        match token.strip_prefix("user:") {
            Some(id) => {
                let id = UserId::new(id).map_err(|_| AuthError::InvalidToken)?;
                Ok(AuthenticatedUser::new(id, None))
            }
            None => Err(AuthError::InvalidToken),
        }
    }
}
