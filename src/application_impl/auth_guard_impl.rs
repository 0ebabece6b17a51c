use crate::application_port::{AuthGuard, GuardError, TokenCodec};
use crate::domain_model::{Claims, SecretKey};
use std::sync::Arc;
use tracing::debug;

const BEARER_PREFIX: &str = "Bearer ";

/// Returns the token part of a `Bearer <token>` header value.
pub fn extract_bearer(header: &str) -> Option<&str> {
    header
        .trim()
        .strip_prefix(BEARER_PREFIX)
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Verifies access tokens purely cryptographically. Never touches the
/// revocation store.
pub struct BearerAuthGuard {
    token_codec: Arc<dyn TokenCodec>,
    access_secret: SecretKey,
}

impl BearerAuthGuard {
    pub fn new(token_codec: Arc<dyn TokenCodec>, access_secret: SecretKey) -> Self {
        Self {
            token_codec,
            access_secret,
        }
    }
}

impl AuthGuard for BearerAuthGuard {
    fn authenticate(&self, authorization: Option<&str>) -> Result<Claims, GuardError> {
        let token = authorization
            .and_then(extract_bearer)
            .ok_or(GuardError::NoToken)?;

        self.token_codec
            .verify(token, &self.access_secret)
            .map_err(|e| {
                debug!(reason = %e, "access token rejected");
                GuardError::InvalidToken
            })
    }
}
