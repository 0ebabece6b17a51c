use crate::domain_model::{Claims, SecretKey};
use chrono::{DateTime, Utc};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum VerifyError {
    #[error("token is malformed")]
    MalformedToken,
    #[error("token signature does not match")]
    BadSignature,
    #[error("token has expired")]
    Expired,
}

#[derive(Debug, thiserror::Error)]
#[error("failed to sign token: {0}")]
pub struct SignError(pub String);

#[derive(Debug, Clone, Default)]
pub struct SignOptions {
    /// `None` produces a token that never expires.
    pub expires_in: Option<Duration>,
    /// Embedded as `jti`, used to tell apart tokens minted for the same claims.
    pub token_id: Option<String>,
}

impl SignOptions {
    pub fn expiring_in(ttl: Duration) -> Self {
        Self {
            expires_in: Some(ttl),
            token_id: None,
        }
    }

    pub fn with_token_id(mut self, token_id: impl Into<String>) -> Self {
        self.token_id = Some(token_id.into());
        self
    }
}

/// Signs claims into tamper-evident tokens and verifies them.
///
/// Both operations are pure and synchronous; implementations hold no mutable
/// state, so one instance can serve every request concurrently.
pub trait TokenCodec: Send + Sync {
    fn sign_at(
        &self,
        claims: &Claims,
        secret: &SecretKey,
        options: &SignOptions,
        issued_at: DateTime<Utc>,
    ) -> Result<String, SignError>;

    fn verify_at(
        &self,
        token: &str,
        secret: &SecretKey,
        now: DateTime<Utc>,
    ) -> Result<Claims, VerifyError>;

    fn sign(
        &self,
        claims: &Claims,
        secret: &SecretKey,
        options: &SignOptions,
    ) -> Result<String, SignError> {
        self.sign_at(claims, secret, options, Utc::now())
    }

    fn verify(&self, token: &str, secret: &SecretKey) -> Result<Claims, VerifyError> {
        self.verify_at(token, secret, Utc::now())
    }
}
