use crate::domain_model::RefreshToken;
use chrono::{DateTime, Utc};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store backend error: {0}")]
    Backend(String),
}

/// The set of refresh tokens that are currently allowed to renew.
///
/// Implementations must be linearizable per token: once `revoke` or `take`
/// returns, every `is_active` that starts afterwards observes the token as
/// absent.
#[async_trait::async_trait]
pub trait RevocationStore: Send + Sync {
    /// Mark a refresh token as active until `expires_at` (forever when
    /// `None`). Registering twice is a no-op apart from refreshing the expiry.
    async fn register(
        &self,
        token: &RefreshToken,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<(), StoreError>;

    async fn is_active(&self, token: &RefreshToken) -> Result<bool, StoreError>;

    /// Remove a refresh token. Unknown tokens are ignored.
    async fn revoke(&self, token: &RefreshToken) -> Result<(), StoreError>;

    /// Atomically remove a token, returning whether it was still active.
    /// Of several concurrent callers at most one gets `true`.
    async fn take(&self, token: &RefreshToken) -> Result<bool, StoreError>;
}
