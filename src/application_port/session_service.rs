use crate::application_port::{SignError, VerifyError};
use crate::domain_model::{Claims, RefreshToken, Renewed, TokenPair};
use crate::domain_port::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum LoginError {
    #[error(transparent)]
    Sign(#[from] SignError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, thiserror::Error)]
pub enum RenewError {
    #[error("refresh token missing")]
    MissingToken,
    #[error("refresh token is not registered")]
    NotRegistered,
    #[error("refresh token verification failed: {0}")]
    VerificationFailed(#[from] VerifyError),
    #[error(transparent)]
    Sign(#[from] SignError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[async_trait::async_trait]
pub trait SessionService: Send + Sync {
    /// Issue an access/refresh pair for already-authenticated claims.
    async fn login(&self, claims: Claims) -> Result<TokenPair, LoginError>;

    /// Mint a fresh access token from a registered refresh token.
    async fn renew(&self, refresh_token: Option<&RefreshToken>) -> Result<Renewed, RenewError>;

    /// Revoke a refresh token. Idempotent.
    async fn logout(&self, refresh_token: &RefreshToken) -> Result<(), StoreError>;
}
