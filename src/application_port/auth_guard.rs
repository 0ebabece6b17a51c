use crate::domain_model::Claims;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum GuardError {
    #[error("no bearer token supplied")]
    NoToken,
    /// Covers expired, tampered and malformed tokens alike.
    #[error("token is not valid")]
    InvalidToken,
}

/// Authenticates a request from its `Authorization` header value.
pub trait AuthGuard: Send + Sync {
    fn authenticate(&self, authorization: Option<&str>) -> Result<Claims, GuardError>;
}
