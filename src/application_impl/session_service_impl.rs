use crate::application_port::{
    LoginError, RenewError, SessionService, SignError, SignOptions, TokenCodec,
};
use crate::domain_model::{AccessToken, Claims, RefreshToken, Renewed, SecretKey, TokenPair};
use crate::domain_port::{RevocationStore, StoreError};
use chrono::{DateTime, TimeDelta, Utc};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub access_secret: SecretKey,
    pub refresh_secret: SecretKey,
    pub access_ttl: Duration,
    /// `None` issues refresh tokens that never expire.
    pub refresh_ttl: Option<Duration>,
    pub rotate_refresh_tokens: bool,
}

pub struct RealSessionService {
    token_codec: Arc<dyn TokenCodec>,
    revocation_store: Arc<dyn RevocationStore>,
    cfg: SessionConfig,
}

impl RealSessionService {
    pub fn new(
        token_codec: Arc<dyn TokenCodec>,
        revocation_store: Arc<dyn RevocationStore>,
        cfg: SessionConfig,
    ) -> Self {
        Self {
            token_codec,
            revocation_store,
            cfg,
        }
    }

    #[inline]
    fn new_jti() -> String {
        Uuid::new_v4().to_string()
    }

    fn issue_access(&self, claims: &Claims) -> Result<AccessToken, SignError> {
        let options = SignOptions::expiring_in(self.cfg.access_ttl);
        let token = self
            .token_codec
            .sign(claims, &self.cfg.access_secret, &options)?;
        Ok(AccessToken(token))
    }

    /// Signs a refresh token and returns it with the instant its store entry
    /// should lapse.
    fn issue_refresh(
        &self,
        claims: &Claims,
    ) -> Result<(RefreshToken, Option<DateTime<Utc>>), SignError> {
        let issued_at = Utc::now();
        let options = SignOptions {
            expires_in: self.cfg.refresh_ttl,
            token_id: Some(Self::new_jti()),
        };
        let token = self
            .token_codec
            .sign_at(claims, &self.cfg.refresh_secret, &options, issued_at)?;
        let expires_at = match self.cfg.refresh_ttl {
            Some(ttl) => {
                let ttl = TimeDelta::from_std(ttl).map_err(|e| SignError(e.to_string()))?;
                issued_at.checked_add_signed(ttl)
            }
            None => None,
        };
        Ok((RefreshToken(token), expires_at))
    }

    /// Replaces `current` with a fresh refresh token. The successor is stored
    /// before `current` is consumed, and only one concurrent caller can
    /// consume it.
    async fn rotate(
        &self,
        current: &RefreshToken,
        claims: &Claims,
    ) -> Result<RefreshToken, RenewError> {
        let (next, expires_at) = self.issue_refresh(claims)?;
        self.revocation_store.register(&next, expires_at).await?;

        let consumed = match self.revocation_store.take(current).await {
            Ok(consumed) => consumed,
            Err(e) => {
                let _ = self.revocation_store.revoke(&next).await;
                return Err(e.into());
            }
        };
        if !consumed {
            self.revocation_store.revoke(&next).await?;
            debug!(username = %claims.username, "refresh token already consumed");
            return Err(RenewError::NotRegistered);
        }

        debug!(username = %claims.username, "refresh token rotated");
        Ok(next)
    }
}

#[async_trait::async_trait]
impl SessionService for RealSessionService {
    async fn login(&self, claims: Claims) -> Result<TokenPair, LoginError> {
        let access_token = self.issue_access(&claims)?;
        let (refresh_token, expires_at) = self.issue_refresh(&claims)?;

        self.revocation_store
            .register(&refresh_token, expires_at)
            .await?;
        info!(username = %claims.username, "session issued");

        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }

    async fn renew(&self, refresh_token: Option<&RefreshToken>) -> Result<Renewed, RenewError> {
        let refresh_token = refresh_token
            .filter(|t| !t.as_str().is_empty())
            .ok_or(RenewError::MissingToken)?;

        // Unregistered tokens are rejected before any cryptographic work.
        if !self.revocation_store.is_active(refresh_token).await? {
            debug!("renewal with unregistered refresh token");
            return Err(RenewError::NotRegistered);
        }

        let claims = self
            .token_codec
            .verify(refresh_token.as_str(), &self.cfg.refresh_secret)
            .inspect_err(|e| debug!(reason = %e, "refresh token rejected"))?;

        let rotated = if self.cfg.rotate_refresh_tokens {
            Some(self.rotate(refresh_token, &claims).await?)
        } else {
            None
        };

        let access_token = self.issue_access(&claims)?;

        info!(username = %claims.username, "access token renewed");
        Ok(Renewed {
            access_token,
            refresh_token: rotated,
        })
    }

    async fn logout(&self, refresh_token: &RefreshToken) -> Result<(), StoreError> {
        self.revocation_store.revoke(refresh_token).await?;
        debug!("refresh token revoked");
        Ok(())
    }
}
