use crate::domain_model::RefreshToken;
use crate::domain_port::{RevocationStore, StoreError};
use chrono::{DateTime, Utc};
use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use sha2::{Digest, Sha256};

/// Durable revocation store keeping one redis key per active refresh token.
///
/// Keys are `<prefix>:<sha256(token) as hex>` so raw tokens never reach redis.
/// Tokens registered with an expiry get a matching key TTL.
pub struct RedisRevocationStore {
    conn: ConnectionManager,
    prefix: String,
}

impl RedisRevocationStore {
    pub fn new(conn: ConnectionManager, prefix: impl Into<String>) -> Self {
        RedisRevocationStore {
            conn,
            prefix: prefix.into(),
        }
    }

    fn key(&self, token: &RefreshToken) -> String {
        token_key(&self.prefix, token)
    }
}

fn token_key(prefix: &str, token: &RefreshToken) -> String {
    let digest = Sha256::digest(token.as_str().as_bytes());
    format!("{}:{}", prefix, hex::encode(digest))
}

/// Seconds until `until`, never below one so `SET EX` stays valid.
fn ttl_secs(until: DateTime<Utc>, now: DateTime<Utc>) -> u64 {
    let secs = (until - now).num_seconds();
    if secs <= 0 { 1 } else { secs as u64 }
}

#[async_trait::async_trait]
impl RevocationStore for RedisRevocationStore {
    async fn register(
        &self,
        token: &RefreshToken,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<(), StoreError> {
        let key = self.key(token);
        let mut conn = self.conn.clone();
        let result: redis::RedisResult<()> = match expires_at {
            Some(until) => conn.set_ex(&key, "1", ttl_secs(until, Utc::now())).await,
            None => conn.set(&key, "1").await,
        };
        result.map_err(|e| StoreError::Backend(e.to_string()))
    }

    async fn is_active(&self, token: &RefreshToken) -> Result<bool, StoreError> {
        let key = self.key(token);
        let mut conn = self.conn.clone();
        let exists: bool = conn
            .exists(&key)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        Ok(exists)
    }

    async fn revoke(&self, token: &RefreshToken) -> Result<(), StoreError> {
        let key = self.key(token);
        let mut conn = self.conn.clone();
        let _: () = conn
            .del(&key)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        Ok(())
    }

    async fn take(&self, token: &RefreshToken) -> Result<bool, StoreError> {
        let key = self.key(token);
        let mut conn = self.conn.clone();
        // DEL is atomic; only the caller that removed the key sees 1
        let removed: u64 = conn
            .del(&key)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        Ok(removed == 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    #[test]
    fn keys_hide_token_material() {
        let token = RefreshToken("header.payload.signature".to_string());
        let key = token_key("refresh", &token);
        assert!(key.starts_with("refresh:"));
        assert!(!key.contains("payload"));
        assert_eq!(key.len(), "refresh:".len() + 64);
        assert_eq!(key, token_key("refresh", &token));
    }

    #[test]
    fn distinct_tokens_get_distinct_keys() {
        let a = token_key("refresh", &RefreshToken("a.b.c".to_string()));
        let b = token_key("refresh", &RefreshToken("a.b.d".to_string()));
        assert_ne!(a, b);
    }

    #[test]
    fn key_ttl_tracks_token_expiry() {
        let now = Utc::now();
        assert_eq!(ttl_secs(now + TimeDelta::seconds(3600), now), 3600);
        assert_eq!(ttl_secs(now + TimeDelta::milliseconds(400), now), 1);
        assert_eq!(ttl_secs(now - TimeDelta::seconds(30), now), 1);
    }
}
