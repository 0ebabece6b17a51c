use crate::domain_model::RefreshToken;
use crate::domain_port::{RevocationStore, StoreError};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

#[inline]
fn is_live(expires_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    expires_at.is_none_or(|exp| now <= exp)
}

/// Process-local revocation store. Sessions do not survive a restart.
///
/// Expired entries read as absent straight away; `purge_expired` reclaims
/// their memory.
#[derive(Debug, Default)]
pub struct MemoryRevocationStore {
    active: DashMap<String, Option<DateTime<Utc>>>,
}

impl MemoryRevocationStore {
    pub fn new() -> Self {
        Self {
            active: DashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// Drops every entry that expired before `now`. Returns how many went.
    pub fn purge_expired(&self, now: DateTime<Utc>) -> usize {
        let mut purged = 0;
        self.active.retain(|_, expires_at| {
            let keep = is_live(*expires_at, now);
            if !keep {
                purged += 1;
            }
            keep
        });
        purged
    }

    /// Periodically purges expired entries until `cancel` fires.
    pub async fn run_sweeper(self: Arc<Self>, every: Duration, cancel: CancellationToken) {
        let mut interval = tokio::time::interval(every);
        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    info!("revocation sweeper shutting down...");
                    break;
                }
                _ = interval.tick() => {
                    let purged = self.purge_expired(Utc::now());
                    if purged > 0 {
                        debug!(purged, "expired refresh tokens purged");
                    }
                }
            }
        }
    }
}

#[async_trait::async_trait]
impl RevocationStore for MemoryRevocationStore {
    async fn register(
        &self,
        token: &RefreshToken,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<(), StoreError> {
        self.active.insert(token.0.clone(), expires_at);
        Ok(())
    }

    async fn is_active(&self, token: &RefreshToken) -> Result<bool, StoreError> {
        let now = Utc::now();
        // the read guard must be released before remove_if touches the shard
        let expires_at = self.active.get(token.as_str()).map(|entry| *entry.value());
        match expires_at {
            None => Ok(false),
            Some(exp) if is_live(exp, now) => Ok(true),
            Some(_) => {
                self.active
                    .remove_if(token.as_str(), |_, exp| !is_live(*exp, now));
                Ok(false)
            }
        }
    }

    async fn revoke(&self, token: &RefreshToken) -> Result<(), StoreError> {
        self.active.remove(token.as_str());
        Ok(())
    }

    async fn take(&self, token: &RefreshToken) -> Result<bool, StoreError> {
        let removed = self.active.remove(token.as_str());
        Ok(matches!(removed, Some((_, exp)) if is_live(exp, Utc::now())))
    }
}
