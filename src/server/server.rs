use crate::application_impl::*;
use crate::application_port::*;
use crate::domain_port::*;
use crate::infra_memory::*;
use crate::infra_redis::*;
use crate::logger::*;
use crate::settings::Settings;
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Wired services shared by every request handler.
pub struct Server {
    pub session_service: Arc<dyn SessionService>,
    pub auth_guard: Arc<dyn AuthGuard>,
    pub post_service: Arc<dyn PostService>,
    sweeper_handle: Mutex<Option<JoinHandle<()>>>,
    cancel: CancellationToken,
}

impl Server {
    pub async fn try_new(settings: &Settings) -> anyhow::Result<Self> {
        settings.validate()?;

        let cancel = CancellationToken::new();
        let mut sweeper_handle = None;

        let revocation_store: Arc<dyn RevocationStore> = match settings.store.backend.as_str() {
            "memory" => {
                let store = Arc::new(MemoryRevocationStore::new());
                // redis expires keys on its own; the memory set needs a sweeper
                sweeper_handle = Some(tokio::spawn(
                    store
                        .clone()
                        .run_sweeper(settings.store.sweep_interval(), cancel.clone()),
                ));
                store
            }
            "redis" => {
                let url = settings
                    .store
                    .redis_url
                    .as_deref()
                    .ok_or_else(|| anyhow::anyhow!("store.redis_url is required"))?;
                let redis_client = redis::Client::open(url)?;
                let redis_manager = redis_client.get_connection_manager().await?;
                Arc::new(RedisRevocationStore::new(
                    redis_manager,
                    settings.store.prefix.clone(),
                ))
            }
            other => return Err(anyhow::anyhow!("Unknown store backend: {}", other)),
        };

        let session_config = SessionConfig {
            access_secret: settings.auth.access_secret.clone(),
            refresh_secret: settings.auth.refresh_secret.clone(),
            access_ttl: settings.auth.access_ttl(),
            refresh_ttl: settings.auth.refresh_ttl(),
            rotate_refresh_tokens: settings.auth.rotate_refresh_tokens,
        };

        let mut server = Self::with_store(session_config, revocation_store);
        server.cancel = cancel;
        server.sweeper_handle = Mutex::new(sweeper_handle);
        info!(backend = %settings.store.backend, "server started");
        Ok(server)
    }

    /// Builds the service graph around an already-constructed store. No
    /// background tasks are started.
    pub fn with_store(
        session_config: SessionConfig,
        revocation_store: Arc<dyn RevocationStore>,
    ) -> Self {
        let token_codec: Arc<dyn TokenCodec> = Arc::new(JwtHs256Codec::new());

        let auth_guard: Arc<dyn AuthGuard> = Arc::new(BearerAuthGuard::new(
            token_codec.clone(),
            session_config.access_secret.clone(),
        ));

        let session_service: Arc<dyn SessionService> = Arc::new(RealSessionService::new(
            token_codec,
            revocation_store,
            session_config,
        ));

        let post_service: Arc<dyn PostService> =
            Arc::new(InMemoryPostService::with_sample_posts());

        Self {
            session_service,
            auth_guard,
            post_service,
            sweeper_handle: Mutex::new(None),
            cancel: CancellationToken::new(),
        }
    }

    pub async fn shutdown(&self) {
        info!("server shutting down...");

        self.cancel.cancel();

        let handle = match self.sweeper_handle.lock() {
            Ok(mut lock) => lock.take(),
            Err(_) => None,
        };
        if let Some(handle) = handle {
            let r = handle.await;
            info!("sweeper handle dropped: {:?}", r);
        }
    }
}
