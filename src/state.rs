use std::sync::Arc;

use sqlx::PgPool;

use crate::auth::jwt::JwtKeys;
use crate::auth::repo::{MemoryUserStore, PgUserStore, UserStore};
use crate::config::{AppConfig, StorageBackend};
use crate::db;
use crate::tasks::repo::{MemoryTaskStore, PgTaskStore, TaskStore};

/// Handles shared by every request. Built once at startup.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserStore>,
    pub tasks: Arc<dyn TaskStore>,
    pub jwt: JwtKeys,
    pub config: Arc<AppConfig>,
    /// Present for the postgres backend; closed by [`AppState::shutdown`].
    pub db: Option<PgPool>,
}

impl AppState {
    pub async fn init(config: AppConfig) -> anyhow::Result<Self> {
        let config = Arc::new(config);
        match &config.storage {
            StorageBackend::Postgres(db_cfg) => {
                let pool = db::connect(db_cfg).await?;
                db::migrate(&pool).await?;
                Ok(Self::from_parts(
                    Arc::new(PgUserStore::new(pool.clone())),
                    Arc::new(PgTaskStore::new(pool.clone())),
                    config,
                    Some(pool),
                ))
            }
            StorageBackend::Memory => {
                tracing::warn!("using in-memory storage; data will not survive a restart");
                Ok(Self::in_memory(config))
            }
        }
    }

    pub fn in_memory(config: Arc<AppConfig>) -> Self {
        Self::from_parts(
            Arc::new(MemoryUserStore::default()),
            Arc::new(MemoryTaskStore::default()),
            config,
            None,
        )
    }

    pub fn from_parts(
        users: Arc<dyn UserStore>,
        tasks: Arc<dyn TaskStore>,
        config: Arc<AppConfig>,
        db: Option<PgPool>,
    ) -> Self {
        Self {
            users,
            tasks,
            jwt: JwtKeys::new(&config.jwt),
            config,
            db,
        }
    }

    pub async fn shutdown(&self) {
        if let Some(pool) = &self.db {
            tracing::info!("closing database pool");
            pool.close().await;
        }
    }

    #[cfg(test)]
    pub fn fake() -> Self {
        use crate::config::{JwtConfig, ResetConfig, ServerConfig};

        let config = Arc::new(AppConfig {
            storage: StorageBackend::Memory,
            jwt: JwtConfig {
                secret: "test".into(),
                issuer: "test-issuer".into(),
                audience: "test-aud".into(),
                ttl_minutes: 60,
            },
            server: ServerConfig {
                host: "127.0.0.1".into(),
                port: 0,
            },
            reset: ResetConfig {
                scheme: "http".into(),
                link_base: None,
            },
        });
        Self::in_memory(config)
    }
}
