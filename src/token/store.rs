use async_trait::async_trait;
use sqlx::Row;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use tokio::sync::RwLock;

use crate::core::error::{ConfigError, Error};
use crate::token::credential::CredentialPair;

/// Storage for the single owner credential.
#[async_trait]
pub(crate) trait CredentialStore: Send + Sync + std::fmt::Debug {
    async fn load(&self) -> Result<Option<CredentialPair>, Error>;

    async fn save(&self, pair: &CredentialPair) -> Result<(), Error>;
}

#[derive(Debug, Default)]
pub(crate) struct MemoryStore {
    pair: RwLock<Option<CredentialPair>>,
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn load(&self) -> Result<Option<CredentialPair>, Error> {
        Ok(self.pair.read().await.clone())
    }

    async fn save(&self, pair: &CredentialPair) -> Result<(), Error> {
        *self.pair.write().await = Some(pair.clone());

        Ok(())
    }
}

#[derive(Debug, Clone)]
pub(crate) struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub(crate) async fn connect(database_url: &str) -> Result<Self, ConfigError> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }

    pub(crate) async fn migrate(&self) -> Result<(), ConfigError> {
        sqlx::migrate!().run(&self.pool).await?;

        Ok(())
    }
}

#[async_trait]
impl CredentialStore for PgStore {
    async fn load(&self) -> Result<Option<CredentialPair>, Error> {
        let pair = sqlx::query(
            "SELECT access_token, refresh_token, expires_at FROM owner_credentials WHERE id = 1;",
        )
        .map(map_credential_pair)
        .fetch_optional(&self.pool)
        .await?;

        Ok(pair)
    }

    async fn save(&self, pair: &CredentialPair) -> Result<(), Error> {
        sqlx::query(
            "INSERT INTO owner_credentials (id, access_token, refresh_token, expires_at, updated_at)
            VALUES (1, $1, $2, $3, NOW())
            ON CONFLICT (id) DO UPDATE SET
                access_token = EXCLUDED.access_token,
                refresh_token = EXCLUDED.refresh_token,
                expires_at = EXCLUDED.expires_at,
                updated_at = NOW();",
        )
        .bind(&pair.access_token)
        .bind(&pair.refresh_token)
        .bind(pair.expires_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

fn map_credential_pair(row: PgRow) -> CredentialPair {
    CredentialPair {
        access_token: row.get("access_token"),
        refresh_token: row.get("refresh_token"),
        expires_at: row.get("expires_at"),
    }
}
