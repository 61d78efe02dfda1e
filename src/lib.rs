pub(crate) mod core;
pub(crate) mod routes;
pub(crate) mod snapshot;
pub(crate) mod token;
pub(crate) mod types;
pub(crate) mod utils;

#[cfg(test)]
pub(crate) mod test_support;

use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::core::client::Client;
use crate::core::error::ConfigError as Error;
use crate::core::{config::Args, state::AppState};
use crate::token::clock::SystemClock;
use crate::token::manager::{OAuthSettings, TokenManager};
use crate::token::store::{CredentialStore, MemoryStore, PgStore};
use crate::utils::cookies::CookiePolicy;

pub async fn run() -> Result<(), Error> {
    let config = Args::load()?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_new(&config.log_level).unwrap_or_default())
        .with(tracing_subscriber::fmt::layer())
        .init();

    for var in config.missing_credentials() {
        tracing::warn!("{} is not set, authorization will fail", var);
    }

    let store: Arc<dyn CredentialStore> = match &config.database_url {
        Some(database_url) => {
            let store = PgStore::connect(database_url).await?;
            store.migrate().await?;

            tracing::info!("persisting owner credentials in postgres");
            Arc::new(store)
        }
        None => {
            tracing::info!("keeping owner credentials in memory");
            Arc::new(MemoryStore::default())
        }
    };

    let client = Client::new(
        &config.accounts_url,
        &config.api_url,
        Duration::from_secs(config.http_timeout),
    )?;

    let manager = TokenManager::new(
        client,
        OAuthSettings {
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            redirect_uri: config.redirect_uri(),
        },
        store,
        Arc::new(SystemClock),
    );

    let state = AppState::new(
        manager,
        CookiePolicy::new(config.production),
        config.home(),
        config.admin_key.clone(),
    );

    let app = routes::router::routes(state, config.rate_limit);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port))
        .await
        .map_err(Error::IO)?;

    tracing::debug!("listening on port {}", config.port);

    axum::serve(listener, app).await.map_err(Error::IO)?;

    Ok(())
}
