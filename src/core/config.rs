use config::{Config, Environment, File};
use serde::Deserialize;

use crate::core::error::ConfigError;

#[derive(Debug, Deserialize, Clone)]
pub(crate) struct Args {
    pub(crate) log_level: String,
    pub(crate) port: u16,
    pub(crate) base_url: String,
    pub(crate) production: bool,
    pub(crate) client_id: Option<String>,
    pub(crate) client_secret: Option<String>,
    pub(crate) redirect_uri: Option<String>,
    pub(crate) accounts_url: String,
    pub(crate) api_url: String,
    /// seconds
    pub(crate) http_timeout: u64,
    pub(crate) rate_limit: u64,
    pub(crate) database_url: Option<String>,
    pub(crate) admin_key: Option<String>,
}

impl Args {
    pub(crate) fn load() -> Result<Self, ConfigError> {
        let config = Config::builder()
            .set_default("log_level", "info")?
            .set_default("port", 3000)?
            .set_default("base_url", "http://localhost:3000")?
            .set_default("production", false)?
            .set_default("accounts_url", "https://accounts.spotify.com")?
            .set_default("api_url", "https://api.spotify.com")?
            .set_default("http_timeout", 8)?
            .set_default("rate_limit", 20)?
            .add_source(File::with_name("showcase").required(false))
            .add_source(Environment::with_prefix("SHOWCASE"))
            .build()?;

        Ok(config.try_deserialize::<Args>()?)
    }

    /// Explicit redirect URI if one is configured, otherwise the callback route on `base_url`.
    pub(crate) fn redirect_uri(&self) -> String {
        match self.redirect_uri.as_deref().map(str::trim) {
            Some(uri) if !uri.is_empty() => uri.to_string(),
            _ => format!("{}/auth/callback", self.base_url.trim_end_matches('/')),
        }
    }

    pub(crate) fn home(&self) -> String {
        match self.base_url.trim() {
            "" => "/".to_string(),
            base => base.to_string(),
        }
    }

    pub(crate) fn missing_credentials(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();

        if self.client_id.as_deref().is_none_or(str::is_empty) {
            missing.push("SHOWCASE_CLIENT_ID");
        }

        if self.client_secret.as_deref().is_none_or(str::is_empty) {
            missing.push("SHOWCASE_CLIENT_SECRET");
        }

        missing
    }
}
