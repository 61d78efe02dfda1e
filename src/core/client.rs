use std::time::Duration;

use reqwest::StatusCode;
use serde_json::Value;
use tracing::instrument;

use crate::core::error::{ConfigError, Error};
use crate::token::oauth::AuthorizeParams;
use crate::types::spotify::{NowPlaying, Paging, TokenResponse};

pub(crate) enum Grant<'a> {
    AuthorizationCode {
        code: &'a str,
        redirect_uri: &'a str,
    },
    RefreshToken {
        refresh_token: &'a str,
    },
}

#[derive(Clone)]
pub(crate) struct Client {
    client: reqwest::Client,
    accounts_url: String,
    api_url: String,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("accounts_url", &self.accounts_url)
            .field("api_url", &self.api_url)
            .finish()
    }
}

impl Client {
    pub(crate) fn new(
        accounts_url: &str,
        api_url: &str,
        timeout: Duration,
    ) -> Result<Self, ConfigError> {
        let client = reqwest::ClientBuilder::new()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            accounts_url: accounts_url.trim_end_matches('/').to_string(),
            api_url: api_url.trim_end_matches('/').to_string(),
        })
    }

    pub(crate) fn authorize_url(&self, params: &AuthorizeParams) -> Result<String, Error> {
        Ok(format!(
            "{}/authorize?{}",
            self.accounts_url,
            serde_urlencoded::to_string(params)?
        ))
    }

    #[instrument(skip_all)]
    pub(crate) async fn request_token(
        &self,
        grant: Grant<'_>,
        client_id: &str,
        client_secret: &str,
    ) -> Result<TokenResponse, Error> {
        let mut form = match grant {
            Grant::AuthorizationCode { code, redirect_uri } => vec![
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", redirect_uri),
            ],
            Grant::RefreshToken { refresh_token } => vec![
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
            ],
        };

        form.push(("client_id", client_id));
        form.push(("client_secret", client_secret));

        let resp = self
            .client
            .post(format!("{}/api/token", self.accounts_url))
            .form(&form)
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;

        tracing::debug!(status = status.as_u16(), "token endpoint responded");

        if !status.is_success() {
            let details = serde_json::from_str(&body).unwrap_or(Value::String(body));

            return Err(Error::UpstreamAuth {
                status: status.as_u16(),
                details,
            });
        }

        Ok(serde_json::from_str(&body)?)
    }

    async fn get(&self, path: &str, access_token: &str) -> Result<reqwest::Response, Error> {
        let resp = self
            .client
            .get(format!("{}{}", self.api_url, path))
            .bearer_auth(access_token)
            .send()
            .await?;

        match resp.status() {
            StatusCode::UNAUTHORIZED => Err(Error::TokenRejected),
            status if status.is_success() => Ok(resp),
            status => Err(Error::UpstreamStatus {
                status: status.as_u16(),
                details: resp.text().await.unwrap_or_default(),
            }),
        }
    }

    #[instrument(skip_all)]
    pub(crate) async fn profile(&self, access_token: &str) -> Result<Value, Error> {
        Ok(self.get("/v1/me", access_token).await?.json().await?)
    }

    #[instrument(skip_all)]
    pub(crate) async fn now_playing(&self, access_token: &str) -> Result<NowPlaying, Error> {
        let resp = self
            .get("/v1/me/player/currently-playing", access_token)
            .await?;

        // 204 means the player is idle
        if resp.status() != StatusCode::OK {
            return Ok(NowPlaying::Nothing);
        }

        Ok(NowPlaying::Playing(resp.json().await?))
    }

    #[instrument(skip(self, access_token))]
    pub(crate) async fn top(
        &self,
        kind: &str,
        limit: u8,
        access_token: &str,
    ) -> Result<Vec<Value>, Error> {
        let paging: Paging = self
            .get(&format!("/v1/me/top/{kind}?limit={limit}"), access_token)
            .await?
            .json()
            .await?;

        Ok(paging.items)
    }
}
