use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::instrument;

use crate::core::client::{Client, Grant};
use crate::core::error::Error;
use crate::token::clock::Clock;
use crate::token::credential::CredentialPair;
use crate::token::oauth::{self, AuthorizeParams, Authorization, SCOPES};
use crate::token::store::CredentialStore;

#[derive(Debug, Clone)]
pub(crate) struct OAuthSettings {
    pub(crate) client_id: Option<String>,
    pub(crate) client_secret: Option<String>,
    pub(crate) redirect_uri: String,
}

/// Hands out a valid access token for the owner, refreshing it when needed.
///
/// Every write to the credential store happens while `refresh_lock` is held,
/// so concurrent callers that find an expired token wait for a single
/// provider refresh and then read its result. `refresh_attempts` counts
/// finished refresh attempts; a caller that sees it move while queued on
/// the lock takes the outcome of that attempt instead of starting another.
#[derive(Debug)]
pub(crate) struct TokenManager {
    client: Client,
    settings: OAuthSettings,
    store: Arc<dyn CredentialStore>,
    clock: Arc<dyn Clock>,
    refresh_lock: Mutex<()>,
    refresh_attempts: AtomicU64,
}

impl TokenManager {
    pub(crate) fn new(
        client: Client,
        settings: OAuthSettings,
        store: Arc<dyn CredentialStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            client,
            settings,
            store,
            clock,
            refresh_lock: Mutex::new(()),
            refresh_attempts: AtomicU64::new(0),
        }
    }

    pub(crate) fn client(&self) -> &Client {
        &self.client
    }

    pub(crate) fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub(crate) fn redirect_uri(&self) -> &str {
        &self.settings.redirect_uri
    }

    fn client_id(&self) -> Result<&str, Error> {
        self.settings
            .client_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .ok_or(Error::Configuration("client id"))
    }

    fn client_secret(&self) -> Result<&str, Error> {
        self.settings
            .client_secret
            .as_deref()
            .filter(|secret| !secret.is_empty())
            .ok_or(Error::Configuration("client secret"))
    }

    pub(crate) fn authorize(&self) -> Result<Authorization, Error> {
        let params = AuthorizeParams::new(
            self.client_id()?,
            &self.settings.redirect_uri,
            &SCOPES,
            oauth::generate_state(),
        );

        Ok(Authorization {
            url: self.client.authorize_url(&params)?,
            state: params.state.clone(),
            params,
        })
    }

    /// Codes are single use, so a rejected exchange is returned as is.
    #[instrument(skip_all)]
    pub(crate) async fn exchange_code(&self, code: &str) -> Result<CredentialPair, Error> {
        let issued_at = self.clock.now();

        let response = self
            .client
            .request_token(
                Grant::AuthorizationCode {
                    code,
                    redirect_uri: &self.settings.redirect_uri,
                },
                self.client_id()?,
                self.client_secret()?,
            )
            .await?;

        let pair = CredentialPair::issued(response, issued_at);

        self.seed(pair.clone()).await?;

        tracing::info!(
            refresh_token = pair.refresh_token.is_some(),
            "authorization code exchanged"
        );

        Ok(pair)
    }

    pub(crate) async fn seed(&self, pair: CredentialPair) -> Result<(), Error> {
        let _guard = self.refresh_lock.lock().await;

        self.store.save(&pair).await
    }

    /// `Ok(None)` means no token can be obtained right now: nobody has
    /// authorized yet, or the provider refused the refresh.
    pub(crate) async fn get_valid_access_token(&self) -> Result<Option<String>, Error> {
        let attempts = self.refresh_attempts.load(Ordering::Acquire);

        if let Some(pair) = self.store.load().await? {
            if pair.is_valid_at(self.clock.now()) {
                return Ok(Some(pair.access_token));
            }
        }

        let _guard = self.refresh_lock.lock().await;

        let Some(pair) = self.store.load().await? else {
            return Ok(None);
        };

        // refreshed while we were waiting
        if pair.is_valid_at(self.clock.now()) {
            return Ok(Some(pair.access_token));
        }

        if self.refresh_attempts.load(Ordering::Acquire) != attempts {
            tracing::debug!("refresh attempt failed while waiting, not retrying");
            return Ok(None);
        }

        self.try_refresh(pair).await
    }

    pub(crate) async fn refresh(&self) -> Result<CredentialPair, Error> {
        let _guard = self.refresh_lock.lock().await;

        let current = self.store.load().await?.ok_or(Error::NoCredentials)?;

        self.refresh_locked(current).await
    }

    /// Runs `operation` with a valid token. If the provider answers 401 the
    /// token is refreshed once and `operation` is retried once.
    pub(crate) async fn with_fresh_token<T, F, Fut>(&self, operation: F) -> Result<T, Error>
    where
        F: Fn(String) -> Fut,
        Fut: Future<Output = Result<T, Error>>,
    {
        let token = self
            .get_valid_access_token()
            .await?
            .ok_or(Error::NoCredentials)?;

        match operation(token.clone()).await {
            Err(Error::TokenRejected) => {
                tracing::warn!("access token rejected by provider, refreshing once");

                let token = self
                    .refresh_after_rejection(&token)
                    .await?
                    .ok_or(Error::TokenRejected)?;

                operation(token).await
            }
            result => result,
        }
    }

    async fn refresh_after_rejection(&self, rejected: &str) -> Result<Option<String>, Error> {
        let attempts = self.refresh_attempts.load(Ordering::Acquire);
        let _guard = self.refresh_lock.lock().await;

        let Some(pair) = self.store.load().await? else {
            return Ok(None);
        };

        if pair.access_token != rejected && pair.is_valid_at(self.clock.now()) {
            return Ok(Some(pair.access_token));
        }

        if self.refresh_attempts.load(Ordering::Acquire) != attempts {
            return Ok(None);
        }

        self.try_refresh(pair).await
    }

    /// Caller must hold `refresh_lock`.
    async fn try_refresh(&self, current: CredentialPair) -> Result<Option<String>, Error> {
        if current.refresh_token.is_none() {
            tracing::debug!("no refresh token stored");
            return Ok(None);
        }

        match self.refresh_locked(current).await {
            Ok(pair) => Ok(Some(pair.access_token)),
            Err(e) if e.is_recoverable() => {
                tracing::warn!("token refresh failed, {:?}", e);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Caller must hold `refresh_lock`.
    #[instrument(skip_all)]
    async fn refresh_locked(&self, current: CredentialPair) -> Result<CredentialPair, Error> {
        let result = self.request_refresh(current).await;
        self.refresh_attempts.fetch_add(1, Ordering::Release);

        result
    }

    async fn request_refresh(&self, current: CredentialPair) -> Result<CredentialPair, Error> {
        let refresh_token = current
            .refresh_token
            .as_deref()
            .ok_or(Error::NoCredentials)?;

        let issued_at = self.clock.now();

        let response = self
            .client
            .request_token(
                Grant::RefreshToken { refresh_token },
                self.client_id()?,
                self.client_secret()?,
            )
            .await?;

        let rotated = response.refresh_token.is_some();
        let pair = current.rotate(response, issued_at);

        self.store.save(&pair).await?;

        tracing::info!(rotated, "access token refreshed");

        Ok(pair)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{ManualClock, exchange_mock, manager, refresh_mock, token_body};
    use chrono::TimeDelta;
    use serde_json::json;
    use tokio::task::JoinSet;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn exchanged_token_is_returned_without_refresh() {
        let server = MockServer::start().await;
        exchange_mock("a-1", Some("r-1")).expect(1).mount(&server).await;
        refresh_mock().expect(0).mount(&server).await;

        let clock = ManualClock::arc();
        let manager = manager(&server, clock.clone());

        let pair = manager.exchange_code("code-1").await.unwrap();
        let token = manager.get_valid_access_token().await.unwrap();

        assert_eq!(pair.access_token, "a-1");
        assert_eq!(token.as_deref(), Some("a-1"));
    }

    #[tokio::test]
    async fn refreshes_exactly_once_after_expiry() {
        let server = MockServer::start().await;
        exchange_mock("a-1", Some("r-1")).mount(&server).await;

        let clock = ManualClock::arc();
        let manager = manager(&server, clock.clone());
        manager.exchange_code("code-1").await.unwrap();

        clock.advance(TimeDelta::seconds(3599));
        assert_eq!(
            manager.get_valid_access_token().await.unwrap().as_deref(),
            Some("a-1")
        );

        Mock::given(method("POST"))
            .and(path("/api/token"))
            .and(body_string_contains("grant_type=refresh_token"))
            .and(body_string_contains("refresh_token=r-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(token_body("a-2", None)))
            .expect(1)
            .mount(&server)
            .await;

        clock.advance(TimeDelta::seconds(2));
        assert_eq!(
            manager.get_valid_access_token().await.unwrap().as_deref(),
            Some("a-2")
        );
        assert_eq!(
            manager.get_valid_access_token().await.unwrap().as_deref(),
            Some("a-2")
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_callers_share_one_refresh() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/token"))
            .and(body_string_contains("grant_type=refresh_token"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(token_body("a-2", Some("r-2")))
                    .set_delay(std::time::Duration::from_millis(100)),
            )
            .expect(1)
            .mount(&server)
            .await;

        let clock = ManualClock::arc();
        let manager = Arc::new(manager(&server, clock.clone()));
        manager
            .seed(CredentialPair::seeded("a-1".into(), "r-1".into(), clock.now()))
            .await
            .unwrap();
        clock.advance(TimeDelta::seconds(3601));

        let mut tasks = JoinSet::new();
        for _ in 0..8 {
            let manager = manager.clone();
            tasks.spawn(async move { manager.get_valid_access_token().await });
        }

        while let Some(result) = tasks.join_next().await {
            assert_eq!(result.unwrap().unwrap().as_deref(), Some("a-2"));
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_callers_share_one_failed_refresh() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/token"))
            .and(body_string_contains("grant_type=refresh_token"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_json(json!({ "error": "invalid_grant" }))
                    .set_delay(std::time::Duration::from_millis(200)),
            )
            .expect(1)
            .mount(&server)
            .await;

        let clock = ManualClock::arc();
        let manager = Arc::new(manager(&server, clock.clone()));
        let seeded = CredentialPair::seeded("a-1".into(), "r-1".into(), clock.now());
        manager.seed(seeded.clone()).await.unwrap();
        clock.advance(TimeDelta::seconds(3601));

        let mut tasks = JoinSet::new();
        for _ in 0..8 {
            let manager = manager.clone();
            tasks.spawn(async move { manager.get_valid_access_token().await });
        }

        while let Some(result) = tasks.join_next().await {
            assert_eq!(result.unwrap().unwrap(), None);
        }
        assert_eq!(manager.store.load().await.unwrap(), Some(seeded));
    }

    #[tokio::test]
    async fn rotated_refresh_token_replaces_the_old_one() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/token"))
            .and(body_string_contains("refresh_token=r-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(token_body("a-2", Some("r-2"))))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/token"))
            .and(body_string_contains("refresh_token=r-2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(token_body("a-3", None)))
            .expect(1)
            .mount(&server)
            .await;

        let clock = ManualClock::arc();
        let manager = manager(&server, clock.clone());
        manager
            .seed(CredentialPair::from_refresh_token("r-1".into()))
            .await
            .unwrap();

        let first = manager.refresh().await.unwrap();
        let second = manager.refresh().await.unwrap();

        assert_eq!(first.refresh_token.as_deref(), Some("r-2"));
        assert_eq!(second.access_token, "a-3");
        assert_eq!(second.refresh_token.as_deref(), Some("r-2"));
    }

    #[tokio::test]
    async fn revoked_refresh_token_yields_no_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/token"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": "invalid_grant",
                "error_description": "Refresh token revoked"
            })))
            .mount(&server)
            .await;

        let clock = ManualClock::arc();
        let manager = manager(&server, clock.clone());
        let seeded = CredentialPair::from_refresh_token("revoked".into());
        manager.seed(seeded.clone()).await.unwrap();

        assert_eq!(manager.get_valid_access_token().await.unwrap(), None);
        assert!(matches!(
            manager.refresh().await,
            Err(Error::UpstreamAuth { status: 400, .. })
        ));
        assert_eq!(manager.store.load().await.unwrap(), Some(seeded));
    }

    #[tokio::test]
    async fn no_credentials_is_not_an_error() {
        let server = MockServer::start().await;
        let manager = manager(&server, ManualClock::arc());

        assert_eq!(manager.get_valid_access_token().await.unwrap(), None);
        assert!(matches!(manager.refresh().await, Err(Error::NoCredentials)));
    }

    #[tokio::test]
    async fn rejected_exchange_stores_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/token"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": "invalid_grant"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let manager = manager(&server, ManualClock::arc());

        assert!(matches!(
            manager.exchange_code("used").await,
            Err(Error::UpstreamAuth { .. })
        ));
        assert_eq!(manager.store.load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn authorize_builds_provider_url() {
        let server = MockServer::start().await;
        let manager = manager(&server, ManualClock::arc());

        let authorization = manager.authorize().unwrap();

        assert!(
            authorization
                .url
                .starts_with(&format!("{}/authorize?response_type=code", server.uri()))
        );
        assert!(authorization.url.contains("client_id=client-id"));
        assert!(authorization.url.contains("user-top-read"));
        assert!(
            authorization
                .url
                .contains(&format!("state={}", authorization.state))
        );
    }

    #[tokio::test]
    async fn missing_client_id_is_a_configuration_error() {
        let server = MockServer::start().await;
        let client = Client::new(&server.uri(), &server.uri(), std::time::Duration::from_secs(2))
            .unwrap();
        let manager = TokenManager::new(
            client,
            OAuthSettings {
                client_id: None,
                client_secret: None,
                redirect_uri: "http://localhost:3000/auth/callback".into(),
            },
            Arc::new(crate::token::store::MemoryStore::default()),
            ManualClock::arc(),
        );

        assert!(matches!(
            manager.authorize(),
            Err(Error::Configuration("client id"))
        ));
    }

    #[tokio::test]
    async fn rejected_token_is_refreshed_and_retried_once() {
        let server = MockServer::start().await;
        refresh_mock().expect(1).mount(&server).await;

        let clock = ManualClock::arc();
        let manager = manager(&server, clock.clone());
        manager
            .seed(CredentialPair::seeded("revoked".into(), "r-1".into(), clock.now()))
            .await
            .unwrap();

        let calls = std::sync::atomic::AtomicUsize::new(0);
        let result = manager
            .with_fresh_token(|token| {
                calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                async move {
                    match token.as_str() {
                        "revoked" => Err(Error::TokenRejected),
                        _ => Ok(token),
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), "a-refreshed");
        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn second_rejection_is_returned() {
        let server = MockServer::start().await;
        refresh_mock().expect(1).mount(&server).await;

        let clock = ManualClock::arc();
        let manager = manager(&server, clock.clone());
        manager
            .seed(CredentialPair::seeded("a-1".into(), "r-1".into(), clock.now()))
            .await
            .unwrap();

        let result: Result<(), Error> = manager
            .with_fresh_token(|_| async { Err(Error::TokenRejected) })
            .await;

        assert!(matches!(result, Err(Error::TokenRejected)));
    }
}
