use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use serde_json::{Value, json};
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::core::client::Client;
use crate::token::clock::Clock;
use crate::token::manager::{OAuthSettings, TokenManager};
use crate::token::store::MemoryStore;

#[derive(Debug)]
pub(crate) struct ManualClock(Mutex<DateTime<Utc>>);

impl ManualClock {
    pub(crate) fn arc() -> Arc<Self> {
        let start = DateTime::from_timestamp(1_735_689_600, 0).unwrap();
        Arc::new(Self(Mutex::new(start)))
    }

    pub(crate) fn advance(&self, by: TimeDelta) {
        *self.0.lock().unwrap() += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.0.lock().unwrap()
    }
}

pub(crate) fn client(server: &MockServer) -> Client {
    Client::new(&server.uri(), &server.uri(), Duration::from_secs(2)).unwrap()
}

pub(crate) fn manager(server: &MockServer, clock: Arc<ManualClock>) -> TokenManager {
    manager_with_client(client(server), clock)
}

pub(crate) fn manager_with_client(client: Client, clock: Arc<ManualClock>) -> TokenManager {
    TokenManager::new(
        client,
        OAuthSettings {
            client_id: Some("client-id".into()),
            client_secret: Some("client-secret".into()),
            redirect_uri: "http://localhost:3000/auth/callback".into(),
        },
        Arc::new(MemoryStore::default()),
        clock,
    )
}

pub(crate) fn token_body(access_token: &str, refresh_token: Option<&str>) -> Value {
    let mut body = json!({
        "access_token": access_token,
        "token_type": "Bearer",
        "expires_in": 3600,
    });

    if let Some(refresh_token) = refresh_token {
        body["refresh_token"] = json!(refresh_token);
    }

    body
}

pub(crate) fn exchange_mock(access_token: &str, refresh_token: Option<&str>) -> Mock {
    Mock::given(method("POST"))
        .and(path("/api/token"))
        .and(body_string_contains("grant_type=authorization_code"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(token_body(access_token, refresh_token)),
        )
}

/// Refresh grant answered with access token `a-refreshed`.
pub(crate) fn refresh_mock() -> Mock {
    Mock::given(method("POST"))
        .and(path("/api/token"))
        .and(body_string_contains("grant_type=refresh_token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("a-refreshed", None)))
}
