use rand::Rng;
use rand::distributions::Alphanumeric;
use serde::Serialize;

pub(crate) const SCOPES: [&str; 6] = [
    "user-read-playback-state",
    "user-read-currently-playing",
    "user-read-private",
    "user-read-email",
    "user-top-read",
    "streaming",
];

const STATE_LEN: usize = 16;

/// Query of the provider's `/authorize` endpoint.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct AuthorizeParams {
    pub(crate) response_type: &'static str,
    pub(crate) client_id: String,
    pub(crate) scope: String,
    pub(crate) redirect_uri: String,
    pub(crate) state: String,
}

impl AuthorizeParams {
    pub(crate) fn new(client_id: &str, redirect_uri: &str, scopes: &[&str], state: String) -> Self {
        Self {
            response_type: "code",
            client_id: client_id.to_string(),
            scope: scopes.join(" "),
            redirect_uri: redirect_uri.to_string(),
            state,
        }
    }
}

#[derive(Debug)]
pub(crate) struct Authorization {
    pub(crate) url: String,
    pub(crate) state: String,
    pub(crate) params: AuthorizeParams,
}

pub(crate) fn generate_state() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(STATE_LEN)
        .map(char::from)
        .collect()
}
