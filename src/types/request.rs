use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub(crate) struct StartParams {
    pub(crate) debug: Option<String>,
}

impl StartParams {
    pub(crate) fn is_debug(&self) -> bool {
        self.debug.as_deref() == Some("1")
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct CallbackParams {
    pub(crate) code: Option<String>,
    pub(crate) state: Option<String>,
    pub(crate) error: Option<String>,
}

#[derive(Deserialize)]
pub(crate) struct SeedOwner {
    pub(crate) access_token: String,
    pub(crate) refresh_token: String,
}

#[derive(Deserialize)]
pub(crate) struct SeedRefresh {
    pub(crate) refresh_token: String,
}
