use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

/// Body of a successful `POST /api/token`.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TokenResponse {
    pub(crate) access_token: String,
    pub(crate) refresh_token: Option<String>,
    pub(crate) expires_in: Option<i64>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum NowPlaying {
    Playing(Value),
    /// `204 No Content` from `currently-playing`
    Nothing,
}

impl NowPlaying {
    pub(crate) fn is_playing(&self) -> bool {
        matches!(self, NowPlaying::Playing(_))
    }
}

impl Serialize for NowPlaying {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            NowPlaying::Playing(item) => item.serialize(serializer),
            NowPlaying::Nothing => serializer.serialize_none(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct OwnerNow {
    pub(crate) profile: Value,
    pub(crate) now: NowPlaying,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct TopLists {
    pub(crate) artists: Vec<Value>,
    pub(crate) tracks: Vec<Value>,
}

/// Paging object wrapping `/v1/me/top/{type}` results.
#[derive(Debug, Deserialize)]
pub(crate) struct Paging {
    #[serde(default)]
    pub(crate) items: Vec<Value>,
}
