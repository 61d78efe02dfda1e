use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::snapshot::{Snapshot, Source};
use crate::token::oauth::AuthorizeParams;
use crate::types::spotify::{NowPlaying, OwnerNow, TopLists};

#[derive(Serialize)]
pub(crate) struct Me {
    pub(crate) profile: Value,
    pub(crate) now: NowPlaying,
    pub(crate) playing: bool,
    pub(crate) source: Source,
    pub(crate) cached: bool,
    pub(crate) last_updated: Option<DateTime<Utc>>,
}

impl From<Snapshot<OwnerNow>> for Me {
    fn from(snapshot: Snapshot<OwnerNow>) -> Self {
        Self {
            playing: snapshot.data.now.is_playing(),
            profile: snapshot.data.profile,
            now: snapshot.data.now,
            source: snapshot.source,
            cached: snapshot.cached,
            last_updated: snapshot.last_updated,
        }
    }
}

#[derive(Serialize)]
pub(crate) struct Top {
    pub(crate) artists: Vec<Value>,
    pub(crate) tracks: Vec<Value>,
    pub(crate) source: Source,
    pub(crate) cached: bool,
    pub(crate) demo: bool,
    pub(crate) last_updated: Option<DateTime<Utc>>,
}

impl From<Snapshot<TopLists>> for Top {
    fn from(snapshot: Snapshot<TopLists>) -> Self {
        Self {
            artists: snapshot.data.artists,
            tracks: snapshot.data.tracks,
            demo: snapshot.source == Source::Demo,
            source: snapshot.source,
            cached: snapshot.cached,
            last_updated: snapshot.last_updated,
        }
    }
}

#[derive(Serialize)]
pub(crate) struct AccessToken {
    pub(crate) access_token: String,
}

#[derive(Serialize)]
pub(crate) struct Refreshed {
    pub(crate) ok: bool,
    pub(crate) expires_in: i64,
}

#[derive(Serialize)]
pub(crate) struct StoredState {
    pub(crate) stored_state: Option<String>,
}

#[derive(Serialize)]
pub(crate) struct AuthDebug {
    pub(crate) auth_url: String,
    pub(crate) redirect_uri: String,
    pub(crate) params: AuthorizeParams,
}

#[derive(Serialize)]
pub(crate) struct Seeded {
    pub(crate) success: bool,
    pub(crate) message: &'static str,
}
