use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;

pub(crate) mod cache;
pub(crate) mod demo;

pub(crate) use cache::OwnerSnapshots;

/// Where a snapshot handed to the page came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum Source {
    /// fetched from the provider within the kind's TTL
    Live,
    /// last known data served because a fresh fetch was impossible
    Stale,
    Demo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Kind {
    NowPlaying,
    Top,
}

impl Kind {
    pub(crate) fn ttl(self) -> TimeDelta {
        match self {
            Kind::NowPlaying => TimeDelta::seconds(30),
            Kind::Top => TimeDelta::hours(1),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Snapshot<T> {
    pub(crate) data: T,
    pub(crate) source: Source,
    /// served from memory rather than a provider call made for this request
    pub(crate) cached: bool,
    pub(crate) last_updated: Option<DateTime<Utc>>,
}
