use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, RwLock};

use crate::core::error::Error;
use crate::snapshot::{Kind, Snapshot, Source, demo};
use crate::token::manager::TokenManager;
use crate::types::spotify::{OwnerNow, TopLists};

const TOP_ARTISTS_LIMIT: u8 = 6;
const TOP_TRACKS_LIMIT: u8 = 8;

#[derive(Debug)]
struct Entry<T> {
    data: T,
    last_updated: DateTime<Utc>,
}

#[derive(Debug)]
struct Slot<T> {
    kind: Kind,
    entry: RwLock<Option<Entry<T>>>,
    fetch_lock: Mutex<()>,
    /// Finished upstream fetches, successful or not.
    attempts: AtomicU64,
}

impl<T: Clone> Slot<T> {
    fn new(kind: Kind) -> Self {
        Self {
            kind,
            entry: RwLock::new(None),
            fetch_lock: Mutex::new(()),
            attempts: AtomicU64::new(0),
        }
    }

    async fn fresh(&self, now: DateTime<Utc>) -> Option<Snapshot<T>> {
        let entry = self.entry.read().await;

        entry
            .as_ref()
            .filter(|entry| now - entry.last_updated < self.kind.ttl())
            .map(|entry| Snapshot {
                data: entry.data.clone(),
                source: Source::Live,
                cached: true,
                last_updated: Some(entry.last_updated),
            })
    }

    async fn stale(&self) -> Option<Snapshot<T>> {
        let entry = self.entry.read().await;

        entry.as_ref().map(|entry| Snapshot {
            data: entry.data.clone(),
            source: Source::Stale,
            cached: true,
            last_updated: Some(entry.last_updated),
        })
    }

    async fn replace(&self, data: T, last_updated: DateTime<Utc>) {
        *self.entry.write().await = Some(Entry { data, last_updated });
    }
}

/// Owner data shared by every visitor, one slot per kind.
#[derive(Debug)]
pub(crate) struct OwnerSnapshots {
    manager: Arc<TokenManager>,
    now_playing: Slot<OwnerNow>,
    top: Slot<TopLists>,
}

impl OwnerSnapshots {
    pub(crate) fn new(manager: Arc<TokenManager>) -> Self {
        Self {
            manager,
            now_playing: Slot::new(Kind::NowPlaying),
            top: Slot::new(Kind::Top),
        }
    }

    /// Profile and current playback. `None` when there is neither a way to
    /// reach the provider nor anything cached.
    pub(crate) async fn now_playing(&self) -> Result<Option<Snapshot<OwnerNow>>, Error> {
        let client = self.manager.client();

        self.fetch(&self.now_playing, |token: String| async move {
            let (profile, now) =
                tokio::try_join!(client.profile(&token), client.now_playing(&token))?;

            Ok(OwnerNow { profile, now })
        })
        .await
    }

    /// Top artists and tracks, falling back to the demo lists.
    pub(crate) async fn top(&self) -> Result<Snapshot<TopLists>, Error> {
        let client = self.manager.client();

        let snapshot = self
            .fetch(&self.top, |token: String| async move {
                let (artists, tracks) = tokio::try_join!(
                    client.top("artists", TOP_ARTISTS_LIMIT, &token),
                    client.top("tracks", TOP_TRACKS_LIMIT, &token)
                )?;

                Ok(TopLists { artists, tracks })
            })
            .await?;

        Ok(snapshot.unwrap_or_else(demo::top))
    }

    async fn fetch<T, F, Fut>(
        &self,
        slot: &Slot<T>,
        operation: F,
    ) -> Result<Option<Snapshot<T>>, Error>
    where
        T: Clone,
        F: Fn(String) -> Fut,
        Fut: Future<Output = Result<T, Error>>,
    {
        let attempts = slot.attempts.load(Ordering::Acquire);

        if let Some(snapshot) = slot.fresh(self.manager.now()).await {
            return Ok(Some(snapshot));
        }

        let _guard = slot.fetch_lock.lock().await;

        // another request may have filled the slot while we waited
        if let Some(snapshot) = slot.fresh(self.manager.now()).await {
            return Ok(Some(snapshot));
        }

        // or tried and failed, in which case its fallback is ours too
        if slot.attempts.load(Ordering::Acquire) != attempts {
            return Ok(slot.stale().await);
        }

        let result = self.manager.with_fresh_token(operation).await;
        slot.attempts.fetch_add(1, Ordering::Release);

        match result {
            Ok(data) => {
                let now = self.manager.now();
                slot.replace(data.clone(), now).await;

                Ok(Some(Snapshot {
                    data,
                    source: Source::Live,
                    cached: false,
                    last_updated: Some(now),
                }))
            }
            Err(Error::NoCredentials) => {
                tracing::debug!(kind = ?slot.kind, "no owner credentials, serving cache");
                Ok(slot.stale().await)
            }
            Err(e) if e.is_recoverable() => {
                tracing::warn!(kind = ?slot.kind, "snapshot fetch failed, serving cache, {:?}", e);
                Ok(slot.stale().await)
            }
            Err(e) => Err(e),
        }
    }
}
