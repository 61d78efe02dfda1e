use chrono::{DateTime, TimeDelta, Utc};

use crate::types::spotify::TokenResponse;

/// TTL assumed when the provider omits `expires_in`.
pub(crate) const DEFAULT_TTL_SECS: i64 = 3600;

/// The owner's access/refresh token pair.
#[derive(Clone, PartialEq, Eq)]
pub(crate) struct CredentialPair {
    pub(crate) access_token: String,
    pub(crate) refresh_token: Option<String>,
    pub(crate) expires_at: DateTime<Utc>,
}

impl std::fmt::Debug for CredentialPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialPair")
            .field("refresh_token", &self.refresh_token.is_some())
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

fn ttl(response: &TokenResponse) -> TimeDelta {
    let secs = response
        .expires_in
        .filter(|secs| *secs > 0)
        .unwrap_or(DEFAULT_TTL_SECS);

    TimeDelta::seconds(secs)
}

impl CredentialPair {
    pub(crate) fn issued(response: TokenResponse, issued_at: DateTime<Utc>) -> Self {
        let expires_at = issued_at + ttl(&response);

        Self {
            access_token: response.access_token,
            refresh_token: response.refresh_token,
            expires_at,
        }
    }

    pub(crate) fn seeded(
        access_token: String,
        refresh_token: String,
        issued_at: DateTime<Utc>,
    ) -> Self {
        Self {
            access_token,
            refresh_token: Some(refresh_token),
            expires_at: issued_at + TimeDelta::seconds(DEFAULT_TTL_SECS),
        }
    }

    /// A pair holding only a refresh token; the first use triggers a refresh.
    pub(crate) fn from_refresh_token(refresh_token: String) -> Self {
        Self {
            access_token: String::new(),
            refresh_token: Some(refresh_token),
            expires_at: DateTime::UNIX_EPOCH,
        }
    }

    pub(crate) fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        !self.access_token.is_empty() && now < self.expires_at
    }

    pub(crate) fn expires_in(&self, now: DateTime<Utc>) -> i64 {
        (self.expires_at - now).num_seconds().max(0)
    }

    /// Applies a refresh response. A rotated refresh token replaces the old one.
    pub(crate) fn rotate(self, response: TokenResponse, issued_at: DateTime<Utc>) -> Self {
        let expires_at = issued_at + ttl(&response);

        Self {
            access_token: response.access_token,
            refresh_token: response.refresh_token.or(self.refresh_token),
            expires_at,
        }
    }
}
