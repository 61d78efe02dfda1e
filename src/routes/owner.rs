use axum::Json;
use axum::extract::State;
use tracing::instrument;

use crate::core::error::Error;
use crate::core::state::AppState;
use crate::token::credential::CredentialPair;
use crate::types::request::{SeedOwner, SeedRefresh};
use crate::types::response;

#[instrument(skip_all)]
pub(crate) async fn seed_owner(
    State(state): State<AppState>,
    Json(params): Json<SeedOwner>,
) -> Result<Json<response::Seeded>, Error> {
    if params.access_token.is_empty() || params.refresh_token.is_empty() {
        return Err(Error::InvalidRequest("missing tokens"));
    }

    let pair = CredentialPair::seeded(
        params.access_token,
        params.refresh_token,
        state.manager.now(),
    );

    state.manager.seed(pair).await?;

    tracing::info!("owner tokens stored");

    Ok(Json(response::Seeded {
        success: true,
        message: "Owner tokens stored",
    }))
}

#[instrument(skip_all)]
pub(crate) async fn seed_refresh(
    State(state): State<AppState>,
    Json(params): Json<SeedRefresh>,
) -> Result<Json<response::Seeded>, Error> {
    if params.refresh_token.is_empty() {
        return Err(Error::InvalidRequest("missing refresh token"));
    }

    state
        .manager
        .seed(CredentialPair::from_refresh_token(params.refresh_token))
        .await?;

    tracing::info!("owner refresh token stored");

    Ok(Json(response::Seeded {
        success: true,
        message: "Refresh token stored",
    }))
}

#[instrument(skip_all)]
pub(crate) async fn force_refresh(
    State(state): State<AppState>,
) -> Result<Json<response::Refreshed>, Error> {
    let pair = state.manager.refresh().await?;

    Ok(Json(response::Refreshed {
        ok: true,
        expires_in: pair.expires_in(state.manager.now()),
    }))
}
