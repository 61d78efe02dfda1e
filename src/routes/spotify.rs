use axum::Json;
use axum::extract::State;
use tracing::instrument;

use crate::core::error::Error;
use crate::core::state::AppState;
use crate::types::response;

#[instrument(skip(state))]
pub(crate) async fn me(State(state): State<AppState>) -> Result<Json<response::Me>, Error> {
    let snapshot = state
        .snapshots
        .now_playing()
        .await?
        .ok_or(Error::NoCredentials)?;

    Ok(Json(snapshot.into()))
}

#[instrument(skip(state))]
pub(crate) async fn top(State(state): State<AppState>) -> Result<Json<response::Top>, Error> {
    Ok(Json(state.snapshots.top().await?.into()))
}

#[instrument(skip(state))]
pub(crate) async fn token(
    State(state): State<AppState>,
) -> Result<Json<response::AccessToken>, Error> {
    let access_token = state
        .manager
        .get_valid_access_token()
        .await?
        .ok_or(Error::NoCredentials)?;

    Ok(Json(response::AccessToken { access_token }))
}
