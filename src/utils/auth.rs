use axum::extract::State;
use axum::{body::Body, extract::Request, http::Response, middleware::Next};

use crate::core::error::Error;
use crate::core::state::AppState;

/// Guards the owner seeding routes with the configured `X-API-KEY`.
pub(crate) async fn require_admin_key(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response<Body>, Error> {
    let Some(expected) = state.admin_key.as_deref() else {
        tracing::warn!("owner route called but no admin key is configured");
        return Err(Error::Unauthorized);
    };

    let provided = request
        .headers()
        .get("X-API-KEY")
        .ok_or(Error::Unauthorized)?
        .to_str()
        .map_err(|_| Error::Unauthorized)?;

    if provided != expected {
        return Err(Error::Unauthorized);
    }

    Ok(next.run(request).await)
}
