use axum::Json;
use axum::extract::{Query, State};
use axum::http::header::{LOCATION, SET_COOKIE};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use tracing::instrument;

use crate::core::error::Error;
use crate::core::state::AppState;
use crate::types::request::{CallbackParams, StartParams};
use crate::types::response;
use crate::utils::cookies::{self, AUTH_STATE, AUTH_STATE_MAX_AGE};

fn redirect(location: &str, set_cookies: &[String]) -> Result<Response, Error> {
    let mut headers = HeaderMap::new();
    headers.insert(LOCATION, HeaderValue::from_str(location)?);

    for cookie in set_cookies {
        headers.append(SET_COOKIE, HeaderValue::from_str(cookie)?);
    }

    Ok((StatusCode::FOUND, headers).into_response())
}

#[instrument(skip(state))]
pub(crate) async fn start(
    State(state): State<AppState>,
    Query(params): Query<StartParams>,
) -> Result<Response, Error> {
    let authorization = state.manager.authorize()?;
    let state_cookie = state
        .cookies
        .set(AUTH_STATE, &authorization.state, AUTH_STATE_MAX_AGE);

    if params.is_debug() {
        let body = response::AuthDebug {
            auth_url: authorization.url,
            redirect_uri: state.manager.redirect_uri().to_string(),
            params: authorization.params,
        };

        let cookie = HeaderValue::from_str(&state_cookie)?;

        return Ok(([(SET_COOKIE, cookie)], Json(body)).into_response());
    }

    redirect(&authorization.url, &[state_cookie])
}

#[instrument(skip_all)]
pub(crate) async fn callback(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<CallbackParams>,
) -> Result<Response, Error> {
    if let Some(error) = params.error {
        tracing::warn!("authorization denied by provider: {}", error);

        let query = serde_urlencoded::to_string([("spotify_error", error)])?;
        return redirect(&format!("{}?{}", state.home, query), &[]);
    }

    let code = params
        .code
        .filter(|code| !code.is_empty())
        .ok_or(Error::MissingCode)?;

    let stored_state = cookies::read(&headers, AUTH_STATE);
    match (params.state.as_deref(), stored_state.as_deref()) {
        (Some(received), Some(stored)) if received == stored => (),
        _ => return Err(Error::StateMismatch),
    }

    let pair = state.manager.exchange_code(&code).await?;

    let mut set_cookies = vec![state.cookies.set(
        cookies::ACCESS_TOKEN,
        &pair.access_token,
        pair.expires_in(state.manager.now()),
    )];

    if let Some(refresh_token) = &pair.refresh_token {
        set_cookies.push(state.cookies.set(
            cookies::REFRESH_TOKEN,
            refresh_token,
            cookies::REFRESH_TOKEN_MAX_AGE,
        ));
    }

    set_cookies.push(state.cookies.clear(AUTH_STATE));

    redirect(&state.home, &set_cookies)
}

pub(crate) async fn stored_state(headers: HeaderMap) -> Json<response::StoredState> {
    Json(response::StoredState {
        stored_state: cookies::read(&headers, AUTH_STATE),
    })
}
