use crate::core::error;
use crate::core::state::AppState;
use crate::routes::{auth, owner, spotify};
use crate::utils;
use axum::error_handling::HandleErrorLayer;
use axum::{
    Router,
    extract::{MatchedPath, Request},
    http::Method,
    middleware,
    routing::{get, post},
};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    cors::{self, CorsLayer},
    trace::TraceLayer,
};
use tracing::info_span;

pub(crate) fn routes(state: AppState, rate_limit: u64) -> Router {
    // /auth/...
    let auth_router = Router::new()
        .route("/start", get(auth::start))
        .route("/callback", get(auth::callback))
        .route("/state", get(auth::stored_state));

    let owner_router = Router::new()
        .route("/owner", post(owner::seed_owner))
        .route(
            "/refresh",
            get(owner::force_refresh).post(owner::seed_refresh),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            utils::auth::require_admin_key,
        ));

    Router::new()
        .route("/", get(|| async { "ok" }))
        .route("/me", get(spotify::me))
        .route("/top", get(spotify::top))
        .route("/token", get(spotify::token))
        .nest("/auth", auth_router)
        .merge(owner_router)
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(
                    TraceLayer::new_for_http().make_span_with(|request: &Request<_>| {
                        let matched_path = request
                            .extensions()
                            .get::<MatchedPath>()
                            .map(MatchedPath::as_str);

                        info_span!(
                            "request",
                            method = ?request.method(),
                            matched_path,
                        )
                    }),
                )
                .layer(HandleErrorLayer::new(error::handle_middleware_errors))
                .buffer(128)
                .rate_limit(rate_limit, Duration::from_secs(1))
                .layer(
                    CorsLayer::new()
                        .allow_methods([Method::GET, Method::POST])
                        .allow_origin(cors::Any),
                ),
        )
}
