use axum::BoxError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Database migration error: {0}")]
    DatabaseMigration(#[from] sqlx::migrate::MigrateError),
    #[error("IO error: {0}")]
    IO(#[from] std::io::Error),
    #[error("SQL error: {0}")]
    Sql(#[from] sqlx::Error),
    #[error("Reqwest error: {0}")]
    HTTPClient(#[from] reqwest::Error),
}

#[derive(Debug, thiserror::Error)]
pub(crate) enum Error {
    #[error("Missing configuration: {0}")]
    Configuration(&'static str),
    #[error("Provider rejected token request with status {status}")]
    UpstreamAuth {
        status: u16,
        details: serde_json::Value,
    },
    #[error("Provider unavailable: {0}")]
    UpstreamUnavailable(#[from] reqwest::Error),
    #[error("Provider returned status {status}: {details}")]
    UpstreamStatus { status: u16, details: String },
    #[error("Access token rejected by provider")]
    TokenRejected,
    #[error("No credentials available")]
    NoCredentials,
    #[error("Missing authorization code")]
    MissingCode,
    #[error("State mismatch")]
    StateMismatch,
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Invalid request: {0}")]
    InvalidRequest(&'static str),
    #[error("URL encoding error: {0}")]
    URLEncode(#[from] serde_urlencoded::ser::Error),
    #[error("SQL error: {0}")]
    Sql(#[from] sqlx::Error),
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("Invalid header value: {0}")]
    Header(#[from] axum::http::header::InvalidHeaderValue),
}

impl Error {
    /// Whether a snapshot fetch may answer this failure with cached or demo data.
    pub(crate) fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::UpstreamAuth { .. }
                | Error::UpstreamUnavailable(_)
                | Error::UpstreamStatus { .. }
                | Error::TokenRejected
                | Error::NoCredentials
                | Error::Serialize(_)
        )
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        tracing::error!("{:?}", self);

        let (status, message) = match &self {
            Error::Configuration(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "missing_configuration")
            }
            Error::UpstreamAuth { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, "token_exchange_failed")
            }
            Error::UpstreamUnavailable(_) => (StatusCode::BAD_GATEWAY, "provider_unavailable"),
            Error::UpstreamStatus { .. } => (StatusCode::BAD_GATEWAY, "provider_error"),
            Error::TokenRejected => (StatusCode::UNAUTHORIZED, "token_expired"),
            Error::NoCredentials => (StatusCode::UNAUTHORIZED, "no_tokens"),
            Error::MissingCode => (StatusCode::BAD_REQUEST, "missing_code"),
            Error::StateMismatch => (StatusCode::BAD_REQUEST, "state_mismatch"),
            Error::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized"),
            Error::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "invalid_request"),
            Error::URLEncode(_) => (StatusCode::INTERNAL_SERVER_ERROR, "url_encoding_error"),
            Error::Sql(_) => (StatusCode::INTERNAL_SERVER_ERROR, "storage_error"),
            Error::Serialize(_) => (StatusCode::INTERNAL_SERVER_ERROR, "serialization_error"),
            Error::Header(_) => (StatusCode::INTERNAL_SERVER_ERROR, "invalid_header_value"),
        };

        let body = match self {
            Error::UpstreamAuth { details, .. } => json!({ "error": message, "details": details }),
            Error::Configuration(what) | Error::InvalidRequest(what) => {
                json!({ "error": message, "details": what })
            }
            _ => json!({ "error": message }),
        };

        (status, Json(body)).into_response()
    }
}

pub(crate) async fn handle_middleware_errors(err: BoxError) -> (StatusCode, &'static str) {
    tracing::error!("Unhandled error: {:?}", err);
    (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
}
