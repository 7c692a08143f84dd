use crate::audio::MaterializeError;
use crate::tts::TtsError;
use serde::Serialize;
use std::convert::Infallible;
use thiserror::Error;
use tracing::{error, warn};
use warp::http::StatusCode;
use warp::{Rejection, Reply};

// ── Error Taxonomy ─────────────────────────────────────

/// Client-visible request failures. `Display` is the `detail` string sent to
/// the caller; internals (paths, stack context) stay in the server log.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("Character not found: {0}")]
    CharacterNotFound(String),
    #[error(transparent)]
    Synthesis(#[from] TtsError),
    #[error(transparent)]
    Encoding(#[from] MaterializeError),
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) | ApiError::CharacterNotFound(_) => StatusCode::BAD_REQUEST,
            ApiError::Synthesis(TtsError::Busy(_)) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Synthesis(TtsError::Timeout(_)) => StatusCode::GATEWAY_TIMEOUT,
            ApiError::Synthesis(_) | ApiError::Encoding(_) | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl warp::reject::Reject for ApiError {}

pub fn reject(err: ApiError) -> Rejection {
    warp::reject::custom(err)
}

// ── Rejection Recovery ─────────────────────────────────

#[derive(Serialize)]
struct ErrorBody {
    detail: String,
}

/// Map every rejection to a JSON `{"detail": ...}` body. All failures are
/// logged here with their full message; no partial audio ever accompanies an
/// error status.
pub async fn handle_rejection(err: Rejection) -> Result<impl Reply, Infallible> {
    let (status, detail) = if let Some(api) = err.find::<ApiError>() {
        let status = api.status();
        if status.is_server_error() {
            error!("[Server] Request failed: {}", api);
        } else {
            warn!("[Server] Rejected request: {}", api);
        }
        (status, api.to_string())
    } else if err.is_not_found() {
        (StatusCode::NOT_FOUND, "Not found".to_string())
    } else if let Some(e) = err.find::<warp::filters::body::BodyDeserializeError>() {
        warn!("[Server] Bad request body: {}", e);
        (StatusCode::BAD_REQUEST, format!("Invalid request body: {}", e))
    } else if err.find::<warp::reject::InvalidQuery>().is_some() {
        warn!("[Server] Bad query string");
        (StatusCode::BAD_REQUEST, "Invalid query string".to_string())
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        (
            StatusCode::METHOD_NOT_ALLOWED,
            "Method not allowed".to_string(),
        )
    } else if err.find::<warp::reject::PayloadTooLarge>().is_some() {
        (
            StatusCode::PAYLOAD_TOO_LARGE,
            "Request body too large".to_string(),
        )
    } else if let Some(e) = err.find::<warp::filters::cors::CorsForbidden>() {
        warn!("[Server] CORS rejection: {}", e);
        (StatusCode::FORBIDDEN, e.to_string())
    } else {
        error!("[Server] Unhandled rejection: {:?}", err);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal server error".to_string(),
        )
    };

    Ok(warp::reply::with_status(
        warp::reply::json(&ErrorBody { detail }),
        status,
    ))
}
