//! Request coordination: each handler walks a request through validation,
//! character resolution, gated synthesis, materialization and delivery,
//! converting the first failure into a typed rejection.

use super::error::{reject, ApiError};
use super::request::TtsRequest;
use super::ServerState;
use crate::audio;
use std::sync::Arc;
use tracing::{debug, info};
use warp::http::Response;
use warp::{Rejection, Reply};

pub async fn character_list(state: Arc<ServerState>) -> Result<impl Reply, Rejection> {
    let characters = state
        .characters
        .list()
        .map_err(|e| reject(ApiError::Internal(format!("character scan failed: {}", e))))?;
    Ok(warp::reply::json(&characters))
}

pub async fn health(state: Arc<ServerState>) -> Result<impl Reply, Rejection> {
    let body = serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "engine_available": state.pool.is_available().await,
    });
    Ok(warp::reply::json(&body))
}

pub async fn tts(request: TtsRequest, state: Arc<ServerState>) -> Result<Response<Vec<u8>>, Rejection> {
    // Received → Validated: rejected before any synthesis work begins.
    let format = request.validate(&state.params).map_err(reject)?;

    // Validated → CharacterResolved
    let profile = state
        .characters
        .resolve(&request.character)
        .map_err(|e| reject(ApiError::Internal(format!("character lookup failed: {}", e))))?
        .ok_or_else(|| reject(ApiError::CharacterNotFound(request.character.clone())))?;

    debug!(
        "[TTS] Synthesizing {} chars as '{}' ({}, speed {})",
        request.text.chars().count(),
        profile.name,
        request.format,
        request.speed
    );

    // CharacterResolved → Synthesized: all engine access goes through the gate.
    let spec = request.to_spec(profile);
    let result = state
        .pool
        .synthesize(&spec)
        .await
        .map_err(|e| reject(ApiError::Synthesis(e)))?;

    info!(
        "[TTS] Generated {:.2}s of audio at {} Hz",
        result.duration_secs(),
        result.sample_rate
    );

    // Synthesized → Materialized: encoding runs off the request executor.
    let cache_dir = state.cache_dir.clone();
    let artifact = tokio::task::spawn_blocking(move || audio::materialize(&result, format, &cache_dir))
        .await
        .map_err(|e| reject(ApiError::Internal(format!("encoder task failed: {}", e))))?
        .map_err(|e| reject(ApiError::Encoding(e)))?;

    // Materialized → Delivered: once the bytes are handed to the transport
    // the artifact goes out of scope and its storage is released; the same
    // drop runs if this handler is abandoned mid-flight.
    let bytes = artifact
        .read()
        .await
        .map_err(|e| reject(ApiError::Internal(format!("artifact read failed: {}", e))))?;

    Ok(Response::builder()
        .header("Content-Type", format.content_type())
        .header(
            "Content-Disposition",
            format!("attachment; filename=\"tts_output.{}\"", format.extension()),
        )
        .body(bytes)
        .unwrap())
}
