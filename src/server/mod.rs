//! HTTP surface: route tree, CORS wiring and server lifecycle.

pub mod error;
pub mod handlers;
pub mod request;

#[cfg(test)]
mod tests;

use crate::characters::CharacterStore;
use crate::config::ParamsConfig;
use crate::tts::EnginePool;
use anyhow::Context;
use request::TtsRequest;
use std::convert::Infallible;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use warp::Filter;

/// Upper bound for JSON request bodies.
pub(crate) const MAX_BODY_SIZE: u64 = 64 * 1024;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
    pub character_dir: PathBuf,
    pub cache_dir: PathBuf,
    /// CORS origins; `"*"` anywhere in the list allows any origin.
    pub allowed_origins: Vec<String>,
}

/// Shared per-process state handed to every handler.
pub struct ServerState {
    pub characters: CharacterStore,
    pub pool: EnginePool,
    pub params: ParamsConfig,
    pub cache_dir: PathBuf,
}

pub struct TtsServer {
    config: ServerConfig,
    state: Arc<ServerState>,
}

impl TtsServer {
    /// Build the server, creating the character and cache directories if
    /// absent.
    pub fn new(
        config: ServerConfig,
        params: ParamsConfig,
        pool: EnginePool,
    ) -> anyhow::Result<Self> {
        let characters = CharacterStore::open(&config.character_dir).with_context(|| {
            format!(
                "failed to open character directory {}",
                config.character_dir.display()
            )
        })?;
        std::fs::create_dir_all(&config.cache_dir).with_context(|| {
            format!(
                "failed to create cache directory {}",
                config.cache_dir.display()
            )
        })?;

        let state = Arc::new(ServerState {
            characters,
            pool,
            params,
            cache_dir: config.cache_dir.clone(),
        });
        Ok(Self { config, state })
    }

    pub fn state(&self) -> Arc<ServerState> {
        Arc::clone(&self.state)
    }

    pub async fn run(self) {
        let addr = SocketAddr::new(self.config.host, self.config.port);
        info!("[Server] Listening on http://{}", addr);
        warp::serve(routes(self.state, &self.config.allowed_origins))
            .run(addr)
            .await;
    }
}

fn with_state(
    state: Arc<ServerState>,
) -> impl Filter<Extract = (Arc<ServerState>,), Error = Infallible> + Clone {
    warp::any().map(move || Arc::clone(&state))
}

/// The full route tree: `/character_list`, `/tts` (GET query + POST JSON
/// body converging on the same handler), `/health`.
pub fn routes(
    state: Arc<ServerState>,
    allowed_origins: &[String],
) -> impl Filter<Extract = impl warp::Reply, Error = Infallible> + Clone {
    let character_list = warp::path("character_list")
        .and(warp::path::end())
        .and(warp::get())
        .and(with_state(state.clone()))
        .and_then(handlers::character_list);

    let tts_get = warp::path("tts")
        .and(warp::path::end())
        .and(warp::get())
        .and(warp::query::<TtsRequest>())
        .and(with_state(state.clone()))
        .and_then(handlers::tts);

    let tts_post = warp::path("tts")
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::content_length_limit(MAX_BODY_SIZE))
        .and(warp::body::json::<TtsRequest>())
        .and(with_state(state.clone()))
        .and_then(handlers::tts);

    let health = warp::path("health")
        .and(warp::path::end())
        .and(warp::get())
        .and(with_state(state))
        .and_then(handlers::health);

    let mut cors = warp::cors()
        .allow_methods(vec!["GET", "POST", "OPTIONS"])
        .allow_headers(vec!["content-type"]);
    if allowed_origins.iter().any(|o| o == "*") {
        cors = cors.allow_any_origin();
    } else {
        cors = cors.allow_origins(allowed_origins.iter().map(|s| s.as_str()));
    }

    character_list
        .or(tts_get)
        .or(tts_post)
        .or(health)
        .with(cors)
        .recover(error::handle_rejection)
}
