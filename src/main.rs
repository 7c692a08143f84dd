use anyhow::Context;
use clap::Parser;
use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;
use voxserve::config::{self, ParamsConfig};
use voxserve::server::{ServerConfig, TtsServer};
use voxserve::tts::{EnginePool, LocalF5Engine, SynthesisEngine};

/// Character voice-cloning TTS service.
#[derive(Parser, Debug)]
#[command(name = "voxserve", version, about)]
struct Args {
    /// Bind address
    #[arg(long, default_value = "0.0.0.0")]
    host: IpAddr,

    /// Bind port
    #[arg(long, default_value_t = 6006)]
    port: u16,

    /// Verbose logging
    #[arg(long)]
    debug: bool,

    /// Model checkpoint forwarded to the engine (empty = engine default weights)
    #[arg(long, default_value = "")]
    model_path: String,

    /// Directory holding <name>/ref.wav + <name>/ref.txt character pairs
    #[arg(long, default_value = "characters")]
    character_dir: PathBuf,

    /// Directory for transient output artifacts (created if absent)
    #[arg(long, default_value = "temp")]
    cache_dir: PathBuf,

    /// Base URL of the local inference engine
    #[arg(long, default_value = "http://127.0.0.1:9880")]
    engine_url: String,

    /// JSON artifact defining supported languages and formats
    #[arg(long, default_value = "params_config.json")]
    params_config: PathBuf,

    /// Independently loaded engine instances (1 = fully serialized access)
    #[arg(long, default_value_t = 1)]
    engine_instances: usize,

    /// Max requests in flight or waiting for an engine slot
    #[arg(long, default_value_t = 8)]
    queue_depth: usize,

    /// Per-request synthesis deadline in seconds
    #[arg(long, default_value_t = 300)]
    request_timeout_secs: u64,

    /// Allowed CORS origin, repeatable ("*" = any)
    #[arg(long = "allowed-origin", default_value = "*")]
    allowed_origins: Vec<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let default_filter = if args.debug { "voxserve=debug,info" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .init();

    let params: ParamsConfig = config::load_json_config(&args.params_config, "Params");

    let timeout = Duration::from_secs(args.request_timeout_secs.max(1));
    let checkpoint = (!args.model_path.is_empty()).then(|| args.model_path.clone());
    let mut engines: Vec<Box<dyn SynthesisEngine>> = Vec::new();
    for _ in 0..args.engine_instances.max(1) {
        let engine = LocalF5Engine::new(&args.engine_url, checkpoint.clone(), timeout);
        engine
            .load_checkpoint()
            .await
            .context("engine checkpoint load failed")?;
        engines.push(Box::new(engine));
    }
    info!(
        "[Server] {} engine instance(s) behind {}",
        engines.len(),
        args.engine_url
    );

    let pool = EnginePool::new(engines, args.queue_depth, timeout);
    let server = TtsServer::new(
        ServerConfig {
            host: args.host,
            port: args.port,
            character_dir: args.character_dir,
            cache_dir: args.cache_dir,
            allowed_origins: args.allowed_origins,
        },
        params,
        pool,
    )?;
    server.run().await;
    Ok(())
}
