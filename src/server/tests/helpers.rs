use super::mock_engine::{EngineProbe, MockEngine};
use crate::config::ParamsConfig;
use crate::server::{routes, ServerConfig, ServerState, TtsServer};
use crate::tts::{EnginePool, SynthesisEngine};
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

// ── Character fixtures ──────────────────────────────────────

/// Provision `<dir>/<name>/ref.wav` + `ref.txt`. The mock engine never opens
/// the audio, so stub bytes suffice.
pub fn add_character(dir: &Path, name: &str, ref_text: &str) {
    let char_dir = dir.join(name);
    std::fs::create_dir_all(&char_dir).unwrap();
    std::fs::write(char_dir.join("ref.wav"), b"RIFF").unwrap();
    std::fs::write(char_dir.join("ref.txt"), ref_text).unwrap();
}

// ── Server setup helpers ────────────────────────────────────

pub struct TestServer {
    pub addr: SocketAddr,
    pub state: Arc<ServerState>,
    root: TempDir,
}

impl TestServer {
    pub fn url(&self, path_and_query: &str) -> String {
        format!("http://{}{}", self.addr, path_and_query)
    }

    pub fn character_dir(&self) -> PathBuf {
        self.root.path().join("characters")
    }

    /// Transient artifacts currently staged in the cache directory.
    pub fn cache_file_count(&self) -> usize {
        std::fs::read_dir(self.root.path().join("cache"))
            .map(|entries| entries.count())
            .unwrap_or(0)
    }
}

/// Boot a server on an ephemeral port over isolated temp directories, with
/// a pre-provisioned "alice" character.
pub async fn start_server_with(
    engines: Vec<Box<dyn SynthesisEngine>>,
    queue_depth: usize,
    timeout: Duration,
) -> TestServer {
    let root = TempDir::new().expect("failed to create temp dir");
    let config = ServerConfig {
        host: IpAddr::from([127, 0, 0, 1]),
        port: 0,
        character_dir: root.path().join("characters"),
        cache_dir: root.path().join("cache"),
        allowed_origins: vec!["*".to_string()],
    };

    let pool = EnginePool::new(engines, queue_depth, timeout);
    let server = TtsServer::new(config, ParamsConfig::default(), pool).unwrap();
    let state = server.state();
    add_character(&root.path().join("characters"), "alice", "hello there");

    let (addr, fut) = warp::serve(routes(Arc::clone(&state), &["*".to_string()]))
        .bind_ephemeral(([127, 0, 0, 1], 0));
    tokio::spawn(fut);

    TestServer { addr, state, root }
}

/// Default test server: one well-behaved mock engine, queue depth 8.
pub async fn start_test_server() -> (TestServer, EngineProbe) {
    let engine = MockEngine::new("mock");
    let probe = engine.probe();
    let server = start_server_with(vec![Box::new(engine)], 8, Duration::from_secs(5)).await;
    (server, probe)
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}

pub fn tts_body(text: &str, character: &str) -> serde_json::Value {
    serde_json::json!({
        "text": text,
        "character": character,
        "text_language": "英文",
        "format": "wav",
    })
}
