use super::interface::{SynthesisEngine, SynthesisResult, SynthesisSpec, TtsError};
use crate::audio::codec;
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tracing::info;

/// Local F5-family cloning engine — drives an F5-TTS inference server
/// colocated with this process.
///
/// Endpoints used:
///   POST /synthesize        — cloning synthesis, returns WAV bytes
///   GET  /load_checkpoint   — switch model weights (sent once at startup)
///   GET  /health            — readiness probe
pub struct LocalF5Engine {
    client: Client,
    engine_id: String,
    base_url: String,
    endpoint: String,
    checkpoint: Option<String>,
    timeout: Duration,
}

#[derive(Serialize)]
struct SidecarRequest<'a> {
    ref_audio_path: &'a str,
    ref_text: &'a str,
    text: &'a str,
    speed: f32,
    top_k: f32,
    top_p: f32,
    temperature: f32,
    batch_size: u32,
    remove_silence: bool,
}

impl LocalF5Engine {
    pub fn new(base_url: &str, checkpoint: Option<String>, timeout: Duration) -> Self {
        let base_url = base_url.trim_end_matches('/').to_string();
        Self {
            client: Client::new(),
            engine_id: "local_f5".to_string(),
            endpoint: format!("{}/synthesize", base_url),
            base_url,
            checkpoint: checkpoint.filter(|c| !c.is_empty()),
            timeout,
        }
    }

    /// Direct the sidecar to load the configured checkpoint. Called once at
    /// startup; a missing checkpoint path means the engine keeps its
    /// built-in default weights.
    pub async fn load_checkpoint(&self) -> Result<(), TtsError> {
        let Some(ckpt) = &self.checkpoint else {
            info!("[Engine] No checkpoint configured, using engine default weights");
            return Ok(());
        };

        let url = format!("{}/load_checkpoint", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("ckpt_path", ckpt.as_str())])
            .timeout(Duration::from_secs(120))
            .send()
            .await
            .map_err(|e| TtsError::Unavailable(format!("checkpoint load request failed: {}", e)))?;

        if !response.status().is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(TtsError::Unavailable(format!(
                "engine rejected checkpoint {}: {}",
                ckpt, detail
            )));
        }
        info!("[Engine] Loaded checkpoint {}", ckpt);
        Ok(())
    }
}

#[async_trait]
impl SynthesisEngine for LocalF5Engine {
    fn id(&self) -> String {
        self.engine_id.clone()
    }

    async fn is_available(&self) -> bool {
        let url = format!("{}/health", self.base_url);
        match self
            .client
            .get(&url)
            .timeout(Duration::from_secs(3))
            .send()
            .await
        {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
    }

    async fn synthesize(&self, spec: &SynthesisSpec) -> Result<SynthesisResult, TtsError> {
        let body = SidecarRequest {
            ref_audio_path: spec.ref_audio.to_str().ok_or_else(|| {
                TtsError::SynthesisFailed("reference audio path is not valid UTF-8".to_string())
            })?,
            ref_text: &spec.ref_text,
            text: &spec.text,
            speed: spec.speed,
            top_k: spec.top_k,
            top_p: spec.top_p,
            temperature: spec.temperature,
            batch_size: spec.batch_size,
            remove_silence: spec.remove_silence,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TtsError::Timeout(format!("engine call exceeded {:?}", self.timeout))
                } else {
                    TtsError::SynthesisFailed(format!("engine request failed: {}", e))
                }
            })?;

        if !response.status().is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(TtsError::SynthesisFailed(format!(
                "engine error: {}",
                detail
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| TtsError::SynthesisFailed(format!("engine response read error: {}", e)))?;

        let (samples, sample_rate) = codec::decode_wav(&bytes)
            .map_err(|e| TtsError::SynthesisFailed(format!("engine returned malformed audio: {}", e)))?;

        Ok(SynthesisResult {
            samples,
            sample_rate,
        })
    }
}
