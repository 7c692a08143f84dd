use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;

// ── Error Types ────────────────────────────────────────

#[derive(Debug, Clone, Error)]
pub enum TtsError {
    #[error("Synthesis failed: {0}")]
    SynthesisFailed(String),
    #[error("Synthesis timed out: {0}")]
    Timeout(String),
    #[error("Engine busy: {0}")]
    Busy(String),
    #[error("Engine unavailable: {0}")]
    Unavailable(String),
}

// ── Synthesis Inputs / Outputs ─────────────────────────

/// Inputs for one voice-cloning synthesis call.
#[derive(Debug, Clone)]
pub struct SynthesisSpec {
    /// Reference audio clip conditioning the voice.
    pub ref_audio: PathBuf,
    /// Transcript of the reference clip.
    pub ref_text: String,
    /// Text to synthesize.
    pub text: String,
    pub speed: f32,
    pub top_k: f32,
    pub top_p: f32,
    pub temperature: f32,
    pub batch_size: u32,
    /// Long silences are always stripped from generated audio; this is a
    /// fixed directive, not a request parameter.
    pub remove_silence: bool,
}

/// A synthesized waveform. Consumed immediately by the output encoder,
/// never persisted.
#[derive(Debug, Clone)]
pub struct SynthesisResult {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl SynthesisResult {
    pub fn duration_secs(&self) -> f32 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f32 / self.sample_rate as f32
    }
}

// ── Engine Trait ───────────────────────────────────────

/// An opaque voice-cloning capability: reference audio + reference text +
/// target text in, waveform + sample rate out.
///
/// Implementations are NOT assumed safe for concurrent invocation; callers
/// go through [`crate::tts::pool::EnginePool`], which serializes access to
/// each instance.
#[async_trait]
pub trait SynthesisEngine: Send + Sync {
    /// Identifier used in logs and error messages.
    fn id(&self) -> String;

    /// Check if the engine is currently reachable / operational.
    async fn is_available(&self) -> bool;

    /// Produce a waveform for the given spec.
    async fn synthesize(&self, spec: &SynthesisSpec) -> Result<SynthesisResult, TtsError>;
}
