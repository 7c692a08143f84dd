use super::error::ApiError;
use crate::audio::AudioFormat;
use crate::characters::CharacterProfile;
use crate::config::ParamsConfig;
use crate::tts::SynthesisSpec;
use serde::Deserialize;

// ── Wire Model ─────────────────────────────────────────

/// One synthesis request, from either ingress shape: a JSON body on POST or
/// a query string on GET (the query deserializer percent-decodes values).
/// Immutable once constructed; validation never mutates it.
///
/// `emotion`, `save_temp` and `stream` are accepted for wire compatibility
/// but do not alter behavior: every character exposes the single "default"
/// style and responses are always whole files.
#[derive(Debug, Clone, Deserialize)]
pub struct TtsRequest {
    #[serde(default)]
    pub text: String,
    #[serde(default = "default_character")]
    pub character: String,
    #[serde(default = "default_style")]
    pub emotion: String,
    #[serde(default = "default_language")]
    pub text_language: String,
    #[serde(default = "default_format")]
    pub format: String,
    #[serde(default = "default_top_k")]
    pub top_k: f32,
    #[serde(default = "default_top_p")]
    pub top_p: f32,
    #[serde(default = "default_batch_size")]
    pub batch_size: u32,
    #[serde(default = "default_speed")]
    pub speed: f32,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default)]
    pub save_temp: bool,
    #[serde(default)]
    pub stream: bool,
}

fn default_character() -> String {
    "default".to_string()
}
fn default_style() -> String {
    "default".to_string()
}
fn default_language() -> String {
    "多语种混合".to_string()
}
fn default_format() -> String {
    "wav".to_string()
}
fn default_top_k() -> f32 {
    50.0
}
fn default_top_p() -> f32 {
    0.95
}
fn default_batch_size() -> u32 {
    1
}
fn default_speed() -> f32 {
    1.0
}
fn default_temperature() -> f32 {
    0.7
}

// ── Validation ─────────────────────────────────────────

impl TtsRequest {
    /// Check the request against the configured supported sets. Runs before
    /// any synthesis work, including the output format check.
    pub fn validate(&self, config: &ParamsConfig) -> Result<AudioFormat, ApiError> {
        if self.text.is_empty() {
            return Err(ApiError::BadRequest("Text is required".to_string()));
        }
        if !config.supports_language(&self.text_language) {
            return Err(ApiError::BadRequest(format!(
                "Unsupported language: {}",
                self.text_language
            )));
        }
        if !config.supports_format(&self.format) {
            return Err(ApiError::BadRequest(format!(
                "Unsupported format: {}",
                self.format
            )));
        }
        AudioFormat::from_name(&self.format).ok_or_else(|| {
            ApiError::BadRequest(format!("Unsupported format: {}", self.format))
        })
    }

    /// Combine the request with a resolved character into engine inputs.
    pub fn to_spec(&self, profile: CharacterProfile) -> SynthesisSpec {
        SynthesisSpec {
            ref_audio: profile.ref_audio,
            ref_text: profile.ref_text,
            text: self.text.clone(),
            speed: self.speed,
            top_k: self.top_k,
            top_p: self.top_p,
            temperature: self.temperature,
            batch_size: self.batch_size,
            remove_silence: true,
        }
    }
}
