//! Transient output artifacts.
//!
//! Every synthesis response is staged through a uniquely named file in the
//! cache directory, scoped to exactly one request/response cycle. Removal
//! rides on `Drop`, so the file is released exactly once whether the request
//! succeeds, fails after encoding, or is abandoned mid-delivery.

use super::{codec, AudioFormat, CodecError};
use crate::tts::SynthesisResult;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum MaterializeError {
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error("artifact write failed: {0}")]
    Io(#[from] io::Error),
}

/// Encoded audio staged on disk, deleted when dropped.
#[derive(Debug)]
pub struct TransientArtifact {
    path: PathBuf,
}

impl TransientArtifact {
    /// Stage `bytes` under a fresh uuid-based name inside `dir`.
    pub fn write(dir: &Path, format: AudioFormat, bytes: &[u8]) -> io::Result<Self> {
        let filename = format!("tts_{}.{}", Uuid::new_v4().simple(), format.extension());
        let path = dir.join(filename);
        std::fs::write(&path, bytes)?;
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn read(&self) -> io::Result<Vec<u8>> {
        tokio::fs::read(&self.path).await
    }
}

impl Drop for TransientArtifact {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            warn!(
                "[Artifact] Failed to remove {}: {}",
                self.path.display(),
                e
            );
        }
    }
}

/// Encode a synthesis result into `format` and stage it in `cache_dir`.
pub fn materialize(
    result: &SynthesisResult,
    format: AudioFormat,
    cache_dir: &Path,
) -> Result<TransientArtifact, MaterializeError> {
    let bytes = codec::encode(&result.samples, result.sample_rate, format)?;
    Ok(TransientArtifact::write(cache_dir, format, &bytes)?)
}
