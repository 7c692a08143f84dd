//! voxserve — character voice cloning over HTTP.
//!
//! A request names a character and carries target text; the server resolves
//! the character to a reference audio/text pair under the character root,
//! drives a shared cloning engine through an exclusive-access pool, encodes
//! the waveform into the requested container, and streams the file back,
//! removing the transient artifact once delivered.

pub mod audio;
pub mod characters;
pub mod config;
pub mod server;
pub mod tts;
