//! Waveform encoding and decoding.
//!
//! The engine hands back mono float samples plus a sample rate; this module
//! turns them into the delivery container (wav via hound, mp3 via lame,
//! ogg/opus via audiopus + ogg muxing) and decodes the WAV payloads the
//! engine emits on its wire.

use super::AudioFormat;
use std::io::Cursor;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),
    #[error("MP3 encoder setup failed: {0}")]
    Mp3Setup(String),
    #[error("MP3 encode failed: {0}")]
    Mp3Encode(String),
    #[error("Opus encode failed: {0}")]
    Opus(String),
    #[error("OGG container write failed: {0}")]
    Ogg(#[from] std::io::Error),
    #[error("sample rate {rate} Hz not supported for {format} output")]
    UnsupportedRate { format: &'static str, rate: u32 },
    #[error("expected mono audio, got {0} channels")]
    NotMono(u16),
}

/// Encode mono samples into the requested container.
pub fn encode(samples: &[f32], sample_rate: u32, format: AudioFormat) -> Result<Vec<u8>, CodecError> {
    match format {
        AudioFormat::Wav => encode_wav(samples, sample_rate),
        AudioFormat::Mp3 => encode_mp3(samples, sample_rate),
        AudioFormat::Ogg => encode_ogg(samples, sample_rate),
    }
}

/// Decode a mono WAV payload into float samples plus its sample rate.
/// Integer formats are rescaled to [-1.0, 1.0].
pub fn decode_wav(bytes: &[u8]) -> Result<(Vec<f32>, u32), CodecError> {
    let reader = hound::WavReader::new(Cursor::new(bytes))?;
    let spec = reader.spec();
    if spec.channels != 1 {
        return Err(CodecError::NotMono(spec.channels));
    }

    let samples = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<Result<Vec<_>, _>>()?,
        hound::SampleFormat::Int => {
            let scale = (1u32 << (spec.bits_per_sample - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<Result<Vec<_>, _>>()?
        }
    };
    Ok((samples, spec.sample_rate))
}

// ── WAV ────────────────────────────────────────────────

pub fn encode_wav(samples: &[f32], sample_rate: u32) -> Result<Vec<u8>, CodecError> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec)?;
        for sample in pcm_to_i16(samples) {
            writer.write_sample(sample)?;
        }
        writer.finalize()?;
    }
    Ok(cursor.into_inner())
}

// ── MP3 ────────────────────────────────────────────────

fn encode_mp3(samples: &[f32], sample_rate: u32) -> Result<Vec<u8>, CodecError> {
    use mp3lame_encoder::{Bitrate, Builder, FlushNoGap, MonoPcm, Quality};

    let mut builder =
        Builder::new().ok_or_else(|| CodecError::Mp3Setup("allocation failed".to_string()))?;
    builder
        .set_num_channels(1)
        .map_err(|e| CodecError::Mp3Setup(format!("{:?}", e)))?;
    builder
        .set_sample_rate(sample_rate)
        .map_err(|e| CodecError::Mp3Setup(format!("{:?}", e)))?;
    builder
        .set_brate(Bitrate::Kbps160)
        .map_err(|e| CodecError::Mp3Setup(format!("{:?}", e)))?;
    builder
        .set_quality(Quality::Good)
        .map_err(|e| CodecError::Mp3Setup(format!("{:?}", e)))?;
    let mut encoder = builder
        .build()
        .map_err(|e| CodecError::Mp3Setup(format!("{:?}", e)))?;

    let pcm = pcm_to_i16(samples);
    let mut out = Vec::new();
    out.reserve(mp3lame_encoder::max_required_buffer_size(pcm.len()));
    encoder
        .encode_to_vec(MonoPcm(&pcm), &mut out)
        .map_err(|e| CodecError::Mp3Encode(format!("{:?}", e)))?;
    encoder
        .flush_to_vec::<FlushNoGap>(&mut out)
        .map_err(|e| CodecError::Mp3Encode(format!("{:?}", e)))?;
    Ok(out)
}

// ── OGG / Opus ─────────────────────────────────────────

fn encode_ogg(samples: &[f32], sample_rate: u32) -> Result<Vec<u8>, CodecError> {
    use audiopus::coder::Encoder;
    use audiopus::{Application, Channels, SampleRate};
    use ogg::writing::{PacketWriteEndInfo, PacketWriter};

    let opus_rate = match sample_rate {
        8000 => SampleRate::Hz8000,
        12000 => SampleRate::Hz12000,
        16000 => SampleRate::Hz16000,
        24000 => SampleRate::Hz24000,
        48000 => SampleRate::Hz48000,
        rate => {
            return Err(CodecError::UnsupportedRate {
                format: "ogg/opus",
                rate,
            })
        }
    };

    let mut encoder = Encoder::new(opus_rate, Channels::Mono, Application::Audio)
        .map_err(|e| CodecError::Opus(e.to_string()))?;

    // 20 ms frames; the final short frame is zero-padded to a full one.
    let frame_len = (sample_rate / 50) as usize;
    // Ogg granule positions count 48 kHz samples regardless of input rate.
    let granule_step = (48_000 / sample_rate) as u64 * frame_len as u64;

    let pcm = pcm_to_i16(samples);
    let mut packets: Vec<(Vec<u8>, u64)> = Vec::new();
    let mut granule = 0u64;
    let mut out_buf = vec![0u8; 4096];
    for chunk in pcm.chunks(frame_len) {
        let n = if chunk.len() == frame_len {
            encoder.encode(chunk, &mut out_buf)
        } else {
            let mut padded = chunk.to_vec();
            padded.resize(frame_len, 0);
            encoder.encode(&padded, &mut out_buf)
        }
        .map_err(|e| CodecError::Opus(e.to_string()))?;
        granule += granule_step;
        packets.push((out_buf[..n].to_vec(), granule));
    }

    let serial: u32 = 0x7673_7276;
    let mut bytes = Vec::new();
    {
        let mut writer = PacketWriter::new(&mut bytes);
        writer.write_packet(
            opus_head(sample_rate).into_boxed_slice(),
            serial,
            PacketWriteEndInfo::EndPage,
            0,
        )?;
        writer.write_packet(
            opus_tags().into_boxed_slice(),
            serial,
            PacketWriteEndInfo::EndPage,
            0,
        )?;
        let last = packets.len().saturating_sub(1);
        for (i, (packet, granule)) in packets.into_iter().enumerate() {
            let info = if i == last {
                PacketWriteEndInfo::EndStream
            } else {
                PacketWriteEndInfo::NormalPacket
            };
            writer.write_packet(packet.into_boxed_slice(), serial, info, granule)?;
        }
    }
    Ok(bytes)
}

/// Identification header per the ogg/opus framing spec.
fn opus_head(sample_rate: u32) -> Vec<u8> {
    let mut head = Vec::with_capacity(19);
    head.extend_from_slice(b"OpusHead");
    head.push(1); // version
    head.push(1); // channel count
    head.extend_from_slice(&0u16.to_le_bytes()); // pre-skip
    head.extend_from_slice(&sample_rate.to_le_bytes());
    head.extend_from_slice(&0i16.to_le_bytes()); // output gain
    head.push(0); // mapping family
    head
}

fn opus_tags() -> Vec<u8> {
    let vendor = env!("CARGO_PKG_NAME").as_bytes();
    let mut tags = Vec::with_capacity(8 + 4 + vendor.len() + 4);
    tags.extend_from_slice(b"OpusTags");
    tags.extend_from_slice(&(vendor.len() as u32).to_le_bytes());
    tags.extend_from_slice(vendor);
    tags.extend_from_slice(&0u32.to_le_bytes()); // no user comments
    tags
}

// ── Sample conversion ──────────────────────────────────

fn pcm_to_i16(samples: &[f32]) -> Vec<i16> {
    samples
        .iter()
        .map(|s| (s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16)
        .collect()
}
