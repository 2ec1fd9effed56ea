//! Audio primitives for the telephony pipeline.
//!
//! - [`mulaw`]: G.711 µ-law encoder (PCM16 → 8-bit codes)
//! - [`sniff`]: magic-byte format detection
//! - [`transcode`]: ffmpeg-backed container/rate conversion
//!
//! Every buffer handed between stages is an [`AudioBuffer`]: immutable bytes plus
//! a single [`AudioFormat`] tag. Formats are never mixed inside one buffer.

pub mod mulaw;
pub mod sniff;
pub mod transcode;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

pub use mulaw::{CodecError, encode, encode_sample, encode_samples, is_likely_silent};
pub use sniff::{DetectedFormat, detect};
pub use transcode::{
    SourceSpec, TranscodeError, TranscodeResult, Transcoder, TranscoderConfig, TranscoderMode,
    create_transcoder,
};

/// Sample rate of the telephony transport (G.711).
pub const TELEPHONY_SAMPLE_RATE: u32 = 8000;

/// Channel count of the telephony transport.
pub const TELEPHONY_CHANNELS: u16 = 1;

// =============================================================================
// Audio Format
// =============================================================================

/// Format tag carried by every audio buffer in the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AudioFormat {
    /// MPEG audio stream (ID3 tag or bare frames)
    #[serde(rename = "mp3")]
    Mp3,
    /// RIFF/WAVE container
    #[serde(rename = "wav")]
    Wav,
    /// Headerless 16-bit signed little-endian PCM
    #[serde(rename = "pcm_s16le")]
    PcmS16le,
    /// Headerless 8-bit G.711 µ-law, 8000 Hz mono
    #[serde(rename = "ulaw_8k")]
    Ulaw8k,
}

impl AudioFormat {
    #[inline]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mp3 => "mp3",
            Self::Wav => "wav",
            Self::PcmS16le => "pcm_s16le",
            Self::Ulaw8k => "ulaw_8k",
        }
    }

    /// MIME type used when the buffer is served over HTTP.
    #[inline]
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Mp3 => "audio/mpeg",
            Self::Wav => "audio/wav",
            Self::PcmS16le => "audio/pcm",
            Self::Ulaw8k => "audio/basic",
        }
    }

    /// Conventional file extension, used for transcoder temp files.
    #[inline]
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Mp3 => "mp3",
            Self::Wav => "wav",
            Self::PcmS16le => "pcm",
            Self::Ulaw8k => "ulaw",
        }
    }

    /// True for formats without a container header.
    #[inline]
    pub fn is_headerless(&self) -> bool {
        matches!(self, Self::PcmS16le | Self::Ulaw8k)
    }

    /// Map an HTTP `Content-Type` value to a format.
    ///
    /// Parameters after `;` are ignored. Unknown types return `None`.
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        let mime = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        match mime.as_str() {
            "audio/mpeg" | "audio/mp3" | "audio/mpeg3" => Some(Self::Mp3),
            "audio/wav" | "audio/x-wav" | "audio/wave" | "audio/vnd.wave" => Some(Self::Wav),
            "audio/pcm" | "audio/l16" | "audio/raw" => Some(Self::PcmS16le),
            "audio/basic" | "audio/mulaw" | "audio/x-mulaw" | "audio/ulaw" => Some(Self::Ulaw8k),
            _ => None,
        }
    }
}

impl std::fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// Audio Buffer
// =============================================================================

/// Immutable audio bytes tagged with exactly one format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioBuffer {
    data: Bytes,
    format: AudioFormat,
}

impl AudioBuffer {
    pub fn new(data: impl Into<Bytes>, format: AudioFormat) -> Self {
        Self {
            data: data.into(),
            format,
        }
    }

    #[inline]
    pub fn format(&self) -> AudioFormat {
        self.format
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Cheap clone of the underlying bytes.
    pub fn bytes(&self) -> Bytes {
        self.data.clone()
    }

    pub fn into_bytes(self) -> Bytes {
        self.data
    }

    /// Playback duration in milliseconds, when it can be derived from the format.
    ///
    /// Only µ-law buffers have a fixed byte rate (8000 bytes per second).
    pub fn duration_ms(&self) -> Option<u64> {
        match self.format {
            AudioFormat::Ulaw8k => Some(self.data.len() as u64 * 1000 / TELEPHONY_SAMPLE_RATE as u64),
            _ => None,
        }
    }
}
