//! Container and sample-rate conversion through an external ffmpeg process.
//!
//! The pipeline never decodes MP3/WAV in-process. Instead a [`Transcoder`]
//! hands the bytes to ffmpeg and reads the converted result back. Two
//! implementations share the same argument builder ([`FfmpegArgs`]):
//!
//! - [`TempFileTranscoder`]: input/output go through a per-call temporary
//!   directory named with a unique token. The directory is removed on every
//!   exit path when it goes out of scope.
//! - [`PipeTranscoder`]: input is streamed on stdin and output read from
//!   stdout; no filesystem artifacts.
//!
//! Both run the child with `kill_on_drop`, so hitting the timeout kills the
//! process before the error is returned.
//!
//! # Example
//!
//! ```rust,ignore
//! use callvoice_tts::core::audio::{AudioFormat, SourceSpec, TranscoderConfig, create_transcoder};
//!
//! let transcoder = create_transcoder(&TranscoderConfig::default());
//! let pcm = transcoder
//!     .to_pcm(&mp3_bytes, SourceSpec::new(AudioFormat::Mp3), 8000, 1)
//!     .await?;
//! ```

mod ffmpeg;
mod pipe;
mod temp_file;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use ffmpeg::FfmpegArgs;
pub use pipe::PipeTranscoder;
pub use temp_file::TempFileTranscoder;

use super::{AudioFormat, TELEPHONY_SAMPLE_RATE};

/// Subprocess deadline used when none is configured.
pub const DEFAULT_TRANSCODE_TIMEOUT: Duration = Duration::from_secs(30);

/// Rate assumed for headerless PCM whose rate nobody declared.
///
/// The vendors this pipeline talks to emit 24 kHz PCM by default. This is a
/// policy, not something derivable from the bytes.
pub const DEFAULT_RAW_PCM_SAMPLE_RATE: u32 = 24000;

/// Output rate of preview MP3s.
pub const DEFAULT_PREVIEW_SAMPLE_RATE: u32 = 44100;

/// Output bitrate of preview MP3s.
pub const DEFAULT_MP3_BITRATE_KBPS: u32 = 128;

/// Default ffmpeg binary, resolved through `PATH`.
pub const DEFAULT_FFMPEG_PATH: &str = "ffmpeg";

/// Transcoder errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TranscodeError {
    /// Non-zero exit, empty output, or a setup failure (temp dir, spawn, I/O).
    #[error("Transcode failed: {0}")]
    Failed(String),

    /// The subprocess exceeded its deadline and was killed.
    #[error("Transcode timed out after {0:?}")]
    Timeout(Duration),
}

/// Result type for transcoder operations
pub type TranscodeResult<T> = Result<T, TranscodeError>;

// =============================================================================
// Source Description
// =============================================================================

/// What the transcoder is being fed.
///
/// `sample_rate` only matters for headerless formats; containers carry their
/// own rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceSpec {
    pub format: AudioFormat,
    pub sample_rate: Option<u32>,
}

impl SourceSpec {
    pub fn new(format: AudioFormat) -> Self {
        Self {
            format,
            sample_rate: None,
        }
    }

    pub fn with_sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = Some(sample_rate);
        self
    }

    /// Input rate ffmpeg must be told for this source, if any.
    ///
    /// Raw PCM falls back to `raw_pcm_default`; µ-law falls back to 8 kHz.
    pub fn input_rate(&self, raw_pcm_default: u32) -> Option<u32> {
        match self.format {
            AudioFormat::PcmS16le => Some(self.sample_rate.unwrap_or(raw_pcm_default)),
            AudioFormat::Ulaw8k => Some(self.sample_rate.unwrap_or(TELEPHONY_SAMPLE_RATE)),
            AudioFormat::Mp3 | AudioFormat::Wav => None,
        }
    }
}

// =============================================================================
// Transcoder Trait
// =============================================================================

/// Converts audio between formats.
///
/// Implementations must be safe to call concurrently; every call owns its own
/// subprocess and (if any) its own temporary files.
#[async_trait]
pub trait Transcoder: Send + Sync {
    /// Decode `input` and resample it to 16-bit little-endian PCM.
    async fn to_pcm(
        &self,
        input: &[u8],
        source: SourceSpec,
        target_rate: u32,
        target_channels: u16,
    ) -> TranscodeResult<Vec<u8>>;

    /// Re-encode `input` as an MP3 stream for browser playback.
    async fn to_mp3(&self, input: &[u8], source: SourceSpec) -> TranscodeResult<Vec<u8>>;

    /// Short identifier used in logs.
    fn name(&self) -> &'static str;
}

// =============================================================================
// Configuration
// =============================================================================

/// How the transcoder exchanges data with ffmpeg.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TranscoderMode {
    /// Temporary input/output files
    #[default]
    TempFile,
    /// stdin/stdout pipes
    Pipe,
}

impl TranscoderMode {
    #[inline]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TempFile => "temp_file",
            Self::Pipe => "pipe",
        }
    }
}

impl std::str::FromStr for TranscoderMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "temp_file" | "tempfile" | "temp-file" | "file" => Ok(Self::TempFile),
            "pipe" | "stdio" => Ok(Self::Pipe),
            other => Err(format!(
                "Invalid transcoder mode: {other}. Use temp_file or pipe"
            )),
        }
    }
}

impl std::fmt::Display for TranscoderMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Transcoder settings.
#[derive(Debug, Clone, PartialEq)]
pub struct TranscoderConfig {
    pub mode: TranscoderMode,
    /// ffmpeg binary (bare name is resolved through `PATH`)
    pub ffmpeg_path: PathBuf,
    /// Hard deadline per subprocess
    pub timeout: Duration,
    /// Assumed rate for headerless PCM without a declared rate
    pub raw_pcm_sample_rate: u32,
    /// Parent directory for per-call temp dirs (system temp dir when `None`)
    pub temp_dir: Option<PathBuf>,
    pub mp3_bitrate_kbps: u32,
    pub preview_sample_rate: u32,
}

impl Default for TranscoderConfig {
    fn default() -> Self {
        Self {
            mode: TranscoderMode::default(),
            ffmpeg_path: PathBuf::from(DEFAULT_FFMPEG_PATH),
            timeout: DEFAULT_TRANSCODE_TIMEOUT,
            raw_pcm_sample_rate: DEFAULT_RAW_PCM_SAMPLE_RATE,
            temp_dir: None,
            mp3_bitrate_kbps: DEFAULT_MP3_BITRATE_KBPS,
            preview_sample_rate: DEFAULT_PREVIEW_SAMPLE_RATE,
        }
    }
}

/// Build the transcoder selected by `config.mode`.
pub fn create_transcoder(config: &TranscoderConfig) -> Arc<dyn Transcoder> {
    match config.mode {
        TranscoderMode::TempFile => Arc::new(TempFileTranscoder::new(config.clone())),
        TranscoderMode::Pipe => Arc::new(PipeTranscoder::new(config.clone())),
    }
}
