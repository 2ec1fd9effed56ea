//! # Speech Provider Base Types
//!
//! Shared vocabulary for the provider adapters and the orchestrator:
//!
//! - [`ProviderKind`] / [`ProviderChoice`]: which vendor serves a request
//! - [`TargetFormat`]: what the caller needs back (telephony µ-law or preview MP3)
//! - [`ProviderRequest`] / [`ProviderAudio`]: adapter input and raw output
//! - [`SpeechProvider`]: the trait every adapter implements
//! - [`TTSError`]: the error type for everything above the transcoder
//!
//! Adapters report what they *observed* about the payload (content type,
//! declared format) but the orchestrator always sniffs the bytes itself.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::core::audio::{AudioFormat, CodecError, TranscodeError};

// =============================================================================
// Provider Identity
// =============================================================================

/// A concrete speech vendor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    ElevenLabs,
    Sarvam,
}

impl ProviderKind {
    #[inline]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ElevenLabs => "elevenlabs",
            Self::Sarvam => "sarvam",
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Provider requested by the caller. `Auto` resolves through the speaker table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderChoice {
    #[default]
    Auto,
    ElevenLabs,
    Sarvam,
}

impl ProviderChoice {
    #[inline]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::ElevenLabs => "elevenlabs",
            Self::Sarvam => "sarvam",
        }
    }
}

impl std::str::FromStr for ProviderChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "auto" => Ok(Self::Auto),
            "elevenlabs" | "eleven_labs" | "eleven-labs" | "11labs" => Ok(Self::ElevenLabs),
            "sarvam" | "sarvam-ai" | "sarvam_ai" => Ok(Self::Sarvam),
            other => Err(format!(
                "Unsupported TTS provider: {other}. Supported providers: auto, elevenlabs, sarvam"
            )),
        }
    }
}

impl From<ProviderKind> for ProviderChoice {
    fn from(kind: ProviderKind) -> Self {
        match kind {
            ProviderKind::ElevenLabs => Self::ElevenLabs,
            ProviderKind::Sarvam => Self::Sarvam,
        }
    }
}

impl std::fmt::Display for ProviderChoice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// Target Format
// =============================================================================

/// Output contract declared by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetFormat {
    /// Raw G.711 µ-law, 8000 Hz, mono, no container
    #[serde(rename = "telephony_ulaw_8k")]
    TelephonyUlaw8k,
    /// Browser-playable MP3 stream
    #[serde(rename = "preview_mp3")]
    PreviewMp3,
}

impl TargetFormat {
    #[inline]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TelephonyUlaw8k => "telephony_ulaw_8k",
            Self::PreviewMp3 => "preview_mp3",
        }
    }

    /// Format tag of the buffers produced for this target.
    #[inline]
    pub fn audio_format(&self) -> AudioFormat {
        match self {
            Self::TelephonyUlaw8k => AudioFormat::Ulaw8k,
            Self::PreviewMp3 => AudioFormat::Mp3,
        }
    }
}

impl std::str::FromStr for TargetFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "telephony" | "telephony_ulaw_8k" | "ulaw" | "ulaw_8k" | "mulaw" => {
                Ok(Self::TelephonyUlaw8k)
            }
            "preview" | "preview_mp3" | "mp3" => Ok(Self::PreviewMp3),
            other => Err(format!(
                "Invalid target format: {other}. Use telephony or preview"
            )),
        }
    }
}

impl std::fmt::Display for TargetFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// Adapter Input / Output
// =============================================================================

/// What the orchestrator asks an adapter for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderRequest {
    pub text: String,
    /// Voice id (ElevenLabs) or speaker name (Sarvam). Adapter default when `None`.
    pub voice: Option<String>,
    /// Locale tag such as `hi-IN`
    pub language: Option<String>,
    pub target: TargetFormat,
}

impl ProviderRequest {
    pub fn new(text: impl Into<String>, target: TargetFormat) -> Self {
        Self {
            text: text.into(),
            voice: None,
            language: None,
            target,
        }
    }

    pub fn with_voice(mut self, voice: impl Into<String>) -> Self {
        self.voice = Some(voice.into());
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }
}

/// Raw vendor output plus whatever the vendor told us about it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderAudio {
    pub data: Bytes,
    /// Format the adapter believes the payload is in, if it can tell
    pub declared_format: Option<AudioFormat>,
    /// HTTP `Content-Type` of the response, if any
    pub content_type: Option<String>,
    /// Rate of headerless payloads, when the vendor declared one
    pub sample_rate: Option<u32>,
    /// The vendor contract says this payload is raw µ-law
    pub guarantees_ulaw: bool,
}

impl ProviderAudio {
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self {
            data: data.into(),
            declared_format: None,
            content_type: None,
            sample_rate: None,
            guarantees_ulaw: false,
        }
    }

    /// True when the provider vouches for raw µ-law, by declaration or contract.
    #[inline]
    pub fn confirms_ulaw(&self) -> bool {
        self.guarantees_ulaw || self.declared_format == Some(AudioFormat::Ulaw8k)
    }
}

// =============================================================================
// Errors
// =============================================================================

/// TTS pipeline error types
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TTSError {
    #[error("Invalid configuration: {0}")]
    ConfigurationError(String),

    #[error("Provider error {status}: {body}")]
    ProviderError { status: u16, body: String },

    #[error("No audio returned: {0}")]
    NoAudioReturned(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Unrecognized audio: {0}")]
    UnrecognizedAudio(String),

    #[error(transparent)]
    Transcode(#[from] TranscodeError),

    #[error(transparent)]
    Codec(#[from] CodecError),
}

/// Result type for TTS operations
pub type TTSResult<T> = Result<T, TTSError>;

// =============================================================================
// Provider Trait
// =============================================================================

/// A speech vendor adapter.
///
/// `synthesize` performs exactly one vendor call. No retries.
#[async_trait]
pub trait SpeechProvider: Send + Sync {
    fn kind(&self) -> ProviderKind;

    /// Request audio in the vendor's closest native match for `request.target`.
    async fn synthesize(&self, request: &ProviderRequest) -> TTSResult<ProviderAudio>;

    /// Static description of the provider for diagnostics.
    fn get_provider_info(&self) -> serde_json::Value;
}

// =============================================================================
// HTTP Helpers
// =============================================================================

/// Build the pooled HTTP client an adapter reuses for every request.
pub(crate) fn build_http_client(timeout: Duration) -> TTSResult<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .pool_idle_timeout(Duration::from_secs(90))
        .build()
        .map_err(|e| TTSError::ConfigurationError(format!("Failed to build HTTP client: {e}")))
}

/// Map a transport failure to a network error.
pub(crate) fn network_error(provider: ProviderKind, e: reqwest::Error) -> TTSError {
    if e.is_timeout() {
        TTSError::NetworkError(format!("{provider} request timed out: {e}"))
    } else {
        TTSError::NetworkError(format!("{provider} request failed: {e}"))
    }
}

/// Turn a non-2xx response into a [`TTSError::ProviderError`], keeping the body.
pub(crate) async fn error_from_response(response: reqwest::Response) -> TTSError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    TTSError::ProviderError { status, body }
}

/// Content type header of a response, when present and valid UTF-8.
pub(crate) fn content_type_of(response: &reqwest::Response) -> Option<String> {
    response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}
