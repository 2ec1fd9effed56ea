//! Sarvam AI TTS Configuration
//!
//! Request options for Sarvam's `bulbul` text-to-speech models.

use serde::{Deserialize, Serialize};

use crate::core::audio::AudioFormat;
use crate::core::tts::speakers::{DEFAULT_SARVAM_SPEAKER, DEFAULT_SPEAKER_MODEL};

/// Default API origin.
pub const SARVAM_BASE_URL: &str = "https://api.sarvam.ai";

/// Language used when the request carries none.
pub const SARVAM_DEFAULT_LANGUAGE: &str = "en-IN";

/// Per-request character limit of `bulbul:v2`.
pub const SARVAM_MAX_TEXT_CHARS: usize = 1500;

/// Sample rates accepted by `speech_sample_rate`.
pub const SARVAM_SAMPLE_RATES: &[u32] = &[8000, 16000, 22050, 24000, 44100, 48000];

/// Language codes accepted by `target_language_code`.
pub const SARVAM_LANGUAGES: &[&str] = &[
    "bn-IN", "en-IN", "gu-IN", "hi-IN", "kn-IN", "ml-IN", "mr-IN", "od-IN", "pa-IN", "ta-IN",
    "te-IN",
];

// =============================================================================
// Output Codec
// =============================================================================

/// Values accepted by `output_audio_codec`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SarvamCodec {
    /// RIFF/WAVE (the API default)
    #[default]
    Wav,
    Mp3,
    /// Raw G.711 µ-law
    Mulaw,
    /// Raw 16-bit PCM
    Linear16,
}

impl SarvamCodec {
    #[inline]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Wav => "wav",
            Self::Mp3 => "mp3",
            Self::Mulaw => "mulaw",
            Self::Linear16 => "linear16",
        }
    }

    /// Parse from string, with fallback to default.
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "mp3" => Self::Mp3,
            "mulaw" | "ulaw" | "mu-law" => Self::Mulaw,
            "linear16" | "pcm" | "pcm16" => Self::Linear16,
            _ => Self::default(),
        }
    }

    /// Pipeline format the API promises for this codec.
    pub fn audio_format(&self) -> AudioFormat {
        match self {
            Self::Wav => AudioFormat::Wav,
            Self::Mp3 => AudioFormat::Mp3,
            Self::Mulaw => AudioFormat::Ulaw8k,
            Self::Linear16 => AudioFormat::PcmS16le,
        }
    }
}

impl std::fmt::Display for SarvamCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// Provider Configuration
// =============================================================================

/// Sarvam adapter configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SarvamConfig {
    #[serde(default, skip_serializing)]
    pub api_key: String,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_model")]
    pub model: String,

    /// Used when a request names no speaker
    #[serde(default = "default_speaker")]
    pub default_speaker: String,

    #[serde(default = "default_language")]
    pub default_language: String,

    /// -0.75 to 0.75
    #[serde(default)]
    pub pitch: f32,

    /// 0.3 to 3.0
    #[serde(default = "default_unit")]
    pub pace: f32,

    /// 0.1 to 3.0
    #[serde(default = "default_unit")]
    pub loudness: f32,

    /// Normalise numbers and mixed-script text before synthesis
    #[serde(default)]
    pub enable_preprocessing: bool,

    #[serde(default = "default_telephony_rate")]
    pub telephony_sample_rate: u32,

    #[serde(default = "default_preview_rate")]
    pub preview_sample_rate: u32,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_base_url() -> String {
    SARVAM_BASE_URL.to_string()
}

fn default_model() -> String {
    DEFAULT_SPEAKER_MODEL.to_string()
}

fn default_speaker() -> String {
    DEFAULT_SARVAM_SPEAKER.to_string()
}

fn default_language() -> String {
    SARVAM_DEFAULT_LANGUAGE.to_string()
}

fn default_unit() -> f32 {
    1.0
}

fn default_telephony_rate() -> u32 {
    8000
}

fn default_preview_rate() -> u32 {
    44100
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for SarvamConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_base_url(),
            model: default_model(),
            default_speaker: default_speaker(),
            default_language: default_language(),
            pitch: 0.0,
            pace: default_unit(),
            loudness: default_unit(),
            enable_preprocessing: false,
            telephony_sample_rate: default_telephony_rate(),
            preview_sample_rate: default_preview_rate(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl SarvamConfig {
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Default::default()
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.api_key.trim().is_empty() {
            return Err(
                "Sarvam API key is required. Set SARVAM_API_KEY environment variable.".to_string(),
            );
        }

        if !(-0.75..=0.75).contains(&self.pitch) {
            return Err(format!("pitch must be between -0.75 and 0.75, got {}", self.pitch));
        }
        if !(0.3..=3.0).contains(&self.pace) {
            return Err(format!("pace must be between 0.3 and 3.0, got {}", self.pace));
        }
        if !(0.1..=3.0).contains(&self.loudness) {
            return Err(format!(
                "loudness must be between 0.1 and 3.0, got {}",
                self.loudness
            ));
        }

        for rate in [self.telephony_sample_rate, self.preview_sample_rate] {
            if !SARVAM_SAMPLE_RATES.contains(&rate) {
                return Err(format!("Unsupported Sarvam sample rate: {rate}"));
            }
        }

        Ok(())
    }

    /// Synthesis endpoint.
    pub fn endpoint(&self) -> String {
        format!("{}/text-to-speech", self.base_url.trim_end_matches('/'))
    }
}

/// Normalise a locale tag to Sarvam's `xx-IN` form.
///
/// `hi`, `HI_in` and `hi-IN` all map to `hi-IN`. Unknown languages return `None`.
pub fn normalize_language(tag: &str) -> Option<&'static str> {
    let primary = tag.trim().split(['-', '_']).next()?.to_lowercase();
    SARVAM_LANGUAGES
        .iter()
        .copied()
        .find(|code| code.split('-').next() == Some(primary.as_str()))
}
