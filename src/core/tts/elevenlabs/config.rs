//! Configuration types for the ElevenLabs text-to-speech API.

use serde::{Deserialize, Serialize};

use crate::core::audio::AudioFormat;

/// Default API origin.
pub const ELEVENLABS_BASE_URL: &str = "https://api.elevenlabs.io";

/// Voice used when the caller supplies none ("Rachel").
pub const ELEVENLABS_DEFAULT_VOICE_ID: &str = "21m00Tcm4TlvDq8ikWAM";

/// Model used when none is configured.
pub const ELEVENLABS_DEFAULT_MODEL: &str = "eleven_multilingual_v2";

/// Per-request character limit enforced before calling the API.
pub const ELEVENLABS_MAX_TEXT_CHARS: usize = 5000;

// =============================================================================
// Output Formats
// =============================================================================

/// Values accepted by the `output_format` query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ElevenLabsOutputFormat {
    /// Raw µ-law 8 kHz, the telephony native format
    #[default]
    #[serde(rename = "ulaw_8000")]
    Ulaw8000,
    #[serde(rename = "pcm_16000")]
    Pcm16000,
    #[serde(rename = "pcm_22050")]
    Pcm22050,
    #[serde(rename = "pcm_24000")]
    Pcm24000,
    #[serde(rename = "pcm_44100")]
    Pcm44100,
    #[serde(rename = "mp3_22050_32")]
    Mp3_22050_32,
    /// Browser preview format
    #[serde(rename = "mp3_44100_128")]
    Mp3_44100_128,
}

impl ElevenLabsOutputFormat {
    #[inline]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ulaw8000 => "ulaw_8000",
            Self::Pcm16000 => "pcm_16000",
            Self::Pcm22050 => "pcm_22050",
            Self::Pcm24000 => "pcm_24000",
            Self::Pcm44100 => "pcm_44100",
            Self::Mp3_22050_32 => "mp3_22050_32",
            Self::Mp3_44100_128 => "mp3_44100_128",
        }
    }

    /// Parse from string, with fallback to default.
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "ulaw_8000" | "ulaw" | "mulaw" => Self::Ulaw8000,
            "pcm_16000" => Self::Pcm16000,
            "pcm_22050" => Self::Pcm22050,
            "pcm_24000" | "pcm" => Self::Pcm24000,
            "pcm_44100" => Self::Pcm44100,
            "mp3_22050_32" => Self::Mp3_22050_32,
            "mp3_44100_128" | "mp3" => Self::Mp3_44100_128,
            _ => Self::default(),
        }
    }

    /// Pipeline format the API promises for this parameter.
    pub fn audio_format(&self) -> AudioFormat {
        match self {
            Self::Ulaw8000 => AudioFormat::Ulaw8k,
            Self::Pcm16000 | Self::Pcm22050 | Self::Pcm24000 | Self::Pcm44100 => {
                AudioFormat::PcmS16le
            }
            Self::Mp3_22050_32 | Self::Mp3_44100_128 => AudioFormat::Mp3,
        }
    }

    pub fn sample_rate(&self) -> u32 {
        match self {
            Self::Ulaw8000 => 8000,
            Self::Pcm16000 => 16000,
            Self::Pcm22050 | Self::Mp3_22050_32 => 22050,
            Self::Pcm24000 => 24000,
            Self::Pcm44100 | Self::Mp3_44100_128 => 44100,
        }
    }

    /// `Accept` header matching the requested format.
    pub fn accept_header(&self) -> &'static str {
        match self.audio_format() {
            AudioFormat::Ulaw8k => "audio/basic",
            AudioFormat::PcmS16le => "audio/pcm",
            _ => "audio/mpeg",
        }
    }
}

impl std::fmt::Display for ElevenLabsOutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// Voice Settings
// =============================================================================

/// Voice tuning sent with every request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceSettings {
    /// Voice stability (0.0 to 1.0)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stability: Option<f32>,
    /// Similarity boost (0.0 to 1.0)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub similarity_boost: Option<f32>,
    /// Style strength (0.0 to 1.0)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_speaker_boost: Option<bool>,
    /// Speaking rate (0.7 to 1.2)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed: Option<f32>,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            stability: Some(0.5),
            similarity_boost: Some(0.75),
            style: Some(0.0),
            use_speaker_boost: Some(true),
            speed: Some(1.0),
        }
    }
}

impl VoiceSettings {
    /// Check ranges before they reach the API.
    pub fn validate(&self) -> Result<(), String> {
        let unit = [
            ("stability", self.stability),
            ("similarity_boost", self.similarity_boost),
            ("style", self.style),
        ];
        for (name, value) in unit {
            if let Some(v) = value
                && !(0.0..=1.0).contains(&v)
            {
                return Err(format!("{name} must be between 0.0 and 1.0, got {v}"));
            }
        }

        if let Some(speed) = self.speed
            && !(0.7..=1.2).contains(&speed)
        {
            return Err(format!("speed must be between 0.7 and 1.2, got {speed}"));
        }

        Ok(())
    }
}

// =============================================================================
// Provider Configuration
// =============================================================================

/// ElevenLabs adapter configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElevenLabsConfig {
    #[serde(default, skip_serializing)]
    pub api_key: String,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_model_id")]
    pub model_id: String,

    #[serde(default = "default_voice_id")]
    pub default_voice_id: String,

    #[serde(default)]
    pub voice_settings: VoiceSettings,

    /// Requested for telephony targets
    #[serde(default)]
    pub telephony_format: ElevenLabsOutputFormat,

    /// Requested for preview targets
    #[serde(default = "default_preview_format")]
    pub preview_format: ElevenLabsOutputFormat,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_base_url() -> String {
    ELEVENLABS_BASE_URL.to_string()
}

fn default_model_id() -> String {
    ELEVENLABS_DEFAULT_MODEL.to_string()
}

fn default_voice_id() -> String {
    ELEVENLABS_DEFAULT_VOICE_ID.to_string()
}

fn default_preview_format() -> ElevenLabsOutputFormat {
    ElevenLabsOutputFormat::Mp3_44100_128
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for ElevenLabsConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_base_url(),
            model_id: default_model_id(),
            default_voice_id: default_voice_id(),
            voice_settings: VoiceSettings::default(),
            telephony_format: ElevenLabsOutputFormat::default(),
            preview_format: default_preview_format(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl ElevenLabsConfig {
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
                "ElevenLabs API key is required. Set ELEVENLABS_API_KEY environment variable."
                    .to_string(),
            );
        }

        if self.default_voice_id.trim().is_empty() {
            return Err("ElevenLabs default voice id must not be empty".to_string());
        }

        self.voice_settings.validate()
    }

    /// Synthesis endpoint for `voice_id`.
    pub fn endpoint(&self, voice_id: &str) -> String {
        format!(
            "{}/v1/text-to-speech/{}",
            self.base_url.trim_end_matches('/'),
            voice_id
        )
    }

    /// Only the v2.5 turbo/flash models accept `language_code`; others reject it.
    pub fn supports_language_code(&self) -> bool {
        self.model_id.contains("turbo_v2_5") || self.model_id.contains("flash_v2_5")
    }
}
