//! Configuration module for the callvoice TTS pipeline
//!
//! This module handles pipeline configuration from various sources: .env files, YAML files,
//! and environment variables. Priority: YAML > ENV vars > .env values > defaults.
//!
//! # Modules
//! - `yaml`: YAML configuration file loading
//! - `env`: Environment variable loading
//! - `merge`: Merging YAML and environment configurations
//! - `validation`: Configuration validation logic
//! - `utils`: Utility functions for configuration parsing
//!
//! # Example
//! ```rust,no_run
//! use callvoice_tts::config::PipelineConfig;
//! use std::path::PathBuf;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Load from environment variables only
//! let config = PipelineConfig::from_env()?;
//!
//! // Load from YAML file with environment variable overrides
//! let config_path = PathBuf::from("config.yaml");
//! let config = PipelineConfig::from_file(&config_path)?;
//!
//! println!("Transcoding with {}", config.ffmpeg_path.display());
//! # Ok(())
//! # }
//! ```

use std::path::PathBuf;
use std::time::Duration;

mod env;
mod merge;
mod utils;
mod validation;
mod yaml;

use crate::core::audio::{TranscoderConfig, TranscoderMode, transcode};
use crate::core::tts::elevenlabs::{
    ELEVENLABS_BASE_URL, ELEVENLABS_DEFAULT_MODEL, ELEVENLABS_DEFAULT_VOICE_ID, ElevenLabsConfig,
};
use crate::core::tts::sarvam::{SARVAM_BASE_URL, SARVAM_DEFAULT_LANGUAGE, SarvamConfig};
use crate::core::tts::speakers::{
    DEFAULT_SARVAM_SPEAKER, DEFAULT_SARVAM_SPEAKERS, DEFAULT_SPEAKER_MODEL,
    DEFAULT_SPEAKER_TABLE_VERSION, SpeakerTable,
};

/// Default per-request HTTP timeout for vendor calls.
pub const DEFAULT_TTS_REQUEST_TIMEOUT_SECONDS: u64 = 30;

/// Pipeline configuration
///
/// Contains everything needed to build a `TtsOrchestrator`:
/// - Provider credentials and endpoints (ElevenLabs, Sarvam)
/// - The Sarvam speaker list used by `auto` provider selection
/// - Transcoder settings (ffmpeg binary, mode, timeouts, raw PCM assumption)
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    // ElevenLabs
    pub elevenlabs_api_key: Option<String>,
    pub elevenlabs_base_url: String,
    pub elevenlabs_model_id: String,
    pub elevenlabs_default_voice_id: String,

    // Sarvam
    pub sarvam_api_key: Option<String>,
    pub sarvam_base_url: String,
    pub sarvam_model: String,
    pub sarvam_default_language: String,
    pub sarvam_default_speaker: String,
    /// Speaker names routed to Sarvam under `auto` selection
    pub sarvam_speakers: Vec<String>,
    /// Let Sarvam normalise numbers and mixed-script text
    pub sarvam_enable_preprocessing: bool,

    /// HTTP timeout applied to both vendors
    pub tts_request_timeout_seconds: u64,

    // Transcoder
    pub ffmpeg_path: PathBuf,
    pub transcoder_mode: TranscoderMode,
    pub transcode_timeout_seconds: u64,
    /// Assumed rate for headerless PCM that arrives without one
    pub raw_pcm_sample_rate: u32,
    /// Parent for per-call temp directories (system temp dir when unset)
    pub transcode_temp_dir: Option<PathBuf>,
    pub preview_mp3_bitrate_kbps: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            elevenlabs_api_key: None,
            elevenlabs_base_url: ELEVENLABS_BASE_URL.to_string(),
            elevenlabs_model_id: ELEVENLABS_DEFAULT_MODEL.to_string(),
            elevenlabs_default_voice_id: ELEVENLABS_DEFAULT_VOICE_ID.to_string(),
            sarvam_api_key: None,
            sarvam_base_url: SARVAM_BASE_URL.to_string(),
            sarvam_model: DEFAULT_SPEAKER_MODEL.to_string(),
            sarvam_default_language: SARVAM_DEFAULT_LANGUAGE.to_string(),
            sarvam_default_speaker: DEFAULT_SARVAM_SPEAKER.to_string(),
            sarvam_speakers: DEFAULT_SARVAM_SPEAKERS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            sarvam_enable_preprocessing: false,
            tts_request_timeout_seconds: DEFAULT_TTS_REQUEST_TIMEOUT_SECONDS,
            ffmpeg_path: PathBuf::from(transcode::DEFAULT_FFMPEG_PATH),
            transcoder_mode: TranscoderMode::default(),
            transcode_timeout_seconds: transcode::DEFAULT_TRANSCODE_TIMEOUT.as_secs(),
            raw_pcm_sample_rate: transcode::DEFAULT_RAW_PCM_SAMPLE_RATE,
            transcode_temp_dir: None,
            preview_mp3_bitrate_kbps: transcode::DEFAULT_MP3_BITRATE_KBPS,
        }
    }
}

/// Zeroize the vendor keys when the configuration is dropped.
impl Drop for PipelineConfig {
    fn drop(&mut self) {
        use zeroize::Zeroize;

        if let Some(ref mut key) = self.elevenlabs_api_key {
            key.zeroize();
        }
        if let Some(ref mut key) = self.sarvam_api_key {
            key.zeroize();
        }
    }
}

impl PipelineConfig {
    /// Load configuration from a YAML file with environment variable base
    ///
    /// Priority order (highest to lowest):
    /// 1. YAML file values
    /// 2. Environment variables (actual ENV vars override .env values)
    /// 3. .env file values
    /// 4. Default values
    ///
    /// # Errors
    /// Returns an error if:
    /// - The YAML file cannot be read or is malformed
    /// - Environment variables have invalid formats
    /// - Configuration validation fails
    pub fn from_file(path: &PathBuf) -> Result<Self, Box<dyn std::error::Error>> {
        // .env is loaded in main.rs at startup; YAML overrides everything from the environment
        let yaml_config = yaml::YamlConfig::from_file(path)?;

        let config = merge::merge_config(Some(yaml_config))?;
        config.validate()?;

        Ok(config)
    }

    /// Run every validation rule against the merged values.
    pub fn validate(&self) -> Result<(), Box<dyn std::error::Error>> {
        validation::validate_base_url("ELEVENLABS_BASE_URL", &self.elevenlabs_base_url)?;
        validation::validate_base_url("SARVAM_BASE_URL", &self.sarvam_base_url)?;
        validation::validate_timeout(
            "TTS_REQUEST_TIMEOUT_SECONDS",
            self.tts_request_timeout_seconds,
        )?;
        validation::validate_timeout("TRANSCODE_TIMEOUT_SECONDS", self.transcode_timeout_seconds)?;
        validation::validate_sample_rate("RAW_PCM_SAMPLE_RATE", self.raw_pcm_sample_rate)?;
        validation::validate_bitrate(self.preview_mp3_bitrate_kbps)?;
        validation::validate_speakers(&self.sarvam_speakers, &self.sarvam_default_speaker)?;
        Ok(())
    }

    /// ElevenLabs adapter settings. A missing key becomes an empty string so
    /// the adapter reports it on first use.
    pub fn elevenlabs_config(&self) -> ElevenLabsConfig {
        ElevenLabsConfig {
            api_key: self.elevenlabs_api_key.clone().unwrap_or_default(),
            base_url: self.elevenlabs_base_url.clone(),
            model_id: self.elevenlabs_model_id.clone(),
            default_voice_id: self.elevenlabs_default_voice_id.clone(),
            request_timeout_secs: self.tts_request_timeout_seconds,
            ..Default::default()
        }
    }

    pub fn sarvam_config(&self) -> SarvamConfig {
        SarvamConfig {
            api_key: self.sarvam_api_key.clone().unwrap_or_default(),
            base_url: self.sarvam_base_url.clone(),
            model: self.sarvam_model.clone(),
            default_speaker: self.sarvam_default_speaker.to_lowercase(),
            default_language: self.sarvam_default_language.clone(),
            enable_preprocessing: self.sarvam_enable_preprocessing,
            request_timeout_secs: self.tts_request_timeout_seconds,
            ..Default::default()
        }
    }

    pub fn transcoder_config(&self) -> TranscoderConfig {
        TranscoderConfig {
            mode: self.transcoder_mode,
            ffmpeg_path: self.ffmpeg_path.clone(),
            timeout: Duration::from_secs(self.transcode_timeout_seconds),
            raw_pcm_sample_rate: self.raw_pcm_sample_rate,
            temp_dir: self.transcode_temp_dir.clone(),
            mp3_bitrate_kbps: self.preview_mp3_bitrate_kbps,
            ..Default::default()
        }
    }

    /// Speaker table for `auto` provider selection.
    pub fn speaker_table(&self) -> Result<SpeakerTable, String> {
        SpeakerTable::new(
            DEFAULT_SPEAKER_TABLE_VERSION,
            self.sarvam_model.clone(),
            &self.sarvam_default_speaker,
            &self.sarvam_speakers,
        )
    }
}
