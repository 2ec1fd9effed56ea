use std::env;
use std::path::PathBuf;

use super::PipelineConfig;
use super::utils::{parse_bool, parse_list};
use super::yaml::YamlConfig;
use crate::core::audio::TranscoderMode;

/// Merge YAML configuration with environment variables
///
/// Priority order (highest to lowest):
/// 1. YAML configuration values
/// 2. Environment variables
/// 3. Default values
///
/// # Arguments
/// * `yaml_config` - Optional YAML configuration to use as overrides
///
/// # Errors
/// Returns an error when an environment variable holds a malformed number,
/// boolean or transcoder mode.
pub fn merge_config(
    yaml_config: Option<YamlConfig>,
) -> Result<PipelineConfig, Box<dyn std::error::Error>> {
    let yaml = yaml_config.unwrap_or_default();
    let defaults = PipelineConfig::default();

    // Helper macro to get value with priority: YAML > ENV > Default
    macro_rules! get_value {
        ($env_var:expr, $yaml_value:expr, $default:expr) => {
            $yaml_value
                .or_else(|| env::var($env_var).ok())
                .unwrap_or_else(|| $default.to_string())
        };
    }

    // Helper macro for optional values: YAML > ENV
    macro_rules! get_optional {
        ($env_var:expr, $yaml_value:expr) => {
            $yaml_value.or_else(|| env::var($env_var).ok())
        };
    }

    // Helper macro for parsed values: YAML > ENV (must parse) > Default
    macro_rules! get_parsed {
        ($env_var:expr, $yaml_value:expr, $default:expr) => {
            match $yaml_value {
                Some(value) => value,
                None => match env::var($env_var) {
                    Ok(raw) => raw
                        .trim()
                        .parse()
                        .map_err(|e| format!("Invalid {} environment variable: {e}", $env_var))?,
                    Err(_) => $default,
                },
            }
        };
    }

    let providers = yaml.providers.as_ref();
    let elevenlabs = yaml.elevenlabs.as_ref();
    let sarvam = yaml.sarvam.as_ref();
    let transcoder = yaml.transcoder.as_ref();

    // ElevenLabs
    let elevenlabs_api_key = get_optional!(
        "ELEVENLABS_API_KEY",
        providers.and_then(|p| p.elevenlabs_api_key.clone())
    );
    let elevenlabs_base_url = get_value!(
        "ELEVENLABS_BASE_URL",
        elevenlabs.and_then(|e| e.base_url.clone()),
        defaults.elevenlabs_base_url
    );
    let elevenlabs_model_id = get_value!(
        "ELEVENLABS_MODEL_ID",
        elevenlabs.and_then(|e| e.model_id.clone()),
        defaults.elevenlabs_model_id
    );
    let elevenlabs_default_voice_id = get_value!(
        "ELEVENLABS_DEFAULT_VOICE_ID",
        elevenlabs.and_then(|e| e.default_voice_id.clone()),
        defaults.elevenlabs_default_voice_id
    );

    // Sarvam
    let sarvam_api_key = get_optional!(
        "SARVAM_API_KEY",
        providers.and_then(|p| p.sarvam_api_key.clone())
    );
    let sarvam_base_url = get_value!(
        "SARVAM_BASE_URL",
        sarvam.and_then(|s| s.base_url.clone()),
        defaults.sarvam_base_url
    );
    let sarvam_model = get_value!(
        "SARVAM_MODEL",
        sarvam.and_then(|s| s.model.clone()),
        defaults.sarvam_model
    );
    let sarvam_default_language = get_value!(
        "SARVAM_DEFAULT_LANGUAGE",
        sarvam.and_then(|s| s.default_language.clone()),
        defaults.sarvam_default_language
    );
    let sarvam_default_speaker = get_value!(
        "SARVAM_DEFAULT_SPEAKER",
        sarvam.and_then(|s| s.default_speaker.clone()),
        defaults.sarvam_default_speaker
    );
    let sarvam_speakers = sarvam
        .and_then(|s| s.speakers.clone())
        .or_else(|| env::var("SARVAM_SPEAKERS").ok().map(|v| parse_list(&v)))
        .unwrap_or_else(|| defaults.sarvam_speakers.clone());

    let sarvam_enable_preprocessing =
        if let Some(value) = sarvam.and_then(|s| s.enable_preprocessing) {
            value
        } else if let Ok(raw) = env::var("SARVAM_ENABLE_PREPROCESSING") {
            parse_bool(&raw).ok_or_else(|| {
                format!("Invalid SARVAM_ENABLE_PREPROCESSING environment variable: {raw}")
            })?
        } else {
            defaults.sarvam_enable_preprocessing
        };

    let tts_request_timeout_seconds: u64 = get_parsed!(
        "TTS_REQUEST_TIMEOUT_SECONDS",
        providers.and_then(|p| p.request_timeout_seconds),
        defaults.tts_request_timeout_seconds
    );

    // Transcoder
    let ffmpeg_path = PathBuf::from(get_value!(
        "FFMPEG_PATH",
        transcoder.and_then(|t| t.ffmpeg_path.clone()),
        defaults.ffmpeg_path.display()
    ));

    let transcoder_mode = match get_optional!("TRANSCODER_MODE", transcoder.and_then(|t| t.mode.clone()))
    {
        Some(mode) => mode.parse::<TranscoderMode>()?,
        None => defaults.transcoder_mode,
    };

    let transcode_timeout_seconds: u64 = get_parsed!(
        "TRANSCODE_TIMEOUT_SECONDS",
        transcoder.and_then(|t| t.timeout_seconds),
        defaults.transcode_timeout_seconds
    );
    let raw_pcm_sample_rate: u32 = get_parsed!(
        "RAW_PCM_SAMPLE_RATE",
        transcoder.and_then(|t| t.raw_pcm_sample_rate),
        defaults.raw_pcm_sample_rate
    );
    let transcode_temp_dir = get_optional!(
        "TRANSCODE_TEMP_DIR",
        transcoder.and_then(|t| t.temp_dir.clone())
    )
    .filter(|dir| !dir.trim().is_empty())
    .map(PathBuf::from);
    let preview_mp3_bitrate_kbps: u32 = get_parsed!(
        "PREVIEW_MP3_BITRATE_KBPS",
        transcoder.and_then(|t| t.mp3_bitrate_kbps),
        defaults.preview_mp3_bitrate_kbps
    );

    Ok(PipelineConfig {
        elevenlabs_api_key,
        elevenlabs_base_url,
        elevenlabs_model_id,
        elevenlabs_default_voice_id,
        sarvam_api_key,
        sarvam_base_url,
        sarvam_model,
        sarvam_default_language,
        sarvam_default_speaker,
        sarvam_speakers,
        sarvam_enable_preprocessing,
        tts_request_timeout_seconds,
        ffmpeg_path,
        transcoder_mode,
        transcode_timeout_seconds,
        raw_pcm_sample_rate,
        transcode_temp_dir,
        preview_mp3_bitrate_kbps,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::yaml::{SarvamYaml, TranscoderYaml};
    use serial_test::serial;

    fn cleanup_env_vars() {
        unsafe {
            env::remove_var("SARVAM_API_KEY");
            env::remove_var("SARVAM_SPEAKERS");
            env::remove_var("SARVAM_DEFAULT_SPEAKER");
            env::remove_var("SARVAM_ENABLE_PREPROCESSING");
            env::remove_var("TRANSCODER_MODE");
            env::remove_var("RAW_PCM_SAMPLE_RATE");
            env::remove_var("TRANSCODE_TEMP_DIR");
            env::remove_var("FFMPEG_PATH");
        }
    }

    #[test]
    #[serial]
    fn test_merge_defaults() {
        cleanup_env_vars();

        let config = merge_config(None).unwrap();
        assert_eq!(config.sarvam_speakers.len(), 7);
        assert_eq!(config.ffmpeg_path, PathBuf::from("ffmpeg"));
        assert_eq!(config.transcode_temp_dir, None);
        assert!(!config.sarvam_enable_preprocessing);
    }

    #[test]
    #[serial]
    fn test_merge_env_values() {
        cleanup_env_vars();
        unsafe {
            env::set_var("SARVAM_SPEAKERS", "meera, arvind");
            env::set_var("SARVAM_DEFAULT_SPEAKER", "meera");
            env::set_var("SARVAM_ENABLE_PREPROCESSING", "yes");
            env::set_var("TRANSCODER_MODE", "pipe");
            env::set_var("RAW_PCM_SAMPLE_RATE", "16000");
            env::set_var("TRANSCODE_TEMP_DIR", "/var/tmp/cv");
        }

        let config = merge_config(None).unwrap();
        assert_eq!(config.sarvam_speakers, vec!["meera", "arvind"]);
        assert_eq!(config.sarvam_default_speaker, "meera");
        assert!(config.sarvam_enable_preprocessing);
        assert_eq!(config.transcoder_mode, TranscoderMode::Pipe);
        assert_eq!(config.raw_pcm_sample_rate, 16000);
        assert_eq!(config.transcode_temp_dir, Some(PathBuf::from("/var/tmp/cv")));

        cleanup_env_vars();
    }

    #[test]
    #[serial]
    fn test_merge_yaml_wins() {
        cleanup_env_vars();
        unsafe {
            env::set_var("SARVAM_SPEAKERS", "meera");
            env::set_var("RAW_PCM_SAMPLE_RATE", "16000");
        }

        let yaml = YamlConfig {
            sarvam: Some(SarvamYaml {
                speakers: Some(vec!["vidya".to_string()]),
                ..Default::default()
            }),
            transcoder: Some(TranscoderYaml {
                raw_pcm_sample_rate: Some(22050),
                ..Default::default()
            }),
            ..Default::default()
        };

        let config = merge_config(Some(yaml)).unwrap();
        assert_eq!(config.sarvam_speakers, vec!["vidya"]);
        assert_eq!(config.raw_pcm_sample_rate, 22050);

        cleanup_env_vars();
    }

    #[test]
    #[serial]
    fn test_merge_invalid_env_number() {
        cleanup_env_vars();
        unsafe {
            env::set_var("RAW_PCM_SAMPLE_RATE", "fast");
        }

        let result = merge_config(None);
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Invalid RAW_PCM_SAMPLE_RATE")
        );

        cleanup_env_vars();
    }

    #[test]
    #[serial]
    fn test_merge_invalid_mode() {
        cleanup_env_vars();
        unsafe {
            env::set_var("TRANSCODER_MODE", "socket");
        }

        let result = merge_config(None);
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Invalid transcoder mode")
        );

        cleanup_env_vars();
    }
}
