use serde::Deserialize;
use std::path::PathBuf;

/// Complete YAML configuration structure
///
/// All fields are optional to allow partial configuration. Values present here
/// override environment variables.
///
/// # Example YAML structure
/// ```yaml
/// providers:
///   elevenlabs_api_key: "your-elevenlabs-key"
///   sarvam_api_key: "your-sarvam-key"
///   request_timeout_seconds: 30
///
/// elevenlabs:
///   base_url: "https://api.elevenlabs.io"
///   model_id: "eleven_multilingual_v2"
///   default_voice_id: "21m00Tcm4TlvDq8ikWAM"
///
/// sarvam:
///   base_url: "https://api.sarvam.ai"
///   model: "bulbul:v2"
///   default_language: "en-IN"
///   default_speaker: "anushka"
///   speakers: ["anushka", "manisha", "vidya", "arya", "abhilash", "karun", "hitesh"]
///   enable_preprocessing: false
///
/// transcoder:
///   mode: "temp_file"
///   ffmpeg_path: "/usr/bin/ffmpeg"
///   timeout_seconds: 30
///   raw_pcm_sample_rate: 24000
///   temp_dir: "/var/tmp/callvoice"
///   mp3_bitrate_kbps: 128
/// ```
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct YamlConfig {
    pub providers: Option<ProvidersYaml>,
    pub elevenlabs: Option<ElevenLabsYaml>,
    pub sarvam: Option<SarvamYaml>,
    pub transcoder: Option<TranscoderYaml>,
}

/// Provider API keys from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ProvidersYaml {
    pub elevenlabs_api_key: Option<String>,
    pub sarvam_api_key: Option<String>,
    /// HTTP timeout for both vendors
    pub request_timeout_seconds: Option<u64>,
}

/// ElevenLabs endpoint settings from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ElevenLabsYaml {
    pub base_url: Option<String>,
    pub model_id: Option<String>,
    pub default_voice_id: Option<String>,
}

/// Sarvam endpoint and speaker settings from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct SarvamYaml {
    pub base_url: Option<String>,
    pub model: Option<String>,
    pub default_language: Option<String>,
    pub default_speaker: Option<String>,
    pub speakers: Option<Vec<String>>,
    pub enable_preprocessing: Option<bool>,
}

/// Transcoder settings from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct TranscoderYaml {
    /// `temp_file` or `pipe`
    pub mode: Option<String>,
    pub ffmpeg_path: Option<String>,
    pub timeout_seconds: Option<u64>,
    pub raw_pcm_sample_rate: Option<u32>,
    pub temp_dir: Option<String>,
    pub mp3_bitrate_kbps: Option<u32>,
}

impl YamlConfig {
    /// Load YAML configuration from a file
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or the YAML is malformed.
    pub fn from_file(path: &PathBuf) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file {}: {e}", path.display()))?;

        let config: YamlConfig =
            serde_yaml::from_str(&contents).map_err(|e| format!("Failed to parse YAML: {e}"))?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_yaml_config_full() {
        let yaml = r#"
providers:
  elevenlabs_api_key: "el-key"
  sarvam_api_key: "sv-key"
  request_timeout_seconds: 15

elevenlabs:
  base_url: "http://localhost:8080"
  model_id: "eleven_turbo_v2_5"
  default_voice_id: "voice-123"

sarvam:
  base_url: "http://localhost:8081"
  model: "bulbul:v2"
  default_language: "hi-IN"
  default_speaker: "vidya"
  speakers:
    - "vidya"
    - "karun"

transcoder:
  mode: "pipe"
  ffmpeg_path: "/opt/ffmpeg/bin/ffmpeg"
  timeout_seconds: 10
  raw_pcm_sample_rate: 16000
  temp_dir: "/var/tmp/callvoice"
  mp3_bitrate_kbps: 64
"#;

        let config: YamlConfig = serde_yaml::from_str(yaml).unwrap();

        let providers = config.providers.unwrap();
        assert_eq!(providers.elevenlabs_api_key, Some("el-key".to_string()));
        assert_eq!(providers.sarvam_api_key, Some("sv-key".to_string()));
        assert_eq!(providers.request_timeout_seconds, Some(15));

        let elevenlabs = config.elevenlabs.unwrap();
        assert_eq!(elevenlabs.model_id, Some("eleven_turbo_v2_5".to_string()));
        assert_eq!(elevenlabs.default_voice_id, Some("voice-123".to_string()));

        let sarvam = config.sarvam.unwrap();
        assert_eq!(sarvam.default_language, Some("hi-IN".to_string()));
        assert_eq!(
            sarvam.speakers,
            Some(vec!["vidya".to_string(), "karun".to_string()])
        );

        let transcoder = config.transcoder.unwrap();
        assert_eq!(transcoder.mode, Some("pipe".to_string()));
        assert_eq!(transcoder.timeout_seconds, Some(10));
        assert_eq!(transcoder.raw_pcm_sample_rate, Some(16000));
        assert_eq!(transcoder.mp3_bitrate_kbps, Some(64));
    }

    #[test]
    fn test_yaml_config_partial() {
        let yaml = r#"
transcoder:
  mode: "temp_file"
"#;

        let config: YamlConfig = serde_yaml::from_str(yaml).unwrap();
        assert!(config.providers.is_none());
        assert!(config.sarvam.is_none());

        let transcoder = config.transcoder.unwrap();
        assert_eq!(transcoder.mode, Some("temp_file".to_string()));
        assert!(transcoder.ffmpeg_path.is_none());
    }

    #[test]
    fn test_yaml_config_empty() {
        let config: YamlConfig = serde_yaml::from_str("{}").unwrap();
        assert!(config.providers.is_none());
        assert!(config.elevenlabs.is_none());
        assert!(config.sarvam.is_none());
        assert!(config.transcoder.is_none());
    }

    #[test]
    fn test_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.yaml");
        fs::write(&path, "providers:\n  sarvam_api_key: \"file-key\"\n").unwrap();

        let config = YamlConfig::from_file(&path).unwrap();
        assert_eq!(
            config.providers.unwrap().sarvam_api_key,
            Some("file-key".to_string())
        );
    }

    #[test]
    fn test_from_file_not_found() {
        let result = YamlConfig::from_file(&PathBuf::from("/nonexistent/config.yaml"));
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Failed to read config file")
        );
    }

    #[test]
    fn test_from_file_invalid_yaml() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bad.yaml");
        fs::write(&path, "transcoder: [unclosed").unwrap();

        let result = YamlConfig::from_file(&path);
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Failed to parse YAML")
        );
    }
}
