//! Sarvam AI TTS Provider Implementation

use std::time::Duration;

use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use bytes::{Bytes, BytesMut};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::config::{SARVAM_MAX_TEXT_CHARS, SarvamCodec, SarvamConfig, normalize_language};
use crate::core::tts::base::{
    ProviderAudio, ProviderKind, ProviderRequest, SpeechProvider, TTSError, TTSResult,
    TargetFormat, build_http_client, error_from_response, network_error,
};

// =============================================================================
// API Types
// =============================================================================

#[derive(Debug, Serialize)]
pub(super) struct SarvamTTSRequest<'a> {
    pub text: &'a str,
    pub target_language_code: &'a str,
    pub speaker: &'a str,
    pub pitch: f32,
    pub pace: f32,
    pub loudness: f32,
    pub speech_sample_rate: u32,
    pub enable_preprocessing: bool,
    pub model: &'a str,
    pub output_audio_codec: &'static str,
}

#[derive(Debug, Deserialize)]
pub(super) struct SarvamTTSResponse {
    #[serde(default)]
    pub request_id: Option<String>,
    #[serde(default)]
    pub audios: Vec<String>,
}

// =============================================================================
// Provider
// =============================================================================

/// Sarvam text-to-speech over the REST API.
pub struct SarvamTTS {
    config: SarvamConfig,
    client: reqwest::Client,
}

impl SarvamTTS {
    pub fn new(config: SarvamConfig) -> TTSResult<Self> {
        let client = build_http_client(Duration::from_secs(config.request_timeout_secs))?;
        Ok(Self { config, client })
    }

    pub fn config(&self) -> &SarvamConfig {
        &self.config
    }

    /// Codec and sample rate requested for each target.
    pub fn native_format_for(&self, target: TargetFormat) -> (SarvamCodec, u32) {
        match target {
            TargetFormat::TelephonyUlaw8k => (SarvamCodec::Mulaw, self.config.telephony_sample_rate),
            TargetFormat::PreviewMp3 => (SarvamCodec::Mp3, self.config.preview_sample_rate),
        }
    }

    /// Build the synthesis request without sending it.
    pub(crate) fn build_request(
        &self,
        text: &str,
        speaker: &str,
        target_language: &str,
        codec: SarvamCodec,
        sample_rate: u32,
    ) -> TTSResult<reqwest::RequestBuilder> {
        if self.config.api_key.trim().is_empty() {
            return Err(TTSError::ConfigurationError(
                "Sarvam API key is required. Set SARVAM_API_KEY environment variable.".to_string(),
            ));
        }

        let text = text.trim();
        if text.is_empty() {
            return Err(TTSError::InvalidRequest("Text must not be empty".to_string()));
        }
        let chars = text.chars().count();
        if chars > SARVAM_MAX_TEXT_CHARS {
            return Err(TTSError::InvalidRequest(format!(
                "Text exceeds {SARVAM_MAX_TEXT_CHARS} characters ({chars})"
            )));
        }

        let target_language_code = normalize_language(target_language).ok_or_else(|| {
            TTSError::InvalidRequest(format!("Unsupported Sarvam language: {target_language}"))
        })?;

        let speaker = speaker.trim().to_lowercase();
        let body = SarvamTTSRequest {
            text,
            target_language_code,
            speaker: &speaker,
            pitch: self.config.pitch,
            pace: self.config.pace,
            loudness: self.config.loudness,
            speech_sample_rate: sample_rate,
            enable_preprocessing: self.config.enable_preprocessing,
            model: &self.config.model,
            output_audio_codec: codec.as_str(),
        };

        Ok(self
            .client
            .post(self.config.endpoint())
            .header("api-subscription-key", &self.config.api_key)
            .header("Content-Type", "application/json")
            .json(&body))
    }

    /// Call the API and return the decoded audio.
    ///
    /// Several `audios` entries are concatenated for headerless codecs; for
    /// containers only the first entry is kept.
    pub async fn synthesize_raw(
        &self,
        text: &str,
        speaker: &str,
        target_language: &str,
        codec: SarvamCodec,
        sample_rate: u32,
    ) -> TTSResult<Bytes> {
        let request = self.build_request(text, speaker, target_language, codec, sample_rate)?;

        debug!(
            text_len = text.len(),
            speaker = %speaker,
            language = %target_language,
            codec = %codec,
            sample_rate,
            "Sarvam TTS synthesis request"
        );

        let response = request
            .send()
            .await
            .map_err(|e| network_error(ProviderKind::Sarvam, e))?;

        if !response.status().is_success() {
            let error = error_from_response(response).await;
            warn!(error = %error, "Sarvam TTS request rejected");
            return Err(error);
        }

        let result: SarvamTTSResponse = response.json().await.map_err(|e| {
            TTSError::NetworkError(format!("Failed to parse Sarvam response: {e}"))
        })?;

        let audio = decode_audios(&result.audios, codec)?;

        debug!(
            request_id = result.request_id.as_deref().unwrap_or("none"),
            audio_bytes = audio.len(),
            "Sarvam TTS synthesis complete"
        );

        Ok(audio)
    }
}

/// Decode the base64 `audios` array.
pub(super) fn decode_audios(audios: &[String], codec: SarvamCodec) -> TTSResult<Bytes> {
    if audios.is_empty() {
        return Err(TTSError::NoAudioReturned(
            "Sarvam response contained no audios".to_string(),
        ));
    }

    let take = if codec.audio_format().is_headerless() {
        audios.len()
    } else {
        if audios.len() > 1 {
            warn!(count = audios.len(), codec = %codec, "Ignoring extra Sarvam audio segments");
        }
        1
    };

    let mut buffer = BytesMut::new();
    for encoded in audios.iter().take(take) {
        let decoded = BASE64.decode(encoded.trim()).map_err(|e| {
            TTSError::UnrecognizedAudio(format!("Sarvam audio is not valid base64: {e}"))
        })?;
        buffer.extend_from_slice(&decoded);
    }

    if buffer.is_empty() {
        return Err(TTSError::NoAudioReturned(
            "Sarvam returned an empty audio payload".to_string(),
        ));
    }

    Ok(buffer.freeze())
}

#[async_trait]
impl SpeechProvider for SarvamTTS {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Sarvam
    }

    async fn synthesize(&self, request: &ProviderRequest) -> TTSResult<ProviderAudio> {
        let speaker = request
            .voice
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .unwrap_or(&self.config.default_speaker);
        let language = request
            .language
            .as_deref()
            .unwrap_or(&self.config.default_language);
        let (codec, sample_rate) = self.native_format_for(request.target);

        let data = self
            .synthesize_raw(&request.text, speaker, language, codec, sample_rate)
            .await?;

        Ok(ProviderAudio {
            data,
            declared_format: Some(codec.audio_format()),
            content_type: None,
            sample_rate: Some(sample_rate),
            guarantees_ulaw: codec == SarvamCodec::Mulaw,
        })
    }

    fn get_provider_info(&self) -> serde_json::Value {
        serde_json::json!({
            "provider": "sarvam",
            "version": "1.0.0",
            "api_type": "HTTP REST",
            "endpoint": self.config.endpoint(),
            "model": self.config.model,
            "default_speaker": self.config.default_speaker,
            "default_language": self.config.default_language,
            "telephony": {
                "codec": SarvamCodec::Mulaw.as_str(),
                "sample_rate": self.config.telephony_sample_rate,
            },
            "preview": {
                "codec": SarvamCodec::Mp3.as_str(),
                "sample_rate": self.config.preview_sample_rate,
            },
            "max_text_chars": SARVAM_MAX_TEXT_CHARS,
            "documentation": "https://docs.sarvam.ai/api-reference-docs/text-to-speech/convert",
        })
    }
}
