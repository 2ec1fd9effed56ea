//! ElevenLabs TTS provider implementation.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use serde::Serialize;
use tracing::{debug, warn};

use super::config::{ELEVENLABS_MAX_TEXT_CHARS, ElevenLabsConfig, ElevenLabsOutputFormat, VoiceSettings};
use crate::core::audio::{AudioFormat, sniff};
use crate::core::tts::base::{
    ProviderAudio, ProviderKind, ProviderRequest, SpeechProvider, TTSError, TTSResult,
    TargetFormat, build_http_client, content_type_of, error_from_response, network_error,
};

// =============================================================================
// API Request Types
// =============================================================================

#[derive(Debug, Serialize)]
struct ElevenLabsRequestBody<'a> {
    text: &'a str,
    model_id: &'a str,
    voice_settings: &'a VoiceSettings,
    #[serde(skip_serializing_if = "Option::is_none")]
    language_code: Option<&'a str>,
}

// =============================================================================
// Format Surfacing
// =============================================================================

/// Work out what the API actually returned.
///
/// The API sometimes answers a `ulaw_8000` request with MP3, so the request
/// parameter is only consulted when neither the bytes nor the content type
/// say anything:
///
/// 1. an `ID3` tag ⇒ `Mp3`
/// 2. a recognised `Content-Type` (`audio/mpeg` ⇒ `Mp3`, `audio/basic` ⇒
///    `Ulaw8k`, etc.)
/// 3. `RIFF` ⇒ `Wav`; two chained MPEG frames ⇒ `Mp3`
/// 4. headerless bytes with no usable content type ⇒ the requested encoding
///    when that encoding is itself headerless, otherwise `None`
///
/// A lone frame header is not enough: µ-law near-silence can begin with one.
pub fn surface_actual_format(
    content_type: Option<&str>,
    data: &[u8],
    requested: ElevenLabsOutputFormat,
) -> Option<AudioFormat> {
    if sniff::has_id3_tag(data) {
        return Some(AudioFormat::Mp3);
    }
    if let Some(format) = content_type.and_then(AudioFormat::from_content_type) {
        return Some(format);
    }
    if data.starts_with(b"RIFF") {
        return Some(AudioFormat::Wav);
    }
    if sniff::has_mpeg_frame_sequence(data) {
        return Some(AudioFormat::Mp3);
    }

    let nominal = requested.audio_format();
    nominal.is_headerless().then_some(nominal)
}

// =============================================================================
// Provider
// =============================================================================

/// ElevenLabs text-to-speech over the REST API.
pub struct ElevenLabsTTS {
    config: ElevenLabsConfig,
    client: reqwest::Client,
}

impl ElevenLabsTTS {
    pub fn new(config: ElevenLabsConfig) -> TTSResult<Self> {
        let client = build_http_client(Duration::from_secs(config.request_timeout_secs))?;
        Ok(Self { config, client })
    }

    pub fn config(&self) -> &ElevenLabsConfig {
        &self.config
    }

    /// Native format requested for each target.
    pub fn output_format_for(&self, target: TargetFormat) -> ElevenLabsOutputFormat {
        match target {
            TargetFormat::TelephonyUlaw8k => self.config.telephony_format,
            TargetFormat::PreviewMp3 => self.config.preview_format,
        }
    }

    /// Build the synthesis request without sending it.
    pub(crate) fn build_request(
        &self,
        text: &str,
        voice_id: &str,
        language: Option<&str>,
        output_format: ElevenLabsOutputFormat,
    ) -> TTSResult<reqwest::RequestBuilder> {
        if self.config.api_key.trim().is_empty() {
            return Err(TTSError::ConfigurationError(
                "ElevenLabs API key is required. Set ELEVENLABS_API_KEY environment variable."
                    .to_string(),
            ));
        }

        let text = text.trim();
        if text.is_empty() {
            return Err(TTSError::InvalidRequest("Text must not be empty".to_string()));
        }
        let chars = text.chars().count();
        if chars > ELEVENLABS_MAX_TEXT_CHARS {
            return Err(TTSError::InvalidRequest(format!(
                "Text exceeds {ELEVENLABS_MAX_TEXT_CHARS} characters ({chars})"
            )));
        }

        let language_code = if self.config.supports_language_code() {
            language.map(language_prefix)
        } else {
            None
        };

        let body = ElevenLabsRequestBody {
            text,
            model_id: &self.config.model_id,
            voice_settings: &self.config.voice_settings,
            language_code,
        };

        Ok(self
            .client
            .post(self.config.endpoint(voice_id))
            .query(&[("output_format", output_format.as_str())])
            .header("xi-api-key", &self.config.api_key)
            .header("Content-Type", "application/json")
            .header("Accept", output_format.accept_header())
            .json(&body))
    }

    async fn send(
        &self,
        text: &str,
        voice_id: &str,
        language: Option<&str>,
        output_format: ElevenLabsOutputFormat,
    ) -> TTSResult<(Bytes, Option<String>)> {
        let request = self.build_request(text, voice_id, language, output_format)?;

        debug!(
            text_len = text.len(),
            voice_id = %voice_id,
            output_format = %output_format,
            model = %self.config.model_id,
            "ElevenLabs TTS synthesis request"
        );

        let response = request
            .send()
            .await
            .map_err(|e| network_error(ProviderKind::ElevenLabs, e))?;

        if !response.status().is_success() {
            let error = error_from_response(response).await;
            warn!(error = %error, "ElevenLabs TTS request rejected");
            return Err(error);
        }

        let content_type = content_type_of(&response);
        let data = response
            .bytes()
            .await
            .map_err(|e| network_error(ProviderKind::ElevenLabs, e))?;

        debug!(
            audio_bytes = data.len(),
            content_type = content_type.as_deref().unwrap_or("none"),
            "ElevenLabs TTS synthesis complete"
        );

        Ok((data, content_type))
    }
}

/// `hi-IN` → `hi`; the API takes ISO 639-1 codes.
fn language_prefix(tag: &str) -> &str {
    tag.split(['-', '_']).next().unwrap_or(tag)
}

#[async_trait]
impl SpeechProvider for ElevenLabsTTS {
    fn kind(&self) -> ProviderKind {
        ProviderKind::ElevenLabs
    }

    async fn synthesize(&self, request: &ProviderRequest) -> TTSResult<ProviderAudio> {
        let voice_id = request
            .voice
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .unwrap_or(&self.config.default_voice_id);
        let output_format = self.output_format_for(request.target);

        let (data, content_type) = self
            .send(&request.text, voice_id, request.language.as_deref(), output_format)
            .await?;

        if data.is_empty() {
            return Err(TTSError::NoAudioReturned(
                "ElevenLabs returned an empty body".to_string(),
            ));
        }

        let declared_format = surface_actual_format(content_type.as_deref(), &data, output_format);
        if declared_format != Some(output_format.audio_format()) {
            warn!(
                requested = %output_format,
                actual = declared_format.map(|f| f.as_str()).unwrap_or("unknown"),
                "ElevenLabs returned a different format than requested"
            );
        }

        let sample_rate = match declared_format {
            Some(format) if format == output_format.audio_format() && format.is_headerless() => {
                Some(output_format.sample_rate())
            }
            _ => None,
        };

        Ok(ProviderAudio {
            data,
            declared_format,
            content_type,
            sample_rate,
            guarantees_ulaw: false,
        })
    }

    fn get_provider_info(&self) -> serde_json::Value {
        serde_json::json!({
            "provider": "elevenlabs",
            "version": "1.0.0",
            "api_type": "HTTP REST",
            "endpoint": self.config.endpoint("{voice_id}"),
            "model": self.config.model_id,
            "default_voice": self.config.default_voice_id,
            "telephony_format": self.config.telephony_format.as_str(),
            "preview_format": self.config.preview_format.as_str(),
            "max_text_chars": ELEVENLABS_MAX_TEXT_CHARS,
            "documentation": "https://elevenlabs.io/docs/api-reference/text-to-speech",
        })
    }
}
