//! Tests for the Sarvam text-to-speech provider.
//!
//! Covers request building, response decoding and the HTTP contract against
//! a mock server.

use base64::{Engine, engine::general_purpose::STANDARD as BASE64};

use super::config::*;
use super::provider::*;
use crate::core::audio::AudioFormat;
use crate::core::tts::base::{ProviderRequest, SpeechProvider, TTSError, TargetFormat};

fn test_provider() -> SarvamTTS {
    SarvamTTS::new(SarvamConfig::with_api_key("test-key")).unwrap()
}

fn body_of(request: reqwest::Request) -> serde_json::Value {
    serde_json::from_slice(request.body().unwrap().as_bytes().unwrap()).unwrap()
}

// =============================================================================
// Request Building Tests
// =============================================================================

mod request_tests {
    use super::*;

    #[test]
    fn test_request_headers_and_url() {
        let request = test_provider()
            .build_request("Namaste", "anushka", "hi-IN", SarvamCodec::Mulaw, 8000)
            .unwrap()
            .build()
            .unwrap();

        assert_eq!(request.url().as_str(), "https://api.sarvam.ai/text-to-speech");
        assert_eq!(request.method(), reqwest::Method::POST);
        assert_eq!(
            request.headers().get("api-subscription-key").unwrap(),
            "test-key"
        );
    }

    #[test]
    fn test_request_body() {
        let request = test_provider()
            .build_request("  Namaste  ", "Anushka", "hi", SarvamCodec::Mulaw, 8000)
            .unwrap()
            .build()
            .unwrap();
        let body = body_of(request);

        assert_eq!(body["text"], "Namaste");
        assert_eq!(body["speaker"], "anushka");
        assert_eq!(body["target_language_code"], "hi-IN");
        assert_eq!(body["speech_sample_rate"], 8000);
        assert_eq!(body["output_audio_codec"], "mulaw");
        assert_eq!(body["model"], "bulbul:v2");
        assert_eq!(body["enable_preprocessing"], false);
        assert_eq!(body["pace"], 1.0);
    }

    #[test]
    fn test_missing_key() {
        let tts = SarvamTTS::new(SarvamConfig::default()).unwrap();
        let result = tts.build_request("Hi", "anushka", "en-IN", SarvamCodec::Mp3, 44100);
        assert!(matches!(result, Err(TTSError::ConfigurationError(_))));
    }

    #[test]
    fn test_text_too_long() {
        let long = "क".repeat(SARVAM_MAX_TEXT_CHARS + 1);
        let result =
            test_provider().build_request(&long, "anushka", "hi-IN", SarvamCodec::Mulaw, 8000);
        assert!(matches!(result, Err(TTSError::InvalidRequest(_))));

        // Limit counts characters, not bytes
        let exact = "क".repeat(SARVAM_MAX_TEXT_CHARS);
        assert!(
            test_provider()
                .build_request(&exact, "anushka", "hi-IN", SarvamCodec::Mulaw, 8000)
                .is_ok()
        );
    }

    #[test]
    fn test_unsupported_language() {
        let result =
            test_provider().build_request("Bonjour", "anushka", "fr-FR", SarvamCodec::Mp3, 44100);
        assert!(matches!(result, Err(TTSError::InvalidRequest(_))));
    }

    #[test]
    fn test_native_format_for_target() {
        let tts = test_provider();
        assert_eq!(
            tts.native_format_for(TargetFormat::TelephonyUlaw8k),
            (SarvamCodec::Mulaw, 8000)
        );
        assert_eq!(
            tts.native_format_for(TargetFormat::PreviewMp3),
            (SarvamCodec::Mp3, 44100)
        );
    }
}

// =============================================================================
// Response Decoding Tests
// =============================================================================

mod decode_tests {
    use super::*;

    #[test]
    fn test_empty_audios() {
        let result = decode_audios(&[], SarvamCodec::Mulaw);
        assert!(matches!(result, Err(TTSError::NoAudioReturned(_))));
    }

    #[test]
    fn test_empty_payload() {
        let result = decode_audios(&[String::new()], SarvamCodec::Mulaw);
        assert!(matches!(result, Err(TTSError::NoAudioReturned(_))));
    }

    #[test]
    fn test_invalid_base64() {
        let result = decode_audios(&["not base64!!".to_string()], SarvamCodec::Mulaw);
        assert!(matches!(result, Err(TTSError::UnrecognizedAudio(_))));
    }

    #[test]
    fn test_headerless_segments_concatenate() {
        let audios = vec![BASE64.encode([1u8, 2]), BASE64.encode([3u8, 4])];
        let decoded = decode_audios(&audios, SarvamCodec::Mulaw).unwrap();
        assert_eq!(decoded.as_ref(), &[1, 2, 3, 4]);
    }

    #[test]
    fn test_container_keeps_first_segment() {
        let audios = vec![BASE64.encode(b"ID3a"), BASE64.encode(b"ID3b")];
        let decoded = decode_audios(&audios, SarvamCodec::Mp3).unwrap();
        assert_eq!(decoded.as_ref(), b"ID3a");
    }
}

// =============================================================================
// HTTP Contract Tests
// =============================================================================

mod http_tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn provider_for(server: &MockServer) -> SarvamTTS {
        let config = SarvamConfig {
            base_url: server.uri(),
            ..SarvamConfig::with_api_key("test-key")
        };
        SarvamTTS::new(config).unwrap()
    }

    #[tokio::test]
    async fn test_telephony_synthesis() {
        let server = MockServer::start().await;
        let ulaw = vec![0xFFu8; 1600];
        Mock::given(method("POST"))
            .and(path("/text-to-speech"))
            .and(header("api-subscription-key", "test-key"))
            .and(body_partial_json(serde_json::json!({
                "speaker": "vidya",
                "output_audio_codec": "mulaw",
                "speech_sample_rate": 8000,
                "target_language_code": "en-IN",
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "request_id": "req-1",
                "audios": [BASE64.encode(&ulaw)],
            })))
            .expect(1)
            .mount(&server)
            .await;

        let tts = provider_for(&server).await;
        let request = ProviderRequest::new("Hello", TargetFormat::TelephonyUlaw8k).with_voice("vidya");
        let audio = tts.synthesize(&request).await.unwrap();

        assert_eq!(audio.data.len(), 1600);
        assert_eq!(audio.declared_format, Some(AudioFormat::Ulaw8k));
        assert_eq!(audio.sample_rate, Some(8000));
        assert!(audio.guarantees_ulaw);
    }

    #[tokio::test]
    async fn test_preview_uses_default_speaker() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(serde_json::json!({
                "speaker": "anushka",
                "output_audio_codec": "mp3",
                "speech_sample_rate": 44100,
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "audios": [BASE64.encode(b"ID3\x04\x00\x00\x00\x00")],
            })))
            .expect(1)
            .mount(&server)
            .await;

        let tts = provider_for(&server).await;
        let request = ProviderRequest::new("Hello", TargetFormat::PreviewMp3);
        let audio = tts.synthesize(&request).await.unwrap();

        assert_eq!(audio.declared_format, Some(AudioFormat::Mp3));
        assert!(!audio.guarantees_ulaw);
    }

    #[tokio::test]
    async fn test_empty_audios_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"request_id": "x", "audios": []})),
            )
            .mount(&server)
            .await;

        let tts = provider_for(&server).await;
        let request = ProviderRequest::new("Hello", TargetFormat::TelephonyUlaw8k);
        assert!(matches!(
            tts.synthesize(&request).await,
            Err(TTSError::NoAudioReturned(_))
        ));
    }

    #[tokio::test]
    async fn test_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
            .mount(&server)
            .await;

        let tts = provider_for(&server).await;
        let request = ProviderRequest::new("Hello", TargetFormat::TelephonyUlaw8k);
        match tts.synthesize(&request).await {
            Err(TTSError::ProviderError { status, body }) => {
                assert_eq!(status, 429);
                assert_eq!(body, "rate limited");
            }
            other => panic!("expected provider error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_provider_info() {
        let info = test_provider().get_provider_info();
        assert_eq!(info["provider"], "sarvam");
        assert_eq!(info["telephony"]["codec"], "mulaw");
        assert_eq!(info["max_text_chars"], 1500);
    }
}
