pub mod base;
pub mod elevenlabs;
pub mod orchestrator;
pub mod sarvam;
pub mod speakers;

pub use base::{
    ProviderAudio, ProviderChoice, ProviderKind, ProviderRequest, SpeechProvider, TTSError,
    TTSResult, TargetFormat,
};
pub use elevenlabs::{
    ELEVENLABS_BASE_URL, ElevenLabsConfig, ElevenLabsOutputFormat, ElevenLabsTTS,
    surface_actual_format,
};
pub use orchestrator::{
    ConversionPlan, ConversionStep, PipelineWarning, ProviderSelection, TTSRequest,
    TtsOrchestrator, TtsOutput, plan_preview, plan_telephony, select_provider,
};
pub use sarvam::{SARVAM_BASE_URL, SarvamCodec, SarvamConfig, SarvamTTS};
pub use speakers::SpeakerTable;

use std::sync::Arc;

use crate::config::PipelineConfig;

/// Factory function to create a speech provider.
///
/// # Supported Providers
///
/// - `"elevenlabs"` or `"eleven-labs"` or `"11labs"` - ElevenLabs TTS API
/// - `"sarvam"` or `"sarvam-ai"` - Sarvam AI TTS API
///
/// `"auto"` is not a provider; it is resolved per request by the orchestrator.
pub fn create_speech_provider(
    provider_type: &str,
    config: &PipelineConfig,
) -> TTSResult<Arc<dyn SpeechProvider>> {
    match provider_type.trim().to_lowercase().as_str() {
        "elevenlabs" | "eleven-labs" | "eleven_labs" | "11labs" => {
            Ok(Arc::new(ElevenLabsTTS::new(config.elevenlabs_config())?))
        }
        "sarvam" | "sarvam-ai" | "sarvam_ai" => Ok(Arc::new(SarvamTTS::new(config.sarvam_config())?)),
        _ => Err(TTSError::ConfigurationError(format!(
            "Unsupported TTS provider: {provider_type}. Supported providers: elevenlabs, sarvam"
        ))),
    }
}
