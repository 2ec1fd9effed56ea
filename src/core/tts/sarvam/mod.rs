//! Sarvam AI Text-to-Speech Provider
//!
//! Integration with Sarvam's `POST /text-to-speech` endpoint (`bulbul` models)
//! for Indian-language voices.
//!
//! ## Output formats
//!
//! | Target    | `output_audio_codec` | `speech_sample_rate` |
//! |-----------|----------------------|----------------------|
//! | telephony | `mulaw`              | 8000                 |
//! | preview   | `mp3`                | 44100                |
//!
//! Audio comes back base64-encoded in the `audios` array of a JSON body. A
//! `mulaw` request is contractually raw µ-law, so the adapter sets
//! `guarantees_ulaw`; the orchestrator still sniffs the bytes.
//!
//! ## Authentication
//!
//! `api-subscription-key` header, from `SARVAM_API_KEY`.
//!
//! ## Speakers
//!
//! See [`SpeakerTable`](crate::core::tts::SpeakerTable) for the names routed
//! here under `auto` selection.

pub mod config;
mod provider;

#[cfg(test)]
mod tests;

pub use config::{
    SARVAM_BASE_URL, SARVAM_DEFAULT_LANGUAGE, SARVAM_LANGUAGES, SARVAM_MAX_TEXT_CHARS,
    SARVAM_SAMPLE_RATES, SarvamCodec, SarvamConfig, normalize_language,
};
pub use provider::SarvamTTS;
