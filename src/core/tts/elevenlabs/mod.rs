//! ElevenLabs Text-to-Speech Provider
//!
//! REST integration with `POST /v1/text-to-speech/{voice_id}`.
//!
//! ## Output formats
//!
//! | Target    | Requested `output_format` | Expected payload      |
//! |-----------|---------------------------|-----------------------|
//! | telephony | `ulaw_8000`               | raw µ-law, 8 kHz mono |
//! | preview   | `mp3_44100_128`           | MP3                   |
//!
//! The API does not always honour `ulaw_8000` and may answer with MP3. The
//! adapter reports the format it actually observed (see
//! [`surface_actual_format`]) and leaves conversion to the orchestrator.
//!
//! ## Authentication
//!
//! `xi-api-key` header, from `ELEVENLABS_API_KEY`.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use callvoice_tts::core::tts::{
//!     ElevenLabsConfig, ElevenLabsTTS, ProviderRequest, SpeechProvider, TargetFormat,
//! };
//!
//! let tts = ElevenLabsTTS::new(ElevenLabsConfig::with_api_key("xi-..."))?;
//! let audio = tts
//!     .synthesize(&ProviderRequest::new("Hello", TargetFormat::TelephonyUlaw8k))
//!     .await?;
//! ```

mod config;
mod provider;

pub use config::{
    ELEVENLABS_BASE_URL, ELEVENLABS_DEFAULT_MODEL, ELEVENLABS_DEFAULT_VOICE_ID,
    ELEVENLABS_MAX_TEXT_CHARS, ElevenLabsConfig, ElevenLabsOutputFormat, VoiceSettings,
};
pub use provider::{ElevenLabsTTS, surface_actual_format};
