pub mod audio;
pub mod tts;

// Re-export commonly used types for convenience
pub use audio::{
    AudioBuffer, AudioFormat, CodecError, DetectedFormat, SourceSpec, TranscodeError, Transcoder,
    TranscoderConfig, TranscoderMode, create_transcoder,
};

pub use tts::{
    ElevenLabsTTS, PipelineWarning, ProviderChoice, ProviderKind, SarvamTTS, SpeakerTable,
    SpeechProvider, TTSError, TTSRequest, TTSResult, TargetFormat, TtsOrchestrator, TtsOutput,
};
