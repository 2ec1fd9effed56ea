//! TTS orchestration: provider selection, format verification and conversion.
//!
//! One [`TtsOrchestrator::generate`] call makes exactly one vendor request and
//! at most one transcoder run:
//!
//! 1. [`select_provider`] resolves `auto` through the [`SpeakerTable`]
//! 2. the adapter is asked for its native best match for the target
//! 3. the payload is sniffed; the vendor's declaration is only a hint
//! 4. [`plan_telephony`] / [`plan_preview`] decide between pass-through and
//!    conversion
//! 5. conversion runs through the injected [`Transcoder`] (and the µ-law
//!    encoder for telephony)
//!
//! Errors propagate typed and nothing is retried. Anything odd but
//! recoverable is reported as a [`PipelineWarning`] on the output.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::PipelineConfig;
use crate::core::audio::{
    AudioBuffer, AudioFormat, DetectedFormat, SourceSpec, TELEPHONY_CHANNELS,
    TELEPHONY_SAMPLE_RATE, Transcoder, create_transcoder, mulaw, sniff,
};

use super::base::{
    ProviderAudio, ProviderChoice, ProviderKind, ProviderRequest, SpeechProvider, TTSError,
    TTSResult, TargetFormat,
};
use super::create_speech_provider;
use super::speakers::SpeakerTable;

// =============================================================================
// Request / Output
// =============================================================================

/// A synthesis request as received from the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TTSRequest {
    pub text: String,
    pub provider: ProviderChoice,
    /// ElevenLabs voice id or Sarvam speaker name; may be absent
    pub voice: Option<String>,
    pub target: TargetFormat,
    /// Locale tag such as `hi-IN`
    pub language: Option<String>,
}

impl TTSRequest {
    pub fn new(text: impl Into<String>, target: TargetFormat) -> Self {
        Self {
            text: text.into(),
            provider: ProviderChoice::Auto,
            voice: None,
            target,
            language: None,
        }
    }

    pub fn with_provider(mut self, provider: ProviderChoice) -> Self {
        self.provider = provider;
        self
    }

    pub fn with_voice(mut self, voice: impl Into<String>) -> Self {
        self.voice = Some(voice.into());
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }
}

/// Audio that satisfies the requested target exactly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TtsOutput {
    pub audio: AudioBuffer,
    /// Always equal to the request's target
    pub format: TargetFormat,
    pub provider: ProviderKind,
    pub warnings: Vec<PipelineWarning>,
}

/// Recoverable anomalies observed while producing an output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PipelineWarning {
    /// `auto` selection had no identifier to go on
    ProviderDefaulted { provider: ProviderKind },
    /// Headerless PCM arrived without a declared rate
    AssumedPcmSampleRate { sample_rate: u32 },
    /// The vendor declared a PCM rate different from the configured assumption
    SampleRateMismatch { declared: u32, assumed: u32 },
    /// Telephony output is almost entirely near-zero codes
    LikelySilentAudio,
}

impl std::fmt::Display for PipelineWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ProviderDefaulted { provider } => {
                write!(f, "no voice or speaker supplied, defaulted to {provider}")
            }
            Self::AssumedPcmSampleRate { sample_rate } => {
                write!(f, "raw PCM without a declared rate, assumed {sample_rate} Hz")
            }
            Self::SampleRateMismatch { declared, assumed } => write!(
                f,
                "provider declared {declared} Hz PCM, configured assumption is {assumed} Hz"
            ),
            Self::LikelySilentAudio => write!(f, "output audio is likely silent"),
        }
    }
}

// =============================================================================
// Provider Selection
// =============================================================================

/// Outcome of [`select_provider`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderSelection {
    pub provider: ProviderKind,
    /// Identifier to pass to the adapter (`None` means adapter default)
    pub voice: Option<String>,
    pub warning: Option<PipelineWarning>,
}

/// Decide which vendor serves a request.
///
/// - `auto` + identifier in the speaker table → Sarvam with the canonical name
/// - `auto` + any other identifier → ElevenLabs with that voice id
/// - `auto` + no identifier → ElevenLabs default voice, with a warning
/// - explicit `sarvam` → that speaker lowercased, or the table default
/// - explicit `elevenlabs` → that voice, or the adapter default
///
/// Blank identifiers count as absent.
pub fn select_provider(
    choice: ProviderChoice,
    voice: Option<&str>,
    speakers: &SpeakerTable,
) -> ProviderSelection {
    let voice = voice.map(str::trim).filter(|v| !v.is_empty());

    match choice {
        ProviderChoice::Auto => match voice {
            Some(id) => match speakers.resolve(id) {
                Some(speaker) => ProviderSelection {
                    provider: ProviderKind::Sarvam,
                    voice: Some(speaker.to_string()),
                    warning: None,
                },
                None => ProviderSelection {
                    provider: ProviderKind::ElevenLabs,
                    voice: Some(id.to_string()),
                    warning: None,
                },
            },
            None => ProviderSelection {
                provider: ProviderKind::ElevenLabs,
                voice: None,
                warning: Some(PipelineWarning::ProviderDefaulted {
                    provider: ProviderKind::ElevenLabs,
                }),
            },
        },
        ProviderChoice::Sarvam => ProviderSelection {
            provider: ProviderKind::Sarvam,
            voice: Some(
                voice
                    .map(str::to_lowercase)
                    .unwrap_or_else(|| speakers.default_speaker.clone()),
            ),
            warning: None,
        },
        ProviderChoice::ElevenLabs => ProviderSelection {
            provider: ProviderKind::ElevenLabs,
            voice: voice.map(str::to_string),
            warning: None,
        },
    }
}

// =============================================================================
// Conversion Planning
// =============================================================================

/// What has to happen to a payload before it satisfies the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversionStep {
    /// Bytes already satisfy the target
    PassThrough,
    /// Decode/resample to 8 kHz mono PCM, then µ-law encode
    EncodeUlaw { source: SourceSpec },
    /// Re-encode as MP3
    EncodeMp3 { source: SourceSpec },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionPlan {
    pub detected: DetectedFormat,
    pub step: ConversionStep,
    pub warnings: Vec<PipelineWarning>,
}

/// Telephony decision: pass through only raw bytes the provider vouches for
/// as µ-law, convert everything else.
pub fn plan_telephony(audio: &ProviderAudio, raw_pcm_sample_rate: u32) -> TTSResult<ConversionPlan> {
    let detected = sniff_payload(&audio.data)?;

    if is_raw_ulaw(audio, detected) {
        return Ok(ConversionPlan {
            detected,
            step: ConversionStep::PassThrough,
            warnings: Vec::new(),
        });
    }

    let mut warnings = Vec::new();
    let source = source_for(audio, detected, raw_pcm_sample_rate, &mut warnings);
    Ok(ConversionPlan {
        detected,
        step: ConversionStep::EncodeUlaw { source },
        warnings,
    })
}

/// Preview decision: MP3 passes through, everything else is re-encoded.
pub fn plan_preview(audio: &ProviderAudio, raw_pcm_sample_rate: u32) -> TTSResult<ConversionPlan> {
    let detected = sniff_payload(&audio.data)?;

    if detected == DetectedFormat::Mp3 && carries_mp3(audio) {
        return Ok(ConversionPlan {
            detected,
            step: ConversionStep::PassThrough,
            warnings: Vec::new(),
        });
    }

    let mut warnings = Vec::new();
    let source = source_for(audio, detected, raw_pcm_sample_rate, &mut warnings);
    Ok(ConversionPlan {
        detected,
        step: ConversionStep::EncodeMp3 { source },
        warnings,
    })
}

fn sniff_payload(data: &[u8]) -> TTSResult<DetectedFormat> {
    if data.is_empty() {
        return Err(TTSError::NoAudioReturned(
            "provider returned an empty payload".to_string(),
        ));
    }

    match sniff::detect(data) {
        DetectedFormat::Unknown => Err(TTSError::UnrecognizedAudio(format!(
            "payload of {} bytes is too short to classify",
            data.len()
        ))),
        detected => Ok(detected),
    }
}

/// Raw µ-law confirmed by the provider.
///
/// µ-law near-silence starts with `0xFF 0xFF` and trips the MPEG frame-sync
/// rule, so a confirmed payload that sniffs as MP3 stays raw unless it
/// [`carries_mp3`].
fn is_raw_ulaw(audio: &ProviderAudio, detected: DetectedFormat) -> bool {
    if !audio.confirms_ulaw() {
        return false;
    }

    match detected {
        DetectedFormat::PcmS16le => true,
        DetectedFormat::Mp3 => !carries_mp3(audio),
        DetectedFormat::Wav | DetectedFormat::Unknown => false,
    }
}

/// MPEG evidence strong enough to overrule what the provider declared.
///
/// An `ID3` tag always counts. A payload declared headerless (or vouched for
/// as µ-law) needs two chained frames; anything else needs one well-formed
/// frame header.
fn carries_mp3(audio: &ProviderAudio) -> bool {
    let data = &audio.data;
    if sniff::has_id3_tag(data) {
        return true;
    }

    let declared_headerless = audio.confirms_ulaw()
        || audio
            .declared_format
            .is_some_and(|format| format.is_headerless());

    if declared_headerless {
        sniff::has_mpeg_frame_sequence(data)
    } else {
        sniff::has_valid_mpeg_frame_header(data)
    }
}

/// Transcoder input description for a payload that needs conversion.
fn source_for(
    audio: &ProviderAudio,
    detected: DetectedFormat,
    raw_pcm_sample_rate: u32,
    warnings: &mut Vec<PipelineWarning>,
) -> SourceSpec {
    if is_raw_ulaw(audio, detected) {
        return SourceSpec::new(AudioFormat::Ulaw8k)
            .with_sample_rate(audio.sample_rate.unwrap_or(TELEPHONY_SAMPLE_RATE));
    }

    // A frame-sync prefix without real MPEG evidence is headerless audio
    let detected = match detected {
        DetectedFormat::Mp3 if !carries_mp3(audio) => DetectedFormat::PcmS16le,
        other => other,
    };

    match detected {
        DetectedFormat::Mp3 => SourceSpec::new(AudioFormat::Mp3),
        DetectedFormat::Wav => SourceSpec::new(AudioFormat::Wav),
        DetectedFormat::PcmS16le | DetectedFormat::Unknown => {
            let declared = match (audio.declared_format, audio.sample_rate) {
                (Some(AudioFormat::PcmS16le), Some(rate)) => Some(rate),
                _ => None,
            };

            let rate = match declared {
                Some(rate) => {
                    if rate != raw_pcm_sample_rate {
                        warnings.push(PipelineWarning::SampleRateMismatch {
                            declared: rate,
                            assumed: raw_pcm_sample_rate,
                        });
                    }
                    rate
                }
                None => {
                    warnings.push(PipelineWarning::AssumedPcmSampleRate {
                        sample_rate: raw_pcm_sample_rate,
                    });
                    raw_pcm_sample_rate
                }
            };

            SourceSpec::new(AudioFormat::PcmS16le).with_sample_rate(rate)
        }
    }
}

// =============================================================================
// Orchestrator
// =============================================================================

/// Multi-provider TTS pipeline.
///
/// Holds no per-request state; clones share the same adapters, transcoder and
/// speaker table.
#[derive(Clone)]
pub struct TtsOrchestrator {
    elevenlabs: Arc<dyn SpeechProvider>,
    sarvam: Arc<dyn SpeechProvider>,
    transcoder: Arc<dyn Transcoder>,
    speakers: Arc<SpeakerTable>,
    raw_pcm_sample_rate: u32,
}

impl TtsOrchestrator {
    pub fn new(
        elevenlabs: Arc<dyn SpeechProvider>,
        sarvam: Arc<dyn SpeechProvider>,
        transcoder: Arc<dyn Transcoder>,
        speakers: SpeakerTable,
    ) -> Self {
        Self {
            elevenlabs,
            sarvam,
            transcoder,
            speakers: Arc::new(speakers),
            raw_pcm_sample_rate: crate::core::audio::transcode::DEFAULT_RAW_PCM_SAMPLE_RATE,
        }
    }

    /// Build the real adapters and transcoder from configuration.
    ///
    /// Missing API keys are not an error here; the affected adapter fails
    /// with `ConfigurationError` when used.
    pub fn from_config(config: &PipelineConfig) -> TTSResult<Self> {
        let elevenlabs = create_speech_provider(ProviderKind::ElevenLabs.as_str(), config)?;
        let sarvam = create_speech_provider(ProviderKind::Sarvam.as_str(), config)?;
        let transcoder_config = config.transcoder_config();
        let speakers = config
            .speaker_table()
            .map_err(TTSError::ConfigurationError)?;

        Ok(Self::new(
            elevenlabs,
            sarvam,
            create_transcoder(&transcoder_config),
            speakers,
        )
        .with_raw_pcm_sample_rate(transcoder_config.raw_pcm_sample_rate))
    }

    pub fn with_raw_pcm_sample_rate(mut self, sample_rate: u32) -> Self {
        self.raw_pcm_sample_rate = sample_rate;
        self
    }

    pub fn speakers(&self) -> &SpeakerTable {
        &self.speakers
    }

    fn provider(&self, kind: ProviderKind) -> &Arc<dyn SpeechProvider> {
        match kind {
            ProviderKind::ElevenLabs => &self.elevenlabs,
            ProviderKind::Sarvam => &self.sarvam,
        }
    }

    /// Produce audio satisfying `request.target`.
    pub async fn generate(&self, request: &TTSRequest) -> TTSResult<TtsOutput> {
        if request.text.trim().is_empty() {
            return Err(TTSError::InvalidRequest(
                "Text must not be empty".to_string(),
            ));
        }

        let mut warnings = Vec::new();
        let selection = select_provider(request.provider, request.voice.as_deref(), &self.speakers);
        if let Some(warning) = selection.warning {
            warn!(%warning, "TTS provider fallback");
            warnings.push(warning);
        }

        info!(
            provider = %selection.provider,
            voice = selection.voice.as_deref().unwrap_or("default"),
            target = %request.target,
            "Selected TTS provider"
        );

        let provider_request = ProviderRequest {
            text: request.text.clone(),
            voice: selection.voice,
            language: request.language.clone(),
            target: request.target,
        };
        let audio = self
            .provider(selection.provider)
            .synthesize(&provider_request)
            .await?;

        let plan = match request.target {
            TargetFormat::TelephonyUlaw8k => plan_telephony(&audio, self.raw_pcm_sample_rate)?,
            TargetFormat::PreviewMp3 => plan_preview(&audio, self.raw_pcm_sample_rate)?,
        };

        debug!(
            detected = %plan.detected,
            declared = audio.declared_format.map(|f| f.as_str()).unwrap_or("unknown"),
            step = ?plan.step,
            bytes = audio.data.len(),
            "Planned conversion"
        );

        for warning in &plan.warnings {
            warn!(%warning, provider = %selection.provider, "TTS audio warning");
        }
        warnings.extend(plan.warnings);

        let buffer = self.execute(audio, plan.step, request.target).await?;

        if request.target == TargetFormat::TelephonyUlaw8k
            && mulaw::is_likely_silent(buffer.as_bytes())
        {
            warn!(
                provider = %selection.provider,
                bytes = buffer.len(),
                "Telephony audio is likely silent"
            );
            warnings.push(PipelineWarning::LikelySilentAudio);
        }

        Ok(TtsOutput {
            audio: buffer,
            format: request.target,
            provider: selection.provider,
            warnings,
        })
    }

    async fn execute(
        &self,
        audio: ProviderAudio,
        step: ConversionStep,
        target: TargetFormat,
    ) -> TTSResult<AudioBuffer> {
        match step {
            ConversionStep::PassThrough => Ok(AudioBuffer::new(audio.data, target.audio_format())),
            ConversionStep::EncodeUlaw { source } => {
                let pcm = self
                    .transcoder
                    .to_pcm(&audio.data, source, TELEPHONY_SAMPLE_RATE, TELEPHONY_CHANNELS)
                    .await?;
                let ulaw = mulaw::encode(&pcm)?;
                Ok(AudioBuffer::new(ulaw, AudioFormat::Ulaw8k))
            }
            ConversionStep::EncodeMp3 { source } => {
                let mp3 = self.transcoder.to_mp3(&audio.data, source).await?;
                if !sniff::is_mp3(&mp3) {
                    return Err(TTSError::UnrecognizedAudio(format!(
                        "{} transcoder output is not MP3",
                        self.transcoder.name()
                    )));
                }
                Ok(AudioBuffer::new(mp3, AudioFormat::Mp3))
            }
        }
    }
}
