use crate::core::tts::speakers::SpeakerTable;

/// PCM rates the transcoder is allowed to assume for headerless input.
const SUPPORTED_PCM_SAMPLE_RATES: &[u32] = &[8000, 16000, 22050, 24000, 44100, 48000];

/// Validate a vendor base URL
///
/// Must parse as an absolute `http` or `https` URL.
pub fn validate_base_url(name: &str, value: &str) -> Result<(), Box<dyn std::error::Error>> {
    let url = url::Url::parse(value).map_err(|e| format!("{name} is not a valid URL: {e}"))?;

    match url.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(format!("{name} must use http or https, got {scheme}").into()),
    }
}

/// Timeouts must be at least one second.
pub fn validate_timeout(name: &str, seconds: u64) -> Result<(), Box<dyn std::error::Error>> {
    if seconds == 0 {
        return Err(format!("{name} must be greater than 0").into());
    }
    Ok(())
}

pub fn validate_sample_rate(name: &str, rate: u32) -> Result<(), Box<dyn std::error::Error>> {
    if !SUPPORTED_PCM_SAMPLE_RATES.contains(&rate) {
        return Err(format!(
            "{name} must be one of {SUPPORTED_PCM_SAMPLE_RATES:?}, got {rate}"
        )
        .into());
    }
    Ok(())
}

/// MP3 bitrate for preview output, in kbps.
pub fn validate_bitrate(kbps: u32) -> Result<(), Box<dyn std::error::Error>> {
    if !(32..=320).contains(&kbps) {
        return Err(format!("PREVIEW_MP3_BITRATE_KBPS must be between 32 and 320, got {kbps}").into());
    }
    Ok(())
}

/// Validate the Sarvam speaker list
///
/// The list must be non-empty after normalisation and contain the default speaker.
pub fn validate_speakers(
    speakers: &[String],
    default_speaker: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    SpeakerTable::new(0, "", default_speaker, speakers)
        .map(|_| ())
        .map_err(|e| format!("Invalid SARVAM_SPEAKERS: {e}").into())
}
