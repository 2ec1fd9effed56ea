//! G.711 µ-law encoder.
//!
//! Converts 16-bit signed little-endian PCM into 8-bit µ-law codes using the
//! bias-132 companding table. Encoding is one-directional: the telephony
//! transport only ever receives µ-law, so no decoder is provided.
//!
//! Per sample:
//! 1. sign bit = `0x80` for negative samples
//! 2. magnitude = `min(|sample| + 132, 32767)`
//! 3. exponent = segment of the magnitude, 0 when below every segment threshold
//! 4. mantissa = the four bits under the segment's leading bit
//! 5. code = `!(sign | exponent << 4 | mantissa)`

/// Bias added to the magnitude before segment lookup.
pub const BIAS: i32 = 0x84;

/// Magnitude ceiling after biasing.
pub const CLIP: i32 = 32767;

/// Fraction of near-zero codes at which a buffer is reported as silent.
pub const SILENCE_RATIO: f32 = 0.98;

/// Codec errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    #[error("Invalid input length: PCM16 input must be an even number of bytes, got {0}")]
    InvalidInputLength(usize),
}

/// Encode a PCM16 byte buffer (little-endian) into µ-law.
///
/// The output holds one byte per input sample.
///
/// # Errors
/// Returns [`CodecError::InvalidInputLength`] when `pcm` has an odd length.
pub fn encode(pcm: &[u8]) -> Result<Vec<u8>, CodecError> {
    if pcm.len() % 2 != 0 {
        return Err(CodecError::InvalidInputLength(pcm.len()));
    }

    Ok(pcm
        .chunks_exact(2)
        .map(|pair| encode_sample(i16::from_le_bytes([pair[0], pair[1]])))
        .collect())
}

/// Encode already-decoded samples.
pub fn encode_samples(samples: &[i16]) -> Vec<u8> {
    samples.iter().copied().map(encode_sample).collect()
}

/// Encode a single sample.
#[inline]
pub fn encode_sample(sample: i16) -> u8 {
    let sample = i32::from(sample);
    let sign = if sample < 0 { 0x80 } else { 0x00 };
    let magnitude = (sample.abs() + BIAS).min(CLIP);
    let exponent = segment(magnitude);
    let mantissa = (magnitude >> (exponent + 3)) & 0x0F;

    !((sign | (exponent << 4) | mantissa) as u8)
}

/// Segment (exponent) of a biased magnitude.
///
/// Magnitudes under the first threshold fall into segment 0 rather than
/// signalling underflow.
#[inline]
fn segment(magnitude: i32) -> i32 {
    (1..=7)
        .rev()
        .find(|&exponent| magnitude >= 1 << (exponent + 7))
        .unwrap_or(0)
}

/// Passive diagnostic: does this µ-law buffer look like silence?
///
/// A code counts as near-zero when, after undoing the complement, it sits in
/// segment 0 with a mantissa of at most 2. Empty buffers are never reported.
pub fn is_likely_silent(ulaw: &[u8]) -> bool {
    if ulaw.is_empty() {
        return false;
    }

    let quiet = ulaw.iter().filter(|&&code| is_near_zero(code)).count();
    quiet as f32 / ulaw.len() as f32 >= SILENCE_RATIO
}

#[inline]
fn is_near_zero(code: u8) -> bool {
    let raw = !code;
    raw & 0x70 == 0 && raw & 0x0F <= 2
}
