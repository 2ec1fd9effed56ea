//! Audio Test Fixtures
//!
//! All fixtures are generated in code so tests have no file dependencies.
//!
//! Formats:
//! - PCM: 16-bit signed little-endian, mono
//! - WAV: RIFF/WAVE PCM16 mono
//! - µ-law: 8-bit G.711, 8 kHz mono
//! - MP3: ID3 tag or chained frame headers; bodies are filler

use std::f32::consts::PI;
use std::io::Cursor;

/// Rate most vendors use for raw PCM
pub const PROVIDER_PCM_RATE: u32 = 24000;

/// Telephony rate
pub const TELEPHONY_RATE: u32 = 8000;

/// MPEG-1 Layer III, 128 kbps, 44.1 kHz frame header
pub const MPEG_FRAME_HEADER: [u8; 4] = [0xFF, 0xFB, 0x90, 0x64];

/// Sine tone as samples.
pub fn sine_samples(sample_rate: u32, duration_ms: u32, frequency: f32, amplitude: f32) -> Vec<i16> {
    let count = (sample_rate as u64 * duration_ms as u64 / 1000) as usize;
    let max_amplitude = amplitude * i16::MAX as f32;
    let angular_freq = 2.0 * PI * frequency / sample_rate as f32;

    (0..count)
        .map(|i| ((angular_freq * i as f32).sin() * max_amplitude) as i16)
        .collect()
}

pub fn samples_to_bytes(samples: &[i16]) -> Vec<u8> {
    samples.iter().flat_map(|s| s.to_le_bytes()).collect()
}

/// 440 Hz tone as little-endian PCM16 bytes.
pub fn tone_pcm_bytes(sample_rate: u32, duration_ms: u32) -> Vec<u8> {
    samples_to_bytes(&sine_samples(sample_rate, duration_ms, 440.0, 0.5))
}

/// Digital silence as PCM16 bytes.
pub fn silence_pcm_bytes(sample_rate: u32, duration_ms: u32) -> Vec<u8> {
    let count = (sample_rate as u64 * duration_ms as u64 / 1000) as usize;
    vec![0u8; count * 2]
}

/// Mono PCM16 WAV file in memory.
pub fn wav_bytes(sample_rate: u32, samples: &[i16]) -> Vec<u8> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
        for &sample in samples {
            writer.write_sample(sample).unwrap();
        }
        writer.finalize().unwrap();
    }
    cursor.into_inner()
}

/// Payload starting with an ID3v2 tag.
pub fn id3_mp3_bytes(len: usize) -> Vec<u8> {
    let mut data = b"ID3\x04\x00\x00\x00\x00\x00\x00".to_vec();
    data.resize(len.max(data.len()), 0x55);
    data
}

/// Length of one frame behind [`MPEG_FRAME_HEADER`].
pub const MPEG_FRAME_LEN: usize = 417;

/// Chained MPEG frames without an ID3 tag; bodies are zeroed.
pub fn framed_mp3_bytes(len: usize) -> Vec<u8> {
    let mut data = vec![0u8; len.max(MPEG_FRAME_HEADER.len())];
    for start in (0..data.len()).step_by(MPEG_FRAME_LEN) {
        let end = (start + MPEG_FRAME_HEADER.len()).min(data.len());
        data[start..end].copy_from_slice(&MPEG_FRAME_HEADER[..end - start]);
    }
    data
}

/// Raw µ-law silence (`0xFF` codes).
pub fn ulaw_silence(duration_ms: u32) -> Vec<u8> {
    vec![0xFF; (TELEPHONY_RATE * duration_ms / 1000) as usize]
}

/// Raw µ-law bytes that do not look silent and do not start with `0xFF`.
pub fn ulaw_speech(duration_ms: u32) -> Vec<u8> {
    (0..(TELEPHONY_RATE * duration_ms / 1000) as usize)
        .map(|i| 0x10 + (i % 0x60) as u8)
        .collect()
}

/// µ-law near-silence whose first four bytes (`FF FF 7B 7F`) also form a
/// valid MPEG-1 Layer I frame header.
pub fn ulaw_header_shaped_silence(duration_ms: u32) -> Vec<u8> {
    let mut data = vec![0xFF, 0xFF, 0x7B, 0x7F];
    data.extend(
        (4..(TELEPHONY_RATE * duration_ms / 1000) as usize)
            .map(|i| if i % 2 == 0 { 0xFE } else { 0x7F }),
    );
    data
}
