//! Magic-byte format detection.
//!
//! Vendors do not reliably honor the output format they were asked for, so the
//! pipeline classifies every payload from its first bytes. Rules are checked in
//! order:
//!
//! | Check                                     | Result      |
//! |-------------------------------------------|-------------|
//! | fewer than 4 bytes                        | `Unknown`   |
//! | `ID3` at offset 0                         | `Mp3`       |
//! | `0xFF` then a byte with top 3 bits set    | `Mp3`       |
//! | `RIFF` at offset 0                        | `Wav`       |
//! | anything else                             | `PcmS16le`  |
//!
//! The final rule is a fallback, not a verified detection: any headerless
//! payload (including raw µ-law) lands there.

use super::AudioFormat;

/// Minimum number of bytes needed to classify a buffer.
pub const MIN_SNIFF_LEN: usize = 4;

const ID3_MAGIC: &[u8] = b"ID3";
const RIFF_MAGIC: &[u8] = b"RIFF";

/// Result of sniffing a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectedFormat {
    Mp3,
    Wav,
    /// Fallback for anything without a recognized header.
    PcmS16le,
    /// Buffer too short to classify. Callers treat this as an error.
    Unknown,
}

impl DetectedFormat {
    #[inline]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mp3 => "mp3",
            Self::Wav => "wav",
            Self::PcmS16le => "pcm_s16le",
            Self::Unknown => "unknown",
        }
    }

    /// Pipeline format for this detection, `None` for `Unknown`.
    pub fn as_audio_format(&self) -> Option<AudioFormat> {
        match self {
            Self::Mp3 => Some(AudioFormat::Mp3),
            Self::Wav => Some(AudioFormat::Wav),
            Self::PcmS16le => Some(AudioFormat::PcmS16le),
            Self::Unknown => None,
        }
    }

    /// True when no container header was found.
    #[inline]
    pub fn is_raw(&self) -> bool {
        matches!(self, Self::PcmS16le)
    }
}

impl std::fmt::Display for DetectedFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Classify a buffer by its leading bytes.
pub fn detect(buffer: &[u8]) -> DetectedFormat {
    if buffer.len() < MIN_SNIFF_LEN {
        return DetectedFormat::Unknown;
    }

    if has_id3_tag(buffer) || has_frame_sync(buffer) {
        DetectedFormat::Mp3
    } else if buffer.starts_with(RIFF_MAGIC) {
        DetectedFormat::Wav
    } else {
        DetectedFormat::PcmS16le
    }
}

/// True when `buffer` sniffs as MP3.
#[inline]
pub fn is_mp3(buffer: &[u8]) -> bool {
    detect(buffer) == DetectedFormat::Mp3
}

/// `ID3` v2 tag at offset 0.
#[inline]
pub fn has_id3_tag(buffer: &[u8]) -> bool {
    buffer.starts_with(ID3_MAGIC)
}

/// MPEG frame sync at offset 0: `0xFF` then 3 set bits.
#[inline]
pub fn has_frame_sync(buffer: &[u8]) -> bool {
    buffer.len() >= 2 && buffer[0] == 0xFF && buffer[1] & 0xE0 == 0xE0
}

/// Stricter check of the 4-byte MPEG audio frame header at offset 0.
///
/// Rejects reserved version/layer values, the "bad" bitrate index and the
/// reserved sample-rate index. Raw µ-law silence (`0xFF 0xFF ..`) passes the
/// frame-sync test but fails this one.
pub fn has_valid_mpeg_frame_header(buffer: &[u8]) -> bool {
    if buffer.len() < MIN_SNIFF_LEN || !has_frame_sync(buffer) {
        return false;
    }

    let version = (buffer[1] >> 3) & 0x03;
    let layer = (buffer[1] >> 1) & 0x03;
    let bitrate_index = buffer[2] >> 4;
    let sample_rate_index = (buffer[2] >> 2) & 0x03;

    version != 0b01 && layer != 0b00 && bitrate_index != 0x0F && sample_rate_index != 0b11
}

/// kbps for bitrate indices 1..=14, per (version, layer) family.
const BITRATES_V1_L1: [u32; 14] = [32, 64, 96, 128, 160, 192, 224, 256, 288, 320, 352, 384, 416, 448];
const BITRATES_V1_L2: [u32; 14] = [32, 48, 56, 64, 80, 96, 112, 128, 160, 192, 224, 256, 320, 384];
const BITRATES_V1_L3: [u32; 14] = [32, 40, 48, 56, 64, 80, 96, 112, 128, 160, 192, 224, 256, 320];
const BITRATES_V2_L1: [u32; 14] = [32, 48, 56, 64, 80, 96, 112, 128, 144, 160, 176, 192, 224, 256];
const BITRATES_V2_L23: [u32; 14] = [8, 16, 24, 32, 40, 48, 56, 64, 80, 96, 112, 128, 144, 160];

const MPEG_VERSION_1: u8 = 0b11;
const MPEG_VERSION_2: u8 = 0b10;
const LAYER_I: u8 = 0b11;
const LAYER_II: u8 = 0b10;

/// Length in bytes of the MPEG frame whose header starts `buffer`.
///
/// `None` for an invalid header or a free-format (index 0) bitrate.
pub fn mpeg_frame_len(buffer: &[u8]) -> Option<usize> {
    if !has_valid_mpeg_frame_header(buffer) {
        return None;
    }

    let version = (buffer[1] >> 3) & 0x03;
    let layer = (buffer[1] >> 1) & 0x03;
    let bitrate_index = (buffer[2] >> 4) as usize;
    let sample_rate_index = ((buffer[2] >> 2) & 0x03) as usize;
    let padding = ((buffer[2] >> 1) & 0x01) as u32;

    if bitrate_index == 0 {
        return None;
    }

    let table = match (version == MPEG_VERSION_1, layer) {
        (true, LAYER_I) => &BITRATES_V1_L1,
        (true, LAYER_II) => &BITRATES_V1_L2,
        (true, _) => &BITRATES_V1_L3,
        (false, LAYER_I) => &BITRATES_V2_L1,
        (false, _) => &BITRATES_V2_L23,
    };
    let bitrate = table[bitrate_index - 1] * 1000;

    let base_rate = [44100u32, 48000, 32000][sample_rate_index];
    let sample_rate = match version {
        MPEG_VERSION_1 => base_rate,
        MPEG_VERSION_2 => base_rate / 2,
        _ => base_rate / 4,
    };

    let len = match layer {
        LAYER_I => (12 * bitrate / sample_rate + padding) * 4,
        LAYER_II => 144 * bitrate / sample_rate + padding,
        _ if version == MPEG_VERSION_1 => 144 * bitrate / sample_rate + padding,
        _ => 72 * bitrate / sample_rate + padding,
    };

    Some(len as usize)
}

/// A valid frame header at offset 0 and a second one, from the same stream,
/// exactly where the first frame ends.
///
/// A single header-shaped prefix turns up in raw µ-law (`FF FF 7B ..` is a
/// valid MPEG-1 Layer I header); a chained pair does not.
pub fn has_mpeg_frame_sequence(buffer: &[u8]) -> bool {
    let Some(len) = mpeg_frame_len(buffer) else {
        return false;
    };
    let Some(next) = buffer.get(len..) else {
        return false;
    };

    has_valid_mpeg_frame_header(next)
        // version, layer and sample-rate index stay fixed within a stream
        && next[1] & 0xFE == buffer[1] & 0xFE
        && next[2] & 0x0C == buffer[2] & 0x0C
}
