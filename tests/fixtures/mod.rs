//! Test Fixtures Module
//!
//! Programmatically generated audio for pipeline tests:
//! - PCM16 tones and silence
//! - WAV containers (built with `hound`)
//! - MP3-looking payloads (ID3 tag and bare frame headers)
//! - Raw µ-law buffers

// Not every integration test binary uses every fixture
#![allow(dead_code)]

pub mod audio_fixtures;

pub use audio_fixtures::*;
