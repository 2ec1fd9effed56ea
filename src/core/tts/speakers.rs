//! Versioned Sarvam speaker table.
//!
//! The table is the single source of truth for which identifiers route to
//! Sarvam under `auto` provider selection. It is built once at startup and
//! shared read-only between requests.

use serde::{Deserialize, Serialize};

/// Table version shipped with the crate.
pub const DEFAULT_SPEAKER_TABLE_VERSION: u32 = 2;

/// Sarvam model the default speakers belong to.
pub const DEFAULT_SPEAKER_MODEL: &str = "bulbul:v2";

/// Speaker used when Sarvam is chosen without one.
pub const DEFAULT_SARVAM_SPEAKER: &str = "anushka";

/// Speakers available on `bulbul:v2`.
pub const DEFAULT_SARVAM_SPEAKERS: &[&str] = &[
    "anushka", "manisha", "vidya", "arya", "abhilash", "karun", "hitesh",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeakerTable {
    pub version: u32,
    pub model: String,
    pub default_speaker: String,
    speakers: Vec<String>,
}

impl Default for SpeakerTable {
    fn default() -> Self {
        Self {
            version: DEFAULT_SPEAKER_TABLE_VERSION,
            model: DEFAULT_SPEAKER_MODEL.to_string(),
            default_speaker: DEFAULT_SARVAM_SPEAKER.to_string(),
            speakers: DEFAULT_SARVAM_SPEAKERS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl SpeakerTable {
    /// Build a table. Names are trimmed and lowercased, duplicates dropped.
    ///
    /// # Errors
    /// Fails when the list is empty or `default_speaker` is not in it.
    pub fn new<I, S>(
        version: u32,
        model: impl Into<String>,
        default_speaker: impl AsRef<str>,
        speakers: I,
    ) -> Result<Self, String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut normalized: Vec<String> = Vec::new();
        for speaker in speakers {
            let name = speaker.as_ref().trim().to_lowercase();
            if !name.is_empty() && !normalized.contains(&name) {
                normalized.push(name);
            }
        }

        if normalized.is_empty() {
            return Err("Speaker table must contain at least one speaker".to_string());
        }

        let default_speaker = default_speaker.as_ref().trim().to_lowercase();
        if !normalized.contains(&default_speaker) {
            return Err(format!(
                "Default speaker '{default_speaker}' is not in the speaker table"
            ));
        }

        Ok(Self {
            version,
            model: model.into(),
            default_speaker,
            speakers: normalized,
        })
    }

    /// Case-insensitive exact membership test.
    pub fn contains(&self, id: &str) -> bool {
        self.resolve(id).is_some()
    }

    /// Canonical (lowercase) name for `id`, if listed.
    pub fn resolve(&self, id: &str) -> Option<&str> {
        let wanted = id.trim().to_lowercase();
        self.speakers
            .iter()
            .find(|s| **s == wanted)
            .map(String::as_str)
    }

    pub fn speakers(&self) -> &[String] {
        &self.speakers
    }

    pub fn len(&self) -> usize {
        self.speakers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.speakers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table() {
        let table = SpeakerTable::default();
        assert_eq!(table.version, 2);
        assert_eq!(table.model, "bulbul:v2");
        assert_eq!(table.default_speaker, "anushka");
        assert_eq!(table.len(), 7);
    }

    #[test]
    fn test_contains_is_case_insensitive_exact() {
        let table = SpeakerTable::default();
        assert!(table.contains("anushka"));
        assert!(table.contains("Anushka"));
        assert!(table.contains("  HITESH "));
        assert!(!table.contains("anush"));
        assert!(!table.contains("anushka2"));
        assert!(!table.contains("21m00Tcm4TlvDq8ikWAM"));
        assert_eq!(table.resolve("Vidya"), Some("vidya"));
    }

    #[test]
    fn test_new_normalizes() {
        let table = SpeakerTable::new(3, "bulbul:v3", "Meera", ["Meera", "meera", " Arvind ", ""])
            .unwrap();
        assert_eq!(table.speakers(), &["meera".to_string(), "arvind".to_string()]);
        assert_eq!(table.default_speaker, "meera");
    }

    #[test]
    fn test_new_rejects_invalid() {
        let empty: [&str; 0] = [];
        assert!(SpeakerTable::new(1, "m", "a", empty).is_err());
        assert!(SpeakerTable::new(1, "m", "zoe", ["anushka"]).is_err());
    }
}
