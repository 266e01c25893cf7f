//! Episode records produced by lore extraction.
//!
//! A record is validated once at ingestion. Required fields must be present,
//! optional fields may be missing, defaulted fields fall back to empty values.
//! Anything that does not fit the schema becomes a
//! [`LoreError::MalformedRecord`].

use crate::error::{LoreError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Episode identifier used when none could be determined.
pub const UNKNOWN_EPISODE: &str = "Unknown";

fn unknown_episode() -> String {
    UNKNOWN_EPISODE.to_string()
}

/// One processed source item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeRecord {
    #[serde(default = "unknown_episode")]
    pub episode_id: String,
    pub title: String,
    #[serde(default)]
    pub synopsis: Option<String>,
    #[serde(default)]
    pub lore_facts: Vec<LoreFact>,
    #[serde(default)]
    pub character_actions: Vec<CharacterAction>,
    #[serde(default)]
    pub quotes: Quotes,
}

/// A fact about the fictional world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoreFact {
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub fact: String,
}

/// What a character did in an episode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterAction {
    pub name: String,
    #[serde(default, rename = "role_in_episode", alias = "role")]
    pub role: String,
    #[serde(default, rename = "traits_exhibited", alias = "traits")]
    pub traits: Vec<String>,
}

/// How sure the extractor was about a quote's speaker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Confidence {
    High,
    Medium,
}

impl Confidence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Confidence::High => "High",
            Confidence::Medium => "Medium",
        }
    }
}

impl std::fmt::Display for Confidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A quote with a known speaker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributedQuote {
    pub speaker: String,
    pub text: String,
    pub confidence: Confidence,
    #[serde(default)]
    pub context: Option<String>,
}

/// Quotes collected from an episode.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Quotes {
    #[serde(default, rename = "attributed_quotes", alias = "attributed")]
    pub attributed: Vec<AttributedQuote>,
    #[serde(default, rename = "unattributed_gems", alias = "unattributed")]
    pub unattributed: Vec<String>,
    /// Characteristic words of the episode. Kept with the record, not indexed.
    #[serde(default, rename = "episode_vocabulary", alias = "vocabulary")]
    pub vocabulary: Vec<String>,
}

/// Parse and validate a record from raw JSON.
pub fn parse_record(raw: &str, source_file: &str) -> Result<EpisodeRecord> {
    serde_json::from_str(raw).map_err(|e| LoreError::malformed(source_file, e))
}

/// Parse and validate a record from an already decoded JSON value.
pub fn record_from_value(value: serde_json::Value, source_file: &str) -> Result<EpisodeRecord> {
    serde_json::from_value(value).map_err(|e| LoreError::malformed(source_file, e))
}

/// Load a record from a JSON file.
pub fn load_record(path: &Path) -> Result<EpisodeRecord> {
    let raw = std::fs::read_to_string(path)?;
    parse_record(&raw, &source_file_name(path))
}

/// The name a record is tracked under: its file name, or the full path if it has none.
pub fn source_file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_RECORD: &str = r#"{
        "episode_id": "12",
        "title": "Kurvinox Attack",
        "synopsis": "The crew fights off an invasion.",
        "character_actions": [
            {"name": "Captain", "role_in_episode": "Leads the defence.", "traits_exhibited": ["brave", "rude"]}
        ],
        "lore_facts": [
            {"category": "Species", "fact": "Kurvinoxes have a pocket."}
        ],
        "quotes": {
            "episode_vocabulary": ["napierdalać"],
            "attributed_quotes": [
                {"speaker": "Captain", "text": "Fire!", "confidence": "High", "context": null}
            ],
            "unattributed_gems": ["Famous line"]
        }
    }"#;

    #[test]
    fn test_parse_full_record() {
        let record = parse_record(FULL_RECORD, "ep12.json").unwrap();

        assert_eq!(record.episode_id, "12");
        assert_eq!(record.character_actions[0].role, "Leads the defence.");
        assert_eq!(record.character_actions[0].traits, vec!["brave", "rude"]);
        assert_eq!(record.lore_facts[0].category.as_deref(), Some("Species"));
        assert_eq!(record.quotes.attributed[0].confidence, Confidence::High);
        assert_eq!(record.quotes.attributed[0].context, None);
        assert_eq!(record.quotes.unattributed, vec!["Famous line"]);
        assert_eq!(record.quotes.vocabulary, vec!["napierdalać"]);
    }

    #[test]
    fn test_defaults_and_aliases() {
        let raw = r#"{
            "title": "Short",
            "character_actions": [{"name": "Torpeda", "role": "Pilot", "traits": []}],
            "lore_facts": [{"fact": "No category here"}],
            "quotes": {"unattributed": ["gem"]}
        }"#;

        let record = parse_record(raw, "short.json").unwrap();
        assert_eq!(record.episode_id, UNKNOWN_EPISODE);
        assert_eq!(record.synopsis, None);
        assert_eq!(record.character_actions[0].role, "Pilot");
        assert_eq!(record.lore_facts[0].category, None);
        assert!(record.quotes.attributed.is_empty());
        assert_eq!(record.quotes.unattributed, vec!["gem"]);
    }

    #[test]
    fn test_missing_title_is_malformed() {
        let err = parse_record(r#"{"episode_id": "1"}"#, "bad.json").unwrap_err();
        match err {
            LoreError::MalformedRecord { source_file, reason } => {
                assert_eq!(source_file, "bad.json");
                assert!(reason.contains("title"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_ill_typed_nested_field_is_malformed() {
        let raw = r#"{"title": "x", "lore_facts": "not a list"}"#;
        assert!(matches!(
            parse_record(raw, "x.json"),
            Err(LoreError::MalformedRecord { .. })
        ));

        let raw = r#"{"title": "x", "quotes": {"attributed_quotes": [
            {"speaker": "A", "text": "B", "confidence": "Low"}
        ]}}"#;
        assert!(matches!(
            parse_record(raw, "x.json"),
            Err(LoreError::MalformedRecord { .. })
        ));
    }

    #[test]
    fn test_load_record_uses_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ not json").unwrap();

        match load_record(&path).unwrap_err() {
            LoreError::MalformedRecord { source_file, .. } => assert_eq!(source_file, "broken.json"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
