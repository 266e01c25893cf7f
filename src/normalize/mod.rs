//! Record normalization into retrievable fragments.
//!
//! One [`EpisodeRecord`] fans out into a flat, ordered list of self-contained
//! [`Fragment`]s: synopsis, lore facts, character profiles, attributed quotes,
//! then unattributed gems. Each sub-list keeps its original order.

use crate::error::LoreError;
use crate::record::{parse_record, EpisodeRecord};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Text substituted for a fragment whose composed text is empty.
pub const FALLBACK_TEXT: &str = "Empty content";

/// Category used for lore facts without one.
pub const DEFAULT_CATEGORY: &str = "General";

/// Kind of content a fragment carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FragmentKind {
    Synopsis,
    LoreFact,
    CharacterProfile,
    Quote,
    QuoteUnattributed,
}

impl FragmentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FragmentKind::Synopsis => "synopsis",
            FragmentKind::LoreFact => "lore_fact",
            FragmentKind::CharacterProfile => "character_profile",
            FragmentKind::Quote => "quote",
            FragmentKind::QuoteUnattributed => "quote_unattributed",
        }
    }
}

impl std::fmt::Display for FragmentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A unit of retrievable text with its metadata envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fragment {
    pub kind: FragmentKind,
    pub text: String,
    pub metadata: BTreeMap<String, String>,
}

impl Fragment {
    /// Build a fragment. Empty text is replaced with [`FALLBACK_TEXT`].
    pub fn new(kind: FragmentKind, text: String, mut metadata: BTreeMap<String, String>) -> Self {
        let text = if text.is_empty() {
            FALLBACK_TEXT.to_string()
        } else {
            text
        };
        metadata.insert("type".to_string(), kind.as_str().to_string());
        Self {
            kind,
            text,
            metadata,
        }
    }

    /// Episode this fragment came from.
    pub fn episode_id(&self) -> &str {
        self.metadata.get("episode_id").map(String::as_str).unwrap_or_default()
    }

    /// File the source record was read from.
    pub fn source_file(&self) -> &str {
        self.metadata.get("source_file").map(String::as_str).unwrap_or_default()
    }
}

/// Normalize one record into fragments.
pub fn normalize(record: &EpisodeRecord, source_file: &str) -> Vec<Fragment> {
    let mut base = BTreeMap::new();
    base.insert("episode_id".to_string(), record.episode_id.clone());
    base.insert("title".to_string(), record.title.clone());
    base.insert("source_file".to_string(), source_file.to_string());

    let mut fragments = Vec::new();

    if let Some(synopsis) = record.synopsis.as_deref().filter(|s| !s.is_empty()) {
        fragments.push(Fragment::new(
            FragmentKind::Synopsis,
            synopsis.to_string(),
            envelope(&base, &[]),
        ));
    }

    for fact in record.lore_facts.iter().filter(|f| !f.fact.is_empty()) {
        let category = fact.category.as_deref().unwrap_or(DEFAULT_CATEGORY);
        fragments.push(Fragment::new(
            FragmentKind::LoreFact,
            format!("Fact ({}): {}", category, fact.fact),
            envelope(&base, &[("category", category)]),
        ));
    }

    for action in &record.character_actions {
        fragments.push(Fragment::new(
            FragmentKind::CharacterProfile,
            format!(
                "Character: {}. Role: {} Traits: {}.",
                action.name,
                action.role,
                action.traits.join(", ")
            ),
            envelope(&base, &[("character", action.name.as_str())]),
        ));
    }

    // Attributed quotes carry no empty-text guard, unlike facts and gems.
    // Kept as-is so fragment counts match existing indexes.
    for quote in &record.quotes.attributed {
        let mut text = format!("{} said: \"{}\"", quote.speaker, quote.text);
        if let Some(context) = quote.context.as_deref().filter(|c| !c.is_empty()) {
            text.push_str(&format!(" (Context: {})", context));
        }
        fragments.push(Fragment::new(
            FragmentKind::Quote,
            text,
            envelope(&base, &[
                ("speaker", quote.speaker.as_str()),
                ("confidence", quote.confidence.as_str()),
            ]),
        ));
    }

    for gem in record.quotes.unattributed.iter().filter(|g| !g.is_empty()) {
        fragments.push(Fragment::new(
            FragmentKind::QuoteUnattributed,
            format!("Quote from the universe: \"{}\"", gem),
            envelope(&base, &[]),
        ));
    }

    debug!(
        "Normalized {} into {} fragments",
        source_file,
        fragments.len()
    );
    fragments
}

/// Every fragment starts from its own copy of the base envelope.
fn envelope(base: &BTreeMap<String, String>, extra: &[(&str, &str)]) -> BTreeMap<String, String> {
    let mut metadata = base.clone();
    for (key, value) in extra {
        metadata.insert(key.to_string(), value.to_string());
    }
    metadata
}

/// A record that could not be ingested.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedRecord {
    pub source_file: String,
    pub reason: String,
}

/// Outcome of normalizing a batch of raw records.
#[derive(Debug, Default)]
pub struct NormalizeReport {
    /// Fragments from every valid record, in input order.
    pub fragments: Vec<Fragment>,
    /// Number of records ingested successfully.
    pub records: usize,
    /// Source files of the ingested records, in input order, including
    /// records that produced no fragments.
    pub sources: Vec<String>,
    /// Records rejected at ingestion.
    pub skipped: Vec<SkippedRecord>,
}

/// Ingest and normalize `(source_file, raw_json)` pairs.
///
/// A malformed record is logged and skipped; the rest of the batch continues.
pub fn normalize_batch<I, S, R>(inputs: I) -> NormalizeReport
where
    I: IntoIterator<Item = (S, R)>,
    S: AsRef<str>,
    R: AsRef<str>,
{
    let mut report = NormalizeReport::default();

    for (source_file, raw) in inputs {
        let source_file = source_file.as_ref();
        match parse_record(raw.as_ref(), source_file) {
            Ok(record) => {
                report.fragments.extend(normalize(&record, source_file));
                report.sources.push(source_file.to_string());
                report.records += 1;
            }
            Err(e) => {
                warn!("Skipping record: {}", e);
                let reason = match e {
                    LoreError::MalformedRecord { reason, .. } => reason,
                    other => other.to_string(),
                };
                report.skipped.push(SkippedRecord {
                    source_file: source_file.to_string(),
                    reason,
                });
            }
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{AttributedQuote, CharacterAction, Confidence, LoreFact, Quotes};

    fn full_record() -> EpisodeRecord {
        EpisodeRecord {
            episode_id: "7".to_string(),
            title: "Sraturn".to_string(),
            synopsis: Some("The crew lands on Sraturn.".to_string()),
            lore_facts: vec![
                LoreFact {
                    category: Some("Location".to_string()),
                    fact: "Sraturn has rings.".to_string(),
                },
                LoreFact {
                    category: None,
                    fact: "Ships run on fuel.".to_string(),
                },
            ],
            character_actions: vec![CharacterAction {
                name: "Torpeda".to_string(),
                role: "Pilots the ship.".to_string(),
                traits: vec!["reckless".to_string(), "loud".to_string()],
            }],
            quotes: Quotes {
                attributed: vec![
                    AttributedQuote {
                        speaker: "Captain".to_string(),
                        text: "Fire!".to_string(),
                        confidence: Confidence::High,
                        context: Some("During the battle".to_string()),
                    },
                    AttributedQuote {
                        speaker: "Janusz".to_string(),
                        text: "Again?".to_string(),
                        confidence: Confidence::Medium,
                        context: None,
                    },
                ],
                unattributed: vec!["Famous line".to_string()],
                vocabulary: vec!["kosmita".to_string()],
            },
        }
    }

    #[test]
    fn test_completeness_and_group_order() {
        let record = full_record();
        let fragments = normalize(&record, "ep7.json");

        assert_eq!(fragments.len(), 1 + 2 + 1 + 2 + 1);
        let kinds: Vec<FragmentKind> = fragments.iter().map(|f| f.kind).collect();
        assert_eq!(
            kinds,
            vec![
                FragmentKind::Synopsis,
                FragmentKind::LoreFact,
                FragmentKind::LoreFact,
                FragmentKind::CharacterProfile,
                FragmentKind::Quote,
                FragmentKind::Quote,
                FragmentKind::QuoteUnattributed,
            ]
        );
        assert_eq!(fragments[1].text, "Fact (Location): Sraturn has rings.");
        assert_eq!(fragments[2].text, "Fact (General): Ships run on fuel.");
        assert_eq!(fragments[2].metadata["category"], "General");
    }

    #[test]
    fn test_fragment_texts_and_metadata() {
        let fragments = normalize(&full_record(), "ep7.json");

        let profile = &fragments[3];
        assert_eq!(
            profile.text,
            "Character: Torpeda. Role: Pilots the ship. Traits: reckless, loud."
        );
        assert_eq!(profile.metadata["character"], "Torpeda");

        let quote = &fragments[4];
        assert_eq!(quote.text, "Captain said: \"Fire!\" (Context: During the battle)");
        assert_eq!(quote.metadata["speaker"], "Captain");
        assert_eq!(quote.metadata["confidence"], "High");
        assert_eq!(fragments[5].text, "Janusz said: \"Again?\"");
        assert_eq!(fragments[5].metadata["confidence"], "Medium");

        for fragment in &fragments {
            assert_eq!(fragment.metadata["episode_id"], "7");
            assert_eq!(fragment.metadata["title"], "Sraturn");
            assert_eq!(fragment.metadata["source_file"], "ep7.json");
            assert_eq!(fragment.metadata["type"], fragment.kind.as_str());
        }
    }

    #[test]
    fn test_spec_scenario() {
        let record = EpisodeRecord {
            episode_id: "Unknown".to_string(),
            title: "T".to_string(),
            synopsis: Some(String::new()),
            lore_facts: vec![LoreFact {
                category: Some("Tech".to_string()),
                fact: "Ships use X".to_string(),
            }],
            character_actions: vec![],
            quotes: Quotes {
                attributed: vec![],
                unattributed: vec!["Famous line".to_string()],
                vocabulary: vec![],
            },
        };

        let fragments = normalize(&record, "t.json");
        assert_eq!(fragments.len(), 2);
        assert_eq!(fragments[0].kind, FragmentKind::LoreFact);
        assert_eq!(fragments[0].text, "Fact (Tech): Ships use X");
        assert_eq!(fragments[1].kind, FragmentKind::QuoteUnattributed);
        assert_eq!(fragments[1].text, "Quote from the universe: \"Famous line\"");
    }

    #[test]
    fn test_empty_leaves_and_no_empty_text() {
        let record = EpisodeRecord {
            episode_id: "1".to_string(),
            title: "Empty".to_string(),
            synopsis: Some(String::new()),
            lore_facts: vec![LoreFact {
                category: Some("Tech".to_string()),
                fact: String::new(),
            }],
            character_actions: vec![CharacterAction {
                name: String::new(),
                role: String::new(),
                traits: vec![],
            }],
            quotes: Quotes {
                attributed: vec![AttributedQuote {
                    speaker: String::new(),
                    text: String::new(),
                    confidence: Confidence::Medium,
                    context: Some(String::new()),
                }],
                unattributed: vec![String::new()],
                vocabulary: vec![],
            },
        };

        let fragments = normalize(&record, "empty.json");
        let kinds: Vec<FragmentKind> = fragments.iter().map(|f| f.kind).collect();
        assert_eq!(kinds, vec![FragmentKind::CharacterProfile, FragmentKind::Quote]);
        assert_eq!(fragments[0].text, "Character: . Role:  Traits: .");
        assert_eq!(fragments[1].text, " said: \"\"");
        assert!(fragments.iter().all(|f| !f.text.is_empty()));
    }

    #[test]
    fn test_fallback_text() {
        let fragment = Fragment::new(FragmentKind::Synopsis, String::new(), BTreeMap::new());
        assert_eq!(fragment.text, FALLBACK_TEXT);
        assert_eq!(fragment.metadata["type"], "synopsis");
    }

    #[test]
    fn test_metadata_isolation() {
        let mut fragments = normalize(&full_record(), "ep7.json");
        let before = fragments[1].metadata.clone();

        fragments[0]
            .metadata
            .insert("episode_id".to_string(), "mutated".to_string());
        fragments[0].metadata.remove("title");

        assert_eq!(fragments[1].metadata, before);
        assert_eq!(fragments[1].episode_id(), "7");
    }

    #[test]
    fn test_deterministic() {
        let record = full_record();
        assert_eq!(normalize(&record, "ep7.json"), normalize(&record, "ep7.json"));
    }

    #[test]
    fn test_batch_skips_malformed_records() {
        let inputs = vec![
            ("a.json", r#"{"title": "A", "synopsis": "First."}"#),
            ("bad.json", r#"{"synopsis": "no title"}"#),
            ("c.json", r#"{"title": "C", "quotes": {"unattributed_gems": ["Hi"]}}"#),
        ];

        let report = normalize_batch(inputs);
        assert_eq!(report.records, 2);
        assert_eq!(report.sources, vec!["a.json", "c.json"]);
        assert_eq!(report.fragments.len(), 2);
        assert_eq!(report.fragments[0].source_file(), "a.json");
        assert_eq!(report.fragments[1].source_file(), "c.json");
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].source_file, "bad.json");
        assert!(report.skipped[0].reason.contains("title"));
    }

    #[test]
    fn test_batch_tracks_records_without_fragments() {
        let inputs = vec![("empty.json", r#"{"title": "Empty"}"#)];

        let report = normalize_batch(inputs);
        assert_eq!(report.records, 1);
        assert!(report.fragments.is_empty());
        assert_eq!(report.sources, vec!["empty.json"]);
    }
}
