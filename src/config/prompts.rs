//! Prompt templates for Lorekeeper.
//!
//! Prompts can be customized by placing TOML files in the custom prompts directory.

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::OnceLock;

fn placeholder_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{\{(\w+)\}\}").expect("valid placeholder regex"))
}

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Prompts {
    /// Prompts for transcript correction.
    pub cleanup: CleanupPrompts,
    /// Prompts for structured lore extraction.
    pub extraction: ExtractionPrompts,
    pub rag: RagPrompts,
    /// Custom variables from config, available in all prompts.
    #[serde(skip)]
    pub variables: std::collections::HashMap<String, String>,
}

/// Prompts for transcript correction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CleanupPrompts {
    pub system: String,
}

impl Default for CleanupPrompts {
    fn default() -> Self {
        Self {
            system: r#"You are a professional proofreader of automatic speech recognition transcripts for the animated series {{series}}.
Fix the errors in the JSON you are given while keeping the tone, slang and profanity of the original intact.

Rules:
1. Fix typos and phonetic mistakes.
2. Fix proper names of characters, species, ships and places.
3. Remove censorship: replace masked words such as "k***a" with the full word.
4. Do NOT change the JSON structure. Return exactly the same list of objects, correcting only the "text" fields.
5. Do not add anything of your own. Be precise, not creative.

The raw JSON follows:"#
                .to_string(),
        }
    }
}

/// Prompts for structured lore extraction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionPrompts {
    pub system: String,
}

impl Default for ExtractionPrompts {
    fn default() -> Self {
        Self {
            system: r#"You are the chief archivist of the {{series}} universe. Turn a raw audio transcript (JSON segments) into a structured encyclopedia entry.

Stay faithful to the source material. Do not censor anything and keep the original spelling of proper names.

Analysis rules:
1. LORE & FACTS: extract hard facts about the world (technology, species, locations, history). Ignore meaningless chatter.
2. CONSERVATIVE ATTRIBUTION: the transcript has no speaker labels. Put a quote in "attributed_quotes" ONLY when the speaker is certain (a name is said, the context is unambiguous). When in doubt, put it in "unattributed_gems". Do not guess.
3. STYLE & VOCABULARY: collect the characteristic words of the episode.

Respond with a single JSON object of this shape:
{
  "episode_id": "string",
  "title": "string",
  "synopsis": "2-3 sentence plot summary",
  "character_actions": [{"name": "string", "role_in_episode": "string", "traits_exhibited": ["string"]}],
  "lore_facts": [{"category": "Technology | Species | Location | History", "fact": "string"}],
  "quotes": {
    "episode_vocabulary": ["string"],
    "attributed_quotes": [{"speaker": "string", "text": "string", "confidence": "High | Medium", "context": "string or null"}],
    "unattributed_gems": ["string"]
  }
}"#
                .to_string(),
        }
    }
}

/// Prompts for RAG response generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RagPrompts {
    pub system: String,
    pub user: String,
    /// Marker after which a model that echoes the template starts its answer.
    pub answer_marker: String,
}

impl Default for RagPrompts {
    fn default() -> Self {
        Self {
            system: r#"You are a character from the {{series}} universe. Answer in the blunt, irreverent voice of the series, using only the lore provided as context. If the context does not cover the question, say so in character."#
                .to_string(),

            user: r#"### Instruction:
Answer the question based on the context below.

Context:
{{context}}

Question:
{{question}}

### Answer:
"#
            .to_string(),

            answer_marker: "### Answer:".to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts from the default location, with optional custom directory and variables.
    pub fn load(
        custom_dir: Option<&str>,
        custom_variables: Option<&std::collections::HashMap<String, String>>,
    ) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(vars) = custom_variables {
            prompts.variables = vars.clone();
        }

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            let cleanup_path = custom_path.join("cleanup.toml");
            if cleanup_path.exists() {
                let content = std::fs::read_to_string(&cleanup_path)?;
                prompts.cleanup = toml::from_str(&content)?;
            }

            let extraction_path = custom_path.join("extraction.toml");
            if extraction_path.exists() {
                let content = std::fs::read_to_string(&extraction_path)?;
                prompts.extraction = toml::from_str(&content)?;
            }

            let rag_path = custom_path.join("rag.toml");
            if rag_path.exists() {
                let content = std::fs::read_to_string(&rag_path)?;
                prompts.rag = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }

    /// Render a prompt template with the given variables.
    ///
    /// Placeholders are substituted in a single pass, so substituted values
    /// are never expanded again. Unknown placeholders are left as written.
    pub fn render(template: &str, vars: &std::collections::HashMap<String, String>) -> String {
        placeholder_re()
            .replace_all(template, |caps: &Captures<'_>| match vars.get(&caps[1]) {
                Some(value) => value.clone(),
                None => caps[0].to_string(),
            })
            .into_owned()
    }

    /// Render a prompt template with both provided variables and custom config variables.
    /// Provided variables take precedence over custom config variables.
    pub fn render_with_custom(
        &self,
        template: &str,
        vars: &std::collections::HashMap<String, String>,
    ) -> String {
        let mut merged = self.variables.clone();
        merged
            .entry("series".to_string())
            .or_insert_with(|| "Kapitan Bomba".to_string());
        for (key, value) in vars {
            merged.insert(key.clone(), value.clone());
        }
        Self::render(template, &merged)
    }
}
