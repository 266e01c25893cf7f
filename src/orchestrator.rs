//! Pipeline orchestrator for Lorekeeper.
//!
//! Drives the per-file batch stages (transcript cleanup, lore extraction),
//! indexes extracted records into the vector store, and wires the RAG engine.
//!
//! Batch stages walk `*.json` inputs in sorted order, one request at a time.
//! An input whose output already exists is skipped, each model call runs
//! under the retry policy, a pause follows every success, and failed inputs
//! are appended to the failure log.

use crate::config::{BatchConfig, Prompts, Settings, Stage};
use crate::embedding::{Embedder, OpenAIEmbedder};
use crate::error::{LoreError, Result};
use crate::extraction::{
    parse_episode_filename, LoreExtractor, OpenAICleaner, OpenAIExtractor, TranscriptCleaner,
};
use crate::normalize::{normalize_batch, Fragment, SkippedRecord};
use crate::rag::{OpenAIGenerator, RagEngine};
use crate::record::source_file_name;
use crate::retry::retry;
use crate::stats::LengthStats;
use crate::tokenizer::{create_tokenizer, Tokenizer};
use crate::vector_store::{Document, MemoryVectorStore, SqliteVectorStore, VectorStore};
use async_trait::async_trait;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::{BTreeMap, BTreeSet};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Outcome of a batch stage.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BatchReport {
    /// Inputs processed successfully in this run.
    pub processed: usize,
    /// Inputs skipped because their output already existed.
    pub skipped_existing: usize,
    /// Inputs that failed after all retries.
    pub failed: Vec<String>,
}

/// Outcome of indexing the lore directory.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct IndexReport {
    /// Records ingested successfully.
    pub records: usize,
    /// Records whose rows were written or replaced in this run.
    pub records_indexed: usize,
    /// Fragments embedded and stored.
    pub fragments_indexed: usize,
    /// Records that could not be read or were rejected at ingestion.
    pub skipped_records: Vec<SkippedRecord>,
    /// Records left alone because they were already indexed.
    pub already_indexed: usize,
}

/// One per-file transformation run by the batch driver.
#[async_trait]
trait BatchStage: Send + Sync {
    fn name(&self) -> &'static str;

    async fn process(&self, input: &serde_json::Value, file_name: &str)
        -> Result<serde_json::Value>;
}

struct CleanupStage<'a> {
    cleaner: &'a dyn TranscriptCleaner,
}

#[async_trait]
impl BatchStage for CleanupStage<'_> {
    fn name(&self) -> &'static str {
        "Cleaning"
    }

    async fn process(&self, input: &serde_json::Value, _file_name: &str) -> Result<serde_json::Value> {
        self.cleaner.clean(input).await
    }
}

struct ExtractionStage<'a> {
    extractor: &'a dyn LoreExtractor,
    series_prefix: &'a str,
}

#[async_trait]
impl BatchStage for ExtractionStage<'_> {
    fn name(&self) -> &'static str {
        "Extracting"
    }

    async fn process(&self, input: &serde_json::Value, file_name: &str) -> Result<serde_json::Value> {
        let hint = parse_episode_filename(file_name, self.series_prefix);
        let record = self.extractor.extract(input, &hint).await?;
        Ok(serde_json::to_value(record)?)
    }
}

/// Run transcript cleanup over `config.input_dir`.
pub async fn run_cleanup(cleaner: &dyn TranscriptCleaner, config: &BatchConfig) -> Result<BatchReport> {
    run_batch(&CleanupStage { cleaner }, config).await
}

/// Run lore extraction over `config.input_dir`.
pub async fn run_extraction(
    extractor: &dyn LoreExtractor,
    series_prefix: &str,
    config: &BatchConfig,
) -> Result<BatchReport> {
    run_batch(
        &ExtractionStage {
            extractor,
            series_prefix,
        },
        config,
    )
    .await
}

#[instrument(skip_all, fields(stage = stage.name(), input = %config.input_dir.display()))]
async fn run_batch(stage: &dyn BatchStage, config: &BatchConfig) -> Result<BatchReport> {
    let files = list_json_files(&config.input_dir)?;
    std::fs::create_dir_all(&config.output_dir)?;

    info!("{} {} files from {}", stage.name(), files.len(), config.input_dir.display());

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("  {spinner:.green} {prefix} [{bar:30.cyan/blue}] {pos}/{len} {wide_msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░"),
    );
    pb.set_prefix(stage.name());

    let mut report = BatchReport::default();

    for path in files {
        let file_name = source_file_name(&path);
        pb.set_message(file_name.clone());
        let output_path = config.output_dir.join(&file_name);

        if output_path.exists() {
            debug!("{} already exists, skipping", output_path.display());
            report.skipped_existing += 1;
            pb.inc(1);
            continue;
        }

        match process_file(stage, config, &path, &file_name, &output_path).await {
            Ok(()) => {
                report.processed += 1;
                pb.inc(1);
                if !config.request_delay.is_zero() {
                    tokio::time::sleep(config.request_delay).await;
                }
            }
            Err(e) => {
                warn!("{} failed for {}: {}", stage.name(), file_name, e);
                append_failure(&config.failed_log, &file_name)?;
                report.failed.push(file_name);
                pb.inc(1);
            }
        }
    }

    pb.finish_and_clear();

    info!(
        "{} finished: {} processed, {} skipped, {} failed",
        stage.name(),
        report.processed,
        report.skipped_existing,
        report.failed.len()
    );

    Ok(report)
}

async fn process_file(
    stage: &dyn BatchStage,
    config: &BatchConfig,
    path: &Path,
    file_name: &str,
    output_path: &Path,
) -> Result<()> {
    let raw = std::fs::read_to_string(path)?;
    let input: serde_json::Value = serde_json::from_str(&raw)?;

    let output = retry(&config.retry, file_name, || stage.process(&input, file_name)).await?;

    let content = serde_json::to_string_pretty(&output)?;
    std::fs::write(output_path, content)?;
    debug!("Wrote {}", output_path.display());
    Ok(())
}

fn append_failure(log: &Path, file_name: &str) -> Result<()> {
    if let Some(parent) = log.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let mut file = std::fs::OpenOptions::new().create(true).append(true).open(log)?;
    writeln!(file, "{}", file_name)?;
    Ok(())
}

/// `*.json` files directly inside `dir`, sorted by name.
pub fn list_json_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(LoreError::NotFound(format!("Directory not found: {}", dir.display())));
    }

    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "json"))
        .collect();
    files.sort();
    Ok(files)
}

/// The main orchestrator for the Lorekeeper pipeline.
pub struct Orchestrator {
    settings: Settings,
    prompts: Prompts,
    embedder: Arc<dyn Embedder>,
    vector_store: Arc<dyn VectorStore>,
    tokenizer: Arc<dyn Tokenizer>,
}

impl Orchestrator {
    /// Create an orchestrator with components built from `settings`.
    pub fn new(settings: Settings) -> Result<Self> {
        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;

        let embedder: Arc<dyn Embedder> = Arc::new(OpenAIEmbedder::with_config(
            settings.general.api_key.as_deref(),
            &settings.embedding.model,
            settings.embedding.dimensions as usize,
        )?);

        let vector_store: Arc<dyn VectorStore> = match settings.vector_store.provider.as_str() {
            "sqlite" => Arc::new(SqliteVectorStore::new(&settings.sqlite_path())?),
            "memory" => Arc::new(MemoryVectorStore::new()),
            other => {
                return Err(LoreError::Config(format!(
                    "Unknown vector store provider: {}",
                    other
                )))
            }
        };

        let tokenizer = create_tokenizer(settings.tokenizer_path().as_deref())?;

        Ok(Self {
            settings,
            prompts,
            embedder,
            vector_store,
            tokenizer,
        })
    }

    /// Create an orchestrator with custom components.
    pub fn with_components(
        settings: Settings,
        prompts: Prompts,
        embedder: Arc<dyn Embedder>,
        vector_store: Arc<dyn VectorStore>,
        tokenizer: Arc<dyn Tokenizer>,
    ) -> Self {
        Self {
            settings,
            prompts,
            embedder,
            vector_store,
            tokenizer,
        }
    }

    /// Get a reference to the vector store.
    pub fn vector_store(&self) -> Arc<dyn VectorStore> {
        self.vector_store.clone()
    }

    /// Get a reference to the embedder.
    pub fn embedder(&self) -> Arc<dyn Embedder> {
        self.embedder.clone()
    }

    /// Get a reference to the tokenizer.
    pub fn tokenizer(&self) -> Arc<dyn Tokenizer> {
        self.tokenizer.clone()
    }

    /// Get the settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Correct raw transcripts into the clean directory.
    pub async fn clean_transcripts(&self) -> Result<BatchReport> {
        let config = self.settings.batch_config(Stage::Cleanup);
        let cleaner = OpenAICleaner::new(config.api_key.as_deref(), &config.model_name)?
            .with_prompts(self.prompts.clone());
        run_cleanup(&cleaner, &config).await
    }

    /// Extract lore records from cleaned transcripts.
    pub async fn extract_lore(&self) -> Result<BatchReport> {
        let config = self.settings.batch_config(Stage::Extraction);
        let extractor = OpenAIExtractor::new(config.api_key.as_deref(), &config.model_name)?
            .with_prompts(self.prompts.clone())
            .with_temperature(self.settings.extraction.temperature);
        run_extraction(&extractor, &self.settings.extraction.series_prefix, &config).await
    }

    /// Normalize every record in the lore directory and index its fragments.
    ///
    /// Records already in the store are left alone unless `force` is set; a
    /// re-indexed record has its previous fragments replaced.
    #[instrument(skip(self))]
    pub async fn index_lore(&self, force: bool) -> Result<IndexReport> {
        self.index_dir(&self.settings.lore_dir(), force).await
    }

    /// Index every record file in `dir`.
    pub async fn index_dir(&self, dir: &Path, force: bool) -> Result<IndexReport> {
        let files = list_json_files(dir)?;

        let mut inputs = Vec::with_capacity(files.len());
        let mut unreadable = Vec::new();
        for path in &files {
            let source_file = source_file_name(path);
            match std::fs::read_to_string(path) {
                Ok(raw) => inputs.push((source_file, raw)),
                Err(e) => {
                    warn!("Skipping unreadable record {}: {}", source_file, e);
                    unreadable.push(SkippedRecord {
                        source_file,
                        reason: e.to_string(),
                    });
                }
            }
        }

        let normalized = normalize_batch(inputs);
        let mut report = IndexReport {
            records: normalized.records,
            skipped_records: unreadable,
            ..Default::default()
        };
        report.skipped_records.extend(normalized.skipped);
        report.skipped_records.sort_by(|a, b| a.source_file.cmp(&b.source_file));

        // Every ingested record gets an entry, so one that no longer yields
        // fragments still has its old rows removed.
        let mut by_source: BTreeMap<String, Vec<Fragment>> = normalized
            .sources
            .into_iter()
            .map(|source| (source, Vec::new()))
            .collect();
        for fragment in normalized.fragments {
            by_source
                .entry(fragment.source_file().to_string())
                .or_default()
                .push(fragment);
        }

        let mut pending: BTreeSet<String> = BTreeSet::new();
        for source in by_source.keys() {
            if !force && self.vector_store.is_source_indexed(source).await? {
                report.already_indexed += 1;
            } else {
                pending.insert(source.clone());
            }
        }

        let pb = ProgressBar::new(pending.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("  {spinner:.green} Indexing [{bar:30.cyan/blue}] {pos}/{len} {wide_msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("█▓░"),
        );

        for (source, fragments) in by_source {
            if !pending.contains(&source) {
                continue;
            }
            pb.set_message(source.clone());
            report.fragments_indexed += self.index_fragments(&source, &fragments).await?;
            report.records_indexed += 1;
            pb.inc(1);
        }

        pb.finish_and_clear();

        info!(
            "Indexed {} fragments from {} records ({} already indexed, {} skipped)",
            report.fragments_indexed,
            report.records_indexed,
            report.already_indexed,
            report.skipped_records.len()
        );

        Ok(report)
    }

    /// Embed one record's fragments and replace its rows in the store.
    async fn index_fragments(&self, source_file: &str, fragments: &[Fragment]) -> Result<usize> {
        if fragments.is_empty() {
            let removed = self.vector_store.delete_by_source(source_file).await?;
            debug!("{} yields no fragments, removed {} stale rows", source_file, removed);
            return Ok(0);
        }

        let texts: Vec<String> = fragments.iter().map(|f| f.text.clone()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await?;

        if embeddings.len() != fragments.len() {
            return Err(LoreError::Embedding(format!(
                "Expected {} embeddings for {}, got {}",
                fragments.len(),
                source_file,
                embeddings.len()
            )));
        }

        let documents: Vec<Document> = fragments
            .iter()
            .zip(embeddings)
            .enumerate()
            .map(|(order, (fragment, embedding))| {
                Document::from_fragment(fragment, order as i32, embedding)
            })
            .collect();

        self.vector_store.delete_by_source(source_file).await?;
        self.vector_store.upsert_batch(&documents).await
    }

    /// Build the RAG engine, optionally overriding the chat model.
    pub fn rag_engine(&self, model: Option<&str>) -> Result<RagEngine> {
        let model = model.unwrap_or(&self.settings.rag.model);
        let generator = OpenAIGenerator::new(self.settings.general.api_key.as_deref(), model)?
            .with_sampling(self.settings.rag.temperature, self.settings.rag.max_tokens);

        Ok(RagEngine::new(
            self.vector_store.clone(),
            self.embedder.clone(),
            self.tokenizer.clone(),
            Arc::new(generator),
            self.settings.retrieval_config()?,
        )
        .with_prompts(self.prompts.clone()))
    }

    /// Token length statistics over every stored fragment.
    pub async fn fragment_stats(&self) -> Result<Option<LengthStats>> {
        let texts = self.vector_store.all_texts().await?;
        LengthStats::compute(&texts, self.tokenizer.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::testing::HashEmbedder;
    use crate::extraction::EpisodeHint;
    use crate::record::{load_record, EpisodeRecord};
    use crate::retry::{Backoff, RetryPolicy};
    use crate::tokenizer::CharTokenizer;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    fn batch_config(root: &Path) -> BatchConfig {
        BatchConfig {
            input_dir: root.join("in"),
            output_dir: root.join("out"),
            model_name: "test-model".to_string(),
            api_key: None,
            retry: RetryPolicy {
                max_attempts: 2,
                initial_delay: Duration::from_millis(1),
                max_delay: Duration::from_millis(1),
                backoff: Backoff::Fixed,
            },
            request_delay: Duration::ZERO,
            failed_log: root.join("failed_files.txt"),
        }
    }

    /// Upper-cases every `text` field; fails permanently on files containing "broken".
    struct UpperCleaner {
        calls: AtomicU32,
    }

    #[async_trait]
    impl TranscriptCleaner for UpperCleaner {
        async fn clean(&self, transcript: &serde_json::Value) -> Result<serde_json::Value> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut value = transcript.clone();
            let segments = value
                .as_array_mut()
                .ok_or_else(|| LoreError::Cleanup("broken transcript".to_string()))?;
            for segment in segments {
                if let Some(text) = segment.get("text").and_then(|t| t.as_str()) {
                    segment["text"] = text.to_uppercase().into();
                }
            }
            Ok(value)
        }
    }

    struct StubExtractor;

    #[async_trait]
    impl LoreExtractor for StubExtractor {
        async fn extract(
            &self,
            _transcript: &serde_json::Value,
            hint: &EpisodeHint,
        ) -> Result<EpisodeRecord> {
            Ok(EpisodeRecord {
                episode_id: hint.episode_id.clone(),
                title: hint.title.clone(),
                synopsis: Some(format!("Synopsis of {}", hint.title)),
                lore_facts: Vec::new(),
                character_actions: Vec::new(),
                quotes: Default::default(),
            })
        }
    }

    fn orchestrator(store: Arc<dyn VectorStore>) -> Orchestrator {
        Orchestrator::with_components(
            Settings::default(),
            Prompts::default(),
            Arc::new(HashEmbedder::new(64)),
            store,
            Arc::new(CharTokenizer),
        )
    }

    #[tokio::test]
    async fn test_cleanup_batch_skips_existing_and_logs_failures() {
        let dir = tempfile::tempdir().unwrap();
        let config = batch_config(dir.path());
        std::fs::create_dir_all(&config.input_dir).unwrap();
        std::fs::create_dir_all(&config.output_dir).unwrap();

        std::fs::write(config.input_dir.join("a.json"), r#"[{"text": "kurwinox"}]"#).unwrap();
        std::fs::write(config.input_dir.join("b.json"), r#"{"not": "a list"}"#).unwrap();
        std::fs::write(config.input_dir.join("c.json"), r#"[{"text": "done"}]"#).unwrap();
        std::fs::write(config.input_dir.join("notes.txt"), "ignored").unwrap();
        std::fs::write(config.output_dir.join("c.json"), "[]").unwrap();

        let cleaner = UpperCleaner {
            calls: AtomicU32::new(0),
        };
        let report = run_cleanup(&cleaner, &config).await.unwrap();

        assert_eq!(report.processed, 1);
        assert_eq!(report.skipped_existing, 1);
        assert_eq!(report.failed, vec!["b.json"]);
        // b.json is retried once, a.json succeeds first time, c.json is never sent
        assert_eq!(cleaner.calls.load(Ordering::SeqCst), 3);

        let cleaned = std::fs::read_to_string(config.output_dir.join("a.json")).unwrap();
        assert!(cleaned.contains("KURWINOX"));
        assert!(!config.output_dir.join("b.json").exists());

        let failed = std::fs::read_to_string(&config.failed_log).unwrap();
        assert_eq!(failed, "b.json\n");
    }

    #[tokio::test]
    async fn test_extraction_pins_identity_from_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let config = batch_config(dir.path());
        std::fs::create_dir_all(&config.input_dir).unwrap();

        let name = "KAPITAN BOMBA - Sraturn | (ODC. 3).json";
        std::fs::write(config.input_dir.join(name), "[]").unwrap();

        let report = run_extraction(&StubExtractor, "KAPITAN BOMBA - ", &config)
            .await
            .unwrap();
        assert_eq!(report.processed, 1);

        let record = load_record(&config.output_dir.join(name)).unwrap();
        assert_eq!(record.episode_id, "3");
        assert_eq!(record.title, "Sraturn");
    }

    #[tokio::test]
    async fn test_missing_input_dir() {
        let dir = tempfile::tempdir().unwrap();
        let config = batch_config(dir.path());
        let result = run_extraction(&StubExtractor, "", &config).await;
        assert!(matches!(result, Err(LoreError::NotFound(_))));
    }

    fn write_lore(dir: &Path) {
        std::fs::write(
            dir.join("ep1.json"),
            r#"{"episode_id": "1", "title": "Pilot",
                "synopsis": "Torpeda pilots the ship into a Kurvinox nest.",
                "lore_facts": [{"category": "Species", "fact": "Kurvinoxes hide things in a pocket."}]}"#,
        )
        .unwrap();
        std::fs::write(
            dir.join("ep2.json"),
            r#"{"episode_id": "2", "title": "Sraturn", "synopsis": "Sraturn has rings."}"#,
        )
        .unwrap();
        std::fs::write(dir.join("bad.json"), r#"{"episode_id": "3"}"#).unwrap();
    }

    #[tokio::test]
    async fn test_index_and_retrieve() {
        let dir = tempfile::tempdir().unwrap();
        write_lore(dir.path());

        let store = Arc::new(MemoryVectorStore::new());
        let orchestrator = orchestrator(store.clone());

        let report = orchestrator.index_dir(dir.path(), false).await.unwrap();
        assert_eq!(report.records, 2);
        assert_eq!(report.fragments_indexed, 3);
        assert_eq!(report.skipped_records.len(), 1);
        assert_eq!(report.skipped_records[0].source_file, "bad.json");

        let query = orchestrator.embedder().embed("Sraturn has rings").await.unwrap();
        let results = store.search(&query, 1).await.unwrap();
        assert_eq!(results[0].document.text, "Sraturn has rings.");
        assert_eq!(results[0].document.episode_id, "2");
    }

    #[tokio::test]
    async fn test_reindex_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        write_lore(dir.path());

        let store = Arc::new(MemoryVectorStore::new());
        let orchestrator = orchestrator(store.clone());

        orchestrator.index_dir(dir.path(), false).await.unwrap();

        let report = orchestrator.index_dir(dir.path(), false).await.unwrap();
        assert_eq!(report.already_indexed, 2);
        assert_eq!(report.records_indexed, 0);
        assert_eq!(report.fragments_indexed, 0);

        let report = orchestrator.index_dir(dir.path(), true).await.unwrap();
        assert_eq!(report.fragments_indexed, 3);
        assert_eq!(store.document_count().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_unreadable_record_does_not_abort_indexing() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("a.json"),
            r#"{"episode_id": "1", "title": "Pilot", "synopsis": "Torpeda pilots the ship."}"#,
        )
        .unwrap();
        std::fs::write(dir.path().join("b.json"), b"{\"title\": \"\xff\"}").unwrap();

        let store = Arc::new(MemoryVectorStore::new());
        let orchestrator = orchestrator(store.clone());

        let report = orchestrator.index_dir(dir.path(), false).await.unwrap();
        assert_eq!(report.records, 1);
        assert_eq!(report.records_indexed, 1);
        assert_eq!(report.fragments_indexed, 1);
        assert_eq!(report.skipped_records.len(), 1);
        assert_eq!(report.skipped_records[0].source_file, "b.json");
        assert!(store.is_source_indexed("a.json").await.unwrap());
    }

    #[tokio::test]
    async fn test_forced_reindex_removes_rows_of_emptied_record() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.json");
        std::fs::write(&path, r#"{"title": "A", "synopsis": "Old."}"#).unwrap();

        let store = Arc::new(MemoryVectorStore::new());
        let orchestrator = orchestrator(store.clone());

        orchestrator.index_dir(dir.path(), false).await.unwrap();
        assert_eq!(store.document_count().await.unwrap(), 1);

        std::fs::write(&path, r#"{"title": "A"}"#).unwrap();
        let report = orchestrator.index_dir(dir.path(), true).await.unwrap();

        assert_eq!(report.records, 1);
        assert_eq!(report.records_indexed, 1);
        assert_eq!(report.fragments_indexed, 0);
        assert_eq!(store.document_count().await.unwrap(), 0);
        assert!(store.all_texts().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_fragment_stats() {
        let store = Arc::new(MemoryVectorStore::new());
        let orchestrator = orchestrator(store);
        assert!(orchestrator.fragment_stats().await.unwrap().is_none());

        let dir = tempfile::tempdir().unwrap();
        write_lore(dir.path());
        orchestrator.index_dir(dir.path(), false).await.unwrap();

        let stats = orchestrator.fragment_stats().await.unwrap().unwrap();
        assert_eq!(stats.count, 3);
        assert_eq!(stats.min, "Sraturn has rings.".chars().count());
    }
}
