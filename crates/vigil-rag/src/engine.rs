//! The retrieval-augmented generation engine.
//!
//! [`Engine`] ties the pieces together for the orchestration layer: it owns
//! one explicitly constructed [`Index`] (no process-wide singletons),
//! ingests documents with the configured chunk size, retrieves with the
//! configured limit, and turns a question plus retrieved context into one
//! call to the [`LanguageModel`] collaborator.

use chrono::{Duration, Utc};
use vigil_config::Config;
use vigil_index::{Document, Hit, Index, Query, Schema};

use crate::{
    RagError,
    context::assemble_context,
    prompt::{LanguageModel, augment},
};

/// An owned index plus the configuration that drives retrieval.
pub struct Engine {
    /// The underlying document index.
    index: Index,
    /// Retrieval and prompting settings.
    config: Config,
}

impl Engine {
    /// Validates `config` and opens (or creates) the index it points at.
    pub fn open(config: Config, schema: &Schema) -> Result<Self, RagError> {
        config.validate()?;
        let index = Index::open_or_create(&config.index_dir, schema)?;
        Ok(Self { index, config })
    }

    /// Returns the underlying index.
    pub fn index(&self) -> &Index {
        &self.index
    }

    /// Returns the engine configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Chunks and indexes one document in a single commit.
    ///
    /// Returns the number of chunks written.
    pub fn ingest(&self, doc: &Document, text_field: &str) -> Result<usize, RagError> {
        let written = self
            .index
            .index_document(doc, text_field, self.config.chunk_size_words)?;
        Ok(written)
    }

    /// Retrieves documents matching `query`, bounded by the configured
    /// result limit.
    pub fn retrieve(&self, query: &Query) -> Result<Vec<Hit>, RagError> {
        Ok(self.index.search(query, self.config.result_limit())?)
    }

    /// Retrieves documents published within the configured recency window,
    /// optionally narrowed by `query`.
    ///
    /// Without a configured `recent_days` this is plain retrieval.
    pub fn retrieve_recent(
        &self,
        date_field: &str,
        query: Option<Query>,
    ) -> Result<Vec<Hit>, RagError> {
        let mut clauses = Vec::new();
        if let Some(days) = self.config.recent_days {
            let from = Utc::now() - Duration::days(days);
            clauses.push(Query::date_range(date_field, Some(from), None));
        }
        clauses.push(query.unwrap_or(Query::All));

        let combined = Query::and(clauses)?;
        self.retrieve(&combined)
    }

    /// Answers `question` with context retrieved for `query`.
    ///
    /// Retrieval order is preserved into the context; the configured
    /// `context_fields` drive the rendering, falling back to every stored
    /// schema field in declaration order. The model's reply is returned
    /// verbatim.
    pub fn answer(
        &self,
        model: &dyn LanguageModel,
        query: &Query,
        question: &str,
    ) -> Result<String, RagError> {
        let hits = self.retrieve(query)?;

        let fields: Vec<String> = if self.config.context_fields.is_empty() {
            self.index
                .schema()
                .fields()
                .iter()
                .filter(|f| f.is_stored())
                .map(|f| f.name().to_string())
                .collect()
        } else {
            self.config.context_fields.clone()
        };

        let context = assemble_context(&hits, &fields);
        let prompt = augment(&context, question);
        model.complete(&prompt, self.config.context_window)
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;
    use vigil_index::FieldDef;

    use super::*;

    /// A model that replies with the prompt it was handed.
    struct EchoModel;

    impl LanguageModel for EchoModel {
        fn complete(&self, prompt: &str, _context_window: usize) -> Result<String, RagError> {
            Ok(prompt.to_string())
        }
    }

    fn advisory_schema() -> Schema {
        Schema::define(vec![
            FieldDef::id("id").stored().unique(),
            FieldDef::text("description").stored(),
            FieldDef::keyword("severity").stored(),
            FieldDef::date("published").stored(),
        ])
        .unwrap()
    }

    fn engine_in(dir: &TempDir) -> Engine {
        let mut config = Config::new(dir.path().join("index"));
        config.context_fields = vec!["id".to_string(), "description".to_string()];
        Engine::open(config, &advisory_schema()).unwrap()
    }

    fn commit_advisory(engine: &Engine, id: &str, description: &str) {
        let mut session = engine.index().begin_write().unwrap();
        session
            .upsert(
                &Document::new()
                    .with("id", id)
                    .with("description", description)
                    .with("severity", "HIGH")
                    .with("published", Utc::now()),
            )
            .unwrap();
        session.commit().unwrap();
    }

    #[test]
    fn answer_feeds_retrieved_context_to_the_model() {
        let dir = TempDir::new().unwrap();
        let engine = engine_in(&dir);
        commit_advisory(&engine, "CVE-1", "remote code execution in X");

        let reply = engine
            .answer(
                &EchoModel,
                &Query::text("description", "remote"),
                "what is actively exploited?",
            )
            .unwrap();

        assert!(reply.starts_with("Context: ID: CVE-1\nDescription: remote code execution in X"));
        assert!(reply.contains("\n\nQuestion: what is actively exploited?\nAnswer:"));
    }

    #[test]
    fn answer_without_matches_uses_the_sentinel() {
        let dir = TempDir::new().unwrap();
        let engine = engine_in(&dir);

        let reply = engine
            .answer(&EchoModel, &Query::All, "anything new?")
            .unwrap();
        assert!(reply.starts_with("Context: No relevant documents found."));
    }

    #[test]
    fn retrieve_applies_the_configured_limit() {
        let dir = TempDir::new().unwrap();
        let mut config = Config::new(dir.path().join("index"));
        config.result_limit = 2;
        let engine = Engine::open(config, &advisory_schema()).unwrap();

        for i in 0..4 {
            commit_advisory(&engine, &format!("CVE-{i}"), "remote code execution");
        }

        let hits = engine.retrieve(&Query::All).unwrap();
        assert_eq!(hits.len(), 2);
    }

    #[test]
    fn retrieve_recent_filters_by_window() {
        let dir = TempDir::new().unwrap();
        let mut config = Config::new(dir.path().join("index"));
        config.recent_days = Some(7);
        config.result_limit = 0;
        let engine = Engine::open(config, &advisory_schema()).unwrap();

        let mut session = engine.index().begin_write().unwrap();
        session
            .upsert(
                &Document::new()
                    .with("id", "old")
                    .with("description", "stale advisory")
                    .with("severity", "LOW")
                    .with("published", Utc::now() - Duration::days(30)),
            )
            .unwrap();
        session
            .upsert(
                &Document::new()
                    .with("id", "fresh")
                    .with("description", "new advisory")
                    .with("severity", "HIGH")
                    .with("published", Utc::now() - Duration::days(1)),
            )
            .unwrap();
        session.commit().unwrap();

        let hits = engine.retrieve_recent("published", None).unwrap();
        let found: Vec<&str> = hits.iter().filter_map(|h| h.doc.get_str("id")).collect();
        assert_eq!(found, vec!["fresh"]);

        let narrowed = engine
            .retrieve_recent("published", Some(Query::text("description", "advisory")))
            .unwrap();
        assert_eq!(narrowed.len(), 1);
    }

    #[test]
    fn ingest_uses_the_configured_chunk_size() {
        let dir = TempDir::new().unwrap();
        let schema = Schema::define(vec![
            FieldDef::id("id").stored().unique(),
            FieldDef::text("content").stored(),
        ])
        .unwrap();
        let mut config = Config::new(dir.path().join("index"));
        config.chunk_size_words = 5;
        config.result_limit = 0;
        let engine = Engine::open(config, &schema).unwrap();

        let words: Vec<String> = (0..12).map(|i| format!("word{i}")).collect();
        let doc = Document::new()
            .with("id", "doc-1")
            .with("content", words.join(" "));

        assert_eq!(engine.ingest(&doc, "content").unwrap(), 3);
        assert_eq!(engine.retrieve(&Query::All).unwrap().len(), 3);
    }
}
