// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Search handler - the top-level service.
//!
//! Consumes the gateway's raw rows, maps them into result hits with the
//! matched translation computed from the row's language mask, and assembles
//! the result envelope (hits, total count, timing). Also drives indexing:
//! field values run through the mapper family, their textual representations
//! through the normalization pipeline and tokenizer, and the resulting words
//! into the word/link tables.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use search_engine::{
//!     Criterion, LanguageRegistry, SearchConfig, SearchHandler, SearchQuery,
//! };
//!
//! # async fn example() {
//! let config = SearchConfig {
//!     sql_url: Some("sqlite:search.db?mode=rwc".into()),
//!     ..Default::default()
//! };
//! let registry = Arc::new(LanguageRegistry::new(["eng-GB"]).unwrap());
//! let handler = SearchHandler::from_config(&config, registry).await.unwrap();
//!
//! let result = handler
//!     .find_content(&SearchQuery {
//!         filter: Criterion::full_text("hello"),
//!         ..Default::default()
//!     })
//!     .await
//!     .unwrap();
//! println!("{} hits in {} ms", result.hits.len(), result.time_ms);
//! # }
//! ```

use std::sync::Arc;
use std::time::Instant;

use tracing::warn;

use crate::config::SearchConfig;
use crate::convert::{
    ContentTypeIdHandler, CriteriaConverter, FullTextConfig, FullTextHandler, LogicalAndHandler,
    LogicalNotHandler, LogicalOrHandler, MatchAllHandler, MatchNoneHandler, UserLoginHandler,
};
use crate::criterion::Criterion;
use crate::error::SearchError;
use crate::gateway::{
    self, ContentGateway, ContentRow, SortClause, SqlContentCount, WordIndexGateway,
};
use crate::language::{LanguageRegistry, LanguageSettings};
use crate::mapper::{AggregateFieldValueMapper, SearchField};
use crate::metrics;
use crate::transform::{tokenize, TransformationProcessor};

/// A content item handed to the indexing pipeline.
#[derive(Debug, Clone)]
pub struct IndexableContent {
    pub id: i64,
    pub language_mask: i64,
    pub name: Option<String>,
    pub fields: Vec<SearchField>,
}

/// A search request against the content store.
#[derive(Debug, Clone)]
pub struct SearchQuery {
    pub filter: Criterion,
    pub offset: u64,
    pub limit: usize,
    pub sort_clauses: Vec<SortClause>,
    pub language_filter: LanguageSettings,
    pub perform_count: bool,
}

impl Default for SearchQuery {
    fn default() -> Self {
        Self {
            filter: Criterion::MatchAll,
            offset: 0,
            limit: 25,
            sort_clauses: Vec::new(),
            language_filter: LanguageSettings::default(),
            perform_count: true,
        }
    }
}

/// One search hit: the content row plus the translation it matched in.
#[derive(Debug, Clone)]
pub struct SearchHit {
    pub content: ContentRow,
    pub matched_translation: Option<String>,
}

/// Result envelope of a find call.
#[derive(Debug)]
pub struct SearchResult {
    /// Wall-clock duration of the search, in milliseconds.
    pub time_ms: u64,
    /// Total matching count, `None` when counting was skipped.
    pub total_count: Option<i64>,
    pub hits: Vec<SearchHit>,
}

/// Top-level search service: find + indexing.
pub struct SearchHandler {
    gateway: ContentGateway,
    words: WordIndexGateway,
    mapper: AggregateFieldValueMapper,
    processor: TransformationProcessor,
    registry: Arc<LanguageRegistry>,
}

impl SearchHandler {
    /// Wire the full default stack from configuration: connection pool,
    /// handler registry (content type, user login, full text, logical
    /// combinators, match-all/none), gateways and mappers.
    pub async fn from_config(
        config: &SearchConfig,
        registry: Arc<LanguageRegistry>,
    ) -> Result<Self, SearchError> {
        config.validate()?;
        let url = config
            .sql_url
            .as_deref()
            .ok_or_else(|| SearchError::Config("sql_url is required".to_string()))?;
        let pool = gateway::connect(url).await?;
        let is_sqlite = url.starts_with("sqlite:");

        let processor = TransformationProcessor::new(&config.commands)?;
        let full_text = FullTextHandler::new(
            FullTextConfig::from_search_config(config),
            registry.clone(),
            Arc::new(SqlContentCount::new(pool.clone())),
        )?;
        let converter = Arc::new(CriteriaConverter::new(vec![
            Box::new(ContentTypeIdHandler),
            Box::new(UserLoginHandler::new(processor.clone())),
            Box::new(full_text),
            Box::new(LogicalAndHandler),
            Box::new(LogicalOrHandler),
            Box::new(LogicalNotHandler),
            Box::new(MatchAllHandler),
            Box::new(MatchNoneHandler),
        ]));

        let gateway = ContentGateway::new(pool.clone(), is_sqlite, converter);
        let words = WordIndexGateway::new(pool, is_sqlite);

        Ok(Self {
            gateway,
            words,
            mapper: AggregateFieldValueMapper::with_default_mappers(),
            processor,
            registry,
        })
    }

    /// Assemble a handler from explicitly constructed parts.
    pub fn new(
        gateway: ContentGateway,
        words: WordIndexGateway,
        mapper: AggregateFieldValueMapper,
        processor: TransformationProcessor,
        registry: Arc<LanguageRegistry>,
    ) -> Self {
        Self {
            gateway,
            words,
            mapper,
            processor,
            registry,
        }
    }

    /// The content gateway, for schema management and fixtures.
    pub fn gateway(&self) -> &ContentGateway {
        &self.gateway
    }

    /// Execute a search and assemble the result envelope.
    pub async fn find_content(&self, query: &SearchQuery) -> Result<SearchResult, SearchError> {
        let started = Instant::now();
        let found = match self
            .gateway
            .find(
                &query.filter,
                query.offset,
                query.limit,
                &query.sort_clauses,
                &query.language_filter,
                query.perform_count,
            )
            .await
        {
            Ok(found) => {
                metrics::record_operation("find", "success");
                found
            }
            Err(err) => {
                metrics::record_operation("find", "error");
                return Err(err);
            }
        };
        metrics::record_latency("find", started.elapsed());
        metrics::record_result_count(found.rows.len());

        let hits = found
            .rows
            .into_iter()
            .map(|row| {
                let matched_translation = self
                    .registry
                    .matched_translation(row.language_mask, &query.language_filter);
                SearchHit {
                    content: row,
                    matched_translation,
                }
            })
            .collect();

        Ok(SearchResult {
            time_ms: started.elapsed().as_millis() as u64,
            total_count: found.count,
            hits,
        })
    }

    /// Index one content item into the full-text store, replacing its
    /// previous index entry.
    pub async fn index_content(&self, content: &IndexableContent) -> Result<(), SearchError> {
        if self.gateway.content_by_id(content.id).await?.is_none() {
            return Err(SearchError::NotFound(content.id));
        }
        let words = self.extract_words(content)?;
        self.words
            .index_words(content.id, content.language_mask, words)
            .await?;
        metrics::record_indexed_documents(1);
        Ok(())
    }

    /// Index a batch of content items.
    ///
    /// Recoverable per-item failures (content gone, unmapped field,
    /// unparseable data) are reported through `on_error` and do not abort
    /// the batch; backend failures abort.
    pub async fn bulk_index<F>(
        &self,
        contents: &[IndexableContent],
        mut on_error: F,
    ) -> Result<(), SearchError>
    where
        F: FnMut(&IndexableContent, SearchError),
    {
        let mut skipped = 0usize;
        for content in contents {
            match self.index_content(content).await {
                Ok(()) => {}
                Err(err) if err.is_recoverable() => {
                    warn!(content_id = content.id, error = %err, "skipping content during bulk index");
                    skipped += 1;
                    on_error(content, err);
                }
                Err(err) => return Err(err),
            }
        }
        if skipped > 0 {
            metrics::record_skipped_documents(skipped);
        }
        Ok(())
    }

    /// Remove a content item from the full-text index.
    ///
    /// The index does not track versions separately, so a version-specific
    /// delete removes the content's whole entry; the next (re)index of the
    /// remaining version restores it.
    pub async fn delete_content(
        &self,
        content_id: i64,
        _version_id: Option<i64>,
    ) -> Result<(), SearchError> {
        self.words.delete_content(content_id).await?;
        metrics::record_operation("delete", "success");
        Ok(())
    }

    /// Drop the whole full-text index.
    pub async fn purge_index(&self) -> Result<(), SearchError> {
        self.words.purge().await?;
        metrics::record_operation("purge", "success");
        Ok(())
    }

    /// No-op: this engine writes synchronously.
    pub fn commit(&self, _flush: bool) {}

    /// Map the content's fields to their index representation and tokenize
    /// the textual parts into index words.
    fn extract_words(&self, content: &IndexableContent) -> Result<Vec<String>, SearchError> {
        let mut words = Vec::new();
        let push_text = |text: &str, words: &mut Vec<String>| {
            let normalized = self.processor.apply(text);
            words.extend(tokenize(&normalized).iter().map(|t| t.to_string()));
        };

        if let Some(name) = &content.name {
            push_text(name, &mut words);
        }
        for field in &content.fields {
            let value = self.mapper.map(field)?;
            for text in value.texts() {
                push_text(&text, &mut words);
            }
        }
        Ok(words)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapper::{DateInput, FieldValue};
    use std::path::PathBuf;

    fn temp_db_path(name: &str) -> PathBuf {
        std::fs::create_dir_all("temp").ok();
        PathBuf::from("temp").join(format!("handler_test_{}.db", name))
    }

    fn cleanup_db(path: &PathBuf) {
        let _ = std::fs::remove_file(path);
        let _ = std::fs::remove_file(format!("{}-wal", path.display()));
        let _ = std::fs::remove_file(format!("{}-shm", path.display()));
    }

    async fn handler(name: &str, factor: f64) -> (SearchHandler, PathBuf) {
        let path = temp_db_path(name);
        cleanup_db(&path);
        let config = SearchConfig {
            sql_url: Some(format!("sqlite://{}?mode=rwc", path.display())),
            stop_word_threshold_factor: factor,
            ..Default::default()
        };
        let registry = Arc::new(LanguageRegistry::new(["eng-GB", "ger-DE"]).unwrap());
        let handler = SearchHandler::from_config(&config, registry).await.unwrap();
        handler.gateway().init_schema().await.unwrap();
        (handler, path)
    }

    async fn publish(handler: &SearchHandler, id: i64, mask: i64, body: &str) {
        handler
            .gateway()
            .upsert_content(&ContentRow {
                id,
                content_type_id: 1,
                status: 1,
                modified: id * 100,
                language_mask: mask,
                name: Some(format!("item {id}")),
            })
            .await
            .unwrap();
        handler
            .index_content(&IndexableContent {
                id,
                language_mask: mask,
                name: None,
                fields: vec![SearchField::new(
                    "body",
                    FieldValue::FullText(body.to_string()),
                )],
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_full_text_prefix_search_end_to_end() {
        let (handler, path) = handler("prefix_e2e", 1.0).await;

        publish(&handler, 1, 3, "hello").await;
        publish(&handler, 2, 3, "help").await;
        publish(&handler, 3, 3, "goodbye").await;

        let result = handler
            .find_content(&SearchQuery {
                filter: Criterion::full_text("hello*"),
                ..Default::default()
            })
            .await
            .unwrap();

        let mut ids: Vec<i64> = result.hits.iter().map(|h| h.content.id).collect();
        ids.sort_unstable();
        assert_eq!(ids, vec![1, 2], "prefix must match hello and help only");
        assert_eq!(result.total_count, Some(2));

        cleanup_db(&path);
    }

    #[tokio::test]
    async fn test_stop_words_excluded_from_matching() {
        let (handler, path) = handler("stop_words", 0.5).await;

        // "common" appears in 6 of 10 items, "rare" in 2.
        // threshold = floor(10 * 0.5) = 5, so common (6 ≥ 5) is noise.
        for id in 1..=10 {
            let body = if id <= 6 { "common filler" } else { "rare gem" };
            publish(&handler, id, 1, body).await;
        }

        let result = handler
            .find_content(&SearchQuery {
                filter: Criterion::full_text("common"),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(result.total_count, Some(0), "stop word must not match");

        let result = handler
            .find_content(&SearchQuery {
                filter: Criterion::full_text("rare"),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(result.total_count, Some(2));

        cleanup_db(&path);
    }

    #[tokio::test]
    async fn test_language_mask_filtering_and_matched_translation() {
        let (handler, path) = handler("lang_mask", 1.0).await;

        // eng-GB = bit 2, ger-DE = bit 4, always-available = bit 1
        publish(&handler, 1, 2, "wort").await; // English only
        publish(&handler, 2, 4, "wort").await; // German only
        publish(&handler, 3, 4 | 1, "wort").await; // German, always available

        let result = handler
            .find_content(&SearchQuery {
                filter: Criterion::full_text("wort"),
                language_filter: LanguageSettings::for_languages(["eng-GB"]),
                ..Default::default()
            })
            .await
            .unwrap();

        let mut ids: Vec<i64> = result.hits.iter().map(|h| h.content.id).collect();
        ids.sort_unstable();
        // Row 2 has neither the eng-GB bit nor bit 0: excluded.
        // Row 3 has bit 0: included regardless of requested languages.
        assert_eq!(ids, vec![1, 3]);

        for hit in &result.hits {
            match hit.content.id {
                1 => assert_eq!(hit.matched_translation.as_deref(), Some("eng-GB")),
                3 => assert_eq!(hit.matched_translation.as_deref(), Some("ger-DE")),
                other => panic!("unexpected hit {other}"),
            }
        }

        cleanup_db(&path);
    }

    #[tokio::test]
    async fn test_index_content_requires_existing_row() {
        let (handler, path) = handler("missing_row", 1.0).await;

        let orphan = IndexableContent {
            id: 99,
            language_mask: 1,
            name: None,
            fields: Vec::new(),
        };
        assert!(matches!(
            handler.index_content(&orphan).await,
            Err(SearchError::NotFound(99))
        ));

        cleanup_db(&path);
    }

    #[tokio::test]
    async fn test_bulk_index_isolates_recoverable_errors() {
        let (handler, path) = handler("bulk", 1.0).await;

        publish(&handler, 1, 1, "first").await;
        handler
            .gateway()
            .upsert_content(&ContentRow {
                id: 2,
                content_type_id: 1,
                status: 1,
                modified: 200,
                language_mask: 1,
                name: None,
            })
            .await
            .unwrap();

        let batch = vec![
            IndexableContent {
                id: 1,
                language_mask: 1,
                name: None,
                fields: vec![SearchField::new("body", FieldValue::Str("fine".into()))],
            },
            // Row 7 does not exist: recoverable, reported, skipped
            IndexableContent {
                id: 7,
                language_mask: 1,
                name: None,
                fields: Vec::new(),
            },
            // Unparseable date: recoverable, reported, skipped
            IndexableContent {
                id: 2,
                language_mask: 1,
                name: None,
                fields: vec![SearchField::new(
                    "published",
                    FieldValue::Date(DateInput::Text("not a date".into())),
                )],
            },
        ];

        let mut failures = Vec::new();
        handler
            .bulk_index(&batch, |content, err| {
                failures.push((content.id, err.to_string()));
            })
            .await
            .unwrap();

        assert_eq!(failures.len(), 2);
        assert_eq!(failures[0].0, 7);
        assert!(failures[0].1.contains("not found"));
        assert_eq!(failures[1].0, 2);
        assert!(failures[1].1.contains("not a date"));

        // The healthy item was indexed despite the failures
        let result = handler
            .find_content(&SearchQuery {
                filter: Criterion::full_text("fine"),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(result.total_count, Some(1));

        cleanup_db(&path);
    }

    #[tokio::test]
    async fn test_delete_and_purge() {
        let (handler, path) = handler("delete_purge", 1.0).await;

        publish(&handler, 1, 1, "alpha").await;
        publish(&handler, 2, 1, "alpha beta").await;

        handler.delete_content(1, None).await.unwrap();
        let result = handler
            .find_content(&SearchQuery {
                filter: Criterion::full_text("alpha"),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(result.total_count, Some(1));

        handler.purge_index().await.unwrap();
        let result = handler
            .find_content(&SearchQuery {
                filter: Criterion::full_text("alpha"),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(result.total_count, Some(0));

        cleanup_db(&path);
    }

    #[tokio::test]
    async fn test_normalized_indexing_matches_normalized_query() {
        let (handler, path) = handler("normalize", 1.0).await;

        publish(&handler, 1, 1, "Crème Brûlée recipe").await;

        let result = handler
            .find_content(&SearchQuery {
                filter: Criterion::full_text("CREME"),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(result.total_count, Some(1));

        cleanup_db(&path);
    }
}
