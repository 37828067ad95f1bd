// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! # Search Engine
//!
//! A criterion-driven content search core: a query-compiler from recursive
//! filter trees to parameterized SQL, a text-search-over-RDBMS engine with
//! stop-word thresholding, and a streaming indexing gateway.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       SearchHandler                         │
//! │  • find_content(): result envelope, matched translations    │
//! │  • index_content()/bulk_index(): full-text representation   │
//! └─────────────────────────────────────────────────────────────┘
//!           │                                    │
//!           ▼                                    ▼
//! ┌──────────────────────────┐     ┌──────────────────────────────┐
//! │     ContentGateway       │     │  WordIndexGateway            │
//! │  • compiles criterion    │     │  • word/link table upserts   │
//! │    through the converter │     │  • object_count maintenance  │
//! │  • sort, offset, count   │     │  • purge                     │
//! └──────────────────────────┘     └──────────────────────────────┘
//!           │                                    ▲
//!           ▼                                    │
//! ┌──────────────────────────┐     ┌──────────────────────────────┐
//! │    CriteriaConverter     │     │  FieldValueMapper family     │
//! │  ordered handler list,   │     │  typed field values → index  │
//! │  first accept wins       │     │  representation              │
//! └──────────────────────────┘     └──────────────────────────────┘
//!
//! IndexerGateway: lazy batched content-id streams (all / since / subtree)
//! for bulk reindexing jobs.
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use search_engine::{
//!     Criterion, LanguageRegistry, SearchConfig, SearchHandler, SearchQuery,
//! };
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = SearchConfig {
//!         sql_url: Some("sqlite:search.db?mode=rwc".into()),
//!         ..Default::default()
//!     };
//!     let registry = Arc::new(LanguageRegistry::new(["eng-GB", "ger-DE"]).unwrap());
//!
//!     let handler = SearchHandler::from_config(&config, registry)
//!         .await
//!         .expect("failed to wire search handler");
//!     handler.gateway().init_schema().await.expect("schema");
//!
//!     let result = handler
//!         .find_content(&SearchQuery {
//!             filter: Criterion::full_text("hello*")
//!                 .and(Criterion::content_type_id([3, 4])),
//!             ..Default::default()
//!         })
//!         .await
//!         .expect("search failed");
//!
//!     println!("{:?} hits in {} ms", result.total_count, result.time_ms);
//! }
//! ```
//!
//! ## Features
//!
//! - **Criterion compilation**: recursive AND/OR/NOT filter trees compile to
//!   one parameterized SQL boolean expression; unmatched criteria fail loudly
//! - **Full-text matching**: normalization pipeline, wildcard prefix/suffix
//!   tokens, stop-word frequency thresholding, language-mask bit filtering
//! - **Field mapping**: typed field values converted to their engine
//!   representation through a composable mapper family
//! - **Streaming reindex**: lazy cursor-backed id batches over all content,
//!   content modified since a timestamp, or a location subtree
//!
//! ## Modules
//!
//! - [`handler`]: the top-level [`SearchHandler`]
//! - [`criterion`]: the filter AST
//! - [`convert`]: the converter and criterion handler family
//! - [`mapper`]: the field value mapper family
//! - [`gateway`]: content find, word index and indexer gateways
//! - [`transform`]: the text normalization pipeline
//! - [`language`]: language registry and mask arithmetic

pub mod config;
pub mod convert;
pub mod criterion;
pub mod error;
pub mod gateway;
pub mod handler;
pub mod language;
pub mod mapper;
pub mod metrics;
pub mod schema;
pub mod transform;

pub use config::SearchConfig;
pub use convert::{
    ContentCountProvider, CriteriaConverter, CriterionHandler, FullTextConfig, FullTextHandler,
    SqlExpression, SqlParam,
};
pub use criterion::{Criterion, Operator};
pub use error::SearchError;
pub use gateway::{
    connect, ContentGateway, ContentRow, FindResult, IndexerGateway, SortClause, SortField,
    SortOrder, WordIndexGateway,
};
pub use handler::{IndexableContent, SearchHandler, SearchHit, SearchQuery, SearchResult};
pub use language::{LanguageRegistry, LanguageSettings, ALWAYS_AVAILABLE_BIT};
pub use mapper::{
    AggregateFieldValueMapper, DateInput, FieldKind, FieldValue, FieldValueMapper, IndexValue,
    SearchField,
};
pub use transform::TransformationProcessor;
