// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Full-text criterion handler.
//!
//! Translates a free-text phrase into an `id IN (subquery)` filter against
//! the word/link index tables, honoring stop words, wildcards and language
//! filtering.
//!
//! # Pipeline
//!
//! ```text
//! query text
//!     ↓  normalization pipeline (configured transform order)
//!     ↓  tokenize on [^\w*]+   + whole-phrase fallback candidate
//!     ↓  per-token wildcard classification (exact / prefix / suffix)
//!     ↓  OR-combine, AND stop-word threshold (object_count < floor(N·factor))
//!     ↓  word ids → link table (optional language-mask bit filter)
//! content.id IN (SELECT contentobject_id FROM link WHERE …)
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::OnceCell;

use crate::config::SearchConfig;
use crate::criterion::Criterion;
use crate::error::SearchError;
use crate::language::{LanguageRegistry, LanguageSettings};
use crate::schema::{CONTENT_TABLE, LINK_TABLE, WORD_TABLE};
use crate::transform::{tokenize, TransformationProcessor};

use super::{
    escape_like, CriteriaConverter, CriterionHandler, SqlExpression, SqlParam, LIKE_ESCAPE,
};

/// Configuration of the full-text handler.
#[derive(Debug, Clone)]
pub struct FullTextConfig {
    /// Words appearing in more than this fraction of all content are noise.
    /// Must be in `[0, 1]`; `1.0` disables thresholding.
    pub stop_word_threshold_factor: f64,
    /// Whether a leading/trailing `*` triggers suffix/prefix matching.
    pub enable_wildcards: bool,
    /// Ordered normalization transform identifiers.
    pub commands: Vec<String>,
}

impl Default for FullTextConfig {
    fn default() -> Self {
        let config = SearchConfig::default();
        Self::from_search_config(&config)
    }
}

impl FullTextConfig {
    pub fn from_search_config(config: &SearchConfig) -> Self {
        Self {
            stop_word_threshold_factor: config.stop_word_threshold_factor,
            enable_wildcards: config.enable_wildcards,
            commands: config.commands.clone(),
        }
    }
}

/// Source of the total content count used for stop-word thresholding.
#[async_trait]
pub trait ContentCountProvider: Send + Sync {
    async fn total_content_count(&self) -> Result<i64, SearchError>;
}

/// Fixed count, for tests and offline compilation.
pub struct FixedContentCount(pub i64);

#[async_trait]
impl ContentCountProvider for FixedContentCount {
    async fn total_content_count(&self) -> Result<i64, SearchError> {
        Ok(self.0)
    }
}

/// Compiles [`Criterion::FullText`] against the word/link index tables.
pub struct FullTextHandler {
    config: FullTextConfig,
    processor: TransformationProcessor,
    registry: Arc<LanguageRegistry>,
    counter: Arc<dyn ContentCountProvider>,
    // Stop-word threshold, computed once per handler instance from the
    // total content count. The factor is a rough percentage, so a stale
    // value within a long-lived handler is acceptable.
    threshold: OnceCell<i64>,
}

impl FullTextHandler {
    /// Construct the handler, validating configuration-time invariants.
    ///
    /// A stop-word factor outside `[0, 1]` or an unknown transform command
    /// fails here, before the handler can be registered.
    pub fn new(
        config: FullTextConfig,
        registry: Arc<LanguageRegistry>,
        counter: Arc<dyn ContentCountProvider>,
    ) -> Result<Self, SearchError> {
        if !(0.0..=1.0).contains(&config.stop_word_threshold_factor) {
            return Err(SearchError::Config(format!(
                "stop word threshold factor must be in [0, 1], got {}",
                config.stop_word_threshold_factor
            )));
        }
        let processor = TransformationProcessor::new(&config.commands)?;
        Ok(Self {
            config,
            processor,
            registry,
            counter,
            threshold: OnceCell::new(),
        })
    }

    /// One word predicate. With wildcards enabled, a leading `*` makes a
    /// suffix match and a trailing `*` a prefix match; the leading-star
    /// branch wins when both would apply.
    fn word_expression(&self, token: &str) -> SqlExpression {
        if self.config.enable_wildcards && token.starts_with('*') {
            let pattern = format!("%{}", escape_like(&token[1..]));
            SqlExpression::new(
                format!("word LIKE ? {LIKE_ESCAPE}"),
                vec![SqlParam::Text(pattern)],
            )
        } else if self.config.enable_wildcards && token.ends_with('*') {
            let pattern = format!("{}%", escape_like(&token[..token.len() - 1]));
            SqlExpression::new(
                format!("word LIKE ? {LIKE_ESCAPE}"),
                vec![SqlParam::Text(pattern)],
            )
        } else {
            SqlExpression::new("word = ?", vec![SqlParam::Text(token.to_string())])
        }
    }

    /// The stop-word threshold value, `floor(totalContentCount * factor)`.
    /// Computed lazily once; concurrent first calls race benignly on an
    /// idempotent read-only count.
    async fn threshold_value(&self) -> Result<i64, SearchError> {
        let factor = self.config.stop_word_threshold_factor;
        let counter = &self.counter;
        self.threshold
            .get_or_try_init(|| async move {
                let total = counter.total_content_count().await?;
                Ok((total as f64 * factor).floor() as i64)
            })
            .await
            .copied()
    }
}

#[async_trait]
impl CriterionHandler for FullTextHandler {
    fn accepts(&self, criterion: &Criterion) -> bool {
        matches!(criterion, Criterion::FullText(_))
    }

    async fn handle(
        &self,
        _converter: &CriteriaConverter,
        criterion: &Criterion,
        settings: &LanguageSettings,
    ) -> Result<SqlExpression, SearchError> {
        let text = match criterion {
            Criterion::FullText(text) => text,
            other => {
                return Err(SearchError::invalid_argument(
                    "criterion",
                    format!("FullTextHandler cannot handle '{}'", other.kind()),
                ))
            }
        };

        let normalized = self.processor.apply(text);
        let mut candidates: Vec<&str> = tokenize(&normalized);
        // The untokenized query is one more candidate, so an exact multi-word
        // phrase stored as a single indexed word still matches.
        if !normalized.is_empty() {
            candidates.push(normalized.as_str());
        }

        let word_match = SqlExpression::any(
            candidates
                .iter()
                .map(|token| self.word_expression(token))
                .collect(),
        );

        let word_where = if self.config.stop_word_threshold_factor < 1.0 {
            let threshold = self.threshold_value().await?;
            SqlExpression::all(vec![
                word_match,
                SqlExpression::new("object_count < ?", vec![SqlParam::Int(threshold)]),
            ])
        } else {
            word_match
        };

        let word_select = SqlExpression::new(
            format!(
                "word_id IN (SELECT id FROM {WORD_TABLE} WHERE {})",
                word_where.clause
            ),
            word_where.params,
        );

        let link_where = if settings.is_empty() {
            word_select
        } else {
            let mask = self.registry.mask_for(settings)?;
            SqlExpression::all(vec![
                word_select,
                SqlExpression::new("(language_mask & ?) > 0", vec![SqlParam::Int(mask)]),
            ])
        };

        Ok(SqlExpression::new(
            format!(
                "{CONTENT_TABLE}.id IN (SELECT contentobject_id FROM {LINK_TABLE} WHERE {})",
                link_where.clause
            ),
            link_where.params,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handler_with(config: FullTextConfig, total: i64) -> FullTextHandler {
        let registry = Arc::new(LanguageRegistry::new(["eng-GB", "ger-DE"]).unwrap());
        FullTextHandler::new(config, registry, Arc::new(FixedContentCount(total))).unwrap()
    }

    fn config(factor: f64, wildcards: bool) -> FullTextConfig {
        FullTextConfig {
            stop_word_threshold_factor: factor,
            enable_wildcards: wildcards,
            commands: vec!["lowercase".to_string(), "cleanup".to_string()],
        }
    }

    async fn compile(
        handler: FullTextHandler,
        text: &str,
        settings: &LanguageSettings,
    ) -> SqlExpression {
        let converter = CriteriaConverter::new(vec![]);
        handler
            .handle(&converter, &Criterion::full_text(text), settings)
            .await
            .unwrap()
    }

    #[test]
    fn test_factor_out_of_range_rejected_at_construction() {
        let registry = Arc::new(LanguageRegistry::new(["eng-GB"]).unwrap());
        let result = FullTextHandler::new(
            config(1.1, true),
            registry.clone(),
            Arc::new(FixedContentCount(10)),
        );
        assert!(matches!(result, Err(SearchError::Config(_))));

        let result = FullTextHandler::new(
            config(-0.5, true),
            registry,
            Arc::new(FixedContentCount(10)),
        );
        assert!(matches!(result, Err(SearchError::Config(_))));
    }

    #[tokio::test]
    async fn test_exact_match_without_wildcards_in_token() {
        let expr = compile(
            handler_with(config(1.0, true), 100),
            "hello",
            &LanguageSettings::default(),
        )
        .await;
        assert_eq!(
            expr.clause,
            "ibexa_content.id IN (SELECT contentobject_id FROM ibexa_search_object_word_link \
             WHERE word_id IN (SELECT id FROM ibexa_search_word WHERE (word = ? OR word = ?)))"
        );
        // Token plus the whole-phrase fallback (identical for one word).
        assert_eq!(
            expr.params,
            vec![
                SqlParam::Text("hello".to_string()),
                SqlParam::Text("hello".to_string())
            ]
        );
    }

    #[tokio::test]
    async fn test_trailing_star_is_prefix_match() {
        let expr = compile(
            handler_with(config(1.0, true), 100),
            "hello*",
            &LanguageSettings::default(),
        )
        .await;
        assert!(expr.clause.contains("word LIKE ? ESCAPE '!'"));
        assert_eq!(expr.params[0], SqlParam::Text("hello%".to_string()));
    }

    #[tokio::test]
    async fn test_leading_star_is_suffix_match() {
        let expr = compile(
            handler_with(config(1.0, true), 100),
            "*ello",
            &LanguageSettings::default(),
        )
        .await;
        assert_eq!(expr.params[0], SqlParam::Text("%ello".to_string()));
    }

    #[tokio::test]
    async fn test_leading_star_wins_over_trailing() {
        let expr = compile(
            handler_with(config(1.0, true), 100),
            "*ell*",
            &LanguageSettings::default(),
        )
        .await;
        // Only the leading star is a wildcard; the trailing one is literal.
        assert_eq!(expr.params[0], SqlParam::Text("%ell*".to_string()));
    }

    #[tokio::test]
    async fn test_wildcards_disabled_match_literally() {
        let expr = compile(
            handler_with(config(1.0, false), 100),
            "hello*",
            &LanguageSettings::default(),
        )
        .await;
        assert!(!expr.clause.contains("LIKE"));
        assert_eq!(expr.params[0], SqlParam::Text("hello*".to_string()));
    }

    #[tokio::test]
    async fn test_stop_word_threshold_value() {
        // floor(100 * 0.5) = 50: object_count = 50 excluded, 49 included.
        let expr = compile(
            handler_with(config(0.5, true), 100),
            "hello",
            &LanguageSettings::default(),
        )
        .await;
        assert!(expr.clause.contains("AND object_count < ?"));
        assert_eq!(
            expr.params.last().unwrap(),
            &SqlParam::Int(50),
            "threshold must be floor(total * factor)"
        );
    }

    #[tokio::test]
    async fn test_threshold_disabled_at_factor_one() {
        let expr = compile(
            handler_with(config(1.0, true), 100),
            "hello",
            &LanguageSettings::default(),
        )
        .await;
        assert!(!expr.clause.contains("object_count"));
    }

    #[tokio::test]
    async fn test_threshold_cached_per_handler_instance() {
        let handler = handler_with(config(0.5, true), 100);
        let converter = CriteriaConverter::new(vec![]);
        let settings = LanguageSettings::default();
        let first = handler
            .handle(&converter, &Criterion::full_text("a"), &settings)
            .await
            .unwrap();
        let second = handler
            .handle(&converter, &Criterion::full_text("b"), &settings)
            .await
            .unwrap();
        assert_eq!(first.params.last(), Some(&SqlParam::Int(50)));
        assert_eq!(second.params.last(), Some(&SqlParam::Int(50)));
    }

    #[tokio::test]
    async fn test_language_filter_adds_mask_predicate() {
        let expr = compile(
            handler_with(config(1.0, true), 100),
            "hello",
            &LanguageSettings::for_languages(["eng-GB"]),
        )
        .await;
        assert!(expr.clause.contains("(language_mask & ?) > 0"));
        // eng-GB is bit 1 (value 2) plus the always-available bit 0.
        assert_eq!(expr.params.last(), Some(&SqlParam::Int(3)));
    }

    #[tokio::test]
    async fn test_no_language_filter_no_mask_predicate() {
        let expr = compile(
            handler_with(config(1.0, true), 100),
            "hello",
            &LanguageSettings::default(),
        )
        .await;
        assert!(!expr.clause.contains("language_mask"));
    }

    #[tokio::test]
    async fn test_phrase_adds_untokenized_candidate() {
        let expr = compile(
            handler_with(config(1.0, true), 100),
            "hello world",
            &LanguageSettings::default(),
        )
        .await;
        assert_eq!(
            expr.params,
            vec![
                SqlParam::Text("hello".to_string()),
                SqlParam::Text("world".to_string()),
                SqlParam::Text("hello world".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_normalization_applies_before_tokenization() {
        let expr = compile(
            handler_with(config(1.0, true), 100),
            "Hello, WORLD!",
            &LanguageSettings::default(),
        )
        .await;
        assert_eq!(
            expr.params,
            vec![
                SqlParam::Text("hello".to_string()),
                SqlParam::Text("world".to_string()),
                SqlParam::Text("hello world".to_string()),
            ]
        );
    }
}
