// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Criterion-to-SQL compilation
//!
//! A [`Criterion`] tree is compiled into one parameterized SQL boolean
//! expression by the [`CriteriaConverter`], which dispatches each node to the
//! first registered [`CriterionHandler`] that accepts it.
//!
//! # Architecture
//!
//! ```text
//! Criterion (AST)
//!     ↓
//! CriteriaConverter ──→ ordered handler list, first accept wins
//!     ↓        ↑
//! CriterionHandler ────┘  (composite handlers recurse into the converter)
//!     ↓
//! SqlExpression { clause with `?` placeholders, ordered params }
//! ```
//!
//! Dispatch order is registration order and is part of the observable
//! contract: if two handlers could accept the same criterion shape, the one
//! registered first wins. An unmatched criterion is a fatal
//! [`SearchError::NotImplemented`] — a silently dropped filter would broaden
//! the result set instead of narrowing it.

mod content_type_id;
mod full_text;
mod logical;
mod matching;
mod user_login;

pub use content_type_id::ContentTypeIdHandler;
pub use full_text::{ContentCountProvider, FixedContentCount, FullTextConfig, FullTextHandler};
pub use logical::{LogicalAndHandler, LogicalNotHandler, LogicalOrHandler};
pub use matching::{MatchAllHandler, MatchNoneHandler};
pub use user_login::UserLoginHandler;

use async_trait::async_trait;

use crate::criterion::Criterion;
use crate::error::SearchError;
use crate::language::LanguageSettings;

/// SQL parameter value bound to a `?` placeholder.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

/// A compiled SQL boolean expression with parameterized placeholders.
///
/// Uses `?` placeholders; `params` holds the bound values in placeholder
/// order.
#[derive(Debug, Clone, PartialEq)]
pub struct SqlExpression {
    /// The boolean clause (without a `WHERE` keyword).
    pub clause: String,
    /// The parameter values in placeholder order.
    pub params: Vec<SqlParam>,
}

impl SqlExpression {
    pub fn new(clause: impl Into<String>, params: Vec<SqlParam>) -> Self {
        Self {
            clause: clause.into(),
            params,
        }
    }

    /// A predicate no row satisfies.
    pub fn constant_false() -> Self {
        Self::new("1 = 0", Vec::new())
    }

    /// A predicate every row satisfies.
    pub fn constant_true() -> Self {
        Self::new("1 = 1", Vec::new())
    }

    /// Conjoin expressions. An empty list is the neutral element of AND
    /// (constant true); a single expression degenerates to itself.
    pub fn all(parts: Vec<SqlExpression>) -> Self {
        Self::join(parts, " AND ", Self::constant_true)
    }

    /// Disjoin expressions. An empty list is the neutral element of OR
    /// (constant false); a single expression degenerates to itself.
    pub fn any(parts: Vec<SqlExpression>) -> Self {
        Self::join(parts, " OR ", Self::constant_false)
    }

    /// Negate an expression.
    pub fn not(inner: SqlExpression) -> Self {
        Self::new(format!("NOT ({})", inner.clause), inner.params)
    }

    fn join(mut parts: Vec<SqlExpression>, separator: &str, empty: fn() -> Self) -> Self {
        match parts.len() {
            0 => empty(),
            1 => parts.remove(0),
            _ => {
                let clauses: Vec<&str> = parts.iter().map(|p| p.clause.as_str()).collect();
                let clause = format!("({})", clauses.join(separator));
                let params = parts.into_iter().flat_map(|p| p.params).collect();
                Self { clause, params }
            }
        }
    }

    /// Render with inline values instead of placeholders.
    ///
    /// Warning: only for diagnostics and test assertions, never for actual
    /// queries (SQL injection risk).
    pub fn inline(&self) -> String {
        let mut result = self.clause.clone();
        for param in &self.params {
            let value = match param {
                SqlParam::Text(s) => format!("'{}'", s.replace('\'', "''")),
                SqlParam::Int(n) => n.to_string(),
                SqlParam::Float(f) => f.to_string(),
                SqlParam::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
            };
            result = result.replacen('?', &value, 1);
        }
        result
    }
}

/// Translates one family of criteria into SQL.
///
/// Handlers are stateless across calls (the FullText handler's cached
/// stop-word threshold being the documented exception) and are shared
/// read-only after registration.
#[async_trait]
pub trait CriterionHandler: Send + Sync {
    /// Whether this handler translates the given criterion.
    fn accepts(&self, criterion: &Criterion) -> bool;

    /// Translate the criterion into a SQL boolean expression.
    ///
    /// Composite handlers call back into `converter` once per child.
    async fn handle(
        &self,
        converter: &CriteriaConverter,
        criterion: &Criterion,
        settings: &LanguageSettings,
    ) -> Result<SqlExpression, SearchError>;
}

/// Dispatcher owning the ordered handler registry.
///
/// Built once at startup, read-only afterwards.
pub struct CriteriaConverter {
    handlers: Vec<Box<dyn CriterionHandler>>,
}

impl CriteriaConverter {
    /// Create a converter over the given handlers. Registration order is
    /// dispatch priority.
    pub fn new(handlers: Vec<Box<dyn CriterionHandler>>) -> Self {
        Self { handlers }
    }

    /// Compile a criterion tree into one SQL boolean expression.
    ///
    /// The first registered handler accepting the criterion performs the
    /// translation. No accepting handler is a fatal error, never an empty
    /// expression.
    pub async fn convert_criteria(
        &self,
        criterion: &Criterion,
        settings: &LanguageSettings,
    ) -> Result<SqlExpression, SearchError> {
        for handler in &self.handlers {
            if handler.accepts(criterion) {
                return handler.handle(self, criterion, settings).await;
            }
        }
        Err(SearchError::NotImplemented(format!(
            "no criterion handler accepts '{}'",
            criterion.kind()
        )))
    }
}

/// Internal helper: `(?, ?, …)` placeholder list for IN clauses.
pub(crate) fn placeholder_list(count: usize) -> String {
    let placeholders: Vec<&str> = (0..count).map(|_| "?").collect();
    format!("({})", placeholders.join(", "))
}

/// Escape character for LIKE patterns. `!` is used instead of backslash
/// because a backslash literal in `ESCAPE '…'` parses differently on MySQL
/// and SQLite.
pub(crate) const LIKE_ESCAPE: &str = "ESCAPE '!'";

/// Internal helper: escape SQL LIKE metacharacters (`%`, `_`, and the escape
/// character itself) in a literal so only intentionally injected wildcards
/// match.
pub(crate) fn escape_like(literal: &str) -> String {
    literal
        .replace('!', "!!")
        .replace('%', "!%")
        .replace('_', "!_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unregistered_criterion_is_fatal() {
        let converter = CriteriaConverter::new(vec![Box::new(MatchNoneHandler)]);
        let result = converter
            .convert_criteria(&Criterion::MatchAll, &LanguageSettings::default())
            .await;
        match result {
            Err(SearchError::NotImplemented(msg)) => assert!(msg.contains("MatchAll")),
            other => panic!("Expected NotImplemented, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_first_registered_handler_wins() {
        // Both handlers accept MatchNone-shaped input in principle; the
        // registry must ask them in registration order.
        struct GreedyTrue;
        #[async_trait]
        impl CriterionHandler for GreedyTrue {
            fn accepts(&self, _criterion: &Criterion) -> bool {
                true
            }
            async fn handle(
                &self,
                _converter: &CriteriaConverter,
                _criterion: &Criterion,
                _settings: &LanguageSettings,
            ) -> Result<SqlExpression, SearchError> {
                Ok(SqlExpression::constant_true())
            }
        }

        let converter =
            CriteriaConverter::new(vec![Box::new(GreedyTrue), Box::new(MatchNoneHandler)]);
        let expr = converter
            .convert_criteria(&Criterion::MatchNone, &LanguageSettings::default())
            .await
            .unwrap();
        assert_eq!(expr.clause, "1 = 1");
    }

    #[test]
    fn test_all_empty_is_constant_true() {
        assert_eq!(SqlExpression::all(Vec::new()).clause, "1 = 1");
    }

    #[test]
    fn test_any_empty_is_constant_false() {
        assert_eq!(SqlExpression::any(Vec::new()).clause, "1 = 0");
    }

    #[test]
    fn test_single_part_degenerates() {
        let expr = SqlExpression::all(vec![SqlExpression::new("a = ?", vec![SqlParam::Int(1)])]);
        assert_eq!(expr.clause, "a = ?");
        assert_eq!(expr.params, vec![SqlParam::Int(1)]);
    }

    #[test]
    fn test_join_preserves_operand_and_param_order() {
        let expr = SqlExpression::any(vec![
            SqlExpression::new("a = ?", vec![SqlParam::Int(1)]),
            SqlExpression::new("b = ?", vec![SqlParam::Int(2)]),
        ]);
        assert_eq!(expr.clause, "(a = ? OR b = ?)");
        assert_eq!(expr.params, vec![SqlParam::Int(1), SqlParam::Int(2)]);
    }

    #[test]
    fn test_inline_rendering() {
        let expr = SqlExpression::new(
            "(login = ? AND active = ?)",
            vec![SqlParam::Text("o'neil".into()), SqlParam::Bool(true)],
        );
        assert_eq!(expr.inline(), "(login = 'o''neil' AND active = TRUE)");
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("50%_a!b"), "50!%!_a!!b");
    }

    #[test]
    fn test_placeholder_list() {
        assert_eq!(placeholder_list(3), "(?, ?, ?)");
        assert_eq!(placeholder_list(1), "(?)");
    }
}
