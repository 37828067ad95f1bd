//! Constant-match criterion handlers.
//!
//! `MatchNone` compiles to a constant-false predicate rather than being
//! optimized away structurally: callers rely on always receiving a
//! syntactically valid boolean expression. `MatchAll` is usually eliminated
//! by the query assembler before it reaches the converter, but compiles
//! explicitly when it does.

use async_trait::async_trait;

use crate::criterion::Criterion;
use crate::error::SearchError;
use crate::language::LanguageSettings;

use super::{CriteriaConverter, CriterionHandler, SqlExpression};

/// Compiles [`Criterion::MatchAll`] into `1 = 1`.
pub struct MatchAllHandler;

#[async_trait]
impl CriterionHandler for MatchAllHandler {
    fn accepts(&self, criterion: &Criterion) -> bool {
        matches!(criterion, Criterion::MatchAll)
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

/// Compiles [`Criterion::MatchNone`] into `1 = 0`.
pub struct MatchNoneHandler;

#[async_trait]
impl CriterionHandler for MatchNoneHandler {
    fn accepts(&self, criterion: &Criterion) -> bool {
        matches!(criterion, Criterion::MatchNone)
    }

    async fn handle(
        &self,
        _converter: &CriteriaConverter,
        _criterion: &Criterion,
        _settings: &LanguageSettings,
    ) -> Result<SqlExpression, SearchError> {
        Ok(SqlExpression::constant_false())
    }
}
