//! Logical combinator handlers.
//!
//! Composite handlers recurse into the converter once per child and combine
//! the compiled fragments with the matching boolean SQL operator, preserving
//! child order for deterministic generated SQL.
//!
//! Zero children is not produced by the public combinators but is legal on
//! the AST; an empty AND compiles to constant true, an empty OR to constant
//! false (the neutral elements of the respective operators).

use async_trait::async_trait;

use crate::criterion::Criterion;
use crate::error::SearchError;
use crate::language::LanguageSettings;

use super::{CriteriaConverter, CriterionHandler, SqlExpression};

/// Compiles [`Criterion::LogicalAnd`] into `(child AND child AND …)`.
pub struct LogicalAndHandler;

#[async_trait]
impl CriterionHandler for LogicalAndHandler {
    fn accepts(&self, criterion: &Criterion) -> bool {
        matches!(criterion, Criterion::LogicalAnd(_))
    }

    async fn handle(
        &self,
        converter: &CriteriaConverter,
        criterion: &Criterion,
        settings: &LanguageSettings,
    ) -> Result<SqlExpression, SearchError> {
        let children = match criterion {
            Criterion::LogicalAnd(children) => children,
            other => {
                return Err(SearchError::invalid_argument(
                    "criterion",
                    format!("LogicalAndHandler cannot handle '{}'", other.kind()),
                ))
            }
        };
        Ok(SqlExpression::all(
            convert_children(converter, children, settings).await?,
        ))
    }
}

/// Compiles [`Criterion::LogicalOr`] into `(child OR child OR …)`.
pub struct LogicalOrHandler;

#[async_trait]
impl CriterionHandler for LogicalOrHandler {
    fn accepts(&self, criterion: &Criterion) -> bool {
        matches!(criterion, Criterion::LogicalOr(_))
    }

    async fn handle(
        &self,
        converter: &CriteriaConverter,
        criterion: &Criterion,
        settings: &LanguageSettings,
    ) -> Result<SqlExpression, SearchError> {
        let children = match criterion {
            Criterion::LogicalOr(children) => children,
            other => {
                return Err(SearchError::invalid_argument(
                    "criterion",
                    format!("LogicalOrHandler cannot handle '{}'", other.kind()),
                ))
            }
        };
        Ok(SqlExpression::any(
            convert_children(converter, children, settings).await?,
        ))
    }
}

/// Compiles [`Criterion::LogicalNot`] into `NOT (child)`.
pub struct LogicalNotHandler;

#[async_trait]
impl CriterionHandler for LogicalNotHandler {
    fn accepts(&self, criterion: &Criterion) -> bool {
        matches!(criterion, Criterion::LogicalNot(_))
    }

    async fn handle(
        &self,
        converter: &CriteriaConverter,
        criterion: &Criterion,
        settings: &LanguageSettings,
    ) -> Result<SqlExpression, SearchError> {
        let inner = match criterion {
            Criterion::LogicalNot(inner) => inner,
            other => {
                return Err(SearchError::invalid_argument(
                    "criterion",
                    format!("LogicalNotHandler cannot handle '{}'", other.kind()),
                ))
            }
        };
        let compiled = converter.convert_criteria(inner, settings).await?;
        Ok(SqlExpression::not(compiled))
    }
}

async fn convert_children(
    converter: &CriteriaConverter,
    children: &[Criterion],
    settings: &LanguageSettings,
) -> Result<Vec<SqlExpression>, SearchError> {
    let mut parts = Vec::with_capacity(children.len());
    for child in children {
        parts.push(converter.convert_criteria(child, settings).await?);
    }
    Ok(parts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::{ContentTypeIdHandler, MatchNoneHandler, SqlParam};

    fn converter() -> CriteriaConverter {
        CriteriaConverter::new(vec![
            Box::new(ContentTypeIdHandler),
            Box::new(LogicalAndHandler),
            Box::new(LogicalOrHandler),
            Box::new(LogicalNotHandler),
            Box::new(MatchNoneHandler),
        ])
    }

    #[tokio::test]
    async fn test_and_over_disjoint_type_sets() {
        // Conjunction over independently-compiled children, not merged
        // operands: satisfiable by no single row since the id sets are
        // disjoint.
        let criterion = Criterion::content_type_id([3, 4]).and(Criterion::content_type_id([5]));
        let expr = converter()
            .convert_criteria(&criterion, &LanguageSettings::default())
            .await
            .unwrap();
        assert_eq!(
            expr.clause,
            "(ibexa_content.content_type_id IN (?, ?) AND ibexa_content.content_type_id IN (?))"
        );
        assert_eq!(
            expr.params,
            vec![SqlParam::Int(3), SqlParam::Int(4), SqlParam::Int(5)]
        );
    }

    #[tokio::test]
    async fn test_or_preserves_child_order() {
        let criterion = Criterion::content_type_id([1]).or(Criterion::content_type_id([2]));
        let expr = converter()
            .convert_criteria(&criterion, &LanguageSettings::default())
            .await
            .unwrap();
        assert_eq!(
            expr.clause,
            "(ibexa_content.content_type_id IN (?) OR ibexa_content.content_type_id IN (?))"
        );
        assert_eq!(expr.params, vec![SqlParam::Int(1), SqlParam::Int(2)]);
    }

    #[tokio::test]
    async fn test_not_wraps_child() {
        let criterion = Criterion::content_type_id([9]).negate();
        let expr = converter()
            .convert_criteria(&criterion, &LanguageSettings::default())
            .await
            .unwrap();
        assert_eq!(expr.clause, "NOT (ibexa_content.content_type_id IN (?))");
    }

    #[tokio::test]
    async fn test_single_child_degenerates() {
        let criterion = Criterion::LogicalAnd(vec![Criterion::content_type_id([7])]);
        let expr = converter()
            .convert_criteria(&criterion, &LanguageSettings::default())
            .await
            .unwrap();
        assert_eq!(expr.clause, "ibexa_content.content_type_id IN (?)");
    }

    #[tokio::test]
    async fn test_empty_and_is_true_empty_or_is_false() {
        let c = converter();
        let settings = LanguageSettings::default();
        let and = c
            .convert_criteria(&Criterion::LogicalAnd(Vec::new()), &settings)
            .await
            .unwrap();
        assert_eq!(and.clause, "1 = 1");
        let or = c
            .convert_criteria(&Criterion::LogicalOr(Vec::new()), &settings)
            .await
            .unwrap();
        assert_eq!(or.clause, "1 = 0");
    }

    #[tokio::test]
    async fn test_nested_composition() {
        let criterion = Criterion::LogicalOr(vec![
            Criterion::content_type_id([1]).and(Criterion::MatchNone),
            Criterion::content_type_id([2]),
        ]);
        let expr = converter()
            .convert_criteria(&criterion, &LanguageSettings::default())
            .await
            .unwrap();
        assert_eq!(
            expr.clause,
            "((ibexa_content.content_type_id IN (?) AND 1 = 0) OR ibexa_content.content_type_id IN (?))"
        );
    }

    #[tokio::test]
    async fn test_unregistered_child_propagates_error() {
        let criterion = Criterion::LogicalAnd(vec![Criterion::MatchAll]);
        let result = converter()
            .convert_criteria(&criterion, &LanguageSettings::default())
            .await;
        assert!(matches!(result, Err(SearchError::NotImplemented(_))));
    }
}
