// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! User login criterion handler.
//!
//! Login filters match against the user table and are wrapped as a content-id
//! subselect, so the compiled expression composes with any other criterion on
//! the content table.

use async_trait::async_trait;

use crate::criterion::{Criterion, Operator};
use crate::error::SearchError;
use crate::language::LanguageSettings;
use crate::schema::{CONTENT_TABLE, USER_TABLE};
use crate::transform::TransformationProcessor;

use super::{
    escape_like, placeholder_list, CriteriaConverter, CriterionHandler, SqlExpression, SqlParam,
    LIKE_ESCAPE,
};

/// Compiles [`Criterion::UserLogin`] into
/// `content.id IN (SELECT contentobject_id FROM user WHERE <predicate>)`.
///
/// With [`Operator::Like`], the value is lowercased through the normalization
/// pipeline, `%`/`_` are escaped and `*` becomes the SQL wildcard. With
/// [`Operator::Eq`], the raw values compile to an `IN` list.
pub struct UserLoginHandler {
    processor: TransformationProcessor,
}

impl UserLoginHandler {
    pub fn new(processor: TransformationProcessor) -> Self {
        Self { processor }
    }

    fn like_pattern(&self, value: &str) -> String {
        // Lowercase first so the pattern matches case-normalized logins,
        // then escape before substituting the wildcard.
        let normalized = self.processor.apply(value);
        escape_like(&normalized).replace('*', "%")
    }
}

#[async_trait]
impl CriterionHandler for UserLoginHandler {
    fn accepts(&self, criterion: &Criterion) -> bool {
        matches!(criterion, Criterion::UserLogin { .. })
    }

    async fn handle(
        &self,
        _converter: &CriteriaConverter,
        criterion: &Criterion,
        _settings: &LanguageSettings,
    ) -> Result<SqlExpression, SearchError> {
        let (operator, values) = match criterion {
            Criterion::UserLogin { operator, values } => (operator, values),
            other => {
                return Err(SearchError::invalid_argument(
                    "criterion",
                    format!("UserLoginHandler cannot handle '{}'", other.kind()),
                ))
            }
        };
        if values.is_empty() {
            return Ok(SqlExpression::constant_false());
        }

        let predicate = match operator {
            Operator::Like => SqlExpression::any(
                values
                    .iter()
                    .map(|value| {
                        SqlExpression::new(
                            format!("login LIKE ? {LIKE_ESCAPE}"),
                            vec![SqlParam::Text(self.like_pattern(value))],
                        )
                    })
                    .collect(),
            ),
            Operator::Eq => SqlExpression::new(
                format!("login IN {}", placeholder_list(values.len())),
                values
                    .iter()
                    .map(|value| SqlParam::Text(value.clone()))
                    .collect(),
            ),
        };

        Ok(SqlExpression::new(
            format!(
                "{CONTENT_TABLE}.id IN (SELECT contentobject_id FROM {USER_TABLE} WHERE {})",
                predicate.clause
            ),
            predicate.params,
        ))
    }
}
