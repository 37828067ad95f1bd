//! Content type id criterion handler.

use async_trait::async_trait;

use crate::criterion::Criterion;
use crate::error::SearchError;
use crate::language::LanguageSettings;
use crate::schema::CONTENT_TABLE;

use super::{placeholder_list, CriteriaConverter, CriterionHandler, SqlExpression, SqlParam};

/// Compiles [`Criterion::ContentTypeId`] into
/// `content_type_id IN (?, …)` with one integer parameter per id.
pub struct ContentTypeIdHandler;

#[async_trait]
impl CriterionHandler for ContentTypeIdHandler {
    fn accepts(&self, criterion: &Criterion) -> bool {
        matches!(criterion, Criterion::ContentTypeId(_))
    }

    async fn handle(
        &self,
        _converter: &CriteriaConverter,
        criterion: &Criterion,
        _settings: &LanguageSettings,
    ) -> Result<SqlExpression, SearchError> {
        let ids = match criterion {
            Criterion::ContentTypeId(ids) => ids,
            other => {
                return Err(SearchError::invalid_argument(
                    "criterion",
                    format!("ContentTypeIdHandler cannot handle '{}'", other.kind()),
                ))
            }
        };

        // An empty id set matches nothing; empty IN () is not valid SQL.
        if ids.is_empty() {
            return Ok(SqlExpression::constant_false());
        }

        let clause = format!(
            "{CONTENT_TABLE}.content_type_id IN {}",
            placeholder_list(ids.len())
        );
        let params = ids.iter().map(|id| SqlParam::Int(*id)).collect();
        Ok(SqlExpression::new(clause, params))
    }
}
