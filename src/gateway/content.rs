// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Content search gateway.
//!
//! Orchestrates a `find()` call: compiles the filter criterion through the
//! converter, applies sort clauses, offset and limit, executes, and returns
//! raw rows plus an optional count.
//!
//! Schema notes: we stick to plain integer/text columns so the same DDL
//! works through sqlx's `Any` driver on SQLite and MySQL. MySQL returns
//! TEXT columns as bytes through `Any`, so string hydration tries `String`
//! first and falls back to `Vec<u8>`.

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{AnyPool, Row};
use tracing::debug;

use crate::convert::{ContentCountProvider, CriteriaConverter, SqlExpression};
use crate::criterion::Criterion;
use crate::error::SearchError;
use crate::language::LanguageSettings;
use crate::schema::CONTENT_TABLE;

use super::bind_params;

/// One row of the content table, as hydrated from a find query.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentRow {
    pub id: i64,
    pub content_type_id: i64,
    pub status: i64,
    pub modified: i64,
    pub language_mask: i64,
    pub name: Option<String>,
}

/// Raw result of a gateway find: rows plus an optional total count
/// (`None` when counting was skipped for performance).
#[derive(Debug)]
pub struct FindResult {
    pub count: Option<i64>,
    pub rows: Vec<ContentRow>,
}

/// Sortable content columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    ContentId,
    Modified,
    Name,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// One validated sort clause. Column names come from the enum, never from
/// caller strings, so sort input cannot inject SQL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortClause {
    pub field: SortField,
    pub order: SortOrder,
}

impl SortClause {
    pub fn ascending(field: SortField) -> Self {
        Self {
            field,
            order: SortOrder::Ascending,
        }
    }

    pub fn descending(field: SortField) -> Self {
        Self {
            field,
            order: SortOrder::Descending,
        }
    }

    fn to_sql(self) -> String {
        let column = match self.field {
            SortField::ContentId => "id",
            SortField::Modified => "modified",
            SortField::Name => "name",
        };
        let direction = match self.order {
            SortOrder::Ascending => "ASC",
            SortOrder::Descending => "DESC",
        };
        format!("{column} {direction}")
    }
}

/// Gateway for criterion-driven content queries.
pub struct ContentGateway {
    pool: AnyPool,
    is_sqlite: bool,
    converter: Arc<CriteriaConverter>,
}

impl ContentGateway {
    pub fn new(pool: AnyPool, is_sqlite: bool, converter: Arc<CriteriaConverter>) -> Self {
        Self {
            pool,
            is_sqlite,
            converter,
        }
    }

    /// Get a clone of the connection pool for sharing with other gateways.
    pub fn pool(&self) -> AnyPool {
        self.pool.clone()
    }

    /// Create the content, full-text, user and location tables.
    pub async fn init_schema(&self) -> Result<(), SearchError> {
        let statements: &[&str] = if self.is_sqlite {
            &[
                r#"
                CREATE TABLE IF NOT EXISTS ibexa_content (
                    id INTEGER PRIMARY KEY,
                    content_type_id INTEGER NOT NULL,
                    status INTEGER NOT NULL DEFAULT 1,
                    modified INTEGER NOT NULL DEFAULT 0,
                    language_mask INTEGER NOT NULL DEFAULT 1,
                    name TEXT
                )
                "#,
                r#"
                CREATE TABLE IF NOT EXISTS ibexa_search_word (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    word TEXT NOT NULL UNIQUE,
                    object_count INTEGER NOT NULL DEFAULT 0
                )
                "#,
                r#"
                CREATE TABLE IF NOT EXISTS ibexa_search_object_word_link (
                    word_id INTEGER NOT NULL,
                    contentobject_id INTEGER NOT NULL,
                    language_mask INTEGER NOT NULL DEFAULT 1
                )
                "#,
                "CREATE INDEX IF NOT EXISTS idx_word_link_content
                 ON ibexa_search_object_word_link (contentobject_id)",
                r#"
                CREATE TABLE IF NOT EXISTS ibexa_user (
                    contentobject_id INTEGER PRIMARY KEY,
                    login TEXT NOT NULL
                )
                "#,
                r#"
                CREATE TABLE IF NOT EXISTS ibexa_content_location (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    content_id INTEGER NOT NULL,
                    path_string TEXT NOT NULL
                )
                "#,
            ]
        } else {
            &[
                r#"
                CREATE TABLE IF NOT EXISTS ibexa_content (
                    id BIGINT PRIMARY KEY,
                    content_type_id BIGINT NOT NULL,
                    status BIGINT NOT NULL DEFAULT 1,
                    modified BIGINT NOT NULL DEFAULT 0,
                    language_mask BIGINT NOT NULL DEFAULT 1,
                    name VARCHAR(255),
                    INDEX idx_content_modified (modified),
                    INDEX idx_content_type (content_type_id)
                )
                "#,
                r#"
                CREATE TABLE IF NOT EXISTS ibexa_search_word (
                    id BIGINT AUTO_INCREMENT PRIMARY KEY,
                    word VARCHAR(150) NOT NULL,
                    object_count BIGINT NOT NULL DEFAULT 0,
                    UNIQUE KEY uniq_search_word (word)
                )
                "#,
                r#"
                CREATE TABLE IF NOT EXISTS ibexa_search_object_word_link (
                    word_id BIGINT NOT NULL,
                    contentobject_id BIGINT NOT NULL,
                    language_mask BIGINT NOT NULL DEFAULT 1,
                    INDEX idx_word_link_content (contentobject_id),
                    INDEX idx_word_link_word (word_id)
                )
                "#,
                r#"
                CREATE TABLE IF NOT EXISTS ibexa_user (
                    contentobject_id BIGINT PRIMARY KEY,
                    login VARCHAR(150) NOT NULL
                )
                "#,
                r#"
                CREATE TABLE IF NOT EXISTS ibexa_content_location (
                    id BIGINT AUTO_INCREMENT PRIMARY KEY,
                    content_id BIGINT NOT NULL,
                    path_string VARCHAR(255) NOT NULL,
                    INDEX idx_location_path (path_string)
                )
                "#,
            ]
        };

        for sql in statements {
            sqlx::query(sql)
                .execute(&self.pool)
                .await
                .map_err(|e| SearchError::Backend(e.to_string()))?;
        }
        Ok(())
    }

    /// Execute a criterion-filtered find.
    ///
    /// `limit = 0` skips the row query (count-only searches); `do_count =
    /// false` skips the count query (`count` comes back `None`).
    pub async fn find(
        &self,
        criterion: &Criterion,
        offset: u64,
        limit: usize,
        sort_clauses: &[SortClause],
        language_filter: &LanguageSettings,
        do_count: bool,
    ) -> Result<FindResult, SearchError> {
        let filter = self
            .converter
            .convert_criteria(criterion, language_filter)
            .await?;
        debug!(clause = %filter.clause, "compiled search criterion");

        let count = if do_count {
            Some(self.count(&filter).await?)
        } else {
            None
        };

        let rows = if limit > 0 {
            self.fetch_rows(&filter, offset, limit, sort_clauses).await?
        } else {
            Vec::new()
        };

        Ok(FindResult { count, rows })
    }

    async fn count(&self, filter: &SqlExpression) -> Result<i64, SearchError> {
        let sql = format!(
            "SELECT COUNT(*) as cnt FROM {CONTENT_TABLE} WHERE {}",
            filter.clause
        );
        let row = bind_params(sqlx::query(&sql), &filter.params)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| SearchError::Backend(e.to_string()))?;
        row.try_get("cnt")
            .map_err(|e| SearchError::Backend(e.to_string()))
    }

    async fn fetch_rows(
        &self,
        filter: &SqlExpression,
        offset: u64,
        limit: usize,
        sort_clauses: &[SortClause],
    ) -> Result<Vec<ContentRow>, SearchError> {
        let order_by = if sort_clauses.is_empty() {
            "id ASC".to_string()
        } else {
            sort_clauses
                .iter()
                .map(|c| c.to_sql())
                .collect::<Vec<_>>()
                .join(", ")
        };

        let sql = format!(
            "SELECT id, content_type_id, status, modified, language_mask, name \
             FROM {CONTENT_TABLE} WHERE {} ORDER BY {order_by} LIMIT ? OFFSET ?",
            filter.clause
        );

        let query = bind_params(sqlx::query(&sql), &filter.params)
            .bind(limit as i64)
            .bind(offset as i64);
        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| SearchError::Backend(e.to_string()))?;

        let mut result = Vec::with_capacity(rows.len());
        for row in rows {
            result.push(hydrate_row(&row)?);
        }
        Ok(result)
    }

    /// Insert or replace a content row. Used by the host repository when
    /// content is published, and by tests to seed fixtures.
    pub async fn upsert_content(&self, content: &ContentRow) -> Result<(), SearchError> {
        let sql = if self.is_sqlite {
            "INSERT INTO ibexa_content (id, content_type_id, status, modified, language_mask, name) \
             VALUES (?, ?, ?, ?, ?, ?) \
             ON CONFLICT(id) DO UPDATE SET \
                content_type_id = excluded.content_type_id, \
                status = excluded.status, \
                modified = excluded.modified, \
                language_mask = excluded.language_mask, \
                name = excluded.name"
        } else {
            "INSERT INTO ibexa_content (id, content_type_id, status, modified, language_mask, name) \
             VALUES (?, ?, ?, ?, ?, ?) \
             ON DUPLICATE KEY UPDATE \
                content_type_id = VALUES(content_type_id), \
                status = VALUES(status), \
                modified = VALUES(modified), \
                language_mask = VALUES(language_mask), \
                name = VALUES(name)"
        };

        sqlx::query(sql)
            .bind(content.id)
            .bind(content.content_type_id)
            .bind(content.status)
            .bind(content.modified)
            .bind(content.language_mask)
            .bind(&content.name)
            .execute(&self.pool)
            .await
            .map_err(|e| SearchError::Backend(e.to_string()))?;
        Ok(())
    }

    /// Fetch a single content row by id.
    pub async fn content_by_id(&self, id: i64) -> Result<Option<ContentRow>, SearchError> {
        let row = sqlx::query(
            "SELECT id, content_type_id, status, modified, language_mask, name \
             FROM ibexa_content WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| SearchError::Backend(e.to_string()))?;

        row.map(|r| hydrate_row(&r)).transpose()
    }
}

fn hydrate_row(row: &sqlx::any::AnyRow) -> Result<ContentRow, SearchError> {
    // Name is TEXT: read as String (SQLite) with a bytes fallback (MySQL
    // through the Any driver).
    let name: Option<String> = row.try_get::<String, _>("name").ok().or_else(|| {
        row.try_get::<Vec<u8>, _>("name")
            .ok()
            .and_then(|bytes| String::from_utf8(bytes).ok())
    });

    Ok(ContentRow {
        id: row
            .try_get("id")
            .map_err(|e| SearchError::Backend(e.to_string()))?,
        content_type_id: row
            .try_get("content_type_id")
            .map_err(|e| SearchError::Backend(e.to_string()))?,
        status: row.try_get("status").unwrap_or(1),
        modified: row.try_get("modified").unwrap_or(0),
        language_mask: row.try_get("language_mask").unwrap_or(1),
        name,
    })
}

/// Total-content-count source for the FullText stop-word threshold.
pub struct SqlContentCount {
    pool: AnyPool,
}

impl SqlContentCount {
    pub fn new(pool: AnyPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ContentCountProvider for SqlContentCount {
    async fn total_content_count(&self) -> Result<i64, SearchError> {
        let row = sqlx::query("SELECT COUNT(*) as cnt FROM ibexa_content")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| SearchError::Backend(e.to_string()))?;
        row.try_get("cnt")
            .map_err(|e| SearchError::Backend(e.to_string()))
    }
}
