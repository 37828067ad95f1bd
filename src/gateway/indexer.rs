// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Streaming enumeration of content ids for bulk (re)indexing.
//!
//! Three query families, each with a paired count: all content, content
//! modified since a timestamp, and content under a location subtree. The
//! `get_*` methods return lazy pull-based streams of id batches: rows are
//! pulled one at a time off an open database cursor until a batch fills or
//! the result set is exhausted; the final batch may be short. The stream
//! owns the cursor and releases it when dropped, including on early
//! abandonment by the consumer.
//!
//! Ordering: the since-variant is ordered by `modified` ascending, so
//! re-running an indexing pass with an advancing `since` cursor is safe
//! against concurrent writes that only move `modified` forward. The other
//! variants yield natural id order. All variants see published content only.

use async_stream::try_stream;
use futures::Stream;
use futures::TryStreamExt;
use sqlx::{AnyPool, Row};

use crate::convert::SqlParam;
use crate::error::SearchError;
use crate::schema::CONTENT_STATUS_PUBLISHED;

use super::bind_params;

/// Cursor-based enumerator over indexable content.
pub struct IndexerGateway {
    pool: AnyPool,
}

impl IndexerGateway {
    pub fn new(pool: AnyPool) -> Self {
        Self { pool }
    }

    /// Count all published content.
    pub async fn count_all_content(&self) -> Result<i64, SearchError> {
        self.count(
            "SELECT COUNT(id) as cnt FROM ibexa_content WHERE status = ?",
            vec![SqlParam::Int(CONTENT_STATUS_PUBLISHED)],
        )
        .await
    }

    /// Stream all published content ids in batches of at most `batch_size`.
    pub fn get_all_content(
        &self,
        batch_size: usize,
    ) -> impl Stream<Item = Result<Vec<i64>, SearchError>> + '_ {
        self.id_batches(
            "SELECT id FROM ibexa_content WHERE status = ? ORDER BY id".to_string(),
            vec![SqlParam::Int(CONTENT_STATUS_PUBLISHED)],
            batch_size,
        )
    }

    /// Count published content modified after the given timestamp.
    pub async fn count_content_since(&self, since: i64) -> Result<i64, SearchError> {
        self.count(
            "SELECT COUNT(id) as cnt FROM ibexa_content WHERE status = ? AND modified > ?",
            vec![
                SqlParam::Int(CONTENT_STATUS_PUBLISHED),
                SqlParam::Int(since),
            ],
        )
        .await
    }

    /// Stream ids of published content modified after `since`, ordered by
    /// modification time ascending.
    pub fn get_content_since(
        &self,
        since: i64,
        batch_size: usize,
    ) -> impl Stream<Item = Result<Vec<i64>, SearchError>> + '_ {
        self.id_batches(
            "SELECT id FROM ibexa_content WHERE status = ? AND modified > ? \
             ORDER BY modified ASC"
                .to_string(),
            vec![
                SqlParam::Int(CONTENT_STATUS_PUBLISHED),
                SqlParam::Int(since),
            ],
            batch_size,
        )
    }

    /// Count published content with at least one location under the subtree.
    pub async fn count_content_in_subtree(&self, path_string: &str) -> Result<i64, SearchError> {
        self.count(
            "SELECT COUNT(DISTINCT c.id) as cnt FROM ibexa_content c \
             INNER JOIN ibexa_content_location l ON l.content_id = c.id \
             WHERE c.status = ? AND l.path_string LIKE ?",
            vec![
                SqlParam::Int(CONTENT_STATUS_PUBLISHED),
                SqlParam::Text(format!("{path_string}%")),
            ],
        )
        .await
    }

    /// Stream ids of published content under the subtree. Content with
    /// several locations under the subtree is yielded exactly once.
    pub fn get_content_in_subtree(
        &self,
        path_string: &str,
        batch_size: usize,
    ) -> impl Stream<Item = Result<Vec<i64>, SearchError>> + '_ {
        self.id_batches(
            "SELECT DISTINCT c.id FROM ibexa_content c \
             INNER JOIN ibexa_content_location l ON l.content_id = c.id \
             WHERE c.status = ? AND l.path_string LIKE ? ORDER BY c.id"
                .to_string(),
            vec![
                SqlParam::Int(CONTENT_STATUS_PUBLISHED),
                SqlParam::Text(format!("{path_string}%")),
            ],
            batch_size,
        )
    }

    async fn count(&self, sql: &str, params: Vec<SqlParam>) -> Result<i64, SearchError> {
        let row = bind_params(sqlx::query(sql), &params)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| SearchError::Backend(e.to_string()))?;
        row.try_get("cnt")
            .map_err(|e| SearchError::Backend(e.to_string()))
    }

    fn id_batches(
        &self,
        sql: String,
        params: Vec<SqlParam>,
        batch_size: usize,
    ) -> impl Stream<Item = Result<Vec<i64>, SearchError>> + '_ {
        try_stream! {
            let batch_size = batch_size.max(1);
            let mut rows = bind_params(sqlx::query(&sql), &params).fetch(&self.pool);
            let mut batch: Vec<i64> = Vec::with_capacity(batch_size);
            while let Some(row) = rows
                .try_next()
                .await
                .map_err(|e| SearchError::Backend(e.to_string()))?
            {
                let id: i64 = row
                    .try_get(0)
                    .map_err(|e| SearchError::Backend(e.to_string()))?;
                batch.push(id);
                if batch.len() >= batch_size {
                    yield std::mem::replace(&mut batch, Vec::with_capacity(batch_size));
                }
            }
            if !batch.is_empty() {
                yield batch;
            }
        }
    }
}
