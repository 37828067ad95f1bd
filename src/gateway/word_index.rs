// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Full-text index writes.
//!
//! Maintains the word dictionary and the word/content link table:
//!
//! ```text
//! ibexa_search_word                word, object_count
//! ibexa_search_object_word_link    word_id, contentobject_id, language_mask
//! ```
//!
//! `object_count` is the number of distinct content items containing the
//! word; the FullText handler thresholds on it. Reindexing a content item
//! first removes its previous links (decrementing counts), so the invariant
//! holds across republishes. Writes are synchronous; there is no deferred
//! commit.

use std::collections::BTreeSet;

use sqlx::{AnyPool, Row};
use tracing::{debug, info};

use crate::error::SearchError;

/// Gateway over the full-text word and link tables.
pub struct WordIndexGateway {
    pool: AnyPool,
    is_sqlite: bool,
}

impl WordIndexGateway {
    pub fn new(pool: AnyPool, is_sqlite: bool) -> Self {
        Self { pool, is_sqlite }
    }

    /// Index the given words for a content item, replacing whatever was
    /// indexed for it before. Words are de-duplicated: a content item links
    /// each distinct word exactly once.
    pub async fn index_words(
        &self,
        content_id: i64,
        language_mask: i64,
        words: impl IntoIterator<Item = String>,
    ) -> Result<(), SearchError> {
        self.delete_content(content_id).await?;

        let distinct: BTreeSet<String> = words.into_iter().filter(|w| !w.is_empty()).collect();
        if distinct.is_empty() {
            return Ok(());
        }

        let upsert = if self.is_sqlite {
            "INSERT INTO ibexa_search_word (word, object_count) VALUES (?, 1) \
             ON CONFLICT(word) DO UPDATE SET object_count = object_count + 1"
        } else {
            "INSERT INTO ibexa_search_word (word, object_count) VALUES (?, 1) \
             ON DUPLICATE KEY UPDATE object_count = object_count + 1"
        };

        let word_count = distinct.len();
        for word in distinct {
            sqlx::query(upsert)
                .bind(&word)
                .execute(&self.pool)
                .await
                .map_err(|e| SearchError::Backend(e.to_string()))?;

            let row = sqlx::query("SELECT id FROM ibexa_search_word WHERE word = ?")
                .bind(&word)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| SearchError::Backend(e.to_string()))?;
            let word_id: i64 = row
                .try_get("id")
                .map_err(|e| SearchError::Backend(e.to_string()))?;

            sqlx::query(
                "INSERT INTO ibexa_search_object_word_link (word_id, contentobject_id, language_mask) \
                 VALUES (?, ?, ?)",
            )
            .bind(word_id)
            .bind(content_id)
            .bind(language_mask)
            .execute(&self.pool)
            .await
            .map_err(|e| SearchError::Backend(e.to_string()))?;
        }

        debug!(content_id, words = word_count, "indexed content words");
        Ok(())
    }

    /// Remove a content item from the index, decrementing the object counts
    /// of its words and dropping words no content references anymore.
    pub async fn delete_content(&self, content_id: i64) -> Result<(), SearchError> {
        sqlx::query(
            "UPDATE ibexa_search_word SET object_count = object_count - 1 \
             WHERE id IN (SELECT word_id FROM ibexa_search_object_word_link \
                          WHERE contentobject_id = ?)",
        )
        .bind(content_id)
        .execute(&self.pool)
        .await
        .map_err(|e| SearchError::Backend(e.to_string()))?;

        sqlx::query("DELETE FROM ibexa_search_object_word_link WHERE contentobject_id = ?")
            .bind(content_id)
            .execute(&self.pool)
            .await
            .map_err(|e| SearchError::Backend(e.to_string()))?;

        sqlx::query("DELETE FROM ibexa_search_word WHERE object_count <= 0")
            .execute(&self.pool)
            .await
            .map_err(|e| SearchError::Backend(e.to_string()))?;

        Ok(())
    }

    /// Drop the whole full-text index.
    pub async fn purge(&self) -> Result<(), SearchError> {
        sqlx::query("DELETE FROM ibexa_search_object_word_link")
            .execute(&self.pool)
            .await
            .map_err(|e| SearchError::Backend(e.to_string()))?;
        sqlx::query("DELETE FROM ibexa_search_word")
            .execute(&self.pool)
            .await
            .map_err(|e| SearchError::Backend(e.to_string()))?;
        info!("purged full-text index");
        Ok(())
    }

    /// Object count of one word, for tests and diagnostics.
    pub async fn object_count(&self, word: &str) -> Result<Option<i64>, SearchError> {
        let row = sqlx::query("SELECT object_count FROM ibexa_search_word WHERE word = ?")
            .bind(word)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| SearchError::Backend(e.to_string()))?;
        row.map(|r| {
            r.try_get("object_count")
                .map_err(|e| SearchError::Backend(e.to_string()))
        })
        .transpose()
    }
}
