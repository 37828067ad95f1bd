// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Storage gateways.
//!
//! All database access lives here: the find gateway compiling and executing
//! criterion queries, the word-index gateway maintaining the full-text
//! tables, and the indexer gateway streaming content-id batches for bulk
//! (re)indexing.
//!
//! One sqlx `AnyPool` (SQLite or MySQL) is shared by every gateway. No
//! gateway holds a transaction open across calls, and there is no automatic
//! retry at this layer — retries belong to the caller.

mod content;
mod indexer;
mod word_index;

pub use content::{
    ContentGateway, ContentRow, FindResult, SortClause, SortField, SortOrder, SqlContentCount,
};
pub use indexer::IndexerGateway;
pub use word_index::WordIndexGateway;

use std::sync::Once;
use std::time::Duration;

use sqlx::any::AnyPoolOptions;
use sqlx::AnyPool;

use crate::convert::SqlParam;
use crate::error::SearchError;

// SQLx `Any` driver requires runtime installation
static INSTALL_DRIVERS: Once = Once::new();

fn install_drivers() {
    INSTALL_DRIVERS.call_once(|| {
        sqlx::any::install_default_drivers();
    });
}

/// Open a connection pool for the given connection string
/// (`sqlite:…` or `mysql://…`).
pub async fn connect(connection_string: &str) -> Result<AnyPool, SearchError> {
    install_drivers();

    let pool = AnyPoolOptions::new()
        .max_connections(20)
        .acquire_timeout(Duration::from_secs(10))
        .idle_timeout(Duration::from_secs(300))
        .connect(connection_string)
        .await
        .map_err(|e| SearchError::Backend(e.to_string()))?;

    // WAL mode lets index writes proceed while an indexer stream holds an
    // open read cursor on another connection.
    if is_sqlite_url(connection_string) {
        sqlx::query("PRAGMA journal_mode = WAL")
            .execute(&pool)
            .await
            .map_err(|e| SearchError::Backend(format!("Failed to enable WAL mode: {}", e)))?;
        sqlx::query("PRAGMA synchronous = NORMAL")
            .execute(&pool)
            .await
            .map_err(|e| SearchError::Backend(format!("Failed to set synchronous mode: {}", e)))?;
    }

    Ok(pool)
}

/// Whether a connection string targets SQLite (drives dialect-specific DDL
/// and upsert syntax).
pub(crate) fn is_sqlite_url(connection_string: &str) -> bool {
    connection_string.starts_with("sqlite:")
}

/// Bind compiled criterion parameters onto a query in placeholder order.
pub(crate) fn bind_params<'q>(
    mut query: sqlx::query::Query<'q, sqlx::Any, sqlx::any::AnyArguments<'q>>,
    params: &'q [SqlParam],
) -> sqlx::query::Query<'q, sqlx::Any, sqlx::any::AnyArguments<'q>> {
    for param in params {
        query = match param {
            SqlParam::Text(s) => query.bind(s.as_str()),
            SqlParam::Int(n) => query.bind(*n),
            SqlParam::Float(f) => query.bind(*f),
            SqlParam::Bool(b) => query.bind(*b),
        };
    }
    query
}
