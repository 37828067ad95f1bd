// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Error taxonomy for the search core.
//!
//! Three fatal classes (configuration, type/shape mismatch, unparseable
//! data), one recoverable class (`NotFound`, isolated per item during bulk
//! indexing), and one wrapper for everything the database driver throws.
//! Driver errors are converted to [`SearchError::Backend`] at the call site
//! so callers catch a single category instead of driver-specific types.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SearchError {
    /// Invalid configuration, rejected at construction time.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// A value had the wrong type or shape for the operation.
    #[error("Invalid argument '{argument}': {message}")]
    InvalidArgument { argument: String, message: String },

    /// No handler or mapper is wired for the given input. Always fatal:
    /// a dropped filter criterion would silently broaden the result set,
    /// a dropped field would leave a search blind spot.
    #[error("Not implemented: {0}")]
    NotImplemented(String),

    /// Content does not exist (recoverable during bulk indexing).
    #[error("Content {0} not found")]
    NotFound(i64),

    /// Unknown language code in a language filter.
    #[error("Language '{0}' is not registered")]
    UnknownLanguage(String),

    /// Storage backend error (wraps driver-specific failures).
    #[error("Storage backend error: {0}")]
    Backend(String),
}

impl SearchError {
    /// Construct an [`SearchError::InvalidArgument`] with the offending value.
    pub fn invalid_argument(argument: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            argument: argument.into(),
            message: message.into(),
        }
    }

    /// Whether this error may be skipped per item during bulk indexing.
    /// Backend failures are never recoverable: they affect the whole batch.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Backend(_))
    }
}
