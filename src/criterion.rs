// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Criterion - AST for search filters
//!
//! Provides a type-safe way to build query filters that the
//! [`CriteriaConverter`](crate::convert::CriteriaConverter) compiles into
//! parameterized SQL boolean expressions.
//!
//! # Example
//!
//! ```rust
//! use search_engine::Criterion;
//!
//! // Simple leaf criterion
//! let filter = Criterion::content_type_id([3, 4]);
//!
//! // Boolean combinations
//! let filter = Criterion::content_type_id([3, 4])
//!     .and(Criterion::full_text("hello world"))
//!     .or(Criterion::user_login_like("admin*"));
//! ```

use serde::{Deserialize, Serialize};

/// A node in the recursive query-filter tree.
///
/// Criteria are immutable value objects once constructed. Composite variants
/// hold their children by value; the tree is strictly acyclic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Criterion {
    /// Filter on content type id: `content_type_id IN (values)`.
    ContentTypeId(Vec<i64>),
    /// Filter on user login, by exact value(s) or wildcard pattern.
    UserLogin {
        operator: Operator,
        values: Vec<String>,
    },
    /// Free-text phrase matched against the full-text word index.
    FullText(String),
    /// Matches every row (constant true).
    MatchAll,
    /// Matches no row (constant false).
    MatchNone,
    /// All children must match.
    LogicalAnd(Vec<Criterion>),
    /// Any child may match.
    LogicalOr(Vec<Criterion>),
    /// The child must not match.
    LogicalNot(Box<Criterion>),
}

/// Comparison operator for value criteria.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operator {
    /// Exact match against one or more values.
    Eq,
    /// SQL LIKE match; `*` in the value acts as the wildcard.
    Like,
}

impl Criterion {
    /// Create a content-type-id filter.
    pub fn content_type_id(ids: impl IntoIterator<Item = i64>) -> Self {
        Self::ContentTypeId(ids.into_iter().collect())
    }

    /// Create an exact-match user-login filter over one or more logins.
    pub fn user_login(values: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self::UserLogin {
            operator: Operator::Eq,
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Create a wildcard user-login filter (`*` matches any run of characters).
    pub fn user_login_like(pattern: impl Into<String>) -> Self {
        Self::UserLogin {
            operator: Operator::Like,
            values: vec![pattern.into()],
        }
    }

    /// Create a full-text filter.
    pub fn full_text(text: impl Into<String>) -> Self {
        Self::FullText(text.into())
    }

    /// Combine with AND.
    pub fn and(self, other: Criterion) -> Self {
        Self::LogicalAnd(vec![self, other])
    }

    /// Combine with OR.
    pub fn or(self, other: Criterion) -> Self {
        Self::LogicalOr(vec![self, other])
    }

    /// Negate this criterion.
    pub fn negate(self) -> Self {
        Self::LogicalNot(Box::new(self))
    }

    /// Stable tag name of this variant, used in dispatch diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ContentTypeId(_) => "ContentTypeId",
            Self::UserLogin { .. } => "UserLogin",
            Self::FullText(_) => "FullText",
            Self::MatchAll => "MatchAll",
            Self::MatchNone => "MatchNone",
            Self::LogicalAnd(_) => "LogicalAnd",
            Self::LogicalOr(_) => "LogicalOr",
            Self::LogicalNot(_) => "LogicalNot",
        }
    }
}
