// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Field value mapping
//!
//! Converts typed search field values into the representation the backing
//! store indexes. Pure value conversion: no database access, no side
//! effects.
//!
//! The [`AggregateFieldValueMapper`] composes the family: an exact-kind
//! lookup table first, then a linear `can_map` scan over general-purpose
//! mappers. An unmapped field is a fatal [`SearchError::NotImplemented`] —
//! silently dropping a field from the index would cause search blind spots.

mod geo;
mod scalar;
mod text;
mod time;

pub use geo::GeoLocationMapper;
pub use scalar::{BooleanMapper, IntegerMapper, PriceMapper};
pub use text::{sanitize_identifier, sanitize_string, IdentifierMapper, StringMapper};
pub use time::DateMapper;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::SearchError;

/// Exact search-type tag of a field, the key of the aggregate's fast path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldKind {
    Boolean,
    Integer,
    MultipleInteger,
    Price,
    Str,
    MultipleStr,
    Text,
    FullText,
    Identifier,
    MultipleIdentifier,
    Date,
    GeoLocation,
}

/// Date field input: a Unix timestamp or a date string to parse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DateInput {
    Timestamp(i64),
    Text(String),
}

/// Typed value of a search field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    Boolean(bool),
    Integer(i64),
    MultipleInteger(Vec<i64>),
    Price(f64),
    Str(String),
    MultipleStr(Vec<String>),
    Text(String),
    FullText(String),
    Identifier(String),
    MultipleIdentifier(Vec<String>),
    Date(DateInput),
    GeoLocation {
        latitude: Option<f64>,
        longitude: Option<f64>,
    },
}

impl FieldValue {
    pub fn kind(&self) -> FieldKind {
        match self {
            Self::Boolean(_) => FieldKind::Boolean,
            Self::Integer(_) => FieldKind::Integer,
            Self::MultipleInteger(_) => FieldKind::MultipleInteger,
            Self::Price(_) => FieldKind::Price,
            Self::Str(_) => FieldKind::Str,
            Self::MultipleStr(_) => FieldKind::MultipleStr,
            Self::Text(_) => FieldKind::Text,
            Self::FullText(_) => FieldKind::FullText,
            Self::Identifier(_) => FieldKind::Identifier,
            Self::MultipleIdentifier(_) => FieldKind::MultipleIdentifier,
            Self::Date(_) => FieldKind::Date,
            Self::GeoLocation { .. } => FieldKind::GeoLocation,
        }
    }
}

/// A search field of a content item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchField {
    /// Field definition identifier.
    pub name: String,
    /// Typed value.
    pub value: FieldValue,
    /// Raw fields bypass identifier sanitization.
    #[serde(default)]
    pub raw: bool,
}

impl SearchField {
    pub fn new(name: impl Into<String>, value: FieldValue) -> Self {
        Self {
            name: name.into(),
            value,
            raw: false,
        }
    }

    pub fn raw(name: impl Into<String>, value: FieldValue) -> Self {
        Self {
            name: name.into(),
            value,
            raw: true,
        }
    }
}

/// Engine representation of an indexed value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum IndexValue {
    Bool(bool),
    Int(i64),
    IntList(Vec<i64>),
    Float(f64),
    Str(String),
    StrList(Vec<String>),
    Null,
}

impl IndexValue {
    /// Textual representations of this value, as fed to the full-text
    /// tokenizer. Non-textual values index their canonical string form.
    pub fn texts(&self) -> Vec<String> {
        match self {
            Self::Bool(b) => vec![b.to_string()],
            Self::Int(n) => vec![n.to_string()],
            Self::IntList(ns) => ns.iter().map(|n| n.to_string()).collect(),
            Self::Float(f) => vec![f.to_string()],
            Self::Str(s) => vec![s.clone()],
            Self::StrList(ss) => ss.clone(),
            Self::Null => Vec::new(),
        }
    }
}

/// Maps one family of search fields to index values.
pub trait FieldValueMapper: Send + Sync {
    /// Exact kinds this mapper serves, for the aggregate's lookup table.
    /// General-purpose mappers return an empty slice and are only reachable
    /// through the `can_map` scan.
    fn kinds(&self) -> &'static [FieldKind] {
        &[]
    }

    /// Whether this mapper converts the given field.
    fn can_map(&self, field: &SearchField) -> bool;

    /// Convert the field value.
    fn map(&self, field: &SearchField) -> Result<IndexValue, SearchError>;
}

/// Composition of the mapper family.
pub struct AggregateFieldValueMapper {
    mappers: Vec<Box<dyn FieldValueMapper>>,
    by_kind: HashMap<FieldKind, usize>,
}

impl AggregateFieldValueMapper {
    /// Compose the given mappers. The lookup table is keyed by each mapper's
    /// declared kinds; on kind collisions the first registered mapper wins.
    pub fn new(mappers: Vec<Box<dyn FieldValueMapper>>) -> Self {
        let mut by_kind = HashMap::new();
        for (index, mapper) in mappers.iter().enumerate() {
            for kind in mapper.kinds() {
                by_kind.entry(*kind).or_insert(index);
            }
        }
        Self { mappers, by_kind }
    }

    /// The default family: every mapper this crate ships.
    pub fn with_default_mappers() -> Self {
        Self::new(vec![
            Box::new(BooleanMapper),
            Box::new(IntegerMapper),
            Box::new(PriceMapper),
            Box::new(StringMapper),
            Box::new(IdentifierMapper),
            Box::new(DateMapper),
            Box::new(GeoLocationMapper),
        ])
    }

    /// Convert a field through the first matching mapper.
    pub fn map(&self, field: &SearchField) -> Result<IndexValue, SearchError> {
        if let Some(&index) = self.by_kind.get(&field.value.kind()) {
            return self.mappers[index].map(field);
        }
        for mapper in &self.mappers {
            if mapper.can_map(field) {
                return mapper.map(field);
            }
        }
        Err(SearchError::NotImplemented(format!(
            "no field value mapper for field '{}' of kind {:?}",
            field.name,
            field.value.kind()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aggregate_dispatches_by_kind() {
        let aggregate = AggregateFieldValueMapper::with_default_mappers();
        let field = SearchField::new("visible", FieldValue::Boolean(true));
        assert_eq!(aggregate.map(&field).unwrap(), IndexValue::Bool(true));
    }

    #[test]
    fn test_aggregate_unmapped_kind_is_fatal() {
        // Only the boolean mapper registered: anything else must fail loudly.
        let aggregate = AggregateFieldValueMapper::new(vec![Box::new(BooleanMapper)]);
        let field = SearchField::new("weight", FieldValue::Price(9.5));
        match aggregate.map(&field) {
            Err(SearchError::NotImplemented(msg)) => {
                assert!(msg.contains("weight"));
                assert!(msg.contains("Price"));
            }
            other => panic!("Expected NotImplemented, got {other:?}"),
        }
    }

    #[test]
    fn test_aggregate_falls_back_to_can_map_scan() {
        // A general-purpose mapper with no declared kinds is still reachable.
        struct CatchAll;
        impl FieldValueMapper for CatchAll {
            fn can_map(&self, _field: &SearchField) -> bool {
                true
            }
            fn map(&self, _field: &SearchField) -> Result<IndexValue, SearchError> {
                Ok(IndexValue::Null)
            }
        }

        let aggregate = AggregateFieldValueMapper::new(vec![Box::new(CatchAll)]);
        let field = SearchField::new("anything", FieldValue::Price(1.0));
        assert_eq!(aggregate.map(&field).unwrap(), IndexValue::Null);
    }

    #[test]
    fn test_index_value_texts() {
        assert_eq!(IndexValue::Int(42).texts(), vec!["42"]);
        assert_eq!(
            IndexValue::StrList(vec!["a".into(), "b".into()]).texts(),
            vec!["a", "b"]
        );
        assert!(IndexValue::Null.texts().is_empty());
    }
}
