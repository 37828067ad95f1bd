//! Scalar field mappers: booleans, integers, prices.

use crate::error::SearchError;

use super::{FieldKind, FieldValue, FieldValueMapper, IndexValue, SearchField};

/// Boolean fields index as native booleans.
pub struct BooleanMapper;

impl FieldValueMapper for BooleanMapper {
    fn kinds(&self) -> &'static [FieldKind] {
        &[FieldKind::Boolean]
    }

    fn can_map(&self, field: &SearchField) -> bool {
        matches!(field.value, FieldValue::Boolean(_))
    }

    fn map(&self, field: &SearchField) -> Result<IndexValue, SearchError> {
        match &field.value {
            FieldValue::Boolean(b) => Ok(IndexValue::Bool(*b)),
            other => Err(mismatch(field, "Boolean", other)),
        }
    }
}

/// Integer fields index as 64-bit integers, scalar or list.
pub struct IntegerMapper;

impl FieldValueMapper for IntegerMapper {
    fn kinds(&self) -> &'static [FieldKind] {
        &[FieldKind::Integer, FieldKind::MultipleInteger]
    }

    fn can_map(&self, field: &SearchField) -> bool {
        matches!(
            field.value,
            FieldValue::Integer(_) | FieldValue::MultipleInteger(_)
        )
    }

    fn map(&self, field: &SearchField) -> Result<IndexValue, SearchError> {
        match &field.value {
            FieldValue::Integer(n) => Ok(IndexValue::Int(*n)),
            FieldValue::MultipleInteger(ns) => Ok(IndexValue::IntList(ns.clone())),
            other => Err(mismatch(field, "Integer", other)),
        }
    }
}

/// Price fields index as floats.
pub struct PriceMapper;

impl FieldValueMapper for PriceMapper {
    fn kinds(&self) -> &'static [FieldKind] {
        &[FieldKind::Price]
    }

    fn can_map(&self, field: &SearchField) -> bool {
        matches!(field.value, FieldValue::Price(_))
    }

    fn map(&self, field: &SearchField) -> Result<IndexValue, SearchError> {
        match &field.value {
            FieldValue::Price(p) => Ok(IndexValue::Float(*p)),
            other => Err(mismatch(field, "Price", other)),
        }
    }
}

pub(super) fn mismatch(field: &SearchField, expected: &str, got: &FieldValue) -> SearchError {
    SearchError::invalid_argument(
        field.name.clone(),
        format!("expected a {expected} value, got {:?}", got.kind()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boolean() {
        let mapper = BooleanMapper;
        let field = SearchField::new("enabled", FieldValue::Boolean(false));
        assert!(mapper.can_map(&field));
        assert_eq!(mapper.map(&field).unwrap(), IndexValue::Bool(false));
    }

    #[test]
    fn test_integer_scalar_and_list() {
        let mapper = IntegerMapper;
        let scalar = SearchField::new("priority", FieldValue::Integer(7));
        assert_eq!(mapper.map(&scalar).unwrap(), IndexValue::Int(7));

        let list = SearchField::new("related", FieldValue::MultipleInteger(vec![1, 2, 3]));
        assert_eq!(
            mapper.map(&list).unwrap(),
            IndexValue::IntList(vec![1, 2, 3])
        );
    }

    #[test]
    fn test_price_casts_to_float() {
        let mapper = PriceMapper;
        let field = SearchField::new("price", FieldValue::Price(19.99));
        assert_eq!(mapper.map(&field).unwrap(), IndexValue::Float(19.99));
    }

    #[test]
    fn test_wrong_kind_rejected() {
        let mapper = BooleanMapper;
        let field = SearchField::new("priority", FieldValue::Integer(7));
        assert!(!mapper.can_map(&field));
        assert!(matches!(
            mapper.map(&field),
            Err(SearchError::InvalidArgument { .. })
        ));
    }
}
