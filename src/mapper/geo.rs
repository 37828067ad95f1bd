//! Geo location field mapper.

use crate::error::SearchError;

use super::scalar::mismatch;
use super::{FieldKind, FieldValue, FieldValueMapper, IndexValue, SearchField};

/// Geo locations index as a `"lat,lon"` string with six decimal places,
/// or null when either coordinate is absent.
pub struct GeoLocationMapper;

impl FieldValueMapper for GeoLocationMapper {
    fn kinds(&self) -> &'static [FieldKind] {
        &[FieldKind::GeoLocation]
    }

    fn can_map(&self, field: &SearchField) -> bool {
        matches!(field.value, FieldValue::GeoLocation { .. })
    }

    fn map(&self, field: &SearchField) -> Result<IndexValue, SearchError> {
        match &field.value {
            FieldValue::GeoLocation {
                latitude: Some(lat),
                longitude: Some(lon),
            } => Ok(IndexValue::Str(format!("{lat:.6},{lon:.6}"))),
            FieldValue::GeoLocation { .. } => Ok(IndexValue::Null),
            other => Err(mismatch(field, "GeoLocation", other)),
        }
    }
}
