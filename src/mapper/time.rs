//! Date field mapper.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

use crate::error::SearchError;

use super::scalar::mismatch;
use super::{DateInput, FieldKind, FieldValue, FieldValueMapper, IndexValue, SearchField};

/// Date fields index as UTC ISO-8601 strings (`YYYY-MM-DDTHH:mm:ssZ`).
///
/// Accepts a numeric Unix timestamp or a parseable date string. Unparseable
/// input is a fatal error carrying the offending value — silently coercing
/// to epoch zero would corrupt the index entry.
pub struct DateMapper;

impl DateMapper {
    fn parse_text(value: &str) -> Option<DateTime<Utc>> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
            return Some(dt.with_timezone(&Utc));
        }
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S") {
            return Some(dt.and_utc());
        }
        if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
            return date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
        }
        None
    }

    fn format(dt: DateTime<Utc>) -> String {
        dt.format("%Y-%m-%dT%H:%M:%SZ").to_string()
    }
}

impl FieldValueMapper for DateMapper {
    fn kinds(&self) -> &'static [FieldKind] {
        &[FieldKind::Date]
    }

    fn can_map(&self, field: &SearchField) -> bool {
        matches!(field.value, FieldValue::Date(_))
    }

    fn map(&self, field: &SearchField) -> Result<IndexValue, SearchError> {
        let input = match &field.value {
            FieldValue::Date(input) => input,
            other => return Err(mismatch(field, "Date", other)),
        };
        let dt = match input {
            DateInput::Timestamp(secs) => Utc.timestamp_opt(*secs, 0).single().ok_or_else(|| {
                SearchError::invalid_argument(
                    field.name.clone(),
                    format!("timestamp {secs} is out of range"),
                )
            })?,
            DateInput::Text(value) => Self::parse_text(value).ok_or_else(|| {
                SearchError::invalid_argument(
                    field.name.clone(),
                    format!("cannot parse date string '{value}'"),
                )
            })?,
        };
        Ok(IndexValue::Str(Self::format(dt)))
    }
}
