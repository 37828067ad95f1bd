// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Text field mappers.
//!
//! String-like values are sanitized before indexing: TAB, VT and FF each
//! become one space, the remaining C0 control characters are stripped.
//! Identifier values additionally drop everything outside `[A-Za-z0-9/]`
//! unless the field is flagged raw.

use crate::error::SearchError;

use super::scalar::mismatch;
use super::{FieldKind, FieldValue, FieldValueMapper, IndexValue, SearchField};

/// Replace TAB/VT/FF with a single space and strip the other C0 control
/// characters. Idempotent: a clean string is a fixed point.
pub fn sanitize_string(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '\t' | '\u{0B}' | '\u{0C}' => out.push(' '),
            c if (c as u32) < 0x20 => {}
            c => out.push(c),
        }
    }
    out
}

/// Strip every character outside `[A-Za-z0-9/]`. Idempotent.
pub fn sanitize_identifier(input: &str) -> String {
    input
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '/')
        .collect()
}

/// String-like fields (string, text, full text), scalar or list.
pub struct StringMapper;

impl FieldValueMapper for StringMapper {
    fn kinds(&self) -> &'static [FieldKind] {
        &[
            FieldKind::Str,
            FieldKind::MultipleStr,
            FieldKind::Text,
            FieldKind::FullText,
        ]
    }

    fn can_map(&self, field: &SearchField) -> bool {
        matches!(
            field.value,
            FieldValue::Str(_)
                | FieldValue::MultipleStr(_)
                | FieldValue::Text(_)
                | FieldValue::FullText(_)
        )
    }

    fn map(&self, field: &SearchField) -> Result<IndexValue, SearchError> {
        match &field.value {
            FieldValue::Str(s) | FieldValue::Text(s) | FieldValue::FullText(s) => {
                Ok(IndexValue::Str(sanitize_string(s)))
            }
            FieldValue::MultipleStr(ss) => Ok(IndexValue::StrList(
                ss.iter().map(|s| sanitize_string(s)).collect(),
            )),
            other => Err(mismatch(field, "string", other)),
        }
    }
}

/// Identifier fields, scalar or list. Raw fields pass through unchanged.
pub struct IdentifierMapper;

impl FieldValueMapper for IdentifierMapper {
    fn kinds(&self) -> &'static [FieldKind] {
        &[FieldKind::Identifier, FieldKind::MultipleIdentifier]
    }

    fn can_map(&self, field: &SearchField) -> bool {
        matches!(
            field.value,
            FieldValue::Identifier(_) | FieldValue::MultipleIdentifier(_)
        )
    }

    fn map(&self, field: &SearchField) -> Result<IndexValue, SearchError> {
        match &field.value {
            FieldValue::Identifier(s) => Ok(IndexValue::Str(if field.raw {
                s.clone()
            } else {
                sanitize_identifier(s)
            })),
            FieldValue::MultipleIdentifier(ss) => Ok(IndexValue::StrList(if field.raw {
                ss.clone()
            } else {
                ss.iter().map(|s| sanitize_identifier(s)).collect()
            })),
            other => Err(mismatch(field, "identifier", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_replaces_separator_controls_with_space() {
        assert_eq!(sanitize_string("a\tb\u{0B}c\u{0C}d"), "a b c d");
    }

    #[test]
    fn test_sanitize_strips_other_controls() {
        assert_eq!(sanitize_string("a\u{0}b\nc\rd\u{1F}e"), "abcde");
    }

    #[test]
    fn test_sanitize_is_fixed_point_on_clean_input() {
        let clean = "plain text, nothing fancy";
        assert_eq!(sanitize_string(clean), clean);
        assert_eq!(sanitize_string(&sanitize_string(clean)), clean);
    }

    #[test]
    fn test_identifier_strips_disallowed_chars() {
        assert_eq!(sanitize_identifier("images/logo-v2.png"), "images/logov2png");
        assert_eq!(sanitize_identifier("héllo wörld"), "hllowrld");
    }

    #[test]
    fn test_string_mapper_scalar_and_list() {
        let mapper = StringMapper;
        let field = SearchField::new("title", FieldValue::Text("Hello\tWorld".into()));
        assert_eq!(
            mapper.map(&field).unwrap(),
            IndexValue::Str("Hello World".into())
        );

        let field = SearchField::new(
            "tags",
            FieldValue::MultipleStr(vec!["a\u{0}b".into(), "c".into()]),
        );
        assert_eq!(
            mapper.map(&field).unwrap(),
            IndexValue::StrList(vec!["ab".into(), "c".into()])
        );
    }

    #[test]
    fn test_identifier_mapper_respects_raw_flag() {
        let mapper = IdentifierMapper;
        let field = SearchField::new("path", FieldValue::Identifier("a-b/c".into()));
        assert_eq!(mapper.map(&field).unwrap(), IndexValue::Str("ab/c".into()));

        let raw = SearchField::raw("path", FieldValue::Identifier("a-b/c".into()));
        assert_eq!(mapper.map(&raw).unwrap(), IndexValue::Str("a-b/c".into()));
    }
}
