// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Language masks
//!
//! Each registered language occupies one bit of an `i64` mask; bit 0 is
//! reserved for the "always available" fallback. A content row's
//! `language_mask` has a language's bit set iff the content carries a
//! translation in that language.
//!
//! ```text
//! bit 0        always-available flag
//! bit 1..63    one bit per registered language, in registration order
//! ```

use std::collections::HashMap;

use serde::Deserialize;

use crate::error::SearchError;

/// Bit 0 of every mask: content marked "always available" matches any
/// language filter.
pub const ALWAYS_AVAILABLE_BIT: i64 = 1;

/// Language filtering options passed alongside a criterion.
#[derive(Debug, Clone, Deserialize)]
pub struct LanguageSettings {
    /// Requested translation languages, in preference order.
    #[serde(default)]
    pub languages: Vec<String>,
    /// Whether "always available" content matches regardless of the
    /// requested languages.
    #[serde(default = "default_use_always_available")]
    pub use_always_available: bool,
}

fn default_use_always_available() -> bool { true }

impl Default for LanguageSettings {
    fn default() -> Self {
        Self {
            languages: Vec::new(),
            use_always_available: default_use_always_available(),
        }
    }
}

impl LanguageSettings {
    /// Settings that restrict to the given languages.
    pub fn for_languages(languages: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            languages: languages.into_iter().map(Into::into).collect(),
            use_always_available: true,
        }
    }

    /// Whether any language restriction applies at all.
    pub fn is_empty(&self) -> bool {
        self.languages.is_empty()
    }
}

/// Registry of known languages and their mask bits.
///
/// Built once at startup and read-only afterwards. Registration order
/// determines bit assignment (first registered language gets bit 1).
#[derive(Debug, Clone)]
pub struct LanguageRegistry {
    bits: HashMap<String, i64>,
    order: Vec<String>,
}

impl LanguageRegistry {
    /// Create a registry over the given language codes.
    ///
    /// At most 62 languages fit in the mask alongside the reserved bit.
    pub fn new(codes: impl IntoIterator<Item = impl Into<String>>) -> Result<Self, SearchError> {
        let mut bits = HashMap::new();
        let mut order = Vec::new();
        for (i, code) in codes.into_iter().enumerate() {
            if i >= 62 {
                return Err(SearchError::Config(
                    "language registry supports at most 62 languages".to_string(),
                ));
            }
            let code = code.into();
            bits.insert(code.clone(), 1_i64 << (i + 1));
            order.push(code);
        }
        Ok(Self { bits, order })
    }

    /// The mask bit of a single language.
    pub fn bit_of(&self, code: &str) -> Result<i64, SearchError> {
        self.bits
            .get(code)
            .copied()
            .ok_or_else(|| SearchError::UnknownLanguage(code.to_string()))
    }

    /// Compute the combined mask for a language filter: the OR of every
    /// requested language bit, plus bit 0 when always-available content
    /// should match.
    pub fn mask_for(&self, settings: &LanguageSettings) -> Result<i64, SearchError> {
        let mut mask = if settings.use_always_available {
            ALWAYS_AVAILABLE_BIT
        } else {
            0
        };
        for code in &settings.languages {
            mask |= self.bit_of(code)?;
        }
        Ok(mask)
    }

    /// Pick the translation a row matched in: the first requested language
    /// whose bit is set in the row's mask. When none matches but the row is
    /// always-available, fall back to the first registered language present
    /// in the mask.
    pub fn matched_translation(
        &self,
        row_mask: i64,
        settings: &LanguageSettings,
    ) -> Option<String> {
        for code in &settings.languages {
            if let Some(bit) = self.bits.get(code) {
                if row_mask & bit != 0 {
                    return Some(code.clone());
                }
            }
        }
        if row_mask & ALWAYS_AVAILABLE_BIT != 0 || settings.is_empty() {
            for code in &self.order {
                if row_mask & self.bits[code] != 0 {
                    return Some(code.clone());
                }
            }
        }
        None
    }

    /// All registered language codes, in registration order.
    pub fn codes(&self) -> &[String] {
        &self.order
    }
}
