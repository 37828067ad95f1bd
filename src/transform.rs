// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Text normalization pipeline
//!
//! Query text and indexed text run through the same ordered sequence of
//! transforms before tokenization, so that "Crème Brûlée" and "creme brulee"
//! land on identical index words. Each transform is idempotent, and the
//! configured order matters: later transforms assume earlier ones already
//! ran (e.g. `diacritics` folds to ASCII that `cleanup` then treats as word
//! characters).
//!
//! Supported transform identifiers:
//!
//! | id              | effect                                         |
//! |-----------------|------------------------------------------------|
//! | `lowercase`     | Unicode lowercasing                            |
//! | `diacritics`    | Latin diacritic folding to ASCII               |
//! | `transliterate` | Cyrillic and Greek romanization                |
//! | `cleanup`       | punctuation → space, collapse whitespace, trim |

use std::sync::OnceLock;

use regex::Regex;

use crate::error::SearchError;

/// One step of the normalization pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Transform {
    Lowercase,
    Diacritics,
    Transliterate,
    Cleanup,
}

impl Transform {
    fn parse(id: &str) -> Result<Self, SearchError> {
        match id {
            "lowercase" => Ok(Self::Lowercase),
            "diacritics" => Ok(Self::Diacritics),
            "transliterate" => Ok(Self::Transliterate),
            "cleanup" => Ok(Self::Cleanup),
            other => Err(SearchError::Config(format!(
                "unknown text transform '{other}'"
            ))),
        }
    }

    fn apply(self, text: &str) -> String {
        match self {
            Self::Lowercase => text.to_lowercase(),
            Self::Diacritics => fold_chars(text, fold_diacritic),
            Self::Transliterate => fold_chars(text, transliterate_char),
            Self::Cleanup => cleanup(text),
        }
    }
}

/// Ordered, validated text-normalization pipeline.
///
/// Construction fails on an unknown transform identifier; a processor that
/// exists is guaranteed to apply cleanly to any input.
#[derive(Debug, Clone)]
pub struct TransformationProcessor {
    transforms: Vec<Transform>,
}

impl TransformationProcessor {
    /// Build a processor from configured transform identifiers.
    pub fn new(commands: &[String]) -> Result<Self, SearchError> {
        let transforms = commands
            .iter()
            .map(|id| Transform::parse(id))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { transforms })
    }

    /// Apply every transform, in configured order.
    pub fn apply(&self, text: &str) -> String {
        let mut out = text.to_string();
        for transform in &self.transforms {
            out = transform.apply(&out);
        }
        out
    }
}

/// Tokenize normalized text on any character that is neither a word
/// character nor `*`, discarding empty tokens. Shared by the query compiler
/// and the indexing pipeline so both sides agree on word boundaries.
pub fn tokenize(text: &str) -> Vec<&str> {
    static SEPARATOR: OnceLock<Regex> = OnceLock::new();
    let separator = SEPARATOR.get_or_init(|| Regex::new(r"[^\w*]+").expect("valid regex"));
    separator.split(text).filter(|t| !t.is_empty()).collect()
}

fn fold_chars(text: &str, fold: fn(char) -> Option<&'static str>) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match fold(c) {
            Some(mapped) => out.push_str(mapped),
            None => out.push(c),
        }
    }
    out
}

/// Punctuation becomes a space, runs of whitespace collapse to one space,
/// leading/trailing whitespace is trimmed. Word characters, `*` (wildcard)
/// and `/` (identifier separator) pass through.
fn cleanup(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_space = false;
    for c in text.chars() {
        let keep = c.is_alphanumeric() || c == '_' || c == '*' || c == '/';
        if keep {
            if pending_space && !out.is_empty() {
                out.push(' ');
            }
            pending_space = false;
            out.push(c);
        } else {
            pending_space = true;
        }
    }
    out
}

/// Latin diacritic folding. Characters outside the table pass through.
fn fold_diacritic(c: char) -> Option<&'static str> {
    Some(match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ā' | 'ă' | 'ą' => "a",
        'À' | 'Á' | 'Â' | 'Ã' | 'Ä' | 'Å' | 'Ā' | 'Ă' | 'Ą' => "A",
        'æ' => "ae",
        'Æ' => "AE",
        'ç' | 'ć' | 'č' | 'ĉ' => "c",
        'Ç' | 'Ć' | 'Č' | 'Ĉ' => "C",
        'ď' | 'đ' | 'ð' => "d",
        'Ď' | 'Đ' | 'Ð' => "D",
        'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ĕ' | 'ė' | 'ę' | 'ě' => "e",
        'È' | 'É' | 'Ê' | 'Ë' | 'Ē' | 'Ĕ' | 'Ė' | 'Ę' | 'Ě' => "E",
        'ĝ' | 'ğ' | 'ġ' | 'ģ' => "g",
        'Ĝ' | 'Ğ' | 'Ġ' | 'Ģ' => "G",
        'ĥ' | 'ħ' => "h",
        'Ĥ' | 'Ħ' => "H",
        'ì' | 'í' | 'î' | 'ï' | 'ĩ' | 'ī' | 'ĭ' | 'į' | 'ı' => "i",
        'Ì' | 'Í' | 'Î' | 'Ï' | 'Ĩ' | 'Ī' | 'Ĭ' | 'Į' | 'İ' => "I",
        'ĵ' => "j",
        'Ĵ' => "J",
        'ķ' => "k",
        'Ķ' => "K",
        'ĺ' | 'ļ' | 'ľ' | 'ł' => "l",
        'Ĺ' | 'Ļ' | 'Ľ' | 'Ł' => "L",
        'ñ' | 'ń' | 'ņ' | 'ň' => "n",
        'Ñ' | 'Ń' | 'Ņ' | 'Ň' => "N",
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' | 'ō' | 'ŏ' | 'ő' => "o",
        'Ò' | 'Ó' | 'Ô' | 'Õ' | 'Ö' | 'Ø' | 'Ō' | 'Ŏ' | 'Ő' => "O",
        'œ' => "oe",
        'Œ' => "OE",
        'ŕ' | 'ŗ' | 'ř' => "r",
        'Ŕ' | 'Ŗ' | 'Ř' => "R",
        'ś' | 'ŝ' | 'ş' | 'š' => "s",
        'Ś' | 'Ŝ' | 'Ş' | 'Š' => "S",
        'ß' => "ss",
        'ţ' | 'ť' | 'ŧ' => "t",
        'Ţ' | 'Ť' | 'Ŧ' => "T",
        'þ' => "th",
        'Þ' => "TH",
        'ù' | 'ú' | 'û' | 'ü' | 'ũ' | 'ū' | 'ŭ' | 'ů' | 'ű' | 'ų' => "u",
        'Ù' | 'Ú' | 'Û' | 'Ü' | 'Ũ' | 'Ū' | 'Ŭ' | 'Ů' | 'Ű' | 'Ų' => "U",
        'ŵ' => "w",
        'Ŵ' => "W",
        'ý' | 'ÿ' | 'ŷ' => "y",
        'Ý' | 'Ÿ' | 'Ŷ' => "Y",
        'ź' | 'ż' | 'ž' => "z",
        'Ź' | 'Ż' | 'Ž' => "Z",
        _ => return None,
    })
}

/// Basic Cyrillic and Greek romanization. Characters outside the table pass
/// through unchanged.
fn transliterate_char(c: char) -> Option<&'static str> {
    Some(match c {
        // Cyrillic
        'а' => "a", 'б' => "b", 'в' => "v", 'г' => "g", 'д' => "d",
        'е' | 'э' => "e", 'ё' => "yo", 'ж' => "zh", 'з' => "z",
        'и' | 'й' => "i", 'к' => "k", 'л' => "l", 'м' => "m",
        'н' => "n", 'о' => "o", 'п' => "p", 'р' => "r", 'с' => "s",
        'т' => "t", 'у' => "u", 'ф' => "f", 'х' => "kh", 'ц' => "ts",
        'ч' => "ch", 'ш' => "sh", 'щ' => "shch", 'ъ' | 'ь' => "",
        'ы' => "y", 'ю' => "yu", 'я' => "ya",
        'А' => "A", 'Б' => "B", 'В' => "V", 'Г' => "G", 'Д' => "D",
        'Е' | 'Э' => "E", 'Ё' => "Yo", 'Ж' => "Zh", 'З' => "Z",
        'И' | 'Й' => "I", 'К' => "K", 'Л' => "L", 'М' => "M",
        'Н' => "N", 'О' => "O", 'П' => "P", 'Р' => "R", 'С' => "S",
        'Т' => "T", 'У' => "U", 'Ф' => "F", 'Х' => "Kh", 'Ц' => "Ts",
        'Ч' => "Ch", 'Ш' => "Sh", 'Щ' => "Shch", 'Ъ' | 'Ь' => "",
        'Ы' => "Y", 'Ю' => "Yu", 'Я' => "Ya",
        // Greek
        'α' => "a", 'β' => "v", 'γ' => "g", 'δ' => "d", 'ε' => "e",
        'ζ' => "z", 'η' => "i", 'θ' => "th", 'ι' => "i", 'κ' => "k",
        'λ' => "l", 'μ' => "m", 'ν' => "n", 'ξ' => "x", 'ο' => "o",
        'π' => "p", 'ρ' => "r", 'σ' | 'ς' => "s", 'τ' => "t",
        'υ' => "y", 'φ' => "f", 'χ' => "ch", 'ψ' => "ps", 'ω' => "o",
        'Α' => "A", 'Β' => "V", 'Γ' => "G", 'Δ' => "D", 'Ε' => "E",
        'Ζ' => "Z", 'Η' => "I", 'Θ' => "Th", 'Ι' => "I", 'Κ' => "K",
        'Λ' => "L", 'Μ' => "M", 'Ν' => "N", 'Ξ' => "X", 'Ο' => "O",
        'Π' => "P", 'Ρ' => "R", 'Σ' => "S", 'Τ' => "T", 'Υ' => "Y",
        'Φ' => "F", 'Χ' => "Ch", 'Ψ' => "Ps", 'Ω' => "O",
        _ => return None,
    })
}
