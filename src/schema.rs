//! Relational schema names shared by criterion handlers and gateways.
//!
//! The legacy store this engine compiles against:
//!
//! ```text
//! ibexa_content                    id, content_type_id, status, modified,
//!                                  language_mask, name
//! ibexa_search_word                id, word, object_count
//! ibexa_search_object_word_link    word_id, contentobject_id, language_mask
//! ibexa_user                       contentobject_id, login
//! ibexa_content_location           id, content_id, path_string
//! ```

/// Content table.
pub const CONTENT_TABLE: &str = "ibexa_content";

/// Full-text word dictionary. `object_count` is the number of distinct
/// content items containing the word (drives stop-word thresholding).
pub const WORD_TABLE: &str = "ibexa_search_word";

/// Word/content link table for full-text matching.
pub const LINK_TABLE: &str = "ibexa_search_object_word_link";

/// User accounts, keyed by their content object.
pub const USER_TABLE: &str = "ibexa_user";

/// Location tree with materialized `path_string` paths.
pub const LOCATION_TABLE: &str = "ibexa_content_location";

/// `status` value of published content. Only published content is indexed
/// and enumerated.
pub const CONTENT_STATUS_PUBLISHED: i64 = 1;
