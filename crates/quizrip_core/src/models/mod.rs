//! Data models for quizrip.
//!
//! This module contains the typed view over input records:
//! - Question index newtype (zero-padded, filename safe)
//! - Entry kinds as a closed sum type
//! - Entries with normalized accessors
//! - Output layout (derived question/answer/overlap paths)

mod entry;
mod error;
mod layout;
mod question_index;

// Re-export all public types
pub use entry::{sanitize_title, Entry, EntryKind, CLIP_EXTENSION, RECORD_FIELDS, URL_SEPARATOR};
pub use error::RecordError;
pub use layout::{OutputLayout, ANSWERS_DIR, QUESTIONS_DIR};
pub use question_index::QuestionIndex;
