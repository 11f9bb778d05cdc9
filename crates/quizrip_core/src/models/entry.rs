//! Quiz entries and their kinds.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::RecordError;
use super::question_index::QuestionIndex;

/// Number of columns in an input record.
///
/// Layout: `[unused, index, kind, title, urls, q_start, q_length,
/// a_start, a_length, speed]`.
pub const RECORD_FIELDS: usize = 10;

/// Extension of every clip placed in the output tree.
pub const CLIP_EXTENSION: &str = "mp3";

/// Separator between source URLs inside the `urls` column.
pub const URL_SEPARATOR: &str = " | ";

const COL_INDEX: usize = 1;
const COL_KIND: usize = 2;
const COL_TITLE: usize = 3;
const COL_URLS: usize = 4;
const COL_Q_START: usize = 5;
const COL_Q_LENGTH: usize = 6;
const COL_A_START: usize = 7;
const COL_A_LENGTH: usize = 8;
const COL_SPEED: usize = 9;

/// Processing sequence selected by an entry, with the sources it consumes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum EntryKind {
    /// One media source cut into question and answer.
    Normal { source: String },
    /// Like `Normal`, and merged with its twin after dispatch.
    Overlap { source: String },
    /// Question rendered from a MIDI file, answer cut from a media source.
    Midi {
        midi_source: String,
        answer_source: String,
    },
    /// Like `Normal`, with the question slowed down.
    Slow { source: String, factor: String },
    /// Like `Normal`, with the question sped up.
    Fast { source: String, factor: String },
}

impl EntryKind {
    /// Number of source URLs a tag consumes, or `UnknownKind`.
    fn sources_needed(tag: &str) -> Result<usize, RecordError> {
        match tag {
            "normal" | "overlap" | "slow" | "fast" => Ok(1),
            "midi" => Ok(2),
            other => Err(RecordError::UnknownKind(other.to_string())),
        }
    }

    /// Build a kind from its tag, the split source list and the speed field.
    fn from_parts(tag: &str, mut sources: Vec<String>, speed: &str) -> Result<Self, RecordError> {
        let needed = Self::sources_needed(tag)?;
        if sources.len() < needed {
            return Err(RecordError::MissingSource {
                kind: tag.to_string(),
                needed,
                found: sources.len(),
            });
        }
        sources.truncate(needed);
        let mut sources = sources.into_iter();
        // `needed` sources are guaranteed present above.
        let mut next = || sources.next().unwrap_or_default();

        Ok(match tag {
            "normal" => EntryKind::Normal { source: next() },
            "overlap" => EntryKind::Overlap { source: next() },
            "midi" => EntryKind::Midi {
                midi_source: next(),
                answer_source: next(),
            },
            "slow" => EntryKind::Slow {
                source: next(),
                factor: speed.to_string(),
            },
            _ => EntryKind::Fast {
                source: next(),
                factor: speed.to_string(),
            },
        })
    }

    /// The tag used for this kind in input records.
    pub fn tag(&self) -> &'static str {
        match self {
            EntryKind::Normal { .. } => "normal",
            EntryKind::Overlap { .. } => "overlap",
            EntryKind::Midi { .. } => "midi",
            EntryKind::Slow { .. } => "slow",
            EntryKind::Fast { .. } => "fast",
        }
    }

    /// Speed factor applied to the question, for `slow`/`fast`.
    pub fn speed_factor(&self) -> Option<&str> {
        match self {
            EntryKind::Slow { factor, .. } | EntryKind::Fast { factor, .. } => Some(factor),
            _ => None,
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// One normalized quiz-track definition.
///
/// Entries are immutable once built. Timing fields are kept verbatim and
/// handed to the trim tool as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    index: QuestionIndex,
    title: String,
    kind: EntryKind,
    question_start: String,
    question_length: String,
    answer_start: String,
    answer_length: String,
}

impl Entry {
    /// Build an entry from one raw record.
    ///
    /// Fails if the record is narrower than [`RECORD_FIELDS`], has an unknown
    /// (or empty) kind, no index, or fewer source URLs than its kind consumes.
    /// The kind is checked first so unrecognized rows never fail on their
    /// other columns.
    pub fn from_record<S: AsRef<str>>(record: &[S]) -> Result<Self, RecordError> {
        if record.len() < RECORD_FIELDS {
            return Err(RecordError::TooFewFields {
                expected: RECORD_FIELDS,
                found: record.len(),
            });
        }
        let field = |col: usize| record[col].as_ref();

        let tag = field(COL_KIND).trim();
        EntryKind::sources_needed(tag)?;
        let index = QuestionIndex::new(field(COL_INDEX)).ok_or(RecordError::EmptyIndex)?;
        let sources = split_sources(field(COL_URLS));
        let kind = EntryKind::from_parts(tag, sources, field(COL_SPEED))?;

        Ok(Self {
            index,
            title: sanitize_title(field(COL_TITLE)),
            kind,
            question_start: field(COL_Q_START).to_string(),
            question_length: field(COL_Q_LENGTH).to_string(),
            answer_start: field(COL_A_START).to_string(),
            answer_length: field(COL_A_LENGTH).to_string(),
        })
    }

    /// Zero-padded question index.
    pub fn index(&self) -> &QuestionIndex {
        &self.index
    }

    /// Sanitized title (no spaces, no `" - "`).
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Processing kind with its sources.
    pub fn kind(&self) -> &EntryKind {
        &self.kind
    }

    /// Output file name shared by the question and answer clips.
    pub fn file_name(&self) -> String {
        format!("{}-{}.{}", self.index, self.title, CLIP_EXTENSION)
    }

    pub fn question_start(&self) -> &str {
        &self.question_start
    }

    pub fn question_length(&self) -> &str {
        &self.question_length
    }

    pub fn answer_start(&self) -> &str {
        &self.answer_start
    }

    pub fn answer_length(&self) -> &str {
        &self.answer_length
    }

    /// Short label for log lines: `07-Test-Song.mp3 (normal)`.
    pub fn label(&self) -> String {
        format!("{} ({})", self.file_name(), self.kind)
    }
}

/// Split the `urls` column on [`URL_SEPARATOR`], dropping empty pieces.
fn split_sources(field: &str) -> Vec<String> {
    field
        .split(URL_SEPARATOR)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Make a title safe for use in a file name.
///
/// `" - "` collapses to `-`, remaining spaces and path separators become
/// `-`. Applying it twice gives the same result.
pub fn sanitize_title(raw: &str) -> String {
    raw.replace(" - ", "-")
        .chars()
        .map(|c| match c {
            ' ' | '/' | '\\' => '-',
            _ => c,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(kind: &str, urls: &str, speed: &str) -> Vec<String> {
        ["", "7", kind, "Test Song", urls, "0", "5", "10", "5", speed]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    #[test]
    fn builds_normal_entry() {
        let entry = Entry::from_record(&record("normal", "http://a | http://b", "")).unwrap();
        assert_eq!(entry.index().as_str(), "07");
        assert_eq!(entry.title(), "Test-Song");
        assert_eq!(entry.file_name(), "07-Test-Song.mp3");
        assert_eq!(
            entry.kind(),
            &EntryKind::Normal {
                source: "http://a".into()
            }
        );
        assert_eq!(entry.question_start(), "0");
        assert_eq!(entry.question_length(), "5");
        assert_eq!(entry.answer_start(), "10");
        assert_eq!(entry.answer_length(), "5");
    }

    #[test]
    fn midi_takes_two_sources_in_order() {
        let entry = Entry::from_record(&record("midi", "http://m.mid | http://v", "")).unwrap();
        assert_eq!(
            entry.kind(),
            &EntryKind::Midi {
                midi_source: "http://m.mid".into(),
                answer_source: "http://v".into(),
            }
        );
    }

    #[test]
    fn midi_with_one_source_is_rejected() {
        let err = Entry::from_record(&record("midi", "http://m.mid", "")).unwrap_err();
        assert_eq!(
            err,
            RecordError::MissingSource {
                kind: "midi".into(),
                needed: 2,
                found: 1
            }
        );
    }

    #[test]
    fn speed_kinds_carry_factor() {
        let slow = Entry::from_record(&record("slow", "http://a", "0.8")).unwrap();
        let fast = Entry::from_record(&record("fast", "http://a", "1.5")).unwrap();
        assert_eq!(slow.kind().speed_factor(), Some("0.8"));
        assert_eq!(fast.kind().speed_factor(), Some("1.5"));
        assert_eq!(fast.kind().tag(), "fast");
    }

    #[test]
    fn short_record_is_rejected() {
        let short: Vec<String> = vec!["".into(), "1".into(), "normal".into()];
        assert_eq!(
            Entry::from_record(&short).unwrap_err(),
            RecordError::TooFewFields {
                expected: 10,
                found: 3
            }
        );
    }

    #[test]
    fn unknown_kind_is_reported() {
        let err = Entry::from_record(&record("reverse", "http://a", "")).unwrap_err();
        assert_eq!(err, RecordError::UnknownKind("reverse".into()));
    }

    #[test]
    fn blank_record_is_unknown_kind_not_empty_index() {
        let blank = vec![String::new(); RECORD_FIELDS];
        assert_eq!(
            Entry::from_record(&blank).unwrap_err(),
            RecordError::UnknownKind(String::new())
        );

        let mut no_index = record("karaoke", "", "");
        no_index[1].clear();
        assert_eq!(
            Entry::from_record(&no_index).unwrap_err(),
            RecordError::UnknownKind("karaoke".into())
        );
    }

    #[test]
    fn known_kind_without_index_is_rejected() {
        let mut no_index = record("normal", "http://a", "");
        no_index[1].clear();
        assert_eq!(Entry::from_record(&no_index).unwrap_err(), RecordError::EmptyIndex);
    }

    #[test]
    fn empty_url_field_is_missing_source() {
        let err = Entry::from_record(&record("normal", "", "")).unwrap_err();
        assert!(matches!(err, RecordError::MissingSource { found: 0, .. }));
    }

    #[test]
    fn sanitize_replaces_dash_sequence_and_spaces() {
        assert_eq!(sanitize_title("Artist - Song Name"), "Artist-Song-Name");
        assert_eq!(sanitize_title("AC/DC"), "AC-DC");
    }

    #[test]
    fn sanitize_is_idempotent() {
        for raw in ["Artist - Song", "a  b", " - - ", "plain", "x - y - z w"] {
            let once = sanitize_title(raw);
            assert_eq!(sanitize_title(&once), once);
            assert!(!once.contains(' '));
            assert!(!once.contains(" - "));
        }
    }

    #[test]
    fn kind_serializes_with_tag() {
        let kind = EntryKind::Overlap {
            source: "http://a".into(),
        };
        let json = serde_json::to_string(&kind).unwrap();
        assert!(json.contains("\"kind\":\"overlap\""));
    }
}
