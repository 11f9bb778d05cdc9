//! Output tree layout.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::entry::{Entry, CLIP_EXTENSION};
use super::question_index::QuestionIndex;

/// Subdirectory holding question clips.
pub const QUESTIONS_DIR: &str = "questions";

/// Subdirectory holding answer clips.
pub const ANSWERS_DIR: &str = "reponses";

/// Paths of the output tree.
///
/// ```text
/// <root>/
///     questions/07-Test-Song.mp3
///     questions/08-overlap.mp3
///     reponses/07-Test-Song.mp3
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    root: PathBuf,
    questions: PathBuf,
    answers: PathBuf,
}

impl OutputLayout {
    /// Describe the layout under `root` without touching the filesystem.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            questions: root.join(QUESTIONS_DIR),
            answers: root.join(ANSWERS_DIR),
            root,
        }
    }

    /// Create the root and both subdirectories.
    pub fn create(&self) -> io::Result<()> {
        fs::create_dir_all(&self.root)?;
        fs::create_dir_all(&self.questions)?;
        fs::create_dir_all(&self.answers)?;
        Ok(())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn questions_dir(&self) -> &Path {
        &self.questions
    }

    pub fn answers_dir(&self) -> &Path {
        &self.answers
    }

    /// `<root>/questions/<index>-<title>.mp3`
    pub fn question_path(&self, entry: &Entry) -> PathBuf {
        self.questions.join(entry.file_name())
    }

    /// `<root>/reponses/<index>-<title>.mp3`
    pub fn answer_path(&self, entry: &Entry) -> PathBuf {
        self.answers.join(entry.file_name())
    }

    /// `<root>/questions/<index>-overlap.mp3`
    pub fn overlap_path(&self, index: &QuestionIndex) -> PathBuf {
        self.questions.join(format!("{}-overlap.{}", index, CLIP_EXTENSION))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn entry() -> Entry {
        let record = ["", "7", "normal", "Test Song", "http://a", "0", "5", "10", "5", ""];
        Entry::from_record(&record).unwrap()
    }

    #[test]
    fn derives_entry_paths() {
        let layout = OutputLayout::new("/out");
        let entry = entry();
        assert_eq!(
            layout.question_path(&entry),
            PathBuf::from("/out/questions/07-Test-Song.mp3")
        );
        assert_eq!(
            layout.answer_path(&entry),
            PathBuf::from("/out/reponses/07-Test-Song.mp3")
        );
        assert_eq!(
            layout.overlap_path(entry.index()),
            PathBuf::from("/out/questions/07-overlap.mp3")
        );
    }

    #[test]
    fn create_makes_both_subdirectories() {
        let dir = tempdir().unwrap();
        let layout = OutputLayout::new(dir.path().join("quiz"));
        layout.create().unwrap();

        assert!(layout.questions_dir().is_dir());
        assert!(layout.answers_dir().is_dir());
    }

    #[test]
    fn create_fails_when_root_is_a_file() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("taken");
        fs::write(&blocker, b"x").unwrap();

        assert!(OutputLayout::new(&blocker).create().is_err());
    }
}
