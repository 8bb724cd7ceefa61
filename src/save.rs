//! Resume support: the in-progress game's counters, kept as JSON on disk.
//!
//! Only counters are stored. On load the caller refetches the story and the
//! saved level's scenarios and hands everything to `Game::resume`.

use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::game::Progress;
use crate::story::StoryId;

const RESUME_FILE: &str = "resume.json";

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("save file io: {0}")]
    Io(#[from] std::io::Error),
    #[error("save file is corrupt: {0}")]
    Format(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub story_id: StoryId,
    pub progress: Progress,
}

#[derive(Debug, Clone)]
pub struct ResumeStore {
    path: PathBuf,
}

impl ResumeStore {
    pub fn new(data_dir: &Path) -> Self {
        ResumeStore {
            path: data_dir.join(RESUME_FILE),
        }
    }

    pub fn save(&self, snapshot: &Snapshot) -> Result<(), SaveError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_string_pretty(snapshot)?)?;
        Ok(())
    }

    /// `None` when nothing has been saved.
    pub fn load(&self) -> Result<Option<Snapshot>, SaveError> {
        match std::fs::read_to_string(&self.path) {
            Ok(text) => Ok(Some(serde_json::from_str(&text)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Saved progress for `story`, ignoring snapshots of other stories.
    pub fn load_for(&self, story: StoryId) -> Result<Option<Snapshot>, SaveError> {
        Ok(self.load()?.filter(|s| s.story_id == story))
    }

    pub fn clear(&self) -> Result<(), SaveError> {
        match std::fs::remove_file(&self.path) {
            Err(e) if e.kind() != ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(story_id: StoryId) -> Snapshot {
        Snapshot {
            story_id,
            progress: Progress {
                score: 12,
                level: 1,
                scenario_index: 2,
                lives: 1,
                correct_answers: 5,
            },
        }
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = ResumeStore::new(&dir.path().join("nested"));

        assert_eq!(store.load().unwrap(), None);
        store.save(&snapshot(4)).unwrap();
        assert_eq!(store.load().unwrap(), Some(snapshot(4)));
    }

    #[test]
    fn other_story_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let store = ResumeStore::new(dir.path());
        store.save(&snapshot(4)).unwrap();

        assert!(store.load_for(5).unwrap().is_none());
        assert!(store.load_for(4).unwrap().is_some());
    }

    #[test]
    fn clear_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = ResumeStore::new(dir.path());
        store.save(&snapshot(1)).unwrap();

        store.clear().unwrap();
        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(RESUME_FILE), "{not json").unwrap();

        let store = ResumeStore::new(dir.path());
        assert!(matches!(store.load(), Err(SaveError::Format(_))));
    }
}
