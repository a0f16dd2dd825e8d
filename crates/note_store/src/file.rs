use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use core_types::Note;
use tracing::{debug, warn};

use crate::error::{Result, StoreError};

pub const DEFAULT_NOTES_FILE: &str = "notes.json";

/// Where the notes live: a directory plus the file name inside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub dir: PathBuf,
    pub file_name: String,
}

impl StoreConfig {
    pub fn new(dir: impl Into<PathBuf>, file_name: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            file_name: file_name.into(),
        }
    }

    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self::new(dir, DEFAULT_NOTES_FILE)
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(&self.file_name)
    }
}

/// The JSON document holding every note, rewritten whole on each save.
#[derive(Debug, Clone)]
pub struct NoteFile {
    path: PathBuf,
}

impl NoteFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads every note. A missing file yields no notes, and so does a file
    /// that does not decode as a list of complete note records: its contents
    /// are dropped rather than surfaced as an error.
    pub fn load(&self) -> Result<Vec<Note>> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no notes file yet");
                return Ok(Vec::new());
            }
            Err(err) => return Err(StoreError::io("read", &self.path, err)),
        };

        match serde_json::from_slice::<Vec<Note>>(&bytes) {
            Ok(notes) => {
                debug!(path = %self.path.display(), count = notes.len(), "loaded notes");
                Ok(notes)
            }
            Err(err) => {
                warn!(
                    path = %self.path.display(),
                    error = %err,
                    "discarding malformed notes file"
                );
                Ok(Vec::new())
            }
        }
    }

    /// Writes the records to a sibling `.tmp` file and renames it over the
    /// target, so a failed save leaves the previous file intact.
    pub fn save<'a>(&self, notes: impl IntoIterator<Item = &'a Note>) -> Result<()> {
        let records: Vec<&Note> = notes.into_iter().collect();
        let text = serde_json::to_string_pretty(&records)?;
        let temp_path = self.temp_path();

        let written = File::create(&temp_path).and_then(|mut file| {
            file.write_all(text.as_bytes())?;
            file.sync_all()
        });
        if let Err(err) = written {
            let _ = fs::remove_file(&temp_path);
            return Err(StoreError::io("write", &temp_path, err));
        }
        if let Err(err) = fs::rename(&temp_path, &self.path) {
            let _ = fs::remove_file(&temp_path);
            return Err(StoreError::io("write", &self.path, err));
        }

        debug!(path = %self.path.display(), count = records.len(), "saved notes");
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}
