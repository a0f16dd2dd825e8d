use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use core_types::{Note, NoteId, NotePatch, SearchQuery, listing_order};
use indexmap::IndexMap;
use tracing::{debug, info, warn};

use crate::clock::{Clock, SystemClock};
use crate::error::{Result, StoreError};
use crate::file::{NoteFile, StoreConfig};

/// Owns every note in creation/load order and mirrors them to one JSON file.
///
/// Each mutating call writes the whole collection before returning. When the
/// write fails the in-memory change is rolled back and the error is returned,
/// while the file keeps its previous contents.
pub struct NoteRepository {
    file: NoteFile,
    notes: IndexMap<NoteId, Note>,
    clock: Box<dyn Clock>,
    last_id_micros: Option<i64>,
}

impl NoteRepository {
    pub fn open(config: StoreConfig) -> Result<Self> {
        Self::with_clock(config, SystemClock)
    }

    pub fn with_clock(config: StoreConfig, clock: impl Clock + 'static) -> Result<Self> {
        fs::create_dir_all(&config.dir).map_err(|err| StoreError::io("create", &config.dir, err))?;

        let mut repo = Self {
            file: NoteFile::new(config.path()),
            notes: IndexMap::new(),
            clock: Box::new(clock),
            last_id_micros: None,
        };
        repo.reload()?;
        Ok(repo)
    }

    /// Replaces the in-memory collection with what is on disk.
    pub fn reload(&mut self) -> Result<()> {
        let loaded = self.file.load()?;
        let mut notes = IndexMap::with_capacity(loaded.len());
        for note in loaded {
            if notes.contains_key(&note.id) {
                warn!(
                    id = %note.id,
                    title = %note.title,
                    "duplicate note id, this record will be dropped from the file on the next save"
                );
                continue;
            }
            notes.insert(note.id.clone(), note);
        }
        let newest = notes.values().map(minted_micros).max();
        self.last_id_micros = self.last_id_micros.max(newest);
        self.notes = notes;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Notes in insertion order.
    pub fn notes(&self) -> impl Iterator<Item = &Note> {
        self.notes.values()
    }

    pub fn create<I, S>(
        &mut self,
        title: impl Into<String>,
        content: impl Into<String>,
        tags: I,
    ) -> Result<Note>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let now = self.clock.now();
        let id = self.next_id(now);
        let note = Note::new(
            id.clone(),
            title,
            content,
            tags.into_iter().map(Into::into).collect(),
            now,
        );

        self.notes.insert(id.clone(), note.clone());
        if let Err(err) = self.save() {
            self.notes.shift_remove(&id);
            return Err(err);
        }

        info!(id = %id, "created note");
        Ok(note)
    }

    pub fn get(&self, id: &str) -> Option<&Note> {
        self.notes.get(id)
    }

    /// Applies `patch` and refreshes `updated_at`. Returns `false` without
    /// touching the file when `id` is unknown.
    pub fn update(&mut self, id: &str, patch: NotePatch) -> Result<bool> {
        let now = self.clock.now();
        let Some(note) = self.notes.get_mut(id) else {
            return Ok(false);
        };

        let previous = note.clone();
        patch.apply_to(note);
        note.updated_at = now.max(note.created_at);

        if let Err(err) = self.save() {
            self.notes.insert(previous.id.clone(), previous);
            return Err(err);
        }

        debug!(id, "updated note");
        Ok(true)
    }

    pub fn delete(&mut self, id: &str) -> Result<bool> {
        let Some((index, key, note)) = self.notes.shift_remove_full(id) else {
            return Ok(false);
        };

        if let Err(err) = self.save() {
            self.notes.shift_insert(index, key, note);
            return Err(err);
        }

        info!(id, "deleted note");
        Ok(true)
    }

    /// Matching notes, pinned first and then most recently updated first.
    pub fn search(&self, query: &SearchQuery) -> Vec<Note> {
        let mut results: Vec<Note> = self
            .notes
            .values()
            .filter(|note| query.matches(note))
            .cloned()
            .collect();
        results.sort_by(listing_order);
        results
    }

    /// Every tag in use, lower-cased, deduplicated and sorted. Archived notes count.
    pub fn all_tags(&self) -> Vec<String> {
        self.notes
            .values()
            .flat_map(|note| note.tags.iter())
            .map(|tag| tag.to_lowercase())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    fn save(&self) -> Result<()> {
        self.file.save(self.notes.values())
    }

    /// `note_YYYYMMDD_HHMMSS_ffffff` in local time. The microsecond stamp stays
    /// above every stamp loaded or handed out so far; a suffix covers any
    /// remaining clash with a loaded id.
    fn next_id(&mut self, now: DateTime<Utc>) -> NoteId {
        let mut micros = now.timestamp_micros();
        if let Some(last) = self.last_id_micros {
            micros = micros.max(last + 1);
        }
        self.last_id_micros = Some(micros);

        let stamp = DateTime::<Utc>::from_timestamp_micros(micros)
            .unwrap_or(now)
            .with_timezone(&Local)
            .format("%Y%m%d_%H%M%S_%6f");
        let base = format!("note_{stamp}");

        let mut candidate = base.clone();
        let mut suffix = 1;
        while self.notes.contains_key(candidate.as_str()) {
            candidate = format!("{base}_{suffix}");
            suffix += 1;
        }
        NoteId::new(candidate)
    }
}

/// Latest instant a loaded note's id or creation time can stand for. A local
/// stamp that occurs twice (DST fall-back) counts as its later occurrence.
fn minted_micros(note: &Note) -> i64 {
    let created = note.created_at.timestamp_micros();
    note.id
        .as_str()
        .strip_prefix("note_")
        .and_then(|rest| rest.get(..22))
        .and_then(|stamp| NaiveDateTime::parse_from_str(stamp, "%Y%m%d_%H%M%S_%6f").ok())
        .and_then(|naive| Local.from_local_datetime(&naive).latest())
        .map_or(created, |minted| minted.timestamp_micros().max(created))
}
