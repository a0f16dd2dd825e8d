use std::io::{BufRead, Write};

use anyhow::Result;
use chrono::Local;
use core_types::{Note, NoteId, NotePatch, SearchQuery};
use i18n::I18n;
use note_store::{NoteRepository, StoreError};
use tracing::error;

use crate::input::{parse_tags, read_line, read_multiline};

const RULE_WIDTH: usize = 40;
const TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

const MENU_ITEMS: [&str; 8] = [
    "menu.list",
    "menu.create",
    "menu.search",
    "menu.filter",
    "menu.open",
    "menu.archived",
    "menu.tags",
    "menu.exit",
];

#[derive(Debug, Clone, Copy)]
pub struct MenuSettings {
    pub preview_length: usize,
    pub max_list_results: usize,
}

enum Flow {
    Continue,
    Exit,
}

/// Text menu over a `NoteRepository`. Reads commands from `input` until the
/// user exits or input ends.
pub struct Menu<R, W> {
    repo: NoteRepository,
    i18n: I18n,
    settings: MenuSettings,
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Menu<R, W> {
    pub fn new(
        repo: NoteRepository,
        i18n: I18n,
        settings: MenuSettings,
        input: R,
        output: W,
    ) -> Self {
        Self {
            repo,
            i18n,
            settings,
            input,
            output,
        }
    }

    #[cfg(test)]
    pub fn into_parts(self) -> (NoteRepository, W) {
        (self.repo, self.output)
    }

    pub fn run(&mut self) -> Result<()> {
        writeln!(self.output, "{}", self.i18n.t("app.welcome"))?;
        writeln!(self.output, "{}", "=".repeat(RULE_WIDTH))?;

        while let Flow::Continue = self.step()? {}

        writeln!(self.output, "\n{}", self.i18n.t("app.goodbye"))?;
        self.output.flush()?;
        Ok(())
    }

    fn step(&mut self) -> Result<Flow> {
        writeln!(self.output, "\n{}", self.i18n.t("menu.title"))?;
        for (index, key) in MENU_ITEMS.iter().enumerate() {
            writeln!(self.output, "{}. {}", index + 1, self.i18n.t(key))?;
        }

        let Some(choice) = self.prompt("menu.prompt")? else {
            return Ok(Flow::Exit);
        };

        match choice.trim() {
            "1" => self.list_notes()?,
            "2" => self.create_note()?,
            "3" => self.search_notes()?,
            "4" => self.quick_filter()?,
            "5" => self.open_note()?,
            "6" => self.list_archived()?,
            "7" => self.list_tags()?,
            "8" => return Ok(Flow::Exit),
            _ => self.say("menu.invalid")?,
        }
        Ok(Flow::Continue)
    }

    fn list_notes(&mut self) -> Result<()> {
        self.heading("list.title")?;
        let notes = self.repo.search(&SearchQuery::new());
        self.print_listing(&notes, false)
    }

    fn create_note(&mut self) -> Result<()> {
        self.heading("create.title")?;
        let Some(title) = self.prompt("create.prompt_title")? else {
            return Ok(());
        };
        let title = title.trim().to_string();
        if title.is_empty() {
            return self.say("create.empty_title");
        }

        self.say("create.prompt_content")?;
        let content = read_multiline(&mut self.input)?;
        let raw_tags = self.prompt("create.prompt_tags")?.unwrap_or_default();

        match self.repo.create(title, content, parse_tags(&raw_tags)) {
            Ok(note) => {
                writeln!(
                    self.output,
                    "{}: '{}'",
                    self.i18n.t("create.done"),
                    note.title
                )?;
                Ok(())
            }
            Err(err) => self.report_store_error(err),
        }
    }

    fn search_notes(&mut self) -> Result<()> {
        self.heading("search.title")?;
        let Some(text) = self.prompt("search.prompt_query")? else {
            return Ok(());
        };
        let Some(raw_tags) = self.prompt("search.prompt_tags")? else {
            return Ok(());
        };

        let query = SearchQuery::new()
            .text(text.trim())
            .tags(parse_tags(&raw_tags));
        let results = self.repo.search(&query);
        self.print_results(&results)
    }

    /// Like the search screen, but the text also matches tag names.
    fn quick_filter(&mut self) -> Result<()> {
        let Some(text) = self.prompt("filter.prompt")? else {
            return Ok(());
        };
        let needle = text.trim();

        let results: Vec<Note> = self
            .repo
            .search(&SearchQuery::new())
            .into_iter()
            .filter(|note| needle.is_empty() || note.mentions(needle) || note.tag_mentions(needle))
            .collect();
        self.print_results(&results)
    }

    fn open_note(&mut self) -> Result<()> {
        self.heading("list.title")?;
        let notes = self.repo.search(&SearchQuery::new().include_archived(true));
        self.print_listing(&notes, false)?;
        if notes.is_empty() {
            return Ok(());
        }

        let Some(raw) = self.prompt("open.prompt")? else {
            return Ok(());
        };
        let limit = self.settings.max_list_results;
        let picked = raw
            .trim()
            .parse::<usize>()
            .ok()
            .and_then(|number| number.checked_sub(1))
            .filter(|index| *index < limit)
            .and_then(|index| notes.get(index));

        match picked {
            Some(note) => {
                let id = note.id.clone();
                self.note_actions(&id)
            }
            None => self.say("open.invalid"),
        }
    }

    fn note_actions(&mut self, id: &NoteId) -> Result<()> {
        let Some(note) = self.repo.get(id.as_str()).cloned() else {
            return self.say("error.not_found");
        };
        self.print_note(&note)?;
        self.say("open.actions")?;

        let Some(choice) = self.prompt("open.choice")? else {
            return Ok(());
        };
        match choice.trim() {
            "1" => self.edit_note(&note),
            "2" => {
                let done = if note.is_pinned { "pin.off" } else { "pin.on" };
                self.apply(id, NotePatch::new().pinned(!note.is_pinned), done)
            }
            "3" => {
                let done = if note.is_archived {
                    "archive.off"
                } else {
                    "archive.on"
                };
                self.apply(id, NotePatch::new().archived(!note.is_archived), done)
            }
            "4" => self.delete_note(&note),
            _ => Ok(()),
        }
    }

    fn edit_note(&mut self, note: &Note) -> Result<()> {
        let mut patch = NotePatch::new();

        let Some(title) = self.prompt("edit.prompt_title")? else {
            return Ok(());
        };
        let title = title.trim();
        if !title.is_empty() && title != note.title {
            patch = patch.title(title);
        }

        let Some(answer) = self.prompt("edit.replace_content")? else {
            return Ok(());
        };
        if is_yes(&answer) {
            self.say("create.prompt_content")?;
            patch = patch.content(read_multiline(&mut self.input)?);
        }

        let Some(raw_tags) = self.prompt("edit.prompt_tags")? else {
            return Ok(());
        };
        match raw_tags.trim() {
            "" => {}
            "-" => patch = patch.tags(Vec::<String>::new()),
            raw => patch = patch.tags(parse_tags(raw)),
        }

        if patch.is_empty() {
            return self.say("edit.unchanged");
        }
        self.apply(&note.id, patch, "edit.done")
    }

    fn delete_note(&mut self, note: &Note) -> Result<()> {
        let Some(answer) = self.prompt("delete.confirm")? else {
            return Ok(());
        };
        if !is_yes(&answer) {
            return self.say("delete.cancelled");
        }

        match self.repo.delete(note.id.as_str()) {
            Ok(true) => self.say("delete.done"),
            Ok(false) => self.say("error.not_found"),
            Err(err) => self.report_store_error(err),
        }
    }

    fn list_archived(&mut self) -> Result<()> {
        self.heading("archived.title")?;
        let archived: Vec<Note> = self
            .repo
            .search(&SearchQuery::new().include_archived(true))
            .into_iter()
            .filter(|note| note.is_archived)
            .collect();
        self.print_listing(&archived, false)
    }

    fn list_tags(&mut self) -> Result<()> {
        self.heading("tags.title")?;
        let tags = self.repo.all_tags();
        if tags.is_empty() {
            return self.say("tags.empty");
        }
        for (index, tag) in tags.iter().enumerate() {
            writeln!(self.output, "{}. {tag}", index + 1)?;
        }
        Ok(())
    }

    fn apply(&mut self, id: &NoteId, patch: NotePatch, done: &str) -> Result<()> {
        match self.repo.update(id.as_str(), patch) {
            Ok(true) => self.say(done),
            Ok(false) => self.say("error.not_found"),
            Err(err) => self.report_store_error(err),
        }
    }

    fn print_results(&mut self, results: &[Note]) -> Result<()> {
        writeln!(
            self.output,
            "\n{} ({})",
            self.i18n.t("search.results"),
            results.len()
        )?;
        writeln!(self.output, "{}", "-".repeat(RULE_WIDTH))?;
        if results.is_empty() {
            return self.say("search.empty");
        }
        self.print_listing(results, true)
    }

    fn print_listing(&mut self, notes: &[Note], with_preview: bool) -> Result<()> {
        if notes.is_empty() {
            return self.say("list.empty");
        }

        let limit = self.settings.max_list_results;
        for (index, note) in notes.iter().take(limit).enumerate() {
            self.print_row(index + 1, note, with_preview)?;
        }
        if notes.len() > limit {
            self.say("list.truncated")?;
        }
        Ok(())
    }

    fn print_row(&mut self, number: usize, note: &Note, with_preview: bool) -> Result<()> {
        let i18n = &self.i18n;
        let pinned = i18n.t("note.pinned");
        let status = if note.is_pinned {
            pinned.to_string()
        } else {
            " ".repeat(pinned.chars().count())
        };
        let archived = if note.is_archived {
            format!(" ({})", i18n.t("note.archived"))
        } else {
            String::new()
        };

        writeln!(
            self.output,
            "{number}. [{status}] {}{archived} ({} {})",
            note.title,
            note.content.chars().count(),
            i18n.t("note.chars")
        )?;
        writeln!(self.output, "   {}: {}", i18n.t("note.tags"), tag_list(i18n, note))?;
        if with_preview {
            writeln!(
                self.output,
                "   {}: {}",
                i18n.t("note.preview"),
                note.preview(self.settings.preview_length)
            )?;
        } else {
            writeln!(
                self.output,
                "   {}: {}",
                i18n.t("note.updated"),
                note.updated_at.with_timezone(&Local).format(TIME_FORMAT)
            )?;
        }
        writeln!(self.output)?;
        Ok(())
    }

    fn print_note(&mut self, note: &Note) -> Result<()> {
        let i18n = &self.i18n;
        writeln!(self.output, "\n{}", note.title)?;
        writeln!(self.output, "{}", "-".repeat(RULE_WIDTH))?;
        writeln!(
            self.output,
            "{}: {}   {}: {}",
            i18n.t("note.created"),
            note.created_at.with_timezone(&Local).format(TIME_FORMAT),
            i18n.t("note.updated"),
            note.updated_at.with_timezone(&Local).format(TIME_FORMAT)
        )?;
        writeln!(self.output, "{}: {}", i18n.t("note.tags"), tag_list(i18n, note))?;

        let mut flags = Vec::new();
        if note.is_pinned {
            flags.push(i18n.t("note.pinned"));
        }
        if note.is_archived {
            flags.push(i18n.t("note.archived"));
        }
        if !flags.is_empty() {
            writeln!(self.output, "[{}]", flags.join("] ["))?;
        }

        writeln!(self.output, "\n{}", note.content)?;
        writeln!(self.output, "{}", "-".repeat(RULE_WIDTH))?;
        Ok(())
    }

    fn report_store_error(&mut self, err: StoreError) -> Result<()> {
        let err = anyhow::Error::new(err);
        error!("note store operation failed: {err:#}");
        writeln!(self.output, "{}: {err:#}", self.i18n.t("error.persist"))?;
        Ok(())
    }

    fn heading(&mut self, key: &str) -> Result<()> {
        writeln!(self.output, "\n{}", self.i18n.t(key))?;
        writeln!(self.output, "{}", "-".repeat(RULE_WIDTH))?;
        Ok(())
    }

    fn say(&mut self, key: &str) -> Result<()> {
        writeln!(self.output, "{}", self.i18n.t(key))?;
        Ok(())
    }

    fn prompt(&mut self, key: &str) -> Result<Option<String>> {
        write!(self.output, "{}", self.i18n.t(key))?;
        self.output.flush()?;
        Ok(read_line(&mut self.input)?)
    }
}

fn tag_list(i18n: &I18n, note: &Note) -> String {
    if note.tags.is_empty() {
        i18n.t("note.none").to_string()
    } else {
        note.tags.join(", ")
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

#[cfg(test)]
mod tests {
    use std::fs;

    use core_types::UiLanguage;
    use note_store::StoreConfig;
    use tempfile::{TempDir, tempdir};

    use super::*;

    fn open_repo() -> (TempDir, NoteRepository) {
        let dir = tempdir().expect("tempdir");
        let repo = NoteRepository::open(StoreConfig::in_dir(dir.path())).expect("open repo");
        (dir, repo)
    }

    fn run_script(repo: NoteRepository, script: &str) -> (NoteRepository, String) {
        let settings = MenuSettings {
            preview_length: 10,
            max_list_results: 50,
        };
        let mut menu = Menu::new(
            repo,
            I18n::new(UiLanguage::EnUs),
            settings,
            script.as_bytes(),
            Vec::new(),
        );
        menu.run().expect("menu run");
        let (repo, output) = menu.into_parts();
        (repo, String::from_utf8(output).expect("utf8 output"))
    }

    #[test]
    fn creates_and_lists_a_note() {
        let (_dir, repo) = open_repo();
        let (repo, output) = run_script(
            repo,
            "2\nGroceries\nmilk\neggs\n\n\nhome, errands ,\n1\n8\n",
        );

        assert_eq!(repo.len(), 1);
        let note = repo.notes().next().expect("note");
        assert_eq!(note.title, "Groceries");
        assert_eq!(note.content, "milk\neggs");
        assert_eq!(note.tags, vec!["home", "errands"]);
        assert!(output.contains("Note created: 'Groceries'"));
        assert!(output.contains("1. [      ] Groceries (9 chars)"));
        assert!(output.contains("Tags: home, errands"));
    }

    #[test]
    fn rejects_empty_titles() {
        let (_dir, repo) = open_repo();
        let (repo, output) = run_script(repo, "2\n   \n8\n");
        assert!(repo.is_empty());
        assert!(output.contains("Title cannot be empty!"));
    }

    #[test]
    fn search_applies_every_tag() {
        let (_dir, mut repo) = open_repo();
        repo.create("Ship release", "", ["work", "urgent"])
            .expect("create");
        repo.create("Garden", "", ["home"]).expect("create");

        let (_repo, output) = run_script(repo, "3\n\nwork, URGENT\n8\n");
        assert!(output.contains("Search Results (1)"));
        assert!(output.contains("Ship release"));
        assert!(!output.contains("Garden"));
    }

    #[test]
    fn quick_filter_also_matches_tags() {
        let (_dir, mut repo) = open_repo();
        repo.create("Ideas", "a long body of text", ["reading"])
            .expect("create");

        let (_repo, output) = run_script(repo, "3\nread\n\n4\nread\n8\n");
        assert!(output.contains("Search Results (0)"));
        assert!(output.contains("No notes found matching your criteria."));
        assert!(output.contains("Search Results (1)"));
        assert!(output.contains("Content preview: a long bod..."));
    }

    #[test]
    fn toggles_pin_from_the_note_screen() {
        let (_dir, mut repo) = open_repo();
        let note = repo.create("Pin me", "", ["x"]).expect("create");

        let (repo, output) = run_script(repo, "5\n1\n2\n8\n");
        assert!(repo.get(note.id.as_str()).expect("present").is_pinned);
        assert!(output.contains("Note pinned."));
    }

    #[test]
    fn archives_and_lists_archived_notes() {
        let (_dir, mut repo) = open_repo();
        let note = repo.create("Old plan", "", ["x"]).expect("create");

        let (repo, output) = run_script(repo, "5\n1\n3\n1\n6\n8\n");
        assert!(repo.get(note.id.as_str()).expect("present").is_archived);
        assert!(output.contains("Note archived."));
        assert!(output.contains("No notes found."));
        assert!(output.contains("Old plan (ARCHIVED)"));
    }

    #[test]
    fn edits_title_content_and_clears_tags() {
        let (_dir, mut repo) = open_repo();
        let note = repo
            .create("Draft", "old body", ["a", "b"])
            .expect("create");

        let (repo, output) = run_script(repo, "5\n1\n1\nRenamed\ny\nnew body\n\n\n-\n8\n");
        let stored = repo.get(note.id.as_str()).expect("present");
        assert_eq!(stored.title, "Renamed");
        assert_eq!(stored.content, "new body");
        assert!(stored.tags.is_empty());
        assert!(output.contains("Note updated."));
    }

    #[test]
    fn blank_edit_changes_nothing() {
        let (_dir, mut repo) = open_repo();
        let note = repo.create("Same", "body", ["a"]).expect("create");

        let (repo, output) = run_script(repo, "5\n1\n1\n\nn\n\n8\n");
        assert_eq!(repo.get(note.id.as_str()), Some(&note));
        assert!(output.contains("Nothing changed."));
    }

    #[test]
    fn delete_requires_confirmation() {
        let (_dir, mut repo) = open_repo();
        repo.create("Keep?", "", Vec::<String>::new())
            .expect("create");

        let (repo, output) = run_script(repo, "5\n1\n4\nn\n");
        assert_eq!(repo.len(), 1);
        assert!(output.contains("Delete cancelled."));

        let (repo, output) = run_script(repo, "5\n1\n4\ny\n8\n");
        assert!(repo.is_empty());
        assert!(output.contains("Note deleted."));
    }

    #[test]
    fn unknown_list_number_is_reported() {
        let (_dir, mut repo) = open_repo();
        repo.create("Only", "", Vec::<String>::new())
            .expect("create");

        let (_repo, output) = run_script(repo, "5\n7\n8\n");
        assert!(output.contains("No note with that number."));
    }

    #[test]
    fn lists_tags_once_per_spelling() {
        let (_dir, mut repo) = open_repo();
        repo.create("a", "", ["Work"]).expect("create");
        repo.create("b", "", ["work", "home"]).expect("create");

        let (_repo, output) = run_script(repo, "7\n8\n");
        assert!(output.contains("1. home"));
        assert!(output.contains("2. work"));
        assert_eq!(output.matches(". work").count(), 1);
    }

    #[test]
    fn write_failures_are_reported_and_nothing_is_kept() {
        let (_dir, repo) = open_repo();
        fs::create_dir(repo.path()).expect("block notes file");

        let (repo, output) = run_script(repo, "2\nTitle\nbody\n\n\n\n8\n");
        assert!(repo.is_empty());
        assert!(output.contains("Could not save notes: failed to write"));
    }

    #[test]
    fn invalid_choices_and_end_of_input() {
        let (_dir, repo) = open_repo();
        let (repo, output) = run_script(repo, "9\n");
        assert!(repo.is_empty());
        assert!(output.contains("Invalid choice."));
        assert!(output.ends_with("Thank you for using Notekeeper!\n"));
    }
}
