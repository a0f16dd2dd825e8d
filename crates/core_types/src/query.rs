use std::cmp::Ordering;

use crate::note::Note;

/// Filter for `NoteRepository::search`. The default matches every note that is
/// not archived.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery {
    pub text: Option<String>,
    pub tags: Vec<String>,
    pub include_archived: bool,
}

impl SearchQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn include_archived(mut self, include: bool) -> Self {
        self.include_archived = include;
        self
    }

    /// Archive visibility, then title/content substring, then every requested tag.
    pub fn matches(&self, note: &Note) -> bool {
        if note.is_archived && !self.include_archived {
            return false;
        }

        let text_ok = match self.text.as_deref() {
            None | Some("") => true,
            Some(text) => note.mentions(text),
        };

        text_ok && self.tags.iter().all(|tag| note.has_tag(tag))
    }
}

/// Pinned first, then most recently updated first.
pub fn listing_order(a: &Note, b: &Note) -> Ordering {
    b.is_pinned
        .cmp(&a.is_pinned)
        .then_with(|| b.updated_at.cmp(&a.updated_at))
}
