use crate::api::Note;
use std::borrow::Cow;

/// Number of characters of content shown while a card is collapsed.
pub const PREVIEW_LENGTH: usize = 100;

const ELLIPSIS: &str = "...";

/// Expand/collapse state of a single displayed note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteCard {
    note: Note,
    expanded: bool,
}

impl NoteCard {
    /// Creates a collapsed card for `note`.
    pub fn new(note: Note) -> Self {
        Self {
            note,
            expanded: false,
        }
    }

    pub fn note(&self) -> &Note {
        &self.note
    }

    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    /// Flips between the collapsed preview and the full content.
    pub fn toggle(&mut self) {
        self.expanded = !self.expanded;
    }

    /// Returns `true` if the content is long enough to be truncated.
    pub fn is_expandable(&self) -> bool {
        self.note.content.chars().count() > PREVIEW_LENGTH
    }

    /// Returns `true` if the note has not been persisted remotely yet.
    pub fn is_local(&self) -> bool {
        self.note.is_local
    }

    /// The content as currently shown: the full text, or the first
    /// [`PREVIEW_LENGTH`] characters followed by `...` while collapsed.
    pub fn display_content(&self) -> Cow<'_, str> {
        if self.expanded || !self.is_expandable() {
            return Cow::Borrowed(&self.note.content);
        }
        let mut preview: String = self.note.content.chars().take(PREVIEW_LENGTH).collect();
        preview.push_str(ELLIPSIS);
        Cow::Owned(preview)
    }

    /// Swaps in a newer version of the note, keeping the expand state.
    pub fn refresh(&mut self, note: Note) {
        self.note = note;
    }
}

impl From<Note> for NoteCard {
    fn from(note: Note) -> Self {
        Self::new(note)
    }
}
