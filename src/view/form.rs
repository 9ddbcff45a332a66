use crate::{
    api::{Note, NoteDraft},
    notebook::{Notebook, NotebookError},
};

/// State of the create/edit form.
///
/// With no note being edited, [`submit`](NoteForm::submit) creates a note and clears the
/// fields on success. While editing, it updates that note and leaves edit mode on success.
/// Failed submissions keep the fields so the user can retry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteForm {
    /// The title field.
    pub title: String,
    /// The content field.
    pub content: String,
    editing: Option<String>,
    submitting: bool,
}

impl NoteForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enters edit mode for `note`, loading its fields.
    pub fn edit(&mut self, note: &Note) {
        self.title = note.title.clone();
        self.content = note.content.clone();
        self.editing = Some(note.id.clone());
    }

    /// Leaves edit mode and clears the fields.
    pub fn cancel(&mut self) {
        self.title.clear();
        self.content.clear();
        self.editing = None;
    }

    /// The id of the note being edited, if any.
    pub fn editing(&self) -> Option<&str> {
        self.editing.as_deref()
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// The current field values as a draft.
    pub fn draft(&self) -> NoteDraft {
        NoteDraft::new(self.title.as_str(), self.content.as_str())
    }

    /// Creates or updates a note from the current fields.
    ///
    /// Blank fields are rejected before anything is sent.
    pub async fn submit(&mut self, notebook: &Notebook) -> Result<Note, NotebookError> {
        let submission = self.begin();
        let result = submission.send(notebook).await;
        self.finish(result)
    }

    /// Marks the form as submitting and takes the current fields.
    ///
    /// Use with [`finish`](NoteForm::finish) when the form must stay readable while the
    /// request is in flight.
    pub fn begin(&mut self) -> Submission {
        self.submitting = true;
        Submission {
            draft: self.draft(),
            editing: self.editing.clone(),
        }
    }

    /// Applies the outcome of a [`Submission`]: clears the form on success, keeps the
    /// fields on failure.
    pub fn finish(&mut self, result: Result<Note, NotebookError>) -> Result<Note, NotebookError> {
        self.submitting = false;
        let note = result?;
        self.cancel();
        Ok(note)
    }
}

/// Fields taken from a [`NoteForm`] by [`NoteForm::begin`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    draft: NoteDraft,
    editing: Option<String>,
}

impl Submission {
    pub fn draft(&self) -> &NoteDraft {
        &self.draft
    }

    /// Creates the note, or updates the note that was being edited.
    pub async fn send(&self, notebook: &Notebook) -> Result<Note, NotebookError> {
        match self.editing.as_deref() {
            Some(id) => notebook.update(id, &self.draft).await,
            None => notebook.create(&self.draft).await,
        }
    }
}
