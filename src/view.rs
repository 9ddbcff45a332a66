//! Per-view state that lives outside the shared [`Notebook`](crate::Notebook).

pub mod card;
pub mod form;

pub use card::NoteCard;
pub use form::{NoteForm, Submission};
