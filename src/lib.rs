//! Client layer for a personal notes application backed by a REST notes API.
//!
//! [`NoteService`] talks to the API. [`Notebook`] owns the displayed collection on top of it:
//! it keeps notes created while the backend is unreachable as local notes, applies
//! deletions optimistically, and retries local notes through [`Notebook::reconcile`] or a
//! background [`Reconciler`].
//!
//! ```no_run
//! use notes_client::{NoteDraft, Notebook, NotebookOptions, NoteServiceOptions};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let notebook = Notebook::new_with_options(
//!     NotebookOptions::builder()
//!         .service(NoteServiceOptions::from_env())
//!         .build(),
//! )?;
//! notebook.load().await?;
//! let note = notebook.create(&NoteDraft::new("Groceries", "milk, eggs")).await?;
//! if note.is_local {
//!     println!("saved locally, will sync when the backend is back");
//! }
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod note_service;
pub mod notebook;
pub mod option;
#[cfg(any(feature = "native", feature = "wasm-js"))]
pub mod reconciler;
pub mod storage;
mod util;
pub mod view;

#[cfg(all(test, not(target_family = "wasm")))]
mod test_utils;

pub use api::{DeleteAck, Note, NoteDraft, ValidationError};
pub use note_service::{NoteService, NoteServiceError};
pub use notebook::{Notebook, NotebookError, ReconcileReport};
pub use option::{ConfigError, NoteServiceOptions, NotebookOptions, ReconcilerOptions};
#[cfg(any(feature = "native", feature = "wasm-js"))]
pub use reconciler::Reconciler;
pub use util::callback;
