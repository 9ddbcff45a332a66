//! Notebook callbacks for surfacing errors and collection changes to the UI.

use crate::{api::Note, notebook::NotebookError};
use parking_lot::Mutex;
use std::{fmt, sync::Arc};

pub(crate) type OnErrorInner = Box<dyn FnMut(NotebookError) + Send>;

/// The callback executed whenever a [`Notebook`](crate::Notebook) operation fails.
///
/// # Usage
/// ```
/// use notes_client::{callback::OnError, NotebookError};
///
/// let on_error = OnError::from(|err: NotebookError| {
///     // Show the error to the user
///     eprintln!("{err}");
/// });
/// ```
#[derive(Clone)]
pub struct OnError(pub(crate) Arc<Mutex<OnErrorInner>>);

impl OnError {
    pub(crate) fn call(&self, error: NotebookError) {
        let mut callback = self.0.lock();
        (*callback)(error);
    }
}

impl<F> From<F> for OnError
where
    F: FnMut(NotebookError) + Send + 'static,
{
    fn from(f: F) -> Self {
        OnError(Arc::new(Mutex::new(Box::new(f))))
    }
}

impl fmt::Debug for OnError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("OnError")
    }
}

pub(crate) type OnChangeInner = Box<dyn FnMut(&[Note]) + Send>;

/// The callback executed with the new collection after every change to it.
///
/// # Usage
/// ```
/// use notes_client::{callback::OnChange, Note};
///
/// let on_change = OnChange::from(|notes: &[Note]| {
///     // Re-render the list
///     println!("{} notes", notes.len());
/// });
/// ```
#[derive(Clone)]
pub struct OnChange(pub(crate) Arc<Mutex<OnChangeInner>>);

impl OnChange {
    pub(crate) fn call(&self, notes: &[Note]) {
        let mut callback = self.0.lock();
        (*callback)(notes);
    }
}

impl<F> From<F> for OnChange
where
    F: FnMut(&[Note]) + Send + 'static,
{
    fn from(f: F) -> Self {
        OnChange(Arc::new(Mutex::new(Box::new(f))))
    }
}

impl fmt::Debug for OnChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("OnChange")
    }
}
