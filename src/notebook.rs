//! The UI controller owning the displayed note collection.
//!
//! Creations made while the backend is unreachable are kept as local notes and
//! retried by [`Notebook::reconcile`]. Local notes are edited and deleted without
//! contacting the backend; confirmed notes always go through the [`NoteService`].

#[cfg(any(feature = "native", feature = "wasm-js"))]
use crate::{option::ReconcilerOptions, reconciler::Reconciler};
use crate::{
    api::{DeleteAck, Note, NoteDraft},
    note_service::{NoteService, NoteServiceError},
    option::{ConfigError, NotebookOptions},
    storage::{MemoryStorage, NoteStorage, StorageError, KEY_STORAGE_PENDING},
    util::callback::{OnChange, OnError},
};
use chrono::Utc;
use parking_lot::Mutex;
use std::{
    collections::HashSet,
    fmt,
    sync::Arc,
};
#[cfg(any(feature = "native", feature = "wasm-js"))]
use std::sync::Weak;
use thiserror::Error;
#[cfg(feature = "tracing")]
use tracing::{debug, info, warn};

const LOCAL_ID_PREFIX: &str = "local-";

/// The error type for notebook operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NotebookError {
    /// The note service rejected the operation.
    #[error(transparent)]
    Service(#[from] NoteServiceError),
    /// Another mutating operation on the same note has not finished yet.
    #[error("Another operation on note {0} is still in progress")]
    Busy(String),
}

impl NotebookError {
    /// Returns the underlying service error, if any.
    pub fn service_error(&self) -> Option<&NoteServiceError> {
        match self {
            NotebookError::Service(err) => Some(err),
            NotebookError::Busy(_) => None,
        }
    }
}

/// The outcome of one reconciliation cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Local notes that were persisted remotely during this cycle.
    pub confirmed: usize,
    /// Local notes whose retry failed during this cycle.
    pub failed: usize,
    /// Local notes still awaiting reconciliation after this cycle.
    pub pending: usize,
}

pub(crate) struct NotebookInner {
    service: NoteService,
    notes: Mutex<Vec<Note>>,
    in_flight: Mutex<HashSet<String>>,
    storage: Mutex<Box<dyn NoteStorage>>,
    on_error: Option<OnError>,
    on_change: Option<OnChange>,
}

impl fmt::Debug for NotebookInner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotebookInner")
            .field("service", &self.service)
            .field("notes", &self.notes.lock().len())
            .field("in_flight", &self.in_flight.lock().len())
            .finish()
    }
}

/// Marks a note id as having a mutating operation in progress until dropped.
struct InFlight<'a> {
    ids: &'a Mutex<HashSet<String>>,
    id: String,
}

impl<'a> InFlight<'a> {
    fn acquire(ids: &'a Mutex<HashSet<String>>, id: &str) -> Result<Self, NotebookError> {
        if !ids.lock().insert(id.to_string()) {
            return Err(NotebookError::Busy(id.to_string()));
        }
        Ok(Self {
            ids,
            id: id.to_string(),
        })
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.ids.lock().remove(&self.id);
    }
}

/// The controller for a displayed collection of notes.
///
/// Clones share the same collection.
#[derive(Clone, Debug)]
pub struct Notebook(Arc<NotebookInner>);

impl Notebook {
    /// Creates a new [`Notebook`] with default options.
    pub fn new() -> Result<Self, ConfigError> {
        Self::new_with_options(NotebookOptions::default())
    }

    /// Creates a new [`Notebook`] with the given options.
    ///
    /// Local notes left in the storage by a previous session are restored into the collection.
    pub fn new_with_options(options: NotebookOptions) -> Result<Self, ConfigError> {
        let service = NoteService::new_with_options(options.service.unwrap_or_default())?;
        let mut storage = options
            .storage
            .unwrap_or_else(|| Box::new(MemoryStorage::new()));
        let notes = Self::restore_pending(storage.as_mut());

        Ok(Self(Arc::new(NotebookInner {
            service,
            notes: Mutex::new(notes),
            in_flight: Mutex::new(HashSet::new()),
            storage: Mutex::new(storage),
            on_error: options.on_error,
            on_change: options.on_change,
        })))
    }

    fn restore_pending(storage: &mut dyn NoteStorage) -> Vec<Note> {
        let restored = storage
            .get(KEY_STORAGE_PENDING)
            .and_then(|value| match value {
                Some(json) => serde_json::from_str::<Vec<Note>>(&json).map_err(StorageError::from),
                None => Ok(Vec::new()),
            });
        match restored {
            Ok(mut notes) => {
                for note in notes.iter_mut() {
                    note.is_local = true;
                }
                #[cfg(feature = "tracing")]
                if !notes.is_empty() {
                    info!(count = notes.len(), "restored pending local notes");
                }
                notes
            }
            Err(_e) => {
                #[cfg(feature = "tracing")]
                warn!(error = %_e, "could not restore pending local notes");
                Vec::new()
            }
        }
    }

    #[cfg(any(feature = "native", feature = "wasm-js"))]
    pub(crate) fn downgrade(&self) -> Weak<NotebookInner> {
        Arc::downgrade(&self.0)
    }

    #[cfg(any(feature = "native", feature = "wasm-js"))]
    pub(crate) fn upgrade(inner: &Weak<NotebookInner>) -> Option<Self> {
        inner.upgrade().map(Self)
    }

    /// The note service used for confirmed notes.
    pub fn service(&self) -> &NoteService {
        &self.0.service
    }

    /// Returns a snapshot of the displayed collection, in display order.
    pub fn notes(&self) -> Vec<Note> {
        self.0.notes.lock().clone()
    }

    /// Returns a snapshot of the notes awaiting reconciliation.
    pub fn pending(&self) -> Vec<Note> {
        self.0
            .notes
            .lock()
            .iter()
            .filter(|note| note.is_local)
            .cloned()
            .collect()
    }

    /// Looks up a note in the displayed collection.
    pub fn note(&self, id: &str) -> Option<Note> {
        self.0.notes.lock().iter().find(|note| note.id == id).cloned()
    }

    /// Returns `true` while a mutating operation on `id` is in progress.
    pub fn is_busy(&self, id: &str) -> bool {
        self.0.in_flight.lock().contains(id)
    }

    /// Replaces the confirmed notes with the backend's list. Local notes are kept after them.
    pub async fn load(&self) -> Result<Vec<Note>, NotebookError> {
        let remote = self
            .0
            .service
            .list()
            .await
            .map_err(|e| self.fail(e.into()))?;

        let snapshot = {
            let mut notes = self.0.notes.lock();
            let local: Vec<Note> = notes.drain(..).filter(|note| note.is_local).collect();
            notes.extend(remote.into_iter().map(|mut note| {
                note.is_local = false;
                note
            }));
            notes.extend(local);
            notes.clone()
        };
        self.notify(&snapshot);
        Ok(snapshot)
    }

    /// Creates a note.
    ///
    /// If the backend is unreachable the note is kept locally, with a client-generated
    /// id and `is_local` set, and returned as a success.
    pub async fn create(&self, draft: &NoteDraft) -> Result<Note, NotebookError> {
        let draft = self.validate(draft)?;

        let note = match self.0.service.create(&draft).await {
            Ok(mut note) => {
                note.is_local = false;
                note
            }
            Err(NoteServiceError::ServiceUnavailable(_reason)) => {
                #[cfg(feature = "tracing")]
                warn!(reason = %_reason, "backend unreachable, keeping note locally");
                let note = self.local_note(draft);
                self.0.notes.lock().push(note.clone());
                self.persist_pending();
                self.changed();
                return Ok(note);
            }
            Err(e) => return Err(self.fail(e.into())),
        };

        {
            let mut notes = self.0.notes.lock();
            match notes.iter_mut().find(|existing| existing.id == note.id) {
                Some(existing) => *existing = note.clone(),
                None => notes.push(note.clone()),
            }
        }
        self.changed();
        Ok(note)
    }

    /// Replaces the title and content of a note.
    ///
    /// Local notes are edited in place without contacting the backend.
    pub async fn update(&self, id: &str, draft: &NoteDraft) -> Result<Note, NotebookError> {
        let draft = self.validate(draft)?;
        let _in_flight = InFlight::acquire(&self.0.in_flight, id).map_err(|e| self.fail(e))?;

        let edited_locally = {
            let mut notes = self.0.notes.lock();
            notes
                .iter_mut()
                .find(|note| note.id == id && note.is_local)
                .map(|note| {
                    note.title = draft.title.clone();
                    note.content = draft.content.clone();
                    note.clone()
                })
        };
        if let Some(note) = edited_locally {
            self.persist_pending();
            self.changed();
            return Ok(note);
        }

        let mut note = self
            .0
            .service
            .update(id, &draft)
            .await
            .map_err(|e| self.fail(e.into()))?;
        note.is_local = false;

        let replaced = {
            let mut notes = self.0.notes.lock();
            match notes.iter_mut().find(|existing| existing.id == id) {
                Some(existing) => {
                    *existing = note.clone();
                    true
                }
                None => false,
            }
        };
        if replaced {
            self.changed();
        }
        Ok(note)
    }

    /// Deletes a note.
    ///
    /// Local notes are removed without contacting the backend. Confirmed notes are
    /// removed right away and put back in place if the backend fails to delete them;
    /// a note the backend reports as missing stays removed.
    pub async fn delete(&self, id: &str) -> Result<DeleteAck, NotebookError> {
        let _in_flight = InFlight::acquire(&self.0.in_flight, id).map_err(|e| self.fail(e))?;

        let removed = {
            let mut notes = self.0.notes.lock();
            notes
                .iter()
                .position(|note| note.id == id)
                .map(|index| (index, notes.remove(index)))
        };

        if let Some((_, note)) = &removed {
            if note.is_local {
                self.persist_pending();
                self.changed();
                return Ok(DeleteAck::default());
            }
            self.changed();
        }

        match self.0.service.delete(id).await {
            Ok(ack) => Ok(ack),
            Err(err @ NoteServiceError::NotFound(_)) => Err(self.fail(err.into())),
            Err(err) => {
                if let Some((index, note)) = removed {
                    let restored = {
                        let mut notes = self.0.notes.lock();
                        // A concurrent load may already have brought the note back.
                        if notes.iter().any(|existing| existing.id == note.id) {
                            false
                        } else {
                            let index = index.min(notes.len());
                            notes.insert(index, note);
                            true
                        }
                    };
                    if restored {
                        self.changed();
                    }
                }
                Err(self.fail(err.into()))
            }
        }
    }

    /// Runs one reconciliation cycle: retries the creation of every local note that is
    /// not busy, replacing each confirmed one in place with the backend's note.
    ///
    /// Each note is retried independently; failures leave the note local and are counted
    /// in the report.
    pub async fn reconcile(&self) -> ReconcileReport {
        let mut report = ReconcileReport::default();

        for local in self.pending() {
            let Ok(_in_flight) = InFlight::acquire(&self.0.in_flight, &local.id) else {
                continue;
            };
            let Some(current) = self.note(&local.id).filter(|note| note.is_local) else {
                continue;
            };

            match self.0.service.create(&current.to_draft()).await {
                Ok(mut confirmed) => {
                    confirmed.is_local = false;
                    #[cfg(feature = "tracing")]
                    info!(local_id = %current.id, id = %confirmed.id, "local note confirmed");
                    {
                        let mut notes = self.0.notes.lock();
                        if notes.iter().any(|note| note.id == confirmed.id) {
                            // Already listed by a concurrent load.
                            notes.retain(|note| note.id != current.id);
                        } else if let Some(slot) =
                            notes.iter_mut().find(|note| note.id == current.id)
                        {
                            *slot = confirmed;
                        }
                    }
                    self.persist_pending();
                    self.changed();
                    report.confirmed += 1;
                }
                Err(_e) => {
                    #[cfg(feature = "tracing")]
                    warn!(id = %current.id, error = %_e, "local note still pending");
                    report.failed += 1;
                }
            }
        }

        report.pending = self.0.notes.lock().iter().filter(|note| note.is_local).count();
        #[cfg(feature = "tracing")]
        debug!(?report, "reconciliation cycle finished");
        report
    }

    /// Starts retrying local notes in the background until the returned handle is
    /// stopped or dropped.
    #[cfg(any(feature = "native", feature = "wasm-js"))]
    pub fn start_reconciler(&self, options: ReconcilerOptions) -> Reconciler {
        Reconciler::start(self, options)
    }

    fn validate(&self, draft: &NoteDraft) -> Result<NoteDraft, NotebookError> {
        draft
            .validate()
            .map_err(|e| self.fail(NoteServiceError::from(e).into()))
    }

    fn local_note(&self, draft: NoteDraft) -> Note {
        let notes = self.0.notes.lock();
        let id = loop {
            let candidate = format!("{LOCAL_ID_PREFIX}{:016x}", rand::random::<u64>());
            if !notes.iter().any(|note| note.id == candidate) {
                break candidate;
            }
        };
        Note {
            id,
            title: draft.title,
            content: draft.content,
            created_at: Utc::now(),
            updated_at: None,
            is_local: true,
        }
    }

    /// Writes the current local notes to storage. Failures are logged, never raised.
    fn persist_pending(&self) {
        let pending = self.pending();
        let mut storage = self.0.storage.lock();
        let result = if pending.is_empty() {
            storage.remove(KEY_STORAGE_PENDING)
        } else {
            serde_json::to_string(&pending)
                .map_err(StorageError::from)
                .and_then(|json| storage.set(KEY_STORAGE_PENDING, &json))
        };
        if let Err(_e) = result {
            #[cfg(feature = "tracing")]
            warn!(error = %_e, "could not persist pending local notes");
        }
    }

    fn fail(&self, error: NotebookError) -> NotebookError {
        if let Some(on_error) = &self.0.on_error {
            on_error.call(error.clone());
        }
        error
    }

    fn changed(&self) {
        if self.0.on_change.is_some() {
            let snapshot = self.notes();
            self.notify(&snapshot);
        }
    }

    fn notify(&self, notes: &[Note]) {
        if let Some(on_change) = &self.0.on_change {
            on_change.call(notes);
        }
    }
}
