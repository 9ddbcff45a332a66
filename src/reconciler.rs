//! Background retry of local notes.
//!
//! A [`Reconciler`] calls [`Notebook::reconcile`](crate::Notebook::reconcile) every
//! [`ReconcilerOptions::interval`](crate::ReconcilerOptions) until it is stopped or
//! dropped. It only holds a weak reference to the notebook, so dropping every
//! [`Notebook`](crate::Notebook) handle ends the loop as well.

#[cfg(feature = "native")]
mod native;
#[cfg(feature = "native")]
pub use native::Reconciler;

#[cfg(all(feature = "wasm-js", not(feature = "native")))]
mod wasm_js;
#[cfg(all(feature = "wasm-js", not(feature = "native")))]
pub use wasm_js::Reconciler;
