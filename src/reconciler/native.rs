use crate::{
    notebook::{Notebook, NotebookInner},
    option::ReconcilerOptions,
    util::sleep::sleep,
};
use std::{sync::Weak, time::Duration};
use tokio::{sync::watch, task::JoinHandle};
#[cfg(feature = "tracing")]
use tracing::debug;

struct ReconcileLoop {
    notebook: Weak<NotebookInner>,
    interval: Duration,
    run_immediately: bool,
    stop_receiver: watch::Receiver<bool>,
}

impl ReconcileLoop {
    async fn run(mut self) {
        if self.run_immediately && !self.cycle().await {
            return;
        }

        loop {
            tokio::select! {
                _ = sleep(self.interval) => {}
                _ = self.stop_receiver.changed() => {
                    // Stopped or handle dropped
                    break;
                }
            }

            if !self.cycle().await {
                break;
            }
        }

        #[cfg(feature = "tracing")]
        debug!("reconciler stopped");
    }

    /// Runs one cycle. Returns `false` when the loop should end.
    async fn cycle(&mut self) -> bool {
        let Some(notebook) = Notebook::upgrade(&self.notebook) else {
            return false;
        };

        tokio::select! {
            _report = notebook.reconcile() => {
                true
            }
            _ = self.stop_receiver.changed() => {
                false
            }
        }
    }
}

/// Handle to a running reconciliation loop. The loop stops when this is dropped.
pub struct Reconciler {
    interval: Duration,
    stop_sender: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl Reconciler {
    pub(crate) fn start(notebook: &Notebook, options: ReconcilerOptions) -> Self {
        let interval = options.interval();
        let (stop_sender, stop_receiver) = watch::channel(false);

        let reconcile_loop = ReconcileLoop {
            notebook: notebook.downgrade(),
            interval,
            run_immediately: options.run_immediately(),
            stop_receiver,
        };
        let handle = tokio::spawn(reconcile_loop.run());

        #[cfg(feature = "tracing")]
        debug!(?interval, "reconciler started");

        Self {
            interval,
            stop_sender,
            handle,
        }
    }

    /// The time between reconciliation cycles.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Stops the loop, abandoning a cycle in progress.
    pub fn stop(&self) {
        let _ = self.stop_sender.send(true);
    }

    /// Returns `true` until the loop has ended.
    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }
}

impl std::fmt::Debug for Reconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reconciler")
            .field("interval", &self.interval)
            .field("running", &self.is_running())
            .finish()
    }
}

impl Drop for Reconciler {
    fn drop(&mut self) {
        let _ = self.stop_sender.send(true);
    }
}
