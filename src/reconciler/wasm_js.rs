use crate::{
    notebook::{Notebook, NotebookInner},
    option::ReconcilerOptions,
    util::sleep::sleep,
};
use futures::{
    channel::oneshot,
    future::{Fuse, FutureExt},
    pin_mut, select,
};
use parking_lot::Mutex;
use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Weak,
    },
    time::Duration,
};
#[cfg(feature = "tracing")]
use tracing::debug;
use wasm_bindgen_futures::spawn_local;

type StopReceiver = Fuse<oneshot::Receiver<()>>;

/// Runs one cycle. Returns `false` when the loop should end.
async fn cycle(notebook: &Weak<NotebookInner>, stop: &mut StopReceiver) -> bool {
    let Some(notebook) = Notebook::upgrade(notebook) else {
        return false;
    };

    let reconcile = notebook.reconcile().fuse();
    pin_mut!(reconcile);

    select! {
        _report = reconcile => true,
        _ = stop => false,
    }
}

async fn run(
    notebook: Weak<NotebookInner>,
    interval: Duration,
    run_immediately: bool,
    mut stop: StopReceiver,
) {
    if run_immediately && !cycle(&notebook, &mut stop).await {
        return;
    }

    loop {
        let tick = sleep(interval).fuse();
        pin_mut!(tick);

        select! {
            _ = tick => {}
            _ = stop => break,
        }

        if !cycle(&notebook, &mut stop).await {
            break;
        }
    }
}

/// Handle to a running reconciliation loop. The loop stops when this is dropped.
pub struct Reconciler {
    interval: Duration,
    stop_sender: Mutex<Option<oneshot::Sender<()>>>,
    running: Arc<AtomicBool>,
}

impl Reconciler {
    pub(crate) fn start(notebook: &Notebook, options: ReconcilerOptions) -> Self {
        let interval = options.interval();
        let (stop_sender, stop_receiver) = oneshot::channel();
        let running = Arc::new(AtomicBool::new(true));

        let weak = notebook.downgrade();
        let run_immediately = options.run_immediately();
        let running_flag = running.clone();
        spawn_local(async move {
            run(weak, interval, run_immediately, stop_receiver.fuse()).await;
            running_flag.store(false, Ordering::SeqCst);
            #[cfg(feature = "tracing")]
            debug!("reconciler stopped");
        });

        Self {
            interval,
            stop_sender: Mutex::new(Some(stop_sender)),
            running,
        }
    }

    /// The time between reconciliation cycles.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Stops the loop, abandoning a cycle in progress.
    pub fn stop(&self) {
        if let Some(sender) = self.stop_sender.lock().take() {
            let _ = sender.send(());
        }
    }

    /// Returns `true` until the loop has ended.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
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
        self.stop();
    }
}

#[cfg(all(test, target_family = "wasm"))]
mod tests {
    use crate::{option::ReconcilerOptions, util::sleep::sleep, Notebook};
    use std::time::Duration;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    async fn stop_ends_the_loop() {
        let notebook = Notebook::new().unwrap();
        let reconciler = notebook.start_reconciler(
            ReconcilerOptions::builder()
                .interval(Duration::from_millis(20))
                .build(),
        );
        assert!(reconciler.is_running());

        reconciler.stop();
        sleep(Duration::from_millis(100)).await;
        assert!(!reconciler.is_running());
    }
}
