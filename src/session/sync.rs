use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast::error::RecvError;
use tokio::sync::watch;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info};

use crate::session::store::SessionStore;
use crate::session::Session;

/// Keeps every open view's picture of the session in step with the store.
///
/// Reconciliation runs on each store event and on a fixed tick, so changes
/// made outside this process (another portal sharing the file slot) show up
/// within one interval. Readers may see a stale session until then.
#[derive(Clone)]
pub struct SessionWatcher {
    rx: watch::Receiver<Session>,
}

impl SessionWatcher {
    pub fn spawn(store: Arc<dyn SessionStore>, poll_interval: Duration) -> Self {
        let initial = Session::from_credential(store.get().as_deref());
        let (tx, rx) = watch::channel(initial);

        tokio::spawn(run_reconciler(store, tx, poll_interval));

        Self { rx }
    }

    pub fn current(&self) -> Session {
        self.rx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.rx.clone()
    }
}

async fn run_reconciler(
    store: Arc<dyn SessionStore>,
    tx: watch::Sender<Session>,
    poll_interval: Duration,
) {
    let mut events = store.subscribe();
    let mut ticker = interval(poll_interval.max(Duration::from_millis(1)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    info!(poll_ms = poll_interval.as_millis() as u64, "session reconciler started");

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            event = events.recv() => match event {
                Ok(event) => debug!(?event, "session slot changed"),
                Err(RecvError::Lagged(skipped)) => debug!(skipped, "session events lagged"),
                Err(RecvError::Closed) => break,
            },
            _ = tx.closed() => break,
        }

        let session = Session::from_credential(store.get().as_deref());
        tx.send_if_modified(|current| {
            if *current == session {
                return false;
            }
            *current = session;
            true
        });
    }

    info!("session reconciler stopped");
}
