use crate::event;
use crate::flight_control::{Status, StatusReporter};
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

/// Keeps the most recent status for on-demand display.
pub(super) struct StatusWatch {
    last: Arc<RwLock<Option<Status>>>,
    handle: JoinHandle<()>,
}

impl StatusWatch {
    pub(super) fn spawn(reporter: &StatusReporter) -> Self {
        let mut rx = reporter.subscribe();
        let last = Arc::new(RwLock::new(None));
        let last_clone = Arc::clone(&last);
        let handle = tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(status) => *last_clone.write().await = Some(status),
                    Err(RecvError::Lagged(n)) => event!("Status watch skipped {n} updates"),
                    Err(RecvError::Closed) => break,
                }
            }
        });
        Self { last, handle }
    }

    pub(super) async fn last(&self) -> Option<Status> { self.last.read().await.clone() }
}

impl Drop for StatusWatch {
    fn drop(&mut self) { self.handle.abort(); }
}
