use super::task::{NavTarget, TaskKind, TaskOutcome, run_task};
use crate::keychain::Keychain;
use crate::{error, log};
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// The one guidance task currently allowed to command the vehicle.
struct ActiveTask {
    kind: TaskKind,
    /// Cancels the task's guidance writes and sleeps.
    c_tok: CancellationToken,
    /// Holds `None` until the task has ended. The sender is dropped without
    /// a value if the task panics.
    outcome: watch::Receiver<Option<TaskOutcome>>,
    handle: JoinHandle<()>,
}

impl ActiveTask {
    fn is_running(&self) -> bool { self.outcome.borrow().is_none() && !self.handle.is_finished() }
}

/// Owns the lifecycle of guidance tasks.
///
/// At most one task runs at a time. Starting a new one first cancels the
/// running task and waits for it to end, so the old task's last write (a
/// zero vertical speed) always lands before the new task's first command.
pub struct Supervisor {
    keychain: Keychain,
    active: Mutex<Option<ActiveTask>>,
}

impl Supervisor {
    pub fn new(keychain: Keychain) -> Self { Self { keychain, active: Mutex::new(None) } }

    pub fn keychain(&self) -> &Keychain { &self.keychain }

    /// Replaces whatever task is running with a new task for `target`.
    ///
    /// Returns as soon as the new task has been spawned.
    pub async fn start(&self, target: NavTarget) {
        let kind = target.kind();
        let mut active = self.active.lock().await;
        if let Some(prev) = active.take() {
            if prev.is_running() {
                log!("Replacing {} task with {kind}", prev.kind);
            }
            Self::cancel_and_join(prev).await;
        }

        let c_tok = CancellationToken::new();
        let (outcome_tx, outcome) = watch::channel(None);
        let keychain = self.keychain.clone();
        let task_tok = c_tok.clone();
        let handle = tokio::spawn(async move {
            let res = run_task(target, keychain, task_tok).await;
            outcome_tx.send_replace(Some(res));
        });
        *active = Some(ActiveTask { kind, c_tok, outcome, handle });
    }

    /// Cancels the running task and waits for it to end. Returns the kind of
    /// the stopped task, `None` if nothing was running or the last task had
    /// already ended on its own.
    pub async fn stop(&self) -> Option<TaskKind> {
        let prev = self.active.lock().await.take()?;
        let stopped = prev.is_running().then_some(prev.kind);
        Self::cancel_and_join(prev).await;
        stopped
    }

    /// Kind of the task that is still running, if any.
    pub async fn active_kind(&self) -> Option<TaskKind> {
        self.active.lock().await.as_ref().filter(|t| t.is_running()).map(|t| t.kind)
    }

    pub async fn is_active(&self) -> bool { self.active_kind().await.is_some() }

    /// Waits until the current task ends without cancelling it and returns
    /// how it ended. Returns `None` immediately if no task was ever started
    /// or the last one has been stopped.
    ///
    /// The lock is not held while waiting, so `stop` can still interrupt.
    pub async fn wait(&self) -> Option<TaskOutcome> {
        let mut outcome = self.active.lock().await.as_ref().map(|t| t.outcome.clone())?;
        match outcome.wait_for(Option::is_some).await {
            Ok(done) => done.clone(),
            Err(_) => Some(TaskOutcome::Failed("task ended without reporting".to_string())),
        }
    }

    async fn cancel_and_join(task: ActiveTask) {
        task.c_tok.cancel();
        if let Err(e) = task.handle.await {
            if e.is_panic() {
                error!("{} task panicked: {e}", task.kind);
            }
        }
    }
}
