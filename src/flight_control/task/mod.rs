//! The guidance operations that run as supervised background tasks, and the
//! task boundary that turns their results into status reports.

mod navigator;
mod scenario;
mod stream_follow;
mod takeoff;
mod takeoff_state;
mod teleport;
#[cfg(test)]
mod tests;

pub use scenario::Scenario;
pub use stream_follow::{FrameStream, StreamFrame};
pub use takeoff::TakeoffProfile;
pub use takeoff_state::TakeoffState;
pub use teleport::TeleportRequest;

use super::common::position::Waypoint;
use super::flight_computer::FlightComputer;
use super::guidance_error::GuidanceError;
use super::status::Status;
use crate::keychain::Keychain;
use crate::log;
use strum_macros::Display;
use tokio_util::sync::CancellationToken;

/// The kind of operation a task performs, used in status lines.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Display)]
pub enum TaskKind {
    Takeoff,
    #[strum(serialize = "Navigation")]
    FlyTo,
    Scenario,
    Teleport,
    #[strum(serialize = "Stream follow")]
    Follow,
}

/// How a task ended, handed back from the task boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    Finished,
    Cancelled,
    Failed(String),
}

impl TaskOutcome {
    pub fn is_failed(&self) -> bool { matches!(self, TaskOutcome::Failed(_)) }
}

/// What a new task should do. All variants are single-flight: starting one
/// replaces whichever task is running.
pub enum NavTarget {
    Takeoff,
    FlyTo(Waypoint),
    Scenario(Scenario),
    Teleport(TeleportRequest),
    Follow(FrameStream),
}

impl NavTarget {
    pub fn kind(&self) -> TaskKind {
        match self {
            NavTarget::Takeoff => TaskKind::Takeoff,
            NavTarget::FlyTo(_) => TaskKind::FlyTo,
            NavTarget::Scenario(_) => TaskKind::Scenario,
            NavTarget::Teleport(_) => TaskKind::Teleport,
            NavTarget::Follow(_) => TaskKind::Follow,
        }
    }
}

/// Runs one task to completion, reports how it ended and returns the same
/// outcome.
///
/// This is the only place where task errors are handled: cancellation and
/// failures both leave the vehicle with a zero vertical speed command before
/// they are reported.
pub(crate) async fn run_task(target: NavTarget, keychain: Keychain, c_tok: CancellationToken) -> TaskOutcome {
    let kind = target.kind();
    let f_comp = FlightComputer::new(&keychain, c_tok);
    let res = match target {
        NavTarget::Takeoff => takeoff::TakeoffSequencer::new(&f_comp, keychain.takeoff()).run().await,
        NavTarget::FlyTo(wp) => navigator::fly_to(&f_comp, &wp).await,
        NavTarget::Scenario(scenario) => scenario::fly_scenario(&f_comp, &scenario).await,
        NavTarget::Teleport(req) => teleport::teleport(&f_comp, &req).await,
        NavTarget::Follow(frames) => stream_follow::follow_stream(&f_comp, frames).await,
    };
    match res {
        Ok(()) => {
            log!("{kind} task finished");
            TaskOutcome::Finished
        }
        Err(GuidanceError::Cancelled) => {
            f_comp.safe_stop().await;
            keychain.status().report(Status::Cancelled { task: kind });
            TaskOutcome::Cancelled
        }
        Err(e) => {
            f_comp.safe_stop().await;
            let reason = e.to_string();
            keychain.status().report(Status::Failed { task: kind, reason: reason.clone() });
            TaskOutcome::Failed(reason)
        }
    }
}
