pub mod common;
mod flight_computer;
mod guidance_error;
mod status;
mod supervisor;
pub mod task;

pub use common::position::Waypoint;
pub use guidance_error::InputError;
pub use status::{Status, StatusReporter};
pub use supervisor::Supervisor;
pub use task::{NavTarget, Scenario, StreamFrame, TakeoffProfile, TaskKind, TaskOutcome, TeleportRequest};
