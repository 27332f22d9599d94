use super::common::position::{Position, Waypoint};
use super::task::{TakeoffState, TaskKind};
use crate::{error, event, info, nav, warn};
use std::fmt::{Display, Formatter};
use tokio::sync::broadcast;

/// Progress events emitted by the guidance tasks.
///
/// Listeners get the typed value; the `Display` form is the human-readable
/// status line shown to the operator.
#[derive(Debug, Clone, PartialEq)]
pub enum Status {
    TakeoffStarted,
    TakeoffStage(TakeoffState),
    ClimbingTo { target_alt_ft: f64 },
    LevelFlight,
    NavStarted { target: Waypoint },
    ScenarioStarted { waypoints: usize, route_nm: f64 },
    WaypointStarted { index: usize, total: usize, waypoint: Waypoint },
    /// One control cycle. `leg` is the 1-based waypoint index in scenario mode.
    Progress { leg: Option<usize>, dist_nm: f64, alt_err_ft: f64, bearing_deg: f64 },
    Arrived { leg: Option<usize> },
    ScenarioComplete,
    TeleportStarted { steps: usize, step_m: f64 },
    TeleportStep { step: usize, steps: usize, pos: Position },
    TeleportComplete,
    FollowStarted,
    FollowFrame { frame: usize, lat: Option<f64>, lon: Option<f64>, alt: Option<f64>, heading: Option<f64> },
    FollowComplete,
    Cancelled { task: TaskKind },
    Failed { task: TaskKind, reason: String },
    InputRejected(String),
    Warning(String),
}

fn opt(v: Option<f64>, prec: usize) -> String {
    v.map_or_else(|| "-".to_string(), |v| format!("{v:.prec$}"))
}

impl Display for Status {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Status::TakeoffStarted => write!(f, "Takeoff started"),
            Status::TakeoffStage(s) => write!(f, "Takeoff stage: {s}"),
            Status::ClimbingTo { target_alt_ft } => write!(f, "Climbing to {target_alt_ft:.0} ft"),
            Status::LevelFlight => {
                write!(f, "Level flight established, teleport and navigation available")
            }
            Status::NavStarted { target } => write!(f, "Navigation started towards {target}"),
            Status::ScenarioStarted { waypoints, route_nm } => {
                write!(f, "Scenario started: {waypoints} waypoints, {route_nm:.1} NM route")
            }
            Status::WaypointStarted { index, total, waypoint } => {
                write!(f, "Waypoint {index}/{total} -> {waypoint}")
            }
            Status::Progress { leg, dist_nm, alt_err_ft, bearing_deg } => {
                if let Some(leg) = leg {
                    write!(f, "WP {leg}: ")?;
                }
                write!(f, "Dist {dist_nm:.2} NM  AltErr {alt_err_ft:.0} ft  BRG {bearing_deg:.0}")
            }
            Status::Arrived { leg: Some(leg) } => write!(f, "Waypoint {leg} reached"),
            Status::Arrived { leg: None } => write!(f, "Target reached"),
            Status::ScenarioComplete => write!(f, "Scenario complete"),
            Status::TeleportStarted { steps, step_m } => {
                write!(f, "Staged teleport: {steps} steps of ~{step_m} m")
            }
            Status::TeleportStep { step, steps, pos } => write!(f, "Step {step}/{steps} {pos}"),
            Status::TeleportComplete => write!(f, "Teleport complete"),
            Status::FollowStarted => write!(f, "Stream follow started"),
            Status::FollowFrame { frame, lat, lon, alt, heading } => write!(
                f,
                "Frame {frame}: LAT {} LON {} ALT {} HDG {}",
                opt(*lat, 4),
                opt(*lon, 4),
                opt(*alt, 0),
                opt(*heading, 0)
            ),
            Status::FollowComplete => write!(f, "Stream follow complete"),
            Status::Cancelled { task } => write!(f, "{task} cancelled"),
            Status::Failed { task, reason } => write!(f, "FAILED: {task}: {reason}"),
            Status::InputRejected(reason) => write!(f, "FAILED: input rejected: {reason}"),
            Status::Warning(msg) => write!(f, "{msg}"),
        }
    }
}

/// Fire-and-forget status sink shared by all tasks.
///
/// Every status is logged and broadcast. Slow listeners may miss updates;
/// statuses are advisory and carry no state.
#[derive(Debug, Clone)]
pub struct StatusReporter {
    tx: broadcast::Sender<Status>,
}

impl StatusReporter {
    const DEFAULT_CAPACITY: usize = 64;

    pub fn new() -> Self { Self::with_capacity(Self::DEFAULT_CAPACITY) }

    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Status> { self.tx.subscribe() }

    pub fn report(&self, status: Status) {
        match &status {
            Status::Progress { .. } => nav!("{status}"),
            Status::TeleportStep { .. } | Status::FollowFrame { .. } => event!("{status}"),
            Status::Failed { .. } | Status::InputRejected(_) => error!("{status}"),
            Status::Warning(_) => warn!("{status}"),
            _ => info!("{status}"),
        }
        let _ = self.tx.send(status);
    }
}

impl Default for StatusReporter {
    fn default() -> Self { Self::new() }
}
