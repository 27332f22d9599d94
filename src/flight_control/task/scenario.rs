use super::navigator::{fly_leg, setup_autopilot};
use crate::flight_control::common::position::Waypoint;
use crate::flight_control::flight_computer::FlightComputer;
use crate::flight_control::guidance_error::{GuidanceError, InputError};
use crate::flight_control::status::Status;
use itertools::Itertools;

/// An ordered, non-empty list of waypoints flown in sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct Scenario {
    waypoints: Vec<Waypoint>,
}

impl Scenario {
    pub fn new(waypoints: Vec<Waypoint>) -> Result<Self, InputError> {
        if waypoints.is_empty() {
            return Err(InputError::EmptyScenario);
        }
        Ok(Self { waypoints })
    }

    pub fn waypoints(&self) -> &[Waypoint] { &self.waypoints }

    pub fn waypoint_count(&self) -> usize { self.waypoints.len() }

    /// Great-circle length of the route from the first to the last waypoint.
    pub fn route_nm(&self) -> f64 {
        self.waypoints.iter().tuple_windows().map(|(a, b)| a.pos().distance_nm_to(b.pos())).sum()
    }
}

/// Flies every waypoint of `scenario` in order.
///
/// Each leg gets a fresh autopilot setup and runs the single-target loop;
/// arrival advances to the next waypoint. Completion is reported only after
/// the last one.
pub(super) async fn fly_scenario(f_comp: &FlightComputer, scenario: &Scenario) -> Result<(), GuidanceError> {
    let total = scenario.waypoint_count();
    f_comp.status().report(Status::ScenarioStarted { waypoints: total, route_nm: scenario.route_nm() });
    for (index, waypoint) in (1..).zip(scenario.waypoints()) {
        if f_comp.is_cancelled() {
            return Err(GuidanceError::Cancelled);
        }
        f_comp.status().report(Status::WaypointStarted { index, total, waypoint: *waypoint });
        setup_autopilot(f_comp, waypoint).await?;
        fly_leg(f_comp, waypoint, Some(index)).await?;
        f_comp.status().report(Status::Arrived { leg: Some(index) });
    }
    f_comp.safe_stop().await;
    f_comp.status().report(Status::ScenarioComplete);
    Ok(())
}
