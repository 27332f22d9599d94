use crate::flight_control::common::{
    control_law::{ControlLaw, Guidance},
    position::Waypoint,
};
use crate::flight_control::flight_computer::FlightComputer;
use crate::flight_control::guidance_error::GuidanceError;
use crate::flight_control::status::Status;
use std::time::Duration;

/// Period of the guidance loop.
pub(super) const CYCLE: Duration = Duration::from_secs(1);
/// Retry delay after a cycle without a complete position.
pub(super) const READ_BACKOFF: Duration = Duration::from_millis(500);
/// Delay before the autopilot setup is applied a second time. The simulator
/// drops the first targets when they arrive right after AP master engages.
pub(super) const SETUP_REAPPLY_DELAY: Duration = Duration::from_millis(500);

/// Flies to a single target and zeroes the vertical speed on arrival.
pub(super) async fn fly_to(f_comp: &FlightComputer, target: &Waypoint) -> Result<(), GuidanceError> {
    f_comp.status().report(Status::NavStarted { target: *target });
    setup_autopilot(f_comp, target).await?;
    fly_leg(f_comp, target, None).await?;
    f_comp.safe_stop().await;
    f_comp.status().report(Status::Arrived { leg: None });
    Ok(())
}

/// Applies the autopilot setup for `target` now and once more after
/// `SETUP_REAPPLY_DELAY`.
pub(super) async fn setup_autopilot(f_comp: &FlightComputer, target: &Waypoint) -> Result<(), GuidanceError> {
    f_comp.prepare_autopilot(target).await?;
    f_comp.sleep(SETUP_REAPPLY_DELAY).await?;
    f_comp.prepare_autopilot(target).await
}

/// Steers towards `target` once per `CYCLE` until it is inside the arrival
/// radius.
///
/// Unavailable position reads skip the cycle. Cancellation is observed at
/// the top of every cycle, before every command write and while sleeping.
pub(super) async fn fly_leg(
    f_comp: &FlightComputer,
    target: &Waypoint,
    leg: Option<usize>,
) -> Result<(), GuidanceError> {
    loop {
        if f_comp.is_cancelled() {
            return Err(GuidanceError::Cancelled);
        }
        let Some(current) = f_comp.current_position().await else {
            f_comp.sleep(READ_BACKOFF).await?;
            continue;
        };
        match ControlLaw::evaluate(&current, target) {
            Guidance::Arrived { .. } => return Ok(()),
            Guidance::Steer { cmd, dist_nm, alt_err_ft, bearing_deg, capture_altitude } => {
                f_comp.apply(&cmd, capture_altitude).await?;
                f_comp.status().report(Status::Progress { leg, dist_nm, alt_err_ft, bearing_deg });
            }
        }
        f_comp.sleep(CYCLE).await?;
    }
}
