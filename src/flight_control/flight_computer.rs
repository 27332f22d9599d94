use super::common::{
    control_law::{ControlCommand, ControlLaw},
    position::{Position, Waypoint},
};
use super::guidance_error::GuidanceError;
use super::status::{Status, StatusReporter};
use crate::keychain::Keychain;
use crate::vehicle::{Dispatch, SimEvent, SimVar, VehicleInterface};
use crate::{error, event};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// One task's handle on the vehicle.
///
/// Every guidance write goes through a cancellation gate: once the owning
/// task's token is cancelled, further heading/altitude/speed commands fail
/// with `GuidanceError::Cancelled` and only `safe_stop` still reaches the
/// simulator.
pub struct FlightComputer {
    vehicle: Arc<dyn VehicleInterface>,
    status: StatusReporter,
    c_tok: CancellationToken,
}

impl FlightComputer {
    /// Pause between toggling heading hold off and on again.
    const HDG_HOLD_TOGGLE_DELAY: Duration = Duration::from_millis(50);
    /// Throttle axis value applied by the autopilot setup.
    pub const SETUP_THROTTLE_AXIS: i32 = 8192;

    pub fn new(keychain: &Keychain, c_tok: CancellationToken) -> Self {
        Self { vehicle: keychain.vehicle(), status: keychain.status().clone(), c_tok }
    }

    pub fn status(&self) -> &StatusReporter { &self.status }

    pub fn is_cancelled(&self) -> bool { self.c_tok.is_cancelled() }

    fn ensure_live(&self) -> Result<(), GuidanceError> {
        if self.c_tok.is_cancelled() { Err(GuidanceError::Cancelled) } else { Ok(()) }
    }

    /// Reads a single variable; `None` while the simulator cannot deliver it.
    pub async fn read(&self, var: SimVar) -> Option<f64> { self.vehicle.get(var).await }

    /// Reads latitude, longitude and altitude. `None` if any is unavailable.
    pub async fn current_position(&self) -> Option<Position> {
        let lat = self.vehicle.get(SimVar::PlaneLatitude).await?;
        let lon = self.vehicle.get(SimVar::PlaneLongitude).await?;
        let alt = self.vehicle.get(SimVar::PlaneAltitude).await?;
        Some(Position::from_sim(lat, lon, alt))
    }

    /// Writes a simulation variable unless the task has been cancelled.
    pub async fn set(&self, var: SimVar, value: f64) -> Result<(), GuidanceError> {
        self.ensure_live()?;
        self.vehicle.set(var, value).await?;
        Ok(())
    }

    /// Finds and invokes a simulator event unless the task has been cancelled.
    /// Unbound events are skipped.
    pub async fn ev(&self, event: SimEvent, arg: Option<i32>) -> Result<Dispatch, GuidanceError> {
        self.ensure_live()?;
        let res = self.vehicle.trigger(event, arg).await?;
        if res == Dispatch::Unbound {
            event!("{event} not bound, skipping");
        }
        Ok(res)
    }

    /// Engages the autopilot master; a missing binding is worth a warning
    /// since no autopilot target will take effect without it.
    pub async fn engage_autopilot(&self) -> Result<(), GuidanceError> {
        if self.ev(SimEvent::ApMaster, None).await? == Dispatch::Unbound {
            self.status.report(Status::Warning(
                "AP_MASTER is not bound, autopilot targets will have no effect".to_string(),
            ));
        }
        Ok(())
    }

    /// Sleeps for `dur`, returning early with `Cancelled` once the task's
    /// token is cancelled.
    pub async fn sleep(&self, dur: Duration) -> Result<(), GuidanceError> {
        tokio::select! {
            () = self.c_tok.cancelled() => Err(GuidanceError::Cancelled),
            () = tokio::time::sleep(dur) => Ok(()),
        }
    }

    /// Points the autopilot at `target`: heading bug, altitude and speed
    /// targets, an initial vertical speed towards the target altitude, clean
    /// configuration and cruise throttle.
    pub async fn prepare_autopilot(&self, target: &Waypoint) -> Result<(), GuidanceError> {
        self.ev(SimEvent::ApAltHoldOff, None).await?;
        let current = self.current_position().await;

        self.engage_autopilot().await?;
        if let Some(cur) = &current {
            let hdg = ControlLaw::heading(cur, target.pos());
            self.ev(SimEvent::HeadingBugSet, Some(hdg)).await?;
        } else {
            event!("Position unavailable during autopilot setup, heading follows on first cycle");
        }
        self.ev(SimEvent::ApHdgHoldOff, None).await?;
        self.sleep(Self::HDG_HOLD_TOGGLE_DELAY).await?;
        self.ev(SimEvent::ApHdgHoldOn, None).await?;

        self.ev(SimEvent::ApAltVarSetEnglish, Some(ft_i32(target.pos().alt()))).await?;
        let initial_vs = current
            .map_or(0, |cur| ControlLaw::setup_vertical_speed(cur.alt(), target.pos().alt()));
        self.ev(SimEvent::ApVsSetEnglish, Some(initial_vs)).await?;
        self.ev(SimEvent::ApSpdVarSet, Some(ft_i32(target.speed_kt()))).await?;

        self.set(SimVar::FlapsHandlePercent, 0.0).await?;
        self.set(SimVar::ElevatorTrimPosition, 0.0).await?;
        self.ev(SimEvent::ThrottleAxisSetEx1, Some(Self::SETUP_THROTTLE_AXIS)).await?;
        self.ev(SimEvent::ApAutothrottleArm, None).await?;
        Ok(())
    }

    /// Applies one control cycle's command and re-asserts heading hold. ALT
    /// HOLD is re-engaged only once the target altitude is being captured.
    pub async fn apply(&self, cmd: &ControlCommand, capture_altitude: bool) -> Result<(), GuidanceError> {
        self.ev(SimEvent::HeadingBugSet, Some(cmd.heading_bug_deg)).await?;
        self.ev(SimEvent::ApHdgHoldOn, None).await?;
        self.ev(SimEvent::ApAltVarSetEnglish, Some(ft_i32(cmd.target_altitude_ft))).await?;
        self.ev(SimEvent::ApVsSetEnglish, Some(cmd.vertical_speed_fpm)).await?;
        self.ev(SimEvent::ApSpdVarSet, Some(ft_i32(cmd.target_speed_kt))).await?;
        if capture_altitude {
            self.ev(SimEvent::ApAltHoldOn, None).await?;
        }
        Ok(())
    }

    /// Zeroes the vertical speed command. Bypasses the cancellation gate;
    /// this is the write a cancelled task ends on.
    pub async fn safe_stop(&self) {
        if let Err(e) = self.vehicle.trigger(SimEvent::ApVsSetEnglish, Some(0)).await {
            error!("Could not zero vertical speed: {e}");
        }
    }
}

/// Rounds a feet/knots value to the integer argument of a simulator event.
#[allow(clippy::cast_possible_truncation)]
pub fn ft_i32(v: f64) -> i32 { v.round().clamp(f64::from(i32::MIN), f64::from(i32::MAX)) as i32 }
