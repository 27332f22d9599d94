use crate::flight_control::common::{
    geodesy::{self, METERS_PER_NM},
    position::{Position, Waypoint},
};
use crate::flight_control::flight_computer::{FlightComputer, ft_i32};
use crate::flight_control::guidance_error::{GuidanceError, InputError};
use crate::flight_control::status::Status;
use crate::vehicle::{SimEvent, SimVar};
use std::time::Duration;

/// A staged relocation of the aircraft onto `target`.
#[derive(Debug, Clone, PartialEq)]
pub struct TeleportRequest {
    target: Waypoint,
    heading: Option<f64>,
    step_m: f64,
}

impl TeleportRequest {
    pub const DEFAULT_STEP_M: f64 = 5.0;

    /// Creates a validated request. `heading` must lie in `[0, 360)`,
    /// `step_m` must be positive and defaults to `DEFAULT_STEP_M`.
    pub fn new(target: Waypoint, heading: Option<f64>, step_m: Option<f64>) -> Result<Self, InputError> {
        if let Some(hdg) = heading {
            if !hdg.is_finite() {
                return Err(InputError::NotFinite("heading"));
            }
            if !(0.0..360.0).contains(&hdg) {
                return Err(InputError::HeadingOutOfRange(hdg));
            }
        }
        let step = step_m.unwrap_or(Self::DEFAULT_STEP_M);
        if !step.is_finite() {
            return Err(InputError::NotFinite("step size"));
        }
        if step <= 0.0 {
            return Err(InputError::NotPositive("step size", step));
        }
        Ok(Self { target, heading, step_m: step })
    }

    pub fn target(&self) -> &Waypoint { &self.target }
    pub fn heading(&self) -> Option<f64> { self.heading }
    pub fn step_m(&self) -> f64 { self.step_m }
}

/// Per-step increments of a staged teleport.
#[derive(Debug, Clone, Copy)]
struct StepPlan {
    steps: usize,
    bearing_deg: f64,
    d_lat: f64,
    d_lon: f64,
    d_alt: f64,
}

impl StepPlan {
    /// Latitude bound for the longitude increment, which diverges at the poles.
    const MAX_PLAN_LAT: f64 = 89.0;

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    fn between(start: &Position, target: &Position, step_m: f64) -> Self {
        let bearing_deg = start.bearing_to(target);
        let total_m = start.distance_nm_to(target) * METERS_PER_NM;
        let steps = ((total_m / step_m).floor() as usize).max(1);
        let brg = bearing_deg.to_radians();
        Self {
            steps,
            bearing_deg,
            d_lat: geodesy::meters_to_deg_lat(step_m * brg.cos()),
            d_lon: geodesy::meters_to_deg_lon(
                step_m * brg.sin(),
                start.lat().clamp(-Self::MAX_PLAN_LAT, Self::MAX_PLAN_LAT),
            ),
            d_alt: (target.alt() - start.alt()) / steps as f64,
        }
    }
}

const STEP_INTERVAL: Duration = Duration::from_millis(100);

/// Moves the aircraft onto the target in small position writes, then snaps
/// it onto the exact target and hands over to the autopilot.
///
/// A cancelled teleport stops where it is and does not snap.
pub(super) async fn teleport(f_comp: &FlightComputer, req: &TeleportRequest) -> Result<(), GuidanceError> {
    let start = f_comp.current_position().await.ok_or(GuidanceError::NoSimData(SimVar::PlaneLatitude))?;
    let target = req.target();
    let plan = StepPlan::between(&start, target.pos(), req.step_m());
    f_comp.status().report(Status::TeleportStarted { steps: plan.steps, step_m: req.step_m() });

    let hdg = ft_i32(req.heading().unwrap_or(plan.bearing_deg)).rem_euclid(360);
    f_comp.ev(SimEvent::HeadingBugSet, Some(hdg)).await?;
    f_comp.ev(SimEvent::ApHdgHoldOn, None).await?;

    let (mut lat, mut lon, mut alt) = (start.lat(), start.lon(), start.alt());
    for step in 1..=plan.steps {
        if f_comp.is_cancelled() {
            return Err(GuidanceError::Cancelled);
        }
        lat = (lat + plan.d_lat).clamp(-90.0, 90.0);
        lon = geodesy::wrap_lon(lon + plan.d_lon);
        alt += plan.d_alt;
        write_position(f_comp, lat, lon, alt).await?;
        f_comp.ev(SimEvent::ApAltVarSetEnglish, Some(ft_i32(alt))).await?;
        let pos = Position::from_sim(lat, lon, alt);
        f_comp.status().report(Status::TeleportStep { step, steps: plan.steps, pos });
        f_comp.sleep(STEP_INTERVAL).await?;
    }

    let end = target.pos();
    write_position(f_comp, end.lat(), end.lon(), end.alt()).await?;
    f_comp.status().report(Status::TeleportComplete);

    f_comp.engage_autopilot().await?;
    f_comp.ev(SimEvent::ApAltVarSetEnglish, Some(ft_i32(end.alt()))).await?;
    f_comp.ev(SimEvent::ApVsSetEnglish, Some(0)).await?;
    f_comp.ev(SimEvent::ApSpdVarSet, Some(ft_i32(target.speed_kt()))).await?;
    f_comp.ev(SimEvent::ApAutothrottleArm, None).await?;
    f_comp.ev(SimEvent::ThrottleAxisSetEx1, Some(FlightComputer::SETUP_THROTTLE_AXIS)).await?;
    Ok(())
}

async fn write_position(f_comp: &FlightComputer, lat: f64, lon: f64, alt: f64) -> Result<(), GuidanceError> {
    f_comp.set(SimVar::PlaneLatitude, lat).await?;
    f_comp.set(SimVar::PlaneLongitude, lon).await?;
    f_comp.set(SimVar::PlaneAltitude, alt).await
}
