use super::takeoff_state::TakeoffState;
use crate::flight_control::flight_computer::{FlightComputer, ft_i32};
use crate::flight_control::guidance_error::GuidanceError;
use crate::flight_control::status::Status;
use crate::log;
use crate::vehicle::{SimEvent, SimVar};
use std::time::Duration;
use tokio::time::Instant;

/// Tuning of the automatic takeoff.
#[derive(Debug, Clone)]
pub struct TakeoffProfile {
    /// IAS at which the climb is commanded.
    pub rotation_speed_kt: f64,
    /// Height above the rotation altitude at which the climb levels off.
    pub climb_increment_ft: f64,
    pub climb_rate_fpm: i32,
    /// Altitude error that counts as having reached the level-off altitude.
    pub level_off_tolerance_ft: f64,
    /// Upper bound for the ground roll. `None` waits indefinitely.
    pub rotation_timeout: Option<Duration>,
    pub takeoff_throttle_percent: f64,
    pub takeoff_flaps_percent: f64,
    pub takeoff_trim: f64,
    /// Throttle axis value for cruise, roughly half of full authority.
    pub cruise_throttle_axis: i32,
}

impl Default for TakeoffProfile {
    fn default() -> Self {
        Self {
            rotation_speed_kt: 70.0,
            climb_increment_ft: 350.0,
            climb_rate_fpm: 1000,
            level_off_tolerance_ft: 50.0,
            rotation_timeout: Some(Duration::from_secs(120)),
            takeoff_throttle_percent: 100.0,
            takeoff_flaps_percent: 25.0,
            takeoff_trim: 100.0,
            cruise_throttle_axis: 6554,
        }
    }
}

/// Drives the aircraft from standstill to a stabilized climb-out.
pub(super) struct TakeoffSequencer<'a> {
    f_comp: &'a FlightComputer,
    profile: &'a TakeoffProfile,
    state: TakeoffState,
    level_off_alt: Option<f64>,
}

impl<'a> TakeoffSequencer<'a> {
    /// Attempts at capturing the rotation altitude before giving up.
    const ALT_CAPTURE_ATTEMPTS: usize = 5;
    const ALT_CAPTURE_RETRY: Duration = Duration::from_millis(500);

    pub(super) fn new(f_comp: &'a FlightComputer, profile: &'a TakeoffProfile) -> Self {
        Self { f_comp, profile, state: TakeoffState::Grounded, level_off_alt: None }
    }

    /// Runs all stages. Any error moves the sequence to `Failed`; nothing is
    /// retried.
    pub(super) async fn run(mut self) -> Result<(), GuidanceError> {
        match self.run_stages().await {
            Ok(()) => Ok(()),
            Err(GuidanceError::Cancelled) => Err(GuidanceError::Cancelled),
            Err(e) => {
                self.state = TakeoffState::Failed;
                self.f_comp.status().report(Status::TakeoffStage(self.state));
                Err(e)
            }
        }
    }

    async fn run_stages(&mut self) -> Result<(), GuidanceError> {
        while !self.state.is_terminal() {
            match self.state {
                TakeoffState::Grounded => self.configure_for_takeoff().await?,
                TakeoffState::Accelerating => self.wait_rotation_speed().await?,
                TakeoffState::Rotating => self.command_climb().await?,
                TakeoffState::Climbing => self.wait_level_off().await?,
                TakeoffState::LevelOff => self.hand_off_to_cruise().await?,
                TakeoffState::CruiseHandoff | TakeoffState::Failed => break,
            }
            self.advance();
        }
        Ok(())
    }

    fn advance(&mut self) {
        if let Some(next) = self.state.next() {
            log!("Takeoff {} -> {next}", self.state);
            self.state = next;
            self.f_comp.status().report(Status::TakeoffStage(next));
        }
    }

    fn poll_interval(&self) -> Duration {
        self.state.poll_interval().unwrap_or(Duration::from_secs(1))
    }

    /// Brakes off, full throttle, takeoff flaps and rotation trim.
    async fn configure_for_takeoff(&self) -> Result<(), GuidanceError> {
        let f = self.f_comp;
        f.ev(SimEvent::ParkingBrakes, None).await?;
        f.set(SimVar::ThrottleLever, self.profile.takeoff_throttle_percent).await?;
        f.set(SimVar::FlapsHandlePercent, self.profile.takeoff_flaps_percent).await?;
        f.set(SimVar::ElevatorTrimPosition, self.profile.takeoff_trim).await?;
        f.status().report(Status::TakeoffStarted);
        Ok(())
    }

    async fn wait_rotation_speed(&self) -> Result<(), GuidanceError> {
        let start = Instant::now();
        loop {
            if let Some(ias) = self.f_comp.read(SimVar::AirspeedIndicated).await {
                if ias >= self.profile.rotation_speed_kt {
                    return Ok(());
                }
            }
            if let Some(timeout) = self.profile.rotation_timeout {
                if start.elapsed() >= timeout {
                    return Err(GuidanceError::RotationTimeout(timeout));
                }
            }
            self.f_comp.sleep(self.poll_interval()).await?;
        }
    }

    /// Captures the current altitude, engages the autopilot and commands the
    /// climb to the level-off altitude.
    async fn command_climb(&mut self) -> Result<(), GuidanceError> {
        let f = self.f_comp;
        let mut captured = None;
        for _ in 0..Self::ALT_CAPTURE_ATTEMPTS {
            captured = f.read(SimVar::PlaneAltitude).await;
            if captured.is_some() {
                break;
            }
            f.sleep(Self::ALT_CAPTURE_RETRY).await?;
        }
        let cur_alt = captured.ok_or(GuidanceError::NoSimData(SimVar::PlaneAltitude))?;
        let target_alt = cur_alt + self.profile.climb_increment_ft;

        f.engage_autopilot().await?;
        f.ev(SimEvent::ApAltVarSetEnglish, Some(ft_i32(target_alt))).await?;
        f.ev(SimEvent::ApVsSetEnglish, Some(self.profile.climb_rate_fpm)).await?;
        f.status().report(Status::ClimbingTo { target_alt_ft: target_alt });
        self.level_off_alt = Some(target_alt);
        Ok(())
    }

    /// Polls the altitude until it is within tolerance of the level-off
    /// altitude, then zeroes the vertical speed and releases ALT HOLD so a
    /// later navigation command does not fight a stale lock.
    async fn wait_level_off(&self) -> Result<(), GuidanceError> {
        let f = self.f_comp;
        let target_alt = self.level_off_alt.ok_or(GuidanceError::NoSimData(SimVar::PlaneAltitude))?;
        loop {
            if let Some(alt) = f.read(SimVar::PlaneAltitude).await {
                if (alt - target_alt).abs() < self.profile.level_off_tolerance_ft {
                    break;
                }
            }
            f.sleep(self.poll_interval()).await?;
        }
        f.ev(SimEvent::ApVsSetEnglish, Some(0)).await?;
        f.ev(SimEvent::ApAltHoldOff, None).await?;
        Ok(())
    }

    async fn hand_off_to_cruise(&self) -> Result<(), GuidanceError> {
        self.f_comp.ev(SimEvent::ThrottleAxisSetEx1, Some(self.profile.cruise_throttle_axis)).await?;
        self.f_comp.status().report(Status::LevelFlight);
        Ok(())
    }
}
