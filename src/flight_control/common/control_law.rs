use super::position::{Position, Waypoint};

/// Autopilot targets for one control cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlCommand {
    /// Heading bug in whole degrees, `0..360`.
    pub heading_bug_deg: i32,
    /// Commanded vertical speed in feet per minute.
    pub vertical_speed_fpm: i32,
    pub target_altitude_ft: f64,
    pub target_speed_kt: f64,
}

/// Result of evaluating the control law against a target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Guidance {
    /// Inside the arrival radius; no further steering required.
    Arrived { dist_nm: f64 },
    Steer {
        cmd: ControlCommand,
        dist_nm: f64,
        alt_err_ft: f64,
        bearing_deg: f64,
        /// Close enough in both axes to let ALT HOLD capture the target altitude.
        capture_altitude: bool,
    },
}

/// Proportional heading/vertical-speed guidance with output saturation.
pub struct ControlLaw;

impl ControlLaw {
    /// Altitude error below which no vertical speed is commanded.
    pub const ALT_DEAD_BAND_FT: f64 = 25.0;
    /// Vertical speed per foot of altitude error.
    pub const VS_GAIN: f64 = 1.5;
    /// Saturation of the commanded vertical speed.
    pub const MAX_VS_FPM: f64 = 500.0;
    /// Horizontal distance that counts as arrival.
    pub const ARRIVAL_RADIUS_NM: f64 = 0.3;
    /// Altitude error inside which ALT HOLD is re-asserted near the target.
    pub const ALT_CAPTURE_BAND_FT: f64 = 100.0;
    pub const ALT_CAPTURE_RADIUS_NM: f64 = 3.0;
    /// Vertical speed used by the initial autopilot setup before the first cycle.
    pub const SETUP_VS_FPM: i32 = 800;

    /// Vertical speed command for a given altitude error.
    #[allow(clippy::cast_possible_truncation)]
    pub fn vertical_speed(alt_err_ft: f64) -> i32 {
        if alt_err_ft.abs() <= Self::ALT_DEAD_BAND_FT {
            return 0;
        }
        (alt_err_ft * Self::VS_GAIN).clamp(-Self::MAX_VS_FPM, Self::MAX_VS_FPM).round() as i32
    }

    /// Heading bug towards `target`, rounded to whole degrees.
    #[allow(clippy::cast_possible_truncation)]
    pub fn heading(current: &Position, target: &Position) -> i32 {
        (current.bearing_to(target).round() as i32).rem_euclid(360)
    }

    /// Vertical speed handed to the autopilot when a new target is set up.
    pub fn setup_vertical_speed(current_alt_ft: f64, target_alt_ft: f64) -> i32 {
        if target_alt_ft - current_alt_ft > 0.0 { Self::SETUP_VS_FPM } else { -Self::SETUP_VS_FPM }
    }

    pub fn has_arrived(dist_nm: f64) -> bool { dist_nm < Self::ARRIVAL_RADIUS_NM }

    /// Evaluates one control cycle from `current` towards `target`.
    pub fn evaluate(current: &Position, target: &Waypoint) -> Guidance {
        let dist_nm = current.distance_nm_to(target.pos());
        if Self::has_arrived(dist_nm) {
            return Guidance::Arrived { dist_nm };
        }
        let alt_err_ft = target.pos().alt() - current.alt();
        let cmd = ControlCommand {
            heading_bug_deg: Self::heading(current, target.pos()),
            vertical_speed_fpm: Self::vertical_speed(alt_err_ft),
            target_altitude_ft: target.pos().alt(),
            target_speed_kt: target.speed_kt(),
        };
        Guidance::Steer {
            cmd,
            dist_nm,
            alt_err_ft,
            bearing_deg: current.bearing_to(target.pos()),
            capture_altitude: alt_err_ft.abs() < Self::ALT_CAPTURE_BAND_FT
                && dist_nm < Self::ALT_CAPTURE_RADIUS_NM,
        }
    }
}
