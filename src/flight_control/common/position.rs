use super::geodesy;
use crate::flight_control::guidance_error::InputError;
use std::fmt::{Display, Formatter};

/// A geodetic position: decimal degrees and feet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    lat: f64,
    lon: f64,
    alt: f64,
}

impl Position {
    /// Creates a validated `Position`.
    ///
    /// Latitude must lie in `[-90, 90]`, longitude in `[-180, 180]` and all
    /// components must be finite.
    pub fn new(lat: f64, lon: f64, alt: f64) -> Result<Self, InputError> {
        if !lat.is_finite() || !lon.is_finite() || !alt.is_finite() {
            return Err(InputError::NotFinite("position"));
        }
        if !(-90.0..=90.0).contains(&lat) {
            return Err(InputError::LatitudeOutOfRange(lat));
        }
        if !(-180.0..=180.0).contains(&lon) {
            return Err(InputError::LongitudeOutOfRange(lon));
        }
        Ok(Self { lat, lon, alt })
    }

    /// Builds a position from simulator readings without range checks.
    pub(crate) fn from_sim(lat: f64, lon: f64, alt: f64) -> Self { Self { lat, lon, alt } }

    pub fn lat(&self) -> f64 { self.lat }
    pub fn lon(&self) -> f64 { self.lon }
    pub fn alt(&self) -> f64 { self.alt }

    /// Initial great-circle bearing towards `other`.
    pub fn bearing_to(&self, other: &Position) -> f64 {
        geodesy::bearing(self.lat, self.lon, other.lat, other.lon)
    }

    /// Horizontal great-circle distance to `other` in nautical miles.
    pub fn distance_nm_to(&self, other: &Position) -> f64 {
        geodesy::distance_nm(self.lat, self.lon, other.lat, other.lon)
    }
}

impl Display for Position {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "LAT {:.4} LON {:.4} ALT {:.0} ft", self.lat, self.lon, self.alt)
    }
}

/// A navigation target with the speed to hold on the way there.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Waypoint {
    pos: Position,
    speed_kt: f64,
}

impl Waypoint {
    pub const DEFAULT_SPEED_KT: f64 = 90.0;

    /// Creates a validated `Waypoint`; `speed_kt` defaults to
    /// `DEFAULT_SPEED_KT`.
    pub fn new(lat: f64, lon: f64, alt: f64, speed_kt: Option<f64>) -> Result<Self, InputError> {
        let pos = Position::new(lat, lon, alt)?;
        let speed = speed_kt.unwrap_or(Self::DEFAULT_SPEED_KT);
        if !speed.is_finite() {
            return Err(InputError::NotFinite("speed"));
        }
        if speed < 0.0 {
            return Err(InputError::Negative("speed", speed));
        }
        Ok(Self { pos, speed_kt: speed })
    }

    pub fn pos(&self) -> &Position { &self.pos }
    pub fn speed_kt(&self) -> f64 { self.speed_kt }
}

impl Display for Waypoint {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} SPD {:.0} kt", self.pos, self.speed_kt)
    }
}
