use crate::vehicle::{SimVar, VehicleError};
use std::fmt::{Display, Formatter};
use std::time::Duration;

/// Malformed parameters supplied by the operator or a scenario file.
#[derive(Debug)]
pub enum InputError {
    LatitudeOutOfRange(f64),
    LongitudeOutOfRange(f64),
    HeadingOutOfRange(f64),
    NotFinite(&'static str),
    Negative(&'static str, f64),
    NotPositive(&'static str, f64),
    MalformedCoordinates(String),
    EmptyScenario,
    File(String),
    Json(String),
}

impl Display for InputError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            InputError::LatitudeOutOfRange(v) => write!(f, "latitude {v} outside [-90, 90]"),
            InputError::LongitudeOutOfRange(v) => write!(f, "longitude {v} outside [-180, 180]"),
            InputError::HeadingOutOfRange(v) => write!(f, "heading {v} outside [0, 360)"),
            InputError::NotFinite(what) => write!(f, "{what} is not a finite number"),
            InputError::Negative(what, v) => write!(f, "{what} must not be negative, got {v}"),
            InputError::NotPositive(what, v) => write!(f, "{what} must be positive, got {v}"),
            InputError::MalformedCoordinates(raw) => {
                write!(f, "cannot read coordinates from {raw:?}, expected LAT,LON (e.g. 39.989,36.431)")
            }
            InputError::EmptyScenario => write!(f, "scenario is empty"),
            InputError::File(e) => write!(f, "cannot read file: {e}"),
            InputError::Json(e) => write!(f, "malformed json: {e}"),
        }
    }
}

impl std::error::Error for InputError {}

impl From<std::io::Error> for InputError {
    fn from(value: std::io::Error) -> Self { InputError::File(value.to_string()) }
}

impl From<serde_json::Error> for InputError {
    fn from(value: serde_json::Error) -> Self { InputError::Json(value.to_string()) }
}

/// Everything that can end a guidance task early.
#[derive(Debug)]
pub enum GuidanceError {
    /// The supervisor asked the task to stop.
    Cancelled,
    /// The simulator bridge failed on a write or dispatch.
    Vehicle(VehicleError),
    /// A variable needed to start the operation could not be read.
    NoSimData(SimVar),
    /// IAS never reached rotation speed within the allowed time.
    RotationTimeout(Duration),
}

impl Display for GuidanceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            GuidanceError::Cancelled => write!(f, "cancelled"),
            GuidanceError::Vehicle(e) => write!(f, "vehicle error: {e}"),
            GuidanceError::NoSimData(var) => write!(f, "no sim data for {var}"),
            GuidanceError::RotationTimeout(t) => {
                write!(f, "rotation speed not reached within {}s", t.as_secs())
            }
        }
    }
}

impl std::error::Error for GuidanceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GuidanceError::Vehicle(e) => Some(e),
            _ => None,
        }
    }
}

impl From<VehicleError> for GuidanceError {
    fn from(value: VehicleError) -> Self { GuidanceError::Vehicle(value) }
}
