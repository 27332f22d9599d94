use crate::flight_control::{InputError, Scenario, StreamFrame, Waypoint};
use serde::Deserialize;
use std::path::Path;

const FEET_PER_METER: f64 = 3.280_84;

/// One scenario waypoint as written by hand or exported by a planner.
#[derive(Deserialize, Debug)]
struct WaypointRecord {
    #[serde(alias = "latitude")]
    lat: f64,
    #[serde(alias = "longitude")]
    lon: f64,
    #[serde(alias = "altitude")]
    alt: f64,
    #[serde(default, alias = "speed")]
    spd: Option<f64>,
}

/// One frame of a recorded or generated flight. Altitude is given either in
/// feet (`alt`) or in metres (`altitude_m`).
#[derive(Deserialize, Debug)]
struct FrameRecord {
    #[serde(default, alias = "latitude")]
    lat: Option<f64>,
    #[serde(default, alias = "longitude")]
    lon: Option<f64>,
    #[serde(default, alias = "altitude")]
    alt: Option<f64>,
    #[serde(default)]
    altitude_m: Option<f64>,
    #[serde(default, alias = "heading")]
    heading_deg: Option<f64>,
    #[serde(default, alias = "pitch")]
    pitch_deg: Option<f64>,
    #[serde(default, alias = "roll", alias = "bank")]
    roll_deg: Option<f64>,
}

impl From<FrameRecord> for StreamFrame {
    fn from(rec: FrameRecord) -> Self {
        StreamFrame {
            lat: rec.lat,
            lon: rec.lon,
            alt: rec.altitude_m.map(|m| m * FEET_PER_METER).or(rec.alt),
            heading_deg: rec.heading_deg,
            pitch_deg: rec.pitch_deg,
            roll_deg: rec.roll_deg,
        }
    }
}

/// Parses a JSON array of waypoints into a validated scenario.
pub(super) fn parse_scenario(json: &str) -> Result<Scenario, InputError> {
    let records: Vec<WaypointRecord> = serde_json::from_str(json)?;
    let waypoints = records
        .into_iter()
        .map(|r| Waypoint::new(r.lat, r.lon, r.alt, r.spd))
        .collect::<Result<Vec<_>, _>>()?;
    Scenario::new(waypoints)
}

/// Parses a JSON array of stream frames.
pub(super) fn parse_frames(json: &str) -> Result<Vec<StreamFrame>, InputError> {
    let records: Vec<FrameRecord> = serde_json::from_str(json)?;
    Ok(records.into_iter().map(StreamFrame::from).collect())
}

pub(super) async fn load_scenario(path: &Path) -> Result<Scenario, InputError> {
    parse_scenario(&tokio::fs::read_to_string(path).await?)
}

pub(super) async fn load_frames(path: &Path) -> Result<Vec<StreamFrame>, InputError> {
    parse_frames(&tokio::fs::read_to_string(path).await?)
}
