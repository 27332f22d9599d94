use crate::flight_control::InputError;
use regex::Regex;
use std::sync::LazyLock;

static COORD_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*([+-]?\d+(?:\.\d+)?)\s*[,;]\s*([+-]?\d+(?:\.\d+)?)\s*$").unwrap()
});

/// Parses a `LAT,LON` pair in decimal degrees. Range checks are left to
/// `Position::new`.
pub(super) fn parse_coordinates(raw: &str) -> Result<(f64, f64), InputError> {
    let malformed = || InputError::MalformedCoordinates(raw.to_string());
    let caps = COORD_REGEX.captures(raw).ok_or_else(malformed)?;
    let lat = caps[1].parse::<f64>().map_err(|_| malformed())?;
    let lon = caps[2].parse::<f64>().map_err(|_| malformed())?;
    Ok((lat, lon))
}
