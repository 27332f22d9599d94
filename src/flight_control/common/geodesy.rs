//! Spherical-earth helpers for bearings and distances between coordinates.

/// Mean earth radius in nautical miles.
pub const EARTH_RADIUS_NM: f64 = 3440.065;
/// Metres per nautical mile.
pub const METERS_PER_NM: f64 = 1852.0;
/// Approximate metres per degree of latitude.
const METERS_PER_DEG: f64 = 111_111.0;

/// Initial great-circle bearing from point 1 to point 2.
///
/// # Arguments
/// - `lat1`, `lon1`: Start coordinate in decimal degrees.
/// - `lat2`, `lon2`: End coordinate in decimal degrees.
///
/// # Returns
/// - The bearing in degrees, normalized into `[0, 360)`. Identical points
///   yield `0`.
pub fn bearing(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let (rlat1, rlat2) = (lat1.to_radians(), lat2.to_radians());
    let dlon = (lon2 - lon1).to_radians();
    let x = dlon.sin() * rlat2.cos();
    let y = rlat1.cos() * rlat2.sin() - rlat1.sin() * rlat2.cos() * dlon.cos();
    if x == 0.0 && y == 0.0 {
        return 0.0;
    }
    let brg = x.atan2(y).to_degrees().rem_euclid(360.0);
    // rem_euclid may round up to exactly 360 for tiny negative angles
    if brg >= 360.0 { 0.0 } else { brg }
}

/// Haversine great-circle distance between two coordinates.
///
/// # Returns
/// - The distance in nautical miles.
pub fn distance_nm(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let dlat = (lat2 - lat1).to_radians();
    let dlon = (lon2 - lon1).to_radians();
    let a = (dlat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (dlon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_NM * a.sqrt().min(1.0).asin()
}

/// Converts a north-south distance into degrees of latitude.
pub fn meters_to_deg_lat(m: f64) -> f64 { m / METERS_PER_DEG }

/// Converts an east-west distance at `latitude` into degrees of longitude.
pub fn meters_to_deg_lon(m: f64, latitude: f64) -> f64 {
    m / (METERS_PER_DEG * latitude.to_radians().cos())
}

/// Wraps a longitude into `[-180, 180)`.
pub fn wrap_lon(lon: f64) -> f64 { (lon + 180.0).rem_euclid(360.0) - 180.0 }
