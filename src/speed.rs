use crate::domain::PositionSample;
use thiserror::Error;

const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Great-circle surface distance between two samples in meters, haversine
/// over a spherical Earth.
pub fn great_circle_distance(from: &PositionSample, to: &PositionSample) -> f64 {
    let dlat = (to.latitude - from.latitude).to_radians();
    let dlon = (to.longitude - from.longitude).to_radians();
    let lat_from = from.latitude.to_radians();
    let lat_to = to.latitude.to_radians();

    let a = (dlat / 2.0).sin().powi(2) + lat_from.cos() * lat_to.cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_M * c
}

/// Ground speed in m/s between two consecutive samples.
pub fn ground_speed(t0: &PositionSample, t1: &PositionSample) -> Result<f64, SpeedError> {
    let elapsed = t1.timestamp - t0.timestamp;
    if elapsed <= 0 {
        return Err(SpeedError::NonPositiveElapsed { seconds: elapsed });
    }

    Ok(great_circle_distance(t0, t1) / elapsed as f64)
}

#[derive(Error, Debug)]
pub enum SpeedError {
    #[error("non-positive elapsed time of {seconds} s between samples")]
    NonPositiveElapsed { seconds: i64 },
}
