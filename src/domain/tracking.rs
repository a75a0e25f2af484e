use crate::domain::PositionSample;

/// One computed speed measurement paired with the position that produced it.
#[derive(Clone, Debug, PartialEq)]
pub struct TrackingRecord {
    pub position: PositionSample,
    pub timestamp: i64, // Unix epoch seconds
    pub speed: f64,     // In m/s
}

/// The full output of one sampling session, records in chronological order.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionResult {
    pub records: Vec<TrackingRecord>,
    pub average_speed: f64, // In m/s, rounded to 2 decimals
}
