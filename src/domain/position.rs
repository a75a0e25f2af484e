use std::fmt::Display;

/// A single reported latitude/longitude/timestamp reading of the tracked satellite.
#[derive(Clone, Debug, PartialEq)]
pub struct PositionSample {
    pub latitude: f64,  // In degrees
    pub longitude: f64, // In degrees
    pub timestamp: i64, // Unix epoch seconds
}

impl Display for PositionSample {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.latitude, self.longitude)
    }
}
