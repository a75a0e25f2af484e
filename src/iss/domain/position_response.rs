use crate::iss::coordinate_deserializer;
use serde::Deserialize;

// API: http://open-notify.org/Open-Notify-API/ISS-Location-Now/
#[derive(Debug, Deserialize)]
pub struct PositionResponse {
    pub message: String,
    pub timestamp: i64,
    pub iss_position: ReportedPosition,
}

#[derive(Debug, Deserialize)]
pub struct ReportedPosition {
    #[serde(deserialize_with = "coordinate_deserializer::deserialize")]
    pub latitude: f64,
    #[serde(deserialize_with = "coordinate_deserializer::deserialize")]
    pub longitude: f64,
}
