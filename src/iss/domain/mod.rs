mod position_response;

pub use position_response::{PositionResponse, ReportedPosition};
