use crate::app_config::AppConfig;
use crate::domain::PositionSample;
use crate::iss::domain::PositionResponse;
use reqwest::Client;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, instrument};

const SUCCESS_MESSAGE: &str = "success";

/// Fetches one position sample from the configured endpoint.
#[instrument(skip(client, config))]
pub async fn fetch_position(client: &Client, config: &AppConfig) -> Result<PositionSample, FetchError> {
    let body = client
        .get(config.iss().url())
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;

    let value: Value = serde_json::from_str(&body).map_err(FetchError::InvalidBody)?;
    let response: PositionResponse = serde_json::from_value(value).map_err(FetchError::Malformed)?;

    if response.message != SUCCESS_MESSAGE {
        return Err(FetchError::Failure {
            message: response.message,
        });
    }

    let sample = PositionSample {
        latitude: response.iss_position.latitude,
        longitude: response.iss_position.longitude,
        timestamp: response.timestamp,
    };
    debug!("Fetched position {} at {}", sample, sample.timestamp);

    Ok(sample)
}

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("request error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("response body is not JSON: {0}")]
    InvalidBody(serde_json::Error),
    #[error("API reported '{message}' instead of '{SUCCESS_MESSAGE}'")]
    Failure { message: String },
    #[error("response is missing a valid position: {0}")]
    Malformed(serde_json::Error),
}
