use crate::app_config::AppConfig;
use crate::domain::{PositionSample, SessionResult, TrackingRecord};
use crate::iss::{self, FetchError};
use crate::map_renderer::{self, RenderError};
use crate::speed::{self, SpeedError};
use reqwest::Client;
use std::fs;
use std::time::Duration;
use thiserror::Error;
use tokio::time::sleep;
use tracing::{debug, info, instrument};

/// Samples the satellite position at a fixed interval and derives ground
/// speeds. Holds the session's write-once start reference for diagnostics.
pub struct IssTracker {
    client: Client,
    config: AppConfig,
    start_position: Option<PositionSample>,
}

impl IssTracker {
    pub fn new(client: Client, config: AppConfig) -> Self {
        IssTracker {
            client,
            config,
            start_position: None,
        }
    }

    /// Fetches two positions per period, one sleep apart, and derives one
    /// speed value per period plus the session average.
    ///
    /// Each iteration performs its own pair of fetches rather than reusing
    /// the previous iteration's second sample, so a session issues
    /// `2 * n_periods` requests.
    #[instrument(skip(self))]
    pub async fn sample(&mut self, period_seconds: u64, n_periods: usize) -> Result<SessionResult, TrackerError> {
        if period_seconds == 0 {
            return Err(TrackerError::InvalidPeriod);
        }
        if n_periods == 0 {
            return Err(TrackerError::InvalidPeriodCount);
        }

        info!("Sampling {} periods of {} s...", n_periods, period_seconds);

        let mut records = Vec::with_capacity(n_periods);
        for i in 0..n_periods {
            let t0 = iss::fetch_position(&self.client, &self.config).await?;
            if i == 0 {
                debug!("Session start reference {} at {}", t0, t0.timestamp);
                self.start_position = Some(t0.clone());
            }

            sleep(Duration::from_secs(period_seconds)).await;

            let t1 = iss::fetch_position(&self.client, &self.config).await?;
            let speed = speed::ground_speed(&t0, &t1)?;

            println!("Speed of ISS: {:.2} m/s, at gps coords: {}", speed, t1);
            let timestamp = t1.timestamp;
            records.push(TrackingRecord {
                position: t1,
                timestamp,
                speed,
            });
        }

        let average_speed =
            round_to_2_decimals(records.iter().map(|record| record.speed).sum::<f64>() / records.len() as f64);
        println!("Average speed of ISS: {average_speed} m/s");
        info!(
            "Sampling {} periods of {} s... OK, average speed {} m/s",
            n_periods, period_seconds, average_speed
        );

        Ok(SessionResult {
            records,
            average_speed,
        })
    }

    /// The first position of the most recent session, for diagnostics.
    pub fn start_reference(&self) -> Option<&PositionSample> {
        self.start_position.as_ref()
    }

    /// Runs a sampling session and renders the sampled path to the configured
    /// map output file.
    #[instrument(skip(self))]
    pub async fn sample_and_render(&mut self, period_seconds: u64, n_periods: usize) -> Result<SessionResult, TrackerError> {
        let session = self.sample(period_seconds, n_periods).await?;

        let coordinates: Vec<(f64, f64)> = session
            .records
            .iter()
            .map(|record| (record.position.latitude, record.position.longitude))
            .collect();
        let timestamps: Vec<i64> = session.records.iter().map(|record| record.timestamp).collect();

        let svg = map_renderer::render(
            &coordinates,
            &timestamps,
            session.average_speed,
            period_seconds,
            self.config.map(),
        )?;

        let output = self.config.map().output();
        fs::write(output, svg).map_err(|source| TrackerError::WriteMap {
            path: output.to_string(),
            source,
        })?;
        info!("Wrote travel path map to {}", output);

        Ok(session)
    }
}

fn round_to_2_decimals(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("period must be a positive number of seconds")]
    InvalidPeriod,
    #[error("n_periods must be a positive integer")]
    InvalidPeriodCount,
    #[error("position fetch failed: {0}")]
    Fetch(#[from] FetchError),
    #[error("speed calculation failed: {0}")]
    Speed(#[from] SpeedError),
    #[error("map rendering failed: {0}")]
    Render(#[from] RenderError),
    #[error("could not write map to '{path}': {source}")]
    WriteMap { path: String, source: std::io::Error },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app_config::AppConfigBuilder;
    use pretty_assertions::assert_eq;
    use std::error::Error;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    // One degree of longitude at the equator on a 6371 km sphere
    const METERS_PER_DEGREE: f64 = 111_194.92664455873;

    fn position_body(latitude: f64, longitude: f64, timestamp: i64) -> Vec<u8> {
        format!(
            r#"{{"message": "success", "timestamp": {timestamp}, "iss_position": {{"latitude": "{latitude}", "longitude": "{longitude}"}}}}"#
        )
        .into_bytes()
    }

    fn tracker_for(url: String) -> IssTracker {
        let config = AppConfigBuilder::new().iss_url(url).build();
        IssTracker::new(Client::new(), config)
    }

    #[tokio::test]
    async fn sample_fails_for_a_zero_period_before_any_request() {
        let mut server = mockito::Server::new_async().await;
        let mock = server.mock("GET", "/iss-now.json").expect(0).create_async().await;

        let mut tracker = tracker_for(format!("{}/iss-now.json", server.url()));
        let result = tracker.sample(0, 5).await;

        mock.assert();
        assert!(matches!(result, Err(TrackerError::InvalidPeriod)));
    }

    #[tokio::test]
    async fn sample_fails_for_a_zero_period_count_before_any_request() {
        let mut server = mockito::Server::new_async().await;
        let mock = server.mock("GET", "/iss-now.json").expect(0).create_async().await;

        let mut tracker = tracker_for(format!("{}/iss-now.json", server.url()));
        let result = tracker.sample(1, 0).await;

        mock.assert();
        assert!(matches!(result, Err(TrackerError::InvalidPeriodCount)));
    }

    #[tokio::test]
    async fn sample_returns_one_record_per_period_with_the_expected_speeds() -> Result<(), Box<dyn Error>> {
        let mut server = mockito::Server::new_async().await;

        // Two fetches per period: iteration 0 consumes responses 0 and 1,
        // iteration 1 consumes responses 2 and 3.
        let responses = vec![
            position_body(0.0, 0.0, 100),
            position_body(0.0, 0.05, 101),
            position_body(0.0, 0.10, 102),
            position_body(0.0, 0.20, 103),
        ];
        let call = Arc::new(AtomicUsize::new(0));
        let mock = server
            .mock("GET", "/iss-now.json")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body_from_request(move |_| {
                let index = call.fetch_add(1, Ordering::SeqCst);
                responses[index.min(3)].clone()
            })
            .expect(4)
            .create_async()
            .await;

        let mut tracker = tracker_for(format!("{}/iss-now.json", server.url()));
        let session = tracker.sample(1, 2).await?;

        mock.assert();
        assert_eq!(session.records.len(), 2);

        let expected_speeds = [0.05 * METERS_PER_DEGREE, 0.10 * METERS_PER_DEGREE];
        for (record, expected) in session.records.iter().zip(expected_speeds) {
            assert!(
                (record.speed - expected).abs() < 0.01,
                "speed {} differs from {}",
                record.speed,
                expected
            );
            assert!(record.speed.is_finite() && record.speed >= 0.0);
        }

        assert_eq!(session.records[0].timestamp, 101);
        assert_eq!(session.records[1].timestamp, 103);
        assert_eq!(session.records[1].position.longitude, 0.20);

        // The very first fetch seeds the session's start reference
        assert_eq!(
            tracker.start_reference(),
            Some(&PositionSample {
                latitude: 0.0,
                longitude: 0.0,
                timestamp: 100,
            })
        );

        // The reported average is the mean of the record speeds, to 2 decimals
        let mean = session.records.iter().map(|record| record.speed).sum::<f64>() / session.records.len() as f64;
        assert!((session.average_speed - round_to_2_decimals(mean)).abs() < 1e-9);
        assert!((session.average_speed - 8339.62).abs() < 1e-9);

        Ok(())
    }

    #[tokio::test]
    async fn sample_aborts_on_a_failure_response_without_any_record() {
        let mut server = mockito::Server::new_async().await;

        server
            .mock("GET", "/iss-now.json")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"message": "error", "timestamp": 100, "iss_position": {"latitude": "0", "longitude": "0"}}"#)
            .create_async()
            .await;

        let mut tracker = tracker_for(format!("{}/iss-now.json", server.url()));
        let result = tracker.sample(1, 3).await;

        assert!(matches!(
            result,
            Err(TrackerError::Fetch(FetchError::Failure { message })) if message == "error"
        ));
    }

    #[tokio::test]
    async fn sample_fails_when_consecutive_samples_share_a_timestamp() {
        let mut server = mockito::Server::new_async().await;

        server
            .mock("GET", "/iss-now.json")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(position_body(10.0, 20.0, 100))
            .expect(2)
            .create_async()
            .await;

        let mut tracker = tracker_for(format!("{}/iss-now.json", server.url()));
        let result = tracker.sample(1, 1).await;

        assert!(matches!(
            result,
            Err(TrackerError::Speed(SpeedError::NonPositiveElapsed { seconds: 0 }))
        ));
    }

    #[tokio::test]
    async fn sample_and_render_writes_the_map_to_the_configured_output() -> Result<(), Box<dyn Error>> {
        let mut server = mockito::Server::new_async().await;

        let timestamp = Arc::new(AtomicUsize::new(100));
        server
            .mock("GET", "/iss-now.json")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body_from_request(move |_| {
                let seconds = timestamp.fetch_add(1, Ordering::SeqCst) as i64;
                position_body(seconds as f64 / 10.0, seconds as f64 / 10.0, seconds)
            })
            .expect(2)
            .create_async()
            .await;

        let output = std::env::temp_dir().join("groundtrack_sample_and_render.svg");
        let config = AppConfigBuilder::new()
            .iss_url(format!("{}/iss-now.json", server.url()))
            .map_output(output.to_string_lossy().into_owned())
            .build();
        let mut tracker = IssTracker::new(Client::new(), config);

        let session = tracker.sample_and_render(1, 1).await?;

        assert_eq!(session.records.len(), 1);
        let svg = std::fs::read_to_string(&output)?;
        assert!(svg.starts_with("<svg"));
        std::fs::remove_file(&output)?;

        Ok(())
    }

    #[test]
    fn round_to_2_decimals_keeps_two_places() {
        assert_eq!(round_to_2_decimals(8339.619498), 8339.62);
        assert_eq!(round_to_2_decimals(1234.5678), 1234.57);
        assert_eq!(round_to_2_decimals(7000.0), 7000.0);
    }
}
