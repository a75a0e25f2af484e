use config::Config;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    iss: Iss,
    map: Map,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let config: AppConfig = Config::builder()
            .add_source(config::File::with_name("config").required(true))
            .add_source(config::File::with_name("config_local").required(false))
            .add_source(config::Environment::default())
            .build()?
            .try_deserialize()?;

        if config.iss.url.trim().is_empty() {
            return Err(ConfigError::MissingUrl);
        }

        Ok(config)
    }

    pub fn iss(&self) -> &Iss {
        &self.iss
    }

    pub fn map(&self) -> &Map {
        &self.map
    }
}

#[derive(Debug, Deserialize)]
pub struct Iss {
    url: String,
}

impl Iss {
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[derive(Debug, Deserialize)]
pub struct Map {
    output: String,
    width: u32,
    height: u32,
    margin_deg: f64,
}

impl Map {
    pub fn output(&self) -> &str {
        &self.output
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn margin_deg(&self) -> f64 {
        self.margin_deg
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not load configuration: {0}")]
    Load(#[from] config::ConfigError),
    #[error("iss.url is not set, configure the position endpoint")]
    MissingUrl,
}

#[cfg(test)]
pub struct AppConfigBuilder {
    config: AppConfig,
}

#[cfg(test)]
impl AppConfigBuilder {
    pub fn new() -> Self {
        AppConfigBuilder {
            config: AppConfig {
                iss: Iss {
                    url: "http://iss.url/iss-now.json".to_string(),
                },
                map: Map {
                    output: "iss_path.svg".to_string(),
                    width: 1000,
                    height: 500,
                    margin_deg: 25.0,
                },
            },
        }
    }

    pub fn iss_url(mut self, url: String) -> Self {
        self.config.iss.url = url;
        self
    }

    pub fn map_output(mut self, output: String) -> Self {
        self.config.map.output = output;
        self
    }

    pub fn build(self) -> AppConfig {
        self.config
    }
}
