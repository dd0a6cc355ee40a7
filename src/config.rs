use serde::Deserialize;
use std::net::SocketAddr;
use std::path::Path;
use thiserror::Error;
use tracing::warn;

use crate::services::solar_service::DEFAULT_EFFICIENCY_FACTOR;

fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8000 }
fn default_efficiency_factor() -> f64 { DEFAULT_EFFICIENCY_FACTOR }

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("calculator.efficiency_factor must be in (0, 1], got {0}")]
    InvalidEfficiency(f64),
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub calculator: CalculatorConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Directory with the frontend build, served for non-API paths.
    #[serde(default)]
    pub static_dir: Option<String>,
    /// Empty means any origin.
    #[serde(default)]
    pub cors_allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_dir: None,
            cors_allowed_origins: Vec::new(),
        }
    }
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, Box<dyn std::error::Error>> {
        Ok(format!("{}:{}", self.host, self.port).parse()?)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct CalculatorConfig {
    #[serde(default = "default_efficiency_factor")]
    pub efficiency_factor: f64,
}

impl Default for CalculatorConfig {
    fn default() -> Self {
        Self { efficiency_factor: default_efficiency_factor() }
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Like [`Config::load`], but a missing file yields the defaults.
    pub fn load_or_default(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        if !Path::new(path).exists() {
            warn!(path, "config file not found, using defaults");
            return Ok(Self::default());
        }
        Self::load(path)
    }

    pub fn from_json(content: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let config: Config = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let eff = self.calculator.efficiency_factor;
        if !(eff > 0.0 && eff <= 1.0) {
            return Err(ConfigError::InvalidEfficiency(eff));
        }
        Ok(())
    }
}
