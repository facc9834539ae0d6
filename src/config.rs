use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use config::{Environment, File};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub log_level: String,
    pub web: WebConfig,
    pub fleet: FleetConfig,
    pub flight: FlightConfig,
    pub location: LocationConfig,
    pub notify: NotifyConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FleetConfig {
    pub count: u32,
    pub ip_base: String,
    pub range: u32,
    pub battery: u8,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FlightConfig {
    pub step_interval_ms: u64,
    pub default_wait_ms: u64,
    pub takeoff_altitude: f64,
    pub return_speed: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LocationConfig {
    pub lookup_url: String,
    pub elevation: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NotifyConfig {
    pub capacity: usize,
}

impl FlightConfig {
    pub fn step_interval(&self) -> Duration {
        Duration::from_millis(self.step_interval_ms)
    }

    pub fn default_wait(&self) -> Duration {
        Duration::from_millis(self.default_wait_ms)
    }
}

impl Default for FlightConfig {
    fn default() -> Self {
        Self {
            step_interval_ms: 500,
            default_wait_ms: 1000,
            takeoff_altitude: 80.0,
            return_speed: 50,
        }
    }
}

impl Default for FleetConfig {
    fn default() -> Self {
        Self {
            count: 4,
            ip_base: "127.0.0.".to_string(),
            range: 4500,
            battery: 100,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let env = std::env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());
        let config_path = PathBuf::from(format!("config/{}.toml", env));
        let fallback_path = PathBuf::from(format!("/etc/tello-sim/{}.toml", env));

        let path = if config_path.exists() {
            Some(config_path)
        } else if fallback_path.exists() {
            Some(fallback_path)
        } else {
            None
        };
        Self::load_from(path.as_deref())
    }

    /// Builds the configuration from the defaults, an optional TOML file and
    /// `TELLO__*` environment overrides, in that order.
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        let mut config_builder = config::Config::builder()
            .set_default("log_level", "info")?
            .set_default("web.host", "0.0.0.0")?
            .set_default("web.port", 3000)?
            .set_default("fleet.count", 4)?
            .set_default("fleet.ip_base", "127.0.0.")?
            .set_default("fleet.range", 4500)?
            .set_default("fleet.battery", 100)?
            .set_default("flight.step_interval_ms", 500)?
            .set_default("flight.default_wait_ms", 1000)?
            .set_default("flight.takeoff_altitude", 80.0)?
            .set_default("flight.return_speed", 50)?
            .set_default("location.lookup_url", "https://ipwho.is")?
            .set_default("location.elevation", 35.0)?
            .set_default("notify.capacity", 256)?;

        if let Some(path) = path {
            config_builder = config_builder.add_source(File::from(path));
        }

        let settings = config_builder
            .add_source(Environment::with_prefix("TELLO").separator("__"))
            .build()?;
        let config = settings.try_deserialize()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_without_file() -> Result<()> {
        let config = Config::load_from(None)?;
        assert_eq!(config.web.port, 3000);
        assert_eq!(config.fleet.count, 4);
        assert_eq!(config.flight.step_interval(), Duration::from_millis(500));
        assert_eq!(config.flight.default_wait(), Duration::from_millis(1000));
        assert_eq!(config.flight.takeoff_altitude, 80.0);
        Ok(())
    }

    #[test]
    fn test_file_overrides_defaults() -> Result<()> {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile()?;
        writeln!(
            file,
            "log_level = \"debug\"\n[fleet]\ncount = 2\n[flight]\nstep_interval_ms = 100"
        )?;

        let config = Config::load_from(Some(file.path()))?;
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.fleet.count, 2);
        assert_eq!(config.fleet.range, 4500);
        assert_eq!(config.flight.step_interval_ms, 100);
        assert_eq!(config.flight.default_wait_ms, 1000);
        Ok(())
    }
}
