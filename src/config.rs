//! # Configuration Management
//!
//! This module defines the typed configuration the embedding application
//! hands to the library at construction time: sensor thresholds, debounce
//! windows, and the OSC addresses the installation reports on. A TOML
//! loader is provided for applications that keep these in a file, but the
//! library itself never reads anything at runtime — construction-time
//! structs are the only configuration channel.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// Installation configuration, typically loaded from hoopsense.toml
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Ultrasonic sensor tuning
    pub sensor: SensorConfig,
    /// OSC reporting addresses
    pub osc: OscConfig,
}

/// Ultrasonic sensor tuning shared by all three hoops
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct SensorConfig {
    /// Distance below which a reading counts as a ball (centimeters)
    pub threshold_cm: f32,
    /// Noise floor: readings at or below this are discarded (centimeters).
    /// HC-SR04-class sensors are unreliable under ~2 cm; installations with
    /// cleaner sensors can lower this to 0.
    pub min_valid_cm: f32,
    /// How long to wait for an echo before giving up (microseconds).
    /// 25 ms covers ~4.3 m round trip, past any mounted hoop.
    pub echo_timeout_us: u32,
    /// Debounce window after a counted shot (milliseconds)
    pub cooldown_ms: u32,
}

/// OSC addresses used when reporting to the show-control rig
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct OscConfig {
    /// Address for made-shot count messages
    pub score_address: String,
    /// Address for MVP game state change messages
    pub state_address: String,
}

impl Default for SensorConfig {
    fn default() -> Self {
        SensorConfig {
            threshold_cm: 15.0,
            min_valid_cm: 2.0,
            echo_timeout_us: 25_000,
            cooldown_ms: 1_500,
        }
    }
}

impl Default for OscConfig {
    fn default() -> Self {
        OscConfig {
            score_address: "/hoops/score".to_string(),
            state_address: "/hoops/state".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            sensor: SensorConfig::default(),
            osc: OscConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from hoopsense.toml
    /// Falls back to default configuration if file doesn't exist or is invalid
    pub fn load() -> Self {
        Self::load_from_path("hoopsense.toml")
    }

    /// Load configuration from specified path
    /// Falls back to default configuration if file doesn't exist or is invalid
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Self {
        match fs::read_to_string(&path) {
            Ok(contents) => match toml::from_str::<Config>(&contents) {
                Ok(config) => {
                    info!(
                        score = %config.osc.score_address,
                        "loaded installation configuration"
                    );
                    config
                }
                Err(e) => {
                    warn!(error = %e, "invalid config file format, using defaults");
                    Self::default()
                }
            },
            Err(_) => {
                info!("no config file found, using defaults");
                Self::default()
            }
        }
    }

    /// Save current configuration to hoopsense.toml
    pub fn save(&self) -> Result<(), Box<dyn std::error::Error>> {
        let contents = toml::to_string_pretty(self)?;
        fs::write("hoopsense.toml", contents)?;
        info!("configuration saved to hoopsense.toml");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.sensor.threshold_cm, 15.0);
        assert_eq!(config.sensor.min_valid_cm, 2.0);
        assert_eq!(config.sensor.echo_timeout_us, 25_000);
        assert_eq!(config.sensor.cooldown_ms, 1_500);
        assert_eq!(config.osc.score_address, "/hoops/score");
    }

    #[test]
    fn test_config_roundtrip() {
        let config = Config::default();
        let toml_str = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(config.sensor.threshold_cm, parsed.sensor.threshold_cm);
        assert_eq!(config.osc.state_address, parsed.osc.state_address);
    }

    #[test]
    fn test_load_nonexistent_file() {
        let config = Config::load_from_path("/nonexistent/path");
        // Should fallback to default
        assert_eq!(config.sensor.threshold_cm, 15.0);
    }

    #[test]
    fn test_load_partial_file_fills_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[sensor]\nthreshold_cm = 20.0\nmin_valid_cm = 0.0").unwrap();
        let config = Config::load_from_path(file.path());
        assert_eq!(config.sensor.threshold_cm, 20.0);
        assert_eq!(config.sensor.min_valid_cm, 0.0);
        // Unspecified sections keep their defaults
        assert_eq!(config.sensor.cooldown_ms, 1_500);
        assert_eq!(config.osc.score_address, "/hoops/score");
    }
}
