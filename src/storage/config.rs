//! Application configuration.
//!
//! Histogram defaults and the athlete's zone history live in one TOML file
//! under the platform data directory. A missing file means defaults.

use crate::histogram::binner::BinConfig;
use crate::histogram::series::SeriesKind;
use crate::histogram::units::Units;
use crate::metrics::zones::{ZoneResult, ZoneSchedule, ZoneTable};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application version
    pub version: String,
    /// Data directory path
    #[serde(skip)]
    pub data_dir: PathBuf,
    /// Histogram defaults
    #[serde(default)]
    pub histogram: HistogramSettings,
    /// Athlete settings
    #[serde(default)]
    pub athlete: AthleteSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            data_dir: PathBuf::new(),
            histogram: HistogramSettings::default(),
            athlete: AthleteSettings::default(),
        }
    }
}

/// Histogram defaults, overridable per invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistogramSettings {
    /// Series to distribute
    pub series: SeriesKind,
    /// Bin width in series units
    pub bin_width: f64,
    /// Count zero values
    pub include_zeros: bool,
    /// Show percent of total time
    pub percent: bool,
    /// Aggregate into zones
    pub zoned: bool,
    /// Logarithmic Y axis
    pub log_y: bool,
    /// Shade zone bands behind stepped curves
    pub shade_zones: bool,
}

impl Default for HistogramSettings {
    fn default() -> Self {
        Self {
            series: SeriesKind::Power,
            bin_width: 5.0,
            include_zeros: false,
            percent: false,
            zoned: false,
            log_y: false,
            shade_zones: true,
        }
    }
}

impl HistogramSettings {
    /// Binning configuration from these settings.
    pub fn bin_config(&self) -> BinConfig {
        BinConfig {
            bin_width: self.bin_width,
            include_zeros: self.include_zeros,
            percent: self.percent,
            zoned: self.zoned,
        }
        .sanitized()
    }
}

/// One power zone range: explicit lower bounds, or Coggan zones from FTP.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PowerZoneRange {
    /// First day the range applies
    pub from: Option<NaiveDate>,
    /// Last day the range applies
    pub to: Option<NaiveDate>,
    /// Functional Threshold Power in watts
    pub ftp: Option<u16>,
    /// Explicit lower bounds in watts, ascending; wins over `ftp`
    pub lows: Vec<f64>,
}

/// One heart rate zone range: explicit lower bounds, or Karvonen zones.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HrZoneRange {
    /// First day the range applies
    pub from: Option<NaiveDate>,
    /// Last day the range applies
    pub to: Option<NaiveDate>,
    /// Maximum heart rate in bpm
    pub max_hr: Option<u8>,
    /// Resting heart rate in bpm
    pub resting_hr: Option<u8>,
    /// Explicit lower bounds in bpm, ascending; wins over max/resting
    pub lows: Vec<f64>,
}

/// Athlete settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AthleteSettings {
    /// Unit preference
    pub units: Units,
    /// Weight in kilograms, used when a ride does not carry one
    pub weight_kg: f64,
    /// Power zone history
    pub power_zones: Vec<PowerZoneRange>,
    /// Heart rate zone history
    pub hr_zones: Vec<HrZoneRange>,
}

impl Default for AthleteSettings {
    fn default() -> Self {
        Self {
            units: Units::Metric,
            weight_kg: 75.0,
            power_zones: vec![PowerZoneRange {
                ftp: Some(200),
                ..Default::default()
            }],
            hr_zones: Vec::new(),
        }
    }
}

impl AthleteSettings {
    /// Power zone schedule. Ranges with neither bounds nor FTP are skipped.
    pub fn power_schedule(&self) -> ZoneResult<ZoneSchedule> {
        let mut tables = Vec::with_capacity(self.power_zones.len());
        for range in &self.power_zones {
            let table = if !range.lows.is_empty() {
                ZoneTable::from_lower_bounds(&range.lows)?
            } else if let Some(ftp) = range.ftp {
                ZoneTable::coggan_power(ftp)
            } else {
                tracing::warn!(from = ?range.from, "Power zone range has no FTP or bounds, skipping");
                continue;
            };
            tables.push(table.with_dates(range.from, range.to)?);
        }
        Ok(ZoneSchedule::new(tables))
    }

    /// Heart rate zone schedule. Ranges with neither bounds nor a valid
    /// max/resting pair are skipped.
    pub fn hr_schedule(&self) -> ZoneResult<ZoneSchedule> {
        let mut tables = Vec::with_capacity(self.hr_zones.len());
        for range in &self.hr_zones {
            let table = if !range.lows.is_empty() {
                ZoneTable::from_lower_bounds(&range.lows)?
            } else {
                match (range.max_hr, range.resting_hr) {
                    (Some(max), Some(rest)) if max > rest => ZoneTable::karvonen_hr(max, rest),
                    _ => {
                        tracing::warn!(from = ?range.from, "HR zone range has no valid max/resting HR or bounds, skipping");
                        continue;
                    }
                }
            };
            tables.push(table.with_dates(range.from, range.to)?);
        }
        Ok(ZoneSchedule::new(tables))
    }
}

/// Get the application data directory.
pub fn get_data_dir() -> PathBuf {
    directories::ProjectDirs::from("com", "ridehist", "RideHist")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Get the configuration file path.
pub fn get_config_path() -> PathBuf {
    get_data_dir().join("config.toml")
}

/// Load application configuration from the default location.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from(&get_config_path())
}

/// Load application configuration from `path`, defaults if it does not exist.
pub fn load_config_from(path: &Path) -> Result<AppConfig, ConfigError> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "No config file, using defaults");
        let config = AppConfig {
            data_dir: get_data_dir(),
            ..Default::default()
        };
        return Ok(config);
    }

    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;

    let mut config: AppConfig =
        toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))?;

    config.data_dir = get_data_dir();
    tracing::info!(path = %path.display(), "Loaded config");

    Ok(config)
}

/// Save application configuration to the default location.
pub fn save_config(config: &AppConfig) -> Result<(), ConfigError> {
    save_config_to(config, &get_config_path())
}

/// Save application configuration to `path`.
pub fn save_config_to(config: &AppConfig, path: &Path) -> Result<(), ConfigError> {
    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| ConfigError::IoError(e.to_string()))?;
    }

    let content = toml::to_string_pretty(config).map_err(|e| ConfigError::SerializeError(e.to_string()))?;

    std::fs::write(path, content).map_err(|e| ConfigError::IoError(e.to_string()))?;

    Ok(())
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialize error: {0}")]
    SerializeError(String),
}
