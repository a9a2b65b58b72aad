//! Storage module for configuration and data documents.

pub mod config;
pub mod documents;

pub use config::{AppConfig, AthleteSettings, ConfigError, HistogramSettings, HrZoneRange, PowerZoneRange};
pub use documents::{load_cache, load_metrics, load_ride, StorageError};
