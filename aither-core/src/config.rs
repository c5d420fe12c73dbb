//! Configuration type definitions
//!
//! These types describe the station: which sensor to ask for air quality,
//! where the station is, and how often each refresh task runs. They are
//! read once at startup and never change afterwards.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default clock resync period (24 hours)
pub const DEFAULT_CLOCK_SYNC_MS: u64 = 24 * 60 * 60 * 1000;

/// Default air-quality/weather refresh period (10 minutes)
pub const DEFAULT_REFRESH_MS: u64 = 10 * 60 * 1000;

/// Unit system requested from the weather source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Units {
    /// Fahrenheit / miles per hour
    #[default]
    Imperial,
    /// Celsius / meters per second
    Metric,
}

impl Units {
    /// Query-parameter value understood by the weather API
    pub fn as_str(self) -> &'static str {
        match self {
            Units::Imperial => "imperial",
            Units::Metric => "metric",
        }
    }
}

/// Station configuration
///
/// Network credentials and API keys stay out of this struct; they are
/// consumed directly by the network layer at startup.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StationConfig {
    /// Air-quality sensor identifier at the data source
    pub sensor_id: u32,
    /// Station latitude in decimal degrees
    pub latitude: f32,
    /// Station longitude in decimal degrees
    pub longitude: f32,
    /// Unit system for weather requests
    pub units: Units,
    /// Local offset from UTC in minutes (east positive)
    pub utc_offset_minutes: i32,
    /// Period between clock resyncs (ms)
    pub clock_sync_period_ms: u64,
    /// Period between air-quality/weather refreshes (ms)
    pub refresh_period_ms: u64,
}

impl Default for StationConfig {
    fn default() -> Self {
        Self {
            sensor_id: 0,
            latitude: 0.0,
            longitude: 0.0,
            units: Units::Imperial,
            utc_offset_minutes: 0,
            clock_sync_period_ms: DEFAULT_CLOCK_SYNC_MS,
            refresh_period_ms: DEFAULT_REFRESH_MS,
        }
    }
}
