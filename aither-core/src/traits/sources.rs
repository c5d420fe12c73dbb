//! Network-backed data sources
//!
//! The control loop never sees a transport or a payload; by the time data
//! crosses these traits it is already parsed and typed. Every call may
//! block the loop, so implementations are expected to bound themselves
//! with a timeout and report expiry as [`FetchError::Timeout`].

/// Errors from a periodic fetch
///
/// All variants are recoverable: the loop keeps the previous value and
/// waits for the next cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FetchError {
    /// The call did not complete within its deadline
    Timeout,
    /// The transport failed (connect, send, receive)
    Transport,
    /// The response arrived but did not contain the expected fields
    Malformed,
}

/// Particulate-matter source, queried by sensor identifier
#[allow(async_fn_in_trait)]
pub trait AirQualitySource {
    /// Fetch the current PM2.5 concentration in µg/m³
    async fn fetch_pm25(&mut self) -> Result<f32, FetchError>;
}

/// One observation from the weather source
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WeatherObservation {
    /// Current temperature in the configured units
    pub temperature: f32,
    /// Probability of precipitation for the coming hour, 0.0..=1.0
    pub precipitation: f32,
}

/// Weather source, queried by coordinates and unit system
#[allow(async_fn_in_trait)]
pub trait WeatherSource {
    /// Fetch the current observation
    async fn fetch(&mut self) -> Result<WeatherObservation, FetchError>;
}
