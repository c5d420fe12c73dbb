//! External collaborator traits
//!
//! These traits define the interface between the control loop and the
//! things it cannot own: the local clock, the network-backed data sources,
//! and the status indicator. The firmware supplies the real
//! implementations; tests supply deterministic fakes.

pub mod clock;
pub mod indicator;
pub mod sources;

pub use clock::{ClockError, LocalClock, TimeService};
pub use indicator::StatusIndicator;
pub use sources::{AirQualitySource, FetchError, WeatherObservation, WeatherSource};
