//! Time collaborators
//!
//! Two seams: the local clock the panel reads every tick, and the remote
//! time service it resyncs from on the long cadence.

use crate::clock::CalendarTime;
use crate::traits::sources::FetchError;

/// Errors from the local clock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockError {
    /// The clock could not be read or written
    Unavailable,
    /// The clock holds a value it cannot represent as a calendar time
    InvalidTime,
}

/// Local time source (e.g. a battery-backed RTC)
///
/// `now` is read on every tick; `set` only after a successful time-service
/// fetch.
pub trait LocalClock {
    /// Read the current local calendar time
    fn now(&mut self) -> Result<CalendarTime, ClockError>;

    /// Set the clock from a freshly fetched calendar time
    fn set(&mut self, time: &CalendarTime) -> Result<(), ClockError>;
}

/// Remote time service
///
/// Takes no parameters; the response is already converted to local
/// calendar time by the implementation.
#[allow(async_fn_in_trait)]
pub trait TimeService {
    /// Fetch the current calendar time
    async fn fetch(&mut self) -> Result<CalendarTime, FetchError>;
}
