//! Status indicator phase machine
//!
//! The indicator color is a pure function of the loop phase, and the
//! phase only changes through [`Phase::transition`]. The cycle per tick
//! is: idle → (syncing clock) → (fetching air quality → fetching
//! weather) → idle, with the connection phases only at startup or after
//! the link drops.

use embedded_graphics::pixelcolor::Rgb888;

/// What the control loop is currently doing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Phase {
    /// No network association yet
    Disconnected,
    /// Association in progress
    Connecting,
    /// Between tasks; the resting state of every completed tick
    Idle,
    /// Fetching time from the time service
    SyncingClock,
    /// Fetching the PM2.5 reading
    FetchingAirQuality,
    /// Fetching the weather observation
    FetchingWeather,
}

/// Phase transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PhaseEvent {
    /// An association attempt started
    ConnectStarted,
    /// The network link came up
    Connected,
    /// The network link dropped
    LinkLost,
    /// The clock resync task started
    ClockSyncStarted,
    /// The air-quality fetch started
    AirQualityStarted,
    /// The weather fetch started
    WeatherStarted,
    /// All due work for this tick finished (successfully or not)
    WorkDone,
}

impl Phase {
    /// Indicator color for this phase
    pub const fn color(self) -> Rgb888 {
        match self {
            Phase::Disconnected => Rgb888::new(255, 0, 0),
            Phase::Connecting => Rgb888::new(0, 0, 255),
            Phase::Idle => Rgb888::new(0, 255, 0),
            Phase::SyncingClock => Rgb888::new(0, 0, 255),
            Phase::FetchingAirQuality => Rgb888::new(0, 255, 255),
            Phase::FetchingWeather => Rgb888::new(255, 165, 0),
        }
    }

    /// Process an event and return the next phase
    pub fn transition(self, event: PhaseEvent) -> Self {
        use Phase::*;
        use PhaseEvent::*;

        match (self, event) {
            // Losing the link trumps everything
            (_, LinkLost) => Disconnected,

            (Disconnected, ConnectStarted) => Connecting,
            (Connecting, Connected) => Idle,

            (Idle, ClockSyncStarted) => SyncingClock,
            (Idle, AirQualityStarted) => FetchingAirQuality,
            (SyncingClock, AirQualityStarted) => FetchingAirQuality,
            (FetchingAirQuality, WeatherStarted) => FetchingWeather,

            (SyncingClock, WorkDone) => Idle,
            (FetchingAirQuality, WorkDone) => Idle,
            (FetchingWeather, WorkDone) => Idle,

            // Everything else: stay put
            _ => self,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn startup_cycle() {
        let phase = Phase::Disconnected;
        let phase = phase.transition(PhaseEvent::ConnectStarted);
        assert_eq!(phase, Phase::Connecting);
        let phase = phase.transition(PhaseEvent::Connected);
        assert_eq!(phase, Phase::Idle);
    }

    #[test]
    fn full_tick_cycle_ends_idle() {
        let phase = Phase::Idle
            .transition(PhaseEvent::ClockSyncStarted)
            .transition(PhaseEvent::AirQualityStarted)
            .transition(PhaseEvent::WeatherStarted)
            .transition(PhaseEvent::WorkDone);
        assert_eq!(phase, Phase::Idle);
    }

    #[test]
    fn refresh_without_clock_sync() {
        let phase = Phase::Idle
            .transition(PhaseEvent::AirQualityStarted)
            .transition(PhaseEvent::WeatherStarted)
            .transition(PhaseEvent::WorkDone);
        assert_eq!(phase, Phase::Idle);
    }

    #[test]
    fn link_lost_from_any_phase() {
        for phase in [
            Phase::Connecting,
            Phase::Idle,
            Phase::SyncingClock,
            Phase::FetchingAirQuality,
            Phase::FetchingWeather,
        ] {
            assert_eq!(phase.transition(PhaseEvent::LinkLost), Phase::Disconnected);
        }
    }

    #[test]
    fn phase_colors() {
        assert_eq!(Phase::Disconnected.color(), Rgb888::new(255, 0, 0));
        assert_eq!(Phase::Connecting.color(), Rgb888::new(0, 0, 255));
        assert_eq!(Phase::Idle.color(), Rgb888::new(0, 255, 0));
        assert_eq!(Phase::SyncingClock.color(), Rgb888::new(0, 0, 255));
        assert_eq!(Phase::FetchingAirQuality.color(), Rgb888::new(0, 255, 255));
        assert_eq!(Phase::FetchingWeather.color(), Rgb888::new(255, 165, 0));
    }
}
