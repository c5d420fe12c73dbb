//! The control loop
//!
//! [`Station`] owns the schedule, the panel state, and the status phase,
//! and advances all three on every tick. All I/O happens through the
//! collaborator traits, so the loop itself is deterministic and runs in
//! tests against fakes.
//!
//! Within one tick the order is fixed: clock resync, then air quality,
//! then weather, then the unconditional clock-field refresh - later steps
//! observe the results of earlier ones. Any collaborator failure leaves
//! the corresponding panel fields at their previous values and still
//! advances the schedule, so a flaky source degrades to stale data
//! instead of a retry storm.

use crate::aqi;
use crate::clock;
use crate::config::StationConfig;
use crate::panel::PanelState;
use crate::schedule::{Millis, Schedule, TaskId};
use crate::status::{Phase, PhaseEvent};
use crate::traits::{
    AirQualitySource, LocalClock, StatusIndicator, TimeService, WeatherSource,
};
use crate::weather;

/// The external collaborators the loop drives
pub struct Services<C, T, A, W, S> {
    /// Local calendar clock, read every tick
    pub clock: C,
    /// Remote time service for the long-cadence resync
    pub time: T,
    /// PM2.5 source
    pub air: A,
    /// Weather source
    pub weather: W,
    /// Status indicator
    pub indicator: S,
}

/// The control loop state
pub struct Station {
    schedule: Schedule,
    panel: PanelState,
    phase: Phase,
}

impl Station {
    /// Create a station with both tasks due immediately, so the first
    /// tick populates the panel.
    pub fn new(config: &StationConfig, now: Millis) -> Self {
        let mut schedule = Schedule::new();
        schedule.add(TaskId::ClockSync, config.clock_sync_period_ms, now);
        schedule.add(TaskId::Refresh, config.refresh_period_ms, now);

        Self {
            schedule,
            panel: PanelState::new(),
            phase: Phase::Disconnected,
        }
    }

    /// Current loop phase
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Current panel state
    pub fn panel(&self) -> &PanelState {
        &self.panel
    }

    /// Record that an association attempt started
    pub fn connect_started<S: StatusIndicator>(&mut self, indicator: &mut S) {
        self.enter(PhaseEvent::ConnectStarted, indicator);
    }

    /// Record that the network link is up
    pub fn connected<S: StatusIndicator>(&mut self, indicator: &mut S) {
        self.enter(PhaseEvent::Connected, indicator);
    }

    /// Record that the network link dropped
    pub fn link_lost<S: StatusIndicator>(&mut self, indicator: &mut S) {
        self.enter(PhaseEvent::LinkLost, indicator);
    }

    /// Run one iteration of the loop at monotonic instant `now`.
    ///
    /// The loop is single-threaded and cooperative: each collaborator
    /// call is awaited to completion before the next step runs.
    ///
    /// Returns the panel state to render for this iteration; it is
    /// refreshed every tick regardless of which tasks fired.
    pub async fn tick<C, T, A, W, S>(
        &mut self,
        now: Millis,
        services: &mut Services<C, T, A, W, S>,
    ) -> &PanelState
    where
        C: LocalClock,
        T: TimeService,
        A: AirQualitySource,
        W: WeatherSource,
        S: StatusIndicator,
    {
        if self.schedule.is_due(TaskId::ClockSync, now) {
            self.enter(PhaseEvent::ClockSyncStarted, &mut services.indicator);
            self.sync_clock(services).await;
            self.schedule.mark_fired(TaskId::ClockSync, now);
        }

        if self.schedule.is_due(TaskId::Refresh, now) {
            self.enter(PhaseEvent::AirQualityStarted, &mut services.indicator);
            self.refresh_air_quality(services).await;

            self.enter(PhaseEvent::WeatherStarted, &mut services.indicator);
            self.refresh_weather(services).await;

            self.schedule.mark_fired(TaskId::Refresh, now);
        }

        // The displayed clock must never freeze between sync events.
        match services.clock.now() {
            Ok(ts) => self.panel.set_clock(&clock::format(&ts)),
            Err(_e) => {
                #[cfg(feature = "defmt")]
                defmt::warn!("local clock read failed: {}", _e);
            }
        }

        self.enter(PhaseEvent::WorkDone, &mut services.indicator);
        &self.panel
    }

    async fn sync_clock<C, T, A, W, S>(&mut self, services: &mut Services<C, T, A, W, S>)
    where
        C: LocalClock,
        T: TimeService,
    {
        match services.time.fetch().await {
            Ok(time) => {
                if services.clock.set(&time).is_err() {
                    #[cfg(feature = "defmt")]
                    defmt::warn!("failed to set local clock");
                }
            }
            Err(_e) => {
                #[cfg(feature = "defmt")]
                defmt::warn!("time sync failed: {}", _e);
            }
        }
    }

    async fn refresh_air_quality<C, T, A, W, S>(&mut self, services: &mut Services<C, T, A, W, S>)
    where
        A: AirQualitySource,
    {
        match services.air.fetch_pm25().await {
            Ok(pm25) => match aqi::compute(pm25) {
                Ok(reading) => self.panel.set_air_quality(&reading),
                Err(aqi::InvalidReading) => {
                    #[cfg(feature = "defmt")]
                    defmt::warn!("invalid PM2.5 reading: {}", pm25);
                }
            },
            Err(_e) => {
                #[cfg(feature = "defmt")]
                defmt::warn!("air quality fetch failed: {}", _e);
            }
        }
    }

    async fn refresh_weather<C, T, A, W, S>(&mut self, services: &mut Services<C, T, A, W, S>)
    where
        W: WeatherSource,
    {
        match services.weather.fetch().await {
            Ok(obs) => {
                let text = weather::format(&obs);
                self.panel.set_weather(text.as_str());
            }
            Err(_e) => {
                #[cfg(feature = "defmt")]
                defmt::warn!("weather fetch failed: {}", _e);
            }
        }
    }

    /// Advance the phase machine and mirror the new color to both the
    /// panel and the indicator
    fn enter<S: StatusIndicator>(&mut self, event: PhaseEvent, indicator: &mut S) {
        self.phase = self.phase.transition(event);
        self.panel.set_status(self.phase.color());
        indicator.set(self.phase.color());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::CalendarTime;
    use crate::traits::{ClockError, FetchError, WeatherObservation};
    use embassy_futures::block_on;
    use embedded_graphics::pixelcolor::Rgb888;
    use std::vec::Vec;

    fn noon() -> CalendarTime {
        CalendarTime {
            year: 2026,
            month: 8,
            day: 7,
            hour: 12,
            minute: 0,
            second: 0,
            weekday: 4,
        }
    }

    struct FakeClock {
        now: CalendarTime,
        set_to: Option<CalendarTime>,
    }

    impl FakeClock {
        fn new() -> Self {
            Self {
                now: noon(),
                set_to: None,
            }
        }
    }

    impl LocalClock for FakeClock {
        fn now(&mut self) -> Result<CalendarTime, ClockError> {
            Ok(self.now)
        }

        fn set(&mut self, time: &CalendarTime) -> Result<(), ClockError> {
            self.set_to = Some(*time);
            self.now = *time;
            Ok(())
        }
    }

    struct FakeTime {
        result: Result<CalendarTime, FetchError>,
        calls: usize,
    }

    impl TimeService for FakeTime {
        async fn fetch(&mut self) -> Result<CalendarTime, FetchError> {
            self.calls += 1;
            self.result
        }
    }

    struct FakeAir {
        result: Result<f32, FetchError>,
        calls: usize,
    }

    impl AirQualitySource for FakeAir {
        async fn fetch_pm25(&mut self) -> Result<f32, FetchError> {
            self.calls += 1;
            self.result
        }
    }

    struct FakeWeather {
        result: Result<WeatherObservation, FetchError>,
        calls: usize,
    }

    impl WeatherSource for FakeWeather {
        async fn fetch(&mut self) -> Result<WeatherObservation, FetchError> {
            self.calls += 1;
            self.result
        }
    }

    #[derive(Default)]
    struct FakeIndicator {
        colors: Vec<Rgb888>,
    }

    impl StatusIndicator for FakeIndicator {
        fn set(&mut self, color: Rgb888) {
            self.colors.push(color);
        }
    }

    fn services() -> Services<FakeClock, FakeTime, FakeAir, FakeWeather, FakeIndicator> {
        Services {
            clock: FakeClock::new(),
            time: FakeTime {
                result: Ok(noon()),
                calls: 0,
            },
            air: FakeAir {
                result: Ok(35.0),
                calls: 0,
            },
            weather: FakeWeather {
                result: Ok(WeatherObservation {
                    temperature: 72.9,
                    precipitation: 0.451,
                }),
                calls: 0,
            },
            indicator: FakeIndicator::default(),
        }
    }

    fn config() -> StationConfig {
        StationConfig {
            clock_sync_period_ms: 1_000_000,
            refresh_period_ms: 600_000,
            ..StationConfig::default()
        }
    }

    fn connected_station(svc: &mut Services<FakeClock, FakeTime, FakeAir, FakeWeather, FakeIndicator>) -> Station {
        let mut station = Station::new(&config(), 0);
        station.connect_started(&mut svc.indicator);
        station.connected(&mut svc.indicator);
        station
    }

    #[test]
    fn first_tick_populates_every_field() {
        let mut svc = services();
        let mut station = connected_station(&mut svc);

        let panel = block_on(station.tick(0, &mut svc)).clone();

        assert_eq!(panel.time_text.as_str(), "12:00p");
        assert_eq!(panel.date_text.as_str(), "8/7");
        assert_eq!(panel.weekday_text.as_str(), "Fri");
        assert_eq!(panel.weather_text.as_str(), "72 F,45%");
        assert_eq!(panel.aqi_text.as_str(), "AQI: 99");
        assert_eq!(panel.aqi_color, Rgb888::new(255, 255, 0));
        assert_eq!(svc.time.calls, 1);
        assert_eq!(svc.air.calls, 1);
        assert_eq!(svc.weather.calls, 1);
        assert!(svc.clock.set_to.is_some());
    }

    #[test]
    fn indicator_walks_the_phase_cycle() {
        let mut svc = services();
        let mut station = connected_station(&mut svc);
        svc.indicator.colors.clear();

        block_on(station.tick(0, &mut svc));

        assert_eq!(
            svc.indicator.colors,
            [
                Phase::SyncingClock.color(),
                Phase::FetchingAirQuality.color(),
                Phase::FetchingWeather.color(),
                Phase::Idle.color(),
            ]
        );
        assert_eq!(station.phase(), Phase::Idle);
    }

    #[test]
    fn every_tick_ends_idle() {
        let mut svc = services();
        let mut station = connected_station(&mut svc);

        for now in [0, 1_000, 600_000, 2_000_000] {
            block_on(station.tick(now, &mut svc));
            assert_eq!(station.phase(), Phase::Idle);
            assert_eq!(station.panel().status_color, Phase::Idle.color());
        }
    }

    #[test]
    fn weather_failure_keeps_previous_text() {
        let mut svc = services();
        let mut station = connected_station(&mut svc);
        block_on(station.tick(0, &mut svc));

        svc.weather.result = Err(FetchError::Timeout);
        block_on(station.tick(600_000, &mut svc));

        // weather stayed stale, air quality still refreshed
        assert_eq!(station.panel().weather_text.as_str(), "72 F,45%");
        assert_eq!(svc.air.calls, 2);
        assert_eq!(station.phase(), Phase::Idle);
    }

    #[test]
    fn failure_still_advances_the_schedule() {
        let mut svc = services();
        svc.weather.result = Err(FetchError::Transport);
        svc.air.result = Err(FetchError::Transport);
        let mut station = connected_station(&mut svc);

        block_on(station.tick(0, &mut svc));
        assert_eq!(svc.air.calls, 1);

        // Not due again until a full period has passed: no retry storm.
        block_on(station.tick(1_000, &mut svc));
        assert_eq!(svc.air.calls, 1);
        assert_eq!(svc.weather.calls, 1);

        block_on(station.tick(600_000, &mut svc));
        assert_eq!(svc.air.calls, 2);
    }

    #[test]
    fn invalid_reading_keeps_previous_aqi() {
        let mut svc = services();
        let mut station = connected_station(&mut svc);
        block_on(station.tick(0, &mut svc));
        assert_eq!(station.panel().aqi_text.as_str(), "AQI: 99");

        svc.air.result = Ok(-7.5);
        block_on(station.tick(600_000, &mut svc));

        assert_eq!(station.panel().aqi_text.as_str(), "AQI: 99");
        assert_eq!(station.panel().aqi_color, Rgb888::new(255, 255, 0));
    }

    #[test]
    fn clock_fields_refresh_even_when_nothing_fires() {
        let mut svc = services();
        let mut station = connected_station(&mut svc);
        block_on(station.tick(0, &mut svc));

        svc.clock.now.hour = 12;
        svc.clock.now.minute = 1;
        block_on(station.tick(1_000, &mut svc));

        assert_eq!(station.panel().time_text.as_str(), "12:01p");
        // no fetches happened on the second tick
        assert_eq!(svc.time.calls, 1);
        assert_eq!(svc.air.calls, 1);
    }

    #[test]
    fn late_tick_drifts_the_cadence() {
        let mut svc = services();
        let mut station = connected_station(&mut svc);
        block_on(station.tick(0, &mut svc));

        // Fires 1s late; cadence shifts forward by that second.
        block_on(station.tick(601_000, &mut svc));
        assert_eq!(svc.air.calls, 2);

        block_on(station.tick(1_200_000, &mut svc));
        assert_eq!(svc.air.calls, 2);

        block_on(station.tick(1_201_000, &mut svc));
        assert_eq!(svc.air.calls, 3);
    }

    #[test]
    fn connection_lifecycle_colors() {
        let mut svc = services();
        let mut station = Station::new(&config(), 0);
        assert_eq!(station.phase(), Phase::Disconnected);

        station.connect_started(&mut svc.indicator);
        assert_eq!(station.phase(), Phase::Connecting);

        station.connected(&mut svc.indicator);
        assert_eq!(station.phase(), Phase::Idle);

        station.link_lost(&mut svc.indicator);
        assert_eq!(station.phase(), Phase::Disconnected);
        assert_eq!(
            svc.indicator.colors,
            [
                Phase::Connecting.color(),
                Phase::Idle.color(),
                Phase::Disconnected.color(),
            ]
        );
    }
}
