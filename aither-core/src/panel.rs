//! Panel state
//!
//! The seven display fields, owned exclusively by the control loop. Each
//! field is updated independently and only when its task succeeds, so a
//! transient failure in one task never blanks or corrupts the others;
//! the panel keeps showing the last good value.

use core::fmt::Write;

use embedded_graphics::pixelcolor::Rgb888;
use heapless::String;

use crate::aqi::{AirQualityReading, UNKNOWN_COLOR};
use crate::clock::ClockSnapshot;
use crate::status::Phase;
use crate::weather::WEATHER_TEXT_LEN;

/// Everything the display and status indicator need for one frame
#[derive(Debug, Clone, PartialEq)]
pub struct PanelState {
    /// 12-hour time, e.g. `"1:30p"`
    pub time_text: String<8>,
    /// Month/day, e.g. `"3/7"`
    pub date_text: String<8>,
    /// Short weekday name
    pub weekday_text: String<8>,
    /// Weather readout, e.g. `"72 F,45%"`
    pub weather_text: String<WEATHER_TEXT_LEN>,
    /// AQI readout, e.g. `"AQI: 42"`
    pub aqi_text: String<12>,
    /// Color of the AQI readout
    pub aqi_color: Rgb888,
    /// Color of the status indicator
    pub status_color: Rgb888,
}

impl PanelState {
    /// Fresh state with the boot placeholders
    pub fn new() -> Self {
        let mut state = Self {
            time_text: String::new(),
            date_text: String::new(),
            weekday_text: String::new(),
            weather_text: String::new(),
            aqi_text: String::new(),
            aqi_color: UNKNOWN_COLOR,
            status_color: Phase::Disconnected.color(),
        };
        let _ = state.time_text.push_str("Loading");
        let _ = state.date_text.push_str(".....");
        let _ = state.weekday_text.push_str("...");
        let _ = state.weather_text.push_str("Loading...");
        let _ = state.aqi_text.push_str("Loading...");
        state
    }

    /// Overwrite the three clock fields from a fresh snapshot
    pub fn set_clock(&mut self, snapshot: &ClockSnapshot) {
        self.time_text.clear();
        let _ = self.time_text.push_str(snapshot.time_text.as_str());
        self.date_text.clear();
        let _ = self.date_text.push_str(snapshot.date_text.as_str());
        self.weekday_text.clear();
        let _ = self.weekday_text.push_str(snapshot.weekday);
    }

    /// Overwrite the weather field
    pub fn set_weather(&mut self, text: &str) {
        self.weather_text.clear();
        let _ = self.weather_text.push_str(text);
    }

    /// Overwrite the AQI text and color from a valid reading
    pub fn set_air_quality(&mut self, reading: &AirQualityReading) {
        self.aqi_text.clear();
        let _ = write!(self.aqi_text, "AQI: {}", reading.aqi);
        self.aqi_color = reading.color;
    }

    /// Overwrite the status indicator color
    pub fn set_status(&mut self, color: Rgb888) {
        self.status_color = color;
    }
}

impl Default for PanelState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aqi;

    #[test]
    fn boot_placeholders() {
        let state = PanelState::new();
        assert_eq!(state.time_text.as_str(), "Loading");
        assert_eq!(state.date_text.as_str(), ".....");
        assert_eq!(state.weekday_text.as_str(), "...");
        assert_eq!(state.weather_text.as_str(), "Loading...");
        assert_eq!(state.aqi_text.as_str(), "Loading...");
        assert_eq!(state.aqi_color, UNKNOWN_COLOR);
        assert_eq!(state.status_color, Phase::Disconnected.color());
    }

    #[test]
    fn air_quality_updates_text_and_color_only() {
        let mut state = PanelState::new();
        let reading = aqi::compute(5.0).unwrap();
        state.set_air_quality(&reading);

        assert_eq!(state.aqi_text.as_str(), "AQI: 21");
        assert_eq!(state.aqi_color, Rgb888::new(0, 255, 0));
        // unrelated fields untouched
        assert_eq!(state.weather_text.as_str(), "Loading...");
        assert_eq!(state.time_text.as_str(), "Loading");
    }

    #[test]
    fn weather_field_replaces_previous() {
        let mut state = PanelState::new();
        state.set_weather("72 F,45%");
        assert_eq!(state.weather_text.as_str(), "72 F,45%");
        state.set_weather("68 F,0%");
        assert_eq!(state.weather_text.as_str(), "68 F,0%");
    }
}
