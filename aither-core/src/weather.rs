//! Weather formatting
//!
//! Turns a weather observation into the panel's single weather field.
//! Both the temperature and the precipitation percentage truncate rather
//! than round, matching the panel's established readout.

use core::fmt::Write;

use heapless::String;

use crate::traits::sources::WeatherObservation;

/// Maximum length of the formatted weather field
pub const WEATHER_TEXT_LEN: usize = 16;

/// Format an observation as `"{temp} F,{pop}%"`.
///
/// The temperature unit label is fixed by the unit system the source was
/// configured with; the formatter does not convert.
pub fn format(obs: &WeatherObservation) -> String<WEATHER_TEXT_LEN> {
    let temp = obs.temperature as i32;
    let pop_pct = (obs.precipitation * 100.0) as i32;

    let mut text = String::new();
    let _ = write!(text, "{} F,{}%", temp, pop_pct);
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(temperature: f32, precipitation: f32) -> WeatherObservation {
        WeatherObservation {
            temperature,
            precipitation,
        }
    }

    #[test]
    fn truncates_both_fields() {
        assert_eq!(format(&obs(72.9, 0.451)).as_str(), "72 F,45%");
    }

    #[test]
    fn probability_extremes() {
        assert_eq!(format(&obs(60.0, 0.0)).as_str(), "60 F,0%");
        assert_eq!(format(&obs(60.0, 1.0)).as_str(), "60 F,100%");
    }

    #[test]
    fn below_zero_temperature() {
        assert_eq!(format(&obs(-3.7, 0.2)).as_str(), "-3 F,20%");
    }
}
