//! PM2.5 → AQI engine
//!
//! Converts a raw particulate-matter concentration into the categorical
//! Air Quality Index via piecewise-linear interpolation over the standard
//! breakpoint bands, then maps the AQI to a severity category and a
//! display color. Pure functions, no state.

use embedded_graphics::pixelcolor::Rgb888;
use libm::roundf;

/// Concentrations above this are clamped before interpolation
pub const MAX_PM25: f32 = 1000.0;

/// One interpolation band: a concentration interval mapped linearly onto
/// an AQI interval
struct Band {
    pm_low: f32,
    pm_high: f32,
    aqi_low: f32,
    aqi_high: f32,
}

/// Breakpoint table, highest band first. A concentration belongs to the
/// first band whose low bound it exceeds; the last band closes the range
/// down to zero. The top band is open-ended upwards so that clamped
/// concentrations past 500 still interpolate monotonically.
const BANDS: [Band; 7] = [
    Band { pm_low: 350.5, pm_high: 500.0, aqi_low: 401.0, aqi_high: 500.0 },
    Band { pm_low: 250.5, pm_high: 350.5, aqi_low: 301.0, aqi_high: 400.0 },
    Band { pm_low: 150.5, pm_high: 250.5, aqi_low: 201.0, aqi_high: 300.0 },
    Band { pm_low: 55.5, pm_high: 150.5, aqi_low: 151.0, aqi_high: 200.0 },
    Band { pm_low: 35.5, pm_high: 55.5, aqi_low: 101.0, aqi_high: 150.0 },
    Band { pm_low: 12.1, pm_high: 35.5, aqi_low: 51.0, aqi_high: 100.0 },
    Band { pm_low: 0.0, pm_high: 12.1, aqi_low: 0.0, aqi_high: 50.0 },
];

/// Category thresholds, most severe first. The category index is the
/// position of the first threshold the AQI reaches.
const CATEGORY_THRESHOLDS: [u16; 6] = [301, 201, 151, 101, 51, 0];

/// Display color per category index (maroon → green)
const CATEGORY_COLORS: [Rgb888; 6] = [
    Rgb888::new(106, 0, 27),   // hazardous
    Rgb888::new(255, 0, 255),  // very unhealthy
    Rgb888::new(255, 0, 0),    // unhealthy
    Rgb888::new(255, 165, 0),  // unhealthy for sensitive groups
    Rgb888::new(255, 255, 0),  // moderate
    Rgb888::new(0, 255, 0),    // good
];

/// Color shown when no valid AQI is available
pub const UNKNOWN_COLOR: Rgb888 = Rgb888::new(150, 150, 150);

/// The sensor reported a concentration below zero
///
/// No AQI is fabricated for such a reading; the caller keeps whatever it
/// showed before.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InvalidReading;

/// A computed air-quality reading
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AirQualityReading {
    /// The (clamped) concentration the AQI was derived from, µg/m³
    pub pm25: f32,
    /// Air Quality Index
    pub aqi: u16,
    /// Severity category, 0 (hazardous) ..= 5 (good)
    pub category: u8,
    /// Display color for the category
    pub color: Rgb888,
}

/// Compute the AQI reading for a raw PM2.5 concentration.
///
/// Concentrations above [`MAX_PM25`] are clamped first. Interpolation
/// rounds half away from zero.
pub fn compute(raw_pm25: f32) -> Result<AirQualityReading, InvalidReading> {
    if raw_pm25 < 0.0 {
        return Err(InvalidReading);
    }

    let pm = if raw_pm25 > MAX_PM25 { MAX_PM25 } else { raw_pm25 };

    // Last band matches pm == 0.0, so the search cannot fail.
    let band = BANDS
        .iter()
        .find(|b| pm > b.pm_low)
        .unwrap_or(&BANDS[BANDS.len() - 1]);

    // wikipedia.org/wiki/Air_quality_index#Computing_the_AQI
    let aqi = roundf(
        (band.aqi_high - band.aqi_low) / (band.pm_high - band.pm_low) * (pm - band.pm_low)
            + band.aqi_low,
    ) as u16;

    let category = category_index(aqi);

    Ok(AirQualityReading {
        pm25: pm,
        aqi,
        category,
        color: category_color(category),
    })
}

/// Severity category for an AQI value, 0 (hazardous) ..= 5 (good)
pub fn category_index(aqi: u16) -> u8 {
    for (index, threshold) in CATEGORY_THRESHOLDS.iter().enumerate() {
        if aqi >= *threshold {
            return index as u8;
        }
    }
    // Unreachable for unsigned AQI (last threshold is 0), kept as the
    // explicit fallthrough.
    (CATEGORY_THRESHOLDS.len() - 1) as u8
}

/// Display color for a category index; out-of-range indices get
/// [`UNKNOWN_COLOR`]
pub fn category_color(category: u8) -> Rgb888 {
    CATEGORY_COLORS
        .get(category as usize)
        .copied()
        .unwrap_or(UNKNOWN_COLOR)
}
