//! DS3231 battery-backed clock
//!
//! Implements the core [`LocalClock`] seam over the external RTC, so the
//! panel keeps plausible time across power cycles between network syncs.

use aither_core::clock::CalendarTime;
use aither_core::traits::{ClockError, LocalClock};
use ds323x::interface::I2cInterface;
use ds323x::{ic, DateTimeAccess, Datelike, Ds323x, NaiveDate, Timelike};

/// DS3231 RTC behind the shared I2C bus
pub struct RtcClock<I2C> {
    rtc: Ds323x<I2cInterface<I2C>, ic::DS3231>,
}

impl<I2C, E> RtcClock<I2C>
where
    I2C: embedded_hal::i2c::I2c<Error = E>,
{
    pub fn new(i2c: I2C) -> Self {
        Self {
            rtc: Ds323x::new_ds3231(i2c),
        }
    }

    /// Clear the oscillator-stopped flag left over from a dead battery;
    /// until the first sync the chip then free-runs from its power-on
    /// default.
    pub fn clear_stopped_flag(&mut self) {
        if self.rtc.has_been_stopped().unwrap_or(false) {
            defmt::info!("RTC oscillator was stopped, clearing flag");
            let _ = self.rtc.clear_has_been_stopped_flag();
        }
    }
}

impl<I2C, E> LocalClock for RtcClock<I2C>
where
    I2C: embedded_hal::i2c::I2c<Error = E>,
{
    fn now(&mut self) -> Result<CalendarTime, ClockError> {
        let dt = self
            .rtc
            .datetime()
            .map_err(|_| ClockError::Unavailable)?;

        Ok(CalendarTime {
            year: dt.year() as u16,
            month: dt.month() as u8,
            day: dt.day() as u8,
            hour: dt.hour() as u8,
            minute: dt.minute() as u8,
            second: dt.second() as u8,
            weekday: dt.weekday().num_days_from_monday() as u8,
        })
    }

    fn set(&mut self, time: &CalendarTime) -> Result<(), ClockError> {
        let dt = NaiveDate::from_ymd_opt(
            i32::from(time.year),
            u32::from(time.month),
            u32::from(time.day),
        )
        .and_then(|d| {
            d.and_hms_opt(
                u32::from(time.hour),
                u32::from(time.minute),
                u32::from(time.second),
            )
        })
        .ok_or(ClockError::InvalidTime)?;

        self.rtc
            .set_datetime(&dt)
            .map_err(|_| ClockError::Unavailable)
    }
}
