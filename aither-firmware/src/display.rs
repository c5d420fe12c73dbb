//! Panel rendering task
//!
//! Draws the five text fields of each panel snapshot on a 128x64 SSD1306.
//! The OLED is monochrome, so the AQI and status colors are carried by
//! the NeoPixel and the logs rather than the glass. Layout is fixed:
//! clock row on top, AQI in the middle, weather at the bottom.

use aither_core::panel::PanelState;
use defmt::{error, warn};
use embassy_embedded_hal::shared_bus::blocking::i2c::I2cDevice;
use embassy_rp::i2c::{Blocking, I2c};
use embassy_rp::peripherals::I2C0;
use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use embedded_graphics::mono_font::ascii::FONT_6X10;
use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::text::Text;
use ssd1306::{prelude::*, I2CDisplayInterface, Ssd1306};

use crate::channels::PANEL_CHANNEL;

#[embassy_executor::task]
pub async fn display_task(
    i2c: I2cDevice<'static, NoopRawMutex, I2c<'static, I2C0, Blocking>>,
) {
    let interface = I2CDisplayInterface::new(i2c);
    let mut display = Ssd1306::new(interface, DisplaySize128x64, DisplayRotation::Rotate0)
        .into_buffered_graphics_mode();

    if display.init().is_err() {
        // Startup failure is fatal for rendering; the rest of the system
        // keeps running and logging.
        error!("display init failed");
        return;
    }

    let style = MonoTextStyle::new(&FONT_6X10, BinaryColor::On);

    loop {
        let state: PanelState = PANEL_CHANNEL.receive().await;

        let _ = display.clear(BinaryColor::Off);
        draw_fields(&mut display, &state, style);

        if display.flush().is_err() {
            warn!("display flush failed");
        }
    }
}

fn draw_fields<D>(target: &mut D, state: &PanelState, style: MonoTextStyle<'_, BinaryColor>)
where
    D: DrawTarget<Color = BinaryColor>,
{
    let _ = Text::new(state.time_text.as_str(), Point::new(0, 10), style).draw(target);
    let _ = Text::new(state.date_text.as_str(), Point::new(68, 10), style).draw(target);
    let _ = Text::new(state.weekday_text.as_str(), Point::new(104, 10), style).draw(target);
    let _ = Text::new(state.aqi_text.as_str(), Point::new(0, 34), style).draw(target);
    let _ = Text::new(state.weather_text.as_str(), Point::new(0, 58), style).draw(target);
}
