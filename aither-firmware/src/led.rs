//! Status NeoPixel
//!
//! A single WS2812 pixel shows what the control loop is doing. The loop
//! only signals a color; this task owns the PIO state machine and applies
//! the latest value.

use aither_core::traits::StatusIndicator;
use embassy_rp::peripherals::{DMA_CH1, PIN_15, PIO1};
use embassy_rp::pio::Pio;
use embassy_rp::pio_programs::ws2812::{PioWs2812, PioWs2812Program};
use embassy_rp::Peri;
use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::RgbColor;
use smart_leds::RGB8;

use crate::channels::STATUS_COLOR;

/// [`StatusIndicator`] handle for the control loop; setting a color just
/// latches it for the LED task
pub struct PanelIndicator;

impl StatusIndicator for PanelIndicator {
    fn set(&mut self, color: Rgb888) {
        STATUS_COLOR.signal(color);
    }
}

/// The pixel is painfully bright at full scale; shift everything down.
fn dim(channel: u8) -> u8 {
    channel >> 3
}

#[embassy_executor::task]
pub async fn led_task(
    pio: Peri<'static, PIO1>,
    dma: Peri<'static, DMA_CH1>,
    pin: Peri<'static, PIN_15>,
) {
    let Pio {
        mut common, sm0, ..
    } = Pio::new(pio, crate::Irqs);

    let program = PioWs2812Program::new(&mut common);
    let mut ws2812 = PioWs2812::new(&mut common, sm0, dma, pin, &program);

    loop {
        let color = STATUS_COLOR.wait().await;
        let pixel = [RGB8::new(dim(color.r()), dim(color.g()), dim(color.b()))];
        ws2812.write(&pixel).await;
    }
}
