//! Aither - Air Quality & Weather Panel
//!
//! Firmware for a Raspberry Pi Pico 2 W driving a small status panel:
//! time/date/weekday from an SNTP-synced DS3231, PM2.5 as a colored AQI
//! readout, and the hour-ahead weather, with a NeoPixel mirroring what
//! the control loop is doing. All decision logic lives in `aither-core`;
//! this crate only brings hardware up and wires the collaborators in.

#![no_std]
#![no_main]

use core::cell::RefCell;

use cyw43_pio::{PioSpi, RM2_CLOCK_DIVIDER};
use defmt::{info, unwrap};
use defmt_rtt as _;
use embassy_embedded_hal::shared_bus::blocking::i2c::I2cDevice;
use embassy_executor::Spawner;
use embassy_net::StackResources;
use embassy_rp::bind_interrupts;
use embassy_rp::block::ImageDef;
use embassy_rp::config::Config;
use embassy_rp::gpio::{Level, Output};
use embassy_rp::i2c::{Blocking, Config as I2cConfig, I2c};
use embassy_rp::peripherals::{I2C0, PIO0, PIO1};
use embassy_rp::pio::{InterruptHandler as PioInterruptHandler, Pio};
use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use panic_probe as _;
use static_cell::StaticCell;

mod channels;
mod display;
mod led;
mod net;
mod orchestrate;
mod rtc;
mod sources;

// ── Station parameters (edit for your site) ─────────────────────────

/// Wi-Fi credentials, injected at build time
pub(crate) const WIFI_SSID: &str = env!("WIFI_SSID");
pub(crate) const WIFI_PASSWORD: &str = env!("WIFI_PASS");

/// OpenWeatherMap API key, injected at build time
pub(crate) const OPENWEATHER_TOKEN: &str = env!("OPENWEATHER_TOKEN");

/// PurpleAir sensor to read
pub(crate) const SENSOR_ID: u32 = 65489;

/// Station coordinates
pub(crate) const LATITUDE: f32 = 44.9778;
pub(crate) const LONGITUDE: f32 = -93.2650;

/// Local offset from UTC in minutes (CDT)
pub(crate) const UTC_OFFSET_MINUTES: i32 = -5 * 60;

// ────────────────────────────────────────────────────────────────────

/// Firmware image type for bootloader
#[link_section = ".start_block"]
#[used]
pub static IMAGE_DEF: ImageDef = ImageDef::secure_exe();

bind_interrupts!(pub struct Irqs {
    PIO0_IRQ_0 => PioInterruptHandler<PIO0>;
    PIO1_IRQ_0 => PioInterruptHandler<PIO1>;
});

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    let p = embassy_rp::init(Config::default());
    info!("aither starting");

    // Shared blocking I2C bus: SSD1306 + DS3231
    let i2c = I2c::new_blocking(p.I2C0, p.PIN_17, p.PIN_16, I2cConfig::default());
    static I2C_BUS: StaticCell<Mutex<NoopRawMutex, RefCell<I2c<'static, I2C0, Blocking>>>> =
        StaticCell::new();
    let i2c_bus = I2C_BUS.init(Mutex::new(RefCell::new(i2c)));
    let display_i2c = I2cDevice::new(i2c_bus);
    let rtc_i2c = I2cDevice::new(i2c_bus);

    // CYW43 firmware, flashed separately (see the embassy cyw43 examples):
    //   probe-rs download 43439A0.bin --binary-format bin --chip RP235x --base-address 0x101b0000
    //   probe-rs download 43439A0_clm.bin --binary-format bin --chip RP235x --base-address 0x101f8000
    let (fw, clm) = unsafe {
        (
            core::slice::from_raw_parts(0x101b0000 as *const u8, 230321),
            core::slice::from_raw_parts(0x101f8000 as *const u8, 4752),
        )
    };

    let pwr = Output::new(p.PIN_23, Level::Low);
    let cs = Output::new(p.PIN_25, Level::High);
    let mut pio = Pio::new(p.PIO0, Irqs);
    let spi = PioSpi::new(
        &mut pio.common,
        pio.sm0,
        RM2_CLOCK_DIVIDER,
        pio.irq0,
        cs,
        p.PIN_24,
        p.PIN_29,
        p.DMA_CH0,
    );

    static STATE: StaticCell<cyw43::State> = StaticCell::new();
    let state = STATE.init(cyw43::State::new());
    let (net_device, mut control, runner) = cyw43::new(state, pwr, spi, fw).await;
    unwrap!(spawner.spawn(net::cyw43_task(runner)));

    control.init(clm).await;
    control
        .set_power_management(cyw43::PowerManagementMode::PowerSave)
        .await;

    let mut dhcp_config = embassy_net::DhcpConfig::default();
    dhcp_config.hostname = Some(unwrap!(heapless::String::try_from("aither")));

    static RESOURCES: StaticCell<StackResources<8>> = StaticCell::new();
    let (stack, runner) = embassy_net::new(
        net_device,
        embassy_net::Config::dhcpv4(dhcp_config),
        RESOURCES.init(StackResources::new()),
        0x8f8e_1b4d_7a06_c2e5, // network stack seed; nothing secret here
    );
    unwrap!(spawner.spawn(net::net_task(runner)));

    unwrap!(spawner.spawn(display::display_task(display_i2c)));
    unwrap!(spawner.spawn(led::led_task(p.PIO1, p.DMA_CH1, p.PIN_15)));
    unwrap!(spawner.spawn(orchestrate::orchestrate_task(control, stack, rtc_i2c)));

    info!("all tasks spawned");
}
