//! The control loop task
//!
//! Brings the network up (status pixel: red → blue → green), then ticks
//! the core [`Station`] once a second with the concrete collaborators.
//! Every tick produces a panel snapshot for the display task; frames are
//! dropped, never queued up, if the display falls behind.

use aither_core::config::StationConfig;
use aither_core::station::{Services, Station};
use aither_core::traits::StatusIndicator;
use cyw43::{Control, JoinOptions};
use defmt::{info, warn};
use embassy_embedded_hal::shared_bus::blocking::i2c::I2cDevice;
use embassy_net::Stack;
use embassy_rp::i2c::{Blocking, I2c};
use embassy_rp::peripherals::I2C0;
use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use embassy_time::{with_timeout, Duration, Instant, Ticker, Timer};

use crate::channels::PANEL_CHANNEL;
use crate::led::PanelIndicator;
use crate::rtc::RtcClock;
use crate::sources::{OpenWeatherSource, PurpleAirSource, SntpTimeService};

/// Deadline for one Wi-Fi join attempt
const JOIN_DEADLINE: Duration = Duration::from_secs(20);

/// Pause between failed join attempts
const JOIN_RETRY_DELAY: Duration = Duration::from_secs(2);

/// Deadline for the DHCP lease after association
const DHCP_DEADLINE: Duration = Duration::from_secs(30);

/// Control loop tick interval
const TICK_INTERVAL: Duration = Duration::from_secs(1);

#[embassy_executor::task]
pub async fn orchestrate_task(
    mut control: Control<'static>,
    stack: Stack<'static>,
    rtc_i2c: I2cDevice<'static, NoopRawMutex, I2c<'static, I2C0, Blocking>>,
) {
    let config = StationConfig {
        sensor_id: crate::SENSOR_ID,
        latitude: crate::LATITUDE,
        longitude: crate::LONGITUDE,
        utc_offset_minutes: crate::UTC_OFFSET_MINUTES,
        ..StationConfig::default()
    };

    let mut clock = RtcClock::new(rtc_i2c);
    clock.clear_stopped_flag();

    let mut station = Station::new(&config, Instant::now().as_millis());
    let mut services = Services {
        clock,
        time: SntpTimeService::new(stack, config.utc_offset_minutes),
        air: PurpleAirSource::new(stack, config.sensor_id),
        weather: OpenWeatherSource::new(
            stack,
            config.latitude,
            config.longitude,
            config.units,
            crate::OPENWEATHER_TOKEN,
        ),
        indicator: PanelIndicator,
    };

    // Not associated yet: show it before the first attempt.
    services.indicator.set(station.panel().status_color);

    loop {
        station.connect_started(&mut services.indicator);
        info!("joining {}", crate::WIFI_SSID);
        match with_timeout(
            JOIN_DEADLINE,
            control.join(crate::WIFI_SSID, JoinOptions::new(crate::WIFI_PASSWORD.as_bytes())),
        )
        .await
        {
            Ok(Ok(())) => break,
            Ok(Err(e)) => {
                warn!("join failed: status={}", e.status);
                station.link_lost(&mut services.indicator);
            }
            Err(_) => {
                warn!("join timed out");
                station.link_lost(&mut services.indicator);
            }
        }
        Timer::after(JOIN_RETRY_DELAY).await;
    }

    info!("associated, waiting for DHCP");
    if with_timeout(DHCP_DEADLINE, stack.wait_config_up()).await.is_err() {
        // Not fatal: fetches fail recoverably until the lease arrives.
        warn!("no DHCP lease yet, continuing");
    }
    if let Some(v4) = stack.config_v4() {
        info!("address {}", v4.address);
    }
    station.connected(&mut services.indicator);

    let mut ticker = Ticker::every(TICK_INTERVAL);
    loop {
        let panel = station.tick(Instant::now().as_millis(), &mut services).await;
        if PANEL_CHANNEL.try_send(panel.clone()).is_err() {
            defmt::trace!("display behind, dropping frame");
        }
        ticker.next().await;
    }
}
