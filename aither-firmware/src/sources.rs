//! Network data sources
//!
//! Concrete implementations of the core collaborator traits: PurpleAir
//! for PM2.5, OpenWeatherMap for current conditions, and SNTP for the
//! clock resync. Each fetch is bounded by a deadline; expiry and parse
//! trouble both degrade to a [`FetchError`] the control loop absorbs.

use aither_core::clock::CalendarTime;
use aither_core::config::Units;
use aither_core::traits::{
    AirQualitySource, FetchError, TimeService, WeatherObservation, WeatherSource,
};
use core::fmt::Write;
use embassy_net::dns::DnsQueryType;
use embassy_net::udp::{PacketMetadata, UdpSocket};
use embassy_net::Stack;
use embassy_time::{with_timeout, Duration};
use heapless::String;
use serde::Deserialize;

use crate::net::http_get;

/// Deadline for one complete fetch, DNS included
const FETCH_DEADLINE: Duration = Duration::from_secs(15);

const PURPLEAIR_HOST: &str = "www.purpleair.com";
const OPENWEATHER_HOST: &str = "api.openweathermap.org";
const NTP_HOST: &str = "pool.ntp.org";
const NTP_PORT: u16 = 123;

/// Seconds between the NTP epoch (1900) and the Unix epoch (1970)
const NTP_UNIX_OFFSET: u64 = 2_208_988_800;

// ── PurpleAir ───────────────────────────────────────────────────────

/// The slice of the PurpleAir payload we care about: the sensor's
/// channels, each carrying PM2.5 as a decimal string
#[derive(Deserialize)]
struct AirPayload<'a> {
    #[serde(borrow)]
    results: heapless::Vec<AirResult<'a>, 2>,
}

#[derive(Deserialize)]
struct AirResult<'a> {
    #[serde(rename = "PM2_5Value", borrow)]
    pm25: &'a str,
}

/// PM2.5 from a PurpleAir sensor
pub struct PurpleAirSource {
    stack: Stack<'static>,
    path: String<64>,
}

impl PurpleAirSource {
    pub fn new(stack: Stack<'static>, sensor_id: u32) -> Self {
        let mut path = String::new();
        let _ = write!(path, "/json?show={sensor_id}");
        Self { stack, path }
    }
}

impl AirQualitySource for PurpleAirSource {
    async fn fetch_pm25(&mut self) -> Result<f32, FetchError> {
        let mut buf = [0u8; 8192];
        let body = with_timeout(
            FETCH_DEADLINE,
            http_get(self.stack, PURPLEAIR_HOST, &self.path, &mut buf),
        )
        .await
        .map_err(|_| FetchError::Timeout)??;

        let (payload, _) = serde_json_core::from_slice::<AirPayload>(body)
            .map_err(|_| FetchError::Malformed)?;

        // First result is the sensor's primary channel.
        let first = payload.results.first().ok_or(FetchError::Malformed)?;
        first.pm25.parse::<f32>().map_err(|_| FetchError::Malformed)
    }
}

// ── OpenWeatherMap ──────────────────────────────────────────────────

#[derive(Deserialize)]
struct WeatherPayload {
    current: CurrentConditions,
    hourly: heapless::Vec<HourlyEntry, 48>,
}

#[derive(Deserialize)]
struct CurrentConditions {
    temp: f32,
}

#[derive(Deserialize)]
struct HourlyEntry {
    pop: f32,
}

/// Current temperature and hour-ahead precipitation probability from the
/// OpenWeatherMap one-call endpoint
pub struct OpenWeatherSource {
    stack: Stack<'static>,
    path: String<192>,
}

impl OpenWeatherSource {
    pub fn new(
        stack: Stack<'static>,
        latitude: f32,
        longitude: f32,
        units: Units,
        api_key: &str,
    ) -> Self {
        let mut path = String::new();
        let _ = write!(
            path,
            "/data/2.5/onecall?lat={latitude}&lon={longitude}&units={}&appid={api_key}&exclude=daily,minutely,alerts",
            units.as_str(),
        );
        Self { stack, path }
    }
}

impl WeatherSource for OpenWeatherSource {
    async fn fetch(&mut self) -> Result<WeatherObservation, FetchError> {
        let mut buf = [0u8; 24576];
        let body = with_timeout(
            FETCH_DEADLINE,
            http_get(self.stack, OPENWEATHER_HOST, &self.path, &mut buf),
        )
        .await
        .map_err(|_| FetchError::Timeout)??;

        let (payload, _) = serde_json_core::from_slice::<WeatherPayload>(body)
            .map_err(|_| FetchError::Malformed)?;

        let pop = payload.hourly.first().ok_or(FetchError::Malformed)?.pop;

        Ok(WeatherObservation {
            temperature: payload.current.temp,
            precipitation: pop,
        })
    }
}

// ── SNTP ────────────────────────────────────────────────────────────

/// Calendar time over SNTP, shifted into the configured zone
pub struct SntpTimeService {
    stack: Stack<'static>,
    utc_offset_minutes: i32,
}

impl SntpTimeService {
    pub fn new(stack: Stack<'static>, utc_offset_minutes: i32) -> Self {
        Self {
            stack,
            utc_offset_minutes,
        }
    }
}

impl TimeService for SntpTimeService {
    async fn fetch(&mut self) -> Result<CalendarTime, FetchError> {
        let unix = with_timeout(FETCH_DEADLINE, sntp_unix_time(self.stack))
            .await
            .map_err(|_| FetchError::Timeout)??;

        let local = unix as i64 + i64::from(self.utc_offset_minutes) * 60;
        if local < 0 {
            return Err(FetchError::Malformed);
        }
        Ok(CalendarTime::from_unix(local as u64))
    }
}

/// One SNTP exchange: 48-byte client packet out, transmit timestamp back
async fn sntp_unix_time(stack: Stack<'static>) -> Result<u64, FetchError> {
    let addrs = stack
        .dns_query(NTP_HOST, DnsQueryType::A)
        .await
        .map_err(|_| FetchError::Transport)?;
    let addr = *addrs.first().ok_or(FetchError::Transport)?;

    let mut rx_meta = [PacketMetadata::EMPTY; 1];
    let mut rx_buffer = [0u8; 128];
    let mut tx_meta = [PacketMetadata::EMPTY; 1];
    let mut tx_buffer = [0u8; 128];
    let mut socket = UdpSocket::new(
        stack,
        &mut rx_meta,
        &mut rx_buffer,
        &mut tx_meta,
        &mut tx_buffer,
    );
    socket.bind(0).map_err(|_| FetchError::Transport)?;

    let mut packet = [0u8; 48];
    packet[0] = 0x1B; // LI=0, VN=3, Mode=3 (client)

    socket
        .send_to(&packet, (addr, NTP_PORT))
        .await
        .map_err(|_| FetchError::Transport)?;

    let (len, _) = socket
        .recv_from(&mut packet)
        .await
        .map_err(|_| FetchError::Transport)?;
    if len < 48 {
        return Err(FetchError::Malformed);
    }

    // Transmit timestamp seconds live at bytes 40..44, epoch 1900.
    let secs = u32::from_be_bytes([packet[40], packet[41], packet[42], packet[43]]);
    Ok(u64::from(secs).saturating_sub(NTP_UNIX_OFFSET))
}
