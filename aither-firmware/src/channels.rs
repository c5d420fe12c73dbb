//! Inter-task communication
//!
//! Static embassy-sync primitives connecting the control loop to the
//! display and status-pixel tasks. The control loop owns the panel state;
//! the other tasks only ever see snapshots.

use aither_core::panel::PanelState;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;
use embedded_graphics::pixelcolor::Rgb888;

/// Capacity of the panel snapshot channel
const PANEL_CHANNEL_SIZE: usize = 2;

/// Panel snapshots from the control loop to the display task
pub static PANEL_CHANNEL: Channel<CriticalSectionRawMutex, PanelState, PANEL_CHANNEL_SIZE> =
    Channel::new();

/// Status pixel color (latest wins)
pub static STATUS_COLOR: Signal<CriticalSectionRawMutex, Rgb888> = Signal::new();
