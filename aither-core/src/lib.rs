//! Board-agnostic core logic for the Aither panel
//!
//! This crate contains all application logic that does not depend on
//! specific hardware or network implementations:
//!
//! - Collaborator traits (local clock, time service, data sources, status indicator)
//! - Multi-cadence refresh scheduler
//! - PM2.5 → AQI engine
//! - Clock and weather formatting
//! - Panel state (the seven display fields)
//! - Status phase machine and the control loop that ties it all together

#![no_std]
#![deny(unsafe_code)]

// Host-side unit tests (proptest) need std.
#[cfg(test)]
extern crate std;

pub mod aqi;
pub mod clock;
pub mod config;
pub mod panel;
pub mod schedule;
pub mod station;
pub mod status;
pub mod traits;
pub mod weather;
