#![cfg_attr(not(feature = "std"), no_std)]
#![doc = include_str!("../README.md")]

//! # Core Concepts
//!
//! - **`DeviceHub`**: Owns the bus, sequences startup, and caches device state
//! - **`RegisterBus`**: Trait to implement for your transport (or use `I2cBus`)
//! - **`TimeSource`**: Trait to implement for your timing system
//! - **`Register`**: Named entry in the immutable `REGISTER_MAP`
//! - **`LastKnown`**: Cached register value that tracks staleness
//! - **`HubEvent`**: Change notification drained by adapters via `poll_event`
//!
//! The device needs about two seconds after power-on to measure the mains
//! frequency. Call [`DeviceHub::service`] periodically; it waits out that delay,
//! probes the firmware version once, and from then on refreshes the status
//! register once per interval. A failed probe is fatal: the hub stays
//! [`HubState::Failed`] until it is rebuilt.

pub mod bus;
pub mod command;
pub mod event;
pub mod hub;
pub mod registers;
pub mod time;
pub mod types;

pub use bus::{DEFAULT_I2C_ADDRESS, I2cBus, RegisterBus};
pub use command::Command;
pub use event::{EVENT_QUEUE_CAPACITY, EventQueue, HubEvent};
pub use hub::{
    DeviceCache, DeviceHub, DeviceInfo, HubConfig, HubError, HubState, MAX_LEVEL, ServiceTiming,
};
pub use registers::{Access, Encoding, REGISTER_MAP, Register, RegisterInfo};
#[cfg(feature = "embassy-time")]
pub use time::SystemClock;
pub use time::{TimeDuration, TimeInstant, TimeSource};
pub use types::{DimmingCurve, ErrorCode, LastKnown, Status};

/// Time the device needs after power-on before it answers on the bus.
pub const STARTUP_DELAY_MS: u64 = 2000;

/// Minimum time between two status register refreshes.
pub const STATUS_UPDATE_INTERVAL_MS: u64 = 1000;
