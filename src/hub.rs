//! DimmerLink hub driver with startup sequencing and cached device state.
//!
//! Provides [`DeviceHub`], which owns the register transport, waits out the
//! device's power-on calibration, verifies the device answers, and then keeps a
//! status cache fresh from the caller's periodic [`service`](DeviceHub::service)
//! calls. Getters read live and fall back to the last known value when the bus
//! misbehaves.

use crate::bus::RegisterBus;
use crate::command::Command;
use crate::event::{EventQueue, HubEvent};
use crate::registers::Register;
use crate::time::{TimeDuration, TimeInstant, TimeSource};
use crate::types::{DimmingCurve, ErrorCode, LastKnown, Status};
use crate::{STARTUP_DELAY_MS, STATUS_UPDATE_INTERVAL_MS};

/// Highest accepted brightness level, in percent.
pub const MAX_LEVEL: u8 = 100;

/// Lifecycle of a hub.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HubState {
    /// Waiting for the startup delay or the version probe.
    Uninitialized,
    /// Device answered the probe. Normal operation.
    Initialized,
    /// Version probe failed. Terminal.
    Failed,
}

/// Timing information returned by [`DeviceHub::service`].
///
/// Indicates when the hub next has work to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ServiceTiming<D> {
    /// Still inside the startup delay. Nothing was sent on the bus.
    ///
    /// Carries the time left until the version probe.
    Starting(D),

    /// Initialized. The next status refresh is due after this delay.
    Delay(D),
}

/// Errors reported by hub operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HubError<E> {
    /// The transport reported an error.
    Bus(E),
    /// The startup sequence has not completed yet.
    NotInitialized,
    /// The hub failed its startup probe and is permanently inoperative.
    Failed,
    /// Attempted to write a read-only register.
    ReadOnly(Register),
    /// Attempted to read a write-only register.
    WriteOnly(Register),
}

impl<E: core::fmt::Debug> core::fmt::Display for HubError<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            HubError::Bus(err) => write!(f, "bus transaction failed: {:?}", err),
            HubError::NotInitialized => write!(f, "device not initialized yet"),
            HubError::Failed => write!(f, "device failed to respond during startup"),
            HubError::ReadOnly(register) => {
                write!(f, "register {:?} is read-only", register)
            }
            HubError::WriteOnly(register) => {
                write!(f, "register {:?} is write-only", register)
            }
        }
    }
}

#[cfg(feature = "std")]
impl<E: core::fmt::Debug> std::error::Error for HubError<E> {}

/// Timing parameters for a hub.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HubConfig<D> {
    /// Time the device needs after power-on before it answers on the bus.
    pub startup_delay: D,
    /// Minimum time between two status refreshes.
    pub status_interval: D,
}

impl<D: TimeDuration> Default for HubConfig<D> {
    fn default() -> Self {
        Self {
            startup_delay: D::from_millis(STARTUP_DELAY_MS),
            status_interval: D::from_millis(STATUS_UPDATE_INTERVAL_MS),
        }
    }
}

/// Last known value of every register the hub reads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceCache {
    pub status: LastKnown<Status>,
    pub level: LastKnown<u8>,
    pub curve: LastKnown<DimmingCurve>,
    pub fade_time: LastKnown<u8>,
    pub error: LastKnown<ErrorCode>,
    pub version: LastKnown<u8>,
    pub ac_frequency: LastKnown<u8>,
    pub ac_period: LastKnown<u16>,
    pub calibration_done: LastKnown<bool>,
}

/// Snapshot of identifying device information.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceInfo {
    pub state: HubState,
    pub firmware_version: Option<u8>,
    pub ac_frequency: Option<u8>,
}

/// Driver for one DimmerLink device.
///
/// The hub is passive: it only touches the bus from [`service`](Self::service)
/// and from the control methods, all of which take `&mut self`.
///
/// # Type Parameters
/// * `'t` - Lifetime of the time source reference
/// * `B` - Register transport
/// * `I` - Time instant type
/// * `T` - Time source implementation type
pub struct DeviceHub<'t, B: RegisterBus, I: TimeInstant, T: TimeSource<I>> {
    bus: B,
    time_source: &'t T,
    config: HubConfig<I::Duration>,
    state: HubState,
    startup_time: I,
    last_status_update: Option<I>,
    cache: DeviceCache,
    events: EventQueue,
}

impl<'t, B: RegisterBus, I: TimeInstant, T: TimeSource<I>> DeviceHub<'t, B, I, T> {
    /// Creates a hub with the default startup delay and refresh interval.
    ///
    /// The startup delay starts counting now.
    pub fn new(bus: B, time_source: &'t T) -> Self {
        Self::with_config(bus, time_source, HubConfig::default())
    }

    /// Creates a hub with custom timing.
    pub fn with_config(bus: B, time_source: &'t T, config: HubConfig<I::Duration>) -> Self {
        #[cfg(feature = "defmt")]
        defmt::info!("Setting up DimmerLink hub");

        Self {
            bus,
            time_source,
            config,
            state: HubState::Uninitialized,
            startup_time: time_source.now(),
            last_status_update: None,
            cache: DeviceCache::default(),
            events: EventQueue::new(),
        }
    }

    /// Advances the startup sequence or refreshes the status cache.
    ///
    /// Call this periodically. Before the startup delay has elapsed it does
    /// nothing. The first call after the delay probes the firmware version and
    /// primes the cache. After that it re-reads the status register at most once
    /// per status interval.
    ///
    /// # Returns
    /// * `Ok(ServiceTiming)` - When to service next
    /// * `Err(HubError::Bus)` - The version probe failed; the hub is now `Failed`
    /// * `Err(HubError::Failed)` - The hub failed earlier and does nothing
    pub fn service(&mut self) -> Result<ServiceTiming<I::Duration>, HubError<B::Error>> {
        let now = self.time_source.now();

        match self.state {
            HubState::Failed => Err(HubError::Failed),
            HubState::Uninitialized => {
                let delay = self.config.startup_delay;
                if !now.has_elapsed(self.startup_time, delay) {
                    return Ok(ServiceTiming::Starting(now.remaining(self.startup_time, delay)));
                }

                self.initialize(now)?;
                Ok(ServiceTiming::Delay(self.config.status_interval))
            }
            HubState::Initialized => {
                let interval = self.config.status_interval;
                if let Some(last) = self.last_status_update {
                    if !now.has_elapsed(last, interval) {
                        return Ok(ServiceTiming::Delay(now.remaining(last, interval)));
                    }
                }

                self.refresh_status();
                // Advances even when the read failed.
                self.last_status_update = Some(now);
                Ok(ServiceTiming::Delay(interval))
            }
        }
    }

    fn initialize(&mut self, now: I) -> Result<(), HubError<B::Error>> {
        // Only bus access allowed while uninitialized.
        let mut version = [0u8; 1];
        if let Err(err) = self.bus_read(Register::Version, &mut version) {
            #[cfg(feature = "defmt")]
            defmt::error!("Failed to communicate with DimmerLink device");

            self.state = HubState::Failed;
            self.events.push(HubEvent::Failed);
            return Err(err);
        }

        let firmware_version = version[0];
        self.cache.version.update(firmware_version);
        self.state = HubState::Initialized;
        self.events.push(HubEvent::Initialized { firmware_version });

        #[cfg(feature = "defmt")]
        defmt::info!("DimmerLink initialized, firmware version: {}", firmware_version);

        // Best-effort priming, failures only leave the fields unknown.
        self.get_level();
        self.get_curve();
        self.get_ac_frequency();
        self.refresh_status();
        self.last_status_update = Some(now);

        Ok(())
    }

    fn refresh_status(&mut self) {
        let mut raw = [0u8; 1];
        match self.read_register(Register::Status, &mut raw) {
            Ok(()) => {
                let status = Status::from_bits_retain(raw[0]);
                if self.cache.status.value() != Some(status) {
                    self.events.push(HubEvent::StatusChanged(status));
                }
                self.cache.status.update(status);
            }
            Err(_) => self.cache.status.mark_stale(),
        }
    }

    /// Reads `buffer.len()` bytes starting at `register`.
    ///
    /// Performs exactly one bus transaction and never retries. Refused until
    /// startup completes.
    pub fn read_register(
        &mut self,
        register: Register,
        buffer: &mut [u8],
    ) -> Result<(), HubError<B::Error>> {
        if !register.access().readable() {
            return Err(HubError::WriteOnly(register));
        }
        self.ensure_initialized()?;

        self.bus_read(register, buffer)
    }

    fn bus_read(
        &mut self,
        register: Register,
        buffer: &mut [u8],
    ) -> Result<(), HubError<B::Error>> {
        self.bus.read(register.address(), buffer).map_err(|err| {
            #[cfg(feature = "defmt")]
            defmt::warn!("Failed to read register {}", register);
            HubError::Bus(err)
        })
    }

    /// Writes one byte to `register`.
    ///
    /// Performs exactly one bus transaction and never retries. Refused until
    /// startup completes.
    pub fn write_register(
        &mut self,
        register: Register,
        value: u8,
    ) -> Result<(), HubError<B::Error>> {
        if !register.access().writable() {
            return Err(HubError::ReadOnly(register));
        }
        self.ensure_initialized()?;

        self.bus.write(register.address(), value).map_err(|err| {
            #[cfg(feature = "defmt")]
            defmt::warn!("Failed to write register {}", register);
            HubError::Bus(err)
        })
    }

    fn ensure_initialized(&self) -> Result<(), HubError<B::Error>> {
        match self.state {
            HubState::Initialized => Ok(()),
            HubState::Uninitialized => Err(HubError::NotInitialized),
            HubState::Failed => Err(HubError::Failed),
        }
    }

    /// Live read with fallback to the cached value.
    ///
    /// Before initialization, or after a failure, only the cache is consulted.
    /// A read error, or a value `decode` rejects, marks the entry stale.
    fn refresh<V: Copy, const N: usize>(
        &mut self,
        register: Register,
        decode: fn([u8; N]) -> Option<V>,
        entry: fn(&mut DeviceCache) -> &mut LastKnown<V>,
    ) -> Option<V> {
        if self.state != HubState::Initialized {
            return entry(&mut self.cache).value();
        }

        let mut raw = [0u8; N];
        let fresh = match self.read_register(register, &mut raw) {
            Ok(()) => decode(raw),
            Err(_) => None,
        };

        let cached = entry(&mut self.cache);
        match fresh {
            Some(value) => cached.update(value),
            None => cached.mark_stale(),
        }
        cached.value()
    }

    /// Sets the brightness level, clamped to 0-100 percent.
    ///
    /// # Returns
    /// * `Ok(level)` - The level actually written
    /// * `Err` - Nothing was changed
    pub fn set_level(&mut self, percent: u8) -> Result<u8, HubError<B::Error>> {
        let level = percent.min(MAX_LEVEL);
        if let Err(err) = self.write_register(Register::Level, level) {
            #[cfg(feature = "defmt")]
            defmt::warn!("Failed to set level");
            return Err(err);
        }

        self.cache.level.update(level);
        self.events.push(HubEvent::LevelChanged(level));

        #[cfg(feature = "defmt")]
        defmt::debug!("Set level to {}%", level);

        Ok(level)
    }

    /// Current brightness level in percent.
    pub fn get_level(&mut self) -> Option<u8> {
        self.refresh(Register::Level, |raw: [u8; 1]| Some(raw[0]), |cache| &mut cache.level)
    }

    /// Selects the dimming curve.
    pub fn set_curve(&mut self, curve: DimmingCurve) -> Result<(), HubError<B::Error>> {
        if let Err(err) = self.write_register(Register::Curve, curve.as_raw()) {
            #[cfg(feature = "defmt")]
            defmt::warn!("Failed to set curve");
            return Err(err);
        }

        self.cache.curve.update(curve);
        self.events.push(HubEvent::CurveChanged(curve));

        #[cfg(feature = "defmt")]
        defmt::debug!("Set curve to {}", curve);

        Ok(())
    }

    /// Active dimming curve.
    ///
    /// An unknown curve code from the device is treated like a failed read.
    pub fn get_curve(&mut self) -> Option<DimmingCurve> {
        self.refresh(
            Register::Curve,
            |raw: [u8; 1]| DimmingCurve::from_raw(raw[0]),
            |cache| &mut cache.curve,
        )
    }

    /// Sets the fade time in units of 100 ms.
    pub fn set_fade_time(&mut self, units_100ms: u8) -> Result<(), HubError<B::Error>> {
        self.write_register(Register::FadeTime, units_100ms)?;

        self.cache.fade_time.update(units_100ms);
        self.events.push(HubEvent::FadeTimeChanged(units_100ms));
        Ok(())
    }

    /// Fade time in units of 100 ms, falling back to the cached value.
    pub fn get_fade_time(&mut self) -> Option<u8> {
        self.refresh(
            Register::FadeTime,
            |raw: [u8; 1]| Some(raw[0]),
            |cache| &mut cache.fade_time,
        )
    }

    /// Writes a command code. The device sends no acknowledgement.
    pub fn send_command(&mut self, command: Command) -> Result<(), HubError<B::Error>> {
        #[cfg(feature = "defmt")]
        defmt::debug!("Sending command: {=u8:#04x}", command.as_raw());

        self.write_register(Register::Command, command.as_raw())?;
        self.events.push(HubEvent::CommandSent(command));
        Ok(())
    }

    /// Sends [`Command::Reset`].
    pub fn reset(&mut self) -> Result<(), HubError<B::Error>> {
        #[cfg(feature = "defmt")]
        defmt::info!("Sending reset command");
        self.send_command(Command::Reset)
    }

    /// Sends [`Command::Recalibrate`].
    pub fn recalibrate(&mut self) -> Result<(), HubError<B::Error>> {
        #[cfg(feature = "defmt")]
        defmt::info!("Sending recalibrate command");
        self.send_command(Command::Recalibrate)
    }

    /// Ready bit of the last cached status. Never touches the bus.
    pub fn is_ready(&self) -> bool {
        self.cache
            .status
            .value()
            .is_some_and(|status| status.contains(Status::READY))
    }

    /// Error bit of the last cached status. Never touches the bus.
    pub fn has_error(&self) -> bool {
        self.cache
            .status
            .value()
            .is_some_and(|status| status.contains(Status::ERROR))
    }

    /// Last error reported by the device.
    pub fn get_error_code(&mut self) -> Option<ErrorCode> {
        self.refresh(
            Register::Error,
            |raw: [u8; 1]| Some(ErrorCode::from_raw(raw[0])),
            |cache| &mut cache.error,
        )
    }

    /// Firmware version captured by the startup probe.
    pub fn get_firmware_version(&self) -> Option<u8> {
        self.cache.version.value()
    }

    /// Measured mains frequency in Hz.
    pub fn get_ac_frequency(&mut self) -> Option<u8> {
        self.refresh(
            Register::AcFrequency,
            |raw: [u8; 1]| Some(raw[0]),
            |cache| &mut cache.ac_frequency,
        )
    }

    /// Mains frequency, only if it is a plausible 50 or 60 Hz.
    pub fn get_mains_frequency(&mut self) -> Option<u8> {
        self.get_ac_frequency().filter(|hz| matches!(*hz, 50 | 60))
    }

    /// Measured mains period, little-endian across two registers.
    pub fn get_ac_period(&mut self) -> Option<u16> {
        self.refresh(
            Register::AcPeriod,
            |raw: [u8; 2]| Some(u16::from_le_bytes(raw)),
            |cache| &mut cache.ac_period,
        )
    }

    /// Returns whether the device finished mains calibration.
    pub fn is_calibration_done(&mut self) -> Option<bool> {
        self.refresh(
            Register::Calibration,
            |raw: [u8; 1]| Some(raw[0] == 1),
            |cache| &mut cache.calibration_done,
        )
    }

    /// Returns the current lifecycle state.
    pub fn state(&self) -> HubState {
        self.state
    }

    /// Returns true once the startup probe succeeded.
    pub fn is_initialized(&self) -> bool {
        self.state == HubState::Initialized
    }

    /// Returns true if the startup probe failed.
    pub fn is_failed(&self) -> bool {
        self.state == HubState::Failed
    }

    /// Cached register values, including staleness.
    pub fn cache(&self) -> &DeviceCache {
        &self.cache
    }

    /// Identifying information from the cache.
    pub fn info(&self) -> DeviceInfo {
        DeviceInfo {
            state: self.state,
            firmware_version: self.cache.version.value(),
            ac_frequency: self.cache.ac_frequency.value(),
        }
    }

    /// Logs [`info`](Self::info) at info level.
    pub fn log_config(&self) {
        #[cfg(feature = "defmt")]
        {
            let info = self.info();
            defmt::info!("DimmerLink Hub:");
            if info.state == HubState::Failed {
                defmt::error!("  Communication failed!");
            } else {
                defmt::info!("  Firmware Version: {}", info.firmware_version);
                defmt::info!("  AC Frequency: {} Hz", info.ac_frequency);
            }
        }
    }

    /// Removes and returns the oldest pending event.
    pub fn poll_event(&mut self) -> Option<HubEvent> {
        self.events.pop()
    }

    /// Pending event queue.
    pub fn events(&self) -> &EventQueue {
        &self.events
    }

    /// Mutable access to the transport.
    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    /// Consumes the hub and returns the transport.
    pub fn release(self) -> B {
        self.bus
    }
}
