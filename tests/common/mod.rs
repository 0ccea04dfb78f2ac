//! Shared test infrastructure for dimmerlink integration tests

#![allow(dead_code)] // Items used across multiple test files; Rust analyzes per-file

use dimmerlink::{DeviceHub, Register, RegisterBus, TimeDuration, TimeInstant, TimeSource};

// ============================================================================
// Time
// ============================================================================

/// Milliseconds on the test clock
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TestDuration(pub u64);

impl TimeDuration for TestDuration {
    const ZERO: Self = TestDuration(0);

    fn as_millis(&self) -> u64 {
        self.0
    }

    fn from_millis(millis: u64) -> Self {
        TestDuration(millis)
    }

    fn saturating_sub(self, other: Self) -> Self {
        TestDuration(self.0.saturating_sub(other.0))
    }
}

/// Milliseconds since the test clock started
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TestInstant(pub u64);

impl TimeInstant for TestInstant {
    type Duration = TestDuration;

    fn duration_since(&self, earlier: Self) -> Self::Duration {
        TestDuration(self.0.saturating_sub(earlier.0))
    }
}

// ============================================================================
// Clock
// ============================================================================

/// Manually stepped clock shared by a hub and its test
pub struct MockTimeSource {
    current_time: core::cell::Cell<TestInstant>,
}

impl MockTimeSource {
    pub fn new() -> Self {
        Self {
            current_time: core::cell::Cell::new(TestInstant(0)),
        }
    }

    /// Moves the clock forward
    pub fn advance(&self, duration: TestDuration) {
        let current = self.current_time.get();
        self.current_time.set(TestInstant(current.0 + duration.0));
    }

    pub fn set_time(&self, time: TestInstant) {
        self.current_time.set(time);
    }
}

impl TimeSource<TestInstant> for MockTimeSource {
    fn now(&self) -> TestInstant {
        self.current_time.get()
    }
}

// ============================================================================
// Mock Bus
// ============================================================================

/// Error returned by [`MockBus`] when failure injection is active
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockBusError;

/// One recorded bus transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transaction {
    Read { address: u8, len: usize },
    Write { address: u8, value: u8 },
}

/// Simulated device: a 256-byte register file with failure injection.
///
/// Writes land in the register file, so reads echo back what was written.
pub struct MockBus {
    registers: [u8; 256],
    fail_reads: bool,
    fail_writes: bool,
    failing_address: Option<u8>,
    transaction_count: usize,
    log: heapless::Vec<Transaction, 64>,
}

impl MockBus {
    /// A device with every register zeroed
    pub fn new() -> Self {
        Self {
            registers: [0; 256],
            fail_reads: false,
            fail_writes: false,
            failing_address: None,
            transaction_count: 0,
            log: heapless::Vec::new(),
        }
    }

    /// A calibrated device on a 50 Hz grid reporting firmware version 1
    pub fn healthy() -> Self {
        let mut bus = Self::new();
        bus.set_register(Register::Status, 0x01);
        bus.set_register(Register::Version, 1);
        bus.set_register(Register::AcFrequency, 50);
        bus.set_register(Register::Calibration, 1);
        bus.set_bytes(0x21, &[0x10, 0x27]);
        bus
    }

    pub fn set_register(&mut self, register: Register, value: u8) {
        self.registers[register.address() as usize] = value;
    }

    pub fn set_bytes(&mut self, address: u8, bytes: &[u8]) {
        let start = address as usize;
        self.registers[start..start + bytes.len()].copy_from_slice(bytes);
    }

    pub fn register(&self, register: Register) -> u8 {
        self.registers[register.address() as usize]
    }

    /// Make every transaction fail
    pub fn fail_all(&mut self, fail: bool) {
        self.fail_reads = fail;
        self.fail_writes = fail;
    }

    pub fn fail_reads(&mut self, fail: bool) {
        self.fail_reads = fail;
    }

    pub fn fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    /// Make only transactions touching `register` fail
    pub fn fail_register(&mut self, register: Option<Register>) {
        self.failing_address = register.map(Register::address);
    }

    pub fn transaction_count(&self) -> usize {
        self.transaction_count
    }

    /// Recorded transactions (the first 64 since the last clear)
    pub fn transactions(&self) -> &[Transaction] {
        &self.log
    }

    pub fn reads_of(&self, register: Register) -> usize {
        self.log
            .iter()
            .filter(|t| matches!(t, Transaction::Read { address, .. } if *address == register.address()))
            .count()
    }

    pub fn clear_log(&mut self) {
        self.transaction_count = 0;
        self.log.clear();
    }

    fn record(&mut self, transaction: Transaction) {
        self.transaction_count += 1;
        let _ = self.log.push(transaction);
    }
}

impl RegisterBus for MockBus {
    type Error = MockBusError;

    fn read(&mut self, address: u8, buffer: &mut [u8]) -> Result<(), Self::Error> {
        self.record(Transaction::Read {
            address,
            len: buffer.len(),
        });

        if self.fail_reads || self.failing_address == Some(address) {
            return Err(MockBusError);
        }

        let start = address as usize;
        buffer.copy_from_slice(&self.registers[start..start + buffer.len()]);
        Ok(())
    }

    fn write(&mut self, address: u8, value: u8) -> Result<(), Self::Error> {
        self.record(Transaction::Write { address, value });

        if self.fail_writes || self.failing_address == Some(address) {
            return Err(MockBusError);
        }

        self.registers[address as usize] = value;
        Ok(())
    }
}

// ============================================================================
// Helpers
// ============================================================================

pub type TestHub<'t> = DeviceHub<'t, MockBus, TestInstant, MockTimeSource>;

/// Startup delay used by default-configured hubs
pub const STARTUP: TestDuration = TestDuration(2000);

/// Status refresh interval used by default-configured hubs
pub const INTERVAL: TestDuration = TestDuration(1000);

/// Builds a hub and services it past the startup delay, then clears the bus log
pub fn initialized_hub(bus: MockBus, timer: &MockTimeSource) -> TestHub<'_> {
    let mut hub = DeviceHub::new(bus, timer);
    timer.advance(STARTUP);
    hub.service().unwrap();
    assert!(hub.is_initialized());
    hub.bus_mut().clear_log();
    hub
}

/// Drains all pending events
pub fn drain_events(hub: &mut TestHub<'_>) -> heapless::Vec<dimmerlink::HubEvent, 16> {
    let mut events = heapless::Vec::new();
    while let Some(event) = hub.poll_event() {
        let _ = events.push(event);
    }
    events
}
