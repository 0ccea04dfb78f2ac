//! Change notifications for adapters.
//!
//! The hub never calls into its consumers. Instead it records what changed in
//! a small bounded queue that light, sensor, and select adapters drain from
//! their own polling loop.

use crate::command::Command;
use crate::types::{DimmingCurve, Status};
use heapless::Deque;

/// Number of events retained before the oldest are dropped.
pub const EVENT_QUEUE_CAPACITY: usize = 8;

/// Something adapters may want to publish.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HubEvent {
    /// Startup finished and the device answered the version probe.
    Initialized {
        /// Firmware version reported by the device.
        firmware_version: u8,
    },
    /// Startup probe failed. The hub is permanently inoperative.
    Failed,
    /// Status register changed.
    StatusChanged(Status),
    /// Level written successfully.
    LevelChanged(u8),
    /// Curve written successfully.
    CurveChanged(DimmingCurve),
    /// Fade time written successfully.
    FadeTimeChanged(u8),
    /// Command written successfully.
    CommandSent(Command),
}

/// Bounded FIFO of [`HubEvent`]s that overwrites its oldest entry when full.
#[derive(Debug)]
pub struct EventQueue {
    events: Deque<HubEvent, EVENT_QUEUE_CAPACITY>,
    dropped: u32,
}

impl EventQueue {
    /// Creates an empty queue.
    pub const fn new() -> Self {
        Self {
            events: Deque::new(),
            dropped: 0,
        }
    }

    /// Appends an event, discarding the oldest one if the queue is full.
    pub fn push(&mut self, event: HubEvent) {
        if self.events.is_full() {
            self.events.pop_front();
            self.dropped = self.dropped.saturating_add(1);
        }
        // Cannot fail: a slot was freed above if needed.
        let _ = self.events.push_back(event);
    }

    /// Removes and returns the oldest event.
    pub fn pop(&mut self) -> Option<HubEvent> {
        self.events.pop_front()
    }

    /// Number of queued events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns true if no events are queued.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Number of events discarded because nobody drained the queue in time.
    pub fn dropped(&self) -> u32 {
        self.dropped
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}
