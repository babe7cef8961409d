//! Event scheduler coordinating sub-millisecond timing across peripherals.
//!
//! The scheduler is a sorted array, not a heap: the live event count is tiny
//! (typically under ten) and array insertion beats heap operations at that
//! scale while keeping deschedule-by-kind a linear scan. Events are stored in
//! ascending timestamp order; at most one event per kind is live at a time.
//!
//! Timing constants for one frame:
//!
//! | period            | cycles              |
//! |-------------------|---------------------|
//! | visible dots      | 960                 |
//! | HBlank            | 272                 |
//! | scanline          | 1232                |
//! | frame (228 lines) | 280 896             |

use serde::{Deserialize, Serialize};
use vecfixed::VecFixed;

/// Cycles from scanline start to HBlank entry.
pub const VISIBLE_DOT_CYCLES: u64 = 960;

/// Cycles per full scanline (visible + HBlank).
pub const CYCLES_PER_SCANLINE: u64 = 1232;

/// Cycles per full frame: 228 scanlines.
pub const CYCLES_PER_FRAME: u64 = 228 * CYCLES_PER_SCANLINE;

const MAX_EVENTS: usize = 32;

/// What an event does when it fires. One event per kind is live at a time;
/// scheduling a kind again replaces the pending occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    /// Dot 960 of a scanline: render it and enter HBlank.
    HBlankStart,
    /// Dot 1232: leave HBlank, advance VCOUNT.
    HBlankEnd,
    /// One of the four timers wrapped. Stub peripheral for now.
    TimerOverflow(u8),
    /// A DMA channel wants to run. Stub peripheral for now.
    Dma(u8),
    /// 280 896 cycles elapsed; the frame loop exits after this fires.
    FrameComplete,
}

/// A scheduled occurrence: absolute cycle timestamp plus a free-form
/// parameter the handler interprets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub timestamp: u64,
    pub kind: EventKind,
    pub param: u32,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct Scheduler {
    current_cycles: u64,
    events: VecFixed<MAX_EVENTS, Event>,
}

impl Scheduler {
    #[must_use]
    pub fn new() -> Self {
        let mut scheduler = Self::default();
        scheduler.reset();
        scheduler
    }

    /// Absolute cycle count. Never decreases.
    #[must_use]
    pub const fn current_cycles(&self) -> u64 {
        self.current_cycles
    }

    /// Advances time by the cycle cost of the last instruction.
    pub fn advance(&mut self, cycles: u64) {
        self.current_cycles += cycles;
    }

    /// Schedules `kind` to fire `delay` cycles from now, replacing any
    /// pending event of the same kind.
    pub fn schedule(&mut self, kind: EventKind, delay: u64, param: u32) {
        self.schedule_absolute(kind, self.current_cycles + delay, param);
    }

    /// Schedules `kind` at an absolute timestamp, replacing any pending
    /// event of the same kind.
    pub fn schedule_absolute(&mut self, kind: EventKind, timestamp: u64, param: u32) {
        self.deschedule(kind);

        // insert after any equal timestamp so ties fire in insertion order
        let at = self
            .events
            .position(|event| event.timestamp > timestamp)
            .unwrap_or(self.events.len());

        self.events.insert(
            at,
            Event {
                timestamp,
                kind,
                param,
            },
        );
    }

    /// Removes every pending event of the given kind.
    pub fn deschedule(&mut self, kind: EventKind) {
        self.events.retain(|event| event.kind != kind);
    }

    /// Moves a pending event of `kind` to `delay` cycles from now, keeping
    /// its parameter. Does nothing if no such event is pending.
    pub fn reschedule(&mut self, kind: EventKind, delay: u64) {
        if let Some(at) = self.events.position(|event| event.kind == kind) {
            let param = self.events.remove(at).param;
            self.schedule(kind, delay, param);
        }
    }

    /// The earliest pending event, if any.
    #[must_use]
    pub fn peek(&self) -> Option<&Event> {
        self.events.first()
    }

    /// Removes and returns the earliest pending event.
    pub fn pop(&mut self) -> Option<Event> {
        if self.events.is_empty() {
            None
        } else {
            Some(self.events.remove(0))
        }
    }

    /// Removes and returns the earliest event whose time has come.
    pub fn pop_due(&mut self) -> Option<Event> {
        if self.peek()?.timestamp <= self.current_cycles {
            self.pop()
        } else {
            None
        }
    }

    /// Timestamp of the earliest pending event. Used to fast-forward time
    /// while the CPU is halted.
    #[must_use]
    pub fn next_timestamp(&self) -> Option<u64> {
        self.peek().map(|event| event.timestamp)
    }

    /// Jumps time forward to `timestamp` (halted fast-forward). Time never
    /// moves backwards.
    pub fn fast_forward(&mut self, timestamp: u64) {
        self.current_cycles = self.current_cycles.max(timestamp);
    }

    /// Clears the queue, zeroes the clock and seeds the frame skeleton:
    /// the first HBlank at the visible-dot boundary and the frame terminator
    /// one full frame out.
    pub fn reset(&mut self) {
        self.events.clear();
        self.current_cycles = 0;
        self.schedule(EventKind::HBlankStart, VISIBLE_DOT_CYCLES, 0);
        self.schedule(EventKind::FrameComplete, CYCLES_PER_FRAME, 0);
    }

    #[cfg(test)]
    fn is_sorted(&self) -> bool {
        self.events
            .iter()
            .zip(self.events.iter().skip(1))
            .all(|(a, b)| a.timestamp <= b.timestamp)
    }
}
