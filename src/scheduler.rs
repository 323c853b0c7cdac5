//! Cooperative interval scheduler.
//!
//! Two independent timers, one for the temperature update and one for
//! telemetry transmission.  The scheduler never sleeps; each loop pass
//! calls [`Scheduler::tick`] with the current monotonic time and the
//! scheduler notifies a [`SchedulerDelegate`] for every timer that is due.
//!
//! ```text
//!   loop pass ──▶ Scheduler.tick(now)
//!                   │
//!                   ├─ now - last_update   > update_interval   ──▶ on_schedule_fired(Update)
//!                   │
//!                   └─ now - last_transmit > transmit_interval ──▶ on_schedule_fired(Transmit)
//! ```
//!
//! Update always fires before Transmit within a pass, so a transmission
//! that coincides with an update carries the fresh values.

use crate::app::ports::{ScheduleFiredKind, SchedulerDelegate};

// ═══════════════════════════════════════════════════════════════
//  Interval timer
// ═══════════════════════════════════════════════════════════════

/// A single "fire every N ms" timer driven by elapsed-time comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntervalTimer {
    interval_ms: u64,
    last_fired_ms: u64,
}

impl IntervalTimer {
    pub const fn new(interval_ms: u64) -> Self {
        Self {
            interval_ms,
            last_fired_ms: 0,
        }
    }

    /// Strictly more than one interval has elapsed since the last fire.
    ///
    /// Uses wrapping subtraction so a wrapped tick counter still yields
    /// the right elapsed time.
    pub fn is_due(&self, now_ms: u64) -> bool {
        now_ms.wrapping_sub(self.last_fired_ms) > self.interval_ms
    }

    /// Record a fire at `now_ms`.
    pub fn mark(&mut self, now_ms: u64) {
        self.last_fired_ms = now_ms;
    }

    /// Fire if due; returns whether it fired.
    pub fn poll(&mut self, now_ms: u64) -> bool {
        if self.is_due(now_ms) {
            self.mark(now_ms);
            true
        } else {
            false
        }
    }

    pub fn last_fired_ms(&self) -> u64 {
        self.last_fired_ms
    }

    pub fn interval_ms(&self) -> u64 {
        self.interval_ms
    }
}

// ═══════════════════════════════════════════════════════════════
//  Scheduler engine
// ═══════════════════════════════════════════════════════════════

/// Update + transmit timers.
#[derive(Debug, Clone)]
pub struct Scheduler {
    update: IntervalTimer,
    transmit: IntervalTimer,
}

impl Scheduler {
    pub fn new(update_interval_ms: u32, transmit_interval_ms: u32) -> Self {
        Self {
            update: IntervalTimer::new(update_interval_ms as u64),
            transmit: IntervalTimer::new(transmit_interval_ms as u64),
        }
    }

    /// Evaluate both timers once.  Call once per loop pass.
    pub fn tick(&mut self, now_ms: u64, delegate: &mut dyn SchedulerDelegate) {
        if self.update.poll(now_ms) {
            delegate.on_schedule_fired(ScheduleFiredKind::Update);
        }
        if self.transmit.poll(now_ms) {
            delegate.on_schedule_fired(ScheduleFiredKind::Transmit);
        }
    }

    pub fn update_timer(&self) -> &IntervalTimer {
        &self.update
    }

    pub fn transmit_timer(&self) -> &IntervalTimer {
        &self.transmit
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════
