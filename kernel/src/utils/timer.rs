/*
 * Timer Interface
 *
 * Applications arm one-shot timers through `CreateTimer`. The timer manager
 * (driven by the 100Hz local APIC interrupt on real hardware) owns the tick
 * counter and the pending-timer queue; it posts a `TimerTimeout` message to
 * the owning task when a timer expires.
 *
 * Timer values handed to the manager are negated (always < 0): that is how
 * application timers are told apart from the kernel's own, whose values are
 * non-negative.
 */

use crate::scheduler::TaskId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timer {
    timeout: u64,
    value: i32,
    task_id: TaskId,
}

impl Timer {
    pub fn new(timeout: u64, value: i32, task_id: TaskId) -> Self {
        Self { timeout, value, task_id }
    }

    /// Absolute tick at which the timer fires.
    pub fn timeout(&self) -> u64 {
        self.timeout
    }

    pub fn value(&self) -> i32 {
        self.value
    }

    pub fn task_id(&self) -> TaskId {
        self.task_id
    }
}

pub trait TimerManager: Send {
    /// Ticks since boot.
    fn current_tick(&self) -> u64;

    fn add_timer(&mut self, timer: Timer);
}

/// Convert milliseconds to ticks, truncating.
pub fn ms_to_ticks(ms: u64, freq: u64) -> u64 {
    ms.saturating_mul(freq) / 1000
}

/// Convert ticks to milliseconds, truncating.
pub fn ticks_to_ms(ticks: u64, freq: u64) -> u64 {
    ticks.saturating_mul(1000) / freq.max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_conversions_truncate() {
        assert_eq!(ms_to_ticks(1000, 100), 100);
        assert_eq!(ms_to_ticks(15, 100), 1);
        assert_eq!(ms_to_ticks(9, 100), 0);
        assert_eq!(ticks_to_ms(100, 100), 1000);
        assert_eq!(ticks_to_ms(1, 100), 10);
    }
}
