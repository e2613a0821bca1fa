//! Host timer capability.
//!
//! The engine never owns a thread or a timer. The host supplies a [`Scheduler`]; when one of
//! its repeating timers fires, the host calls `Session::on_timer` with the handle it got back.

use std::time::{Duration, Instant};

/// Identity of a repeating timer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TimerHandle(pub u64);

pub trait Scheduler {
    /// Monotonic time since an arbitrary origin.
    fn now(&self) -> Duration;

    /// Ask the host to fire `on_timer(handle)` every `interval` until cancelled.
    fn schedule_repeating(&mut self, interval: Duration) -> TimerHandle;

    fn cancel(&mut self, handle: TimerHandle);
}

/// Wall-clock scheduler for hosts that poll timers themselves.
#[derive(Debug)]
pub struct SystemScheduler {
    origin: Instant,
    next: u64,
    active: Vec<(TimerHandle, Duration)>,
}

impl Default for SystemScheduler {
    fn default() -> Self {
        Self {
            origin: Instant::now(),
            next: 0,
            active: Vec::new(),
        }
    }
}

impl SystemScheduler {
    /// Timers the host should currently be firing, with their intervals.
    pub fn active(&self) -> &[(TimerHandle, Duration)] {
        &self.active
    }
}

impl Scheduler for SystemScheduler {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    fn schedule_repeating(&mut self, interval: Duration) -> TimerHandle {
        self.next += 1;
        let handle = TimerHandle(self.next);
        self.active.push((handle, interval));
        handle
    }

    fn cancel(&mut self, handle: TimerHandle) {
        self.active.retain(|(h, _)| *h != handle);
    }
}

#[derive(Clone, Copy, Debug)]
struct ManualTimer {
    handle: TimerHandle,
    interval: Duration,
    due: Duration,
}

/// Deterministic scheduler whose clock only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Duration,
    next: u64,
    timers: Vec<ManualTimer>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active_timers(&self) -> usize {
        self.timers.len()
    }

    /// Move the clock to the earliest timer due at or before `deadline` and return it, or move
    /// to `deadline` and return `None` when no timer is due.
    pub fn fire_next(&mut self, deadline: Duration) -> Option<TimerHandle> {
        let idx = self
            .timers
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due <= deadline)
            .min_by_key(|(_, t)| t.due)
            .map(|(i, _)| i);
        match idx {
            Some(i) => {
                let timer = &mut self.timers[i];
                self.now = self.now.max(timer.due);
                timer.due += timer.interval;
                Some(timer.handle)
            }
            None => {
                self.now = self.now.max(deadline);
                None
            }
        }
    }
}

impl Scheduler for ManualClock {
    fn now(&self) -> Duration {
        self.now
    }

    fn schedule_repeating(&mut self, interval: Duration) -> TimerHandle {
        self.next += 1;
        let handle = TimerHandle(self.next);
        let interval = interval.max(Duration::from_millis(1));
        self.timers.push(ManualTimer {
            handle,
            interval,
            due: self.now + interval,
        });
        handle
    }

    fn cancel(&mut self, handle: TimerHandle) {
        self.timers.retain(|t| t.handle != handle);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/scheduler.rs"]
mod tests;
