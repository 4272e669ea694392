// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Software timers driven by the session loop.

use smallvec::SmallVec;

/// Timers a session can arm. At most one of each kind is pending.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TimerKind {
    /// Debounced submenu open.
    OpenSubmenu,
    /// Scroll-arrow auto-scroll.
    AutoScroll,
    /// Periodic cursor reconciliation.
    Periodic,
}

#[derive(Copy, Clone, Debug)]
struct Timer {
    kind: TimerKind,
    deadline: u64,
    period: Option<u64>,
}

/// Pending timers ordered by deadline.
///
/// Scheduling a kind that is already pending replaces it.
#[derive(Clone, Debug, Default)]
pub struct TimerQueue {
    timers: SmallVec<[Timer; 3]>,
}

impl TimerQueue {
    /// An empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm `kind` to fire at `deadline`, then every `period` ms if given.
    pub fn schedule(&mut self, kind: TimerKind, deadline: u64, period: Option<u64>) {
        self.cancel(kind);
        self.timers.push(Timer {
            kind,
            deadline,
            period: period.filter(|p| *p > 0),
        });
    }

    /// Disarm `kind`. Returns whether it was pending.
    pub fn cancel(&mut self, kind: TimerKind) -> bool {
        let before = self.timers.len();
        self.timers.retain(|timer| timer.kind != kind);
        self.timers.len() != before
    }

    /// Whether `kind` is pending.
    pub fn is_armed(&self, kind: TimerKind) -> bool {
        self.timers.iter().any(|timer| timer.kind == kind)
    }

    /// Earliest pending deadline.
    pub fn next_deadline(&self) -> Option<u64> {
        self.timers.iter().map(|timer| timer.deadline).min()
    }

    /// Take the earliest timer due at `now`.
    ///
    /// Repeating timers are re-armed one period after their deadline; a repeating
    /// timer that fell far behind skips the missed ticks.
    pub fn pop_due(&mut self, now: u64) -> Option<TimerKind> {
        let (index, timer) = self
            .timers
            .iter()
            .copied()
            .enumerate()
            .filter(|(_, timer)| timer.deadline <= now)
            .min_by_key(|(_, timer)| timer.deadline)?;
        match timer.period {
            Some(period) => {
                let mut next = timer.deadline + period;
                if next <= now {
                    next = now + period;
                }
                self.timers[index].deadline = next;
            }
            None => {
                self.timers.remove(index);
            }
        }
        Some(timer.kind)
    }
}
