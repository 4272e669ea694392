// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pluggable event sources for the modal loop.

use std::collections::VecDeque;

use crate::event::{ApplicationEvent, Event};

/// Where a running session gets its input from.
///
/// The session never sleeps on its own; it asks the source for the next event no
/// later than a deadline and treats `None` as "the deadline passed".
pub trait EventSource {
    /// Current time in milliseconds.
    fn now(&self) -> u64;

    /// Wait for the next event until `deadline` (milliseconds).
    fn next_event(&mut self, deadline: u64) -> Option<Event>;
}

/// An [`EventSource`] replaying a fixed script on a virtual clock.
///
/// Events are delivered in timestamp order. Waiting past the last event, or up to a
/// deadline that falls before the next one, advances the clock to the deadline
/// without sleeping.
#[derive(Clone, Debug, Default)]
pub struct ScriptedEvents {
    clock: u64,
    queue: VecDeque<Event>,
}

impl ScriptedEvents {
    /// An empty script starting at time zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty script starting at `clock`.
    pub fn starting_at(clock: u64) -> Self {
        Self {
            clock,
            queue: VecDeque::new(),
        }
    }

    /// Append an event, keeping the script sorted by timestamp.
    pub fn push(&mut self, event: Event) -> &mut Self {
        let at = self
            .queue
            .iter()
            .rposition(|queued| queued.timestamp <= event.timestamp)
            .map_or(0, |i| i + 1);
        self.queue.insert(at, event);
        self
    }

    /// Append several events.
    pub fn extend(&mut self, events: impl IntoIterator<Item = Event>) -> &mut Self {
        for event in events {
            self.push(event);
        }
        self
    }

    /// Post an application event at `timestamp`.
    pub fn post(&mut self, event: ApplicationEvent, timestamp: u64) -> &mut Self {
        self.push(Event::application(event, timestamp))
    }

    /// Events not delivered yet.
    pub fn remaining(&self) -> usize {
        self.queue.len()
    }
}

impl EventSource for ScriptedEvents {
    fn now(&self) -> u64 {
        self.clock
    }

    fn next_event(&mut self, deadline: u64) -> Option<Event> {
        match self.queue.front() {
            Some(next) if next.timestamp <= deadline => {
                self.clock = self.clock.max(next.timestamp);
                self.queue.pop_front()
            }
            _ => {
                self.clock = self.clock.max(deadline);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{EventKind, Key};

    #[test]
    fn delivers_in_order_and_advances_clock() {
        let mut script = ScriptedEvents::new();
        script
            .push(Event::key(Key::Down, 30))
            .push(Event::key(Key::Up, 10))
            .push(Event::key(Key::Escape, 30));

        assert_eq!(script.next_event(100).map(|e| e.kind), Some(EventKind::KeyDown(Key::Up)));
        assert_eq!(script.now(), 10);
        assert_eq!(script.next_event(20), None, "next event is after the deadline");
        assert_eq!(script.now(), 20);
        assert_eq!(script.next_event(100).map(|e| e.kind), Some(EventKind::KeyDown(Key::Down)));
        assert_eq!(script.next_event(100).map(|e| e.kind), Some(EventKind::KeyDown(Key::Escape)));
        assert_eq!(script.next_event(500), None);
        assert_eq!(script.now(), 500);
        assert_eq!(script.remaining(), 0);
    }
}
