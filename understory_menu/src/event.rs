// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Input events consumed by a menu session.

use kurbo::Point;

use crate::menu::{ItemId, ModifierFlags};

/// Keys the session and its built-in view react to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    /// Escape.
    Escape,
    /// Return on the main keyboard.
    Return,
    /// Enter on the keypad.
    Enter,
    /// Space bar.
    Space,
    /// Backspace / Delete.
    Backspace,
    /// Up arrow.
    Up,
    /// Down arrow.
    Down,
    /// Left arrow.
    Left,
    /// Right arrow.
    Right,
    /// A character key.
    Char(char),
}

/// Events posted by the application or the session's host.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ApplicationEvent {
    /// The application lost focus.
    DidResignActive,
    /// Assistive technology chose an item.
    AccessibleItemSelection(ItemId),
    /// Assistive technology asked for an item's submenu.
    AccessibleOpenSubmenu(ItemId),
    /// Periodic tick posted by the host.
    Periodic,
    /// A submenu that was not ready has been populated.
    DeferredMenuUpdateReady {
        /// Generation of the open request being completed.
        generation: u64,
    },
    /// A background filter pass has delivered results.
    FilterResultsReady,
}

/// System events with no meaning to the menu.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SystemEvent {
    /// Window overview activation.
    MissionControl,
    /// Screen zoom.
    ScreenZoom,
    /// Trackpad gesture began.
    GestureBegin,
    /// Trackpad gesture ended.
    GestureEnd,
    /// Force-touch pressure change.
    Pressure,
    /// Anything else.
    Other,
}

/// What the session does with a [`SystemEvent`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SystemDisposition {
    /// Hand the event back to the application.
    PassThrough,
    /// Drop the event.
    Ignore,
}

impl SystemEvent {
    /// Fixed routing for system events.
    pub const fn disposition(self) -> SystemDisposition {
        match self {
            Self::MissionControl => SystemDisposition::PassThrough,
            Self::ScreenZoom | Self::GestureBegin | Self::GestureEnd | Self::Pressure | Self::Other => {
                SystemDisposition::Ignore
            }
        }
    }
}

/// Kind of an input [`Event`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum EventKind {
    /// A key was pressed.
    KeyDown(Key),
    /// The held modifiers changed.
    FlagsChanged,
    /// The pointer moved with no button held.
    MouseMoved,
    /// The pointer moved with the left button held.
    LeftMouseDragged,
    /// Left button pressed.
    LeftMouseDown,
    /// Left button released.
    LeftMouseUp,
    /// Right button pressed.
    RightMouseDown,
    /// Any other button pressed.
    OtherMouseDown,
    /// Scroll wheel; negative moves content up.
    ScrollWheel {
        /// Vertical delta in points.
        delta: f64,
    },
    /// Posted by the application.
    Application(ApplicationEvent),
    /// A system event.
    System(SystemEvent),
}

/// One input event.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Event {
    /// What happened.
    pub kind: EventKind,
    /// Milliseconds on the event source's clock.
    pub timestamp: u64,
    /// Pointer location in screen coordinates, if the event carries one.
    pub location: Option<Point>,
    /// Modifiers held when the event was generated.
    pub modifiers: ModifierFlags,
}

impl Event {
    /// An event with no location and no modifiers.
    pub const fn new(kind: EventKind, timestamp: u64) -> Self {
        Self {
            kind,
            timestamp,
            location: None,
            modifiers: ModifierFlags::empty(),
        }
    }

    /// Attach a pointer location.
    #[must_use]
    pub const fn at(mut self, location: Point) -> Self {
        self.location = Some(location);
        self
    }

    /// Attach held modifiers.
    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: ModifierFlags) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Key press.
    pub const fn key(key: Key, timestamp: u64) -> Self {
        Self::new(EventKind::KeyDown(key), timestamp)
    }

    /// Pointer motion.
    pub const fn mouse_moved(location: Point, timestamp: u64) -> Self {
        Self::new(EventKind::MouseMoved, timestamp).at(location)
    }

    /// Application event.
    pub const fn application(event: ApplicationEvent, timestamp: u64) -> Self {
        Self::new(EventKind::Application(event), timestamp)
    }

    /// Whether this is a pointer event.
    pub const fn is_pointer(&self) -> bool {
        matches!(
            self.kind,
            EventKind::MouseMoved
                | EventKind::LeftMouseDragged
                | EventKind::LeftMouseDown
                | EventKind::LeftMouseUp
                | EventKind::RightMouseDown
                | EventKind::OtherMouseDown
                | EventKind::ScrollWheel { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_event_routing() {
        assert_eq!(SystemEvent::MissionControl.disposition(), SystemDisposition::PassThrough);
        for ignored in [
            SystemEvent::ScreenZoom,
            SystemEvent::GestureBegin,
            SystemEvent::GestureEnd,
            SystemEvent::Pressure,
            SystemEvent::Other,
        ] {
            assert_eq!(ignored.disposition(), SystemDisposition::Ignore, "{ignored:?}");
        }
    }

    #[test]
    fn builders() {
        let event = Event::mouse_moved(Point::new(1.0, 2.0), 7).with_modifiers(ModifierFlags::SHIFT);
        assert_eq!(event.location, Some(Point::new(1.0, 2.0)));
        assert_eq!(event.timestamp, 7);
        assert!(event.is_pointer());
        assert!(!Event::key(Key::Escape, 0).is_pointer());
    }
}
