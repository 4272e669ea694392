// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Menu: a host-independent session engine for filtering menus.
//!
//! A [`MenuSession`] shows a root menu from a [`MenuTree`] and runs it modally until
//! the user chooses an item or dismisses it. Along the way it manages:
//!
//! - a stack of [`MenuWindow`]s, one per open submenu, placed by
//!   [`understory_menu_geometry`];
//! - submenu opening with a hover delay, generation counters, and hosts that
//!   populate submenus asynchronously;
//! - cursor-intent tracking ([`understory_cursor_intent`]) so a diagonal move
//!   toward an open submenu does not close it;
//! - elastic wheel scrolling and resizing of clipped menus
//!   ([`understory_elastic_scroll`]) plus auto-scroll over the scroll arrows;
//! - type-to-filter with plain, `r/regex/` and `g/glob/` patterns, scored
//!   synchronously or on a background thread;
//! - alternate items swapped in by modifier keys;
//! - keyboard navigation and accessibility requests.
//!
//! The application stays in charge of drawing and of real input. It implements
//! [`MenuHost`] to report screens, measure items, and receive [`Notification`]s.
//! It feeds [`Event`]s through an [`EventSource`].
//!
//! ## Minimal example
//!
//! ```rust
//! use kurbo::{Point, Rect, Size};
//! use understory_menu::{
//!     Event, ItemId, Key, MenuHost, MenuSession, MenuTree, ScriptedEvents, SessionConfig,
//!     ShowRequest,
//! };
//!
//! struct Host {
//!     screens: Vec<Rect>,
//! }
//!
//! impl MenuHost for Host {
//!     fn screens(&self) -> &[Rect] {
//!         &self.screens
//!     }
//!
//!     fn item_size(&self, _tree: &MenuTree, _item: ItemId) -> Size {
//!         Size::new(120.0, 20.0)
//!     }
//!
//!     fn pointer_location(&self) -> Point {
//!         Point::ZERO
//!     }
//! }
//!
//! let mut tree = MenuTree::new();
//! let root = tree.new_menu("File");
//! tree.add_item(root, "Open").unwrap();
//! let save = tree.add_item(root, "Save").unwrap();
//!
//! let mut host = Host {
//!     screens: vec![Rect::new(0.0, 0.0, 1440.0, 900.0)],
//! };
//! let mut events = ScriptedEvents::new();
//! events
//!     .push(Event::key(Key::Down, 10))
//!     .push(Event::key(Key::Down, 20))
//!     .push(Event::key(Key::Return, 30));
//!
//! let request = ShowRequest::at_location(Point::ZERO, Point::new(700.0, 400.0));
//! let mut session = MenuSession::new(&mut tree, root, &mut host, SessionConfig::default());
//! assert_eq!(session.run(&mut events, &request), Some(save));
//! ```
//!
//! Hosts with their own event loop can drive a session step by step with
//! [`MenuSession::begin`], [`MenuSession::dispatch`],
//! [`MenuSession::fire_due_timers`] and [`MenuSession::finish`].
//!
//! Screen space is y-down, matching [`kurbo`].

mod chrome;
mod config;
mod error;
mod event;
mod filter;
mod host;
mod layout;
mod menu;
mod session;
mod source;
mod timer;
mod window;

pub use chrome::{CornerMaskCache, corner_mask_path};
pub use config::{FilterMode, SessionConfig};
pub use error::MenuError;
pub use event::{ApplicationEvent, Event, EventKind, Key, SystemDisposition, SystemEvent};
pub use filter::{
    BasicScorer, FilterCompletion, FilterMatch, FilterPattern, FilterScorer, FilterTicket, ItemScore, LiveFilter,
    score_items, spawn_filter_pass,
};
pub use host::{MenuHost, Notification, SubmenuReadiness};
pub use layout::{LayoutEntry, MenuLayout};
pub use menu::{Action, Item, ItemId, ItemKind, Menu, MenuId, MenuTree, ModifierFlags};
pub use session::{FilterWaker, MenuSession, OpenMethod, Placement, SessionState, ShowRequest};
pub use source::{EventSource, ScriptedEvents};
pub use timer::{TimerKind, TimerQueue};
pub use window::{MenuWindow, ScrollDirection};

pub use understory_elastic_scroll::{ClipMode, ScrollAction};
pub use understory_menu_geometry::{Alignment, Corners, GeometryConfig, LayoutDirection};
