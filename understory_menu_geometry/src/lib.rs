// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Menu Geometry: frame and content-bounds solving for menu windows.
//!
//! A menu window shows a vertical strip of items. When the strip is taller than the
//! screen, the window is clipped and shows only part of it. This crate computes,
//! for one window at a time:
//!
//! - the window **frame** in screen coordinates,
//! - the **initial bounds**: the part of the content that is visible right now,
//! - the **final bounds**: the largest part of the content the window could show
//!   if it grew as far as its screen allows.
//!
//! Four requests are supported by [`MenuGeometry`]:
//!
//! - [`MenuGeometry::from_window`]: snapshot a window and re-constrain it.
//! - [`MenuGeometry::position_at_screen_location`]: pin a content point to a screen point.
//! - [`MenuGeometry::position_adjacent_to_area`]: open beside an item (submenus).
//! - [`MenuGeometry::resize_for_changed_content`] and [`MenuGeometry::apply_scroll_request`]:
//!   follow content size changes and elastic scrolling.
//!
//! Every request ends with the same screen-constrain step: the window is kept inside
//! the screen margins, always shows at least its first or last item, and any
//! remaining overflow is cut from both the frame and the visible bounds.
//!
//! The crate also provides the [`LayoutDirection`] policy used to map
//! leading/trailing placement to physical sides, and [`rounded_corners`] for
//! deciding which corners of stacked windows stay rounded.
//!
//! Screen space is y-down, matching [`kurbo`].
//!
//! ## Minimal example
//!
//! ```rust
//! use kurbo::{Point, Rect, Size};
//! use understory_menu_geometry::{ContentMetrics, GeometryConfig, MenuGeometry};
//!
//! let screen = Rect::new(0.0, 0.0, 1440.0, 900.0);
//! let content = ContentMetrics::new(Size::new(180.0, 100.0), 20.0, 20.0);
//! let mut geometry = MenuGeometry::unplaced(content, screen, GeometryConfig::default());
//!
//! let placed = geometry.position_at_screen_location(
//!     Point::ZERO,
//!     Point::new(720.0, 450.0),
//!     true,
//!     &content,
//!     &[screen][..],
//! );
//! assert!(placed);
//! assert_eq!(geometry.initial_bounds().size(), content.total_size);
//! ```
//!
//! ## Features
//!
//! - `std` (default): enables `std` support for `kurbo`.
//! - `libm`: enables `no_std` builds that rely on `libm` for floating-point math.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

use alloc::vec::Vec;

use kurbo::{Point, Rect};

mod corners;
mod direction;
mod geometry;

pub use corners::{Corners, rounded_corners};
pub use direction::{Alignment, LayoutDirection, Side};
pub use geometry::{ContentMetrics, GeometryConfig, MenuGeometry, vertical_constrain_to_anchor};

/// Host-provided view of the available screens.
pub trait ScreenLookup {
    /// Frame of the screen that contains `point`, if any.
    fn screen_containing(&self, point: Point) -> Option<Rect>;
}

impl ScreenLookup for [Rect] {
    fn screen_containing(&self, point: Point) -> Option<Rect> {
        self.iter().copied().find(|screen| screen.contains(point))
    }
}

impl ScreenLookup for Vec<Rect> {
    fn screen_containing(&self, point: Point) -> Option<Rect> {
        self.as_slice().screen_containing(point)
    }
}
