// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Cursor Intent: submenu-bound pointer movement detection.
//!
//! When a submenu opens beside its parent item, the user usually moves the pointer
//! diagonally toward it, crossing sibling items on the way. Closing the submenu as
//! soon as the pointer leaves the parent item would make that impossible. A
//! [`SubmenuIntent`] answers, one pointer sample at a time, whether the pointer is
//! still plausibly travelling toward the submenu.
//!
//! Two rules are applied:
//!
//! - **Corridor**: when the source lies entirely to one side of the destination,
//!   a hexagonal corridor joins a slightly inflated source line to the destination
//!   rectangle stretched by [`DESTINATION_EXPANSION`] above and below. Leaving the
//!   corridor ends the intent immediately.
//! - **Speed**: the Manhattan distance between the oldest of the last
//!   [`MAX_SAMPLES`] samples and the newest one, divided by the time between them,
//!   must be at least [`MIN_SPEED`] points per second.
//!
//! Samples without a location (modifier or keyboard events) only fail once more
//! than [`LOCATIONLESS_TIMEOUT_MS`] have passed since the last located sample.
//!
//! An intent has no terminal state of its own: once [`SubmenuIntent::is_progressing`]
//! returns `false` the owner is expected to drop it.
//!
//! ## Minimal example
//!
//! ```rust
//! use kurbo::{Point, Rect};
//! use understory_cursor_intent::SubmenuIntent;
//!
//! // Parent item spans y = 100..120; the pointer is at x = 150.
//! let source_line = Rect::new(150.0, 100.0, 150.0, 120.0);
//! let submenu = Rect::new(200.0, 60.0, 400.0, 300.0);
//! let mut intent = SubmenuIntent::new(7_u32, source_line, submenu, 0);
//!
//! // Moving right quickly keeps the submenu open.
//! assert!(intent.is_progressing(Some(Point::new(150.0, 110.0)), 0));
//! assert!(intent.is_progressing(Some(Point::new(160.0, 112.0)), 40));
//!
//! // Swinging far above the corridor does not.
//! assert!(!intent.is_progressing(Some(Point::new(170.0, -40.0)), 60));
//! ```
//!
//! ## Features
//!
//! - `std` (default): enables `std` support for `kurbo`.
//! - `libm`: enables `no_std` builds that rely on `libm` for floating-point math.
//!
//! This crate is `no_std`.

#![no_std]

use kurbo::{BezPath, Point, Rect, Shape};
use smallvec::SmallVec;

/// Number of located samples kept for the speed test.
pub const MAX_SAMPLES: usize = 20;

/// Minimum speed, in points per second, that counts as progress.
pub const MIN_SPEED: f64 = 10.0;

/// How long a sample without a location may follow the last located one.
pub const LOCATIONLESS_TIMEOUT_MS: u64 = 100;

/// Horizontal outset of the source line when building the corridor.
pub const SOURCE_OUTSET_X: f64 = 2.0;

/// Vertical outset of the source line when building the corridor.
pub const SOURCE_OUTSET_Y: f64 = 6.0;

/// Vertical stretch of the destination when building the corridor.
pub const DESTINATION_EXPANSION: f64 = 40.0;

/// One located pointer sample.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CursorSample {
    /// Pointer location in screen coordinates.
    pub location: Point,
    /// Timestamp in milliseconds.
    pub timestamp: u64,
}

/// Tracks pointer travel from a source item toward a submenu.
///
/// `K` identifies the source item; it is only stored and handed back, never
/// dereferenced, so any small copyable handle works.
#[derive(Clone, Debug)]
pub struct SubmenuIntent<K> {
    source: K,
    source_line: Rect,
    destination: Rect,
    corridor: Option<BezPath>,
    samples: SmallVec<[CursorSample; MAX_SAMPLES]>,
    last_located: u64,
}

impl<K: Copy> SubmenuIntent<K> {
    /// Start tracking from `source`.
    ///
    /// `source_line` is a vertical segment (a rectangle of zero or positive width)
    /// in screen coordinates, typically the source item's vertical extent at the
    /// pointer's `x`. `destination` is the submenu window frame. `timestamp` counts
    /// as the last located sample for the location-less timeout.
    #[must_use]
    pub fn new(source: K, source_line: Rect, destination: Rect, timestamp: u64) -> Self {
        Self {
            source,
            source_line,
            destination,
            corridor: corridor(source_line, destination),
            samples: SmallVec::new(),
            last_located: timestamp,
        }
    }

    /// The tracked source item.
    #[must_use]
    pub fn source(&self) -> K {
        self.source
    }

    /// The current source line.
    #[must_use]
    pub const fn source_line(&self) -> Rect {
        self.source_line
    }

    /// The destination rectangle.
    #[must_use]
    pub const fn destination(&self) -> Rect {
        self.destination
    }

    /// The progress corridor, if the source lies beside the destination.
    #[must_use]
    pub fn corridor(&self) -> Option<&BezPath> {
        self.corridor.as_ref()
    }

    /// Buffered located samples, oldest first.
    #[must_use]
    pub fn samples(&self) -> &[CursorSample] {
        &self.samples
    }

    /// Replace the source line.
    ///
    /// The corridor is rebuilt and the sample history is discarded, since the
    /// direction of travel has changed.
    pub fn update_source_line(&mut self, source_line: Rect) {
        self.source_line = source_line;
        self.corridor = corridor(source_line, self.destination);
        self.samples.clear();
    }

    /// Replace the destination, for example after the submenu window moved.
    pub fn update_destination(&mut self, destination: Rect) {
        self.destination = destination;
        self.corridor = corridor(self.source_line, destination);
    }

    /// Whether `pt` lies inside the corridor.
    ///
    /// Without a corridor every point is accepted.
    #[must_use]
    pub fn corridor_contains(&self, pt: Point) -> bool {
        self.corridor.as_ref().is_none_or(|path| path.contains(pt))
    }

    /// Feed one sample and report whether the pointer is still heading to the
    /// destination.
    ///
    /// `location` is `None` for events that carry no pointer position.
    pub fn is_progressing(&mut self, location: Option<Point>, timestamp: u64) -> bool {
        let Some(location) = location else {
            return timestamp.saturating_sub(self.last_located) <= LOCATIONLESS_TIMEOUT_MS;
        };

        if !self.corridor_contains(location) {
            return false;
        }

        if self.samples.len() == MAX_SAMPLES {
            self.samples.remove(0);
        }
        self.samples.push(CursorSample {
            location,
            timestamp,
        });
        self.last_located = timestamp;

        let (Some(oldest), Some(newest)) = (self.samples.first(), self.samples.last()) else {
            return true;
        };
        if self.samples.len() < 2 {
            return true;
        }
        let elapsed_ms = newest.timestamp.saturating_sub(oldest.timestamp);
        if elapsed_ms == 0 {
            return true;
        }
        let distance = (newest.location.x - oldest.location.x).abs()
            + (newest.location.y - oldest.location.y).abs();
        let speed = distance * 1000.0 / elapsed_ms as f64;
        speed >= MIN_SPEED
    }
}

/// Build the hexagonal corridor from `source` to `destination`.
///
/// Returns `None` when the source overlaps the destination horizontally.
fn corridor(source: Rect, destination: Rect) -> Option<BezPath> {
    let top = destination.y0 - DESTINATION_EXPANSION;
    let bottom = destination.y1 + DESTINATION_EXPANSION;
    let (source_x, near_x, far_x) = if source.x1 <= destination.x0 {
        (source.x0 - SOURCE_OUTSET_X, destination.x0, destination.x1)
    } else if source.x0 >= destination.x1 {
        (source.x1 + SOURCE_OUTSET_X, destination.x1, destination.x0)
    } else {
        return None;
    };

    let mut path = BezPath::new();
    path.move_to((source_x, source.y0 - SOURCE_OUTSET_Y));
    path.line_to((near_x, top));
    path.line_to((far_x, top));
    path.line_to((far_x, bottom));
    path.line_to((near_x, bottom));
    path.line_to((source_x, source.y1 + SOURCE_OUTSET_Y));
    path.close_path();
    Some(path)
}
