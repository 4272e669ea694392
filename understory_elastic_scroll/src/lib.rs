// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Elastic Scroll: scroll-wheel handling for clipped menu windows.
//!
//! A menu whose content does not fit on screen is shown in a window that covers only
//! part of the content. Native menus react to the scroll wheel in two ways:
//!
//! - **Resize**: while the window is smaller than the screen allows, scrolling toward
//!   hidden content grows the window, uncovering more items without moving the ones
//!   already visible on screen.
//! - **Bounce**: once the window cannot grow in that direction, scrolling pans the
//!   content, and pushing past either end of the content rubber-bands elastically.
//!
//! [`ElasticScroll`] implements this with direct bounds interpolation. It is fed the
//! total content size plus the initially visible and maximal bounds computed by the
//! geometry solver, and turns each wheel delta into new visible bounds.
//!
//! ## Sign convention
//!
//! Content coordinates are y-down. A **negative** delta moves the content up,
//! revealing content further down; a **positive** delta moves the content down,
//! revealing content further up.
//!
//! ## Clip mode
//!
//! [`ClipMode`] records which edges of the content were cut off when the tracker was
//! last [reset](ElasticScroll::reset). Moving the content up while only the top is
//! clipped has nothing to reveal, so it always bounces; moving it down while only the
//! bottom is clipped bounces too. Every other direction resizes until the window
//! reaches its maximal height, then bounces.
//!
//! ## Minimal example
//!
//! ```rust
//! use kurbo::{Rect, Size};
//! use understory_elastic_scroll::{ClipMode, ElasticScroll, ScrollAction};
//!
//! // 400pt of content; the window shows the bottom 250pt of it.
//! let mut scroll = ElasticScroll::new();
//! scroll.reset(
//!     Size::new(200.0, 400.0),
//!     Rect::new(0.0, 150.0, 200.0, 400.0),
//!     Rect::new(0.0, 0.0, 200.0, 400.0),
//! );
//! assert_eq!(scroll.clip_mode(), ClipMode::Top);
//!
//! // Revealing the clipped top grows the window.
//! let bounds = scroll.scroll_event(10.0).unwrap();
//! assert_eq!(bounds.height(), 260.0);
//! assert_eq!(scroll.action(), ScrollAction::ResizeUp);
//! ```
//!
//! ## Features
//!
//! - `std` (default): enables `std` support for `kurbo`.
//! - `libm`: enables `no_std` builds that rely on `libm` for floating-point math.
//!
//! This crate is `no_std`.

#![no_std]

use kurbo::{Rect, Size};

/// Fraction of a push past the content edge that still moves the content.
pub const ELASTIC_DAMPING: f64 = 0.5;

/// Furthest the content can be pulled past either end.
pub const MAX_OVERSHOOT: f64 = 48.0;

const EPSILON: f64 = 1e-6;

/// Which edges of the content were cut off at the last reset.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum ClipMode {
    /// All of the content is visible.
    #[default]
    None,
    /// Content above the visible bounds is hidden.
    Top,
    /// Content below the visible bounds is hidden.
    Bottom,
    /// Content is hidden on both ends.
    Both,
}

impl ClipMode {
    /// Classify `visible` against content of height `total_height`.
    #[must_use]
    pub fn classify(visible: Rect, total_height: f64) -> Self {
        let top = visible.y0 > EPSILON;
        let bottom = visible.y1 < total_height - EPSILON;
        match (top, bottom) {
            (false, false) => Self::None,
            (true, false) => Self::Top,
            (false, true) => Self::Bottom,
            (true, true) => Self::Both,
        }
    }
}

/// What the last scroll event did.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum ScrollAction {
    /// Panning within the content.
    #[default]
    Scrolling,
    /// Pulled past the bottom end of the content.
    BottomBounce,
    /// Pulled past the top end of the content.
    TopBounce,
    /// Window grew to uncover content above.
    ResizeUp,
    /// Window grew to uncover content below.
    ResizeDown,
}

/// Elastic scroll state for one menu window.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ElasticScroll {
    total: Size,
    initial: Rect,
    maximal: Rect,
    bounds: Rect,
    clip_mode: ClipMode,
    action: ScrollAction,
}

impl ElasticScroll {
    /// Create an empty tracker; call [`reset`](Self::reset) before scrolling.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-seed the tracker from freshly computed geometry.
    ///
    /// Returns `false`, changing nothing, when the inputs match the last reset.
    pub fn reset(&mut self, total: Size, initial: Rect, maximal: Rect) -> bool {
        if total == self.total && initial == self.initial && maximal == self.maximal {
            return false;
        }
        self.total = total;
        self.initial = initial;
        self.maximal = maximal;
        self.bounds = initial;
        self.clip_mode = ClipMode::classify(initial, total.height);
        self.action = ScrollAction::Scrolling;
        true
    }

    /// Adopt bounds that were applied elsewhere (for example clipped by the screen or
    /// moved by auto-scrolling) without reclassifying the clip mode.
    pub fn sync_bounds(&mut self, bounds: Rect) {
        self.bounds = bounds;
    }

    /// Clip mode from the last reset.
    #[must_use]
    pub const fn clip_mode(&self) -> ClipMode {
        self.clip_mode
    }

    /// What the last scroll event did.
    #[must_use]
    pub const fn action(&self) -> ScrollAction {
        self.action
    }

    /// Current visible bounds; may lie past the content ends while bouncing.
    #[must_use]
    pub const fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Total content size from the last reset.
    #[must_use]
    pub const fn total_size(&self) -> Size {
        self.total
    }

    /// Maximal bounds from the last reset.
    #[must_use]
    pub const fn maximal_bounds(&self) -> Rect {
        self.maximal
    }

    fn at_maximal_height(&self) -> bool {
        self.bounds.height() >= self.maximal.height() - EPSILON
    }

    /// Apply one wheel delta.
    ///
    /// Returns the new visible bounds when they changed. A zero delta lets a bounce
    /// settle back inside the content and ends a resize.
    pub fn scroll_event(&mut self, delta: f64) -> Option<Rect> {
        if self.bounds.height() >= self.total.height - EPSILON {
            return None;
        }
        if delta == 0.0 {
            return self.settle();
        }
        if delta < 0.0 {
            if self.clip_mode == ClipMode::Top || self.at_maximal_height() {
                self.pan(delta)
            } else {
                self.resize_down(-delta).or_else(|| self.pan(delta))
            }
        } else if self.clip_mode == ClipMode::Bottom || self.at_maximal_height() {
            self.pan(delta)
        } else {
            self.resize_up(delta).or_else(|| self.pan(delta))
        }
    }

    fn resize_up(&mut self, amount: f64) -> Option<Rect> {
        let growth = amount
            .min(self.bounds.y0)
            .min(self.maximal.height() - self.bounds.height());
        if growth <= EPSILON {
            return None;
        }
        self.bounds.y0 -= growth;
        self.action = ScrollAction::ResizeUp;
        Some(self.bounds)
    }

    fn resize_down(&mut self, amount: f64) -> Option<Rect> {
        let growth = amount
            .min(self.total.height - self.bounds.y1)
            .min(self.maximal.height() - self.bounds.height());
        if growth <= EPSILON {
            return None;
        }
        self.bounds.y1 += growth;
        self.action = ScrollAction::ResizeDown;
        Some(self.bounds)
    }

    fn pan(&mut self, delta: f64) -> Option<Rect> {
        let min = 0.0;
        let max = (self.total.height - self.bounds.height()).max(0.0);
        let current = self.bounds.y0;
        let target = current - delta;

        let (y0, action) = if target < min && delta > 0.0 {
            let free = (current - min).max(0.0);
            let start = current.min(min);
            let y0 = (start - (delta - free) * ELASTIC_DAMPING).max(min - MAX_OVERSHOOT);
            (y0, ScrollAction::TopBounce)
        } else if target > max && delta < 0.0 {
            let free = (max - current).max(0.0);
            let start = current.max(max);
            let y0 = (start + (-delta - free) * ELASTIC_DAMPING).min(max + MAX_OVERSHOOT);
            (y0, ScrollAction::BottomBounce)
        } else if target < min {
            (target, ScrollAction::TopBounce)
        } else if target > max {
            (target, ScrollAction::BottomBounce)
        } else {
            (target, ScrollAction::Scrolling)
        };

        self.action = action;
        self.move_to(y0)
    }

    fn settle(&mut self) -> Option<Rect> {
        let action = self.action;
        self.action = ScrollAction::Scrolling;
        match action {
            ScrollAction::TopBounce | ScrollAction::BottomBounce => {
                let max = (self.total.height - self.bounds.height()).max(0.0);
                self.move_to(self.bounds.y0.clamp(0.0, max))
            }
            ScrollAction::Scrolling | ScrollAction::ResizeUp | ScrollAction::ResizeDown => None,
        }
    }

    fn move_to(&mut self, y0: f64) -> Option<Rect> {
        if (y0 - self.bounds.y0).abs() <= EPSILON {
            return None;
        }
        let height = self.bounds.height();
        self.bounds.y0 = y0;
        self.bounds.y1 = y0 + height;
        Some(self.bounds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOTAL: Size = Size::new(200.0, 400.0);
    const MAXIMAL: Rect = Rect::new(0.0, 0.0, 200.0, 400.0);

    fn tracker(initial: Rect) -> ElasticScroll {
        let mut scroll = ElasticScroll::new();
        assert!(scroll.reset(TOTAL, initial, MAXIMAL), "fresh reset applies");
        scroll
    }

    #[test]
    fn reset_is_idempotent() {
        let initial = Rect::new(0.0, 150.0, 200.0, 400.0);
        let mut scroll = tracker(initial);
        let _ = scroll.scroll_event(10.0);
        assert!(!scroll.reset(TOTAL, initial, MAXIMAL));
        assert_eq!(scroll.action(), ScrollAction::ResizeUp, "no-op reset keeps state");
    }

    #[test]
    fn classify_clip_modes() {
        assert_eq!(ClipMode::classify(Rect::new(0.0, 0.0, 1.0, 400.0), 400.0), ClipMode::None);
        assert_eq!(ClipMode::classify(Rect::new(0.0, 10.0, 1.0, 400.0), 400.0), ClipMode::Top);
        assert_eq!(ClipMode::classify(Rect::new(0.0, 0.0, 1.0, 300.0), 400.0), ClipMode::Bottom);
        assert_eq!(ClipMode::classify(Rect::new(0.0, 10.0, 1.0, 300.0), 400.0), ClipMode::Both);
    }

    #[test]
    fn fully_visible_content_ignores_scrolling() {
        let mut scroll = tracker(MAXIMAL);
        assert_eq!(scroll.scroll_event(-20.0), None);
        assert_eq!(scroll.scroll_event(20.0), None);
    }

    #[test]
    fn top_clipped_content_bounces_when_moved_up() {
        let mut scroll = tracker(Rect::new(0.0, 150.0, 200.0, 400.0));
        let bounds = scroll.scroll_event(-10.0).expect("bounce moves the origin");
        assert_eq!(bounds.height(), 250.0);
        assert_eq!(bounds.y0, 155.0);
        assert_eq!(scroll.action(), ScrollAction::BottomBounce);

        let settled = scroll.scroll_event(0.0).expect("settles back");
        assert_eq!(settled.y0, 150.0);
        assert_eq!(scroll.action(), ScrollAction::Scrolling);
    }

    #[test]
    fn top_clipped_content_resizes_when_moved_down() {
        let mut scroll = tracker(Rect::new(0.0, 150.0, 200.0, 400.0));
        let bounds = scroll.scroll_event(30.0).expect("resize");
        assert_eq!(bounds, Rect::new(0.0, 120.0, 200.0, 400.0));
        assert_eq!(scroll.action(), ScrollAction::ResizeUp);
    }

    #[test]
    fn bottom_clipped_content_mirrors_top() {
        let mut scroll = tracker(Rect::new(0.0, 0.0, 200.0, 250.0));
        let bounced = scroll.scroll_event(10.0).expect("bounce");
        assert_eq!(bounced.height(), 250.0);
        assert_eq!(bounced.y0, -5.0);
        assert_eq!(scroll.action(), ScrollAction::TopBounce);
        let _ = scroll.scroll_event(0.0);

        let resized = scroll.scroll_event(-10.0).expect("resize");
        assert_eq!(resized, Rect::new(0.0, 0.0, 200.0, 260.0));
        assert_eq!(scroll.action(), ScrollAction::ResizeDown);
    }

    #[test]
    fn growth_stops_at_maximal_height_then_pans() {
        let maximal = Rect::new(0.0, 0.0, 200.0, 300.0);
        let mut scroll = ElasticScroll::new();
        let _ = scroll.reset(TOTAL, Rect::new(0.0, 100.0, 200.0, 380.0), maximal);
        assert_eq!(scroll.clip_mode(), ClipMode::Both);

        let grown = scroll.scroll_event(50.0).expect("resize");
        assert_eq!(grown.height(), 300.0, "capped at the maximal height");
        assert_eq!(grown.y0, 80.0);

        let panned = scroll.scroll_event(30.0).expect("pan");
        assert_eq!(panned.height(), 300.0);
        assert_eq!(panned.y0, 50.0);
        assert_eq!(scroll.action(), ScrollAction::Scrolling);
    }

    #[test]
    fn overshoot_is_damped_and_limited() {
        let mut scroll = tracker(Rect::new(0.0, 0.0, 200.0, 250.0));
        let mut last = 0.0;
        for _ in 0..20 {
            let bounds = scroll.scroll_event(20.0).expect("keeps bouncing until the limit");
            assert!(bounds.y0 <= last, "monotonic pull");
            last = bounds.y0;
            if bounds.y0 <= -MAX_OVERSHOOT {
                break;
            }
        }
        assert_eq!(last, -MAX_OVERSHOOT);
        assert_eq!(scroll.scroll_event(20.0), None, "pinned at the overshoot limit");
    }

    #[test]
    fn sync_bounds_keeps_clip_mode() {
        let mut scroll = tracker(Rect::new(0.0, 150.0, 200.0, 400.0));
        scroll.sync_bounds(Rect::new(0.0, 0.0, 200.0, 250.0));
        assert_eq!(scroll.clip_mode(), ClipMode::Top);
        assert_eq!(scroll.bounds().y0, 0.0);
    }
}
