// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The menu window geometry solver.

use kurbo::{Insets, Point, Rect, Size, Vec2};

use crate::{Alignment, LayoutDirection, ScreenLookup, Side};

/// Frame edges closer than this are considered to be in contact.
const CONTACT_EPSILON: f64 = 0.5;

/// Fixed metrics shared by every geometry computation.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GeometryConfig {
    /// Distance a window keeps from each screen edge.
    pub screen_margins: Insets,
    /// Chrome between the window frame and its visible content.
    pub chrome: Insets,
    /// Smallest frame a menu window may have.
    pub minimum_frame_size: Size,
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            screen_margins: Insets::uniform(4.0),
            chrome: Insets::new(0.0, 4.0, 0.0, 4.0),
            minimum_frame_size: Size::new(40.0, 24.0),
        }
    }
}

/// Measurements of a menu's laid-out items, in content coordinates.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
pub struct ContentMetrics {
    /// Size of all visible items stacked together.
    pub total_size: Size,
    /// Height of the first visible item.
    pub first_item_height: f64,
    /// Height of the last visible item.
    pub last_item_height: f64,
}

impl ContentMetrics {
    /// Metrics for content whose first and last items have the given heights.
    #[must_use]
    pub const fn new(total_size: Size, first_item_height: f64, last_item_height: f64) -> Self {
        Self {
            total_size,
            first_item_height,
            last_item_height,
        }
    }
}

/// Frame and content bounds of one menu window, constrained to its screen.
///
/// Screen space is y-down. Content coordinates have their origin at the top-left
/// of the first item. The *initial bounds* are the part of the content currently
/// visible; the *final bounds* are the largest part of the content the window may
/// grow to show on its screen.
///
/// A `MenuGeometry` is a value: compute it, read the results, and write them back
/// into the window. It never keeps references to window state.
#[derive(Clone, Debug, PartialEq)]
pub struct MenuGeometry {
    config: GeometryConfig,
    screen: Rect,
    frame: Rect,
    content: ContentMetrics,
    initial_bounds: Rect,
    final_bounds: Rect,
}

impl MenuGeometry {
    /// Snapshot an existing window and constrain it to `screen`.
    #[must_use]
    pub fn from_window(
        frame: Rect,
        visible_bounds: Rect,
        content: ContentMetrics,
        screen: Rect,
        config: GeometryConfig,
    ) -> Self {
        let mut geometry = Self {
            config,
            screen,
            frame,
            content,
            initial_bounds: visible_bounds,
            final_bounds: visible_bounds,
        };
        geometry.constrain_to_screen(false);
        geometry
    }

    /// Geometry for a window that has not been placed yet.
    ///
    /// The frame is sized for the content and sits at the screen's origin until one
    /// of the positioning operations moves it.
    #[must_use]
    pub fn unplaced(content: ContentMetrics, screen: Rect, config: GeometryConfig) -> Self {
        let mut geometry = Self {
            config,
            screen,
            frame: Rect::ZERO,
            content,
            initial_bounds: Rect::from_origin_size(Point::ZERO, content.total_size),
            final_bounds: Rect::from_origin_size(Point::ZERO, content.total_size),
        };
        geometry.frame = Rect::from_origin_size(
            geometry.screen_limits().origin(),
            geometry.frame_size_for(content),
        );
        geometry.constrain_to_screen(false);
        geometry
    }

    /// Window frame in screen coordinates.
    #[must_use]
    pub const fn frame(&self) -> Rect {
        self.frame
    }

    /// Currently visible content bounds.
    #[must_use]
    pub const fn initial_bounds(&self) -> Rect {
        self.initial_bounds
    }

    /// Largest content bounds the window may show on its screen.
    #[must_use]
    pub const fn final_bounds(&self) -> Rect {
        self.final_bounds
    }

    /// Frame of the screen the window lives on.
    #[must_use]
    pub const fn screen(&self) -> Rect {
        self.screen
    }

    /// Content measurements this geometry was computed for.
    #[must_use]
    pub const fn content(&self) -> ContentMetrics {
        self.content
    }

    /// Size of the whole menu content.
    #[must_use]
    pub const fn total_size(&self) -> Size {
        self.content.total_size
    }

    /// Area of the screen a window frame may occupy.
    #[must_use]
    pub fn screen_limits(&self) -> Rect {
        self.screen - self.config.screen_margins
    }

    /// Largest content size that fits inside the screen limits.
    #[must_use]
    pub fn max_content_size(&self) -> Size {
        let limits = self.screen_limits();
        Size::new(
            (limits.width() - self.config.chrome.x_value()).max(0.0),
            (limits.height() - self.config.chrome.y_value()).max(0.0),
        )
    }

    /// Screen location of the content coordinate origin.
    #[must_use]
    pub fn content_origin(&self) -> Point {
        Point::new(
            self.frame.x0 + self.config.chrome.x0 - self.initial_bounds.x0,
            self.frame.y0 + self.config.chrome.y0 - self.initial_bounds.y0,
        )
    }

    /// Place the window so `menu_point` (content coordinates) lands on `screen_point`.
    ///
    /// Returns `false`, leaving the geometry untouched, when no screen contains
    /// `screen_point`. On success the whole content is requested and then trimmed to
    /// the screen.
    pub fn position_at_screen_location<S>(
        &mut self,
        menu_point: Point,
        screen_point: Point,
        allow_grow_upward: bool,
        content: &ContentMetrics,
        screens: &S,
    ) -> bool
    where
        S: ScreenLookup + ?Sized,
    {
        let Some(screen) = screens.screen_containing(screen_point) else {
            return false;
        };
        self.screen = screen;
        self.content = *content;
        let chrome = self.config.chrome;
        let origin = Point::new(
            screen_point.x - menu_point.x - chrome.x0,
            screen_point.y - menu_point.y - chrome.y0,
        );
        self.frame = Rect::from_origin_size(origin, self.frame_size_for(*content));
        self.initial_bounds = Rect::from_origin_size(Point::ZERO, content.total_size);
        self.final_bounds = self.initial_bounds;
        self.constrain_to_screen(allow_grow_upward);
        true
    }

    /// Place the window beside `area`, preferring the `preferred` side.
    ///
    /// `menu_point.y` (content coordinates) is aligned with the top of `area`, and
    /// `menu_point.x` is how far the window may overlap `area` horizontally. Both
    /// sides are tried; a side succeeds when the window still touches `area` after
    /// being constrained to the screen. When both succeed, or neither does, the
    /// preferred side wins.
    ///
    /// Returns the alignment that was applied.
    pub fn position_adjacent_to_area<S>(
        &mut self,
        menu_point: Point,
        area: Rect,
        preferred: Alignment,
        direction: LayoutDirection,
        content: &ContentMetrics,
        screens: &S,
    ) -> Alignment
    where
        S: ScreenLookup + ?Sized,
    {
        let screen = screens
            .screen_containing(area.center())
            .unwrap_or(self.screen);
        let trailing_side = direction.side(Alignment::Trailing);
        let leading_side = direction.side(Alignment::Leading);
        let trailing = self.beside(menu_point, area, trailing_side, screen, content);
        let leading = self.beside(menu_point, area, leading_side, screen, content);

        let (alignment, geometry) = match (trailing, leading) {
            ((t, true), (_, false)) => (Alignment::Trailing, t),
            ((_, false), (l, true)) => (Alignment::Leading, l),
            ((t, _), (l, _)) => match preferred {
                Alignment::Trailing => (Alignment::Trailing, t),
                Alignment::Leading => (Alignment::Leading, l),
            },
        };
        *self = geometry;
        alignment
    }

    fn beside(
        &self,
        menu_point: Point,
        area: Rect,
        side: Side,
        screen: Rect,
        content: &ContentMetrics,
    ) -> (Self, bool) {
        let mut trial = self.clone();
        trial.screen = screen;
        trial.content = *content;
        let size = trial.frame_size_for(*content);
        let y0 = area.y0 - menu_point.y - self.config.chrome.y0;
        let x0 = match side {
            Side::Right => area.x1 - menu_point.x,
            Side::Left => area.x0 + menu_point.x - size.width,
        };
        trial.frame = Rect::from_origin_size(Point::new(x0, y0), size);
        trial.initial_bounds = Rect::from_origin_size(Point::ZERO, content.total_size);
        trial.final_bounds = trial.initial_bounds;
        trial.constrain_to_screen(false);
        let contact = match side {
            Side::Right => (trial.frame.x0 - (area.x1 - menu_point.x)).abs() <= CONTACT_EPSILON,
            Side::Left => (trial.frame.x1 - (area.x0 + menu_point.x)).abs() <= CONTACT_EPSILON,
        };
        (trial, contact)
    }

    /// Resize after the item layout produced a new content size.
    ///
    /// The top edge stays where it was; menus grow and shrink at the bottom. With an
    /// `anchor`, the frame keeps covering it vertically, and empty content pins the
    /// frame's bottom to the anchor's top.
    pub fn resize_for_changed_content(&mut self, content: &ContentMetrics, anchor: Option<Rect>) {
        self.content = *content;
        let size = self.frame_size_for(*content);
        let mut frame = Rect::from_origin_size(self.frame.origin(), size);
        if let Some(anchor) = anchor {
            frame = if content.total_size.height <= 0.0 {
                Rect::new(frame.x0, anchor.y0 - size.height, frame.x1, anchor.y0)
            } else {
                vertical_constrain_to_anchor(frame, anchor)
            };
        }
        self.frame = frame;
        self.initial_bounds = Rect::from_origin_size(Point::ZERO, content.total_size);
        self.final_bounds = self.initial_bounds;
        self.constrain_to_screen(false);
    }

    /// Apply visible bounds requested by scrolling.
    ///
    /// An unchanged height is a pure scroll and leaves the frame alone. Otherwise the
    /// frame takes the requested height with its top fixed, then shifts up as far as
    /// the screen allows if the bottom would run off screen.
    pub fn apply_scroll_request(&mut self, requested: Rect) {
        if (requested.height() - self.initial_bounds.height()).abs() < f64::EPSILON {
            self.initial_bounds = requested;
            return;
        }
        let height = requested.height() + self.config.chrome.y_value();
        self.frame = Rect::new(self.frame.x0, self.frame.y0, self.frame.x1, self.frame.y0 + height);
        self.initial_bounds = requested;
        self.constrain_to_screen(true);
    }

    fn frame_size_for(&self, content: ContentMetrics) -> Size {
        let chrome = self.config.chrome;
        let minimum = self.config.minimum_frame_size;
        Size::new(
            (content.total_size.width + chrome.x_value()).max(minimum.width),
            (content.total_size.height + chrome.y_value()).max(minimum.height),
        )
    }

    /// Shared post-step after every frame change.
    fn constrain_to_screen(&mut self, allow_grow_upward: bool) {
        let limits = self.screen_limits();
        let chrome = self.config.chrome;
        let total = self.content.total_size;
        let mut frame = self.frame;

        if frame.width() > limits.width() {
            frame.x1 = frame.x0 + limits.width();
        }
        if frame.x1 > limits.x1 {
            frame = frame + Vec2::new(limits.x1 - frame.x1, 0.0);
        }
        if frame.x0 < limits.x0 {
            frame = frame + Vec2::new(limits.x0 - frame.x0, 0.0);
        }

        let min_at_top = self.content.first_item_height.min(total.height) + chrome.y_value();
        let min_at_bottom = self.content.last_item_height.min(total.height) + chrome.y_value();
        if frame.y0 > limits.y1 - min_at_top {
            frame = frame + Vec2::new(0.0, limits.y1 - min_at_top - frame.y0);
        }
        if frame.y1 < limits.y0 + min_at_bottom {
            frame = frame + Vec2::new(0.0, limits.y0 + min_at_bottom - frame.y1);
        }

        if allow_grow_upward && frame.y1 > limits.y1 {
            let overflow = frame.y1 - limits.y1;
            let room = (frame.y0 - limits.y0).max(0.0);
            frame = frame - Vec2::new(0.0, overflow.min(room));
        }

        // Whatever still overflows is cut from the frame and from the visible content.
        let top_trim = (limits.y0 - frame.y0).max(0.0);
        frame.y0 += top_trim;
        frame.y1 = frame.y1.min(limits.y1).max(frame.y0);
        self.frame = frame;

        let mut bounds = self.initial_bounds;
        bounds.y0 = (bounds.y0 + top_trim).min(total.height);
        let visible = frame.size() - Size::new(chrome.x_value(), chrome.y_value());
        bounds.x1 = (bounds.x0 + visible.width.max(0.0)).min(total.width).max(bounds.x0);
        bounds.y1 = (bounds.y0 + visible.height.max(0.0)).min(total.height).max(bounds.y0);
        self.initial_bounds = bounds;

        let max = self.max_content_size();
        let final_size = Size::new(total.width.min(max.width), total.height.min(max.height));
        let final_y0 = bounds.y0.min(total.height - final_size.height).max(0.0);
        self.final_bounds = Rect::from_origin_size(Point::new(bounds.x0, final_y0), final_size);
    }
}

/// Keep `frame` covering `anchor` vertically.
///
/// A frame that already spans the anchor is returned unchanged. Otherwise the frame
/// is moved (never resized) so that either its top meets the anchor's top, or its
/// bottom meets the anchor's bottom; never both.
#[must_use]
pub fn vertical_constrain_to_anchor(frame: Rect, anchor: Rect) -> Rect {
    if frame.y0 <= anchor.y0 && frame.y1 >= anchor.y1 {
        frame
    } else if frame.y0 > anchor.y0 {
        frame + Vec2::new(0.0, anchor.y0 - frame.y0)
    } else if frame.y1 < anchor.y1 {
        frame + Vec2::new(0.0, anchor.y1 - frame.y1)
    } else {
        frame
    }
}
