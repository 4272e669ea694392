// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! One open menu window of the session's stack.

use kurbo::{Insets, Point, Rect, Vec2};
use understory_elastic_scroll::ElasticScroll;
use understory_menu_geometry::{Alignment, Corners, GeometryConfig, MenuGeometry};

use crate::layout::MenuLayout;
use crate::menu::{ItemId, MenuId, ModifierFlags};

/// Scroll-arrow direction.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ScrollDirection {
    /// Towards the start of the content.
    Up,
    /// Towards the end of the content.
    Down,
}

/// A menu on screen.
///
/// The frame is in screen coordinates. `bounds` is the part of the content, in
/// content coordinates, that shows through the frame's content area.
#[derive(Clone, Debug)]
pub struct MenuWindow {
    menu: MenuId,
    screen: Rect,
    frame: Rect,
    bounds: Rect,
    final_bounds: Rect,
    chrome: Insets,
    anchor: Option<Rect>,
    alignment: Alignment,
    modifiers: ModifierFlags,
    corners: Corners,
    layout: MenuLayout,
    scroll: ElasticScroll,
}

impl MenuWindow {
    pub(crate) fn new(
        menu: MenuId,
        geometry: &MenuGeometry,
        config: &GeometryConfig,
        layout: MenuLayout,
        anchor: Option<Rect>,
        alignment: Alignment,
        modifiers: ModifierFlags,
    ) -> Self {
        let mut window = Self {
            menu,
            screen: geometry.screen(),
            frame: geometry.frame(),
            bounds: geometry.initial_bounds(),
            final_bounds: geometry.final_bounds(),
            chrome: config.chrome,
            anchor,
            alignment,
            modifiers,
            corners: Corners::all(),
            layout,
            scroll: ElasticScroll::new(),
        };
        window.reset_scroll();
        window
    }

    /// Menu shown in this window.
    #[must_use]
    pub const fn menu(&self) -> MenuId {
        self.menu
    }

    /// Screen the window is on.
    #[must_use]
    pub const fn screen(&self) -> Rect {
        self.screen
    }

    /// Window frame in screen coordinates.
    #[must_use]
    pub const fn frame(&self) -> Rect {
        self.frame
    }

    /// Visible content bounds.
    #[must_use]
    pub const fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Largest content bounds the window may grow to.
    #[must_use]
    pub const fn final_bounds(&self) -> Rect {
        self.final_bounds
    }

    /// Item area the window was opened from.
    #[must_use]
    pub const fn anchor(&self) -> Option<Rect> {
        self.anchor
    }

    /// Side of the parent the window opened on.
    #[must_use]
    pub const fn alignment(&self) -> Alignment {
        self.alignment
    }

    /// Modifiers the items are displayed under.
    #[must_use]
    pub const fn modifiers(&self) -> ModifierFlags {
        self.modifiers
    }

    /// Corners drawn rounded.
    #[must_use]
    pub const fn corners(&self) -> Corners {
        self.corners
    }

    /// Current item layout.
    #[must_use]
    pub fn layout(&self) -> &MenuLayout {
        &self.layout
    }

    /// Elastic scroll state.
    #[must_use]
    pub fn scroll(&self) -> &ElasticScroll {
        &self.scroll
    }

    pub(crate) fn scroll_mut(&mut self) -> &mut ElasticScroll {
        &mut self.scroll
    }

    pub(crate) fn set_corners(&mut self, corners: Corners) {
        self.corners = corners;
    }

    pub(crate) fn set_modifiers(&mut self, modifiers: ModifierFlags) {
        self.modifiers = modifiers;
    }

    pub(crate) fn set_layout(&mut self, layout: MenuLayout) {
        self.layout = layout;
    }

    /// Geometry snapshot of the window as it is now.
    #[must_use]
    pub fn geometry(&self, config: GeometryConfig) -> MenuGeometry {
        MenuGeometry::from_window(self.frame, self.bounds, self.layout.metrics(), self.screen, config)
    }

    pub(crate) fn set_bounds(&mut self, bounds: Rect) {
        self.bounds = bounds;
    }

    pub(crate) fn apply_geometry(&mut self, geometry: &MenuGeometry) {
        self.screen = geometry.screen();
        self.frame = geometry.frame();
        self.bounds = geometry.initial_bounds();
        self.final_bounds = geometry.final_bounds();
    }

    pub(crate) fn reset_scroll(&mut self) {
        let total = self.layout.total_size();
        self.scroll.reset(total, self.bounds, self.final_bounds);
    }

    /// Content area of the frame, in screen coordinates.
    #[must_use]
    pub fn content_rect(&self) -> Rect {
        self.frame - self.chrome
    }

    fn content_offset(&self) -> Vec2 {
        self.content_rect().origin() - self.bounds.origin()
    }

    /// Convert a screen point to content coordinates.
    #[must_use]
    pub fn to_content(&self, point: Point) -> Point {
        point - self.content_offset()
    }

    /// Screen rectangle of host item `item`'s row, if it is laid out.
    #[must_use]
    pub fn item_screen_rect(&self, item: ItemId) -> Option<Rect> {
        let entry = self.layout.entry(item)?;
        Some(entry.frame + self.content_offset())
    }

    /// Scroll arrow whose hot zone contains `point`, if that arrow is showing.
    #[must_use]
    pub fn scroll_arrow_at(&self, point: Point, arrow_height: f64) -> Option<ScrollDirection> {
        let content = self.content_rect();
        if !content.contains(point) {
            return None;
        }
        let total = self.layout.total_size().height;
        if self.bounds.y0 > 0.5 && point.y < content.y0 + arrow_height {
            return Some(ScrollDirection::Up);
        }
        if self.bounds.y1 < total - 0.5 && point.y >= content.y1 - arrow_height {
            return Some(ScrollDirection::Down);
        }
        None
    }

    /// Whether the content can scroll further in `direction`.
    #[must_use]
    pub fn can_scroll(&self, direction: ScrollDirection) -> bool {
        match direction {
            ScrollDirection::Up => self.bounds.y0 > 0.5,
            ScrollDirection::Down => self.bounds.y1 < self.layout.total_size().height - 0.5,
        }
    }
}
