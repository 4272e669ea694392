// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Vertical item layout of one menu.

use kurbo::{Point, Rect, Size};
use understory_menu_geometry::ContentMetrics;

use crate::host::MenuHost;
use crate::menu::{ItemId, MenuId, MenuTree, ModifierFlags};

/// One laid-out row.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LayoutEntry {
    /// Host item of the row.
    pub item: ItemId,
    /// Item actually shown (an alternate or the host).
    pub displayed: ItemId,
    /// Row frame in content coordinates.
    pub frame: Rect,
}

/// Visible rows of a menu stacked top to bottom, all as wide as the widest row.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MenuLayout {
    entries: Vec<LayoutEntry>,
    total_size: Size,
}

impl MenuLayout {
    /// Lay out the visible items of `menu` as displayed under `modifiers`.
    #[must_use]
    pub fn compute<H>(tree: &MenuTree, menu: MenuId, modifiers: ModifierFlags, host: &H) -> Self
    where
        H: MenuHost + ?Sized,
    {
        let mut entries = Vec::new();
        let mut width: f64 = 0.0;
        let mut y = 0.0;
        for item in tree.visible_items(menu, modifiers) {
            let displayed = tree.displayed_item(item, modifiers);
            let size = host.item_size(tree, displayed);
            width = width.max(size.width);
            entries.push(LayoutEntry {
                item,
                displayed,
                frame: Rect::new(0.0, y, size.width, y + size.height),
            });
            y += size.height;
        }
        for entry in &mut entries {
            entry.frame.x1 = width;
        }
        Self {
            entries,
            total_size: Size::new(width, y),
        }
    }

    /// Rows in display order.
    #[must_use]
    pub fn entries(&self) -> &[LayoutEntry] {
        &self.entries
    }

    /// Size of all rows together.
    #[must_use]
    pub const fn total_size(&self) -> Size {
        self.total_size
    }

    /// Metrics consumed by the geometry solver.
    #[must_use]
    pub fn metrics(&self) -> ContentMetrics {
        let first = self.entries.first().map_or(0.0, |e| e.frame.height());
        let last = self.entries.last().map_or(0.0, |e| e.frame.height());
        ContentMetrics::new(self.total_size, first, last)
    }

    /// Row of host item `item`.
    #[must_use]
    pub fn entry(&self, item: ItemId) -> Option<&LayoutEntry> {
        self.entries.iter().find(|entry| entry.item == item)
    }

    /// Host item under `point` (content coordinates).
    #[must_use]
    pub fn hit<H>(&self, tree: &MenuTree, host: &H, point: Point) -> Option<ItemId>
    where
        H: MenuHost + ?Sized,
    {
        self.entries
            .iter()
            .find(|entry| {
                entry.frame.contains(point) && host.item_contains(tree, entry.displayed, entry.frame, point)
            })
            .map(|entry| entry.item)
    }
}
