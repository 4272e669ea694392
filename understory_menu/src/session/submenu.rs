// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Submenu opening and window-stack collapse.
//!
//! Opening is two-phase and generation-counted. A request bumps the generation;
//! cursor requests then wait out the hover delay. When the request fires, the host
//! says whether the submenu is ready now or later. A later submenu shows a busy
//! indicator until the host posts a readiness event carrying the same generation;
//! readiness for any older generation is dropped.

use kurbo::Point;
use understory_cursor_intent::SubmenuIntent;
use understory_menu_geometry::MenuGeometry;

use super::{MenuSession, OpenMethod, PendingOpen, SessionState};
use crate::host::{MenuHost, Notification, SubmenuReadiness};
use crate::layout::MenuLayout;
use crate::menu::{ItemId, MenuId};
use crate::timer::TimerKind;
use crate::window::MenuWindow;

impl<H: MenuHost + ?Sized> MenuSession<'_, H> {
    /// Submenu shown for host item `item` of window `index`, if it can open.
    pub(super) fn submenu_of(&self, index: usize, item: ItemId) -> Option<MenuId> {
        let window = self.windows.get(index)?;
        let displayed = self.tree.displayed_item(item, window.modifiers());
        let entry = self.tree.item(displayed)?;
        if !entry.is_enabled() {
            return None;
        }
        entry.submenu()
    }

    /// Window showing the submenu of `source`, which lives in the window below it.
    pub(super) fn submenu_window_of(&self, source: ItemId) -> Option<usize> {
        (1..self.windows.len()).find(|&index| self.submenu_of(index - 1, source) == Some(self.windows[index].menu()))
    }

    /// Ask for the submenu of `item` in window `index` to open.
    ///
    /// Cursor requests are debounced, and hovering the same item again does not
    /// restart the delay. Hovering nothing, or an item without a submenu, in a lower
    /// window still schedules a request: when it fires, the windows above close.
    pub(super) fn request_open(&mut self, index: usize, item: Option<ItemId>, method: OpenMethod) {
        let Some(top) = self.windows.len().checked_sub(1) else {
            return;
        };
        if method == OpenMethod::Cursor {
            let target = item.and_then(|item| self.submenu_of(index, item));
            if index == top && target.is_none() {
                self.cancel_pending_open();
                return;
            }
            if index < top && target.is_some() && target == Some(self.windows[index + 1].menu()) {
                return;
            }
            if self
                .pending
                .is_some_and(|p| p.window == index && p.item == item && p.method == OpenMethod::Cursor)
            {
                return;
            }
        }

        self.cancel_pending_open();
        self.open_generation += 1;
        let pending = PendingOpen {
            generation: self.open_generation,
            window: index,
            item,
            method,
            waiting: false,
        };
        tracing::debug!(generation = pending.generation, ?item, ?method, "submenu open requested");
        match method {
            OpenMethod::Cursor => {
                self.pending = Some(pending);
                let deadline = self.now + self.config.submenu_delay_ms;
                self.timers.schedule(TimerKind::OpenSubmenu, deadline, None);
            }
            OpenMethod::Keyboard | OpenMethod::Accessibility => self.start_open(pending),
        }
    }

    /// The hover delay elapsed.
    pub(super) fn open_pending(&mut self) -> SessionState {
        match self.pending.take() {
            Some(pending) if !pending.waiting => self.start_open(pending),
            other => self.pending = other,
        }
        SessionState::Continue
    }

    fn start_open(&mut self, pending: PendingOpen) {
        if pending.window >= self.windows.len() {
            tracing::trace!(generation = pending.generation, "open request for a closed window dropped");
            return;
        }
        let submenu = pending.item.and_then(|item| self.submenu_of(pending.window, item));
        let already_open = self.windows.get(pending.window + 1).map(MenuWindow::menu);
        if submenu.is_some() && submenu == already_open {
            let index = pending.window + 1;
            self.collapse_to(Some(index));
            if pending.method != OpenMethod::Cursor {
                self.focus_first_item(index);
            }
            return;
        }

        self.collapse_to(Some(pending.window));
        let (Some(item), Some(submenu)) = (pending.item, submenu) else {
            return;
        };
        match self.host.submenu_readiness(&*self.tree, submenu, pending.generation) {
            SubmenuReadiness::Now => self.complete_open(pending),
            SubmenuReadiness::Later => {
                tracing::debug!(generation = pending.generation, ?submenu, "submenu not ready, waiting");
                self.host.set_item_busy(item, true);
                self.pending = Some(PendingOpen {
                    waiting: true,
                    ..pending
                });
            }
        }
    }

    /// The host finished populating a deferred submenu.
    pub(super) fn deferred_update_ready(&mut self, generation: u64) {
        match self.pending {
            Some(pending) if pending.waiting && pending.generation == generation => {
                self.pending = None;
                if let Some(item) = pending.item {
                    self.host.set_item_busy(item, false);
                }
                self.complete_open(pending);
            }
            _ => tracing::trace!(generation, "stale deferred menu update dropped"),
        }
    }

    /// Drop the pending open request, if any.
    pub(super) fn cancel_pending_open(&mut self) {
        self.timers.cancel(TimerKind::OpenSubmenu);
        if let Some(pending) = self.pending.take() {
            if pending.waiting {
                if let Some(item) = pending.item {
                    self.host.set_item_busy(item, false);
                }
            }
        }
    }

    fn complete_open(&mut self, pending: PendingOpen) {
        let parent = pending.window;
        let Some(item) = pending.item else {
            return;
        };
        let Some(submenu) = self.submenu_of(parent, item) else {
            tracing::warn!(?item, "submenu vanished before it could open");
            return;
        };
        let Some(item_rect) = self.windows.get(parent).and_then(|w| w.item_screen_rect(item)) else {
            tracing::warn!(?item, "parent row of a submenu is not laid out");
            return;
        };
        self.collapse_to(Some(parent));
        self.set_highlight(parent, Some(item));

        self.reset_filter(submenu);
        if let Some(previous) = self.tree.set_highlighted(submenu, None).flatten() {
            self.notify(Notification::HighlightedItemDidChange {
                menu: submenu,
                previous: Some(previous),
                current: None,
            });
        }

        let parent_window = &self.windows[parent];
        let modifiers = parent_window.modifiers();
        let parent_frame = parent_window.frame();
        let layout = MenuLayout::compute(&*self.tree, submenu, modifiers, &*self.host);
        let content = layout.metrics();
        let area = kurbo::Rect::new(parent_frame.x0, item_rect.y0, parent_frame.x1, item_rect.y1);
        let mut geometry = MenuGeometry::unplaced(content, parent_window.screen(), self.config.geometry);
        let alignment = geometry.position_adjacent_to_area(
            Point::ZERO,
            area,
            parent_window.alignment(),
            self.config.layout_direction,
            &content,
            self.host.screens(),
        );

        let window = MenuWindow::new(
            submenu,
            &geometry,
            &self.config.geometry,
            layout,
            Some(item_rect),
            alignment,
            modifiers,
        );
        tracing::debug!(
            generation = pending.generation,
            ?submenu,
            frame = ?window.frame(),
            ?alignment,
            "submenu window opened"
        );
        self.windows.push(window);
        let index = self.windows.len() - 1;
        self.notify(Notification::DidBeginTracking {
            menu: submenu,
            root: self.root,
        });
        self.update_corners();

        match pending.method {
            OpenMethod::Cursor => self.begin_intent(parent, item, self.pointer),
            OpenMethod::Keyboard | OpenMethod::Accessibility => {
                self.intent = None;
                self.focus_first_item(index);
            }
        }
    }

    fn focus_first_item(&mut self, index: usize) {
        let Some(window) = self.windows.get(index) else {
            return;
        };
        let first = self.tree.first_selectable(window.menu(), window.modifiers());
        self.key_window = index;
        self.set_highlight(index, first);
    }

    /// Start tracking the pointer from `item` in window `parent` toward the window
    /// above it.
    pub(super) fn begin_intent(&mut self, parent: usize, item: ItemId, location: Point) {
        let line = self.source_line(parent, item, location);
        let destination = self.windows.get(parent + 1).map(MenuWindow::frame);
        self.intent = match (line, destination) {
            (Some(line), Some(destination)) => Some(SubmenuIntent::new(item, line, destination, self.now)),
            _ => None,
        };
    }

    /// Close every window above `keep`, or all of them for `None`.
    pub(super) fn collapse_to(&mut self, keep: Option<usize>) {
        let len = keep.map_or(0, |keep| keep + 1);
        while self.windows.len() > len {
            let index = self.windows.len() - 1;
            self.set_highlight(index, None);
            let menu = self.windows[index].menu();
            self.notify(Notification::WillEndTracking { menu, root: self.root });
            self.windows.pop();
            tracing::debug!(?menu, "menu window closed");
        }

        if self
            .intent
            .as_ref()
            .is_some_and(|intent| self.submenu_window_of(intent.source()).is_none())
        {
            self.intent = None;
        }
        if self.auto_scroll.is_some_and(|auto| auto.window >= len) {
            self.stop_auto_scroll();
        }
        if self.pending.is_some_and(|pending| pending.window >= len) {
            self.cancel_pending_open();
        }
        self.key_window = self.key_window.min(self.windows.len().saturating_sub(1));
        self.update_corners();
    }

    /// Close the topmost window unless it is the root.
    pub(super) fn close_topmost_submenu(&mut self) {
        if self.windows.len() > 1 {
            self.collapse_to(Some(self.windows.len() - 2));
        }
    }
}
