// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pointer handling: hover reconciliation, clicks, scrolling and auto-scroll.

use kurbo::{Point, Rect};

use super::{AutoScroll, MenuSession, OpenMethod, SessionState};
use crate::event::Event;
use crate::host::{MenuHost, Notification};
use crate::menu::{ItemId, ModifierFlags};
use crate::timer::TimerKind;
use crate::window::{MenuWindow, ScrollDirection};

impl<H: MenuHost + ?Sized> MenuSession<'_, H> {
    /// Topmost window containing `location`.
    pub(super) fn window_under(&self, location: Point) -> Option<usize> {
        self.windows.iter().rposition(|window| window.frame().contains(location))
    }

    /// Topmost window under `location` and the selectable host item under it, if any.
    fn hit_test(&self, location: Point) -> Option<(usize, Option<ItemId>)> {
        let index = self.window_under(location)?;
        let window = &self.windows[index];
        if !window.content_rect().contains(location) {
            return Some((index, None));
        }
        let item = window
            .layout()
            .hit(&*self.tree, &*self.host, window.to_content(location))
            .filter(|item| self.tree.is_selectable(*item, window.modifiers()));
        Some((index, item))
    }

    pub(super) fn mouse_moved(&mut self) -> SessionState {
        let location = self.pointer;
        if let Some(top) = self.windows.len().checked_sub(1) {
            let arrow = self.windows[top].scroll_arrow_at(location, self.config.scroll_arrow_height);
            if let Some(direction) = arrow {
                self.arm_auto_scroll(top, direction);
                return SessionState::Continue;
            }
        }
        self.stop_auto_scroll();
        self.reconcile(location, true);
        SessionState::Continue
    }

    pub(super) fn left_mouse_down(&mut self, event: &Event) -> SessionState {
        let Some(index) = self.window_under(self.pointer) else {
            return SessionState::Cancel;
        };
        let menu = self.windows[index].menu();
        self.mouse_down_consumed = self.host.mouse_down_in_view(menu, event);
        self.key_window = index;
        SessionState::Continue
    }

    pub(super) fn left_mouse_up(&mut self) -> SessionState {
        if self.now.saturating_sub(self.started_at) < self.config.double_click_ms {
            tracing::trace!("mouse-up right after the session began, ignored");
            return SessionState::Continue;
        }
        if std::mem::take(&mut self.mouse_down_consumed) {
            return SessionState::Continue;
        }
        match self.hit_test(self.pointer) {
            None => SessionState::Cancel,
            Some((index, Some(item))) if self.submenu_of(index, item).is_none() => {
                self.select(index, item, SessionState::GuiSelection)
            }
            Some(_) => SessionState::Continue,
        }
    }

    pub(super) fn other_mouse_down(&mut self, event: &Event) -> SessionState {
        match self.window_under(self.pointer) {
            Some(index) => {
                self.key_window = index;
                SessionState::Continue
            }
            None => {
                self.host.repost_event(event);
                SessionState::Cancel
            }
        }
    }

    pub(super) fn scroll_wheel(&mut self, delta: f64) -> SessionState {
        let Some(index) = self.window_under(self.pointer) else {
            return SessionState::Continue;
        };
        let Some(bounds) = self.windows[index].scroll_mut().scroll_event(delta) else {
            return SessionState::Continue;
        };
        tracing::trace!(delta, action = ?self.windows[index].scroll().action(), "menu scrolled");
        self.apply_scroll_bounds(index, bounds);
        self.reconcile(self.pointer, true);
        SessionState::Continue
    }

    pub(super) fn flags_changed(&mut self, modifiers: ModifierFlags) -> SessionState {
        self.stop_auto_scroll();
        let index = self.key_window;
        let changed = self
            .windows
            .get(index)
            .is_some_and(|window| window.modifiers() != modifiers);
        if changed {
            self.windows[index].set_modifiers(modifiers);
            self.relayout(index);
        }
        if !self.host.accessibility_active() {
            self.reconcile(self.pointer, false);
        }
        self.update_corners();
        SessionState::Continue
    }

    /// Show `requested` content bounds in window `index`, resizing it if the height
    /// changed.
    pub(super) fn apply_scroll_bounds(&mut self, index: usize, requested: Rect) {
        let Some(window) = self.windows.get_mut(index) else {
            return;
        };
        if (requested.height() - window.bounds().height()).abs() < f64::EPSILON {
            // A pure pan may overshoot the content while bouncing; the solver would clamp it.
            window.set_bounds(requested);
        } else {
            let mut geometry = window.geometry(self.config.geometry);
            geometry.apply_scroll_request(requested);
            window.apply_geometry(&geometry);
        }
        let (menu, bounds, frame) = (window.menu(), window.bounds(), window.frame());
        window.scroll_mut().sync_bounds(bounds);
        self.notify(Notification::ScrollBoundsChanged { menu, bounds, frame });
        self.update_corners();

        let tracked = self
            .intent
            .as_ref()
            .and_then(|intent| self.submenu_window_of(intent.source()));
        if tracked == Some(index) {
            if let Some(intent) = &mut self.intent {
                intent.update_destination(frame);
            }
        }
    }

    fn arm_auto_scroll(&mut self, index: usize, direction: ScrollDirection) {
        if self
            .auto_scroll
            .is_some_and(|auto| auto.window == index && auto.direction == direction)
        {
            return;
        }
        tracing::trace!(?direction, "auto-scroll armed");
        self.auto_scroll = Some(AutoScroll {
            window: index,
            direction,
            started: self.now,
        });
        let period = self.config.auto_scroll_period_ms;
        self.timers
            .schedule(TimerKind::AutoScroll, self.now + period, Some(period));
    }

    pub(super) fn stop_auto_scroll(&mut self) {
        self.auto_scroll = None;
        self.timers.cancel(TimerKind::AutoScroll);
    }

    /// One auto-scroll step; speeds up by 10% per second after the first second.
    pub(super) fn auto_scroll_tick(&mut self) -> SessionState {
        let Some(auto) = self.auto_scroll else {
            self.stop_auto_scroll();
            return SessionState::Continue;
        };
        let Some(window) = self.windows.get(auto.window) else {
            self.stop_auto_scroll();
            return SessionState::Continue;
        };
        let elapsed = self.now.saturating_sub(auto.started) as f64 / 1000.0;
        let multiplier = if elapsed > 1.0 { 1.1_f64.powf(elapsed - 1.0) } else { 1.0 };
        let step = self.config.auto_scroll_step * multiplier;

        let bounds = window.bounds();
        let max_y0 = (window.layout().total_size().height - bounds.height()).max(0.0);
        let y0 = match auto.direction {
            ScrollDirection::Up => (bounds.y0 - step).max(0.0),
            ScrollDirection::Down => (bounds.y0 + step).min(max_y0),
        };
        let requested = Rect::new(bounds.x0, y0, bounds.x1, y0 + bounds.height());
        self.apply_scroll_bounds(auto.window, requested);

        if !self.windows[auto.window].can_scroll(auto.direction) {
            tracing::trace!(direction = ?auto.direction, "auto-scroll reached the end");
            self.stop_auto_scroll();
        }
        SessionState::Continue
    }

    /// Work out what the pointer at `location` is over and update highlight,
    /// submenus and cursor-intent tracking to match.
    ///
    /// With `allow_continuation` false, an in-flight submenu approach is abandoned
    /// unless the pointer is already on the submenu or its source item.
    pub(super) fn reconcile(&mut self, location: Point, allow_continuation: bool) {
        self.reconciled_at = Some(location);
        let mut hit = self.hit_test(location);

        if let Some(mut intent) = self.intent.take() {
            let source = intent.source();
            let hit_window = hit.map(|(index, _)| index);
            let hit_item = hit.and_then(|(_, item)| item);
            match self.submenu_window_of(source) {
                None => {}
                Some(tracked) if hit_window == Some(tracked) => {
                    tracing::trace!(?source, "cursor reached the submenu");
                }
                Some(tracked) if hit_item == Some(source) && hit_window == Some(tracked - 1) => {
                    if let Some(line) = self.source_line(tracked - 1, source, location) {
                        intent.update_source_line(line);
                    }
                    self.intent = Some(intent);
                    self.set_highlight(tracked - 1, Some(source));
                    return;
                }
                Some(_) if !allow_continuation => {
                    self.close_topmost_submenu();
                    hit = self.hit_test(location);
                }
                Some(_) if intent.is_progressing(Some(location), self.now) => {
                    self.intent = Some(intent);
                    return;
                }
                Some(_) => {
                    tracing::debug!(?source, "cursor turned away from the submenu");
                    self.close_topmost_submenu();
                    self.cancel_pending_open();
                    hit = self.hit_test(location);
                }
            }
        }

        let Some(top) = self.windows.len().checked_sub(1) else {
            return;
        };
        match hit {
            None => {
                self.set_highlight(top, None);
                if self
                    .pending
                    .is_some_and(|pending| pending.window == top && pending.method == OpenMethod::Cursor)
                {
                    self.cancel_pending_open();
                }
            }
            Some((index, item)) if index == top => {
                self.key_window = index;
                self.set_highlight(index, item);
                self.request_open(index, item, OpenMethod::Cursor);
            }
            Some((index, item)) => {
                self.key_window = index;
                let child = self.windows.get(index + 1).map(MenuWindow::menu);
                match item.filter(|item| child.is_some() && self.submenu_of(index, *item) == child) {
                    Some(item) => {
                        self.collapse_to(Some(index + 1));
                        self.cancel_pending_open();
                        self.set_highlight(index, Some(item));
                        self.begin_intent(index, item, location);
                        self.key_window = index + 1;
                    }
                    None => {
                        self.set_highlight(index, item);
                        self.request_open(index, item, OpenMethod::Cursor);
                    }
                }
            }
        }
    }

    /// Periodic tick: keep sampling an in-flight submenu approach, and catch up with
    /// pointer moves no event reported. A resting pointer leaves keyboard highlights
    /// alone.
    pub(super) fn periodic_tick(&mut self) -> SessionState {
        if self.intent.is_some() || self.reconciled_at != Some(self.pointer) {
            self.reconcile(self.pointer, true);
        }
        SessionState::Continue
    }

    /// Vertical line through the row of `item` in window `index`, at the pointer's x.
    pub(super) fn source_line(&self, index: usize, item: ItemId, location: Point) -> Option<Rect> {
        let row = self.windows.get(index)?.item_screen_rect(item)?;
        let x = location.x.clamp(row.x0, row.x1);
        Some(Rect::new(x, row.y0, x, row.y1))
    }
}
