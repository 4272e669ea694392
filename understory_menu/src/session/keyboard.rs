// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Keyboard handling, the built-in item view, and filter passes.

use kurbo::Rect;

use super::{MenuSession, OpenMethod, SessionState};
use crate::config::FilterMode;
use crate::event::Key;
use crate::filter::{FilterMatch, FilterPattern, score_items, spawn_filter_pass};
use crate::host::{MenuHost, Notification};
use crate::layout::MenuLayout;
use crate::menu::{ItemId, Menu, MenuId};

impl<H: MenuHost + ?Sized> MenuSession<'_, H> {
    pub(super) fn key_down(&mut self, key: Key) -> SessionState {
        if key == Key::Escape {
            if self.host.accessibility_active() && self.windows.len() > 1 {
                self.close_topmost_submenu();
                return SessionState::Continue;
            }
            return SessionState::Cancel;
        }

        let index = self.key_window;
        match self.view_key_down(index, key) {
            state @ (SessionState::Continue | SessionState::Cancel) => return state,
            SessionState::Highlight => {
                self.key_window = index;
                return SessionState::Highlight;
            }
            SessionState::ChangeFilter => {
                self.key_window = index;
                self.filter_changed(index);
                return SessionState::ChangeFilter;
            }
            _ => {}
        }

        match key {
            Key::Return | Key::Enter | Key::Space | Key::Char(' ') | Key::Right => {
                self.intent = None;
                let Some(window) = self.windows.get(index) else {
                    return self.inconsistent("keyboard focus on a window that is not open");
                };
                let Some(item) = self.tree.menu(window.menu()).and_then(Menu::highlighted) else {
                    return SessionState::Continue;
                };
                if self.submenu_of(index, item).is_some() {
                    self.request_open(index, Some(item), OpenMethod::Keyboard);
                    SessionState::Continue
                } else if key == Key::Right {
                    SessionState::Continue
                } else {
                    self.select(index, item, SessionState::GuiSelection)
                }
            }
            Key::Left => {
                self.close_topmost_submenu();
                SessionState::Continue
            }
            _ => SessionState::Continue,
        }
    }

    /// Key handling of the item view in window `index`: arrow navigation and
    /// type-to-filter.
    fn view_key_down(&mut self, index: usize, key: Key) -> SessionState {
        let Some(window) = self.windows.get(index) else {
            return SessionState::Unhandled;
        };
        let menu = window.menu();
        let modifiers = window.modifiers();
        let filter = self.tree.menu(menu).map(Menu::filter).unwrap_or_default();

        match key {
            Key::Up | Key::Down => {
                let current = self.tree.menu(menu).and_then(Menu::highlighted);
                let Some(next) = self.tree.step_selectable(menu, current, key == Key::Down, modifiers) else {
                    return SessionState::Continue;
                };
                self.collapse_to(Some(index));
                self.cancel_pending_open();
                self.intent = None;
                self.set_highlight(index, Some(next));
                self.reveal_item(index, next);
                SessionState::Highlight
            }
            Key::Backspace => {
                let mut text = filter.to_owned();
                if text.pop().is_none() {
                    return SessionState::Continue;
                }
                self.tree.set_filter_text(menu, &text);
                SessionState::ChangeFilter
            }
            Key::Space | Key::Char(' ') if filter.is_empty() => SessionState::Unhandled,
            Key::Space => self.append_filter(menu, ' '),
            Key::Char(c) if !c.is_control() => self.append_filter(menu, c),
            _ => SessionState::Unhandled,
        }
    }

    fn append_filter(&mut self, menu: MenuId, c: char) -> SessionState {
        let mut text = self.tree.menu(menu).map(Menu::filter).unwrap_or_default().to_owned();
        text.push(c);
        self.tree.set_filter_text(menu, &text);
        SessionState::ChangeFilter
    }

    /// Scroll window `index` so the row of `item` is fully visible.
    fn reveal_item(&mut self, index: usize, item: ItemId) {
        let Some(window) = self.windows.get(index) else {
            return;
        };
        let Some(row) = window.layout().entry(item).map(|entry| entry.frame) else {
            return;
        };
        let bounds = window.bounds();
        let y0 = if row.y0 < bounds.y0 {
            row.y0
        } else if row.y1 > bounds.y1 {
            row.y1 - bounds.height()
        } else {
            return;
        };
        let requested = Rect::new(bounds.x0, y0, bounds.x1, y0 + bounds.height());
        self.apply_scroll_bounds(index, requested);
    }

    /// Run a filter pass for the menu in window `index` after its text changed.
    pub(super) fn filter_changed(&mut self, index: usize) {
        let Some(menu) = self.windows.get(index).map(|window| window.menu()) else {
            return;
        };
        self.collapse_to(Some(index));
        self.cancel_pending_open();
        self.intent = None;

        let text = self.tree.menu(menu).map(Menu::filter).unwrap_or_default().to_owned();
        let items = self.tree.filterable_items(menu);
        let titles: Vec<String> = items
            .iter()
            .map(|item| self.tree.item(*item).map(|entry| entry.title().to_owned()).unwrap_or_default())
            .collect();

        match self.config.filter_mode {
            FilterMode::Synchronous => {
                let pattern = FilterPattern::parse(&text);
                let results = score_items(self.scorer.as_ref(), &pattern, &titles);
                tracing::debug!(?menu, filter = %text, items = items.len(), "filter pass");
                self.apply_filter_results(menu, !pattern.is_empty(), &items, results);
            }
            FilterMode::Background => {
                let ticket = self.live_filter.begin(menu);
                tracing::debug!(?menu, generation = ticket.generation, filter = %text, "background filter pass");
                let tx = self.completion_tx.clone();
                let waker = self.filter_waker.clone();
                // Detached: a superseded pass still runs to completion and is ignored.
                let _ = spawn_filter_pass(self.scorer.clone(), ticket, text, items, titles, move |done| {
                    if tx.send(done).is_ok() {
                        if let Some(waker) = waker {
                            waker();
                        }
                    }
                });
            }
        }
    }

    /// Apply results of background passes whose generation is still current.
    pub fn drain_filter_completions(&mut self) {
        while let Ok(done) = self.completion_rx.try_recv() {
            if !self.live_filter.is_current(&done.ticket) {
                tracing::trace!(generation = done.ticket.generation, "stale filter results dropped");
                continue;
            }
            let filtering = !FilterPattern::parse(&done.text).is_empty();
            self.apply_filter_results(done.ticket.menu, filtering, &done.items, done.results);
        }
    }

    fn apply_filter_results(&mut self, menu: MenuId, filtering: bool, items: &[ItemId], results: Vec<FilterMatch>) {
        for (item, result) in items.iter().zip(results) {
            self.tree.set_match(*item, result.score, result.ranges);
        }
        self.tree.refresh_visibility(menu, filtering);

        let Some(index) = self.windows.iter().position(|window| window.menu() == menu) else {
            return;
        };
        let modifiers = self.windows[index].modifiers();
        let highlight = if filtering {
            self.tree.first_selectable(menu, modifiers)
        } else {
            self.tree
                .menu(menu)
                .and_then(Menu::highlighted)
                .filter(|item| self.tree.is_selectable(*item, modifiers))
        };
        self.set_highlight(index, highlight);
        self.relayout(index);
    }

    /// Reset the filter of `menu` so every item shows.
    pub(super) fn reset_filter(&mut self, menu: MenuId) {
        // Passes still running for the old text must not land on the reset menu.
        let _ = self.live_filter.begin(menu);
        self.tree.set_filter_text(menu, "");
        for item in self.tree.filterable_items(menu) {
            let full = FilterMatch::full();
            self.tree.set_match(item, full.score, full.ranges);
        }
        self.tree.refresh_visibility(menu, false);
    }

    /// Lay out window `index` again and resize it if the content size changed.
    pub(super) fn relayout(&mut self, index: usize) {
        let Some(window) = self.windows.get(index) else {
            return;
        };
        let menu = window.menu();
        let layout = MenuLayout::compute(&*self.tree, menu, window.modifiers(), &*self.host);
        let metrics = layout.metrics();
        let changed = layout.total_size() != window.layout().total_size();
        let mut geometry = window.geometry(self.config.geometry);
        let anchor = window.anchor();

        if changed {
            self.notify(Notification::TotalItemSizeChanged {
                menu,
                size: metrics.total_size,
            });
            geometry.resize_for_changed_content(&metrics, anchor);
        }
        let window = &mut self.windows[index];
        window.set_layout(layout);
        if changed {
            window.apply_geometry(&geometry);
        }
        window.reset_scroll();
        self.update_corners();
    }
}
