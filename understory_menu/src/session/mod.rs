// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The modal menu session: window stack, event interpretation, and the loop.

mod keyboard;
mod pointer;
mod submenu;

#[cfg(test)]
mod tests;

use std::fmt;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};

use kurbo::{BezPath, Point, Rect};
use understory_cursor_intent::SubmenuIntent;
use understory_menu_geometry::{Alignment, MenuGeometry, rounded_corners};

use crate::chrome::{CornerMaskCache, corner_mask_path};
use crate::config::SessionConfig;
use crate::event::{ApplicationEvent, Event, EventKind, SystemDisposition};
use crate::filter::{BasicScorer, FilterCompletion, FilterScorer, LiveFilter};
use crate::host::{MenuHost, Notification};
use crate::layout::MenuLayout;
use crate::menu::{Item, ItemId, MenuId, MenuTree, ModifierFlags};
use crate::source::EventSource;
use crate::timer::{TimerKind, TimerQueue};
use crate::window::{MenuWindow, ScrollDirection};

/// Outcome of interpreting one event.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SessionState {
    /// Nobody handled the event.
    Unhandled,
    /// Keep running.
    Continue,
    /// Close everything without a selection.
    Cancel,
    /// Close everything immediately without a selection.
    Interrupt,
    /// The user chose an item with the mouse or keyboard.
    GuiSelection,
    /// Assistive technology chose an item.
    AccessibleSelection,
    /// A view moved its highlight.
    Highlight,
    /// A view changed its filter text.
    ChangeFilter,
}

impl SessionState {
    /// Whether the session ends in this state.
    pub const fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Cancel | Self::Interrupt | Self::GuiSelection | Self::AccessibleSelection
        )
    }

    /// Whether the session ends with an item chosen.
    pub const fn is_selection(self) -> bool {
        matches!(self, Self::GuiSelection | Self::AccessibleSelection)
    }
}

/// How a submenu open was requested.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum OpenMethod {
    /// Hovering the parent item; debounced.
    Cursor,
    /// Return, Space or Right arrow; immediate.
    Keyboard,
    /// Assistive technology; immediate.
    Accessibility,
}

/// Where the root menu appears.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Placement {
    /// Put `menu_point` (content coordinates) at `screen_point`.
    AtLocation {
        /// Point in the menu's content.
        menu_point: Point,
        /// Point on screen.
        screen_point: Point,
    },
    /// Open beside `area`, e.g. a button.
    Adjacent {
        /// Content point aligned with the top of `area`; `x` is the allowed overlap.
        menu_point: Point,
        /// Screen area to open beside.
        area: Rect,
        /// Side to prefer.
        preferred: Alignment,
    },
}

/// Request to show the root menu.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ShowRequest {
    /// Initial placement.
    pub placement: Placement,
    /// Area the menu must keep covering vertically when its content changes size.
    pub anchor: Option<Rect>,
}

impl ShowRequest {
    /// Show with `menu_point` at `screen_point`.
    pub const fn at_location(menu_point: Point, screen_point: Point) -> Self {
        Self {
            placement: Placement::AtLocation {
                menu_point,
                screen_point,
            },
            anchor: None,
        }
    }

    /// Show beside `area`.
    pub const fn adjacent_to(area: Rect, preferred: Alignment) -> Self {
        Self {
            placement: Placement::Adjacent {
                menu_point: Point::ZERO,
                area,
                preferred,
            },
            anchor: None,
        }
    }

    /// Keep covering `anchor` on content size changes.
    #[must_use]
    pub const fn with_anchor(mut self, anchor: Rect) -> Self {
        self.anchor = Some(anchor);
        self
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct PendingOpen {
    generation: u64,
    window: usize,
    item: Option<ItemId>,
    method: OpenMethod,
    waiting: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct AutoScroll {
    window: usize,
    direction: ScrollDirection,
    started: u64,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct Selection {
    menu: MenuId,
    item: ItemId,
}

/// Wakes the host's event source when a background filter pass finishes.
pub type FilterWaker = Arc<dyn Fn() + Send + Sync>;

/// One modal run of a menu and its submenus.
///
/// The session owns the window stack and every transient tracking object. It
/// borrows the [`MenuTree`] and the [`MenuHost`] for its whole lifetime.
///
/// [`run`](Self::run) drives everything from an [`EventSource`]. The steps it is
/// built from ([`begin`](Self::begin), [`dispatch`](Self::dispatch),
/// [`fire_due_timers`](Self::fire_due_timers), [`finish`](Self::finish)) are public
/// so hosts with their own loop, and tests, can drive a session one event at a time.
pub struct MenuSession<'a, H: MenuHost + ?Sized> {
    tree: &'a mut MenuTree,
    host: &'a mut H,
    config: SessionConfig,
    root: MenuId,
    scorer: Arc<dyn FilterScorer>,
    windows: Vec<MenuWindow>,
    key_window: usize,
    pointer: Point,
    reconciled_at: Option<Point>,
    now: u64,
    started_at: u64,
    intent: Option<SubmenuIntent<ItemId>>,
    pending: Option<PendingOpen>,
    open_generation: u64,
    timers: TimerQueue,
    auto_scroll: Option<AutoScroll>,
    mouse_down_consumed: bool,
    selection: Option<Selection>,
    live_filter: LiveFilter,
    completion_tx: Sender<FilterCompletion>,
    completion_rx: Receiver<FilterCompletion>,
    filter_waker: Option<FilterWaker>,
    masks: CornerMaskCache<BezPath>,
}

impl<H: MenuHost + ?Sized> fmt::Debug for MenuSession<'_, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MenuSession")
            .field("root", &self.root)
            .field("config", &self.config)
            .field("windows", &self.windows)
            .field("key_window", &self.key_window)
            .field("pointer", &self.pointer)
            .field("now", &self.now)
            .field("intent", &self.intent)
            .field("pending", &self.pending)
            .field("open_generation", &self.open_generation)
            .field("timers", &self.timers)
            .field("auto_scroll", &self.auto_scroll)
            .finish_non_exhaustive()
    }
}

impl<'a, H: MenuHost + ?Sized> MenuSession<'a, H> {
    /// Prepare a session for `root`. Nothing is shown until [`begin`](Self::begin).
    pub fn new(tree: &'a mut MenuTree, root: MenuId, host: &'a mut H, config: SessionConfig) -> Self {
        let (completion_tx, completion_rx) = mpsc::channel();
        Self {
            tree,
            host,
            masks: CornerMaskCache::new(config.corner_radius),
            config,
            root,
            scorer: Arc::new(BasicScorer),
            windows: Vec::new(),
            key_window: 0,
            pointer: Point::ZERO,
            reconciled_at: None,
            now: 0,
            started_at: 0,
            intent: None,
            pending: None,
            open_generation: 0,
            timers: TimerQueue::new(),
            auto_scroll: None,
            mouse_down_consumed: false,
            selection: None,
            live_filter: LiveFilter::new(),
            completion_tx,
            completion_rx,
            filter_waker: None,
        }
    }

    /// Use `scorer` instead of [`BasicScorer`].
    #[must_use]
    pub fn with_scorer(mut self, scorer: Arc<dyn FilterScorer>) -> Self {
        self.scorer = scorer;
        self
    }

    /// Call `waker` from the worker thread whenever a background filter pass
    /// finishes, typically to post
    /// [`FilterResultsReady`](ApplicationEvent::FilterResultsReady).
    #[must_use]
    pub fn with_filter_waker(mut self, waker: FilterWaker) -> Self {
        self.filter_waker = Some(waker);
        self
    }

    /// Menu tree being shown.
    pub fn tree(&self) -> &MenuTree {
        &*self.tree
    }

    /// Host of the session.
    pub fn host(&self) -> &H {
        &*self.host
    }

    /// Session configuration.
    pub const fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Open windows, root first.
    pub fn windows(&self) -> &[MenuWindow] {
        &self.windows
    }

    /// Index of the window receiving keyboard input.
    pub const fn key_window(&self) -> usize {
        self.key_window
    }

    /// Active cursor-intent tracking, if the pointer is heading for a submenu.
    pub fn intent(&self) -> Option<&SubmenuIntent<ItemId>> {
        self.intent.as_ref()
    }

    /// Generation of the most recent submenu open request.
    pub const fn open_generation(&self) -> u64 {
        self.open_generation
    }

    /// Generation of the open request still pending, and whether it waits for the
    /// host to populate the submenu.
    pub fn pending_open(&self) -> Option<(u64, bool)> {
        self.pending.map(|p| (p.generation, p.waiting))
    }

    /// Whether an auto-scroll timer is running.
    pub fn is_auto_scrolling(&self) -> bool {
        self.auto_scroll.is_some()
    }

    /// Earliest pending timer deadline.
    pub fn next_deadline(&self) -> Option<u64> {
        self.timers.next_deadline()
    }

    /// Chrome mask for the corners of window `index`.
    pub fn corner_mask(&mut self, index: usize) -> Option<&BezPath> {
        let corners = self.windows.get(index)?.corners();
        Some(self.masks.get_or_insert_with(corners, corner_mask_path))
    }

    /// Run the whole session and return the chosen item.
    ///
    /// Returns `None` when the menu could not be placed, was cancelled or
    /// interrupted, or saw no input for the configured timeout.
    pub fn run<E>(&mut self, events: &mut E, request: &ShowRequest) -> Option<ItemId>
    where
        E: EventSource + ?Sized,
    {
        let start = events.now();
        if !self.begin(request, start) {
            return self.finish(SessionState::Cancel);
        }

        let mut last_input = start;
        let state = loop {
            self.drain_filter_completions();
            let timeout_at = last_input.saturating_add(self.config.event_timeout_ms);
            let deadline = self
                .timers
                .next_deadline()
                .map_or(timeout_at, |timer| timer.min(timeout_at));

            if let Some(event) = events.next_event(deadline) {
                last_input = events.now();
                let state = self.dispatch(&event);
                if state.is_terminal() {
                    break state;
                }
                continue;
            }

            let now = events.now();
            let state = self.fire_due_timers(now);
            if state.is_terminal() {
                break state;
            }
            if now >= timeout_at {
                tracing::warn!(
                    idle_ms = now - last_input,
                    "no input within the event timeout, cancelling menu session"
                );
                break SessionState::Cancel;
            }
        };
        self.finish(state)
    }

    /// Show the root menu. Returns `false` if it could not be placed on any screen.
    pub fn begin(&mut self, request: &ShowRequest, now: u64) -> bool {
        self.now = now;
        self.started_at = now;
        self.pointer = self.host.pointer_location();
        self.reconciled_at = None;
        let root = self.root;
        self.host.notify(&Notification::WillBeginSession { root });
        tracing::debug!(?root, ?request, "menu session begins");

        self.reset_filter(root);
        if let Some(previous) = self.tree.set_highlighted(root, None).flatten() {
            self.host.notify(&Notification::HighlightedItemDidChange {
                menu: root,
                previous: Some(previous),
                current: None,
            });
        }

        let modifiers = ModifierFlags::empty();
        let layout = MenuLayout::compute(&*self.tree, root, modifiers, &*self.host);
        let content = layout.metrics();
        let screens = self.host.screens();
        let Some(first_screen) = screens.first().copied() else {
            tracing::warn!("host reports no screens, cannot show menu");
            return false;
        };
        let mut geometry = MenuGeometry::unplaced(content, first_screen, self.config.geometry);
        let alignment = match request.placement {
            Placement::AtLocation {
                menu_point,
                screen_point,
            } => {
                if !geometry.position_at_screen_location(menu_point, screen_point, true, &content, screens) {
                    tracing::debug!(?screen_point, "no screen contains the requested location");
                    return false;
                }
                Alignment::Trailing
            }
            Placement::Adjacent {
                menu_point,
                area,
                preferred,
            } => geometry.position_adjacent_to_area(
                menu_point,
                area,
                preferred,
                self.config.layout_direction,
                &content,
                screens,
            ),
        };

        let window = MenuWindow::new(
            root,
            &geometry,
            &self.config.geometry,
            layout,
            request.anchor,
            alignment,
            modifiers,
        );
        tracing::debug!(frame = ?window.frame(), bounds = ?window.bounds(), "root menu window placed");
        self.windows.push(window);
        self.key_window = 0;
        self.host.notify(&Notification::DidBeginTracking { menu: root, root });
        self.update_corners();

        let period = self.config.periodic_ms;
        self.timers.schedule(TimerKind::Periodic, now + period, Some(period));
        true
    }

    /// Interpret one input event.
    ///
    /// [`SessionState::Highlight`] and [`SessionState::ChangeFilter`] never escape:
    /// their side effects are applied and the session continues.
    pub fn dispatch(&mut self, event: &Event) -> SessionState {
        self.now = self.now.max(event.timestamp);
        if let Some(location) = event.location {
            self.pointer = location;
        }
        tracing::trace!(kind = ?event.kind, timestamp = event.timestamp, "menu event");

        let state = match event.kind {
            EventKind::KeyDown(key) => self.key_down(key),
            EventKind::FlagsChanged => self.flags_changed(event.modifiers),
            EventKind::MouseMoved | EventKind::LeftMouseDragged => self.mouse_moved(),
            EventKind::LeftMouseDown => self.left_mouse_down(event),
            EventKind::LeftMouseUp => self.left_mouse_up(),
            EventKind::RightMouseDown | EventKind::OtherMouseDown => self.other_mouse_down(event),
            EventKind::ScrollWheel { delta } => self.scroll_wheel(delta),
            EventKind::Application(app) => self.application_event(app),
            EventKind::System(system) => match system.disposition() {
                SystemDisposition::PassThrough => {
                    self.host.repost_event(event);
                    SessionState::Continue
                }
                SystemDisposition::Ignore => SessionState::Continue,
            },
        };
        match state {
            SessionState::Unhandled | SessionState::Highlight | SessionState::ChangeFilter => {
                SessionState::Continue
            }
            other => other,
        }
    }

    /// Fire every timer due at `now`.
    pub fn fire_due_timers(&mut self, now: u64) -> SessionState {
        self.now = self.now.max(now);
        while let Some(kind) = self.timers.pop_due(now) {
            tracing::trace!(?kind, now, "menu timer fired");
            let state = match kind {
                TimerKind::OpenSubmenu => self.open_pending(),
                TimerKind::AutoScroll => self.auto_scroll_tick(),
                TimerKind::Periodic => self.periodic_tick(),
            };
            if state.is_terminal() {
                return state;
            }
        }
        SessionState::Continue
    }

    /// Close every window and report the outcome.
    ///
    /// For a selection, [`Notification::DidSelectItem`] is sent, then
    /// [`Notification::DidEndSession`], and finally the item's action runs.
    pub fn finish(&mut self, state: SessionState) -> Option<ItemId> {
        self.timers = TimerQueue::new();
        self.auto_scroll = None;
        self.intent = None;
        self.cancel_pending_open();
        if state == SessionState::Interrupt {
            tracing::debug!("menu session interrupted");
        }
        self.collapse_to(None);

        let root = self.root;
        let selection = if state.is_selection() {
            self.selection.take()
        } else {
            None
        };
        if let Some(Selection { menu, item }) = selection {
            self.host.notify(&Notification::DidSelectItem { menu, item });
        }
        self.host.notify(&Notification::DidEndSession { root });
        tracing::debug!(?state, selected = ?selection.map(|s| s.item), "menu session ended");

        let item = selection.map(|s| s.item);
        if let Some(item) = item {
            if let Some(action) = self.tree.item(item).and_then(Item::action).cloned() {
                action(item);
            }
        }
        item
    }

    fn application_event(&mut self, event: ApplicationEvent) -> SessionState {
        match event {
            ApplicationEvent::DidResignActive => SessionState::Interrupt,
            ApplicationEvent::AccessibleItemSelection(item) => self.accessible_select(item),
            ApplicationEvent::AccessibleOpenSubmenu(item) => {
                if let Some(index) = self.window_containing(item) {
                    self.set_highlight(index, Some(item));
                    self.request_open(index, Some(item), OpenMethod::Accessibility);
                }
                SessionState::Continue
            }
            ApplicationEvent::Periodic => self.periodic_tick(),
            ApplicationEvent::DeferredMenuUpdateReady { generation } => {
                self.deferred_update_ready(generation);
                SessionState::Continue
            }
            ApplicationEvent::FilterResultsReady => {
                self.drain_filter_completions();
                SessionState::Continue
            }
        }
    }

    fn accessible_select(&mut self, item: ItemId) -> SessionState {
        let Some(entry) = self.tree.item(item) else {
            return self.inconsistent("accessible selection names an unknown item");
        };
        if !entry.is_selectable() {
            return SessionState::Continue;
        }
        let menu = entry
            .menu()
            .or_else(|| entry.host().and_then(|host| self.tree.item(host)?.menu()));
        let Some(menu) = menu else {
            return self.inconsistent("accessible selection names a detached item");
        };
        self.selection = Some(Selection { menu, item });
        SessionState::AccessibleSelection
    }

    /// Record a selection of host item `item` in window `index`.
    fn select(&mut self, index: usize, item: ItemId, state: SessionState) -> SessionState {
        let Some(window) = self.windows.get(index) else {
            return self.inconsistent("selection in a window that is not open");
        };
        let displayed = self.tree.displayed_item(item, window.modifiers());
        if !self.tree.item(displayed).is_some_and(Item::is_selectable) {
            return SessionState::Continue;
        }
        self.selection = Some(Selection {
            menu: window.menu(),
            item: displayed,
        });
        state
    }

    fn inconsistent(&self, what: &'static str) -> SessionState {
        tracing::warn!(what, windows = self.windows.len(), "menu session state is inconsistent, cancelling");
        SessionState::Cancel
    }

    pub(crate) fn notify(&mut self, notification: Notification) {
        self.host.notify(&notification);
    }

    fn window_containing(&self, item: ItemId) -> Option<usize> {
        let menu = self.tree.item(item)?.menu()?;
        self.windows.iter().position(|window| window.menu() == menu)
    }

    fn set_highlight(&mut self, index: usize, item: Option<ItemId>) {
        let Some(menu) = self.windows.get(index).map(MenuWindow::menu) else {
            return;
        };
        if let Some(previous) = self.tree.set_highlighted(menu, item) {
            if previous != item {
                self.notify(Notification::HighlightedItemDidChange {
                    menu,
                    previous,
                    current: item,
                });
            }
        }
    }

    fn update_corners(&mut self) {
        let frames: Vec<Rect> = self.windows.iter().map(MenuWindow::frame).collect();
        let corners = rounded_corners(&frames, self.config.corner_radius);
        for (window, corners) in self.windows.iter_mut().zip(corners) {
            window.set_corners(corners);
        }
    }
}
