// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Contracts between a menu session and the application hosting it.

use kurbo::{Point, Rect, Size};

use crate::event::Event;
use crate::menu::{ItemId, MenuId, MenuTree};

/// Whether a submenu can be shown right away.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum SubmenuReadiness {
    /// Populated; open it now.
    #[default]
    Now,
    /// Still being populated. The host posts
    /// [`DeferredMenuUpdateReady`](crate::ApplicationEvent::DeferredMenuUpdateReady)
    /// with the same generation once it is done.
    Later,
}

/// Something a menu session reports to its host.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Notification {
    /// The session is about to show `root`.
    WillBeginSession {
        /// Root menu.
        root: MenuId,
    },
    /// The session has ended and every window is closed.
    DidEndSession {
        /// Root menu.
        root: MenuId,
    },
    /// A window showing `menu` joined the stack.
    DidBeginTracking {
        /// Menu now on screen.
        menu: MenuId,
        /// Root menu of the session.
        root: MenuId,
    },
    /// The window showing `menu` is about to close.
    WillEndTracking {
        /// Menu leaving the screen.
        menu: MenuId,
        /// Root menu of the session.
        root: MenuId,
    },
    /// The highlighted item of `menu` changed.
    HighlightedItemDidChange {
        /// Menu whose highlight changed.
        menu: MenuId,
        /// Previously highlighted item.
        previous: Option<ItemId>,
        /// Newly highlighted item.
        current: Option<ItemId>,
    },
    /// The user chose `item`.
    DidSelectItem {
        /// Menu containing the host item.
        menu: MenuId,
        /// Chosen item; an alternate if one was displayed.
        item: ItemId,
    },
    /// The laid-out content of `menu` changed size.
    TotalItemSizeChanged {
        /// Menu whose content changed.
        menu: MenuId,
        /// New content size.
        size: Size,
    },
    /// The visible part of `menu`'s content changed.
    ScrollBoundsChanged {
        /// Menu whose window scrolled or resized.
        menu: MenuId,
        /// Visible content bounds.
        bounds: Rect,
        /// Window frame after the change.
        frame: Rect,
    },
}

/// The application side of a menu session.
///
/// Only [`screens`](Self::screens), [`item_size`](Self::item_size) and
/// [`pointer_location`](Self::pointer_location) are required.
pub trait MenuHost {
    /// Frames of the available screens.
    fn screens(&self) -> &[Rect];

    /// Display size of `item`.
    fn item_size(&self, tree: &MenuTree, item: ItemId) -> Size;

    /// Whether `point` (content coordinates) hits `item`, laid out at `frame`.
    fn item_contains(&self, _tree: &MenuTree, _item: ItemId, frame: Rect, point: Point) -> bool {
        frame.contains(point)
    }

    /// Whether `menu` can be shown now. `generation` identifies the open request.
    fn submenu_readiness(&mut self, _tree: &MenuTree, _menu: MenuId, _generation: u64) -> SubmenuReadiness {
        SubmenuReadiness::Now
    }

    /// Show or hide the busy indicator of `item`.
    fn set_item_busy(&mut self, _item: ItemId, _busy: bool) {}

    /// Offer a mouse-down inside the window of `menu` to its view. Returns `true`
    /// when the view consumed it, e.g. a click in a filter field.
    fn mouse_down_in_view(&mut self, _menu: MenuId, _event: &Event) -> bool {
        false
    }

    /// Hand an event back to the application's normal dispatch.
    fn repost_event(&mut self, _event: &Event) {}

    /// Current pointer location in screen coordinates.
    fn pointer_location(&self) -> Point;

    /// Whether assistive technology is driving the menu.
    fn accessibility_active(&self) -> bool {
        false
    }

    /// Receive a session notification.
    fn notify(&mut self, _notification: &Notification) {}
}
