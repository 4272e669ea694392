// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::{Arc, Mutex, mpsc};
use std::time::Duration;

use kurbo::{Point, Rect, Size};
use understory_elastic_scroll::{ClipMode, ScrollAction};
use understory_menu_geometry::Corners;

use super::{MenuSession, SessionState, ShowRequest};
use crate::config::{FilterMode, SessionConfig};
use crate::event::{ApplicationEvent, Event, EventKind, Key, SystemEvent};
use crate::host::{MenuHost, Notification, SubmenuReadiness};
use crate::menu::{ItemId, Menu, MenuId, MenuTree, ModifierFlags};
use crate::source::{EventSource, ScriptedEvents};

const SCREEN: Rect = Rect::new(0.0, 0.0, 1440.0, 900.0);

#[derive(Default)]
struct FakeHost {
    screens: Vec<Rect>,
    pointer: Point,
    later: Vec<MenuId>,
    readiness_requests: Vec<(MenuId, u64)>,
    busy: Vec<(ItemId, bool)>,
    reposted: Vec<EventKind>,
    notifications: Vec<Notification>,
    log: Rc<RefCell<Vec<&'static str>>>,
}

impl FakeHost {
    fn new() -> Self {
        Self {
            screens: vec![SCREEN],
            ..Self::default()
        }
    }
}

impl MenuHost for FakeHost {
    fn screens(&self) -> &[Rect] {
        &self.screens
    }

    fn item_size(&self, _tree: &MenuTree, _item: ItemId) -> Size {
        Size::new(100.0, 20.0)
    }

    fn pointer_location(&self) -> Point {
        self.pointer
    }

    fn submenu_readiness(&mut self, _tree: &MenuTree, menu: MenuId, generation: u64) -> SubmenuReadiness {
        self.readiness_requests.push((menu, generation));
        if self.later.contains(&menu) {
            SubmenuReadiness::Later
        } else {
            SubmenuReadiness::Now
        }
    }

    fn set_item_busy(&mut self, item: ItemId, busy: bool) {
        self.busy.push((item, busy));
    }

    fn repost_event(&mut self, event: &Event) {
        self.reposted.push(event.kind);
    }

    fn notify(&mut self, notification: &Notification) {
        match notification {
            Notification::DidSelectItem { .. } => self.log.borrow_mut().push("select"),
            Notification::DidEndSession { .. } => self.log.borrow_mut().push("end"),
            _ => {}
        }
        self.notifications.push(*notification);
    }
}

fn numbered_menu(tree: &mut MenuTree, count: usize) -> MenuId {
    let menu = tree.new_menu("Numbers");
    for n in 1..=count {
        tree.add_item(menu, format!("item {n}")).unwrap();
    }
    menu
}

/// Root with "Open Recent" (submenu "a", "b"), "Save", "Quit".
fn file_menu(tree: &mut MenuTree) -> (MenuId, ItemId, MenuId) {
    let root = tree.new_menu("File");
    let recent = tree.add_item(root, "Open Recent").unwrap();
    tree.add_item(root, "Save").unwrap();
    tree.add_item(root, "Quit").unwrap();
    let sub = tree.new_menu("Recent");
    tree.add_item(sub, "a").unwrap();
    tree.add_item(sub, "b").unwrap();
    tree.set_submenu(recent, sub).unwrap();
    (root, recent, sub)
}

fn at(x: f64, y: f64) -> ShowRequest {
    ShowRequest::at_location(Point::ZERO, Point::new(x, y))
}

fn highlighted(tree: &MenuTree, menu: MenuId) -> Option<ItemId> {
    tree.menu(menu).and_then(Menu::highlighted)
}

fn type_text<H: MenuHost + ?Sized>(session: &mut MenuSession<'_, H>, text: &str, start: u64) {
    for (i, c) in text.chars().enumerate() {
        assert_eq!(session.dispatch(&Event::key(Key::Char(c), start + i as u64)), SessionState::Continue);
    }
}

#[test]
fn root_at_screen_center_shows_everything() {
    let mut tree = MenuTree::new();
    let root = numbered_menu(&mut tree, 5);
    let mut host = FakeHost::new();
    let mut session = MenuSession::new(&mut tree, root, &mut host, SessionConfig::default());

    assert!(session.begin(&at(720.0, 450.0), 0));
    let window = &session.windows()[0];
    assert!(window.frame().width() < SCREEN.width());
    assert!(window.frame().height() >= 24.0);
    assert_eq!(window.bounds().size(), Size::new(100.0, 100.0));
    assert_eq!(window.frame().origin(), Point::new(720.0, 446.0));
    assert_eq!(window.scroll().clip_mode(), ClipMode::None);

    let notes = &session.host().notifications;
    assert_eq!(notes[0], Notification::WillBeginSession { root });
    assert!(notes.contains(&Notification::DidBeginTracking { menu: root, root }));
}

#[test]
fn location_off_every_screen_cancels() {
    let mut tree = MenuTree::new();
    let root = numbered_menu(&mut tree, 3);
    let mut host = FakeHost::new();
    let mut session = MenuSession::new(&mut tree, root, &mut host, SessionConfig::default());

    assert!(!session.begin(&at(5000.0, 5000.0), 0));
    assert_eq!(session.finish(SessionState::Cancel), None);
    assert!(session.windows().is_empty());
    assert_eq!(
        session.host().notifications.last(),
        Some(&Notification::DidEndSession { root })
    );
}

#[test]
fn regex_filter_shrinks_the_menu() {
    let mut tree = MenuTree::new();
    let root = numbered_menu(&mut tree, 20);
    let mut host = FakeHost::new();
    let mut session = MenuSession::new(&mut tree, root, &mut host, SessionConfig::default());
    assert!(session.begin(&at(700.0, 100.0), 0));
    let top = session.windows()[0].frame().y0;
    assert_eq!(session.windows()[0].bounds().height(), 400.0);

    type_text(&mut session, "r/[13579]$/", 10);

    let window = &session.windows()[0];
    assert_eq!(window.bounds().height(), 200.0);
    assert_eq!(window.frame().height(), 208.0);
    assert_eq!(window.frame().y0, top);
    assert_eq!(window.layout().entries().len(), 10);
    let first = window.layout().entries()[0].item;
    assert_eq!(session.tree().item(first).map(|item| item.title()), Some("item 1"));
    assert_eq!(highlighted(session.tree(), root), Some(first));
    assert!(session.host().notifications.iter().any(|note| matches!(
        note,
        Notification::TotalItemSizeChanged { size, .. } if size.height == 200.0
    )));
}

#[test]
fn zero_matches_leave_empty_content() {
    let mut tree = MenuTree::new();
    let root = numbered_menu(&mut tree, 20);
    let mut host = FakeHost::new();
    let mut session = MenuSession::new(&mut tree, root, &mut host, SessionConfig::default());
    assert!(session.begin(&at(700.0, 100.0), 0));

    type_text(&mut session, "zzz", 10);
    let window = &session.windows()[0];
    assert_eq!(window.bounds().height(), 0.0);
    assert_eq!(window.frame().height(), 24.0);
    assert_eq!(highlighted(session.tree(), root), None);

    // Clearing the text brings every item back.
    for t in 0..3 {
        session.dispatch(&Event::key(Key::Backspace, 20 + t));
    }
    assert_eq!(session.windows()[0].bounds().height(), 400.0);
    assert_eq!(session.tree().menu(root).map(Menu::filter), Some(""));
}

#[test]
fn background_filter_applies_only_the_latest_pass() {
    let mut tree = MenuTree::new();
    let root = numbered_menu(&mut tree, 20);
    let mut host = FakeHost::new();
    let config = SessionConfig {
        filter_mode: FilterMode::Background,
        ..SessionConfig::default()
    };
    let (wake_tx, wake_rx) = mpsc::channel();
    let wake_tx = Mutex::new(wake_tx);
    let mut session = MenuSession::new(&mut tree, root, &mut host, config).with_filter_waker(Arc::new(move || {
        let _ = wake_tx.lock().unwrap().send(());
    }));
    assert!(session.begin(&at(700.0, 100.0), 0));

    type_text(&mut session, "19", 10);
    for _ in 0..2 {
        wake_rx.recv_timeout(Duration::from_secs(10)).unwrap();
    }
    assert_eq!(session.windows()[0].bounds().height(), 400.0);

    session.dispatch(&Event::application(ApplicationEvent::FilterResultsReady, 20));
    let window = &session.windows()[0];
    assert_eq!(window.bounds().height(), 20.0);
    let only = window.layout().entries()[0].item;
    assert_eq!(session.tree().item(only).map(|item| item.title()), Some("item 19"));
}

#[test]
fn keyboard_open_highlights_first_submenu_item() {
    let mut tree = MenuTree::new();
    let (root, recent, sub) = file_menu(&mut tree);
    let mut host = FakeHost::new();
    let mut session = MenuSession::new(&mut tree, root, &mut host, SessionConfig::default());
    assert!(session.begin(&at(700.0, 400.0), 0));

    session.dispatch(&Event::key(Key::Down, 10));
    assert_eq!(highlighted(session.tree(), root), Some(recent));
    session.dispatch(&Event::key(Key::Right, 20));

    assert_eq!(session.windows().len(), 2);
    assert_eq!(session.windows()[1].menu(), sub);
    assert_eq!(session.key_window(), 1);
    let first = session.tree().first_selectable(sub, ModifierFlags::empty());
    assert_eq!(highlighted(session.tree(), sub), first);
    assert_eq!(session.pending_open(), None);
    assert!(session.intent().is_none());

    // The submenu opens beside its parent row, first item level with the row.
    let frame = session.windows()[1].frame();
    assert_eq!(frame.x0, 800.0);
    assert_eq!(frame.y0, 396.0);

    session.dispatch(&Event::key(Key::Left, 30));
    assert_eq!(session.windows().len(), 1);
    assert_eq!(session.key_window(), 0);
    assert!(
        session
            .host()
            .notifications
            .contains(&Notification::WillEndTracking { menu: sub, root })
    );
}

#[test]
fn reopening_a_submenu_drops_its_running_filter_pass() {
    let mut tree = MenuTree::new();
    let (root, _, sub) = file_menu(&mut tree);
    let mut host = FakeHost::new();
    let config = SessionConfig {
        filter_mode: FilterMode::Background,
        ..SessionConfig::default()
    };
    let (wake_tx, wake_rx) = mpsc::channel();
    let wake_tx = Mutex::new(wake_tx);
    let mut session = MenuSession::new(&mut tree, root, &mut host, config).with_filter_waker(Arc::new(move || {
        let _ = wake_tx.lock().unwrap().send(());
    }));
    assert!(session.begin(&at(700.0, 400.0), 0));

    session.dispatch(&Event::key(Key::Down, 10));
    session.dispatch(&Event::key(Key::Right, 20));
    assert_eq!(session.key_window(), 1);
    session.dispatch(&Event::key(Key::Char('a'), 30));

    session.dispatch(&Event::key(Key::Left, 40));
    session.dispatch(&Event::key(Key::Right, 50));
    assert_eq!(session.windows().len(), 2);
    assert_eq!(session.tree().menu(sub).map(Menu::filter), Some(""));

    wake_rx.recv_timeout(Duration::from_secs(10)).unwrap();
    session.dispatch(&Event::application(ApplicationEvent::FilterResultsReady, 60));
    assert_eq!(session.tree().menu(sub).map(Menu::filter), Some(""));
    assert_eq!(session.windows()[1].layout().entries().len(), 2);
}

#[test]
fn space_character_activates_like_the_space_key() {
    let mut tree = MenuTree::new();
    let (root, _, sub) = file_menu(&mut tree);
    let a = tree.menu(sub).map(|menu| menu.items()[0]).unwrap();
    let mut host = FakeHost::new();
    let mut session = MenuSession::new(&mut tree, root, &mut host, SessionConfig::default());
    assert!(session.begin(&at(700.0, 400.0), 0));

    session.dispatch(&Event::key(Key::Down, 10));
    assert_eq!(session.dispatch(&Event::key(Key::Char(' '), 20)), SessionState::Continue);
    assert_eq!(session.windows().len(), 2);
    assert_eq!(highlighted(session.tree(), sub), Some(a));

    assert_eq!(
        session.dispatch(&Event::key(Key::Char(' '), 30)),
        SessionState::GuiSelection
    );
    assert_eq!(session.finish(SessionState::GuiSelection), Some(a));
}

#[test]
fn deferred_submenu_opens_for_its_own_generation_only() {
    let mut tree = MenuTree::new();
    let (root, recent, sub) = file_menu(&mut tree);
    let mut host = FakeHost::new();
    host.later.push(sub);
    let mut session = MenuSession::new(&mut tree, root, &mut host, SessionConfig::default());
    assert!(session.begin(&at(700.0, 400.0), 0));

    session.dispatch(&Event::key(Key::Down, 10));
    session.dispatch(&Event::key(Key::Return, 20));
    let generation = session.open_generation();
    assert_eq!(session.pending_open(), Some((generation, true)));
    assert_eq!(session.windows().len(), 1);
    assert_eq!(session.host().busy, vec![(recent, true)]);
    assert_eq!(session.host().readiness_requests, vec![(sub, generation)]);

    let stale = ApplicationEvent::DeferredMenuUpdateReady {
        generation: generation - 1,
    };
    session.dispatch(&Event::application(stale, 30));
    assert_eq!(session.windows().len(), 1);

    let ready = ApplicationEvent::DeferredMenuUpdateReady { generation };
    session.dispatch(&Event::application(ready, 40));
    assert_eq!(session.windows().len(), 2);
    assert_eq!(session.pending_open(), None);
    assert_eq!(session.host().busy, vec![(recent, true), (recent, false)]);
}

#[test]
fn superseded_deferred_open_is_dropped() {
    let mut tree = MenuTree::new();
    let (root, recent, sub) = file_menu(&mut tree);
    let mut host = FakeHost::new();
    host.later.push(sub);
    let mut session = MenuSession::new(&mut tree, root, &mut host, SessionConfig::default());
    assert!(session.begin(&at(700.0, 400.0), 0));

    session.dispatch(&Event::key(Key::Down, 10));
    session.dispatch(&Event::key(Key::Return, 20));
    let generation = session.open_generation();

    // Moving on clears the busy indicator and forgets the request.
    session.dispatch(&Event::key(Key::Down, 30));
    assert_eq!(session.pending_open(), None);
    assert_eq!(session.host().busy, vec![(recent, true), (recent, false)]);

    let ready = ApplicationEvent::DeferredMenuUpdateReady { generation };
    session.dispatch(&Event::application(ready, 40));
    assert_eq!(session.windows().len(), 1);
}

#[test]
fn only_the_latest_of_two_deferred_opens_completes() {
    let mut tree = MenuTree::new();
    let root = tree.new_menu("Go");
    let one = tree.add_item(root, "One").unwrap();
    let two = tree.add_item(root, "Two").unwrap();
    let first = tree.new_menu("First");
    tree.add_item(first, "x").unwrap();
    let second = tree.new_menu("Second");
    tree.add_item(second, "y").unwrap();
    tree.set_submenu(one, first).unwrap();
    tree.set_submenu(two, second).unwrap();
    let mut host = FakeHost::new();
    host.later.extend([first, second]);
    let mut session = MenuSession::new(&mut tree, root, &mut host, SessionConfig::default());
    assert!(session.begin(&at(700.0, 400.0), 0));

    session.dispatch(&Event::key(Key::Down, 10));
    session.dispatch(&Event::key(Key::Return, 20));
    let earlier = session.open_generation();
    session.dispatch(&Event::key(Key::Down, 30));
    session.dispatch(&Event::key(Key::Return, 40));
    let later = session.open_generation();
    assert!(later > earlier);
    assert_eq!(
        session.host().readiness_requests,
        vec![(first, earlier), (second, later)]
    );
    assert_eq!(session.pending_open(), Some((later, true)));

    // The superseded completion arrives while the newer open is still waiting.
    let stale = ApplicationEvent::DeferredMenuUpdateReady { generation: earlier };
    session.dispatch(&Event::application(stale, 50));
    assert_eq!(session.windows().len(), 1);
    assert_eq!(session.pending_open(), Some((later, true)));

    let ready = ApplicationEvent::DeferredMenuUpdateReady { generation: later };
    session.dispatch(&Event::application(ready, 60));
    assert_eq!(session.windows().len(), 2);
    assert_eq!(session.windows()[1].menu(), second);
    assert_eq!(
        session.host().busy,
        vec![(one, true), (one, false), (two, true), (two, false)]
    );
}

#[test]
fn touching_windows_square_their_shared_corners() {
    let mut tree = MenuTree::new();
    let (root, _, _) = file_menu(&mut tree);
    let mut host = FakeHost::new();
    let mut session = MenuSession::new(&mut tree, root, &mut host, SessionConfig::default());
    assert!(session.begin(&at(700.0, 400.0), 0));
    assert_eq!(session.windows()[0].corners(), Corners::all());

    session.dispatch(&Event::key(Key::Down, 10));
    session.dispatch(&Event::key(Key::Right, 20));
    assert_eq!(session.windows()[0].frame(), Rect::new(700.0, 396.0, 800.0, 464.0));
    assert_eq!(session.windows()[1].frame(), Rect::new(800.0, 396.0, 900.0, 444.0));
    assert_eq!(session.windows()[0].corners(), Corners::all() - Corners::TOP_RIGHT);
    assert_eq!(
        session.windows()[1].corners(),
        Corners::TOP_RIGHT | Corners::BOTTOM_RIGHT
    );
    assert!(session.corner_mask(1).is_some());

    session.dispatch(&Event::key(Key::Left, 30));
    assert_eq!(session.windows()[0].corners(), Corners::all());
}

#[test]
fn hover_opens_submenu_after_delay_and_tracks_intent() {
    let mut tree = MenuTree::new();
    let (root, recent, sub) = file_menu(&mut tree);
    let mut host = FakeHost::new();
    let mut session = MenuSession::new(&mut tree, root, &mut host, SessionConfig::default());
    assert!(session.begin(&at(700.0, 400.0), 0));

    session.dispatch(&Event::mouse_moved(Point::new(750.0, 410.0), 600));
    assert_eq!(highlighted(session.tree(), root), Some(recent));
    assert_eq!(session.windows().len(), 1);
    assert_eq!(session.pending_open().map(|(_, waiting)| waiting), Some(false));

    // Hovering the same row again does not restart the delay.
    session.dispatch(&Event::mouse_moved(Point::new(760.0, 410.0), 650));
    assert_eq!(session.fire_due_timers(700), SessionState::Continue);
    assert_eq!(session.windows().len(), 2);
    assert!(session.intent().is_some());

    // Crossing "Save" on the way to the submenu keeps it open.
    session.dispatch(&Event::mouse_moved(Point::new(790.0, 425.0), 720));
    assert_eq!(session.windows().len(), 2);
    assert_eq!(highlighted(session.tree(), root), Some(recent));

    // Reaching the submenu ends the tracking.
    session.dispatch(&Event::mouse_moved(Point::new(850.0, 410.0), 740));
    assert!(session.intent().is_none());
    assert_eq!(session.key_window(), 1);
    assert_eq!(highlighted(session.tree(), sub), tree_first(session.tree(), sub));
    assert_eq!(highlighted(session.tree(), root), Some(recent));
}

#[test]
fn leaving_the_menu_drops_the_hover_open() {
    let mut tree = MenuTree::new();
    let (root, recent, _) = file_menu(&mut tree);
    let mut host = FakeHost::new();
    let mut session = MenuSession::new(&mut tree, root, &mut host, SessionConfig::default());
    assert!(session.begin(&at(700.0, 400.0), 0));

    session.dispatch(&Event::mouse_moved(Point::new(750.0, 410.0), 600));
    assert_eq!(highlighted(session.tree(), root), Some(recent));
    session.dispatch(&Event::mouse_moved(Point::new(300.0, 100.0), 650));
    assert_eq!(session.pending_open(), None);

    session.fire_due_timers(700);
    assert_eq!(session.windows().len(), 1);
    assert_eq!(highlighted(session.tree(), root), None);
}

fn tree_first(tree: &MenuTree, menu: MenuId) -> Option<ItemId> {
    tree.first_selectable(menu, ModifierFlags::empty())
}

#[test]
fn turning_away_closes_the_submenu() {
    let mut tree = MenuTree::new();
    let (root, _, _) = file_menu(&mut tree);
    let mut host = FakeHost::new();
    let mut session = MenuSession::new(&mut tree, root, &mut host, SessionConfig::default());
    assert!(session.begin(&at(700.0, 400.0), 0));

    session.dispatch(&Event::mouse_moved(Point::new(750.0, 410.0), 600));
    session.fire_due_timers(700);
    assert_eq!(session.windows().len(), 2);

    session.dispatch(&Event::mouse_moved(Point::new(710.0, 455.0), 2000));
    assert_eq!(session.windows().len(), 1);
    assert!(session.intent().is_none());
    let quit = session.tree().menu(root).map(|menu| menu.items()[2]);
    assert_eq!(highlighted(session.tree(), root), quit);
}

#[test]
fn escape_and_resign_end_the_session() {
    let mut tree = MenuTree::new();
    let root = numbered_menu(&mut tree, 3);
    let mut host = FakeHost::new();
    let mut session = MenuSession::new(&mut tree, root, &mut host, SessionConfig::default());
    assert!(session.begin(&at(700.0, 400.0), 0));
    assert_eq!(session.dispatch(&Event::key(Key::Escape, 10)), SessionState::Cancel);
    assert_eq!(
        session.dispatch(&Event::application(ApplicationEvent::DidResignActive, 20)),
        SessionState::Interrupt
    );
    assert_eq!(session.finish(SessionState::Interrupt), None);
    assert!(session.windows().is_empty());
    assert!(
        session
            .host()
            .notifications
            .contains(&Notification::WillEndTracking { menu: root, root })
    );
}

#[test]
fn idle_session_times_out() {
    let mut tree = MenuTree::new();
    let root = numbered_menu(&mut tree, 3);
    let mut host = FakeHost::new();
    let config = SessionConfig {
        event_timeout_ms: 1000,
        ..SessionConfig::default()
    };
    let mut events = ScriptedEvents::new();
    let mut session = MenuSession::new(&mut tree, root, &mut host, config);

    assert_eq!(session.run(&mut events, &at(700.0, 400.0)), None);
    assert!(session.windows().is_empty());
    assert_eq!(
        session.host().notifications.last(),
        Some(&Notification::DidEndSession { root })
    );
    assert!(events.now() >= 1000);
}

#[test]
fn early_mouse_up_is_ignored() {
    let mut tree = MenuTree::new();
    let root = numbered_menu(&mut tree, 3);
    let mut host = FakeHost::new();
    let mut session = MenuSession::new(&mut tree, root, &mut host, SessionConfig::default());
    assert!(session.begin(&at(700.0, 400.0), 0));

    let up = |timestamp| Event::new(EventKind::LeftMouseUp, timestamp).at(Point::new(750.0, 410.0));
    assert_eq!(session.dispatch(&up(100)), SessionState::Continue);
    assert_eq!(session.dispatch(&up(600)), SessionState::GuiSelection);
    let first = session.tree().menu(root).map(|menu| menu.items()[0]);
    assert_eq!(session.finish(SessionState::GuiSelection), first);
}

#[test]
fn mouse_up_outside_every_window_cancels() {
    let mut tree = MenuTree::new();
    let root = numbered_menu(&mut tree, 3);
    let mut host = FakeHost::new();
    let mut session = MenuSession::new(&mut tree, root, &mut host, SessionConfig::default());
    assert!(session.begin(&at(700.0, 400.0), 0));
    let up = Event::new(EventKind::LeftMouseUp, 600).at(Point::new(10.0, 10.0));
    assert_eq!(session.dispatch(&up), SessionState::Cancel);
}

#[test]
fn system_events_pass_through_or_are_ignored() {
    let mut tree = MenuTree::new();
    let root = numbered_menu(&mut tree, 3);
    let mut host = FakeHost::new();
    let mut session = MenuSession::new(&mut tree, root, &mut host, SessionConfig::default());
    assert!(session.begin(&at(700.0, 400.0), 0));

    let mission = EventKind::System(SystemEvent::MissionControl);
    let zoom = EventKind::System(SystemEvent::ScreenZoom);
    assert_eq!(session.dispatch(&Event::new(mission, 10)), SessionState::Continue);
    assert_eq!(session.dispatch(&Event::new(zoom, 20)), SessionState::Continue);
    assert_eq!(session.host().reposted, vec![mission]);

    let right = Event::new(EventKind::RightMouseDown, 30).at(Point::new(10.0, 10.0));
    assert_eq!(session.dispatch(&right), SessionState::Cancel);
    assert_eq!(session.host().reposted, vec![mission, EventKind::RightMouseDown]);
}

#[test]
fn top_clipped_menu_resizes_then_bounces() {
    let mut tree = MenuTree::new();
    let root = numbered_menu(&mut tree, 20);
    let mut host = FakeHost::new();
    let mut session = MenuSession::new(&mut tree, root, &mut host, SessionConfig::default());
    // Content y = 300 lands at screen y = 104, pushing the top 200 points off screen.
    let request = ShowRequest::at_location(Point::new(0.0, 300.0), Point::new(100.0, 104.0));
    assert!(session.begin(&request, 0));

    let window = &session.windows()[0];
    assert_eq!(window.frame(), Rect::new(100.0, 4.0, 200.0, 208.0));
    assert_eq!(window.bounds().y0, 204.0);
    assert_eq!(window.scroll().clip_mode(), ClipMode::Top);

    let wheel = |delta, timestamp| Event::new(EventKind::ScrollWheel { delta }, timestamp).at(Point::new(150.0, 100.0));

    session.dispatch(&wheel(20.0, 10));
    let window = &session.windows()[0];
    assert_eq!(window.scroll().action(), ScrollAction::ResizeUp);
    assert_eq!(window.bounds().y0, 184.0);
    assert_eq!(window.bounds().y1, 400.0);
    assert_eq!(window.frame(), Rect::new(100.0, 4.0, 200.0, 228.0));

    session.dispatch(&wheel(-10.0, 20));
    let window = &session.windows()[0];
    assert_eq!(window.scroll().action(), ScrollAction::BottomBounce);
    assert_eq!(window.bounds().y0, 189.0);

    session.dispatch(&wheel(0.0, 30));
    assert_eq!(session.windows()[0].bounds().y0, 184.0);
    assert!(
        session
            .host()
            .notifications
            .iter()
            .any(|note| matches!(note, Notification::ScrollBoundsChanged { menu, .. } if *menu == root))
    );
}

#[test]
fn bottom_clipped_menu_at_full_height_pans() {
    let mut tree = MenuTree::new();
    let root = numbered_menu(&mut tree, 60);
    let mut host = FakeHost::new();
    let mut session = MenuSession::new(&mut tree, root, &mut host, SessionConfig::default());
    assert!(session.begin(&at(100.0, 700.0), 0));

    let window = &session.windows()[0];
    assert_eq!(window.frame(), Rect::new(100.0, 4.0, 200.0, 896.0));
    assert_eq!(window.bounds(), Rect::new(0.0, 0.0, 100.0, 884.0));
    assert_eq!(window.scroll().clip_mode(), ClipMode::Bottom);

    let wheel = |delta, timestamp| Event::new(EventKind::ScrollWheel { delta }, timestamp).at(Point::new(150.0, 300.0));

    session.dispatch(&wheel(-30.0, 10));
    let window = &session.windows()[0];
    assert_eq!(window.scroll().action(), ScrollAction::Scrolling);
    assert_eq!(window.bounds().y0, 30.0);
    assert_eq!(window.frame().height(), 892.0);

    session.dispatch(&wheel(40.0, 20));
    let window = &session.windows()[0];
    assert_eq!(window.scroll().action(), ScrollAction::TopBounce);
    assert_eq!(window.bounds().y0, -5.0);
}

#[test]
fn scroll_arrow_hover_auto_scrolls_until_the_end() {
    let mut tree = MenuTree::new();
    let root = numbered_menu(&mut tree, 60);
    let mut host = FakeHost::new();
    let mut session = MenuSession::new(&mut tree, root, &mut host, SessionConfig::default());
    assert!(session.begin(&at(100.0, 700.0), 0));

    session.dispatch(&Event::mouse_moved(Point::new(150.0, 890.0), 10));
    assert!(session.is_auto_scrolling());

    let mut now = 10;
    while session.is_auto_scrolling() && now < 60_000 {
        now += 50;
        session.fire_due_timers(now);
    }
    let window = &session.windows()[0];
    assert!(!session.is_auto_scrolling());
    assert_eq!(window.bounds().y1, 1200.0);
}

#[test]
fn option_swaps_in_alternate_and_action_runs_last() {
    let mut tree = MenuTree::new();
    let root = tree.new_menu("File");
    let close = tree.add_item(root, "Close").unwrap();
    tree.add_item(root, "Quit").unwrap();
    let close_all = tree.new_detached_item("Close All");
    tree.add_alternate(close, close_all, ModifierFlags::OPTION).unwrap();

    let log = Rc::new(RefCell::new(Vec::new()));
    let action_log = log.clone();
    tree.set_action(close_all, move |_| action_log.borrow_mut().push("action"))
        .unwrap();

    let mut host = FakeHost::new();
    host.log = log.clone();
    let mut events = ScriptedEvents::new();
    let row = Point::new(750.0, 410.0);
    events
        .push(Event::new(EventKind::FlagsChanged, 600).with_modifiers(ModifierFlags::OPTION))
        .push(Event::new(EventKind::LeftMouseDown, 650).at(row))
        .push(Event::new(EventKind::LeftMouseUp, 700).at(row));

    let mut session = MenuSession::new(&mut tree, root, &mut host, SessionConfig::default());
    assert_eq!(session.run(&mut events, &at(700.0, 400.0)), Some(close_all));
    assert_eq!(*log.borrow(), vec!["select", "end", "action"]);
    assert!(
        session
            .host()
            .notifications
            .contains(&Notification::DidSelectItem { menu: root, item: close_all })
    );
}

#[test]
fn accessible_selection_ends_the_session() {
    let mut tree = MenuTree::new();
    let (root, _, sub) = file_menu(&mut tree);
    let b = tree.menu(sub).map(|menu| menu.items()[1]).unwrap();
    let mut host = FakeHost::new();
    let mut session = MenuSession::new(&mut tree, root, &mut host, SessionConfig::default());
    assert!(session.begin(&at(700.0, 400.0), 0));

    let event = Event::application(ApplicationEvent::AccessibleItemSelection(b), 10);
    assert_eq!(session.dispatch(&event), SessionState::AccessibleSelection);
    assert_eq!(session.finish(SessionState::AccessibleSelection), Some(b));
    assert!(
        session
            .host()
            .notifications
            .contains(&Notification::DidSelectItem { menu: sub, item: b })
    );
}
