// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A complete menu session driven by a script of events.
//!
//! This example shows how to:
//! - build a `MenuTree` with a submenu and an Option-key alternate,
//! - implement `MenuHost` for a fake windowing system,
//! - replay hover, typing and clicks through `ScriptedEvents`,
//! - watch the session's decisions through `tracing`.
//!
//! Run:
//! - `cargo run -p understory_menu_demos --example scripted_session`
//! - `RUST_LOG=understory_menu=trace cargo run -p understory_menu_demos --example scripted_session`

use kurbo::{Point, Rect, Size};
use tracing_subscriber::EnvFilter;
use understory_menu::{
    Event, EventKind, ItemId, Key, MenuHost, MenuSession, MenuTree, ModifierFlags, Notification,
    ScriptedEvents, SessionConfig, ShowRequest,
};

/// A single 1440x900 screen and fixed-height rows sized from their titles.
struct DemoHost {
    screens: Vec<Rect>,
}

impl MenuHost for DemoHost {
    fn screens(&self) -> &[Rect] {
        &self.screens
    }

    fn item_size(&self, tree: &MenuTree, item: ItemId) -> Size {
        let title = tree.item(item).map_or("", |item| item.title());
        Size::new(40.0 + 7.0 * title.chars().count() as f64, 22.0)
    }

    fn pointer_location(&self) -> Point {
        Point::new(300.0, 200.0)
    }

    fn notify(&mut self, notification: &Notification) {
        tracing::info!(?notification, "host notified");
    }
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("understory_menu=debug,info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut tree = MenuTree::new();
    let file = tree.new_menu("File");
    let recent = tree.add_item(file, "Open Recent").unwrap();
    tree.add_separator(file).unwrap();
    let close = tree.add_item(file, "Close Window").unwrap();
    let close_all = tree.new_detached_item("Close All");
    tree.add_alternate(close, close_all, ModifierFlags::OPTION).unwrap();
    tree.add_item(file, "Quit").unwrap();

    let documents = tree.new_menu("Recent");
    for name in ["notes.md", "budget.ods", "draft.txt", "talk.key", "todo.md"] {
        let item = tree.add_item(documents, name).unwrap();
        tree.set_action(item, move |_| println!("opening {name}")).unwrap();
    }
    tree.set_submenu(recent, documents).unwrap();

    let mut host = DemoHost {
        screens: vec![Rect::new(0.0, 0.0, 1440.0, 900.0)],
    };

    // The root menu's content starts at (300, 200) and rows are 22pt tall: "Open Recent"
    // spans y = 200..222 and "Close Window" y = 244..266. Hovering "Open Recent" opens
    // the documents submenu beside it; typing then filters the submenu under the pointer.
    let mut events = ScriptedEvents::new();
    events
        .push(Event::mouse_moved(Point::new(320.0, 210.0), 600))
        .push(Event::mouse_moved(Point::new(460.0, 210.0), 760))
        .push(Event::key(Key::Char('m'), 900))
        .push(Event::key(Key::Char('d'), 950))
        .push(Event::key(Key::Down, 1000))
        .push(Event::key(Key::Return, 1100));

    let request = ShowRequest::at_location(Point::ZERO, Point::new(300.0, 200.0));
    let mut session = MenuSession::new(&mut tree, file, &mut host, SessionConfig::default());
    let chosen = session.run(&mut events, &request);
    let title = chosen.and_then(|item| tree.item(item)).map(|item| item.title().to_owned());
    println!("first session chose {title:?}");

    // Holding Option swaps "Close Window" for "Close All".
    let mut events = ScriptedEvents::new();
    let row = Point::new(320.0, 250.0);
    events
        .push(Event::new(EventKind::FlagsChanged, 600).with_modifiers(ModifierFlags::OPTION))
        .push(Event::new(EventKind::LeftMouseDown, 650).at(row))
        .push(Event::new(EventKind::LeftMouseUp, 700).at(row));
    let mut session = MenuSession::new(&mut tree, file, &mut host, SessionConfig::default());
    let chosen = session.run(&mut events, &request);
    println!("second session chose close all: {}", chosen == Some(close_all));
}
