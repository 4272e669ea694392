// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Menus, items, and the arena that owns them.

use std::fmt;
use std::ops::Range;
use std::rc::Rc;

use hashbrown::HashMap;
use smallvec::SmallVec;

use crate::error::MenuError;
use crate::filter::ItemScore;

/// Handle to a menu in a [`MenuTree`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MenuId(u32);

impl MenuId {
    #[allow(
        clippy::cast_possible_truncation,
        reason = "Menu handles are 32-bit indices."
    )]
    const fn new(idx: usize) -> Self {
        Self(idx as u32)
    }

    const fn idx(self) -> usize {
        self.0 as usize
    }
}

/// Handle to an item in a [`MenuTree`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(u32);

impl ItemId {
    #[allow(
        clippy::cast_possible_truncation,
        reason = "Item handles are 32-bit indices."
    )]
    const fn new(idx: usize) -> Self {
        Self(idx as u32)
    }

    const fn idx(self) -> usize {
        self.0 as usize
    }
}

bitflags::bitflags! {
    /// Modifier keys held while an item is displayed or chosen.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct ModifierFlags: u8 {
        /// Shift.
        const SHIFT   = 0b0000_0001;
        /// Control.
        const CONTROL = 0b0000_0010;
        /// Option / Alt.
        const OPTION  = 0b0000_0100;
        /// Command / Super.
        const COMMAND = 0b0000_1000;
    }
}

/// What an item is.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum ItemKind {
    /// A selectable entry.
    #[default]
    Regular,
    /// A divider line.
    Separator,
    /// A non-selectable section title.
    Heading,
}

/// Callback run when an item is chosen.
pub type Action = Rc<dyn Fn(ItemId)>;

/// An entry of a [`Menu`], or an alternate hanging off such an entry.
#[derive(Clone)]
pub struct Item {
    title: String,
    kind: ItemKind,
    enabled: bool,
    submenu: Option<MenuId>,
    key_mask: ModifierFlags,
    alternates: HashMap<ModifierFlags, ItemId>,
    action: Option<Action>,
    menu: Option<MenuId>,
    host: Option<ItemId>,
    score: ItemScore,
    ranges: SmallVec<[Range<usize>; 2]>,
    visible: bool,
}

impl fmt::Debug for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Item")
            .field("title", &self.title)
            .field("kind", &self.kind)
            .field("enabled", &self.enabled)
            .field("submenu", &self.submenu)
            .field("key_mask", &self.key_mask)
            .field("alternates", &self.alternates)
            .field("action", &self.action.is_some())
            .field("menu", &self.menu)
            .field("host", &self.host)
            .field("score", &self.score)
            .field("ranges", &self.ranges)
            .field("visible", &self.visible)
            .finish()
    }
}

impl Item {
    fn new(title: String, kind: ItemKind) -> Self {
        Self {
            title,
            kind,
            enabled: true,
            submenu: None,
            key_mask: ModifierFlags::empty(),
            alternates: HashMap::new(),
            action: None,
            menu: None,
            host: None,
            score: ItemScore::FULL,
            ranges: SmallVec::new(),
            visible: true,
        }
    }

    /// Display title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Item kind.
    #[must_use]
    pub const fn kind(&self) -> ItemKind {
        self.kind
    }

    /// Whether the item is a separator.
    #[must_use]
    pub fn is_separator(&self) -> bool {
        self.kind == ItemKind::Separator
    }

    /// Whether the item can be chosen at all.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Submenu opened from this item.
    #[must_use]
    pub const fn submenu(&self) -> Option<MenuId> {
        self.submenu
    }

    /// Modifier mask this item is displayed under.
    #[must_use]
    pub const fn key_mask(&self) -> ModifierFlags {
        self.key_mask
    }

    /// Alternates keyed by their modifier mask.
    #[must_use]
    pub fn alternates(&self) -> &HashMap<ModifierFlags, ItemId> {
        &self.alternates
    }

    /// Menu the item is placed in; `None` for alternates and detached items.
    #[must_use]
    pub const fn menu(&self) -> Option<MenuId> {
        self.menu
    }

    /// Item this one is an alternate of.
    #[must_use]
    pub const fn host(&self) -> Option<ItemId> {
        self.host
    }

    /// Score from the most recent filter pass.
    #[must_use]
    pub const fn score(&self) -> ItemScore {
        self.score
    }

    /// Byte ranges of the title matched by the most recent filter pass.
    #[must_use]
    pub fn highlight_ranges(&self) -> &[Range<usize>] {
        &self.ranges
    }

    /// Whether the current filter leaves the item on screen.
    #[must_use]
    pub const fn is_visible(&self) -> bool {
        self.visible
    }

    /// Whether the item can be highlighted and chosen right now.
    #[must_use]
    pub fn is_selectable(&self) -> bool {
        self.kind == ItemKind::Regular && self.enabled && self.visible
    }

    /// Action callback, if any.
    #[must_use]
    pub fn action(&self) -> Option<&Action> {
        self.action.as_ref()
    }
}

/// An ordered list of items with session-scoped state.
#[derive(Clone, Debug)]
pub struct Menu {
    title: String,
    items: Vec<ItemId>,
    parent: Option<ItemId>,
    highlighted: Option<ItemId>,
    filter: String,
}

impl Menu {
    /// Title of the menu.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Items in display order. Alternates are not listed here.
    #[must_use]
    pub fn items(&self) -> &[ItemId] {
        &self.items
    }

    /// Item this menu is the submenu of.
    #[must_use]
    pub const fn parent(&self) -> Option<ItemId> {
        self.parent
    }

    /// Highlighted host item.
    #[must_use]
    pub const fn highlighted(&self) -> Option<ItemId> {
        self.highlighted
    }

    /// Current filter text.
    #[must_use]
    pub fn filter(&self) -> &str {
        &self.filter
    }
}

/// Owner of every [`Menu`] and [`Item`].
///
/// Menus and items refer to one another through [`MenuId`] and [`ItemId`] handles
/// that index into this tree. Every change that would break the menu model is
/// rejected with a [`MenuError`] and leaves the tree untouched.
#[derive(Clone, Debug, Default)]
pub struct MenuTree {
    menus: Vec<Menu>,
    items: Vec<Item>,
}

impl MenuTree {
    /// Create an empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a menu with no items.
    pub fn new_menu(&mut self, title: impl Into<String>) -> MenuId {
        let id = MenuId::new(self.menus.len());
        self.menus.push(Menu {
            title: title.into(),
            items: Vec::new(),
            parent: None,
            highlighted: None,
            filter: String::new(),
        });
        id
    }

    /// Look up a menu.
    #[must_use]
    pub fn menu(&self, id: MenuId) -> Option<&Menu> {
        self.menus.get(id.idx())
    }

    /// Look up an item.
    #[must_use]
    pub fn item(&self, id: ItemId) -> Option<&Item> {
        self.items.get(id.idx())
    }

    fn item_mut(&mut self, id: ItemId) -> Result<&mut Item, MenuError> {
        self.items.get_mut(id.idx()).ok_or(MenuError::UnknownItem(id))
    }

    fn menu_mut(&mut self, id: MenuId) -> Result<&mut Menu, MenuError> {
        self.menus.get_mut(id.idx()).ok_or(MenuError::UnknownMenu(id))
    }

    fn push_item(&mut self, item: Item) -> ItemId {
        let id = ItemId::new(self.items.len());
        self.items.push(item);
        id
    }

    fn append(&mut self, menu: MenuId, mut item: Item) -> Result<ItemId, MenuError> {
        self.menu(menu).ok_or(MenuError::UnknownMenu(menu))?;
        item.menu = Some(menu);
        let id = self.push_item(item);
        self.menu_mut(menu)?.items.push(id);
        Ok(id)
    }

    /// Append a regular item to `menu`.
    pub fn add_item(&mut self, menu: MenuId, title: impl Into<String>) -> Result<ItemId, MenuError> {
        self.append(menu, Item::new(title.into(), ItemKind::Regular))
    }

    /// Append a separator to `menu`.
    pub fn add_separator(&mut self, menu: MenuId) -> Result<ItemId, MenuError> {
        self.append(menu, Item::new(String::new(), ItemKind::Separator))
    }

    /// Append a section heading to `menu`.
    pub fn add_heading(&mut self, menu: MenuId, title: impl Into<String>) -> Result<ItemId, MenuError> {
        self.append(menu, Item::new(title.into(), ItemKind::Heading))
    }

    /// Create a regular item that is not placed in any menu yet.
    ///
    /// Detached items are meant to become alternates via [`add_alternate`](Self::add_alternate).
    pub fn new_detached_item(&mut self, title: impl Into<String>) -> ItemId {
        self.push_item(Item::new(title.into(), ItemKind::Regular))
    }

    /// Enable or disable an item.
    pub fn set_enabled(&mut self, item: ItemId, enabled: bool) -> Result<(), MenuError> {
        self.item_mut(item)?.enabled = enabled;
        Ok(())
    }

    /// Set the callback run when `item` is chosen.
    pub fn set_action(&mut self, item: ItemId, action: impl Fn(ItemId) + 'static) -> Result<(), MenuError> {
        self.item_mut(item)?.action = Some(Rc::new(action));
        Ok(())
    }

    /// Set the modifier mask `item` is displayed under.
    ///
    /// An alternate's mask is fixed by [`add_alternate`](Self::add_alternate), and a host
    /// cannot take the mask of one of its alternates.
    pub fn set_key_mask(&mut self, item: ItemId, mask: ModifierFlags) -> Result<(), MenuError> {
        let entry = self.item(item).ok_or(MenuError::UnknownItem(item))?;
        if entry.host.is_some() {
            return Err(MenuError::ItemInUse(item));
        }
        if entry.alternates.contains_key(&mask) {
            return Err(MenuError::AlternateMaskMatchesHost(mask));
        }
        self.item_mut(item)?.key_mask = mask;
        Ok(())
    }

    /// Register `alternate` to stand in for `host` while exactly `mask` is held.
    ///
    /// A previous alternate for the same mask is detached again.
    pub fn add_alternate(&mut self, host: ItemId, alternate: ItemId, mask: ModifierFlags) -> Result<(), MenuError> {
        let host_item = self.item(host).ok_or(MenuError::UnknownItem(host))?;
        let alt_item = self.item(alternate).ok_or(MenuError::UnknownItem(alternate))?;
        if host_item.is_separator() {
            return Err(MenuError::SeparatorHost(host));
        }
        if host_item.host.is_some() {
            return Err(MenuError::HostIsAlternate(host));
        }
        if alt_item.is_separator() {
            return Err(MenuError::SeparatorAlternate(alternate));
        }
        if alternate == host || alt_item.menu.is_some() || alt_item.host.is_some() || !alt_item.alternates.is_empty() {
            return Err(MenuError::ItemInUse(alternate));
        }
        if mask == host_item.key_mask {
            return Err(MenuError::AlternateMaskMatchesHost(mask));
        }

        let replaced = self.item_mut(host)?.alternates.insert(mask, alternate);
        if let Some(old) = replaced {
            let old = self.item_mut(old)?;
            old.host = None;
            old.key_mask = ModifierFlags::empty();
        }
        let alt = self.item_mut(alternate)?;
        alt.host = Some(host);
        alt.key_mask = mask;
        Ok(())
    }

    /// Detach the alternate registered for `mask`, returning it.
    pub fn remove_alternate(&mut self, host: ItemId, mask: ModifierFlags) -> Result<Option<ItemId>, MenuError> {
        let removed = self.item_mut(host)?.alternates.remove(&mask);
        if let Some(alternate) = removed {
            let alt = self.item_mut(alternate)?;
            alt.host = None;
            alt.key_mask = ModifierFlags::empty();
        }
        Ok(removed)
    }

    /// Attach `submenu` to `item`.
    pub fn set_submenu(&mut self, item: ItemId, submenu: MenuId) -> Result<(), MenuError> {
        let entry = self.item(item).ok_or(MenuError::UnknownItem(item))?;
        let child = self.menu(submenu).ok_or(MenuError::UnknownMenu(submenu))?;
        if entry.is_separator() {
            return Err(MenuError::SeparatorSubmenu(item));
        }
        if entry.submenu == Some(submenu) {
            return Ok(());
        }
        if self.ancestors(item).any(|menu| menu == submenu) {
            return Err(MenuError::SubmenuCycle(submenu));
        }
        if child.parent.is_some() {
            return Err(MenuError::SubmenuAttached(submenu));
        }

        if let Some(previous) = self.item_mut(item)?.submenu.replace(submenu) {
            self.menu_mut(previous)?.parent = None;
        }
        self.menu_mut(submenu)?.parent = Some(item);
        Ok(())
    }

    /// Menus containing `item`, innermost first, following parent items up to a root.
    fn ancestors(&self, item: ItemId) -> impl Iterator<Item = MenuId> + '_ {
        let start = self.item(item).and_then(|entry| self.owner(entry));
        std::iter::successors(start, move |menu| {
            let parent = self.menu(*menu)?.parent?;
            self.owner(self.item(parent)?)
        })
    }

    fn owner(&self, item: &Item) -> Option<MenuId> {
        match item.host {
            Some(host) => self.item(host)?.menu,
            None => item.menu,
        }
    }

    /// The item shown for `host` while `modifiers` are held.
    ///
    /// This is the alternate registered for exactly `modifiers`, else `host` itself.
    #[must_use]
    pub fn displayed_item(&self, host: ItemId, modifiers: ModifierFlags) -> ItemId {
        self.item(host)
            .filter(|item| item.key_mask != modifiers)
            .and_then(|item| item.alternates.get(&modifiers).copied())
            .unwrap_or(host)
    }

    /// Host items of `menu` whose displayed item is visible, in display order.
    #[must_use]
    pub fn visible_items(&self, menu: MenuId, modifiers: ModifierFlags) -> impl Iterator<Item = ItemId> + '_ {
        self.menu(menu)
            .map(|menu| menu.items.as_slice())
            .unwrap_or_default()
            .iter()
            .copied()
            .filter(move |host| {
                self.item(self.displayed_item(*host, modifiers))
                    .is_some_and(Item::is_visible)
            })
    }

    /// Whether the item displayed for `host` can be highlighted.
    #[must_use]
    pub fn is_selectable(&self, host: ItemId, modifiers: ModifierFlags) -> bool {
        self.item(self.displayed_item(host, modifiers))
            .is_some_and(Item::is_selectable)
    }

    /// First selectable host item of `menu`.
    #[must_use]
    pub fn first_selectable(&self, menu: MenuId, modifiers: ModifierFlags) -> Option<ItemId> {
        self.visible_items(menu, modifiers)
            .find(|host| self.is_selectable(*host, modifiers))
    }

    /// Next selectable host item after (or before) `from`, without wrapping.
    ///
    /// With no `from`, this is the first (or last) selectable item.
    #[must_use]
    pub fn step_selectable(
        &self,
        menu: MenuId,
        from: Option<ItemId>,
        forward: bool,
        modifiers: ModifierFlags,
    ) -> Option<ItemId> {
        let selectable: Vec<ItemId> = self
            .visible_items(menu, modifiers)
            .filter(|host| self.is_selectable(*host, modifiers))
            .collect();
        let position = from.and_then(|from| selectable.iter().position(|id| *id == from));
        match (position, forward) {
            (None, true) => selectable.first().copied(),
            (None, false) => selectable.last().copied(),
            (Some(at), true) => selectable.get(at + 1).or(selectable.get(at)).copied(),
            (Some(at), false) => selectable.get(at.saturating_sub(1)).copied(),
        }
    }

    /// Every item whose filter state belongs to `menu`: hosts in order, each followed by
    /// its alternates.
    #[must_use]
    pub fn filterable_items(&self, menu: MenuId) -> Vec<ItemId> {
        let Some(menu) = self.menu(menu) else {
            return Vec::new();
        };
        let mut out = Vec::with_capacity(menu.items.len());
        for host in &menu.items {
            out.push(*host);
            if let Some(item) = self.item(*host) {
                let mut alternates: Vec<_> = item.alternates.iter().collect();
                alternates.sort_unstable_by_key(|(mask, _)| mask.bits());
                out.extend(alternates.into_iter().map(|(_, id)| *id));
            }
        }
        out
    }

    pub(crate) fn set_highlighted(&mut self, menu: MenuId, item: Option<ItemId>) -> Option<Option<ItemId>> {
        let menu = self.menus.get_mut(menu.idx())?;
        Some(std::mem::replace(&mut menu.highlighted, item))
    }

    pub(crate) fn set_filter_text(&mut self, menu: MenuId, text: &str) -> bool {
        let Some(menu) = self.menus.get_mut(menu.idx()) else {
            return false;
        };
        menu.filter.clear();
        menu.filter.push_str(text);
        true
    }

    pub(crate) fn set_match(&mut self, item: ItemId, score: ItemScore, ranges: SmallVec<[Range<usize>; 2]>) {
        if let Some(item) = self.items.get_mut(item.idx()) {
            item.score = score;
            item.ranges = ranges;
        }
    }

    /// Recompute item visibility in `menu` from the stored scores.
    ///
    /// A zero score hides an item. While `filtering`, separators are hidden and a
    /// heading stays only if an item in its section is visible.
    pub(crate) fn refresh_visibility(&mut self, menu: MenuId, filtering: bool) {
        let Some(menu) = self.menus.get(menu.idx()) else {
            return;
        };
        let hosts = menu.items.clone();
        for host in &hosts {
            let alternates: SmallVec<[ItemId; 4]> = self
                .item(*host)
                .map(|item| item.alternates.values().copied().collect())
                .unwrap_or_default();
            for id in std::iter::once(*host).chain(alternates) {
                if let Some(item) = self.items.get_mut(id.idx()) {
                    item.visible = match item.kind {
                        ItemKind::Regular => !item.score.is_none(),
                        ItemKind::Separator | ItemKind::Heading => !filtering,
                    };
                }
            }
        }
        if !filtering {
            return;
        }

        let mut heading: Option<ItemId> = None;
        for host in hosts {
            let Some(item) = self.item(host) else {
                continue;
            };
            match item.kind {
                ItemKind::Heading => heading = Some(host),
                ItemKind::Separator => heading = None,
                ItemKind::Regular => {
                    let any_visible = item.visible
                        || item
                            .alternates
                            .values()
                            .any(|alt| self.item(*alt).is_some_and(Item::is_visible));
                    if any_visible {
                        if let Some(h) = heading.take() {
                            if let Some(entry) = self.items.get_mut(h.idx()) {
                                entry.visible = true;
                            }
                        }
                    }
                }
            }
        }
    }
}
