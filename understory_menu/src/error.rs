// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Errors reported when configuring a [`MenuTree`](crate::MenuTree).

use thiserror::Error;

use crate::menu::{ItemId, MenuId, ModifierFlags};

/// A rejected change to a [`MenuTree`](crate::MenuTree).
///
/// The tree is left unchanged whenever one of these is returned.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum MenuError {
    /// The menu handle does not belong to this tree.
    #[error("unknown menu {0:?}")]
    UnknownMenu(MenuId),

    /// The item handle does not belong to this tree.
    #[error("unknown item {0:?}")]
    UnknownItem(ItemId),

    /// An alternate must use a different modifier mask than its host.
    #[error("alternate mask {0:?} is the host item's own mask")]
    AlternateMaskMatchesHost(ModifierFlags),

    /// Separators cannot host alternates.
    #[error("separator {0:?} cannot host alternates")]
    SeparatorHost(ItemId),

    /// The would-be host is itself an alternate of another item.
    #[error("item {0:?} is an alternate and cannot host alternates")]
    HostIsAlternate(ItemId),

    /// Separators cannot be alternates.
    #[error("separator {0:?} cannot be an alternate")]
    SeparatorAlternate(ItemId),

    /// The alternate is already placed in a menu or under another host.
    #[error("item {0:?} already belongs to a menu or host")]
    ItemInUse(ItemId),

    /// Separators cannot have submenus.
    #[error("separator {0:?} cannot have a submenu")]
    SeparatorSubmenu(ItemId),

    /// The menu already hangs off another item.
    #[error("menu {0:?} is already a submenu")]
    SubmenuAttached(MenuId),

    /// Attaching the submenu would make a menu its own ancestor.
    #[error("menu {0:?} would contain itself")]
    SubmenuCycle(MenuId),
}
