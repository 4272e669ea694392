// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Layout direction policy: maps leading/trailing intent to physical sides.

/// Logical placement of a submenu relative to the area it was opened from.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum Alignment {
    /// Towards the start of a line in the current layout direction.
    Leading,
    /// Towards the end of a line in the current layout direction.
    #[default]
    Trailing,
}

impl Alignment {
    /// The opposite alignment.
    #[must_use]
    pub const fn flipped(self) -> Self {
        match self {
            Self::Leading => Self::Trailing,
            Self::Trailing => Self::Leading,
        }
    }
}

/// Physical horizontal side in screen space.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    /// Smaller `x`.
    Left,
    /// Larger `x`.
    Right,
}

/// Layout direction of the user interface.
///
/// Geometry operations query this once and work in physical sides from then on,
/// so call sites never branch on the direction themselves.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum LayoutDirection {
    /// Leading is left, trailing is right.
    #[default]
    LeftToRight,
    /// Leading is right, trailing is left.
    RightToLeft,
}

impl LayoutDirection {
    /// Physical side that corresponds to `alignment`.
    #[must_use]
    pub const fn side(self, alignment: Alignment) -> Side {
        match (self, alignment) {
            (Self::LeftToRight, Alignment::Trailing) | (Self::RightToLeft, Alignment::Leading) => {
                Side::Right
            }
            (Self::LeftToRight, Alignment::Leading) | (Self::RightToLeft, Alignment::Trailing) => {
                Side::Left
            }
        }
    }

    /// Logical alignment that corresponds to the physical `side`.
    #[must_use]
    pub const fn alignment(self, side: Side) -> Alignment {
        match (self, side) {
            (Self::LeftToRight, Side::Right) | (Self::RightToLeft, Side::Left) => {
                Alignment::Trailing
            }
            (Self::LeftToRight, Side::Left) | (Self::RightToLeft, Side::Right) => {
                Alignment::Leading
            }
        }
    }
}
