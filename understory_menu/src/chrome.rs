// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Window chrome masks for rounded corners.

use hashbrown::HashMap;
use kurbo::{BezPath, Rect, RoundedRect, RoundedRectRadii, Shape};
use understory_menu_geometry::Corners;

/// Masks keyed by corner configuration, built on first use.
///
/// Entries are never invalidated; the radius is fixed per cache.
#[derive(Clone, Debug)]
pub struct CornerMaskCache<T> {
    radius: f64,
    masks: HashMap<Corners, T>,
}

impl<T> CornerMaskCache<T> {
    /// An empty cache for masks of the given corner radius.
    pub fn new(radius: f64) -> Self {
        Self {
            radius,
            masks: HashMap::new(),
        }
    }

    /// Corner radius of the cached masks.
    pub const fn radius(&self) -> f64 {
        self.radius
    }

    /// Mask for `corners`, building it with `make` if it is not cached yet.
    pub fn get_or_insert_with(&mut self, corners: Corners, make: impl FnOnce(Corners, f64) -> T) -> &T {
        let radius = self.radius;
        self.masks
            .entry(corners)
            .or_insert_with(|| make(corners, radius))
    }

    /// Number of cached masks.
    pub fn len(&self) -> usize {
        self.masks.len()
    }

    /// Whether nothing has been cached.
    pub fn is_empty(&self) -> bool {
        self.masks.is_empty()
    }
}

/// A stretchable mask: a `2r + 1` square whose `corners` are rounded with radius `r`.
///
/// The middle row and column can be stretched to any window size.
pub fn corner_mask_path(corners: Corners, radius: f64) -> BezPath {
    let side = radius * 2.0 + 1.0;
    let r = |corner| if corners.contains(corner) { radius } else { 0.0 };
    let radii = RoundedRectRadii::new(
        r(Corners::TOP_LEFT),
        r(Corners::TOP_RIGHT),
        r(Corners::BOTTOM_RIGHT),
        r(Corners::BOTTOM_LEFT),
    );
    RoundedRect::from_rect(Rect::new(0.0, 0.0, side, side), radii).to_path(0.1)
}
