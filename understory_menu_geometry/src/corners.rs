// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Rounded-corner assignment for a stack of adjoining menu windows.

use alloc::vec::Vec;

use kurbo::Rect;

/// Frames closer than this are treated as touching.
const ADJACENCY_EPSILON: f64 = 0.5;

bitflags::bitflags! {
    /// Set of window corners.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct Corners: u8 {
        /// Corner at the smallest `x` and smallest `y`.
        const TOP_LEFT     = 0b0001;
        /// Corner at the largest `x` and smallest `y`.
        const TOP_RIGHT    = 0b0010;
        /// Corner at the smallest `x` and largest `y`.
        const BOTTOM_LEFT  = 0b0100;
        /// Corner at the largest `x` and largest `y`.
        const BOTTOM_RIGHT = 0b1000;
    }
}

impl Default for Corners {
    fn default() -> Self {
        Self::all()
    }
}

/// Compute which corners of each frame stay rounded.
///
/// A corner is squared off when another frame touches the same vertical edge
/// and overlaps the `radius`-tall band next to that corner. A single frame keeps
/// all four corners.
///
/// The result is parallel to `frames`.
#[must_use]
pub fn rounded_corners(frames: &[Rect], radius: f64) -> Vec<Corners> {
    frames
        .iter()
        .enumerate()
        .map(|(i, frame)| {
            let mut corners = Corners::all();
            for (j, other) in frames.iter().enumerate() {
                if i == j {
                    continue;
                }
                let touches_left = (frame.x0 - other.x1).abs() <= ADJACENCY_EPSILON;
                let touches_right = (frame.x1 - other.x0).abs() <= ADJACENCY_EPSILON;
                if !touches_left && !touches_right {
                    continue;
                }
                let covers_top = other.y0 < frame.y0 + radius && other.y1 > frame.y0;
                let covers_bottom = other.y0 < frame.y1 && other.y1 > frame.y1 - radius;
                if touches_left {
                    if covers_top {
                        corners.remove(Corners::TOP_LEFT);
                    }
                    if covers_bottom {
                        corners.remove(Corners::BOTTOM_LEFT);
                    }
                }
                if touches_right {
                    if covers_top {
                        corners.remove(Corners::TOP_RIGHT);
                    }
                    if covers_bottom {
                        corners.remove(Corners::BOTTOM_RIGHT);
                    }
                }
            }
            corners
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn single_window_is_fully_rounded() {
        let corners = rounded_corners(&[Rect::new(0.0, 0.0, 100.0, 200.0)], 6.0);
        assert_eq!(corners, vec![Corners::all()]);
    }

    #[test]
    fn submenu_aligned_with_parent_top_squares_inner_top_corners() {
        let parent = Rect::new(0.0, 0.0, 100.0, 200.0);
        // Starts at the parent's top and runs past its bottom.
        let child = Rect::new(100.0, 0.0, 220.0, 300.0);
        let corners = rounded_corners(&[parent, child], 6.0);
        assert_eq!(
            corners[0],
            Corners::TOP_LEFT | Corners::BOTTOM_LEFT,
            "parent keeps its left corners only"
        );
        assert_eq!(
            corners[1],
            Corners::TOP_RIGHT | Corners::BOTTOM_RIGHT | Corners::BOTTOM_LEFT,
            "child's bottom-left corner hangs below the parent"
        );
    }

    #[test]
    fn submenu_in_the_middle_keeps_parent_corners() {
        let parent = Rect::new(0.0, 0.0, 100.0, 300.0);
        let child = Rect::new(100.0, 100.0, 200.0, 150.0);
        let corners = rounded_corners(&[parent, child], 6.0);
        assert_eq!(corners[0], Corners::all());
        assert_eq!(corners[1], Corners::TOP_RIGHT | Corners::BOTTOM_RIGHT);
    }

    #[test]
    fn three_level_cascade() {
        let a = Rect::new(0.0, 0.0, 100.0, 100.0);
        let b = Rect::new(100.0, 50.0, 200.0, 150.0);
        let c = Rect::new(200.0, 100.0, 300.0, 120.0);
        let corners = rounded_corners(&[a, b, c], 6.0);
        assert_eq!(corners[0], Corners::all() - Corners::BOTTOM_RIGHT);
        assert_eq!(
            corners[1],
            Corners::TOP_RIGHT | Corners::BOTTOM_LEFT | Corners::BOTTOM_RIGHT
        );
        assert_eq!(corners[2], Corners::TOP_RIGHT | Corners::BOTTOM_RIGHT);
    }

    #[test]
    fn separated_windows_do_not_affect_each_other() {
        let a = Rect::new(0.0, 0.0, 100.0, 100.0);
        let b = Rect::new(150.0, 0.0, 250.0, 100.0);
        let corners = rounded_corners(&[a, b], 6.0);
        assert!(corners.iter().all(|c| *c == Corners::all()), "no neighbors");
    }
}
