// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Session configuration.

use understory_menu_geometry::{GeometryConfig, LayoutDirection};

/// Where filter passes run.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum FilterMode {
    /// Score on the session thread (fanning out to scoped workers) before continuing.
    #[default]
    Synchronous,
    /// Score on a background thread; results are applied when they arrive and only if
    /// no newer keystroke superseded them.
    Background,
}

/// Timing and metric constants of a menu session.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SessionConfig {
    /// Window geometry constants.
    pub geometry: GeometryConfig,
    /// Delay before a hovered item's submenu opens (ms).
    pub submenu_delay_ms: u64,
    /// Auto-scroll timer period (ms).
    pub auto_scroll_period_ms: u64,
    /// Distance scrolled per auto-scroll tick before acceleration (points).
    pub auto_scroll_step: f64,
    /// Period of the cursor reconciliation tick (ms).
    pub periodic_ms: u64,
    /// Height of the scroll-arrow hot zones (points).
    pub scroll_arrow_height: f64,
    /// Corner radius of menu windows (points).
    pub corner_radius: f64,
    /// Mouse-ups within this long after the session starts are ignored (ms).
    pub double_click_ms: u64,
    /// A session with no input for this long is cancelled (ms).
    pub event_timeout_ms: u64,
    /// Leading/trailing mapping for submenu placement.
    pub layout_direction: LayoutDirection,
    /// Where filter passes run.
    pub filter_mode: FilterMode,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            geometry: GeometryConfig::default(),
            submenu_delay_ms: 100,
            auto_scroll_period_ms: 50,
            auto_scroll_step: 8.0,
            periodic_ms: 50,
            scroll_arrow_height: 19.0,
            corner_radius: 6.0,
            double_click_ms: 500,
            event_timeout_ms: if cfg!(debug_assertions) { 3_600_000 } else { 60_000 },
            layout_direction: LayoutDirection::LeftToRight,
            filter_mode: FilterMode::Synchronous,
        }
    }
}
