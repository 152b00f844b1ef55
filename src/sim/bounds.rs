//! Playable area geometry
//!
//! The canvas is a portrait strip; the playable rectangle is the canvas minus
//! padding for the HUD card on top and the ad boards on the sides/bottom.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::clamp;
use crate::consts::{PLAYER_SLOT, REFERENCE_WIDTH};
use crate::tuning::Tuning;

/// Canvas dimensions after fitting the browser window
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub const MIN_WIDTH: f64 = 320.0;
    pub const MAX_WIDTH: f64 = 480.0;
    pub const MIN_HEIGHT: f64 = 560.0;
    pub const MAX_HEIGHT: f64 = 940.0;

    /// Use these exact dimensions (tests, headless runs)
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Fit the browser's inner size into the supported portrait range
    pub fn fit(inner_width: f64, inner_height: f64) -> Self {
        Self {
            width: clamp(inner_width, Self::MIN_WIDTH, Self::MAX_WIDTH),
            height: clamp(inner_height, Self::MIN_HEIGHT, Self::MAX_HEIGHT),
        }
    }

    /// Playable rectangle: padding scales with width relative to 360px
    pub fn bounds(&self) -> Bounds {
        let scale = self.width / REFERENCE_WIDTH;
        let pad_lr = (22.0 * scale).round();
        let pad_top = (36.0 * scale).round();
        let pad_bottom = (28.0 * scale).round();
        Bounds {
            left: pad_lr,
            right: self.width - pad_lr,
            top: pad_top,
            bottom: self.height - pad_bottom,
        }
    }
}

/// Which edge clearance an entity gets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarginClass {
    /// Formation NPCs
    Npc,
    /// The player's slot and the player avatar
    Zone,
}

impl MarginClass {
    /// Margin class of a formation index
    #[inline]
    pub fn for_slot(index: usize) -> Self {
        if index == PLAYER_SLOT {
            MarginClass::Zone
        } else {
            MarginClass::Npc
        }
    }

    #[inline]
    pub fn margin(self, tuning: &Tuning) -> f64 {
        match self {
            MarginClass::Npc => tuning.npc_radius,
            MarginClass::Zone => tuning.zone_radius,
        }
    }
}

/// Playable rectangle in canvas pixels (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
}

impl Bounds {
    #[inline]
    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    #[inline]
    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }

    #[inline]
    pub fn center(&self) -> DVec2 {
        DVec2::new((self.left + self.right) / 2.0, (self.top + self.bottom) / 2.0)
    }

    #[inline]
    pub fn min_side(&self) -> f64 {
        self.width().min(self.height())
    }

    /// Pull a point inside the rectangle shrunk by `margin`
    #[inline]
    pub fn clamp_point(&self, p: DVec2, margin: f64) -> DVec2 {
        DVec2::new(
            clamp(p.x, self.left + margin, self.right - margin),
            clamp(p.y, self.top + margin, self.bottom - margin),
        )
    }

    /// Whether a point is inside the rectangle shrunk by `margin` (with a tiny tolerance)
    #[inline]
    pub fn contains(&self, p: DVec2, margin: f64) -> bool {
        const EPS: f64 = 1e-9;
        p.x >= self.left + margin - EPS
            && p.x <= self.right - margin + EPS
            && p.y >= self.top + margin - EPS
            && p.y <= self.bottom - margin + EPS
    }

    /// Clamp a formation slot with its own margin class
    #[inline]
    pub fn clamp_slot(&self, index: usize, p: DVec2, tuning: &Tuning) -> DVec2 {
        self.clamp_point(p, MarginClass::for_slot(index).margin(tuning))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_viewport_bounds() {
        let b = Viewport::new(360.0, 640.0).bounds();
        assert_eq!(b.left, 22.0);
        assert_eq!(b.right, 338.0);
        assert_eq!(b.top, 36.0);
        assert_eq!(b.bottom, 612.0);
        assert_eq!(b.min_side(), 316.0);
    }

    #[test]
    fn test_fit_clamps_window() {
        let v = Viewport::fit(1920.0, 300.0);
        assert_eq!(v.width, Viewport::MAX_WIDTH);
        assert_eq!(v.height, Viewport::MIN_HEIGHT);
    }

    #[test]
    fn test_clamp_point_respects_margin_class() {
        let tuning = Tuning::default();
        let b = Viewport::new(360.0, 640.0).bounds();
        let outside = DVec2::new(-50.0, 1000.0);

        let npc = b.clamp_slot(0, outside, &tuning);
        assert_eq!(npc, DVec2::new(22.0 + 12.0, 612.0 - 12.0));

        let slot = b.clamp_slot(PLAYER_SLOT, outside, &tuning);
        assert_eq!(slot, DVec2::new(22.0 + 22.0, 612.0 - 22.0));
        assert!(b.contains(slot, tuning.zone_radius));
    }
}
