//! Virtual thumbstick in the bottom-right corner of the field

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::bounds::{Bounds, Viewport};
use crate::clamp;

const MARGIN: f64 = 14.0;
const DEADZONE: f64 = 0.22;
/// Response curve exponent past the deadzone
const SENSITIVITY: f64 = 1.35;
/// Touches this far out (in base radii) still grab the stick
const CAPTURE_SCALE: f64 = 1.25;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Joystick {
    pub center: DVec2,
    pub radius: f64,
}

impl Joystick {
    /// Size the stick to the canvas and tuck it into the field's corner
    pub fn for_viewport(viewport: &Viewport, bounds: &Bounds) -> Self {
        let radius = clamp((viewport.width * 0.12).round(), 40.0, 56.0);
        let center = DVec2::new(
            bounds.right - radius - MARGIN,
            bounds.bottom - radius - MARGIN,
        );
        Self { center, radius }
    }

    /// Whether a press at `p` grabs the stick
    pub fn captures(&self, p: DVec2) -> bool {
        p.distance(self.center) <= self.radius * CAPTURE_SCALE
    }

    /// Knob position for a drag to `p` (limited to the base ring)
    pub fn knob(&self, p: DVec2) -> DVec2 {
        let d = p - self.center;
        let len = d.length();
        if len > self.radius {
            self.center + d / len * self.radius
        } else {
            p
        }
    }

    /// Unit-bounded movement direction for a drag to `p`
    pub fn deflection(&self, p: DVec2) -> DVec2 {
        let d = p - self.center;
        let len = d.length();
        if len <= 0.0 || self.radius <= 0.0 {
            return DVec2::ZERO;
        }
        let mag = (len / self.radius).min(1.0);
        if mag < DEADZONE {
            return DVec2::ZERO;
        }
        let scaled = ((mag - DEADZONE) / (1.0 - DEADZONE)).powf(SENSITIVITY);
        d / len * scaled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stick() -> Joystick {
        let v = Viewport::new(360.0, 640.0);
        Joystick::for_viewport(&v, &v.bounds())
    }

    #[test]
    fn test_layout() {
        let j = stick();
        assert_eq!(j.radius, 43.0);
        assert_eq!(j.center, DVec2::new(338.0 - 43.0 - 14.0, 612.0 - 43.0 - 14.0));
    }

    #[test]
    fn test_radius_clamped() {
        let v = Viewport::new(480.0, 940.0);
        assert_eq!(Joystick::for_viewport(&v, &v.bounds()).radius, 56.0);
    }

    #[test]
    fn test_deadzone() {
        let j = stick();
        assert_eq!(j.deflection(j.center), DVec2::ZERO);
        assert_eq!(j.deflection(j.center + DVec2::new(j.radius * 0.2, 0.0)), DVec2::ZERO);
    }

    #[test]
    fn test_full_deflection_is_unit() {
        let j = stick();
        let d = j.deflection(j.center + DVec2::new(0.0, -3.0 * j.radius));
        assert!((d - DVec2::new(0.0, -1.0)).length() < 1e-9);
    }

    #[test]
    fn test_partial_deflection_is_curved() {
        let j = stick();
        let d = j.deflection(j.center + DVec2::new(j.radius * 0.61, 0.0));
        assert!(d.x > 0.0 && d.x < 0.5);
        assert_eq!(d.y, 0.0);
    }

    #[test]
    fn test_capture_and_knob() {
        let j = stick();
        assert!(j.captures(j.center + DVec2::new(j.radius * 1.2, 0.0)));
        assert!(!j.captures(j.center + DVec2::new(j.radius * 1.3, 0.0)));
        let knob = j.knob(j.center + DVec2::new(j.radius * 2.0, 0.0));
        assert!((knob.distance(j.center) - j.radius).abs() < 1e-9);
    }
}
