//! Target shapes for the formation
//!
//! Outline shapes (polygon, star, diamond) are built as closed polylines and
//! then sampled at equal arc-length intervals. Filled shapes (circle, grid,
//! plus, X) are placed directly. Every returned point is already clamped into
//! the playable area.

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI, TAU};

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::bounds::Bounds;

/// Vertices of a regular polygon, closed (first vertex repeated at the end)
pub fn polygon(center: DVec2, sides: u32, radius: f64, rotation: f64) -> Vec<DVec2> {
    let mut verts: Vec<DVec2> = (0..sides)
        .map(|i| {
            let a = rotation + i as f64 * TAU / sides as f64;
            center + DVec2::new(a.cos(), a.sin()) * radius
        })
        .collect();
    if let Some(&first) = verts.first() {
        verts.push(first);
    }
    verts
}

/// Star outline alternating outer/inner radius over `2 * points` vertices, closed
pub fn star(center: DVec2, inner_radius: f64, outer_radius: f64, rotation: f64, points: u32) -> Vec<DVec2> {
    let mut verts: Vec<DVec2> = (0..points * 2)
        .map(|i| {
            let r = if i % 2 == 0 { outer_radius } else { inner_radius };
            let a = rotation + i as f64 * PI / points as f64;
            center + DVec2::new(a.cos(), a.sin()) * r
        })
        .collect();
    if let Some(&first) = verts.first() {
        verts.push(first);
    }
    verts
}

/// Square standing on a corner (top, right, bottom, left), closed
pub fn diamond(center: DVec2, radius: f64) -> Vec<DVec2> {
    vec![
        center + DVec2::new(0.0, -radius),
        center + DVec2::new(radius, 0.0),
        center + DVec2::new(0.0, radius),
        center + DVec2::new(-radius, 0.0),
        center + DVec2::new(0.0, -radius),
    ]
}

/// A polyline with precomputed segment lengths
#[derive(Debug, Clone)]
pub struct Polyline {
    vertices: Vec<DVec2>,
    lengths: Vec<f64>,
    total: f64,
}

impl Polyline {
    pub fn new(vertices: &[DVec2]) -> Self {
        let lengths: Vec<f64> = vertices.windows(2).map(|w| w[0].distance(w[1])).collect();
        let total = lengths.iter().sum();
        Self {
            vertices: vertices.to_vec(),
            lengths,
            total,
        }
    }

    #[inline]
    pub fn total_length(&self) -> f64 {
        self.total
    }

    /// Point at arc-length `distance` from the start. Distances past the end
    /// (floating-point overshoot included) land on the final vertex.
    pub fn point_at(&self, distance: f64) -> DVec2 {
        let Some(&last) = self.vertices.last() else {
            return DVec2::ZERO;
        };
        let mut seg_start = 0.0;
        for (i, &len) in self.lengths.iter().enumerate() {
            if distance <= seg_start + len {
                let t = (distance - seg_start) / if len > 0.0 { len } else { 1.0 };
                return self.vertices[i].lerp(self.vertices[i + 1], t.clamp(0.0, 1.0));
            }
            seg_start += len;
        }
        last
    }
}

/// `count` points at equal arc-length spacing (`total / count`) starting at distance 0
pub fn distribute_along_polyline(vertices: &[DVec2], count: usize, bounds: &Bounds, margin: f64) -> Vec<DVec2> {
    let line = Polyline::new(vertices);
    let step = line.total_length() / count.max(1) as f64;
    (0..count)
        .map(|k| bounds.clamp_point(line.point_at(k as f64 * step), margin))
        .collect()
}

/// `count` points evenly spaced by angle, starting straight up (-90°)
pub fn points_on_circle(center: DVec2, radius: f64, count: usize, bounds: &Bounds, margin: f64) -> Vec<DVec2> {
    (0..count)
        .map(|i| {
            let a = -FRAC_PI_2 + i as f64 * TAU / count as f64;
            bounds.clamp_point(center + DVec2::new(a.cos(), a.sin()) * radius, margin)
        })
        .collect()
}

/// 5x5 lattice centered on `center`, `size` wide, row-major from the top-left
pub fn grid5x5(center: DVec2, size: f64, bounds: &Bounds, margin: f64) -> Vec<DVec2> {
    let step = size / 4.0;
    let origin = center - DVec2::splat(size / 2.0);
    (0..5)
        .flat_map(|row| (0..5).map(move |col| (row, col)))
        .map(|(row, col)| bounds.clamp_point(origin + DVec2::new(col as f64, row as f64) * step, margin))
        .collect()
}

/// Offsets (in units of the bar step) of a plus: a vertical bar of 5 through
/// the center, the 4 remaining horizontal bar points, then filler on a
/// half-step lattice in the four quadrants, nearest rings first.
fn plus_offsets(count: usize) -> Vec<DVec2> {
    let mut offsets: Vec<DVec2> = (-2..=2).map(|i| DVec2::new(0.0, i as f64)).collect();
    offsets.extend([-2, -1, 1, 2].map(|i| DVec2::new(i as f64, 0.0)));

    let mut ring = 1;
    while offsets.len() < count {
        for (sx, sy) in [(1.0, 1.0), (-1.0, 1.0), (-1.0, -1.0), (1.0, -1.0)] {
            for i in 1..=ring {
                for j in 1..=ring {
                    if i.max(j) == ring {
                        offsets.push(DVec2::new(sx * i as f64 * 0.5, sy * j as f64 * 0.5));
                    }
                }
            }
        }
        ring += 1;
    }
    offsets.truncate(count);
    offsets
}

/// Plus sign whose bars reach `radius` from the center, padded near the center
pub fn plus_shape(center: DVec2, radius: f64, count: usize, bounds: &Bounds, margin: f64) -> Vec<DVec2> {
    let step = radius / 2.0;
    plus_offsets(count)
        .into_iter()
        .map(|o| bounds.clamp_point(center + o * step, margin))
        .collect()
}

/// The plus layout turned 45 degrees
pub fn x_shape(center: DVec2, radius: f64, count: usize, bounds: &Bounds, margin: f64) -> Vec<DVec2> {
    let step = radius / 2.0;
    let rot = DVec2::from_angle(FRAC_PI_4);
    plus_offsets(count)
        .into_iter()
        .map(|o| bounds.clamp_point(center + rot.rotate(o * step), margin))
        .collect()
}

/// A named target arrangement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Shape {
    Diamond,
    Circle,
    Grid,
    Star,
    Polygon { sides: u32 },
    Plus,
    X,
}

impl Shape {
    pub fn name(&self) -> &'static str {
        match self {
            Shape::Diamond => "diamond",
            Shape::Circle => "circle",
            Shape::Grid => "grid",
            Shape::Star => "star",
            Shape::Polygon { sides: 3 } => "triangle",
            Shape::Polygon { sides: 5 } => "pentagon",
            Shape::Polygon { sides: 6 } => "hexagon",
            Shape::Polygon { sides: 8 } => "octagon",
            Shape::Polygon { .. } => "polygon",
            Shape::Plus => "plus",
            Shape::X => "x",
        }
    }

    /// Raw points for this shape, centered in `bounds` and sized from its shorter side
    pub fn points(&self, bounds: &Bounds, count: usize, margin: f64) -> Vec<DVec2> {
        let center = bounds.center();
        let min_side = bounds.min_side();
        let r = min_side * 0.36;
        match *self {
            Shape::Diamond => distribute_along_polyline(&diamond(center, r), count, bounds, margin),
            Shape::Circle => points_on_circle(center, r, count, bounds, margin),
            Shape::Grid => grid5x5(center, min_side * 0.58, bounds, margin),
            Shape::Star => {
                distribute_along_polyline(&star(center, r * 0.55, r, -FRAC_PI_2, 5), count, bounds, margin)
            }
            Shape::Polygon { sides } => {
                distribute_along_polyline(&polygon(center, sides, r, -FRAC_PI_2), count, bounds, margin)
            }
            Shape::Plus => plus_shape(center, r, count, bounds, margin),
            Shape::X => x_shape(center, r, count, bounds, margin),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::MUSICIANS;
    use crate::sim::bounds::Viewport;

    fn bounds() -> Bounds {
        Viewport::new(360.0, 640.0).bounds()
    }

    #[test]
    fn test_plus_and_x_arms_reach_radius() {
        let b = Bounds { left: -1000.0, right: 1000.0, top: -1000.0, bottom: 1000.0 };
        let c = DVec2::ZERO;
        let plus = plus_shape(c, 100.0, MUSICIANS, &b, 0.0);
        let x = x_shape(c, 100.0, MUSICIANS, &b, 0.0);
        assert_eq!(plus.len(), MUSICIANS);
        for pts in [&plus, &x] {
            let reach = pts.iter().map(|p| p.length()).fold(0.0, f64::max);
            assert!((reach - 100.0).abs() < 1e-9);
        }
        // Bar points sit a half radius apart
        assert!(plus.contains(&DVec2::new(0.0, -100.0)));
        assert!(plus.contains(&DVec2::new(0.0, -50.0)));
        assert!(plus.contains(&DVec2::new(50.0, 0.0)));
    }

    #[test]
    fn test_polygon_is_closed() {
        let verts = polygon(DVec2::new(100.0, 100.0), 6, 50.0, 0.0);
        assert_eq!(verts.len(), 7);
        assert_eq!(verts[0], verts[6]);
        for v in &verts {
            assert!((v.distance(DVec2::new(100.0, 100.0)) - 50.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_star_alternates_radius() {
        let c = DVec2::ZERO;
        let verts = star(c, 20.0, 40.0, 0.0, 5);
        assert_eq!(verts.len(), 11);
        for (i, v) in verts[..10].iter().enumerate() {
            let expected = if i % 2 == 0 { 40.0 } else { 20.0 };
            assert!((v.length() - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn test_distribute_on_straight_line_is_even() {
        let b = Bounds { left: -1000.0, right: 1000.0, top: -1000.0, bottom: 1000.0 };
        let line = [DVec2::new(0.0, 0.0), DVec2::new(100.0, 0.0)];
        let pts = distribute_along_polyline(&line, 4, &b, 0.0);
        let xs: Vec<f64> = pts.iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![0.0, 25.0, 50.0, 75.0]);
    }

    #[test]
    fn test_distribute_diamond_spacing_along_path() {
        let b = bounds();
        let pts = distribute_along_polyline(&diamond(b.center(), 100.0), MUSICIANS, &b, 12.0);
        assert_eq!(pts.len(), MUSICIANS);
        // First point sits on the top vertex
        assert!((pts[0] - (b.center() + DVec2::new(0.0, -100.0))).length() < 1e-9);
    }

    #[test]
    fn test_polyline_overshoot_lands_on_last_vertex() {
        let verts = [DVec2::new(0.0, 0.0), DVec2::new(10.0, 0.0), DVec2::new(10.0, 10.0)];
        let line = Polyline::new(&verts);
        assert_eq!(line.total_length(), 20.0);
        assert_eq!(line.point_at(20.0 + 1e-9), DVec2::new(10.0, 10.0));
        assert_eq!(line.point_at(1e6), DVec2::new(10.0, 10.0));
        assert_eq!(line.point_at(15.0), DVec2::new(10.0, 5.0));
    }

    #[test]
    fn test_circle_starts_at_top() {
        let b = bounds();
        let pts = points_on_circle(b.center(), 80.0, 4, &b, 12.0);
        assert!((pts[0] - (b.center() + DVec2::new(0.0, -80.0))).length() < 1e-9);
        assert!((pts[1] - (b.center() + DVec2::new(80.0, 0.0))).length() < 1e-9);
    }

    #[test]
    fn test_grid_center_is_slot_12() {
        let b = bounds();
        let pts = grid5x5(b.center(), 160.0, &b, 12.0);
        assert_eq!(pts.len(), 25);
        assert!((pts[12] - b.center()).length() < 1e-9);
        assert!((pts[1].x - pts[0].x - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_plus_and_x_are_distinct_and_sized() {
        let b = bounds();
        for pts in [
            plus_shape(b.center(), 100.0, MUSICIANS, &b, 12.0),
            x_shape(b.center(), 100.0, MUSICIANS, &b, 12.0),
        ] {
            assert_eq!(pts.len(), MUSICIANS);
            for i in 0..pts.len() {
                for j in (i + 1)..pts.len() {
                    // Half a bar step apart at the closest
                    assert!(pts[i].distance(pts[j]) >= 25.0 - 1e-9, "{i} and {j} overlap");
                }
            }
        }
    }

    #[test]
    fn test_every_shape_yields_count_points_in_bounds() {
        let b = bounds();
        let shapes = [
            Shape::Diamond,
            Shape::Circle,
            Shape::Grid,
            Shape::Star,
            Shape::Polygon { sides: 3 },
            Shape::Polygon { sides: 8 },
            Shape::Plus,
            Shape::X,
        ];
        for shape in shapes {
            let pts = shape.points(&b, MUSICIANS, 12.0);
            assert_eq!(pts.len(), MUSICIANS, "{}", shape.name());
            assert!(pts.iter().all(|p| b.contains(*p, 12.0)), "{}", shape.name());
        }
    }
}
