//! Level progression: which shape each level ends in, which marching line it
//! passes through, how many steps it takes and how fast they tick.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::bounds::Bounds;
use super::path::{MotionStep, build_path};
use super::resolve::Resolver;
use super::shapes::Shape;
use crate::consts::LEVEL_COUNT;
use crate::tuning::Tuning;

/// Final shape of levels 1..=10
pub const LEVEL_SHAPES: [Shape; LEVEL_COUNT as usize] = [
    Shape::Diamond,
    Shape::Circle,
    Shape::Grid,
    Shape::Star,
    Shape::Polygon { sides: 3 },
    Shape::Polygon { sides: 6 },
    Shape::Plus,
    Shape::Polygon { sides: 5 },
    Shape::X,
    Shape::Polygon { sides: 8 },
];

/// Minimum steps in a level, and per phase
const MIN_LEVEL_STEPS: usize = 16;
const MIN_PHASE_STEPS: usize = 6;

/// Inset of marching lines from the field edge
const FILE_INSET: f64 = 20.0;
const ROW_INSET: f64 = 16.0;

/// Extra room added to staggered neighbours
const STAGGER_SLACK: f64 = 0.5;

/// Final shape for a level; anything past the table forms a circle
pub fn shape_for_level(level: u32) -> Shape {
    level
        .checked_sub(1)
        .and_then(|i| LEVEL_SHAPES.get(i as usize))
        .copied()
        .unwrap_or(Shape::Circle)
}

/// Intermediate marching line a level passes through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LineKind {
    /// One vertical file down the middle
    SingleFile,
    /// Two horizontal rows (13 + 12)
    TwoRows,
    /// Three horizontal rows (8 + 9 + 8)
    ThreeRows,
}

impl LineKind {
    pub fn for_level(level: u32) -> Self {
        match level.saturating_sub(1) % 3 {
            0 => LineKind::SingleFile,
            1 => LineKind::TwoRows,
            _ => LineKind::ThreeRows,
        }
    }

    /// Raw line positions for `count` musicians
    pub fn points(self, bounds: &Bounds, count: usize, min_separation: f64) -> Vec<DVec2> {
        let c = bounds.center();
        let h = bounds.height();
        match self {
            LineKind::SingleFile => {
                let top = bounds.top + FILE_INSET;
                let span = bounds.bottom - FILE_INSET - top;
                let step = span / (count + 1) as f64;
                staggered_run(DVec2::new(c.x, top), DVec2::Y, step, count, min_separation)
            }
            LineKind::TwoRows => {
                let first = count.div_ceil(2);
                let mut pts = row(bounds, c.y - 0.22 * h, first, min_separation);
                pts.extend(row(bounds, c.y + 0.22 * h, count - first, min_separation));
                pts
            }
            LineKind::ThreeRows => {
                let outer = count / 3;
                let middle = count - 2 * outer;
                let mut pts = row(bounds, c.y - 0.2 * h, outer, min_separation);
                pts.extend(row(bounds, c.y, middle, min_separation));
                pts.extend(row(bounds, c.y + 0.2 * h, outer, min_separation));
                pts
            }
        }
    }
}

/// Evenly spaced horizontal row across the field
fn row(bounds: &Bounds, y: f64, count: usize, min_separation: f64) -> Vec<DVec2> {
    let left = bounds.left + ROW_INSET;
    let right = bounds.right - ROW_INSET;
    let step = (right - left) / (count + 1) as f64;
    staggered_run(DVec2::new(left, y), DVec2::X, step, count, min_separation)
}

/// Points along `axis` every `spacing`, zig-zagging sideways when the
/// spacing alone is tighter than the minimum separation
fn staggered_run(origin: DVec2, axis: DVec2, spacing: f64, count: usize, min_separation: f64) -> Vec<DVec2> {
    let offset = if spacing < min_separation {
        (min_separation * min_separation - spacing * spacing).sqrt() / 2.0 + STAGGER_SLACK
    } else {
        0.0
    };
    let side = axis.perp();
    (0..count)
        .map(|i| {
            let sign = if i % 2 == 0 { -1.0 } else { 1.0 };
            origin + axis * spacing * (i + 1) as f64 + side * offset * sign
        })
        .collect()
}

/// Total steps for a level and how they split between the two phases
pub fn step_counts(level: u32) -> (usize, usize) {
    let total = MIN_LEVEL_STEPS.max(10 + 4 * level as usize);
    let to_line = MIN_PHASE_STEPS.max((total as f64 * 0.5).round() as usize);
    let to_shape = MIN_PHASE_STEPS.max(total.saturating_sub(to_line));
    (to_line, to_shape)
}

/// Duration of one step at a level (ms)
pub fn step_duration_ms(level: u32, tuning: &Tuning) -> f64 {
    let exponent = level.saturating_sub(1) as i32;
    (tuning.step_duration_ms * tuning.speedup.powi(exponent)).max(tuning.min_step_duration_ms)
}

/// Opening block before level 1: five staggered rows in the top of the field
pub fn initial_formation(bounds: &Bounds, count: usize, tuning: &Tuning) -> Vec<DVec2> {
    let cx = bounds.center().x;
    let top = bounds.top + 40.0;
    let spacing = 44.0_f64.min(bounds.width() / 6.0);
    (0..count)
        .map(|i| {
            let row = (i / 5) as f64;
            let col = (i % 5) as f64 - 2.0;
            // Right of center leans right; the center column leans left with the rest
            let side = if col > 0.0 { 1.0 } else { -1.0 };
            let spread = (row - 2.0).abs() * spacing / 2.0 * side;
            let p = DVec2::new(cx + col * spacing + spread, top + row * spacing);
            bounds.clamp_slot(i, p, tuning)
        })
        .collect()
}

/// Everything needed to play one level
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelPlan {
    pub level: u32,
    pub shape: Shape,
    pub line: LineKind,
    /// Settled marching line positions
    pub intermediate: Vec<DVec2>,
    /// Settled final shape positions
    pub target: Vec<DVec2>,
    /// Current formation to line, then line to shape
    pub steps: Vec<MotionStep>,
    pub step_duration_ms: f64,
}

impl LevelPlan {
    /// Plan a level starting from the formation's current positions
    pub fn build(level: u32, start: &[DVec2], resolver: &Resolver, tuning: &Tuning) -> Self {
        let count = start.len();
        let b = &resolver.bounds;
        let shape = shape_for_level(level);
        let line = LineKind::for_level(level);

        let intermediate = resolver.prepare(&line.points(b, count, resolver.min_separation));
        let target = resolver.prepare(&shape.points(b, count, resolver.npc_margin));

        let (to_line, to_shape) = step_counts(level);
        let mut steps = build_path(start, &intermediate, to_line, level, resolver, tuning);
        steps.extend(build_path(&intermediate, &target, to_shape, level, resolver, tuning));

        let step_duration_ms = step_duration_ms(level, tuning);
        log::info!(
            "level {}: {:?} -> {} in {} steps of {:.0}ms",
            level,
            line,
            shape.name(),
            steps.len(),
            step_duration_ms
        );

        Self {
            level,
            shape,
            line,
            intermediate,
            target,
            steps,
            step_duration_ms,
        }
    }

    pub fn step_count(&self) -> usize {
        self.steps.len()
    }
}
