//! Choreography between two arrangements
//!
//! A transition is cut into fixed-duration steps. Each step's targets follow
//! an eased straight-line interpolation bowed sideways by a sinusoidal swirl
//! that fades out as the move completes, so converging musicians do not all
//! pass through the same points. Every intermediate target goes through the
//! resolver; the final step is corrected to land exactly on the end
//! arrangement.

use std::f64::consts::TAU;

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::resolve::Resolver;
use crate::ease_in_out_cubic;
use crate::tuning::Tuning;

/// Per-agent displacement for one step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MotionStep {
    pub deltas: Vec<DVec2>,
}

impl MotionStep {
    /// Raw targets of this step from the given positions
    pub fn apply(&self, from: &[DVec2]) -> Vec<DVec2> {
        from.iter().zip(&self.deltas).map(|(&p, &d)| p + d).collect()
    }
}

/// Apply a sequence of steps in order
pub fn apply_path(start: &[DVec2], steps: &[MotionStep]) -> Vec<DVec2> {
    steps.iter().fold(start.to_vec(), |pos, step| step.apply(&pos))
}

/// Swirl offset along the perpendicular of an agent's straight path
#[inline]
fn swirl(t: f64, agent: usize, amplitude: f64, tuning: &Tuning) -> f64 {
    (t * TAU + agent as f64 * tuning.swirl_agent_phase + tuning.swirl_phase).sin() * amplitude
}

/// Build `step_count` motion steps taking `start` to exactly `end`
pub fn build_path(
    start: &[DVec2],
    end: &[DVec2],
    step_count: usize,
    level: u32,
    resolver: &Resolver,
    tuning: &Tuning,
) -> Vec<MotionStep> {
    debug_assert_eq!(start.len(), end.len());
    if step_count == 0 {
        return Vec::new();
    }

    let base_amp = tuning.swirl_amplitude(level);
    let normals: Vec<DVec2> = start
        .iter()
        .zip(end)
        .map(|(&s, &e)| {
            let v = e - s;
            let len = v.length();
            let len = if len > 0.0 { len } else { 1.0 };
            DVec2::new(-v.y, v.x) / len
        })
        .collect();

    let mut path = Vec::with_capacity(step_count);
    let mut prev = start.to_vec();
    let mut before_last = prev.clone();

    for s in 1..=step_count {
        let t = ease_in_out_cubic(s as f64 / step_count as f64);
        let amp = base_amp * (1.0 - t);

        let targets: Vec<DVec2> = start
            .iter()
            .zip(end)
            .enumerate()
            .map(|(i, (&a, &b))| a.lerp(b, t) + normals[i] * swirl(t, i, amp, tuning))
            .collect();

        let resolved = resolver.resolve_step(&targets).positions;
        let deltas = resolved.iter().zip(&prev).map(|(&r, &p)| r - p).collect();
        path.push(MotionStep { deltas });

        before_last = std::mem::replace(&mut prev, resolved);
    }

    // Clamping and separation drift; land exactly on the requested end
    if let Some(last) = path.last_mut() {
        last.deltas = end.iter().zip(&before_last).map(|(&e, &b)| e - b).collect();
    }

    log::debug!(
        "built {} steps for level {} (swirl {:.1})",
        path.len(),
        level,
        base_amp
    );
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::MUSICIANS;
    use crate::sim::bounds::Viewport;
    use crate::sim::shapes::{Shape, grid5x5};

    fn setup() -> (Resolver, Tuning) {
        let tuning = Tuning::default();
        let resolver = Resolver::new(Viewport::new(360.0, 640.0).bounds(), &tuning);
        (resolver, tuning)
    }

    #[test]
    fn test_grid_to_circle_lands_exactly() {
        let (resolver, tuning) = setup();
        let b = resolver.bounds;
        let start = grid5x5(b.center(), b.min_side() * 0.58, &b, resolver.npc_margin);
        let end = Shape::Circle.points(&b, MUSICIANS, resolver.npc_margin);

        let path = build_path(&start, &end, 20, 1, &resolver, &tuning);
        assert_eq!(path.len(), 20);
        assert!(path.iter().all(|s| s.deltas.len() == MUSICIANS));

        let mut agent0 = start[0];
        for step in &path {
            agent0 += step.deltas[0];
        }
        assert!((agent0 - end[0]).length() < 1e-6);

        let landed = apply_path(&start, &path);
        for (p, e) in landed.iter().zip(&end) {
            assert!((*p - *e).length() < 1e-6);
        }
    }

    #[test]
    fn test_intermediate_steps_stay_in_bounds() {
        let (resolver, tuning) = setup();
        let b = resolver.bounds;
        let start = Shape::Star.points(&b, MUSICIANS, resolver.npc_margin);
        let end = Shape::Grid.points(&b, MUSICIANS, resolver.npc_margin);
        let path = build_path(&start, &end, 12, 5, &resolver, &tuning);

        let mut pos = start.clone();
        for step in &path[..path.len() - 1] {
            pos = step.apply(&pos);
            assert!(resolver.in_bounds(&pos));
        }
    }

    #[test]
    fn test_swirl_bows_path_early_and_fades() {
        let (resolver, tuning) = setup();
        let c = resolver.bounds.center();
        // One agent moving straight down: any sideways motion is swirl
        let start = [c + DVec2::new(0.0, -100.0)];
        let end = [c + DVec2::new(0.0, 100.0)];
        let path = build_path(&start, &end, 10, 3, &resolver, &tuning);

        let first = start[0] + path[0].deltas[0];
        assert!((first.x - c.x).abs() > 1e-3, "early step should leave the straight line");
        let landed = apply_path(&start, &path);
        assert!((landed[0] - end[0]).length() < 1e-9);
    }

    #[test]
    fn test_zero_steps_is_empty() {
        let (resolver, tuning) = setup();
        let c = resolver.bounds.center();
        assert!(build_path(&[c], &[c], 0, 1, &resolver, &tuning).is_empty());
    }

    #[test]
    fn test_stationary_agent_does_not_divide_by_zero() {
        let (resolver, tuning) = setup();
        let c = resolver.bounds.center();
        let path = build_path(&[c], &[c], 4, 1, &resolver, &tuning);
        for step in &path {
            assert!(step.deltas[0].is_finite());
        }
        assert!((apply_path(&[c], &path)[0] - c).length() < 1e-12);
    }
}
