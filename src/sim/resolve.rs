//! Bounds and spacing resolution
//!
//! Keeps every musician on the field and apart from the others. This is a
//! bounded-iteration relaxation, not a solver: when the field is too small to
//! satisfy both constraints it gives up after its iteration cap and returns
//! whatever it reached.

use glam::DVec2;

use super::bounds::{Bounds, MarginClass};
use crate::clamp;
use crate::consts::REFERENCE_WIDTH;
use crate::tuning::Tuning;

/// Distances this close to the threshold count as satisfied
const SEPARATION_EPS: f64 = 1e-9;

/// Pushes aim this far past the threshold so neighbouring pushes do not
/// reopen gaps a hair under it
pub const SEPARATION_SLACK: f64 = 0.25;

/// Below this length two agents are treated as coincident
const COINCIDENT_EPS: f64 = 1e-12;

/// Fitting binary search depth
const FIT_ITERATIONS: u32 = 16;

/// Minimum separation for a playable area: shrinks with small screens, never
/// below the floor, never above the reference value
pub fn min_separation(bounds: &Bounds, tuning: &Tuning) -> f64 {
    clamp(
        tuning.min_separation * (bounds.min_side() / REFERENCE_WIDTH),
        tuning.min_separation_floor,
        tuning.min_separation,
    )
}

/// Output of a resolve pass
#[derive(Debug, Clone)]
pub struct Resolution {
    pub positions: Vec<DVec2>,
    /// Passes over all pairs that were run
    pub iterations: u32,
    /// No pair is closer than the minimum separation
    pub converged: bool,
}

/// Clamps positions into the field and pushes crowded pairs apart
#[derive(Debug, Clone, Copy)]
pub struct Resolver {
    pub bounds: Bounds,
    pub min_separation: f64,
    pub npc_margin: f64,
    pub zone_margin: f64,
    pub max_iterations: u32,
    pub settle_iterations: u32,
    /// Fraction of the separation deficit corrected per push
    pub strength: f64,
}

impl Resolver {
    pub fn new(bounds: Bounds, tuning: &Tuning) -> Self {
        Self {
            bounds,
            min_separation: min_separation(&bounds, tuning),
            npc_margin: MarginClass::Npc.margin(tuning),
            zone_margin: MarginClass::Zone.margin(tuning),
            max_iterations: tuning.resolve_iterations,
            settle_iterations: tuning.settle_iterations,
            strength: 1.0,
        }
    }

    pub fn with_strength(mut self, strength: f64) -> Self {
        self.strength = strength;
        self
    }

    /// Edge clearance for a formation index
    #[inline]
    pub fn margin(&self, index: usize) -> f64 {
        match MarginClass::for_slot(index) {
            MarginClass::Npc => self.npc_margin,
            MarginClass::Zone => self.zone_margin,
        }
    }

    #[inline]
    fn clamp_slot(&self, index: usize, p: DVec2) -> DVec2 {
        self.bounds.clamp_point(p, self.margin(index))
    }

    /// Clamp every candidate, then separate crowded pairs for up to
    /// `max_iterations` passes
    pub fn resolve(&self, candidates: &[DVec2]) -> Resolution {
        self.run(candidates, self.max_iterations)
    }

    /// Like `resolve` but with the much larger settle cap; used to prepare a
    /// level's target arrangements once rather than on every step
    pub fn settle(&self, candidates: &[DVec2]) -> Resolution {
        self.run(candidates, self.settle_iterations)
    }

    /// Resolve one choreography step: the regular pass cap first, then the
    /// settle cap from where it stopped if pairs are still crowded
    pub fn resolve_step(&self, candidates: &[DVec2]) -> Resolution {
        let first = self.resolve(candidates);
        if first.converged {
            return first;
        }
        let rest = self.settle(&first.positions);
        log::debug!("step needed {} extra passes", rest.iterations);
        Resolution {
            iterations: first.iterations + rest.iterations,
            ..rest
        }
    }

    fn run(&self, candidates: &[DVec2], cap: u32) -> Resolution {
        let mut pos: Vec<DVec2> = candidates
            .iter()
            .enumerate()
            .map(|(i, &p)| self.clamp_slot(i, p))
            .collect();
        let n = pos.len();
        let threshold = self.min_separation - SEPARATION_EPS;

        let mut iterations = 0;
        let mut changed = true;
        while changed && iterations < cap {
            changed = false;
            for i in 0..n {
                for j in (i + 1)..n {
                    let delta = pos[j] - pos[i];
                    let d = delta.length();
                    if d < threshold {
                        changed = true;
                        let dir = if d > COINCIDENT_EPS {
                            delta / d
                        } else {
                            coincident_direction(i, j)
                        };
                        let push = (self.min_separation + SEPARATION_SLACK - d) / 2.0 * self.strength;
                        pos[i] = self.clamp_slot(i, pos[i] - dir * push);
                        pos[j] = self.clamp_slot(j, pos[j] + dir * push);
                    }
                }
            }
            iterations += 1;
        }

        let converged = !changed || self.violations(&pos) == 0;
        if !converged {
            log::debug!(
                "spacing not resolved after {} passes ({} crowded pairs)",
                iterations,
                self.violations(&pos)
            );
        }
        Resolution {
            positions: pos,
            iterations,
            converged,
        }
    }

    /// Pairs closer than the minimum separation
    pub fn violations(&self, positions: &[DVec2]) -> usize {
        let threshold = self.min_separation - SEPARATION_EPS;
        let mut count = 0;
        for i in 0..positions.len() {
            for j in (i + 1)..positions.len() {
                if positions[i].distance(positions[j]) < threshold {
                    count += 1;
                }
            }
        }
        count
    }

    /// Whether every point is inside the field with its margin class
    pub fn in_bounds(&self, positions: &[DVec2]) -> bool {
        positions
            .iter()
            .enumerate()
            .all(|(i, &p)| self.bounds.contains(p, self.margin(i)))
    }

    /// Largest uniform scale (at most 1) around the field center at which
    /// the arrangement fits the field and keeps its spacing. Arrangements
    /// that fit nowhere come back unchanged.
    pub fn fit_to_bounds(&self, points: &[DVec2]) -> Vec<DVec2> {
        if points.is_empty() {
            return Vec::new();
        }
        let center = self.bounds.center();
        let scaled = |scale: f64| -> Vec<DVec2> {
            points.iter().map(|&p| center + (p - center) * scale).collect()
        };
        let valid = |candidate: &[DVec2]| self.in_bounds(candidate) && self.violations(candidate) == 0;

        if valid(points) {
            return points.to_vec();
        }

        let (mut low, mut high) = (0.0, 1.0);
        let mut best = None;
        for _ in 0..FIT_ITERATIONS {
            let scale = (low + high) / 2.0;
            if valid(&scaled(scale)) {
                best = Some(scale);
                low = scale;
            } else {
                high = scale;
            }
        }

        match best {
            Some(scale) => scaled(scale),
            None => points.to_vec(),
        }
    }

    /// Turn a raw arrangement into a spacing-clean target: fit, then settle
    pub fn prepare(&self, raw: &[DVec2]) -> Vec<DVec2> {
        let fitted = self.fit_to_bounds(raw);
        let settled = self.settle(&fitted);
        if !settled.converged {
            log::warn!(
                "arrangement still crowded after {} settle passes",
                settled.iterations
            );
        }
        settled.positions
    }
}

/// Deterministic push axis for two agents standing on the same spot
fn coincident_direction(i: usize, j: usize) -> DVec2 {
    let angle = (i * 31 + j * 17) as f64 * 2.399_963_229_728_653; // golden angle
    DVec2::new(angle.cos(), angle.sin())
}
