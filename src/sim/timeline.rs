//! Wall-clock driven playback of a level plan
//!
//! Steps have a fixed duration. Each frame the timeline catches up on every
//! step boundary that has passed since the last frame (several on a stalled
//! tab), snapping to each completed step and rolling into the next level
//! when a plan runs out. Within the current step, positions are a linear
//! interpolation between the step's resolved endpoints.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::levels::LevelPlan;
use super::resolve::Resolver;
use crate::consts::LEVEL_COUNT;
use crate::tuning::Tuning;

/// What happened while catching up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimelineEvent {
    /// A level's last step finished and the next level was planned
    LevelComplete { completed: u32, next: u32 },
    /// The last level finished
    Finished,
}

/// Step playback state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Timeline {
    pub plan: LevelPlan,
    pub step_index: usize,
    /// Wall-clock start of the current step (ms)
    pub step_start_ms: f64,
    /// Resolved positions at the start of the current step
    pub from: Vec<DVec2>,
    /// Resolved positions at the end of the current step
    pub to: Vec<DVec2>,
    pub finished: bool,
}

impl Timeline {
    /// Plan `level` from the given positions and start its first step at `now_ms`
    pub fn start(level: u32, positions: &[DVec2], now_ms: f64, resolver: &Resolver, tuning: &Tuning) -> Self {
        let plan = LevelPlan::build(level, positions, resolver, tuning);
        let mut timeline = Self {
            plan,
            step_index: 0,
            step_start_ms: now_ms,
            from: positions.to_vec(),
            to: positions.to_vec(),
            finished: false,
        };
        timeline.to = timeline.step_target(resolver, tuning);
        timeline
    }

    pub fn level(&self) -> u32 {
        self.plan.level
    }

    /// Resolved end of the current step
    fn step_target(&self, resolver: &Resolver, tuning: &Tuning) -> Vec<DVec2> {
        let Some(step) = self.plan.steps.get(self.step_index) else {
            return self.from.clone();
        };
        let last = self.step_index + 1 == self.plan.step_count();
        if last {
            // Replayed resolves drift from the planned ones; the last step
            // always ends on the settled shape
            resolver
                .with_strength(tuning.final_step_strength)
                .resolve(&self.plan.target)
                .positions
        } else {
            let raw = step.apply(&self.from);
            resolver.resolve_step(&raw).positions
        }
    }

    /// Advance to `now_ms`, writing the interpolated formation into `positions`
    pub fn update(
        &mut self,
        positions: &mut [DVec2],
        now_ms: f64,
        resolver: &Resolver,
        tuning: &Tuning,
    ) -> Vec<TimelineEvent> {
        let mut events = Vec::new();
        if self.finished {
            return events;
        }

        while now_ms - self.step_start_ms >= self.plan.step_duration_ms {
            let elapsed_step = self.plan.step_duration_ms;
            positions.copy_from_slice(&self.to);
            self.step_index += 1;

            if self.step_index >= self.plan.step_count() {
                let completed = self.plan.level;
                if completed >= LEVEL_COUNT {
                    log::info!("final level {} complete", completed);
                    self.finished = true;
                    events.push(TimelineEvent::Finished);
                    return events;
                }
                let next = completed + 1;
                self.plan = LevelPlan::build(next, positions, resolver, tuning);
                self.step_index = 0;
                events.push(TimelineEvent::LevelComplete { completed, next });
            }

            self.from.copy_from_slice(positions);
            self.to = self.step_target(resolver, tuning);
            self.step_start_ms += elapsed_step;
        }

        let t = ((now_ms - self.step_start_ms) / self.plan.step_duration_ms).clamp(0.0, 1.0);
        for (p, (a, b)) in positions.iter_mut().zip(self.from.iter().zip(&self.to)) {
            *p = a.lerp(*b, t);
        }
        events
    }

    /// Pull stored endpoints into new bounds after a resize
    pub fn reclamp(&mut self, resolver: &Resolver) {
        for (i, p) in self.from.iter_mut().enumerate() {
            *p = resolver.bounds.clamp_point(*p, resolver.margin(i));
        }
        for (i, p) in self.to.iter_mut().enumerate() {
            *p = resolver.bounds.clamp_point(*p, resolver.margin(i));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::MUSICIANS;
    use crate::sim::bounds::Viewport;
    use crate::sim::levels::{initial_formation, step_counts};

    fn setup() -> (Resolver, Tuning, Vec<DVec2>) {
        let tuning = Tuning::default();
        let resolver = Resolver::new(Viewport::new(360.0, 640.0).bounds(), &tuning);
        let start = initial_formation(&resolver.bounds, MUSICIANS, &tuning);
        (resolver, tuning, start)
    }

    #[test]
    fn test_interpolates_within_step() {
        let (r, tuning, start) = setup();
        let mut pos = start.clone();
        let mut tl = Timeline::start(1, &start, 0.0, &r, &tuning);

        let events = tl.update(&mut pos, 1000.0, &r, &tuning);
        assert!(events.is_empty());
        assert_eq!(tl.step_index, 0);
        for i in 0..MUSICIANS {
            let mid = tl.from[i].lerp(tl.to[i], 0.5);
            assert!((pos[i] - mid).length() < 1e-9);
        }
    }

    #[test]
    fn test_catches_up_multiple_steps() {
        let (r, tuning, start) = setup();
        let mut pos = start.clone();
        let mut tl = Timeline::start(1, &start, 0.0, &r, &tuning);

        tl.update(&mut pos, 3.0 * 2000.0 + 10.0, &r, &tuning);
        assert_eq!(tl.step_index, 3);
        assert_eq!(tl.step_start_ms, 6000.0);
    }

    #[test]
    fn test_level_rollover_continues_clock() {
        let (r, tuning, start) = setup();
        let mut pos = start.clone();
        let mut tl = Timeline::start(1, &start, 0.0, &r, &tuning);
        let level_ms = 16.0 * 2000.0;

        let events = tl.update(&mut pos, level_ms + 1.0, &r, &tuning);
        assert_eq!(events, vec![TimelineEvent::LevelComplete { completed: 1, next: 2 }]);
        assert_eq!(tl.level(), 2);
        assert_eq!(tl.step_index, 0);
        assert_eq!(tl.step_start_ms, level_ms);
    }

    #[test]
    fn test_level_end_lands_near_target() {
        let (r, tuning, start) = setup();
        let mut pos = start.clone();
        let mut tl = Timeline::start(1, &start, 0.0, &r, &tuning);
        let target = tl.plan.target.clone();

        // Just before the last boundary the formation sits at the last step's end
        tl.update(&mut pos, 16.0 * 2000.0 - 1e-6, &r, &tuning);
        for (p, q) in pos.iter().zip(&target) {
            assert!((*p - *q).length() < 1e-6);
        }
    }

    #[test]
    fn test_every_frame_in_bounds() {
        let (r, tuning, start) = setup();
        let mut pos = start.clone();
        let mut tl = Timeline::start(1, &start, 0.0, &r, &tuning);
        let mut now = 0.0;
        while tl.level() < 3 {
            now += 50.0;
            tl.update(&mut pos, now, &r, &tuning);
            assert!(r.in_bounds(&pos), "out of bounds at {now}ms");
        }
    }

    #[test]
    fn test_every_step_target_keeps_spacing() {
        let (r, tuning, start) = setup();
        let mut pos = start.clone();
        let mut tl = Timeline::start(1, &start, 0.0, &r, &tuning);
        let mut now = 0.0;
        let mut steps = 0;
        while !tl.finished {
            assert_eq!(
                r.violations(&tl.to),
                0,
                "level {} step {} crowded",
                tl.level(),
                tl.step_index
            );
            assert!(r.in_bounds(&tl.to));
            // Exactly one step boundary per update
            now += tl.plan.step_duration_ms;
            tl.update(&mut pos, now, &r, &tuning);
            steps += 1;
        }
        let expected: usize = (1..=LEVEL_COUNT)
            .map(|level| {
                let (to_line, to_shape) = step_counts(level);
                to_line + to_shape
            })
            .sum();
        assert_eq!(steps, expected);
    }

    #[test]
    fn test_last_level_finishes_once() {
        let (r, tuning, start) = setup();
        let mut pos = start.clone();
        let mut tl = Timeline::start(LEVEL_COUNT, &start, 0.0, &r, &tuning);
        let total = tl.plan.step_count() as f64 * tl.plan.step_duration_ms;

        let events = tl.update(&mut pos, total + 5.0, &r, &tuning);
        assert_eq!(events, vec![TimelineEvent::Finished]);
        assert!(tl.finished);
        assert!(tl.update(&mut pos, total + 500.0, &r, &tuning).is_empty());
    }
}
