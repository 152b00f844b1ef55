//! Zone judging and scoring
//!
//! The player must keep their feet inside the zone drawn under slot 12. Each
//! judged frame in the zone earns a score tick and clears the countdown;
//! each frame outside costs a tick and runs the countdown down.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::tuning::Tuning;

/// Score ticks per displayed point
pub const TICKS_PER_POINT: u64 = 100;

/// A sprite whose feet sit below its origin
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Body {
    pub render_scale: f64,
    pub foot_offset: f64,
}

impl Body {
    pub fn player(tuning: &Tuning) -> Self {
        Self {
            render_scale: tuning.player_scale,
            foot_offset: tuning.foot_offset,
        }
    }

    pub fn npc(tuning: &Tuning) -> Self {
        Self {
            render_scale: tuning.npc_scale,
            foot_offset: tuning.foot_offset,
        }
    }

    /// Ground contact point for a sprite at `pos`
    #[inline]
    pub fn feet(&self, pos: DVec2) -> DVec2 {
        pos + DVec2::new(0.0, self.foot_offset * self.render_scale)
    }
}

/// Strictly inside the zone circle
#[inline]
pub fn in_zone(feet: DVec2, zone_center: DVec2, radius: f64) -> bool {
    feet.distance_squared(zone_center) < radius * radius
}

/// Outcome of judging one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Verdict {
    /// Still in the opening grace period
    Grace,
    InZone,
    OutOfZone { remaining_ms: f64 },
    /// Countdown ran out this frame
    Expired,
}

/// Scoring state for one run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Judge {
    pub grace_until_ms: f64,
    pub out_of_zone_ms: f64,
    pub score_ticks: u64,
    pub in_zone: bool,
}

impl Judge {
    pub fn new(start_ms: f64, tuning: &Tuning) -> Self {
        Self {
            grace_until_ms: start_ms + tuning.grace_ms,
            out_of_zone_ms: 0.0,
            score_ticks: 0,
            in_zone: true,
        }
    }

    pub fn in_grace(&self, now_ms: f64) -> bool {
        now_ms < self.grace_until_ms
    }

    /// Judge one frame that lasted `frame_ms`
    pub fn update(
        &mut self,
        now_ms: f64,
        frame_ms: f64,
        player_feet: DVec2,
        zone_center: DVec2,
        tuning: &Tuning,
    ) -> Verdict {
        if self.in_grace(now_ms) {
            self.in_zone = true;
            return Verdict::Grace;
        }

        self.in_zone = in_zone(player_feet, zone_center, tuning.zone_radius);
        if self.in_zone {
            self.out_of_zone_ms = 0.0;
            self.score_ticks = self.score_ticks.saturating_add(tuning.score_tick);
            return Verdict::InZone;
        }

        self.out_of_zone_ms += frame_ms.max(0.0);
        if self.out_of_zone_ms >= tuning.max_out_zone_ms {
            return Verdict::Expired;
        }
        self.score_ticks = self.score_ticks.saturating_sub(tuning.score_tick);
        Verdict::OutOfZone {
            remaining_ms: tuning.max_out_zone_ms - self.out_of_zone_ms,
        }
    }

    /// Points shown in the HUD
    pub fn display_score(&self) -> u64 {
        self.score_ticks / TICKS_PER_POINT
    }

    /// Whole seconds left on the countdown while outside the zone
    pub fn countdown_secs(&self, tuning: &Tuning) -> Option<u32> {
        if self.in_zone || self.out_of_zone_ms <= 0.0 {
            return None;
        }
        let left = (tuning.max_out_zone_ms - self.out_of_zone_ms).max(0.0);
        Some((left / 1000.0).ceil() as u32)
    }

    /// Level transitions forgive time already spent outside
    pub fn reset_countdown(&mut self) {
        self.out_of_zone_ms = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME: f64 = 16.0;

    fn judged(tuning: &Tuning) -> Judge {
        Judge::new(0.0, tuning)
    }

    #[test]
    fn test_feet_offsets() {
        let tuning = Tuning::default();
        let p = DVec2::new(100.0, 100.0);
        assert!((Body::player(&tuning).feet(p).y - (100.0 + 18.0 * 1.35)).abs() < 1e-9);
        assert!((Body::npc(&tuning).feet(p).y - (100.0 + 18.0 * 1.25)).abs() < 1e-9);
    }

    #[test]
    fn test_zone_boundary_is_outside() {
        let c = DVec2::new(50.0, 50.0);
        assert!(in_zone(c + DVec2::new(21.9, 0.0), c, 22.0));
        assert!(!in_zone(c + DVec2::new(22.0, 0.0), c, 22.0));
    }

    #[test]
    fn test_grace_ignores_everything() {
        let tuning = Tuning::default();
        let mut judge = judged(&tuning);
        let far = DVec2::new(1000.0, 1000.0);
        for i in 0..100 {
            let v = judge.update(i as f64 * FRAME, FRAME, far, DVec2::ZERO, &tuning);
            assert_eq!(v, Verdict::Grace);
        }
        assert_eq!(judge.score_ticks, 0);
        assert_eq!(judge.out_of_zone_ms, 0.0);
    }

    #[test]
    fn test_score_in_and_out() {
        let tuning = Tuning::default();
        let mut judge = judged(&tuning);
        let zone = DVec2::ZERO;
        let mut now = tuning.grace_ms;

        for _ in 0..250 {
            now += FRAME;
            assert_eq!(judge.update(now, FRAME, zone, zone, &tuning), Verdict::InZone);
        }
        assert_eq!(judge.score_ticks, 250);
        assert_eq!(judge.display_score(), 2);

        for _ in 0..60 {
            now += FRAME;
            judge.update(now, FRAME, DVec2::new(100.0, 0.0), zone, &tuning);
        }
        assert_eq!(judge.score_ticks, 190);
        assert_eq!(judge.display_score(), 1);
        assert_eq!(judge.countdown_secs(&tuning), Some(5));

        now += FRAME;
        judge.update(now, FRAME, zone, zone, &tuning);
        assert_eq!(judge.out_of_zone_ms, 0.0);
        assert_eq!(judge.countdown_secs(&tuning), None);
    }

    #[test]
    fn test_score_floors_at_zero() {
        let tuning = Tuning::default();
        let mut judge = judged(&tuning);
        judge.update(tuning.grace_ms, FRAME, DVec2::new(100.0, 0.0), DVec2::ZERO, &tuning);
        assert_eq!(judge.score_ticks, 0);
    }

    #[test]
    fn test_expires_after_max_out_of_zone() {
        let tuning = Tuning::default();
        let mut judge = judged(&tuning);
        let far = DVec2::new(100.0, 0.0);
        let mut now = tuning.grace_ms;
        let mut frames = 0;
        loop {
            now += FRAME;
            frames += 1;
            if judge.update(now, FRAME, far, DVec2::ZERO, &tuning) == Verdict::Expired {
                break;
            }
        }
        // 313 frames of 16ms is the first total reaching 5000ms
        assert_eq!(frames, 313);
        assert!(judge.out_of_zone_ms >= tuning.max_out_zone_ms);
        assert!(judge.out_of_zone_ms < tuning.max_out_zone_ms + FRAME);
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn score_matches_saturating_count(frames in prop::collection::vec(any::<bool>(), 1..400)) {
                let tuning = Tuning::default();
                let mut judge = judged(&tuning);
                let far = DVec2::new(100.0, 0.0);
                let mut now = tuning.grace_ms;
                let mut expected: u64 = 0;
                for inside in frames {
                    now += FRAME;
                    let feet = if inside { DVec2::ZERO } else { far };
                    if judge.update(now, FRAME, feet, DVec2::ZERO, &tuning) == Verdict::Expired {
                        break;
                    }
                    expected = if inside {
                        expected + tuning.score_tick
                    } else {
                        expected.saturating_sub(tuning.score_tick)
                    };
                    prop_assert_eq!(judge.score_ticks, expected);
                }
            }
        }
    }
}
