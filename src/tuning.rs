//! Data-driven game balance
//!
//! Every number that shapes how a run feels lives here so it can be tweaked
//! from JSON without touching the simulation.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading a tuning file
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("tuning parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid tuning value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: &'static str },
}

/// Game balance parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Bodies ===
    /// Clearance kept between an NPC and the field edge
    pub npc_radius: f64,
    /// Radius of the player's target zone (also the player's edge clearance)
    pub zone_radius: f64,
    /// Distance from a sprite's origin to its feet, before render scale
    pub foot_offset: f64,
    pub player_scale: f64,
    pub npc_scale: f64,

    // === Spacing ===
    /// Minimum separation at the reference width (360px)
    pub min_separation: f64,
    /// Minimum separation never shrinks below this on small screens
    pub min_separation_floor: f64,
    /// Pair-separation passes per motion step
    pub resolve_iterations: u32,
    /// Pair-separation passes when preparing a level's shapes
    pub settle_iterations: u32,

    // === Timeline ===
    /// Step duration at level 1 (ms)
    pub step_duration_ms: f64,
    /// Step duration multiplier per level
    pub speedup: f64,
    /// Step duration never drops below this (ms)
    pub min_step_duration_ms: f64,
    /// Collision push strength on a level's last step
    pub final_step_strength: f64,

    // === Swirl ===
    pub swirl_base: f64,
    pub swirl_per_level: f64,
    pub swirl_max: f64,
    /// Constant phase offset of the swirl (radians)
    pub swirl_phase: f64,
    /// Phase shift between consecutive agents (radians)
    pub swirl_agent_phase: f64,

    // === Judge ===
    /// Allowed time outside the zone before the run is lost (ms)
    pub max_out_zone_ms: f64,
    /// No scoring or penalty for this long after the run starts (ms)
    pub grace_ms: f64,
    /// Score ticks gained (or lost) per frame
    pub score_tick: u64,

    // === Player ===
    /// Joystick top speed (px/s)
    pub player_speed: f64,

    // === Presentation ===
    pub banner_ms: f64,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            npc_radius: 12.0,
            zone_radius: 22.0,
            foot_offset: 18.0,
            player_scale: 1.35,
            npc_scale: 1.25,

            min_separation: 26.0,
            min_separation_floor: 18.0,
            resolve_iterations: 12,
            settle_iterations: 400,

            step_duration_ms: 2000.0,
            speedup: 0.68,
            min_step_duration_ms: 220.0,
            final_step_strength: 0.3,

            swirl_base: 6.0,
            swirl_per_level: 1.2,
            swirl_max: 12.0,
            swirl_phase: std::f64::consts::PI / 7.0,
            swirl_agent_phase: 0.33,

            max_out_zone_ms: 5000.0,
            grace_ms: 3000.0,
            score_tick: 1,

            player_speed: 190.0,

            banner_ms: 1400.0,
        }
    }
}

impl Tuning {
    /// Parse a tuning file; missing fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Reject values the simulation cannot work with
    pub fn validate(&self) -> Result<(), TuningError> {
        fn positive(field: &'static str, v: f64) -> Result<(), TuningError> {
            if v.is_finite() && v > 0.0 {
                Ok(())
            } else {
                Err(TuningError::Invalid {
                    field,
                    reason: "must be a positive number",
                })
            }
        }

        fn non_negative(field: &'static str, v: f64) -> Result<(), TuningError> {
            if v.is_finite() && v >= 0.0 {
                Ok(())
            } else {
                Err(TuningError::Invalid {
                    field,
                    reason: "must not be negative",
                })
            }
        }

        positive("npc_radius", self.npc_radius)?;
        positive("zone_radius", self.zone_radius)?;
        positive("player_scale", self.player_scale)?;
        positive("npc_scale", self.npc_scale)?;
        positive("min_separation", self.min_separation)?;
        positive("min_separation_floor", self.min_separation_floor)?;
        positive("step_duration_ms", self.step_duration_ms)?;
        positive("min_step_duration_ms", self.min_step_duration_ms)?;
        positive("max_out_zone_ms", self.max_out_zone_ms)?;
        positive("player_speed", self.player_speed)?;

        if !(self.speedup > 0.0 && self.speedup <= 1.0) {
            return Err(TuningError::Invalid {
                field: "speedup",
                reason: "must be in (0, 1]",
            });
        }
        if !(self.final_step_strength > 0.0 && self.final_step_strength <= 1.0) {
            return Err(TuningError::Invalid {
                field: "final_step_strength",
                reason: "must be in (0, 1]",
            });
        }
        if self.min_separation_floor > self.min_separation {
            return Err(TuningError::Invalid {
                field: "min_separation_floor",
                reason: "must not exceed min_separation",
            });
        }
        if self.resolve_iterations == 0 || self.settle_iterations == 0 {
            return Err(TuningError::Invalid {
                field: "resolve_iterations",
                reason: "iteration caps must be at least 1",
            });
        }
        non_negative("grace_ms", self.grace_ms)?;
        non_negative("foot_offset", self.foot_offset)?;
        non_negative("swirl_max", self.swirl_max)?;
        Ok(())
    }

    /// Swirl amplitude at a level's start (grows mildly, capped)
    pub fn swirl_amplitude(&self, level: u32) -> f64 {
        (self.swirl_base + level as f64 * self.swirl_per_level).min(self.swirl_max)
    }
}
