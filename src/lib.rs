//! Parade Drill - a marching-band formation game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (shapes, spacing, choreography, timeline, zone judge)
//! - `renderer`: WebGPU rendering pipeline
//! - `tuning`: Data-driven game balance
//! - `settings`: Player preferences
//! - `highscores`: Local score persistence
//! - `platform`: Browser/native differences (storage)

#[cfg(target_arch = "wasm32")]
pub mod audio;
pub mod highscores;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use highscores::{HighScoreEntry, HighScores};
pub use settings::{ControlScheme, Settings};
pub use tuning::{Tuning, TuningError};

/// Game configuration constants
pub mod consts {
    /// Musicians in the formation
    pub const MUSICIANS: usize = 25;
    /// Formation slot the player is responsible for (center of the 5x5 block)
    pub const PLAYER_SLOT: usize = 12;
    /// Levels in a run; finishing the last one wins the game
    pub const LEVEL_COUNT: u32 = 10;

    /// Reference canvas size the layout constants are tuned for
    pub const REFERENCE_WIDTH: f64 = 360.0;
    pub const REFERENCE_HEIGHT: f64 = 640.0;

    /// Assumed frame length when the scheduler gives no usable delta (ms)
    pub const NOMINAL_FRAME_MS: f64 = 16.0;
}

/// Clamp `v` into `[lo, hi]`. Unlike `f64::clamp` this never panics when `lo > hi`
/// (a viewport smaller than twice the margin); the lower bound wins.
#[inline]
pub fn clamp(v: f64, lo: f64, hi: f64) -> f64 {
    lo.max(hi.min(v))
}

/// Cubic ease: accelerate through the first half, decelerate through the second
#[inline]
pub fn ease_in_out_cubic(t: f64) -> f64 {
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}
