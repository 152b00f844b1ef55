//! Deterministic simulation module
//!
//! All choreography and judging lives here. Given the same seed, viewport,
//! tuning, inputs and frame timestamps it produces the same run:
//! - Wall-clock steps, no hidden timers
//! - Seeded RNG only
//! - Stable iteration order (by formation index)
//! - No rendering or platform dependencies

pub mod bounds;
pub mod frame;
pub mod joystick;
pub mod judge;
pub mod levels;
pub mod path;
pub mod resolve;
pub mod shapes;
pub mod state;
pub mod tick;
pub mod timeline;

pub use bounds::{Bounds, MarginClass, Viewport};
pub use frame::RenderFrame;
pub use joystick::Joystick;
pub use judge::{Body, Judge, Verdict, in_zone};
pub use levels::{LEVEL_SHAPES, LevelPlan, LineKind, shape_for_level};
pub use path::{MotionStep, apply_path, build_path};
pub use resolve::{Resolution, Resolver, min_separation};
pub use shapes::Shape;
pub use state::{DEFEAT_MESSAGES, GameEvent, GamePhase, GameSession, Player};
pub use tick::{TickInput, tick};
pub use timeline::{Timeline, TimelineEvent};
