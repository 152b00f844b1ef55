//! Per-frame update
//!
//! One call per animation frame with the wall-clock timestamp. Order inside
//! a frame is fixed: formation timeline, then player movement, then the
//! zone judge, so the judge always sees this frame's positions.

use glam::DVec2;

use super::judge::Verdict;
use super::state::{GameEvent, GamePhase, GameSession};
use super::timeline::TimelineEvent;

/// Longest frame the joystick integrates over (s)
const MAX_MOVE_DT: f64 = 0.05;
/// Longest frame the countdown charges for (ms); a stalled tab is not a defeat
const MAX_JUDGED_FRAME_MS: f64 = 250.0;

/// Input commands for a single frame
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Field position the player is dragged to (drag scheme)
    pub pointer_target: Option<DVec2>,
    /// Joystick deflection, each axis in [-1, 1]
    pub joystick: DVec2,
    /// Start over after a win or loss
    pub restart: bool,
}

/// Advance the session to `now_ms`
pub fn tick(session: &mut GameSession, input: &TickInput, now_ms: f64) {
    if input.restart && session.phase != GamePhase::Running {
        session.restart(now_ms);
        return;
    }
    if session.phase != GamePhase::Running {
        return;
    }

    let frame_ms = (now_ms - session.last_frame_ms).max(0.0);
    session.last_frame_ms = now_ms;

    // Formation
    let resolver = session.resolver();
    let events = session
        .timeline
        .update(&mut session.formation, now_ms, &resolver, &session.tuning);
    for event in events {
        match event {
            TimelineEvent::LevelComplete { completed, next } => {
                session.judge.reset_countdown();
                session.show_banner(format!("Niveau {next}"), now_ms);
                session.events.push(GameEvent::LevelComplete { completed, next });
            }
            TimelineEvent::Finished => {
                session.finish(true);
                return;
            }
        }
    }

    // Player
    move_player(session, input, frame_ms);

    // Judge
    let verdict = session.judge.update(
        now_ms,
        frame_ms.min(MAX_JUDGED_FRAME_MS),
        session.player_feet(),
        session.zone_center(),
        &session.tuning,
    );
    if verdict == Verdict::Expired {
        session.finish(false);
    }
}

fn move_player(session: &mut GameSession, input: &TickInput, frame_ms: f64) {
    if let Some(target) = input.pointer_target {
        session.player.pos = target;
    } else if input.joystick != DVec2::ZERO {
        let dt = (frame_ms / 1000.0).clamp(0.0, MAX_MOVE_DT);
        let dir = input.joystick.clamp_length_max(1.0);
        session.player.pos += dir * session.tuning.player_speed * dt;
    }
    session.clamp_player();
}
