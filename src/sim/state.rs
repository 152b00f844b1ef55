//! Session state and core simulation types
//!
//! Everything needed to resume or replay a run lives in `GameSession`.

use glam::DVec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::bounds::{Bounds, MarginClass, Viewport};
use super::judge::{Body, Judge};
use super::levels::initial_formation;
use super::resolve::Resolver;
use super::timeline::Timeline;
use crate::consts::{MUSICIANS, PLAYER_SLOT};
use crate::tuning::Tuning;

/// Lines shown when the countdown runs out
pub const DEFEAT_MESSAGES: [&str; 3] = ["Terrine!", "10 Jours d'arrêt!", "Réformé!"];

/// Current phase of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Formation marching, player judged
    Running,
    /// All levels completed
    Won,
    /// Countdown ran out
    Lost,
}

/// Things the shell reacts to (audio, HUD, persistence)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    RunStarted,
    LevelComplete { completed: u32, next: u32 },
    Lost { message: String },
    Won,
    /// Final numbers of a run, emitted once with `Lost` or `Won`
    RunFinished { score: u64, level: u32, won: bool },
}

/// Transient centered text (level-up)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Banner {
    pub text: String,
    pub until_ms: f64,
}

/// RNG state for deterministic replay
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RngState {
    pub seed: u64,
    /// Values drawn so far
    pub draws: u64,
}

impl RngState {
    pub fn new(seed: u64) -> Self {
        Self { seed, draws: 0 }
    }

    pub fn to_rng(&self) -> Pcg32 {
        let mut rng = Pcg32::seed_from_u64(self.seed);
        rng.advance(self.draws);
        rng
    }

    /// Seed for a follow-up run
    pub fn next_seed(&mut self) -> u64 {
        let mut rng = self.to_rng();
        self.draws += 1;
        rng.random()
    }

    /// Uniform index in `0..len`
    pub fn pick(&mut self, len: usize) -> usize {
        let mut rng = self.to_rng();
        self.draws += 1;
        rng.random_range(0..len.max(1))
    }
}

/// The player-controlled musician
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub pos: DVec2,
    pub body: Body,
}

/// Complete run state (deterministic given seed, inputs and timestamps)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameSession {
    pub seed: u64,
    pub rng_state: RngState,
    pub tuning: Tuning,
    pub viewport: Viewport,
    pub bounds: Bounds,
    /// Formation positions, index 12 is the player's slot
    pub formation: Vec<DVec2>,
    pub npc_body: Body,
    pub player: Player,
    pub timeline: Timeline,
    pub judge: Judge,
    pub phase: GamePhase,
    pub banner: Option<Banner>,
    /// Defeat line picked when the run was lost
    pub lose_message: Option<String>,
    pub started_ms: f64,
    pub last_frame_ms: f64,
    /// Pending events for the shell (drained each frame)
    #[serde(skip)]
    pub events: Vec<GameEvent>,
}

impl GameSession {
    /// Start a run at level 1
    pub fn new(seed: u64, viewport: Viewport, tuning: Tuning, now_ms: f64) -> Self {
        let bounds = viewport.bounds();
        let resolver = Resolver::new(bounds, &tuning);
        let formation = initial_formation(&bounds, MUSICIANS, &tuning);
        let timeline = Timeline::start(1, &formation, now_ms, &resolver, &tuning);
        let player = Player {
            pos: formation[PLAYER_SLOT],
            body: Body::player(&tuning),
        };
        log::info!(
            "run started (seed {}, field {:.0}x{:.0})",
            seed,
            bounds.width(),
            bounds.height()
        );

        Self {
            seed,
            rng_state: RngState::new(seed),
            npc_body: Body::npc(&tuning),
            judge: Judge::new(now_ms, &tuning),
            tuning,
            viewport,
            bounds,
            formation,
            player,
            timeline,
            phase: GamePhase::Running,
            banner: None,
            lose_message: None,
            started_ms: now_ms,
            last_frame_ms: now_ms,
            events: vec![GameEvent::RunStarted],
        }
    }

    /// Start over with the same viewport and tuning; the next seed comes
    /// from this run's RNG so replays stay deterministic
    pub fn restart(&mut self, now_ms: f64) {
        let seed = self.rng_state.next_seed();
        *self = Self::new(seed, self.viewport, self.tuning.clone(), now_ms);
    }

    pub fn resolver(&self) -> Resolver {
        Resolver::new(self.bounds, &self.tuning)
    }

    pub fn level(&self) -> u32 {
        self.timeline.level()
    }

    pub fn score(&self) -> u64 {
        self.judge.display_score()
    }

    /// Where the player should stand
    pub fn zone_center(&self) -> DVec2 {
        self.npc_body.feet(self.formation[PLAYER_SLOT])
    }

    pub fn player_feet(&self) -> DVec2 {
        self.player.body.feet(self.player.pos)
    }

    /// Keep the player inside the field with the zone's clearance
    pub fn clamp_player(&mut self) {
        let margin = MarginClass::Zone.margin(&self.tuning);
        self.player.pos = self.bounds.clamp_point(self.player.pos, margin);
    }

    /// Apply a new canvas size; positions are pulled into the new field
    /// and later plans are built against it
    pub fn set_viewport(&mut self, viewport: Viewport) {
        if viewport == self.viewport {
            return;
        }
        self.viewport = viewport;
        self.bounds = viewport.bounds();
        let resolver = self.resolver();
        for (i, p) in self.formation.iter_mut().enumerate() {
            *p = self.bounds.clamp_slot(i, *p, &self.tuning);
        }
        self.timeline.reclamp(&resolver);
        self.clamp_player();
        log::debug!("viewport now {:.0}x{:.0}", viewport.width, viewport.height);
    }

    /// Take pending events
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn banner_text(&self) -> Option<&str> {
        self.banner
            .as_ref()
            .filter(|b| self.last_frame_ms < b.until_ms)
            .map(|b| b.text.as_str())
    }

    pub(crate) fn show_banner(&mut self, text: String, now_ms: f64) {
        self.banner = Some(Banner {
            text,
            until_ms: now_ms + self.tuning.banner_ms,
        });
    }

    pub(crate) fn finish(&mut self, won: bool) {
        let score = self.score();
        let level = self.level();
        if won {
            self.phase = GamePhase::Won;
            log::info!("run won with {} points", score);
            self.events.push(GameEvent::Won);
        } else {
            self.phase = GamePhase::Lost;
            let message = DEFEAT_MESSAGES[self.rng_state.pick(DEFEAT_MESSAGES.len())].to_string();
            log::info!("run lost on level {} with {} points: {}", level, score, message);
            self.lose_message = Some(message.clone());
            self.events.push(GameEvent::Lost { message });
        }
        self.events.push(GameEvent::RunFinished { score, level, won });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> GameSession {
        GameSession::new(42, Viewport::new(360.0, 640.0), Tuning::default(), 0.0)
    }

    #[test]
    fn test_new_session() {
        let mut s = session();
        assert_eq!(s.phase, GamePhase::Running);
        assert_eq!(s.level(), 1);
        assert_eq!(s.formation.len(), MUSICIANS);
        assert_eq!(s.player.pos, s.formation[PLAYER_SLOT]);
        assert_eq!(s.drain_events(), vec![GameEvent::RunStarted]);
        assert!(s.drain_events().is_empty());
    }

    #[test]
    fn test_rng_state_deterministic() {
        let mut a = RngState::new(7);
        let mut b = RngState::new(7);
        let xs: Vec<usize> = (0..10).map(|_| a.pick(3)).collect();
        let ys: Vec<usize> = (0..10).map(|_| b.pick(3)).collect();
        assert_eq!(xs, ys);
        assert!(xs.iter().all(|&x| x < 3));
        assert_eq!(a.draws, 10);
    }

    #[test]
    fn test_finish_lost_emits_once_with_message() {
        let mut s = session();
        s.drain_events();
        s.finish(false);
        assert_eq!(s.phase, GamePhase::Lost);
        let events = s.drain_events();
        assert_eq!(events.len(), 2);
        let GameEvent::Lost { message } = &events[0] else {
            panic!("expected Lost, got {:?}", events[0]);
        };
        assert!(DEFEAT_MESSAGES.contains(&message.as_str()));
        assert!(matches!(events[1], GameEvent::RunFinished { won: false, level: 1, .. }));
    }

    #[test]
    fn test_restarts_vary_defeat_message() {
        let mut s = GameSession::new(12345, Viewport::new(360.0, 640.0), Tuning::default(), 0.0);
        let mut seeds = Vec::new();
        let mut messages = Vec::new();
        for round in 0..20 {
            s.finish(false);
            messages.extend(s.lose_message.clone());
            seeds.push(s.seed);
            s.restart(round as f64 * 1000.0);
        }
        seeds.dedup();
        assert_eq!(seeds.len(), 20);
        messages.sort();
        messages.dedup();
        assert!(messages.len() > 1, "every restart lost with {:?}", messages);
    }

    #[test]
    fn test_restart_seed_is_deterministic() {
        let mut a = session();
        let mut b = session();
        a.restart(0.0);
        b.restart(0.0);
        assert_eq!(a.seed, b.seed);
        assert_ne!(a.seed, 42);
    }

    #[test]
    fn test_resize_pulls_positions_in() {
        let mut s = session();
        s.player.pos = DVec2::new(470.0, 900.0);
        s.set_viewport(Viewport::new(320.0, 560.0));
        let r = s.resolver();
        assert!(r.in_bounds(&s.formation));
        assert!(s.bounds.contains(s.player.pos, s.tuning.zone_radius));
    }

    #[test]
    fn test_session_serializes() {
        let s = session();
        let json = serde_json::to_string(&s).unwrap();
        let back: GameSession = serde_json::from_str(&json).unwrap();
        assert_eq!(back.formation, s.formation);
        assert_eq!(back.level(), 1);
    }
}
