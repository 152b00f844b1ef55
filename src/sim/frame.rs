//! Read-only snapshot handed to the renderer and HUD each frame

use glam::DVec2;

use super::state::{GamePhase, GameSession};
use crate::consts::PLAYER_SLOT;

#[derive(Debug, Clone, PartialEq)]
pub struct RenderFrame {
    /// Formation sprite origins (index 12 is the empty slot)
    pub agents: Vec<DVec2>,
    pub agent_feet: Vec<DVec2>,
    pub npc_scale: f64,
    pub player: DVec2,
    pub player_feet: DVec2,
    pub player_scale: f64,
    pub zone_center: DVec2,
    pub zone_radius: f64,
    pub in_zone: bool,
    pub in_grace: bool,
    pub level: u32,
    pub score: u64,
    pub phase: GamePhase,
    pub banner: Option<String>,
    /// Seconds left before losing, while outside the zone
    pub countdown_secs: Option<u32>,
    pub lose_message: Option<String>,
}

impl RenderFrame {
    /// NPC origins paired with their feet, skipping the player's slot
    pub fn npcs_with_feet(&self) -> impl Iterator<Item = (DVec2, DVec2)> + '_ {
        self.agents
            .iter()
            .zip(&self.agent_feet)
            .enumerate()
            .filter(|&(i, _)| i != PLAYER_SLOT)
            .map(|(_, (&p, &f))| (p, f))
    }
}

impl GameSession {
    /// Snapshot of what to draw now
    pub fn frame(&self) -> RenderFrame {
        RenderFrame {
            agents: self.formation.clone(),
            agent_feet: self.formation.iter().map(|&p| self.npc_body.feet(p)).collect(),
            npc_scale: self.npc_body.render_scale,
            player: self.player.pos,
            player_feet: self.player_feet(),
            player_scale: self.player.body.render_scale,
            zone_center: self.zone_center(),
            zone_radius: self.tuning.zone_radius,
            in_zone: self.judge.in_zone,
            in_grace: self.judge.in_grace(self.last_frame_ms),
            level: self.level(),
            score: self.score(),
            phase: self.phase,
            banner: self.banner_text().map(str::to_owned),
            countdown_secs: self.judge.countdown_secs(&self.tuning),
            lose_message: self.lose_message.clone(),
        }
    }
}
