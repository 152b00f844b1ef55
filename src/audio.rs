//! Audio using the Web Audio API
//!
//! A looping march plays under the run; short cues are generated with
//! oscillators so they need no asset files.

use web_sys::{AudioContext, GainNode, HtmlAudioElement, OscillatorNode, OscillatorType};

use crate::settings::Settings;

/// Background march, relative to the page
const MUSIC_SRC: &str = "assets/march.ogg";

/// Cue types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundCue {
    /// New level reached
    LevelUp,
    /// Once per countdown second while out of the zone
    OutOfZoneTick,
    /// Countdown ran out
    Defeat,
    /// Last level completed
    Victory,
}

/// One note of a cue
struct Note {
    freq: f32,
    /// Offset from the cue start (s)
    at: f64,
    /// Time to fade to silence (s)
    decay: f64,
    gain: f32,
}

const fn note(freq: f32, at: f64, decay: f64, gain: f32) -> Note {
    Note { freq, at, decay, gain }
}

const LEVEL_UP: [Note; 3] = [
    note(523.0, 0.0, 0.18, 0.3),
    note(659.0, 0.09, 0.18, 0.3),
    note(784.0, 0.18, 0.3, 0.3),
];
const OUT_OF_ZONE_TICK: [Note; 1] = [note(880.0, 0.0, 0.06, 0.2)];
const DEFEAT: [Note; 4] = [
    note(392.0, 0.0, 0.3, 0.3),
    note(349.0, 0.2, 0.3, 0.3),
    note(311.0, 0.4, 0.3, 0.3),
    note(196.0, 0.6, 0.6, 0.35),
];
const VICTORY: [Note; 5] = [
    note(523.0, 0.0, 0.15, 0.25),
    note(523.0, 0.12, 0.15, 0.25),
    note(523.0, 0.24, 0.15, 0.25),
    note(659.0, 0.36, 0.3, 0.3),
    note(784.0, 0.6, 0.6, 0.3),
];

/// Audio manager for the game
pub struct AudioManager {
    ctx: Option<AudioContext>,
    music: Option<HtmlAudioElement>,
    music_gain: f32,
    sfx_gain: f32,
}

impl AudioManager {
    pub fn new(settings: &Settings) -> Self {
        // May fail outside a secure context
        let ctx = AudioContext::new().ok();
        if ctx.is_none() {
            log::warn!("Failed to create AudioContext - cues disabled");
        }
        let music = HtmlAudioElement::new_with_src(MUSIC_SRC).ok();
        match &music {
            Some(el) => el.set_loop(true),
            None => log::warn!("Failed to create music element - music disabled"),
        }
        let mut manager = Self {
            ctx,
            music,
            music_gain: 0.0,
            sfx_gain: 0.0,
        };
        manager.apply_settings(settings);
        manager
    }

    /// Pick up volume and mute changes
    pub fn apply_settings(&mut self, settings: &Settings) {
        self.music_gain = settings.music_gain();
        self.sfx_gain = settings.sfx_gain();
        if let Some(music) = &self.music {
            music.set_volume(self.music_gain as f64);
        }
    }

    /// Resume audio context (required after user gesture)
    pub fn resume(&self) {
        if let Some(ctx) = &self.ctx {
            let _ = ctx.resume();
        }
    }

    /// Restart the march from the top
    pub fn start_music(&self) {
        let Some(music) = &self.music else { return };
        music.set_current_time(0.0);
        if let Err(e) = music.play() {
            log::warn!("Music playback refused: {:?}", e);
        }
    }

    pub fn stop_music(&self) {
        if let Some(music) = &self.music {
            let _ = music.pause();
        }
    }

    /// Play a cue
    pub fn play(&self, cue: SoundCue) {
        if self.sfx_gain <= 0.0 {
            return;
        }
        let Some(ctx) = &self.ctx else { return };

        // Browsers keep the context suspended until a user gesture
        if ctx.state() == web_sys::AudioContextState::Suspended {
            let _ = ctx.resume();
        }

        let (notes, wave): (&[Note], OscillatorType) = match cue {
            SoundCue::LevelUp => (&LEVEL_UP, OscillatorType::Triangle),
            SoundCue::OutOfZoneTick => (&OUT_OF_ZONE_TICK, OscillatorType::Square),
            SoundCue::Defeat => (&DEFEAT, OscillatorType::Sine),
            SoundCue::Victory => (&VICTORY, OscillatorType::Triangle),
        };
        for n in notes {
            self.play_note(ctx, n, wave);
        }
    }

    /// Create an oscillator with gain envelope
    fn create_osc(
        &self,
        ctx: &AudioContext,
        freq: f32,
        osc_type: OscillatorType,
    ) -> Option<(OscillatorNode, GainNode)> {
        let osc = ctx.create_oscillator().ok()?;
        let gain = ctx.create_gain().ok()?;

        osc.set_type(osc_type);
        osc.frequency().set_value(freq);
        osc.connect_with_audio_node(&gain).ok()?;
        gain.connect_with_audio_node(&ctx.destination()).ok()?;

        Some((osc, gain))
    }

    fn play_note(&self, ctx: &AudioContext, note: &Note, wave: OscillatorType) {
        let Some((osc, gain)) = self.create_osc(ctx, note.freq, wave) else {
            return;
        };
        let t = ctx.current_time() + note.at;
        gain.gain().set_value_at_time(self.sfx_gain * note.gain, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + note.decay)
            .ok();
        osc.start_with_when(t).ok();
        osc.stop_with_when(t + note.decay + 0.05).ok();
    }
}
