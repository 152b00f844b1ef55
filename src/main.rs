//! Parade Drill entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;

    use glam::DVec2;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, HtmlCanvasElement, PointerEvent};

    use parade_drill::audio::{AudioManager, SoundCue};
    use parade_drill::renderer::{RenderState, shapes};
    use parade_drill::sim::{
        GameEvent, GamePhase, GameSession, Joystick, RenderFrame, TickInput, Viewport, tick,
    };
    use parade_drill::{ControlScheme, HighScoreEntry, HighScores, Settings, Tuning};

    /// Dispatched on `window` after a finished run is stored
    const SCORE_SAVED_EVENT: &str = "parade:score-saved";

    /// Pointer currently steering the player
    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Gesture {
        Idle,
        Stick { pointer: i32 },
        Drag { pointer: i32 },
    }

    /// Game instance holding all state
    struct Game {
        session: Option<GameSession>,
        /// Start a run on the next animation frame (needs the frame clock)
        pending_start: bool,
        tuning: Tuning,
        settings: Settings,
        highscores: HighScores,
        audio: AudioManager,
        render_state: Option<RenderState>,
        viewport: Viewport,
        joystick: Joystick,
        input: TickInput,
        gesture: Gesture,
        knob: DVec2,
        last_countdown: Option<u32>,
    }

    impl Game {
        fn new(viewport: Viewport, settings: Settings) -> Self {
            let audio = AudioManager::new(&settings);
            let joystick = Joystick::for_viewport(&viewport, &viewport.bounds());
            Self {
                session: None,
                pending_start: false,
                tuning: Tuning::default(),
                settings,
                highscores: HighScores::load(),
                audio,
                render_state: None,
                viewport,
                joystick,
                input: TickInput::default(),
                gesture: Gesture::Idle,
                knob: joystick.center,
                last_countdown: None,
            }
        }

        fn start_run(&mut self) {
            self.audio.resume();
            self.pending_start = true;
        }

        fn back_to_menu(&mut self) {
            self.session = None;
            self.audio.stop_music();
            self.release_gesture();
        }

        fn release_gesture(&mut self) {
            self.gesture = Gesture::Idle;
            self.input.joystick = DVec2::ZERO;
            self.input.pointer_target = None;
            self.knob = self.joystick.center;
        }

        fn running(&self) -> bool {
            self.session
                .as_ref()
                .is_some_and(|s| s.phase == GamePhase::Running)
        }

        fn pointer_down(&mut self, p: DVec2, pointer: i32) {
            if !self.running() {
                return;
            }
            match self.settings.control {
                ControlScheme::Joystick if self.joystick.captures(p) => {
                    self.gesture = Gesture::Stick { pointer };
                    self.steer_stick(p);
                }
                ControlScheme::Joystick => {}
                ControlScheme::Drag => {
                    self.gesture = Gesture::Drag { pointer };
                    self.input.pointer_target = Some(p);
                }
            }
        }

        fn pointer_move(&mut self, p: DVec2, pointer: i32) {
            match self.gesture {
                Gesture::Stick { pointer: id } if id == pointer => self.steer_stick(p),
                Gesture::Drag { pointer: id } if id == pointer => {
                    self.input.pointer_target = Some(p);
                }
                _ => {}
            }
        }

        fn pointer_up(&mut self, pointer: i32) {
            match self.gesture {
                Gesture::Stick { pointer: id } | Gesture::Drag { pointer: id } if id == pointer => {
                    self.release_gesture();
                }
                _ => {}
            }
        }

        fn steer_stick(&mut self, p: DVec2) {
            self.input.joystick = self.joystick.deflection(p);
            self.knob = self.joystick.knob(p);
        }

        fn resize(&mut self, viewport: Viewport, physical: (u32, u32)) {
            self.viewport = viewport;
            self.joystick = Joystick::for_viewport(&viewport, &viewport.bounds());
            self.knob = self.joystick.center;
            if let Some(session) = &mut self.session {
                session.set_viewport(viewport);
            }
            if let Some(rs) = &mut self.render_state {
                rs.resize(physical.0, physical.1, &viewport);
            }
        }

        /// One animation frame
        fn update(&mut self, time: f64) {
            if self.pending_start {
                self.pending_start = false;
                let seed = js_sys::Date::now() as u64;
                self.session = Some(GameSession::new(seed, self.viewport, self.tuning.clone(), time));
                self.last_countdown = None;
                self.release_gesture();
            }

            let Some(session) = &mut self.session else {
                return;
            };
            tick(session, &self.input, time);
            self.input.restart = false;
            // Drag targets are one-shot; the player stays where it was put
            if !matches!(self.gesture, Gesture::Drag { .. }) {
                self.input.pointer_target = None;
            }

            let events = session.drain_events();
            let countdown = session.judge.countdown_secs(&session.tuning);
            for event in events {
                self.handle_event(event);
            }
            if countdown.is_some() && countdown != self.last_countdown {
                self.audio.play(SoundCue::OutOfZoneTick);
            }
            self.last_countdown = countdown;
        }

        fn handle_event(&mut self, event: GameEvent) {
            match event {
                GameEvent::RunStarted => self.audio.start_music(),
                GameEvent::LevelComplete { .. } => self.audio.play(SoundCue::LevelUp),
                GameEvent::Lost { .. } => {
                    self.audio.stop_music();
                    self.audio.play(SoundCue::Defeat);
                    self.release_gesture();
                }
                GameEvent::Won => {
                    self.audio.stop_music();
                    self.audio.play(SoundCue::Victory);
                    self.release_gesture();
                }
                GameEvent::RunFinished { score, level, won } => {
                    self.record_score(score, level, won);
                }
            }
        }

        fn record_score(&mut self, score: u64, level: u32, won: bool) {
            let entry = HighScoreEntry::new(
                &self.settings.player_name(),
                score,
                level,
                won,
                js_sys::Date::now(),
            );
            let rank = self.highscores.add_entry(entry.clone());
            if let Err(e) = self.highscores.save() {
                log::warn!("Could not store high scores: {}", e);
            }
            log::info!("Run recorded: {} points (rank {:?})", score, rank);
            dispatch_score_saved(&entry);
        }

        /// Render the current frame
        fn render(&mut self) {
            let Some(rs) = &mut self.render_state else {
                return;
            };
            let bounds = self.viewport.bounds();
            let mut vertices = shapes::field(&bounds);
            if let Some(session) = &self.session {
                vertices = shapes::frame_vertices(&session.frame(), &bounds);
                if session.phase == GamePhase::Running && self.settings.control == ControlScheme::Joystick {
                    vertices.extend(shapes::joystick(&self.joystick, self.knob));
                }
            }
            match rs.render(&vertices) {
                Ok(()) => {}
                Err(wgpu::SurfaceError::Lost) => {
                    let (w, h) = rs.size;
                    rs.resize(w, h, &self.viewport);
                }
                Err(wgpu::SurfaceError::OutOfMemory) => {
                    log::error!("Out of memory!");
                }
                Err(e) => log::warn!("Render error: {:?}", e),
            }
        }

        /// Update HUD elements in DOM
        fn update_hud(&self, document: &Document) {
            let Some(session) = &self.session else {
                set_hidden(document, "hud", true);
                set_hidden(document, "game-over", true);
                set_hidden(document, "win-screen", true);
                set_hidden(document, "main-menu", false);
                return;
            };
            let frame: RenderFrame = session.frame();
            set_hidden(document, "main-menu", true);
            set_hidden(document, "hud", false);

            set_text(document, "#hud-level .hud-value", &frame.level.to_string());
            set_text(document, "#hud-score .hud-value", &frame.score.to_string());

            set_hidden(document, "banner", frame.banner.is_none());
            if let Some(text) = &frame.banner {
                set_text(document, "#banner", text);
            }

            set_hidden(document, "countdown", frame.countdown_secs.is_none());
            if let Some(secs) = frame.countdown_secs {
                set_text(document, "#countdown", &secs.to_string());
            }

            set_hidden(document, "grace", !frame.in_grace);

            set_hidden(document, "game-over", frame.phase != GamePhase::Lost);
            set_hidden(document, "win-screen", frame.phase != GamePhase::Won);
            if frame.phase != GamePhase::Running {
                set_text(document, "#final-score", &frame.score.to_string());
                set_text(document, "#final-level", &frame.level.to_string());
            }
            if let Some(message) = &frame.lose_message {
                set_text(document, "#lose-message", message);
            }
        }
    }

    fn set_text(document: &Document, selector: &str, text: &str) {
        if let Some(el) = document.query_selector(selector).ok().flatten() {
            if el.text_content().as_deref() != Some(text) {
                el.set_text_content(Some(text));
            }
        }
    }

    fn set_hidden(document: &Document, id: &str, hidden: bool) {
        if let Some(el) = document.get_element_by_id(id) {
            let _ = el.class_list().toggle_with_force("hidden", hidden);
        }
    }

    fn dispatch_score_saved(entry: &HighScoreEntry) {
        let Some(window) = web_sys::window() else { return };
        let detail = match serde_json::to_string(entry) {
            Ok(json) => JsValue::from_str(&json),
            Err(e) => {
                log::warn!("Could not encode score event: {}", e);
                return;
            }
        };
        let init = web_sys::CustomEventInit::new();
        init.set_detail(&detail);
        match web_sys::CustomEvent::new_with_event_init_dict(SCORE_SAVED_EVENT, &init) {
            Ok(event) => {
                let _ = window.dispatch_event(&event);
            }
            Err(e) => log::warn!("Could not create score event: {:?}", e),
        }
    }

    /// Browser window size fitted into the supported portrait range
    fn fitted_viewport(window: &web_sys::Window) -> Viewport {
        let w = window.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(Viewport::MIN_WIDTH);
        let h = window.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(Viewport::MIN_HEIGHT);
        Viewport::fit(w, h)
    }

    /// Size the canvas element and its backing store; returns the physical size
    fn size_canvas(window: &web_sys::Window, canvas: &HtmlCanvasElement, viewport: &Viewport) -> (u32, u32) {
        let dpr = window.device_pixel_ratio().max(1.0);
        let width = (viewport.width * dpr).round() as u32;
        let height = (viewport.height * dpr).round() as u32;
        canvas.set_width(width);
        canvas.set_height(height);
        let _ = canvas.set_attribute(
            "style",
            &format!("width:{}px;height:{}px", viewport.width, viewport.height),
        );
        (width, height)
    }

    /// Pointer position in game pixels
    fn event_point(canvas: &HtmlCanvasElement, viewport: &Viewport, event: &PointerEvent) -> DVec2 {
        let rect = canvas.get_bounding_client_rect();
        let sx = if rect.width() > 0.0 { viewport.width / rect.width() } else { 1.0 };
        let sy = if rect.height() > 0.0 { viewport.height / rect.height() } else { 1.0 };
        DVec2::new(
            (event.client_x() as f64 - rect.left()) * sx,
            (event.client_y() as f64 - rect.top()) * sy,
        )
    }

    pub async fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        if let Err(e) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::warn_1(&format!("logger already set: {e}").into());
        }

        log::info!("Parade Drill starting...");

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .ok_or("no canvas")?
            .dyn_into()?;

        let viewport = fitted_viewport(&window);
        let (width, height) = size_canvas(&window, &canvas, &viewport);

        let game = Rc::new(RefCell::new(Game::new(viewport, Settings::load())));

        // Initialize WebGPU
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU | wgpu::Backends::GL,
            ..Default::default()
        });
        let surface = instance
            .create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::LowPower,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        log::info!("Using adapter: {:?}", adapter.get_info().name);

        let render_state = RenderState::new(surface, &adapter, width, height, &viewport)
            .await
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        game.borrow_mut().render_state = Some(render_state);

        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.class_list().add_1("hidden");
        }

        setup_input_handlers(&canvas, game.clone())?;
        setup_buttons(&document, game.clone())?;
        setup_resize(&canvas, game.clone())?;
        update_control_label(&document, &game.borrow().settings);

        request_animation_frame(game);

        log::info!("Parade Drill running!");
        Ok(())
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) -> Result<(), JsValue> {
        {
            let game = game.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                event.prevent_default();
                let mut g = game.borrow_mut();
                let p = event_point(&canvas_clone, &g.viewport, &event);
                g.pointer_down(p, event.pointer_id());
            });
            canvas.add_event_listener_with_callback("pointerdown", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        {
            let game = game.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                let mut g = game.borrow_mut();
                let p = event_point(&canvas_clone, &g.viewport, &event);
                g.pointer_move(p, event.pointer_id());
            });
            canvas.add_event_listener_with_callback("pointermove", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        for name in ["pointerup", "pointercancel", "pointerleave"] {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                game.borrow_mut().pointer_up(event.pointer_id());
            });
            canvas.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref())?;
            closure.forget();
        }
        Ok(())
    }

    fn on_click(
        document: &Document,
        id: &str,
        game: Rc<RefCell<Game>>,
        action: impl Fn(&mut Game) + 'static,
    ) -> Result<(), JsValue> {
        let Some(btn) = document.get_element_by_id(id) else {
            log::warn!("Missing button #{}", id);
            return Ok(());
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
            action(&mut game.borrow_mut());
        });
        btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
        closure.forget();
        Ok(())
    }

    fn update_control_label(document: &Document, settings: &Settings) {
        set_text(
            document,
            "#control-btn",
            &format!("Controls: {}", settings.control.as_str()),
        );
        set_text(document, "#mute-btn", if settings.muted { "Sound: off" } else { "Sound: on" });
    }

    fn setup_buttons(document: &Document, game: Rc<RefCell<Game>>) -> Result<(), JsValue> {
        on_click(document, "start-btn", game.clone(), Game::start_run)?;
        on_click(document, "restart-btn", game.clone(), |g| g.input.restart = true)?;
        on_click(document, "menu-btn", game.clone(), Game::back_to_menu)?;

        let doc = document.clone();
        on_click(document, "control-btn", game.clone(), move |g| {
            g.settings.control = g.settings.control.toggled();
            g.release_gesture();
            if let Err(e) = g.settings.save() {
                log::warn!("Could not store settings: {}", e);
            }
            update_control_label(&doc, &g.settings);
        })?;

        let doc = document.clone();
        on_click(document, "mute-btn", game, move |g| {
            g.settings.muted = !g.settings.muted;
            g.audio.apply_settings(&g.settings);
            if let Err(e) = g.settings.save() {
                log::warn!("Could not store settings: {}", e);
            }
            update_control_label(&doc, &g.settings);
        })?;
        Ok(())
    }

    fn setup_resize(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) -> Result<(), JsValue> {
        let window = web_sys::window().ok_or("no window")?;
        let canvas = canvas.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let Some(window) = web_sys::window() else { return };
            let viewport = fitted_viewport(&window);
            let physical = size_canvas(&window, &canvas, &viewport);
            game.borrow_mut().resize(viewport, physical);
        });
        window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref())?;
        closure.forget();
        Ok(())
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else { return };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();
            g.update(time);
            g.render();
            if let Some(document) = web_sys::window().and_then(|w| w.document()) {
                g.update_hud(&document);
            }
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() -> Result<(), JsValue> {
    wasm_game::run().await
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    log::info!("Parade Drill (native) starting...");
    log::info!("Native mode runs a headless demo - use `trunk serve` for the web version");

    // parade-drill [seed] [tuning.json]
    let mut args = std::env::args().skip(1);
    let seed = match args.next() {
        Some(s) => s.parse()?,
        None => 1,
    };
    let tuning = match args.next() {
        Some(path) => parade_drill::Tuning::from_json(&std::fs::read_to_string(path)?)?,
        None => parade_drill::Tuning::default(),
    };

    demo_run(seed, tuning);
    Ok(())
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Play a whole run with a perfect follower at 60 fps and report it
#[cfg(not(target_arch = "wasm32"))]
fn demo_run(seed: u64, tuning: parade_drill::Tuning) {
    use parade_drill::consts::{NOMINAL_FRAME_MS, PLAYER_SLOT};
    use parade_drill::sim::{GameEvent, GamePhase, GameSession, TickInput, Viewport, tick};

    let mut session = GameSession::new(seed, Viewport::new(360.0, 640.0), tuning, 0.0);
    let mut now = 0.0;
    while session.phase == GamePhase::Running {
        now += NOMINAL_FRAME_MS;
        let slot = session.formation[PLAYER_SLOT];
        let feet_gap = session.zone_center() - session.player.body.feet(slot);
        let input = TickInput {
            pointer_target: Some(slot + feet_gap),
            ..Default::default()
        };
        tick(&mut session, &input, now);

        for event in session.drain_events() {
            match event {
                GameEvent::LevelComplete { next, .. } => {
                    println!("{:>7.1}s  level {} ({})", now / 1000.0, next, session.timeline.plan.shape.name());
                }
                GameEvent::Lost { message } => println!("{:>7.1}s  lost: {}", now / 1000.0, message),
                GameEvent::Won => println!("{:>7.1}s  won", now / 1000.0),
                GameEvent::RunFinished { score, level, won } => {
                    println!("final: {} points, level {}, won: {}", score, level, won);
                }
                GameEvent::RunStarted => {}
            }
        }
    }
}
