use crate::api::error::EngineError;
use crate::api::types::BorderMode;
use crate::assets::registry::ShapeRegistry;
use crate::audio::{NullSound, SoundSystem};
use crate::core::rng::Rng;
use crate::core::world::World;
use crate::events::bus::{EventBus, EventQueue};
use crate::events::event::Event;
use crate::input::queue::{InputEvent, KeyCode};
use crate::renderer::drawable::{Drawable, RenderSnapshot};
use crate::renderer::traits::FrameData;

/// Configuration for the engine, provided by the game.
#[derive(Debug, Clone)]
pub struct GameConfig {
    /// Play field width in cells (default: 78).
    pub world_width: i32,
    /// Play field height in cells (default: 20).
    pub world_height: i32,
    /// Whether the border blocks entities (default: Solid).
    pub border_mode: BorderMode,
    /// Seconds per tick (default: 0.05, i.e. 20 ticks per second).
    pub tick_seconds: f32,
    /// Key that stops the engine (default: 'q').
    pub quit_key: Option<KeyCode>,
    /// Key that toggles sound (default: 'm').
    pub mute_key: Option<KeyCode>,
    /// Seed for the game RNG (default: 42).
    pub seed: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            world_width: 78,
            world_height: 20,
            border_mode: BorderMode::Solid,
            tick_seconds: 0.05,
            quit_key: Some(KeyCode::from_char('q')),
            mute_key: Some(KeyCode::from_char('m')),
            seed: 42,
        }
    }
}

/// The core contract every game must fulfill.
pub trait Game: Sized + 'static {
    /// Return engine configuration. Called once, before init.
    fn config(&self) -> GameConfig {
        GameConfig::default()
    }

    /// Register shapes and event handlers, spawn the initial entities.
    /// Errors here are configuration errors and abort startup.
    fn init(&mut self, setup: &mut Setup<'_, Self>) -> Result<(), EngineError>;

    /// Per-tick game logic, run before the world's own pipeline.
    /// React to input, spawn entities, update status text.
    fn update(&mut self, sim: &mut Simulation, input: &InputEvent, events: &mut EventQueue);
}

/// Everything a game may configure during [`Game::init`].
pub struct Setup<'a, G> {
    pub sim: &'a mut Simulation,
    pub assets: &'a mut ShapeRegistry,
    pub bus: &'a mut EventBus<EngineContext<G>>,
}

/// Shared simulation state: the world plus session-level game state.
pub struct Simulation {
    pub world: World,
    pub rng: Rng,
    sound: Box<dyn SoundSystem>,
    quit: bool,
    game_over: bool,
    won: bool,
    level: u32,
    score: i64,
}

impl Simulation {
    pub fn new(config: &GameConfig) -> Self {
        Self {
            world: World::new(config.world_width, config.world_height, config.border_mode),
            rng: Rng::new(config.seed),
            sound: Box::new(NullSound::new()),
            quit: false,
            game_over: false,
            won: false,
            level: 1,
            score: 0,
        }
    }

    /// Play a sound unless muted.
    pub fn play_sound(&mut self, sound_id: &str) {
        if !self.sound.is_muted() {
            self.sound.play(sound_id);
        }
    }

    pub fn set_sound_system(&mut self, sound: Box<dyn SoundSystem>) {
        self.sound.stop_all();
        self.sound = sound;
    }

    pub fn sound(&self) -> &dyn SoundSystem {
        self.sound.as_ref()
    }

    pub fn toggle_mute(&mut self) {
        self.sound.toggle_mute();
        log::info!("sound {}", if self.sound.is_muted() { "muted" } else { "unmuted" });
    }

    pub fn is_quit(&self) -> bool {
        self.quit
    }

    pub fn set_quit(&mut self, quit: bool) {
        self.quit = quit;
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    pub fn is_won(&self) -> bool {
        self.won
    }

    /// End the session. Later calls keep the first outcome.
    pub fn finish(&mut self, won: bool) {
        if self.game_over {
            return;
        }
        self.game_over = true;
        self.won = won;
    }

    /// Clear the game-over state, e.g. when restarting.
    pub fn reset_game_over(&mut self) {
        self.game_over = false;
        self.won = false;
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn set_level(&mut self, level: u32) {
        self.level = level;
    }

    pub fn score(&self) -> i64 {
        self.score
    }

    pub fn set_score(&mut self, score: i64) {
        self.score = score;
    }

    pub fn add_score(&mut self, delta: i64) {
        self.score += delta;
    }
}

/// Mutable state handed to event handlers.
pub struct EngineContext<G> {
    pub game: G,
    pub sim: Simulation,
}

/// Simulation driver: owns the game, the world, the event bus and the shapes,
/// and runs one tick of the pipeline per [`tick`](Self::tick) call.
pub struct Engine<G: Game> {
    ctx: EngineContext<G>,
    bus: EventBus<EngineContext<G>>,
    assets: ShapeRegistry,
    config: GameConfig,
    snapshot: RenderSnapshot,
    initialized: bool,
}

impl<G: Game> Engine<G> {
    pub fn new(game: G) -> Self {
        let config = game.config();
        Self::with_config(game, config)
    }

    /// Build with a config other than the game's own, e.g. after command-line
    /// overrides.
    pub fn with_config(game: G, config: GameConfig) -> Self {
        let sim = Simulation::new(&config);

        let mut bus: EventBus<EngineContext<G>> = EventBus::new();
        bus.subscribe(Event::SOUND, |event, ctx: &mut EngineContext<G>, _| {
            if let Event::Sound { sound_id } = event {
                ctx.sim.play_sound(sound_id);
            }
        });
        bus.subscribe(Event::GAME_OVER, |event, ctx: &mut EngineContext<G>, _| {
            if let Event::GameOver { won, reason } = event {
                if !ctx.sim.is_game_over() {
                    log::info!("game over (won: {won}) {reason}");
                }
                ctx.sim.finish(*won);
            }
        });

        Self {
            ctx: EngineContext { game, sim },
            bus,
            assets: ShapeRegistry::new(),
            config,
            snapshot: RenderSnapshot::default(),
            initialized: false,
        }
    }

    /// Let the game build its initial state. Call once before ticking.
    pub fn init(&mut self) -> Result<(), EngineError> {
        let EngineContext { game, sim } = &mut self.ctx;
        let mut setup = Setup {
            sim,
            assets: &mut self.assets,
            bus: &mut self.bus,
        };
        game.init(&mut setup)?;
        self.initialized = true;
        log::info!(
            "engine initialized: {}x{} world, {} entities, {} shapes",
            self.config.world_width,
            self.config.world_height,
            self.ctx.sim.world.entity_count(),
            self.assets.len()
        );
        Ok(())
    }

    /// Run one tick: engine keys, game logic, world pipeline, event delivery.
    /// Does nothing before init or after quit. Once the game is over the
    /// world stops moving but events still flow.
    pub fn tick(&mut self, input: InputEvent) {
        if !self.initialized || self.ctx.sim.is_quit() {
            return;
        }

        if let Some(key) = input.key() {
            if key_matches(key, self.config.quit_key) {
                log::info!("quit requested");
                self.ctx.sim.set_quit(true);
                return;
            }
            if key_matches(key, self.config.mute_key) {
                self.ctx.sim.toggle_mute();
            }
        }

        let EngineContext { game, sim } = &mut self.ctx;
        game.update(sim, &input, self.bus.queue_mut());
        if !sim.is_game_over() {
            sim.world.step(&input, self.bus.queue_mut());
        }

        self.bus.process_events(&mut self.ctx);
    }

    /// Rebuild and return the render snapshot for the current state.
    pub fn snapshot(&mut self) -> &RenderSnapshot {
        let world = &self.ctx.sim.world;
        world.collect_drawables(&mut self.snapshot.drawables);
        self.snapshot.status.clear();
        world.collect_status_lines(&mut self.snapshot.status);
        self.snapshot.tick = world.tick_count();
        &self.snapshot
    }

    /// Snapshot plus the shapes it references, ready for a renderer.
    pub fn frame(&mut self) -> FrameData<'_> {
        self.snapshot();
        FrameData {
            snapshot: &self.snapshot,
            assets: &self.assets,
            world_width: self.ctx.sim.world.width(),
            world_height: self.ctx.sim.world.height(),
        }
    }

    pub fn collect_drawables(&self) -> Vec<Drawable> {
        let mut out = Vec::new();
        self.ctx.sim.world.collect_drawables(&mut out);
        out
    }

    pub fn collect_status(&self) -> Vec<String> {
        self.ctx.sim.world.status_lines().to_vec()
    }

    /// Queue an event for the next delivery pass.
    pub fn emit(&mut self, event: Event) {
        self.bus.emit(event);
    }

    pub fn set_sound_system(&mut self, sound: Box<dyn SoundSystem>) {
        self.ctx.sim.set_sound_system(sound);
    }

    // -- Accessors --

    pub fn events(&mut self) -> &mut EventBus<EngineContext<G>> {
        &mut self.bus
    }

    pub fn world(&self) -> &World {
        &self.ctx.sim.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.ctx.sim.world
    }

    pub fn sim(&self) -> &Simulation {
        &self.ctx.sim
    }

    pub fn sim_mut(&mut self) -> &mut Simulation {
        &mut self.ctx.sim
    }

    pub fn game(&self) -> &G {
        &self.ctx.game
    }

    pub fn game_mut(&mut self) -> &mut G {
        &mut self.ctx.game
    }

    /// Game and simulation together, for code that needs both at once.
    pub fn context_mut(&mut self) -> &mut EngineContext<G> {
        &mut self.ctx
    }

    pub fn assets(&self) -> &ShapeRegistry {
        &self.assets
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn is_quit(&self) -> bool {
        self.ctx.sim.is_quit()
    }

    pub fn is_game_over(&self) -> bool {
        self.ctx.sim.is_game_over()
    }
}

/// Letter keys match regardless of case.
fn key_matches(key: KeyCode, binding: Option<KeyCode>) -> bool {
    match binding {
        Some(bound) => match bound.as_char() {
            Some(c) if c.is_ascii_alphabetic() => key.is_char_ignore_case(c),
            _ => key == bound,
        },
        None => false,
    }
}
