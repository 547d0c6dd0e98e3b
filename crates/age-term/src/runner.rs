use age_engine::{
    Clock, Engine, EngineError, Game, GameConfig, InputEvent, InputQueue, Renderer,
};

use crate::input::KeySource;

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Quit,
    GameOver { won: bool },
    TickLimit,
}

/// Totals reported after a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub outcome: RunOutcome,
    pub ticks: u64,
    pub score: i64,
    pub level: u32,
}

/// Generic game runner that wires up the engine loop.
///
/// Each tick: collect pending keys, pop one input, run the engine tick, draw
/// the frame, then sleep until the next tick boundary.
pub struct GameRunner<G: Game, R: Renderer> {
    engine: Engine<G>,
    renderer: R,
    input: InputQueue,
    clock: Clock,
    exit_on_game_over: bool,
    initialized: bool,
}

impl<G: Game, R: Renderer> GameRunner<G, R>
where
    R::Error: std::error::Error + Send + Sync + 'static,
{
    pub fn new(game: G, renderer: R) -> Self {
        let config = game.config();
        Self::with_config(game, config, renderer)
    }

    pub fn with_config(game: G, config: GameConfig, renderer: R) -> Self {
        let engine = Engine::with_config(game, config);
        let clock = Clock::from_secs_f32(engine.config().tick_seconds);
        Self {
            engine,
            renderer,
            input: InputQueue::new(),
            clock,
            exit_on_game_over: false,
            initialized: false,
        }
    }

    /// Override the tick duration from the game config.
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// End the run as soon as the game is over instead of waiting for quit.
    pub fn exit_on_game_over(mut self) -> Self {
        self.exit_on_game_over = true;
        self
    }

    /// Initialize the game. Call once after construction.
    pub fn init(&mut self) -> Result<(), EngineError> {
        self.engine.init()?;
        self.initialized = true;
        log::info!("{} runner ready", self.renderer.backend());
        Ok(())
    }

    /// Push an input event into the queue.
    pub fn push_input(&mut self, event: InputEvent) {
        self.input.push(event);
    }

    /// Run one tick and draw the result.
    pub fn tick(&mut self) -> anyhow::Result<()> {
        if !self.initialized {
            return Ok(());
        }
        let input = self.input.next_tick();
        self.engine.tick(input);
        if !self.engine.is_quit() {
            self.renderer.draw(&self.engine.frame())?;
        }
        Ok(())
    }

    /// Loop until quit, an interrupt from the key source, or `max_ticks`
    /// ticks. After game over the final frame
    /// stays up until the player quits, unless the runner was built with
    /// [`exit_on_game_over`](Self::exit_on_game_over) or the key source closed.
    pub fn run(
        &mut self,
        keys: &mut dyn KeySource,
        max_ticks: Option<u64>,
    ) -> anyhow::Result<RunSummary> {
        if !self.initialized {
            self.init()?;
        }
        self.renderer.draw(&self.engine.frame())?;
        self.clock.reset();

        let mut ticks = 0u64;
        let outcome = loop {
            if max_ticks.is_some_and(|max| ticks >= max) {
                break RunOutcome::TickLimit;
            }
            self.clock.sleep_until_next_tick();

            keys.poll(&mut self.input);
            if keys.interrupted() {
                break RunOutcome::Quit;
            }
            self.tick()?;
            ticks += 1;

            let game_over = self.engine.is_game_over();
            if self.engine.is_quit() || (game_over && (self.exit_on_game_over || keys.is_closed())) {
                break if game_over {
                    RunOutcome::GameOver {
                        won: self.engine.sim().is_won(),
                    }
                } else {
                    RunOutcome::Quit
                };
            }
        };

        let summary = RunSummary {
            outcome,
            ticks,
            score: self.engine.sim().score(),
            level: self.engine.sim().level(),
        };
        log::info!("run finished after {} ticks: {:?}", ticks, outcome);
        Ok(summary)
    }

    pub fn engine(&self) -> &Engine<G> {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut Engine<G> {
        &mut self.engine
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use age_engine::{
        EngineContext, EntityId, Event, EventQueue, FrameData, KeyCode, Movement, Position,
        Setup, Simulation,
    };
    use crate::input::ScriptedKeys;

    /// Ends the game once the walker has moved five cells.
    struct Walk;

    impl Game for Walk {
        fn init(&mut self, setup: &mut Setup<'_, Self>) -> Result<(), EngineError> {
            let dot = setup.assets.register("dot", vec!["o".into()])?;
            setup
                .sim
                .world
                .create_entity(EntityId(1), "walker", Position::new(1, 1), Some(dot))?
                .add_movement(Movement::straight(1.0, 0.0));
            setup.bus.subscribe("walked", |_, ctx: &mut EngineContext<Walk>, _| {
                ctx.sim.add_score(10);
            });
            Ok(())
        }

        fn update(&mut self, sim: &mut Simulation, _input: &InputEvent, events: &mut EventQueue) {
            let x = sim.world.find_entity(EntityId(1)).map_or(0, |e| e.position().x);
            if x == 5 {
                events.push(Event::custom("walked", 1));
                events.push(Event::game_over(true, "walked far enough"));
            }
        }
    }

    #[derive(Default)]
    struct CountingView {
        frames: usize,
    }

    impl Renderer for CountingView {
        type Error = std::io::Error;

        fn backend(&self) -> &'static str {
            "counting"
        }

        fn draw(&mut self, frame: &FrameData<'_>) -> Result<(), Self::Error> {
            assert_eq!(frame.snapshot.drawables.len(), 1);
            self.frames += 1;
            Ok(())
        }
    }

    fn runner() -> GameRunner<Walk, CountingView> {
        GameRunner::new(Walk, CountingView::default())
            .with_clock(Clock::new(Duration::ZERO))
            .exit_on_game_over()
    }

    #[test]
    fn runs_until_game_over() {
        let mut runner = runner();
        let summary = runner.run(&mut ScriptedKeys::default(), Some(100)).unwrap();
        assert_eq!(summary.outcome, RunOutcome::GameOver { won: true });
        assert_eq!(summary.score, 10);
        // Walker reaches x 5 after four ticks; the game sees it on tick five.
        assert_eq!(summary.ticks, 5);
        // Initial frame plus one per tick.
        assert_eq!(runner.renderer().frames, 6);
    }

    #[test]
    fn stops_at_tick_limit() {
        let mut runner = runner();
        let summary = runner.run(&mut ScriptedKeys::default(), Some(2)).unwrap();
        assert_eq!(summary.outcome, RunOutcome::TickLimit);
        assert_eq!(summary.ticks, 2);
    }

    #[test]
    fn quit_key_ends_the_run() {
        let mut runner = runner();
        let mut keys = ScriptedKeys::new(vec![InputEvent::Key(KeyCode::from_char('q'))]);
        let summary = runner.run(&mut keys, Some(100)).unwrap();
        assert_eq!(summary.outcome, RunOutcome::Quit);
        assert_eq!(summary.ticks, 1);
    }

    /// Interrupts on the third poll.
    #[derive(Default)]
    struct CtrlC {
        polls: u32,
    }

    impl KeySource for CtrlC {
        fn poll(&mut self, _queue: &mut InputQueue) {
            self.polls += 1;
        }

        fn interrupted(&self) -> bool {
            self.polls >= 3
        }
    }

    #[test]
    fn interrupt_ends_the_run_before_ticking() {
        let mut runner = runner();
        let summary = runner.run(&mut CtrlC::default(), Some(100)).unwrap();
        assert_eq!(summary.outcome, RunOutcome::Quit);
        assert_eq!(summary.ticks, 2);
        assert_eq!(runner.engine().world().tick_count(), 2);
    }

    #[test]
    fn final_frame_stays_until_quit() {
        let mut runner = GameRunner::new(Walk, CountingView::default())
            .with_clock(Clock::new(Duration::ZERO));
        let summary = runner.run(&mut ScriptedKeys::default(), Some(8)).unwrap();
        assert_eq!(summary.outcome, RunOutcome::TickLimit);
        assert!(runner.engine().is_game_over());
        // The world froze at game over.
        assert_eq!(runner.engine().world().tick_count(), 5);
    }
}
