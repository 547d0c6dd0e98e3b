use age_engine::*;

const MANIFEST: &str = include_str!("../assets/shapes.json");

const WORLD_W: i32 = 78;
const WORLD_H: i32 = 20;

const BIRD_X: i32 = 10;
const BIRD_START_Y: i32 = 8;
const FALL_SPEED: f32 = 0.5;
const FLAP_HEIGHT: i32 = 3;

const PIPE_WIDTH: i32 = 4;
const PIPE_GAP: i32 = 6;
const PIPE_SPEED: f32 = -0.5;
/// Shortest pipe segment at either end of the gap.
const MIN_PIPE: i32 = 2;
const FIRST_PIPE_TICKS: u32 = 60;
const PIPE_INTERVAL_TICKS: u32 = 40;

pub const BIRD_TAG: &str = "bird";
pub const PIPE_TAG: &str = "pipe";
pub const GAP_TAG: &str = "gap";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FlappyAction {
    None,
    Flap,
}

/// Keep the bird airborne and thread it through the gaps between pipes.
/// One point per gap passed; touching a pipe or the ground ends the game.
pub struct FlappyBird {
    bird: Option<EntityId>,
    next_id: u32,
    pipe_timer: u32,
    lost: bool,
    /// Pipe segment shapes, indexed by height - 1.
    top_pipes: Vec<ShapeHandle>,
    bottom_pipes: Vec<ShapeHandle>,
}

impl FlappyBird {
    pub fn new() -> Self {
        Self {
            bird: None,
            next_id: 1,
            pipe_timer: FIRST_PIPE_TICKS,
            lost: false,
            top_pipes: Vec::new(),
            bottom_pipes: Vec::new(),
        }
    }

    pub fn is_lost(&self) -> bool {
        self.lost
    }

    fn next_id(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        id
    }

    fn translate_input(input: &InputEvent) -> FlappyAction {
        match input.key() {
            Some(key) if key == KeyCode::UP || key == KeyCode::SPACE || key.is_char_ignore_case('w') => {
                FlappyAction::Flap
            }
            _ => FlappyAction::None,
        }
    }

    fn flap(&mut self, sim: &mut Simulation, events: &mut EventQueue) {
        if self.lost {
            return;
        }
        let Some(bird) = self.bird.and_then(|id| sim.world.find_entity_mut(id)) else {
            return;
        };
        if !bird.is_alive() {
            return;
        }
        bird.move_by(0, -FLAP_HEIGHT);
        events.push(Event::sound("flap"));
    }

    fn spawn_bird(&mut self, setup: &mut Setup<'_, Self>) -> Result<(), EngineError> {
        let shape = setup.assets.require("bird")?;
        let animation = setup
            .assets
            .animation("bird_idle")
            .ok_or_else(|| EngineError::UnknownShape("bird_idle".into()))?;
        let id = self.next_id();
        let bird = Entity::new(id)
            .with_tag(BIRD_TAG)
            .with_pos(BIRD_X, BIRD_START_Y)
            .with_shape(shape)
            .with_hitbox(setup.assets.hitbox_of(shape))
            .with_animation(animation)
            .with_solidity(Solidity::Solid)
            .with_movement(Movement::gravity(FALL_SPEED))
            .with_z(1)
            .with_on_collision(bird_hit);
        setup.sim.world.add_entity(bird)?;
        setup.sim.world.set_player(id)?;
        self.bird = Some(id);
        Ok(())
    }

    /// Spawn a top pipe, a bottom pipe and the invisible score trigger
    /// between them at the right edge. `gap_y` is the first open row.
    fn spawn_pipe_pair(&mut self, sim: &mut Simulation, gap_y: i32) -> Result<(), EngineError> {
        let height = sim.world.height();
        let x = sim.world.width() - PIPE_WIDTH;
        let bottom_y = gap_y + PIPE_GAP;
        let bottom_h = height - bottom_y;

        if let Some(&shape) = usize::try_from(gap_y - 1).ok().and_then(|i| self.top_pipes.get(i)) {
            let id = self.next_id();
            sim.world.add_entity(pipe(id, shape, x, 0, gap_y))?;
        }
        if let Some(&shape) = usize::try_from(bottom_h - 1).ok().and_then(|i| self.bottom_pipes.get(i)) {
            let id = self.next_id();
            sim.world.add_entity(pipe(id, shape, x, bottom_y, bottom_h))?;
        }

        let id = self.next_id();
        let gap = Entity::new(id)
            .with_tag(GAP_TAG)
            .with_pos(x + PIPE_WIDTH - 1, gap_y)
            .with_hitbox(Hitbox::from_size(1, PIPE_GAP))
            .with_solidity(Solidity::Trigger)
            .with_movement(Movement::straight(PIPE_SPEED, 0.0))
            .with_on_collision(gap_passed);
        sim.world.add_entity(gap)?;
        log::debug!("pipe pair spawned with gap at row {}", gap_y);
        Ok(())
    }

    fn update_pipes(&mut self, sim: &mut Simulation) {
        self.pipe_timer = self.pipe_timer.saturating_sub(1);
        if self.pipe_timer > 0 {
            return;
        }
        self.pipe_timer = PIPE_INTERVAL_TICKS;

        let gap_y = sim.rng.range(MIN_PIPE, sim.world.height() - PIPE_GAP - MIN_PIPE);
        if let Err(err) = self.spawn_pipe_pair(sim, gap_y) {
            log::warn!("could not spawn pipes: {err}");
        }
    }

    fn update_status_lines(&self, sim: &mut Simulation) {
        let lines = if self.lost {
            vec![
                "=== GAME OVER ===".to_string(),
                format!("Final Score: {}", sim.score()),
                "Press 'q' to quit".to_string(),
            ]
        } else {
            vec![
                format!("FLAPPY BIRD | Score: {}", sim.score()),
                "Press SPACE or UP to flap".to_string(),
                "Press 'q' to quit | 'm' to toggle mute".to_string(),
            ]
        };
        sim.world.set_status_lines(lines);
    }

    fn setup_event_handlers(bus: &mut EventBus<EngineContext<Self>>) {
        bus.subscribe(Event::COLLISION, |event, ctx: &mut EngineContext<Self>, out| {
            let Event::Collision(c) = event else {
                return;
            };
            if c.is_between(BIRD_TAG, PIPE_TAG) {
                trigger_game_over(ctx, out, "hit a pipe");
            } else if c.is_between(BIRD_TAG, GAP_TAG) && !ctx.game.lost {
                ctx.sim.add_score(1);
                out.emit(Event::sound("score"));
            }
        });

        bus.subscribe(Event::BORDER, |event, ctx: &mut EngineContext<Self>, out| {
            let Event::Border { entity, side } = event else {
                return;
            };
            let Some(tag) = ctx.sim.world.find_entity(*entity).map(|e| e.tag.clone()) else {
                return;
            };
            match tag.as_str() {
                BIRD_TAG if *side == Side::Bottom => trigger_game_over(ctx, out, "hit the ground"),
                PIPE_TAG | GAP_TAG => {
                    ctx.sim.world.kill(*entity);
                }
                _ => {}
            }
        });
    }
}

impl Default for FlappyBird {
    fn default() -> Self {
        Self::new()
    }
}

impl Game for FlappyBird {
    fn config(&self) -> GameConfig {
        GameConfig {
            world_width: WORLD_W,
            world_height: WORLD_H,
            border_mode: BorderMode::Solid,
            ..GameConfig::default()
        }
    }

    fn init(&mut self, setup: &mut Setup<'_, Self>) -> Result<(), EngineError> {
        let manifest = ShapeManifest::from_json(MANIFEST)?;
        setup.assets.load_manifest(&manifest)?;

        for h in 1..=setup.sim.world.height() {
            self.top_pipes
                .push(setup.assets.register(format!("pipe_top_{h}"), pipe_rows(h, true))?);
            self.bottom_pipes
                .push(setup.assets.register(format!("pipe_bottom_{h}"), pipe_rows(h, false))?);
        }

        Self::setup_event_handlers(setup.bus);
        self.spawn_bird(setup)?;
        self.update_status_lines(setup.sim);
        Ok(())
    }

    fn update(&mut self, sim: &mut Simulation, input: &InputEvent, events: &mut EventQueue) {
        if Self::translate_input(input) == FlappyAction::Flap {
            self.flap(sim, events);
        }
        if !self.lost {
            self.update_pipes(sim);
        }
        self.update_status_lines(sim);
    }
}

fn trigger_game_over(ctx: &mut EngineContext<FlappyBird>, out: &mut Emitter<'_>, reason: &str) {
    if ctx.game.lost {
        return;
    }
    ctx.game.lost = true;
    log::info!("bird {reason}, final score {}", ctx.sim.score());
    out.emit(Event::sound("die"));
    out.emit(Event::game_over(false, reason));
}

fn pipe(id: EntityId, shape: ShapeHandle, x: i32, y: i32, height: i32) -> Entity {
    Entity::new(id)
        .with_tag(PIPE_TAG)
        .with_pos(x, y)
        .with_shape(shape)
        .with_hitbox(Hitbox::from_size(PIPE_WIDTH, height))
        .with_solidity(Solidity::Solid)
        .with_movement(Movement::straight(PIPE_SPEED, 0.0))
}

/// A pipe segment with its cap facing the gap.
fn pipe_rows(height: i32, cap_at_bottom: bool) -> Vec<String> {
    let mut rows = vec!["|  |".to_string(); height.max(1) as usize];
    let cap = if cap_at_bottom { rows.len() - 1 } else { 0 };
    rows[cap] = "[==]".to_string();
    rows
}

/// The bird drops like a stone once it hits a pipe.
fn bird_hit(bird: &mut Entity, other: &mut Entity) {
    if other.tag == PIPE_TAG {
        bird.clear_movements();
    }
}

/// A gap scores once; the trigger removes itself on contact.
fn gap_passed(gap: &mut Entity, other: &mut Entity) {
    if other.tag == BIRD_TAG {
        gap.kill();
    }
}
