use age_engine::*;
use glam::IVec2;

const MANIFEST: &str = include_str!("../assets/shapes.json");

const WORLD_W: i32 = 78;
const WORLD_H: i32 = 20;

const PLAYER_X: i32 = 2;
const PLAYER_WIDTH: i32 = 4;
const PLAYER_SPEED: i32 = 1;
const BULLET_SPEED: f32 = 2.0;
const ENEMY_BULLET_SPEED: f32 = -1.0;
const SHOOT_COOLDOWN: u32 = 5;

const ENEMY_SPACING: IVec2 = IVec2::new(5, 3);
/// Enemies closer than this to the player's column have broken through.
const DANGER_X: i32 = PLAYER_X + PLAYER_WIDTH + 1;
const STAR_COUNT: usize = 8;

pub const PLAYER_TAG: &str = "player";
pub const PLAYER_BULLET_TAG: &str = "player_bullet";
pub const ENEMY_TAG: &str = "enemy";
pub const ENEMY_BULLET_TAG: &str = "enemy_bullet";
const STAR_TAG: &str = "star";

struct LevelConfig {
    enemy_rows: i32,
    enemy_cols: i32,
    /// Ticks between enemy shots.
    shoot_interval: u32,
    /// Ticks per step of the enemy march.
    march_interval: u32,
}

static LEVELS: [LevelConfig; 2] = [
    LevelConfig {
        enemy_rows: 3,
        enemy_cols: 4,
        shoot_interval: 40,
        march_interval: 6,
    },
    LevelConfig {
        enemy_rows: 4,
        enemy_cols: 5,
        shoot_interval: 25,
        march_interval: 4,
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SpaceAction {
    None,
    Shoot,
}

/// Shapes and animation templates resolved once at init.
struct Sprites {
    player_anim: Animation,
    player: ShapeHandle,
    bullet: ShapeHandle,
    enemy_bullet: ShapeHandle,
    enemy: ShapeHandle,
    enemy_anim: Animation,
    star: ShapeHandle,
    star_anim: Animation,
}

impl Sprites {
    fn load(assets: &ShapeRegistry) -> Result<Self, EngineError> {
        let animation = |name: &str| {
            assets
                .animation(name)
                .ok_or_else(|| EngineError::UnknownShape(name.to_string()))
        };
        Ok(Self {
            player_anim: animation("player_idle")?,
            player: assets.require("player_a")?,
            bullet: assets.require("bullet")?,
            enemy_bullet: assets.require("enemy_bullet")?,
            enemy: assets.require("enemy_a")?,
            enemy_anim: animation("enemy_march")?,
            star: assets.require("star_a")?,
            star_anim: animation("star_twinkle")?,
        })
    }
}

/// Side-on Space Invaders: the player holds the left edge and shoots right
/// while the enemy grid marches up and down, creeping closer every pass.
/// Clear both levels to win; get shot, rammed or overrun to lose.
pub struct SpaceInvaders {
    sprites: Option<Sprites>,
    next_id: u32,
    enemies_remaining: u32,
    shoot_cooldown: u32,
    enemy_shoot_timer: u32,
    lost: bool,
    victory: bool,
}

impl SpaceInvaders {
    pub fn new() -> Self {
        Self {
            sprites: None,
            next_id: 1,
            enemies_remaining: 0,
            shoot_cooldown: 0,
            enemy_shoot_timer: 0,
            lost: false,
            victory: false,
        }
    }

    pub fn enemies_remaining(&self) -> u32 {
        self.enemies_remaining
    }

    fn is_over(&self) -> bool {
        self.lost || self.victory
    }

    fn next_id(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        id
    }

    fn translate_input(input: &InputEvent) -> SpaceAction {
        match input.key() {
            Some(KeyCode::SPACE) => SpaceAction::Shoot,
            _ => SpaceAction::None,
        }
    }

    /// End the game once. Returns the events announcing it.
    fn finish(&mut self, won: bool, reason: &str) -> Vec<Event> {
        if self.is_over() {
            return Vec::new();
        }
        if won {
            self.victory = true;
        } else {
            self.lost = true;
        }
        log::info!("{reason}");
        vec![
            Event::sound(if won { "win" } else { "die" }),
            Event::game_over(won, reason),
        ]
    }

    // -- Level setup --

    fn setup_level(&mut self, sim: &mut Simulation, level: u32) -> Result<(), EngineError> {
        let index = (level.max(1) as usize - 1).min(LEVELS.len() - 1);
        let config = &LEVELS[index];

        sim.world.kill_all();
        sim.set_level(level);
        self.shoot_cooldown = 0;
        self.enemy_shoot_timer = config.shoot_interval;

        self.spawn_player(sim)?;
        self.spawn_stars(sim, STAR_COUNT)?;
        self.spawn_enemy_grid(sim, config)?;
        log::info!("level {} with {} invaders", level, self.enemies_remaining);
        Ok(())
    }

    fn spawn_player(&mut self, sim: &mut Simulation) -> Result<(), EngineError> {
        let Some(sprites) = &self.sprites else {
            return Ok(());
        };
        let (shape, animation) = (sprites.player, sprites.player_anim.clone());
        let id = self.next_id();
        let player = Entity::new(id)
            .with_tag(PLAYER_TAG)
            .with_pos(PLAYER_X, sim.world.height() / 2 - 1)
            .with_shape(shape)
            .with_hitbox(Hitbox::from_size(PLAYER_WIDTH, 3))
            .with_animation(animation)
            .with_solidity(Solidity::Solid)
            .with_clamp_to_borders(true)
            .with_movement(Movement::player(PLAYER_SPEED, ControlKeys::arrows()))
            .with_movement(Movement::player(PLAYER_SPEED, ControlKeys::wasd()))
            .with_z(1);
        sim.world.add_entity(player)?;
        sim.world.set_player(id)
    }

    /// Background decoration: ghosts never collide with anything.
    fn spawn_stars(&mut self, sim: &mut Simulation, count: usize) -> Result<(), EngineError> {
        let Some(sprites) = &self.sprites else {
            return Ok(());
        };
        let (shape, animation) = (sprites.star, sprites.star_anim.clone());
        for _ in 0..count {
            let x = sim.rng.range(0, sim.world.width() - 1);
            let y = sim.rng.range(0, sim.world.height() - 1);
            let id = self.next_id();
            let star = Entity::new(id)
                .with_tag(STAR_TAG)
                .with_pos(x, y)
                .with_shape(shape)
                .with_hitbox(Hitbox::from_size(1, 1))
                .with_animation(animation.clone())
                .with_solidity(Solidity::Ghost)
                .with_z(-1);
            sim.world.add_entity(star)?;
        }
        Ok(())
    }

    /// Lay the grid out against the right edge. Every enemy carries the same
    /// march: down to the floor, one step left, up to the ceiling, one step left.
    fn spawn_enemy_grid(&mut self, sim: &mut Simulation, config: &LevelConfig) -> Result<(), EngineError> {
        let Some(sprites) = &self.sprites else {
            return Ok(());
        };
        let (shape, animation) = (sprites.enemy, sprites.enemy_anim.clone());
        let hitbox = Hitbox::from_size(3, 2);

        let grid_h = (config.enemy_rows - 1) * ENEMY_SPACING.y + hitbox.height();
        let origin = IVec2::new(
            sim.world.width() - config.enemy_cols * ENEMY_SPACING.x - 1,
            1,
        );
        let travel = (sim.world.height() - 2 - grid_h).max(0) as usize;
        let mut march = vec![IVec2::new(0, 1); travel];
        march.push(IVec2::new(-2, 0));
        march.extend(std::iter::repeat(IVec2::new(0, -1)).take(travel));
        march.push(IVec2::new(-2, 0));

        self.enemies_remaining = 0;
        for row in 0..config.enemy_rows {
            for col in 0..config.enemy_cols {
                let pos = origin + IVec2::new(col, row) * ENEMY_SPACING;
                let id = self.next_id();
                let enemy = Entity::new(id)
                    .with_tag(ENEMY_TAG)
                    .with_pos(pos.x, pos.y)
                    .with_shape(shape)
                    .with_hitbox(hitbox)
                    .with_animation(animation.clone())
                    .with_solidity(Solidity::Trigger)
                    .with_movement(Movement::cycle(march.clone(), config.march_interval));
                sim.world.add_entity(enemy)?;
                self.enemies_remaining += 1;
            }
        }
        Ok(())
    }

    // -- Per-tick logic --

    fn spawn_bullet(
        &mut self,
        sim: &mut Simulation,
        tag: &str,
        at: Position,
        speed: f32,
    ) -> Result<(), EngineError> {
        let Some(sprites) = &self.sprites else {
            return Ok(());
        };
        let shape = if tag == PLAYER_BULLET_TAG {
            sprites.bullet
        } else {
            sprites.enemy_bullet
        };
        let id = self.next_id();
        let bullet = Entity::new(id)
            .with_tag(tag)
            .with_pos(at.x, at.y)
            .with_shape(shape)
            .with_hitbox(Hitbox::from_size(1, 1))
            .with_solidity(Solidity::Trigger)
            .with_movement(Movement::straight(speed, 0.0));
        sim.world.add_entity(bullet)?;
        Ok(())
    }

    fn shoot(&mut self, sim: &mut Simulation, events: &mut EventQueue) {
        if self.shoot_cooldown > 0 {
            return;
        }
        let Some(player) = sim.world.player().filter(|p| p.is_alive()) else {
            return;
        };
        // Muzzle is the middle row, just right of the ship.
        let at = player.position() + IVec2::new(PLAYER_WIDTH, 1);
        match self.spawn_bullet(sim, PLAYER_BULLET_TAG, at, BULLET_SPEED) {
            Ok(()) => {
                self.shoot_cooldown = SHOOT_COOLDOWN;
                events.push(Event::sound("shoot"));
            }
            Err(err) => log::warn!("could not fire: {err}"),
        }
    }

    fn update_enemy_shooting(&mut self, sim: &mut Simulation) {
        self.enemy_shoot_timer = self.enemy_shoot_timer.saturating_sub(1);
        if self.enemy_shoot_timer > 0 {
            return;
        }
        let level = sim.level().max(1) as usize;
        self.enemy_shoot_timer = LEVELS[(level - 1).min(LEVELS.len() - 1)].shoot_interval;

        let shooters: Vec<Position> = sim
            .world
            .find_entities_by_tag(ENEMY_TAG)
            .map(|e| e.position())
            .collect();
        let Some(&shooter) = sim.rng.pick(&shooters) else {
            return;
        };
        let at = shooter + IVec2::new(-1, 1);
        if let Err(err) = self.spawn_bullet(sim, ENEMY_BULLET_TAG, at, ENEMY_BULLET_SPEED) {
            log::warn!("enemy could not fire: {err}");
        }
    }

    fn check_level_complete(&mut self, sim: &mut Simulation, events: &mut EventQueue) {
        if self.enemies_remaining > 0 {
            return;
        }
        if (sim.level() as usize) < LEVELS.len() {
            let next = sim.level() + 1;
            if let Err(err) = self.setup_level(sim, next) {
                log::warn!("could not set up level {next}: {err}");
                return;
            }
            events.push(Event::sound("win"));
        } else {
            for event in self.finish(true, "all invaders defeated") {
                events.push(event);
            }
        }
    }

    fn check_enemy_reached_player(&mut self, sim: &mut Simulation, events: &mut EventQueue) {
        let overrun = sim
            .world
            .find_entities_by_tag(ENEMY_TAG)
            .any(|e| e.position().x <= DANGER_X);
        if overrun {
            for event in self.finish(false, "the invaders broke through") {
                events.push(event);
            }
        }
    }

    fn update_status_lines(&self, sim: &mut Simulation) {
        let lines = if self.victory {
            vec![
                "=== VICTORY! ===".to_string(),
                format!("Final Score: {}", sim.score()),
                "You defeated all invaders!".to_string(),
                "Press 'q' to quit".to_string(),
            ]
        } else if self.lost {
            vec![
                "=== GAME OVER ===".to_string(),
                format!("Final Score: {}", sim.score()),
                "The invaders have won...".to_string(),
                "Press 'q' to quit".to_string(),
            ]
        } else {
            vec![
                format!(
                    "SPACE INVADERS | Level: {} | Score: {} | Enemies: {}",
                    sim.level(),
                    sim.score(),
                    self.enemies_remaining
                ),
                "WASD or arrow keys to move | SPACE to shoot".to_string(),
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
            let world = &mut ctx.sim.world;
            if !is_live(world, c.a) || !is_live(world, c.b) {
                return;
            }

            if c.is_between(PLAYER_BULLET_TAG, ENEMY_TAG) {
                world.kill(c.a);
                world.kill(c.b);
                ctx.game.enemies_remaining = ctx.game.enemies_remaining.saturating_sub(1);
                let points = 10 * i64::from(ctx.sim.level());
                ctx.sim.add_score(points);
                out.emit(Event::sound("hit"));
            } else if c.is_between(PLAYER_BULLET_TAG, ENEMY_BULLET_TAG) {
                world.kill(c.a);
                world.kill(c.b);
            } else if c.is_between(ENEMY_BULLET_TAG, PLAYER_TAG) {
                if let Some(bullet) = c.id_with_tag(ENEMY_BULLET_TAG) {
                    world.kill(bullet);
                }
                for e in ctx.game.finish(false, "shot down") {
                    out.emit(e);
                }
            } else if c.is_between(ENEMY_TAG, PLAYER_TAG) {
                for e in ctx.game.finish(false, "rammed by an invader") {
                    out.emit(e);
                }
            }
        });

        // Shots that reach the edge of the field are spent.
        bus.subscribe(Event::BORDER, |event, ctx: &mut EngineContext<Self>, _| {
            let Event::Border { entity, .. } = event else {
                return;
            };
            let world = &mut ctx.sim.world;
            let is_shot = world
                .find_entity(*entity)
                .is_some_and(|e| e.tag == PLAYER_BULLET_TAG || e.tag == ENEMY_BULLET_TAG);
            if is_shot {
                world.kill(*entity);
            }
        });
    }
}

impl Default for SpaceInvaders {
    fn default() -> Self {
        Self::new()
    }
}

impl Game for SpaceInvaders {
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
        self.sprites = Some(Sprites::load(setup.assets)?);

        Self::setup_event_handlers(setup.bus);
        self.setup_level(setup.sim, 1)?;
        self.update_status_lines(setup.sim);
        Ok(())
    }

    fn update(&mut self, sim: &mut Simulation, input: &InputEvent, events: &mut EventQueue) {
        if !self.is_over() {
            self.shoot_cooldown = self.shoot_cooldown.saturating_sub(1);
            if Self::translate_input(input) == SpaceAction::Shoot {
                self.shoot(sim, events);
            }
            self.update_enemy_shooting(sim);
            self.check_level_complete(sim, events);
            self.check_enemy_reached_player(sim, events);
        }
        self.update_status_lines(sim);
    }
}

fn is_live(world: &World, id: EntityId) -> bool {
    world.find_entity(id).is_some_and(Entity::is_alive)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> Engine<SpaceInvaders> {
        let mut engine = Engine::new(SpaceInvaders::new());
        engine.init().unwrap();
        engine
    }

    fn count(engine: &Engine<SpaceInvaders>, tag: &str) -> usize {
        engine.world().find_entities_by_tag(tag).count()
    }

    fn run(engine: &mut Engine<SpaceInvaders>, ticks: usize) {
        for _ in 0..ticks {
            engine.tick(InputEvent::Idle);
        }
    }

    fn spawn(engine: &mut Engine<SpaceInvaders>, tag: &str, at: Position, speed: f32) {
        let EngineContext { game, sim } = engine.context_mut();
        game.spawn_bullet(sim, tag, at, speed).unwrap();
    }

    fn first_enemy(engine: &Engine<SpaceInvaders>) -> (EntityId, Position) {
        let enemy = engine.world().find_entities_by_tag(ENEMY_TAG).next().unwrap();
        (enemy.id(), enemy.position())
    }

    #[test]
    fn init_builds_level_one() {
        let engine = engine();
        assert_eq!(engine.sim().level(), 1);
        assert_eq!(count(&engine, ENEMY_TAG), 12);
        assert_eq!(engine.game().enemies_remaining(), 12);
        assert_eq!(count(&engine, STAR_TAG), STAR_COUNT);

        let player = engine.world().player().unwrap();
        assert_eq!(player.position(), Position::new(PLAYER_X, WORLD_H / 2 - 1));
        assert_eq!(
            engine.world().status_lines()[0],
            "SPACE INVADERS | Level: 1 | Score: 0 | Enemies: 12"
        );
    }

    #[test]
    fn player_moves_and_stays_on_screen() {
        let mut engine = engine();
        engine.tick(InputEvent::Key(KeyCode::UP));
        assert_eq!(engine.world().player().unwrap().position().y, WORLD_H / 2 - 2);
        for _ in 0..WORLD_H {
            engine.tick(InputEvent::Key(KeyCode::from_char('w')));
        }
        assert_eq!(engine.world().player().unwrap().position().y, 0);
    }

    #[test]
    fn shooting_respects_cooldown() {
        let mut engine = engine();
        engine.tick(InputEvent::Key(KeyCode::SPACE));
        assert_eq!(count(&engine, PLAYER_BULLET_TAG), 1);
        let bullet = engine.world().find_entities_by_tag(PLAYER_BULLET_TAG).next().unwrap();
        // Spawned at the muzzle, then one step of flight.
        assert_eq!(bullet.position(), Position::new(PLAYER_X + PLAYER_WIDTH + 2, WORLD_H / 2));

        engine.tick(InputEvent::Key(KeyCode::SPACE));
        assert_eq!(count(&engine, PLAYER_BULLET_TAG), 1);
        run(&mut engine, SHOOT_COOLDOWN as usize);
        engine.tick(InputEvent::Key(KeyCode::SPACE));
        assert_eq!(count(&engine, PLAYER_BULLET_TAG), 2);
    }

    #[test]
    fn bullet_destroys_enemy_and_scores() {
        let mut engine = engine();
        let (enemy, pos) = first_enemy(&engine);
        spawn(&mut engine, PLAYER_BULLET_TAG, pos + IVec2::new(-1, 0), BULLET_SPEED);

        engine.tick(InputEvent::Idle);
        assert!(!is_live(engine.world(), enemy));
        assert_eq!(count(&engine, PLAYER_BULLET_TAG), 0);
        assert_eq!(engine.game().enemies_remaining(), 11);
        assert_eq!(engine.sim().score(), 10);
    }

    #[test]
    fn shots_leaving_the_field_are_removed() {
        let mut engine = engine();
        spawn(&mut engine, PLAYER_BULLET_TAG, Position::new(WORLD_W - 2, 0), BULLET_SPEED);
        run(&mut engine, 3);
        assert_eq!(count(&engine, PLAYER_BULLET_TAG), 0);
    }

    #[test]
    fn enemy_shot_ends_the_game() {
        let mut engine = engine();
        let player = engine.world().player().unwrap().position();
        spawn(&mut engine, ENEMY_BULLET_TAG, player + IVec2::new(PLAYER_WIDTH, 1), ENEMY_BULLET_SPEED);

        run(&mut engine, 2);
        assert!(engine.is_game_over());
        assert!(!engine.sim().is_won());
        assert_eq!(engine.world().status_lines()[0], "=== GAME OVER ===");
    }

    #[test]
    fn enemies_march_down_then_left() {
        let mut engine = engine();
        let (enemy, start) = first_enemy(&engine);
        run(&mut engine, LEVELS[0].march_interval as usize);
        let pos = engine.world().find_entity(enemy).unwrap().position();
        assert_eq!(pos, start + IVec2::new(0, 1));
    }

    #[test]
    fn overrun_ends_the_game() {
        let mut engine = engine();
        let (enemy, _) = first_enemy(&engine);
        engine.world_mut().find_entity_mut(enemy).unwrap().teleport(DANGER_X, 15);
        run(&mut engine, 2);
        assert!(engine.is_game_over());
        assert!(!engine.sim().is_won());
    }

    #[test]
    fn clearing_both_levels_wins() {
        let mut engine = engine();
        let clear = |engine: &mut Engine<SpaceInvaders>| {
            let EngineContext { game, sim } = engine.context_mut();
            for enemy in sim.world.find_entities_by_tag_mut(ENEMY_TAG) {
                enemy.kill();
            }
            game.enemies_remaining = 0;
        };

        clear(&mut engine);
        engine.tick(InputEvent::Idle);
        assert_eq!(engine.sim().level(), 2);
        assert_eq!(count(&engine, ENEMY_TAG), 20);
        assert!(engine.world().player().is_some());
        assert!(!engine.is_game_over());

        clear(&mut engine);
        run(&mut engine, 2);
        assert!(engine.is_game_over());
        assert!(engine.sim().is_won());
        assert_eq!(engine.world().status_lines()[0], "=== VICTORY! ===");
    }
}
