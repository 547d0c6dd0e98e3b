//! Movement behaviors applied to an entity's position once per tick.
//!
//! Fractional speeds are accumulated per axis and only whole cells are
//! applied, so a speed of 0.5 moves one cell every other tick without drift.

use glam::{IVec2, Vec2};
use crate::api::types::Position;
use crate::input::queue::{InputEvent, KeyCode};

/// A movement behavior owned by exactly one entity.
#[derive(Debug, Clone)]
pub enum Movement {
    Straight(StraightMovement),
    Cycle(CycleMovement),
    Gravity(GravityMovement),
    PlayerControlled(PlayerControlledMovement),
}

impl Movement {
    pub fn straight(vx: f32, vy: f32) -> Self {
        Movement::Straight(StraightMovement::new(vx, vy))
    }

    pub fn cycle(offsets: Vec<IVec2>, interval_ticks: u32) -> Self {
        Movement::Cycle(CycleMovement::new(offsets, interval_ticks))
    }

    pub fn gravity(fall_speed: f32) -> Self {
        Movement::Gravity(GravityMovement::new(fall_speed))
    }

    pub fn player(speed: i32, keys: ControlKeys) -> Self {
        Movement::PlayerControlled(PlayerControlledMovement::new(speed, keys))
    }

    /// Apply one tick of this behavior.
    pub fn apply(&mut self, pos: &mut Position, input: &InputEvent) {
        match self {
            Movement::Straight(m) => m.apply(pos),
            Movement::Cycle(m) => m.apply(pos),
            Movement::Gravity(m) => m.apply(pos),
            Movement::PlayerControlled(m) => m.apply(pos, input),
        }
    }
}

/// Typed access to the concrete behavior inside a [`Movement`].
pub trait MovementKind: Sized {
    fn from_movement(movement: &Movement) -> Option<&Self>;
    fn from_movement_mut(movement: &mut Movement) -> Option<&mut Self>;
}

macro_rules! movement_kind {
    ($variant:ident, $ty:ty) => {
        impl MovementKind for $ty {
            fn from_movement(movement: &Movement) -> Option<&Self> {
                match movement {
                    Movement::$variant(m) => Some(m),
                    _ => None,
                }
            }

            fn from_movement_mut(movement: &mut Movement) -> Option<&mut Self> {
                match movement {
                    Movement::$variant(m) => Some(m),
                    _ => None,
                }
            }
        }

        impl From<$ty> for Movement {
            fn from(m: $ty) -> Self {
                Movement::$variant(m)
            }
        }
    };
}

movement_kind!(Straight, StraightMovement);
movement_kind!(Cycle, CycleMovement);
movement_kind!(Gravity, GravityMovement);
movement_kind!(PlayerControlled, PlayerControlledMovement);

/// Take the whole-cell part out of an accumulator, leaving the remainder.
fn take_whole(accumulator: &mut f32) -> i32 {
    let whole = accumulator.trunc();
    *accumulator -= whole;
    whole as i32
}

/// Constant velocity in cells per tick.
#[derive(Debug, Clone)]
pub struct StraightMovement {
    velocity: Vec2,
    accumulator: Vec2,
}

impl StraightMovement {
    pub fn new(vx: f32, vy: f32) -> Self {
        Self {
            velocity: Vec2::new(vx, vy),
            accumulator: Vec2::ZERO,
        }
    }

    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    /// Change speed; the fractional progress made so far is kept.
    pub fn set_velocity(&mut self, vx: f32, vy: f32) {
        self.velocity = Vec2::new(vx, vy);
    }

    fn apply(&mut self, pos: &mut Position) {
        self.accumulator += self.velocity;
        pos.x += take_whole(&mut self.accumulator.x);
        pos.y += take_whole(&mut self.accumulator.y);
    }
}

/// Constant downward fall speed in cells per tick (no acceleration).
#[derive(Debug, Clone)]
pub struct GravityMovement {
    fall_speed: f32,
    accumulator: f32,
}

impl GravityMovement {
    pub fn new(fall_speed: f32) -> Self {
        Self {
            fall_speed,
            accumulator: 0.0,
        }
    }

    pub fn fall_speed(&self) -> f32 {
        self.fall_speed
    }

    pub fn set_fall_speed(&mut self, fall_speed: f32) {
        self.fall_speed = fall_speed;
    }

    fn apply(&mut self, pos: &mut Position) {
        self.accumulator += self.fall_speed;
        pos.y += take_whole(&mut self.accumulator);
    }
}

/// Steps through a list of offsets, one every `interval_ticks` ticks, wrapping.
/// Each step adds the current offset to the position.
#[derive(Debug, Clone)]
pub struct CycleMovement {
    offsets: Vec<IVec2>,
    current_index: usize,
    interval_ticks: u32,
    tick_counter: u32,
}

impl CycleMovement {
    pub fn new(offsets: Vec<IVec2>, interval_ticks: u32) -> Self {
        Self {
            offsets,
            current_index: 0,
            interval_ticks,
            tick_counter: 0,
        }
    }

    pub fn reset(&mut self) {
        self.current_index = 0;
        self.tick_counter = 0;
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    fn apply(&mut self, pos: &mut Position) {
        if self.offsets.is_empty() || self.interval_ticks == 0 {
            return;
        }
        self.tick_counter += 1;
        if self.tick_counter < self.interval_ticks {
            return;
        }
        self.tick_counter = 0;
        *pos += self.offsets[self.current_index];
        self.current_index = (self.current_index + 1) % self.offsets.len();
    }
}

/// The four keys a player-controlled entity responds to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlKeys {
    pub left: KeyCode,
    pub right: KeyCode,
    pub up: KeyCode,
    pub down: KeyCode,
}

impl ControlKeys {
    pub fn arrows() -> Self {
        Self {
            left: KeyCode::LEFT,
            right: KeyCode::RIGHT,
            up: KeyCode::UP,
            down: KeyCode::DOWN,
        }
    }

    pub fn wasd() -> Self {
        Self {
            left: KeyCode::from_char('a'),
            right: KeyCode::from_char('d'),
            up: KeyCode::from_char('w'),
            down: KeyCode::from_char('s'),
        }
    }
}

/// Moves a fixed number of cells on the tick a direction key is pressed.
#[derive(Debug, Clone)]
pub struct PlayerControlledMovement {
    speed: i32,
    keys: ControlKeys,
}

impl PlayerControlledMovement {
    pub fn new(speed: i32, keys: ControlKeys) -> Self {
        Self { speed, keys }
    }

    pub fn move_speed(&self) -> i32 {
        self.speed
    }

    pub fn set_move_speed(&mut self, speed: i32) {
        self.speed = speed;
    }

    pub fn keys(&self) -> ControlKeys {
        self.keys
    }

    fn apply(&mut self, pos: &mut Position, input: &InputEvent) {
        let Some(key) = input.key() else {
            return;
        };
        if key == self.keys.left {
            pos.x -= self.speed;
        } else if key == self.keys.right {
            pos.x += self.speed;
        } else if key == self.keys.up {
            pos.y -= self.speed;
        } else if key == self.keys.down {
            pos.y += self.speed;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(movement: &mut Movement, ticks: usize) -> Vec<Position> {
        let mut pos = Position::ZERO;
        (0..ticks)
            .map(|_| {
                movement.apply(&mut pos, &InputEvent::Idle);
                pos
            })
            .collect()
    }

    #[test]
    fn half_speed_moves_every_other_tick() {
        let mut m = Movement::straight(0.5, 0.0);
        let trail = run(&mut m, 1000);
        for (i, pos) in trail.iter().enumerate() {
            let ticks = i as i32 + 1;
            assert_eq!(pos.x, ticks / 2, "after {ticks} ticks");
            assert_eq!(pos.y, 0);
        }
    }

    #[test]
    fn negative_velocity_does_not_drift() {
        let mut m = Movement::straight(-0.25, 2.0);
        let trail = run(&mut m, 8);
        assert_eq!(trail[3], IVec2::new(-1, 8));
        assert_eq!(trail[7], IVec2::new(-2, 16));
    }

    #[test]
    fn gravity_is_vertical_only() {
        let mut m = Movement::gravity(0.5);
        let trail = run(&mut m, 4);
        assert_eq!(trail, vec![
            IVec2::new(0, 0),
            IVec2::new(0, 1),
            IVec2::new(0, 1),
            IVec2::new(0, 2),
        ]);
    }

    #[test]
    fn cycle_steps_every_interval_and_wraps() {
        let mut m = Movement::cycle(vec![IVec2::new(1, 0), IVec2::new(-1, 0)], 3);
        let trail = run(&mut m, 12);
        let xs: Vec<i32> = trail.iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![0, 0, 1, 1, 1, 0, 0, 0, 1, 1, 1, 0]);
    }

    #[test]
    fn cycle_without_offsets_is_noop() {
        let mut m = Movement::cycle(Vec::new(), 1);
        assert!(run(&mut m, 5).iter().all(|p| *p == IVec2::ZERO));
        let mut m = Movement::cycle(vec![IVec2::X], 0);
        assert!(run(&mut m, 5).iter().all(|p| *p == IVec2::ZERO));
    }

    #[test]
    fn player_moves_only_on_matching_keys() {
        let mut m = Movement::player(2, ControlKeys::wasd());
        let mut pos = IVec2::new(10, 10);

        m.apply(&mut pos, &InputEvent::Key(KeyCode::from_char('d')));
        assert_eq!(pos, IVec2::new(12, 10));
        m.apply(&mut pos, &InputEvent::Key(KeyCode::from_char('w')));
        assert_eq!(pos, IVec2::new(12, 8));
        m.apply(&mut pos, &InputEvent::Key(KeyCode::SPACE));
        m.apply(&mut pos, &InputEvent::Idle);
        assert_eq!(pos, IVec2::new(12, 8));
    }

    #[test]
    fn typed_retrieval() {
        let mut m = Movement::player(1, ControlKeys::arrows());
        assert!(StraightMovement::from_movement(&m).is_none());
        PlayerControlledMovement::from_movement_mut(&mut m)
            .unwrap()
            .set_move_speed(3);
        assert_eq!(PlayerControlledMovement::from_movement(&m).unwrap().move_speed(), 3);
    }
}
