use glam::IVec2;
use crate::api::types::{EntityId, Position, Solidity};
use crate::assets::registry::ShapeHandle;
use crate::components::animation::Animation;
use crate::components::movement::{Movement, MovementKind};
use crate::core::hitbox::Hitbox;
use crate::input::queue::InputEvent;
use crate::renderer::drawable::Drawable;

/// Reaction to a resolved collision, called with (self, other).
/// May change either entity but cannot reach the world; killing an entity
/// only flags it, removal happens at the reap step.
pub type CollisionCallback = fn(&mut Entity, &mut Entity);

/// Fat entity: a single struct with optional parts.
/// Behavior comes from its movement list rather than from a type hierarchy.
#[derive(Clone)]
pub struct Entity {
    id: EntityId,
    /// Classification tag used for event filtering (not unique).
    pub tag: String,
    /// Current grid position.
    pub pos: Position,
    prev_pos: Position,
    /// Collision box relative to `pos`.
    pub hitbox: Hitbox,
    pub solidity: Solidity,
    /// Base shape; an animation's current frame takes precedence.
    pub shape: Option<ShapeHandle>,
    pub animation: Option<Animation>,
    /// Draw order; higher is drawn later.
    pub z: i32,
    /// Keep the entity inside the world instead of applying border rules.
    pub clamp_to_borders: bool,
    /// Kill the entity once its age exceeds this many ticks.
    pub max_age_ticks: Option<u32>,
    movements: Vec<Movement>,
    on_collision: Option<CollisionCallback>,
    alive: bool,
    age_ticks: u32,
}

impl Entity {
    /// Create a new entity with the given ID at the origin.
    pub fn new(id: EntityId) -> Self {
        Self {
            id,
            tag: String::new(),
            pos: IVec2::ZERO,
            prev_pos: IVec2::ZERO,
            hitbox: Hitbox::default(),
            solidity: Solidity::Solid,
            shape: None,
            animation: None,
            z: 0,
            clamp_to_borders: false,
            max_age_ticks: None,
            movements: Vec::new(),
            on_collision: None,
            alive: true,
            age_ticks: 0,
        }
    }

    // -- Builder pattern --

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }

    pub fn with_pos(mut self, x: i32, y: i32) -> Self {
        self.teleport(x, y);
        self
    }

    pub fn with_hitbox(mut self, hitbox: Hitbox) -> Self {
        self.hitbox = hitbox;
        self
    }

    pub fn with_solidity(mut self, solidity: Solidity) -> Self {
        self.solidity = solidity;
        self
    }

    pub fn with_shape(mut self, shape: ShapeHandle) -> Self {
        self.shape = Some(shape);
        self
    }

    pub fn with_animation(mut self, animation: Animation) -> Self {
        self.animation = Some(animation);
        self
    }

    pub fn with_movement(mut self, movement: impl Into<Movement>) -> Self {
        self.movements.push(movement.into());
        self
    }

    pub fn with_z(mut self, z: i32) -> Self {
        self.z = z;
        self
    }

    pub fn with_clamp_to_borders(mut self, clamp: bool) -> Self {
        self.clamp_to_borders = clamp;
        self
    }

    pub fn with_max_age(mut self, ticks: u32) -> Self {
        self.max_age_ticks = Some(ticks);
        self
    }

    pub fn with_on_collision(mut self, callback: CollisionCallback) -> Self {
        self.on_collision = Some(callback);
        self
    }

    // -- Per-tick behavior --

    /// Apply every movement in order, then advance animation and age.
    pub fn update(&mut self, input: &InputEvent) {
        for movement in &mut self.movements {
            movement.apply(&mut self.pos, input);
        }
        if let Some(anim) = &mut self.animation {
            anim.advance_tick();
        }
        self.age_ticks += 1;
        if self.max_age_ticks.is_some_and(|max| self.age_ticks > max) {
            self.kill();
        }
    }

    /// Record the current position as the previous-tick position.
    pub(crate) fn snapshot_position(&mut self) {
        self.prev_pos = self.pos;
    }

    /// Put the entity back where it was before this tick's movement.
    pub(crate) fn revert_position(&mut self) {
        self.pos = self.prev_pos;
    }

    /// Called by the world when a collision involving this entity is resolved.
    /// Dead entities ignore it.
    pub fn on_collision(&mut self, other: &mut Entity) {
        if !self.alive {
            return;
        }
        if let Some(callback) = self.on_collision {
            callback(self, other);
        }
    }

    pub fn set_on_collision(&mut self, callback: CollisionCallback) {
        self.on_collision = Some(callback);
    }

    pub fn clear_on_collision(&mut self) {
        self.on_collision = None;
    }

    /// Shape and position to draw, or `None` for an invisible entity.
    pub fn to_drawable(&self) -> Option<Drawable> {
        let (shape, offset) = match &self.animation {
            Some(anim) if !anim.is_empty() => (anim.current_shape(), anim.current_offset()),
            _ => (self.shape, IVec2::ZERO),
        };
        let pos = self.pos + offset;
        shape.map(|shape| Drawable::new(shape, pos.x, pos.y, self.z))
    }

    // -- Lifecycle --

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn kill(&mut self) {
        self.alive = false;
    }

    pub fn age_ticks(&self) -> u32 {
        self.age_ticks
    }

    // -- Spatial state --

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn position(&self) -> Position {
        self.pos
    }

    pub fn prev_position(&self) -> Position {
        self.prev_pos
    }

    /// Move to an absolute cell. The previous position is kept, so a solid
    /// collision later in the same tick can still revert the move.
    pub fn set_position(&mut self, x: i32, y: i32) {
        self.pos = IVec2::new(x, y);
    }

    /// Place at an absolute cell and forget the previous position.
    /// For setup, outside the tick pipeline.
    pub fn teleport(&mut self, x: i32, y: i32) {
        self.pos = IVec2::new(x, y);
        self.prev_pos = self.pos;
    }

    /// Direct nudge, independent of the movement behaviors.
    pub fn move_by(&mut self, dx: i32, dy: i32) {
        self.pos += IVec2::new(dx, dy);
    }

    // -- Movement management --

    pub fn add_movement(&mut self, movement: impl Into<Movement>) {
        self.movements.push(movement.into());
    }

    pub fn clear_movements(&mut self) {
        self.movements.clear();
    }

    pub fn movements(&self) -> &[Movement] {
        &self.movements
    }

    /// First movement of the given concrete type.
    pub fn movement<T: MovementKind>(&self) -> Option<&T> {
        self.movements.iter().find_map(T::from_movement)
    }

    /// First movement of the given concrete type (mutable).
    pub fn movement_mut<T: MovementKind>(&mut self) -> Option<&mut T> {
        self.movements.iter_mut().find_map(T::from_movement_mut)
    }
}

impl std::fmt::Debug for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Entity")
            .field("id", &self.id)
            .field("tag", &self.tag)
            .field("pos", &self.pos)
            .field("prev_pos", &self.prev_pos)
            .field("hitbox", &self.hitbox)
            .field("solidity", &self.solidity)
            .field("shape", &self.shape)
            .field("z", &self.z)
            .field("alive", &self.alive)
            .field("age_ticks", &self.age_ticks)
            .field("movements", &self.movements)
            .field("has_on_collision", &self.on_collision.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::animation::Frame;
    use crate::components::movement::{GravityMovement, StraightMovement};

    #[test]
    fn movements_apply_in_insertion_order() {
        let mut e = Entity::new(EntityId(1))
            .with_movement(Movement::straight(1.0, 0.0))
            .with_movement(Movement::cycle(vec![IVec2::new(0, 5)], 1));
        e.update(&InputEvent::Idle);
        assert_eq!(e.position(), IVec2::new(1, 5));
        assert_eq!(e.age_ticks(), 1);
    }

    #[test]
    fn max_age_kills_after_exceeding() {
        let mut e = Entity::new(EntityId(1)).with_max_age(2);
        e.update(&InputEvent::Idle);
        e.update(&InputEvent::Idle);
        assert!(e.is_alive());
        e.update(&InputEvent::Idle);
        assert!(!e.is_alive());
    }

    #[test]
    fn kill_is_idempotent() {
        let mut e = Entity::new(EntityId(1));
        e.kill();
        e.kill();
        assert!(!e.is_alive());
    }

    #[test]
    fn dead_entity_ignores_collisions() {
        fn shove(me: &mut Entity, other: &mut Entity) {
            me.move_by(1, 0);
            other.kill();
        }
        let mut a = Entity::new(EntityId(1)).with_on_collision(shove);
        let mut b = Entity::new(EntityId(2));

        a.on_collision(&mut b);
        assert_eq!(a.position(), IVec2::new(1, 0));
        assert!(!b.is_alive());

        a.kill();
        let mut c = Entity::new(EntityId(3));
        a.on_collision(&mut c);
        assert!(c.is_alive());
        assert_eq!(a.position(), IVec2::new(1, 0));
    }

    #[test]
    fn animation_frame_overrides_base_shape() {
        let mut e = Entity::new(EntityId(1))
            .with_pos(4, 4)
            .with_z(2)
            .with_shape(ShapeHandle(0))
            .with_animation(Animation::looping(vec![
                Frame::new(ShapeHandle(1), 1),
                Frame::new(ShapeHandle(2), 1).with_offset(1, 0),
            ]));

        let d = e.to_drawable().unwrap();
        assert_eq!((d.shape, d.x, d.y, d.z), (ShapeHandle(1), 4, 4, 2));

        e.update(&InputEvent::Idle);
        let d = e.to_drawable().unwrap();
        assert_eq!((d.shape, d.x, d.y), (ShapeHandle(2), 5, 4));
    }

    #[test]
    fn entity_without_shape_is_invisible() {
        assert!(Entity::new(EntityId(1)).to_drawable().is_none());
    }

    #[test]
    fn typed_movement_lookup() {
        let mut e = Entity::new(EntityId(1))
            .with_movement(Movement::gravity(0.5))
            .with_movement(StraightMovement::new(1.0, 0.0));
        assert!(e.movement::<StraightMovement>().is_some());
        e.movement_mut::<GravityMovement>().unwrap().set_fall_speed(2.0);
        e.update(&InputEvent::Idle);
        assert_eq!(e.position(), IVec2::new(1, 2));
    }

    #[test]
    fn set_position_keeps_the_tick_start_position() {
        let mut e = Entity::new(EntityId(1)).with_pos(2, 2);
        e.snapshot_position();
        e.set_position(6, 1);
        assert_eq!(e.prev_position(), IVec2::new(2, 2));
        e.revert_position();
        assert_eq!(e.position(), IVec2::new(2, 2));

        e.teleport(9, 9);
        assert_eq!(e.prev_position(), IVec2::new(9, 9));
    }
}
