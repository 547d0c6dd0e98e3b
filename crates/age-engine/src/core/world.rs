use glam::IVec2;
use crate::api::error::EngineError;
use crate::api::types::{BorderMode, EntityId, Side, Solidity};
use crate::assets::registry::ShapeHandle;
use crate::components::entity::Entity;
use crate::core::hitbox::Hitbox;
use crate::events::bus::EventQueue;
use crate::events::event::Event;
use crate::input::queue::InputEvent;
use crate::renderer::drawable::{build_draw_list, Drawable};

/// Owner of every entity plus the play-field rules.
///
/// Entities live in a flat Vec in insertion order, which is also the order
/// every phase visits them in. Designed for small entity counts; collision
/// detection is brute-force pairwise.
///
/// One tick is [`update`](Self::update) → [`handle_collisions`](Self::handle_collisions)
/// → [`apply_border_rules`](Self::apply_border_rules) →
/// [`remove_dead_entities`](Self::remove_dead_entities); [`step`](Self::step)
/// runs all four.
pub struct World {
    entities: Vec<Entity>,
    border: Hitbox,
    border_mode: BorderMode,
    width: i32,
    height: i32,
    tick_count: u64,
    status_lines: Vec<String>,
    player: Option<EntityId>,
}

impl World {
    pub fn new(width: i32, height: i32, border_mode: BorderMode) -> Self {
        Self {
            entities: Vec::with_capacity(128),
            border: Hitbox::from_size(width, height),
            border_mode,
            width,
            height,
            tick_count: 0,
            status_lines: Vec::new(),
            player: None,
        }
    }

    /// Run one full tick: movement, collisions, border rules, reap.
    /// Returns the ids reaped this tick.
    pub fn step(&mut self, input: &InputEvent, events: &mut EventQueue) -> Vec<EntityId> {
        self.update(input);
        self.handle_collisions(events);
        self.apply_border_rules(events);
        self.remove_dead_entities()
    }

    /// Movement phase. Every entity's previous position is recorded before
    /// any entity moves.
    pub fn update(&mut self, input: &InputEvent) {
        self.tick_count += 1;
        for entity in &mut self.entities {
            entity.snapshot_position();
        }
        for entity in self.entities.iter_mut().filter(|e| e.is_alive()) {
            entity.update(input);
        }
    }

    /// Test every unordered pair of live, non-ghost entities once.
    ///
    /// An overlap publishes one collision event and notifies both entities.
    /// When both are solid the one with the higher id goes back to its
    /// previous position; if that does not clear the overlap the other one
    /// goes back too.
    pub fn handle_collisions(&mut self, events: &mut EventQueue) {
        let n = self.entities.len();
        for i in 0..n {
            for j in (i + 1)..n {
                let (left, right) = self.entities.split_at_mut(j);
                let a = &mut left[i];
                let b = &mut right[0];

                if !a.is_alive() || !b.is_alive() {
                    continue;
                }
                if a.solidity == Solidity::Ghost || b.solidity == Solidity::Ghost {
                    continue;
                }
                if !a.hitbox.intersects(&b.hitbox, a.pos, b.pos) {
                    continue;
                }

                let both_solid = a.solidity == Solidity::Solid && b.solidity == Solidity::Solid;
                events.push(Event::collision(a.id(), b.id(), a.tag.clone(), b.tag.clone()));
                a.on_collision(b);
                b.on_collision(a);

                if both_solid {
                    if a.id() > b.id() {
                        separate_solids(a, b);
                    } else {
                        separate_solids(b, a);
                    }
                }
            }
        }
    }

    /// Keep live entities inside the border according to the border mode.
    pub fn apply_border_rules(&mut self, events: &mut EventQueue) {
        let border = self.border;
        let mode = self.border_mode;
        for entity in self.entities.iter_mut().filter(|e| e.is_alive()) {
            apply_border_rule(entity, &border, mode, events);
        }
    }

    /// Remove every dead entity. This is the only place entities leave the
    /// world. Clears the player if it was among them.
    pub fn remove_dead_entities(&mut self) -> Vec<EntityId> {
        let mut removed = Vec::new();
        self.entities.retain(|e| {
            if e.is_alive() {
                true
            } else {
                removed.push(e.id());
                false
            }
        });
        if let Some(player) = self.player {
            if removed.contains(&player) {
                log::debug!("player {} reaped", player);
                self.player = None;
            }
        }
        if !removed.is_empty() {
            log::debug!("tick {}: reaped {} entities", self.tick_count, removed.len());
        }
        removed
    }

    // -- Entity management --

    /// Add an entity. Fails if its id is still in use.
    pub fn add_entity(&mut self, entity: Entity) -> Result<EntityId, EngineError> {
        let id = entity.id();
        if self.contains(id) {
            return Err(EngineError::DuplicateEntity(id));
        }
        self.entities.push(entity);
        Ok(id)
    }

    /// Create, add and return a basic entity for further configuration.
    pub fn create_entity(
        &mut self,
        id: EntityId,
        tag: &str,
        pos: IVec2,
        shape: Option<ShapeHandle>,
    ) -> Result<&mut Entity, EngineError> {
        let mut entity = Entity::new(id).with_tag(tag).with_pos(pos.x, pos.y);
        entity.shape = shape;
        self.add_entity(entity)?;
        let last = self.entities.len() - 1;
        Ok(&mut self.entities[last])
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.iter().any(|e| e.id() == id)
    }

    /// Get a reference to an entity by ID.
    pub fn find_entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id() == id)
    }

    /// Get a mutable reference to an entity by ID.
    pub fn find_entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|e| e.id() == id)
    }

    /// All live entities with the given tag.
    pub fn find_entities_by_tag<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a Entity> + 'a {
        self.entities
            .iter()
            .filter(move |e| e.is_alive() && e.tag == tag)
    }

    /// All live entities with the given tag (mutable).
    pub fn find_entities_by_tag_mut<'a>(&'a mut self, tag: &'a str) -> impl Iterator<Item = &'a mut Entity> + 'a {
        self.entities
            .iter_mut()
            .filter(move |e| e.is_alive() && e.tag == tag)
    }

    /// Kill an entity by id. Returns false if there is no such entity.
    pub fn kill(&mut self, id: EntityId) -> bool {
        match self.find_entity_mut(id) {
            Some(e) => {
                e.kill();
                true
            }
            None => false,
        }
    }

    /// Kill every entity; they are removed at the next reap.
    pub fn kill_all(&mut self) {
        for entity in &mut self.entities {
            entity.kill();
        }
    }

    /// Iterate over all entities, including dead ones awaiting reap.
    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }

    pub fn entities_mut(&mut self) -> impl Iterator<Item = &mut Entity> {
        self.entities.iter_mut()
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    // -- Player alias --

    /// Mark an existing entity as the player.
    pub fn set_player(&mut self, id: EntityId) -> Result<(), EngineError> {
        if !self.contains(id) {
            return Err(EngineError::UnknownEntity(id));
        }
        self.player = Some(id);
        Ok(())
    }

    pub fn clear_player(&mut self) {
        self.player = None;
    }

    pub fn player_id(&self) -> Option<EntityId> {
        self.player
    }

    /// The player entity, resolved by id on every call.
    pub fn player(&self) -> Option<&Entity> {
        self.player.and_then(|id| self.find_entity(id))
    }

    pub fn player_mut(&mut self) -> Option<&mut Entity> {
        let id = self.player?;
        self.find_entity_mut(id)
    }

    // -- Rendering --

    pub fn collect_drawables(&self, out: &mut Vec<Drawable>) {
        build_draw_list(self.entities.iter(), out);
    }

    pub fn collect_status_lines(&self, out: &mut Vec<String>) {
        out.extend(self.status_lines.iter().cloned());
    }

    pub fn status_lines(&self) -> &[String] {
        &self.status_lines
    }

    pub fn add_status_line(&mut self, line: impl Into<String>) {
        self.status_lines.push(line.into());
    }

    pub fn set_status_lines(&mut self, lines: Vec<String>) {
        self.status_lines = lines;
    }

    pub fn clear_status_lines(&mut self) {
        self.status_lines.clear();
    }

    // -- Getters / setters --

    pub fn border(&self) -> &Hitbox {
        &self.border
    }

    pub fn border_mode(&self) -> BorderMode {
        self.border_mode
    }

    pub fn set_border_mode(&mut self, mode: BorderMode) {
        self.border_mode = mode;
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new(78, 20, BorderMode::Solid)
    }
}

/// `yielder` steps back first. A yielder that did not move this tick cannot
/// clear the overlap alone, so `other` steps back as well.
fn separate_solids(yielder: &mut Entity, other: &mut Entity) {
    let moved = yielder.prev_position() != yielder.position();
    yielder.revert_position();
    if !moved || yielder.hitbox.intersects(&other.hitbox, yielder.position(), other.position()) {
        other.revert_position();
    }
}

fn apply_border_rule(entity: &mut Entity, border: &Hitbox, mode: BorderMode, events: &mut EventQueue) {
    if !entity.clamp_to_borders && mode == BorderMode::View {
        return;
    }
    let hitbox = entity.hitbox;
    if hitbox.is_empty() {
        return;
    }

    // Range of positions keeping the whole box inside the border.
    let min = border.offset - hitbox.offset;
    let max = border.offset + border.size - (hitbox.offset + hitbox.size);
    if max.x < min.x || max.y < min.y {
        return;
    }

    let mut crossed = [None; 2];
    if entity.pos.x < min.x {
        entity.pos.x = min.x;
        crossed[0] = Some(Side::Left);
    } else if entity.pos.x > max.x {
        entity.pos.x = max.x;
        crossed[0] = Some(Side::Right);
    }
    if entity.pos.y < min.y {
        entity.pos.y = min.y;
        crossed[1] = Some(Side::Top);
    } else if entity.pos.y > max.y {
        entity.pos.y = max.y;
        crossed[1] = Some(Side::Bottom);
    }

    if entity.clamp_to_borders {
        return;
    }
    for side in crossed.into_iter().flatten() {
        events.push(Event::Border { entity: entity.id(), side });
    }
}
