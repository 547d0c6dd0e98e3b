use crate::assets::registry::ShapeHandle;
use crate::components::entity::Entity;

/// One draw command: a shape at a grid position with a draw order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Drawable {
    pub shape: ShapeHandle,
    pub x: i32,
    pub y: i32,
    /// Higher z is drawn later (on top).
    pub z: i32,
}

impl Drawable {
    pub fn new(shape: ShapeHandle, x: i32, y: i32, z: i32) -> Self {
        Self { shape, x, y, z }
    }
}

/// Everything the render collaborator needs for one frame.
/// Built after the tick pipeline finishes; carries no access to the simulation.
#[derive(Debug, Clone, Default)]
pub struct RenderSnapshot {
    /// Draw commands sorted by z, ties in entity order.
    pub drawables: Vec<Drawable>,
    /// Status text lines shown under the play field.
    pub status: Vec<String>,
    pub tick: u64,
}

/// Build the draw list from a set of entities.
/// Dead and shapeless entities are skipped; the sort is stable so equal z
/// keeps insertion order.
pub fn build_draw_list<'a>(entities: impl Iterator<Item = &'a Entity>, out: &mut Vec<Drawable>) {
    out.clear();
    out.extend(
        entities
            .filter(|e| e.is_alive())
            .filter_map(Entity::to_drawable),
    );
    out.sort_by_key(|d| d.z);
}
