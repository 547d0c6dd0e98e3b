use glam::IVec2;

/// Integer grid coordinate. Freely copied.
pub type Position = IVec2;

/// Unique identifier for an entity in the world.
/// Chosen by the caller; never reused while the original entity is alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u32);

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Collision response class of an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Solidity {
    /// Blocks relative motion and raises a collision notification.
    #[default]
    Solid,
    /// Raises a collision notification but never blocks.
    Trigger,
    /// Neither blocks nor notifies.
    Ghost,
}

/// Whether the world boundary blocks entities or is purely cosmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BorderMode {
    /// Entities are clamped inside and a border event is raised.
    #[default]
    Solid,
    /// Entities may leave the visible area freely.
    View,
}

/// Side of the world border an entity crossed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
    Top,
    Bottom,
}
