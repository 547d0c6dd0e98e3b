pub mod api;
pub mod core;
pub mod components;
pub mod renderer;
pub mod input;
pub mod assets;
pub mod audio;
pub mod events;

// Re-export key types at crate root for convenience
pub use api::error::EngineError;
pub use api::game::{Engine, EngineContext, Game, GameConfig, Setup, Simulation};
pub use api::types::{BorderMode, EntityId, Position, Side, Solidity};
pub use assets::manifest::{AnimationDescriptor, FrameDescriptor, ShapeManifest};
pub use assets::registry::{Shape, ShapeHandle, ShapeRegistry};
pub use audio::{NullSound, SoundSystem};
pub use components::animation::{Animation, Frame};
pub use components::entity::{CollisionCallback, Entity};
pub use components::movement::{
    ControlKeys, CycleMovement, GravityMovement, Movement, MovementKind,
    PlayerControlledMovement, StraightMovement,
};
pub use core::hitbox::Hitbox;
pub use core::rng::Rng;
pub use core::time::Clock;
pub use core::world::World;
pub use events::{CollisionEvent, Emitter, Event, EventBus, EventQueue, SubscriptionId};
pub use input::queue::{InputEvent, InputQueue, KeyCode};
pub use renderer::{build_draw_list, Drawable, FrameData, RenderSnapshot, Renderer};
