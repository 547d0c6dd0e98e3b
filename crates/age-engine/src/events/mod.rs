pub mod bus;
pub mod event;

pub use bus::{Emitter, EventBus, EventQueue, Handler, SubscriptionId};
pub use event::{CollisionEvent, Event};
