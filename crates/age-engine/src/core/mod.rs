pub mod hitbox;
pub mod rng;
pub mod time;
pub mod world;
