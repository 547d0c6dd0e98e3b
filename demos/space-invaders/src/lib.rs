mod game;

pub use game::{SpaceInvaders, ENEMY_BULLET_TAG, ENEMY_TAG, PLAYER_BULLET_TAG, PLAYER_TAG};
