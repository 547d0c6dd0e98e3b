mod game;

pub use game::{FlappyBird, BIRD_TAG, GAP_TAG, PIPE_TAG};
