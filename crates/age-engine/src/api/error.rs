use thiserror::Error;

use crate::api::types::EntityId;

/// Setup-time configuration errors.
///
/// The tick pipeline never produces these; they surface while a game is
/// registering shapes and entities, before the first tick runs.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("entity id {0} is already in use")]
    DuplicateEntity(EntityId),
    #[error("no entity with id {0}")]
    UnknownEntity(EntityId),
    #[error("shape '{0}' is already registered")]
    DuplicateShape(String),
    #[error("shape '{id}' is malformed: {reason}")]
    MalformedShape { id: String, reason: &'static str },
    #[error("no shape named '{0}'")]
    UnknownShape(String),
    #[error("invalid shape manifest: {0}")]
    Manifest(#[from] serde_json::Error),
}
