use crate::api::types::{EntityId, Side};

/// Two entities whose hitboxes overlapped this tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollisionEvent {
    pub a: EntityId,
    pub b: EntityId,
    pub tag_a: String,
    pub tag_b: String,
}

impl CollisionEvent {
    /// Whether either side carries `tag`.
    pub fn involves(&self, tag: &str) -> bool {
        self.tag_a == tag || self.tag_b == tag
    }

    /// Whether the pair is exactly {tag1, tag2}, in either order.
    pub fn is_between(&self, tag1: &str, tag2: &str) -> bool {
        (self.tag_a == tag1 && self.tag_b == tag2) || (self.tag_a == tag2 && self.tag_b == tag1)
    }

    /// Id of the side carrying `tag` (side `a` wins if both do).
    pub fn id_with_tag(&self, tag: &str) -> Option<EntityId> {
        if self.tag_a == tag {
            Some(self.a)
        } else if self.tag_b == tag {
            Some(self.b)
        } else {
            None
        }
    }
}

/// Everything that travels over the event bus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Collision(CollisionEvent),
    GameOver { won: bool, reason: String },
    Sound { sound_id: String },
    Border { entity: EntityId, side: Side },
    /// Game-defined event; `kind` is its type tag.
    Custom { kind: String, value: i64 },
}

impl Event {
    pub const COLLISION: &'static str = "collision";
    pub const GAME_OVER: &'static str = "game_over";
    pub const SOUND: &'static str = "sound";
    pub const BORDER: &'static str = "border";
    /// Subscribing to this tag receives every event.
    pub const WILDCARD: &'static str = "*";

    pub fn collision(a: EntityId, b: EntityId, tag_a: impl Into<String>, tag_b: impl Into<String>) -> Self {
        Event::Collision(CollisionEvent {
            a,
            b,
            tag_a: tag_a.into(),
            tag_b: tag_b.into(),
        })
    }

    pub fn sound(sound_id: impl Into<String>) -> Self {
        Event::Sound { sound_id: sound_id.into() }
    }

    pub fn game_over(won: bool, reason: impl Into<String>) -> Self {
        Event::GameOver { won, reason: reason.into() }
    }

    pub fn custom(kind: impl Into<String>, value: i64) -> Self {
        Event::Custom { kind: kind.into(), value }
    }

    /// The tag subscriptions are matched against.
    pub fn type_tag(&self) -> &str {
        match self {
            Event::Collision(_) => Self::COLLISION,
            Event::GameOver { .. } => Self::GAME_OVER,
            Event::Sound { .. } => Self::SOUND,
            Event::Border { .. } => Self::BORDER,
            Event::Custom { kind, .. } => kind,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collision_tag_helpers() {
        let Event::Collision(c) = Event::collision(EntityId(1), EntityId(2), "bird", "pipe") else {
            panic!("expected collision");
        };
        assert!(c.involves("pipe"));
        assert!(!c.involves("gap"));
        assert!(c.is_between("pipe", "bird"));
        assert!(!c.is_between("pipe", "pipe"));
        assert_eq!(c.id_with_tag("pipe"), Some(EntityId(2)));
        assert_eq!(c.id_with_tag("star"), None);
    }

    #[test]
    fn type_tags() {
        assert_eq!(Event::sound("flap").type_tag(), "sound");
        assert_eq!(Event::game_over(true, "").type_tag(), "game_over");
        assert_eq!(Event::custom("level_up", 2).type_tag(), "level_up");
        assert_eq!(
            Event::Border { entity: EntityId(1), side: Side::Top }.type_tag(),
            "border"
        );
    }
}
