//! Audio contract. The engine routes `Event::Sound` to whatever implements
//! [`SoundSystem`]; backends live outside the core.

/// A sound backend keyed by string sound ids.
pub trait SoundSystem {
    fn play(&mut self, sound_id: &str);
    fn stop_all(&mut self);
    fn set_muted(&mut self, muted: bool);
    fn is_muted(&self) -> bool;

    fn toggle_mute(&mut self) {
        let muted = self.is_muted();
        self.set_muted(!muted);
    }
}

/// Silent backend for tests and `--mute`.
#[derive(Debug, Default)]
pub struct NullSound {
    muted: bool,
}

impl NullSound {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SoundSystem for NullSound {
    fn play(&mut self, _sound_id: &str) {}

    fn stop_all(&mut self) {}

    fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    fn is_muted(&self) -> bool {
        self.muted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_flips_mute() {
        let mut sound = NullSound::new();
        assert!(!sound.is_muted());
        sound.toggle_mute();
        assert!(sound.is_muted());
        sound.toggle_mute();
        assert!(!sound.is_muted());
    }
}
