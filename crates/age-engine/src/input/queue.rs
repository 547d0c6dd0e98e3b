use std::collections::VecDeque;

/// A keyboard key. Printable keys use their character code;
/// arrow and control keys use the named constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyCode(pub u32);

impl KeyCode {
    pub const ESCAPE: KeyCode = KeyCode(27);
    pub const SPACE: KeyCode = KeyCode(' ' as u32);
    // Above the Unicode range so they never collide with a character.
    pub const UP: KeyCode = KeyCode(0x11_0001);
    pub const DOWN: KeyCode = KeyCode(0x11_0002);
    pub const LEFT: KeyCode = KeyCode(0x11_0003);
    pub const RIGHT: KeyCode = KeyCode(0x11_0004);

    pub const fn from_char(c: char) -> Self {
        KeyCode(c as u32)
    }

    /// The character this key produces, if it is a printable key.
    pub fn as_char(self) -> Option<char> {
        char::from_u32(self.0)
    }

    /// Case-insensitive match against a letter key.
    pub fn is_char_ignore_case(self, c: char) -> bool {
        self.as_char()
            .is_some_and(|k| k.eq_ignore_ascii_case(&c))
    }
}

impl From<char> for KeyCode {
    fn from(c: char) -> Self {
        KeyCode::from_char(c)
    }
}

/// The single input value supplied for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputEvent {
    /// Nothing was pressed this tick.
    #[default]
    Idle,
    /// A key was pressed.
    Key(KeyCode),
}

impl InputEvent {
    pub fn key(&self) -> Option<KeyCode> {
        match self {
            InputEvent::Key(k) => Some(*k),
            InputEvent::Idle => None,
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, InputEvent::Idle)
    }
}

/// FIFO of pending key presses.
/// The input collaborator pushes; the runner pops one per tick.
pub struct InputQueue {
    events: VecDeque<InputEvent>,
}

impl InputQueue {
    pub fn new() -> Self {
        Self {
            events: VecDeque::with_capacity(32),
        }
    }

    /// Queue a new input event. Idle events are not stored.
    pub fn push(&mut self, event: InputEvent) {
        if !event.is_idle() {
            self.events.push_back(event);
        }
    }

    /// Take the input for the next tick; `Idle` when nothing is pending.
    pub fn next_tick(&mut self) -> InputEvent {
        self.events.pop_front().unwrap_or_default()
    }

    /// Drain all pending events.
    pub fn drain(&mut self) -> Vec<InputEvent> {
        self.events.drain(..).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &InputEvent> {
        self.events.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl Default for InputQueue {
    fn default() -> Self {
        Self::new()
    }
}
