//! Keyboard capture. The terminal is switched to raw mode so every key press
//! arrives on its own, without waiting for Enter; the game loop drains the
//! pending key events between ticks without blocking.

use std::io;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode as TermKey, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::{cursor, execute, terminal};

use age_engine::{InputEvent, InputQueue, KeyCode};

/// Anything that can feed pending keys into the input queue.
pub trait KeySource {
    fn poll(&mut self, queue: &mut InputQueue);

    /// True once no more keys can arrive.
    fn is_closed(&self) -> bool {
        false
    }

    /// True once the player asked to abort the whole run (Ctrl-C).
    fn interrupted(&self) -> bool {
        false
    }
}

/// Raw mode plus the alternate screen for as long as the guard lives.
/// Dropping it puts the terminal back the way it was.
pub struct RawTerminal {
    _private: (),
}

impl RawTerminal {
    pub fn enable() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        if let Err(err) = execute!(io::stdout(), terminal::EnterAlternateScreen, cursor::Hide) {
            let _ = terminal::disable_raw_mode();
            return Err(err);
        }
        Ok(Self { _private: () })
    }
}

impl Drop for RawTerminal {
    fn drop(&mut self) {
        if let Err(err) = execute!(io::stdout(), cursor::Show, terminal::LeaveAlternateScreen) {
            log::warn!("could not leave the alternate screen: {err}");
        }
        if let Err(err) = terminal::disable_raw_mode() {
            log::warn!("could not restore the terminal: {err}");
        }
    }
}

/// Key presses read from the terminal through crossterm's event queue.
#[derive(Debug, Default)]
pub struct TerminalKeys {
    closed: bool,
    interrupted: bool,
}

impl TerminalKeys {
    pub fn new() -> Self {
        Self::default()
    }

    /// Translate one terminal event and queue it if it is a game key.
    pub fn forward(&mut self, event: Event, queue: &mut InputQueue) {
        let Event::Key(key) = event else {
            return;
        };
        if is_interrupt(&key) {
            log::debug!("interrupted from the keyboard");
            self.interrupted = true;
            return;
        }
        if let Some(input) = map_key(&key) {
            queue.push(input);
        }
    }
}

impl KeySource for TerminalKeys {
    fn poll(&mut self, queue: &mut InputQueue) {
        if self.closed {
            return;
        }
        loop {
            match event::poll(Duration::ZERO) {
                Ok(false) => break,
                Ok(true) => match event::read() {
                    Ok(event) => self.forward(event, queue),
                    Err(err) => {
                        log::warn!("terminal read failed: {err}");
                        self.closed = true;
                        break;
                    }
                },
                Err(err) => {
                    log::warn!("terminal poll failed: {err}");
                    self.closed = true;
                    break;
                }
            }
        }
    }

    fn is_closed(&self) -> bool {
        self.closed
    }

    fn interrupted(&self) -> bool {
        self.interrupted
    }
}

fn is_interrupt(key: &KeyEvent) -> bool {
    key.kind == KeyEventKind::Press
        && key.modifiers.contains(KeyModifiers::CONTROL)
        && matches!(key.code, TermKey::Char('c') | TermKey::Char('C'))
}

/// Presses and repeats of printable, arrow and escape keys. Releases,
/// control chords and everything else are dropped.
pub fn map_key(key: &KeyEvent) -> Option<InputEvent> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    if key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) {
        return None;
    }
    let code = match key.code {
        TermKey::Char(c) => KeyCode::from_char(c),
        TermKey::Up => KeyCode::UP,
        TermKey::Down => KeyCode::DOWN,
        TermKey::Left => KeyCode::LEFT,
        TermKey::Right => KeyCode::RIGHT,
        TermKey::Esc => KeyCode::ESCAPE,
        _ => return None,
    };
    Some(InputEvent::Key(code))
}

/// A fixed list of keys delivered on the first poll.
#[derive(Debug, Default)]
pub struct ScriptedKeys {
    pending: Vec<InputEvent>,
}

impl ScriptedKeys {
    pub fn new(keys: Vec<InputEvent>) -> Self {
        Self { pending: keys }
    }
}

impl KeySource for ScriptedKeys {
    fn poll(&mut self, queue: &mut InputQueue) {
        for event in self.pending.drain(..) {
            queue.push(event);
        }
    }
}
