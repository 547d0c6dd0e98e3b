use std::io::Write;

use age_engine::SoundSystem;

/// Rings the terminal bell for every sound. Ids are only logged.
pub struct TerminalBell<W: Write> {
    out: W,
    muted: bool,
}

impl<W: Write> TerminalBell<W> {
    pub fn new(out: W) -> Self {
        Self { out, muted: false }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl TerminalBell<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> SoundSystem for TerminalBell<W> {
    fn play(&mut self, sound_id: &str) {
        if self.muted {
            return;
        }
        log::debug!("sound: {sound_id}");
        if let Err(err) = self.out.write_all(b"\x07").and_then(|_| self.out.flush()) {
            log::warn!("bell failed: {err}");
        }
    }

    fn stop_all(&mut self) {}

    fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    fn is_muted(&self) -> bool {
        self.muted
    }
}
