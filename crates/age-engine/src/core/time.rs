use std::time::{Duration, Instant};

/// Fixed-tick wall clock.
/// Sleeps the calling thread until the next tick boundary so the game logic
/// runs at a steady rate regardless of how long a tick took.
pub struct Clock {
    /// The fixed duration of one tick.
    tick_duration: Duration,
    /// Boundary of the most recent tick.
    last_tick: Instant,
}

impl Clock {
    pub fn new(tick_duration: Duration) -> Self {
        Self {
            tick_duration,
            last_tick: Instant::now(),
        }
    }

    pub fn from_secs_f32(secs: f32) -> Self {
        Self::new(Duration::from_secs_f32(secs.max(0.0)))
    }

    /// Mark a tick boundary. Returns the seconds elapsed since the previous one.
    pub fn tick(&mut self) -> f32 {
        let now = Instant::now();
        let dt = now.duration_since(self.last_tick).as_secs_f32();
        self.last_tick = now;
        dt
    }

    /// Time left until the next boundary; zero when it has already passed.
    pub fn remaining(&self) -> Duration {
        (self.last_tick + self.tick_duration).saturating_duration_since(Instant::now())
    }

    /// Block until the next tick boundary, then mark it.
    /// A tick that overran its budget does not try to catch up.
    pub fn sleep_until_next_tick(&mut self) -> f32 {
        let remaining = self.remaining();
        if !remaining.is_zero() {
            std::thread::sleep(remaining);
        }
        self.tick()
    }

    /// The fixed duration of one tick.
    pub fn tick_duration(&self) -> Duration {
        self.tick_duration
    }

    pub fn reset(&mut self) {
        self.last_tick = Instant::now();
    }
}
