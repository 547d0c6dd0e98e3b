//! Game-logic randomness: spawn rows, star fields, which enemy fires.
//! Seeded from `GameConfig::seed`, so a run with the same seed and the same
//! keys plays out identically.

#[derive(Debug, Clone)]
pub struct Rng {
    seed: u64,
    state: u64,
}

impl Rng {
    /// A zero seed would lock xorshift at zero; it is bumped to one.
    pub fn new(seed: u64) -> Self {
        let state = seed.max(1);
        Rng { seed: state, state }
    }

    /// The seed this generator started from.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Integer cell coordinate in `[low, high]`, both ends inclusive.
    /// An empty range yields `low`.
    pub fn range(&mut self, low: i32, high: i32) -> i32 {
        if high <= low {
            return low;
        }
        let span = (i64::from(high) - i64::from(low) + 1) as u64;
        low + (self.step() % span) as i32
    }

    /// Index in `[0, len)`; 0 when `len` is 0.
    pub fn below(&mut self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        (self.step() % len as u64) as usize
    }

    /// A uniformly chosen element, `None` for an empty slice.
    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        let index = self.below(items.len());
        items.get(index)
    }

    // xorshift64
    fn step(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }
}
