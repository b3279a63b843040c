//! Seeded xorshift32 generator.
//!
//! Produces a reproducible stream of floats in `[0, 1)` from a 32-bit seed.
//! All arithmetic is wrapping `u32`, so a given seed yields the same stream
//! on every platform. A zero seed is a fixed point and draws `0.0` forever.

const TWO_POW_32: f64 = 4_294_967_296.0;

#[derive(Debug, Clone)]
pub struct Xorshift32 {
    state: u32,
}

impl Xorshift32 {
    pub fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    /// Advance the state and return the next draw in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        f64::from(x) / TWO_POW_32
    }

    /// Current internal state (the last raw 32-bit output).
    pub fn state(&self) -> u32 {
        self.state
    }
}

impl Iterator for Xorshift32 {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        Some(self.next_f64())
    }
}

/// Closure form of the generator: each call yields the next draw.
pub fn create_generator(seed: u32) -> impl FnMut() -> f64 {
    let mut rng = Xorshift32::new(seed);
    move || rng.next_f64()
}
