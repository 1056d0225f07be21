//! Noise sources for unvoiced synthesis and phase dither.

use std::f32::consts::PI;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::consts::SAMPLES_PER_FRAME;

/// Number of samples in the noise buffer.
pub const NOISE_LEN: usize = 256;
/// Samples carried over from the previous buffer.
pub const NOISE_OVERLAP: usize = NOISE_LEN - SAMPLES_PER_FRAME;

/// Peak amplitude of the generated noise, relative to full scale.
const NOISE_AMPLITUDE: f32 = 0.81;

/// Seeded random number source.
#[derive(Clone, Debug)]
pub struct Noise(Pcg32);

impl Noise {
    /// Create a new `Noise` source from the given seed.
    pub fn new(seed: u64) -> Noise {
        Noise(Pcg32::seed_from_u64(seed))
    }

    /// Draw a uniform sample in ±`NOISE_AMPLITUDE`.
    pub fn sample(&mut self) -> f32 {
        self.0.gen_range(-NOISE_AMPLITUDE..NOISE_AMPLITUDE)
    }

    /// Draw a uniform phase in [-π, π).
    pub fn next_phase(&mut self) -> f32 {
        self.0.gen_range(-PI..PI)
    }
}

/// Generates overlapping buffers of white noise, one per frame.
///
/// Each buffer shares its first `NOISE_OVERLAP` samples with the last samples of the
/// previous buffer, which lets the windowed noise of consecutive frames line up.
#[derive(Clone, Debug)]
pub struct NoiseGenerator {
    buf: [f32; NOISE_LEN],
    src: Noise,
}

impl NoiseGenerator {
    /// Create a new `NoiseGenerator` with its buffer filled from the given seed.
    pub fn new(seed: u64) -> NoiseGenerator {
        let mut src = Noise::new(seed);
        let mut buf = [0.0; NOISE_LEN];

        for x in buf.iter_mut() {
            *x = src.sample();
        }

        NoiseGenerator { buf, src }
    }

    /// Return a snapshot of the current buffer, then advance it by one frame.
    pub fn next_buffer(&mut self) -> [f32; NOISE_LEN] {
        let cur = self.buf;

        self.buf.copy_within(SAMPLES_PER_FRAME.., 0);

        for x in self.buf[NOISE_OVERLAP..].iter_mut() {
            *x = self.src.sample();
        }

        cur
    }
}
