//! Phase-continuous complex oscillator.

use num::complex::Complex32;

/// Number of samples between magnitude corrections.
const RENORM_PERIOD: usize = 64;

/// Generates a complex sinusoid by repeatedly rotating a unit phasor.
///
/// Each sample costs a single complex multiply, and the accumulated rounding error is
/// periodically removed by rescaling the phasor back onto the unit circle.
#[derive(Copy, Clone, Debug)]
pub struct Oscillator {
    /// Current phasor e<sup>jφ</sup>.
    phasor: Complex32,
    /// Per-sample rotation e<sup>jω</sup>.
    step: Complex32,
    /// Samples generated since the last correction.
    count: usize,
}

impl Oscillator {
    /// Create a new `Oscillator` at the given initial phase and frequency, both in
    /// radians.
    pub fn new(phase: f32, freq: f32) -> Oscillator {
        Oscillator {
            phasor: Complex32::from_polar(1.0, phase),
            step: Complex32::from_polar(1.0, freq),
            count: 0,
        }
    }

    /// Change the frequency without disturbing the phase.
    pub fn set_freq(&mut self, freq: f32) {
        self.step = Complex32::from_polar(1.0, freq);
    }

    /// Current phasor value.
    pub fn phasor(&self) -> Complex32 { self.phasor }

    /// Advance the phase by the given number of samples.
    pub fn advance(&mut self, samples: usize) {
        for _ in 0..samples {
            self.tick();
        }
    }

    fn tick(&mut self) {
        self.phasor = self.phasor * self.step;
        self.count += 1;

        if self.count == RENORM_PERIOD {
            self.phasor = self.phasor.unscale(self.phasor.norm());
            self.count = 0;
        }
    }
}

/// At each iteration, yield the current phasor and rotate by one sample.
impl Iterator for Oscillator {
    type Item = Complex32;

    fn next(&mut self) -> Option<Self::Item> {
        let cur = self.phasor();
        self.tick();
        Some(cur)
    }
}
