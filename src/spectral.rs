//! Spectral amplitudes.

use std::ops::Deref;

use arrayvec::ArrayVec;

use crate::coefs::Coefficients;
use crate::consts::MAX_HARMONICS;
use crate::params::{BaseParams, FrameParams};

/// Spectral amplitudes M<sub>l</sub>, 1 ≤ l ≤ L, measure the spectral envelope of the
/// voiced/unvoiced signal spectrum.
#[derive(Clone, Debug)]
pub struct Spectrals(ArrayVec<f32, MAX_HARMONICS>);

impl Spectrals {
    /// Create a new `Spectrals` from the given DCT coefficients vector T<sub>l</sub>,
    /// current frame parameters, and previous frame, whose amplitudes form the prediction.
    pub fn new(coefs: &Coefficients, params: &BaseParams, prev: &FrameParams) -> Spectrals {
        // Compute L(-1) / L(0).
        let scale = prev.base.harmonics as f32 / params.harmonics as f32;

        // Compute (k_l, δ_l) for the given harmonic l [p35].
        let indexes = |l: u32| {
            let k = scale * l as f32;
            (k.trunc() as usize, k.fract())
        };

        // Predicted log amplitude from the previous frame, interpolated between the
        // neighboring harmonics.
        let predicted = |l: u32| {
            let (k, dec) = indexes(l);

            (1.0 - dec) * prev.spectrals.get(k).log2() +
                dec * prev.spectrals.get(k + 1).log2()
        };

        // Compute prediction coefficient ρ [p27].
        let pred = (0.03 * params.harmonics as f32 - 0.05).max(0.4).min(0.7);

        // Compute the mean prediction, which is removed so only the spectral shape is
        // carried over.
        let mean = (1..=params.harmonics).map(&predicted).sum::<f32>() /
            params.harmonics as f32;

        Spectrals((1..=params.harmonics).map(|l| {
            (coefs.get(l as usize) + pred * (predicted(l) - mean)).exp2()
        }).collect())
    }

    /// Retrieve the spectral amplitude M<sub>l</sub> for the given l.
    pub fn get(&self, l: usize) -> f32 {
        if l == 0 {
            // M_0 is defined as 1.
            1.0
        } else if l > self.0.len() {
            // Amplitudes past L repeat M_L.
            self.0.last().copied().unwrap_or(1.0)
        } else {
            self.0[l - 1]
        }
    }
}

impl Deref for Spectrals {
    type Target = [f32];
    fn deref(&self) -> &Self::Target { &self.0 }
}

impl Default for Spectrals {
    /// Construct the default set of spectral amplitudes.
    fn default() -> Spectrals {
        // By default, M_l = 1 [p35].
        Spectrals((0..MAX_HARMONICS).map(|_| 1.0).collect())
    }
}
