//! Spectral amplitude enhancement and adaptive smoothing.

use std::f32::consts::PI;
use std::iter::FromIterator;
use std::ops::{Deref, DerefMut};

use arrayvec::ArrayVec;

use crate::consts::MAX_HARMONICS;
use crate::descramble::VoiceDecisions;
use crate::params::BaseParams;
use crate::policy::FrameErrors;
use crate::spectral::Spectrals;

/// Energy-related parameters for a voice frame.
#[derive(Copy, Clone, Debug)]
pub struct FrameEnergy {
    /// Spectral amplitude energy, R<sub>M0</sub>.
    pub energy: f32,
    /// Scaled energy value, R<sub>M1</sub>.
    pub scaled: f32,
    /// Moving average energy tracker, S<sub>E</sub>.
    pub tracking: f32,
}

impl FrameEnergy {
    /// Create a new `FrameEnergy` from the given spectral amplitudes M<sub>l</sub>,
    /// previous frame energy values, and current frame parameters.
    pub fn new(spectrals: &Spectrals, prev: &FrameEnergy, params: &BaseParams)
        -> FrameEnergy
    {
        // Compute energy of spectral amplitudes according to Eq 105.
        let energy = spectrals.iter()
            .map(|&m| m.powi(2))
            .sum::<f32>();

        // Compute scaled energies according to Eq 106.
        let scaled = spectrals.iter().enumerate()
            .map(|(l, &m)| m.powi(2) * (params.fundamental * (l + 1) as f32).cos())
            .sum::<f32>();

        FrameEnergy {
            energy,
            scaled,
            // Compute energy tracking EWMA according to Eq 111.
            tracking: (0.95 * prev.tracking + 0.05 * energy).max(10000.0),
        }
    }
}

impl Default for FrameEnergy {
    /// Create a new `FrameEnergy` with default initial values.
    fn default() -> FrameEnergy {
        // Only the tracker carries across frames.
        FrameEnergy {
            energy: 0.0,
            scaled: 0.0,
            tracking: 75000.0,
        }
    }
}

/// Enhanced spectral amplitudes, "overbar" M<sub>l</sub>, are derived from the decoded
/// spectral amplitudes, "tilde" M<sub>l</sub>.
#[derive(Clone, Debug, Default)]
pub struct EnhancedSpectrals(ArrayVec<f32, MAX_HARMONICS>);

impl EnhancedSpectrals {
    /// Create a new `EnhancedSpectrals` from the given base spectral amplitudes
    /// M<sub>l</sub> and current frame energy values and parameters.
    pub fn new(spectrals: &Spectrals, fen: &FrameEnergy, params: &BaseParams)
        -> EnhancedSpectrals
    {
        // Compute R_M0^2.
        let energy_sqr = fen.energy.powi(2);
        // Compute R_M1^2.
        let scaled_sqr = fen.scaled.powi(2);
        // Compute denominator term of Eq 107.
        let denom = params.fundamental * fen.energy * (energy_sqr - scaled_sqr);

        let mut enhanced: EnhancedSpectrals = spectrals.iter().enumerate().map(|(l, &m)| {
            let l = l + 1;

            // Handle fast-path case in Eq 108.
            if 8 * l as u32 <= params.harmonics {
                return m;
            }

            // Compute Eq 107.
            let weight = m.sqrt() * (
                0.96 * PI * (
                    energy_sqr + scaled_sqr - 2.0 * fen.energy * fen.scaled *
                        (params.fundamental * l as f32).cos()
                ) / denom
            ).powf(0.25);

            // Scale current spectral amplitude according to Eq 108.
            m * weight.max(0.5).min(1.2)
        }).collect();

        // Compute root ratio of energies according to Eq 109.
        let scale = (fen.energy / enhanced.iter().map(|m| m.powi(2)).sum::<f32>()).sqrt();

        // Perform second scaling pass according to Eq 110.
        enhanced.scale(scale);

        enhanced
    }

    /// Retrieve the enhanced spectral amplitude M<sub>l</sub>, 1 ≤ l ≤ L.
    pub fn get(&self, l: usize) -> f32 {
        assert!(l >= 1);

        match self.0.get(l - 1) {
            Some(&s) => s,
            // Out-of-bounds amplitudes are zero [p60].
            None => 0.0,
        }
    }

    /// Crossfade halfway towards the given previous frame's amplitudes.
    pub fn blend(&mut self, prev: &EnhancedSpectrals) {
        for (l, m) in self.0.iter_mut().enumerate() {
            *m = 0.5 * (*m + prev.get(l + 1));
        }
    }

    fn scale(&mut self, scale: f32) {
        for m in self.0.iter_mut() {
            *m *= scale;
        }
    }
}

impl FromIterator<f32> for EnhancedSpectrals {
    fn from_iter<I: IntoIterator<Item = f32>>(iter: I) -> Self {
        EnhancedSpectrals(iter.into_iter().take(MAX_HARMONICS).collect())
    }
}

impl Deref for EnhancedSpectrals {
    type Target = [f32];
    fn deref(&self) -> &Self::Target { &self.0 }
}

impl DerefMut for EnhancedSpectrals {
    fn deref_mut(&mut self) -> &mut Self::Target { &mut self.0 }
}

/// Compute the spectral amplitude threshold τ<sub>M</sub> used in adaptive smoothing from
/// the given error characteristics and previous amplitude threshold.
pub fn amp_thresh(errors: &FrameErrors, prev: f32) -> f32 {
    // Compute Eq 115.
    if errors.rate <= 0.005 && errors.total <= 6 {
        20480.0
    } else {
        6000.0 - 300.0 * errors.total as f32 + prev
    }
}

/// Smooth the given enhanced spectral amplitudes M<sub>l</sub> and voiced/unvoiced
/// decisions v<sub>l</sub> based on the given error characteristics, current frame
/// energy, and spectral amplitude threshold τ<sub>M</sub> for the current frame.
pub fn smooth(enhanced: &mut EnhancedSpectrals, voiced: &mut VoiceDecisions,
              errors: &FrameErrors, fen: &FrameEnergy, amp_thresh: f32)
{
    let thresh = voicing_thresh(errors, fen);

    // Update voiced/unvoiced decisions according to Eq 113.
    for (l, &m) in enhanced.iter().enumerate() {
        if m > thresh {
            voiced.force_voiced(l + 1);
        }
    }

    // Compute amplitude sum in Eq 114.
    let amp = enhanced.iter().sum::<f32>();

    // Compute scale factor in Eq 116.
    if amp > 0.0 {
        // Scale each enhanced M_l [p50].
        enhanced.scale((amp_thresh / amp).min(1.0));
    }
}

/// Compute the amplitude above which a harmonic is forced voiced, V<sub>M</sub>.
fn voicing_thresh(errors: &FrameErrors, fen: &FrameEnergy) -> f32 {
    // Compute Eq 112.
    if errors.rate <= 0.005 && errors.total <= 4 {
        f32::MAX
    } else if errors.rate <= 0.0125 && errors.hamming_init == 0 {
        45.255 * fen.tracking.powf(0.375) / (277.26 * errors.rate).exp()
    } else {
        1.414 * fen.tracking.powf(0.375)
    }
}
