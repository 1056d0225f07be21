//! Per-frame voice parameters.

use std::cmp;
use std::f32::consts::PI;

use crate::coefs::Coefficients;
use crate::consts::SAMPLE_RATE;
use crate::descramble::{descramble, VoiceDecisions};
use crate::enhance::{EnhancedSpectrals, FrameEnergy};
use crate::frame::Chunks;
use crate::gain::Gains;
use crate::spectral::Spectrals;

/// Parameters derived directly from the pitch period b<sub>0</sub>.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BaseParams {
    /// Fundamental frequency ω<sub>0</sub>, in radians per sample.
    pub fundamental: f32,
    /// Number of harmonics, L.
    pub harmonics: u32,
    /// Number of voiced/unvoiced bands, K.
    pub bands: u32,
}

impl BaseParams {
    /// Create a new `BaseParams` from the given pitch period b<sub>0</sub>, which must be
    /// valid.
    pub fn new(period: u8) -> BaseParams {
        let f = 4.0 * PI / (period as f32 + 39.5);
        let h = (0.9254 * (PI / f + 0.25).floor()) as u32;

        BaseParams {
            fundamental: f,
            harmonics: h,
            bands: bands(h),
        }
    }
}

impl Default for BaseParams {
    fn default() -> BaseParams {
        BaseParams {
            fundamental: 0.02985 * PI,
            harmonics: 30,
            bands: 10,
        }
    }
}

/// Compute the number of voiced/unvoiced bands K for the given number of harmonics L.
/// Each band covers 3 harmonics, and the last band takes any remainder.
pub fn bands(harmonics: u32) -> u32 {
    cmp::min((harmonics + 2) / 3, 12)
}

/// Everything decoded from a single frame that synthesis and the following frame rely
/// on.
#[derive(Clone, Debug, Default)]
pub struct FrameParams {
    pub base: BaseParams,
    /// Voiced/unvoiced decision for each harmonic.
    pub voice: VoiceDecisions,
    /// Decoded spectral amplitudes, "tilde" M<sub>l</sub>.
    pub spectrals: Spectrals,
    pub energy: FrameEnergy,
    /// Enhanced spectral amplitudes, "overbar" M<sub>l</sub>, used for synthesis.
    pub enhanced: EnhancedSpectrals,
}

impl FrameParams {
    /// Decode the parameters carried by the given chunks with pitch period b<sub>0</sub>,
    /// predicting the spectral amplitudes from the given previous frame.
    pub fn decode(chunks: &Chunks, period: u8, prev: &FrameParams) -> FrameParams {
        let base = BaseParams::new(period);
        let (amps, voice, gain_idx) = descramble(chunks, &base);
        let gains = Gains::new(gain_idx, &amps, &base);
        let coefs = Coefficients::new(&gains, &amps, &base);
        let spectrals = Spectrals::new(&coefs, &base, prev);
        let energy = FrameEnergy::new(&spectrals, &prev.energy, &base);
        let enhanced = EnhancedSpectrals::new(&spectrals, &energy, &base);

        FrameParams { base, voice, spectrals, energy, enhanced }
    }

    /// Fundamental frequency in Hz.
    pub fn fundamental_hz(&self) -> f32 {
        self.base.fundamental * SAMPLE_RATE as f32 / (2.0 * PI)
    }
}
