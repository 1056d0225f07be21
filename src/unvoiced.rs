//! Unvoiced spectrum synthesis.
//!
//! The unvoiced signal of a frame is generated in three steps:
//!
//! 1. Window one buffer of white noise and take its Discrete Fourier Transform (DFT),
//!    U<sub>w</sub>(m), over the bins that fall in unvoiced harmonic bands.
//! 2. Rescale each unvoiced band so its average power matches the band's enhanced
//!    spectral amplitude, leaving every other bin at zero.
//! 3. Inverse transform the shaped spectrum and overlap-add it with the previous frame's.
//!
//! ## Half-spectrum IDFT
//!
//! The noise is real, so its spectrum is conjugate symmetric, U<sub>w</sub>(-m) =
//! U<sub>w</sub>(m)<sup>\*</sup>, and each pair of mirrored terms in the 256-point IDFT
//! collapses to
//!
//! > U<sub>w</sub>(m) e<sup>jmφ</sup> + U<sub>w</sub>(-m) e<sup>-jmφ</sup> =
//! > 2 Re[U<sub>w</sub>(m)] cos mφ - 2 Im[U<sub>w</sub>(m)] sin mφ
//!
//! The band edges keep U<sub>w</sub>(0) and U<sub>w</sub>(-128) at zero for every pitch,
//! so only the 128 nonnegative bins need to be transformed or stored, and the inverse
//! needs no complex output.

use std::f32::consts::PI;

use num::complex::Complex32;
use num::traits::Zero;

use crate::audio::AudioBuf;
use crate::consts::SAMPLES_PER_FRAME;
use crate::descramble::VoiceDecisions;
use crate::enhance::EnhancedSpectrals;
use crate::noise::NOISE_LEN;
use crate::osc::Oscillator;
use crate::params::BaseParams;
use crate::window::{self, Window};

/// Unvoiced scaling coefficient γ<sub>w</sub> computed from Eq 121.
const SCALING_COEF: f32 = 146.6432708443356;

/// Number of points in the DFT and IDFT.
const DFT_SIZE: usize = 256;
/// Number of points in the nonnegative half of the DFT.
const DFT_HALF: usize = DFT_SIZE / 2;

/// Number of points where the windowed signal can be nonzero.
const SPAN: usize = 2 * window::SUPPORT as usize + 1;

/// Inverse transform u<sub>w</sub>(n) of the shaped unvoiced spectrum of a single frame.
#[derive(Clone)]
pub struct UnvoicedDft([f32; SPAN]);

impl UnvoicedDft {
    /// Construct a new `UnvoicedDft` from the given frame parameters and noise buffer,
    /// windowed with the given synthesis window.
    pub fn new(params: &BaseParams, voice: &VoiceDecisions, enhanced: &EnhancedSpectrals,
               noise: &[f32; NOISE_LEN], window: &Window)
        -> Self
    {
        let dft = spectrum(params, voice, enhanced, noise, window);
        let mut signal = [0.0; SPAN];

        for (i, s) in signal.iter_mut().enumerate() {
            *s = idft(&dft, i as isize - window::SUPPORT);
        }

        UnvoicedDft(signal)
    }

    /// Retrieve the IDFT u<sub>w</sub>(n) at the given point n.
    pub fn idft(&self, n: isize) -> f32 {
        if n < -window::SUPPORT || n > window::SUPPORT {
            0.0
        } else {
            self.0[(n + window::SUPPORT) as usize]
        }
    }
}

impl Default for UnvoicedDft {
    /// Create a new `UnvoicedDft` in the default state.
    fn default() -> Self {
        // By default all IDFT values are zero.
        UnvoicedDft([0.0; SPAN])
    }
}

/// Compute the nonnegative half of the shaped unvoiced spectrum, U<sub>w</sub>(m) for
/// 0 ≤ m < 128.
fn spectrum(params: &BaseParams, voice: &VoiceDecisions, enhanced: &EnhancedSpectrals,
            noise: &[f32; NOISE_LEN], window: &Window)
    -> [Complex32; DFT_HALF]
{
    // DFT values default to 0 in voiced bands and outside the harmonics.
    let mut dft = [Complex32::zero(); DFT_HALF];

    for (l, &amplitude) in enhanced.iter().enumerate() {
        let l = l + 1;

        if voice.is_voiced(l) {
            continue;
        }

        let (lower, upper) = edges(l, params);

        if lower >= upper {
            continue;
        }

        for (m, x) in dft.iter_mut().enumerate().take(upper).skip(lower) {
            *x = noise_dft(noise, window, m);
        }

        // Compute energy and power of the current band according to Eq 120.
        let energy = dft[lower..upper].iter().map(|x| x.norm_sqr()).sum::<f32>();
        let power = energy / (upper - lower) as f32;

        if power <= 0.0 {
            continue;
        }

        // Scale the band according to Eq 120.
        let scale = SCALING_COEF * amplitude / power.sqrt();

        for x in dft[lower..upper].iter_mut() {
            *x = x.scale(scale);
        }
    }

    dft
}

/// Compute the DFT U<sub>w</sub>(m) of the windowed noise u(n) w<sub>s</sub>(n) at the
/// given bin, where u(n) is centered in the noise buffer.
fn noise_dft(noise: &[f32; NOISE_LEN], window: &Window, m: usize) -> Complex32 {
    let step = -2.0 * PI * m as f32 / DFT_SIZE as f32;
    let osc = Oscillator::new(step * -window::SUPPORT as f32, step);

    (-window::SUPPORT..=window::SUPPORT).zip(osc).map(|(n, z)| {
        z.scale(noise[(n + DFT_HALF as isize) as usize] * window.get(n))
    }).fold(Complex32::zero(), |s, x| s + x)
}

/// Compute the IDFT u<sub>w</sub>(n) of the given half spectrum at the given point n.
fn idft(dft: &[Complex32; DFT_HALF], n: isize) -> f32 {
    // The IDFT is zero outside the defined range.
    if n < -(DFT_HALF as isize) || n >= DFT_HALF as isize {
        return 0.0;
    }

    let osc = Oscillator::new(0.0, 2.0 * PI * n as f32 / DFT_SIZE as f32);

    2.0 / DFT_SIZE as f32 * dft.iter().zip(osc).map(|(x, z)| {
        x.re * z.re - x.im * z.im
    }).sum::<f32>()
}

/// Synthesizes unvoiced spectrum signal s<sub>uv</sub>(n).
pub struct Unvoiced<'a, 'b, 'c> {
    /// Unvoiced DFT/IDFT for current frame.
    cur: &'a UnvoicedDft,
    /// Unvoiced DFT/IDFT for previous frame.
    prev: &'b UnvoicedDft,
    /// Synthesis window w<sub>s</sub>(n) for "weighted overlap add".
    window: &'c Window,
}

impl<'a, 'b, 'c> Unvoiced<'a, 'b, 'c> {
    /// Create a new `Unvoiced` from the given unvoiced spectrums of the current and
    /// previous frames.
    pub fn new(cur: &'a UnvoicedDft, prev: &'b UnvoicedDft, window: &'c Window) -> Self {
        Unvoiced { cur, prev, window }
    }

    /// Compute the unvoiced signal sample s<sub>uv</sub>(n) for the given n, 0 ≤ n < N.
    pub fn get(&self, n: usize) -> f32 {
        debug_assert!(n < SAMPLES_PER_FRAME);

        let n = n as isize;
        let shifted = n - SAMPLES_PER_FRAME as isize;

        // Compute numerator in Eq 126.
        let numer = self.window.get(n) * self.prev.idft(n) +
            self.window.get(shifted) * self.cur.idft(shifted);

        // Compute denominator in Eq 126.
        let denom = self.window.get(n).powi(2) + self.window.get(shifted).powi(2);

        // Compute Eq 126.
        numer / denom
    }

    /// Add the unvoiced signal for the frame into the given buffer.
    pub fn add_to(&self, buf: &mut AudioBuf) {
        for (n, x) in buf.iter_mut().enumerate() {
            *x += self.get(n);
        }
    }
}

/// Determine the lower and upper band edges (a<sub>l</sub>, b<sub>l</sub>) for the given
/// harmonic of the fundamental frequency.
fn edges(l: usize, params: &BaseParams) -> (usize, usize) {
    let common = DFT_SIZE as f32 / (2.0 * PI) * params.fundamental;

    (
        // Compute Eq 122.
        ((common * (l as f32 - 0.5)).ceil() as usize).min(DFT_HALF),
        // Compute Eq 123.
        ((common * (l as f32 + 0.5)).ceil() as usize).min(DFT_HALF),
    )
}
