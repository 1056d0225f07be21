//! Voiced spectrum synthesis with a bank of per-harmonic oscillators.

use crate::audio::AudioBuf;
use crate::consts::{MAX_HARMONICS, SAMPLES_PER_FRAME};
use crate::noise::Noise;
use crate::osc::Oscillator;
use crate::params::FrameParams;
use crate::window::Window;

/// Synthesizes the voiced signal s<sub>v</sub>(n), keeping each harmonic's phase
/// continuous across frames.
#[derive(Clone, Debug)]
pub struct Voiced {
    /// Oscillator for harmonic l at index l - 1.
    osc: [Oscillator; MAX_HARMONICS],
    /// Voiced amplitude of each harmonic in the previous frame.
    amps: [f32; MAX_HARMONICS],
}

impl Voiced {
    /// Create a new `Voiced` with every oscillator at zero phase and no previous
    /// amplitude.
    pub fn new() -> Voiced {
        Voiced {
            osc: [Oscillator::new(0.0, 0.0); MAX_HARMONICS],
            amps: [0.0; MAX_HARMONICS],
        }
    }

    /// Add the voiced signal for the given frame into the given buffer, crossfading
    /// each harmonic from its previous amplitude with the given synthesis window.
    pub fn add_to(&mut self, params: &FrameParams, noise: &mut Noise, window: &Window,
                  buf: &mut AudioBuf)
    {
        let harmonics = params.base.harmonics as usize;
        let unvoiced = params.voice.unvoiced_count() as f32;
        let shift = SAMPLES_PER_FRAME as isize;

        for (l, (osc, prev)) in self.osc.iter_mut().zip(self.amps.iter_mut()).enumerate() {
            let l = l + 1;

            let cur = if params.voice.is_voiced(l) {
                params.enhanced.get(l)
            } else {
                0.0
            };

            if l <= harmonics {
                let mut freq = params.base.fundamental * l as f32;

                // Upper harmonics get a random phase offset, spread over the frame,
                // proportional to the number of unvoiced harmonics.
                if l > harmonics / 4 {
                    freq += unvoiced * noise.next_phase() / harmonics as f32 /
                        SAMPLES_PER_FRAME as f32;
                }

                osc.set_freq(freq);
            }

            if *prev == 0.0 && cur == 0.0 {
                osc.advance(SAMPLES_PER_FRAME);
                continue;
            }

            for (n, (x, z)) in buf.iter_mut().zip(&mut *osc).enumerate() {
                let n = n as isize;
                let amp = window.get(n) * *prev + window.get(n - shift) * cur;

                *x += 2.0 * amp * z.re;
            }

            *prev = cur;
        }
    }

    /// Fade out every harmonic so the next frame starts from silence.
    pub fn silence(&mut self) {
        self.amps = [0.0; MAX_HARMONICS];
    }
}

impl Default for Voiced {
    fn default() -> Self { Voiced::new() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descramble::VoiceDecisions;
    use crate::params::BaseParams;
    use crate::window;

    fn frame(voiced: u32, amps: Vec<f32>) -> FrameParams {
        let base = BaseParams::new(42);

        FrameParams {
            base,
            voice: VoiceDecisions::new(voiced, &base),
            enhanced: amps.into_iter().collect(),
            ..FrameParams::default()
        }
    }

    #[test]
    fn test_unvoiced() {
        let mut v = Voiced::new();
        let mut noise = Noise::new(1);
        let w = window::synthesis();
        let mut buf = [0.0; SAMPLES_PER_FRAME];

        let f = frame(0, vec![10.0; 18]);

        v.add_to(&f, &mut noise, &w, &mut buf);
        v.add_to(&f, &mut noise, &w, &mut buf);

        assert!(buf.iter().all(|&x| x == 0.0));
    }

    #[test]
    fn test_fade_in() {
        let mut v = Voiced::new();
        let mut noise = Noise::new(1);
        let w = window::synthesis();

        let mut amps = vec![0.0; 18];
        amps[0] = 1.0;
        let f = frame(0b111111, amps);

        let mut buf = [0.0; SAMPLES_PER_FRAME];
        v.add_to(&f, &mut noise, &w, &mut buf);

        // Nothing before the window reaches the current frame.
        assert_eq!(buf[0], 0.0);
        assert!(buf[..55].iter().all(|&x| x == 0.0));
        assert!(buf[56..].iter().any(|&x| x != 0.0));

        // Steady state: the crossfade weights sum to one.
        let mut buf = [0.0; SAMPLES_PER_FRAME];
        v.add_to(&f, &mut noise, &w, &mut buf);

        let peak = buf.iter().fold(0.0f32, |m, x| m.max(x.abs()));
        assert!(peak <= 2.0 + 1e-3);
        assert!(peak > 1.99);
    }

    #[test]
    fn test_silence() {
        let mut v = Voiced::new();
        let mut noise = Noise::new(1);
        let w = window::synthesis();

        let mut amps = vec![0.0; 18];
        amps[2] = 3.0;
        let f = frame(0b100000, amps);

        let mut buf = [0.0; SAMPLES_PER_FRAME];
        v.add_to(&f, &mut noise, &w, &mut buf);
        assert_eq!(v.amps[2], 3.0);

        v.silence();
        assert!(v.amps.iter().all(|&a| a == 0.0));

        // Oscillators keep their phase through silence.
        let before = v.osc[2].phasor();
        assert!((before.norm() - 1.0).abs() < 1e-4);
    }
}
