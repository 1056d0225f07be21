//! Speech synthesis from decoded frame parameters.

use crate::audio::AudioBuf;
use crate::noise::{Noise, NoiseGenerator};
use crate::params::FrameParams;
use crate::unvoiced::{Unvoiced, UnvoicedDft};
use crate::voiced::Voiced;
use crate::window::{self, Window};

/// Combines the voiced and unvoiced signals into one frame of audio, carrying oscillator
/// phases and noise across frames.
pub struct Synthesizer {
    /// Seed the noise sources started from.
    seed: u64,
    /// Synthesis window w<sub>s</sub>(n).
    window: Window,
    /// White noise for the unvoiced spectrum.
    noise: NoiseGenerator,
    /// Random phase offsets for the voiced harmonics.
    dither: Noise,
    voiced: Voiced,
    /// Unvoiced spectrum of the previous frame.
    unvoiced: UnvoicedDft,
}

impl Synthesizer {
    /// Create a new `Synthesizer` with noise sources derived from the given seed.
    pub fn new(seed: u64) -> Synthesizer {
        Synthesizer {
            seed,
            window: window::synthesis(),
            noise: NoiseGenerator::new(seed),
            dither: Noise::new(seed.wrapping_add(1)),
            voiced: Voiced::new(),
            unvoiced: UnvoicedDft::default(),
        }
    }

    /// Return to the state of a freshly created `Synthesizer`.
    pub fn reset(&mut self) {
        self.noise = NoiseGenerator::new(self.seed);
        self.dither = Noise::new(self.seed.wrapping_add(1));
        self.voiced = Voiced::new();
        self.unvoiced = UnvoicedDft::default();
    }

    /// Synthesize the given frame parameters into the given buffer.
    pub fn synthesize(&mut self, params: &FrameParams, buf: &mut AudioBuf) {
        let noise = self.noise.next_buffer();
        let udft = UnvoicedDft::new(&params.base, &params.voice, &params.enhanced, &noise,
                                    &self.window);

        // Compute Eq 142.
        buf.fill(0.0);
        Unvoiced::new(&udft, &self.unvoiced, &self.window).add_to(buf);
        self.voiced.add_to(params, &mut self.dither, &self.window, buf);

        self.unvoiced = udft;
    }

    /// Fill the given buffer with silence, so the next synthesized frame fades in.
    pub fn silence(&mut self, buf: &mut AudioBuf) {
        buf.fill(0.0);

        self.voiced.silence();
        self.unvoiced = UnvoicedDft::default();

        // Keep the noise stream in step with the frame count.
        self.noise.next_buffer();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SAMPLES_PER_FRAME;

    const CHUNKS: [u32; 8] = [
        0b001000010010,
        0b110011001100,
        0b111000111000,
        0b111111111111,
        0b10100110101,
        0b00101111010,
        0b01110111011,
        0b00001000,
    ];

    fn run(s: &mut Synthesizer, frames: usize) -> Vec<f32> {
        let f = FrameParams::decode(&CHUNKS, 32, &FrameParams::default());
        let mut out = vec![];

        for _ in 0..frames {
            let mut buf = [0.0; SAMPLES_PER_FRAME];
            s.synthesize(&f, &mut buf);
            out.extend_from_slice(&buf);
        }

        out
    }

    #[test]
    fn test_synthesize() {
        let mut s = Synthesizer::new(5);
        let out = run(&mut s, 4);

        assert_eq!(out.len(), 4 * SAMPLES_PER_FRAME);
        assert!(out.iter().all(|x| x.is_finite()));

        let rms = (out.iter().map(|x| x.powi(2)).sum::<f32>() / out.len() as f32).sqrt();
        assert!(rms > 0.0);
    }

    #[test]
    fn test_deterministic() {
        let a = run(&mut Synthesizer::new(9), 3);
        let b = run(&mut Synthesizer::new(9), 3);
        let c = run(&mut Synthesizer::new(10), 3);

        assert_eq!(a, b);
        assert_ne!(a, c);

        let mut s = Synthesizer::new(9);
        run(&mut s, 2);
        s.reset();

        assert_eq!(run(&mut s, 3), a);
    }

    #[test]
    fn test_silence() {
        let mut s = Synthesizer::new(5);
        run(&mut s, 2);

        let mut buf = [1.0; SAMPLES_PER_FRAME];
        s.silence(&mut buf);
        assert!(buf.iter().all(|&x| x == 0.0));

        // The following frame starts from silence.
        let out = run(&mut s, 1);
        assert_eq!(out[0], 0.0);
    }
}
