//! Decode IMBE frames into an audio signal.

use log::{debug, warn};

use crate::audio::{AudioBuf, DecodedAudio, Metadata};
use crate::consts::SAMPLES_PER_FRAME;
use crate::descramble::{b0, Bootstrap};
use crate::enhance;
use crate::errors::Result;
use crate::frame::ReceivedFrame;
use crate::params::FrameParams;
use crate::policy::{Disposition, FrameErrors, FramePolicy, PolicyConfig};
use crate::prev::PrevFrame;
use crate::synth::Synthesizer;

/// Name reported by `ImbeDecoder`.
pub const CODEC_NAME: &str = "IMBE";

/// Seed used for the noise sources unless configured otherwise.
pub const DEFAULT_SEED: u64 = 0x494D_4245;

/// Common interface of voice frame decoders.
pub trait VoiceDecoder {
    /// Name of the codec.
    fn name(&self) -> &'static str;

    /// Decode one raw frame into one frame of audio.
    fn decode(&mut self, frame: &[u8]) -> Result<DecodedAudio>;

    /// Decode one raw frame, also reporting what was learned about the frame.
    fn decode_with_metadata(&mut self, frame: &[u8]) -> Result<DecodedAudio>;

    /// Forget all state carried between frames.
    fn reset(&mut self);
}

/// Options for creating an `ImbeDecoder`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DecoderOptions {
    /// Thresholds of the frame error policy.
    pub policy: PolicyConfig,
    /// Seed of the synthesis noise sources.
    pub seed: u64,
}

impl Default for DecoderOptions {
    fn default() -> Self {
        DecoderOptions {
            policy: PolicyConfig::default(),
            seed: DEFAULT_SEED,
        }
    }
}

/// Summary of how a single frame was handled.
struct Report {
    disposition: Disposition,
    errors: FrameErrors,
    pitch: u8,
    /// Fundamental frequency and voiced band count of the synthesized parameters.
    voice: Option<(f32, u32)>,
}

impl Report {
    fn metadata(&self) -> Metadata {
        let mut meta = Metadata::new();

        meta.insert("disposition".to_string(), self.disposition.as_str().to_string());
        meta.insert("errors".to_string(), self.errors.total.to_string());
        meta.insert("error_rate".to_string(), format!("{:.5}", self.errors.rate));
        meta.insert("pitch".to_string(), self.pitch.to_string());

        if let Some((hz, bands)) = self.voice {
            meta.insert("fundamental_hz".to_string(), format!("{:.2}", hz));
            meta.insert("voiced_bands".to_string(), bands.to_string());
        }

        meta
    }
}

/// Decodes a stream of IMBE frames.
pub struct ImbeDecoder {
    options: DecoderOptions,
    policy: FramePolicy,
    synth: Synthesizer,
    /// Tracks saved parameters across frames.
    prev: PrevFrame,
}

impl ImbeDecoder {
    /// Create a new `ImbeDecoder` in the default state.
    pub fn new(options: DecoderOptions) -> ImbeDecoder {
        ImbeDecoder {
            options,
            policy: FramePolicy::new(options.policy),
            synth: Synthesizer::new(options.seed),
            prev: PrevFrame::default(),
        }
    }

    /// Options the decoder was created with.
    pub fn options(&self) -> &DecoderOptions { &self.options }

    /// Decode the given frame into the given audio sample buffer.
    fn process(&mut self, bytes: &[u8], buf: &mut AudioBuf) -> Result<Report> {
        let frame = ReceivedFrame::from_bytes(bytes).map_err(|e| {
            warn!("rejected frame: {}", e);
            e
        })?;

        let bootstrap = Bootstrap::new(&frame.chunks);
        let errors = FrameErrors::new(&frame.errors, self.prev.err_rate);
        let disposition = self.policy.judge(&errors, bootstrap);

        let params = match (disposition, bootstrap) {
            (Disposition::Synthesize, Bootstrap::Period(period)) |
            (Disposition::Smooth, Bootstrap::Period(period)) => {
                let mut params = FrameParams::decode(&frame.chunks, period, &self.prev.params);
                let amp_thresh = enhance::amp_thresh(&errors, self.prev.amp_thresh);

                enhance::smooth(&mut params.enhanced, &mut params.voice, &errors,
                                &params.energy, amp_thresh);

                if disposition == Disposition::Smooth {
                    params.enhanced.blend(&self.prev.params.enhanced);
                }

                self.synth.synthesize(&params, buf);

                self.prev = PrevFrame {
                    params,
                    err_rate: errors.rate,
                    amp_thresh,
                };

                Some(&self.prev.params)
            },
            (Disposition::Mute, _) | (Disposition::Silence, _) => {
                self.synth.silence(buf);
                self.prev.err_rate = errors.rate;

                None
            },
            _ => {
                // Repeat the previous frame's parameters.
                self.synth.synthesize(&self.prev.params, buf);
                self.prev.err_rate = errors.rate;

                Some(&self.prev.params)
            },
        };

        Ok(Report {
            disposition,
            errors,
            pitch: b0(&frame.chunks),
            voice: params.map(|p| (p.fundamental_hz(), p.voice.voiced_bands())),
        })
    }
}

impl Default for ImbeDecoder {
    fn default() -> Self { ImbeDecoder::new(DecoderOptions::default()) }
}

impl VoiceDecoder for ImbeDecoder {
    fn name(&self) -> &'static str { CODEC_NAME }

    fn decode(&mut self, frame: &[u8]) -> Result<DecodedAudio> {
        let mut buf = [0.0; SAMPLES_PER_FRAME];
        self.process(frame, &mut buf)?;

        Ok(DecodedAudio::new(buf))
    }

    fn decode_with_metadata(&mut self, frame: &[u8]) -> Result<DecodedAudio> {
        let mut buf = [0.0; SAMPLES_PER_FRAME];
        let report = self.process(frame, &mut buf)?;

        Ok(DecodedAudio::with_metadata(buf, report.metadata()))
    }

    fn reset(&mut self) {
        debug!("decoder reset");

        self.policy.reset();
        self.synth.reset();
        self.prev = PrevFrame::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::Error;
    use crate::frame::{flip_stream_bit, pack, Chunks};
    use crate::policy::PolicyState;
    use pretty_assertions::assert_eq;

    const VOICE: [Chunks; 3] = [
        [
            0b001000010010,
            0b110011001100,
            0b111000111000,
            0b111111111111,
            0b10100110101,
            0b00101111010,
            0b01110111011,
            0b00001000,
        ],
        [
            0b000001010010,
            0b110011001100,
            0b111000111000,
            0b111111111111,
            0b11010110101,
            0b00101111010,
            0b01110111011,
            0b00001000,
        ],
        [
            0b001000010010,
            0b110011001100,
            0b111000111000,
            0b111111111111,
            0b10101110101,
            0b00101111010,
            0b01110111011,
            0b00001000,
        ],
    ];

    const SILENCE: Chunks = [0b110110 << 6, 0, 0, 0, 0, 0, 0, 0];

    fn stream(frames: usize) -> Vec<Vec<u8>> {
        (0..frames).map(|i| pack(&VOICE[i % VOICE.len()])).collect()
    }

    fn decode_all(dec: &mut ImbeDecoder, frames: &[Vec<u8>]) -> Vec<f32> {
        let mut out = vec![];

        for f in frames {
            out.extend_from_slice(dec.decode(f).unwrap().samples());
        }

        out
    }

    /// Flip three bits in each Golay codeword.
    fn corrupt(bytes: &mut [u8]) {
        for cw in 0..4 {
            for &i in &[0, 11, 22] {
                flip_stream_bit(bytes, 23 * cw + i);
            }
        }
    }

    #[test_log::test]
    fn test_decode() {
        let mut dec = ImbeDecoder::default();
        assert_eq!(dec.name(), "IMBE");

        let frames = stream(10);
        let out = decode_all(&mut dec, &frames);

        assert_eq!(out.len(), 10 * SAMPLES_PER_FRAME);
        assert!(out.iter().all(|x| x.is_finite()));

        let rms = (out.iter().map(|x| x.powi(2)).sum::<f32>() / out.len() as f32).sqrt();
        assert!(rms > 0.0);
    }

    #[test_log::test]
    fn test_deterministic() {
        let frames = stream(6);

        let mut a = ImbeDecoder::default();
        let mut b = ImbeDecoder::default();

        let first = decode_all(&mut a, &frames);
        assert_eq!(first, decode_all(&mut b, &frames));

        // A reset decoder behaves like a new one.
        a.reset();
        assert_eq!(first, decode_all(&mut a, &frames));

        let mut c = ImbeDecoder::new(DecoderOptions {
            seed: 1234,
            ..DecoderOptions::default()
        });
        assert_ne!(first, decode_all(&mut c, &frames));
    }

    #[test_log::test]
    fn test_silence() {
        let mut dec = ImbeDecoder::default();
        decode_all(&mut dec, &stream(3));

        let audio = dec.decode_with_metadata(&pack(&SILENCE)).unwrap();

        assert!(audio.samples().iter().all(|&x| x == 0.0));
        assert_eq!(audio.metadata()["disposition"], "silence");
        assert_eq!(audio.metadata()["pitch"], "216");
        assert!(audio.metadata().get("fundamental_hz").is_none());
    }

    #[test_log::test]
    fn test_metadata() {
        let mut dec = ImbeDecoder::default();
        let audio = dec.decode_with_metadata(&pack(&VOICE[0])).unwrap();
        let meta = audio.metadata();

        assert_eq!(meta["disposition"], "synthesize");
        assert_eq!(meta["errors"], "0");
        assert_eq!(meta["error_rate"], "0.00000");
        assert_eq!(meta["pitch"], "32");
        assert_eq!(meta["fundamental_hz"], "223.78");
        assert_eq!(meta["voiced_bands"], "3");

        // The PCM-only call carries no metadata.
        assert!(dec.decode(&pack(&VOICE[0])).unwrap().metadata().is_empty());
    }

    #[test_log::test]
    fn test_repeat_mute() {
        let mut dec = ImbeDecoder::default();
        decode_all(&mut dec, &stream(4));

        let mut bad = pack(&VOICE[0]);
        corrupt(&mut bad);

        for _ in 0..3 {
            let audio = dec.decode_with_metadata(&bad).unwrap();

            assert_eq!(audio.metadata()["disposition"], "repeat");
            assert_eq!(audio.metadata()["errors"], "12");
            assert!(audio.samples().iter().any(|&x| x != 0.0));
        }

        let audio = dec.decode_with_metadata(&bad).unwrap();
        assert_eq!(audio.metadata()["disposition"], "mute");
        assert!(audio.samples().iter().all(|&x| x == 0.0));
        assert_eq!(dec.policy.state(), PolicyState::Muted);

        // A clean frame resumes synthesis.
        let audio = dec.decode_with_metadata(&pack(&VOICE[1])).unwrap();
        assert_eq!(audio.metadata()["disposition"], "synthesize");
        assert_eq!(dec.policy.state(), PolicyState::Normal);
    }

    #[test_log::test]
    fn test_smooth() {
        let clean = pack(&VOICE[1]);
        let mut bad = clean.clone();

        // One error in each Hamming codeword and three spread over c_1 and c_2.
        for &i in &[23, 28, 49, 94, 111, 128] {
            flip_stream_bit(&mut bad, i);
        }

        let mut dec = ImbeDecoder::default();
        decode_all(&mut dec, &stream(4));

        let audio = dec.decode_with_metadata(&bad).unwrap();
        let meta = audio.metadata();

        assert_eq!(meta["disposition"], "smooth");
        assert_eq!(meta["errors"], "6");
        assert_eq!(meta["pitch"], "4");
        assert_eq!(dec.policy.state(), PolicyState::Smoothing);
        assert!(audio.samples().iter().all(|x| x.is_finite()));

        // The same frame decoded without any history.
        let mut fresh = ImbeDecoder::default();
        let alone = fresh.decode_with_metadata(&bad).unwrap();
        assert_eq!(alone.metadata()["disposition"], "smooth");
        assert_ne!(audio.samples(), alone.samples());

        // The corrected bits match the clean frame, so only smoothing sets them apart.
        let mut reference = ImbeDecoder::default();
        decode_all(&mut reference, &stream(4));

        let audio_clean = reference.decode_with_metadata(&clean).unwrap();
        assert_eq!(audio_clean.metadata()["disposition"], "synthesize");
        assert_ne!(audio.samples(), audio_clean.samples());
    }

    #[test_log::test]
    fn test_invalid() {
        let mut dec = ImbeDecoder::default();

        assert_eq!(dec.decode(&[0; 17]).unwrap_err(),
                   Error::InvalidFrame { expected: 18, actual: 17 });
        assert!(dec.decode_with_metadata(&[0; 20]).is_err());

        // Rejected frames leave the state untouched.
        let mut fresh = ImbeDecoder::default();
        let frames = stream(3);
        assert_eq!(decode_all(&mut dec, &frames), decode_all(&mut fresh, &frames));
    }
}
