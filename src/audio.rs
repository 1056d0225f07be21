//! Decoded audio frames.

use std::collections::BTreeMap;

use crate::consts::SAMPLES_PER_FRAME;

/// Buffer of audio samples for a single frame.
pub type AudioBuf = [f32; SAMPLES_PER_FRAME];

/// Auxiliary key/value information surfaced while decoding a frame.
pub type Metadata = BTreeMap<String, String>;

/// One frame of decoded PCM audio at 8 kHz, with any metadata gathered along the way.
#[derive(Clone, Debug, PartialEq)]
pub struct DecodedAudio {
    samples: AudioBuf,
    metadata: Metadata,
}

impl DecodedAudio {
    /// Create a new `DecodedAudio` with the given samples and no metadata.
    pub fn new(samples: AudioBuf) -> DecodedAudio {
        DecodedAudio::with_metadata(samples, Metadata::new())
    }

    pub fn with_metadata(samples: AudioBuf, metadata: Metadata) -> DecodedAudio {
        DecodedAudio { samples, metadata }
    }

    /// Decoded samples, nominally scaled to the range of 16-bit PCM.
    pub fn samples(&self) -> &[f32] { &self.samples[..] }

    pub fn metadata(&self) -> &Metadata { &self.metadata }

    /// Consume the frame, returning its sample buffer.
    pub fn into_samples(self) -> AudioBuf { self.samples }
}
