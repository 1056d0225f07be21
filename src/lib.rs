//! Decoder for IMBE voice frames: error correction of the received bits, recovery of the
//! voice parameters, a bad frame policy, and synthesis of 8 kHz audio.
//!
//! ```no_run
//! use imbe::{ImbeDecoder, VoiceDecoder};
//!
//! let mut dec = ImbeDecoder::default();
//! let frame = [0u8; imbe::frame::FRAME_BYTES];
//!
//! let audio = dec.decode(&frame).unwrap();
//! assert_eq!(audio.samples().len(), imbe::consts::SAMPLES_PER_FRAME);
//! ```

pub mod audio;
pub mod bits;
pub mod consts;
pub mod decode;
pub mod errors;
pub mod fec;
pub mod frame;
pub mod golay;
pub mod hamming;
pub mod policy;

mod allocs;
mod coefs;
mod descramble;
mod enhance;
mod gain;
mod noise;
mod osc;
mod params;
mod prev;
mod scan;
mod spectral;
mod synth;
mod unvoiced;
mod voiced;
mod window;

pub use audio::{DecodedAudio, Metadata};
pub use bits::BitFrame;
pub use decode::{DecoderOptions, ImbeDecoder, VoiceDecoder};
pub use errors::{Error, Result};
pub use fec::BlockCode;
pub use frame::ReceivedFrame;
pub use golay::Golay23;
pub use hamming::Hamming15;
pub use policy::{Disposition, FramePolicy, PolicyConfig, PolicyState};
