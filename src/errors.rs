//! Errors reported by the decoder.

use thiserror::Error;

/// Errors that can occur while handling a voice frame.
///
/// Bit errors corrected (or found uncorrectable) by the forward error correction codes
/// are not reported here: they're counted and handed to the frame error policy.
#[derive(Debug, Error, Copy, Clone, PartialEq, Eq)]
pub enum Error {
    /// A single bit index fell outside the frame.
    #[error("bit index {index} out of range for {len}-bit frame")]
    BitIndex { index: usize, len: usize },
    /// An inclusive bit range was reversed, too wide, or fell outside the frame.
    #[error("bit range {start}..={end} invalid for {len}-bit frame")]
    BitRange { start: usize, end: usize, len: usize },
    /// A frame was requested with more bits than a `BitFrame` can hold.
    #[error("{len} bits exceeds frame capacity of {max}")]
    Capacity { len: usize, max: usize },
    /// The received frame didn't have the length required by the codec.
    #[error("invalid frame: expected {expected} bytes, got {actual}")]
    InvalidFrame { expected: usize, actual: usize },
}

/// Result type used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
