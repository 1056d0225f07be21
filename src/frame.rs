//! Received IMBE voice frames.
//!
//! A frame arrives as 144 interleaved bits. After deinterleaving, the bit stream is made
//! up of 8 codewords c<sub>0</sub>, ..., c<sub>7</sub>: four Golay (23, 12) codewords,
//! three Hamming (15, 11) codewords, and 7 uncoded bits. Codewords c<sub>1</sub>, ...,
//! c<sub>6</sub> are additionally modulated by a pseudo-random sequence seeded from the
//! information bits of c<sub>0</sub>, so c<sub>0</sub> must be corrected first.

use log::trace;

use crate::bits::BitFrame;
use crate::errors::{Error, Result};
use crate::fec::BlockCode;
use crate::golay::Golay23;
use crate::hamming::Hamming15;

/// Bytes in a received frame.
pub const FRAME_BYTES: usize = 18;
/// Bits in a received frame.
pub const FRAME_BITS: usize = FRAME_BYTES * 8;

/// Represents the bit vectors u<sub>0</sub>, ..., u<sub>7</sub>, in that order.
pub type Chunks = [u32; 8];

/// Represents the number of detected Hamming/Golay bit errors, ϵ<sub>0</sub>, ...,
/// ϵ<sub>6</sub>, corresponding to the chunks u<sub>0</sub>, ..., u<sub>6</sub>.
pub type Errors = [usize; 7];

/// Each INTERLEAVE[i] is the frame bit carrying codeword stream bit i.
const INTERLEAVE: [usize; FRAME_BITS] = [
    0, 7, 12, 19, 24, 31, 36, 43, 48, 55, 60, 67,
    72, 79, 84, 91, 96, 103, 108, 115, 120, 127, 132, 139,
    1, 6, 13, 18, 25, 30, 37, 42, 49, 54, 61, 66,
    73, 78, 85, 90, 97, 102, 109, 114, 121, 126, 133, 138,
    2, 9, 14, 21, 26, 33, 38, 45, 50, 57, 62, 69,
    74, 81, 86, 93, 98, 105, 110, 117, 122, 129, 134, 141,
    3, 8, 15, 20, 27, 32, 39, 44, 51, 56, 63, 68,
    75, 80, 87, 92, 99, 104, 111, 116, 123, 128, 135, 140,
    4, 11, 16, 23, 28, 35, 40, 47, 52, 59, 64, 71,
    76, 83, 88, 95, 100, 107, 112, 119, 124, 131, 136, 143,
    5, 10, 17, 22, 29, 34, 41, 46, 53, 58, 65, 70,
    77, 82, 89, 94, 101, 106, 113, 118, 125, 130, 137, 142,
];

/// Error protection applied to a codeword.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Protection {
    Golay,
    Hamming,
    Uncoded,
}

impl Protection {
    /// Correct the codeword starting at the given bit, returning the number of errors.
    fn correct(self, stream: &mut BitFrame, start: usize) -> Result<usize> {
        match self {
            Protection::Golay => Golay23::correct(stream, start),
            Protection::Hamming => Hamming15::correct(stream, start),
            Protection::Uncoded => Ok(0),
        }
    }
}

/// Position of a codeword within the deinterleaved bit stream.
struct Codeword {
    /// First bit of the codeword.
    start: usize,
    /// Total bits, including checksum.
    len: usize,
    /// Information bits at the start of the codeword.
    data: usize,
    protection: Protection,
}

impl Codeword {
    const fn new(start: usize, len: usize, data: usize, protection: Protection)
        -> Codeword
    {
        Codeword { start, len, data, protection }
    }

    fn end(&self) -> usize { self.start + self.len - 1 }

    /// Extract the information bits u<sub>i</sub>.
    fn info(&self, stream: &BitFrame) -> Result<u32> {
        stream.get_int(self.start, self.start + self.data - 1)
    }
}

/// Codewords c<sub>0</sub>, ..., c<sub>7</sub> in stream order.
const CODEWORDS: [Codeword; 8] = [
    Codeword::new(0, 23, 12, Protection::Golay),
    Codeword::new(23, 23, 12, Protection::Golay),
    Codeword::new(46, 23, 12, Protection::Golay),
    Codeword::new(69, 23, 12, Protection::Golay),
    Codeword::new(92, 15, 11, Protection::Hamming),
    Codeword::new(107, 15, 11, Protection::Hamming),
    Codeword::new(122, 15, 11, Protection::Hamming),
    Codeword::new(137, 7, 7, Protection::Uncoded),
];

/// A received IMBE voice frame.
#[derive(Copy, Clone, Debug)]
pub struct ReceivedFrame {
    /// Prioritized bit vector chunks, u<sub>0</sub>, ..., u<sub>7</sub>.
    pub chunks: Chunks,
    /// Error correction counts, ϵ<sub>0</sub>, ..., ϵ<sub>6</sub>.
    pub errors: Errors,
}

impl ReceivedFrame {
    /// Create a new `ReceivedFrame` from the given chunks u<sub>0</sub>, ...,
    /// u<sub>7</sub> and error counts ϵ<sub>0</sub>, ..., ϵ<sub>6</sub>.
    pub fn new(chunks: Chunks, errors: Errors) -> ReceivedFrame {
        ReceivedFrame { chunks, errors }
    }

    /// Deinterleave, demodulate, and error correct the given raw frame bytes.
    ///
    /// Fails only if the frame isn't exactly `FRAME_BYTES` long. Bit errors are counted
    /// rather than reported.
    pub fn from_bytes(bytes: &[u8]) -> Result<ReceivedFrame> {
        if bytes.len() != FRAME_BYTES {
            return Err(Error::InvalidFrame {
                expected: FRAME_BYTES,
                actual: bytes.len(),
            });
        }

        let mut stream = deinterleave(&BitFrame::from_bytes(bytes)?)?;
        let mut errors = [0; 7];

        // The modulation sequence is seeded from u_0, so it must be corrected first.
        errors[0] = CODEWORDS[0].protection.correct(&mut stream, 0)?;
        let seed = CODEWORDS[0].info(&stream)?;
        modulate(&mut stream, seed)?;

        for (err, cw) in errors.iter_mut().zip(CODEWORDS.iter()).skip(1) {
            *err = cw.protection.correct(&mut stream, cw.start)?;
        }

        let mut chunks = [0; 8];

        for (chunk, cw) in chunks.iter_mut().zip(CODEWORDS.iter()) {
            *chunk = cw.info(&stream)?;
        }

        trace!("frame: errors {:?}", errors);

        Ok(ReceivedFrame::new(chunks, errors))
    }

    /// Total number of errors corrected in the frame, ϵ<sub>T</sub>.
    pub fn total_errors(&self) -> usize {
        self.errors.iter().sum()
    }
}

/// Generates the pseudo-random modulation sequence, one bit per iteration.
struct Modulation(u32);

impl Modulation {
    /// Create a new `Modulation` sequence seeded from the info bits u<sub>0</sub>.
    fn new(seed: u32) -> Modulation {
        Modulation(16 * seed)
    }
}

impl Iterator for Modulation {
    type Item = u32;

    fn next(&mut self) -> Option<Self::Item> {
        self.0 = (173 * self.0 + 13849) % 65536;
        Some(self.0 >> 15)
    }
}

/// XOR the modulation sequence for the given u<sub>0</sub> into codewords c<sub>1</sub>,
/// ..., c<sub>6</sub>. Applying it twice restores the original bits.
fn modulate(stream: &mut BitFrame, seed: u32) -> Result<()> {
    let mut seq = Modulation::new(seed);

    for cw in &CODEWORDS[1..7] {
        let mask = seq.by_ref().take(cw.len).fold(0, |m, b| m << 1 | b);
        stream.xor(cw.start, cw.end(), mask)?;
    }

    Ok(())
}

/// Gather the codeword stream from the given interleaved frame bits.
fn deinterleave(frame: &BitFrame) -> Result<BitFrame> {
    let mut stream = BitFrame::new(FRAME_BITS)?;

    for i in 0..FRAME_BITS {
        stream.set(i, frame.get(INTERLEAVE[i])?)?;
    }

    Ok(stream)
}

/// Build the raw frame bytes carrying the given chunks.
#[cfg(test)]
pub(crate) fn pack(chunks: &Chunks) -> Vec<u8> {
    let mut stream = BitFrame::new(FRAME_BITS).unwrap();

    for (&chunk, cw) in chunks.iter().zip(CODEWORDS.iter()) {
        match cw.protection {
            Protection::Golay => Golay23::encode(&mut stream, cw.start, chunk).unwrap(),
            Protection::Hamming => Hamming15::encode(&mut stream, cw.start, chunk).unwrap(),
            Protection::Uncoded => stream.load(cw.start, cw.end(), chunk).unwrap(),
        }
    }

    modulate(&mut stream, chunks[0]).unwrap();

    let mut frame = BitFrame::new(FRAME_BITS).unwrap();

    for (i, bit) in stream.iter().enumerate() {
        frame.set(INTERLEAVE[i], bit).unwrap();
    }

    frame.to_bytes()
}

/// Flip the frame bit carrying the given codeword stream bit.
#[cfg(test)]
pub(crate) fn flip_stream_bit(bytes: &mut [u8], i: usize) {
    let p = INTERLEAVE[i];
    bytes[p / 8] ^= 0x80 >> (p % 8);
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const CHUNKS: Chunks = [
        0b001000010010,
        0b110011001100,
        0b111000111000,
        0b111111111111,
        0b10100110101,
        0b00101111010,
        0b01110111011,
        0b0001000,
    ];

    #[test]
    fn test_layout() {
        let total = CODEWORDS.iter().fold(0, |s, cw| {
            assert_eq!(cw.start, s);
            s + cw.len
        });

        assert_eq!(total, FRAME_BITS);

        // Every frame bit is used exactly once.
        let mut seen = [false; FRAME_BITS];

        for &p in INTERLEAVE.iter() {
            assert!(!seen[p]);
            seen[p] = true;
        }
    }

    #[test]
    fn test_interleave() {
        // The first dibits draw from c_0, ..., c_5 in turn.
        let inverse = |p: usize| INTERLEAVE.iter().position(|&q| q == p).unwrap();
        let first: Vec<usize> = (0..8).map(inverse).collect();
        assert_eq!(first, vec![0, 24, 48, 72, 96, 120, 25, 1]);

        assert_eq!(INTERLEAVE[1], 7);
        assert_eq!(INTERLEAVE[23], 139);
        assert_eq!(INTERLEAVE[47], 138);
        assert_eq!(INTERLEAVE[143], 142);

        // Rows of 24 stream bits fill every sixth dibit.
        for (i, &p) in INTERLEAVE.iter().enumerate() {
            let (row, k) = (i / 24, i % 24);
            let skew = match (k % 2, row % 2) {
                (0, _) => 0,
                (_, 0) => 7,
                _ => 5,
            };

            assert_eq!(p, row + 12 * (k / 2) + skew);
        }
    }

    #[test]
    fn test_modulation() {
        let bits: Vec<u32> = Modulation::new(0).take(8).collect();
        assert_eq!(bits, vec![0, 1, 0, 0, 0, 0, 1, 0]);

        let bits: Vec<u32> = Modulation::new(0xABC).take(8).collect();
        assert_eq!(bits, vec![0, 0, 1, 1, 0, 1, 0, 0]);
    }

    #[test]
    fn test_clean() {
        let bytes = pack(&CHUNKS);
        assert_eq!(bytes.len(), FRAME_BYTES);

        let f = ReceivedFrame::from_bytes(&bytes).unwrap();

        assert_eq!(f.chunks, CHUNKS);
        assert_eq!(f.errors, [0; 7]);
        assert_eq!(f.total_errors(), 0);
    }

    #[test]
    fn test_corrected() {
        let mut bytes = pack(&CHUNKS);

        // Three errors in c_0, two in c_2, one in each Hamming codeword, and one in the
        // uncoded bits, which goes undetected.
        for &i in &[0, 11, 22, 50, 60, 93, 110, 135, 140] {
            flip_stream_bit(&mut bytes, i);
        }

        let f = ReceivedFrame::from_bytes(&bytes).unwrap();

        assert_eq!(f.errors, [3, 0, 2, 0, 1, 1, 1]);
        assert_eq!(f.total_errors(), 8);
        assert_eq!(&f.chunks[..7], &CHUNKS[..7]);
        assert_eq!(f.chunks[7], CHUNKS[7] ^ 0b0001000);
    }

    #[test]
    fn test_invalid() {
        assert_eq!(ReceivedFrame::from_bytes(&[0; 17]).unwrap_err(),
                   Error::InvalidFrame { expected: 18, actual: 17 });
        assert_eq!(ReceivedFrame::from_bytes(&[]).unwrap_err(),
                   Error::InvalidFrame { expected: 18, actual: 0 });
        assert!(ReceivedFrame::from_bytes(&[0; 19]).is_err());
    }
}
