//! Hamming (15, 11) code.

use log::trace;

use crate::bits::BitFrame;
use crate::errors::Result;
use crate::fec::{self, BlockCode};

/// Checksum contributed by each information bit, starting at the MSB. Every nonzero
/// 4-bit syndrome that isn't listed here has weight 1 and points at a checksum bit.
const CHECKSUMS: [u32; 11] = [0xF, 0xE, 0xD, 0xC, 0xB, 0xA, 0x9, 0x7, 0x6, 0x5, 0x3];

/// The (15, 11, 3) Hamming code.
pub struct Hamming15;

impl BlockCode for Hamming15 {
    const LEN: usize = 15;
    const DATA_BITS: usize = 11;

    fn checksum(data: u32) -> u32 {
        fec::table_checksum(&CHECKSUMS, data)
    }

    fn correct(frame: &mut BitFrame, start: usize) -> Result<usize> {
        let syndrome = Self::syndrome(frame, start)?;

        if syndrome == 0 {
            return Ok(0);
        }

        match CHECKSUMS.iter().position(|&c| c == syndrome) {
            Some(bit) => frame.flip(start + bit)?,
            None => frame.xor(start + Self::DATA_BITS, start + Self::LEN - 1, syndrome)?,
        }

        trace!("hamming: corrected error at bit {}", start);

        Ok(1)
    }
}
