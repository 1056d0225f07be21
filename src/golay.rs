//! Golay (23, 12) cyclic code.
//!
//! Codewords are decoded with an error trapping search. The code is cyclic, so rotating a
//! codeword yields another codeword, and whenever every bit error lies within the 11
//! checksum positions the syndrome weighs at most 3 and equals the error pattern itself.
//! The search rotates a copy of the received word through all 23 offsets looking for such
//! a syndrome. Error patterns that can't be rotated entirely into the checksum field are
//! caught by repeating the search with each bit flipped in turn, which leaves at most two
//! errors to trap.

use std::iter;

use log::trace;

use crate::bits::BitFrame;
use crate::errors::Result;
use crate::fec::{self, BlockCode, UNCORRECTABLE};

/// Checksum contributed by each information bit, starting at the MSB, for the generator
/// polynomial g(x) = x<sup>11</sup> + x<sup>10</sup> + x<sup>6</sup> + x<sup>5</sup> +
/// x<sup>4</sup> + x<sup>2</sup> + 1.
const CHECKSUMS: [u32; 12] = [
    0x63A, 0x31D, 0x7B4, 0x3DA, 0x1ED, 0x6CC, 0x366, 0x1B3, 0x6E3, 0x54B, 0x49F, 0x475,
];

/// Maximum number of bit errors the code can correct.
const MAX_ERRORS: usize = 3;

/// The (23, 12, 7) binary Golay code.
pub struct Golay23;

impl BlockCode for Golay23 {
    const LEN: usize = 23;
    const DATA_BITS: usize = 12;

    fn checksum(data: u32) -> u32 {
        fec::table_checksum(&CHECKSUMS, data)
    }

    fn correct(frame: &mut BitFrame, start: usize) -> Result<usize> {
        if Self::syndrome(frame, start)? == 0 {
            return Ok(0);
        }

        let end = start + Self::LEN - 1;
        let received = frame.get_int(start, end)?;

        // Trial corrections are made on a copy so the frame is only touched on success.
        let mut word = frame.sub_frame(start, end)?;
        let mut prev_trial: Option<usize> = None;

        for trial in iter::once(None).chain((0..Self::LEN).map(Some)) {
            // Undo the previous trial flip. The word is back in alignment after cycling
            // through every rotation.
            if let Some(bit) = prev_trial {
                word.flip(bit)?;
            }

            // With one error guessed by the flip, only two are left to trap.
            let max_weight = match trial {
                Some(bit) => {
                    word.flip(bit)?;
                    MAX_ERRORS as u32 - 1
                },
                None => MAX_ERRORS as u32,
            };

            prev_trial = trial;

            for rotation in 0..Self::LEN {
                let syndrome = Self::syndrome(&word, 0)?;

                if syndrome.count_ones() > max_weight {
                    word.rotate_left(0, Self::LEN - 1)?;
                    continue;
                }

                // Errors are trapped in the checksum field, so cancel them out and
                // rotate back into the received alignment.
                word.xor(Self::DATA_BITS, Self::LEN - 1, syndrome)?;

                for _ in 0..rotation {
                    word.rotate_right(0, Self::LEN - 1)?;
                }

                let corrected = word.get_int(0, Self::LEN - 1)?;
                let errors = (corrected ^ received).count_ones() as usize;

                if errors > MAX_ERRORS {
                    return Ok(UNCORRECTABLE);
                }

                trace!("golay: corrected {} errors at bit {}", errors, start);
                frame.load(start, end, corrected)?;

                return Ok(errors);
            }
        }

        Ok(UNCORRECTABLE)
    }
}
