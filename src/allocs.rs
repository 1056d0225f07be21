//! Bit allocation for the quantized amplitudes b<sub>3</sub>, ..., b<sub>L+1</sub>.
//!
//! The 73 - K amplitude bits left over after the pitch, voicing, and gain index are
//! spread over the L - 1 quantized amplitudes. Harmonic counts listed in `ALLOCATIONS`
//! use the fixed rows there. Every other L is filled by reverse water-filling: each bit
//! in turn goes to the amplitude with the highest remaining priority, log<sub>2</sub> σ
//! less a penalty for the gains, the coefficient block, and the position in the block,
//! less the bits already given. Ties go to the lowest amplitude index.

use arrayvec::ArrayVec;

use crate::coefs::{AMPS_USED, DCT_STD_DEV};
use crate::consts::{MAX_QUANTIZED_AMPS, MIN_HARMONICS};
use crate::gain::GAIN_STD_DEV;
use crate::params::bands;

/// Bits available for the quantized amplitudes when every other field is accounted for.
const AMP_BITS: u32 = 73;

/// Maximum bits allocated to a single quantized amplitude.
pub const MAX_BITS: u8 = 10;

/// Fixed allocations B<sub>3</sub>, ..., B<sub>L+1</sub> for the given L.
static ALLOCATIONS: [(u32, &[u8]); 3] = [
    (9, &[10, 9, 9, 9, 9, 9, 8, 7]),
    (10, &[9, 9, 8, 8, 8, 9, 7, 6, 5]),
    (16, &[6, 6, 6, 5, 5, 6, 6, 5, 4, 4, 3, 3, 3, 3, 2]),
];

/// Priority offset of the gains G<sub>2</sub>, ..., G<sub>6</sub>.
const GAIN_PENALTY: f32 = 0.75;
/// Priority lost for each coefficient block further up in frequency.
const BLOCK_PENALTY: f32 = 0.875;
/// Priority lost for each coefficient further into its block.
const COEF_PENALTY: f32 = 0.5;

/// Compute the bit allocation B<sub>m</sub>, 3 ≤ m ≤ L + 1, for the given number of
/// harmonics L, along with the largest single allocation.
pub fn allocs(harmonics: u32) -> (usize, ArrayVec<u8, MAX_QUANTIZED_AMPS>) {
    let bits = match ALLOCATIONS.iter().find(|&&(l, _)| l == harmonics) {
        Some(&(_, row)) => row.iter().cloned().collect(),
        None => fill(harmonics),
    };

    let max = bits.iter().cloned().max().unwrap_or(0) as usize;

    (max, bits)
}

/// Spread the amplitude bits by water-filling over the amplitude priorities.
fn fill(harmonics: u32) -> ArrayVec<u8, MAX_QUANTIZED_AMPS> {
    let weight = priorities(harmonics);
    let mut bits: ArrayVec<u8, MAX_QUANTIZED_AMPS> = weight.iter().map(|_| 0).collect();

    for _ in 0..AMP_BITS - bands(harmonics) {
        let mut best: Option<(usize, f32)> = None;

        for (i, (&b, &w)) in bits.iter().zip(weight.iter()).enumerate() {
            if b >= MAX_BITS {
                continue;
            }

            let priority = w - b as f32;

            match best {
                Some((_, p)) if p >= priority => {},
                _ => best = Some((i, priority)),
            }
        }

        match best {
            Some((i, _)) => bits[i] += 1,
            None => break,
        }
    }

    bits
}

/// Starting priority of each quantized amplitude: the gains G<sub>2</sub>, ...,
/// G<sub>6</sub> followed by the higher order DCT coefficients of each block.
fn priorities(harmonics: u32) -> ArrayVec<f32, MAX_QUANTIZED_AMPS> {
    let blocks = &AMPS_USED[harmonics as usize - MIN_HARMONICS];

    let gains = GAIN_STD_DEV.iter().map(|s| s.log2() - GAIN_PENALTY);

    let coefs = blocks.iter().enumerate().flat_map(|(i, &n)| {
        DCT_STD_DEV[..n].iter().enumerate().map(move |(k, s)| {
            s.log2() - BLOCK_PENALTY * i as f32 - COEF_PENALTY * k as f32
        })
    });

    gains.chain(coefs).collect()
}
