//! Higher order DCT coefficients.

use std::f32::consts::PI;

use arrayvec::ArrayVec;

use crate::allocs::allocs;
use crate::consts::{MAX_HARMONICS, MIN_HARMONICS};
use crate::descramble::QuantizedAmplitudes;
use crate::gain::Gains;
use crate::params::BaseParams;

/// Higher order DCT coefficients vector T<sub>l</sub>, 1 ≤ l ≤ L.
#[derive(Clone, Debug)]
pub struct Coefficients(ArrayVec<f32, MAX_HARMONICS>);

impl Coefficients {
    /// Create a new `Coefficients` vector from the given gains G<sub>m</sub>, quantized
    /// amplitudes b<sub>m</sub>, and frame parameters.
    pub fn new(gains: &Gains, amps: &QuantizedAmplitudes, params: &BaseParams)
        -> Coefficients
    {
        let (_, alloc) = allocs(params.harmonics);
        let blocks = &AMPS_USED[params.harmonics as usize - MIN_HARMONICS];

        let mut coefs = ArrayVec::new();

        // Tracks the starting quantized amplitude b_m to be inserted into the current
        // coefficient block. For the first block this is always b_8 [p34].
        let mut cur = 8;

        for block in 1..=6 {
            let b = CoefBlock::new(block, cur, gains, amps, &alloc, blocks);
            coefs.extend((1..=b.len()).map(|j| b.idct(j)));

            // The first coefficient C_i,1 in each block doesn't count towards quantized
            // amplitude usage.
            cur += b.len() - 1;
        }

        Coefficients(coefs)
    }

    /// Retrieve T<sub>l</sub>, 1 ≤ l ≤ L.
    pub fn get(&self, l: usize) -> f32 { self.0[l - 1] }

    /// Number of coefficients, L.
    pub fn len(&self) -> usize { self.0.len() }
}

/// Block of coefficients C<sub>i,k</sub>, 1 ≤ i ≤ 6 and 1 ≤ k ≤ J<sub>i</sub>.
struct CoefBlock(ArrayVec<f32, 10>);

impl CoefBlock {
    /// Create a new `CoefBlock` from the given block i, the starting quantized amplitude
    /// number, gains G<sub>m</sub>, quantized amplitudes b<sub>m</sub> with their bit
    /// allocations, and the amplitudes used by each block.
    fn new(block: usize, cur: usize, gains: &Gains, amps: &QuantizedAmplitudes,
           alloc: &[u8], blocks: &[usize; 6])
        -> CoefBlock
    {
        assert!(block >= 1 && block <= 6);

        let mut coefs = ArrayVec::new();

        // C_i,1 = R_i.
        coefs.push(gains.idct(block));

        let start = cur;
        let stop = start + blocks[block - 1];

        // Generate C_i,2, ..., C_i,Ji.
        coefs.extend((start..stop).enumerate().map(|(k, m)| {
            let bits = alloc[m - 3] as i32;

            if bits == 0 {
                0.0
            } else {
                DCT_STEP_SIZE[bits as usize - 1] * DCT_STD_DEV[k] *
                    (amps.get(m) as f32 - (1 << (bits - 1)) as f32 + 0.5)
            }
        }));

        CoefBlock(coefs)
    }

    /// Retrieve the number of coefficients in this block, J<sub>i</sub>.
    fn len(&self) -> usize { self.0.len() }

    /// Compute the IDCT c<sub>i,j</sub> for the current block i and 1 ≤ j ≤
    /// J<sub>i</sub>.
    fn idct(&self, j: usize) -> f32 {
        assert!(j >= 1 && j <= self.len());

        self.0[0] + 2.0 * (2..=self.len()).map(|k| {
            self.0[k - 1] * (
                PI * (k as f32 - 1.0) * (j as f32 - 0.5) / self.len() as f32
            ).cos()
        }).sum::<f32>()
    }
}

/// Each AMPS_USED[l] gives J<sub>1</sub> - 1, ..., J<sub>6</sub> - 1 for harmonics
/// parameter l = L - 9. Each J<sub>i</sub> - 1 represents the number of quantized
/// amplitudes used in coefficient block i.
pub static AMPS_USED: [[usize; 6]; 48] = [
    [0, 0, 0, 1, 1, 1],
    [0, 0, 1, 1, 1, 1],
    [0, 1, 1, 1, 1, 1],
    [1, 1, 1, 1, 1, 1],
    [1, 1, 1, 1, 1, 2],
    [1, 1, 1, 1, 2, 2],
    [1, 1, 1, 2, 2, 2],
    [1, 1, 2, 2, 2, 2],
    [1, 2, 2, 2, 2, 2],
    [2, 2, 2, 2, 2, 2],
    [2, 2, 2, 2, 2, 3],
    [2, 2, 2, 2, 3, 3],
    [2, 2, 2, 3, 3, 3],
    [2, 2, 3, 3, 3, 3],
    [2, 3, 3, 3, 3, 3],
    [3, 3, 3, 3, 3, 3],
    [3, 3, 3, 3, 3, 4],
    [3, 3, 3, 3, 4, 4],
    [3, 3, 3, 4, 4, 4],
    [3, 3, 4, 4, 4, 4],
    [3, 4, 4, 4, 4, 4],
    [4, 4, 4, 4, 4, 4],
    [4, 4, 4, 4, 4, 5],
    [4, 4, 4, 4, 5, 5],
    [4, 4, 4, 5, 5, 5],
    [4, 4, 5, 5, 5, 5],
    [4, 5, 5, 5, 5, 5],
    [5, 5, 5, 5, 5, 5],
    [5, 5, 5, 5, 5, 6],
    [5, 5, 5, 5, 6, 6],
    [5, 5, 5, 6, 6, 6],
    [5, 5, 6, 6, 6, 6],
    [5, 6, 6, 6, 6, 6],
    [6, 6, 6, 6, 6, 6],
    [6, 6, 6, 6, 6, 7],
    [6, 6, 6, 6, 7, 7],
    [6, 6, 6, 7, 7, 7],
    [6, 6, 7, 7, 7, 7],
    [6, 7, 7, 7, 7, 7],
    [7, 7, 7, 7, 7, 7],
    [7, 7, 7, 7, 7, 8],
    [7, 7, 7, 7, 8, 8],
    [7, 7, 7, 8, 8, 8],
    [7, 7, 8, 8, 8, 8],
    [7, 8, 8, 8, 8, 8],
    [8, 8, 8, 8, 8, 8],
    [8, 8, 8, 8, 8, 9],
    [8, 8, 8, 8, 9, 9],
];

/// Each DCT_STEP_SIZE[b] is the "uniform quantizer step size" [p31] for the bit
/// allocation b = B<sub>m</sub> - 1.
pub const DCT_STEP_SIZE: [f32; 10] = [
    1.2,
    0.85,
    0.65,
    0.40,
    0.28,
    0.15,
    0.08,
    0.04,
    0.02,
    0.01,
];

/// Each DCT_STD_DEV[j] is the DCT standard deviation [p32] for the coefficient
/// C<sub>i,j+2</sub>.
pub const DCT_STD_DEV: [f32; 9] = [
    0.307,
    0.241,
    0.207,
    0.190,
    0.179,
    0.173,
    0.165,
    0.170,
    0.170,
];
