//! Prediction residual block averages ("gains").

use std::f32::consts::PI;

use crate::allocs::allocs;
use crate::coefs::DCT_STEP_SIZE;
use crate::descramble::QuantizedAmplitudes;
use crate::params::BaseParams;

/// Standard deviation of each quantized gain G<sub>2</sub>, ..., G<sub>6</sub>.
pub const GAIN_STD_DEV: [f32; 5] = [0.310, 0.201, 0.168, 0.145, 0.132];

/// Reconstruction levels of the G<sub>1</sub> quantizer, indexed by the 6-bit gain index
/// b<sub>2</sub>.
static GAIN_LEVELS: [f32; 64] = [
    -2.842205, -2.694235, -2.558260, -2.382850, -2.221042, -2.095574, -1.980845, -1.836058,
    -1.645556, -1.417658, -1.261301, -1.125631, -0.958207, -0.781591, -0.555837, -0.346976,
    -0.147249, 0.027755, 0.211495, 0.388380, 0.552873, 0.737223, 0.932197, 1.139032,
    1.320955, 1.483433, 1.648297, 1.801447, 1.942731, 2.118613, 2.321486, 2.504443,
    2.653909, 2.780654, 2.925355, 3.076390, 3.220825, 3.402869, 3.585096, 3.784606,
    3.955521, 4.155636, 4.314009, 4.444150, 4.577542, 4.735552, 4.909493, 5.085264,
    5.254767, 5.411894, 5.568094, 5.738523, 5.919215, 6.087701, 6.280685, 6.464201,
    6.647736, 6.834672, 7.022583, 7.211777, 7.471016, 7.738948, 8.124863, 8.695827,
];

/// Gain vector G<sub>m</sub>, 1 ≤ m ≤ 6.
#[derive(Clone, Debug)]
pub struct Gains([f32; 6]);

impl Gains {
    /// Create a new `Gains` from the given 6-bit gain index b<sub>2</sub>, quantized
    /// amplitudes b<sub>3</sub>, ..., b<sub>7</sub>, and frame parameters.
    pub fn new(gain_idx: usize, amps: &QuantizedAmplitudes, params: &BaseParams) -> Gains {
        let (_, alloc) = allocs(params.harmonics);
        let mut gains = [0.0; 6];

        gains[0] = GAIN_LEVELS[gain_idx.min(GAIN_LEVELS.len() - 1)];

        for (m, g) in (2..=6).zip(gains[1..].iter_mut()) {
            // G_m is carried by b_(m+1).
            let bits = alloc[m - 2] as i32;

            *g = if bits == 0 {
                0.0
            } else {
                DCT_STEP_SIZE[bits as usize - 1] * GAIN_STD_DEV[m - 2] *
                    (amps.get(m + 1) as f32 - (1 << (bits - 1)) as f32 + 0.5)
            };
        }

        Gains(gains)
    }

    /// Retrieve G<sub>m</sub>, 1 ≤ m ≤ 6.
    pub fn get(&self, m: usize) -> f32 { self.0[m - 1] }

    /// Compute the IDCT R<sub>i</sub> for the given 1 ≤ i ≤ 6, the average of
    /// coefficient block i.
    pub fn idct(&self, i: usize) -> f32 {
        assert!(i >= 1 && i <= 6);

        self.0[0] + 2.0 * (2..=6).map(|m| {
            self.get(m) * (PI * (m as f32 - 1.0) * (i as f32 - 0.5) / 6.0).cos()
        }).sum::<f32>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descramble::{descramble, Bootstrap};

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

    #[test]
    fn test_levels() {
        let p = BaseParams::new(32);
        let (amps, _, _) = descramble(&CHUNKS, &p);

        assert!((Gains::new(0, &amps, &p).get(1) - -2.842205).abs() < 1e-6);
        assert!((Gains::new(1, &amps, &p).get(1) - -2.694235).abs() < 1e-6);
        assert!((Gains::new(21, &amps, &p).get(1) - 0.737223).abs() < 1e-6);
        assert!((Gains::new(63, &amps, &p).get(1) - 8.695827).abs() < 1e-6);

        for w in GAIN_LEVELS.windows(2) {
            assert!(w[0] < w[1]);
        }
    }

    #[test]
    fn test_gains() {
        let b = Bootstrap::new(&CHUNKS);
        let p = BaseParams::new(b.unwrap_period());
        let (amps, _, gain_idx) = descramble(&CHUNKS, &p);
        let g = Gains::new(gain_idx, &amps, &p);

        assert_eq!(p.harmonics, 16);

        assert!((g.get(1) - 0.737223).abs() < 0.000001);
        assert!((g.get(2) - -1.18575).abs() < 0.000001);
        assert!((g.get(3) - 0.075375).abs() < 0.000001);
        assert!((g.get(4) - -0.1134).abs() < 0.000001);
        assert!((g.get(5) - 0.3857).abs() < 0.000001);
        assert!((g.get(6) - -0.01848).abs() < 0.000001);

        assert!((g.idct(1) - -1.2071545373041197).abs() < 0.00001);
        assert!((g.idct(2) - -1.524574246978134).abs() < 0.00001);
        assert!((g.idct(3) - 0.5032515043523329).abs() < 0.00001);
        assert!((g.idct(4) - 1.481487836406659).abs() < 0.00001);
        assert!((g.idct(5) - 1.456220246978134).abs() < 0.00001);
        assert!((g.idct(6) - 3.7141071965451276).abs() < 0.00001);
    }

    #[test]
    fn test_gains_9() {
        let chunks = [
            0b000000010010,
            0b110011001100,
            0b111000111000,
            0b111111111111,
            0b11010110101,
            0b00101111010,
            0b01110111011,
            0b00001000,
        ];

        let b = Bootstrap::new(&chunks);
        let p = BaseParams::new(b.unwrap_period());
        let (amps, _, gain_idx) = descramble(&chunks, &p);
        let g = Gains::new(gain_idx, &amps, &p);

        assert_eq!(p.harmonics, 9);

        assert!((g.idct(1) - 0.8519942560055926).abs() < 0.00001);
        assert!((g.idct(2) - -0.13083074772702047).abs() < 0.00001);
        assert!((g.idct(3) - -0.014229409757043066).abs() < 0.00001);
        assert!((g.idct(4) - 2.0309896309891773).abs() < 0.00001);
        assert!((g.idct(5) - 0.5902767477270205).abs() < 0.00001);
        assert!((g.idct(6) - 1.0951375227622724).abs() < 0.00001);
    }

    #[test]
    fn test_idct() {
        let g = Gains([1.5, 0.0, 0.0, 0.0, 0.0, 0.0]);

        for i in 1..=6 {
            assert!((g.idct(i) - 1.5).abs() < 1e-6);
        }

        // The higher order terms cancel out over the blocks.
        let g = Gains([0.25, 1.0, -0.5, 0.75, 2.0, -1.25]);
        let sum = (1..=6).map(|i| g.idct(i)).sum::<f32>();
        assert!((sum - 6.0 * 0.25).abs() < 1e-5);

        let g = Gains([0.0, 1.0, 0.0, 0.0, 0.0, 0.0]);
        assert!((g.idct(1) - 2.0 * (PI / 12.0).cos()).abs() < 1e-6);
        assert!((g.idct(6) + 2.0 * (PI / 12.0).cos()).abs() < 1e-6);
    }
}
