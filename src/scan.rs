//! Bit scanning of the prioritized chunks.
//!
//! The quantized amplitudes b<sub>3</sub>, ..., b<sub>L+1</sub> are spread over the
//! chunks by a scanning procedure, which visits amplitude bits in priority order and
//! packs them into whatever chunk bits are left over after the pitch, voicing, and gain
//! fields.

use crate::frame::Chunks;
use crate::params::BaseParams;

/// Decodes voiced/unvoiced decisions and the quantized gain index fragment from
/// prioritized chunks.
///
/// Between the chunks created by the two scanning procedures, there is a 22-bit
/// vector made up of u<sub>4</sub> and u<sub>5</sub> that contains the
/// voiced/unvoiced vector, part of the quantized gain index, and the initial bits in
/// the second scanning procedure.
#[derive(Copy, Clone, Debug)]
pub struct ScanSep {
    /// Voiced/Unvoiced Boolean bit vector, b<sub>1</sub>.
    pub voiced: u32,
    /// Bits 1 and 2 of the 6-bit quantized gain index, b<sub>2</sub>.
    pub idx_part: u32,
    /// Chunk of some b<sub>m</sub> used in the scanning procedure.
    pub scanned: u32,
}

impl ScanSep {
    /// Create a new `ScanSep` decoder from the given chunks and frame parameters.
    pub fn new(chunks: &Chunks, params: &BaseParams) -> ScanSep {
        // Concatenate u_4 and u_5 into a 22-bit vector.
        let parts = chunks[4] << 11 | chunks[5];

        ScanSep {
            // Take first K MSBs as the voiced/unvoiced vector.
            voiced: parts >> (22 - params.bands),
            // Take next 2 bits as bit 1 and 2 of b_2.
            idx_part: parts >> (20 - params.bands) & 0b11,
            // Take the remaining 20 - K LSBs as part of the scanning procedure. Since the
            // underlying word is 32 bits, (32 - 22) + K + 2 = 12 + K.
            scanned: parts & !0 >> (12 + params.bands),
        }
    }
}

/// Compute the chunk segments covered in the scanning procedure, each as a group of bits
/// along with the number of LSBs to use from it.
pub fn segments(chunks: &Chunks, scanned: u32, params: &BaseParams) -> [(u32, u32); 7] {
    [
        // Last 3 LSBs of u_0.
        (chunks[0] & 0b111, 3),
        // All of u_1, u_2, and u_3.
        (chunks[1], 12),
        (chunks[2], 12),
        (chunks[3], 12),
        // 22 - (K + 2) = 20 - K LSBs of u_4/u_5.
        (scanned, 20 - params.bands),
        // All of u_6.
        (chunks[6], 11),
        // First 3 MSBs of u_7.
        (chunks[7] >> 4, 3),
    ]
}

/// Sequentially extract the 73 - K bits scanned into the given chunks, MSB first within
/// each segment.
pub fn scan_bits(chunks: &Chunks, scanned: u32, params: &BaseParams)
    -> impl Iterator<Item = u32>
{
    segments(chunks, scanned, params).into_iter().flat_map(|(bits, width)| {
        (0..width).rev().map(move |i| bits >> i & 1)
    })
}
