//! Extraction of the quantized parameters b<sub>0</sub>, ..., b<sub>L+1</sub> from the
//! prioritized chunks.

use std::cmp::min;

use arrayvec::ArrayVec;

use crate::allocs::allocs;
use crate::consts::MAX_QUANTIZED_AMPS;
use crate::frame::Chunks;
use crate::params::BaseParams;
use crate::scan::{scan_bits, ScanSep};

/// Extract the quantized amplitudes, voiced/unvoiced decisions, and gain index b<sub>2</sub>
/// from the given chunks.
pub fn descramble(chunks: &Chunks, params: &BaseParams) ->
    (QuantizedAmplitudes, VoiceDecisions, usize)
{
    let parts = ScanSep::new(chunks, params);
    let scan = scan_bits(chunks, parts.scanned, params);

    (
        QuantizedAmplitudes::new(scan, params),
        VoiceDecisions::new(parts.voiced, params),
        gain_idx(chunks, parts.idx_part),
    )
}

/// Frame type determined from the 8-bit pitch period b<sub>0</sub>.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Bootstrap {
    /// Voice frame with the given valid period.
    Period(u8),
    /// Silence frame.
    Silence,
    /// Reserved period value.
    Invalid,
}

impl Bootstrap {
    /// Decode b<sub>0</sub> from the 6 MSBs of u<sub>0</sub> and 2 bits of
    /// u<sub>7</sub>.
    pub fn new(chunks: &Chunks) -> Bootstrap {
        match b0(chunks) {
            period @ 0..=207 => Bootstrap::Period(period),
            216..=219 => Bootstrap::Silence,
            _ => Bootstrap::Invalid,
        }
    }

    #[cfg(test)]
    pub fn unwrap_period(&self) -> u8 {
        if let Bootstrap::Period(period) = *self {
            period
        } else {
            panic!("attempted unwrap of invalid/silence period");
        }
    }
}

/// Compute the raw pitch period b<sub>0</sub>.
pub fn b0(chunks: &Chunks) -> u8 {
    (chunks[0] >> 4) as u8 & 0xFC | (chunks[7] >> 1) as u8 & 0b11
}

/// Reassemble the 6-bit gain index b<sub>2</sub> from its 3 bits in u<sub>0</sub>, the
/// 2 bits separated out of u<sub>4</sub>/u<sub>5</sub>, and 1 bit in u<sub>7</sub>.
pub fn gain_idx(chunks: &Chunks, idx_part: u32) -> usize {
    (chunks[0] & 0x38 | idx_part << 1 | chunks[7] >> 3 & 1) as usize
}

/// Quantized amplitudes b<sub>m</sub>, 3 ≤ m ≤ L + 1.
#[derive(Clone, Debug)]
pub struct QuantizedAmplitudes(ArrayVec<u32, MAX_QUANTIZED_AMPS>);

impl QuantizedAmplitudes {
    fn new<I: Iterator<Item = u32>>(mut scan: I, params: &BaseParams) -> QuantizedAmplitudes {
        let (max, alloc) = allocs(params.harmonics);
        let mut amps: ArrayVec<u32, MAX_QUANTIZED_AMPS> = alloc.iter().map(|_| 0).collect();

        // Bits are scanned MSB first across all amplitudes, starting from the highest bit
        // position of the largest allocation.
        for idx in (0..max).rev() {
            for (amp, &bits) in amps.iter_mut().zip(alloc.iter()) {
                if bits as usize <= idx {
                    continue;
                }

                *amp = *amp << 1 | scan.next().unwrap_or(0);
            }
        }

        debug_assert!(scan.next().is_none());

        QuantizedAmplitudes(amps)
    }

    /// Retrieve b<sub>m</sub> for the given 3 ≤ m ≤ L + 1.
    pub fn get(&self, m: usize) -> u32 { self.0[m - 3] }
}

/// Voiced/unvoiced decisions v<sub>l</sub> for each harmonic 1 ≤ l ≤ L.
#[derive(Copy, Clone, Debug)]
pub struct VoiceDecisions {
    params: BaseParams,
    /// Band decisions b<sub>1</sub>, with band 1 at bit K - 1.
    voiced: u32,
    /// Harmonics forced voiced by adaptive smoothing, with harmonic l at bit l - 1.
    forced: u64,
}

impl VoiceDecisions {
    /// Create a new `VoiceDecisions` from the given K-bit band vector b<sub>1</sub>.
    pub fn new(voiced: u32, params: &BaseParams) -> VoiceDecisions {
        VoiceDecisions {
            params: *params,
            voiced,
            forced: 0,
        }
    }

    /// Mark the given harmonic as voiced regardless of its band decision.
    pub fn force_voiced(&mut self, l: usize) {
        if l >= 1 && l <= self.params.harmonics as usize {
            self.forced |= 1 << (l - 1);
        }
    }

    /// Check if the given harmonic l is voiced. Harmonics beyond L are unvoiced.
    pub fn is_voiced(&self, l: usize) -> bool {
        if l == 0 || l > self.params.harmonics as usize {
            return false;
        }

        self.forced >> (l - 1) & 1 == 1 || self.is_band_voiced(min((l + 2) / 3, 12))
    }

    /// Check if the given band 1 ≤ k ≤ K was marked voiced by the encoder.
    pub fn is_band_voiced(&self, k: usize) -> bool {
        if k == 0 || k > self.params.bands as usize {
            return false;
        }

        self.voiced >> (self.params.bands as usize - k) & 1 == 1
    }

    /// Number of bands marked voiced by the encoder.
    pub fn voiced_bands(&self) -> u32 {
        (1..=self.params.bands as usize).filter(|&k| self.is_band_voiced(k)).count() as u32
    }

    /// Number of unvoiced harmonics, L<sub>uv</sub>.
    pub fn unvoiced_count(&self) -> u32 {
        (1..=self.params.harmonics as usize).filter(|&l| !self.is_voiced(l)).count() as u32
    }
}

impl Default for VoiceDecisions {
    fn default() -> VoiceDecisions {
        VoiceDecisions::new(0, &BaseParams::default())
    }
}
