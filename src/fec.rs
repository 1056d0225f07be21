//! Forward error correction over systematic block codes.

use crate::bits::BitFrame;
use crate::errors::Result;

/// Error count reported for a codeword that couldn't be corrected.
pub const UNCORRECTABLE: usize = 4;

/// A systematic block code protecting a contiguous run of bits in a frame.
///
/// Each codeword is laid out as `DATA_BITS` information bits, MSB first, followed by
/// `LEN - DATA_BITS` checksum bits.
pub trait BlockCode {
    /// Total bits in a codeword.
    const LEN: usize;
    /// Information bits at the start of a codeword.
    const DATA_BITS: usize;

    /// Compute the checksum bits for the given information bits.
    fn checksum(data: u32) -> u32;

    /// Correct the codeword starting at the given bit in place, returning the number of
    /// bit errors that were corrected, or `UNCORRECTABLE`.
    ///
    /// Fails only when the codeword doesn't fit within the frame.
    fn correct(frame: &mut BitFrame, start: usize) -> Result<usize>;

    /// Compute the syndrome of the codeword starting at the given bit: the XOR of the
    /// expected and received checksums.
    fn syndrome(frame: &BitFrame, start: usize) -> Result<u32> {
        let data = frame.get_int(start, start + Self::DATA_BITS - 1)?;
        let parity = frame.get_int(start + Self::DATA_BITS, start + Self::LEN - 1)?;

        Ok(Self::checksum(data) ^ parity)
    }

    /// Write the information bits followed by their checksum into the frame at the given
    /// bit.
    fn encode(frame: &mut BitFrame, start: usize, data: u32) -> Result<()> {
        frame.load(start, start + Self::DATA_BITS - 1, data)?;
        frame.load(start + Self::DATA_BITS, start + Self::LEN - 1, Self::checksum(data))
    }
}

/// Compute a checksum by XOR-accumulating the table entry of every set information bit,
/// where the first entry corresponds to the MSB.
pub fn table_checksum(table: &[u32], data: u32) -> u32 {
    let width = table.len();

    table.iter()
        .enumerate()
        .filter(|&(i, _)| data >> (width - 1 - i) & 1 == 1)
        .fold(0, |sum, (_, &c)| sum ^ c)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_checksum() {
        let table = [0b100, 0b010, 0b111];

        assert_eq!(table_checksum(&table, 0b000), 0);
        assert_eq!(table_checksum(&table, 0b100), 0b100);
        assert_eq!(table_checksum(&table, 0b001), 0b111);
        assert_eq!(table_checksum(&table, 0b101), 0b011);
        assert_eq!(table_checksum(&table, 0b111), 0b001);
    }
}
