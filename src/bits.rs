//! Fixed-capacity bit buffers.
//!
//! A `BitFrame` holds one received voice frame, or some piece of it, as a sequence of
//! bits addressed from index 0, the first bit received. Bytes are unpacked MSB-first, so
//! bit 0 is the MSB of the first byte. Integer views of a bit range are big-endian: the
//! lowest index in the range becomes the MSB of the integer.
//!
//! The buffer is a plain `Copy` value. Error correction takes a copy of a codeword
//! before experimenting with trial corrections and writes the result back into the
//! original only once a correction is accepted.

use std::fmt;

use crate::errors::{Error, Result};

/// Maximum number of bits a `BitFrame` can hold.
pub const MAX_BITS: usize = 192;

/// Number of 64-bit words backing a frame.
const WORDS: usize = MAX_BITS / 64;

/// Maximum width of an integer view into a frame.
const MAX_WIDTH: usize = 32;

/// Fixed-capacity, bit-addressable buffer.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Default)]
pub struct BitFrame {
    /// Bits stored MSB-first within each word.
    words: [u64; WORDS],
    /// Number of addressable bits.
    len: usize,
}

impl BitFrame {
    /// Create a new `BitFrame` of the given length with all bits cleared.
    pub fn new(len: usize) -> Result<BitFrame> {
        if len > MAX_BITS {
            return Err(Error::Capacity { len, max: MAX_BITS });
        }

        Ok(BitFrame {
            words: [0; WORDS],
            len,
        })
    }

    /// Create a new `BitFrame` holding every bit of the given bytes, MSB-first.
    pub fn from_bytes(bytes: &[u8]) -> Result<BitFrame> {
        let mut frame = BitFrame::new(bytes.len() * 8)?;

        for (i, &byte) in bytes.iter().enumerate() {
            frame.load(i * 8, i * 8 + 7, byte as u32)?;
        }

        Ok(frame)
    }

    /// Pack the bits into bytes, MSB-first. A partial final byte is padded with zeros.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = vec![0; (self.len + 7) / 8];

        for i in 0..self.len {
            if self.bit(i) {
                bytes[i / 8] |= 0x80 >> (i % 8);
            }
        }

        bytes
    }

    /// Number of bits in the frame.
    pub fn len(&self) -> usize { self.len }

    /// Check if the frame holds no bits.
    pub fn is_empty(&self) -> bool { self.len == 0 }

    /// Retrieve the bit at the given index.
    pub fn get(&self, index: usize) -> Result<bool> {
        self.check(index)?;
        Ok(self.bit(index))
    }

    /// Set the bit at the given index to the given value.
    pub fn set(&mut self, index: usize, value: bool) -> Result<()> {
        self.check(index)?;

        let (word, mask) = locate(index);

        if value {
            self.words[word] |= mask;
        } else {
            self.words[word] &= !mask;
        }

        Ok(())
    }

    /// Invert the bit at the given index.
    pub fn flip(&mut self, index: usize) -> Result<()> {
        self.check(index)?;

        let (word, mask) = locate(index);
        self.words[word] ^= mask;

        Ok(())
    }

    /// Read the inclusive range `start..=end` as an unsigned big-endian integer.
    pub fn get_int(&self, start: usize, end: usize) -> Result<u32> {
        self.check_int(start, end)?;

        Ok((start..=end).fold(0, |acc, i| acc << 1 | self.bit(i) as u32))
    }

    /// Store the low bits of `value` into the inclusive range `start..=end`, MSB-first.
    pub fn load(&mut self, start: usize, end: usize, value: u32) -> Result<()> {
        self.check_int(start, end)?;

        for i in start..=end {
            let shift = end - i;
            let (word, mask) = locate(i);

            if value >> shift & 1 == 1 {
                self.words[word] |= mask;
            } else {
                self.words[word] &= !mask;
            }
        }

        Ok(())
    }

    /// XOR the low bits of `value` into the inclusive range `start..=end`, MSB-first.
    pub fn xor(&mut self, start: usize, end: usize, value: u32) -> Result<()> {
        self.check_int(start, end)?;

        for i in start..=end {
            if value >> (end - i) & 1 == 1 {
                let (word, mask) = locate(i);
                self.words[word] ^= mask;
            }
        }

        Ok(())
    }

    /// Rotate the inclusive range `start..=end` one position towards `start`, so the bit
    /// at `start` wraps around to `end`.
    pub fn rotate_left(&mut self, start: usize, end: usize) -> Result<()> {
        self.check_range(start, end)?;

        let first = self.bit(start);

        for i in start..end {
            let next = self.bit(i + 1);
            self.put(i, next);
        }

        self.put(end, first);

        Ok(())
    }

    /// Rotate the inclusive range `start..=end` one position towards `end`, so the bit
    /// at `end` wraps around to `start`.
    pub fn rotate_right(&mut self, start: usize, end: usize) -> Result<()> {
        self.check_range(start, end)?;

        let last = self.bit(end);

        for i in (start..end).rev() {
            let prev = self.bit(i);
            self.put(i + 1, prev);
        }

        self.put(start, last);

        Ok(())
    }

    /// Find the first set bit at or after `from` and before `bound`, which defaults to
    /// the end of the frame.
    pub fn next_set_bit(&self, from: usize, bound: Option<usize>) -> Result<Option<usize>> {
        let bound = bound.unwrap_or(self.len);

        if bound > self.len {
            return Err(Error::BitIndex { index: bound, len: self.len });
        }

        if from > self.len {
            return Err(Error::BitIndex { index: from, len: self.len });
        }

        Ok((from..bound).find(|&i| self.bit(i)))
    }

    /// Copy the inclusive range `start..=end` into a new `BitFrame`.
    pub fn sub_frame(&self, start: usize, end: usize) -> Result<BitFrame> {
        self.check_range(start, end)?;

        let mut sub = BitFrame::new(end - start + 1)?;

        for i in start..=end {
            sub.put(i - start, self.bit(i));
        }

        Ok(sub)
    }

    /// Iterate over the bits in the frame.
    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        (0..self.len).map(move |i| self.bit(i))
    }

    fn bit(&self, index: usize) -> bool {
        let (word, mask) = locate(index);
        self.words[word] & mask != 0
    }

    fn put(&mut self, index: usize, value: bool) {
        let (word, mask) = locate(index);

        if value {
            self.words[word] |= mask;
        } else {
            self.words[word] &= !mask;
        }
    }

    fn check(&self, index: usize) -> Result<()> {
        if index < self.len {
            Ok(())
        } else {
            Err(Error::BitIndex { index, len: self.len })
        }
    }

    fn check_range(&self, start: usize, end: usize) -> Result<()> {
        if start <= end && end < self.len {
            Ok(())
        } else {
            Err(Error::BitRange { start, end, len: self.len })
        }
    }

    fn check_int(&self, start: usize, end: usize) -> Result<()> {
        self.check_range(start, end)?;

        if end - start < MAX_WIDTH {
            Ok(())
        } else {
            Err(Error::BitRange { start, end, len: self.len })
        }
    }
}

/// Compute the word index and bit mask for the given bit index.
fn locate(index: usize) -> (usize, u64) {
    (index / 64, 1 << (63 - index % 64))
}

impl fmt::Debug for BitFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BitFrame(")?;

        for bit in self.iter() {
            write!(f, "{}", bit as u8)?;
        }

        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bytes() {
        let f = BitFrame::from_bytes(&[0b10110000, 0xFF, 0x01]).unwrap();

        assert_eq!(f.len(), 24);
        assert!(f.get(0).unwrap());
        assert!(!f.get(1).unwrap());
        assert!(f.get(2).unwrap());
        assert!(f.get(3).unwrap());
        assert!(!f.get(4).unwrap());
        assert!(f.get(23).unwrap());
        assert_eq!(f.get_int(8, 15).unwrap(), 0xFF);
        assert_eq!(f.get_int(0, 3).unwrap(), 0b1011);
        assert_eq!(f.to_bytes(), vec![0b10110000, 0xFF, 0x01]);

        let f = BitFrame::from_bytes(&[0; 24]).unwrap();
        assert_eq!(f.len(), 192);
        assert!(BitFrame::from_bytes(&[0; 25]).is_err());
    }

    #[test]
    fn test_bounds() {
        let mut f = BitFrame::new(23).unwrap();

        assert_eq!(f.get(23), Err(Error::BitIndex { index: 23, len: 23 }));
        assert_eq!(f.set(100, true), Err(Error::BitIndex { index: 100, len: 23 }));
        assert!(f.flip(22).is_ok());
        assert!(f.flip(23).is_err());
        assert_eq!(f.get_int(12, 23), Err(Error::BitRange { start: 12, end: 23, len: 23 }));
        assert!(f.get_int(5, 4).is_err());
        assert!(f.rotate_left(0, 23).is_err());
        assert!(f.rotate_right(3, 2).is_err());
        assert!(f.sub_frame(10, 30).is_err());
        assert!(f.xor(0, 23, 1).is_err());
        assert!(f.next_set_bit(24, None).is_err());
        assert!(f.next_set_bit(0, Some(24)).is_err());

        let f = BitFrame::new(64).unwrap();

        // Integer views are limited to 32 bits.
        assert!(f.get_int(0, 31).is_ok());
        assert!(f.get_int(0, 32).is_err());
    }

    #[test]
    fn test_int() {
        let mut f = BitFrame::new(40).unwrap();

        f.load(3, 14, 0b101100111000).unwrap();
        assert_eq!(f.get_int(3, 14).unwrap(), 0b101100111000);
        assert_eq!(f.get_int(0, 2).unwrap(), 0);
        assert_eq!(f.get_int(15, 39).unwrap(), 0);
        assert_eq!(f.get_int(3, 6).unwrap(), 0b1011);

        // Only the low bits of the value are stored.
        f.load(0, 3, 0xFFF5).unwrap();
        assert_eq!(f.get_int(0, 3).unwrap(), 0b0101);

        f.xor(3, 14, 0b111111111111).unwrap();
        assert_eq!(f.get_int(3, 14).unwrap(), 0b010011000111);

        f.load(8, 39, 0xDEADBEEF).unwrap();
        assert_eq!(f.get_int(8, 39).unwrap(), 0xDEADBEEF);

        // Ranges may straddle the backing words.
        let mut f = BitFrame::new(144).unwrap();
        f.load(60, 70, 0b10000000001).unwrap();
        assert!(f.get(60).unwrap());
        assert!(f.get(70).unwrap());
        assert_eq!(f.next_set_bit(61, None).unwrap(), Some(70));
        assert_eq!(f.next_set_bit(61, Some(70)).unwrap(), None);
        assert_eq!(f.next_set_bit(0, None).unwrap(), Some(60));
        assert_eq!(f.next_set_bit(144, None).unwrap(), None);
    }

    #[test]
    fn test_rotate() {
        let mut f = BitFrame::new(16).unwrap();
        f.load(4, 11, 0b10010110).unwrap();

        f.rotate_left(4, 11).unwrap();
        assert_eq!(f.get_int(4, 11).unwrap(), 0b00101101);
        f.rotate_left(4, 11).unwrap();
        assert_eq!(f.get_int(4, 11).unwrap(), 0b01011010);
        f.rotate_right(4, 11).unwrap();
        f.rotate_right(4, 11).unwrap();
        assert_eq!(f.get_int(4, 11).unwrap(), 0b10010110);
        f.rotate_right(4, 11).unwrap();
        assert_eq!(f.get_int(4, 11).unwrap(), 0b01001011);

        // Bits outside the range are untouched.
        assert_eq!(f.get_int(0, 3).unwrap(), 0);
        assert_eq!(f.get_int(12, 15).unwrap(), 0);

        // A full cycle of rotations is the identity.
        let orig = f;
        for _ in 0..8 {
            f.rotate_left(4, 11).unwrap();
        }
        assert_eq!(f, orig);
    }

    #[test]
    fn test_sub_frame() {
        let mut f = BitFrame::new(144).unwrap();
        f.load(23, 45, 0b00000100000011011001100).unwrap();

        let mut sub = f.sub_frame(23, 45).unwrap();
        assert_eq!(sub.len(), 23);
        assert_eq!(sub.get_int(0, 22).unwrap(), 0b00000100000011011001100);

        // Mutating the copy leaves the original alone.
        sub.flip(0).unwrap();
        assert!(sub.get(0).unwrap());
        assert!(!f.get(23).unwrap());
    }

    #[test]
    fn test_debug() {
        let mut f = BitFrame::new(5).unwrap();
        f.set(1, true).unwrap();
        f.set(4, true).unwrap();

        assert_eq!(format!("{:?}", f), "BitFrame(01001)");
        assert_eq!(f.to_bytes(), vec![0b01001000]);
    }
}
