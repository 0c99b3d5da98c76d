//! ## Register array
//! Flat vector of `M` registers of `W` bits each, packed into `u64` words:
//! - register `i` occupies bits `i * W .. (i + 1) * W` of the array
//! - bit `b` is stored in word `b / 64` at position `b % 64` (least significant bit first)
//! - a register may straddle two neighbouring words
//! - unused trailing bits of the last word are never read
//!
//! Memory usage is `ceil(M * W / 64)` words, independent of cardinality.

use std::mem::{size_of, size_of_val};

use crate::error::{Error, Result};

/// Bit-packed HyperLogLog registers
#[derive(Clone, PartialEq, Eq)]
pub struct RegisterArray {
    /// Number of registers
    len: usize,
    /// Register width in bits
    width: u32,
    /// Packed register bits
    words: Vec<u64>,
}

impl RegisterArray {
    /// Creates `len` zero registers of `width` bits each
    pub fn new(len: usize, width: u32) -> Self {
        Self {
            len,
            width,
            words: vec![0; Self::word_count(len, width)],
        }
    }

    /// Creates register array backed by given packed `words`.
    /// Stored bits are taken as-is, only the word count is validated.
    pub fn from_words(len: usize, width: u32, words: Vec<u64>) -> Result<Self> {
        let expected = Self::word_count(len, width);
        if words.len() != expected {
            return Err(Error::MalformedSerializedData(format!(
                "expected {} packed register words for {} registers of {} bits, got {}",
                expected,
                len,
                width,
                words.len()
            )));
        }
        Ok(Self { len, width, words })
    }

    /// Number of words needed to pack `len` registers of `width` bits
    #[inline]
    fn word_count(len: usize, width: u32) -> usize {
        (len * width as usize).div_ceil(64)
    }

    /// Number of registers
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether array has no registers at all
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Register width in bits
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Largest value a register can hold
    #[inline]
    pub fn max_value(&self) -> u32 {
        (1 << self.width) - 1
    }

    /// Packed register words
    #[inline]
    pub fn as_words(&self) -> &[u64] {
        &self.words
    }

    /// Returns `(word index, bit position, bits in first word)` of register `idx`
    #[inline]
    fn locate(&self, idx: usize) -> (usize, u32, u32) {
        assert!(
            idx < self.len,
            "register index {idx} out of range for {} registers",
            self.len
        );
        let bit_idx = idx * self.width as usize;
        let bit_pos = (bit_idx % 64) as u32;
        (bit_idx / 64, bit_pos, self.width.min(64 - bit_pos))
    }

    /// Get register `idx`.
    ///
    /// # Panics
    /// If `idx` is not less than `len()`.
    #[inline]
    pub fn get(&self, idx: usize) -> u32 {
        let (word, bit_pos, bits_1) = self.locate(idx);
        let bits_2 = self.width - bits_1;
        let mask_1 = (1u64 << bits_1) - 1;

        let mut value = (self.words[word] >> bit_pos) & mask_1;
        if bits_2 > 0 {
            let mask_2 = (1u64 << bits_2) - 1;
            value |= (self.words[word + 1] & mask_2) << bits_1;
        }
        value as u32
    }

    /// Overwrite register `idx` with `value`
    #[inline]
    fn set(&mut self, idx: usize, value: u32) {
        let (word, bit_pos, bits_1) = self.locate(idx);
        let bits_2 = self.width - bits_1;
        let mask_1 = (1u64 << bits_1) - 1;
        let value = u64::from(value);

        self.words[word] &= !(mask_1 << bit_pos);
        self.words[word] |= (value & mask_1) << bit_pos;
        if bits_2 > 0 {
            let mask_2 = (1u64 << bits_2) - 1;
            self.words[word + 1] &= !mask_2;
            self.words[word + 1] |= (value >> bits_1) & mask_2;
        }
    }

    /// Set register `idx` to `max(current, value)`, saturating `value` at `max_value()`.
    /// Returns whether the register changed.
    ///
    /// # Panics
    /// If `idx` is not less than `len()`.
    #[inline]
    pub fn set_max(&mut self, idx: usize, value: u32) -> bool {
        let value = value.min(self.max_value());
        if value > self.get(idx) {
            self.set(idx, value);
            true
        } else {
            false
        }
    }

    /// Raise every register to the maximum of itself and the same register of `rhs`.
    ///
    /// # Panics
    /// If both arrays do not have the same shape.
    pub fn merge_max(&mut self, rhs: &RegisterArray) {
        assert!(
            self.len == rhs.len && self.width == rhs.width,
            "cannot merge {}x{} registers into {}x{}",
            rhs.len,
            rhs.width,
            self.len,
            self.width
        );
        for idx in 0..self.len {
            self.set_max(idx, rhs.get(idx));
        }
    }

    /// Reset all registers to zero
    pub fn clear(&mut self) {
        self.words.fill(0);
    }

    /// Iterate over register values in index order
    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        (0..self.len).map(|idx| self.get(idx))
    }

    /// Number of registers set to zero
    pub fn zeros(&self) -> usize {
        self.iter().filter(|&r| r == 0).count()
    }

    /// Harmonic sum of registers: `sum(2^-r)`
    pub fn harmonic_sum(&self) -> f64 {
        self.iter().map(|r| 1.0 / ((1u64 << r) as f64)).sum()
    }

    /// Return memory size of `RegisterArray`
    pub fn size_of(&self) -> usize {
        size_of::<Self>() + size_of_val(self.words.as_slice())
    }
}

impl std::fmt::Debug for RegisterArray {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisterArray")
            .field("len", &self.len)
            .field("width", &self.width)
            .field("zeros", &self.zeros())
            .finish()
    }
}
