//! HyperLogLog estimator allows to estimate number of distinct elements
//! in the stream or dataset and is defined by a [`Configuration`]:
//! - `relative_std_dev`: target standard error, which defines the number of
//!   registers `M = 2^P` used for the estimate.
//! - `max_cardinality`: expected maximum number of distinct elements, which
//!   defines register width `W` (5 or 6 bits).
//!
//! # Update rule
//! Each element is hashed into a 64-bit value `h`:
//! - the lowest `P` bits of `h` select register `idx`
//! - the remaining `64 - P` bits are ORed with a sentinel bit at position `2^W - 2`
//!   and the position of their least significant set bit `r` is found
//! - register `idx` is raised to `max(register, r + 1)`
//!
//! The sentinel bounds the rank by `2^W - 1`, so it always fits a register,
//! even when all remaining hash bits are zero.
//!
//! # Estimate
//! Raw HyperLogLog estimate `alpha(M) * M^2 / sum(2^-register)` with linear counting
//! `M * ln(M / V)` used instead when the raw estimate is below `2.5 * M` and there are
//! `V > 0` zero registers. Large range correction is not applied since 64-bit hashes
//! keep the estimator far away from hash space saturation.
//!
//! Expected error:
//!   rsd = 0.05: M = 2^9,  1.04 / sqrt(2^9)  = 4.60%
//!   rsd = 0.03: M = 2^11, 1.04 / sqrt(2^11) = 2.30%
//!   rsd = 0.01: M = 2^14, 1.04 / sqrt(2^14) = 0.81%
//!
//! # Merge
//! Union of estimators is computed by taking per-register maximum, which gives exactly
//! the registers an estimator would have after observing both streams.
//!
//! `HyperLogLog` is not synchronized: concurrent ingestion should shard elements across
//! independent estimators and merge them afterwards.

use std::fmt::{Debug, Formatter};
use std::hash::{BuildHasher, BuildHasherDefault, Hash, Hasher};
use std::mem::{size_of, size_of_val};

use tracing::{debug, trace};
use wyhash::WyHash;

use crate::config::Configuration;
use crate::error::{Error, Result};
use crate::registers::RegisterArray;

/// HyperLogLog cardinality estimator
pub struct HyperLogLog<H: Hasher + Default = WyHash> {
    /// Fixed algorithm parameters
    config: Configuration,
    /// Bit-packed registers
    registers: RegisterArray,
    /// Zero-sized build hasher
    build_hasher: BuildHasherDefault<H>,
}

impl<H: Hasher + Default> HyperLogLog<H> {
    /// Creates new instance of `HyperLogLog` with given relative standard deviation
    pub fn new(relative_std_dev: f64) -> Result<Self> {
        Configuration::new(relative_std_dev).map(Self::from_config)
    }

    /// Creates new instance of `HyperLogLog` with given relative standard deviation
    /// and expected maximum cardinality
    pub fn with_max_cardinality(relative_std_dev: f64, max_cardinality: i64) -> Result<Self> {
        Configuration::with_max_cardinality(relative_std_dev, max_cardinality)
            .map(Self::from_config)
    }

    /// Creates new empty instance of `HyperLogLog` from configuration
    pub fn from_config(config: Configuration) -> Self {
        debug!(
            registers = config.register_count(),
            width = config.register_width(),
            "created HyperLogLog estimator"
        );
        Self {
            registers: RegisterArray::new(config.register_count(), config.register_width()),
            config,
            build_hasher: BuildHasherDefault::default(),
        }
    }

    /// Restores `HyperLogLog` from configuration parameters and packed register words.
    /// Register bits are taken as-is.
    pub fn from_words(
        relative_std_dev: f64,
        max_cardinality: i64,
        words: Vec<u64>,
    ) -> Result<Self> {
        let config = Configuration::with_max_cardinality(relative_std_dev, max_cardinality)?;
        let registers =
            RegisterArray::from_words(config.register_count(), config.register_width(), words)?;
        Ok(Self {
            config,
            registers,
            build_hasher: BuildHasherDefault::default(),
        })
    }

    /// Insert a hashable item into `HyperLogLog`.
    /// Returns whether any register changed.
    #[inline]
    pub fn insert<T: Hash + ?Sized>(&mut self, item: &T) -> bool {
        let mut hasher = self.build_hasher.build_hasher();
        item.hash(&mut hasher);
        let hash = hasher.finish();
        self.insert_hash(hash)
    }

    /// Insert precomputed 64-bit hash into `HyperLogLog`.
    /// Returns whether any register changed.
    #[inline]
    pub fn insert_hash(&mut self, hash: u64) -> bool {
        let (idx, rank) = self.decode_hash(hash);
        self.registers.set_max(idx, rank)
    }

    /// Return register index and rank of given hash
    #[inline]
    fn decode_hash(&self, hash: u64) -> (usize, u32) {
        let p = self.config.register_count_log2();
        let idx = (hash & ((1 << p) - 1)) as usize;
        let rank = ((hash >> p) | self.config.sentinel()).trailing_zeros() + 1;
        (idx, rank)
    }

    /// Return cardinality estimate rounded to the nearest integer.
    ///
    /// Registers close to their maximum value (reachable with 6-bit registers or
    /// through crafted input) can yield raw estimates above `usize::MAX`, which
    /// saturate to `usize::MAX`.
    pub fn estimate(&self) -> usize {
        let zeros = self.registers.zeros();
        let sum = self.registers.harmonic_sum();

        let alpha = alpha(self.config.register_count());
        let m = self.config.register_count() as f64;
        let mut estimate = alpha * m * m / sum;
        if estimate <= 2.5 * m && zeros > 0 {
            // linear counting for small cardinalities
            estimate = m * (m / zeros as f64).ln();
        }

        let estimate = estimate.round();
        if estimate >= usize::MAX as f64 {
            usize::MAX
        } else {
            estimate as usize
        }
    }

    /// Whether no element has been inserted yet
    pub fn is_empty(&self) -> bool {
        self.registers.zeros() == self.registers.len()
    }

    /// Merge `self` with `others` into new estimator, leaving all inputs untouched.
    ///
    /// Every input must have the same configuration as `self`.
    pub fn merge(&self, others: &[&Self]) -> Result<Self> {
        for other in others {
            self.check_compatible(other)?;
        }

        let mut merged = self.clone();
        for other in others {
            merged.registers.merge_max(&other.registers);
        }
        trace!(inputs = others.len() + 1, "merged HyperLogLog estimators");

        Ok(merged)
    }

    /// Merge `rhs` into `self` in place.
    /// On error `self` is left unchanged.
    pub fn merge_from(&mut self, rhs: &Self) -> Result<()> {
        self.check_compatible(rhs)?;
        self.registers.merge_max(&rhs.registers);
        Ok(())
    }

    fn check_compatible(&self, other: &Self) -> Result<()> {
        if self.config.is_compatible(&other.config) {
            return Ok(());
        }
        debug!(
            expected = ?self.config,
            actual = ?other.config,
            "rejected merge of incompatible HyperLogLog estimators"
        );
        Err(Error::ConfigurationMismatch {
            expected: self.config,
            actual: other.config,
        })
    }

    /// Reset estimator to its empty state
    pub fn clear(&mut self) {
        self.registers.clear();
    }

    /// Return estimator configuration
    #[inline]
    pub fn configuration(&self) -> &Configuration {
        &self.config
    }

    /// Return estimator registers
    #[inline]
    pub fn registers(&self) -> &RegisterArray {
        &self.registers
    }

    /// Number of registers
    #[inline]
    pub fn register_count(&self) -> usize {
        self.config.register_count()
    }

    /// Register width in bits
    #[inline]
    pub fn register_width(&self) -> u32 {
        self.config.register_width()
    }

    /// Return memory size of `HyperLogLog`
    pub fn size_of(&self) -> usize {
        size_of::<Self>() + size_of_val(self.registers.as_words())
    }
}

impl<H: Hasher + Default> Default for HyperLogLog<H> {
    /// Empty estimator with 5% relative standard deviation and default max cardinality
    fn default() -> Self {
        Self::from_config(Configuration::default())
    }
}

impl<H: Hasher + Default> Clone for HyperLogLog<H> {
    fn clone(&self) -> Self {
        Self {
            config: self.config,
            registers: self.registers.clone(),
            build_hasher: BuildHasherDefault::default(),
        }
    }
}

impl<H: Hasher + Default> PartialEq for HyperLogLog<H> {
    /// Compare configurations and register bits
    fn eq(&self, rhs: &Self) -> bool {
        self.config == rhs.config && self.registers == rhs.registers
    }
}

impl<H: Hasher + Default> Debug for HyperLogLog<H> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{{ relative_std_dev: {}, max_cardinality: {}, registers: {}, width: {}, estimate: {}, size: {} }}",
            self.config.relative_std_dev(),
            self.config.max_cardinality(),
            self.register_count(),
            self.register_width(),
            self.estimate(),
            self.size_of()
        )
    }
}

/// Parameter for bias correction
#[inline]
fn alpha(m: usize) -> f64 {
    match m {
        16 => 0.673,
        32 => 0.697,
        64 => 0.709,
        _ => 0.7213 / (1.0 + 1.079 / (m as f64)),
    }
}
