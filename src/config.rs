//! ## Configuration
//! Derives the fixed HyperLogLog parameters from a target relative standard
//! deviation `rsd` and an expected maximum cardinality `n`:
//! - `log2m = ceil(log2((1.106 / rsd)^2))`, clamped to `[4..30]`
//! - `m = 2^log2m` registers, giving a standard error of about `1.04 / sqrt(m)`
//! - `w = max(5, ceil(log2(log2(n))))` bits per register
//!
//! Register width stays at 5 bits until `n` exceeds ~4.3 billion and never
//! goes above 6 bits for any positive `i64` cardinality.

use crate::error::{Error, Result};

/// Default expected maximum cardinality
pub const DEFAULT_MAX_CARDINALITY: i64 = 1_000_000;
/// Default relative standard deviation
pub const DEFAULT_RELATIVE_STD_DEV: f64 = 0.05;
/// Smallest supported number of register index bits (16 registers)
pub const MIN_REGISTER_COUNT_LOG2: u32 = 4;
/// Largest supported number of register index bits
pub const MAX_REGISTER_COUNT_LOG2: u32 = 30;
/// Smallest register width in bits
const MIN_REGISTER_WIDTH: u32 = 5;

/// Immutable HyperLogLog parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Configuration {
    relative_std_dev: f64,
    max_cardinality: i64,
    register_count_log2: u32,
    register_width: u32,
}

impl Configuration {
    /// Creates configuration for given relative standard deviation and the default max cardinality
    pub fn new(relative_std_dev: f64) -> Result<Self> {
        Self::with_max_cardinality(relative_std_dev, DEFAULT_MAX_CARDINALITY)
    }

    /// Creates configuration for given relative standard deviation and max cardinality
    pub fn with_max_cardinality(relative_std_dev: f64, max_cardinality: i64) -> Result<Self> {
        if !(relative_std_dev > 0.0 && relative_std_dev < 1.0) {
            return Err(Error::InvalidConfiguration(format!(
                "relative standard deviation must be in (0, 1), got {relative_std_dev}"
            )));
        }
        if max_cardinality <= 0 {
            return Err(Error::InvalidConfiguration(format!(
                "max cardinality must be positive, got {max_cardinality}"
            )));
        }

        let register_count_log2 = Self::register_count_log2_for(relative_std_dev)?;
        let register_width = register_width_for(max_cardinality);

        Ok(Self {
            relative_std_dev,
            max_cardinality,
            register_count_log2,
            register_width,
        })
    }

    /// Number of registers a configuration with given `relative_std_dev` would use.
    pub fn register_count_for(relative_std_dev: f64) -> Result<usize> {
        Self::new(relative_std_dev).map(|c| c.register_count())
    }

    fn register_count_log2_for(relative_std_dev: f64) -> Result<u32> {
        let ratio = 1.106 / relative_std_dev;
        let log2m = (ratio * ratio).log2().ceil();
        if log2m > f64::from(MAX_REGISTER_COUNT_LOG2) {
            return Err(Error::InvalidConfiguration(format!(
                "relative standard deviation {relative_std_dev} needs 2^{log2m} registers, \
                 at most 2^{MAX_REGISTER_COUNT_LOG2} are supported"
            )));
        }
        Ok((log2m as u32).max(MIN_REGISTER_COUNT_LOG2))
    }

    /// Target relative standard deviation
    #[inline]
    pub fn relative_std_dev(&self) -> f64 {
        self.relative_std_dev
    }

    /// Expected maximum cardinality used to size registers
    #[inline]
    pub fn max_cardinality(&self) -> i64 {
        self.max_cardinality
    }

    /// Number of bits used for register indices
    #[inline]
    pub fn register_count_log2(&self) -> u32 {
        self.register_count_log2
    }

    /// Number of registers `m`
    #[inline]
    pub fn register_count(&self) -> usize {
        1 << self.register_count_log2
    }

    /// Number of bits per register
    #[inline]
    pub fn register_width(&self) -> u32 {
        self.register_width
    }

    /// Number of `u64` words holding `m * w` packed register bits
    #[inline]
    pub fn word_count(&self) -> usize {
        (self.register_count() * self.register_width as usize).div_ceil(64)
    }

    /// Guard bit ORed into the remaining hash bits before the rank bit-scan,
    /// bounding the scanned bit position by `2^w - 2`.
    #[inline]
    pub(crate) fn sentinel(&self) -> u64 {
        1u64 << ((1u32 << self.register_width) - 2)
    }

    /// Whether estimators built from both configurations can be merged.
    /// Requires equal parameters, not just equal register count and width.
    #[inline]
    pub fn is_compatible(&self, other: &Configuration) -> bool {
        self == other
    }
}

impl Default for Configuration {
    /// 5% relative standard deviation with default max cardinality: 512 registers of 5 bits
    fn default() -> Self {
        Self {
            relative_std_dev: DEFAULT_RELATIVE_STD_DEV,
            max_cardinality: DEFAULT_MAX_CARDINALITY,
            register_count_log2: 9,
            register_width: MIN_REGISTER_WIDTH,
        }
    }
}

/// Register width for given expected maximum cardinality
fn register_width_for(max_cardinality: i64) -> u32 {
    let bits = (max_cardinality as f64).log2().log2().ceil();
    // NaN and negative infinity (n <= 2) saturate to 0 here
    (bits as u32).max(MIN_REGISTER_WIDTH)
}
