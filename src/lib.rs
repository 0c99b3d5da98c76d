//! `hyperloglog-estimator` is a Rust crate designed to estimate the number of distinct elements in a stream or dataset
//! using sub-linear memory.
//!
//! This library uses HyperLogLog with bit-packed registers, linear counting for small cardinalities,
//! register-wise maximum for merges, and a compact big-endian binary format.
//!
//! ```
//! use hyperloglog_estimator::HyperLogLog;
//!
//! let mut lhs: HyperLogLog = HyperLogLog::new(0.05).unwrap();
//! let mut rhs: HyperLogLog = HyperLogLog::new(0.05).unwrap();
//! for i in 0..10 {
//!     lhs.insert(&i);
//! }
//! for i in 5..15 {
//!     rhs.insert(&i);
//! }
//!
//! let merged = lhs.merge(&[&rhs]).unwrap();
//! let estimate = merged.estimate();
//! assert!((13..=17).contains(&estimate));
//!
//! let restored: HyperLogLog = HyperLogLog::from_bytes(&merged.to_bytes()).unwrap();
//! assert_eq!(restored, merged);
//! ```
mod codec;
pub mod config;
mod error;
pub mod estimator;
pub mod registers;
#[cfg(feature = "with_serde")]
mod serde;

pub use codec::HEADER_LEN;
pub use config::{Configuration, DEFAULT_MAX_CARDINALITY, DEFAULT_RELATIVE_STD_DEV};
pub use error::{Error, Result};
pub use estimator::HyperLogLog;
pub use registers::RegisterArray;
