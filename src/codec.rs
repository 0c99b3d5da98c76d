//! # Binary format of `HyperLogLog`
//!
//! All fields are big-endian:
//!
//! | offset | size     | field                                   |
//! |--------|----------|-----------------------------------------|
//! | 0      | 8        | max cardinality (`i64`)                 |
//! | 8      | 8        | relative standard deviation (`f64`)     |
//! | 16     | 4        | packed register byte length `L` (`i32`) |
//! | 20     | `L`      | packed register words (`u64` each)      |
//!
//! Configuration is derived again from the stored relative standard deviation and
//! max cardinality, while register bits are restored exactly as stored.

use std::hash::Hasher;

use tracing::debug;

use crate::error::{Error, Result};
use crate::estimator::HyperLogLog;

/// Size of the fixed header preceding register bytes
pub const HEADER_LEN: usize = 20;
/// Size of a packed register word
const WORD_LEN: usize = 8;

impl<H: Hasher + Default> HyperLogLog<H> {
    /// Number of bytes produced by `to_bytes`
    pub fn serialized_len(&self) -> usize {
        HEADER_LEN + self.registers().as_words().len() * WORD_LEN
    }

    /// Serialize `HyperLogLog` into bytes
    pub fn to_bytes(&self) -> Vec<u8> {
        let config = self.configuration();
        let words = self.registers().as_words();

        let mut bytes = Vec::with_capacity(self.serialized_len());
        bytes.extend_from_slice(&config.max_cardinality().to_be_bytes());
        bytes.extend_from_slice(&config.relative_std_dev().to_be_bytes());
        // word count is bounded by 2^30 registers of 6 bits, so byte length fits `i32`
        bytes.extend_from_slice(&((words.len() * WORD_LEN) as i32).to_be_bytes());
        for word in words {
            bytes.extend_from_slice(&word.to_be_bytes());
        }
        bytes
    }

    /// Deserialize `HyperLogLog` from bytes produced by `to_bytes`
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        decode(bytes).inspect_err(|e| {
            debug!(len = bytes.len(), error = %e, "rejected serialized HyperLogLog");
        })
    }
}

fn decode<H: Hasher + Default>(bytes: &[u8]) -> Result<HyperLogLog<H>> {
    if bytes.len() < HEADER_LEN {
        return Err(malformed(format!(
            "expected at least {HEADER_LEN} header bytes, got {}",
            bytes.len()
        )));
    }

    let max_cardinality = i64::from_be_bytes(read_array(bytes, 0)?);
    let relative_std_dev = f64::from_be_bytes(read_array(bytes, 8)?);
    let declared_len = i32::from_be_bytes(read_array(bytes, 16)?);

    let registers_len = usize::try_from(declared_len)
        .map_err(|_| malformed(format!("negative register byte length {declared_len}")))?;
    if registers_len % WORD_LEN != 0 {
        return Err(malformed(format!(
            "register byte length {registers_len} is not a multiple of {WORD_LEN}"
        )));
    }

    let body = &bytes[HEADER_LEN..];
    if body.len() < registers_len {
        return Err(malformed(format!(
            "declared {registers_len} register bytes, only {} available",
            body.len()
        )));
    }
    if body.len() > registers_len {
        return Err(malformed(format!(
            "{} trailing bytes after registers",
            body.len() - registers_len
        )));
    }

    let words = body
        .chunks_exact(WORD_LEN)
        .map(|chunk| read_array(chunk, 0).map(u64::from_be_bytes))
        .collect::<Result<Vec<u64>>>()?;

    HyperLogLog::from_words(relative_std_dev, max_cardinality, words).map_err(|e| match e {
        Error::InvalidConfiguration(reason) => malformed(reason),
        e => e,
    })
}

/// Read `N` bytes starting at `offset`
#[inline]
fn read_array<const N: usize>(bytes: &[u8], offset: usize) -> Result<[u8; N]> {
    bytes
        .get(offset..offset + N)
        .and_then(|s| s.try_into().ok())
        .ok_or_else(|| malformed(format!("truncated field at offset {offset}")))
}

#[inline]
fn malformed(reason: String) -> Error {
    Error::MalformedSerializedData(reason)
}
