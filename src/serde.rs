//! # Serde module for HyperLogLog
//!
//! This module provides serde-based (serialization and deserialization) features for
//! `HyperLogLog`. The estimator is serialized as a tuple of
//! `(max_cardinality, relative_std_dev, words)`, mirroring the fields of the binary format.
//!
//! During deserialization, the configuration is derived again from the first two elements and
//! packed register words are validated against it, so invalid input surfaces as a serde error.
//!
//! Refer to the serde documentation for more details on custom serialization and deserialization:
//! - [Serialization](https://serde.rs/impl-serialize.html)
//! - [Deserialization](https://serde.rs/impl-deserialize.html)
use std::hash::Hasher;

use serde::de::Error;
use serde::ser::SerializeTuple;
use serde::{Deserialize, Serialize};

use crate::estimator::HyperLogLog;

impl<H: Hasher + Default> Serialize for HyperLogLog<H> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let config = self.configuration();
        let mut tup = serializer.serialize_tuple(3)?;
        tup.serialize_element(&config.max_cardinality())?;
        tup.serialize_element(&config.relative_std_dev())?;
        tup.serialize_element(self.registers().as_words())?;
        tup.end()
    }
}

impl<'de, H: Hasher + Default> Deserialize<'de> for HyperLogLog<H> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let (max_cardinality, relative_std_dev, words): (i64, f64, Vec<u64>) =
            Deserialize::deserialize(deserializer)?;
        HyperLogLog::from_words(relative_std_dev, max_cardinality, words).map_err(Error::custom)
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(0; "empty set")]
    #[test_case(1; "single element")]
    #[test_case(2; "two distinct elements")]
    #[test_case(100; "hundred distinct elements")]
    #[test_case(10000; "ten thousand distinct elements")]
    fn test_serde(n: usize) {
        let mut original_estimator = HyperLogLog::<wyhash::WyHash>::new(0.05).unwrap();

        for i in 0..n {
            let item = &format!("item{}", i);
            original_estimator.insert(&item);
        }

        let serialized = serde_json::to_string(&original_estimator).expect("serialization failed");
        assert!(
            !serialized.is_empty(),
            "serialized string should not be empty"
        );

        let deserialized_estimator: HyperLogLog =
            serde_json::from_str(&serialized).expect("deserialization failed");

        assert_eq!(original_estimator, deserialized_estimator);
        assert_eq!(
            original_estimator.estimate(),
            deserialized_estimator.estimate()
        );
    }

    #[test]
    fn test_deserialize_invalid_json() {
        let invalid_json = "{ invalid_json_string }";
        let result: Result<HyperLogLog, _> = serde_json::from_str(invalid_json);

        assert!(
            result.is_err(),
            "Deserialization should fail for invalid JSON"
        );
    }

    #[test_case("[1000000,0.05,[]]"; "missing words")]
    #[test_case("[0,0.05,[0,0]]"; "zero max cardinality")]
    #[test_case("[1000000,1.5,[0,0]]"; "relative std dev above one")]
    #[test_case("[1000000,0.05]"; "short tuple")]
    #[test_case("[12345,null]"; "null words")]
    fn test_failed_deserialization(input: &str) {
        let result: Result<HyperLogLog, _> = serde_json::from_str(input);
        assert!(result.is_err());
    }
}
