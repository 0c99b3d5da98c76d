#![no_main]

use hyperloglog_estimator::HyperLogLog;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(mut estimator) = HyperLogLog::<wyhash::WyHash>::from_bytes(data) {
        assert_eq!(estimator.to_bytes(), data);
        estimator.insert(&1);
        assert!(estimator.estimate() > 0);
    }
});
