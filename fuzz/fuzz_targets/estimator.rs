#![no_main]

use hyperloglog_estimator::HyperLogLog;
use libfuzzer_sys::fuzz_target;
use wyhash::wyhash;

fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }

    let split_index = wyhash(data, 0) as usize % data.len();
    let (first_half, second_half) = data.split_at(split_index);

    let mut estimator1: HyperLogLog = HyperLogLog::new(0.05).unwrap();
    for chunk in first_half.chunks(4) {
        estimator1.insert(&chunk);
        assert!(estimator1.estimate() > 0);
    }

    let mut estimator2: HyperLogLog = HyperLogLog::new(0.05).unwrap();
    for chunk in second_half.chunks(4) {
        estimator2.insert(&chunk);
        assert!(estimator2.estimate() > 0);
    }

    let merged = estimator1.merge(&[&estimator2]).unwrap();
    assert_eq!(merged, estimator2.merge(&[&estimator1]).unwrap());
});
