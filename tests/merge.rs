use hyperloglog_estimator::{Error, HyperLogLog};
use test_case::test_case;

fn estimator(rsd: f64, items: std::ops::Range<usize>) -> HyperLogLog {
    let mut e = HyperLogLog::new(rsd).unwrap();
    let mut buf = [0u8; 9];
    buf[8] = 1;
    for i in items {
        buf[..8].copy_from_slice(&i.to_le_bytes());
        e.insert(&buf);
    }
    e
}

#[test_case(0, 0)]
#[test_case(10, 0)]
#[test_case(100, 1000)]
#[test_case(10_000, 10_000)]
fn test_merge_is_idempotent(lhs_n: usize, rhs_n: usize) {
    let a = estimator(0.05, lhs_n..lhs_n + rhs_n);
    assert_eq!(a.merge(&[&a]).unwrap(), a);
    assert_eq!(a.merge(&[&a, &a, &a]).unwrap(), a);
}

#[test_case(0, 10)]
#[test_case(100, 1000)]
#[test_case(10_000, 20_000)]
fn test_merge_is_commutative(lhs_n: usize, rhs_n: usize) {
    let a = estimator(0.05, 0..lhs_n);
    let b = estimator(0.05, lhs_n / 2..lhs_n / 2 + rhs_n);
    assert_eq!(a.merge(&[&b]).unwrap(), b.merge(&[&a]).unwrap());
}

#[test]
fn test_merge_is_associative() {
    let a = estimator(0.03, 0..5_000);
    let b = estimator(0.03, 2_500..10_000);
    let c = estimator(0.03, 7_000..50_000);

    let ab_c = a.merge(&[&b]).unwrap().merge(&[&c]).unwrap();
    let a_bc = a.merge(&[&b.merge(&[&c]).unwrap()]).unwrap();
    assert_eq!(ab_c, a_bc);
    assert_eq!(ab_c, a.merge(&[&b, &c]).unwrap());
}

#[test]
fn test_merge_equals_union_stream() {
    let a = estimator(0.03, 0..3_000);
    let b = estimator(0.03, 1_000..8_000);
    let union = estimator(0.03, 0..8_000);

    let merged = a.merge(&[&b]).unwrap();
    assert_eq!(merged, union);
    assert_eq!(merged.estimate(), union.estimate());
}

#[test]
fn test_merge_from_matches_merge() {
    let a = estimator(0.05, 0..1_000);
    let b = estimator(0.05, 500..5_000);

    let mut in_place = a.clone();
    in_place.merge_from(&b).unwrap();
    assert_eq!(in_place, a.merge(&[&b]).unwrap());
}

#[test]
fn test_merge_empty_is_noop() {
    let a = estimator(0.05, 0..1_000);
    let empty = estimator(0.05, 0..0);
    assert_eq!(a.merge(&[&empty]).unwrap(), a);
    assert_eq!(empty.merge(&[&a]).unwrap(), a);
}

#[test]
fn test_merge_rejects_any_mismatched_input() {
    let a = estimator(0.05, 0..100);
    let b = estimator(0.05, 100..200);
    let c = estimator(0.01, 0..100);

    let result = a.merge(&[&b, &c]);
    assert!(matches!(result, Err(Error::ConfigurationMismatch { .. })));
}

#[test_case(0.049, 1_000_000; "different relative std dev")]
#[test_case(0.05, 1_000; "different max cardinality")]
#[test_case(0.049, 1_000; "both parameters differ")]
fn test_merge_rejects_same_shape_with_different_parameters(rsd: f64, n: i64) {
    // 0.05 and 0.049 both need 512 registers of 5 bits
    let a = estimator(0.05, 0..100);
    let mut b: HyperLogLog = HyperLogLog::with_max_cardinality(rsd, n).unwrap();
    b.insert("x");
    assert_eq!(a.register_count(), b.register_count());
    assert_eq!(a.register_width(), b.register_width());

    assert_eq!(
        a.merge(&[&b]),
        Err(Error::ConfigurationMismatch {
            expected: *a.configuration(),
            actual: *b.configuration(),
        })
    );
    assert_eq!(
        b.merge(&[&a]),
        Err(Error::ConfigurationMismatch {
            expected: *b.configuration(),
            actual: *a.configuration(),
        })
    );
}

#[test]
fn test_merge_is_commutative_for_separately_built_configurations() {
    let mut a: HyperLogLog = HyperLogLog::with_max_cardinality(0.049, 1_000).unwrap();
    let mut b: HyperLogLog = HyperLogLog::with_max_cardinality(0.049, 1_000).unwrap();
    for i in 0..500 {
        a.insert(&i);
        b.insert(&(i + 250));
    }

    let ab = a.merge(&[&b]).unwrap();
    let ba = b.merge(&[&a]).unwrap();
    assert_eq!(ab, ba);
    assert_eq!(ab.to_bytes(), ba.to_bytes());
}
