use hyperloglog_estimator::HyperLogLog;

fn main() -> hyperloglog_estimator::Result<()> {
    let mut estimator1: HyperLogLog = HyperLogLog::new(0.03)?;
    for i in 0..10 {
        estimator1.insert(&i);
    }
    println!("estimator1 estimate = {}", estimator1.estimate());

    let mut estimator2: HyperLogLog = HyperLogLog::new(0.03)?;
    for i in 10..15 {
        estimator2.insert(&i);
    }
    println!("estimator2 estimate = {}", estimator2.estimate());

    let merged = estimator1.merge(&[&estimator2])?;
    println!("merged estimate = {}", merged.estimate());

    let bytes = merged.to_bytes();
    let restored: HyperLogLog = HyperLogLog::from_bytes(&bytes)?;
    println!(
        "restored estimate = {} ({} bytes serialized)",
        restored.estimate(),
        bytes.len()
    );

    Ok(())
}
