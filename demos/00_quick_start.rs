/// quick start - schedule a loan, collect the first installment, report on the book
use std::sync::Arc;

use loan_collections_rs::chrono::{Duration, TimeZone, Utc};
use loan_collections_rs::{
    CollectionsEngine, EngineConfig, Loan, Money, Payment, PaymentMethod, Rate, SafeTimeProvider,
    TimeSource, TrendPeriod,
};
use rust_decimal_macros::dec;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // pin the clock so the run is repeatable
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let time = Arc::new(SafeTimeProvider::new(TimeSource::Test(start)));
    let mut engine = CollectionsEngine::new(EngineConfig::standard(), time.clone())?;

    // $10,000 over a year at 8%
    let loan = Loan::new("borrower-1", Money::from_major(10_000), Rate::from_percentage(dec!(8)), 12, start)
        .with_region("north");
    let schedule = engine.generate_schedule(&loan)?;
    println!("emi: {}", schedule.emi);
    let installments = schedule.into_installments();

    // pay the first installment on its due date
    if let Some(control) = time.test_control() {
        control.advance(Duration::days(31));
    }
    let first = &installments[0];
    let payment = Payment::for_installment(first, first.amount_due(), PaymentMethod::Online, engine.now())
        .approve(engine.now(), engine.now());
    let payments = vec![payment];
    let installments = engine.reconcile(&installments, &payments).installments;

    let summary = engine.repayment_summary(&loan, &installments, &payments);
    println!("paid {} of {}", summary.paid_installments, summary.total_installments);

    let report = engine.analytics_report(&[loan], &payments, &installments, TrendPeriod::Month);
    println!("{}", report.to_json_pretty()?);

    Ok(())
}
