use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use loan_collections_rs::{
    AnalyticsReport, CollectionEvent, CollectionsEngine, EngineConfig, Installment,
    InstallmentStatus, Loan, Money, NotificationContentBuilder, Payment, PaymentMethod,
    PlainTextContentBuilder, Rate, ReminderKind, SafeTimeProvider, TimeSource, TrendPeriod,
};
use pretty_assertions::assert_eq;
use rust_decimal_macros::dec;

#[test]
fn test_two_loans_through_a_quarter() {
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let time = Arc::new(SafeTimeProvider::new(TimeSource::Test(start)));
    let mut engine = CollectionsEngine::new(EngineConfig::standard(), time.clone()).unwrap();

    let business = Loan::new("b-100", Money::from_major(120_000), Rate::from_percentage(dec!(12)), 12, start)
        .with_region("west")
        .with_agent("a-1");
    let personal = Loan::new("b-200", Money::from_major(1_200), Rate::from_percentage(dec!(0)), 12, start)
        .with_region("east");

    let business_schedule = engine.generate_schedule(&business).unwrap();
    assert_eq!(business_schedule.installments[0].amount_due(), Money::from_str_exact("10661.85").unwrap());
    assert_eq!(business_schedule.installments[0].interest, Money::from_major(1_200));

    let mut installments: Vec<Installment> = business_schedule.into_installments();
    installments.extend(engine.generate_schedule(&personal).unwrap().into_installments());

    // jan 31st: both first installments are a day out
    time.test_control().unwrap().advance(Duration::days(30));
    let reminders = engine.reminders(&installments);
    assert_eq!(reminders.len(), 2);
    assert!(reminders.iter().all(|r| r.kind == ReminderKind::Upcoming && r.days_until_due == 1));

    let builder = PlainTextContentBuilder::new("$");
    let content = builder.build_reminder(&installments[0], &reminders[0]);
    assert!(content.subject.contains("due in 1 day(s)"));

    let first = &installments[0];
    let validation = engine.validate_payment(first.amount_due(), first);
    assert!(validation.valid);

    let payment = Payment::for_installment(first, first.amount_due(), PaymentMethod::Online, engine.now())
        .approve(engine.now(), engine.now());
    let payments = vec![payment];
    let installments = engine.reconcile(&installments, &payments).installments;
    assert_eq!(installments[0].status, InstallmentStatus::Paid);

    // mar 11th: personal #1 and #2 plus business #2 have elapsed
    time.test_control().unwrap().advance(Duration::days(40));
    let mut installments = installments;
    let moved = engine.advance_overdue(&mut installments);
    assert_eq!(moved.len(), 3);

    let summary = engine.repayment_summary(&business, &installments, &payments);
    assert_eq!(summary.total_installments, 12);
    assert_eq!(summary.paid_installments, 1);
    assert_eq!(summary.overdue_installments, 1);
    assert_eq!(summary.pending_installments, 10);
    assert_eq!(summary.total_paid, Money::from_str_exact("10661.85").unwrap());
    assert_eq!(summary.progress_percentage, dec!(8.33));
    assert_eq!(summary.on_time_rate, dec!(100));
    assert_eq!(summary.next_due_date, Some(installments[1].due_date));
    assert!(!summary.is_fully_paid);

    let report = engine.analytics_report(&[business, personal], &payments, &installments, TrendPeriod::Month);
    assert_eq!(report.kpis.total_loans, 2);
    assert_eq!(report.kpis.total_collected, Money::from_str_exact("10661.85").unwrap());
    assert_eq!(report.funnel.submitted, 1);
    assert_eq!(report.funnel.approval_rate, dec!(100));
    assert_eq!(
        report.regional.iter().map(|g| g.group.as_str()).collect::<Vec<_>>(),
        vec!["east", "west"]
    );
    assert_eq!(report.trends.len(), 1);
    assert_eq!(report.trends[0].period, "2024-01");

    let json = report.to_json_pretty().unwrap();
    let parsed: AnalyticsReport = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, report);

    let events = engine.take_events();
    let scheduled = events
        .iter()
        .filter(|e| matches!(e, CollectionEvent::ScheduleGenerated { .. }))
        .count();
    let overdue = events
        .iter()
        .filter(|e| matches!(e, CollectionEvent::InstallmentOverdue { .. }))
        .count();
    assert_eq!(scheduled, 2);
    assert_eq!(overdue, 3);
}
