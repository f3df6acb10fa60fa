use std::sync::Arc;

use chrono::{DateTime, Utc};
use hourglass_rs::{SafeTimeProvider, TimeSource};
use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::analytics::{AnalyticsReport, TrendPeriod};
use crate::collections::{
    mark_overdue, next_due_installment, on_time_rate, reconcile_payments, LateFeeCalculator,
    PaymentBreakdown, PaymentValidation, PaymentValidator, Reconciliation, RepaymentSummary,
};
use crate::config::EngineConfig;
use crate::decimal::Money;
use crate::errors::Result;
use crate::events::{CollectionEvent, EventStore};
use crate::notifications::{reminders_due, PaymentReminder};
use crate::schedule::InstallmentSchedule;
use crate::types::{Installment, InstallmentId, Loan, Payment};

/// collections engine bound to one configuration and one clock
///
/// every time-dependent operation reads `now` from the time provider, so a
/// test clock drives overdue status, late fees and reminders together
pub struct CollectionsEngine {
    config: EngineConfig,
    time: Arc<SafeTimeProvider>,
    late_fees: LateFeeCalculator,
    validator: PaymentValidator,
    events: EventStore,
}

impl CollectionsEngine {
    pub fn new(config: EngineConfig, time: Arc<SafeTimeProvider>) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            late_fees: LateFeeCalculator::from_config(&config.collections),
            validator: PaymentValidator::from_config(&config.collections),
            config,
            time,
            events: EventStore::new(),
        })
    }

    /// engine reading the wall clock
    pub fn with_system_time(config: EngineConfig) -> Result<Self> {
        Self::new(config, Arc::new(SafeTimeProvider::new(TimeSource::System)))
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn time(&self) -> &SafeTimeProvider {
        &self.time
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.time.now()
    }

    /// generate the installment schedule for a loan
    pub fn generate_schedule(&mut self, loan: &Loan) -> Result<InstallmentSchedule> {
        let schedule = InstallmentSchedule::generate(loan, &self.config.schedule)?;

        info!(
            loan_id = %loan.id,
            installments = schedule.installments.len(),
            total_interest = %schedule.total_interest.as_decimal(),
            "schedule generated"
        );

        self.events.emit(CollectionEvent::ScheduleGenerated {
            loan_id: loan.id,
            installments: schedule.installments.len() as u32,
            emi: schedule.emi,
            timestamp: self.now(),
        });

        Ok(schedule)
    }

    /// move elapsed pending installments to overdue in place
    pub fn advance_overdue(&mut self, installments: &mut [Installment]) -> Vec<InstallmentId> {
        let now = self.now();
        let moved = mark_overdue(installments, now);

        for installment_id in &moved {
            self.events.emit(CollectionEvent::InstallmentOverdue {
                installment_id: *installment_id,
                timestamp: now,
            });
        }

        moved
    }

    pub fn breakdown(&self, installment: &Installment) -> PaymentBreakdown {
        PaymentBreakdown::for_installment(installment, self.now(), &self.late_fees)
    }

    pub fn validate_payment(
        &self,
        amount: Money,
        installment: &Installment,
    ) -> PaymentValidation {
        let validation = self.validator.validate(amount, installment, self.now());
        if let Some(reason) = validation.message() {
            debug!(installment_id = %installment.id, %reason, "payment amount rejected");
        }
        validation
    }

    /// apply approved payments, recording what was settled and what was not
    pub fn reconcile(&mut self, installments: &[Installment], payments: &[Payment]) -> Reconciliation {
        let now = self.now();
        let reconciliation = reconcile_payments(installments, payments);

        for pair in &reconciliation.report.matched {
            self.events.emit(CollectionEvent::InstallmentPaid {
                installment_id: pair.installment_id,
                payment_id: pair.payment_id,
                timestamp: now,
            });
        }
        for unreconciled in &reconciliation.report.unreconciled {
            self.events.emit(CollectionEvent::PaymentUnreconciled {
                payment_id: unreconciled.payment_id,
                error: unreconciled.error.clone(),
                timestamp: now,
            });
        }

        reconciliation
    }

    pub fn on_time_rate(&self, installments: &[Installment], payments: &[Payment]) -> Decimal {
        on_time_rate(installments, payments)
    }

    pub fn next_due<'a>(&self, installments: &'a [Installment]) -> Option<&'a Installment> {
        next_due_installment(installments)
    }

    pub fn repayment_summary(
        &self,
        loan: &Loan,
        installments: &[Installment],
        payments: &[Payment],
    ) -> RepaymentSummary {
        RepaymentSummary::build(loan, installments, payments, self.now(), &self.late_fees)
    }

    /// reminders for the configured lead days, overdue and due-today entries
    pub fn reminders(&mut self, installments: &[Installment]) -> Vec<PaymentReminder> {
        let now = self.now();
        let reminders = reminders_due(installments, now, &self.config.collections);

        for reminder in &reminders {
            self.events.emit(CollectionEvent::ReminderPrepared {
                installment_id: reminder.installment_id,
                days_until_due: reminder.days_until_due,
                amount_due: reminder.amount_due,
                timestamp: now,
            });
        }

        reminders
    }

    pub fn analytics_report(
        &self,
        loans: &[Loan],
        payments: &[Payment],
        installments: &[Installment],
        trend_period: TrendPeriod,
    ) -> AnalyticsReport {
        AnalyticsReport::build(loans, payments, installments, trend_period, self.now(), &self.config)
    }

    pub fn events(&self) -> &[CollectionEvent] {
        self.events.events()
    }

    pub fn take_events(&mut self) -> Vec<CollectionEvent> {
        self.events.take_events()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collections::ValidationFailure;
    use crate::decimal::Rate;
    use crate::errors::EngineError;
    use crate::types::{InstallmentStatus, PaymentMethod};
    use chrono::{Duration, TimeZone};
    use rust_decimal_macros::dec;

    fn setup() -> (CollectionsEngine, Arc<SafeTimeProvider>, Loan) {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let time = Arc::new(SafeTimeProvider::new(TimeSource::Test(start)));
        let engine = CollectionsEngine::new(EngineConfig::standard(), time.clone()).unwrap();
        let loan = Loan::new("borrower-1", Money::from_major(1_200), Rate::from_percentage(dec!(0)), 12, start)
            .with_region("north")
            .with_agent("agent-7");
        (engine, time, loan)
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = EngineConfig::standard();
        config.schedule.due_day_of_month = 31;

        let result = CollectionsEngine::with_system_time(config);
        assert!(matches!(result, Err(EngineError::InvalidConfiguration { .. })));
    }

    #[test]
    fn test_schedule_event() {
        let (mut engine, _, loan) = setup();
        let schedule = engine.generate_schedule(&loan).unwrap();

        assert_eq!(schedule.installments.len(), 12);
        let events = engine.take_events();
        assert_eq!(events.len(), 1);
        assert!(matches!(
            events[0],
            CollectionEvent::ScheduleGenerated { installments: 12, .. }
        ));
        assert!(engine.events().is_empty());
    }

    #[test]
    fn test_quarterly_preset_spaces_schedule() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let time = Arc::new(SafeTimeProvider::new(TimeSource::Test(start)));
        let mut engine = CollectionsEngine::new(EngineConfig::quarterly(), time).unwrap();
        let loan = Loan::new("borrower-2", Money::from_major(4_000), Rate::from_percentage(dec!(6)), 4, start);

        let schedule = engine.generate_schedule(&loan).unwrap();
        let due: Vec<String> = schedule
            .installments
            .iter()
            .map(|i| i.due_date.format("%Y-%m-%d").to_string())
            .collect();

        assert_eq!(due, vec!["2024-04-15", "2024-07-15", "2024-10-15", "2025-01-15"]);
    }

    #[test]
    fn test_clock_drives_collections() {
        let (mut engine, time, loan) = setup();
        let mut installments = engine.generate_schedule(&loan).unwrap().into_installments();
        engine.take_events();

        // nothing due yet
        assert!(engine.advance_overdue(&mut installments).is_empty());
        assert!(!engine.breakdown(&installments[0]).is_overdue);

        // march 10th: feb 1 and mar 1 have elapsed
        time.test_control().unwrap().advance(Duration::days(69));
        let moved = engine.advance_overdue(&mut installments);
        assert_eq!(moved, vec![installments[0].id, installments[1].id]);
        assert_eq!(installments[1].status, InstallmentStatus::Overdue);

        // 38 days late: 100 * 2% * 38 / 30 = 2.53
        let breakdown = engine.breakdown(&installments[0]);
        assert_eq!(breakdown.days_overdue, 38);
        assert_eq!(breakdown.late_fee, Money::from_str_exact("2.53").unwrap());
        assert_eq!(breakdown.total_amount, Money::from_str_exact("102.53").unwrap());

        let short = engine.validate_payment(Money::from_major(100), &installments[0]);
        assert!(!short.valid);
        assert!(matches!(short.reason, Some(ValidationFailure::IncompleteAmount { .. })));
        assert!(engine.validate_payment(breakdown.total_amount, &installments[0]).valid);

        let payment = Payment::for_installment(&installments[0], breakdown.total_amount, PaymentMethod::Online, engine.now())
            .approve(engine.now(), engine.now());
        let reconciled = engine.reconcile(&installments, &[payment.clone()]);
        assert!(reconciled.report.is_clean());
        let installments = reconciled.installments;
        assert_eq!(installments[0].status, InstallmentStatus::Paid);
        assert_eq!(engine.on_time_rate(&installments, &[payment.clone()]), dec!(0));
        assert_eq!(engine.next_due(&installments).map(|i| i.installment_number), Some(2));

        let reminders = engine.reminders(&installments);
        assert_eq!(reminders.len(), 1);
        assert_eq!(reminders[0].installment_number, 2);

        let summary = engine.repayment_summary(&loan, &installments, &[payment.clone()]);
        assert_eq!(summary.paid_installments, 1);
        assert_eq!(summary.overdue_installments, 1);
        assert_eq!(summary.pending_installments, 10);

        let events = engine.take_events();
        assert_eq!(
            events.iter().filter(|e| matches!(e, CollectionEvent::InstallmentOverdue { .. })).count(),
            2
        );
        assert!(events.iter().any(|e| matches!(e, CollectionEvent::InstallmentPaid { .. })));
        assert!(events.iter().any(|e| matches!(e, CollectionEvent::ReminderPrepared { days_until_due: -9, .. })));

        let report = engine.analytics_report(&[loan], &[payment], &installments, TrendPeriod::Month);
        assert_eq!(report.generated_at, engine.now());
        assert_eq!(report.kpis.total_loans, 1);
        assert_eq!(report.regional[0].group, "north");
    }
}
