use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::collections::{is_effectively_overdue, on_time_rate, LateFeeCalculator, PaymentBreakdown};
use crate::config::EngineConfig;
use crate::decimal::{percent_of, percent_of_counts, Money};
use crate::types::{Installment, Loan, Payment};

/// headline numbers for the dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiSet {
    pub total_loans: usize,
    pub active_loans: usize,
    pub total_loan_amount: Money,
    pub total_collected: Money,
    pub total_outstanding: Money,
    /// collected / (collected + outstanding)
    pub collection_rate: Decimal,
    pub on_time_rate: Decimal,
    /// overdue installments / all installments
    pub overdue_rate: Decimal,
    pub average_loan_size: Money,
}

pub fn kpi_set(
    loans: &[Loan],
    payments: &[Payment],
    installments: &[Installment],
    now: DateTime<Utc>,
    config: &EngineConfig,
) -> KpiSet {
    let late_fees = LateFeeCalculator::from_config(&config.collections);

    let total_loan_amount: Money = loans.iter().map(|l| l.amount).sum();
    let total_collected: Money = payments
        .iter()
        .filter(|p| p.is_approved())
        .map(|p| p.amount)
        .sum();
    let total_outstanding: Money = installments
        .iter()
        .filter(|i| i.is_open())
        .map(|i| PaymentBreakdown::for_installment(i, now, &late_fees).total_amount)
        .sum();
    let overdue = installments
        .iter()
        .filter(|i| is_effectively_overdue(i, now))
        .count();

    KpiSet {
        total_loans: loans.len(),
        active_loans: loans.iter().filter(|l| l.status.is_performing()).count(),
        total_loan_amount,
        total_collected,
        total_outstanding,
        collection_rate: percent_of(
            total_collected.as_decimal(),
            (total_collected + total_outstanding).as_decimal(),
            Decimal::ZERO,
        ),
        on_time_rate: on_time_rate(installments, payments),
        overdue_rate: percent_of_counts(overdue, installments.len(), Decimal::ZERO),
        average_loan_size: Money::average(total_loan_amount, loans.len()),
    }
}
