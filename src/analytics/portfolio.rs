use std::collections::HashSet;

use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calendar;
use crate::collections::{is_effectively_overdue, LateFeeCalculator, PaymentBreakdown};
use crate::config::{EngineConfig, RiskSplit};
use crate::decimal::{percent_of, percent_of_counts, round_half_up, Money};
use crate::types::{Installment, Loan, LoanId, Payment};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskBucket {
    pub level: RiskLevel,
    pub percentage: Decimal,
    pub value: Money,
    pub count: usize,
}

/// point-in-time health of the whole book
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioHealth {
    pub total_loans: usize,
    pub total_portfolio_value: Money,
    pub total_collected: Money,
    pub total_outstanding: Money,
    /// collected / portfolio value
    pub collection_efficiency: Decimal,
    pub npa_loans: usize,
    pub npa_value: Money,
    pub npa_percentage: Decimal,
    pub risk_distribution: Vec<RiskBucket>,
}

/// loans holding an installment overdue beyond `threshold_days`
pub fn non_performing_loans(
    installments: &[Installment],
    now: DateTime<Utc>,
    threshold_days: u32,
) -> HashSet<LoanId> {
    installments
        .iter()
        .filter(|i| is_effectively_overdue(i, now))
        .filter(|i| calendar::days_overdue(i.due_date, now) > threshold_days)
        .map(|i| i.loan_id)
        .collect()
}

pub fn portfolio_health(
    loans: &[Loan],
    payments: &[Payment],
    installments: &[Installment],
    now: DateTime<Utc>,
    config: &EngineConfig,
) -> PortfolioHealth {
    let late_fees = LateFeeCalculator::from_config(&config.collections);

    let total_portfolio_value: Money = loans.iter().map(|l| l.amount).sum();
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

    let npa_ids = non_performing_loans(installments, now, config.analytics.npa_threshold_days);
    let npa: Vec<&Loan> = loans.iter().filter(|l| npa_ids.contains(&l.id)).collect();

    PortfolioHealth {
        total_loans: loans.len(),
        total_portfolio_value,
        total_collected,
        total_outstanding,
        collection_efficiency: percent_of(
            total_collected.as_decimal(),
            total_portfolio_value.as_decimal(),
            Decimal::ZERO,
        ),
        npa_loans: npa.len(),
        npa_value: npa.iter().map(|l| l.amount).sum(),
        npa_percentage: percent_of_counts(npa.len(), loans.len(), Decimal::ZERO),
        risk_distribution: risk_distribution(total_portfolio_value, loans.len(), config.analytics.risk_split),
    }
}

/// fixed split of value and count, high risk takes both remainders
fn risk_distribution(value: Money, count: usize, split: RiskSplit) -> Vec<RiskBucket> {
    let share_of_count = |percent: Decimal| -> usize {
        round_half_up(Decimal::from(count as u64) * percent / Decimal::from(100), 0)
            .to_usize()
            .unwrap_or(0)
    };

    let low = share_of_count(split.low).min(count);
    let medium = share_of_count(split.medium).min(count - low);
    let high = count - low - medium;

    let low_value = value.percentage(split.low).round_cents();
    let medium_value = value.percentage(split.medium).round_cents();
    let high_value = value.round_cents() - low_value - medium_value;

    vec![
        RiskBucket {
            level: RiskLevel::Low,
            percentage: split.low,
            value: low_value,
            count: low,
        },
        RiskBucket {
            level: RiskLevel::Medium,
            percentage: split.medium,
            value: medium_value,
            count: medium,
        },
        RiskBucket {
            level: RiskLevel::High,
            percentage: split.high,
            value: high_value,
            count: high,
        },
    ]
}
