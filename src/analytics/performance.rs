use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::collections::{is_effectively_overdue, on_time_rate, LateFeeCalculator, PaymentBreakdown};
use crate::config::EngineConfig;
use crate::decimal::{percent_of_counts, Money};
use crate::types::{Installment, Loan, LoanId, Payment, PaymentStatus};

/// dimension loans are grouped by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GroupBy {
    Region,
    Agent,
}

impl GroupBy {
    fn key<'a>(&self, loan: &'a Loan) -> Option<&'a str> {
        match self {
            GroupBy::Region => loan.region_id.as_deref(),
            GroupBy::Agent => loan.agent_id.as_deref(),
        }
    }
}

/// collections performance of one region or agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupPerformance {
    pub group: String,
    pub loan_count: usize,
    pub total_disbursed: Money,
    pub total_collected: Money,
    pub approved_payments: usize,
    pub still_due_payments: usize,
    /// approved / (approved + still due)
    pub collection_rate: Decimal,
    pub on_time_rate: Decimal,
    pub average_loan_size: Money,
    pub overdue_installments: usize,
    pub overdue_amount: Money,
}

#[derive(Default)]
struct GroupMembers<'a> {
    loans: Vec<&'a Loan>,
    installments: Vec<Installment>,
    payments: Vec<Payment>,
}

/// per-group performance, sorted by group key; loans without a key fall
/// into the configured unassigned group
pub fn group_performance(
    loans: &[Loan],
    payments: &[Payment],
    installments: &[Installment],
    group_by: GroupBy,
    now: DateTime<Utc>,
    config: &EngineConfig,
) -> Vec<GroupPerformance> {
    let unassigned = config.analytics.unassigned_label.as_str();
    let late_fees = LateFeeCalculator::from_config(&config.collections);

    let mut groups: BTreeMap<String, GroupMembers> = BTreeMap::new();
    let mut loan_groups: HashMap<LoanId, String> = HashMap::with_capacity(loans.len());

    for loan in loans {
        let key = group_by.key(loan).unwrap_or(unassigned).to_string();
        loan_groups.insert(loan.id, key.clone());
        groups.entry(key).or_default().loans.push(loan);
    }

    let mut orphans = 0usize;
    for installment in installments {
        match loan_groups.get(&installment.loan_id) {
            Some(key) => groups.entry(key.clone()).or_default().installments.push(installment.clone()),
            None => orphans += 1,
        }
    }
    for payment in payments {
        match loan_groups.get(&payment.loan_id) {
            Some(key) => groups.entry(key.clone()).or_default().payments.push(payment.clone()),
            None => orphans += 1,
        }
    }
    if orphans > 0 {
        debug!(orphans, ?group_by, "records without a known loan left out of grouping");
    }

    groups
        .into_iter()
        .map(|(group, members)| summarize_group(group, &members, now, &late_fees))
        .collect()
}

fn summarize_group(
    group: String,
    members: &GroupMembers,
    now: DateTime<Utc>,
    late_fees: &LateFeeCalculator,
) -> GroupPerformance {
    let total_disbursed: Money = members.loans.iter().map(|l| l.amount).sum();

    let approved: Vec<&Payment> = members.payments.iter().filter(|p| p.is_approved()).collect();
    let still_due = members
        .payments
        .iter()
        .filter(|p| p.status == PaymentStatus::Pending)
        .count();

    let overdue: Vec<&Installment> = members
        .installments
        .iter()
        .filter(|i| is_effectively_overdue(i, now))
        .collect();
    let overdue_amount: Money = overdue
        .iter()
        .map(|i| PaymentBreakdown::for_installment(i, now, late_fees).total_amount)
        .sum();

    GroupPerformance {
        group,
        loan_count: members.loans.len(),
        total_disbursed,
        total_collected: approved.iter().map(|p| p.amount).sum(),
        approved_payments: approved.len(),
        still_due_payments: still_due,
        collection_rate: percent_of_counts(approved.len(), approved.len() + still_due, dec!(100)),
        on_time_rate: on_time_rate(&members.installments, &members.payments),
        average_loan_size: Money::average(total_disbursed, members.loans.len()),
        overdue_installments: overdue.len(),
        overdue_amount,
    }
}

pub fn regional_performance(
    loans: &[Loan],
    payments: &[Payment],
    installments: &[Installment],
    now: DateTime<Utc>,
    config: &EngineConfig,
) -> Vec<GroupPerformance> {
    group_performance(loans, payments, installments, GroupBy::Region, now, config)
}

pub fn agent_performance(
    loans: &[Loan],
    payments: &[Payment],
    installments: &[Installment],
    now: DateTime<Utc>,
    config: &EngineConfig,
) -> Vec<GroupPerformance> {
    group_performance(loans, payments, installments, GroupBy::Agent, now, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collections::reconcile_payments;
    use crate::decimal::Rate;
    use crate::schedule::generate_schedule;
    use crate::types::PaymentMethod;
    use chrono::TimeZone;

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    fn loan(amount: i64, region: Option<&str>, agent: &str) -> Loan {
        let loan = Loan::new("b", Money::from_major(amount), Rate::from_percentage(dec!(0)), 2, start())
            .with_agent(agent);
        match region {
            Some(region) => loan.with_region(region),
            None => loan,
        }
    }

    #[test]
    fn test_regions_with_unassigned_bucket() {
        let config = EngineConfig::default();
        let north = loan(1_000, Some("north"), "a1");
        let north_b = loan(3_000, Some("north"), "a2");
        let floating = loan(500, None, "a1");

        let groups = regional_performance(&[north, north_b, floating], &[], &[], start(), &config);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].group, "north");
        assert_eq!(groups[0].loan_count, 2);
        assert_eq!(groups[0].average_loan_size, Money::from_major(2_000));
        assert_eq!(groups[1].group, "unassigned");
        // no due payments at all
        assert_eq!(groups[1].collection_rate, dec!(100));
        assert_eq!(groups[1].on_time_rate, dec!(100));
    }

    #[test]
    fn test_agent_collection_and_overdue() {
        let config = EngineConfig::default();
        let l = loan(1_000, Some("south"), "agent-7");
        let installments = generate_schedule(&l, &config.schedule).unwrap();
        // due feb 1 and mar 1, each 500
        let now = Utc.with_ymd_and_hms(2024, 3, 31, 0, 0, 0).unwrap();

        let paid = Payment::for_installment(&installments[0], Money::from_major(500), PaymentMethod::Cash, installments[0].due_date)
            .approve(installments[0].due_date, installments[0].due_date);
        let waiting = Payment::for_installment(&installments[1], Money::from_major(500), PaymentMethod::Online, now);
        let payments = vec![paid, waiting];
        let installments = reconcile_payments(&installments, &payments).installments;

        let groups = agent_performance(&[l], &payments, &installments, now, &config);

        assert_eq!(groups.len(), 1);
        let agent = &groups[0];
        assert_eq!(agent.group, "agent-7");
        assert_eq!(agent.approved_payments, 1);
        assert_eq!(agent.still_due_payments, 1);
        assert_eq!(agent.collection_rate, dec!(50));
        assert_eq!(agent.on_time_rate, dec!(100));
        assert_eq!(agent.total_collected, Money::from_major(500));
        assert_eq!(agent.overdue_installments, 1);
        // 30 days late on 500 adds 10
        assert_eq!(agent.overdue_amount, Money::from_major(510));
    }
}
