use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::decimal::{percent_of_counts, round_half_up};
use crate::types::{Payment, PaymentStatus};

const UNSPECIFIED_REASON: &str = "unspecified";

/// submission to review outcome counts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentFunnel {
    pub submitted: usize,
    pub pending: usize,
    pub approved: usize,
    pub rejected: usize,
    pub approval_rate: Decimal,
    /// over reviewed payments only
    pub average_processing_hours: Decimal,
    pub rejection_reasons: Vec<RejectionReasonCount>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RejectionReasonCount {
    pub reason: String,
    pub count: usize,
    /// share of all rejected payments
    pub percentage: Decimal,
}

pub fn payment_flow_funnel(payments: &[Payment]) -> PaymentFunnel {
    let mut pending = 0;
    let mut approved = 0;
    let mut rejected = 0;
    let mut reasons: HashMap<&str, usize> = HashMap::new();

    for payment in payments {
        match payment.status {
            PaymentStatus::Pending => pending += 1,
            PaymentStatus::Approved => approved += 1,
            PaymentStatus::Rejected => {
                rejected += 1;
                let reason = payment.rejection_reason.as_deref().unwrap_or(UNSPECIFIED_REASON);
                *reasons.entry(reason).or_insert(0) += 1;
            }
        }
    }

    let mut rejection_reasons: Vec<RejectionReasonCount> = reasons
        .into_iter()
        .map(|(reason, count)| RejectionReasonCount {
            reason: reason.to_string(),
            count,
            percentage: percent_of_counts(count, rejected, Decimal::ZERO),
        })
        .collect();
    rejection_reasons.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.reason.cmp(&b.reason)));

    PaymentFunnel {
        submitted: payments.len(),
        pending,
        approved,
        rejected,
        approval_rate: percent_of_counts(approved, payments.len(), Decimal::ZERO),
        average_processing_hours: average_processing_hours(payments),
        rejection_reasons,
    }
}

fn average_processing_hours(payments: &[Payment]) -> Decimal {
    let reviewed: Vec<i64> = payments
        .iter()
        .filter(|p| p.updated_at != p.created_at)
        .map(|p| (p.updated_at - p.created_at).num_seconds())
        .collect();

    if reviewed.is_empty() {
        return Decimal::ZERO;
    }

    let total_seconds: i64 = reviewed.iter().sum();
    let hours = Decimal::from(total_seconds) / Decimal::from(3600) / Decimal::from(reviewed.len() as u64);
    round_half_up(hours, 2)
}
