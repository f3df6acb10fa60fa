use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::collections::breakdown::{is_effectively_overdue, PaymentBreakdown};
use crate::collections::late_fee::LateFeeCalculator;
use crate::collections::reconciliation::{next_due_installment, on_time_rate};
use crate::decimal::{percent_of_counts, Money};
use crate::types::{Installment, InstallmentStatus, Loan, LoanId, Payment};

/// repayment position of one loan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepaymentSummary {
    pub loan_id: LoanId,
    pub total_installments: usize,
    pub paid_installments: usize,
    pub overdue_installments: usize,
    pub pending_installments: usize,
    /// approved payment amounts
    pub total_paid: Money,
    /// breakdown totals over unpaid installments, late fees included
    pub total_due: Money,
    pub progress_percentage: Decimal,
    pub on_time_rate: Decimal,
    pub next_due_date: Option<DateTime<Utc>>,
    pub is_fully_paid: bool,
}

impl RepaymentSummary {
    /// only installments and payments belonging to `loan` are read
    pub fn build(
        loan: &Loan,
        installments: &[Installment],
        payments: &[Payment],
        now: DateTime<Utc>,
        late_fees: &LateFeeCalculator,
    ) -> Self {
        let installments: Vec<Installment> = installments
            .iter()
            .filter(|i| i.loan_id == loan.id)
            .cloned()
            .collect();
        let payments: Vec<Payment> = payments
            .iter()
            .filter(|p| p.loan_id == loan.id)
            .cloned()
            .collect();

        let mut paid = 0;
        let mut overdue = 0;
        let mut pending = 0;
        let mut total_due = Money::ZERO;

        for installment in &installments {
            if installment.status == InstallmentStatus::Paid {
                paid += 1;
                continue;
            }
            if is_effectively_overdue(installment, now) {
                overdue += 1;
            } else {
                pending += 1;
            }
            total_due += PaymentBreakdown::for_installment(installment, now, late_fees).total_amount;
        }

        let total_paid: Money = payments
            .iter()
            .filter(|p| p.is_approved())
            .map(|p| p.amount)
            .sum();

        Self {
            loan_id: loan.id,
            total_installments: installments.len(),
            paid_installments: paid,
            overdue_installments: overdue,
            pending_installments: pending,
            total_paid,
            total_due,
            progress_percentage: percent_of_counts(paid, installments.len(), Decimal::ZERO),
            on_time_rate: on_time_rate(&installments, &payments),
            next_due_date: next_due_installment(&installments).map(|i| i.due_date),
            is_fully_paid: paid == installments.len(),
        }
    }
}

/// summary at the default late fee rate
pub fn repayment_summary(
    loan: &Loan,
    installments: &[Installment],
    payments: &[Payment],
    now: DateTime<Utc>,
) -> RepaymentSummary {
    RepaymentSummary::build(loan, installments, payments, now, &LateFeeCalculator::default())
}
