use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::calendar;
use crate::collections::late_fee::LateFeeCalculator;
use crate::decimal::Money;
use crate::types::{Installment, InstallmentStatus};

/// what is owed on an installment at a point in time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentBreakdown {
    pub principal: Money,
    pub interest: Money,
    pub late_fee: Money,
    pub total_amount: Money,
    pub days_overdue: u32,
    pub is_overdue: bool,
}

impl PaymentBreakdown {
    /// breakdown with late fees from the given calculator
    pub fn for_installment(
        installment: &Installment,
        now: DateTime<Utc>,
        late_fees: &LateFeeCalculator,
    ) -> Self {
        let is_overdue = is_effectively_overdue(installment, now);
        let days_overdue = if is_overdue {
            calendar::days_overdue(installment.due_date, now)
        } else {
            0
        };

        let scheduled = installment.amount_due();
        let late_fee = late_fees.calculate(scheduled, days_overdue).fee;

        Self {
            principal: installment.principal,
            interest: installment.interest,
            late_fee,
            total_amount: scheduled + late_fee,
            days_overdue,
            is_overdue,
        }
    }

    /// split a received amount: late fee first, then interest, then principal
    pub fn allocate(&self, amount: Money) -> PaymentAllocation {
        let mut remaining = amount.max(Money::ZERO);

        let to_late_fee = remaining.min(self.late_fee);
        remaining -= to_late_fee;

        let to_interest = remaining.min(self.interest);
        remaining -= to_interest;

        let to_principal = remaining.min(self.principal);
        remaining -= to_principal;

        PaymentAllocation {
            to_late_fee,
            to_interest,
            to_principal,
            excess: remaining,
        }
    }
}

/// how a received amount was split across the breakdown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct PaymentAllocation {
    pub to_late_fee: Money,
    pub to_interest: Money,
    pub to_principal: Money,
    pub excess: Money,
}

impl PaymentAllocation {
    pub fn total_applied(&self) -> Money {
        self.to_late_fee + self.to_interest + self.to_principal
    }
}

/// overdue by status, or still pending past its due date
pub fn is_effectively_overdue(installment: &Installment, now: DateTime<Utc>) -> bool {
    match installment.status {
        InstallmentStatus::Overdue => true,
        InstallmentStatus::Pending => calendar::is_overdue(installment.due_date, now),
        InstallmentStatus::Paid => false,
    }
}

/// breakdown at the default 2% monthly late fee rate
pub fn payment_breakdown(installment: &Installment, now: DateTime<Utc>) -> PaymentBreakdown {
    PaymentBreakdown::for_installment(installment, now, &LateFeeCalculator::default())
}
