use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::decimal::{Money, Rate};

pub type LoanId = Uuid;
pub type InstallmentId = Uuid;
pub type PaymentId = Uuid;

/// loan lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LoanStatus {
    /// application submitted, awaiting review
    Pending,
    /// approved but not yet disbursed
    Approved,
    /// disbursed and repaying
    Active,
    /// fully repaid
    Completed,
    Rejected,
    Defaulted,
}

impl LoanStatus {
    /// whether the lending workflow may move a loan from `self` to `next`
    pub fn can_transition_to(&self, next: LoanStatus) -> bool {
        use LoanStatus::*;
        matches!(
            (self, next),
            (Pending, Approved)
                | (Pending, Rejected)
                | (Approved, Active)
                | (Approved, Rejected)
                | (Active, Completed)
                | (Active, Defaulted)
        )
    }

    /// loans that carry a live repayment schedule
    pub fn is_performing(&self) -> bool {
        matches!(self, LoanStatus::Active)
    }

    pub fn is_closed(&self) -> bool {
        matches!(
            self,
            LoanStatus::Completed | LoanStatus::Rejected | LoanStatus::Defaulted
        )
    }
}

/// installment status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InstallmentStatus {
    Pending,
    Paid,
    Overdue,
}

/// payment review status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentStatus {
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentMethod {
    Cash,
    Online,
}

/// repayment frequency, drives due date spacing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PaymentFrequency {
    #[default]
    Monthly,
    Quarterly,
    HalfYearly,
}

impl PaymentFrequency {
    /// calendar months between consecutive due dates
    pub fn months_per_period(&self) -> u32 {
        match self {
            PaymentFrequency::Monthly => 1,
            PaymentFrequency::Quarterly => 3,
            PaymentFrequency::HalfYearly => 6,
        }
    }
}

/// a loan as handed over by the lending workflow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Loan {
    pub id: LoanId,
    pub borrower_id: String,
    /// principal
    pub amount: Money,
    /// annual rate
    pub interest_rate: Rate,
    pub term_months: u32,
    /// repayment frequency; the schedule configuration's default when unset
    #[serde(default)]
    pub frequency: Option<PaymentFrequency>,
    pub status: LoanStatus,
    pub agent_id: Option<String>,
    pub region_id: Option<String>,
    /// base date the schedule is counted from
    pub start_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Loan {
    /// new active loan on the configured default frequency, no agent or region
    pub fn new(
        borrower_id: impl Into<String>,
        amount: Money,
        interest_rate: Rate,
        term_months: u32,
        start_date: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            borrower_id: borrower_id.into(),
            amount,
            interest_rate,
            term_months,
            frequency: None,
            status: LoanStatus::Active,
            agent_id: None,
            region_id: None,
            start_date,
            created_at: start_date,
        }
    }

    pub fn with_frequency(mut self, frequency: PaymentFrequency) -> Self {
        self.frequency = Some(frequency);
        self
    }

    pub fn with_agent(mut self, agent_id: impl Into<String>) -> Self {
        self.agent_id = Some(agent_id.into());
        self
    }

    pub fn with_region(mut self, region_id: impl Into<String>) -> Self {
        self.region_id = Some(region_id.into());
        self
    }

    pub fn with_status(mut self, status: LoanStatus) -> Self {
        self.status = status;
        self
    }
}

/// one scheduled repayment period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Installment {
    pub id: InstallmentId,
    pub loan_id: LoanId,
    pub installment_number: u32,
    pub due_date: DateTime<Utc>,
    pub principal: Money,
    pub interest: Money,
    pub remaining_balance: Money,
    pub status: InstallmentStatus,
    pub payment_id: Option<PaymentId>,
}

impl Installment {
    /// scheduled amount before any late fee
    pub fn amount_due(&self) -> Money {
        self.principal + self.interest
    }

    /// still awaiting payment
    pub fn is_open(&self) -> bool {
        matches!(
            self.status,
            InstallmentStatus::Pending | InstallmentStatus::Overdue
        )
    }
}

/// a borrower-submitted or agent-recorded payment against one installment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: PaymentId,
    pub loan_id: LoanId,
    pub installment_id: InstallmentId,
    pub amount: Money,
    pub principal: Money,
    pub interest: Money,
    pub late_fee: Money,
    pub due_date: DateTime<Utc>,
    pub paid_date: Option<DateTime<Utc>>,
    pub status: PaymentStatus,
    pub method: PaymentMethod,
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Payment {
    /// pending payment covering an installment's scheduled amount
    pub fn for_installment(
        installment: &Installment,
        amount: Money,
        method: PaymentMethod,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            loan_id: installment.loan_id,
            installment_id: installment.id,
            amount,
            principal: installment.principal,
            interest: installment.interest,
            late_fee: Money::ZERO,
            due_date: installment.due_date,
            paid_date: None,
            status: PaymentStatus::Pending,
            method,
            rejection_reason: None,
            created_at,
            updated_at: created_at,
        }
    }

    /// paid date when present, submission date otherwise
    pub fn activity_date(&self) -> DateTime<Utc> {
        self.paid_date.unwrap_or(self.created_at)
    }

    pub fn approve(mut self, paid_date: DateTime<Utc>, reviewed_at: DateTime<Utc>) -> Self {
        self.status = PaymentStatus::Approved;
        self.paid_date = Some(paid_date);
        self.updated_at = reviewed_at;
        self
    }

    pub fn reject(mut self, reason: impl Into<String>, reviewed_at: DateTime<Utc>) -> Self {
        self.status = PaymentStatus::Rejected;
        self.rejection_reason = Some(reason.into());
        self.updated_at = reviewed_at;
        self
    }

    pub fn is_approved(&self) -> bool {
        self.status == PaymentStatus::Approved
    }
}
