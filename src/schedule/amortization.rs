use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::calendar::due_date_for_period;
use crate::config::ScheduleConfig;
use crate::decimal::{Money, Rate};
use crate::errors::{EngineError, Result};
use crate::types::{Installment, InstallmentStatus, Loan, LoanId, PaymentFrequency};

/// longest schedule generated, one hundred years of monthly installments
pub const MAX_TERM_MONTHS: u32 = 1_200;

/// generated installment schedule with its totals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstallmentSchedule {
    pub loan_id: LoanId,
    pub principal: Money,
    pub interest_rate: Rate,
    pub term_months: u32,
    /// level payment, unrounded
    pub emi: Money,
    pub installments: Vec<Installment>,
    pub total_interest: Money,
    pub total_payable: Money,
}

impl InstallmentSchedule {
    /// generate the schedule for a loan
    pub fn generate(loan: &Loan, config: &ScheduleConfig) -> Result<Self> {
        let generator = ScheduleGenerator::new(config.due_day_of_month);
        let terms = LoanTerms::from_loan(loan, config);
        let installments = generator.generate(&terms)?;

        let total_interest: Money = installments.iter().map(|i| i.interest).sum();
        let total_principal: Money = installments.iter().map(|i| i.principal).sum();

        Ok(Self {
            loan_id: loan.id,
            principal: loan.amount,
            interest_rate: loan.interest_rate,
            term_months: loan.term_months,
            emi: calculate_emi(loan.amount, loan.interest_rate, loan.term_months)?,
            installments,
            total_interest,
            total_payable: total_principal + total_interest,
        })
    }

    pub fn get_installment(&self, installment_number: u32) -> Option<&Installment> {
        installment_number
            .checked_sub(1)
            .and_then(|index| self.installments.get(index as usize))
    }

    /// balance left once the given installment is paid
    pub fn balance_after(&self, installment_number: u32) -> Money {
        self.get_installment(installment_number)
            .map(|i| i.remaining_balance)
            .unwrap_or(self.principal)
    }

    pub fn into_installments(self) -> Vec<Installment> {
        self.installments
    }
}

/// the loan fields schedule generation reads
#[derive(Debug, Clone, PartialEq)]
pub struct LoanTerms {
    pub loan_id: LoanId,
    pub principal: Money,
    pub annual_rate: Rate,
    pub term_months: u32,
    pub frequency: PaymentFrequency,
    pub start_date: DateTime<Utc>,
}

impl LoanTerms {
    /// loans without their own frequency take the configured default
    pub fn from_loan(loan: &Loan, config: &ScheduleConfig) -> Self {
        Self {
            loan_id: loan.id,
            principal: loan.amount,
            annual_rate: loan.interest_rate,
            term_months: loan.term_months,
            frequency: loan.frequency.unwrap_or(config.default_frequency),
            start_date: loan.start_date,
        }
    }

    fn validate(&self) -> Result<()> {
        if self.principal.is_negative() {
            return Err(EngineError::InvalidLoanTerms {
                message: format!("principal cannot be negative: {}", self.principal),
            });
        }
        if self.annual_rate.is_negative() {
            return Err(EngineError::InvalidLoanTerms {
                message: format!("interest rate cannot be negative: {}", self.annual_rate),
            });
        }
        if self.term_months > MAX_TERM_MONTHS {
            return Err(EngineError::InvalidLoanTerms {
                message: format!(
                    "term of {} months exceeds the {} month limit",
                    self.term_months, MAX_TERM_MONTHS
                ),
            });
        }
        Ok(())
    }
}

/// equal-installment schedule generator
#[derive(Debug, Clone)]
pub struct ScheduleGenerator {
    due_day_of_month: u32,
}

impl ScheduleGenerator {
    pub fn new(due_day_of_month: u32) -> Self {
        Self { due_day_of_month }
    }

    /// one installment per term month, every component rounded to cents
    /// before it feeds the next period
    pub fn generate(&self, terms: &LoanTerms) -> Result<Vec<Installment>> {
        terms.validate()?;

        if terms.term_months == 0 {
            debug!(loan_id = %terms.loan_id, "zero term, empty schedule");
            return Ok(Vec::new());
        }

        let period_rate = terms.annual_rate.monthly_rate().as_decimal();
        let emi = calculate_emi(terms.principal, terms.annual_rate, terms.term_months)?;

        let mut installments = Vec::with_capacity(terms.term_months as usize);
        let mut balance = terms.principal;

        for number in 1..=terms.term_months {
            let interest = Money::from_decimal(balance.as_decimal() * period_rate).round_cents();
            let principal = (emi - interest).round_cents();
            balance = (balance - principal).max(Money::ZERO).round_cents();

            installments.push(Installment {
                id: Uuid::new_v4(),
                loan_id: terms.loan_id,
                installment_number: number,
                due_date: due_date_for_period(
                    terms.start_date,
                    number,
                    terms.frequency,
                    self.due_day_of_month,
                ),
                principal,
                interest,
                remaining_balance: balance,
                status: InstallmentStatus::Pending,
                payment_id: None,
            });
        }

        debug!(
            loan_id = %terms.loan_id,
            installments = installments.len(),
            emi = %emi,
            residual = %balance,
            "schedule generated"
        );

        Ok(installments)
    }
}

/// generate a loan's installments with the given schedule settings
pub fn generate_schedule(loan: &Loan, config: &ScheduleConfig) -> Result<Vec<Installment>> {
    ScheduleGenerator::new(config.due_day_of_month).generate(&LoanTerms::from_loan(loan, config))
}

/// level payment for an amortizing loan
///
/// once `(1 + r)^n` outgrows decimal range the discount term is below decimal
/// precision and the payment settles at the interest-only limit `P * r`
pub fn calculate_emi(principal: Money, annual_rate: Rate, periods: u32) -> Result<Money> {
    if periods == 0 {
        return Ok(principal);
    }

    let r = annual_rate.monthly_rate().as_decimal();

    if r.is_zero() {
        return Ok(principal / Decimal::from(periods));
    }

    let periodic_interest = principal
        .as_decimal()
        .checked_mul(r)
        .ok_or_else(|| EngineError::InvalidLoanTerms {
            message: format!("periodic interest on {} at {} overflows", principal, annual_rate),
        })?;

    // EMI = P * r * (1 + r)^n / ((1 + r)^n - 1)
    let mut compound = Some(Decimal::ONE);
    let base = Decimal::ONE + r;
    for _ in 0..periods {
        compound = compound.and_then(|c| c.checked_mul(base));
        if compound.is_none() {
            break;
        }
    }

    let emi = match compound {
        Some(compound) => match periodic_interest.checked_mul(compound) {
            Some(numerator) => numerator / (compound - Decimal::ONE),
            None => periodic_interest / (Decimal::ONE - Decimal::ONE / compound),
        },
        None => {
            debug!(periods, rate = %annual_rate, "compound factor out of range, interest-only payment");
            periodic_interest
        }
    };

    Ok(Money::from_decimal(emi))
}
