use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::collections::breakdown::PaymentBreakdown;
use crate::collections::late_fee::LateFeeCalculator;
use crate::config::CollectionsConfig;
use crate::decimal::Money;
use crate::types::Installment;

/// why a payment amount was not accepted
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ValidationFailure {
    #[error("payment amount must be greater than zero")]
    InvalidAmount,

    #[error("payment of {provided} is less than the {required} due")]
    IncompleteAmount {
        required: Money,
        provided: Money,
    },

    #[error("payment of {provided} exceeds the accepted maximum of {maximum}")]
    ExcessiveOverpayment {
        maximum: Money,
        provided: Money,
    },
}

/// outcome of an advisory amount check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentValidation {
    pub valid: bool,
    pub reason: Option<ValidationFailure>,
    pub breakdown: PaymentBreakdown,
}

impl PaymentValidation {
    fn accepted(breakdown: PaymentBreakdown) -> Self {
        Self {
            valid: true,
            reason: None,
            breakdown,
        }
    }

    fn rejected(reason: ValidationFailure, breakdown: PaymentBreakdown) -> Self {
        Self {
            valid: false,
            reason: Some(reason),
            breakdown,
        }
    }

    /// message for the caller to show
    pub fn message(&self) -> Option<String> {
        self.reason.as_ref().map(ToString::to_string)
    }
}

/// checks a proposed payment against what an installment currently owes
#[derive(Debug, Clone)]
pub struct PaymentValidator {
    pub allow_partial: bool,
    pub overpayment_ceiling_percentage: Decimal,
    late_fees: LateFeeCalculator,
}

impl PaymentValidator {
    pub fn new(allow_partial: bool) -> Self {
        Self {
            allow_partial,
            overpayment_ceiling_percentage: dec!(110),
            late_fees: LateFeeCalculator::default(),
        }
    }

    pub fn from_config(config: &CollectionsConfig) -> Self {
        Self {
            allow_partial: config.allow_partial_payments,
            overpayment_ceiling_percentage: config.overpayment_ceiling_percentage,
            late_fees: LateFeeCalculator::from_config(config),
        }
    }

    pub fn validate(
        &self,
        amount: Money,
        installment: &Installment,
        now: DateTime<Utc>,
    ) -> PaymentValidation {
        let breakdown = PaymentBreakdown::for_installment(installment, now, &self.late_fees);

        if !amount.is_positive() {
            return PaymentValidation::rejected(ValidationFailure::InvalidAmount, breakdown);
        }

        if !self.allow_partial && amount < breakdown.total_amount {
            let required = breakdown.total_amount;
            return PaymentValidation::rejected(
                ValidationFailure::IncompleteAmount {
                    required,
                    provided: amount,
                },
                breakdown,
            );
        }

        let maximum = breakdown
            .total_amount
            .percentage(self.overpayment_ceiling_percentage);
        if amount > maximum {
            return PaymentValidation::rejected(
                ValidationFailure::ExcessiveOverpayment {
                    maximum,
                    provided: amount,
                },
                breakdown,
            );
        }

        PaymentValidation::accepted(breakdown)
    }
}

/// validate with the default 110% ceiling and 2% late fee rate
pub fn validate_payment_amount(
    amount: Money,
    installment: &Installment,
    allow_partial: bool,
    now: DateTime<Utc>,
) -> PaymentValidation {
    PaymentValidator::new(allow_partial).validate(amount, installment, now)
}
