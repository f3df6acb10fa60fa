use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::config::CollectionsConfig;
use crate::decimal::{Money, Rate};

/// days in the accrual month the monthly rate is spread over
const ACCRUAL_DAYS: Decimal = dec!(30);

/// late fee accrued linearly on an overdue amount
pub fn late_fee(base_amount: Money, days_overdue: u32, monthly_rate: Rate) -> Money {
    if days_overdue == 0 {
        return Money::ZERO;
    }
    let fee = base_amount.as_decimal() * monthly_rate.as_decimal() * Decimal::from(days_overdue)
        / ACCRUAL_DAYS;
    Money::from_decimal(fee).round_cents()
}

/// late fee at the default 2% monthly rate
pub fn default_late_fee(base_amount: Money, days_overdue: u32) -> Money {
    late_fee(base_amount, days_overdue, Rate::from_percentage(dec!(2)))
}

/// late fee calculation result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LateFeeCalculation {
    pub fee: Money,
    pub monthly_rate: Rate,
    pub days_charged: u32,
    pub overdue_base: Money,
}

/// late fee calculator bound to a configured monthly rate
#[derive(Debug, Clone)]
pub struct LateFeeCalculator {
    monthly_rate: Rate,
}

impl LateFeeCalculator {
    pub fn new(monthly_rate: Rate) -> Self {
        Self { monthly_rate }
    }

    pub fn from_config(config: &CollectionsConfig) -> Self {
        Self::new(config.late_fee_monthly_rate)
    }

    pub fn monthly_rate(&self) -> Rate {
        self.monthly_rate
    }

    pub fn calculate(&self, overdue_amount: Money, days_overdue: u32) -> LateFeeCalculation {
        LateFeeCalculation {
            fee: late_fee(overdue_amount, days_overdue, self.monthly_rate),
            monthly_rate: self.monthly_rate,
            days_charged: days_overdue,
            overdue_base: overdue_amount,
        }
    }
}

impl Default for LateFeeCalculator {
    fn default() -> Self {
        Self::from_config(&CollectionsConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_fee_when_not_overdue() {
        assert_eq!(default_late_fee(Money::from_major(5_000), 0), Money::ZERO);
    }

    #[test]
    fn test_thirty_days_is_one_monthly_rate() {
        let fee = default_late_fee(Money::from_major(1_000), 30);
        assert_eq!(fee, Money::from_major(20));
    }

    #[test]
    fn test_linear_accrual() {
        let base = Money::from_major(1_000);
        assert_eq!(default_late_fee(base, 15), Money::from_major(10));
        assert_eq!(default_late_fee(base, 60), Money::from_major(40));
        // 1000 * 0.02 * 7 / 30 = 4.6666..
        assert_eq!(default_late_fee(base, 7), Money::from_str_exact("4.67").unwrap());
    }

    #[test]
    fn test_calculator_uses_configured_rate() {
        let calculator = LateFeeCalculator::new(Rate::from_percentage(dec!(5)));
        let result = calculator.calculate(Money::from_major(200), 30);

        assert_eq!(result.fee, Money::from_major(10));
        assert_eq!(result.days_charged, 30);
        assert_eq!(result.overdue_base, Money::from_major(200));
        assert_eq!(LateFeeCalculator::default().monthly_rate().as_percentage(), dec!(2));
    }
}
