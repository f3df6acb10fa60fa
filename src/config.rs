use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::decimal::Rate;
use crate::errors::{EngineError, Result};
use crate::types::PaymentFrequency;

/// engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct EngineConfig {
    #[serde(default)]
    pub schedule: ScheduleConfig,
    #[serde(default)]
    pub collections: CollectionsConfig,
    #[serde(default)]
    pub analytics: AnalyticsConfig,
}

/// schedule generation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// frequency for loans that do not carry their own
    pub default_frequency: PaymentFrequency,
    /// every due date is moved to this day of the month
    pub due_day_of_month: u32,
}

/// overdue, late fee and validation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionsConfig {
    /// late fee accrues at this rate per 30 days overdue
    pub late_fee_monthly_rate: Rate,
    pub allow_partial_payments: bool,
    /// largest accepted payment as a percentage of the amount owed
    pub overpayment_ceiling_percentage: Decimal,
    /// days before a due date on which reminders are prepared
    pub reminder_lead_days: Vec<u32>,
}

/// portfolio analytics settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    /// a loan with an installment overdue beyond this is non-performing
    pub npa_threshold_days: u32,
    pub unassigned_label: String,
    pub risk_split: RiskSplit,
}

/// fixed share of the portfolio reported per risk bucket, in percent
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskSplit {
    pub low: Decimal,
    pub medium: Decimal,
    pub high: Decimal,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            default_frequency: PaymentFrequency::Monthly,
            due_day_of_month: 1,
        }
    }
}

impl Default for CollectionsConfig {
    fn default() -> Self {
        Self {
            late_fee_monthly_rate: Rate::from_percentage(dec!(2)),
            allow_partial_payments: false,
            overpayment_ceiling_percentage: dec!(110),
            reminder_lead_days: vec![7, 3, 1],
        }
    }
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            npa_threshold_days: 90,
            unassigned_label: "unassigned".to_string(),
            risk_split: RiskSplit::default(),
        }
    }
}

impl Default for RiskSplit {
    fn default() -> Self {
        Self {
            low: dec!(60),
            medium: dec!(30),
            high: dec!(10),
        }
    }
}

impl EngineConfig {
    /// monthly schedules due on the 1st, no partial payments
    pub fn standard() -> Self {
        Self::default()
    }

    /// quarterly schedules due on the 15th
    pub fn quarterly() -> Self {
        Self {
            schedule: ScheduleConfig {
                default_frequency: PaymentFrequency::Quarterly,
                due_day_of_month: 15,
            },
            ..Self::default()
        }
    }

    /// accepts partial payments and reminds a fortnight ahead
    pub fn lenient() -> Self {
        Self {
            collections: CollectionsConfig {
                allow_partial_payments: true,
                reminder_lead_days: vec![14, 7, 3, 1],
                ..CollectionsConfig::default()
            },
            ..Self::default()
        }
    }

    /// parse and validate a json configuration
    pub fn from_json(json: &str) -> Result<Self> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        let day = self.schedule.due_day_of_month;
        if !(1..=28).contains(&day) {
            return Err(EngineError::InvalidConfiguration {
                message: format!("due day of month must be within 1..=28, got {}", day),
            });
        }

        if self.collections.late_fee_monthly_rate.is_negative() {
            return Err(EngineError::InvalidConfiguration {
                message: format!(
                    "late fee rate cannot be negative: {}",
                    self.collections.late_fee_monthly_rate
                ),
            });
        }

        if self.collections.overpayment_ceiling_percentage < dec!(100) {
            return Err(EngineError::InvalidConfiguration {
                message: format!(
                    "overpayment ceiling must be at least 100%, got {}%",
                    self.collections.overpayment_ceiling_percentage
                ),
            });
        }

        let split = self.analytics.risk_split;
        if split.low + split.medium + split.high != dec!(100) {
            return Err(EngineError::InvalidConfiguration {
                message: "risk split must add up to 100%".to_string(),
            });
        }

        Ok(())
    }
}
