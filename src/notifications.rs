//! Reminder inputs and message content for installments coming due.
//!
//! Nothing here delivers a message; callers hand the content to whatever
//! email, sms or push channel they run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::calendar::days_until_due;
use crate::collections::{LateFeeCalculator, PaymentBreakdown};
use crate::config::CollectionsConfig;
use crate::decimal::Money;
use crate::types::{Installment, InstallmentId, LoanId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReminderKind {
    Upcoming,
    DueToday,
    Overdue,
}

impl ReminderKind {
    pub fn from_days_until_due(days: i64) -> Self {
        match days {
            d if d > 0 => ReminderKind::Upcoming,
            0 => ReminderKind::DueToday,
            _ => ReminderKind::Overdue,
        }
    }
}

/// an installment that should be brought to the borrower's attention
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentReminder {
    pub installment_id: InstallmentId,
    pub loan_id: LoanId,
    pub installment_number: u32,
    pub due_date: DateTime<Utc>,
    /// negative once past due
    pub days_until_due: i64,
    pub amount_due: Money,
    pub late_fee: Money,
    pub kind: ReminderKind,
}

/// open installments that are overdue, due today, or due in one of the
/// configured lead days
pub fn reminders_due(
    installments: &[Installment],
    now: DateTime<Utc>,
    config: &CollectionsConfig,
) -> Vec<PaymentReminder> {
    let late_fees = LateFeeCalculator::from_config(config);

    let mut reminders: Vec<PaymentReminder> = installments
        .iter()
        .filter(|i| i.is_open())
        .filter_map(|installment| {
            let days = days_until_due(installment.due_date, now);
            let wanted = days <= 0
                || u32::try_from(days)
                    .map(|d| config.reminder_lead_days.contains(&d))
                    .unwrap_or(false);
            if !wanted {
                return None;
            }

            let breakdown = PaymentBreakdown::for_installment(installment, now, &late_fees);
            Some(PaymentReminder {
                installment_id: installment.id,
                loan_id: installment.loan_id,
                installment_number: installment.installment_number,
                due_date: installment.due_date,
                days_until_due: days,
                amount_due: breakdown.total_amount,
                late_fee: breakdown.late_fee,
                kind: ReminderKind::from_days_until_due(days),
            })
        })
        .collect();

    reminders.sort_by_key(|r| (r.days_until_due, r.installment_number));
    reminders
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotificationPriority {
    Normal,
    High,
}

/// message content ready for a delivery channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationContent {
    pub subject: String,
    pub body: String,
    pub priority: NotificationPriority,
}

/// turns an installment and its signed days until due into message content
pub trait NotificationContentBuilder {
    fn build(&self, installment: &Installment, days_until_due: i64) -> NotificationContent;

    fn build_reminder(&self, installment: &Installment, reminder: &PaymentReminder) -> NotificationContent {
        self.build(installment, reminder.days_until_due)
    }
}

/// plain english content
#[derive(Debug, Clone, Default)]
pub struct PlainTextContentBuilder {
    pub currency_prefix: String,
}

impl PlainTextContentBuilder {
    pub fn new(currency_prefix: impl Into<String>) -> Self {
        Self {
            currency_prefix: currency_prefix.into(),
        }
    }

    fn amount(&self, money: Money) -> String {
        format!("{}{}", self.currency_prefix, money.round_cents().as_decimal().round_dp(2))
    }
}

impl NotificationContentBuilder for PlainTextContentBuilder {
    fn build(&self, installment: &Installment, days_until_due: i64) -> NotificationContent {
        let amount = self.amount(installment.amount_due());
        let number = installment.installment_number;
        let due = installment.due_date.format("%Y-%m-%d");

        match ReminderKind::from_days_until_due(days_until_due) {
            ReminderKind::Upcoming => NotificationContent {
                subject: format!("Installment #{} due in {} day(s)", number, days_until_due),
                body: format!(
                    "Your installment #{} of {} is due on {}. Please pay before the due date to avoid late fees.",
                    number, amount, due
                ),
                priority: NotificationPriority::Normal,
            },
            ReminderKind::DueToday => NotificationContent {
                subject: format!("Installment #{} is due today", number),
                body: format!("Your installment #{} of {} is due today ({}).", number, amount, due),
                priority: NotificationPriority::High,
            },
            ReminderKind::Overdue => NotificationContent {
                subject: format!("Installment #{} is {} day(s) overdue", number, -days_until_due),
                body: format!(
                    "Your installment #{} of {} was due on {}. Late fees accrue until it is paid.",
                    number, amount, due
                ),
                priority: NotificationPriority::High,
            },
        }
    }
}
