use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Datelike, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::decimal::{percent_of_counts, Money};
use crate::types::{Installment, InstallmentId, Payment};

/// calendar granularity of a trend bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum TrendPeriod {
    Day,
    Week,
    #[default]
    Month,
    Quarter,
}

impl TrendPeriod {
    /// sortable key: `2024-03-05`, `2024-W09`, `2024-03`, `2024-Q1`
    pub fn key_for(&self, date: DateTime<Utc>) -> String {
        match self {
            TrendPeriod::Day => date.format("%Y-%m-%d").to_string(),
            TrendPeriod::Week => {
                let week = date.iso_week();
                format!("{:04}-W{:02}", week.year(), week.week())
            }
            TrendPeriod::Month => format!("{:04}-{:02}", date.year(), date.month()),
            TrendPeriod::Quarter => format!("{:04}-Q{}", date.year(), (date.month() - 1) / 3 + 1),
        }
    }
}

/// payments falling into one period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendBucket {
    pub period: String,
    pub total_amount: Money,
    pub total_count: usize,
    pub approved_count: usize,
    pub on_time_count: usize,
    pub late_count: usize,
    pub average_amount: Money,
    /// approved / total within the bucket
    pub collection_rate: Decimal,
}

#[derive(Default)]
struct BucketTotals {
    amount: Money,
    count: usize,
    approved: usize,
    on_time: usize,
}

/// payments bucketed by the period of their paid (or submitted) date
pub fn payment_trends(
    payments: &[Payment],
    installments: &[Installment],
    period: TrendPeriod,
) -> Vec<TrendBucket> {
    let due_dates: HashMap<InstallmentId, DateTime<Utc>> =
        installments.iter().map(|i| (i.id, i.due_date)).collect();

    let mut buckets: BTreeMap<String, BucketTotals> = BTreeMap::new();

    for payment in payments {
        let totals = buckets.entry(period.key_for(payment.activity_date())).or_default();
        totals.amount += payment.amount;
        totals.count += 1;

        if payment.is_approved() {
            totals.approved += 1;
        }

        let on_time = match (payment.paid_date, due_dates.get(&payment.installment_id)) {
            (Some(paid), Some(due)) => paid <= *due,
            _ => false,
        };
        if on_time {
            totals.on_time += 1;
        }
    }

    buckets
        .into_iter()
        .map(|(period, totals)| TrendBucket {
            period,
            total_amount: totals.amount,
            total_count: totals.count,
            approved_count: totals.approved,
            on_time_count: totals.on_time,
            late_count: totals.count - totals.on_time,
            average_amount: Money::average(totals.amount, totals.count),
            collection_rate: percent_of_counts(totals.approved, totals.count, Decimal::ZERO),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{InstallmentStatus, PaymentMethod};
    use chrono::TimeZone;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 10, 0, 0).unwrap()
    }

    fn installment(due: DateTime<Utc>) -> Installment {
        Installment {
            id: Uuid::new_v4(),
            loan_id: Uuid::nil(),
            installment_number: 1,
            due_date: due,
            principal: Money::from_major(100),
            interest: Money::ZERO,
            remaining_balance: Money::ZERO,
            status: InstallmentStatus::Pending,
            payment_id: None,
        }
    }

    #[test]
    fn test_period_keys_sort_as_strings() {
        let date = at(2024, 3, 5);
        assert_eq!(TrendPeriod::Day.key_for(date), "2024-03-05");
        assert_eq!(TrendPeriod::Week.key_for(date), "2024-W10");
        assert_eq!(TrendPeriod::Month.key_for(date), "2024-03");
        assert_eq!(TrendPeriod::Quarter.key_for(date), "2024-Q1");
        assert_eq!(TrendPeriod::Quarter.key_for(at(2024, 12, 31)), "2024-Q4");

        assert!(TrendPeriod::Month.key_for(at(2024, 9, 1)) < TrendPeriod::Month.key_for(at(2024, 10, 1)));
    }

    #[test]
    fn test_monthly_buckets() {
        let due = at(2024, 3, 10);
        let a = installment(due);
        let b = installment(due);
        let c = installment(at(2024, 4, 10));

        let payments = vec![
            // early, approved
            Payment::for_installment(&a, Money::from_major(100), PaymentMethod::Cash, at(2024, 3, 8))
                .approve(at(2024, 3, 8), at(2024, 3, 9)),
            // late, approved
            Payment::for_installment(&b, Money::from_major(200), PaymentMethod::Online, at(2024, 3, 20))
                .approve(at(2024, 3, 20), at(2024, 3, 21)),
            // pending, never paid, bucketed by created date
            Payment::for_installment(&c, Money::from_major(50), PaymentMethod::Cash, at(2024, 4, 2)),
        ];

        let trends = payment_trends(&payments, &[a, b, c], TrendPeriod::Month);

        assert_eq!(trends.len(), 2);
        let march = &trends[0];
        assert_eq!(march.period, "2024-03");
        assert_eq!(march.total_count, 2);
        assert_eq!(march.total_amount, Money::from_major(300));
        assert_eq!(march.on_time_count, 1);
        assert_eq!(march.late_count, 1);
        assert_eq!(march.average_amount, Money::from_major(150));
        assert_eq!(march.collection_rate, dec!(100));

        let april = &trends[1];
        assert_eq!(april.period, "2024-04");
        assert_eq!(april.on_time_count, 0);
        assert_eq!(april.late_count, 1);
        assert_eq!(april.collection_rate, dec!(0));
    }

    #[test]
    fn test_collection_rate_uses_bucket_total() {
        let inst = installment(at(2024, 5, 1));
        let payments = vec![
            Payment::for_installment(&inst, Money::from_major(10), PaymentMethod::Cash, at(2024, 5, 1))
                .approve(at(2024, 5, 1), at(2024, 5, 1)),
            Payment::for_installment(&inst, Money::from_major(10), PaymentMethod::Cash, at(2024, 5, 1))
                .reject("duplicate", at(2024, 5, 2)),
            Payment::for_installment(&inst, Money::from_major(10), PaymentMethod::Cash, at(2024, 5, 1)),
        ];

        let trends = payment_trends(&payments, &[inst], TrendPeriod::Day);
        assert_eq!(trends.len(), 1);
        assert_eq!(trends[0].collection_rate, dec!(33.33));
    }

    #[test]
    fn test_empty_input() {
        assert!(payment_trends(&[], &[], TrendPeriod::Week).is_empty());
    }
}
