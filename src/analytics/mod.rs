pub mod funnel;
pub mod kpi;
pub mod performance;
pub mod portfolio;
pub mod trends;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::EngineConfig;
use crate::errors::Result;
use crate::types::{Installment, Loan, Payment};

pub use funnel::{payment_flow_funnel, PaymentFunnel, RejectionReasonCount};
pub use kpi::{kpi_set, KpiSet};
pub use performance::{
    agent_performance, group_performance, regional_performance, GroupBy, GroupPerformance,
};
pub use portfolio::{non_performing_loans, portfolio_health, PortfolioHealth, RiskBucket, RiskLevel};
pub use trends::{payment_trends, TrendBucket, TrendPeriod};

/// every aggregate over one snapshot of loans, payments and installments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsReport {
    pub generated_at: DateTime<Utc>,
    pub trend_period: TrendPeriod,
    pub trends: Vec<TrendBucket>,
    pub regional: Vec<GroupPerformance>,
    pub agents: Vec<GroupPerformance>,
    pub funnel: PaymentFunnel,
    pub portfolio: PortfolioHealth,
    pub kpis: KpiSet,
}

impl AnalyticsReport {
    pub fn build(
        loans: &[Loan],
        payments: &[Payment],
        installments: &[Installment],
        trend_period: TrendPeriod,
        now: DateTime<Utc>,
        config: &EngineConfig,
    ) -> Self {
        let report = Self {
            generated_at: now,
            trend_period,
            trends: payment_trends(payments, installments, trend_period),
            regional: regional_performance(loans, payments, installments, now, config),
            agents: agent_performance(loans, payments, installments, now, config),
            funnel: payment_flow_funnel(payments),
            portfolio: portfolio_health(loans, payments, installments, now, config),
            kpis: kpi_set(loans, payments, installments, now, config),
        };

        info!(
            loans = loans.len(),
            payments = payments.len(),
            installments = installments.len(),
            buckets = report.trends.len(),
            "analytics report built"
        );

        report
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
