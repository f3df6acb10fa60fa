pub mod analytics;
pub mod calendar;
pub mod collections;
pub mod config;
pub mod decimal;
pub mod engine;
pub mod errors;
pub mod events;
pub mod notifications;
pub mod schedule;
pub mod types;

// re-export key types
pub use analytics::{
    AnalyticsReport, GroupBy, GroupPerformance, KpiSet, PaymentFunnel, PortfolioHealth,
    RiskLevel, TrendBucket, TrendPeriod,
};
pub use collections::{
    LateFeeCalculator, PaymentAllocation, PaymentBreakdown, PaymentValidation, PaymentValidator,
    Reconciliation, ReconciliationReport, RepaymentSummary, ValidationFailure,
};
pub use config::{AnalyticsConfig, CollectionsConfig, EngineConfig, RiskSplit, ScheduleConfig};
pub use decimal::{Money, Rate};
pub use engine::CollectionsEngine;
pub use errors::{EngineError, ReferenceKind, Result};
pub use events::{CollectionEvent, EventStore};
pub use notifications::{
    NotificationContent, NotificationContentBuilder, PaymentReminder, PlainTextContentBuilder,
    ReminderKind,
};
pub use schedule::{calculate_emi, generate_schedule, InstallmentSchedule};
pub use types::{
    Installment, InstallmentId, InstallmentStatus, Loan, LoanId, LoanStatus, Payment,
    PaymentFrequency, PaymentId, PaymentMethod, PaymentStatus,
};

// re-export external dependencies that users will need
pub use chrono;
pub use hourglass_rs::{SafeTimeProvider, TimeSource};
pub use rust_decimal::Decimal;
pub use uuid::Uuid;
