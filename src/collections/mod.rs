pub mod breakdown;
pub mod late_fee;
pub mod overdue;
pub mod reconciliation;
pub mod summary;
pub mod validation;

pub use breakdown::{is_effectively_overdue, payment_breakdown, PaymentAllocation, PaymentBreakdown};
pub use late_fee::{default_late_fee, late_fee, LateFeeCalculation, LateFeeCalculator};
pub use overdue::{advance_overdue_statuses, mark_overdue};
pub use reconciliation::{
    is_paid_on_time, next_due_installment, on_time_rate, reconcile_payments, PaymentIndex,
    Reconciliation, ReconciliationReport, ReconciledPair, UnreconciledPayment,
};
pub use summary::{repayment_summary, RepaymentSummary};
pub use validation::{validate_payment_amount, PaymentValidation, PaymentValidator, ValidationFailure};

pub use crate::calendar::{days_overdue, is_overdue};
