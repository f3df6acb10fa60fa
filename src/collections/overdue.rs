use chrono::{DateTime, Utc};
use tracing::debug;

use crate::calendar;
use crate::types::{Installment, InstallmentId, InstallmentStatus};

/// move every elapsed pending installment to overdue, returning the ids moved
pub fn mark_overdue(installments: &mut [Installment], now: DateTime<Utc>) -> Vec<InstallmentId> {
    let mut transitioned = Vec::new();

    for installment in installments.iter_mut() {
        if installment.status == InstallmentStatus::Pending
            && calendar::is_overdue(installment.due_date, now)
        {
            installment.status = InstallmentStatus::Overdue;
            transitioned.push(installment.id);
        }
    }

    if !transitioned.is_empty() {
        debug!(count = transitioned.len(), "installments moved to overdue");
    }

    transitioned
}

/// copy of `installments` with elapsed pending entries marked overdue
pub fn advance_overdue_statuses(installments: &[Installment], now: DateTime<Utc>) -> Vec<Installment> {
    let mut advanced = installments.to_vec();
    mark_overdue(&mut advanced, now);
    advanced
}
