use std::collections::HashMap;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::decimal::percent_of_counts;
use crate::errors::{EngineError, ReferenceKind};
use crate::types::{
    Installment, InstallmentId, InstallmentStatus, Payment, PaymentId, PaymentStatus,
};

/// payments looked up by the installment they settle
pub struct PaymentIndex<'a> {
    by_installment: HashMap<InstallmentId, Vec<&'a Payment>>,
    by_id: HashMap<PaymentId, &'a Payment>,
}

impl<'a> PaymentIndex<'a> {
    pub fn new(payments: &'a [Payment]) -> Self {
        let mut by_installment: HashMap<InstallmentId, Vec<&'a Payment>> = HashMap::new();
        let mut by_id = HashMap::with_capacity(payments.len());

        for payment in payments {
            by_installment.entry(payment.installment_id).or_default().push(payment);
            by_id.insert(payment.id, payment);
        }

        Self { by_installment, by_id }
    }

    /// the payment settling an installment: its linked payment if known,
    /// otherwise an approved one, otherwise any referencing it
    pub fn linked_payment(&self, installment: &Installment) -> Option<&'a Payment> {
        if let Some(linked) = installment.payment_id.and_then(|id| self.by_id.get(&id)) {
            return Some(*linked);
        }

        let candidates = self.by_installment.get(&installment.id)?;
        candidates
            .iter()
            .find(|p| p.status == PaymentStatus::Approved)
            .or_else(|| candidates.first())
            .copied()
    }

    /// payments referencing this installment id, in input order
    pub fn for_installment(&self, installment_id: InstallmentId) -> &[&'a Payment] {
        self.by_installment
            .get(&installment_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// paid on or before its due date
pub fn is_paid_on_time(installment: &Installment, payment: &Payment) -> bool {
    payment
        .paid_date
        .map(|paid| paid <= installment.due_date)
        .unwrap_or(false)
}

/// share of paid installments settled on time; 100 when nothing is paid yet
pub fn on_time_rate(installments: &[Installment], payments: &[Payment]) -> Decimal {
    let index = PaymentIndex::new(payments);
    let paid: Vec<&Installment> = installments
        .iter()
        .filter(|i| i.status == InstallmentStatus::Paid)
        .collect();

    let on_time = paid
        .iter()
        .filter(|installment| match index.linked_payment(installment) {
            Some(payment) => is_paid_on_time(installment, payment),
            None => {
                warn!(installment_id = %installment.id, "paid installment without a linked payment");
                false
            }
        })
        .count();

    percent_of_counts(on_time, paid.len(), dec!(100))
}

/// earliest-due installment still awaiting payment
pub fn next_due_installment(installments: &[Installment]) -> Option<&Installment> {
    installments
        .iter()
        .filter(|i| i.is_open())
        .min_by_key(|i| (i.due_date, i.installment_number))
}

/// approved payment matched to an installment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciledPair {
    pub installment_id: InstallmentId,
    pub payment_id: PaymentId,
}

/// approved payment that could not be applied
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnreconciledPayment {
    pub payment_id: PaymentId,
    pub error: EngineError,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ReconciliationReport {
    pub matched: Vec<ReconciledPair>,
    pub unreconciled: Vec<UnreconciledPayment>,
    /// approved payments for installments already settled by another payment
    pub already_settled: Vec<PaymentId>,
}

impl ReconciliationReport {
    pub fn is_clean(&self) -> bool {
        self.unreconciled.is_empty() && self.already_settled.is_empty()
    }
}

/// installments after applying approved payments, with the report
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciliation {
    pub installments: Vec<Installment>,
    pub report: ReconciliationReport,
}

/// settle installments with their approved payments; a payment pointing at
/// an unknown installment or another loan is reported, never applied
pub fn reconcile_payments(installments: &[Installment], payments: &[Payment]) -> Reconciliation {
    let mut installments = installments.to_vec();
    let mut report = ReconciliationReport::default();

    let positions: HashMap<InstallmentId, usize> = installments
        .iter()
        .enumerate()
        .map(|(position, installment)| (installment.id, position))
        .collect();

    for payment in payments.iter().filter(|p| p.is_approved()) {
        let Some(&position) = positions.get(&payment.installment_id) else {
            warn!(payment_id = %payment.id, installment_id = %payment.installment_id, "payment references unknown installment");
            report.unreconciled.push(UnreconciledPayment {
                payment_id: payment.id,
                error: EngineError::MissingReference {
                    kind: ReferenceKind::Installment,
                    id: payment.installment_id,
                },
            });
            continue;
        };

        let installment = &mut installments[position];

        if installment.loan_id != payment.loan_id {
            warn!(payment_id = %payment.id, loan_id = %payment.loan_id, "payment loan does not own its installment");
            report.unreconciled.push(UnreconciledPayment {
                payment_id: payment.id,
                error: EngineError::MissingReference {
                    kind: ReferenceKind::Loan,
                    id: payment.loan_id,
                },
            });
            continue;
        }

        match (installment.status, installment.payment_id) {
            (InstallmentStatus::Paid, Some(existing)) if existing == payment.id => {}
            (InstallmentStatus::Paid, _) => {
                report.already_settled.push(payment.id);
                continue;
            }
            _ => {
                installment.status = InstallmentStatus::Paid;
                installment.payment_id = Some(payment.id);
            }
        }

        report.matched.push(ReconciledPair {
            installment_id: installment.id,
            payment_id: payment.id,
        });
    }

    Reconciliation {
        installments,
        report,
    }
}
