use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::errors::EngineError;
use crate::types::{InstallmentId, LoanId, PaymentId};

/// what the collections engine did, in the order it happened
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CollectionEvent {
    ScheduleGenerated {
        loan_id: LoanId,
        installments: u32,
        emi: Money,
        timestamp: DateTime<Utc>,
    },
    InstallmentOverdue {
        installment_id: InstallmentId,
        timestamp: DateTime<Utc>,
    },
    InstallmentPaid {
        installment_id: InstallmentId,
        payment_id: PaymentId,
        timestamp: DateTime<Utc>,
    },
    PaymentUnreconciled {
        payment_id: PaymentId,
        error: EngineError,
        timestamp: DateTime<Utc>,
    },
    ReminderPrepared {
        installment_id: InstallmentId,
        days_until_due: i64,
        amount_due: Money,
        timestamp: DateTime<Utc>,
    },
}

/// event store for collecting events during operations
#[derive(Debug, Default)]
pub struct EventStore {
    events: Vec<CollectionEvent>,
}

impl EventStore {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn emit(&mut self, event: CollectionEvent) {
        self.events.push(event);
    }

    pub fn take_events(&mut self) -> Vec<CollectionEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn events(&self) -> &[CollectionEvent] {
        &self.events
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}
