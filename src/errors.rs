use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// kind of record a payment failed to resolve against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReferenceKind {
    Loan,
    Installment,
    Payment,
}

#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EngineError {
    #[error("invalid loan terms: {message}")]
    InvalidLoanTerms {
        message: String,
    },

    #[error("missing reference: {kind:?} {id} not found")]
    MissingReference {
        kind: ReferenceKind,
        id: Uuid,
    },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration {
        message: String,
    },

    #[error("serialization error: {message}")]
    Serialization {
        message: String,
    },
}

impl From<serde_json::Error> for EngineError {
    fn from(e: serde_json::Error) -> Self {
        EngineError::Serialization {
            message: e.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
