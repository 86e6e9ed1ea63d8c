use thiserror::Error;
use uuid::Uuid;

use crate::decimal::Money;

#[derive(Error, Debug)]
pub enum BillingError {
    #[error("invalid date: {message}")]
    InvalidDate {
        message: String,
    },

    #[error("invalid fee exception key: {key}")]
    InvalidFeeExceptionKey {
        key: String,
    },

    #[error("invalid month index: {month_index} (expected 0..=11)")]
    InvalidMonth {
        month_index: u32,
    },

    #[error("invalid payment amount: {amount}")]
    InvalidPaymentAmount {
        amount: Money,
    },

    #[error("invalid fee amount: {amount}")]
    InvalidFeeAmount {
        amount: Money,
    },

    #[error("invalid cost amount: {amount}")]
    InvalidCostAmount {
        amount: Money,
    },

    #[error("payment concept is required")]
    MissingConcept,

    #[error("invalid configuration: {message}")]
    InvalidConfiguration {
        message: String,
    },

    #[error("student not found: {id}")]
    StudentNotFound {
        id: Uuid,
    },

    #[error("payment not found: {id}")]
    PaymentNotFound {
        id: Uuid,
    },

    #[error("cost not found: {id}")]
    CostNotFound {
        id: Uuid,
    },

    #[error("duplicate record id: {id}")]
    DuplicateId {
        id: Uuid,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, BillingError>;
