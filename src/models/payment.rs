use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::decimal::Money;
use crate::errors::{BillingError, Result};
use crate::types::{PaymentId, PaymentMethod, StudentId, YearMonth};

/// payment recorded against a student
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: PaymentId,
    pub student_id: StudentId,
    pub amount: Money,
    pub date: NaiveDate,
    pub payment_method: PaymentMethod,
    pub concept: String,
    pub notes: Option<String>,
}

impl Payment {
    pub fn month(&self) -> YearMonth {
        YearMonth::from_date(self.date)
    }

    pub fn year(&self) -> i32 {
        self.date.year()
    }

    /// true when this payment belongs to the student and falls in the month
    pub fn applies_to(&self, student_id: StudentId, month: YearMonth) -> bool {
        self.student_id == student_id && month.contains(self.date)
    }
}

/// payment as entered in the payment dialog, before it has an id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentDraft {
    pub student_id: StudentId,
    pub amount: Money,
    pub date: NaiveDate,
    pub payment_method: PaymentMethod,
    pub concept: String,
    pub notes: Option<String>,
}

impl PaymentDraft {
    /// draft for a monthly fee, with the concept the billing grid uses
    pub fn monthly_fee(
        student_id: StudentId,
        amount: Money,
        date: NaiveDate,
        payment_method: PaymentMethod,
        month_name: &str,
    ) -> Self {
        Self {
            student_id,
            amount,
            date,
            payment_method,
            concept: format!("Cuota {} {}", month_name, date.year()),
            notes: None,
        }
    }

    /// form-level checks applied before the draft reaches storage
    pub fn validate(&self) -> Result<()> {
        if !self.amount.is_positive() {
            return Err(BillingError::InvalidPaymentAmount { amount: self.amount });
        }

        if self.concept.trim().is_empty() {
            return Err(BillingError::MissingConcept);
        }

        Ok(())
    }

    /// assign a fresh id
    pub fn into_payment(self) -> Payment {
        self.into_payment_with_id(Uuid::new_v4())
    }

    pub fn into_payment_with_id(self, id: PaymentId) -> Payment {
        Payment {
            id,
            student_id: self.student_id,
            amount: self.amount,
            date: self.date,
            payment_method: self.payment_method,
            concept: self.concept.trim().to_string(),
            notes: self.notes.filter(|n| !n.trim().is_empty()),
        }
    }
}

impl From<&Payment> for PaymentDraft {
    fn from(payment: &Payment) -> Self {
        Self {
            student_id: payment.student_id,
            amount: payment.amount,
            date: payment.date,
            payment_method: payment.payment_method,
            concept: payment.concept.clone(),
            notes: payment.notes.clone(),
        }
    }
}
