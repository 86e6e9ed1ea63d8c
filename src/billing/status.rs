use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::billing::exceptions::resolve_expected_fee;
use crate::config::BillingConfig;
use crate::decimal::Money;
use crate::errors::Result;
use crate::format::format_currency_with;
use crate::models::{Payment, Student};
use crate::types::{StudentId, YearMonth};

/// payment state of one student for one month
///
/// `Paid` and `Exempt` are settled; the open states are recomputed from
/// scratch whenever payments change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum MonthStatus {
    /// before enrollment, after deactivation, or no enrollment date
    NotApplicable,
    /// expected fee is zero and nothing was paid
    Exempt,
    Paid { paid: Money, expected: Money },
    PartiallyPaid { paid: Money, expected: Money },
    /// nothing paid for a month that has already closed
    Unpaid { expected: Money },
    /// nothing paid yet for the current or a future month
    Pending { expected: Money },
}

/// visual tone of a grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusTone {
    Muted,
    Info,
    Success,
    Warning,
    Danger,
    Neutral,
}

impl MonthStatus {
    pub fn is_settled(&self) -> bool {
        matches!(self, MonthStatus::Paid { .. } | MonthStatus::Exempt)
    }

    /// a payment can be recorded from this cell
    pub fn is_actionable(&self) -> bool {
        !matches!(self, MonthStatus::NotApplicable)
    }

    pub fn paid(&self) -> Money {
        match self {
            MonthStatus::Paid { paid, .. } | MonthStatus::PartiallyPaid { paid, .. } => *paid,
            _ => Money::ZERO,
        }
    }

    /// amount still owed for the month
    pub fn outstanding(&self) -> Money {
        match self {
            MonthStatus::PartiallyPaid { paid, expected } => expected.saturating_sub(*paid),
            MonthStatus::Unpaid { expected } | MonthStatus::Pending { expected } => *expected,
            _ => Money::ZERO,
        }
    }

    pub fn tone(&self) -> StatusTone {
        match self {
            MonthStatus::NotApplicable => StatusTone::Muted,
            MonthStatus::Exempt => StatusTone::Info,
            MonthStatus::Paid { .. } => StatusTone::Success,
            MonthStatus::PartiallyPaid { .. } => StatusTone::Warning,
            MonthStatus::Unpaid { .. } => StatusTone::Danger,
            MonthStatus::Pending { .. } => StatusTone::Neutral,
        }
    }

    /// cell text: paid amount when something was paid, a label otherwise
    pub fn label(&self, config: &BillingConfig) -> String {
        let currency = &config.currency;
        match self {
            MonthStatus::NotApplicable => config.labels.not_applicable.clone(),
            MonthStatus::Exempt => config.labels.exempt.clone(),
            MonthStatus::Paid { paid, .. } | MonthStatus::PartiallyPaid { paid, .. } => {
                format_currency_with(currency, *paid, currency.default_decimals)
            }
            MonthStatus::Unpaid { .. } => config.labels.unpaid.clone(),
            MonthStatus::Pending { .. } => config.labels.pending.clone(),
        }
    }
}

/// true when the student is billable in the month: enrolled on or before it
/// and not deactivated in an earlier month
pub fn is_billable_month(student: &Student, month: YearMonth) -> bool {
    if let Some(deactivated) = student.deactivation_month() {
        if month > deactivated {
            return false;
        }
    }

    match student.enrollment_month() {
        Some(enrolled) => month >= enrolled,
        None => false,
    }
}

/// total paid by a student in a month, year included in the match
pub fn paid_for_month(student_id: StudentId, month: YearMonth, payments: &[Payment]) -> Money {
    payments
        .iter()
        .filter(|p| p.applies_to(student_id, month))
        .map(|p| p.amount)
        .sum()
}

/// classify a month once the student is known to be billable
pub fn classify(expected: Money, paid: Money, month: YearMonth, today: NaiveDate) -> MonthStatus {
    if expected.is_zero() {
        return if paid.is_positive() {
            MonthStatus::Paid { paid, expected }
        } else {
            MonthStatus::Exempt
        };
    }

    if paid >= expected {
        MonthStatus::Paid { paid, expected }
    } else if paid.is_positive() {
        MonthStatus::PartiallyPaid { paid, expected }
    } else if month < YearMonth::from_date(today) {
        MonthStatus::Unpaid { expected }
    } else {
        MonthStatus::Pending { expected }
    }
}

/// payment status of a student for a month, relative to `today`
pub fn month_status(
    student: &Student,
    month: YearMonth,
    payments: &[Payment],
    today: NaiveDate,
) -> MonthStatus {
    if !is_billable_month(student, month) {
        return MonthStatus::NotApplicable;
    }

    let expected = resolve_expected_fee(student, month);
    let paid = paid_for_month(student.id, month, payments);
    classify(expected, paid, month, today)
}

/// [`month_status`] addressed by year and zero-based month index
pub fn month_status_for(
    student: &Student,
    year: i32,
    month_index: u32,
    payments: &[Payment],
    today: NaiveDate,
) -> Result<MonthStatus> {
    Ok(month_status(student, YearMonth::new(year, month_index)?, payments, today))
}

/// payments summed per (student, month), built once per computation pass
#[derive(Debug, Clone, Default)]
pub struct PaymentIndex {
    totals: HashMap<(StudentId, YearMonth), Money>,
}

impl PaymentIndex {
    pub fn build<'a>(payments: impl IntoIterator<Item = &'a Payment>) -> Self {
        let mut totals: HashMap<(StudentId, YearMonth), Money> = HashMap::new();
        for payment in payments {
            *totals.entry((payment.student_id, payment.month())).or_default() += payment.amount;
        }
        Self { totals }
    }

    pub fn paid(&self, student_id: StudentId, month: YearMonth) -> Money {
        self.totals.get(&(student_id, month)).copied().unwrap_or(Money::ZERO)
    }

    /// [`month_status`] against the pre-summed totals
    pub fn month_status(&self, student: &Student, month: YearMonth, today: NaiveDate) -> MonthStatus {
        if !is_billable_month(student, month) {
            return MonthStatus::NotApplicable;
        }

        let expected = resolve_expected_fee(student, month);
        classify(expected, self.paid(student.id, month), month, today)
    }
}
