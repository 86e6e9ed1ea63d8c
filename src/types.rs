use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::errors::{BillingError, Result};

/// unique identifier for a student
pub type StudentId = Uuid;

/// unique identifier for a payment
pub type PaymentId = Uuid;

/// unique identifier for a cost
pub type CostId = Uuid;

/// how a payment was collected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PaymentMethod {
    #[serde(alias = "Efectivo", alias = "cash")]
    Cash,
    #[serde(alias = "Transferencia", alias = "transfer")]
    Transfer,
    #[serde(alias = "Domiciliación", alias = "Domiciliacion", alias = "direct-debit")]
    DirectDebit,
    #[serde(alias = "bizum")]
    Bizum,
}

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 4] = [
        PaymentMethod::Cash,
        PaymentMethod::Transfer,
        PaymentMethod::DirectDebit,
        PaymentMethod::Bizum,
    ];

    /// label shown in the payment dialogs
    pub fn label(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "Efectivo",
            PaymentMethod::Transfer => "Transferencia",
            PaymentMethod::DirectDebit => "Domiciliación",
            PaymentMethod::Bizum => "Bizum",
        }
    }
}

/// cost categories tracked by the school
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CostCategory {
    #[serde(alias = "Alquiler")]
    Rent,
    #[serde(alias = "Nóminas", alias = "Nominas")]
    Salaries,
    #[serde(alias = "Suministros")]
    Utilities,
    #[serde(alias = "Material")]
    Supplies,
    #[serde(alias = "Vestuario")]
    Costumes,
    #[serde(alias = "Publicidad")]
    Marketing,
    #[serde(alias = "Seguros")]
    Insurance,
    #[serde(alias = "Impuestos")]
    Taxes,
    #[serde(alias = "Mantenimiento")]
    Maintenance,
    #[serde(alias = "Otros")]
    Other,
}

impl CostCategory {
    pub fn label(&self) -> &'static str {
        match self {
            CostCategory::Rent => "Alquiler",
            CostCategory::Salaries => "Nóminas",
            CostCategory::Utilities => "Suministros",
            CostCategory::Supplies => "Material",
            CostCategory::Costumes => "Vestuario",
            CostCategory::Marketing => "Publicidad",
            CostCategory::Insurance => "Seguros",
            CostCategory::Taxes => "Impuestos",
            CostCategory::Maintenance => "Mantenimiento",
            CostCategory::Other => "Otros",
        }
    }
}

/// a calendar month with a zero-based month index
///
/// ordering is chronological: year first, then month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct YearMonth {
    pub year: i32,
    pub month0: u32,
}

impl YearMonth {
    /// create a year-month, rejecting month indexes outside 0..=11
    pub fn new(year: i32, month0: u32) -> Result<Self> {
        if month0 > 11 {
            return Err(BillingError::InvalidMonth { month_index: month0 });
        }
        Ok(Self { year, month0 })
    }

    /// month containing the given date
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month0: date.month0(),
        }
    }

    /// the twelve months of a year, january first
    pub fn months_of(year: i32) -> impl Iterator<Item = YearMonth> {
        (0..12).map(move |month0| YearMonth { year, month0 })
    }

    /// exception key in "{year}-{monthIndex}" form, e.g. "2025-3" for april
    pub fn key(&self) -> String {
        format!("{}-{}", self.year, self.month0)
    }

    /// parse an exception key produced by [`YearMonth::key`]
    pub fn parse_key(key: &str) -> Result<Self> {
        let invalid = || BillingError::InvalidFeeExceptionKey {
            key: key.to_string(),
        };

        let (year, month) = key.trim().rsplit_once('-').ok_or_else(invalid)?;
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month0: u32 = month.parse().map_err(|_| invalid())?;

        Self::new(year, month0).map_err(|_| invalid())
    }

    /// following calendar month
    pub fn next(&self) -> Self {
        if self.month0 == 11 {
            Self { year: self.year + 1, month0: 0 }
        } else {
            Self { year: self.year, month0: self.month0 + 1 }
        }
    }

    /// advance by a number of months
    pub fn plus_months(&self, months: u32) -> Self {
        let total = self.year as i64 * 12 + self.month0 as i64 + months as i64;
        Self {
            year: total.div_euclid(12) as i32,
            month0: total.rem_euclid(12) as u32,
        }
    }

    /// day in this month, clamped to the month's last day
    pub fn clamped_day(&self, day: u32) -> Option<NaiveDate> {
        let last = self.days_in_month()?;
        NaiveDate::from_ymd_opt(self.year, self.month0 + 1, day.clamp(1, last))
    }

    pub fn days_in_month(&self) -> Option<u32> {
        let first = NaiveDate::from_ymd_opt(self.year, self.month0 + 1, 1)?;
        let next = self.next();
        let next_first = NaiveDate::from_ymd_opt(next.year, next.month0 + 1, 1)?;
        Some(next_first.signed_duration_since(first).num_days() as u32)
    }

    /// true when the date falls inside this month
    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month0() == self.month0
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month0 + 1)
    }
}
