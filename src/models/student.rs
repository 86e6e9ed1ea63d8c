use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::decimal::Money;
use crate::errors::{BillingError, Result};
use crate::types::{StudentId, YearMonth};

/// per-month overrides of a student's standard fee
///
/// serialized as a map keyed by "{year}-{monthIndex}" strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<String, Money>", into = "BTreeMap<String, Money>")]
pub struct FeeExceptions(BTreeMap<YearMonth, Money>);

impl FeeExceptions {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    pub fn get(&self, month: YearMonth) -> Option<Money> {
        self.0.get(&month).copied()
    }

    pub fn insert(&mut self, month: YearMonth, fee: Money) -> Option<Money> {
        self.0.insert(month, fee)
    }

    pub fn remove(&mut self, month: YearMonth) -> Option<Money> {
        self.0.remove(&month)
    }

    pub fn contains(&self, month: YearMonth) -> bool {
        self.0.contains_key(&month)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&YearMonth, &Money)> {
        self.0.iter()
    }
}

impl TryFrom<BTreeMap<String, Money>> for FeeExceptions {
    type Error = BillingError;

    fn try_from(raw: BTreeMap<String, Money>) -> Result<Self> {
        raw.into_iter()
            .map(|(key, fee)| Ok((YearMonth::parse_key(&key)?, fee)))
            .collect::<Result<BTreeMap<_, _>>>()
            .map(FeeExceptions)
    }
}

impl From<FeeExceptions> for BTreeMap<String, Money> {
    fn from(exceptions: FeeExceptions) -> Self {
        exceptions.0.into_iter().map(|(month, fee)| (month.key(), fee)).collect()
    }
}

impl FromIterator<(YearMonth, Money)> for FeeExceptions {
    fn from_iter<I: IntoIterator<Item = (YearMonth, Money)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// enrolled student
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: StudentId,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub enrollment_date: Option<NaiveDate>,
    pub deactivation_date: Option<NaiveDate>,
    pub monthly_fee: Money,
    #[serde(default)]
    pub fee_exceptions: FeeExceptions,
    pub active: bool,
}

impl Student {
    pub fn builder() -> StudentBuilder {
        StudentBuilder::new()
    }

    /// month of enrollment, None when the enrollment date is unknown
    pub fn enrollment_month(&self) -> Option<YearMonth> {
        self.enrollment_date.map(YearMonth::from_date)
    }

    pub fn deactivation_month(&self) -> Option<YearMonth> {
        self.deactivation_date.map(YearMonth::from_date)
    }

    /// set or clear the fee override for a month
    ///
    /// an override equal to the standard fee is dropped rather than stored.
    /// returns true when the stored exceptions changed.
    pub fn set_fee_exception(&mut self, month: YearMonth, fee: Option<Money>) -> Result<bool> {
        match fee {
            Some(fee) if fee.is_negative() => Err(BillingError::InvalidFeeAmount { amount: fee }),
            Some(fee) if fee != self.monthly_fee => {
                Ok(self.fee_exceptions.insert(month, fee) != Some(fee))
            }
            _ => Ok(self.fee_exceptions.remove(month).is_some()),
        }
    }

    /// drop overrides that now equal the standard fee, e.g. after a fee change
    pub fn normalize_fee_exceptions(&mut self) -> usize {
        let before = self.fee_exceptions.len();
        let fee = self.monthly_fee;
        self.fee_exceptions.0.retain(|_, exception| *exception != fee);
        before - self.fee_exceptions.len()
    }
}

/// builder for students
#[derive(Debug, Default)]
pub struct StudentBuilder {
    id: Option<StudentId>,
    name: Option<String>,
    email: Option<String>,
    phone: Option<String>,
    enrollment_date: Option<NaiveDate>,
    deactivation_date: Option<NaiveDate>,
    monthly_fee: Option<Money>,
    fee_exceptions: FeeExceptions,
    active: Option<bool>,
}

impl StudentBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(mut self, id: StudentId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    pub fn enrolled_on(mut self, date: NaiveDate) -> Self {
        self.enrollment_date = Some(date);
        self
    }

    pub fn deactivated_on(mut self, date: NaiveDate) -> Self {
        self.deactivation_date = Some(date);
        self
    }

    pub fn monthly_fee(mut self, fee: Money) -> Self {
        self.monthly_fee = Some(fee);
        self
    }

    pub fn fee_exception(mut self, month: YearMonth, fee: Money) -> Self {
        self.fee_exceptions.insert(month, fee);
        self
    }

    pub fn active(mut self, active: bool) -> Self {
        self.active = Some(active);
        self
    }

    pub fn build(self) -> Result<Student> {
        let name = self.name.ok_or(BillingError::InvalidConfiguration {
            message: "Student name required".to_string(),
        })?;

        let monthly_fee = self.monthly_fee.ok_or(BillingError::InvalidConfiguration {
            message: "Monthly fee required".to_string(),
        })?;

        if monthly_fee.is_negative() {
            return Err(BillingError::InvalidFeeAmount { amount: monthly_fee });
        }

        if let (Some(enrolled), Some(deactivated)) = (self.enrollment_date, self.deactivation_date) {
            if deactivated < enrolled {
                return Err(BillingError::InvalidDate {
                    message: format!("deactivation {} precedes enrollment {}", deactivated, enrolled),
                });
            }
        }

        let mut student = Student {
            id: self.id.unwrap_or_else(Uuid::new_v4),
            name,
            email: self.email,
            phone: self.phone,
            enrollment_date: self.enrollment_date,
            deactivation_date: self.deactivation_date,
            monthly_fee,
            fee_exceptions: self.fee_exceptions,
            active: self.active.unwrap_or(self.deactivation_date.is_none()),
        };
        student.normalize_fee_exceptions();

        Ok(student)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn april_2025() -> YearMonth {
        YearMonth::new(2025, 3).unwrap()
    }

    fn student() -> Student {
        Student::builder()
            .name("Lucía Fernández")
            .monthly_fee(Money::from_major(19))
            .enrolled_on(NaiveDate::from_ymd_opt(2024, 9, 1).unwrap())
            .build()
            .unwrap()
    }

    #[test]
    fn test_builder_defaults() {
        let s = student();
        assert!(s.active);
        assert!(s.fee_exceptions.is_empty());
        assert_eq!(s.enrollment_month(), Some(YearMonth::new(2024, 8).unwrap()));

        assert!(Student::builder().monthly_fee(Money::ONE).build().is_err());
        assert!(Student::builder().name("x").build().is_err());
    }

    #[test]
    fn test_redundant_exception_not_stored() {
        let mut s = student();

        assert!(s.set_fee_exception(april_2025(), Some(Money::ZERO)).unwrap());
        assert_eq!(s.fee_exceptions.get(april_2025()), Some(Money::ZERO));

        // equal to the standard fee clears the override
        assert!(s.set_fee_exception(april_2025(), Some(Money::from_major(19))).unwrap());
        assert!(!s.fee_exceptions.contains(april_2025()));

        // nothing to clear
        assert!(!s.set_fee_exception(april_2025(), None).unwrap());
    }

    #[test]
    fn test_negative_exception_rejected() {
        let mut s = student();
        let result = s.set_fee_exception(april_2025(), Some(Money::from_major(-5)));
        assert!(matches!(result, Err(BillingError::InvalidFeeAmount { .. })));
    }

    #[test]
    fn test_builder_normalizes_exceptions() {
        let s = Student::builder()
            .name("Marta")
            .monthly_fee(Money::from_major(25))
            .fee_exception(april_2025(), Money::from_major(25))
            .fee_exception(april_2025().next(), Money::from_major(10))
            .build()
            .unwrap();

        assert_eq!(s.fee_exceptions.len(), 1);
        assert_eq!(s.fee_exceptions.get(april_2025().next()), Some(Money::from_major(10)));
    }

    #[test]
    fn test_deactivation_before_enrollment_rejected() {
        let result = Student::builder()
            .name("Pablo")
            .monthly_fee(Money::from_major(25))
            .enrolled_on(NaiveDate::from_ymd_opt(2025, 3, 1).unwrap())
            .deactivated_on(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap())
            .build();
        assert!(matches!(result, Err(BillingError::InvalidDate { .. })));
    }

    #[test]
    fn test_exceptions_serialize_with_string_keys() {
        let mut s = student();
        s.set_fee_exception(april_2025(), Some(Money::ZERO)).unwrap();

        let json = serde_json::to_value(&s).unwrap();
        assert!(json["feeExceptions"].get("2025-3").is_some());

        let back: Student = serde_json::from_value(json).unwrap();
        assert_eq!(back.fee_exceptions, s.fee_exceptions);
    }
}
