//! wire records as stored in the document database
//!
//! dates travel as strings and fee-exception keys as "{year}-{monthIndex}".
//! strict conversion rejects garbled values; the lenient loader fails closed
//! (see [`Student::from_record_lenient`]).

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;

use crate::decimal::Money;
use crate::errors::{BillingError, Result};
use crate::models::{Cost, FeeExceptions, Payment, Student};
use crate::types::{CostCategory, CostId, PaymentId, PaymentMethod, StudentId, YearMonth};

/// parse a date written as "2025-03-15", "15/03/2025" or an RFC 3339 timestamp
pub fn parse_date(raw: &str) -> Result<NaiveDate> {
    let raw = raw.trim();

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%d/%m/%Y"))
        .or_else(|_| DateTime::parse_from_rfc3339(raw).map(|dt| dt.date_naive()))
        .map_err(|_| BillingError::InvalidDate {
            message: format!("unparseable date '{}'", raw),
        })
}

fn parse_optional_date(raw: &Option<String>) -> Result<Option<NaiveDate>> {
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => parse_date(value).map(Some),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentRecord {
    pub id: StudentId,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub enrollment_date: Option<String>,
    pub deactivation_date: Option<String>,
    #[serde(default)]
    pub monthly_fee: Money,
    #[serde(default)]
    pub fee_exceptions: BTreeMap<String, Money>,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRecord {
    pub id: PaymentId,
    pub student_id: StudentId,
    pub amount: Money,
    pub date: String,
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub concept: String,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostRecord {
    pub id: CostId,
    pub payment_date: String,
    pub category: CostCategory,
    pub amount: Money,
    #[serde(default)]
    pub beneficiary: String,
    pub notes: Option<String>,
    pub recurrence_group: Option<uuid::Uuid>,
}

impl TryFrom<StudentRecord> for Student {
    type Error = BillingError;

    fn try_from(record: StudentRecord) -> Result<Self> {
        Ok(Student {
            id: record.id,
            enrollment_date: parse_optional_date(&record.enrollment_date)?,
            deactivation_date: parse_optional_date(&record.deactivation_date)?,
            fee_exceptions: FeeExceptions::try_from(record.fee_exceptions)?,
            name: record.name,
            email: record.email,
            phone: record.phone,
            monthly_fee: record.monthly_fee,
            active: record.active,
        })
    }
}

impl Student {
    /// convert a wire record, failing closed on garbled dates
    ///
    /// a student whose enrollment or deactivation date cannot be parsed keeps
    /// no enrollment date, so every month evaluates as not applicable.
    /// malformed exception keys are dropped individually.
    pub fn from_record_lenient(record: StudentRecord) -> Student {
        let dates = parse_optional_date(&record.enrollment_date).and_then(|enrolled| {
            parse_optional_date(&record.deactivation_date).map(|deactivated| (enrolled, deactivated))
        });

        let (enrollment_date, deactivation_date) = match dates {
            Ok(dates) => dates,
            Err(err) => {
                warn!("student {} has a garbled date, excluding from billing: {}", record.id, err);
                (None, None)
            }
        };

        let fee_exceptions = record
            .fee_exceptions
            .into_iter()
            .filter_map(|(key, fee)| match YearMonth::parse_key(&key) {
                Ok(month) => Some((month, fee)),
                Err(err) => {
                    warn!("student {}: dropping fee exception: {}", record.id, err);
                    None
                }
            })
            .collect();

        Student {
            id: record.id,
            name: record.name,
            email: record.email,
            phone: record.phone,
            enrollment_date,
            deactivation_date,
            monthly_fee: record.monthly_fee,
            fee_exceptions,
            active: record.active,
        }
    }
}

impl From<&Student> for StudentRecord {
    fn from(student: &Student) -> Self {
        StudentRecord {
            id: student.id,
            name: student.name.clone(),
            email: student.email.clone(),
            phone: student.phone.clone(),
            enrollment_date: student.enrollment_date.map(|d| d.to_string()),
            deactivation_date: student.deactivation_date.map(|d| d.to_string()),
            monthly_fee: student.monthly_fee,
            fee_exceptions: student.fee_exceptions.clone().into(),
            active: student.active,
        }
    }
}

impl TryFrom<PaymentRecord> for Payment {
    type Error = BillingError;

    fn try_from(record: PaymentRecord) -> Result<Self> {
        Ok(Payment {
            id: record.id,
            student_id: record.student_id,
            amount: record.amount,
            date: parse_date(&record.date)?,
            payment_method: record.payment_method,
            concept: record.concept,
            notes: record.notes,
        })
    }
}

impl From<&Payment> for PaymentRecord {
    fn from(payment: &Payment) -> Self {
        PaymentRecord {
            id: payment.id,
            student_id: payment.student_id,
            amount: payment.amount,
            date: payment.date.to_string(),
            payment_method: payment.payment_method,
            concept: payment.concept.clone(),
            notes: payment.notes.clone(),
        }
    }
}

impl TryFrom<CostRecord> for Cost {
    type Error = BillingError;

    fn try_from(record: CostRecord) -> Result<Self> {
        Ok(Cost {
            id: record.id,
            payment_date: parse_date(&record.payment_date)?,
            category: record.category,
            amount: record.amount,
            beneficiary: record.beneficiary,
            notes: record.notes,
            recurrence_group: record.recurrence_group,
        })
    }
}

/// full collection dump as exported from the document database
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub students: Vec<StudentRecord>,
    #[serde(default)]
    pub payments: Vec<PaymentRecord>,
    #[serde(default)]
    pub costs: Vec<CostRecord>,
}

/// typed collections recovered from a snapshot
#[derive(Debug, Clone, Default)]
pub struct LoadedSnapshot {
    pub students: Vec<Student>,
    pub payments: Vec<Payment>,
    pub costs: Vec<Cost>,
}

impl Snapshot {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// convert every record, dropping payments and costs with garbled dates
    pub fn into_lenient(self) -> LoadedSnapshot {
        let students = self.students.into_iter().map(Student::from_record_lenient).collect();

        let payments = self
            .payments
            .into_iter()
            .filter_map(|record| {
                let id = record.id;
                Payment::try_from(record)
                    .map_err(|err| warn!("dropping payment {}: {}", id, err))
                    .ok()
            })
            .collect();

        let costs = self
            .costs
            .into_iter()
            .filter_map(|record| {
                let id = record.id;
                Cost::try_from(record)
                    .map_err(|err| warn!("dropping cost {}: {}", id, err))
                    .ok()
            })
            .collect();

        LoadedSnapshot { students, payments, costs }
    }

    /// convert every record, failing on the first garbled value
    pub fn into_strict(self) -> Result<LoadedSnapshot> {
        Ok(LoadedSnapshot {
            students: self.students.into_iter().map(Student::try_from).collect::<Result<_>>()?,
            payments: self.payments.into_iter().map(Payment::try_from).collect::<Result<_>>()?,
            costs: self.costs.into_iter().map(Cost::try_from).collect::<Result<_>>()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SNAPSHOT: &str = r#"{
        "students": [
            {
                "id": "6f1c2a4e-0d7b-4c53-9a51-2f7a1f0e9b11",
                "name": "Lucía",
                "enrollmentDate": "2025-01-15",
                "monthlyFee": "19",
                "feeExceptions": { "2025-3": "0" }
            },
            {
                "id": "0b9e8f3c-5a8d-4f0c-8d7e-1c2b3a4d5e6f",
                "name": "Pablo",
                "enrollmentDate": "not a date",
                "monthlyFee": 25,
                "feeExceptions": { "april": "0" }
            }
        ],
        "payments": [
            {
                "id": "a3d1e8c7-6b5a-4f3e-9d2c-1b0a9f8e7d6c",
                "studentId": "6f1c2a4e-0d7b-4c53-9a51-2f7a1f0e9b11",
                "amount": "19",
                "date": "2025-03-04T09:30:00.000Z",
                "paymentMethod": "Bizum",
                "concept": "Cuota Marzo"
            },
            {
                "id": "b4e2f9d8-7c6b-4a4f-8e3d-2c1b0a9f8e7d",
                "studentId": "6f1c2a4e-0d7b-4c53-9a51-2f7a1f0e9b11",
                "amount": "19",
                "date": "yesterday",
                "paymentMethod": "Efectivo"
            }
        ]
    }"#;

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2025, 3, 15).unwrap();
        assert_eq!(parse_date("2025-03-15").unwrap(), expected);
        assert_eq!(parse_date("15/03/2025").unwrap(), expected);
        assert_eq!(parse_date("2025-03-15T23:10:00Z").unwrap(), expected);
        assert!(matches!(parse_date("15 March"), Err(BillingError::InvalidDate { .. })));
    }

    #[test]
    fn test_lenient_snapshot_fails_closed() {
        let loaded = Snapshot::from_json(SNAPSHOT).unwrap().into_lenient();

        assert_eq!(loaded.students.len(), 2);
        assert_eq!(loaded.payments.len(), 1);

        let lucia = &loaded.students[0];
        assert_eq!(lucia.fee_exceptions.get(YearMonth::new(2025, 3).unwrap()), Some(Money::ZERO));

        let pablo = &loaded.students[1];
        assert!(pablo.enrollment_date.is_none());
        assert!(pablo.fee_exceptions.is_empty());
        assert_eq!(pablo.monthly_fee, Money::from_major(25));
    }

    #[test]
    fn test_strict_snapshot_rejects_garbled_dates() {
        let result = Snapshot::from_json(SNAPSHOT).unwrap().into_strict();
        assert!(result.is_err());
    }

    #[test]
    fn test_student_record_round_trip() {
        let record: StudentRecord = serde_json::from_value(serde_json::json!({
            "id": "6f1c2a4e-0d7b-4c53-9a51-2f7a1f0e9b11",
            "name": "Lucía",
            "enrollmentDate": "2025-01-15",
            "deactivationDate": "",
            "monthlyFee": "19.50",
            "active": true
        }))
        .unwrap();

        let student = Student::try_from(record).unwrap();
        assert!(student.deactivation_date.is_none());

        let back = StudentRecord::from(&student);
        assert_eq!(back.enrollment_date.as_deref(), Some("2025-01-15"));
        assert_eq!(back.monthly_fee, Money::from_str_exact("19.50").unwrap());
    }

    #[test]
    fn test_sub_cent_wire_amounts_settle_the_month() {
        let record: StudentRecord = serde_json::from_value(serde_json::json!({
            "id": "6f1c2a4e-0d7b-4c53-9a51-2f7a1f0e9b11",
            "name": "Lucía",
            "enrollmentDate": "2025-01-15",
            "monthlyFee": "19.005"
        }))
        .unwrap();
        let student = Student::try_from(record).unwrap();
        assert_eq!(student.monthly_fee, Money::from_minor(1_900));

        let record: PaymentRecord = serde_json::from_value(serde_json::json!({
            "id": "a3d1e8c7-6b5a-4f3e-9d2c-1b0a9f8e7d6c",
            "studentId": "6f1c2a4e-0d7b-4c53-9a51-2f7a1f0e9b11",
            "amount": "19.005",
            "date": "2025-02-10",
            "paymentMethod": "Bizum",
            "concept": "Cuota Febrero 2025"
        }))
        .unwrap();
        let payment = Payment::try_from(record).unwrap();

        let february = YearMonth::new(2025, 1).unwrap();
        let today = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let status = crate::billing::month_status(&student, february, &[payment], today);
        assert!(matches!(status, crate::billing::MonthStatus::Paid { .. }));
    }

    #[test]
    fn test_garbled_deactivation_date_fails_closed() {
        let record: StudentRecord = serde_json::from_value(serde_json::json!({
            "id": "0b9e8f3c-5a8d-4f0c-8d7e-1c2b3a4d5e6f",
            "name": "Marta",
            "enrollmentDate": "2024-09-15",
            "deactivationDate": "30/02/2025",
            "monthlyFee": "30"
        }))
        .unwrap();

        let student = Student::from_record_lenient(record);
        assert!(student.enrollment_date.is_none());
        assert!(student.deactivation_date.is_none());

        let today = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        for month in YearMonth::months_of(2025) {
            assert_eq!(
                crate::billing::month_status(&student, month, &[], today),
                crate::billing::MonthStatus::NotApplicable
            );
        }
    }
}
