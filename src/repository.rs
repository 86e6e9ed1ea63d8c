use std::collections::HashMap;
use tracing::debug;

use crate::errors::{BillingError, Result};
use crate::models::{Cost, Payment, Snapshot, Student};
use crate::types::{CostId, PaymentId, StudentId};

/// data-access seam implemented by the host's storage layer
pub trait SchoolRepository {
    fn list_students(&self) -> Result<Vec<Student>>;

    /// payments, optionally restricted to one calendar year
    fn list_payments(&self, year: Option<i32>) -> Result<Vec<Payment>>;

    fn list_costs(&self, year: Option<i32>) -> Result<Vec<Cost>>;

    fn create_payment(&mut self, payment: Payment) -> Result<()>;

    fn update_payment(&mut self, payment: Payment) -> Result<()>;

    /// removes and returns the payment
    fn delete_payment(&mut self, id: PaymentId) -> Result<Payment>;

    fn update_student(&mut self, student: Student) -> Result<()>;

    fn create_cost(&mut self, cost: Cost) -> Result<()>;

    fn delete_cost(&mut self, id: CostId) -> Result<Cost>;
}

/// hashmap-backed repository, used by tests and snapshot tooling
#[derive(Debug, Clone, Default)]
pub struct InMemoryRepository {
    students: HashMap<StudentId, Student>,
    payments: HashMap<PaymentId, Payment>,
    costs: HashMap<CostId, Cost>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_students(students: impl IntoIterator<Item = Student>) -> Self {
        let mut repo = Self::new();
        for student in students {
            repo.students.insert(student.id, student);
        }
        repo
    }

    /// load a json dump of the collections, failing closed on garbled dates
    pub fn from_snapshot_json(json: &str) -> Result<Self> {
        let loaded = Snapshot::from_json(json)?.into_lenient();
        debug!(
            "loaded snapshot: {} students, {} payments, {} costs",
            loaded.students.len(),
            loaded.payments.len(),
            loaded.costs.len()
        );

        Ok(Self {
            students: loaded.students.into_iter().map(|s| (s.id, s)).collect(),
            payments: loaded.payments.into_iter().map(|p| (p.id, p)).collect(),
            costs: loaded.costs.into_iter().map(|c| (c.id, c)).collect(),
        })
    }

    pub fn insert_student(&mut self, student: Student) -> Result<()> {
        if self.students.contains_key(&student.id) {
            return Err(BillingError::DuplicateId { id: student.id });
        }
        self.students.insert(student.id, student);
        Ok(())
    }
}

impl SchoolRepository for InMemoryRepository {
    fn list_students(&self) -> Result<Vec<Student>> {
        let mut students: Vec<Student> = self.students.values().cloned().collect();
        students.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(students)
    }

    fn list_payments(&self, year: Option<i32>) -> Result<Vec<Payment>> {
        let mut payments: Vec<Payment> = self
            .payments
            .values()
            .filter(|p| year.map_or(true, |y| p.year() == y))
            .cloned()
            .collect();
        payments.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.id.cmp(&b.id)));
        Ok(payments)
    }

    fn list_costs(&self, year: Option<i32>) -> Result<Vec<Cost>> {
        let mut costs: Vec<Cost> = self
            .costs
            .values()
            .filter(|c| year.map_or(true, |y| c.year() == y))
            .cloned()
            .collect();
        costs.sort_by(|a, b| b.payment_date.cmp(&a.payment_date).then_with(|| a.id.cmp(&b.id)));
        Ok(costs)
    }

    fn create_payment(&mut self, payment: Payment) -> Result<()> {
        if self.payments.contains_key(&payment.id) {
            return Err(BillingError::DuplicateId { id: payment.id });
        }
        if !self.students.contains_key(&payment.student_id) {
            return Err(BillingError::StudentNotFound { id: payment.student_id });
        }
        self.payments.insert(payment.id, payment);
        Ok(())
    }

    fn update_payment(&mut self, payment: Payment) -> Result<()> {
        match self.payments.get_mut(&payment.id) {
            Some(existing) => {
                *existing = payment;
                Ok(())
            }
            None => Err(BillingError::PaymentNotFound { id: payment.id }),
        }
    }

    fn delete_payment(&mut self, id: PaymentId) -> Result<Payment> {
        self.payments
            .remove(&id)
            .ok_or(BillingError::PaymentNotFound { id })
    }

    fn update_student(&mut self, student: Student) -> Result<()> {
        match self.students.get_mut(&student.id) {
            Some(existing) => {
                *existing = student;
                Ok(())
            }
            None => Err(BillingError::StudentNotFound { id: student.id }),
        }
    }

    fn create_cost(&mut self, cost: Cost) -> Result<()> {
        if self.costs.contains_key(&cost.id) {
            return Err(BillingError::DuplicateId { id: cost.id });
        }
        self.costs.insert(cost.id, cost);
        Ok(())
    }

    fn delete_cost(&mut self, id: CostId) -> Result<Cost> {
        self.costs.remove(&id).ok_or(BillingError::CostNotFound { id })
    }
}
