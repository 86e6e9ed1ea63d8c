use chrono::NaiveDate;
use hourglass_rs::SafeTimeProvider;
use tracing::{debug, info, warn};

use crate::billing::{month_status, GridQuery, MonthStatus, RosterAggregator, RosterSummary};
use crate::config::BillingConfig;
use crate::dashboard::DashboardSummary;
use crate::decimal::Money;
use crate::errors::{BillingError, Result};
use crate::events::{Event, EventStore};
use crate::models::{Cost, Payment, PaymentDraft, Student};
use crate::repository::SchoolRepository;
use crate::types::{CostId, PaymentId, StudentId, YearMonth};

/// current calendar date according to the provider
pub fn today(time_provider: &SafeTimeProvider) -> NaiveDate {
    time_provider.now().date_naive()
}

/// materialized collections plus the aggregator that derives views from them
///
/// mutations go through the repository and are followed by a full refresh;
/// derived values are never cached.
#[derive(Debug)]
pub struct SchoolState {
    aggregator: RosterAggregator,
    students: Vec<Student>,
    payments: Vec<Payment>,
    costs: Vec<Cost>,
    pub events: EventStore,
}

impl SchoolState {
    pub fn new(config: BillingConfig) -> Self {
        Self {
            aggregator: RosterAggregator::new(config),
            students: Vec::new(),
            payments: Vec::new(),
            costs: Vec::new(),
            events: EventStore::new(),
        }
    }

    /// create and fill from the repository
    pub fn load(repo: &impl SchoolRepository, config: BillingConfig) -> Result<Self> {
        config.validate()?;
        let mut state = Self::new(config);
        state.refresh(repo)?;
        Ok(state)
    }

    /// replace every collection with the repository's current contents
    pub fn refresh(&mut self, repo: &impl SchoolRepository) -> Result<()> {
        self.students = repo.list_students()?;
        self.payments = repo.list_payments(None)?;
        self.costs = repo.list_costs(None)?;

        debug!(
            "state refreshed: {} students, {} payments, {} costs",
            self.students.len(),
            self.payments.len(),
            self.costs.len()
        );
        self.events.emit(Event::StateRefreshed {
            students: self.students.len(),
            payments: self.payments.len(),
            costs: self.costs.len(),
        });

        Ok(())
    }

    pub fn config(&self) -> &BillingConfig {
        self.aggregator.config()
    }

    pub fn students(&self) -> &[Student] {
        &self.students
    }

    pub fn payments(&self) -> &[Payment] {
        &self.payments
    }

    pub fn costs(&self) -> &[Cost] {
        &self.costs
    }

    pub fn student(&self, id: StudentId) -> Result<&Student> {
        self.students
            .iter()
            .find(|s| s.id == id)
            .ok_or(BillingError::StudentNotFound { id })
    }

    pub fn payment(&self, id: PaymentId) -> Result<&Payment> {
        self.payments
            .iter()
            .find(|p| p.id == id)
            .ok_or(BillingError::PaymentNotFound { id })
    }

    /// payments of one student, newest first
    pub fn payments_for(&self, student_id: StudentId) -> Vec<&Payment> {
        let mut payments: Vec<&Payment> =
            self.payments.iter().filter(|p| p.student_id == student_id).collect();
        payments.sort_by(|a, b| b.date.cmp(&a.date));
        payments
    }

    /// validate, store and refresh; returns the stored payment
    pub fn record_payment(
        &mut self,
        repo: &mut impl SchoolRepository,
        draft: PaymentDraft,
        time_provider: &SafeTimeProvider,
    ) -> Result<Payment> {
        draft.validate()?;
        self.student(draft.student_id)?;

        let payment = draft.into_payment();
        repo.create_payment(payment.clone())?;
        self.refresh(repo)?;

        let today = today(time_provider);
        let status_after = self.month_status(payment.student_id, payment.month(), today)?;
        info!(
            "payment {} of {} recorded for student {} ({})",
            payment.id, payment.amount, payment.student_id, payment.month()
        );
        self.events.emit(Event::PaymentRecorded {
            payment_id: payment.id,
            student_id: payment.student_id,
            amount: payment.amount,
            month: payment.month(),
            status_after,
            recorded_on: today,
        });

        Ok(payment)
    }

    pub fn edit_payment(
        &mut self,
        repo: &mut impl SchoolRepository,
        id: PaymentId,
        draft: PaymentDraft,
        time_provider: &SafeTimeProvider,
    ) -> Result<Payment> {
        draft.validate()?;
        self.student(draft.student_id)?;
        let old_amount = self.payment(id)?.amount;

        let payment = draft.into_payment_with_id(id);
        repo.update_payment(payment.clone())?;
        self.refresh(repo)?;

        info!("payment {} updated: {} -> {}", id, old_amount, payment.amount);
        self.events.emit(Event::PaymentUpdated {
            payment_id: id,
            student_id: payment.student_id,
            old_amount,
            new_amount: payment.amount,
            recorded_on: today(time_provider),
        });

        Ok(payment)
    }

    pub fn remove_payment(
        &mut self,
        repo: &mut impl SchoolRepository,
        id: PaymentId,
        time_provider: &SafeTimeProvider,
    ) -> Result<Payment> {
        let removed = repo.delete_payment(id)?;
        self.refresh(repo)?;

        info!("payment {} deleted", id);
        self.events.emit(Event::PaymentDeleted {
            payment_id: id,
            student_id: removed.student_id,
            amount: removed.amount,
            recorded_on: today(time_provider),
        });

        Ok(removed)
    }

    /// set (Some) or clear (None) a month's fee override and persist the student
    ///
    /// an override equal to the standard fee clears the month. returns false
    /// when nothing changed, in which case nothing is persisted.
    pub fn set_fee_exception(
        &mut self,
        repo: &mut impl SchoolRepository,
        student_id: StudentId,
        month: YearMonth,
        fee: Option<Money>,
    ) -> Result<bool> {
        let mut student = self.student(student_id)?.clone();
        if !student.set_fee_exception(month, fee)? {
            return Ok(false);
        }

        let stored = student.fee_exceptions.get(month);
        repo.update_student(student)?;
        self.refresh(repo)?;

        match stored {
            Some(fee) => self.events.emit(Event::FeeExceptionSet { student_id, month, fee }),
            None => self.events.emit(Event::FeeExceptionCleared { student_id, month }),
        }

        Ok(true)
    }

    /// store a cost and its monthly recurrences
    ///
    /// there is no rollback: if the repository rejects one occurrence, the
    /// earlier ones remain stored, state is refreshed, and the error returned.
    pub fn record_cost(
        &mut self,
        repo: &mut impl SchoolRepository,
        cost: Cost,
        recurring_months: u32,
    ) -> Result<Vec<Cost>> {
        if cost.amount.is_negative() {
            return Err(BillingError::InvalidCostAmount { amount: cost.amount });
        }

        let costs = cost.expand_recurrence(recurring_months);
        let stored = costs.iter().try_for_each(|cost| repo.create_cost(cost.clone()));

        self.refresh(repo)?;
        if let Err(err) = stored {
            warn!("recurring cost only partially stored: {}", err);
            return Err(err);
        }

        if let Some(first) = costs.first() {
            self.events.emit(Event::CostRecorded {
                cost_id: first.id,
                category: first.category,
                amount: first.amount,
                occurrences: costs.len() as u32,
            });
        }

        Ok(costs)
    }

    pub fn remove_cost(&mut self, repo: &mut impl SchoolRepository, id: CostId) -> Result<Cost> {
        let removed = repo.delete_cost(id)?;
        self.refresh(repo)?;
        self.events.emit(Event::CostDeleted { cost_id: id });
        Ok(removed)
    }

    /// status of one cell as of `today`
    pub fn month_status(&self, student_id: StudentId, month: YearMonth, today: NaiveDate) -> Result<MonthStatus> {
        let student = self.student(student_id)?;
        Ok(month_status(student, month, &self.payments, today))
    }

    pub fn billing_summary(&self, query: &GridQuery, time_provider: &SafeTimeProvider) -> RosterSummary {
        self.aggregator
            .summarize(&self.students, &self.payments, query, today(time_provider))
    }

    pub fn dashboard(&self, year: i32, time_provider: &SafeTimeProvider) -> DashboardSummary {
        DashboardSummary::build(
            &self.aggregator,
            &self.students,
            &self.payments,
            &self.costs,
            year,
            today(time_provider),
        )
    }
}
