use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

use crate::billing::exceptions::{has_fee_exception, resolve_expected_fee};
use crate::billing::status::{is_billable_month, MonthStatus, PaymentIndex};
use crate::config::{BillingConfig, DebtHorizon};
use crate::decimal::{Money, Rate};
use crate::models::{Payment, Student};
use crate::types::{StudentId, YearMonth};

/// filter applied to the billing grid
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridQuery {
    pub year: i32,
    /// case-insensitive substring of the student name
    pub search: Option<String>,
}

impl GridQuery {
    pub fn year(year: i32) -> Self {
        Self { year, search: None }
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    fn matches(&self, student: &Student) -> bool {
        match self.search.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(term) => student.name.to_lowercase().contains(&term.to_lowercase()),
        }
    }
}

/// one cell of the billing grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridCell {
    pub month: YearMonth,
    pub status: MonthStatus,
    /// month carries a fee override
    pub has_exception: bool,
}

/// one student's row in the billing grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentRow {
    pub student_id: StudentId,
    pub name: String,
    pub monthly_fee: Money,
    pub cells: Vec<GridCell>,
    pub total_paid: Money,
}

/// student owing money for the year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebtorEntry {
    pub student_id: StudentId,
    pub name: String,
    pub debt: Money,
    pub open_months: Vec<YearMonth>,
}

/// everything the billing view and the unpaid-dues report need for a year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterSummary {
    pub year: i32,
    pub rows: Vec<StudentRow>,
    pub total_revenue: Money,
    pub total_pending_debt: Money,
    pub debtors: Vec<DebtorEntry>,
    pub collection_rate: Rate,
}

/// aggregates monthly statuses over the whole roster
#[derive(Debug, Clone, Default)]
pub struct RosterAggregator {
    config: BillingConfig,
}

impl RosterAggregator {
    pub fn new(config: BillingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BillingConfig {
        &self.config
    }

    /// twelve cells per matching student, rows sorted by name
    pub fn status_grid(
        &self,
        students: &[Student],
        payments: &[Payment],
        query: &GridQuery,
        today: NaiveDate,
    ) -> Vec<StudentRow> {
        let index = PaymentIndex::build(payments);
        self.grid_with_index(students, &index, query, today)
    }

    fn grid_with_index(
        &self,
        students: &[Student],
        index: &PaymentIndex,
        query: &GridQuery,
        today: NaiveDate,
    ) -> Vec<StudentRow> {
        let mut rows: Vec<StudentRow> = students
            .iter()
            .filter(|student| query.matches(student))
            .map(|student| {
                let cells: Vec<GridCell> = YearMonth::months_of(query.year)
                    .map(|month| GridCell {
                        month,
                        status: index.month_status(student, month, today),
                        has_exception: has_fee_exception(student, month),
                    })
                    .collect();
                let total_paid = cells.iter().map(|cell| cell.status.paid()).sum();

                StudentRow {
                    student_id: student.id,
                    name: student.name.clone(),
                    monthly_fee: student.monthly_fee,
                    cells,
                    total_paid,
                }
            })
            .collect();

        rows.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        rows
    }

    /// sum of payments dated within the year, skipping unknown students
    pub fn total_revenue(&self, students: &[Student], payments: &[Payment], year: i32) -> Money {
        let known: HashSet<StudentId> = students.iter().map(|s| s.id).collect();

        let (revenue, dangling) = payments
            .iter()
            .filter(|p| p.year() == year)
            .fold((Money::ZERO, 0usize), |(total, dangling), p| {
                if known.contains(&p.student_id) {
                    (total + p.amount, dangling)
                } else {
                    (total, dangling + 1)
                }
            });

        if dangling > 0 {
            debug!("skipped {} payments in {} with no matching student", dangling, year);
        }

        revenue
    }

    /// months of `year` that count towards debt as of `today`
    pub fn debt_months(&self, year: i32, today: NaiveDate) -> Vec<YearMonth> {
        let current = YearMonth::from_date(today);

        if year > today.year() {
            return Vec::new();
        }
        if year < today.year() {
            return YearMonth::months_of(year).collect();
        }

        let through = match self.config.debt_horizon {
            DebtHorizon::ThroughCurrentMonth => current.month0 + 1,
            DebtHorizon::ThroughPreviousMonth => current.month0,
        };
        YearMonth::months_of(year).take(through as usize).collect()
    }

    /// outstanding debt of one student for the year
    pub fn student_debt(
        &self,
        student: &Student,
        payments: &[Payment],
        year: i32,
        today: NaiveDate,
    ) -> Money {
        let index = PaymentIndex::build(payments);
        self.debt_with_index(student, &index, &self.debt_months(year, today)).0
    }

    fn debt_with_index(
        &self,
        student: &Student,
        index: &PaymentIndex,
        months: &[YearMonth],
    ) -> (Money, Vec<YearMonth>) {
        if student.monthly_fee.is_zero() {
            return (Money::ZERO, Vec::new());
        }

        let mut debt = Money::ZERO;
        let mut open_months = Vec::new();

        for &month in months.iter().filter(|&&month| is_billable_month(student, month)) {
            let owed = resolve_expected_fee(student, month).saturating_sub(index.paid(student.id, month));
            if owed.is_positive() {
                debt += owed;
                open_months.push(month);
            }
        }

        (debt, open_months)
    }

    /// students owing money, largest debt first
    pub fn debtors(
        &self,
        students: &[Student],
        payments: &[Payment],
        year: i32,
        today: NaiveDate,
    ) -> Vec<DebtorEntry> {
        let index = PaymentIndex::build(payments);
        self.debtors_with_index(students, &index, year, today)
    }

    fn debtors_with_index(
        &self,
        students: &[Student],
        index: &PaymentIndex,
        year: i32,
        today: NaiveDate,
    ) -> Vec<DebtorEntry> {
        let months = self.debt_months(year, today);

        let mut debtors: Vec<DebtorEntry> = students
            .iter()
            .filter_map(|student| {
                let (debt, open_months) = self.debt_with_index(student, index, &months);
                debt.is_positive().then(|| DebtorEntry {
                    student_id: student.id,
                    name: student.name.clone(),
                    debt,
                    open_months,
                })
            })
            .collect();

        debtors.sort_by(|a, b| b.debt.cmp(&a.debt).then_with(|| a.name.cmp(&b.name)));
        debtors
    }

    /// revenue / (revenue + pending debt), 100% when both are zero
    pub fn collection_rate(total_revenue: Money, total_pending_debt: Money) -> Rate {
        Rate::ratio(total_revenue, total_revenue + total_pending_debt).unwrap_or(Rate::ONE)
    }

    /// grid, revenue, debtors and collection rate in one pass over the payments
    pub fn summarize(
        &self,
        students: &[Student],
        payments: &[Payment],
        query: &GridQuery,
        today: NaiveDate,
    ) -> RosterSummary {
        let index = PaymentIndex::build(payments);

        let rows = self.grid_with_index(students, &index, query, today);
        let total_revenue = self.total_revenue(students, payments, query.year);
        let debtors = self.debtors_with_index(students, &index, query.year, today);
        let total_pending_debt: Money = debtors.iter().map(|d| d.debt).sum();
        let collection_rate = Self::collection_rate(total_revenue, total_pending_debt);

        debug!(
            "roster {}: {} rows, revenue {}, pending {}, {} debtors, collection {}",
            query.year,
            rows.len(),
            total_revenue,
            total_pending_debt,
            debtors.len(),
            collection_rate
        );

        RosterSummary {
            year: query.year,
            rows,
            total_revenue,
            total_pending_debt,
            debtors,
            collection_rate,
        }
    }
}
