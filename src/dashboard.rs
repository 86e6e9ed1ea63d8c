use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use tracing::info;

use crate::billing::{DebtorEntry, RosterAggregator};
use crate::decimal::{Money, Rate};
use crate::models::{Cost, Payment, Student};
use crate::types::{CostCategory, PaymentMethod, StudentId, YearMonth};

/// income and expenses of one month, for the dashboard chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyTotals {
    pub month: YearMonth,
    pub revenue: Money,
    pub costs: Money,
}

impl MonthlyTotals {
    pub fn net(&self) -> Money {
        self.revenue - self.costs
    }
}

/// yearly figures shown on the dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub year: i32,
    pub active_students: usize,
    pub total_revenue: Money,
    pub total_costs: Money,
    pub net_result: Money,
    pub monthly: Vec<MonthlyTotals>,
    pub costs_by_category: Vec<(CostCategory, Money)>,
    pub revenue_by_method: Vec<(PaymentMethod, Money)>,
    pub total_pending_debt: Money,
    pub unpaid_dues: Vec<DebtorEntry>,
    pub collection_rate: Rate,
}

impl DashboardSummary {
    /// build the dashboard for a year as of `today`
    pub fn build(
        aggregator: &RosterAggregator,
        students: &[Student],
        payments: &[Payment],
        costs: &[Cost],
        year: i32,
        today: NaiveDate,
    ) -> Self {
        let known: HashSet<StudentId> = students.iter().map(|s| s.id).collect();
        let year_payments: Vec<&Payment> = payments
            .iter()
            .filter(|p| p.year() == year && known.contains(&p.student_id))
            .collect();
        let year_costs: Vec<&Cost> = costs.iter().filter(|c| c.year() == year).collect();

        let monthly: Vec<MonthlyTotals> = YearMonth::months_of(year)
            .map(|month| MonthlyTotals {
                month,
                revenue: year_payments
                    .iter()
                    .filter(|p| p.month() == month)
                    .map(|p| p.amount)
                    .sum(),
                costs: year_costs
                    .iter()
                    .filter(|c| c.month() == month)
                    .map(|c| c.amount)
                    .sum(),
            })
            .collect();

        let mut by_category: BTreeMap<CostCategory, Money> = BTreeMap::new();
        for cost in &year_costs {
            *by_category.entry(cost.category).or_default() += cost.amount;
        }
        let mut costs_by_category: Vec<(CostCategory, Money)> = by_category.into_iter().collect();
        costs_by_category.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

        let revenue_by_method: Vec<(PaymentMethod, Money)> = PaymentMethod::ALL
            .iter()
            .map(|&method| {
                let total = year_payments
                    .iter()
                    .filter(|p| p.payment_method == method)
                    .map(|p| p.amount)
                    .sum();
                (method, total)
            })
            .collect();

        let total_revenue = aggregator.total_revenue(students, payments, year);
        let total_costs: Money = year_costs.iter().map(|c| c.amount).sum();
        let unpaid_dues = aggregator.debtors(students, payments, year, today);
        let total_pending_debt: Money = unpaid_dues.iter().map(|d| d.debt).sum();
        let active_students = students.iter().filter(|s| s.active).count();

        info!(
            "dashboard {}: revenue {}, costs {}, {} active students, {} with unpaid dues",
            year,
            total_revenue,
            total_costs,
            active_students,
            unpaid_dues.len()
        );

        Self {
            year,
            active_students,
            total_revenue,
            total_costs,
            net_result: total_revenue - total_costs,
            monthly,
            costs_by_category,
            revenue_by_method,
            total_pending_debt,
            unpaid_dues,
            collection_rate: RosterAggregator::collection_rate(total_revenue, total_pending_debt),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PaymentDraft;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn student(name: &str, fee: i64) -> Student {
        Student::builder()
            .name(name)
            .monthly_fee(Money::from_major(fee))
            .enrolled_on(date(2024, 9, 1))
            .build()
            .unwrap()
    }

    fn pay(student_id: StudentId, amount: i64, on: NaiveDate, method: PaymentMethod) -> Payment {
        PaymentDraft {
            student_id,
            amount: Money::from_major(amount),
            date: on,
            payment_method: method,
            concept: "Cuota".to_string(),
            notes: None,
        }
        .into_payment()
    }

    #[test]
    fn test_dashboard_totals() {
        let ana = student("Ana", 25);
        let bea = student("Bea", 30);
        let payments = vec![
            pay(ana.id, 25, date(2025, 1, 3), PaymentMethod::Bizum),
            pay(bea.id, 30, date(2025, 1, 5), PaymentMethod::Cash),
            pay(bea.id, 30, date(2025, 2, 5), PaymentMethod::Cash),
            pay(Uuid::new_v4(), 99, date(2025, 2, 5), PaymentMethod::Cash),
        ];
        let mut costs = Cost::new(date(2025, 1, 1), CostCategory::Rent, Money::from_major(50), "Local")
            .unwrap()
            .expand_recurrence(1);
        costs.push(
            Cost::new(date(2025, 2, 10), CostCategory::Supplies, Money::from_major(15), "Tienda").unwrap(),
        );

        let summary = DashboardSummary::build(
            &RosterAggregator::default(),
            &[ana, bea],
            &payments,
            &costs,
            2025,
            date(2025, 2, 20),
        );

        assert_eq!(summary.total_revenue, Money::from_major(85));
        assert_eq!(summary.total_costs, Money::from_major(115));
        assert_eq!(summary.net_result, Money::from_major(-30));
        assert_eq!(summary.monthly.len(), 12);
        assert_eq!(summary.monthly[0].revenue, Money::from_major(55));
        assert_eq!(summary.monthly[1].costs, Money::from_major(65));
        assert_eq!(summary.monthly[1].net(), Money::from_major(-35));
        assert_eq!(summary.costs_by_category[0], (CostCategory::Rent, Money::from_major(100)));
        assert_eq!(summary.revenue_by_method[0], (PaymentMethod::Cash, Money::from_major(60)));
        assert_eq!(summary.revenue_by_method[3], (PaymentMethod::Bizum, Money::from_major(25)));

        // ana owes february
        assert_eq!(summary.total_pending_debt, Money::from_major(25));
        assert_eq!(summary.unpaid_dues.len(), 1);
        assert_eq!(summary.collection_rate.as_percentage().round_dp(2), dec!(77.27));
        assert_eq!(summary.active_students, 2);
    }
}
