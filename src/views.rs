/// serializable views handed to the ui layer
use serde::{Deserialize, Serialize};

use crate::billing::{RosterSummary, StatusTone};
use crate::config::BillingConfig;
use crate::dashboard::DashboardSummary;
use crate::decimal::Money;
use crate::format::{format_currency_with, month_name, short_month_name};
use crate::types::StudentId;

/// billing grid ready to render
#[derive(Debug, Serialize, Deserialize)]
pub struct BillingGridView {
    pub year: i32,
    pub months: Vec<String>,
    pub rows: Vec<GridRowView>,
    pub totals: TotalsView,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GridRowView {
    pub student_id: StudentId,
    pub name: String,
    pub monthly_fee: String,
    pub total_paid: String,
    pub cells: Vec<CellView>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CellView {
    pub month_index: u32,
    pub text: String,
    pub tone: StatusTone,
    pub actionable: bool,
    pub has_exception: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TotalsView {
    pub revenue: String,
    pub pending_debt: String,
    pub collection_rate: String,
}

/// dashboard cards and chart series
#[derive(Debug, Serialize, Deserialize)]
pub struct DashboardView {
    pub year: i32,
    pub active_students: usize,
    pub revenue: String,
    pub costs: String,
    pub net_result: String,
    pub collection_rate: String,
    pub chart: Vec<ChartPoint>,
    pub costs_by_category: Vec<LabeledAmount>,
    pub revenue_by_method: Vec<LabeledAmount>,
    pub unpaid_dues: Vec<LabeledAmount>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChartPoint {
    pub label: String,
    pub revenue: Money,
    pub costs: Money,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LabeledAmount {
    pub label: String,
    pub amount: Money,
    pub text: String,
}

fn money_text(config: &BillingConfig, amount: Money) -> String {
    format_currency_with(&config.currency, amount, config.currency.default_decimals)
}

impl BillingGridView {
    pub fn from_summary(summary: &RosterSummary, config: &BillingConfig) -> Self {
        BillingGridView {
            year: summary.year,
            months: (0..12).filter_map(month_name).map(str::to_string).collect(),
            rows: summary
                .rows
                .iter()
                .map(|row| GridRowView {
                    student_id: row.student_id,
                    name: row.name.clone(),
                    monthly_fee: money_text(config, row.monthly_fee),
                    total_paid: money_text(config, row.total_paid),
                    cells: row
                        .cells
                        .iter()
                        .map(|cell| CellView {
                            month_index: cell.month.month0,
                            text: cell.status.label(config),
                            tone: cell.status.tone(),
                            actionable: cell.status.is_actionable(),
                            has_exception: cell.has_exception,
                        })
                        .collect(),
                })
                .collect(),
            totals: TotalsView {
                revenue: money_text(config, summary.total_revenue),
                pending_debt: money_text(config, summary.total_pending_debt),
                collection_rate: summary.collection_rate.to_string(),
            },
        }
    }

    /// convert to pretty-printed json string
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl DashboardView {
    pub fn from_summary(summary: &DashboardSummary, config: &BillingConfig) -> Self {
        let labeled = |label: &str, amount: Money| LabeledAmount {
            label: label.to_string(),
            amount,
            text: money_text(config, amount),
        };

        DashboardView {
            year: summary.year,
            active_students: summary.active_students,
            revenue: money_text(config, summary.total_revenue),
            costs: money_text(config, summary.total_costs),
            net_result: money_text(config, summary.net_result),
            collection_rate: summary.collection_rate.to_string(),
            chart: summary
                .monthly
                .iter()
                .map(|m| ChartPoint {
                    label: short_month_name(m.month.month0).unwrap_or_default().to_string(),
                    revenue: m.revenue,
                    costs: m.costs,
                })
                .collect(),
            costs_by_category: summary
                .costs_by_category
                .iter()
                .map(|(category, amount)| labeled(category.label(), *amount))
                .collect(),
            revenue_by_method: summary
                .revenue_by_method
                .iter()
                .map(|(method, amount)| labeled(method.label(), *amount))
                .collect(),
            unpaid_dues: summary
                .unpaid_dues
                .iter()
                .map(|debtor| labeled(&debtor.name, debtor.debt))
                .collect(),
        }
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
