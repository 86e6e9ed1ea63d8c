use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::decimal::Money;
use crate::errors::{BillingError, Result};
use crate::types::{CostCategory, CostId, YearMonth};

/// expense paid by the school
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cost {
    pub id: CostId,
    pub payment_date: NaiveDate,
    pub category: CostCategory,
    pub amount: Money,
    pub beneficiary: String,
    pub notes: Option<String>,
    /// shared by every cost generated from one recurring entry
    pub recurrence_group: Option<Uuid>,
}

impl Cost {
    pub fn new(
        payment_date: NaiveDate,
        category: CostCategory,
        amount: Money,
        beneficiary: impl Into<String>,
    ) -> Result<Self> {
        if amount.is_negative() {
            return Err(BillingError::InvalidCostAmount { amount });
        }

        Ok(Self {
            id: Uuid::new_v4(),
            payment_date,
            category,
            amount,
            beneficiary: beneficiary.into(),
            notes: None,
            recurrence_group: None,
        })
    }

    pub fn year(&self) -> i32 {
        self.payment_date.year()
    }

    pub fn month(&self) -> YearMonth {
        YearMonth::from_date(self.payment_date)
    }

    /// the cost followed by `months` monthly siblings
    ///
    /// siblings keep the day of month, clamped to shorter months, and all
    /// records share one recurrence group. `months == 0` leaves the cost
    /// standalone.
    pub fn expand_recurrence(mut self, months: u32) -> Vec<Cost> {
        if months == 0 {
            return vec![self];
        }

        let group = self.recurrence_group.unwrap_or_else(Uuid::new_v4);
        self.recurrence_group = Some(group);

        let day = self.payment_date.day();
        let start = self.month();

        let siblings: Vec<Cost> = (1..=months)
            .filter_map(|offset| start.plus_months(offset).clamped_day(day))
            .map(|payment_date| Cost {
                id: Uuid::new_v4(),
                payment_date,
                ..self.clone()
            })
            .collect();

        let mut costs = Vec::with_capacity(siblings.len() + 1);
        costs.push(self);
        costs.extend(siblings);
        costs
    }
}
