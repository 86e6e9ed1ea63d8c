use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::billing::MonthStatus;
use crate::decimal::Money;
use crate::types::{CostCategory, CostId, PaymentId, StudentId, YearMonth};

/// all events that can be emitted by the school state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    // payment events
    PaymentRecorded {
        payment_id: PaymentId,
        student_id: StudentId,
        amount: Money,
        month: YearMonth,
        status_after: MonthStatus,
        recorded_on: NaiveDate,
    },
    PaymentUpdated {
        payment_id: PaymentId,
        student_id: StudentId,
        old_amount: Money,
        new_amount: Money,
        recorded_on: NaiveDate,
    },
    PaymentDeleted {
        payment_id: PaymentId,
        student_id: StudentId,
        amount: Money,
        recorded_on: NaiveDate,
    },

    // fee exception events
    FeeExceptionSet {
        student_id: StudentId,
        month: YearMonth,
        fee: Money,
    },
    FeeExceptionCleared {
        student_id: StudentId,
        month: YearMonth,
    },

    // cost events
    CostRecorded {
        cost_id: CostId,
        category: CostCategory,
        amount: Money,
        occurrences: u32,
    },
    CostDeleted {
        cost_id: CostId,
    },

    // sync events
    StateRefreshed {
        students: usize,
        payments: usize,
        costs: usize,
    },
}

impl Event {
    /// student the event concerns, if any
    pub fn student_id(&self) -> Option<StudentId> {
        match self {
            Event::PaymentRecorded { student_id, .. }
            | Event::PaymentUpdated { student_id, .. }
            | Event::PaymentDeleted { student_id, .. }
            | Event::FeeExceptionSet { student_id, .. }
            | Event::FeeExceptionCleared { student_id, .. } => Some(*student_id),
            Event::CostRecorded { .. } | Event::CostDeleted { .. } | Event::StateRefreshed { .. } => None,
        }
    }
}

/// events raised by state mutations, drained by the host after each action
#[derive(Debug, Default)]
pub struct EventStore {
    pending: Vec<Event>,
}

impl EventStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, event: Event) {
        trace!("event: {:?}", event);
        self.pending.push(event);
    }

    /// drain everything emitted since the last call
    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.pending)
    }

    pub fn events(&self) -> &[Event] {
        &self.pending
    }

    /// pending events touching one student, oldest first
    pub fn for_student(&self, student_id: StudentId) -> impl Iterator<Item = &Event> + '_ {
        self.pending
            .iter()
            .filter(move |event| event.student_id() == Some(student_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_store_drains_and_filters() {
        let ana = Uuid::new_v4();
        let month = YearMonth::new(2025, 3).unwrap();

        let mut store = EventStore::new();
        store.emit(Event::FeeExceptionSet { student_id: ana, month, fee: Money::ZERO });
        store.emit(Event::CostDeleted { cost_id: Uuid::new_v4() });
        store.emit(Event::FeeExceptionCleared { student_id: Uuid::new_v4(), month });

        assert_eq!(store.for_student(ana).count(), 1);
        assert_eq!(store.take_events().len(), 3);
        assert!(store.events().is_empty());
    }
}
