pub mod exceptions;
pub mod roster;
pub mod status;

pub use exceptions::{has_fee_exception, resolve_expected_fee, resolve_expected_fee_for};
pub use roster::{DebtorEntry, GridCell, GridQuery, RosterAggregator, RosterSummary, StudentRow};
pub use status::{
    classify, is_billable_month, month_status, month_status_for, paid_for_month, MonthStatus,
    PaymentIndex, StatusTone,
};
