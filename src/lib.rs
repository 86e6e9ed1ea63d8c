pub mod billing;
pub mod config;
pub mod dashboard;
pub mod decimal;
pub mod errors;
pub mod events;
pub mod format;
pub mod models;
pub mod repository;
pub mod state;
pub mod types;
pub mod views;

// re-export key types
pub use billing::{
    month_status, month_status_for, resolve_expected_fee, resolve_expected_fee_for, DebtorEntry,
    GridQuery, MonthStatus, RosterAggregator, RosterSummary, StatusTone,
};
pub use config::{BillingConfig, CurrencyFormat, DebtHorizon, SymbolPosition};
pub use dashboard::DashboardSummary;
pub use decimal::{Money, Rate};
pub use errors::{BillingError, Result};
pub use events::{Event, EventStore};
pub use format::{format_currency, format_date, month_name};
pub use models::{Cost, FeeExceptions, Payment, PaymentDraft, Snapshot, Student};
pub use repository::{InMemoryRepository, SchoolRepository};
pub use state::SchoolState;
pub use types::{CostCategory, PaymentMethod, StudentId, YearMonth};
pub use views::{BillingGridView, DashboardView};

// re-export external dependencies that users will need
pub use chrono;
pub use hourglass_rs::{SafeTimeProvider, TimeSource};
pub use rust_decimal::Decimal;
pub use uuid::Uuid;
