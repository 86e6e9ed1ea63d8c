pub mod cost;
pub mod payment;
pub mod records;
pub mod student;

pub use cost::Cost;
pub use payment::{Payment, PaymentDraft};
pub use records::{
    parse_date, CostRecord, LoadedSnapshot, PaymentRecord, Snapshot, StudentRecord,
};
pub use student::{FeeExceptions, Student, StudentBuilder};
