use crate::decimal::Money;
use crate::errors::Result;
use crate::models::Student;
use crate::types::YearMonth;

/// fee expected from a student for one month
///
/// an exception for the month wins, including a zero exception (exempt);
/// otherwise the standard monthly fee applies.
pub fn resolve_expected_fee(student: &Student, month: YearMonth) -> Money {
    student
        .fee_exceptions
        .get(month)
        .unwrap_or(student.monthly_fee)
}

/// same as [`resolve_expected_fee`], addressed by year and zero-based month index
pub fn resolve_expected_fee_for(student: &Student, year: i32, month_index: u32) -> Result<Money> {
    Ok(resolve_expected_fee(student, YearMonth::new(year, month_index)?))
}

/// true when the month carries an override that differs from the standard fee
pub fn has_fee_exception(student: &Student, month: YearMonth) -> bool {
    student
        .fee_exceptions
        .get(month)
        .is_some_and(|fee| fee != student.monthly_fee)
}
