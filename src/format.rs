use chrono::{Datelike, NaiveDate};
use rust_decimal::RoundingStrategy;

use crate::config::{CurrencyFormat, SymbolPosition};
use crate::decimal::Money;

const MONTH_NAMES: [&str; 12] = [
    "Enero",
    "Febrero",
    "Marzo",
    "Abril",
    "Mayo",
    "Junio",
    "Julio",
    "Agosto",
    "Septiembre",
    "Octubre",
    "Noviembre",
    "Diciembre",
];

/// format an amount in euros, e.g. `format_currency(12056, 2)` -> "12.056,00€"
pub fn format_currency(amount: Money, decimals: u32) -> String {
    format_currency_with(&CurrencyFormat::euro(), amount, decimals)
}

/// format an amount with an explicit currency format
pub fn format_currency_with(format: &CurrencyFormat, amount: Money, decimals: u32) -> String {
    let rounded = amount
        .as_decimal()
        .round_dp_with_strategy(decimals, RoundingStrategy::MidpointAwayFromZero);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();

    let digits = format!("{:.*}", decimals as usize, rounded.abs());
    let (integer, fraction) = match digits.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (digits.as_str(), None),
    };

    let mut number = group_thousands(integer, format.thousands_separator);
    if let Some(fraction) = fraction {
        number.push(format.decimal_separator);
        number.push_str(fraction);
    }

    let sign = if negative { "-" } else { "" };
    match format.symbol_position {
        SymbolPosition::Suffix => format!("{}{}{}", sign, number, format.symbol),
        SymbolPosition::Prefix => format!("{}{}{}", sign, format.symbol, number),
    }
}

fn group_thousands(integer: &str, separator: char) -> String {
    let len = integer.len();
    let mut grouped = String::with_capacity(len + len / 3);

    for (i, digit) in integer.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            grouped.push(separator);
        }
        grouped.push(digit);
    }

    grouped
}

/// "15/03/2025"
pub fn format_date(date: NaiveDate) -> String {
    format!("{:02}/{:02}/{}", date.day(), date.month(), date.year())
}

/// spanish month name for a zero-based month index
pub fn month_name(month0: u32) -> Option<&'static str> {
    MONTH_NAMES.get(month0 as usize).copied()
}

/// three-letter month label for chart axes
pub fn short_month_name(month0: u32) -> Option<&'static str> {
    month_name(month0).map(|name| &name[..3])
}
