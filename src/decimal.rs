use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub, SubAssign};
use std::str::FromStr;

/// euro cents
const CENT_SCALE: u32 = 2;

fn to_cents(d: Decimal) -> Decimal {
    d.round_dp(CENT_SCALE)
}

/// amount in euros, kept at cent precision
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(from = "Decimal", into = "Decimal")]
pub struct Money(Decimal);

impl Money {
    pub const ZERO: Money = Money(Decimal::ZERO);
    pub const ONE: Money = Money(Decimal::ONE);
    pub const CENT: Money = Money(Decimal::from_parts(1, 0, 0, false, CENT_SCALE));

    pub fn from_decimal(d: Decimal) -> Self {
        Money(to_cents(d))
    }

    /// parse a plain decimal string such as "19.50"
    pub fn from_str_exact(s: &str) -> Result<Self, rust_decimal::Error> {
        Decimal::from_str(s).map(Money::from_decimal)
    }

    /// whole euros
    pub fn from_major(euros: i64) -> Self {
        Money(Decimal::from(euros))
    }

    pub fn from_minor(cents: i64) -> Self {
        Money(Decimal::new(cents, CENT_SCALE))
    }

    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    pub fn round_dp(&self, dp: u32) -> Self {
        Money(self.0.round_dp(dp))
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// strictly greater than zero
    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }

    /// what is still owed once `paid` is applied, never below zero
    pub fn saturating_sub(self, paid: Self) -> Self {
        if paid >= self {
            Money::ZERO
        } else {
            self - paid
        }
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Money {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Money::from_str_exact(s)
    }
}

impl From<Decimal> for Money {
    fn from(d: Decimal) -> Self {
        Money::from_decimal(d)
    }
}

impl From<Money> for Decimal {
    fn from(m: Money) -> Self {
        m.0
    }
}

macro_rules! cent_arithmetic {
    ($trait:ident, $method:ident, $assign_trait:ident, $assign_method:ident, $op:tt) => {
        impl $trait for Money {
            type Output = Money;

            fn $method(self, rhs: Money) -> Money {
                Money(to_cents(self.0 $op rhs.0))
            }
        }

        impl $assign_trait for Money {
            fn $assign_method(&mut self, rhs: Money) {
                *self = *self $op rhs;
            }
        }
    };
}

cent_arithmetic!(Add, add, AddAssign, add_assign, +);
cent_arithmetic!(Sub, sub, SubAssign, sub_assign, -);

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Money {
        iter.copied().sum()
    }
}

/// share of a whole, stored as a fraction (0.833 for 83.3%)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub struct Rate(Decimal);

impl Rate {
    pub const ZERO: Rate = Rate(Decimal::ZERO);
    pub const ONE: Rate = Rate(Decimal::ONE);

    pub fn from_decimal(d: Decimal) -> Self {
        Rate(d)
    }

    /// `part / whole`, None when the whole is zero
    pub fn ratio(part: Money, whole: Money) -> Option<Self> {
        part.as_decimal().checked_div(whole.as_decimal()).map(Rate)
    }

    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    pub fn as_percentage(&self) -> Decimal {
        self.0 * Decimal::ONE_HUNDRED
    }
}

/// one decimal place, halves away from zero, e.g. "83.3%"
impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shown = self
            .as_percentage()
            .round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero);
        write!(f, "{}%", shown)
    }
}
