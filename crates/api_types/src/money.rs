use std::{
    fmt,
    ops::{Add, AddAssign, Neg, Sub, SubAssign},
    str::FromStr,
};

use serde::{Deserialize, Serialize};

/// Signed money amount represented as **integer cents** (centavos).
///
/// The Organizze API exchanges every amount as an integer number of minor
/// units (`amount_cents`, `balance_cents`, ...); this type keeps that exact
/// representation in memory and converts to/from decimal reais only at the
/// edges, so no floating-point drift accumulates.
///
/// The value is signed:
/// - positive = income / increase
/// - negative = expense / decrease
///
/// # Examples
///
/// ```rust
/// use api_types::Money;
///
/// let amount = Money::new(12_34);
/// assert_eq!(amount.cents(), 1234);
/// assert_eq!(amount.major(), 12.34);
/// assert_eq!(amount.to_string(), "R$ 12.34");
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
#[repr(transparent)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    /// Creates a new amount from integer cents.
    #[must_use]
    pub const fn new(cents: i64) -> Self {
        Self(cents)
    }

    /// Converts a decimal major-unit amount (reais) to cents.
    ///
    /// Rounds to the nearest cent, ties away from zero, so that
    /// `Money::from_major(m.major()) == m` holds for every cent-representable
    /// amount.
    #[must_use]
    pub fn from_major(reais: f64) -> Self {
        Self((reais * 100.0).round() as i64)
    }

    /// Returns the raw value in cents.
    #[must_use]
    pub const fn cents(self) -> i64 {
        self.0
    }

    /// Returns the decimal major-unit value (reais).
    #[must_use]
    pub fn major(self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Returns `true` if the amount is 0.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Returns `true` if the amount is positive.
    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Returns `true` if the amount is negative.
    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Absolute value.
    #[must_use]
    pub const fn abs(self) -> Self {
        Self(self.0.abs())
    }

    /// Checked addition (returns `None` on overflow).
    #[must_use]
    pub fn checked_add(self, rhs: Money) -> Option<Money> {
        self.0.checked_add(rhs.0).map(Money)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let reais = abs / 100;
        let cents = abs % 100;
        write!(f, "{sign}R$ {reais}.{cents:02}")
    }
}

impl From<i64> for Money {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<Money> for i64 {
    fn from(value: Money) -> Self {
        value.0
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Self::Output {
        Money(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Self::Output {
        Money(self.0 - rhs.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Money) {
        self.0 -= rhs.0;
    }
}

impl Neg for Money {
    type Output = Money;

    fn neg(self) -> Self::Output {
        Money(-self.0)
    }
}

impl FromStr for Money {
    type Err = ParseMoneyError;

    /// Parses a decimal string into cents.
    ///
    /// Accepts `.` or `,` as decimal separator and an optional leading
    /// `+`/`-`. Rejects more than 2 fractional digits.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ParseMoneyError::Empty);
        }

        let (sign, rest) = if let Some(stripped) = trimmed.strip_prefix('-') {
            (-1i64, stripped)
        } else if let Some(stripped) = trimmed.strip_prefix('+') {
            (1i64, stripped)
        } else {
            (1i64, trimmed)
        };

        let rest = rest.trim();
        if rest.is_empty() {
            return Err(ParseMoneyError::Empty);
        }

        let rest = rest.replace(',', ".");
        let mut parts = rest.split('.');
        let reais_str = parts.next().ok_or(ParseMoneyError::Invalid)?;
        let cents_str = parts.next();

        if parts.next().is_some() {
            return Err(ParseMoneyError::Invalid);
        }

        if reais_str.is_empty() || !reais_str.chars().all(|c| c.is_ascii_digit()) {
            return Err(ParseMoneyError::Invalid);
        }

        let reais: i64 = reais_str.parse().map_err(|_| ParseMoneyError::Invalid)?;

        let cents: i64 = match cents_str {
            None | Some("") => 0,
            Some(frac) => {
                if !frac.chars().all(|c| c.is_ascii_digit()) {
                    return Err(ParseMoneyError::Invalid);
                }
                match frac.len() {
                    1 => frac.parse::<i64>().map_err(|_| ParseMoneyError::Invalid)? * 10,
                    2 => frac.parse::<i64>().map_err(|_| ParseMoneyError::Invalid)?,
                    _ => return Err(ParseMoneyError::TooManyDecimals),
                }
            }
        };

        let total = reais
            .checked_mul(100)
            .and_then(|v| v.checked_add(cents))
            .ok_or(ParseMoneyError::Overflow)?;

        let signed = if sign < 0 {
            total.checked_neg().ok_or(ParseMoneyError::Overflow)?
        } else {
            total
        };

        Ok(Money(signed))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParseMoneyError {
    Empty,
    Invalid,
    TooManyDecimals,
    Overflow,
}

impl fmt::Display for ParseMoneyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            ParseMoneyError::Empty => "empty amount",
            ParseMoneyError::Invalid => "invalid amount",
            ParseMoneyError::TooManyDecimals => "too many decimals",
            ParseMoneyError::Overflow => "amount too large",
        };
        f.write_str(msg)
    }
}

impl std::error::Error for ParseMoneyError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_formats_reais() {
        assert_eq!(Money::new(0).to_string(), "R$ 0.00");
        assert_eq!(Money::new(1).to_string(), "R$ 0.01");
        assert_eq!(Money::new(1050).to_string(), "R$ 10.50");
        assert_eq!(Money::new(-1050).to_string(), "-R$ 10.50");
    }

    #[test]
    fn major_round_trips_for_cent_amounts() {
        for cents in [-123_456i64, -1, 0, 1, 99, 100, 1050, 987_654_321] {
            let money = Money::new(cents);
            assert_eq!(Money::from_major(money.major()), money);
        }
    }

    #[test]
    fn from_major_rounds_ties_away_from_zero() {
        // .125 and .375 are exact in binary, so the *100 product really is a
        // .5 tie and the away-from-zero break is observable.
        assert_eq!(Money::from_major(0.125).cents(), 13);
        assert_eq!(Money::from_major(-0.125).cents(), -13);
        assert_eq!(Money::from_major(0.375).cents(), 38);
        assert_eq!(Money::from_major(-0.375).cents(), -38);
    }

    #[test]
    fn parse_accepts_dot_or_comma() {
        assert_eq!("10".parse::<Money>().ok(), Some(Money::new(1000)));
        assert_eq!("10.5".parse::<Money>().ok(), Some(Money::new(1050)));
        assert_eq!("10,50".parse::<Money>().ok(), Some(Money::new(1050)));
        assert_eq!("-0.01".parse::<Money>().ok(), Some(Money::new(-1)));
        assert_eq!("+1.00".parse::<Money>().ok(), Some(Money::new(100)));
    }

    #[test]
    fn parse_rejects_more_than_two_decimals() {
        assert!("12.345".parse::<Money>().is_err());
        assert!("".parse::<Money>().is_err());
        assert!("abc".parse::<Money>().is_err());
    }

    #[test]
    fn serde_uses_integer_cents() {
        let json = serde_json::to_string(&Money::new(1234)).unwrap();
        assert_eq!(json, "1234");
        let money: Money = serde_json::from_str("-50").unwrap();
        assert_eq!(money.cents(), -50);
        assert!(serde_json::from_str::<Money>("12.5").is_err());
    }
}
