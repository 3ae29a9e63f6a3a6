//! # Money Module
//!
//! Fixed-point amounts with two fractional digits.
//!
//! The workspace denies float arithmetic, so every currency value and every
//! promo-code percentage is carried as integer hundredths. JSON floats are
//! converted through their decimal text, never through arithmetic.
//!
//! The same type serves two units:
//! - currency: `Amount(2099)` is `$20.99`
//! - percentages: `Amount(1000)` is `10%`

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::iter::Sum;
use std::str::FromStr;
use thiserror::Error;

/// Hundredths per whole unit.
pub const SCALE: i64 = 100;

/// Divisor for `amount * percent` when both carry two fractional digits.
const PERCENT_SCALE: i128 = 10_000;

// =============================================================================
// ERRORS
// =============================================================================

/// Errors from parsing an amount.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountError {
    #[error("Amount is empty")]
    Empty,

    #[error("Invalid amount: {0:?}")]
    Invalid(String),

    #[error("Amount out of range: {0:?}")]
    Overflow(String),
}

// =============================================================================
// AMOUNT
// =============================================================================

/// A signed quantity with two fractional digits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(i64);

impl Amount {
    pub const ZERO: Amount = Amount(0);

    /// Build from raw hundredths (cents for currency).
    #[must_use]
    pub const fn from_hundredths(hundredths: i64) -> Self {
        Self(hundredths)
    }

    /// Build from whole units, saturating at the `i64` bounds.
    #[must_use]
    pub const fn from_units(units: i64) -> Self {
        Self(units.saturating_mul(SCALE))
    }

    /// Raw hundredths.
    #[must_use]
    pub const fn hundredths(self) -> i64 {
        self.0
    }

    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    #[must_use]
    pub fn checked_add(self, other: Amount) -> Option<Amount> {
        self.0.checked_add(other.0).map(Amount)
    }

    #[must_use]
    pub fn saturating_add(self, other: Amount) -> Amount {
        Amount(self.0.saturating_add(other.0))
    }

    #[must_use]
    pub fn saturating_sub(self, other: Amount) -> Amount {
        Amount(self.0.saturating_sub(other.0))
    }

    /// Multiply by a count (e.g. a usage counter).
    #[must_use]
    pub fn saturating_mul(self, count: u64) -> Amount {
        let count = i64::try_from(count).unwrap_or(i64::MAX);
        Amount(self.0.saturating_mul(count))
    }

    /// Clamp negative values to zero.
    #[must_use]
    pub fn max_zero(self) -> Amount {
        Amount(self.0.max(0))
    }

    /// `percent` of this amount, rounded half away from zero to the cent.
    ///
    /// `Amount::parse("20.99")?.percent_of(Amount::from_units(10))` is `$2.10`.
    #[must_use]
    pub fn percent_of(self, percent: Amount) -> Amount {
        let product = i128::from(self.0) * i128::from(percent.0);
        Amount(clamp_i128(div_round(product, PERCENT_SCALE)))
    }

    /// Divide by a count, rounded half away from zero. Zero count yields zero.
    #[must_use]
    pub fn div_round(self, count: u64) -> Amount {
        if count == 0 {
            return Amount::ZERO;
        }
        let divisor = i128::from(count);
        Amount(clamp_i128(div_round(i128::from(self.0), divisor)))
    }

    /// Parse decimal text such as `"20"`, `"20.99"`, `"-5.5"` or `".75"`.
    ///
    /// Digits past the second fractional digit are rounded half away from
    /// zero. Exponents, separators and non-ASCII digits are rejected.
    pub fn parse(text: &str) -> Result<Self, AmountError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(AmountError::Empty);
        }

        let (negative, unsigned) = if let Some(rest) = trimmed.strip_prefix('-') {
            (true, rest)
        } else if let Some(rest) = trimmed.strip_prefix('+') {
            (false, rest)
        } else {
            (false, trimmed)
        };

        let (int_part, frac_part) = unsigned.split_once('.').unwrap_or((unsigned, ""));
        let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
        if (int_part.is_empty() && frac_part.is_empty())
            || !all_digits(int_part)
            || !all_digits(frac_part)
        {
            return Err(AmountError::Invalid(trimmed.to_string()));
        }

        let overflow = || AmountError::Overflow(trimmed.to_string());

        let mut units: i64 = 0;
        for digit in int_part.bytes() {
            units = units
                .checked_mul(10)
                .and_then(|u| u.checked_add(i64::from(digit - b'0')))
                .ok_or_else(overflow)?;
        }

        let frac = frac_part.as_bytes();
        let digit_at = |i: usize| frac.get(i).map_or(0, |b| i64::from(b - b'0'));
        let mut hundredths = units
            .checked_mul(SCALE)
            .and_then(|h| h.checked_add(digit_at(0) * 10 + digit_at(1)))
            .ok_or_else(overflow)?;
        if frac.get(2).is_some_and(|b| *b >= b'5') {
            hundredths = hundredths.checked_add(1).ok_or_else(overflow)?;
        }

        Ok(Amount(if negative { -hundredths } else { hundredths }))
    }
}

/// Integer division rounding half away from zero. `divisor` must be positive.
fn div_round(value: i128, divisor: i128) -> i128 {
    let quotient = value / divisor;
    let remainder = value % divisor;
    if remainder.abs() * 2 >= divisor {
        quotient + value.signum()
    } else {
        quotient
    }
}

fn clamp_i128(value: i128) -> i64 {
    i64::try_from(value).unwrap_or(if value < 0 { i64::MIN } else { i64::MAX })
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{}{}.{:02}", sign, abs / 100, abs % 100)
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Amount::parse(s)
    }
}

impl Sum for Amount {
    fn sum<I: Iterator<Item = Amount>>(iter: I) -> Self {
        iter.fold(Amount::ZERO, Amount::saturating_add)
    }
}

impl<'a> Sum<&'a Amount> for Amount {
    fn sum<I: Iterator<Item = &'a Amount>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

// =============================================================================
// SERDE
// =============================================================================

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        // Decimal text parses to the nearest double; no arithmetic involved.
        let number: f64 = self
            .to_string()
            .parse()
            .map_err(|_| serde::ser::Error::custom("unrepresentable amount"))?;
        serializer.serialize_f64(number)
    }
}

struct AmountVisitor;

impl Visitor<'_> for AmountVisitor {
    type Value = Amount;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a number or a numeric string")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Amount, E> {
        v.checked_mul(SCALE)
            .map(Amount)
            .ok_or_else(|| E::custom(AmountError::Overflow(v.to_string())))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Amount, E> {
        i64::try_from(v)
            .ok()
            .and_then(|v| v.checked_mul(SCALE))
            .map(Amount)
            .ok_or_else(|| E::custom(AmountError::Overflow(v.to_string())))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Amount, E> {
        if !v.is_finite() {
            return Err(E::custom(AmountError::Invalid(v.to_string())));
        }
        Amount::parse(&v.to_string()).map_err(E::custom)
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Amount, E> {
        Amount::parse(v).map_err(E::custom)
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(AmountVisitor)
    }
}

struct LenientVisitor;

impl<'de> Visitor<'de> for LenientVisitor {
    type Value = Amount;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("anything; non-numeric values read as zero")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Amount, E> {
        Ok(AmountVisitor.visit_i64::<E>(v).unwrap_or_default())
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Amount, E> {
        Ok(AmountVisitor.visit_u64::<E>(v).unwrap_or_default())
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Amount, E> {
        Ok(AmountVisitor.visit_f64::<E>(v).unwrap_or_default())
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Amount, E> {
        Ok(Amount::parse(v).unwrap_or_default())
    }

    fn visit_bool<E: de::Error>(self, _v: bool) -> Result<Amount, E> {
        Ok(Amount::ZERO)
    }

    fn visit_unit<E: de::Error>(self) -> Result<Amount, E> {
        Ok(Amount::ZERO)
    }

    fn visit_none<E: de::Error>(self) -> Result<Amount, E> {
        Ok(Amount::ZERO)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Amount, D::Error> {
        deserializer.deserialize_any(LenientVisitor)
    }
}

/// Deserialize an amount, reading null or garbage as zero.
///
/// Use with `#[serde(default, deserialize_with = "kumu_core::money::lenient")]`
/// for fields the server fills inconsistently.
pub fn lenient<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Amount, D::Error> {
    deserializer.deserialize_any(LenientVisitor)
}

// =============================================================================
// FORMATTING
// =============================================================================

/// Render an amount as US dollars: `$20.00`, `$0.00`, `-$5.25`.
#[must_use]
pub fn format_currency(amount: Amount) -> String {
    let text = amount.to_string();
    match text.strip_prefix('-') {
        Some(abs) => format!("-${}", abs),
        None => format!("${}", text),
    }
}

/// Render basis points as a percentage: `1234` → `12.34%`.
#[must_use]
pub fn format_percent_bps(bps: u64) -> String {
    format!("{}.{:02}%", bps / 100, bps % 100)
}

// =============================================================================
// TESTS
// =============================================================================
