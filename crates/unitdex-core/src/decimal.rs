//! # Exact Decimals
//!
//! [`Decimal`] stores a signed integer mantissa and a base-10 scale, so a value
//! like `2.25` is held as `225 × 10⁻²` with no binary rounding. Fractional-digit
//! limits (e.g. "at most two decimal places") are checked against the value as
//! written rather than against an `f64` approximation.
//!
//! Decimals deserialize from JSON numbers or numeric strings and serialize as
//! JSON numbers.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::DecimalError;

/// Largest scale accepted on input. Anything finer is almost certainly a
/// float artefact rather than an intended value.
const MAX_SCALE: u32 = 18;

/// An exact base-10 decimal number.
///
/// Trailing fractional zeros are stripped on construction, so `2.50` and
/// `2.5` are the same value with scale 1.
#[derive(Debug, Clone, Copy)]
pub struct Decimal {
    mantissa: i64,
    scale: u32,
}

impl Decimal {
    /// Zero.
    pub const ZERO: Decimal = Decimal {
        mantissa: 0,
        scale: 0,
    };

    /// Build `mantissa × 10^-scale`, normalizing trailing zeros.
    pub fn new(mantissa: i64, scale: u32) -> Self {
        let mut d = Self { mantissa, scale };
        while d.scale > 0 && d.mantissa % 10 == 0 {
            d.mantissa /= 10;
            d.scale -= 1;
        }
        d
    }

    /// A whole number.
    pub const fn from_int(value: i64) -> Self {
        Self {
            mantissa: value,
            scale: 0,
        }
    }

    /// Number of significant fractional digits.
    pub fn fractional_digits(&self) -> u32 {
        self.scale
    }

    /// Compare against a whole number without losing precision.
    pub fn cmp_int(&self, other: i64) -> Ordering {
        self.cmp(&Decimal::from_int(other))
    }

    /// Nearest `f64`. Only used for serialization.
    pub fn to_f64(&self) -> f64 {
        // Parsing the exact decimal text gives the correctly rounded double.
        self.to_string().parse().unwrap_or(f64::NAN)
    }

    /// Convert a finite `f64` via its shortest round-trip representation.
    pub fn from_f64(value: f64) -> Result<Self, DecimalError> {
        if !value.is_finite() {
            return Err(DecimalError::NonFinite);
        }
        format!("{value}").parse()
    }

    fn widened(&self, scale: u32) -> i128 {
        i128::from(self.mantissa) * 10i128.pow(scale - self.scale)
    }
}

impl Default for Decimal {
    fn default() -> Self {
        Self::ZERO
    }
}

impl PartialEq for Decimal {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Decimal {}

impl PartialOrd for Decimal {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Decimal {
    fn cmp(&self, other: &Self) -> Ordering {
        let scale = self.scale.max(other.scale);
        self.widened(scale).cmp(&other.widened(scale))
    }
}

impl FromStr for Decimal {
    type Err = DecimalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || DecimalError::Malformed(s.to_string());
        let trimmed = s.trim();
        let (negative, unsigned) = match trimmed.as_bytes().first() {
            Some(b'-') => (true, &trimmed[1..]),
            Some(b'+') => (false, &trimmed[1..]),
            _ => (false, trimmed),
        };
        let (whole, frac) = match unsigned.split_once('.') {
            Some((w, f)) => (w, f),
            None => (unsigned, ""),
        };
        if whole.is_empty() && frac.is_empty() {
            return Err(malformed());
        }
        if !whole.bytes().chain(frac.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(malformed());
        }
        let frac = frac.trim_end_matches('0');
        let scale = u32::try_from(frac.len()).map_err(|_| malformed())?;
        if scale > MAX_SCALE {
            return Err(DecimalError::OutOfRange(s.to_string()));
        }
        let digits = format!("{whole}{frac}");
        let magnitude: i64 = if digits.is_empty() {
            0
        } else {
            digits
                .parse()
                .map_err(|_| DecimalError::OutOfRange(s.to_string()))?
        };
        let mantissa = if negative { -magnitude } else { magnitude };
        Ok(Decimal::new(mantissa, scale))
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.scale == 0 {
            return write!(f, "{}", self.mantissa);
        }
        let digits = self.mantissa.unsigned_abs().to_string();
        let scale = self.scale as usize;
        let padded = format!("{digits:0>width$}", width = scale + 1);
        let (whole, frac) = padded.split_at(padded.len() - scale);
        let sign = if self.mantissa < 0 { "-" } else { "" };
        write!(f, "{sign}{whole}.{frac}")
    }
}

impl Serialize for Decimal {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.to_f64())
    }
}

impl<'de> Deserialize<'de> for Decimal {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(DecimalVisitor)
    }
}

struct DecimalVisitor;

impl<'de> Visitor<'de> for DecimalVisitor {
    type Value = Decimal;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a decimal number or numeric string")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Decimal, E> {
        Ok(Decimal::from_int(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Decimal, E> {
        i64::try_from(v)
            .map(Decimal::from_int)
            .map_err(|_| E::custom(DecimalError::OutOfRange(v.to_string())))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Decimal, E> {
        Decimal::from_f64(v).map_err(E::custom)
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Decimal, E> {
        v.parse().map_err(E::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_normalizes() {
        let d: Decimal = "2.250".parse().unwrap();
        assert_eq!(d.fractional_digits(), 2);
        assert_eq!(d.to_string(), "2.25");
        assert_eq!(d, Decimal::new(225, 2));
    }

    #[test]
    fn equality_ignores_scale() {
        assert_eq!("4.0".parse::<Decimal>().unwrap(), Decimal::from_int(4));
        assert_eq!(Decimal::new(40, 1).fractional_digits(), 0);
    }

    #[test]
    fn small_negative_values_render() {
        assert_eq!(Decimal::new(-5, 2).to_string(), "-0.05");
        assert_eq!("-.5".parse::<Decimal>().unwrap().to_string(), "-0.5");
    }

    #[test]
    fn rejects_garbage() {
        assert!("".parse::<Decimal>().is_err());
        assert!("1e5".parse::<Decimal>().is_err());
        assert!("1.2.3".parse::<Decimal>().is_err());
        assert!(".".parse::<Decimal>().is_err());
        assert!(Decimal::from_f64(f64::NAN).is_err());
    }

    #[test]
    fn compares_across_scales() {
        let a: Decimal = "2.25".parse().unwrap();
        let b: Decimal = "2.3".parse().unwrap();
        assert!(a < b);
        assert_eq!(a.cmp_int(2), Ordering::Greater);
        assert_eq!(Decimal::ZERO.cmp_int(0), Ordering::Equal);
    }

    #[test]
    fn json_number_and_string_inputs() {
        let from_num: Decimal = serde_json::from_str("2.25").unwrap();
        let from_str: Decimal = serde_json::from_str("\"2.25\"").unwrap();
        let from_int: Decimal = serde_json::from_str("3").unwrap();
        assert_eq!(from_num, from_str);
        assert_eq!(from_int, Decimal::from_int(3));
        assert!(serde_json::from_str::<Decimal>("true").is_err());
    }

    #[test]
    fn float_artefacts_keep_their_digits() {
        let d: Decimal = serde_json::from_str("2.255").unwrap();
        assert_eq!(d.fractional_digits(), 3);
    }

    #[test]
    fn serializes_as_json_number() {
        let json = serde_json::to_value(Decimal::new(225, 2)).unwrap();
        assert_eq!(json, serde_json::json!(2.25));
    }
}
