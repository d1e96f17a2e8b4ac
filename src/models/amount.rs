//! Amount (de)serialization.
//!
//! Stored amounts are plain JSON numbers, but older exports and hand-edited
//! files carry formatted strings such as `"Rp 1,200"` or `"$45.00"`. Those
//! are normalized on the way in so every aggregate works on a `Decimal`.

use regex::Regex;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde::de::{self, Visitor};
use serde::{Deserializer, Serializer};
use std::str::FromStr;
use std::sync::LazyLock;

static NON_NUMERIC: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"[^0-9.\-]+").ok());

/// Strip everything but digits, `.` and a leading `-`, then parse.
/// Anything left that still does not parse counts as zero.
pub fn normalize(raw: &str) -> Decimal {
    let Some(re) = NON_NUMERIC.as_ref() else {
        return Decimal::ZERO;
    };
    let stripped = re.replace_all(raw, "");

    let mut cleaned = String::with_capacity(stripped.len());
    for (i, c) in stripped.chars().enumerate() {
        if c == '-' && i != 0 {
            continue;
        }
        cleaned.push(c);
    }

    Decimal::from_str(&cleaned).unwrap_or(Decimal::ZERO)
}

pub fn serialize<S: Serializer>(amount: &Decimal, serializer: S) -> Result<S::Ok, S::Error> {
    if amount.fract().is_zero() {
        if let Some(whole) = amount.to_i64() {
            return serializer.serialize_i64(whole);
        }
    }
    match amount.to_f64() {
        Some(f) => serializer.serialize_f64(f),
        None => Err(serde::ser::Error::custom(format!(
            "amount out of range: {amount}"
        ))),
    }
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Decimal, D::Error> {
    deserializer.deserialize_any(AmountVisitor)
}

struct AmountVisitor;

impl<'de> Visitor<'de> for AmountVisitor {
    type Value = Decimal;

    fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str("a number or a formatted amount string")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Decimal, E> {
        Ok(Decimal::from(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Decimal, E> {
        Ok(Decimal::from(v))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Decimal, E> {
        // Go through the shortest round-trip text so 0.1 stays 0.1.
        Decimal::from_str(&v.to_string())
            .ok()
            .or_else(|| Decimal::from_f64(v))
            .ok_or_else(|| E::custom(format!("amount out of range: {v}")))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Decimal, E> {
        Ok(normalize(v))
    }
}
