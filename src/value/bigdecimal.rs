//! Arbitrary-precision decimal arithmetic.
//!
//! Stored as `coefficient * 10^exponent`, where `coefficient` is a
//! [`BigInt`]. Unlike the IEEE-754-flavored special-value lattice this is
//! adapted from, Cantus collapses Infinity/qNaN/sNaN into a single
//! `undefined` flag (the evaluator's `Value::Undefined` sentinel has a
//! `Number`-local twin here, per the value model's documented split) and
//! tracks a significant-figure budget (`sig_figs`) used by the `SigFig`
//! output mode.

use std::{cmp::Ordering, fmt, str::FromStr};

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{Signed, ToPrimitive, Zero};

/// An arbitrary-precision decimal number with optional significant-figure
/// tracking.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct BigDecimal {
    coefficient: BigInt,
    exponent: i32,
    undefined: bool,
    negative_zero: bool,
    /// `None` means infinitely precise (exact). `Some(n)` caps display and
    /// round-trip precision at `n` significant figures.
    sig_figs: Option<u32>,
}

impl BigDecimal {
    pub fn new(coefficient: BigInt, exponent: i32) -> Self {
        Self { coefficient, exponent, undefined: false, negative_zero: false, sig_figs: None }
    }

    pub fn undefined() -> Self {
        Self { coefficient: BigInt::ZERO, exponent: 0, undefined: true, negative_zero: false, sig_figs: None }
    }

    pub fn zero() -> Self {
        Self::new(BigInt::ZERO, 0)
    }

    pub fn from_i64(n: i64) -> Self {
        Self::new(BigInt::from(n), 0)
    }

    pub fn from_bigint(n: BigInt) -> Self {
        Self::new(n, 0)
    }

    pub fn with_sig_figs(mut self, sig_figs: Option<u32>) -> Self {
        self.sig_figs = sig_figs;
        self
    }

    pub fn sig_figs(&self) -> Option<u32> {
        self.sig_figs
    }

    /// Parses a decimal literal: `123`, `-123.456`, `1.23e-10`, `Undefined`.
    pub fn from_str_lenient(s: &str) -> Result<Self, String> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("undefined") {
            return Ok(Self::undefined());
        }

        let (negative, rest) = if let Some(rest) = s.strip_prefix('-') {
            (true, rest)
        } else if let Some(rest) = s.strip_prefix('+') {
            (false, rest)
        } else {
            (false, s)
        };

        let (mantissa, exp_str) = match rest.to_lowercase().find('e') {
            Some(pos) => (&rest[..pos], &rest[pos + 1..]),
            None => (rest, ""),
        };

        let mut exponent: i32 = 0;
        if !exp_str.is_empty() {
            exponent = exp_str.parse::<i32>().map_err(|_| format!("invalid exponent in `{s}`"))?;
        }

        let (int_part, frac_part) = match mantissa.find('.') {
            Some(pos) => (&mantissa[..pos], &mantissa[pos + 1..]),
            None => (mantissa, ""),
        };

        let digits = format!("{}{}", int_part.trim_start_matches('0'), frac_part);
        exponent -= frac_part.len() as i32;

        let all_zero = digits.is_empty() || digits.chars().all(|c| c == '0');
        let coefficient = if all_zero {
            BigInt::ZERO
        } else {
            BigInt::from_str(&digits).map_err(|_| format!("invalid digits in `{s}`"))?
        };
        let coefficient = if negative { -coefficient } else { coefficient };

        let mut value = Self::new(coefficient, exponent);
        if all_zero {
            value.negative_zero = negative;
        }
        Ok(value)
    }

    /// Constructs a decimal that exactly represents an IEEE-754 `f64` by
    /// decomposing `mantissa * 2^exp` into `mantissa * 5^k * 10^-k`.
    pub fn from_f64_exact(value: f64) -> Self {
        if !value.is_finite() {
            return Self::undefined();
        }
        if value == 0.0 {
            let mut zero = Self::zero();
            zero.negative_zero = value.is_sign_negative();
            return zero;
        }

        let bits = value.to_bits();
        let negative = (bits >> 63) != 0;
        let exponent_bits = ((bits >> 52) & 0x7ff) as i32;
        let fraction_bits = bits & ((1u64 << 52) - 1);

        let (mut numerator, exponent_two) = if exponent_bits == 0 {
            (BigInt::from(fraction_bits), -1022 - 52)
        } else {
            (BigInt::from(fraction_bits | (1u64 << 52)), exponent_bits - 1023 - 52)
        };

        let mut exponent_ten = 0i32;
        if exponent_two >= 0 {
            numerator <<= usize::try_from(exponent_two).unwrap_or(0);
        } else {
            let power = u32::try_from(-exponent_two).unwrap_or(0);
            numerator *= BigInt::from(5u8).pow(power);
            exponent_ten = -i32::try_from(power).unwrap_or(i32::MAX);
        }
        if negative {
            numerator = -numerator;
        }
        let mut result = Self::new(numerator, exponent_ten);
        result.normalize();
        result
    }

    pub fn is_undefined(&self) -> bool {
        self.undefined
    }

    pub fn is_zero(&self) -> bool {
        !self.undefined && self.coefficient.is_zero()
    }

    pub fn is_signed(&self) -> bool {
        self.coefficient.is_negative() || (self.coefficient.is_zero() && self.negative_zero)
    }

    pub fn abs(&self) -> Self {
        if self.undefined {
            return self.clone();
        }
        let mut out = self.clone();
        out.coefficient = out.coefficient.abs();
        out.negative_zero = false;
        out
    }

    pub fn negate(&self) -> Self {
        if self.undefined {
            return self.clone();
        }
        let mut out = self.clone();
        out.coefficient = -out.coefficient;
        out.negative_zero = !out.negative_zero && out.coefficient.is_zero();
        out
    }

    /// Removes trailing coefficient zeros while keeping the represented
    /// value identical, shifting them into the exponent.
    pub fn normalize(&mut self) {
        if self.undefined || self.coefficient.is_zero() {
            return;
        }
        let ten = BigInt::from(10);
        while (&self.coefficient % &ten).is_zero() {
            self.coefficient /= &ten;
            self.exponent += 1;
        }
    }

    pub fn to_f64(&self) -> Option<f64> {
        if self.undefined {
            return None;
        }
        let coefficient = self.coefficient.to_f64()?;
        Some(coefficient * 10f64.powi(self.exponent))
    }

    fn rescale_pair(a: &Self, b: &Self) -> (BigInt, BigInt, i32) {
        let exp = a.exponent.min(b.exponent);
        let ca = &a.coefficient * BigInt::from(10).pow((a.exponent - exp) as u32);
        let cb = &b.coefficient * BigInt::from(10).pow((b.exponent - exp) as u32);
        (ca, cb, exp)
    }

    fn propagate_sig_figs(a: &Self, b: &Self) -> Option<u32> {
        match (a.sig_figs, b.sig_figs) {
            (Some(x), Some(y)) => Some(x.min(y)),
            (Some(x), None) => Some(x),
            (None, Some(y)) => Some(y),
            (None, None) => None,
        }
    }

    pub fn add(&self, other: &Self) -> Self {
        if self.undefined || other.undefined {
            return Self::undefined();
        }
        let (ca, cb, exp) = Self::rescale_pair(self, other);
        Self::new(ca + cb, exp).with_sig_figs(Self::propagate_sig_figs(self, other))
    }

    pub fn sub(&self, other: &Self) -> Self {
        self.add(&other.negate())
    }

    pub fn mul(&self, other: &Self) -> Self {
        if self.undefined || other.undefined {
            return Self::undefined();
        }
        Self::new(&self.coefficient * &other.coefficient, self.exponent + other.exponent)
            .with_sig_figs(Self::propagate_sig_figs(self, other))
    }

    /// Divides with `precision` extra decimal digits of working precision.
    /// Returns `Undefined` for division by zero, matching the spec's
    /// sentinel-based error model rather than raising.
    pub fn div(&self, other: &Self, precision: u32) -> Self {
        if self.undefined || other.undefined || other.is_zero() {
            return Self::undefined();
        }
        let scale = BigInt::from(10).pow(precision);
        let numerator = &self.coefficient * &scale;
        let (quotient, remainder) = numerator.div_rem(&other.coefficient);
        let exponent = self.exponent - other.exponent - precision as i32;
        if remainder.is_zero() {
            let mut result = Self::new(quotient, exponent);
            result.normalize();
            return result.with_sig_figs(Self::propagate_sig_figs(self, other));
        }
        Self::new(quotient, exponent).with_sig_figs(Self::propagate_sig_figs(self, other))
    }

    pub fn floor_div(&self, other: &Self) -> Self {
        if self.undefined || other.undefined || other.is_zero() {
            return Self::undefined();
        }
        let (ca, cb, exp) = Self::rescale_pair(self, other);
        Self::new(ca.div_floor(&cb), 0).with_exp_hint(exp)
    }

    pub fn modulo(&self, other: &Self) -> Self {
        if self.undefined || other.undefined || other.is_zero() {
            return Self::undefined();
        }
        let (ca, cb, exp) = Self::rescale_pair(self, other);
        Self::new(ca.mod_floor(&cb), exp)
    }

    /// Integer power for non-negative exponents; falls through to `f64`
    /// math (re-quantized) for fractional or negative exponents.
    pub fn pow(&self, exponent: &Self) -> Self {
        if self.undefined || exponent.undefined {
            return Self::undefined();
        }
        if exponent.exponent >= 0 && !exponent.is_signed() {
            if let Some(n) = exponent.to_u32_exact() {
                let coeff = self.coefficient.pow(n);
                let exp = self.exponent * n as i32;
                return Self::new(coeff, exp).with_sig_figs(self.sig_figs);
            }
        }
        let (Some(base), Some(exp)) = (self.to_f64(), exponent.to_f64()) else {
            return Self::undefined();
        };
        let result = base.powf(exp);
        if !result.is_finite() {
            return Self::undefined();
        }
        Self::from_f64_exact(result).with_sig_figs(self.sig_figs)
    }

    fn to_u32_exact(&self) -> Option<u32> {
        if self.exponent < 0 {
            return None;
        }
        let scaled = &self.coefficient * BigInt::from(10).pow(self.exponent.max(0) as u32);
        scaled.to_u32()
    }

    fn with_exp_hint(mut self, exp: i32) -> Self {
        self.exponent += exp;
        self
    }

    /// Rounds to `digits` fractional decimal places, half-away-from-zero.
    pub fn round_half_away_from_zero(&self, digits: i32) -> Self {
        if self.undefined {
            return self.clone();
        }
        let target_exp = -digits;
        if target_exp <= self.exponent {
            return self.clone();
        }
        let shift = (target_exp - self.exponent) as u32;
        let divisor = BigInt::from(10).pow(shift);
        let half = &divisor / BigInt::from(2);
        let (mut q, r) = self.coefficient.div_rem(&divisor);
        if r.abs() * BigInt::from(2) >= divisor.clone() {
            q += if self.coefficient.is_negative() { -BigInt::from(1) } else { BigInt::from(1) };
        }
        let _ = half;
        Self::new(q, target_exp).with_sig_figs(self.sig_figs)
    }

    /// Rounds to `sig_figs` significant figures using banker's rounding
    /// (round-half-to-even), the one rounding mode the value model commits
    /// to for its significant-figures output mode.
    pub fn round_sf_banker(&self, sig_figs: u32) -> Self {
        if self.undefined || self.is_zero() {
            return self.clone();
        }
        let digits = self.coefficient.abs().to_string();
        let current_digits = digits.len() as u32;
        if current_digits <= sig_figs {
            return self.clone();
        }
        let drop = current_digits - sig_figs;
        let divisor = BigInt::from(10).pow(drop);
        let (mut q, r) = self.coefficient.div_rem(&divisor);
        let twice_r = r.abs() * BigInt::from(2);
        match twice_r.cmp(&divisor) {
            Ordering::Greater => {
                q += if self.coefficient.is_negative() { -BigInt::from(1) } else { BigInt::from(1) };
            }
            Ordering::Equal => {
                if q.is_odd() {
                    q += if self.coefficient.is_negative() { -BigInt::from(1) } else { BigInt::from(1) };
                }
            }
            Ordering::Less => {}
        }
        Self::new(q, self.exponent + drop as i32).with_sig_figs(Some(sig_figs))
    }

    /// Exact greatest common divisor, used by the fraction-conversion
    /// built-in to reduce `numerator/denominator` to lowest terms.
    pub fn gcd_bigint(a: &BigInt, b: &BigInt) -> BigInt {
        a.gcd(b)
    }
}

impl PartialEq for BigDecimal {
    fn eq(&self, other: &Self) -> bool {
        match (self.undefined, other.undefined) {
            (true, true) => true,
            (true, false) | (false, true) => false,
            (false, false) => {
                let (ca, cb, _) = Self::rescale_pair(self, other);
                ca == cb
            }
        }
    }
}
impl Eq for BigDecimal {}

impl PartialOrd for BigDecimal {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        if self.undefined || other.undefined {
            return None;
        }
        let (ca, cb, _) = Self::rescale_pair(self, other);
        Some(ca.cmp(&cb))
    }
}

impl fmt::Display for BigDecimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.undefined {
            return write!(f, "Undefined");
        }
        if self.is_zero() {
            return write!(f, "{}0", if self.negative_zero { "-" } else { "" });
        }
        let sign = if self.coefficient.is_negative() { "-" } else { "" };
        let digits = self.coefficient.abs().to_string();
        if self.exponent >= 0 {
            write!(f, "{sign}{digits}{}", "0".repeat(self.exponent as usize))
        } else {
            let point = (-self.exponent) as usize;
            if point >= digits.len() {
                write!(f, "{sign}0.{}{digits}", "0".repeat(point - digits.len()))
            } else {
                let (int_part, frac_part) = digits.split_at(digits.len() - point);
                write!(f, "{sign}{int_part}.{frac_part}")
            }
        }
    }
}

impl From<i64> for BigDecimal {
    fn from(value: i64) -> Self {
        Self::from_i64(value)
    }
}

impl From<f64> for BigDecimal {
    fn from(value: f64) -> Self {
        Self::from_f64_exact(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_displays_round_trip() {
        let d = BigDecimal::from_str_lenient("123.450").unwrap();
        assert_eq!(d.to_string(), "123.450");
    }

    #[test]
    fn exact_division_round_trips_through_multiplication() {
        let a = BigDecimal::from_i64(7);
        let b = BigDecimal::from_i64(3);
        let quotient = a.div(&b, 40);
        let back = quotient.mul(&b);
        let diff = back.sub(&a).to_f64().unwrap().abs();
        assert!(diff < 1e-20, "diff={diff}");
    }

    #[test]
    fn division_by_zero_is_undefined() {
        let a = BigDecimal::from_i64(1);
        let zero = BigDecimal::zero();
        assert!(a.div(&zero, 10).is_undefined());
    }

    #[test]
    fn undefined_propagates_through_arithmetic() {
        let u = BigDecimal::undefined();
        let one = BigDecimal::from_i64(1);
        assert!(u.add(&one).is_undefined());
        assert!(one.mul(&u).is_undefined());
    }

    #[test]
    fn banker_rounding_rounds_to_even() {
        let half = BigDecimal::from_str_lenient("2.5").unwrap();
        assert_eq!(half.round_sf_banker(1).to_string(), "2");
        let half_up = BigDecimal::from_str_lenient("3.5").unwrap();
        assert_eq!(half_up.round_sf_banker(1).to_string(), "4");
    }

    #[test]
    fn exact_f64_roundtrip() {
        let d = BigDecimal::from_f64_exact(0.1);
        let back = d.to_f64().unwrap();
        assert_eq!(back, 0.1);
    }
}
