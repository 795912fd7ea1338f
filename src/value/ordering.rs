//! Canonical total ordering and equality over [`Value`].
//!
//! Single source of truth for comparisons: `Set`'s insertion ordering and
//! the `Sort` built-in's default comparator both call [`compare`] rather
//! than deriving `Ord` on `Value` directly, since several variants (e.g.
//! `Lambda`) have no intrinsic ordering beyond "equal to every other value
//! of the same variant".

use std::cmp::Ordering;

use super::Value;

/// Default epsilon for Number/Complex magnitude comparisons.
pub const DEFAULT_EPSILON: f64 = 1e-12;

fn variant_rank(value: &Value) -> u8 {
    match value {
        Value::Number(_) => 0,
        Value::Complex(_, _) => 1,
        Value::DateTime(_) => 2,
        Value::TimeSpan(_) => 3,
        Value::Text(_) => 4,
        Value::Boolean(_) => 5,
        Value::Matrix(_) => 6,
        Value::Tuple(_) => 7,
        Value::LinkedList(_) => 8,
        Value::Set(_) => 9,
        Value::HashSet(_) => 10,
        Value::Lambda(_) => 11,
        Value::Reference(_) => 12,
        Value::ClassInstance(_) => 13,
        Value::Undefined => 14,
    }
}

/// Compares two values under the evaluator's canonical total order:
/// `Undefined` sorts last; within a variant, natural ordering applies;
/// across variants, the fixed rank above applies.
pub fn compare(a: &Value, b: &Value) -> Ordering {
    compare_eps(a, b, DEFAULT_EPSILON)
}

/// As [`compare`], with an explicit epsilon for numeric tolerance
/// (the matrix engine uses a tighter epsilon than the default).
pub fn compare_eps(a: &Value, b: &Value, epsilon: f64) -> Ordering {
    let (ra, rb) = (variant_rank(a), variant_rank(b));
    if ra != rb {
        return ra.cmp(&rb);
    }
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => compare_numbers(x, y, epsilon),
        (Value::Complex(re_a, im_a), Value::Complex(re_b, im_b)) => {
            let magnitude_a = (re_a * re_a + im_a * im_a).sqrt();
            let magnitude_b = (re_b * re_b + im_b * im_b).sqrt();
            if (magnitude_a - magnitude_b).abs() <= epsilon {
                Ordering::Equal
            } else {
                magnitude_a.partial_cmp(&magnitude_b).unwrap_or(Ordering::Equal)
            }
        }
        (Value::Boolean(x), Value::Boolean(y)) => x.cmp(y),
        (Value::Text(x), Value::Text(y)) => x.cmp(y),
        (Value::DateTime(x), Value::DateTime(y)) => x.cmp(y),
        (Value::TimeSpan(x), Value::TimeSpan(y)) => x.cmp(y),
        (Value::Tuple(x), Value::Tuple(y)) => x.len().cmp(&y.len()),
        (Value::LinkedList(x), Value::LinkedList(y)) => x.len().cmp(&y.len()),
        _ => Ordering::Equal,
    }
}

fn compare_numbers(a: &super::bigdecimal::BigDecimal, b: &super::bigdecimal::BigDecimal, epsilon: f64) -> Ordering {
    match (a.is_undefined(), b.is_undefined()) {
        (true, true) => return Ordering::Equal,
        (true, false) => return Ordering::Greater,
        (false, true) => return Ordering::Less,
        (false, false) => {}
    }
    if let (Some(fa), Some(fb)) = (a.to_f64(), b.to_f64()) {
        if (fa - fb).abs() <= epsilon {
            return Ordering::Equal;
        }
    }
    a.partial_cmp(b).unwrap_or(Ordering::Equal)
}

/// Structural equality matching [`compare`]'s notion of "same value".
pub fn values_equal(a: &Value, b: &Value) -> bool {
    compare(a, b) == Ordering::Equal && variant_rank(a) == variant_rank(b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::bigdecimal::BigDecimal;

    #[test]
    fn undefined_sorts_last() {
        let undef = Value::Undefined;
        let num = Value::Number(BigDecimal::from_i64(1));
        assert_eq!(compare(&num, &undef), Ordering::Less);
        assert_eq!(compare(&undef, &num), Ordering::Greater);
    }

    #[test]
    fn numbers_compare_within_epsilon() {
        let a = Value::Number(BigDecimal::from_f64_exact(1.0));
        let b = Value::Number(BigDecimal::from_f64_exact(1.0 + 1e-15));
        assert_eq!(compare(&a, &b), Ordering::Equal);
    }

    #[test]
    fn cross_variant_rank_is_fixed() {
        let num = Value::Number(BigDecimal::from_i64(1));
        let text = Value::Text("a".to_string());
        assert_eq!(compare(&num, &text), Ordering::Less);
    }
}
