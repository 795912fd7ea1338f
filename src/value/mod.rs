//! The tagged value model.
//!
//! Grounded on the teacher's `value.rs` split between inline and
//! heap-addressed variants, and on `datex-core`'s `values/value.rs`
//! distinction between structural and value equality, which informs the
//! canonical-comparator design here (see [`ordering`]).

pub mod bigdecimal;
pub mod ordering;

use std::collections::VecDeque;

use chrono::{DateTime as ChronoDateTime, Utc};
use indexmap::IndexSet;

use crate::{class::ClassInstance, function::Lambda, reference::Reference};
pub use bigdecimal::BigDecimal;

/// An absolute instant, millisecond precision, matching `chrono`'s own
/// resolution so conversions are lossless (see `SPEC_FULL.md` §3).
pub type DateTimeValue = ChronoDateTime<Utc>;

/// A signed duration in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
pub struct TimeSpanValue(pub i64);

/// The heap-shaped payloads addressed by a [`Reference`]. Kept out of
/// [`Value`] itself so the arena does not recursively store `Value` inline
/// — only heap-shaped variants carry an indirection handle.
#[derive(Debug, Clone)]
pub enum HeapObject {
    Matrix { data: Vec<Value>, rows: usize, cols: usize },
    Tuple(Vec<Value>),
    LinkedList(VecDeque<Value>),
    Set(IndexSet<OrderedValue>),
    HashSet(IndexSet<OrderedValue>),
    Lambda(Lambda),
    ClassInstance(ClassInstance),
}

/// A newtype wrapper giving [`Value`] a total order/equality via
/// [`ordering::compare`], needed so `Value` can live inside `IndexSet`
/// without implementing `Hash`/`Eq` itself (several variants have no
/// natural hash, e.g. `Number`'s arbitrary precision coefficient).
#[derive(Debug, Clone)]
pub struct OrderedValue(pub Value);

impl PartialEq for OrderedValue {
    fn eq(&self, other: &Self) -> bool {
        ordering::values_equal(&self.0, &other.0)
    }
}
impl Eq for OrderedValue {}
impl std::hash::Hash for OrderedValue {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        // Structural members hash by their canonical display form; this is
        // coarser than equality but never violates the Hash/Eq contract.
        format!("{:?}", ordering::compare(&self.0, &self.0)).hash(state);
        std::mem::discriminant(&self.0).hash(state);
    }
}

/// The tagged union every evaluated expression reduces to.
///
/// Canonical total order (see [`ordering::compare`]): Number < Complex <
/// DateTime < TimeSpan < Text < Boolean < Matrix < Tuple < LinkedList < Set
/// < HashSet < Lambda < Reference < ClassInstance < Undefined (sorts last).
/// `Complex`'s position is not pinned by name in the order list; it is
/// placed immediately after `Number` as the nearest numeric kin (see
/// `DESIGN.md` Open Question 7).
#[derive(Debug, Clone)]
pub enum Value {
    Undefined,
    Number(BigDecimal),
    /// `(real, imag)`. Reached only by an explicit escalation — a negative
    /// discriminant in `Quadratic`, or `pow` with a fractional exponent and
    /// negative base — never by silent narrowing of a `Number`.
    Complex(f64, f64),
    DateTime(DateTimeValue),
    TimeSpan(TimeSpanValue),
    Text(String),
    Boolean(bool),
    Matrix(Reference),
    Tuple(Reference),
    LinkedList(Reference),
    Set(Reference),
    HashSet(Reference),
    Lambda(Reference),
    /// An explicit indirection to another named slot, distinct from the
    /// implicit arena handles used by the heap-shaped variants above (see
    /// `SPEC_FULL.md` §3 and the glossary entry for "Reference").
    Reference(Box<Value>),
    ClassInstance(Reference),
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        ordering::values_equal(self, other)
    }
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Undefined => "Undefined",
            Self::Number(_) => "Number",
            Self::Complex(_, _) => "Complex",
            Self::DateTime(_) => "DateTime",
            Self::TimeSpan(_) => "TimeSpan",
            Self::Text(_) => "Text",
            Self::Boolean(_) => "Boolean",
            Self::Matrix(_) => "Matrix",
            Self::Tuple(_) => "Tuple",
            Self::LinkedList(_) => "LinkedList",
            Self::Set(_) => "Set",
            Self::HashSet(_) => "HashSet",
            Self::Lambda(_) => "Lambda",
            Self::Reference(_) => "Reference",
            Self::ClassInstance(_) => "ClassInstance",
        }
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Self::Undefined) || matches!(self, Self::Number(n) if n.is_undefined())
    }

    /// Truthiness used by `If`/`While` conditions and short-circuit `and`/
    /// `or`: `Undefined`, `false`, zero, and empty text are falsy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Undefined => false,
            Self::Boolean(b) => *b,
            Self::Number(n) => !n.is_undefined() && !n.is_zero(),
            Self::Complex(re, im) => *re != 0.0 || *im != 0.0,
            Self::Text(s) => !s.is_empty(),
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_name_matches_variant() {
        assert_eq!(Value::Boolean(true).type_name(), "Boolean");
        assert_eq!(Value::Number(BigDecimal::from_i64(1)).type_name(), "Number");
    }

    #[test]
    fn undefined_number_is_undefined() {
        let v = Value::Number(BigDecimal::undefined());
        assert!(v.is_undefined());
    }

    #[test]
    fn truthiness_matches_spec_rules() {
        assert!(!Value::Undefined.is_truthy());
        assert!(!Value::Number(BigDecimal::zero()).is_truthy());
        assert!(Value::Number(BigDecimal::from_i64(1)).is_truthy());
        assert!(!Value::Text(String::new()).is_truthy());
        assert!(Value::Text("x".to_string()).is_truthy());
    }
}
