//! Error taxonomy for the evaluator.
//!
//! Every public entry point returns [`CantusResult<T>`]. Variants follow the
//! five kinds named by the evaluation model plus a `Resource` kind for
//! allocation/recursion/time-limit violations raised by the resource
//! tracker (see `evaluator::ResourceTracker`).

use std::fmt;

use strum::{Display, EnumString, IntoStaticStr};

/// Convenience alias used throughout the crate.
pub type CantusResult<T> = Result<T, CantusError>;

/// Top-level error type returned by the evaluator, built-ins, and the
/// scope registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CantusError {
    /// The source text could not be parsed into an AST. Raised by an
    /// external [`crate::parser::Parser`] implementation, not by the
    /// evaluator itself.
    Syntax(String),
    /// A runtime evaluation failure: unknown name, wrong argument count,
    /// unknown keyword argument, calling a non-callable value, and similar
    /// structural mistakes.
    Evaluator(EvaluatorErrorKind, String),
    /// A mathematical failure that is a structural error rather than a
    /// representable `Undefined` result (singular matrix inversion,
    /// dimension mismatch in a matrix operation, division by a
    /// domain that has no `Undefined` escape hatch).
    Math(MathErrorKind, String),
    /// A host I/O failure surfaced by [`crate::host::HostServices`] or the
    /// [`crate::io::IoCallbacks`] surface (file not found, network error,
    /// permission denied).
    Io(String),
    /// The running task was cancelled cooperatively via its
    /// [`crate::tasks::CancellationToken`].
    Cancelled,
    /// A configured resource limit (recursion depth, live reference count,
    /// wall-clock deadline) was exceeded.
    Resource(ResourceErrorKind),
}

/// Sub-kinds of [`CantusError::Evaluator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, IntoStaticStr)]
#[strum(serialize_all = "PascalCase")]
pub enum EvaluatorErrorKind {
    UnknownName,
    ArgumentCount,
    UnknownKeywordArgument,
    NotCallable,
    TypeMismatch,
    IndexOutOfRange,
    InvalidAssignmentTarget,
    DuplicateDefinition,
}

/// Sub-kinds of [`CantusError::Math`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, IntoStaticStr)]
#[strum(serialize_all = "PascalCase")]
pub enum MathErrorKind {
    SingularMatrix,
    DimensionMismatch,
    DomainError,
    DivisionByZero,
}

/// Sub-kinds of [`CantusError::Resource`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, IntoStaticStr)]
#[strum(serialize_all = "PascalCase")]
pub enum ResourceErrorKind {
    RecursionDepthExceeded,
    ReferenceCountExceeded,
    DeadlineExceeded,
    TaskLimitExceeded,
}

impl fmt::Display for CantusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Syntax(msg) => write!(f, "syntax error: {msg}"),
            Self::Evaluator(kind, msg) => write!(f, "evaluator error ({kind}): {msg}"),
            Self::Math(kind, msg) => write!(f, "math error ({kind}): {msg}"),
            Self::Io(msg) => write!(f, "I/O error: {msg}"),
            Self::Cancelled => write!(f, "task was cancelled"),
            Self::Resource(kind) => write!(f, "resource limit exceeded: {kind}"),
        }
    }
}

impl std::error::Error for CantusError {}

impl CantusError {
    pub fn evaluator(kind: EvaluatorErrorKind, msg: impl Into<String>) -> Self {
        Self::Evaluator(kind, msg.into())
    }

    pub fn math(kind: MathErrorKind, msg: impl Into<String>) -> Self {
        Self::Math(kind, msg.into())
    }

    pub fn unknown_name(name: &str) -> Self {
        Self::Evaluator(EvaluatorErrorKind::UnknownName, format!("unknown name `{name}`"))
    }

    pub fn argument_count(expected: &str, got: usize) -> Self {
        Self::Evaluator(
            EvaluatorErrorKind::ArgumentCount,
            format!("expected {expected} arguments, got {got}"),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_kind() {
        let err = CantusError::unknown_name("foo");
        assert_eq!(err.to_string(), "evaluator error (UnknownName): unknown name `foo`");
    }

    #[test]
    fn kind_round_trips_through_strum() {
        use std::str::FromStr;
        assert_eq!(EvaluatorErrorKind::from_str("UnknownName").unwrap(), EvaluatorErrorKind::UnknownName);
    }
}
