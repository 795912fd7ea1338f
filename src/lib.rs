//! Cantus — an embeddable expression-and-script evaluator for numeric and
//! symbolic computation.
//!
//! The crate owns the evaluation runtime: the tagged [`value::Value`] model,
//! the named hierarchical [`scope::Scope`] registry, the tree-walking
//! [`evaluator::Evaluator`], the unified built-in/user-function dispatch in
//! [`function`], and the parallel-thread concurrency model in [`tasks`].
//! Source-level parsing and host I/O are external collaborators — see
//! [`parser::Parser`] and [`host::HostServices`].

mod builtins;
mod class;
mod error;
mod evaluator;
mod function;
mod host;
mod io;
mod matrix;
mod parser;
mod reference;
mod render;
mod scope;
mod tasks;
mod value;

pub use crate::{
    class::{ClassInstance, UserClass},
    error::{CantusError, CantusResult},
    evaluator::{AngleMode, Evaluator, EvaluatorConfig, ExplicitMode, OutputMode, SignificantMode},
    function::{Lambda, UserFunction},
    host::HostServices,
    io::{IoCallbacks, OutputKind, ReadMode, StdIoCallbacks},
    parser::{Expr, Parser, Statement},
    reference::{Reference, ReferenceArena},
    render::render,
    scope::Scope,
    tasks::{TaskHandle, TaskId, ThreadController},
    value::{Value, bigdecimal::BigDecimal},
};
