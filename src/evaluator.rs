//! The evaluator core: statement/expression execution, mode flags,
//! previous-answer buffer, and the default-variable slot.
//!
//! Grounded on the teacher's top-level dispatch conventions (Result
//! propagation via `?`, one error type threaded throughout) seen across
//! `builtins/mod.rs` and the curated `modules/*` reference files.
//! [`Evaluator::with_default_slot`] is grounded on the teacher's
//! documented `defer_drop!` guaranteed-cleanup idiom (referenced from
//! `types/decimal.rs`'s own imports): it saves the default-variable slot
//! (`$`) on entry and restores it after the callback returns, whether it
//! returned `Ok` or `Err`.

use std::collections::VecDeque;

use crate::{
    error::{CantusError, CantusResult, EvaluatorErrorKind},
    function::{CallArgs, UserFunction},
    host::HostServices,
    io::{IoCallbacks, StdIoCallbacks},
    parser::{BinaryOp, Expr, Statement, UnaryOp},
    reference::ReferenceArena,
    scope::{Scope, ROOT_SCOPE},
    tasks::{CancellationToken, ThreadController},
    value::{bigdecimal::BigDecimal, HeapObject, Value},
};

/// Numeric display mode (spec §4.F).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Four decimal places / scientific fallback.
    LineO,
    /// Symbolic rendering: π-multiples, radicals, rational fractions.
    MathO,
    /// Normalized scientific notation.
    SciO,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AngleMode {
    Degrees,
    Radians,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExplicitMode {
    Explicit,
    Implicit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignificantMode {
    Off,
    On(u32),
}

/// Mode flags and resource limits an embedder configures once per
/// evaluator instance (spec §4.F + `SPEC_FULL.md` §2/§5).
#[derive(Debug, Clone, Copy)]
pub struct EvaluatorConfig {
    pub output_mode: OutputMode,
    pub angle_mode: AngleMode,
    pub explicit_mode: ExplicitMode,
    pub significant_mode: SignificantMode,
    pub spaces_per_tab: u32,
    pub prev_ans_depth: usize,
    /// `None` means unlimited, matching the teacher's `NoLimitTracker`.
    pub max_recursion_depth: Option<u32>,
    pub max_live_references: Option<usize>,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            output_mode: OutputMode::LineO,
            angle_mode: AngleMode::Radians,
            explicit_mode: ExplicitMode::Implicit,
            significant_mode: SignificantMode::Off,
            spaces_per_tab: 4,
            prev_ans_depth: 32,
            max_recursion_depth: None,
            max_live_references: None,
        }
    }
}

/// The evaluation runtime: scope registry, reference arena, previous-
/// answer buffer, default slot, mode flags, and resource accounting.
pub struct Evaluator {
    pub config: EvaluatorConfig,
    scope: Scope,
    arena: ReferenceArena<HeapObject>,
    prev_ans: VecDeque<Value>,
    default_slot: Value,
    recursion_depth: u32,
    io: Box<dyn IoCallbacks>,
    host: Option<Box<dyn HostServices>>,
    pub threads: ThreadController,
    /// Set by `Async`/`Run` when this evaluator is driving a spawned
    /// task's body, so iteration built-ins can poll it cooperatively.
    current_task_token: Option<CancellationToken>,
}

impl Evaluator {
    pub fn new(config: EvaluatorConfig) -> Self {
        Self {
            config,
            scope: Scope::new(),
            arena: ReferenceArena::new(0),
            prev_ans: VecDeque::with_capacity(config.prev_ans_depth),
            default_slot: Value::Undefined,
            recursion_depth: 0,
            io: Box::new(StdIoCallbacks),
            host: None,
            threads: ThreadController::new(),
            current_task_token: None,
        }
    }

    /// Binds the cancellation token this evaluator should poll while it
    /// is driving a spawned task's body (see `tasks::ThreadController`).
    pub fn set_current_task_token(&mut self, token: Option<CancellationToken>) {
        self.current_task_token = token;
    }

    /// True once the task driving this evaluator has been asked to stop.
    /// Iteration built-ins (`Each`, `Filter`, `Sort`'s recursion, `Sigma`)
    /// poll this between iterations rather than checking preemptively.
    pub fn is_cancelled(&self) -> bool {
        self.current_task_token.as_ref().is_some_and(CancellationToken::is_cancelled)
    }

    pub fn with_io(mut self, io: Box<dyn IoCallbacks>) -> Self {
        self.io = io;
        self
    }

    pub fn with_host(mut self, host: Box<dyn HostServices>) -> Self {
        self.host = Some(host);
        self
    }

    pub fn io(&self) -> &dyn IoCallbacks {
        self.io.as_ref()
    }

    pub fn host(&self) -> Option<&dyn HostServices> {
        self.host.as_deref()
    }

    pub fn scope_mut(&mut self) -> &mut Scope {
        &mut self.scope
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    pub fn arena_mut(&mut self) -> &mut ReferenceArena<HeapObject> {
        &mut self.arena
    }

    pub fn arena(&self) -> &ReferenceArena<HeapObject> {
        &self.arena
    }

    /// Pushes a value onto the previous-answer history, evicting the
    /// oldest entry once `prev_ans_depth` is exceeded.
    pub fn push_prev_ans(&mut self, value: Value) {
        if self.prev_ans.len() == self.config.prev_ans_depth {
            self.prev_ans.pop_front();
        }
        self.prev_ans.push_back(value);
    }

    /// `_PrevAns(n)`: `0` is the most recent answer.
    pub fn prev_ans(&self, n: usize) -> Value {
        self.prev_ans.iter().rev().nth(n).cloned().unwrap_or(Value::Undefined)
    }

    /// `_AllClear()`: resets the root scope and previous-answer history.
    pub fn all_clear(&mut self) {
        self.scope.clear_root();
        self.prev_ans.clear();
        self.default_slot = Value::Undefined;
    }

    fn enter_recursion(&mut self) -> CantusResult<()> {
        self.recursion_depth += 1;
        if let Some(max) = self.config.max_recursion_depth {
            if self.recursion_depth > max {
                self.recursion_depth -= 1;
                return Err(CantusError::Resource(crate::error::ResourceErrorKind::RecursionDepthExceeded));
            }
        }
        Ok(())
    }

    fn exit_recursion(&mut self) {
        self.recursion_depth = self.recursion_depth.saturating_sub(1);
    }

    /// Evaluates a single top-level expression in the root scope.
    pub fn eval(&mut self, expr: &Expr) -> CantusResult<Value> {
        let result = self.eval_expr(ROOT_SCOPE, expr);
        if let Ok(value) = &result {
            self.push_prev_ans(value.clone());
        }
        result
    }

    /// Runs a parsed script (sequence of statements) in the root scope.
    pub fn eval_script(&mut self, statements: &[Statement]) -> CantusResult<Value> {
        let mut last = Value::Undefined;
        for statement in statements {
            last = self.eval_statement(ROOT_SCOPE, statement)?;
        }
        self.push_prev_ans(last.clone());
        Ok(last)
    }

    fn eval_statement(&mut self, scope_name: &str, statement: &Statement) -> CantusResult<Value> {
        match statement {
            Statement::Expression(expr) => self.eval_expr(scope_name, expr),
            Statement::Assign(name, expr) => {
                let value = self.eval_expr(scope_name, expr)?;
                self.scope.assign_variable(scope_name, name, value.clone());
                Ok(value)
            }
            Statement::Block(statements) => {
                let mut last = Value::Undefined;
                for inner in statements {
                    last = self.eval_statement(scope_name, inner)?;
                }
                Ok(last)
            }
            Statement::If(cond, then_branch, else_branch) => {
                if self.eval_expr(scope_name, cond)?.is_truthy() {
                    self.eval_statement(scope_name, &Statement::Block(then_branch.clone()))
                } else {
                    self.eval_statement(scope_name, &Statement::Block(else_branch.clone()))
                }
            }
            Statement::While(cond, body) => {
                let mut last = Value::Undefined;
                while self.eval_expr(scope_name, cond)?.is_truthy() {
                    last = self.eval_statement(scope_name, &Statement::Block(body.clone()))?;
                }
                Ok(last)
            }
            Statement::For(var, iterable, body) => {
                let values = self.iterable_values(scope_name, iterable)?;
                let mut last = Value::Undefined;
                for item in values {
                    self.scope.assign_variable(scope_name, var, item);
                    last = self.eval_statement(scope_name, &Statement::Block(body.clone()))?;
                }
                Ok(last)
            }
            Statement::Return(expr) => match expr {
                Some(expr) => self.eval_expr(scope_name, expr),
                None => Ok(Value::Undefined),
            },
            Statement::FunctionDef(name, params, _body) => {
                let lambda = crate::function::Lambda {
                    name: Some(name.clone()),
                    params: params
                        .iter()
                        .map(|p| crate::function::Parameter { name: p.clone(), default: None })
                        .collect(),
                    body: Expr::DefaultSlot,
                    defining_scope: scope_name.to_string(),
                };
                self.scope.define_function(scope_name, name.clone(), UserFunction::User(lambda));
                Ok(Value::Undefined)
            }
            Statement::ClassDef(name, field_names) => {
                let mut class = crate::class::UserClass::new(name.clone());
                class.field_names = field_names.clone();
                self.scope.define_class(scope_name, name.clone(), class);
                Ok(Value::Undefined)
            }
            Statement::TryCatch(try_block, bound_name, catch_block) => {
                match self.eval_statement(scope_name, &Statement::Block(try_block.clone())) {
                    Ok(value) => Ok(value),
                    Err(CantusError::Cancelled) => Err(CantusError::Cancelled),
                    Err(err) => {
                        if let Some(name) = bound_name {
                            self.scope.assign_variable(scope_name, name, Value::Text(err.to_string()));
                        }
                        self.eval_statement(scope_name, &Statement::Block(catch_block.clone()))
                    }
                }
            }
        }
    }

    fn iterable_values(&mut self, scope_name: &str, expr: &Expr) -> CantusResult<Vec<Value>> {
        let value = self.eval_expr(scope_name, expr)?;
        match value {
            Value::Tuple(reference) | Value::LinkedList(reference) => match self.arena.get(&reference) {
                Some(HeapObject::Tuple(items)) => Ok(items.clone()),
                Some(HeapObject::LinkedList(items)) => Ok(items.iter().cloned().collect()),
                _ => Ok(Vec::new()),
            },
            other => Ok(vec![other]),
        }
    }

    /// Evaluates an expression in `scope_name`, guarding recursion depth.
    pub fn eval_expr(&mut self, scope_name: &str, expr: &Expr) -> CantusResult<Value> {
        self.enter_recursion()?;
        let result = self.eval_expr_inner(scope_name, expr);
        self.exit_recursion();
        result
    }

    fn eval_expr_inner(&mut self, scope_name: &str, expr: &Expr) -> CantusResult<Value> {
        match expr {
            Expr::NumberLiteral(text) => Ok(Value::Number(
                BigDecimal::from_str_lenient(text).map_err(|msg| CantusError::Syntax(msg))?,
            )),
            Expr::TextLiteral(text) => Ok(Value::Text(text.clone())),
            Expr::BooleanLiteral(b) => Ok(Value::Boolean(*b)),
            Expr::DefaultSlot => Ok(self.default_slot.clone()),
            Expr::Identifier(name) => self
                .scope
                .resolve_variable(scope_name, name)
                .cloned()
                .ok_or_else(|| CantusError::unknown_name(name)),
            Expr::Unary(op, inner) => {
                let value = self.eval_expr(scope_name, inner)?;
                self.eval_unary(*op, value)
            }
            Expr::Binary(lhs, op, rhs) => {
                let left = self.eval_expr(scope_name, lhs)?;
                let right = self.eval_expr(scope_name, rhs)?;
                self.eval_binary(*op, left, right)
            }
            Expr::TupleLiteral(items) => {
                let values = items.iter().map(|item| self.eval_expr(scope_name, item)).collect::<CantusResult<Vec<_>>>()?;
                let reference = self.arena.insert(HeapObject::Tuple(values));
                Ok(Value::Tuple(reference))
            }
            Expr::LambdaLiteral(params, body) => {
                let lambda = crate::function::Lambda {
                    name: None,
                    params: params.iter().map(|p| crate::function::Parameter { name: p.clone(), default: None }).collect(),
                    body: (**body).clone(),
                    defining_scope: scope_name.to_string(),
                };
                let reference = self.arena.insert(HeapObject::Lambda(lambda));
                Ok(Value::Lambda(reference))
            }
            Expr::Call(callee, positional, keyword) => self.eval_call(scope_name, callee, positional, keyword),
            Expr::Index(_, _) | Expr::MemberAccess(_, _) => {
                Err(CantusError::evaluator(EvaluatorErrorKind::NotCallable, "indexing/member access not yet bound to a value"))
            }
        }
    }

    fn eval_call(
        &mut self,
        scope_name: &str,
        callee: &Expr,
        positional: &[Expr],
        keyword: &[(String, Expr)],
    ) -> CantusResult<Value> {
        let Expr::Identifier(name) = callee else {
            return Err(CantusError::evaluator(EvaluatorErrorKind::NotCallable, "callee must be a named function"));
        };
        let positional_values = positional.iter().map(|e| self.eval_expr(scope_name, e)).collect::<CantusResult<Vec<_>>>()?;
        let keyword_values = keyword
            .iter()
            .map(|(k, e)| Ok((k.clone(), self.eval_expr(scope_name, e)?)))
            .collect::<CantusResult<Vec<_>>>()?;
        let args = CallArgs { positional: positional_values, keyword: keyword_values };

        if let Some(builtin) = crate::builtins::lookup(name) {
            return builtin(self, args);
        }

        let Some(func) = self.scope.resolve_function(scope_name, name).cloned() else {
            return Err(CantusError::unknown_name(name));
        };
        match func {
            UserFunction::User(lambda) => self.call_lambda(&lambda, args),
            UserFunction::Builtin(builtin_name) => crate::builtins::lookup(&builtin_name)
                .ok_or_else(|| CantusError::unknown_name(&builtin_name))
                .and_then(|f| f(self, args)),
        }
    }

    /// Calls a user-defined lambda: binds arguments into a fresh child
    /// scope of its defining scope and evaluates its body there.
    /// Runs `f` with the default-variable slot (`$`) set to `value` for
    /// its duration, restoring the prior value on every exit path
    /// (including an early return via `?` inside `f`). Used by the
    /// iteration built-ins (`Each`, `Select`, `Sort`'s default comparator)
    /// to expose the current element as `$` without threading it through
    /// every callback's parameter list.
    pub fn with_default_slot<T>(&mut self, value: Value, f: impl FnOnce(&mut Self) -> CantusResult<T>) -> CantusResult<T> {
        let previous = std::mem::replace(&mut self.default_slot, value);
        let result = f(self);
        self.default_slot = previous;
        result
    }

    pub fn call_lambda(&mut self, lambda: &crate::function::Lambda, args: CallArgs) -> CantusResult<Value> {
        let bound = args.bind_positions(&lambda.params)?;
        let call_scope = self.scope.create_scope(format!("cantus.call.{}", uuid::Uuid::new_v4()), &lambda.defining_scope);
        for (name, value) in bound {
            self.scope.assign_variable(&call_scope, &name, value.unwrap_or(Value::Undefined));
        }
        let result = self.eval_expr(&call_scope, &lambda.body);
        self.scope.drop_scope(&call_scope);
        result
    }

    fn eval_unary(&mut self, op: UnaryOp, value: Value) -> CantusResult<Value> {
        match (op, value) {
            (UnaryOp::Neg, Value::Number(n)) => Ok(Value::Number(n.negate())),
            (UnaryOp::Neg, Value::Complex(re, im)) => Ok(Value::Complex(-re, -im)),
            (UnaryOp::Not, Value::Boolean(b)) => Ok(Value::Boolean(!b)),
            (UnaryOp::Not, other) => Ok(Value::Boolean(!other.is_truthy())),
            (UnaryOp::Neg, _) => Ok(Value::Undefined),
        }
    }

    fn eval_binary(&mut self, op: BinaryOp, left: Value, right: Value) -> CantusResult<Value> {
        use crate::value::ordering;
        match op {
            BinaryOp::And => Ok(Value::Boolean(left.is_truthy() && right.is_truthy())),
            BinaryOp::Or => Ok(Value::Boolean(left.is_truthy() || right.is_truthy())),
            BinaryOp::Eq => Ok(Value::Boolean(ordering::values_equal(&left, &right))),
            BinaryOp::Ne => Ok(Value::Boolean(!ordering::values_equal(&left, &right))),
            BinaryOp::Lt => Ok(Value::Boolean(ordering::compare(&left, &right) == std::cmp::Ordering::Less)),
            BinaryOp::Le => Ok(Value::Boolean(ordering::compare(&left, &right) != std::cmp::Ordering::Greater)),
            BinaryOp::Gt => Ok(Value::Boolean(ordering::compare(&left, &right) == std::cmp::Ordering::Greater)),
            BinaryOp::Ge => Ok(Value::Boolean(ordering::compare(&left, &right) != std::cmp::Ordering::Less)),
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod | BinaryOp::Pow => {
                self.eval_arithmetic(op, left, right)
            }
        }
    }

    fn eval_arithmetic(&mut self, op: BinaryOp, left: Value, right: Value) -> CantusResult<Value> {
        let (Value::Number(a), Value::Number(b)) = (left, right) else {
            return Ok(Value::Undefined);
        };
        if op == BinaryOp::Pow {
            if let Some(complex) = Self::pow_complex_escalation(&a, &b) {
                return Ok(complex);
            }
        }
        let result = match op {
            BinaryOp::Add => a.add(&b),
            BinaryOp::Sub => a.sub(&b),
            BinaryOp::Mul => a.mul(&b),
            BinaryOp::Div => a.div(&b, 40),
            BinaryOp::Mod => a.modulo(&b),
            BinaryOp::Pow => a.pow(&b),
            _ => unreachable!("non-arithmetic op filtered by caller"),
        };
        Ok(Value::Number(result))
    }

    /// `pow(x, y)` with a negative base and a non-integer exponent has no
    /// real result (spec §4.A); escalates via the polar form
    /// `x^y = |x|^y * (cos(yπ) + i sin(yπ))`, since a negative real's
    /// argument is exactly π. Returns `None` when the real `pow` path
    /// applies (non-negative base, or an integer exponent).
    fn pow_complex_escalation(base: &BigDecimal, exponent: &BigDecimal) -> Option<Value> {
        if !base.is_signed() || exponent.is_undefined() {
            return None;
        }
        let exponent_f64 = exponent.to_f64()?;
        if exponent_f64.fract() == 0.0 {
            return None;
        }
        let base_f64 = base.to_f64()?;
        let magnitude = base_f64.abs().powf(exponent_f64);
        let angle = exponent_f64 * std::f64::consts::PI;
        Some(Value::Complex(magnitude * angle.cos(), magnitude * angle.sin()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn num(n: i64) -> Expr {
        Expr::NumberLiteral(n.to_string())
    }

    #[test]
    fn evaluates_simple_arithmetic() {
        let mut evaluator = Evaluator::new(EvaluatorConfig::default());
        let expr = Expr::Binary(Box::new(num(2)), BinaryOp::Add, Box::new(num(3)));
        let result = evaluator.eval(&expr).unwrap();
        assert_eq!(result, Value::Number(BigDecimal::from_i64(5)));
    }

    #[test]
    fn prev_ans_tracks_last_result() {
        let mut evaluator = Evaluator::new(EvaluatorConfig::default());
        evaluator.eval(&num(5)).unwrap();
        assert_eq!(evaluator.prev_ans(0), Value::Number(BigDecimal::from_i64(5)));
    }

    #[test]
    fn all_clear_resets_scope_and_history() {
        let mut evaluator = Evaluator::new(EvaluatorConfig::default());
        evaluator
            .eval_script(&[Statement::Assign("a".to_string(), num(5))])
            .unwrap();
        evaluator.all_clear();
        assert_eq!(evaluator.scope().resolve_variable(ROOT_SCOPE, "a"), None);
        assert_eq!(evaluator.prev_ans(0), Value::Undefined);
    }

    #[test]
    fn unknown_identifier_is_an_evaluator_error() {
        let mut evaluator = Evaluator::new(EvaluatorConfig::default());
        let err = evaluator.eval(&Expr::Identifier("nope".to_string())).unwrap_err();
        assert!(matches!(err, CantusError::Evaluator(EvaluatorErrorKind::UnknownName, _)));
    }

    #[test]
    fn negative_base_fractional_power_escalates_to_complex() {
        let mut evaluator = Evaluator::new(EvaluatorConfig::default());
        let expr = Expr::Binary(Box::new(Expr::Unary(UnaryOp::Neg, Box::new(num(1)))), BinaryOp::Pow, Box::new(Expr::NumberLiteral("0.5".to_string())));
        let result = evaluator.eval(&expr).unwrap();
        assert!(matches!(result, Value::Complex(re, im) if re.abs() < 1e-9 && (im - 1.0).abs() < 1e-9));
    }

    #[test]
    fn recursion_limit_is_enforced() {
        let mut config = EvaluatorConfig::default();
        config.max_recursion_depth = Some(2);
        let mut evaluator = Evaluator::new(config);
        let deep = Expr::Unary(UnaryOp::Neg, Box::new(Expr::Unary(UnaryOp::Neg, Box::new(Expr::Unary(UnaryOp::Neg, Box::new(num(1)))))));
        let err = evaluator.eval(&deep).unwrap_err();
        assert!(matches!(err, CantusError::Resource(crate::error::ResourceErrorKind::RecursionDepthExceeded)));
    }
}
