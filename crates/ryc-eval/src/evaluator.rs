//! Core expression and statement evaluator.

use std::rc::Rc;

use ryc_types::ast::*;
use ryc_types::numeric::Number;
use ryc_types::stack::ensure_sufficient_stack;
use ryc_types::{ErrorCode, Result, RycError};
use tracing::{debug, instrument, trace};

use crate::cast;
use crate::config::EvalConfig;
use crate::env::{Binding, Environment, ScopeId};
use crate::host::Host;
use crate::natives::{NativeContext, NativeRegistry};
use crate::ops;
use crate::value::{ArrayRef, Closure, Value};

/// Outcome of evaluating a statement.
///
/// `Break`, `Continue` and `Return` travel up to the loop or call that
/// consumes them; they never become values visible to the program.
#[derive(Debug, Clone, PartialEq)]
pub enum Flow {
    Normal(Value),
    Break,
    Continue,
    Return(Value),
}

impl Flow {
    pub fn into_value(self) -> Value {
        match self {
            Flow::Normal(v) | Flow::Return(v) => v,
            Flow::Break | Flow::Continue => Value::Null,
        }
    }
}

/// The tree-walking evaluator.
pub struct Evaluator<'h> {
    env: Environment,
    natives: NativeRegistry,
    config: EvalConfig,
    host: &'h mut dyn Host,
    /// Loops entered within the current call frame.
    loop_depth: usize,
    /// Nested user-function calls.
    call_depth: usize,
}

impl<'h> Evaluator<'h> {
    /// An evaluator with default limits and the bundled natives.
    pub fn new(host: &'h mut dyn Host) -> Self {
        Self::with_config(host, EvalConfig::default(), NativeRegistry::with_defaults())
    }

    pub fn with_config(host: &'h mut dyn Host, config: EvalConfig, natives: NativeRegistry) -> Self {
        Self {
            env: Environment::new(),
            natives,
            config,
            host,
            loop_depth: 0,
            call_depth: 0,
        }
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    /// Read a global binding after (or between) runs.
    pub fn global(&self, name: &str) -> Result<Value> {
        self.env.lookup(self.env.global(), name, 0)
    }

    /// Run a program in the global scope. The result is the value of the
    /// last top-level statement.
    #[instrument(level = "debug", skip_all, fields(statements = program.stmts.len()))]
    pub fn run(&mut self, program: &Program) -> Result<Value> {
        let global = self.env.global();
        let flow = self.eval_stmts(&program.stmts, global)?;
        debug!(scopes = self.env.depth(), "program finished");
        Ok(flow.into_value())
    }

    // ══════════════════════════════════════════════════════════════════════
    // Scopes
    // ══════════════════════════════════════════════════════════════════════

    /// Run `f` in a fresh child of `parent`, releasing it on every exit path.
    fn in_scope<T>(
        &mut self,
        parent: ScopeId,
        line: u32,
        f: impl FnOnce(&mut Self, ScopeId) -> Result<T>,
    ) -> Result<T> {
        let scope = self.env.push(parent, line)?;
        let result = f(self, scope);
        self.env.pop(scope);
        result
    }

    fn in_loop<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        self.loop_depth += 1;
        let result = f(self);
        self.loop_depth -= 1;
        result
    }

    // ══════════════════════════════════════════════════════════════════════
    // Statements
    // ══════════════════════════════════════════════════════════════════════

    /// Evaluate a block in its own scope.
    pub fn eval_block(&mut self, block: &Block, scope: ScopeId) -> Result<Flow> {
        self.in_scope(scope, block.span.line(), |ev, inner| {
            ev.eval_stmts(&block.stmts, inner)
        })
    }

    /// Evaluate statements in order, stopping at the first control signal.
    fn eval_stmts(&mut self, stmts: &[Stmt], scope: ScopeId) -> Result<Flow> {
        let mut last = Value::Null;
        for stmt in stmts {
            match self.eval_stmt(stmt, scope)? {
                Flow::Normal(value) => last = value,
                signal => return Ok(signal),
            }
        }
        Ok(Flow::Normal(last))
    }

    pub fn eval_stmt(&mut self, stmt: &Stmt, scope: ScopeId) -> Result<Flow> {
        ensure_sufficient_stack(|| self.eval_stmt_inner(stmt, scope))
    }

    fn eval_stmt_inner(&mut self, stmt: &Stmt, scope: ScopeId) -> Result<Flow> {
        trace!(line = stmt.span().line(), "statement");
        match stmt {
            Stmt::VarDecl(decl) => self.eval_var_decl(decl, scope).map(Flow::Normal),
            Stmt::If(if_stmt) => self.eval_if(if_stmt, scope),
            Stmt::While(while_stmt) => self.eval_while(while_stmt, scope),
            Stmt::For(for_stmt) => self.eval_for(for_stmt, scope),
            Stmt::FuncDecl(decl) => self.eval_func_decl(decl, scope),
            Stmt::Return(ret) => self.eval_return(ret, scope),
            Stmt::Break(span) => self.loop_signal("break", *span).map(|()| Flow::Break),
            Stmt::Continue(span) => self.loop_signal("continue", *span).map(|()| Flow::Continue),
            Stmt::Block(block) => self.eval_block(block, scope),
            Stmt::Expr(stmt) => self.eval_expr(&stmt.expr, scope).map(Flow::Normal),
        }
    }

    fn eval_var_decl(&mut self, decl: &VarDecl, scope: ScopeId) -> Result<Value> {
        let line = decl.span.line();
        let value = match &decl.init {
            Some(init) => self.eval_expr(init, scope)?,
            None => cast::default_value(&decl.ty),
        };
        let ty = cast::infer(&decl.ty, &value);
        // An explicit cast initializer is stored as the cast produced it.
        let value = match decl.init.as_ref().map(|e| &e.kind) {
            Some(ExprKind::Cast { .. }) => value,
            _ => cast::coerce(value, &ty, line)?,
        };
        trace!(name = %decl.name.name, ty = %ty, "declare");
        let binding = Binding {
            value: value.clone(),
            ty,
            is_const: decl.is_const,
        };
        self.env.declare(scope, &decl.name.name, binding, line)?;
        Ok(value)
    }

    fn eval_if(&mut self, stmt: &IfStmt, scope: ScopeId) -> Result<Flow> {
        if self.eval_expr(&stmt.condition, scope)?.is_truthy() {
            return self.eval_block(&stmt.then_block, scope);
        }
        match &stmt.else_branch {
            Some(ElseBranch::ElseIf(next)) => self.eval_if(next, scope),
            Some(ElseBranch::Block(block)) => self.eval_block(block, scope),
            None => Ok(Flow::Normal(Value::Null)),
        }
    }

    fn eval_while(&mut self, stmt: &WhileStmt, scope: ScopeId) -> Result<Flow> {
        self.in_loop(|ev| {
            while ev.eval_expr(&stmt.condition, scope)?.is_truthy() {
                match ev.eval_block(&stmt.body, scope)? {
                    Flow::Break => break,
                    Flow::Return(value) => return Ok(Flow::Return(value)),
                    Flow::Normal(_) | Flow::Continue => {}
                }
            }
            Ok(Flow::Normal(Value::Null))
        })
    }

    /// The init clause runs in a scope of its own, so the loop variable
    /// does not outlive the loop.
    fn eval_for(&mut self, stmt: &ForStmt, scope: ScopeId) -> Result<Flow> {
        self.in_scope(scope, stmt.span.line(), |ev, header| {
            match stmt.init.as_deref() {
                Some(ForInit::VarDecl(decl)) => {
                    ev.eval_var_decl(decl, header)?;
                }
                Some(ForInit::Expr(expr)) => {
                    ev.eval_expr(expr, header)?;
                }
                None => {}
            }
            ev.in_loop(|ev| {
                loop {
                    if let Some(condition) = &stmt.condition {
                        if !ev.eval_expr(condition, header)?.is_truthy() {
                            break;
                        }
                    }
                    match ev.eval_block(&stmt.body, header)? {
                        Flow::Break => break,
                        Flow::Return(value) => return Ok(Flow::Return(value)),
                        Flow::Normal(_) | Flow::Continue => {}
                    }
                    if let Some(update) = &stmt.update {
                        ev.eval_expr(update, header)?;
                    }
                }
                Ok(Flow::Normal(Value::Null))
            })
        })
    }

    fn eval_func_decl(&mut self, decl: &Rc<FuncDecl>, scope: ScopeId) -> Result<Flow> {
        let closure = Value::Function(Closure {
            decl: Rc::clone(decl),
            scope,
        });
        let binding = Binding {
            value: closure,
            ty: TypeAnnotation::scalar(TypeName::Auto, decl.name.span),
            is_const: true,
        };
        self.env.declare(scope, &decl.name.name, binding, decl.span.line())?;
        debug!(function = %decl.name.name, params = decl.params.len(), "declared function");
        Ok(Flow::Normal(Value::Null))
    }

    fn eval_return(&mut self, stmt: &ReturnStmt, scope: ScopeId) -> Result<Flow> {
        let line = stmt.span.line();
        let Some(return_type) = self.env.return_type(scope, line)?.cloned() else {
            return Err(RycError::runtime(
                ErrorCode::RETURN_OUTSIDE_FUNCTION,
                "'return' outside of a function",
                line,
            ));
        };
        let Some(expr) = &stmt.value else {
            return Ok(Flow::Return(Value::Null));
        };
        if return_type.base == TypeName::Void {
            return Err(RycError::runtime(
                ErrorCode::VOID_RETURN_VALUE,
                "a void function cannot return a value",
                line,
            ));
        }
        let value = self.eval_expr(expr, scope)?;
        Ok(Flow::Return(cast::coerce(value, &return_type, line)?))
    }

    fn loop_signal(&self, keyword: &str, span: ryc_types::Span) -> Result<()> {
        if self.loop_depth == 0 {
            return Err(RycError::runtime(
                ErrorCode::CONTROL_OUTSIDE_LOOP,
                format!("'{keyword}' outside of a loop"),
                span.line(),
            ));
        }
        Ok(())
    }

    // ══════════════════════════════════════════════════════════════════════
    // Expressions
    // ══════════════════════════════════════════════════════════════════════

    /// Evaluate an expression to a Value.
    pub fn eval_expr(&mut self, expr: &Expr, scope: ScopeId) -> Result<Value> {
        ensure_sufficient_stack(|| self.eval_expr_inner(expr, scope))
    }

    fn eval_expr_inner(&mut self, expr: &Expr, scope: ScopeId) -> Result<Value> {
        let line = expr.span.line();
        match &expr.kind {
            ExprKind::NumberLit(Number::Int(i)) => Ok(Value::Int(*i)),
            ExprKind::NumberLit(Number::Float(f)) => Ok(Value::Float(*f)),
            ExprKind::StringLit(s) => Ok(Value::String(s.clone())),
            ExprKind::CharLit(c) => Ok(Value::Char(*c)),
            ExprKind::BoolLit(b) => Ok(Value::Bool(*b)),
            ExprKind::NullLit => Ok(Value::Null),
            ExprKind::ArrayLit(elements) => {
                let items = elements
                    .iter()
                    .map(|e| self.eval_expr(e, scope))
                    .collect::<Result<Vec<_>>>()?;
                Ok(Value::array(items))
            }

            ExprKind::Identifier(name) => self.eval_identifier(name, scope, line),
            ExprKind::Index { object, index } => {
                let (array, i) = self.index_slot(object, index, scope, line)?;
                Ok(array.get(i).unwrap_or(Value::Null))
            }
            ExprKind::Call { callee, args } => self.eval_call(callee, args, scope, line),
            ExprKind::Cast { target, expr } => {
                let value = self.eval_expr(expr, scope)?;
                cast::cast(&value, target, line)
            }

            ExprKind::Binary { left, op, right } => self.eval_binary(left, *op, right, scope, line),
            ExprKind::Unary { op, operand } => {
                let value = self.eval_expr(operand, scope)?;
                ops::unary(*op, &value, line)
            }
            ExprKind::Update { op, prefix, target } => {
                self.eval_update(*op, *prefix, target, scope, line)
            }
            ExprKind::Assign { target, value } => self.eval_assign(target, value, scope, line),
        }
    }

    // ── Names & Indexing ─────────────────────────────────────────────────

    /// Scopes first, then the native registry.
    fn eval_identifier(&self, name: &str, scope: ScopeId, line: u32) -> Result<Value> {
        if self.env.find(scope, name, line)?.is_none() {
            if let Some(native) = self.natives.get(name) {
                return Ok(Value::Native(native.clone()));
            }
        }
        self.env.lookup(scope, name, line)
    }

    /// Evaluate `object[index]` down to a bounds-checked slot.
    fn index_slot(
        &mut self,
        object: &Expr,
        index: &Expr,
        scope: ScopeId,
        line: u32,
    ) -> Result<(ArrayRef, usize)> {
        let array = match self.eval_expr(object, scope)? {
            Value::Array(array) => array,
            other => {
                return Err(RycError::runtime(
                    ErrorCode::NOT_AN_ARRAY,
                    format!("cannot index into {}", other.kind_name()),
                    line,
                ))
            }
        };
        let i = match self.eval_expr(index, scope)? {
            Value::Int(i) => i,
            other => {
                return Err(RycError::runtime(
                    ErrorCode::TYPE_MISMATCH,
                    format!("array index must be an int, got {}", other.kind_name()),
                    line,
                ))
            }
        };
        let len = array.len();
        match usize::try_from(i) {
            Ok(slot) if slot < len => Ok((array, slot)),
            _ => Err(out_of_bounds(i, len, line)),
        }
    }

    /// Store into an array slot, coercing to the array's element type.
    /// An array may not end up inside itself.
    fn store(&self, array: &ArrayRef, slot: usize, value: Value, line: u32) -> Result<Value> {
        let value = match array.element_type() {
            Some(element) => cast::coerce_element(value, element, line)?,
            None => value,
        };
        if let Value::Array(stored) = &value {
            if stored.reaches(array) {
                return Err(RycError::runtime(
                    ErrorCode::CYCLIC_ARRAY,
                    "cannot store an array inside itself",
                    line,
                ));
            }
        }
        if !array.set(slot, value.clone()) {
            return Err(out_of_bounds(slot as i64, array.len(), line));
        }
        Ok(value)
    }

    // ── Assignment ───────────────────────────────────────────────────────

    fn eval_assign(&mut self, target: &Expr, value: &Expr, scope: ScopeId, line: u32) -> Result<Value> {
        match &target.kind {
            ExprKind::Identifier(name) => {
                let value = self.eval_expr(value, scope)?;
                self.env.assign(scope, name, value, line)
            }
            ExprKind::Index { object, index } => {
                let (array, slot) = self.index_slot(object, index, scope, line)?;
                let value = self.eval_expr(value, scope)?;
                self.store(&array, slot, value, line)
            }
            _ => Err(invalid_target("assignment", line)),
        }
    }

    /// `++x`, `x--`, `a[i]++`: returns the new value when prefix, else the old.
    fn eval_update(
        &mut self,
        op: UpdateOp,
        prefix: bool,
        target: &Expr,
        scope: ScopeId,
        line: u32,
    ) -> Result<Value> {
        let (old, new) = match &target.kind {
            ExprKind::Identifier(name) => {
                let old = self.env.lookup(scope, name, line)?;
                let next = ops::step(op, &old, line)?;
                let new = self.env.assign(scope, name, next, line)?;
                (old, new)
            }
            ExprKind::Index { object, index } => {
                let (array, slot) = self.index_slot(object, index, scope, line)?;
                let old = array.get(slot).unwrap_or(Value::Null);
                let next = ops::step(op, &old, line)?;
                let new = self.store(&array, slot, next, line)?;
                (old, new)
            }
            _ => return Err(invalid_target(op.as_str(), line)),
        };
        Ok(if prefix { new } else { old })
    }

    // ── Operators ────────────────────────────────────────────────────────

    fn eval_binary(
        &mut self,
        left: &Expr,
        op: BinOp,
        right: &Expr,
        scope: ScopeId,
        line: u32,
    ) -> Result<Value> {
        // Short-circuit for logical operators
        if op.is_logical() {
            let lhs = self.eval_expr(left, scope)?.is_truthy();
            if lhs == (op == BinOp::Or) {
                return Ok(Value::Bool(lhs));
            }
            let rhs = self.eval_expr(right, scope)?.is_truthy();
            return Ok(Value::Bool(rhs));
        }

        let lhs = self.eval_expr(left, scope)?;
        let rhs = self.eval_expr(right, scope)?;
        if (lhs.is_null() || rhs.is_null()) && !matches!(op, BinOp::Eq | BinOp::NotEq) {
            return Ok(Value::Null);
        }
        ops::binary(op, &lhs, &rhs, line)
    }

    // ── Calls ────────────────────────────────────────────────────────────

    fn eval_call(&mut self, callee: &Expr, args: &[Expr], scope: ScopeId, line: u32) -> Result<Value> {
        let function = self.eval_expr(callee, scope)?;
        let args = args
            .iter()
            .map(|arg| self.eval_expr(arg, scope))
            .collect::<Result<Vec<_>>>()?;
        match function {
            Value::Native(native) => {
                trace!(native = %native.name, args = args.len(), "calling native");
                let mut cx = NativeContext {
                    env: &mut self.env,
                    scope,
                    host: &mut *self.host,
                    line,
                };
                (native.func)(&args, &mut cx)
            }
            Value::Function(closure) => self.call_function(&closure, args, line),
            other => {
                let message = match &callee.kind {
                    ExprKind::Identifier(name) => {
                        format!("'{name}' is not a function (it holds {})", other.kind_name())
                    }
                    _ => format!("cannot call a value of kind {}", other.kind_name()),
                };
                Err(RycError::runtime(ErrorCode::NOT_CALLABLE, message, line))
            }
        }
    }

    /// Call a user function with already-evaluated arguments.
    ///
    /// The frame is parented at the closure's scope, not the caller's.
    pub fn call_function(&mut self, closure: &Closure, args: Vec<Value>, line: u32) -> Result<Value> {
        let decl = &closure.decl;
        if args.len() != decl.params.len() {
            return Err(RycError::runtime(
                ErrorCode::ARGUMENT_COUNT,
                format!(
                    "function '{}' expects {} argument(s), got {}",
                    decl.name.name,
                    decl.params.len(),
                    args.len()
                ),
                line,
            ));
        }
        if self.call_depth >= self.config.max_call_depth {
            return Err(RycError::runtime(
                ErrorCode::CALL_DEPTH_EXCEEDED,
                format!(
                    "maximum call depth of {} exceeded in '{}'",
                    self.config.max_call_depth, decl.name.name
                ),
                line,
            ));
        }

        debug!(function = %decl.name.name, depth = self.call_depth + 1, "call");
        let frame = self
            .env
            .push_function(closure.scope, decl.return_type.clone(), line)?;
        self.call_depth += 1;
        let saved_loops = std::mem::replace(&mut self.loop_depth, 0);

        let result = self.bind_and_run(decl, args, frame, line);

        self.loop_depth = saved_loops;
        self.call_depth -= 1;
        self.env.pop(frame);
        result
    }

    fn bind_and_run(&mut self, decl: &FuncDecl, args: Vec<Value>, frame: ScopeId, line: u32) -> Result<Value> {
        for (param, arg) in decl.params.iter().zip(args) {
            let ty = cast::infer(&param.ty, &arg);
            let value = cast::coerce(arg, &ty, line)?;
            let binding = Binding {
                value,
                ty,
                is_const: false,
            };
            self.env.declare(frame, &param.name.name, binding, line)?;
        }
        match self.eval_block(&decl.body, frame)? {
            Flow::Return(value) => Ok(value),
            // The last value doubles as an implicit return.
            _ if decl.return_type.base == TypeName::Void => Ok(Value::Null),
            flow => cast::coerce(flow.into_value(), &decl.return_type, line),
        }
    }
}

fn out_of_bounds(index: impl std::fmt::Display, len: usize, line: u32) -> RycError {
    RycError::runtime(
        ErrorCode::INDEX_OUT_OF_BOUNDS,
        format!("index {index} out of bounds for array of length {len}"),
        line,
    )
}

fn invalid_target(what: &str, line: u32) -> RycError {
    RycError::runtime(
        ErrorCode::INVALID_ASSIGNMENT_TARGET,
        format!("invalid target for '{what}': expected a variable or an array element"),
        line,
    )
}
