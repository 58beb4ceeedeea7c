//! Tree-walking evaluator
//!
//! Executes a parsed module against an [`Environment`]. Method and free
//! function dispatch goes through the catalog, so the members completion
//! offers are exactly the members execution accepts.

use std::collections::HashMap;
use std::rc::Rc;

use thiserror::Error;
use tracing::trace;

use super::catalog::CATALOG;
use super::env::Environment;
use super::value::{compare_values, FuncValue, MapKey, Value};
use crate::frontend::parser::ast::*;

/// Maximum user-function call depth
const MAX_CALL_DEPTH: usize = 256;

/// Evaluation errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    #[error("undefined variable: {0}")]
    Undefined(String),

    #[error("unknown function: {0}")]
    UnknownFunction(String),

    #[error("unknown member `{member}` on {ty}")]
    UnknownMember { member: String, ty: String },

    #[error("value of type {0} is not callable")]
    NotCallable(String),

    #[error("value of type {0} is not indexable")]
    NotIndexable(String),

    #[error("value of type {0} is not iterable")]
    NotIterable(String),

    #[error("type mismatch: {0}")]
    TypeMismatch(String),

    #[error("division by zero")]
    DivisionByZero,

    #[error("index {index} out of bounds for length {len}")]
    IndexOutOfBounds { index: i64, len: usize },

    #[error("key not found: {0}")]
    KeyNotFound(String),

    #[error("{name}() expects {expected} argument(s), got {got}")]
    WrongArity {
        name: String,
        expected: usize,
        got: usize,
    },

    #[error("call stack depth limit exceeded")]
    CallStackOverflow,

    #[error("`return` outside of a function")]
    ReturnOutsideFunction,

    #[error("`break` or `continue` outside of a loop")]
    LoopControlOutsideLoop,

    #[error("{0}")]
    Message(String),
}

/// Runtime failure carrying the call trace captured where the error arose
#[derive(Debug, Clone)]
pub struct RuntimeFailure {
    pub error: EvalError,
    pub trace: Vec<String>,
}

impl RuntimeFailure {
    /// Render the trace innermost-first, ending at the submission itself
    pub fn trace_display(&self) -> String {
        self.trace.join(", ")
    }
}

/// Control flow produced by a statement
enum StmtFlow {
    /// Normal completion; expression statements carry their value
    Value(Option<Value>),
    Break,
    Continue,
    Return(Value),
}

/// Tree-walking interpreter over a borrowed environment
pub struct Interpreter<'a> {
    env: &'a mut Environment,
    /// One scope per active user-function call
    scopes: Vec<HashMap<String, Value>>,
    call_stack: Vec<String>,
}

impl<'a> Interpreter<'a> {
    pub fn new(env: &'a mut Environment) -> Self {
        Self {
            env,
            scopes: Vec::new(),
            call_stack: Vec::new(),
        }
    }

    /// Execute a module and return the value of its final expression
    /// statement, if any. The value is also recorded as the environment's
    /// last value.
    pub fn run_module(&mut self, module: &Module) -> Result<Option<Value>, RuntimeFailure> {
        trace!(statements = module.items.len(), "executing submission");
        let mut last = None;
        for stmt in &module.items {
            match self.exec_stmt(stmt) {
                Ok(StmtFlow::Value(v)) => last = v,
                Ok(StmtFlow::Break | StmtFlow::Continue) => {
                    return Err(self.fail(EvalError::LoopControlOutsideLoop));
                }
                Ok(StmtFlow::Return(_)) => {
                    return Err(self.fail(EvalError::ReturnOutsideFunction));
                }
                Err(e) => return Err(self.fail(e)),
            }
        }
        self.env.set_last_value(last.clone());
        Ok(last)
    }

    /// Evaluate a single expression (completion receivers go through here)
    pub fn eval_expression(&mut self, expr: &Expr) -> Result<Value, RuntimeFailure> {
        match self.eval_expr(expr) {
            Ok(v) => Ok(v),
            Err(e) => Err(self.fail(e)),
        }
    }

    fn fail(&self, error: EvalError) -> RuntimeFailure {
        let mut trace: Vec<String> = self
            .call_stack
            .iter()
            .rev()
            .map(|frame| format!("at {}", frame))
            .collect();
        trace.push("at <input>".to_string());
        RuntimeFailure { error, trace }
    }

    // === Statements ===

    fn exec_stmt(&mut self, stmt: &Stmt) -> Result<StmtFlow, EvalError> {
        match &stmt.kind {
            StmtKind::Expr(e) => Ok(StmtFlow::Value(Some(self.eval_expr(e)?))),
            StmtKind::Assign { target, op, value } => {
                self.exec_assign(target, *op, value)?;
                Ok(StmtFlow::Value(None))
            }
            // Imports are unioned by the session, not during execution
            StmtKind::Use { .. } => Ok(StmtFlow::Value(None)),
            StmtKind::FnDef { name, params, body } => {
                let func = Value::Func(FuncValue {
                    name: name.clone(),
                    params: params.clone(),
                    body: Rc::new(body.clone()),
                });
                self.bind(name, func);
                Ok(StmtFlow::Value(None))
            }
            StmtKind::If {
                cond,
                then_branch,
                else_branch,
            } => {
                if self.eval_condition(cond)? {
                    self.exec_block(then_branch)
                } else if let Some(else_branch) = else_branch {
                    self.exec_block(else_branch)
                } else {
                    Ok(StmtFlow::Value(None))
                }
            }
            StmtKind::While { cond, body } => {
                while self.eval_condition(cond)? {
                    match self.exec_block(body)? {
                        StmtFlow::Break => break,
                        StmtFlow::Continue | StmtFlow::Value(_) => {}
                        ret @ StmtFlow::Return(_) => return Ok(ret),
                    }
                }
                Ok(StmtFlow::Value(None))
            }
            StmtKind::For {
                var,
                iterable,
                body,
            } => {
                let seq = self.eval_expr(iterable)?;
                let items = seq
                    .seq_items()
                    .ok_or_else(|| EvalError::NotIterable(seq.type_name()))?;
                for item in items {
                    self.bind(var, item);
                    match self.exec_block(body)? {
                        StmtFlow::Break => break,
                        StmtFlow::Continue | StmtFlow::Value(_) => {}
                        ret @ StmtFlow::Return(_) => return Ok(ret),
                    }
                }
                Ok(StmtFlow::Value(None))
            }
            StmtKind::Return(value) => {
                if self.scopes.is_empty() {
                    return Err(EvalError::ReturnOutsideFunction);
                }
                let v = match value {
                    Some(e) => self.eval_expr(e)?,
                    None => Value::Nil,
                };
                Ok(StmtFlow::Return(v))
            }
            StmtKind::Break => Ok(StmtFlow::Break),
            StmtKind::Continue => Ok(StmtFlow::Continue),
        }
    }

    fn exec_block(&mut self, block: &Block) -> Result<StmtFlow, EvalError> {
        for stmt in &block.stmts {
            match self.exec_stmt(stmt)? {
                StmtFlow::Value(_) => {}
                other => return Ok(other),
            }
        }
        Ok(StmtFlow::Value(None))
    }

    fn exec_assign(
        &mut self,
        target: &AssignTarget,
        op: AssignOp,
        value: &Expr,
    ) -> Result<(), EvalError> {
        let rhs = self.eval_expr(value)?;
        match target {
            AssignTarget::Name(name, _) => {
                let new = match compound_binop(op) {
                    None => rhs,
                    Some(binop) => {
                        let current = self
                            .lookup(name)
                            .ok_or_else(|| EvalError::Undefined(name.clone()))?;
                        apply_binop(binop, &current, &rhs)?
                    }
                };
                self.bind(name, new);
            }
            AssignTarget::Index { recv, index, .. } => {
                let mut path = Vec::new();
                let root = self.place_root(recv, &mut path)?;
                path.push(self.eval_expr(index)?);

                let mut updated = self
                    .lookup(&root)
                    .ok_or_else(|| EvalError::Undefined(root.clone()))?;
                {
                    let mut slot = &mut updated;
                    for idx in &path[..path.len() - 1] {
                        slot = index_mut(slot, idx)?;
                    }
                    let last = &path[path.len() - 1];
                    let new = match compound_binop(op) {
                        None => rhs,
                        Some(binop) => {
                            let current = read_index(slot, last)?;
                            apply_binop(binop, &current, &rhs)?
                        }
                    };
                    store_index(slot, last, new)?;
                }
                self.bind(&root, updated);
            }
        }
        Ok(())
    }

    /// Resolve the root variable of an index-assignment place, collecting
    /// the index path of any nested receivers along the way.
    fn place_root(&mut self, expr: &Expr, path: &mut Vec<Value>) -> Result<String, EvalError> {
        match expr {
            Expr::Var(name, _) => Ok(name.clone()),
            Expr::Paren(inner, _) => self.place_root(inner, path),
            Expr::Index { recv, index, .. } => {
                let root = self.place_root(recv, path)?;
                path.push(self.eval_expr(index)?);
                Ok(root)
            }
            _ => Err(EvalError::Message(
                "cannot assign through this expression".into(),
            )),
        }
    }

    // === Expressions ===

    fn eval_expr(&mut self, expr: &Expr) -> Result<Value, EvalError> {
        match expr {
            Expr::Lit(lit, _) => Ok(literal_value(lit)),
            Expr::Var(name, _) => self
                .lookup(name)
                .ok_or_else(|| EvalError::Undefined(name.clone())),
            Expr::Paren(inner, _) => self.eval_expr(inner),
            Expr::Unary { op, expr, .. } => {
                let v = self.eval_expr(expr)?;
                match op {
                    UnOp::Neg => match v {
                        Value::Int(i) => Ok(Value::Int(-i)),
                        Value::Float(f) => Ok(Value::Float(-f)),
                        other => Err(EvalError::TypeMismatch(format!(
                            "cannot negate {}",
                            other.type_name()
                        ))),
                    },
                    UnOp::Not => match v.as_bool() {
                        Some(b) => Ok(Value::Bool(!b)),
                        None => Err(EvalError::TypeMismatch(format!(
                            "cannot apply `!` to {}",
                            v.type_name()
                        ))),
                    },
                }
            }
            Expr::Binary {
                op, left, right, ..
            } => match op {
                BinOp::And => {
                    if !self.eval_condition(left)? {
                        Ok(Value::Bool(false))
                    } else {
                        Ok(Value::Bool(self.eval_condition(right)?))
                    }
                }
                BinOp::Or => {
                    if self.eval_condition(left)? {
                        Ok(Value::Bool(true))
                    } else {
                        Ok(Value::Bool(self.eval_condition(right)?))
                    }
                }
                _ => {
                    let l = self.eval_expr(left)?;
                    let r = self.eval_expr(right)?;
                    apply_binop(*op, &l, &r)
                }
            },
            Expr::List(items, _) => {
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    out.push(self.eval_expr(item)?);
                }
                Ok(Value::List(out))
            }
            Expr::MapLit(entries, _) => {
                let mut out = indexmap::IndexMap::new();
                for (key_expr, value_expr) in entries {
                    let key = self.eval_expr(key_expr)?;
                    let key = MapKey::from_value(&key).ok_or_else(|| {
                        EvalError::TypeMismatch(format!(
                            "{} cannot be used as a map key",
                            key.type_name()
                        ))
                    })?;
                    let value = self.eval_expr(value_expr)?;
                    out.insert(key, value);
                }
                Ok(Value::Map(out))
            }
            Expr::Index { recv, index, .. } => {
                let recv_v = self.eval_expr(recv)?;
                let idx = self.eval_expr(index)?;
                match CATALOG.lookup_indexer(&recv_v.ty()) {
                    Some(indexer) => (indexer.native)(&recv_v, &[idx]),
                    None => Err(EvalError::NotIndexable(recv_v.type_name())),
                }
            }
            Expr::Member { recv, name, .. } => {
                let recv_v = self.eval_expr(recv)?;
                let ty = recv_v.ty();
                match CATALOG.lookup_property(&ty, name) {
                    Some(prop) => (prop.native)(&recv_v, &[]),
                    None => {
                        if CATALOG.has_callable_named(self.env.imports(), &ty, name) {
                            Err(EvalError::Message(format!(
                                "`{}` is a method; call it with arguments",
                                name
                            )))
                        } else {
                            Err(EvalError::UnknownMember {
                                member: name.clone(),
                                ty: ty.to_string(),
                            })
                        }
                    }
                }
            }
            Expr::Call { callee, args, .. } => self.eval_call(callee, args),
        }
    }

    fn eval_call(&mut self, callee: &Expr, args: &[Expr]) -> Result<Value, EvalError> {
        match callee {
            Expr::Member { recv, name, .. } => {
                let recv_v = self.eval_expr(recv)?;
                let arg_values = self.eval_args(args)?;
                let ty = recv_v.ty();

                if let Some(method) = CATALOG.lookup_method(&ty, name, arg_values.len()) {
                    return (method.native)(&recv_v, &arg_values);
                }
                if let Some(ext) =
                    CATALOG.resolve_extension(self.env.imports(), &ty, name, arg_values.len())
                {
                    let mut all = Vec::with_capacity(arg_values.len() + 1);
                    all.push(recv_v);
                    all.extend(arg_values);
                    return (ext.native)(&all);
                }
                Err(EvalError::UnknownMember {
                    member: name.clone(),
                    ty: ty.to_string(),
                })
            }
            Expr::Var(name, _) => match self.lookup(name) {
                Some(Value::Func(func)) => {
                    let arg_values = self.eval_args(args)?;
                    self.call_function(&func, arg_values)
                }
                Some(other) => Err(EvalError::NotCallable(other.type_name())),
                None => {
                    let arg_values = self.eval_args(args)?;
                    match CATALOG.resolve_call(self.env.imports(), name, &arg_values) {
                        Some(def) => (def.native)(&arg_values),
                        None => Err(EvalError::UnknownFunction(name.clone())),
                    }
                }
            },
            other => {
                let callee_v = self.eval_expr(other)?;
                let arg_values = self.eval_args(args)?;
                match callee_v {
                    Value::Func(func) => self.call_function(&func, arg_values),
                    other => Err(EvalError::NotCallable(other.type_name())),
                }
            }
        }
    }

    fn eval_args(&mut self, args: &[Expr]) -> Result<Vec<Value>, EvalError> {
        let mut out = Vec::with_capacity(args.len());
        for arg in args {
            out.push(self.eval_expr(arg)?);
        }
        Ok(out)
    }

    fn call_function(&mut self, func: &FuncValue, args: Vec<Value>) -> Result<Value, EvalError> {
        if args.len() != func.params.len() {
            return Err(EvalError::WrongArity {
                name: func.name.clone(),
                expected: func.params.len(),
                got: args.len(),
            });
        }
        if self.call_stack.len() >= MAX_CALL_DEPTH {
            return Err(EvalError::CallStackOverflow);
        }

        let scope: HashMap<String, Value> = func.params.iter().cloned().zip(args).collect();
        self.scopes.push(scope);
        self.call_stack.push(func.name.clone());

        let flow = self.exec_block(&func.body)?;
        // Frames are popped only on success; on error they stay in place so
        // the failure trace reflects where execution stopped.
        self.call_stack.pop();
        self.scopes.pop();

        match flow {
            StmtFlow::Return(v) => Ok(v),
            StmtFlow::Value(_) => Ok(Value::Nil),
            StmtFlow::Break | StmtFlow::Continue => Err(EvalError::LoopControlOutsideLoop),
        }
    }

    fn eval_condition(&mut self, expr: &Expr) -> Result<bool, EvalError> {
        let v = self.eval_expr(expr)?;
        v.as_bool().ok_or_else(|| {
            EvalError::TypeMismatch(format!("condition must be Bool, got {}", v.type_name()))
        })
    }

    // === Bindings ===

    fn bind(&mut self, name: &str, value: Value) {
        match self.scopes.last_mut() {
            Some(scope) => {
                scope.insert(name.to_string(), value);
            }
            None => self.env.assign(name, value),
        }
    }

    fn lookup(&self, name: &str) -> Option<Value> {
        for scope in self.scopes.iter().rev() {
            if let Some(v) = scope.get(name) {
                return Some(v.clone());
            }
        }
        self.env.lookup(name).cloned()
    }
}

// === Operator semantics ===

fn literal_value(lit: &Literal) -> Value {
    match lit {
        Literal::Int(v) => Value::Int(*v),
        Literal::Float(v) => Value::Float(*v),
        Literal::Str(s) => Value::Str(s.clone()),
        Literal::Bool(b) => Value::Bool(*b),
        Literal::Nil => Value::Nil,
    }
}

fn compound_binop(op: AssignOp) -> Option<BinOp> {
    match op {
        AssignOp::Set => None,
        AssignOp::Add => Some(BinOp::Add),
        AssignOp::Sub => Some(BinOp::Sub),
        AssignOp::Mul => Some(BinOp::Mul),
        AssignOp::Div => Some(BinOp::Div),
    }
}

fn op_symbol(op: BinOp) -> &'static str {
    match op {
        BinOp::Add => "+",
        BinOp::Sub => "-",
        BinOp::Mul => "*",
        BinOp::Div => "/",
        BinOp::Mod => "%",
        BinOp::Eq => "==",
        BinOp::Neq => "!=",
        BinOp::Lt => "<",
        BinOp::Le => "<=",
        BinOp::Gt => ">",
        BinOp::Ge => ">=",
        BinOp::And => "&&",
        BinOp::Or => "||",
        BinOp::Range => "..",
    }
}

fn type_error(op: BinOp, l: &Value, r: &Value) -> EvalError {
    EvalError::TypeMismatch(format!(
        "cannot apply `{}` to {} and {}",
        op_symbol(op),
        l.type_name(),
        r.type_name()
    ))
}

fn checked_int(op: BinOp, result: Option<i64>) -> Result<Value, EvalError> {
    result
        .map(Value::Int)
        .ok_or_else(|| EvalError::Message(format!("integer overflow in `{}`", op_symbol(op))))
}

fn apply_binop(op: BinOp, l: &Value, r: &Value) -> Result<Value, EvalError> {
    use Value::*;
    match op {
        BinOp::Add => match (l, r) {
            (Int(a), Int(b)) => checked_int(op, a.checked_add(*b)),
            (Str(a), Str(b)) => Ok(Str(format!("{}{}", a, b))),
            (List(a), List(b)) => {
                let mut out = a.clone();
                out.extend(b.iter().cloned());
                Ok(List(out))
            }
            _ => float_binop(op, l, r),
        },
        BinOp::Sub => match (l, r) {
            (Int(a), Int(b)) => checked_int(op, a.checked_sub(*b)),
            _ => float_binop(op, l, r),
        },
        BinOp::Mul => match (l, r) {
            (Int(a), Int(b)) => checked_int(op, a.checked_mul(*b)),
            _ => float_binop(op, l, r),
        },
        BinOp::Div => match (l, r) {
            (Int(_), Int(0)) => Err(EvalError::DivisionByZero),
            (Int(a), Int(b)) => checked_int(op, a.checked_div(*b)),
            _ => float_binop(op, l, r),
        },
        BinOp::Mod => match (l, r) {
            (Int(_), Int(0)) => Err(EvalError::DivisionByZero),
            (Int(a), Int(b)) => checked_int(op, a.checked_rem(*b)),
            _ => float_binop(op, l, r),
        },
        BinOp::Eq => Ok(Bool(l == r)),
        BinOp::Neq => Ok(Bool(l != r)),
        BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge => match compare_values(l, r) {
            Some(ord) => {
                let holds = match op {
                    BinOp::Lt => ord.is_lt(),
                    BinOp::Le => ord.is_le(),
                    BinOp::Gt => ord.is_gt(),
                    _ => ord.is_ge(),
                };
                Ok(Bool(holds))
            }
            None => Err(type_error(op, l, r)),
        },
        BinOp::Range => match (l, r) {
            (Int(a), Int(b)) => Ok(Range(*a, *b)),
            _ => Err(type_error(op, l, r)),
        },
        // Short-circuit operators are handled before operand evaluation
        BinOp::And | BinOp::Or => Err(type_error(op, l, r)),
    }
}

fn float_binop(op: BinOp, l: &Value, r: &Value) -> Result<Value, EvalError> {
    let (a, b) = match (l, r) {
        (Value::Float(a), Value::Float(b)) => (*a, *b),
        (Value::Int(a), Value::Float(b)) => (*a as f64, *b),
        (Value::Float(a), Value::Int(b)) => (*a, *b as f64),
        _ => return Err(type_error(op, l, r)),
    };
    let result = match op {
        BinOp::Add => a + b,
        BinOp::Sub => a - b,
        BinOp::Mul => a * b,
        BinOp::Div => a / b,
        BinOp::Mod => a % b,
        _ => return Err(type_error(op, l, r)),
    };
    Ok(Value::Float(result))
}

// === Index-assignment plumbing ===

fn index_int(index: &Value) -> Result<i64, EvalError> {
    match index {
        Value::Int(i) => Ok(*i),
        other => Err(EvalError::TypeMismatch(format!(
            "index must be Int, got {}",
            other.type_name()
        ))),
    }
}

fn index_mut<'v>(slot: &'v mut Value, index: &Value) -> Result<&'v mut Value, EvalError> {
    match slot {
        Value::List(items) => {
            let i = index_int(index)?;
            let len = items.len();
            if i < 0 || i as usize >= len {
                return Err(EvalError::IndexOutOfBounds { index: i, len });
            }
            Ok(&mut items[i as usize])
        }
        Value::Map(entries) => {
            let key = MapKey::from_value(index).ok_or_else(|| {
                EvalError::TypeMismatch(format!(
                    "{} cannot be used as a map key",
                    index.type_name()
                ))
            })?;
            entries
                .get_mut(&key)
                .ok_or_else(|| EvalError::KeyNotFound(key.to_value().to_string()))
        }
        other => Err(EvalError::NotIndexable(other.type_name())),
    }
}

fn read_index(slot: &Value, index: &Value) -> Result<Value, EvalError> {
    match slot {
        Value::List(items) => {
            let i = index_int(index)?;
            if i < 0 || i as usize >= items.len() {
                return Err(EvalError::IndexOutOfBounds {
                    index: i,
                    len: items.len(),
                });
            }
            Ok(items[i as usize].clone())
        }
        Value::Map(entries) => {
            let key = MapKey::from_value(index).ok_or_else(|| {
                EvalError::TypeMismatch(format!(
                    "{} cannot be used as a map key",
                    index.type_name()
                ))
            })?;
            entries
                .get(&key)
                .cloned()
                .ok_or_else(|| EvalError::KeyNotFound(key.to_value().to_string()))
        }
        other => Err(EvalError::NotIndexable(other.type_name())),
    }
}

fn store_index(slot: &mut Value, index: &Value, value: Value) -> Result<(), EvalError> {
    match slot {
        Value::List(items) => {
            let i = index_int(index)?;
            let len = items.len();
            if i < 0 || i as usize >= len {
                return Err(EvalError::IndexOutOfBounds { index: i, len });
            }
            items[i as usize] = value;
            Ok(())
        }
        Value::Map(entries) => {
            let key = MapKey::from_value(index).ok_or_else(|| {
                EvalError::TypeMismatch(format!(
                    "{} cannot be used as a map key",
                    index.type_name()
                ))
            })?;
            entries.insert(key, value);
            Ok(())
        }
        other => Err(EvalError::NotIndexable(other.type_name())),
    }
}
