//! Tree-walking interpreter for checked programs.
//!
//! Evaluation is single-threaded and top to bottom. Static types play no
//! part here: assertions are not validated and private members are
//! readable, exactly as in the erased runtime the checker models.

mod expr;

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use tycat_core::ast::{Expr, ExprKind, Program, Stmt, StmtKind};
use tycat_core::EnumTable;

use crate::sink::Sink;
use crate::types::EvalError;
use crate::value::{Builtin, ClassValue, Value};

/// Default budget of statements and loop iterations per program.
pub const DEFAULT_STEP_LIMIT: u64 = 100_000;
const MAX_CALL_DEPTH: usize = 64;
/// How far past its end one index write may extend an array.
const MAX_ARRAY_GROWTH: usize = 1 << 16;

struct Frame {
    vars: HashMap<String, Value>,
    parent: Option<Env>,
}

/// A lexical scope. Closures keep the scope they were created in alive, so
/// a closure stored in its own scope forms an `Rc` cycle. Global cycles are
/// broken when the interpreter drops; cycles through a call frame that
/// escapes as a closure are left to process exit.
#[derive(Clone)]
pub struct Env(Rc<RefCell<Frame>>);

impl fmt::Debug for Env {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Env({} vars)", self.0.borrow().vars.len())
    }
}

impl Env {
    fn root() -> Self {
        Env(Rc::new(RefCell::new(Frame {
            vars: HashMap::new(),
            parent: None,
        })))
    }

    pub(crate) fn child(&self) -> Self {
        Env(Rc::new(RefCell::new(Frame {
            vars: HashMap::new(),
            parent: Some(self.clone()),
        })))
    }

    pub(crate) fn define(&self, name: &str, value: Value) {
        self.0.borrow_mut().vars.insert(name.to_owned(), value);
    }

    pub(crate) fn get(&self, name: &str) -> Option<Value> {
        let frame = self.0.borrow();
        match frame.vars.get(name) {
            Some(v) => Some(v.clone()),
            None => frame.parent.as_ref().and_then(|p| p.get(name)),
        }
    }

    /// Overwrite an existing binding; false if `name` is not bound.
    pub(crate) fn set(&self, name: &str, value: Value) -> bool {
        let mut frame = self.0.borrow_mut();
        if let Some(slot) = frame.vars.get_mut(name) {
            *slot = value;
            return true;
        }
        match &frame.parent {
            Some(p) => p.set(name, value),
            None => false,
        }
    }
}

/// How a statement finished.
pub(crate) enum Flow {
    Normal,
    Return(Value),
    Break,
}

pub struct Interpreter {
    globals: Env,
    sink: Box<dyn Sink>,
    steps: u64,
    step_limit: u64,
    depth: usize,
}

impl Drop for Interpreter {
    fn drop(&mut self) {
        self.globals.0.borrow_mut().vars.clear();
    }
}

impl Interpreter {
    pub fn new(sink: Box<dyn Sink>) -> Self {
        let globals = Env::root();
        globals.define(
            "console",
            Value::object(vec![("log".into(), Value::Builtin(Builtin::ConsoleLog))]),
        );
        globals.define("alert", Value::Builtin(Builtin::Alert));
        globals.define("Error", Value::Builtin(Builtin::ErrorCtor));
        Interpreter {
            globals,
            sink,
            steps: 0,
            step_limit: DEFAULT_STEP_LIMIT,
            depth: 0,
        }
    }

    pub fn with_step_limit(mut self, limit: u64) -> Self {
        self.step_limit = limit;
        self
    }

    /// Run a program's statements in the global scope. Declarations stay
    /// visible to later calls. The step budget is per call.
    pub fn run(&mut self, program: &Program) -> Result<(), EvalError> {
        self.steps = 0;
        let env = self.globals.clone();
        for stmt in &program.stmts {
            match self.exec(stmt, &env)? {
                Flow::Normal => {}
                // The checker rejects top-level return/break.
                Flow::Return(_) | Flow::Break => break,
            }
        }
        Ok(())
    }

    /// Evaluate one expression against the global scope.
    pub fn eval_expression(&mut self, expr: &Expr) -> Result<Value, EvalError> {
        self.steps = 0;
        let env = self.globals.clone();
        self.eval(expr, &env)
    }

    pub fn global(&self, name: &str) -> Option<Value> {
        self.globals.get(name)
    }

    fn tick(&mut self) -> Result<(), EvalError> {
        self.steps += 1;
        if self.steps > self.step_limit {
            return Err(EvalError::Diverged {
                limit: self.step_limit,
            });
        }
        Ok(())
    }

    fn exec_block(&mut self, stmts: &[Stmt], env: &Env) -> Result<Flow, EvalError> {
        let scope = env.child();
        for s in stmts {
            match self.exec(s, &scope)? {
                Flow::Normal => {}
                other => return Ok(other),
            }
        }
        Ok(Flow::Normal)
    }

    pub(crate) fn exec(&mut self, stmt: &Stmt, env: &Env) -> Result<Flow, EvalError> {
        self.tick()?;
        match &stmt.kind {
            StmtKind::Let { name, init, .. } => {
                let value = match init {
                    Some(e) => self.eval(e, env)?,
                    None => Value::Undefined,
                };
                env.define(name, value);
            }
            StmtKind::Assign { target, value } => self.assign(target, value, env)?,
            StmtKind::Expr(e) => {
                self.eval(e, env)?;
            }
            StmtKind::Enum(decl) => {
                let table = EnumTable::build(decl, "<runtime>")
                    .map_err(|d| EvalError::type_error(d.message))?;
                env.define(&decl.name, Value::Enum(Rc::new(table)));
            }
            StmtKind::Interface(_) | StmtKind::TypeAlias { .. } => {}
            StmtKind::Class(decl) => env.define(
                &decl.name,
                Value::Class(Rc::new(ClassValue {
                    decl: decl.clone(),
                    env: env.clone(),
                })),
            ),
            StmtKind::Throw(e) => {
                let thrown = self.eval(e, env)?;
                let message = match &thrown {
                    Value::Error(msg) => msg.to_string(),
                    other => other.to_js_string(),
                };
                log::debug!("line {}: throw {}", stmt.line, message);
                return Err(EvalError::Thrown { message });
            }
            StmtKind::Return(value) => {
                let v = match value {
                    Some(e) => self.eval(e, env)?,
                    None => Value::Undefined,
                };
                return Ok(Flow::Return(v));
            }
            StmtKind::If {
                cond,
                then_branch,
                else_branch,
            } => {
                if self.eval(cond, env)?.is_truthy() {
                    return self.exec_block(then_branch, env);
                }
                if let Some(els) = else_branch {
                    return self.exec_block(els, env);
                }
            }
            StmtKind::While { cond, body } => loop {
                self.tick()?;
                if !self.eval(cond, env)?.is_truthy() {
                    break;
                }
                match self.exec_block(body, env)? {
                    Flow::Normal => {}
                    Flow::Break => break,
                    ret @ Flow::Return(_) => return Ok(ret),
                }
            },
            StmtKind::Break => return Ok(Flow::Break),
        }
        Ok(Flow::Normal)
    }

    fn assign(&mut self, target: &Expr, value: &Expr, env: &Env) -> Result<(), EvalError> {
        match &target.kind {
            ExprKind::Ident(name) => {
                let v = self.eval(value, env)?;
                if !env.set(name, v) {
                    return Err(EvalError::UnknownName { name: name.clone() });
                }
                Ok(())
            }
            ExprKind::Member { object, property } => {
                let obj = self.eval(object, env)?;
                let v = self.eval(value, env)?;
                set_property(&obj, property, v)
            }
            ExprKind::Index { object, index } => {
                let obj = self.eval(object, env)?;
                let idx = self.eval(index, env)?;
                let v = self.eval(value, env)?;
                match (&obj, &idx) {
                    (Value::Array(items), Value::Number(n)) if n.fract() == 0.0 && *n >= 0.0 => {
                        let mut items = items.borrow_mut();
                        let limit = items.len().saturating_add(MAX_ARRAY_GROWTH);
                        if *n > limit as f64 {
                            return Err(EvalError::type_error(format!(
                                "array index {} is out of range",
                                idx.to_js_string()
                            )));
                        }
                        let i = *n as usize;
                        if i >= items.len() {
                            let len = i.checked_add(1).ok_or_else(|| {
                                EvalError::type_error("array length overflow")
                            })?;
                            items.resize(len, Value::Undefined);
                        }
                        items[i] = v;
                        Ok(())
                    }
                    _ => set_property(&obj, &idx.to_js_string(), v),
                }
            }
            _ => Err(EvalError::type_error("invalid assignment target")),
        }
    }
}

fn set_property(obj: &Value, key: &str, v: Value) -> Result<(), EvalError> {
    let upsert = |props: &mut Vec<(String, Value)>, v: Value| {
        match props.iter_mut().find(|(k, _)| k == key) {
            Some(slot) => slot.1 = v,
            None => props.push((key.to_owned(), v)),
        }
    };
    match obj {
        Value::Object(props) => upsert(&mut props.borrow_mut(), v),
        Value::Instance(inst) => upsert(&mut inst.fields.borrow_mut(), v),
        Value::Undefined | Value::Null => {
            return Err(EvalError::type_error(format!(
                "cannot set properties of {} (setting '{}')",
                obj.to_js_string(),
                key
            )))
        }
        Value::Enum(e) => {
            return Err(EvalError::type_error(format!(
                "cannot assign to read-only property '{}' of enum {}",
                key, e.name
            )))
        }
        // Primitives silently drop property writes.
        _ => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests;
