//! Expression evaluation, calls and property access.

use std::cell::RefCell;
use std::rc::Rc;

use tycat_core::ast::{BinaryOp, Expr, ExprKind, FunctionBody, Literal, TemplatePart, UnaryOp};

use super::{Env, Flow, Interpreter, MAX_CALL_DEPTH};
use crate::sink::Channel;
use crate::types::EvalError;
use crate::value::{Builtin, ClassValue, Closure, Instance, Value};

impl Interpreter {
    pub(crate) fn eval(&mut self, expr: &Expr, env: &Env) -> Result<Value, EvalError> {
        match &expr.kind {
            ExprKind::Literal(lit) => Ok(match lit {
                Literal::Bool(b) => Value::Bool(*b),
                Literal::Number(n) => Value::Number(*n),
                Literal::Str(s) => Value::Str(s.clone()),
                Literal::Null => Value::Null,
                Literal::Undefined => Value::Undefined,
            }),
            ExprKind::Template(parts) => {
                let mut out = String::new();
                for p in parts {
                    match p {
                        TemplatePart::Text(t) => out.push_str(t),
                        TemplatePart::Expr(e) => out.push_str(&self.eval(e, env)?.to_js_string()),
                    }
                }
                Ok(Value::Str(out))
            }
            ExprKind::Array(elems) => {
                let items = elems
                    .iter()
                    .map(|e| self.eval(e, env))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Value::array(items))
            }
            ExprKind::Object(props) => {
                let mut out: Vec<(String, Value)> = Vec::with_capacity(props.len());
                for (k, e) in props {
                    let v = self.eval(e, env)?;
                    out.push((k.clone(), v));
                }
                Ok(Value::object(out))
            }
            ExprKind::Ident(name) => env
                .get(name)
                .ok_or_else(|| EvalError::UnknownName { name: name.clone() }),
            ExprKind::This => Ok(env.get("this").unwrap_or(Value::Undefined)),
            ExprKind::Member { object, property } => {
                let obj = self.eval(object, env)?;
                get_property(&obj, property)
            }
            ExprKind::Index { object, index } => {
                let obj = self.eval(object, env)?;
                let idx = self.eval(index, env)?;
                get_index(&obj, &idx)
            }
            ExprKind::Call { callee, args } => {
                let f = self.eval(callee, env)?;
                let args = args
                    .iter()
                    .map(|a| self.eval(a, env))
                    .collect::<Result<Vec<_>, _>>()?;
                self.call(&f, args)
            }
            ExprKind::New { class, args } => {
                let ctor = env
                    .get(class)
                    .ok_or_else(|| EvalError::UnknownName { name: class.clone() })?;
                let args = args
                    .iter()
                    .map(|a| self.eval(a, env))
                    .collect::<Result<Vec<_>, _>>()?;
                match &ctor {
                    Value::Class(class) => self.instantiate(class, args),
                    Value::Builtin(Builtin::ErrorCtor) => self.call(&ctor, args),
                    other => Err(EvalError::type_error(format!(
                        "{} is not a constructor",
                        other.to_js_string()
                    ))),
                }
            }
            // No runtime validation: the value passes through unchanged.
            ExprKind::As { expr: inner, .. } => self.eval(inner, env),
            ExprKind::Binary { op, left, right } => {
                let l = self.eval(left, env)?;
                let r = self.eval(right, env)?;
                Ok(match op {
                    BinaryOp::Add => add(&l, &r),
                    BinaryOp::Sub => Value::Number(l.to_number() - r.to_number()),
                    BinaryOp::StrictEq => Value::Bool(l.strict_equals(&r)),
                    BinaryOp::StrictNe => Value::Bool(!l.strict_equals(&r)),
                })
            }
            ExprKind::Unary { op, operand } => {
                let v = self.eval(operand, env)?;
                Ok(match op {
                    UnaryOp::Not => Value::Bool(!v.is_truthy()),
                    UnaryOp::Neg => Value::Number(-v.to_number()),
                    UnaryOp::TypeOf => Value::str(v.type_of()),
                })
            }
            ExprKind::Arrow(func) => Ok(Value::Function(Rc::new(Closure {
                func: func.clone(),
                env: env.clone(),
                this: None,
            }))),
        }
    }

    pub(crate) fn call(&mut self, f: &Value, args: Vec<Value>) -> Result<Value, EvalError> {
        match f {
            Value::Function(closure) => self.call_closure(closure, args),
            Value::Builtin(b) => self.call_builtin(b, args),
            Value::Class(class) => Err(EvalError::type_error(format!(
                "class constructor {} cannot be invoked without 'new'",
                class.decl.name
            ))),
            other => Err(EvalError::NotCallable {
                what: other.inspect(),
            }),
        }
    }

    fn call_closure(&mut self, closure: &Closure, args: Vec<Value>) -> Result<Value, EvalError> {
        if self.depth >= MAX_CALL_DEPTH {
            return Err(EvalError::CallDepth {
                limit: MAX_CALL_DEPTH,
            });
        }
        let scope = closure.env.child();
        if let Some(this) = &closure.this {
            scope.define("this", this.clone());
        }
        let mut args = args.into_iter();
        for p in &closure.func.params {
            scope.define(&p.name, args.next().unwrap_or(Value::Undefined));
        }

        self.depth += 1;
        let result = match &closure.func.body {
            FunctionBody::Expr(e) => self.eval(e, &scope),
            FunctionBody::Block(stmts) => {
                let mut out = Ok(Value::Undefined);
                for s in stmts {
                    match self.exec(s, &scope) {
                        Ok(Flow::Normal) => {}
                        Ok(Flow::Return(v)) => {
                            out = Ok(v);
                            break;
                        }
                        Ok(Flow::Break) => break,
                        Err(e) => {
                            out = Err(e);
                            break;
                        }
                    }
                }
                out
            }
        };
        self.depth -= 1;
        result
    }

    fn call_builtin(&mut self, b: &Builtin, args: Vec<Value>) -> Result<Value, EvalError> {
        match b {
            Builtin::ConsoleLog => {
                let line = args.iter().map(Value::inspect).collect::<Vec<_>>().join(" ");
                self.sink.emit(Channel::Console, &line);
                Ok(Value::Undefined)
            }
            Builtin::Alert => {
                let text = args.first().map(Value::to_js_string).unwrap_or_default();
                self.sink.emit(Channel::Alert, &text);
                Ok(Value::Undefined)
            }
            Builtin::ErrorCtor => {
                let msg = match args.first() {
                    None | Some(Value::Undefined) => String::new(),
                    Some(v) => v.to_js_string(),
                };
                Ok(Value::Error(msg.into()))
            }
            Builtin::Method { receiver, name } => call_method(receiver, name, args),
        }
    }

    fn instantiate(&mut self, class: &Rc<ClassValue>, args: Vec<Value>) -> Result<Value, EvalError> {
        let decl = &class.decl;
        let inst = Rc::new(Instance {
            class: class.clone(),
            fields: RefCell::new(Vec::new()),
        });
        let this = Value::Instance(inst.clone());
        let scope = class.env.child();
        scope.define("this", this.clone());
        for f in &decl.fields {
            if let Some(init) = &f.init {
                let v = self.eval(init, &scope)?;
                inst.fields.borrow_mut().push((f.name.clone(), v));
            }
        }
        if let Some(ctor) = &decl.constructor {
            let closure = Closure {
                func: ctor.clone(),
                env: class.env.clone(),
                this: Some(this.clone()),
            };
            self.call_closure(&closure, args)?;
        }
        Ok(this)
    }
}

fn add(l: &Value, r: &Value) -> Value {
    match (l, r) {
        (Value::Number(a), Value::Number(b)) => Value::Number(a + b),
        _ if matches!(l, Value::Str(_)) || matches!(r, Value::Str(_)) => {
            Value::Str(l.to_js_string() + &r.to_js_string())
        }
        _ if !l.is_primitive() || !r.is_primitive() => {
            Value::Str(l.to_js_string() + &r.to_js_string())
        }
        _ => Value::Number(l.to_number() + r.to_number()),
    }
}

fn method(receiver: &Value, name: &str) -> Value {
    Value::Builtin(Builtin::Method {
        receiver: Box::new(receiver.clone()),
        name: name.to_owned(),
    })
}

pub(crate) fn get_property(obj: &Value, prop: &str) -> Result<Value, EvalError> {
    Ok(match obj {
        Value::Undefined | Value::Null => {
            return Err(EvalError::type_error(format!(
                "cannot read properties of {} (reading '{}')",
                obj.to_js_string(),
                prop
            )))
        }
        Value::Str(s) => match prop {
            "length" => Value::Number(s.encode_utf16().count() as f64),
            "toUpperCase" | "toLowerCase" | "trim" => method(obj, prop),
            _ => Value::Undefined,
        },
        Value::Number(_) | Value::Bool(_) => match prop {
            "toString" | "toFixed" => method(obj, prop),
            _ => Value::Undefined,
        },
        Value::Array(items) => match prop {
            "length" => Value::Number(items.borrow().len() as f64),
            "push" | "join" => method(obj, prop),
            _ => Value::Undefined,
        },
        Value::Object(props) => lookup(&props.borrow(), prop),
        Value::Instance(inst) => {
            if let Some((_, v)) = inst.fields.borrow().iter().find(|(k, _)| k == prop) {
                return Ok(v.clone());
            }
            match inst.class.decl.method(prop) {
                Some(m) => Value::Function(Rc::new(Closure {
                    func: m.func.clone(),
                    env: inst.class.env.clone(),
                    this: Some(obj.clone()),
                })),
                None => Value::Undefined,
            }
        }
        Value::Enum(table) => table
            .value_of(prop)
            .map(Value::from_enum_value)
            .unwrap_or(Value::Undefined),
        Value::Error(msg) => match prop {
            "message" => Value::Str(msg.to_string()),
            "name" => Value::str("Error"),
            _ => Value::Undefined,
        },
        Value::Function(_) | Value::Class(_) | Value::Builtin(_) => Value::Undefined,
    })
}

fn lookup(props: &[(String, Value)], key: &str) -> Value {
    props
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.clone())
        .unwrap_or(Value::Undefined)
}

fn get_index(obj: &Value, idx: &Value) -> Result<Value, EvalError> {
    match (obj, idx) {
        (Value::Array(items), Value::Number(n)) => {
            let items = items.borrow();
            Ok(index_of(*n, items.len())
                .map(|i| items[i].clone())
                .unwrap_or(Value::Undefined))
        }
        (Value::Str(s), Value::Number(n)) => {
            let units: Vec<u16> = s.encode_utf16().collect();
            Ok(index_of(*n, units.len())
                .map(|i| Value::Str(String::from_utf16_lossy(&units[i..=i])))
                .unwrap_or(Value::Undefined))
        }
        // Reverse mapping: numeric value to member name.
        (Value::Enum(table), Value::Number(n)) => Ok(table
            .name_of(*n)
            .map(Value::str)
            .unwrap_or(Value::Undefined)),
        _ => get_property(obj, &idx.to_js_string()),
    }
}

fn index_of(n: f64, len: usize) -> Option<usize> {
    if n.fract() == 0.0 && n >= 0.0 && (n as usize) < len {
        Some(n as usize)
    } else {
        None
    }
}

fn call_method(receiver: &Value, name: &str, args: Vec<Value>) -> Result<Value, EvalError> {
    let arg = |i: usize| args.get(i).cloned().unwrap_or(Value::Undefined);
    match (receiver, name) {
        (Value::Str(s), "toUpperCase") => Ok(Value::Str(s.to_uppercase())),
        (Value::Str(s), "toLowerCase") => Ok(Value::Str(s.to_lowercase())),
        (Value::Str(s), "trim") => Ok(Value::str(s.trim())),
        (Value::Number(_) | Value::Bool(_), "toString") => Ok(Value::Str(receiver.to_js_string())),
        (Value::Number(n), "toFixed") => {
            let digits = match arg(0) {
                Value::Undefined => 0,
                v => v.to_number().clamp(0.0, 100.0) as usize,
            };
            Ok(Value::Str(format!("{:.*}", digits, n)))
        }
        (Value::Array(items), "push") => {
            let mut items = items.borrow_mut();
            items.extend(args.iter().cloned());
            Ok(Value::Number(items.len() as f64))
        }
        (Value::Array(items), "join") => {
            let sep = match arg(0) {
                Value::Undefined => ",".to_owned(),
                v => v.to_js_string(),
            };
            let parts: Vec<String> = items
                .borrow()
                .iter()
                .map(|v| match v {
                    Value::Undefined | Value::Null => String::new(),
                    other => other.to_js_string(),
                })
                .collect();
            Ok(Value::Str(parts.join(&sep)))
        }
        _ => Err(EvalError::NotCallable {
            what: format!("{}.{}", receiver.inspect(), name),
        }),
    }
}
