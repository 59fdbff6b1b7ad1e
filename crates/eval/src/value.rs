//! Runtime values.
//!
//! Arrays, objects and instances are shared references: assigning one to
//! another variable aliases it, and `===` compares identity.

use std::cell::RefCell;
use std::fmt::Write as _;
use std::rc::Rc;

use tycat_core::ast::{ClassDecl, Function};
use tycat_core::{format_number, EnumTable, EnumValue};

use crate::interp::Env;

#[derive(Debug, Clone)]
pub enum Value {
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    Str(String),
    Array(Rc<RefCell<Vec<Value>>>),
    /// Object literal; properties keep insertion order.
    Object(Rc<RefCell<Vec<(String, Value)>>>),
    Instance(Rc<Instance>),
    Function(Rc<Closure>),
    Enum(Rc<EnumTable>),
    Class(Rc<ClassValue>),
    /// Result of `Error(msg)` / `new Error(msg)`.
    Error(Rc<str>),
    Builtin(Builtin),
}

/// A class declaration together with the scope it was declared in.
#[derive(Debug)]
pub struct ClassValue {
    pub decl: Rc<ClassDecl>,
    pub env: Env,
}

#[derive(Debug)]
pub struct Instance {
    pub class: Rc<ClassValue>,
    pub fields: RefCell<Vec<(String, Value)>>,
}

#[derive(Debug)]
pub struct Closure {
    pub func: Rc<Function>,
    pub env: Env,
    /// Receiver for methods read off an instance.
    pub this: Option<Value>,
}

#[derive(Debug, Clone)]
pub enum Builtin {
    ConsoleLog,
    Alert,
    ErrorCtor,
    /// Method of a primitive or array, bound to its receiver.
    Method { receiver: Box<Value>, name: String },
}

impl Value {
    pub fn str(s: impl Into<String>) -> Value {
        Value::Str(s.into())
    }

    pub fn array(items: Vec<Value>) -> Value {
        Value::Array(Rc::new(RefCell::new(items)))
    }

    pub fn object(props: Vec<(String, Value)>) -> Value {
        Value::Object(Rc::new(RefCell::new(props)))
    }

    pub fn from_enum_value(v: &EnumValue) -> Value {
        match v {
            EnumValue::Number(n) => Value::Number(*n),
            EnumValue::Str(s) => Value::Str(s.clone()),
        }
    }

    pub fn type_of(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "object",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::Str(_) => "string",
            Value::Array(_)
            | Value::Object(_)
            | Value::Instance(_)
            | Value::Enum(_)
            | Value::Error(_) => "object",
            Value::Function(_) | Value::Class(_) | Value::Builtin(_) => "function",
        }
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Undefined | Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::Str(s) => !s.is_empty(),
            _ => true,
        }
    }

    pub fn is_primitive(&self) -> bool {
        matches!(
            self,
            Value::Undefined | Value::Null | Value::Bool(_) | Value::Number(_) | Value::Str(_)
        )
    }

    pub fn to_number(&self) -> f64 {
        match self {
            Value::Undefined => f64::NAN,
            Value::Null => 0.0,
            Value::Bool(b) => f64::from(u8::from(*b)),
            Value::Number(n) => *n,
            Value::Str(s) => {
                let t = s.trim();
                if t.is_empty() {
                    0.0
                } else {
                    t.parse().unwrap_or(f64::NAN)
                }
            }
            _ => f64::NAN,
        }
    }

    /// `===`: primitives by value, everything else by identity.
    pub fn strict_equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => Rc::ptr_eq(a, b),
            (Value::Object(a), Value::Object(b)) => Rc::ptr_eq(a, b),
            (Value::Instance(a), Value::Instance(b)) => Rc::ptr_eq(a, b),
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            (Value::Enum(a), Value::Enum(b)) => Rc::ptr_eq(a, b),
            (Value::Class(a), Value::Class(b)) => Rc::ptr_eq(a, b),
            (Value::Error(a), Value::Error(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// String conversion used by templates, `+` and `alert`.
    pub fn to_js_string(&self) -> String {
        match self {
            Value::Undefined => "undefined".into(),
            Value::Null => "null".into(),
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => format_number(*n),
            Value::Str(s) => s.clone(),
            Value::Array(items) => items
                .borrow()
                .iter()
                .map(|v| match v {
                    Value::Undefined | Value::Null => String::new(),
                    other => other.to_js_string(),
                })
                .collect::<Vec<_>>()
                .join(","),
            Value::Object(_) | Value::Instance(_) | Value::Enum(_) => "[object Object]".into(),
            Value::Error(msg) => format!("Error: {}", msg),
            Value::Class(c) => format!("class {}", c.decl.name),
            Value::Function(_) | Value::Builtin(_) => "function".into(),
        }
    }

    /// Rendering used by `console.log`: strings print bare at the top
    /// level and quoted inside containers.
    pub fn inspect(&self) -> String {
        match self {
            Value::Str(s) => s.clone(),
            other => {
                let mut out = String::new();
                other.inspect_into(&mut out);
                out
            }
        }
    }

    fn inspect_into(&self, out: &mut String) {
        match self {
            Value::Str(s) => {
                let _ = write!(out, "'{}'", s.replace('\'', "\\'"));
            }
            Value::Array(items) => {
                let items = items.borrow();
                if items.is_empty() {
                    out.push_str("[]");
                    return;
                }
                out.push_str("[ ");
                for (i, v) in items.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    v.inspect_into(out);
                }
                out.push_str(" ]");
            }
            Value::Object(props) => inspect_props(out, None, &props.borrow()),
            Value::Instance(inst) => {
                inspect_props(out, Some(&inst.class.decl.name), &inst.fields.borrow())
            }
            Value::Enum(table) => inspect_props(out, None, &enum_props(table)),
            Value::Error(msg) => {
                let _ = write!(out, "Error: {}", msg);
            }
            Value::Class(c) => {
                let _ = write!(out, "[class {}]", c.decl.name);
            }
            Value::Function(_) | Value::Builtin(_) => out.push_str("[Function]"),
            other => out.push_str(&other.to_js_string()),
        }
    }
}

fn is_identifier(key: &str) -> bool {
    let mut chars = key.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

fn inspect_props(out: &mut String, class: Option<&str>, props: &[(String, Value)]) {
    if let Some(name) = class {
        out.push_str(name);
        out.push(' ');
    }
    if props.is_empty() {
        out.push_str("{}");
        return;
    }
    out.push_str("{ ");
    for (i, (k, v)) in props.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        if is_identifier(k) {
            out.push_str(k);
        } else {
            let _ = write!(out, "'{}'", k);
        }
        out.push_str(": ");
        v.inspect_into(out);
    }
    out.push_str(" }");
}

/// The enum as an object: reverse entries (integer keys, ascending) and
/// then members in declaration order.
fn enum_props(table: &EnumTable) -> Vec<(String, Value)> {
    let mut reverse: Vec<(f64, String)> = Vec::new();
    for (name, value) in table.members() {
        if let EnumValue::Number(n) = value {
            reverse.retain(|(m, _)| m != n);
            reverse.push((*n, name.clone()));
        }
    }
    reverse.sort_by(|a, b| a.0.total_cmp(&b.0));
    reverse
        .into_iter()
        .map(|(n, name)| (format_number(n), Value::Str(name)))
        .chain(
            table
                .members()
                .iter()
                .map(|(name, v)| (name.clone(), Value::from_enum_value(v))),
        )
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_conversion() {
        assert_eq!(Value::Number(56.0).to_js_string(), "56");
        assert_eq!(Value::Undefined.to_js_string(), "undefined");
        let arr = Value::array(vec![Value::str("a"), Value::Null, Value::Number(1.5)]);
        assert_eq!(arr.to_js_string(), "a,,1.5");
    }

    #[test]
    fn inspect_quotes_nested_strings_only() {
        assert_eq!(Value::str("Medium").inspect(), "Medium");
        let basket = Value::array(vec![Value::str("basketball"), Value::Number(10.0)]);
        assert_eq!(basket.inspect(), "[ 'basketball', 10 ]");
        let army = Value::object(vec![
            ("count".into(), Value::Number(10.0)),
            ("type".into(), Value::str("dragon")),
        ]);
        assert_eq!(army.inspect(), "{ count: 10, type: 'dragon' }");
    }

    #[test]
    fn strict_equality_is_identity_for_references() {
        let a = Value::array(vec![]);
        let b = Value::array(vec![]);
        assert!(a.strict_equals(&a.clone()));
        assert!(!a.strict_equals(&b));
        assert!(!Value::Number(f64::NAN).strict_equals(&Value::Number(f64::NAN)));
        assert!(!Value::Null.strict_equals(&Value::Undefined));
    }

    #[test]
    fn typeof_tags() {
        assert_eq!(Value::Null.type_of(), "object");
        assert_eq!(Value::Builtin(Builtin::Alert).type_of(), "function");
        assert_eq!(Value::str("x").type_of(), "string");
    }
}
