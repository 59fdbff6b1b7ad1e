//! The resolved type model.
//!
//! [`TypeExpr`](crate::ast::TypeExpr) is what the programmer wrote;
//! [`Type`] is what the checker reasons about after name resolution.

use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    Boolean,
    Number,
    String,
    Undefined,
    Null,
    /// Opts out of checking entirely.
    Any,
    /// Result category of a function with no meaningful return value.
    Void,
    /// Result category of a function that never completes normally.
    Never,
    Array(Box<Type>),
    Tuple(Vec<Type>),
    /// Always normalized through [`Type::union`].
    Union(Vec<Type>),
    /// Structural shape (interface, alias or inline literal type).
    Object(Shape),
    /// A value of the named enum.
    Enum(String),
    /// The enum container itself (`Size`), indexable both ways.
    EnumObject(String),
    /// An instance of the named class.
    Class(String),
    /// The class constructor value (`Animal`).
    ClassObject(String),
    Function(FnType),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub ty: Type,
    pub optional: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Shape {
    /// Interface or alias name, for display only; shapes compare structurally.
    pub name: Option<String>,
    pub fields: BTreeMap<String, Field>,
}

impl Shape {
    pub fn named(name: &str, fields: BTreeMap<String, Field>) -> Self {
        Shape {
            name: Some(name.to_owned()),
            fields,
        }
    }

    pub fn anonymous(fields: BTreeMap<String, Field>) -> Self {
        Shape { name: None, fields }
    }

    pub fn required(&self) -> impl Iterator<Item = (&String, &Field)> {
        self.fields.iter().filter(|(_, f)| !f.optional)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FnType {
    pub params: Vec<Type>,
    /// Number of leading parameters that must be supplied.
    pub required: usize,
    /// Type of extra trailing arguments, if the function is variadic.
    pub rest: Option<Box<Type>>,
    pub ret: Box<Type>,
}

impl FnType {
    pub fn new(params: Vec<Type>, ret: Type) -> Self {
        FnType {
            required: params.len(),
            params,
            rest: None,
            ret: Box::new(ret),
        }
    }

    pub fn variadic(rest: Type, ret: Type) -> Self {
        FnType {
            params: Vec::new(),
            required: 0,
            rest: Some(Box::new(rest)),
            ret: Box::new(ret),
        }
    }
}

impl Type {
    /// Build a normalized union: nested unions are flattened, `never`
    /// members dropped, duplicates removed and `any` absorbs everything.
    pub fn union(members: Vec<Type>) -> Type {
        let mut flat: Vec<Type> = Vec::new();
        for m in members {
            match m {
                Type::Union(inner) => {
                    for t in inner {
                        if !flat.contains(&t) {
                            flat.push(t);
                        }
                    }
                }
                Type::Never => {}
                Type::Any => return Type::Any,
                other => {
                    if !flat.contains(&other) {
                        flat.push(other);
                    }
                }
            }
        }
        match flat.len() {
            0 => Type::Never,
            1 => flat.remove(0),
            _ => Type::Union(flat),
        }
    }

    pub fn members(&self) -> Vec<&Type> {
        match self {
            Type::Union(ms) => ms.iter().collect(),
            other => vec![other],
        }
    }

    pub fn is_any(&self) -> bool {
        matches!(self, Type::Any)
    }

    /// The `typeof` tag a value of this type reports at runtime, if fixed.
    pub fn typeof_tag(&self) -> Option<&'static str> {
        match self {
            Type::Boolean => Some("boolean"),
            Type::Number => Some("number"),
            Type::String => Some("string"),
            Type::Undefined | Type::Void => Some("undefined"),
            Type::Null
            | Type::Array(_)
            | Type::Tuple(_)
            | Type::Object(_)
            | Type::Class(_)
            | Type::EnumObject(_) => Some("object"),
            Type::Function(_) | Type::ClassObject(_) => Some("function"),
            Type::Any | Type::Never | Type::Union(_) | Type::Enum(_) => None,
        }
    }

    /// The primitive type corresponding to a `typeof` tag.
    pub fn from_typeof_tag(tag: &str) -> Option<Type> {
        match tag {
            "boolean" => Some(Type::Boolean),
            "number" => Some(Type::Number),
            "string" => Some(Type::String),
            "undefined" => Some(Type::Undefined),
            _ => None,
        }
    }

    /// Primitive keyword lookup.
    pub fn primitive(name: &str) -> Option<Type> {
        match name {
            "boolean" => Some(Type::Boolean),
            "number" => Some(Type::Number),
            "string" => Some(Type::String),
            "undefined" => Some(Type::Undefined),
            "null" => Some(Type::Null),
            "any" => Some(Type::Any),
            "void" => Some(Type::Void),
            "never" => Some(Type::Never),
            _ => None,
        }
    }

    /// Whether `undefined` is an acceptable value of this type.
    pub fn accepts_undefined(&self) -> bool {
        self.members()
            .iter()
            .any(|t| matches!(t, Type::Any | Type::Undefined | Type::Void))
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Boolean => write!(f, "boolean"),
            Type::Number => write!(f, "number"),
            Type::String => write!(f, "string"),
            Type::Undefined => write!(f, "undefined"),
            Type::Null => write!(f, "null"),
            Type::Any => write!(f, "any"),
            Type::Void => write!(f, "void"),
            Type::Never => write!(f, "never"),
            Type::Array(elem) => match **elem {
                Type::Union(_) | Type::Function(_) => write!(f, "({})[]", elem),
                _ => write!(f, "{}[]", elem),
            },
            Type::Tuple(elems) => {
                write!(f, "[")?;
                for (i, t) in elems.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", t)?;
                }
                write!(f, "]")
            }
            Type::Union(members) => {
                for (i, t) in members.iter().enumerate() {
                    if i > 0 {
                        write!(f, " | ")?;
                    }
                    match t {
                        Type::Function(_) => write!(f, "({})", t)?,
                        _ => write!(f, "{}", t)?,
                    }
                }
                Ok(())
            }
            Type::Object(shape) => {
                if let Some(name) = &shape.name {
                    return write!(f, "{}", name);
                }
                if shape.fields.is_empty() {
                    return write!(f, "{{}}");
                }
                write!(f, "{{ ")?;
                for (i, (name, field)) in shape.fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, "; ")?;
                    }
                    let q = if field.optional { "?" } else { "" };
                    write!(f, "{}{}: {}", name, q, field.ty)?;
                }
                write!(f, " }}")
            }
            Type::Enum(name) | Type::Class(name) => write!(f, "{}", name),
            Type::EnumObject(name) | Type::ClassObject(name) => write!(f, "typeof {}", name),
            Type::Function(func) => {
                write!(f, "(")?;
                for (i, p) in func.params.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    let q = if i >= func.required { "?" } else { "" };
                    write!(f, "arg{}{}: {}", i, q, p)?;
                }
                if let Some(rest) = &func.rest {
                    if !func.params.is_empty() {
                        write!(f, ", ")?;
                    }
                    write!(f, "...args: {}[]", rest)?;
                }
                write!(f, ") => {}", func.ret)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn union_is_flattened_and_deduplicated() {
        let u = Type::union(vec![
            Type::String,
            Type::union(vec![Type::Number, Type::String]),
            Type::Never,
        ]);
        assert_eq!(u, Type::Union(vec![Type::String, Type::Number]));
        assert_eq!(u.to_string(), "string | number");
    }

    #[test]
    fn union_with_any_is_any() {
        assert_eq!(Type::union(vec![Type::String, Type::Any]), Type::Any);
    }

    #[test]
    fn singleton_and_empty_unions_collapse() {
        assert_eq!(Type::union(vec![Type::Boolean]), Type::Boolean);
        assert_eq!(Type::union(vec![]), Type::Never);
    }

    #[test]
    fn display_of_constructed_types() {
        let tuple = Type::Tuple(vec![Type::String, Type::Number]);
        assert_eq!(tuple.to_string(), "[string, number]");
        let arr = Type::Array(Box::new(Type::union(vec![Type::String, Type::Number])));
        assert_eq!(arr.to_string(), "(string | number)[]");
        let mut fields = BTreeMap::new();
        fields.insert(
            "count".to_owned(),
            Field {
                ty: Type::Number,
                optional: false,
            },
        );
        fields.insert(
            "magic".to_owned(),
            Field {
                ty: Type::String,
                optional: true,
            },
        );
        assert_eq!(
            Type::Object(Shape::anonymous(fields.clone())).to_string(),
            "{ count: number; magic?: string }"
        );
        assert_eq!(
            Type::Object(Shape::named("RobotArmy", fields)).to_string(),
            "RobotArmy"
        );
        let f = Type::Function(FnType::new(vec![Type::String], Type::Void));
        assert_eq!(f.to_string(), "(arg0: string) => void");
        assert_eq!(Type::EnumObject("Size".into()).to_string(), "typeof Size");
    }

    #[test]
    fn typeof_tags() {
        assert_eq!(Type::String.typeof_tag(), Some("string"));
        assert_eq!(Type::Null.typeof_tag(), Some("object"));
        assert_eq!(Type::from_typeof_tag("number"), Some(Type::Number));
        assert_eq!(Type::from_typeof_tag("object"), None);
    }

    #[test]
    fn undefined_acceptance() {
        assert!(Type::Void.accepts_undefined());
        assert!(Type::union(vec![Type::String, Type::Undefined]).accepts_undefined());
        assert!(!Type::String.accepts_undefined());
    }
}
