//! Type environment: named types (interfaces, aliases, enums, classes) and
//! resolution of written type expressions into [`Type`]s.

use std::collections::{BTreeMap, HashMap};

use crate::ast::{TypeExpr, Visibility};
use crate::enum_table::EnumTable;
use crate::types::{Field, FnType, Shape, Type};

#[derive(Debug, Clone, PartialEq)]
pub struct Member {
    pub ty: Type,
    pub optional: bool,
    pub visibility: Visibility,
}

/// Checker view of a class: its members and constructor signature.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassInfo {
    pub name: String,
    pub fields: BTreeMap<String, Member>,
    pub methods: BTreeMap<String, Member>,
    pub ctor: FnType,
}

impl ClassInfo {
    pub fn member(&self, name: &str) -> Option<&Member> {
        self.fields.get(name).or_else(|| self.methods.get(name))
    }

    pub fn has_private_members(&self) -> bool {
        self.fields
            .values()
            .chain(self.methods.values())
            .any(|m| m.visibility == Visibility::Private)
    }

    /// Public members as a structural shape.
    pub fn public_shape(&self) -> Shape {
        let fields = self
            .fields
            .iter()
            .chain(self.methods.iter())
            .filter(|(_, m)| m.visibility == Visibility::Public)
            .map(|(n, m)| {
                (
                    n.clone(),
                    Field {
                        ty: m.ty.clone(),
                        optional: m.optional,
                    },
                )
            })
            .collect();
        Shape::named(&self.name, fields)
    }
}

#[derive(Debug, Clone, Default)]
pub struct TypeEnv {
    /// Interfaces and type aliases.
    aliases: HashMap<String, Type>,
    enums: HashMap<String, EnumTable>,
    classes: HashMap<String, ClassInfo>,
}

impl TypeEnv {
    /// An environment holding the builtin `Error` class.
    pub fn with_builtins() -> Self {
        let mut env = TypeEnv::default();
        let mut fields = BTreeMap::new();
        fields.insert(
            "message".to_owned(),
            Member {
                ty: Type::String,
                optional: false,
                visibility: Visibility::Public,
            },
        );
        env.classes.insert(
            "Error".to_owned(),
            ClassInfo {
                name: "Error".to_owned(),
                fields,
                methods: BTreeMap::new(),
                ctor: FnType {
                    params: vec![Type::String],
                    required: 0,
                    rest: None,
                    ret: Box::new(Type::Void),
                },
            },
        );
        env
    }

    pub fn is_type_name_taken(&self, name: &str) -> bool {
        Type::primitive(name).is_some()
            || self.aliases.contains_key(name)
            || self.enums.contains_key(name)
            || self.classes.contains_key(name)
    }

    pub fn declare_alias(&mut self, name: &str, ty: Type) {
        self.aliases.insert(name.to_owned(), ty);
    }

    pub fn declare_enum(&mut self, table: EnumTable) {
        self.enums.insert(table.name.clone(), table);
    }

    pub fn declare_class(&mut self, info: ClassInfo) {
        self.classes.insert(info.name.clone(), info);
    }

    pub fn enum_table(&self, name: &str) -> Option<&EnumTable> {
        self.enums.get(name)
    }

    pub fn class(&self, name: &str) -> Option<&ClassInfo> {
        self.classes.get(name)
    }

    pub(crate) fn class_mut(&mut self, name: &str) -> Option<&mut ClassInfo> {
        self.classes.get_mut(name)
    }

    /// Resolve a written type. Names must be declared before use.
    pub fn resolve(&self, t: &TypeExpr) -> Result<Type, String> {
        match t {
            TypeExpr::Named(name) => {
                if let Some(p) = Type::primitive(name) {
                    return Ok(p);
                }
                if let Some(alias) = self.aliases.get(name) {
                    return Ok(alias.clone());
                }
                if self.enums.contains_key(name) {
                    return Ok(Type::Enum(name.clone()));
                }
                if self.classes.contains_key(name) {
                    return Ok(Type::Class(name.clone()));
                }
                if name == "Array" {
                    return Err("generic type 'Array<T>' requires 1 type argument".to_owned());
                }
                Err(format!("cannot find name '{}'", name))
            }
            TypeExpr::Array(elem) => Ok(Type::Array(Box::new(self.resolve(elem)?))),
            TypeExpr::Generic { name, args } => match (name.as_str(), args.as_slice()) {
                ("Array", [elem]) => Ok(Type::Array(Box::new(self.resolve(elem)?))),
                ("Array", _) => Err(format!(
                    "generic type 'Array<T>' requires 1 type argument, got {}",
                    args.len()
                )),
                _ => Err(format!("type '{}' is not generic", name)),
            },
            TypeExpr::Tuple(elems) => Ok(Type::Tuple(
                elems
                    .iter()
                    .map(|e| self.resolve(e))
                    .collect::<Result<_, _>>()?,
            )),
            TypeExpr::Union(members) => Ok(Type::union(
                members
                    .iter()
                    .map(|m| self.resolve(m))
                    .collect::<Result<_, _>>()?,
            )),
            TypeExpr::Shape(decls) => {
                let mut fields = BTreeMap::new();
                for d in decls {
                    fields.insert(
                        d.name.clone(),
                        Field {
                            ty: self.resolve(&d.ty)?,
                            optional: d.optional,
                        },
                    );
                }
                Ok(Type::Object(Shape::anonymous(fields)))
            }
            TypeExpr::Function { params, ret } => Ok(Type::Function(FnType::new(
                params
                    .iter()
                    .map(|p| self.resolve(p))
                    .collect::<Result<_, _>>()?,
                self.resolve(ret)?,
            ))),
        }
    }
}
