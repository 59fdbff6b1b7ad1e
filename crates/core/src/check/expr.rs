//! Expression typing, contextual assignment checks and `typeof`/nullish
//! narrowing.

use std::collections::BTreeMap;

use super::Checker;
use crate::ast::{BinaryOp, Expr, ExprKind, Literal, TemplatePart, UnaryOp};
use crate::types::{Field, FnType, Shape, Type};

fn literal_type(lit: &Literal) -> Type {
    match lit {
        Literal::Bool(_) => Type::Boolean,
        Literal::Number(_) => Type::Number,
        Literal::Str(_) => Type::String,
        Literal::Null => Type::Null,
        Literal::Undefined => Type::Undefined,
    }
}

fn method(params: Vec<Type>, required: usize, ret: Type) -> Type {
    Type::Function(FnType {
        params,
        required,
        rest: None,
        ret: Box::new(ret),
    })
}

impl Checker {
    pub(super) fn expr_type(&mut self, expr: &Expr, expected: Option<&Type>) -> Type {
        let line = expr.line;
        match &expr.kind {
            ExprKind::Literal(lit) => literal_type(lit),
            ExprKind::Template(parts) => {
                for p in parts {
                    if let TemplatePart::Expr(e) = p {
                        self.expr_type(e, None);
                    }
                }
                Type::String
            }
            ExprKind::Array(elems) => {
                let hint = match expected {
                    Some(Type::Array(t)) => Some((**t).clone()),
                    _ => None,
                };
                let ts: Vec<Type> = elems
                    .iter()
                    .map(|e| self.expr_type(e, hint.as_ref()))
                    .collect();
                if ts.is_empty() {
                    Type::Array(Box::new(hint.unwrap_or(Type::Any)))
                } else {
                    Type::Array(Box::new(Type::union(ts)))
                }
            }
            ExprKind::Object(props) => {
                let mut fields = BTreeMap::new();
                for (k, v) in props {
                    let ty = self.expr_type(v, None);
                    fields.insert(k.clone(), Field { ty, optional: false });
                }
                Type::Object(Shape::anonymous(fields))
            }
            ExprKind::Ident(name) => match self.lookup(name) {
                Some(b) => b.ty.clone(),
                None => {
                    self.error(line, format!("cannot find name '{}'", name));
                    Type::Any
                }
            },
            ExprKind::This => match &self.class_ctx {
                Some(c) => Type::Class(c.clone()),
                None => {
                    self.error(line, "'this' cannot be referenced outside a class body");
                    Type::Any
                }
            },
            ExprKind::Member { object, property } => {
                let obj = self.expr_type(object, None);
                self.member_type(&obj, property, line)
            }
            ExprKind::Index { object, index } => {
                let obj = self.expr_type(object, None);
                self.index_type(&obj, index, line)
            }
            ExprKind::Call { callee, args } => self.call_type(callee, args, line),
            ExprKind::New { class, args } => {
                let Some(info) = self.env.class(class).cloned() else {
                    self.error(line, format!("cannot find name '{}'", class));
                    for a in args {
                        self.expr_type(a, None);
                    }
                    return Type::Any;
                };
                self.check_args(&info.ctor, args, line);
                Type::Class(class.clone())
            }
            ExprKind::As { expr: inner, ty } => {
                let target = self.resolve(ty, line);
                let src = self.expr_type(inner, None);
                if !self.env.overlaps(&src, &target) {
                    self.error(
                        line,
                        format!(
                            "conversion of type '{}' to type '{}' may be a mistake because neither type sufficiently overlaps with the other",
                            src, target
                        ),
                    );
                }
                target
            }
            ExprKind::Binary { op, left, right } => self.binary_type(*op, left, right, line),
            ExprKind::Unary { op, operand } => {
                let t = self.expr_type(operand, None);
                match op {
                    UnaryOp::Not => Type::Boolean,
                    UnaryOp::TypeOf => Type::String,
                    UnaryOp::Neg => {
                        if !self.is_numeric(&t) {
                            self.error(
                                line,
                                format!("operator '-' cannot be applied to type '{}'", t),
                            );
                        }
                        Type::Number
                    }
                }
            }
            ExprKind::Arrow(func) => {
                let ctx = match expected {
                    Some(Type::Function(ft)) => Some(ft.clone()),
                    _ => None,
                };
                Type::Function(self.function_type(func, ctx.as_ref()))
            }
        }
    }

    fn is_numeric(&self, t: &Type) -> bool {
        t.is_any() || (*t != Type::Never && self.env.assignable(t, &Type::Number))
    }

    fn is_stringish(&self, t: &Type) -> bool {
        !t.is_any() && *t != Type::Never && self.env.assignable(t, &Type::String)
    }

    fn binary_type(&mut self, op: BinaryOp, left: &Expr, right: &Expr, line: u32) -> Type {
        let l = self.expr_type(left, None);
        let r = self.expr_type(right, None);
        match op {
            BinaryOp::Add => {
                if self.is_stringish(&l) || self.is_stringish(&r) {
                    Type::String
                } else if l.is_any() || r.is_any() {
                    Type::Any
                } else if self.is_numeric(&l) && self.is_numeric(&r) {
                    Type::Number
                } else {
                    self.error(
                        line,
                        format!("operator '+' cannot be applied to types '{}' and '{}'", l, r),
                    );
                    Type::Any
                }
            }
            BinaryOp::Sub => {
                if !self.is_numeric(&l) || !self.is_numeric(&r) {
                    self.error(
                        line,
                        "the operands of an arithmetic operation must be of type 'any', 'number' or a numeric enum",
                    );
                }
                Type::Number
            }
            BinaryOp::StrictEq | BinaryOp::StrictNe => {
                if !self.env.overlaps(&l, &r) {
                    self.error(
                        line,
                        format!(
                            "this comparison appears to be unintentional because the types '{}' and '{}' have no overlap",
                            l, r
                        ),
                    );
                }
                Type::Boolean
            }
        }
    }

    // -- Members and indexing -----------------------------------

    pub(super) fn member_type(&mut self, obj: &Type, prop: &str, line: u32) -> Type {
        match self.member_lookup(obj, prop) {
            Ok(t) => t,
            Err(msg) => {
                self.error(line, msg);
                Type::Any
            }
        }
    }

    fn member_lookup(&self, obj: &Type, prop: &str) -> Result<Type, String> {
        let missing = || format!("property '{}' does not exist on type '{}'", prop, obj);
        match obj {
            Type::Any => Ok(Type::Any),
            Type::Never => Ok(Type::Never),
            Type::String => match prop {
                "length" => Ok(Type::Number),
                "toUpperCase" | "toLowerCase" | "trim" => Ok(method(vec![], 0, Type::String)),
                _ => Err(missing()),
            },
            Type::Number => match prop {
                "toString" => Ok(method(vec![], 0, Type::String)),
                "toFixed" => Ok(method(vec![Type::Number], 0, Type::String)),
                _ => Err(missing()),
            },
            Type::Boolean => match prop {
                "toString" => Ok(method(vec![], 0, Type::String)),
                _ => Err(missing()),
            },
            Type::Array(elem) => match prop {
                "length" => Ok(Type::Number),
                "push" => Ok(Type::Function(FnType::variadic((**elem).clone(), Type::Number))),
                "join" => Ok(method(vec![Type::String], 0, Type::String)),
                _ => Err(missing()),
            },
            Type::Tuple(_) => match prop {
                "length" => Ok(Type::Number),
                "join" => Ok(method(vec![Type::String], 0, Type::String)),
                _ => Err(missing()),
            },
            Type::Object(shape) => match shape.fields.get(prop) {
                Some(f) if f.optional => Ok(Type::union(vec![f.ty.clone(), Type::Undefined])),
                Some(f) => Ok(f.ty.clone()),
                None => Err(missing()),
            },
            Type::Class(c) => {
                let info = self.env.class(c).ok_or_else(missing)?;
                let m = info.member(prop).ok_or_else(missing)?;
                if m.visibility.is_private() && !self.inside_class(c) {
                    return Err(format!(
                        "property '{}' is private and only accessible within class '{}'",
                        prop, c
                    ));
                }
                if m.optional {
                    Ok(Type::union(vec![m.ty.clone(), Type::Undefined]))
                } else {
                    Ok(m.ty.clone())
                }
            }
            Type::EnumObject(e) => match self.env.enum_table(e) {
                Some(t) if t.value_of(prop).is_some() => Ok(Type::Enum(e.clone())),
                _ => Err(missing()),
            },
            Type::Enum(e) => {
                let numeric = self.env.enum_table(e).is_some_and(|t| t.is_numeric());
                let base = if numeric { Type::Number } else { Type::String };
                self.member_lookup(&base, prop).map_err(|_| missing())
            }
            Type::Union(ms) => {
                let mut found = Vec::with_capacity(ms.len());
                for m in ms {
                    match self.member_lookup(m, prop) {
                        Ok(t) => found.push(t),
                        Err(_) if matches!(m, Type::Null | Type::Undefined) => {
                            return Err(format!("object is possibly '{}'", m));
                        }
                        Err(_) => return Err(missing()),
                    }
                }
                Ok(Type::union(found))
            }
            Type::Null | Type::Undefined => Err(format!("object is possibly '{}'", obj)),
            Type::Void | Type::ClassObject(_) | Type::Function(_) => Err(missing()),
        }
    }

    pub(super) fn index_type(&mut self, obj: &Type, index: &Expr, line: u32) -> Type {
        let idx = self.expr_type(index, None);
        let numeric_index = self.is_numeric(&idx);
        match obj {
            Type::Any => Type::Any,
            Type::EnumObject(e) => {
                let has_numeric = self
                    .env
                    .enum_table(e)
                    .is_some_and(|t| t.has_numeric_member());
                if let ExprKind::Literal(Literal::Str(name)) = &index.kind {
                    return self.member_type(obj, name, line);
                }
                if numeric_index && has_numeric {
                    // Reverse mapping yields the member name.
                    return Type::String;
                }
                self.error(
                    line,
                    format!(
                        "element implicitly has an 'any' type because index expression of type '{}' cannot index type '{}'",
                        idx, obj
                    ),
                );
                Type::Any
            }
            Type::Array(elem) if numeric_index => (**elem).clone(),
            Type::String if numeric_index => Type::String,
            Type::Tuple(ts) if numeric_index => {
                if let ExprKind::Literal(Literal::Number(n)) = &index.kind {
                    let i = *n as usize;
                    if n.fract() == 0.0 && *n >= 0.0 && i < ts.len() {
                        return ts[i].clone();
                    }
                    self.error(
                        line,
                        format!(
                            "tuple type '{}' of length '{}' has no element at index '{}'",
                            obj,
                            ts.len(),
                            crate::number::format_number(*n)
                        ),
                    );
                    return Type::Any;
                }
                Type::union(ts.clone())
            }
            Type::Object(_) | Type::Class(_) => match &index.kind {
                ExprKind::Literal(Literal::Str(name)) => self.member_type(obj, name, line),
                _ => {
                    self.error(
                        line,
                        format!("type '{}' cannot be indexed by type '{}'", obj, idx),
                    );
                    Type::Any
                }
            },
            _ => {
                self.error(
                    line,
                    format!("type '{}' cannot be indexed by type '{}'", obj, idx),
                );
                Type::Any
            }
        }
    }

    // -- Calls --------------------------------------------------

    fn call_type(&mut self, callee: &Expr, args: &[Expr], line: u32) -> Type {
        let ct = self.expr_type(callee, None);
        match ct {
            Type::Any | Type::Never => {
                for a in args {
                    self.expr_type(a, None);
                }
                ct
            }
            Type::Function(f) => {
                self.check_args(&f, args, line);
                *f.ret
            }
            Type::ClassObject(c) if c == "Error" => {
                if let Some(info) = self.env.class(&c).cloned() {
                    self.check_args(&info.ctor, args, line);
                }
                Type::Class(c)
            }
            Type::ClassObject(c) => {
                self.error(
                    line,
                    format!(
                        "value of type 'typeof {}' is not callable; did you mean to include 'new'?",
                        c
                    ),
                );
                for a in args {
                    self.expr_type(a, None);
                }
                Type::Any
            }
            other => {
                self.error(
                    line,
                    format!(
                        "this expression is not callable: type '{}' has no call signatures",
                        other
                    ),
                );
                for a in args {
                    self.expr_type(a, None);
                }
                Type::Any
            }
        }
    }

    pub(super) fn check_args(&mut self, f: &FnType, args: &[Expr], line: u32) {
        let max = if f.rest.is_some() {
            usize::MAX
        } else {
            f.params.len()
        };
        if args.len() < f.required || args.len() > max {
            let expected = if f.rest.is_some() {
                format!("at least {}", f.required)
            } else if f.required == f.params.len() {
                f.required.to_string()
            } else {
                format!("{}-{}", f.required, f.params.len())
            };
            self.error(
                line,
                format!("expected {} argument(s), but got {}", expected, args.len()),
            );
        }
        for (i, a) in args.iter().enumerate() {
            let target = match f.params.get(i) {
                Some(t) if i >= f.required => Some(Type::union(vec![t.clone(), Type::Undefined])),
                Some(t) => Some(t.clone()),
                None => f.rest.as_deref().cloned(),
            };
            match target {
                Some(t) => self.check_assign(a, &t),
                None => {
                    self.expr_type(a, None);
                }
            }
        }
    }

    // -- Contextual assignment ----------------------------------

    /// Check that `expr` can be stored where `target` is expected.
    /// Literals are checked element by element against the target so
    /// tuples, object shapes and arrow parameters get their context.
    pub(super) fn check_assign(&mut self, expr: &Expr, target: &Type) {
        match (&expr.kind, target) {
            (ExprKind::Array(elems), Type::Tuple(ts)) => {
                if elems.len() != ts.len() {
                    let src = Type::Tuple(elems.iter().map(|e| self.expr_type(e, None)).collect());
                    let msg = self.env.mismatch_message(&src, target);
                    self.error(expr.line, msg);
                    return;
                }
                for (e, t) in elems.iter().zip(ts) {
                    self.check_assign(e, t);
                }
            }
            (ExprKind::Array(elems), Type::Array(t)) => {
                for e in elems {
                    self.check_assign(e, t);
                }
            }
            (ExprKind::Object(props), Type::Object(shape)) => {
                self.check_object_literal(props, shape, target, expr.line);
            }
            (ExprKind::Array(_), Type::Union(ms)) => {
                let candidates = ms
                    .iter()
                    .filter(|m| matches!(m, Type::Tuple(_) | Type::Array(_)))
                    .cloned()
                    .collect();
                self.check_assign_members(expr, target, candidates);
            }
            (ExprKind::Object(_), Type::Union(ms)) => {
                let candidates = ms
                    .iter()
                    .filter(|m| matches!(m, Type::Object(_)))
                    .cloned()
                    .collect();
                self.check_assign_members(expr, target, candidates);
            }
            _ => self.check_inferred(expr, target),
        }
    }

    /// A literal against a union: the first member that takes it without
    /// diagnostics wins. Each member is tried on a scratch checker.
    fn check_assign_members(&mut self, expr: &Expr, target: &Type, candidates: Vec<Type>) {
        if candidates.is_empty() {
            return self.check_inferred(expr, target);
        }
        for member in &candidates {
            let mut trial = self.clone();
            let before = trial.diagnostics.len();
            trial.check_assign(expr, member);
            if trial.diagnostics.len() == before {
                *self = trial;
                return;
            }
        }
        let t = self.expr_type(expr, None);
        let msg = self.env.mismatch_message(&t, target);
        self.error(expr.line, msg);
    }

    fn check_inferred(&mut self, expr: &Expr, target: &Type) {
        let t = self.expr_type(expr, Some(target));
        if !self.env.assignable(&t, target) {
            let msg = self.env.mismatch_message(&t, target);
            self.error(expr.line, msg);
        }
    }

    fn check_object_literal(
        &mut self,
        props: &[(String, Expr)],
        shape: &Shape,
        target: &Type,
        line: u32,
    ) {
        for (name, value) in props {
            match shape.fields.get(name) {
                Some(f) if f.optional => {
                    let ty = Type::union(vec![f.ty.clone(), Type::Undefined]);
                    self.check_assign(value, &ty);
                }
                Some(f) => self.check_assign(value, &f.ty),
                None => {
                    self.error(
                        value.line,
                        format!(
                            "object literal may only specify known properties, and '{}' does not exist in type '{}'",
                            name, target
                        ),
                    );
                    self.expr_type(value, None);
                }
            }
        }
        for (name, _) in shape.required() {
            if !props.iter().any(|(p, _)| p == name) {
                self.error(
                    line,
                    format!(
                        "property '{}' is missing in object literal but required in type '{}'",
                        name, target
                    ),
                );
            }
        }
    }

    // -- Narrowing ----------------------------------------------

    /// Variable narrowed by a condition: name, type when true, type when false.
    pub(super) fn narrowing(&self, cond: &Expr) -> Option<(String, Type, Type)> {
        match &cond.kind {
            ExprKind::Unary {
                op: UnaryOp::Not,
                operand,
            } => self.narrowing(operand).map(|(n, t, f)| (n, f, t)),
            ExprKind::Binary { op, left, right }
                if matches!(op, BinaryOp::StrictEq | BinaryOp::StrictNe) =>
            {
                let found = self
                    .narrow_equality(left, right)
                    .or_else(|| self.narrow_equality(right, left))?;
                if *op == BinaryOp::StrictNe {
                    Some((found.0, found.2, found.1))
                } else {
                    Some(found)
                }
            }
            _ => None,
        }
    }

    fn narrow_equality(&self, a: &Expr, b: &Expr) -> Option<(String, Type, Type)> {
        match (&a.kind, &b.kind) {
            (
                ExprKind::Unary {
                    op: UnaryOp::TypeOf,
                    operand,
                },
                ExprKind::Literal(Literal::Str(tag)),
            ) => {
                let ExprKind::Ident(name) = &operand.kind else {
                    return None;
                };
                let current = self.lookup(name)?.ty.clone();
                Some((
                    name.clone(),
                    self.filter_by_tag(&current, tag, true),
                    self.filter_by_tag(&current, tag, false),
                ))
            }
            (ExprKind::Ident(name), ExprKind::Literal(lit @ (Literal::Null | Literal::Undefined))) => {
                let current = self.lookup(name)?.ty.clone();
                let nullish = literal_type(lit);
                if current.is_any() {
                    return Some((name.clone(), nullish, Type::Any));
                }
                let rest = current
                    .members()
                    .into_iter()
                    .filter(|m| **m != nullish && !(nullish == Type::Undefined && **m == Type::Void))
                    .cloned()
                    .collect();
                Some((name.clone(), nullish, Type::union(rest)))
            }
            _ => None,
        }
    }

    fn tag_of(&self, t: &Type) -> Option<&'static str> {
        match t {
            Type::Enum(e) => {
                let numeric = self.env.enum_table(e).is_some_and(|t| t.is_numeric());
                Some(if numeric { "number" } else { "string" })
            }
            other => other.typeof_tag(),
        }
    }

    fn filter_by_tag(&self, t: &Type, tag: &str, keep: bool) -> Type {
        if t.is_any() {
            return if keep {
                Type::from_typeof_tag(tag).unwrap_or(Type::Any)
            } else {
                Type::Any
            };
        }
        Type::union(
            t.members()
                .into_iter()
                .filter(|m| (self.tag_of(m) == Some(tag)) == keep)
                .cloned()
                .collect(),
        )
    }
}
