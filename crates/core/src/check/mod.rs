//! Static checker: resolves annotations, infers declaration types and
//! reports every violation it finds as a [`Diagnostic`].
//!
//! The checker is persistent: declarations made by one [`Checker::check_program`]
//! call are visible to the next. Callers that want to try a program without
//! committing its declarations clone the checker first.

mod assign;
mod env;
mod expr;
mod flow;

use std::collections::{BTreeMap, HashMap};
use std::mem;
use std::rc::Rc;

pub use env::{ClassInfo, Member, TypeEnv};

use crate::ast::{
    ClassDecl, Expr, ExprKind, FieldDecl, Function, FunctionBody, Program, Stmt, StmtKind,
    TypeExpr,
};
use crate::enum_table::EnumTable;
use crate::error::{Diagnostic, Diagnostics};
use crate::parser;
use crate::types::{Field, FnType, Shape, Type};

#[derive(Debug, Clone)]
struct Binding {
    /// Current view, possibly narrowed.
    ty: Type,
    /// Declared type; assignments are checked against this.
    declared: Type,
    constant: bool,
}

#[derive(Debug, Clone, Default)]
struct FnCtx {
    declared_ret: Option<Type>,
    returns: Vec<Type>,
    bare_return: bool,
}

#[derive(Debug, Clone)]
pub struct Checker {
    file: String,
    env: TypeEnv,
    /// Innermost scope last; index 0 holds the builtins.
    scopes: Vec<HashMap<String, Binding>>,
    diagnostics: Vec<Diagnostic>,
    functions: Vec<FnCtx>,
    class_ctx: Option<String>,
    loop_depth: usize,
}

/// Parse and check `src` in a fresh checker.
pub fn check_source(src: &str, file: &str) -> Result<(Program, Checker), Diagnostics> {
    let program = parser::parse(src, file)?;
    let mut checker = Checker::new(file);
    checker.check_program(&program)?;
    Ok((program, checker))
}

impl Checker {
    pub fn new(file: &str) -> Self {
        let mut builtins = HashMap::new();
        let mut console = BTreeMap::new();
        console.insert(
            "log".to_owned(),
            Field {
                ty: Type::Function(FnType::variadic(Type::Any, Type::Void)),
                optional: false,
            },
        );
        let fixed = |ty: Type| Binding {
            declared: ty.clone(),
            ty,
            constant: true,
        };
        builtins.insert(
            "console".to_owned(),
            fixed(Type::Object(Shape::named("Console", console))),
        );
        builtins.insert(
            "alert".to_owned(),
            fixed(Type::Function(FnType {
                params: vec![Type::Any],
                required: 0,
                rest: None,
                ret: Box::new(Type::Void),
            })),
        );
        builtins.insert("Error".to_owned(), fixed(Type::ClassObject("Error".into())));

        Checker {
            file: file.to_owned(),
            env: TypeEnv::with_builtins(),
            scopes: vec![builtins, HashMap::new()],
            diagnostics: Vec::new(),
            functions: Vec::new(),
            class_ctx: None,
            loop_depth: 0,
        }
    }

    /// File name used for subsequent diagnostics.
    pub fn set_file(&mut self, file: &str) {
        self.file = file.to_owned();
    }

    pub fn env(&self) -> &TypeEnv {
        &self.env
    }

    /// Current type of a visible variable.
    pub fn type_of_name(&self, name: &str) -> Option<&Type> {
        self.lookup(name).map(|b| &b.ty)
    }

    /// Check a program, keeping its declarations for later calls.
    pub fn check_program(&mut self, program: &Program) -> Result<(), Diagnostics> {
        for stmt in &program.stmts {
            self.check_stmt(stmt);
        }
        self.finish(())
    }

    /// Type an expression against the current declarations.
    pub fn check_expression(&mut self, expr: &Expr) -> Result<Type, Diagnostics> {
        let t = self.expr_type(expr, None);
        self.finish(t)
    }

    fn finish<T>(&mut self, value: T) -> Result<T, Diagnostics> {
        let diags = mem::take(&mut self.diagnostics);
        if diags.is_empty() {
            Ok(value)
        } else {
            log::debug!("{}: {} diagnostic(s)", self.file, diags.len());
            Err(Diagnostics(diags))
        }
    }

    // -- Diagnostics and scopes ---------------------------------

    fn error(&mut self, line: u32, msg: impl Into<String>) {
        self.diagnostics
            .push(Diagnostic::check(&self.file, line, msg));
    }

    fn resolve(&mut self, t: &TypeExpr, line: u32) -> Type {
        match self.env.resolve(t) {
            Ok(ty) => ty,
            Err(msg) => {
                self.error(line, msg);
                Type::Any
            }
        }
    }

    fn push_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    fn pop_scope(&mut self) {
        self.scopes.pop();
    }

    fn lookup(&self, name: &str) -> Option<&Binding> {
        self.scopes.iter().rev().find_map(|s| s.get(name))
    }

    fn lookup_mut(&mut self, name: &str) -> Option<&mut Binding> {
        self.scopes.iter_mut().rev().find_map(|s| s.get_mut(name))
    }

    fn declare(&mut self, name: &str, ty: Type, constant: bool, line: u32) {
        let scope = self.scopes.len() - 1;
        if self.scopes[scope].contains_key(name) {
            self.error(
                line,
                format!("cannot redeclare block-scoped variable '{}'", name),
            );
            return;
        }
        self.scopes[scope].insert(
            name.to_owned(),
            Binding {
                declared: ty.clone(),
                ty,
                constant,
            },
        );
    }

    /// Shadow `name` in the innermost scope with a narrowed view.
    fn narrow(&mut self, name: &str, ty: Type) {
        if let Some(b) = self.lookup(name).cloned() {
            let scope = self.scopes.len() - 1;
            self.scopes[scope].insert(name.to_owned(), Binding { ty, ..b });
        }
    }

    // -- Statements ---------------------------------------------

    /// Check a statement; returns whether it can complete normally.
    fn check_stmt(&mut self, stmt: &Stmt) -> bool {
        let line = stmt.line;
        match &stmt.kind {
            StmtKind::Let {
                name,
                ty,
                init,
                constant,
            } => {
                let declared = ty.as_ref().map(|t| self.resolve(t, line));
                // A function literal may call itself through its own binding.
                let early = match (&declared, init) {
                    (Some(d), Some(e)) if matches!(e.kind, ExprKind::Arrow(_)) => Some(d.clone()),
                    (None, Some(e)) => self.annotated_signature(e),
                    _ => None,
                };
                let scope = self.scopes.len() - 1;
                let early = early.filter(|_| !self.scopes[scope].contains_key(name.as_str()));
                if let Some(t) = &early {
                    self.declare(name, t.clone(), *constant, line);
                }
                let binding_ty = match (declared, init) {
                    (Some(d), Some(e)) => {
                        self.check_assign(e, &d);
                        d
                    }
                    (Some(d), None) => d,
                    (None, Some(e)) => self.expr_type(e, None),
                    (None, None) => Type::Any,
                };
                log::trace!("{}:{}: {}: {}", self.file, line, name, binding_ty);
                if early.is_some() {
                    self.scopes[scope].insert(
                        name.clone(),
                        Binding {
                            declared: binding_ty.clone(),
                            ty: binding_ty,
                            constant: *constant,
                        },
                    );
                } else {
                    self.declare(name, binding_ty, *constant, line);
                }
                true
            }
            StmtKind::Assign { target, value } => {
                self.check_assignment(target, value, line);
                true
            }
            StmtKind::Expr(e) => self.expr_type(e, None) != Type::Never,
            StmtKind::Enum(decl) => {
                if self.type_name_taken(&decl.name, line) {
                    return true;
                }
                match EnumTable::build(decl, &self.file) {
                    Ok(table) => {
                        self.env.declare_enum(table);
                        self.declare(&decl.name, Type::EnumObject(decl.name.clone()), true, line);
                    }
                    Err(d) => self.diagnostics.push(d),
                }
                true
            }
            StmtKind::Interface(decl) => {
                if !self.type_name_taken(&decl.name, line) {
                    let fields = self.resolve_fields(&decl.fields);
                    self.env
                        .declare_alias(&decl.name, Type::Object(Shape::named(&decl.name, fields)));
                }
                true
            }
            StmtKind::TypeAlias { name, ty } => {
                if !self.type_name_taken(name, line) {
                    let resolved = match self.resolve(ty, line) {
                        Type::Object(shape) if shape.name.is_none() => {
                            Type::Object(Shape::named(name, shape.fields))
                        }
                        other => other,
                    };
                    self.env.declare_alias(name, resolved);
                }
                true
            }
            StmtKind::Class(decl) => {
                self.check_class(decl);
                true
            }
            StmtKind::Throw(e) => {
                self.expr_type(e, None);
                false
            }
            StmtKind::Return(value) => {
                self.check_return(value.as_ref(), line);
                false
            }
            StmtKind::If {
                cond,
                then_branch,
                else_branch,
            } => {
                self.expr_type(cond, None);
                let narrowed = self.narrowing(cond);
                self.push_scope();
                if let Some((name, then_ty, _)) = &narrowed {
                    self.narrow(name, then_ty.clone());
                }
                let then_completes = self.check_branch(then_branch);
                self.pop_scope();
                let else_completes = match else_branch {
                    Some(els) => {
                        self.push_scope();
                        if let Some((name, _, else_ty)) = &narrowed {
                            self.narrow(name, else_ty.clone());
                        }
                        let c = self.check_branch(els);
                        self.pop_scope();
                        c
                    }
                    None => true,
                };
                then_completes || else_completes
            }
            StmtKind::While { cond, body } => {
                self.expr_type(cond, None);
                self.loop_depth += 1;
                self.push_scope();
                self.check_block(body);
                self.pop_scope();
                self.loop_depth -= 1;
                !(flow::is_literal_true(cond) && !flow::contains_break(body))
            }
            StmtKind::Break => {
                if self.loop_depth == 0 {
                    self.error(
                        line,
                        "a 'break' statement can only be used within an enclosing loop",
                    );
                }
                false
            }
        }
    }

    /// Check every statement, reachable or not; returns whether the block
    /// can complete normally.
    fn check_block(&mut self, stmts: &[Stmt]) -> bool {
        let mut completes = true;
        for s in stmts {
            completes &= self.check_stmt(s);
        }
        completes
    }

    /// A branch body gets its own scope, inside the one holding narrowed
    /// bindings, so its declarations may shadow the narrowed name.
    fn check_branch(&mut self, stmts: &[Stmt]) -> bool {
        self.push_scope();
        let completes = self.check_block(stmts);
        self.pop_scope();
        completes
    }

    /// Signature of an arrow whose parameters and result are all annotated,
    /// resolved without reporting anything.
    fn annotated_signature(&self, expr: &Expr) -> Option<Type> {
        let ExprKind::Arrow(func) = &expr.kind else {
            return None;
        };
        let params = func
            .params
            .iter()
            .map(|p| p.ty.as_ref().and_then(|t| self.env.resolve(t).ok()))
            .collect::<Option<Vec<_>>>()?;
        let ret = self.env.resolve(func.ret.as_ref()?).ok()?;
        let required = func.params.iter().take_while(|p| !p.optional).count();
        Some(Type::Function(FnType {
            required,
            ..FnType::new(params, ret)
        }))
    }

    fn type_name_taken(&mut self, name: &str, line: u32) -> bool {
        if self.env.is_type_name_taken(name) {
            self.error(line, format!("duplicate identifier '{}'", name));
            return true;
        }
        false
    }

    fn resolve_fields(&mut self, decls: &[FieldDecl]) -> BTreeMap<String, Field> {
        let mut fields = BTreeMap::new();
        for d in decls {
            let ty = self.resolve(&d.ty, d.line);
            fields.insert(
                d.name.clone(),
                Field {
                    ty,
                    optional: d.optional,
                },
            );
        }
        fields
    }

    fn check_assignment(&mut self, target: &Expr, value: &Expr, line: u32) {
        match &target.kind {
            ExprKind::Ident(name) => {
                let Some(binding) = self.lookup(name).cloned() else {
                    self.error(line, format!("cannot find name '{}'", name));
                    self.expr_type(value, None);
                    return;
                };
                if binding.constant {
                    self.error(
                        line,
                        format!("cannot assign to '{}' because it is a constant", name),
                    );
                }
                self.check_assign(value, &binding.declared);
                // Assignment ends any narrowing of the variable.
                if let Some(b) = self.lookup_mut(name) {
                    b.ty = b.declared.clone();
                }
            }
            ExprKind::Member { object, property } => {
                let obj = self.expr_type(object, None);
                match &obj {
                    Type::EnumObject(_) => {
                        self.error(
                            line,
                            format!(
                                "cannot assign to '{}' because it is a read-only property",
                                property
                            ),
                        );
                        self.expr_type(value, None);
                        return;
                    }
                    Type::Class(c)
                        if self
                            .env
                            .class(c)
                            .is_some_and(|i| i.methods.contains_key(property)) =>
                    {
                        self.error(
                            line,
                            format!("cannot assign to '{}' because it is a method", property),
                        );
                        self.expr_type(value, None);
                        return;
                    }
                    _ => {}
                }
                let member = self.member_type(&obj, property, line);
                self.check_assign(value, &member);
            }
            ExprKind::Index { object, index } => {
                let obj = self.expr_type(object, None);
                if let Type::EnumObject(e) = &obj {
                    self.error(line, format!("enum '{}' is read-only", e));
                    self.expr_type(value, None);
                    return;
                }
                let elem = self.index_type(&obj, index, line);
                self.check_assign(value, &elem);
            }
            _ => {
                self.error(line, "invalid assignment target");
            }
        }
    }

    fn check_return(&mut self, value: Option<&Expr>, line: u32) {
        let Some(declared) = self.functions.last().map(|c| c.declared_ret.clone()) else {
            self.error(
                line,
                "a 'return' statement can only be used within a function body",
            );
            if let Some(e) = value {
                self.expr_type(e, None);
            }
            return;
        };
        match (declared, value) {
            (Some(Type::Never), value) => {
                self.error(line, "a function returning 'never' cannot return");
                if let Some(e) = value {
                    self.expr_type(e, None);
                }
            }
            (Some(r), Some(e)) => self.check_assign(e, &r),
            (Some(r), None) => {
                if !r.accepts_undefined() {
                    self.error(
                        line,
                        "a function whose declared type is neither 'void' nor 'any' must return a value",
                    );
                }
            }
            (None, Some(e)) => {
                let t = self.expr_type(e, None);
                if let Some(ctx) = self.functions.last_mut() {
                    ctx.returns.push(t);
                }
            }
            (None, None) => {
                if let Some(ctx) = self.functions.last_mut() {
                    ctx.bare_return = true;
                }
            }
        }
    }

    // -- Functions ----------------------------------------------

    /// Check a function body and return its signature. Unannotated
    /// parameters take their type from `contextual` when given, else `any`.
    fn function_type(&mut self, func: &Function, contextual: Option<&FnType>) -> FnType {
        let mut params = Vec::with_capacity(func.params.len());
        for (i, p) in func.params.iter().enumerate() {
            let ty = match &p.ty {
                Some(t) => self.resolve(t, p.line),
                None => contextual
                    .and_then(|c| c.params.get(i).cloned())
                    .unwrap_or(Type::Any),
            };
            params.push(ty);
        }
        let required = func.params.iter().take_while(|p| !p.optional).count();
        let declared_ret = func.ret.as_ref().map(|t| self.resolve(t, func.line));

        self.push_scope();
        for (p, ty) in func.params.iter().zip(&params) {
            let local = if p.optional {
                Type::union(vec![ty.clone(), Type::Undefined])
            } else {
                ty.clone()
            };
            self.declare(&p.name, local, false, p.line);
        }
        self.functions.push(FnCtx {
            declared_ret: declared_ret.clone(),
            ..FnCtx::default()
        });
        let saved_loops = mem::replace(&mut self.loop_depth, 0);

        let completes = match &func.body {
            FunctionBody::Expr(e) => {
                match &declared_ret {
                    Some(Type::Never) => {
                        if self.expr_type(e, None) != Type::Never {
                            self.error(
                                func.line,
                                "a function returning 'never' cannot have a reachable end point",
                            );
                        }
                    }
                    Some(r) => self.check_assign(e, r),
                    None => {
                        let t = self.expr_type(e, None);
                        if let Some(ctx) = self.functions.last_mut() {
                            ctx.returns.push(t);
                        }
                    }
                }
                false
            }
            FunctionBody::Block(stmts) => self.check_block(stmts),
        };

        self.loop_depth = saved_loops;
        let ctx = self.functions.pop().unwrap_or_default();
        self.pop_scope();

        let is_block = matches!(func.body, FunctionBody::Block(_));
        let ret = match declared_ret {
            Some(Type::Never) => {
                if completes {
                    self.error(
                        func.line,
                        "a function returning 'never' cannot have a reachable end point",
                    );
                }
                Type::Never
            }
            Some(r) => {
                if is_block && completes && !r.accepts_undefined() {
                    self.error(
                        func.line,
                        format!(
                            "function lacks ending return statement and return type '{}' does not include 'undefined'",
                            r
                        ),
                    );
                }
                r
            }
            None if !is_block => Type::union(ctx.returns),
            None if ctx.returns.is_empty() => {
                if completes || ctx.bare_return {
                    Type::Void
                } else {
                    Type::Never
                }
            }
            None => {
                let mut ts = ctx.returns;
                if completes || ctx.bare_return {
                    ts.push(Type::Undefined);
                }
                Type::union(ts)
            }
        };

        FnType {
            params,
            required,
            rest: None,
            ret: Box::new(ret),
        }
    }

    // -- Classes ------------------------------------------------

    fn check_class(&mut self, decl: &Rc<ClassDecl>) {
        let line = decl.line;
        if self.type_name_taken(&decl.name, line) {
            return;
        }

        // Signatures first so bodies can refer to every member.
        let mut fields = BTreeMap::new();
        for f in &decl.fields {
            let ty = self.resolve(&f.ty, f.line);
            fields.insert(
                f.name.clone(),
                Member {
                    ty,
                    optional: f.optional,
                    visibility: f.visibility,
                },
            );
        }
        let mut methods = BTreeMap::new();
        for m in &decl.methods {
            let sig = self.signature(&m.func);
            methods.insert(
                m.name.clone(),
                Member {
                    ty: Type::Function(sig),
                    optional: false,
                    visibility: m.visibility,
                },
            );
        }
        let ctor = match &decl.constructor {
            Some(c) => FnType {
                ret: Box::new(Type::Void),
                ..self.signature(c)
            },
            None => FnType::new(Vec::new(), Type::Void),
        };
        self.env.declare_class(ClassInfo {
            name: decl.name.clone(),
            fields,
            methods,
            ctor,
        });
        self.declare(&decl.name, Type::ClassObject(decl.name.clone()), true, line);

        let saved = self.class_ctx.replace(decl.name.clone());

        for f in &decl.fields {
            if let Some(init) = &f.init {
                let ty = self
                    .env
                    .class(&decl.name)
                    .and_then(|i| i.fields.get(&f.name))
                    .map(|m| m.ty.clone())
                    .unwrap_or(Type::Any);
                self.check_assign(init, &ty);
            }
        }

        let assigned = decl
            .constructor
            .as_ref()
            .map(|c| flow::assigned_this_fields(c))
            .unwrap_or_default();
        for f in &decl.fields {
            let accepts_undefined = self
                .env
                .class(&decl.name)
                .and_then(|i| i.fields.get(&f.name))
                .is_some_and(|m| m.ty.accepts_undefined());
            if f.init.is_none() && !f.optional && !accepts_undefined && !assigned.contains(&f.name)
            {
                self.error(
                    f.line,
                    format!(
                        "property '{}' has no initializer and is not definitely assigned in the constructor",
                        f.name
                    ),
                );
            }
        }

        if let Some(c) = &decl.constructor {
            let as_void = Function {
                ret: Some(TypeExpr::Named("void".into())),
                ..(**c).clone()
            };
            self.function_type(&as_void, None);
        }

        for m in &decl.methods {
            let checked = self.function_type(&m.func, None);
            if let Some(info) = self.env.class_mut(&decl.name) {
                if let Some(member) = info.methods.get_mut(&m.name) {
                    member.ty = Type::Function(checked);
                }
            }
        }

        self.class_ctx = saved;
    }

    /// Declared signature without checking the body; unannotated results
    /// are `any` until the body has been checked.
    fn signature(&mut self, func: &Function) -> FnType {
        let params = func
            .params
            .iter()
            .map(|p| match &p.ty {
                Some(t) => self.resolve(t, p.line),
                None => Type::Any,
            })
            .collect();
        let ret = match &func.ret {
            Some(t) => self.resolve(t, func.line),
            None => Type::Any,
        };
        FnType {
            params,
            required: func.params.iter().take_while(|p| !p.optional).count(),
            rest: None,
            ret: Box::new(ret),
        }
    }

    /// Whether the current class context may see private members of `class`.
    fn inside_class(&self, class: &str) -> bool {
        self.class_ctx.as_deref() == Some(class)
    }
}

#[cfg(test)]
mod tests;
