//! Shared AST types for the tycat example language.
//!
//! These types are produced by the parser and consumed by the static
//! checker and the evaluator. Functions and classes sit behind `Rc` so the
//! evaluator can hold on to them as runtime values without copying bodies.

use std::rc::Rc;

// ──────────────────────────────────────────────
// Type expressions (as written in source)
// ──────────────────────────────────────────────

/// A type annotation as it appears in source, before name resolution.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeExpr {
    /// Primitive keyword or a reference to an interface, alias, enum or class.
    Named(String),
    /// `T[]`
    Array(Box<TypeExpr>),
    /// `Name<T, ...>` -- only `Array<T>` resolves
    Generic { name: String, args: Vec<TypeExpr> },
    /// `[T, U, ...]`
    Tuple(Vec<TypeExpr>),
    /// `T | U | ...`
    Union(Vec<TypeExpr>),
    /// Inline structural shape `{ a: T; b?: U }`
    Shape(Vec<FieldDecl>),
    /// `(a: T) => R`
    Function {
        params: Vec<TypeExpr>,
        ret: Box<TypeExpr>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldDecl {
    pub name: String,
    pub ty: TypeExpr,
    pub optional: bool,
    pub line: u32,
}

// ──────────────────────────────────────────────
// Expressions
// ──────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Bool(bool),
    Number(f64),
    Str(String),
    Null,
    Undefined,
}

#[derive(Debug, Clone)]
pub enum TemplatePart {
    Text(String),
    Expr(Expr),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    StrictEq,
    StrictNe,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
    Neg,
    TypeOf,
}

#[derive(Debug, Clone)]
pub struct Expr {
    pub kind: ExprKind,
    pub line: u32,
}

#[derive(Debug, Clone)]
pub enum ExprKind {
    Literal(Literal),
    /// Backtick string with `${...}` substitutions
    Template(Vec<TemplatePart>),
    Array(Vec<Expr>),
    Object(Vec<(String, Expr)>),
    Ident(String),
    This,
    Member {
        object: Box<Expr>,
        property: String,
    },
    Index {
        object: Box<Expr>,
        index: Box<Expr>,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
    New {
        class: String,
        args: Vec<Expr>,
    },
    /// `expr as T` -- checker-only reinterpretation, no runtime effect
    As {
        expr: Box<Expr>,
        ty: TypeExpr,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Arrow(Rc<Function>),
}

impl Expr {
    pub fn new(kind: ExprKind, line: u32) -> Self {
        Expr { kind, line }
    }
}

// ──────────────────────────────────────────────
// Functions and classes
// ──────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct Param {
    pub name: String,
    pub ty: Option<TypeExpr>,
    /// `name?: T`
    pub optional: bool,
    pub line: u32,
}

#[derive(Debug, Clone)]
pub enum FunctionBody {
    /// `=> expr`
    Expr(Box<Expr>),
    /// `=> { ... }` or a method body
    Block(Vec<Stmt>),
}

#[derive(Debug, Clone)]
pub struct Function {
    pub params: Vec<Param>,
    pub ret: Option<TypeExpr>,
    pub body: FunctionBody,
    pub line: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Private,
}

impl Visibility {
    pub fn is_private(self) -> bool {
        self == Visibility::Private
    }
}

#[derive(Debug, Clone)]
pub struct ClassField {
    pub name: String,
    pub ty: TypeExpr,
    pub optional: bool,
    pub visibility: Visibility,
    pub init: Option<Expr>,
    pub line: u32,
}

#[derive(Debug, Clone)]
pub struct Method {
    pub name: String,
    pub visibility: Visibility,
    pub func: Rc<Function>,
}

#[derive(Debug, Clone)]
pub struct ClassDecl {
    pub name: String,
    pub fields: Vec<ClassField>,
    pub constructor: Option<Rc<Function>>,
    pub methods: Vec<Method>,
    pub line: u32,
}

impl ClassDecl {
    pub fn field(&self, name: &str) -> Option<&ClassField> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn method(&self, name: &str) -> Option<&Method> {
        self.methods.iter().find(|m| m.name == name)
    }
}

// ──────────────────────────────────────────────
// Enums and interfaces
// ──────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum EnumInit {
    Number(f64),
    Str(String),
}

#[derive(Debug, Clone)]
pub struct EnumMember {
    pub name: String,
    pub init: Option<EnumInit>,
    pub line: u32,
}

#[derive(Debug, Clone)]
pub struct EnumDecl {
    pub name: String,
    pub members: Vec<EnumMember>,
    pub line: u32,
}

#[derive(Debug, Clone)]
pub struct InterfaceDecl {
    pub name: String,
    pub fields: Vec<FieldDecl>,
    pub line: u32,
}

// ──────────────────────────────────────────────
// Statements
// ──────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct Stmt {
    pub kind: StmtKind,
    pub line: u32,
}

#[derive(Debug, Clone)]
pub enum StmtKind {
    Let {
        name: String,
        ty: Option<TypeExpr>,
        init: Option<Expr>,
        constant: bool,
    },
    Assign {
        target: Expr,
        value: Expr,
    },
    Expr(Expr),
    Enum(Rc<EnumDecl>),
    Interface(InterfaceDecl),
    TypeAlias {
        name: String,
        ty: TypeExpr,
    },
    Class(Rc<ClassDecl>),
    Throw(Expr),
    Return(Option<Expr>),
    If {
        cond: Expr,
        then_branch: Vec<Stmt>,
        else_branch: Option<Vec<Stmt>>,
    },
    While {
        cond: Expr,
        body: Vec<Stmt>,
    },
    Break,
}

impl Stmt {
    pub fn new(kind: StmtKind, line: u32) -> Self {
        Stmt { kind, line }
    }
}

/// A parsed source file: statements in source order.
#[derive(Debug, Clone, Default)]
pub struct Program {
    pub stmts: Vec<Stmt>,
}
