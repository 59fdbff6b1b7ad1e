//! tycat-core: front end of the type catalog language.
//!
//! Source text goes through [`lexer`] and [`parser`] into an [`ast::Program`],
//! which the [`check::Checker`] validates against the static type rules.
//! Nothing here executes code; evaluation lives in `tycat-eval`.
//!
//! # Public API
//!
//! - [`parse()`] / [`parse_expression()`] -- source to AST
//! - [`Checker`] -- persistent static checker, [`check_source()`] for one-shot use
//! - [`Type`] -- resolved types, with TypeScript-style display
//! - [`EnumTable`] -- bidirectional enum member/value mapping
//! - [`Diagnostic`] / [`Diagnostics`] -- lex, parse and check errors

pub mod ast;
pub mod check;
pub mod enum_table;
pub mod error;
pub mod lexer;
pub mod number;
pub mod parser;
pub mod types;

pub use check::{check_source, Checker, TypeEnv};
pub use enum_table::{EnumTable, EnumValue};
pub use error::{Diagnostic, Diagnostics, Phase};
pub use number::format_number;
pub use parser::{parse, parse_expression};
pub use types::{FnType, Shape, Type};
