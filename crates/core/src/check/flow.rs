//! Syntactic control-flow helpers.

use std::collections::HashSet;

use crate::ast::{Expr, ExprKind, Function, FunctionBody, Literal, Stmt, StmtKind};

pub(super) fn is_literal_true(e: &Expr) -> bool {
    matches!(e.kind, ExprKind::Literal(Literal::Bool(true)))
}

/// Whether `body` contains a `break` that targets the enclosing loop.
/// Nested loops own their breaks.
pub(super) fn contains_break(body: &[Stmt]) -> bool {
    body.iter().any(|s| match &s.kind {
        StmtKind::Break => true,
        StmtKind::If {
            then_branch,
            else_branch,
            ..
        } => contains_break(then_branch) || else_branch.as_deref().is_some_and(contains_break),
        _ => false,
    })
}

/// Fields definitely assigned by a constructor: `this.f = ...` statements
/// at the top level of its body, before any early exit.
pub(super) fn assigned_this_fields(ctor: &Function) -> HashSet<String> {
    let mut out = HashSet::new();
    let FunctionBody::Block(stmts) = &ctor.body else {
        return out;
    };
    for s in stmts {
        match &s.kind {
            StmtKind::Assign { target, .. } => {
                if let ExprKind::Member { object, property } = &target.kind {
                    if matches!(object.kind, ExprKind::This) {
                        out.insert(property.clone());
                    }
                }
            }
            StmtKind::Return(_) | StmtKind::Throw(_) => break,
            _ => {}
        }
    }
    out
}
