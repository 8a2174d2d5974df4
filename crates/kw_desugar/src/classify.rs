//! Classification of expressions as transformable (contains a bind that
//! must be lowered through the keyword algebra) or opaque.
//!
//! Transformability propagates upward through blocks, control flow and
//! applications, and stops at comprehensions, lambdas, case literals and
//! keyword calls: those are opaque values to whatever contains them.

use kw_ast::{Arm, Clause, Expr, ExprKind, Stmt};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransformTag {
    Opaque,
    Transformable,
}

impl TransformTag {
    fn of(transformable: bool) -> Self {
        if transformable {
            TransformTag::Transformable
        } else {
            TransformTag::Opaque
        }
    }
}

pub fn classify(expr: &Expr) -> TransformTag {
    TransformTag::of(is_transformable(expr))
}

pub fn is_transformable(expr: &Expr) -> bool {
    match &expr.kind {
        ExprKind::Lit { .. } | ExprKind::Ident { .. } => false,
        ExprKind::Apply { callee, args } => {
            is_transformable(callee) || args.iter().any(is_transformable)
        }
        ExprKind::Block { stats, result } => {
            stats.iter().any(stmt_is_transformable) || is_transformable(result)
        }
        ExprKind::If {
            cond,
            then_branch,
            else_branch,
        } => is_transformable(cond) || is_transformable(then_branch) || is_transformable(else_branch),
        ExprKind::Match { scrutinee, arms } => {
            is_transformable(scrutinee) || arms.iter().any(arm_is_transformable)
        }
        ExprKind::While { cond, body } | ExprKind::DoWhile { body, cond } => {
            is_transformable(cond) || is_transformable(body)
        }
        ExprKind::Try {
            body,
            catches,
            finalizer,
        } => {
            is_transformable(body)
                || catches
                    .as_deref()
                    .is_some_and(|arms| arms.iter().any(arm_is_transformable))
                || finalizer.as_deref().is_some_and(is_transformable)
        }
        ExprKind::For { .. }
        | ExprKind::Lambda { .. }
        | ExprKind::Cases { .. }
        | ExprKind::Keyword { .. } => false,
    }
}

/// A bind is always transformable; other statements follow their expression.
pub fn stmt_is_transformable(stmt: &Stmt) -> bool {
    match stmt {
        Stmt::Generator { .. } => true,
        Stmt::ValueDef { rhs, .. } => is_transformable(rhs),
        Stmt::Expr { expr } => is_transformable(expr),
    }
}

pub fn arm_is_transformable(arm: &Arm) -> bool {
    arm.guard.as_ref().is_some_and(is_transformable) || is_transformable(&arm.body)
}

/// Whether the integrator has to rewrite this comprehension clause.
pub fn clause_is_transformable(clause: &Clause) -> bool {
    match clause {
        Clause::Generator { source: e, .. }
        | Clause::ValueDef { rhs: e, .. }
        | Clause::Guard { cond: e } => is_transformable(e),
    }
}
