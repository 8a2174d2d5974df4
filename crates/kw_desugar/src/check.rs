//! Shape checking ahead of lowering.
//!
//! Every error the pass can raise is a property of the AST's shape, so all
//! of them are found here before a single keyword call is emitted. The
//! enclosing context of each expression is passed down explicitly as a
//! [`Site`].

use kw_ast::{Arm, Clause, Expr, ExprKind, Module, Stmt};
use tracing::debug;

use crate::cases::validate_case_list;
use crate::classify::is_transformable;
use crate::error::DesugarError;

/// Where a root expression sits relative to the nearest comprehension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Site {
    /// Not consumed by any comprehension clause: definition bodies, and the
    /// bodies of lambdas, case literals and keyword-call arguments.
    Detached,
    /// The expression of a comprehension clause; the integrator lowers it.
    Clause,
    /// The yielded (or done) body of a comprehension.
    ComprehensionBody,
}

/// All shape errors in `module`, in traversal order.
pub fn check_module(module: &Module) -> Vec<DesugarError> {
    let mut errors = Vec::new();
    for def in &module.defs {
        check_root(&def.body, Site::Detached, &mut errors);
    }
    debug!(defs = module.defs.len(), errors = errors.len(), "checked module");
    errors
}

/// All shape errors in `expr`, taken as a detached root.
pub fn check_expr(expr: &Expr) -> Vec<DesugarError> {
    let mut errors = Vec::new();
    check_root(expr, Site::Detached, &mut errors);
    errors
}

/// The error a transformable root raises at `site`, if any.
pub fn site_error(expr: &Expr, site: Site) -> Option<DesugarError> {
    if !is_transformable(expr) {
        return None;
    }
    let span = expr.span;
    match site {
        Site::Clause => None,
        Site::ComprehensionBody => Some(DesugarError::UnsupportedEnclosingTransform { span }),
        Site::Detached => Some(DesugarError::OrphanTransformableExpression { span }),
    }
}

fn check_root(expr: &Expr, site: Site, errors: &mut Vec<DesugarError>) {
    errors.extend(site_error(expr, site));
    walk(expr, errors);
}

fn check_detached_arms(arms: &[Arm], errors: &mut Vec<DesugarError>) {
    for arm in arms {
        if let Some(guard) = &arm.guard {
            check_root(guard, Site::Detached, errors);
        }
        check_root(&arm.body, Site::Detached, errors);
    }
}

fn walk_arms(arms: &[Arm], errors: &mut Vec<DesugarError>) {
    for arm in arms {
        if let Some(guard) = &arm.guard {
            walk(guard, errors);
        }
        walk(&arm.body, errors);
    }
}

fn walk(expr: &Expr, errors: &mut Vec<DesugarError>) {
    match &expr.kind {
        ExprKind::Lit { .. } | ExprKind::Ident { .. } => {}
        ExprKind::Apply { callee, args } => {
            walk(callee, errors);
            for arg in args {
                walk(arg, errors);
            }
        }
        ExprKind::Block { stats, result } => {
            for stat in stats {
                match stat {
                    Stmt::Generator { source: e, .. }
                    | Stmt::ValueDef { rhs: e, .. }
                    | Stmt::Expr { expr: e } => walk(e, errors),
                }
            }
            walk(result, errors);
        }
        ExprKind::If {
            cond,
            then_branch,
            else_branch,
        } => {
            walk(cond, errors);
            walk(then_branch, errors);
            walk(else_branch, errors);
        }
        ExprKind::Match { scrutinee, arms } => {
            if is_transformable(expr) {
                errors.extend(validate_case_list(expr.span, arms).err());
            }
            walk(scrutinee, errors);
            walk_arms(arms, errors);
        }
        ExprKind::While { cond, body } | ExprKind::DoWhile { body, cond } => {
            walk(cond, errors);
            walk(body, errors);
        }
        ExprKind::Try {
            body,
            catches,
            finalizer,
        } => {
            walk(body, errors);
            if let Some(arms) = catches {
                if is_transformable(expr) {
                    errors.extend(validate_case_list(expr.span, arms).err());
                }
                walk_arms(arms, errors);
            }
            if let Some(finalizer) = finalizer {
                walk(finalizer, errors);
            }
        }
        ExprKind::For { clauses, body, .. } => {
            for clause in clauses {
                match clause {
                    Clause::Generator { source: e, .. }
                    | Clause::ValueDef { rhs: e, .. }
                    | Clause::Guard { cond: e } => check_root(e, Site::Clause, errors),
                }
            }
            check_root(body, Site::ComprehensionBody, errors);
        }
        ExprKind::Lambda { body, .. } => check_root(body, Site::Detached, errors),
        ExprKind::Cases { arms } => check_detached_arms(arms, errors),
        ExprKind::Keyword { args, .. } => {
            for arg in args {
                check_root(arg, Site::Detached, errors);
            }
        }
    }
}
