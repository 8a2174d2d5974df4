//! Integration of lowered expressions into the enclosing comprehension.
//!
//! A clause whose expression is transformable is split in two: a fresh
//! bind of the wrapped expression, then the original clause reading from
//! the fresh name.
//!
//! - `p = e`   → `n <- wrap(e); p = n`
//! - `p <- e`  → `n <- wrap(e); p <- n`
//! - `if e`    → `n <- wrap(e); if n`
//!
//! Opaque clauses are left for the comprehension's ordinary desugaring.

use kw_ast::{Clause, Expr, Pattern};
use tracing::debug;

use crate::classify::{clause_is_transformable, is_transformable};
use crate::error::{DesugarError, Result};
use crate::wrap::Wrapper;

impl Wrapper<'_> {
    /// Rewrite the clauses of a comprehension yielding (or doing) `body`.
    ///
    /// Fails with `UnsupportedEnclosingTransform` if `body` itself contains
    /// a bind; nothing is lowered in that case.
    pub fn integrate_clauses(&mut self, clauses: &[Clause], body: &Expr) -> Result<Vec<Clause>> {
        if is_transformable(body) {
            return Err(DesugarError::UnsupportedEnclosingTransform { span: body.span });
        }
        let mut out = Vec::with_capacity(clauses.len());
        let mut lowered = 0;
        for clause in clauses {
            if !clause_is_transformable(clause) {
                out.push(clause.clone());
                continue;
            }
            let expr = match clause {
                Clause::Generator { source: e, .. }
                | Clause::ValueDef { rhs: e, .. }
                | Clause::Guard { cond: e } => e,
            };
            let name = self.fresh_name();
            let source = self.wrap(expr)?;
            let fresh = Expr::ident(expr.span, name.clone());
            out.push(Clause::Generator {
                pat: Pattern::var(name),
                source,
            });
            out.push(match clause {
                Clause::Generator { pat, .. } => Clause::Generator {
                    pat: pat.clone(),
                    source: fresh,
                },
                Clause::ValueDef { pat, .. } => Clause::ValueDef {
                    pat: pat.clone(),
                    rhs: fresh,
                },
                Clause::Guard { .. } => Clause::Guard { cond: fresh },
            });
            lowered += 1;
        }
        debug!(clauses = clauses.len(), lowered, "integrated comprehension");
        Ok(out)
    }
}
