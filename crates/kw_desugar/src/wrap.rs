//! The expression wrapper: lowers a transformable expression into an
//! equivalent tree of keyword-algebra calls.
//!
//! Opaque expressions become `pure(e)` without being looked into. A
//! transformable block becomes a `flatMap` chain threaded in statement
//! order, as if it were a comprehension over its own statements yielding
//! its result. Control flow maps one-to-one onto the algebra's operations,
//! with match and catch arms tagged by the case-list rewriter.

use std::collections::HashSet;
use std::iter;

use kw_ast::{Arm, Clause, Expr, ExprKind, KwConfig, Pattern, Stmt};
use swc_common::Span;

use crate::algebra::KeywordAlgebra;
use crate::cases::wrap_case_list;
use crate::classify::is_transformable;
use crate::error::Result;

/// Generator of compiler-introduced binder names, `<prefix>0`, `<prefix>1`, ...
///
/// Candidates that are already in `taken` are skipped.
#[derive(Debug, Clone)]
struct FreshNames {
    prefix: String,
    next: usize,
    taken: HashSet<String>,
}

impl FreshNames {
    fn next(&mut self) -> String {
        loop {
            let name = format!("{}{}", self.prefix, self.next);
            self.next += 1;
            if self.taken.insert(name.clone()) {
                return name;
            }
        }
    }
}

/// Every identifier and pattern binder occurring anywhere in `expr`.
fn collect_names(expr: &Expr, out: &mut HashSet<String>) {
    match &expr.kind {
        ExprKind::Lit { .. } => {}
        ExprKind::Ident { name } => {
            out.insert(name.clone());
        }
        ExprKind::Apply { callee, args } => {
            collect_names(callee, out);
            for arg in args {
                collect_names(arg, out);
            }
        }
        ExprKind::Block { stats, result } => {
            for stat in stats {
                match stat {
                    Stmt::Generator { pat, source: e } | Stmt::ValueDef { pat, rhs: e } => {
                        collect_binders(pat, out);
                        collect_names(e, out);
                    }
                    Stmt::Expr { expr } => collect_names(expr, out),
                }
            }
            collect_names(result, out);
        }
        ExprKind::If {
            cond,
            then_branch,
            else_branch,
        } => {
            collect_names(cond, out);
            collect_names(then_branch, out);
            collect_names(else_branch, out);
        }
        ExprKind::Match { scrutinee, arms } => {
            collect_names(scrutinee, out);
            collect_arm_names(arms, out);
        }
        ExprKind::While { cond, body } | ExprKind::DoWhile { body, cond } => {
            collect_names(cond, out);
            collect_names(body, out);
        }
        ExprKind::Try {
            body,
            catches,
            finalizer,
        } => {
            collect_names(body, out);
            if let Some(arms) = catches {
                collect_arm_names(arms, out);
            }
            if let Some(finalizer) = finalizer {
                collect_names(finalizer, out);
            }
        }
        ExprKind::For { clauses, body, .. } => {
            for clause in clauses {
                match clause {
                    Clause::Generator { pat, source: e } | Clause::ValueDef { pat, rhs: e } => {
                        collect_binders(pat, out);
                        collect_names(e, out);
                    }
                    Clause::Guard { cond } => collect_names(cond, out),
                }
            }
            collect_names(body, out);
        }
        ExprKind::Lambda { param, body } => {
            collect_binders(param, out);
            collect_names(body, out);
        }
        ExprKind::Cases { arms } => collect_arm_names(arms, out),
        ExprKind::Keyword { args, .. } => {
            for arg in args {
                collect_names(arg, out);
            }
        }
    }
}

fn collect_arm_names(arms: &[Arm], out: &mut HashSet<String>) {
    for arm in arms {
        collect_binders(&arm.pat, out);
        if let Some(guard) = &arm.guard {
            collect_names(guard, out);
        }
        collect_names(&arm.body, out);
    }
}

fn collect_binders(pat: &Pattern, out: &mut HashSet<String>) {
    out.extend(pat.binders().into_iter().map(str::to_string));
}

/// The value a bind chain ends in.
enum Tail {
    /// An opaque result, not yet lifted with `pure`.
    Value(Expr),
    Lowered(Expr),
}

impl Tail {
    fn lower(self, algebra: &dyn KeywordAlgebra) -> Expr {
        match self {
            Tail::Value(value) => algebra.pure(value),
            Tail::Lowered(lowered) => lowered,
        }
    }
}

enum Step {
    /// `pat <- source`, where `source` is already a lowered (monadic) value.
    Bind { pat: Pattern, source: Expr },
    /// A statement kept as-is inside the continuation.
    Plain(Stmt),
}

/// Statements of a block (or operands of a call) in evaluation order.
#[derive(Default)]
struct Chain {
    steps: Vec<Step>,
}

impl Chain {
    fn bind(&mut self, pat: Pattern, source: Expr) {
        self.steps.push(Step::Bind { pat, source });
    }

    fn plain(&mut self, stmt: Stmt) {
        self.steps.push(Step::Plain(stmt));
    }

    /// Fold the steps from the back into nested `flatMap` continuations.
    fn finish(self, algebra: &dyn KeywordAlgebra, fuse_map: bool, tail: Tail) -> Expr {
        let mut acc = tail;
        // Plain statements seen since the last bind, last first.
        let mut pending = Vec::new();
        for step in self.steps.into_iter().rev() {
            match step {
                Step::Plain(stmt) => pending.push(stmt),
                Step::Bind { pat, source } => {
                    let span = source.span;
                    let stats = std::mem::take(&mut pending);
                    acc = Tail::Lowered(match acc {
                        Tail::Value(value) if fuse_map => {
                            algebra.map(span, source, pat, prepend(stats, value))
                        }
                        other => {
                            let body = prepend(stats, other.lower(algebra));
                            algebra.flat_map(span, source, pat, body)
                        }
                    });
                }
            }
        }
        prepend(pending, acc.lower(algebra))
    }
}

fn prepend(mut reversed: Vec<Stmt>, result: Expr) -> Expr {
    if reversed.is_empty() {
        return result;
    }
    reversed.reverse();
    Expr::block(result.span, reversed, result)
}

pub struct Wrapper<'a> {
    algebra: &'a dyn KeywordAlgebra,
    fuse_map: bool,
    fresh: FreshNames,
}

impl<'a> Wrapper<'a> {
    pub fn new(algebra: &'a dyn KeywordAlgebra, config: &KwConfig) -> Self {
        Self {
            algebra,
            fuse_map: config.fuse_map,
            fresh: FreshNames {
                prefix: config.fresh_prefix.clone(),
                next: 0,
                taken: HashSet::new(),
            },
        }
    }

    /// Keep generated names clear of every name used in `expr`.
    pub fn reserve_names(&mut self, expr: &Expr) {
        collect_names(expr, &mut self.fresh.taken);
    }

    pub(crate) fn fresh_name(&mut self) -> String {
        self.fresh.next()
    }

    /// Lower `expr` into keyword-algebra calls.
    pub fn wrap(&mut self, expr: &Expr) -> Result<Expr> {
        if !is_transformable(expr) {
            return Ok(self.algebra.pure(expr.clone()));
        }
        let span = expr.span;
        match &expr.kind {
            ExprKind::Block { stats, result } => self.wrap_block(stats, result),
            ExprKind::Apply { callee, args } => self.wrap_apply(span, callee, args),
            ExprKind::If {
                cond,
                then_branch,
                else_branch,
            } => {
                let cond = self.wrap(cond)?;
                let then_branch = self.wrap(then_branch)?;
                let else_branch = self.wrap(else_branch)?;
                Ok(self
                    .algebra
                    .if_then_else(span, cond, then_branch, else_branch))
            }
            ExprKind::While { cond, body } => {
                let cond = self.wrap(cond)?;
                let body = self.wrap(body)?;
                Ok(self.algebra.while_do(span, cond, body))
            }
            ExprKind::DoWhile { body, cond } => {
                let body = self.wrap(body)?;
                let cond = self.wrap(cond)?;
                Ok(self.algebra.do_while(span, body, cond))
            }
            ExprKind::Match { scrutinee, arms } => {
                let scrutinee = self.wrap(scrutinee)?;
                let arms = self.wrap_arms(span, arms)?;
                Ok(self.algebra.match_case(span, scrutinee, arms))
            }
            ExprKind::Try {
                body,
                catches,
                finalizer,
            } => {
                let body = self.wrap(body)?;
                let arms = catches
                    .as_deref()
                    .map(|arms| self.wrap_arms(span, arms))
                    .transpose()?;
                let finalizer = finalizer.as_deref().map(|f| self.wrap(f)).transpose()?;
                Ok(match (arms, finalizer) {
                    (Some(arms), Some(finalizer)) => {
                        self.algebra.try_catch_finally(span, body, arms, finalizer)
                    }
                    (Some(arms), None) => self.algebra.try_catch(span, body, arms),
                    (None, Some(finalizer)) => self.algebra.try_finally(span, body, finalizer),
                    // `try b` without handlers is just `b`.
                    (None, None) => body,
                })
            }
            ExprKind::Lit { .. }
            | ExprKind::Ident { .. }
            | ExprKind::For { .. }
            | ExprKind::Lambda { .. }
            | ExprKind::Cases { .. }
            | ExprKind::Keyword { .. } => Ok(self.algebra.pure(expr.clone())),
        }
    }

    fn wrap_arms(&mut self, span: Span, arms: &[Arm]) -> Result<Vec<Arm>> {
        let algebra = self.algebra;
        wrap_case_list(algebra, span, arms, |body| self.wrap(body))
    }

    fn wrap_block(&mut self, stats: &[Stmt], result: &Expr) -> Result<Expr> {
        let mut chain = Chain::default();
        for stat in stats {
            match stat {
                Stmt::Generator { pat, source } => {
                    self.bind_source(&mut chain, pat.clone(), source)?
                }
                Stmt::ValueDef { pat, rhs } if is_transformable(rhs) => {
                    let lowered = self.wrap(rhs)?;
                    chain.bind(pat.clone(), lowered);
                }
                Stmt::Expr { expr } if is_transformable(expr) => {
                    let lowered = self.wrap(expr)?;
                    chain.bind(Pattern::Wildcard, lowered);
                }
                plain => chain.plain(plain.clone()),
            }
        }
        let tail = if is_transformable(result) {
            Tail::Lowered(self.wrap(result)?)
        } else {
            Tail::Value(result.clone())
        };
        Ok(chain.finish(self.algebra, self.fuse_map, tail))
    }

    /// `pat <- source`. A transformable source is lowered and bound to a
    /// fresh name first, so `pat` binds out of the value it produces.
    fn bind_source(&mut self, chain: &mut Chain, pat: Pattern, source: &Expr) -> Result<()> {
        if is_transformable(source) {
            let name = self.fresh_name();
            let lowered = self.wrap(source)?;
            chain.bind(Pattern::var(&name), lowered);
            chain.bind(pat, Expr::ident(source.span, name));
        } else {
            chain.bind(pat, source.clone());
        }
        Ok(())
    }

    /// Operands are evaluated left to right. Every transformable operand is
    /// bound to a fresh name; an effectful opaque operand ahead of the last
    /// transformable one is let-bound so it still runs before it.
    fn wrap_apply(&mut self, span: Span, callee: &Expr, args: &[Expr]) -> Result<Expr> {
        let operands: Vec<&Expr> = iter::once(callee).chain(args).collect();
        let last = operands.iter().rposition(|op| is_transformable(op));
        let mut chain = Chain::default();
        let mut atoms = Vec::with_capacity(operands.len());
        for (i, op) in operands.into_iter().enumerate() {
            let transformable = is_transformable(op);
            let hoist = !op.is_trivial() && last.is_some_and(|last| i < last);
            if !transformable && !hoist {
                atoms.push(op.clone());
                continue;
            }
            let name = self.fresh_name();
            if transformable {
                let lowered = self.wrap(op)?;
                chain.bind(Pattern::var(&name), lowered);
            } else {
                chain.plain(Stmt::ValueDef {
                    pat: Pattern::var(&name),
                    rhs: op.clone(),
                });
            }
            atoms.push(Expr::ident(op.span, name));
        }
        let mut atoms = atoms.into_iter();
        let callee = atoms.next().unwrap_or_else(|| callee.clone());
        let call = Expr::apply(span, callee, atoms.collect());
        Ok(chain.finish(self.algebra, self.fuse_map, Tail::Value(call)))
    }
}
