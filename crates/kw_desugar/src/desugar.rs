//! Top-level desugaring entry point.
//!
//! Takes a parsed module, checks its shape, and rewrites every
//! comprehension whose clauses contain binds nested in control flow.
//! Nested comprehensions are integrated innermost first; the wrapper never
//! looks inside a comprehension, so each source node is wrapped once.

use kw_ast::{Arm, Clause, Def, Expr, ExprKind, KwConfig, Module, Stmt};
use tracing::{debug, trace};

use crate::algebra::{algebra_for, KeywordAlgebra};
use crate::check::{check_module, site_error, Site};
use crate::error::Result;
use crate::wrap::Wrapper;

/// Desugar every definition in `module`.
///
/// Fails with the first shape error, in which case nothing is lowered.
pub fn desugar_module(module: &Module, config: &KwConfig) -> Result<Module> {
    debug!(defs = module.defs.len(), "desugaring module");
    if let Some(err) = check_module(module).into_iter().next() {
        return Err(err);
    }
    let algebra = algebra_for(&config.backend);
    let defs = module
        .defs
        .iter()
        .map(|def| desugar_def(def, algebra.as_ref(), config))
        .collect::<Result<Vec<_>>>()?;
    Ok(Module { defs })
}

/// Desugar one definition. Fresh names are numbered per definition and
/// never coincide with a name the definition already uses.
pub fn desugar_def(def: &Def, algebra: &dyn KeywordAlgebra, config: &KwConfig) -> Result<Def> {
    trace!(def = %def.name, "desugaring definition");
    let mut desugarer = Desugarer::new(algebra, config);
    desugarer.reserve_names(&def.body);
    Ok(Def {
        span: def.span,
        name: def.name.clone(),
        body: desugarer.root(&def.body, Site::Detached)?,
    })
}

/// Rewrites comprehensions wherever they occur in an expression tree.
pub struct Desugarer<'a> {
    wrapper: Wrapper<'a>,
}

impl<'a> Desugarer<'a> {
    pub fn new(algebra: &'a dyn KeywordAlgebra, config: &KwConfig) -> Self {
        Self {
            wrapper: Wrapper::new(algebra, config),
        }
    }

    /// See [`Wrapper::reserve_names`].
    pub fn reserve_names(&mut self, expr: &Expr) {
        self.wrapper.reserve_names(expr);
    }

    /// Rewrite an expression sitting at `site`.
    pub fn root(&mut self, expr: &Expr, site: Site) -> Result<Expr> {
        if let Some(err) = site_error(expr, site) {
            return Err(err);
        }
        self.rewrite(expr)
    }

    pub fn rewrite(&mut self, expr: &Expr) -> Result<Expr> {
        let kind = match &expr.kind {
            ExprKind::Lit { .. } | ExprKind::Ident { .. } => return Ok(expr.clone()),
            ExprKind::Apply { callee, args } => ExprKind::Apply {
                callee: self.boxed(callee)?,
                args: self.rewrite_all(args)?,
            },
            ExprKind::Block { stats, result } => ExprKind::Block {
                stats: stats
                    .iter()
                    .map(|stat| self.rewrite_stmt(stat))
                    .collect::<Result<_>>()?,
                result: self.boxed(result)?,
            },
            ExprKind::If {
                cond,
                then_branch,
                else_branch,
            } => ExprKind::If {
                cond: self.boxed(cond)?,
                then_branch: self.boxed(then_branch)?,
                else_branch: self.boxed(else_branch)?,
            },
            ExprKind::Match { scrutinee, arms } => ExprKind::Match {
                scrutinee: self.boxed(scrutinee)?,
                arms: self.rewrite_arms(arms, None)?,
            },
            ExprKind::While { cond, body } => ExprKind::While {
                cond: self.boxed(cond)?,
                body: self.boxed(body)?,
            },
            ExprKind::DoWhile { body, cond } => ExprKind::DoWhile {
                body: self.boxed(body)?,
                cond: self.boxed(cond)?,
            },
            ExprKind::Try {
                body,
                catches,
                finalizer,
            } => ExprKind::Try {
                body: self.boxed(body)?,
                catches: catches
                    .as_deref()
                    .map(|arms| self.rewrite_arms(arms, None))
                    .transpose()?,
                finalizer: finalizer.as_deref().map(|f| self.boxed(f)).transpose()?,
            },
            ExprKind::For {
                clauses,
                body,
                kind,
            } => {
                // Inner comprehensions first, then this one's clauses.
                let clauses = clauses
                    .iter()
                    .map(|clause| self.rewrite_clause(clause))
                    .collect::<Result<Vec<_>>>()?;
                let body = self.root(body, Site::ComprehensionBody)?;
                ExprKind::For {
                    clauses: self.wrapper.integrate_clauses(&clauses, &body)?,
                    body: Box::new(body),
                    kind: *kind,
                }
            }
            ExprKind::Lambda { param, body } => ExprKind::Lambda {
                param: param.clone(),
                body: Box::new(self.root(body, Site::Detached)?),
            },
            ExprKind::Cases { arms } => ExprKind::Cases {
                arms: self.rewrite_arms(arms, Some(Site::Detached))?,
            },
            ExprKind::Keyword { keyword, args } => ExprKind::Keyword {
                keyword: *keyword,
                args: args
                    .iter()
                    .map(|arg| self.root(arg, Site::Detached))
                    .collect::<Result<_>>()?,
            },
        };
        Ok(Expr::new(expr.span, kind))
    }

    fn boxed(&mut self, expr: &Expr) -> Result<Box<Expr>> {
        self.rewrite(expr).map(Box::new)
    }

    fn rewrite_all(&mut self, exprs: &[Expr]) -> Result<Vec<Expr>> {
        exprs.iter().map(|e| self.rewrite(e)).collect()
    }

    fn rewrite_stmt(&mut self, stat: &Stmt) -> Result<Stmt> {
        Ok(match stat {
            Stmt::Generator { pat, source } => Stmt::Generator {
                pat: pat.clone(),
                source: self.rewrite(source)?,
            },
            Stmt::ValueDef { pat, rhs } => Stmt::ValueDef {
                pat: pat.clone(),
                rhs: self.rewrite(rhs)?,
            },
            Stmt::Expr { expr } => Stmt::Expr {
                expr: self.rewrite(expr)?,
            },
        })
    }

    fn rewrite_clause(&mut self, clause: &Clause) -> Result<Clause> {
        Ok(match clause {
            Clause::Generator { pat, source } => Clause::Generator {
                pat: pat.clone(),
                source: self.root(source, Site::Clause)?,
            },
            Clause::ValueDef { pat, rhs } => Clause::ValueDef {
                pat: pat.clone(),
                rhs: self.root(rhs, Site::Clause)?,
            },
            Clause::Guard { cond } => Clause::Guard {
                cond: self.root(cond, Site::Clause)?,
            },
        })
    }

    /// Arms of a case literal are roots of their own; match and catch arms
    /// belong to the enclosing expression.
    fn rewrite_arms(&mut self, arms: &[Arm], site: Option<Site>) -> Result<Vec<Arm>> {
        arms.iter()
            .map(|arm| -> Result<Arm> {
                let mut go = |e: &Expr| match site {
                    Some(site) => self.root(e, site),
                    None => self.rewrite(e),
                };
                Ok(Arm {
                    pat: arm.pat.clone(),
                    guard: arm.guard.as_ref().map(&mut go).transpose()?,
                    body: go(&arm.body)?,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DesugarError;
    use kw_ast::build::*;
    use kw_ast::{Backend, ForKind, DUMMY_SP};
    use pretty_assertions::assert_eq;

    fn module(bodies: Vec<Expr>) -> Module {
        Module {
            defs: bodies
                .into_iter()
                .enumerate()
                .map(|(i, body)| Def {
                    span: DUMMY_SP,
                    name: format!("d{i}"),
                    body,
                })
                .collect(),
        }
    }

    fn bind_block(src: &str) -> Expr {
        block(vec![bind(var("a"), ident(src))], ident("a"))
    }

    fn desugar(body: Expr) -> Result<String> {
        let out = desugar_module(&module(vec![body]), &KwConfig::default())?;
        Ok(out.defs[0].body.to_string())
    }

    #[test]
    fn alias_scenario() {
        let rhs = block(
            vec![bind(var("b"), ident("a")), bind(var("c"), ident("b"))],
            call("f", vec![ident("c")]),
        );
        let body = for_yield(vec![val_clause(var("x"), rhs)], ident("x"));
        assert_eq!(
            desugar(body).unwrap(),
            "for { $kw0 <- flatMap(a, b => flatMap(b, c => pure(f(c)))); x = $kw0 } yield x"
        );
    }

    #[test]
    fn comprehension_without_binds_in_clauses_is_unchanged() {
        let body = comprehension(
            vec![
                gen_clause(var("a"), ident("as")),
                guard(call("p", vec![ident("a")])),
            ],
            call("print", vec![ident("a")]),
            ForKind::Do,
        );
        assert_eq!(desugar(body.clone()).unwrap(), body.to_string());
    }

    #[test]
    fn inner_comprehension_is_integrated_once() {
        // The inner comprehension sits inside an opaque part of the outer
        // clause; it is lowered by its own integration, then carried by `pure`.
        let inner = for_yield(vec![val_clause(var("y"), bind_block("n"))], ident("y"));
        let outer_rhs = block(vec![bind(var("z"), ident("m"))], inner);
        let body = for_yield(vec![val_clause(var("x"), outer_rhs)], ident("x"));
        assert_eq!(
            desugar(body).unwrap(),
            "for { $kw1 <- flatMap(m, z => pure(for { $kw0 <- flatMap(n, a => pure(a)); y = $kw0 } yield y)); \
             x = $kw1 } yield x"
        );
    }

    #[test]
    fn comprehension_inside_lambda_inside_clause() {
        let inner = for_yield(vec![val_clause(var("y"), bind_block("n"))], ident("y"));
        let body = for_yield(
            vec![gen_clause(
                var("x"),
                call("run", vec![lambda(wildcard(), inner)]),
            )],
            ident("x"),
        );
        assert_eq!(
            desugar(body).unwrap(),
            "for { x <- run(_ => for { $kw0 <- flatMap(n, a => pure(a)); y = $kw0 } yield y) } yield x"
        );
    }

    #[test]
    fn orphan_aborts_whole_module() {
        let good = for_yield(vec![val_clause(var("x"), bind_block("m"))], ident("x"));
        let m = module(vec![good, bind_block("m")]);
        let err = desugar_module(&m, &KwConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            DesugarError::OrphanTransformableExpression { .. }
        ));
    }

    #[test]
    fn desugarer_reports_site_errors_directly() {
        let mut d = Desugarer::new(&crate::algebra::KeywordCalls, &KwConfig::default());
        assert!(matches!(
            d.root(&bind_block("m"), Site::Detached),
            Err(DesugarError::OrphanTransformableExpression { .. })
        ));
        assert!(matches!(
            d.root(&bind_block("m"), Site::ComprehensionBody),
            Err(DesugarError::UnsupportedEnclosingTransform { .. })
        ));
        assert!(d.root(&bind_block("m"), Site::Clause).is_ok());
    }

    #[test]
    fn fresh_names_restart_per_definition() {
        let body = || for_yield(vec![val_clause(var("x"), bind_block("m"))], ident("x"));
        let out = desugar_module(&module(vec![body(), body()]), &KwConfig::default()).unwrap();
        assert_eq!(out.defs[0].body, out.defs[1].body);
    }

    #[test]
    fn fresh_names_avoid_user_identifiers() {
        let config = KwConfig {
            fresh_prefix: "tmp_".into(),
            ..KwConfig::default()
        };
        let body = for_yield(
            vec![
                val_clause(var("x"), bind_block("m")),
                val_clause(
                    var("y"),
                    block(vec![bind(var("a"), ident("n"))], ident("tmp_0")),
                ),
            ],
            ident("y"),
        );
        let out = desugar_module(&module(vec![body]), &config).unwrap();
        assert_eq!(
            out.defs[0].body.to_string(),
            "for { tmp_1 <- flatMap(m, a => pure(a)); x = tmp_1; \
             tmp_2 <- flatMap(n, a => pure(tmp_0)); y = tmp_2 } yield y"
        );
    }

    #[test]
    fn fresh_names_avoid_user_binders() {
        let body = for_yield(
            vec![
                gen_clause(var("$kw0"), ident("xs")),
                val_clause(var("x"), bind_block("m")),
            ],
            ident("$kw0"),
        );
        assert_eq!(
            desugar(body).unwrap(),
            "for { $kw0 <- xs; $kw1 <- flatMap(m, a => pure(a)); x = $kw1 } yield $kw0"
        );
    }

    #[test]
    fn desugaring_is_idempotent() {
        let body = for_yield(
            vec![
                gen_clause(var("a"), if_else(ident("c"), bind_block("m"), ident("n"))),
                guard(match_on(
                    ident("a"),
                    vec![arm(pat_lit(0), bind_block("k")), arm(wildcard(), lit(false))],
                )),
            ],
            ident("a"),
        );
        let once = desugar_module(&module(vec![body]), &KwConfig::default()).unwrap();
        let twice = desugar_module(&once, &KwConfig::default()).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn method_backend_from_config() {
        let config = KwConfig {
            backend: Backend::Method {
                receiver: "Task".into(),
            },
            ..KwConfig::default()
        };
        let body = for_yield(vec![val_clause(var("x"), bind_block("m"))], ident("x"));
        let out = desugar_module(&module(vec![body]), &config).unwrap();
        assert_eq!(
            out.defs[0].body.to_string(),
            "for { $kw0 <- Task.flatMap(m, a => Task.pure(a)); x = $kw0 } yield x"
        );
    }
}
