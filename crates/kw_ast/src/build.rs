//! Span-less constructors for building ASTs by hand (tests, tooling).

use crate::{Arm, Clause, Expr, ExprKind, ForKind, Keyword, Lit, Pattern, Stmt, DUMMY_SP};

impl From<i64> for Lit {
    fn from(n: i64) -> Self {
        Lit::Int(n)
    }
}

impl From<i32> for Lit {
    fn from(n: i32) -> Self {
        Lit::Int(n.into())
    }
}

impl From<bool> for Lit {
    fn from(b: bool) -> Self {
        Lit::Bool(b)
    }
}

impl From<&str> for Lit {
    fn from(s: &str) -> Self {
        Lit::Str(s.to_string())
    }
}

impl From<String> for Lit {
    fn from(s: String) -> Self {
        Lit::Str(s)
    }
}

impl From<()> for Lit {
    fn from(_: ()) -> Self {
        Lit::Unit
    }
}

fn expr(kind: ExprKind) -> Expr {
    Expr::new(DUMMY_SP, kind)
}

pub fn lit(value: impl Into<Lit>) -> Expr {
    expr(ExprKind::Lit {
        value: value.into(),
    })
}

pub fn ident(name: &str) -> Expr {
    Expr::ident(DUMMY_SP, name)
}

pub fn apply(callee: Expr, args: Vec<Expr>) -> Expr {
    Expr::apply(DUMMY_SP, callee, args)
}

/// `name(args)`
pub fn call(name: &str, args: Vec<Expr>) -> Expr {
    apply(ident(name), args)
}

pub fn block(stats: Vec<Stmt>, result: Expr) -> Expr {
    Expr::block(DUMMY_SP, stats, result)
}

/// Block statement `pat <- source`.
pub fn bind(pat: Pattern, source: Expr) -> Stmt {
    Stmt::Generator { pat, source }
}

/// Block statement `pat = rhs`.
pub fn let_(pat: Pattern, rhs: Expr) -> Stmt {
    Stmt::ValueDef { pat, rhs }
}

pub fn stmt(expr: Expr) -> Stmt {
    Stmt::Expr { expr }
}

pub fn if_else(cond: Expr, then_branch: Expr, else_branch: Expr) -> Expr {
    expr(ExprKind::If {
        cond: Box::new(cond),
        then_branch: Box::new(then_branch),
        else_branch: Box::new(else_branch),
    })
}

pub fn match_on(scrutinee: Expr, arms: Vec<Arm>) -> Expr {
    expr(ExprKind::Match {
        scrutinee: Box::new(scrutinee),
        arms,
    })
}

pub fn while_do(cond: Expr, body: Expr) -> Expr {
    expr(ExprKind::While {
        cond: Box::new(cond),
        body: Box::new(body),
    })
}

pub fn do_while(body: Expr, cond: Expr) -> Expr {
    expr(ExprKind::DoWhile {
        body: Box::new(body),
        cond: Box::new(cond),
    })
}

pub fn try_catch_finally(body: Expr, catches: Option<Vec<Arm>>, finalizer: Option<Expr>) -> Expr {
    expr(ExprKind::Try {
        body: Box::new(body),
        catches,
        finalizer: finalizer.map(Box::new),
    })
}

pub fn comprehension(clauses: Vec<Clause>, body: Expr, kind: ForKind) -> Expr {
    expr(ExprKind::For {
        clauses,
        body: Box::new(body),
        kind,
    })
}

pub fn for_yield(clauses: Vec<Clause>, body: Expr) -> Expr {
    comprehension(clauses, body, ForKind::Yield)
}

pub fn gen_clause(pat: Pattern, source: Expr) -> Clause {
    Clause::Generator { pat, source }
}

pub fn val_clause(pat: Pattern, rhs: Expr) -> Clause {
    Clause::ValueDef { pat, rhs }
}

pub fn guard(cond: Expr) -> Clause {
    Clause::Guard { cond }
}

pub fn lambda(param: Pattern, body: Expr) -> Expr {
    Expr::lambda(DUMMY_SP, param, body)
}

pub fn cases(arms: Vec<Arm>) -> Expr {
    Expr::cases(DUMMY_SP, arms)
}

pub fn kw(keyword: Keyword, args: Vec<Expr>) -> Expr {
    Expr::keyword(DUMMY_SP, keyword, args)
}

pub fn arm(pat: Pattern, body: Expr) -> Arm {
    Arm {
        pat,
        guard: None,
        body,
    }
}

pub fn arm_if(pat: Pattern, guard: Expr, body: Expr) -> Arm {
    Arm {
        pat,
        guard: Some(guard),
        body,
    }
}

pub fn var(name: &str) -> Pattern {
    Pattern::var(name)
}

pub fn wildcard() -> Pattern {
    Pattern::Wildcard
}

pub fn tuple(elems: Vec<Pattern>) -> Pattern {
    Pattern::Tuple { elems }
}

pub fn ctor(name: &str, args: Vec<Pattern>) -> Pattern {
    Pattern::Ctor {
        name: name.to_string(),
        args,
    }
}

pub fn pat_lit(value: impl Into<Lit>) -> Pattern {
    Pattern::Lit {
        value: value.into(),
    }
}
