//! Source-like rendering of the AST.
//!
//! Used for golden files and diagnostics, not as a round-trippable syntax:
//! `for { a <- m; x = f(a) } yield x`, `flatMap(m, a => pure(a))`,
//! `s match { case Some(x) if p(x) => x; case _ => 0 }`.

use std::fmt::{self, Display, Formatter, Write};

use crate::{Arm, Clause, Def, Expr, ExprKind, ForKind, Lit, Module, Pattern, Stmt};

fn comma_sep<T: Display>(f: &mut Formatter<'_>, items: &[T]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

fn arm_list(f: &mut Formatter<'_>, arms: &[Arm]) -> fmt::Result {
    f.write_char('{')?;
    for (i, arm) in arms.iter().enumerate() {
        f.write_str(if i == 0 { " " } else { "; " })?;
        write!(f, "{arm}")?;
    }
    f.write_str(" }")
}

impl Display for Module {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for def in &self.defs {
            writeln!(f, "{def}")?;
        }
        Ok(())
    }
}

impl Display for Def {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "def {} = {}", self.name, self.body)
    }
}

impl Display for Expr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ExprKind::Lit { value } => write!(f, "{value}"),
            ExprKind::Ident { name } => f.write_str(name),
            ExprKind::Apply { callee, args } => {
                // Anything that is not already a name or a call needs grouping.
                if matches!(
                    callee.kind,
                    ExprKind::Ident { .. } | ExprKind::Apply { .. } | ExprKind::Keyword { .. }
                ) {
                    write!(f, "{callee}(")?;
                } else {
                    write!(f, "({callee})(")?;
                }
                comma_sep(f, args)?;
                f.write_char(')')
            }
            ExprKind::Block { stats, result } => {
                f.write_str("{ ")?;
                for stat in stats {
                    write!(f, "{stat}; ")?;
                }
                write!(f, "{result} }}")
            }
            ExprKind::If {
                cond,
                then_branch,
                else_branch,
            } => write!(f, "if ({cond}) {then_branch} else {else_branch}"),
            ExprKind::Match { scrutinee, arms } => {
                write!(f, "{scrutinee} match ")?;
                arm_list(f, arms)
            }
            ExprKind::While { cond, body } => write!(f, "while ({cond}) {body}"),
            ExprKind::DoWhile { body, cond } => write!(f, "do {body} while ({cond})"),
            ExprKind::Try {
                body,
                catches,
                finalizer,
            } => {
                write!(f, "try {body}")?;
                if let Some(arms) = catches {
                    f.write_str(" catch ")?;
                    arm_list(f, arms)?;
                }
                if let Some(finalizer) = finalizer {
                    write!(f, " finally {finalizer}")?;
                }
                Ok(())
            }
            ExprKind::For {
                clauses,
                body,
                kind,
            } => {
                f.write_str("for { ")?;
                for (i, clause) in clauses.iter().enumerate() {
                    if i > 0 {
                        f.write_str("; ")?;
                    }
                    write!(f, "{clause}")?;
                }
                let kw = match kind {
                    ForKind::Yield => "yield",
                    ForKind::Do => "do",
                };
                write!(f, " }} {kw} {body}")
            }
            ExprKind::Lambda { param, body } => write!(f, "{param} => {body}"),
            ExprKind::Cases { arms } => arm_list(f, arms),
            ExprKind::Keyword { keyword, args } => {
                write!(f, "{keyword}(")?;
                comma_sep(f, args)?;
                f.write_char(')')
            }
        }
    }
}

impl Display for Stmt {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Stmt::Generator { pat, source } => write!(f, "{pat} <- {source}"),
            Stmt::ValueDef { pat, rhs } => write!(f, "{pat} = {rhs}"),
            Stmt::Expr { expr } => write!(f, "{expr}"),
        }
    }
}

impl Display for Clause {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Clause::Generator { pat, source } => write!(f, "{pat} <- {source}"),
            Clause::ValueDef { pat, rhs } => write!(f, "{pat} = {rhs}"),
            Clause::Guard { cond } => write!(f, "if {cond}"),
        }
    }
}

impl Display for Arm {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "case {}", self.pat)?;
        if let Some(guard) = &self.guard {
            write!(f, " if {guard}")?;
        }
        write!(f, " => {}", self.body)
    }
}

impl Display for Pattern {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Pattern::Wildcard => f.write_char('_'),
            Pattern::Var { name } => f.write_str(name),
            Pattern::Lit { value } => write!(f, "{value}"),
            Pattern::Tuple { elems } => {
                f.write_char('(')?;
                comma_sep(f, elems)?;
                f.write_char(')')
            }
            Pattern::Ctor { name, args } => {
                f.write_str(name)?;
                if !args.is_empty() {
                    f.write_char('(')?;
                    comma_sep(f, args)?;
                    f.write_char(')')?;
                }
                Ok(())
            }
        }
    }
}

impl Display for Lit {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Lit::Unit => f.write_str("()"),
            Lit::Bool(b) => write!(f, "{b}"),
            Lit::Int(n) => write!(f, "{n}"),
            Lit::Str(s) => write!(f, "{s:?}"),
        }
    }
}
