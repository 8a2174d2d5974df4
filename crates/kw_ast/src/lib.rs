//! Expression AST for kwsugar.
//!
//! Models the expressions an external parser hands to the desugaring pass:
//! - Comprehensions (`for { p <- e; x = e; if c } yield body`)
//! - Blocks whose statements may be binds (`{ a <- m; f(a) }`)
//! - Control flow (`if`, `match`, `while`, `do/while`, `try/catch/finally`)
//!
//! plus the output vocabulary of the pass: keyword-algebra calls, lambdas
//! carrying bind continuations, and case-function literals carrying arms.
//!
//! Every node derives serde so ASTs can be exchanged as JSON; spans are
//! optional in the JSON form and default to `DUMMY_SP`.

pub mod build;
pub mod print;

use serde::{Deserialize, Serialize};
pub use swc_common::{BytePos, Span, DUMMY_SP};

/// A compilation unit: an ordered list of top-level definitions.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Module {
    pub defs: Vec<Def>,
}

/// A named top-level definition, `def name = body`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Def {
    #[serde(default)]
    pub span: Span,
    pub name: String,
    pub body: Expr,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expr {
    #[serde(default)]
    pub span: Span,
    #[serde(flatten)]
    pub kind: ExprKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ExprKind {
    Lit {
        value: Lit,
    },
    Ident {
        name: String,
    },
    Apply {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
    /// `{ stats; result }`. Statements may be binds.
    Block {
        stats: Vec<Stmt>,
        result: Box<Expr>,
    },
    If {
        cond: Box<Expr>,
        then_branch: Box<Expr>,
        else_branch: Box<Expr>,
    },
    Match {
        scrutinee: Box<Expr>,
        arms: Vec<Arm>,
    },
    While {
        cond: Box<Expr>,
        body: Box<Expr>,
    },
    DoWhile {
        body: Box<Expr>,
        cond: Box<Expr>,
    },
    /// `try body catch { arms } finally finalizer`; either handler part may be absent.
    Try {
        body: Box<Expr>,
        #[serde(default)]
        catches: Option<Vec<Arm>>,
        #[serde(default)]
        finalizer: Option<Box<Expr>>,
    },
    /// A comprehension, `for { clauses } yield body` or `for { clauses } do body`.
    For {
        clauses: Vec<Clause>,
        body: Box<Expr>,
        #[serde(default)]
        kind: ForKind,
    },
    Lambda {
        param: Pattern,
        body: Box<Expr>,
    },
    /// A pattern-matching function literal, `{ case p => e; ... }`.
    Cases {
        arms: Vec<Arm>,
    },
    /// An invocation of one keyword-algebra operation. Produced by desugaring.
    Keyword {
        keyword: Keyword,
        args: Vec<Expr>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ForKind {
    #[default]
    Yield,
    Do,
}

/// Literal values. Untagged in JSON: `null`, `true`, `42`, `"text"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Lit {
    Unit,
    Bool(bool),
    Int(i64),
    Str(String),
}

/// A block statement (enumerator).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Stmt {
    /// `pat <- source`
    Generator { pat: Pattern, source: Expr },
    /// `pat = rhs`
    ValueDef { pat: Pattern, rhs: Expr },
    Expr { expr: Expr },
}

/// A top-level clause of a comprehension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Clause {
    Generator { pat: Pattern, source: Expr },
    ValueDef { pat: Pattern, rhs: Expr },
    Guard { cond: Expr },
}

/// One branch of a match or catch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Arm {
    pub pat: Pattern,
    #[serde(default)]
    pub guard: Option<Expr>,
    pub body: Expr,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Pattern {
    Wildcard,
    Var {
        name: String,
    },
    Lit {
        value: Lit,
    },
    Tuple {
        elems: Vec<Pattern>,
    },
    Ctor {
        name: String,
        #[serde(default)]
        args: Vec<Pattern>,
    },
}

impl Pattern {
    pub fn var(name: impl Into<String>) -> Self {
        Pattern::Var { name: name.into() }
    }

    /// Variable names bound by this pattern, left to right, duplicates included.
    pub fn binders(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_binders(&mut out);
        out
    }

    fn collect_binders<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Pattern::Wildcard | Pattern::Lit { .. } => {}
            Pattern::Var { name } => out.push(name),
            Pattern::Tuple { elems: pats } | Pattern::Ctor { args: pats, .. } => {
                for pat in pats {
                    pat.collect_binders(out);
                }
            }
        }
    }
}

/// Operations of the keyword algebra that desugared code is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Keyword {
    Pure,
    FlatMap,
    Map,
    IfThenElse,
    WhileDo,
    DoWhile,
    MatchCase,
    TryCatch,
    TryFinally,
    TryCatchFinally,
    Left,
    Right,
}

impl Keyword {
    pub const ALL: [Keyword; 12] = [
        Keyword::Pure,
        Keyword::FlatMap,
        Keyword::Map,
        Keyword::IfThenElse,
        Keyword::WhileDo,
        Keyword::DoWhile,
        Keyword::MatchCase,
        Keyword::TryCatch,
        Keyword::TryFinally,
        Keyword::TryCatchFinally,
        Keyword::Left,
        Keyword::Right,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Keyword::Pure => "pure",
            Keyword::FlatMap => "flatMap",
            Keyword::Map => "map",
            Keyword::IfThenElse => "ifThenElse",
            Keyword::WhileDo => "whileDo",
            Keyword::DoWhile => "doWhile",
            Keyword::MatchCase => "matchCase",
            Keyword::TryCatch => "tryCatch",
            Keyword::TryFinally => "tryFinally",
            Keyword::TryCatchFinally => "tryCatchFinally",
            Keyword::Left => "left",
            Keyword::Right => "right",
        }
    }
}

impl std::fmt::Display for Keyword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Expr {
    pub fn new(span: Span, kind: ExprKind) -> Self {
        Self { span, kind }
    }

    pub fn ident(span: Span, name: impl Into<String>) -> Self {
        Self::new(span, ExprKind::Ident { name: name.into() })
    }

    pub fn apply(span: Span, callee: Expr, args: Vec<Expr>) -> Self {
        Self::new(
            span,
            ExprKind::Apply {
                callee: Box::new(callee),
                args,
            },
        )
    }

    pub fn block(span: Span, stats: Vec<Stmt>, result: Expr) -> Self {
        Self::new(
            span,
            ExprKind::Block {
                stats,
                result: Box::new(result),
            },
        )
    }

    pub fn lambda(span: Span, param: Pattern, body: Expr) -> Self {
        Self::new(
            span,
            ExprKind::Lambda {
                param,
                body: Box::new(body),
            },
        )
    }

    pub fn cases(span: Span, arms: Vec<Arm>) -> Self {
        Self::new(span, ExprKind::Cases { arms })
    }

    pub fn keyword(span: Span, keyword: Keyword, args: Vec<Expr>) -> Self {
        Self::new(span, ExprKind::Keyword { keyword, args })
    }

    /// Literals and identifiers: evaluating them has no effect.
    pub fn is_trivial(&self) -> bool {
        matches!(self.kind, ExprKind::Lit { .. } | ExprKind::Ident { .. })
    }
}

/// Which emitter the desugaring pass lowers keyword calls through.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Backend {
    /// Emit `Keyword` nodes, e.g. `flatMap(m, x => pure(x))`.
    #[default]
    Keyword,
    /// Emit method applications on a receiver, e.g. `Async.flatMap(m, x => Async.pure(x))`.
    Method { receiver: String },
}

/// Options controlling the shape of desugared output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KwConfig {
    /// Emit `map(src, p => r)` instead of `flatMap(src, p => pure(r))` at the end of a chain.
    pub fuse_map: bool,
    /// Prefix of compiler-generated binder names.
    pub fresh_prefix: String,
    pub backend: Backend,
}

impl Default for KwConfig {
    fn default() -> Self {
        Self {
            fuse_map: false,
            fresh_prefix: "$kw".to_string(),
            backend: Backend::Keyword,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn config_default_keeps_flatmap_shape() {
        let c = KwConfig::default();
        assert!(!c.fuse_map);
        assert_eq!(c.fresh_prefix, "$kw");
        assert_eq!(c.backend, Backend::Keyword);
    }

    #[test]
    fn config_fills_missing_fields() {
        let c: KwConfig = serde_json::from_str(r#"{"fuse_map": true}"#).unwrap();
        assert!(c.fuse_map);
        assert_eq!(c.fresh_prefix, "$kw");

        let c: KwConfig =
            serde_json::from_str(r#"{"backend": {"kind": "method", "receiver": "Async"}}"#)
                .unwrap();
        assert_eq!(
            c.backend,
            Backend::Method {
                receiver: "Async".into()
            }
        );
    }

    #[test]
    fn keyword_names_match_serde_names() {
        for kw in Keyword::ALL {
            let json = serde_json::to_string(&kw).unwrap();
            assert_eq!(json, format!("\"{}\"", kw.as_str()));
        }
    }

    #[test]
    fn binders_are_collected_left_to_right() {
        let pat = Pattern::Ctor {
            name: "Pair".into(),
            args: vec![
                Pattern::var("a"),
                Pattern::Tuple {
                    elems: vec![Pattern::Wildcard, Pattern::var("b"), Pattern::var("a")],
                },
            ],
        };
        assert_eq!(pat.binders(), vec!["a", "b", "a"]);
    }

    #[test]
    fn parses_json_without_spans() {
        let json = r#"{
            "type": "Block",
            "stats": [
                {"type": "Generator", "pat": {"type": "Var", "name": "a"},
                 "source": {"type": "Ident", "name": "m"}}
            ],
            "result": {"type": "Apply",
                       "callee": {"type": "Ident", "name": "f"},
                       "args": [{"type": "Lit", "value": 1}, {"type": "Lit", "value": null}]}
        }"#;
        let expr: Expr = serde_json::from_str(json).unwrap();
        assert_eq!(expr.span, DUMMY_SP);
        assert_eq!(expr.to_string(), "{ a <- m; f(1, ()) }");
    }
}
