//! The keyword algebra the wrapper emits calls against.
//!
//! Every operation is provided in terms of [`KeywordAlgebra::call`], so an
//! emitter only decides how one invocation is spelled. What the operations
//! do at runtime is up to whatever consumes the emitted tree.

use kw_ast::{Arm, Backend, Expr, ExprKind, Keyword, Pattern};
use swc_common::Span;
use tracing::trace;

pub trait KeywordAlgebra {
    /// Build an invocation of `keyword` with the given arguments.
    fn call(&self, span: Span, keyword: Keyword, args: Vec<Expr>) -> Expr;

    fn pure(&self, value: Expr) -> Expr {
        self.call(value.span, Keyword::Pure, vec![value])
    }

    /// `flatMap(source, param => body)`
    fn flat_map(&self, span: Span, source: Expr, param: Pattern, body: Expr) -> Expr {
        let k = Expr::lambda(body.span, param, body);
        self.call(span, Keyword::FlatMap, vec![source, k])
    }

    /// `map(source, param => body)`
    fn map(&self, span: Span, source: Expr, param: Pattern, body: Expr) -> Expr {
        let k = Expr::lambda(body.span, param, body);
        self.call(span, Keyword::Map, vec![source, k])
    }

    fn if_then_else(&self, span: Span, cond: Expr, then_branch: Expr, else_branch: Expr) -> Expr {
        self.call(span, Keyword::IfThenElse, vec![cond, then_branch, else_branch])
    }

    fn while_do(&self, span: Span, cond: Expr, body: Expr) -> Expr {
        self.call(span, Keyword::WhileDo, vec![cond, body])
    }

    fn do_while(&self, span: Span, body: Expr, cond: Expr) -> Expr {
        self.call(span, Keyword::DoWhile, vec![body, cond])
    }

    fn match_case(&self, span: Span, scrutinee: Expr, arms: Vec<Arm>) -> Expr {
        self.call(span, Keyword::MatchCase, vec![scrutinee, Expr::cases(span, arms)])
    }

    fn try_catch(&self, span: Span, body: Expr, arms: Vec<Arm>) -> Expr {
        self.call(span, Keyword::TryCatch, vec![body, Expr::cases(span, arms)])
    }

    fn try_finally(&self, span: Span, body: Expr, finalizer: Expr) -> Expr {
        self.call(span, Keyword::TryFinally, vec![body, finalizer])
    }

    fn try_catch_finally(&self, span: Span, body: Expr, arms: Vec<Arm>, finalizer: Expr) -> Expr {
        self.call(
            span,
            Keyword::TryCatchFinally,
            vec![body, Expr::cases(span, arms), finalizer],
        )
    }

    fn left(&self, value: Expr) -> Expr {
        self.call(value.span, Keyword::Left, vec![value])
    }

    fn right(&self, value: Expr) -> Expr {
        self.call(value.span, Keyword::Right, vec![value])
    }
}

/// Emits `Keyword` nodes: `flatMap(m, a => pure(a))`.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordCalls;

impl KeywordAlgebra for KeywordCalls {
    fn call(&self, span: Span, keyword: Keyword, args: Vec<Expr>) -> Expr {
        trace!(%keyword, args = args.len(), "emit keyword call");
        Expr::keyword(span, keyword, args)
    }
}

/// Emits applications of methods on a named algebra instance:
/// `Async.flatMap(m, a => Async.pure(a))`.
#[derive(Debug, Clone)]
pub struct MethodCalls {
    receiver: String,
}

impl MethodCalls {
    pub fn new(receiver: impl Into<String>) -> Self {
        Self {
            receiver: receiver.into(),
        }
    }
}

impl KeywordAlgebra for MethodCalls {
    fn call(&self, span: Span, keyword: Keyword, args: Vec<Expr>) -> Expr {
        trace!(receiver = %self.receiver, %keyword, "emit method call");
        let callee = Expr::ident(span, format!("{}.{}", self.receiver, keyword));
        Expr::new(
            span,
            ExprKind::Apply {
                callee: Box::new(callee),
                args,
            },
        )
    }
}

/// The emitter selected by a configured [`Backend`].
pub fn algebra_for(backend: &Backend) -> Box<dyn KeywordAlgebra> {
    match backend {
        Backend::Keyword => Box::new(KeywordCalls),
        Backend::Method { receiver } => Box::new(MethodCalls::new(receiver.clone())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kw_ast::build::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn keyword_calls_emit_keyword_nodes() {
        let a = KeywordCalls;
        let e = a.flat_map(
            ident("m").span,
            ident("m"),
            var("x"),
            a.pure(call("f", vec![ident("x")])),
        );
        assert_eq!(e.to_string(), "flatMap(m, x => pure(f(x)))");
        assert!(matches!(
            e.kind,
            ExprKind::Keyword {
                keyword: Keyword::FlatMap,
                ..
            }
        ));
    }

    #[test]
    fn method_calls_use_receiver() {
        let a = MethodCalls::new("Async");
        let e = a.if_then_else(
            ident("c").span,
            a.pure(ident("c")),
            a.left(lit(1)),
            a.right(lit(2)),
        );
        assert_eq!(
            e.to_string(),
            "Async.ifThenElse(Async.pure(c), Async.left(1), Async.right(2))"
        );
    }

    #[test]
    fn backend_selects_emitter() {
        let a = algebra_for(&Backend::Method {
            receiver: "Io".into(),
        });
        assert_eq!(a.pure(lit(1)).to_string(), "Io.pure(1)");
        let a = algebra_for(&Backend::Keyword);
        assert_eq!(a.pure(lit(1)).to_string(), "pure(1)");
    }

    #[test]
    fn try_variants_wrap_arms_in_case_literal() {
        let a = KeywordCalls;
        let span = ident("b").span;
        let e = a.try_catch_finally(
            span,
            ident("b"),
            vec![arm(wildcard(), lit(0))],
            ident("f"),
        );
        assert_eq!(e.to_string(), "tryCatchFinally(b, { case _ => 0 }, f)");
        let e = a.try_finally(span, ident("b"), ident("f"));
        assert_eq!(e.to_string(), "tryFinally(b, f)");
    }
}
