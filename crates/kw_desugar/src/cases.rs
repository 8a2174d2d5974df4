//! Case-list rewriting for `match` and `catch` arms.
//!
//! Arm `i` keeps its pattern and guard; its body becomes
//! `right(...right(left(wrap(body)))...)` with exactly `i` `right`s, so the
//! arms' differently shaped results unify into one nested coproduct and the
//! consumer can tell which arm ran from the nesting depth.

use std::collections::HashSet;

use kw_ast::{Arm, Expr};
use swc_common::Span;

use crate::algebra::KeywordAlgebra;
use crate::classify::is_transformable;
use crate::error::{CaseListDefect, DesugarError, Result};

/// Tag `value` as the result of arm `index`.
pub fn inject(algebra: &dyn KeywordAlgebra, index: usize, value: Expr) -> Expr {
    let mut tagged = algebra.left(value);
    for _ in 0..index {
        tagged = algebra.right(tagged);
    }
    tagged
}

/// Reject arm lists that cannot be tagged positionally.
///
/// `span` is the location of the enclosing `match` or `try`.
pub fn validate_case_list(span: Span, arms: &[Arm]) -> Result<()> {
    let malformed = |defect| DesugarError::MalformedCaseList { span, defect };
    if arms.is_empty() {
        return Err(malformed(CaseListDefect::Empty));
    }
    for (i, arm) in arms.iter().enumerate() {
        if arm.guard.as_ref().is_some_and(is_transformable) {
            return Err(malformed(CaseListDefect::TransformableGuard { arm: i }));
        }
        let mut seen = HashSet::new();
        for name in arm.pat.binders() {
            if !seen.insert(name) {
                return Err(malformed(CaseListDefect::DuplicateBinder {
                    arm: i,
                    name: name.to_string(),
                }));
            }
        }
    }
    Ok(())
}

/// Rewrite every arm body to `inject(i, wrap(body))`, preserving arm order,
/// patterns and guards. Bodies are wrapped first to last.
pub fn wrap_case_list<F>(
    algebra: &dyn KeywordAlgebra,
    span: Span,
    arms: &[Arm],
    mut wrap: F,
) -> Result<Vec<Arm>>
where
    F: FnMut(&Expr) -> Result<Expr>,
{
    validate_case_list(span, arms)?;
    arms.iter()
        .enumerate()
        .map(|(i, arm)| {
            Ok(Arm {
                pat: arm.pat.clone(),
                guard: arm.guard.clone(),
                body: inject(algebra, i, wrap(&arm.body)?),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algebra::KeywordCalls;
    use kw_ast::build::*;
    use pretty_assertions::assert_eq;
    use swc_common::DUMMY_SP;

    fn pure_wrap(e: &Expr) -> Result<Expr> {
        Ok(KeywordCalls.pure(e.clone()))
    }

    #[test]
    fn arm_index_is_right_nesting_depth() {
        let arms = vec![
            arm(pat_lit(0), ident("b0")),
            arm(pat_lit(1), ident("b1")),
            arm(wildcard(), ident("b2")),
        ];
        let out = wrap_case_list(&KeywordCalls, DUMMY_SP, &arms, pure_wrap).unwrap();
        let bodies: Vec<String> = out.iter().map(|a| a.body.to_string()).collect();
        assert_eq!(
            bodies,
            vec![
                "left(pure(b0))",
                "right(left(pure(b1)))",
                "right(right(left(pure(b2))))",
            ]
        );
    }

    #[test]
    fn patterns_and_guards_are_untouched() {
        let arms = vec![
            arm_if(ctor("Some", vec![var("x")]), call("p", vec![ident("x")]), ident("x")),
            arm(ctor("None", vec![]), lit(0)),
        ];
        let out = wrap_case_list(&KeywordCalls, DUMMY_SP, &arms, pure_wrap).unwrap();
        assert_eq!(out.len(), 2);
        for (before, after) in arms.iter().zip(&out) {
            assert_eq!(before.pat, after.pat);
            assert_eq!(before.guard, after.guard);
        }
    }

    #[test]
    fn wraps_bodies_in_order() {
        let arms = vec![arm(wildcard(), ident("first")), arm(wildcard(), ident("second"))];
        let mut seen = Vec::new();
        wrap_case_list(&KeywordCalls, DUMMY_SP, &arms, |e| {
            seen.push(e.to_string());
            pure_wrap(e)
        })
        .unwrap();
        assert_eq!(seen, vec!["first", "second"]);
    }

    #[test]
    fn empty_list_is_malformed() {
        let err = wrap_case_list(&KeywordCalls, DUMMY_SP, &[], pure_wrap).unwrap_err();
        assert_eq!(
            err,
            DesugarError::MalformedCaseList {
                span: DUMMY_SP,
                defect: CaseListDefect::Empty,
            }
        );
    }

    #[test]
    fn transformable_guard_is_malformed() {
        let bind_guard = block(vec![bind(var("g"), ident("m"))], ident("g"));
        let arms = vec![arm(wildcard(), lit(0)), arm_if(var("x"), bind_guard, lit(1))];
        let err = validate_case_list(DUMMY_SP, &arms).unwrap_err();
        assert!(matches!(
            err,
            DesugarError::MalformedCaseList {
                defect: CaseListDefect::TransformableGuard { arm: 1 },
                ..
            }
        ));
    }

    #[test]
    fn duplicate_binder_is_malformed() {
        let arms = vec![arm(tuple(vec![var("a"), var("a")]), lit(0))];
        let err = validate_case_list(DUMMY_SP, &arms).unwrap_err();
        assert_eq!(
            err.to_string(),
            "malformed case list: pattern of arm 0 binds `a` more than once"
        );
    }
}
