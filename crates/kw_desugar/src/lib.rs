//! Desugaring pass that lowers binds nested in control flow into calls on
//! a keyword algebra.
//!
//! Transforms, inside comprehension clauses:
//! - `{ a <- m; f(a) }`          → `flatMap(m, a => pure(f(a)))`
//! - `if (c) t else e`           → `ifThenElse(wrap(c), wrap(t), wrap(e))`
//! - `s match { case ... }`      → `matchCase(wrap(s), { case p => left(...); ... })`
//! - `while`, `do/while`, `try`  → `whileDo`, `doWhile`, `tryCatch`/`tryFinally`/`tryCatchFinally`
//!
//! and splices each lowered clause expression into a fresh bind of the
//! enclosing comprehension.

pub mod algebra;
pub mod cases;
pub mod check;
pub mod classify;
pub mod comprehension;
pub mod desugar;
pub mod error;
pub mod wrap;

pub use algebra::{algebra_for, KeywordAlgebra, KeywordCalls, MethodCalls};
pub use check::{check_expr, check_module, Site};
pub use classify::{classify, is_transformable, TransformTag};
pub use desugar::{desugar_def, desugar_module, Desugarer};
pub use error::{CaseListDefect, DesugarError};
pub use wrap::Wrapper;
