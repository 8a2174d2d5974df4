use std::fmt;

use swc_common::Span;
use thiserror::Error;

/// Why a case list cannot be tagged arm by arm.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaseListDefect {
    Empty,
    /// Guards are evaluated by the host match and cannot contain binds.
    TransformableGuard { arm: usize },
    DuplicateBinder { arm: usize, name: String },
}

impl fmt::Display for CaseListDefect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaseListDefect::Empty => write!(f, "no arms"),
            CaseListDefect::TransformableGuard { arm } => {
                write!(f, "guard of arm {arm} contains a bind")
            }
            CaseListDefect::DuplicateBinder { arm, name } => {
                write!(f, "pattern of arm {arm} binds `{name}` more than once")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DesugarError {
    #[error("expression contains a bind but is not enclosed by a comprehension")]
    OrphanTransformableExpression { span: Span },
    #[error("the body of a comprehension cannot contain a bind")]
    UnsupportedEnclosingTransform { span: Span },
    #[error("malformed case list: {defect}")]
    MalformedCaseList { span: Span, defect: CaseListDefect },
}

impl DesugarError {
    /// Location of the offending node.
    pub fn span(&self) -> Span {
        match self {
            DesugarError::OrphanTransformableExpression { span }
            | DesugarError::UnsupportedEnclosingTransform { span }
            | DesugarError::MalformedCaseList { span, .. } => *span,
        }
    }
}

pub type Result<T> = std::result::Result<T, DesugarError>;
