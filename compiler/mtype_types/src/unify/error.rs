//! Type error taxonomy (spec §7).
//!
//! Errors are *collected*, never thrown: a failing unification appends one
//! of these and marks the offending variables poisoned so dependent
//! equations are skipped rather than re-reported (see
//! [`crate::unify::engine::Unifier`]).

use mtype_ir::Token;

use crate::term::TypeId;

#[derive(Debug, Clone, thiserror::Error)]
pub enum TypeErrorKind {
    #[error("reference to undefined function")]
    UnresolvedFunction,

    #[error("could not infer type of {kind_string} ({site:?})")]
    CouldNotInferType { site: TypeId, kind_string: String },

    #[error("could not unify {lhs:?} with {rhs:?}")]
    UnificationFailure { lhs: TypeId, rhs: TypeId },

    #[error("arity mismatch: expected {expected}, found {found}")]
    ArityMismatch { expected: usize, found: usize },

    #[error("duplicate field `{field}` in record type")]
    DuplicateField { field: String },

    #[error("recursive type detected while binding a variable")]
    RecursiveType { var: TypeId, containing: TypeId },

    #[error("occurs check failed")]
    OccursCheck { var: TypeId, containing: TypeId },

    #[error("invalid application of operator to operand types")]
    InvalidOperatorApplication { lhs: TypeId, rhs: TypeId },

    /// Not one of the `(lhs_kind, rhs_kind)` pairs the spec's
    /// `DestructuredTuple` length-rule table enumerates (spec §4.C.3,
    /// design note §9: unspecified combinations are errors until tests
    /// dictate otherwise, rather than silently picking a rule).
    #[error("unspecified destructured-tuple length rule for this combination of kinds")]
    UnspecifiedDtCombination,
}

#[derive(Debug, Clone, thiserror::Error)]
#[error("{kind}")]
pub struct TypeError {
    pub kind: TypeErrorKind,
    pub token: Option<Token>,
}

impl TypeError {
    pub fn new(kind: TypeErrorKind) -> Self {
        Self { kind, token: None }
    }

    pub fn with_token(kind: TypeErrorKind, token: Token) -> Self {
        Self {
            kind,
            token: Some(token),
        }
    }
}
