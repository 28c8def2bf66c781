//! The type term arena, substitution, and unifier (spec components B and C).

pub mod pool;
pub mod term;
pub mod unify;

pub use pool::{Pool, DEFAULT_CAPACITY};
pub use term::{AbstractionKind, ConstantValue, DtKind, RecordField, Term, TypeId};
pub use unify::{Equation, Substitution, TypeError, TypeErrorKind, Unifier, WellKnownNames};
