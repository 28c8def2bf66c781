//! Constraint generation against the builtin operator table (spec §4.E).

pub mod category;
pub mod generator;
pub mod operators;

pub use category::ValueCategory;
pub use generator::{could_not_infer_type, ConstraintGenerator};
pub use operators::OperatorLibrary;
