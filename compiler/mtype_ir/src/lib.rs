//! Interned identifiers, source spans/tokens, and the AST for the `mtype`
//! type-inference engine.
//!
//! This crate holds everything the rest of the workspace treats as plain
//! data: nothing here knows about scopes, type terms, or unification. Those
//! live in `mtype_scope` and `mtype_types`, which depend on this crate for
//! identifiers and handles rather than the other way around.

pub mod ast;
pub mod handles;
pub mod identifier;
pub mod interner;
pub mod span;
pub mod token;
pub mod visitor;

pub use handles::{
    ClassDefHandle, FunctionDefHandle, FunctionReferenceHandle, NodeId, NodeIdGen, TypeScopeId,
    ValueScopeId, VariableDefHandle,
};
pub use identifier::{MatlabIdentifier, TypeIdentifier};
pub use interner::{StringId, StringRegistry};
pub use span::{CodeFileDescriptor, SourceText, Span};
pub use token::{Token, TokenKind, TokenSourceData};
pub use visitor::Visitor;
