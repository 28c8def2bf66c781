//! The definition records a [`crate::store::Store`] arena holds (spec §3.5,
//! modeled on `src/mt/definitions.hpp`).

use mtype_ir::{
    ClassDefHandle, FunctionDefHandle, FunctionReferenceHandle, MatlabIdentifier, NodeId,
    StringId, Token, TypeScopeId, ValueScopeId, VariableDefHandle,
};
use mtype_types::TypeId;

#[derive(Debug, Clone)]
pub struct FunctionDef {
    pub handle: FunctionDefHandle,
    pub name: MatlabIdentifier,
    pub inputs: Vec<VariableDefHandle>,
    pub outputs: Vec<VariableDefHandle>,
    pub node: NodeId,
    pub value_scope: ValueScopeId,
    pub type_scope: TypeScopeId,
    /// The function's type — a `Scheme` wrapping an `Abstraction`, or
    /// `None` until the constraint generator visits it.
    pub ty: Option<TypeId>,
    pub token: Token,
}

#[derive(Debug, Clone)]
pub struct VariableDef {
    pub handle: VariableDefHandle,
    pub name: MatlabIdentifier,
    pub node: NodeId,
    pub ty: Option<TypeId>,
    pub token: Token,
}

#[derive(Debug, Clone)]
pub struct ClassDef {
    pub handle: ClassDefHandle,
    pub name: StringId,
    pub node: NodeId,
    pub ty: Option<TypeId>,
    pub token: Token,
}

/// A use of a function name — either already bound to a definition in this
/// compilation, or awaiting external resolution (spec §4.C.5, §3.5).
#[derive(Debug, Clone)]
pub struct FunctionReference {
    pub handle: FunctionReferenceHandle,
    pub name: MatlabIdentifier,
    pub scope: ValueScopeId,
    pub def: Option<FunctionDefHandle>,
    pub token: Token,
}

impl FunctionReference {
    pub fn is_resolved(&self) -> bool {
        self.def.is_some()
    }
}
