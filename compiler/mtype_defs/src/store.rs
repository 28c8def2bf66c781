//! The definition store: one arena per definition kind, behind a scoped
//! reader/writer guard (spec §5, modeled on `src/mt/store.hpp`'s
//! `StoreAccessor`).
//!
//! The original tool hand-rolls its reader/writer bookkeeping over a mutex
//! and condition variable so it can track `num_readers`/`is_writer_active`
//! explicitly. We get the same multiple-readers/single-writer discipline —
//! and the same "lock released on every exit path" guarantee — from
//! `parking_lot::RwLock` directly, which would require no unsafe code to
//! duplicate; `read`/`write` below keep the original's *shape* (a scoped
//! closure rather than a bare guard the caller might forget to drop).

use mtype_ir::{
    ClassDefHandle, FunctionDefHandle, FunctionReferenceHandle, ValueScopeId, VariableDefHandle,
};
use parking_lot::RwLock;

use crate::definitions::{ClassDef, FunctionDef, FunctionReference, VariableDef};
use crate::external::PendingExternalFunctions;

#[derive(Default)]
pub struct StoreData {
    pub functions: Vec<FunctionDef>,
    pub variables: Vec<VariableDef>,
    pub classes: Vec<ClassDef>,
    pub references: Vec<FunctionReference>,
    pub pending_external: PendingExternalFunctions,
}

impl StoreData {
    pub fn push_function(&mut self, mut def: FunctionDef) -> FunctionDefHandle {
        let handle = FunctionDefHandle::from_raw(self.functions.len() as u32);
        def.handle = handle;
        self.functions.push(def);
        handle
    }

    pub fn push_variable(&mut self, mut def: VariableDef) -> VariableDefHandle {
        let handle = VariableDefHandle::from_raw(self.variables.len() as u32);
        def.handle = handle;
        self.variables.push(def);
        handle
    }

    pub fn push_class(&mut self, mut def: ClassDef) -> ClassDefHandle {
        let handle = ClassDefHandle::from_raw(self.classes.len() as u32);
        def.handle = handle;
        self.classes.push(def);
        handle
    }

    pub fn push_reference(&mut self, mut reference: FunctionReference) -> FunctionReferenceHandle {
        let handle = FunctionReferenceHandle::from_raw(self.references.len() as u32);
        reference.handle = handle;
        self.references.push(reference);
        handle
    }

    pub fn function(&self, handle: FunctionDefHandle) -> &FunctionDef {
        &self.functions[handle.raw() as usize]
    }

    pub fn function_mut(&mut self, handle: FunctionDefHandle) -> &mut FunctionDef {
        &mut self.functions[handle.raw() as usize]
    }

    pub fn variable(&self, handle: VariableDefHandle) -> &VariableDef {
        &self.variables[handle.raw() as usize]
    }

    pub fn variable_mut(&mut self, handle: VariableDefHandle) -> &mut VariableDef {
        &mut self.variables[handle.raw() as usize]
    }

    pub fn class(&self, handle: ClassDefHandle) -> &ClassDef {
        &self.classes[handle.raw() as usize]
    }

    pub fn class_mut(&mut self, handle: ClassDefHandle) -> &mut ClassDef {
        &mut self.classes[handle.raw() as usize]
    }

    pub fn reference(&self, handle: FunctionReferenceHandle) -> &FunctionReference {
        &self.references[handle.raw() as usize]
    }

    pub fn reference_mut(&mut self, handle: FunctionReferenceHandle) -> &mut FunctionReference {
        &mut self.references[handle.raw() as usize]
    }

    /// Functions whose defining scope is `scope` — the "local function"
    /// lookup the original's `Store::lookup_local_function` performs.
    pub fn lookup_local_function(
        &self,
        scope: ValueScopeId,
        name: mtype_ir::MatlabIdentifier,
    ) -> Option<FunctionDefHandle> {
        self.functions
            .iter()
            .find(|f| f.value_scope == scope && f.name == name)
            .map(|f| f.handle)
    }
}

#[derive(Default)]
pub struct Store {
    data: RwLock<StoreData>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scoped read access. The guard is dropped (and the lock released) at
    /// the end of the closure, regardless of how `f` returns.
    pub fn read<R>(&self, f: impl FnOnce(&StoreData) -> R) -> R {
        let guard = self.data.read();
        f(&guard)
    }

    /// Scoped write access, mutually exclusive with any read or write.
    pub fn write<R>(&self, f: impl FnOnce(&mut StoreData) -> R) -> R {
        let mut guard = self.data.write();
        f(&mut guard)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mtype_ir::{MatlabIdentifier, NodeId, Token, TypeScopeId as TS, ValueScopeId as VS};

    fn dummy_function(name: MatlabIdentifier, scope: VS) -> FunctionDef {
        FunctionDef {
            handle: FunctionDefHandle::INVALID,
            name,
            inputs: Vec::new(),
            outputs: Vec::new(),
            node: NodeId::from_raw(0),
            value_scope: scope,
            type_scope: TS::from_raw(0),
            ty: None,
            token: Token::synthetic("f"),
        }
    }

    #[test]
    fn push_then_read_round_trips() {
        let store = Store::new();
        let registry = mtype_ir::StringRegistry::new();
        let scope = VS::from_raw(0);
        let name = MatlabIdentifier::simple(registry.register("f"));
        let handle = store.write(|data| data.push_function(dummy_function(name, scope)));
        store.read(|data| {
            assert_eq!(data.function(handle).value_scope, scope);
        });
    }
}
