//! The type arena (spec §3.2/§4.B).

use mtype_ir::{StringId, TypeIdentifier};

use crate::term::{AbstractionKind, ConstantValue, DtKind, RecordField, Term, TypeId};

/// Default bulk capacity, matching the original tool's
/// `initial_store_capacity` tuning knob (see `bin/mtype/command_line.cpp`).
pub const DEFAULT_CAPACITY: usize = 4096;

/// Owns every type term allocated during a compilation. Never cleared, never
/// shrunk — pointers (here, [`TypeId`]s) returned by `alloc_*` are valid for
/// the lifetime of the compilation (spec §4.B).
pub struct Pool {
    terms: Vec<Term>,
}

impl Default for Pool {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl Pool {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            terms: Vec::with_capacity(capacity),
        }
    }

    fn push(&mut self, term: Term) -> TypeId {
        let id = TypeId::from_raw(self.terms.len() as u32);
        self.terms.push(term);
        id
    }

    pub fn get(&self, id: TypeId) -> &Term {
        &self.terms[id.raw() as usize]
    }

    pub fn get_mut(&mut self, id: TypeId) -> &mut Term {
        &mut self.terms[id.raw() as usize]
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn fresh_variable(&mut self) -> TypeId {
        self.alloc_variable(None)
    }

    pub fn alloc_variable(&mut self, name: Option<StringId>) -> TypeId {
        self.push(Term::Variable { name })
    }

    pub fn alloc_scalar(&mut self, name: StringId, args: Vec<TypeId>) -> TypeId {
        self.push(Term::Scalar { name, args })
    }

    pub fn alloc_tuple(&mut self, elements: Vec<TypeId>) -> TypeId {
        self.push(Term::Tuple { elements })
    }

    pub fn alloc_destructured_tuple(&mut self, kind: DtKind, members: Vec<TypeId>) -> TypeId {
        self.push(Term::DestructuredTuple { kind, members })
    }

    pub fn alloc_list(&mut self, elements: Vec<TypeId>) -> TypeId {
        self.push(Term::List { elements })
    }

    pub fn alloc_union(&mut self, members: Vec<TypeId>) -> TypeId {
        self.push(Term::Union { members })
    }

    pub fn alloc_record(&mut self, fields: Vec<(TypeIdentifier, TypeId)>) -> TypeId {
        let fields = fields
            .into_iter()
            .map(|(name, value)| RecordField { name, value })
            .collect();
        self.push(Term::Record { fields })
    }

    pub fn alloc_class(&mut self, name: StringId, source: TypeId) -> TypeId {
        self.push(Term::Class { name, source })
    }

    pub fn alloc_abstraction(
        &mut self,
        inputs: TypeId,
        outputs: TypeId,
        kind: AbstractionKind,
    ) -> TypeId {
        self.push(Term::Abstraction {
            inputs,
            outputs,
            kind,
        })
    }

    pub fn alloc_scheme(&mut self, params: Vec<TypeId>, body: TypeId) -> TypeId {
        self.push(Term::Scheme { params, body })
    }

    pub fn alloc_application(&mut self, target: TypeId, inputs: TypeId, outputs: TypeId) -> TypeId {
        self.push(Term::Application {
            target,
            inputs,
            outputs,
        })
    }

    pub fn alloc_alias(&mut self, name: StringId, target: TypeId) -> TypeId {
        self.push(Term::Alias { name, target })
    }

    pub fn alloc_parameters(&mut self, scheme: TypeId) -> TypeId {
        self.push(Term::Parameters { scheme })
    }

    pub fn alloc_constant_value(&mut self, value: ConstantValue) -> TypeId {
        self.push(Term::ConstantValue { value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocations_return_increasing_ids() {
        let mut pool = Pool::with_capacity(4);
        let a = pool.fresh_variable();
        let b = pool.fresh_variable();
        assert_ne!(a, b);
        assert!(b.raw() > a.raw());
    }

    #[test]
    fn two_scalars_with_same_name_are_distinct_terms() {
        let mut pool = Pool::default();
        let registry = mtype_ir::StringRegistry::new();
        let name = registry.register("double");
        let a = pool.alloc_scalar(name, vec![]);
        let b = pool.alloc_scalar(name, vec![]);
        assert_ne!(a, b, "identity, not structure, is the equality the pool provides");
    }
}
