//! Built-in operator signatures the constraint generator unifies call sites
//! against (spec §4.E: "binary/unary operators against the builtin operator
//! table").
//!
//! Every operator gets one polymorphic scheme: `given T. (T, T) -> T` for
//! arithmetic, `given T. (T, T) -> logical` for comparisons, and
//! `(logical, logical) -> logical` for short-circuit/logical connectives.
//! This is a deliberate simplification of MATLAB's real (highly overloaded)
//! operator semantics — good enough to drive unification end to end without
//! a full numeric-promotion lattice, which is out of scope here.

use mtype_ir::{ast::BinaryOp, ast::UnaryOp, StringId, StringRegistry};
use mtype_types::{AbstractionKind, DtKind, Pool, TypeId};
use rustc_hash::FxHashMap;

pub struct OperatorLibrary {
    pub double: StringId,
    pub logical: StringId,
    binary: FxHashMap<BinaryOp, TypeId>,
    unary: FxHashMap<UnaryOp, TypeId>,
    subsref: TypeId,
    subsasgn: TypeId,
    concatenation: TypeId,
}

impl OperatorLibrary {
    pub fn build(pool: &mut Pool, registry: &StringRegistry) -> Self {
        let double = registry.register("double");
        let logical = registry.register("logical");

        let mut binary = FxHashMap::default();
        let mut unary = FxHashMap::default();

        use BinaryOp::*;
        let arithmetic = [
            Add, Sub, Mul, Div, LeftDiv, MatMul, MatDiv, MatLeftDiv, Pow, MatPow, Colon,
        ];
        for op in arithmetic {
            binary.insert(op, Self::binary_homogeneous_scheme(pool));
        }
        let comparisons = [Lt, Le, Gt, Ge, Eq, Ne];
        for op in comparisons {
            binary.insert(op, Self::binary_comparison_scheme(pool, logical));
        }
        let logical_ops = [And, Or, ShortCircuitAnd, ShortCircuitOr];
        for op in logical_ops {
            binary.insert(op, Self::binary_logical_scheme(pool, logical));
        }

        unary.insert(UnaryOp::Not, Self::unary_logical_scheme(pool, logical));
        for op in [
            UnaryOp::Neg,
            UnaryOp::Plus,
            UnaryOp::Transpose,
            UnaryOp::ComplexTranspose,
        ] {
            unary.insert(op, Self::unary_homogeneous_scheme(pool));
        }

        let list_name = registry.register("list");
        let subsref = Self::subsref_scheme(pool);
        let subsasgn = Self::subsasgn_scheme(pool);
        let concatenation = Self::concatenation_scheme(pool, list_name);

        Self {
            double,
            logical,
            binary,
            unary,
            subsref,
            subsasgn,
            concatenation,
        }
    }

    pub fn binary_scheme(&self, op: BinaryOp) -> TypeId {
        self.binary[&op]
    }

    pub fn unary_scheme(&self, op: UnaryOp) -> TypeId {
        self.unary[&op]
    }

    /// `given T, I. (T, I) -> T` — indexed read. A real `subsref` would
    /// dispatch on the target's element type and the index kind; this
    /// polymorphic identity is the simplification the container types in
    /// this workspace actually need.
    pub fn subsref_scheme(pool: &mut Pool) -> TypeId {
        let target = pool.fresh_variable();
        let index = pool.fresh_variable();
        let inputs = pool.alloc_destructured_tuple(DtKind::DefinitionInputs, vec![target, index]);
        let outputs = pool.alloc_destructured_tuple(DtKind::DefinitionOutputs, vec![target]);
        let abstraction = pool.alloc_abstraction(inputs, outputs, AbstractionKind::Subscript);
        pool.alloc_scheme(vec![target, index], abstraction)
    }

    /// `given T, I. (T, I, T) -> T` — indexed write.
    pub fn subsasgn_scheme(pool: &mut Pool) -> TypeId {
        let target = pool.fresh_variable();
        let index = pool.fresh_variable();
        let inputs =
            pool.alloc_destructured_tuple(DtKind::DefinitionInputs, vec![target, index, target]);
        let outputs = pool.alloc_destructured_tuple(DtKind::DefinitionOutputs, vec![target]);
        let abstraction = pool.alloc_abstraction(inputs, outputs, AbstractionKind::Subscript);
        pool.alloc_scheme(vec![target, index], abstraction)
    }

    /// `given T. (list<T>) -> list<T>` — `horzcat`/`vertcat` share one
    /// signature: every bracketed element must agree on a common type `T`,
    /// and the bracket expression itself is a `list<T>`.
    pub fn concatenation_scheme(pool: &mut Pool, list_name: StringId) -> TypeId {
        let t = pool.fresh_variable();
        let elements = pool.alloc_list(vec![t]);
        let result = pool.alloc_scalar(list_name, vec![t]);
        let inputs = pool.alloc_destructured_tuple(DtKind::DefinitionInputs, vec![elements]);
        let outputs = pool.alloc_destructured_tuple(DtKind::DefinitionOutputs, vec![result]);
        let abstraction = pool.alloc_abstraction(inputs, outputs, AbstractionKind::Concatenation);
        pool.alloc_scheme(vec![t], abstraction)
    }

    pub fn subsref(&self) -> TypeId {
        self.subsref
    }

    pub fn subsasgn(&self) -> TypeId {
        self.subsasgn
    }

    pub fn concatenation(&self) -> TypeId {
        self.concatenation
    }

    fn binary_homogeneous_scheme(pool: &mut Pool) -> TypeId {
        let t = pool.fresh_variable();
        let inputs = pool.alloc_destructured_tuple(DtKind::DefinitionInputs, vec![t, t]);
        let outputs = pool.alloc_destructured_tuple(DtKind::DefinitionOutputs, vec![t]);
        let abstraction = pool.alloc_abstraction(inputs, outputs, AbstractionKind::BinaryOperator);
        pool.alloc_scheme(vec![t], abstraction)
    }

    fn binary_comparison_scheme(pool: &mut Pool, logical: StringId) -> TypeId {
        let t = pool.fresh_variable();
        let inputs = pool.alloc_destructured_tuple(DtKind::DefinitionInputs, vec![t, t]);
        let result = pool.alloc_scalar(logical, vec![]);
        let outputs = pool.alloc_destructured_tuple(DtKind::DefinitionOutputs, vec![result]);
        let abstraction = pool.alloc_abstraction(inputs, outputs, AbstractionKind::BinaryOperator);
        pool.alloc_scheme(vec![t], abstraction)
    }

    fn binary_logical_scheme(pool: &mut Pool, logical: StringId) -> TypeId {
        let l1 = pool.alloc_scalar(logical, vec![]);
        let l2 = pool.alloc_scalar(logical, vec![]);
        let l3 = pool.alloc_scalar(logical, vec![]);
        let inputs = pool.alloc_destructured_tuple(DtKind::DefinitionInputs, vec![l1, l2]);
        let outputs = pool.alloc_destructured_tuple(DtKind::DefinitionOutputs, vec![l3]);
        let abstraction = pool.alloc_abstraction(inputs, outputs, AbstractionKind::BinaryOperator);
        pool.alloc_scheme(vec![], abstraction)
    }

    fn unary_homogeneous_scheme(pool: &mut Pool) -> TypeId {
        let t = pool.fresh_variable();
        let inputs = pool.alloc_destructured_tuple(DtKind::DefinitionInputs, vec![t]);
        let outputs = pool.alloc_destructured_tuple(DtKind::DefinitionOutputs, vec![t]);
        let abstraction = pool.alloc_abstraction(inputs, outputs, AbstractionKind::UnaryOperator);
        pool.alloc_scheme(vec![t], abstraction)
    }

    fn unary_logical_scheme(pool: &mut Pool, logical: StringId) -> TypeId {
        let l1 = pool.alloc_scalar(logical, vec![]);
        let l2 = pool.alloc_scalar(logical, vec![]);
        let inputs = pool.alloc_destructured_tuple(DtKind::DefinitionInputs, vec![l1]);
        let outputs = pool.alloc_destructured_tuple(DtKind::DefinitionOutputs, vec![l2]);
        let abstraction = pool.alloc_abstraction(inputs, outputs, AbstractionKind::UnaryOperator);
        pool.alloc_scheme(vec![], abstraction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mtype_types::Term;

    #[test]
    fn every_arithmetic_and_comparison_operator_has_a_scheme() {
        let registry = StringRegistry::new();
        let mut pool = Pool::default();
        let lib = OperatorLibrary::build(&mut pool, &registry);

        for op in [BinaryOp::Add, BinaryOp::Sub, BinaryOp::Mul, BinaryOp::Colon] {
            assert!(matches!(pool.get(lib.binary_scheme(op)), Term::Scheme { .. }));
        }
        for op in [BinaryOp::Lt, BinaryOp::Eq, BinaryOp::Ne] {
            assert!(matches!(pool.get(lib.binary_scheme(op)), Term::Scheme { .. }));
        }
        for op in [BinaryOp::And, BinaryOp::ShortCircuitOr] {
            assert!(matches!(pool.get(lib.binary_scheme(op)), Term::Scheme { .. }));
        }
    }

    #[test]
    fn comparison_scheme_always_returns_logical() {
        let registry = StringRegistry::new();
        let mut pool = Pool::default();
        let lib = OperatorLibrary::build(&mut pool, &registry);

        let scheme = lib.binary_scheme(BinaryOp::Lt);
        let Term::Scheme { body, .. } = pool.get(scheme).clone() else {
            panic!("expected a scheme");
        };
        let Term::Abstraction { outputs, .. } = pool.get(body).clone() else {
            panic!("expected an abstraction body");
        };
        let Term::DestructuredTuple { members, .. } = pool.get(outputs).clone() else {
            panic!("expected a destructured tuple of outputs");
        };
        let Term::Scalar { name, args } = pool.get(members[0]).clone() else {
            panic!("expected a scalar result");
        };
        assert_eq!(name, lib.logical);
        assert!(args.is_empty());
    }

    #[test]
    fn subsref_and_subsasgn_are_distinct_schemes() {
        let registry = StringRegistry::new();
        let mut pool = Pool::default();
        let lib = OperatorLibrary::build(&mut pool, &registry);
        assert_ne!(lib.subsref(), lib.subsasgn());
    }
}
