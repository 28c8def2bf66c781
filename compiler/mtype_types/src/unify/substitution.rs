//! The substitution: bound-variable table plus a FIFO of pending equations
//! (spec §3.2, §4.C.1).

use std::collections::VecDeque;

use rustc_hash::FxHashMap;

use crate::term::TypeId;

#[derive(Debug, Clone, Copy)]
pub struct Equation {
    pub lhs: TypeId,
    pub rhs: TypeId,
}

/// Maps a `Variable` term to the term it's bound to. Grows monotonically —
/// entries are never removed, only added, matching spec §3.2.
#[derive(Default)]
pub struct Substitution {
    bound: FxHashMap<TypeId, TypeId>,
    worklist: VecDeque<Equation>,
}

impl Substitution {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_equation(&mut self, lhs: TypeId, rhs: TypeId) {
        self.worklist.push_back(Equation { lhs, rhs });
    }

    pub fn pop_equation(&mut self) -> Option<Equation> {
        self.worklist.pop_front()
    }

    /// Pops the most recently pushed equation instead of the oldest one.
    /// Used to drain equations a speculative trial deferred onto the
    /// worklist without disturbing whatever was already pending before the
    /// trial started (spec §4.C.2's `U, X` refine rule).
    pub fn pop_last_equation(&mut self) -> Option<Equation> {
        self.worklist.pop_back()
    }

    pub fn has_pending(&self) -> bool {
        !self.worklist.is_empty()
    }

    pub fn pending_len(&self) -> usize {
        self.worklist.len()
    }

    /// Bind `var` to `other`. `var` must currently resolve to itself — an
    /// attempt to rebind an already-bound variable is a logic error in the
    /// caller (the unifier always resolves both sides before dispatching),
    /// not a type error, so it is asserted rather than reported.
    pub fn bind(&mut self, var: TypeId, other: TypeId) {
        debug_assert_eq!(
            self.resolve(var),
            var,
            "bind() called on a variable that is already bound"
        );
        self.bound.insert(var, other);
    }

    /// Chase `term` through the bound table until it reaches a
    /// representative that is not itself a bound key. Idempotent: resolving
    /// a term twice yields the same representative (spec §8 property 2).
    pub fn resolve(&self, term: TypeId) -> TypeId {
        let mut current = term;
        let mut guard = 0usize;
        while let Some(&next) = self.bound.get(&current) {
            current = next;
            guard += 1;
            if guard > self.bound.len() + 1 {
                // A cycle in the bound table itself (not in the term graph)
                // would mean `bind` was misused; break rather than loop
                // forever.
                break;
            }
        }
        current
    }

    pub fn is_bound(&self, term: TypeId) -> bool {
        self.bound.contains_key(&term)
    }

    pub fn bound_len(&self) -> usize {
        self.bound.len()
    }

    /// Captures the bound table so a speculative unification (e.g. refining
    /// a `Union`, spec §4.C.2) can be rolled back without disturbing
    /// bindings made outside the trial.
    pub fn snapshot(&self) -> FxHashMap<TypeId, TypeId> {
        self.bound.clone()
    }

    pub fn restore(&mut self, snapshot: FxHashMap<TypeId, TypeId>) {
        self.bound = snapshot;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(raw: u32) -> TypeId {
        TypeId::from_raw(raw)
    }

    #[test]
    fn resolve_is_idempotent() {
        let mut subst = Substitution::new();
        subst.bind(id(0), id(1));
        subst.bind(id(1), id(2));
        let once = subst.resolve(id(0));
        let twice = subst.resolve(once);
        assert_eq!(once, twice);
        assert_eq!(once, id(2));
    }

    #[test]
    fn unbound_term_resolves_to_itself() {
        let subst = Substitution::new();
        assert_eq!(subst.resolve(id(5)), id(5));
    }

    #[test]
    fn equations_drain_fifo() {
        let mut subst = Substitution::new();
        subst.push_equation(id(0), id(1));
        subst.push_equation(id(2), id(3));
        let first = subst.pop_equation().expect("has pending");
        assert_eq!((first.lhs, first.rhs), (id(0), id(1)));
    }
}
