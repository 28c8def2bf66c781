//! The unifier: drains a [`Substitution`]'s equation worklist, dispatching on
//! the resolved pair of term tags (spec §4.C.2), applying the
//! `DestructuredTuple` length rules (§4.C.3) and scheme instantiation
//! (§4.C.4).

use rustc_hash::{FxHashMap, FxHashSet};

use mtype_ir::Token;

use crate::pool::Pool;
use crate::term::{AbstractionKind, ConstantValue, DtKind, Term, TypeId};
use crate::unify::error::{TypeError, TypeErrorKind};
use crate::unify::substitution::Substitution;
use crate::unify::well_known::WellKnownNames;

pub struct Unifier<'p, 's> {
    pool: &'p mut Pool,
    subst: &'s mut Substitution,
    well_known: WellKnownNames,
    errors: Vec<TypeError>,
    /// Representatives a failed unification has already reported on. Further
    /// equations touching them are dropped silently instead of cascading
    /// into a wall of derived errors (spec §7).
    poisoned: FxHashSet<TypeId>,
    /// Guards against re-entering the same resolved pair while it's already
    /// being unified higher up the call stack — cyclic class/record graphs
    /// are permitted by the term model (spec §3.1) and must not loop here.
    in_progress: FxHashSet<(TypeId, TypeId)>,
}

impl<'p, 's> Unifier<'p, 's> {
    pub fn new(pool: &'p mut Pool, subst: &'s mut Substitution, well_known: WellKnownNames) -> Self {
        Self {
            pool,
            subst,
            well_known,
            errors: Vec::new(),
            poisoned: FxHashSet::default(),
            in_progress: FxHashSet::default(),
        }
    }

    /// Drains the worklist to a fixed point. Unification performed by the
    /// constraint generator may itself push new equations (scheme
    /// instantiation, list expansion); those are picked up in the same run.
    pub fn run(&mut self) {
        while let Some(eq) = self.subst.pop_equation() {
            self.unify_one(eq.lhs, eq.rhs, None);
        }
    }

    pub fn errors(&self) -> &[TypeError] {
        &self.errors
    }

    pub fn take_errors(&mut self) -> Vec<TypeError> {
        std::mem::take(&mut self.errors)
    }

    pub fn is_poisoned(&self, id: TypeId) -> bool {
        self.poisoned.contains(&self.subst.resolve(id))
    }

    fn fail(&mut self, lhs: TypeId, rhs: TypeId, kind: TypeErrorKind, token: Option<Token>) {
        self.poisoned.insert(lhs);
        self.poisoned.insert(rhs);
        self.errors.push(match token {
            Some(tok) => TypeError::with_token(kind, tok),
            None => TypeError::new(kind),
        });
    }

    fn unify_one(&mut self, lhs: TypeId, rhs: TypeId, token: Option<Token>) {
        let l = self.subst.resolve(lhs);
        let r = self.subst.resolve(rhs);
        if l == r {
            return;
        }
        if self.poisoned.contains(&l) || self.poisoned.contains(&r) {
            return;
        }
        let pair = (l, r);
        if !self.in_progress.insert(pair) {
            return;
        }
        self.dispatch(l, r, token);
        self.in_progress.remove(&pair);
    }

    fn dispatch(&mut self, l: TypeId, r: TypeId, token: Option<Token>) {
        let lt = self.pool.get(l).clone();
        let rt = self.pool.get(r).clone();

        match (&lt, &rt) {
            (Term::Variable { .. }, _) => {
                self.check_recursive(l, r);
                self.subst.bind(l, r)
            }
            (_, Term::Variable { .. }) => {
                self.check_recursive(r, l);
                self.subst.bind(r, l)
            }

            (Term::Scalar { name: ln, args: la }, Term::Scalar { name: rn, args: ra }) => {
                if ln != rn || la.len() != ra.len() {
                    self.fail(
                        l,
                        r,
                        TypeErrorKind::UnificationFailure { lhs: l, rhs: r },
                        token,
                    );
                    return;
                }
                for (a, b) in la.clone().into_iter().zip(ra.clone()) {
                    self.subst.push_equation(a, b);
                }
            }

            (Term::Tuple { elements: le }, Term::Tuple { elements: re }) => {
                if le.len() != re.len() {
                    self.fail(
                        l,
                        r,
                        TypeErrorKind::ArityMismatch {
                            expected: le.len(),
                            found: re.len(),
                        },
                        token,
                    );
                    return;
                }
                for (a, b) in le.clone().into_iter().zip(re.clone()) {
                    self.subst.push_equation(a, b);
                }
            }

            (
                Term::DestructuredTuple {
                    kind: lk,
                    members: lm,
                },
                Term::DestructuredTuple {
                    kind: rk,
                    members: rm,
                },
            ) => {
                let lm = lm.clone();
                let rm = rm.clone();
                self.unify_destructured(l, r, *lk, &lm, *rk, &rm, token);
            }

            (Term::List { elements: le }, Term::List { elements: re }) => {
                self.unify_list_elements(le.clone(), re.clone());
            }
            (Term::List { elements: le }, Term::DestructuredTuple { members: rm, .. }) => {
                self.unify_list_against_members(le.clone(), rm.clone());
            }
            (Term::DestructuredTuple { members: lm, .. }, Term::List { elements: re }) => {
                self.unify_list_against_members(re.clone(), lm.clone());
            }

            (Term::Union { members }, _) => self.unify_union(l, members.clone(), r, token),
            (_, Term::Union { members }) => self.unify_union(r, members.clone(), l, token),

            (Term::Record { fields: lf }, Term::Record { fields: rf }) => {
                let lf = lf.clone();
                let rf = rf.clone();
                for field in &lf {
                    match rf.iter().find(|f| f.name == field.name) {
                        Some(other) => self.subst.push_equation(field.value, other.value),
                        None => {
                            self.fail(
                                l,
                                r,
                                TypeErrorKind::UnificationFailure { lhs: l, rhs: r },
                                token,
                            );
                            return;
                        }
                    }
                }
                if rf.len() != lf.len() {
                    self.fail(
                        l,
                        r,
                        TypeErrorKind::UnificationFailure { lhs: l, rhs: r },
                        token,
                    );
                }
            }

            (
                Term::Class {
                    name: ln,
                    source: ls,
                },
                Term::Class {
                    name: rn,
                    source: rs,
                },
            ) => {
                if ln != rn {
                    self.fail(
                        l,
                        r,
                        TypeErrorKind::UnificationFailure { lhs: l, rhs: r },
                        token,
                    );
                    return;
                }
                // Deferred: class source types may reference the class
                // itself (recursive class definitions), so push rather
                // than recurse immediately.
                self.subst.push_equation(*ls, *rs);
            }

            (
                Term::Abstraction {
                    inputs: li,
                    outputs: lo,
                    kind: lk,
                },
                Term::Abstraction {
                    inputs: ri,
                    outputs: ro,
                    kind: rk,
                },
            ) => {
                if lk != rk {
                    self.fail(
                        l,
                        r,
                        TypeErrorKind::UnificationFailure { lhs: l, rhs: r },
                        token,
                    );
                    return;
                }
                self.subst.push_equation(*li, *ri);
                self.subst.push_equation(*lo, *ro);
            }

            (Term::Scheme { .. }, Term::Scheme { .. }) => {
                let (lbody, rbody) = self.instantiate_pair(l, r);
                self.subst.push_equation(lbody, rbody);
            }

            (Term::Application { .. }, Term::Abstraction { .. })
            | (Term::Application { .. }, Term::Scheme { .. }) => {
                self.unify_application(l, &lt, r, &rt, token)
            }
            (Term::Abstraction { .. }, Term::Application { .. })
            | (Term::Scheme { .. }, Term::Application { .. }) => {
                self.unify_application(r, &rt, l, &lt, token)
            }

            (Term::Alias { target, .. }, _) => {
                let target = *target;
                self.subst.push_equation(target, r);
            }
            (_, Term::Alias { target, .. }) => {
                let target = *target;
                self.subst.push_equation(l, target);
            }

            (Term::Parameters { scheme }, _) => {
                let tuple = self.params_as_tuple(*scheme);
                self.subst.push_equation(tuple, r);
            }
            (_, Term::Parameters { scheme }) => {
                let tuple = self.params_as_tuple(*scheme);
                self.subst.push_equation(l, tuple);
            }

            (Term::ConstantValue { value }, Term::Scalar { name, args })
            | (Term::Scalar { name, args }, Term::ConstantValue { value }) => {
                if !args.is_empty() || !self.constant_matches_scalar(value, *name) {
                    self.fail(
                        l,
                        r,
                        TypeErrorKind::UnificationFailure { lhs: l, rhs: r },
                        token,
                    );
                }
            }

            (Term::ConstantValue { value: lv }, Term::ConstantValue { value: rv }) => {
                if lv != rv {
                    self.fail(
                        l,
                        r,
                        TypeErrorKind::UnificationFailure { lhs: l, rhs: r },
                        token,
                    );
                }
            }

            _ => self.fail(
                l,
                r,
                TypeErrorKind::UnificationFailure { lhs: l, rhs: r },
                token,
            ),
        }
    }

    /// Reports a `recursive_type` error the first time a bind would close a
    /// cycle (spec §9 design note: the unifier has no occurs-check, so
    /// infinite types are *reported*, not forbidden — the bind still
    /// happens). `Class` boundaries are not traversed: recursive class
    /// definitions are an expected, supported shape (spec §3.1), so a
    /// variable occurring only inside a class's source type is not flagged.
    fn check_recursive(&mut self, var: TypeId, other: TypeId) {
        let mut visited = FxHashSet::default();
        if self.occurs_in(var, other, &mut visited) {
            self.errors.push(TypeError::new(TypeErrorKind::RecursiveType {
                var,
                containing: other,
            }));
        }
    }

    fn occurs_in(&self, var: TypeId, term: TypeId, visited: &mut FxHashSet<TypeId>) -> bool {
        let resolved = self.subst.resolve(term);
        if resolved == var {
            return true;
        }
        if !visited.insert(resolved) {
            return false;
        }
        match self.pool.get(resolved) {
            Term::Variable { .. } | Term::ConstantValue { .. } => false,
            Term::Scalar { args, .. } => args.iter().any(|a| self.occurs_in(var, *a, visited)),
            Term::Tuple { elements } | Term::List { elements } | Term::Union { members: elements } => {
                elements.iter().any(|e| self.occurs_in(var, *e, visited))
            }
            Term::DestructuredTuple { members, .. } => {
                members.iter().any(|m| self.occurs_in(var, *m, visited))
            }
            Term::Record { fields } => fields.iter().any(|f| self.occurs_in(var, f.value, visited)),
            // Recursive classes are allowed by design; don't traverse into
            // the source type, or every self-referential class would be
            // reported as a recursive type.
            Term::Class { .. } => false,
            Term::Abstraction { inputs, outputs, .. } => {
                self.occurs_in(var, *inputs, visited) || self.occurs_in(var, *outputs, visited)
            }
            Term::Scheme { body, .. } => self.occurs_in(var, *body, visited),
            Term::Application { target, inputs, outputs } => {
                self.occurs_in(var, *target, visited)
                    || self.occurs_in(var, *inputs, visited)
                    || self.occurs_in(var, *outputs, visited)
            }
            Term::Alias { target, .. } => self.occurs_in(var, *target, visited),
            Term::Parameters { scheme } => self.occurs_in(var, *scheme, visited),
        }
    }

    fn constant_matches_scalar(
        &self,
        value: &ConstantValue,
        name: mtype_ir::StringId,
    ) -> bool {
        match value {
            ConstantValue::Number(_) => name == self.well_known.double,
            ConstantValue::Char(_) => name == self.well_known.char_,
            ConstantValue::Str(_) => {
                name == self.well_known.string || name == self.well_known.char_
            }
        }
    }

    fn params_as_tuple(&mut self, scheme: TypeId) -> TypeId {
        let params = match self.pool.get(scheme) {
            Term::Scheme { params, .. } => params.clone(),
            _ => Vec::new(),
        };
        self.pool.alloc_tuple(params)
    }

    fn unify_list_elements(&mut self, lhs: Vec<TypeId>, rhs: Vec<TypeId>) {
        // Lists describe a single repeating element type; only the first
        // entry of each side is meaningful once non-empty.
        if let (Some(&a), Some(&b)) = (lhs.first(), rhs.first()) {
            self.subst.push_equation(a, b);
        }
    }

    fn unify_list_against_members(&mut self, list: Vec<TypeId>, members: Vec<TypeId>) {
        let Some(&repeat) = list.first() else {
            return;
        };
        for m in members {
            self.subst.push_equation(repeat, m);
        }
    }

    fn trailing_list(&self, members: &[TypeId]) -> Option<TypeId> {
        let last = *members.last()?;
        match self.pool.get(self.subst.resolve(last)) {
            Term::List { .. } => Some(last),
            _ => None,
        }
    }

    /// The `DestructuredTuple` length-mismatch table (spec §4.C.3). Only the
    /// enumerated `(lhs_kind, rhs_kind)` pairs have a defined rule; anything
    /// else is an error rather than a guessed fallback (spec §9).
    fn unify_destructured(
        &mut self,
        l: TypeId,
        r: TypeId,
        lk: DtKind,
        lm: &[TypeId],
        rk: DtKind,
        rm: &[TypeId],
        token: Option<Token>,
    ) {
        use DtKind::*;

        match (lk, rk) {
            (DefinitionOutputs, Rvalue) => {
                if rm.len() > lm.len() {
                    self.fail(
                        l,
                        r,
                        TypeErrorKind::ArityMismatch {
                            expected: lm.len(),
                            found: rm.len(),
                        },
                        token,
                    );
                    return;
                }
                // Extra definition outputs are silently discarded (the
                // caller ignored some return values).
                for (a, b) in lm.iter().zip(rm.iter()) {
                    self.subst.push_equation(*a, *b);
                }
            }

            (DefinitionInputs, Rvalue) | (DefinitionInputs, Lvalue) => {
                if lm.len() == rm.len() {
                    for (a, b) in lm.iter().zip(rm.iter()) {
                        self.subst.push_equation(*a, *b);
                    }
                    return;
                }
                if let Some(list) = self.trailing_list(lm) {
                    let prefix_len = lm.len() - 1;
                    if rm.len() < prefix_len {
                        self.fail(
                            l,
                            r,
                            TypeErrorKind::ArityMismatch {
                                expected: prefix_len,
                                found: rm.len(),
                            },
                            token,
                        );
                        return;
                    }
                    for (a, b) in lm[..prefix_len].iter().zip(rm[..prefix_len].iter()) {
                        self.subst.push_equation(*a, *b);
                    }
                    for extra in &rm[prefix_len..] {
                        self.subst.push_equation(list, *extra);
                    }
                    return;
                }
                self.fail(
                    l,
                    r,
                    TypeErrorKind::ArityMismatch {
                        expected: lm.len(),
                        found: rm.len(),
                    },
                    token,
                );
            }

            (Rvalue, Rvalue) | (Lvalue, Lvalue) => {
                if lm.len() != rm.len() {
                    if let Some(list) = self.trailing_list(lm) {
                        let prefix_len = lm.len() - 1;
                        for (a, b) in lm[..prefix_len].iter().zip(rm.iter()) {
                            self.subst.push_equation(*a, *b);
                        }
                        for extra in rm.iter().skip(prefix_len) {
                            self.subst.push_equation(list, *extra);
                        }
                        return;
                    }
                    self.fail(
                        l,
                        r,
                        TypeErrorKind::ArityMismatch {
                            expected: lm.len(),
                            found: rm.len(),
                        },
                        token,
                    );
                    return;
                }
                for (a, b) in lm.iter().zip(rm.iter()) {
                    self.subst.push_equation(*a, *b);
                }
            }

            _ => self.fail(l, r, TypeErrorKind::UnspecifiedDtCombination, token),
        }
    }

    fn unify_union(&mut self, union_id: TypeId, members: Vec<TypeId>, other: TypeId, token: Option<Token>) {
        let mut survivors = Vec::new();
        for member in members {
            let snapshot_bound = self.subst.snapshot();
            let snapshot_worklist_len = self.subst.pending_len();
            let snapshot_errors = self.errors.len();
            self.unify_one(member, other, token.clone());
            // `unify_one` only checks the top-level tag pair and defers
            // nested work (scalar args, tuple elements, record fields, ...)
            // by pushing onto the worklist. Drain exactly the equations this
            // trial appended — and whatever they in turn append — before
            // judging the member, so a tag-only match whose nested
            // equations actually fail isn't kept as a survivor, and nothing
            // from a rejected trial leaks into `run()` afterward.
            while self.subst.pending_len() > snapshot_worklist_len {
                let Some(eq) = self.subst.pop_last_equation() else {
                    break;
                };
                self.unify_one(eq.lhs, eq.rhs, token.clone());
            }
            if self.errors.len() > snapshot_errors {
                self.errors.truncate(snapshot_errors);
                self.subst.restore(snapshot_bound);
            } else {
                survivors.push(member);
            }
        }
        if survivors.is_empty() {
            self.fail(
                union_id,
                other,
                TypeErrorKind::UnificationFailure {
                    lhs: union_id,
                    rhs: other,
                },
                token,
            );
        }
    }

    fn unify_application(
        &mut self,
        app_id: TypeId,
        app: &Term,
        target_id: TypeId,
        target: &Term,
        token: Option<Token>,
    ) {
        let Term::Application {
            inputs: app_inputs,
            outputs: app_outputs,
            ..
        } = app
        else {
            unreachable!("caller guarantees `app` is an Application term")
        };

        match target {
            Term::Scheme { .. } => {
                let instantiated = self.instantiate_scheme(target_id);
                self.subst.push_equation(app_id, instantiated);
            }
            Term::Abstraction {
                inputs: t_inputs,
                outputs: t_outputs,
                ..
            } => {
                self.subst.push_equation(*app_inputs, *t_inputs);
                self.subst.push_equation(*app_outputs, *t_outputs);
            }
            _ => self.fail(
                app_id,
                target_id,
                TypeErrorKind::UnificationFailure {
                    lhs: app_id,
                    rhs: target_id,
                },
                token,
            ),
        }
    }

    /// Deep-clones every node reachable from `scheme`'s body, substituting a
    /// fresh variable for each of its quantified params. Memoized within
    /// this single call so sharing inside the scheme body is preserved
    /// (spec §4.C.4).
    pub fn instantiate_scheme(&mut self, scheme_id: TypeId) -> TypeId {
        let (params, body) = match self.pool.get(scheme_id) {
            Term::Scheme { params, body } => (params.clone(), *body),
            _ => return scheme_id,
        };
        let mut fresh = FxHashMap::default();
        for p in params {
            fresh.insert(p, self.pool.fresh_variable());
        }
        let mut memo = FxHashMap::default();
        self.clone_term(body, &fresh, &mut memo)
    }

    /// Instantiates two schemes sharing one fresh-variable mapping keyed by
    /// parameter position, so a scheme unified against itself (a recursive
    /// function's own signature) produces consistent fresh variables on
    /// both sides instead of two independently-fresh copies that would then
    /// need re-equating pointlessly.
    fn instantiate_pair(&mut self, l: TypeId, r: TypeId) -> (TypeId, TypeId) {
        let (lparams, lbody) = match self.pool.get(l) {
            Term::Scheme { params, body } => (params.clone(), *body),
            _ => return (l, r),
        };
        let (rparams, rbody) = match self.pool.get(r) {
            Term::Scheme { params, body } => (params.clone(), *body),
            _ => return (l, r),
        };

        if lparams.len() != rparams.len() {
            return (self.instantiate_scheme(l), self.instantiate_scheme(r));
        }

        let mut lfresh = FxHashMap::default();
        let mut rfresh = FxHashMap::default();
        for (lp, rp) in lparams.iter().zip(rparams.iter()) {
            let shared = self.pool.fresh_variable();
            lfresh.insert(*lp, shared);
            rfresh.insert(*rp, shared);
        }
        let mut lmemo = FxHashMap::default();
        let mut rmemo = FxHashMap::default();
        let lout = self.clone_term(lbody, &lfresh, &mut lmemo);
        let rout = self.clone_term(rbody, &rfresh, &mut rmemo);
        (lout, rout)
    }

    fn clone_term(
        &mut self,
        id: TypeId,
        fresh: &FxHashMap<TypeId, TypeId>,
        memo: &mut FxHashMap<TypeId, TypeId>,
    ) -> TypeId {
        if let Some(&v) = fresh.get(&id) {
            return v;
        }
        if let Some(&cloned) = memo.get(&id) {
            return cloned;
        }
        // Pre-register a variable as the eventual clone target so cyclic
        // references within the body resolve back to this instantiation
        // rather than recursing forever.
        let placeholder = self.pool.fresh_variable();
        memo.insert(id, placeholder);

        let term = self.pool.get(id).clone();
        let cloned = match term {
            Term::Variable { name } => self.pool.alloc_variable(name),
            Term::Scalar { name, args } => {
                let args = args
                    .into_iter()
                    .map(|a| self.clone_term(a, fresh, memo))
                    .collect();
                self.pool.alloc_scalar(name, args)
            }
            Term::Tuple { elements } => {
                let elements = elements
                    .into_iter()
                    .map(|e| self.clone_term(e, fresh, memo))
                    .collect();
                self.pool.alloc_tuple(elements)
            }
            Term::DestructuredTuple { kind, members } => {
                let members = members
                    .into_iter()
                    .map(|m| self.clone_term(m, fresh, memo))
                    .collect();
                self.pool.alloc_destructured_tuple(kind, members)
            }
            Term::List { elements } => {
                let elements = elements
                    .into_iter()
                    .map(|e| self.clone_term(e, fresh, memo))
                    .collect();
                self.pool.alloc_list(elements)
            }
            Term::Union { members } => {
                let members = members
                    .into_iter()
                    .map(|m| self.clone_term(m, fresh, memo))
                    .collect();
                self.pool.alloc_union(members)
            }
            Term::Record { fields } => {
                let fields = fields
                    .into_iter()
                    .map(|f| (f.name, self.clone_term(f.value, fresh, memo)))
                    .collect();
                self.pool.alloc_record(fields)
            }
            Term::Class { name, source } => {
                let source = self.clone_term(source, fresh, memo);
                self.pool.alloc_class(name, source)
            }
            Term::Abstraction {
                inputs,
                outputs,
                kind,
            } => {
                let inputs = self.clone_term(inputs, fresh, memo);
                let outputs = self.clone_term(outputs, fresh, memo);
                self.pool.alloc_abstraction(inputs, outputs, kind)
            }
            // Nested schemes are not re-quantified during an outer
            // instantiation; only the variables free in the outer scheme
            // are substituted.
            Term::Scheme { params, body } => {
                let body = self.clone_term(body, fresh, memo);
                self.pool.alloc_scheme(params, body)
            }
            Term::Application {
                target,
                inputs,
                outputs,
            } => {
                let target = self.clone_term(target, fresh, memo);
                let inputs = self.clone_term(inputs, fresh, memo);
                let outputs = self.clone_term(outputs, fresh, memo);
                self.pool.alloc_application(target, inputs, outputs)
            }
            Term::Alias { name, target } => {
                let target = self.clone_term(target, fresh, memo);
                self.pool.alloc_alias(name, target)
            }
            Term::Parameters { scheme } => {
                let scheme = self.clone_term(scheme, fresh, memo);
                self.pool.alloc_parameters(scheme)
            }
            Term::ConstantValue { value } => self.pool.alloc_constant_value(value),
        };

        // The placeholder was a standalone fresh variable; bind it to the
        // real clone so any reference captured before `cloned` existed
        // still resolves correctly.
        self.subst.bind(placeholder, cloned);
        memo.insert(id, cloned);
        cloned
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mtype_ir::StringRegistry;

    fn well_known() -> (StringRegistry, WellKnownNames) {
        let registry = StringRegistry::new();
        let wk = WellKnownNames::intern(&registry);
        (registry, wk)
    }

    #[test]
    fn variable_binds_to_concrete_scalar() {
        let (registry, wk) = well_known();
        let mut pool = Pool::default();
        let mut subst = Substitution::new();
        let double = registry.register("double");
        let var = pool.fresh_variable();
        let scalar = pool.alloc_scalar(double, vec![]);
        subst.push_equation(var, scalar);

        let mut unifier = Unifier::new(&mut pool, &mut subst, wk);
        unifier.run();

        assert!(unifier.errors().is_empty());
        assert_eq!(subst.resolve(var), scalar);
    }

    #[test]
    fn mismatched_scalars_fail_and_poison() {
        let (registry, wk) = well_known();
        let mut pool = Pool::default();
        let mut subst = Substitution::new();
        let double = registry.register("double");
        let char_ = registry.register("char");
        let a = pool.alloc_scalar(double, vec![]);
        let b = pool.alloc_scalar(char_, vec![]);
        subst.push_equation(a, b);

        let mut unifier = Unifier::new(&mut pool, &mut subst, wk);
        unifier.run();

        assert_eq!(unifier.errors().len(), 1);
        assert!(unifier.is_poisoned(a));
        assert!(unifier.is_poisoned(b));
    }

    #[test]
    fn scheme_instantiation_produces_fresh_variables_each_time() {
        let (_registry, wk) = well_known();
        let mut pool = Pool::default();
        let mut subst = Substitution::new();
        let param = pool.fresh_variable();
        let dt = pool.alloc_destructured_tuple(DtKind::DefinitionInputs, vec![param]);
        let scheme = pool.alloc_scheme(vec![param], dt);

        let mut unifier = Unifier::new(&mut pool, &mut subst, wk);
        let first = unifier.instantiate_scheme(scheme);
        let second = unifier.instantiate_scheme(scheme);
        assert_ne!(first, second);
    }

    #[test]
    fn union_refines_to_the_unifiable_member() {
        let (registry, wk) = well_known();
        let mut pool = Pool::default();
        let mut subst = Substitution::new();
        let double = registry.register("double");
        let char_ = registry.register("char");
        let a = pool.alloc_scalar(double, vec![]);
        let b = pool.alloc_scalar(char_, vec![]);
        let union = pool.alloc_union(vec![a, b]);
        subst.push_equation(union, a);

        let mut unifier = Unifier::new(&mut pool, &mut subst, wk);
        unifier.run();

        assert!(unifier.errors().is_empty());
    }

    #[test]
    fn union_member_matching_only_at_the_top_level_tag_is_not_kept_as_a_survivor() {
        let (registry, wk) = well_known();
        let mut pool = Pool::default();
        let mut subst = Substitution::new();
        let list = registry.register("list");
        let double = registry.register("double");
        let char_ = registry.register("char");
        let logical = registry.register("logical");

        let double_scalar = pool.alloc_scalar(double, vec![]);
        let char_scalar = pool.alloc_scalar(char_, vec![]);
        let list_of_double = pool.alloc_scalar(list, vec![double_scalar]);
        let logical_scalar = pool.alloc_scalar(logical, vec![]);
        let union = pool.alloc_union(vec![list_of_double, logical_scalar]);

        // `list<double>` matches `list<char>` at the top-level scalar tag
        // (same name, same arity) but its element types never unify; the
        // other member doesn't match the tag at all. Neither should survive.
        let list_of_char = pool.alloc_scalar(list, vec![char_scalar]);
        subst.push_equation(union, list_of_char);

        let mut unifier = Unifier::new(&mut pool, &mut subst, wk);
        unifier.run();

        // Before the fix this produced two errors: the union wrongly kept
        // `list<double>` as a survivor, so the `double == char` equation it
        // deferred leaked onto the worklist and failed again under `run()`.
        assert_eq!(unifier.errors().len(), 1, "{:?}", unifier.errors());
        assert!(matches!(
            unifier.errors()[0].kind,
            TypeErrorKind::UnificationFailure { .. }
        ));
    }

    #[test]
    fn binding_a_variable_into_its_own_tuple_reports_recursive_type_but_still_binds() {
        let (_registry, wk) = well_known();
        let mut pool = Pool::default();
        let mut subst = Substitution::new();
        let var = pool.fresh_variable();
        let tuple = pool.alloc_tuple(vec![var]);
        subst.push_equation(var, tuple);

        let mut unifier = Unifier::new(&mut pool, &mut subst, wk);
        unifier.run();

        assert_eq!(unifier.errors().len(), 1);
        assert!(matches!(
            unifier.errors()[0].kind,
            TypeErrorKind::RecursiveType { .. }
        ));
        // The bind happens regardless — the unifier never forbids it.
        assert_eq!(subst.resolve(var), tuple);
    }

    #[test]
    fn a_self_referential_class_is_not_reported_as_recursive() {
        let (registry, wk) = well_known();
        let mut pool = Pool::default();
        let mut subst = Substitution::new();
        let name = registry.register("Node");
        let var = pool.fresh_variable();
        let class = pool.alloc_class(name, var);
        // The class's own type is its source; this is the normal shape for
        // a recursive class definition, not an infinite type.
        subst.push_equation(var, class);

        let mut unifier = Unifier::new(&mut pool, &mut subst, wk);
        unifier.run();

        assert!(unifier.errors().is_empty(), "{:?}", unifier.errors());
    }

    #[test]
    fn destructured_tuple_with_trailing_list_absorbs_extra_rvalues() {
        let (registry, wk) = well_known();
        let mut pool = Pool::default();
        let mut subst = Substitution::new();
        let double = registry.register("double");
        let param = pool.fresh_variable();
        let list = pool.alloc_list(vec![param]);
        let def_inputs = pool.alloc_destructured_tuple(DtKind::DefinitionInputs, vec![list]);

        let a = pool.alloc_scalar(double, vec![]);
        let b = pool.alloc_scalar(double, vec![]);
        let rvalues = pool.alloc_destructured_tuple(DtKind::Rvalue, vec![a, b]);
        subst.push_equation(def_inputs, rvalues);

        let mut unifier = Unifier::new(&mut pool, &mut subst, wk);
        unifier.run();

        assert!(unifier.errors().is_empty());
    }
}
