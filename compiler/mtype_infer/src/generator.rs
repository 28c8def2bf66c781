//! The constraint generator: walks a function/file body, producing
//! equations into a [`Substitution`] (spec §4.E).

use mtype_ir::ast::{
    AssignTarget, BinaryOp, Block, ClassDefNode, Expr, FunctionDefNode, IndexKind, Stmt, TypeNode,
};
use mtype_ir::{MatlabIdentifier, StringRegistry, Token, TypeScopeId, ValueScopeId};
use mtype_scope::ScopeArena;
use mtype_types::{AbstractionKind, DtKind, Pool, Substitution, TypeErrorKind, TypeId};

use crate::category::ValueCategory;
use crate::operators::OperatorLibrary;

type ValueScopes = ScopeArena<ValueScopeId, mtype_ir::StringId, TypeId>;
type TypeScopes = ScopeArena<TypeScopeId, mtype_ir::StringId, TypeId>;

pub struct ConstraintGenerator<'a> {
    pool: &'a mut Pool,
    subst: &'a mut Substitution,
    registry: &'a StringRegistry,
    operators: &'a OperatorLibrary,
    value_scopes: &'a mut ValueScopes,
    type_scopes: &'a TypeScopes,
    /// Rvalue identifiers that resolved to neither a local binding nor a
    /// lexically-enclosing one — candidates for cross-file resolution
    /// (spec §3.5), collected for the pipeline to turn into
    /// `mtype_defs::FunctionReference`s.
    unresolved_refs: Vec<(MatlabIdentifier, TypeId, Token)>,
}

impl<'a> ConstraintGenerator<'a> {
    pub fn new(
        pool: &'a mut Pool,
        subst: &'a mut Substitution,
        registry: &'a StringRegistry,
        operators: &'a OperatorLibrary,
        value_scopes: &'a mut ValueScopes,
        type_scopes: &'a TypeScopes,
    ) -> Self {
        Self {
            pool,
            subst,
            registry,
            operators,
            value_scopes,
            type_scopes,
            unresolved_refs: Vec::new(),
        }
    }

    /// Drains the rvalue identifiers this generation pass could not resolve
    /// locally. The pipeline turns each into a `FunctionReference` and
    /// retries it against definitions found in other files.
    pub fn take_unresolved_references(&mut self) -> Vec<(MatlabIdentifier, TypeId, Token)> {
        std::mem::take(&mut self.unresolved_refs)
    }

    pub fn generate_block(&mut self, scope: ValueScopeId, tscope: TypeScopeId, block: &Block) {
        for stmt in &block.stmts {
            self.generate_stmt(scope, tscope, stmt);
        }
    }

    fn generate_stmt(&mut self, scope: ValueScopeId, tscope: TypeScopeId, stmt: &Stmt) {
        match stmt {
            Stmt::Assign {
                targets,
                value,
                token,
                ..
            } => self.generate_assign(scope, tscope, targets, value, token),
            Stmt::Expr(expr) => {
                self.infer_expr(scope, tscope, ValueCategory::Rvalue, expr);
            }
            Stmt::If {
                branches,
                else_branch,
                ..
            } => {
                for (cond, body) in branches {
                    self.check_condition(scope, tscope, cond);
                    self.generate_block(scope, tscope, body);
                }
                if let Some(body) = else_branch {
                    self.generate_block(scope, tscope, body);
                }
            }
            Stmt::For {
                var,
                iterable,
                body,
                ..
            } => {
                let iterable_ty = self.infer_expr(scope, tscope, ValueCategory::Rvalue, iterable);
                let loop_var = self.pool.fresh_variable();
                // Iterating a `list<T>` binds the loop variable to `T`;
                // iterating anything else binds it to the whole value
                // (a single-column matrix loop, the common MATLAB case).
                self.subst.push_equation(loop_var, iterable_ty);
                self.define_local(scope, *var, loop_var);
                self.generate_block(scope, tscope, body);
            }
            Stmt::While { cond, body, .. } => {
                self.check_condition(scope, tscope, cond);
                self.generate_block(scope, tscope, body);
            }
            Stmt::Try {
                body,
                catch_var,
                catch_body,
                ..
            } => {
                self.generate_block(scope, tscope, body);
                if let Some(var) = catch_var {
                    let err_ty = self.pool.alloc_scalar(self.registry.register("MException"), vec![]);
                    self.define_local(scope, *var, err_ty);
                }
                self.generate_block(scope, tscope, catch_body);
            }
            Stmt::Return { .. } | Stmt::Break { .. } | Stmt::Continue { .. } => {}
            Stmt::ModuleUse(_) => {}
            Stmt::FunctionDef(def) => {
                self.generate_function_def(scope, def);
            }
            Stmt::ClassDef(def) => {
                self.generate_class_def(scope, def);
            }
            Stmt::TypeAnnot(_) => {}
        }
    }

    fn check_condition(&mut self, scope: ValueScopeId, tscope: TypeScopeId, cond: &Expr) {
        let cond_ty = self.infer_expr(scope, tscope, ValueCategory::Rvalue, cond);
        let logical = self.pool.alloc_scalar(self.operators.logical, vec![]);
        self.subst.push_equation(cond_ty, logical);
    }

    fn generate_assign(
        &mut self,
        scope: ValueScopeId,
        tscope: TypeScopeId,
        targets: &[AssignTarget],
        value: &Expr,
        _token: &Token,
    ) {
        let value_ty = self.infer_expr(scope, tscope, ValueCategory::Rvalue, value);

        if targets.len() == 1 {
            self.bind_target(scope, tscope, &targets[0], value_ty);
            return;
        }

        let target_vars: Vec<TypeId> = targets.iter().map(|_| self.pool.fresh_variable()).collect();
        let lhs_dt = self
            .pool
            .alloc_destructured_tuple(DtKind::Lvalue, target_vars.clone());
        self.subst.push_equation(lhs_dt, value_ty);
        for (target, var) in targets.iter().zip(target_vars) {
            self.bind_target(scope, tscope, target, var);
        }
    }

    fn bind_target(
        &mut self,
        scope: ValueScopeId,
        tscope: TypeScopeId,
        target: &AssignTarget,
        value_ty: TypeId,
    ) {
        match target {
            AssignTarget::Var { ident, .. } => {
                self.define_local(scope, *ident, value_ty);
            }
            AssignTarget::Index { target, args, .. } => {
                let target_ty = self.infer_expr(scope, tscope, ValueCategory::Lvalue, target);
                for arg in args {
                    self.infer_expr(scope, tscope, ValueCategory::Rvalue, arg);
                }
                let result = self.apply_application(self.operators.subsasgn(), vec![target_ty, value_ty]);
                self.subst.push_equation(result, target_ty);
            }
            AssignTarget::Field { base, .. } => {
                // Field assignment refines the base's record type; approximated
                // as a fresh unification target rather than true row typing.
                let base_ty = self.infer_expr(scope, tscope, ValueCategory::Lvalue, base);
                self.subst.push_equation(base_ty, value_ty);
            }
            AssignTarget::Ignored { .. } => {}
        }
    }

    fn define_local(&mut self, scope: ValueScopeId, ident: MatlabIdentifier, ty: TypeId) {
        self.value_scopes
            .define_local(scope, ident.full_name(), ty, Token::synthetic("_"));
    }

    fn infer_expr(
        &mut self,
        scope: ValueScopeId,
        tscope: TypeScopeId,
        category: ValueCategory,
        expr: &Expr,
    ) -> TypeId {
        match expr {
            Expr::Number { .. } => self.pool.alloc_scalar(self.operators.double, vec![]),
            Expr::Char { .. } => {
                let char_name = self.registry.register("char");
                self.pool.alloc_scalar(char_name, vec![])
            }
            Expr::Str { .. } => {
                let string_name = self.registry.register("string");
                self.pool.alloc_scalar(string_name, vec![])
            }
            Expr::Bool { .. } => self.pool.alloc_scalar(self.operators.logical, vec![]),
            Expr::Var { ident, token, .. } => self.resolve_var(scope, *ident, token, category),
            Expr::Unary { op, operand, .. } => {
                let operand_ty = self.infer_expr(scope, tscope, ValueCategory::Rvalue, operand);
                self.apply_application(self.operators.unary_scheme(*op), vec![operand_ty])
            }
            Expr::Binary { op, lhs, rhs, .. } => {
                let lhs_ty = self.infer_expr(scope, tscope, ValueCategory::Rvalue, lhs);
                let rhs_ty = self.infer_expr(scope, tscope, ValueCategory::Rvalue, rhs);
                self.infer_binary(*op, lhs_ty, rhs_ty)
            }
            Expr::Call { callee, args, .. } => {
                let target_ty = self.resolve_callee(scope, tscope, callee);
                let arg_tys: Vec<TypeId> = args
                    .iter()
                    .map(|a| self.infer_expr(scope, tscope, ValueCategory::Rvalue, a))
                    .collect();
                self.apply_application(target_ty, arg_tys)
            }
            Expr::Index { target, kind, args, .. } => {
                let target_ty = self.infer_expr(scope, tscope, ValueCategory::Rvalue, target);
                for arg in args {
                    self.infer_expr(scope, tscope, ValueCategory::Rvalue, arg);
                }
                // Brace- and paren-indexing share one `subsref` signature here;
                // cell-specific unwrapping is out of scope.
                let _ = kind;
                let index_ty = self.pool.fresh_variable();
                self.apply_application(self.operators.subsref(), vec![target_ty, index_ty])
            }
            Expr::Field { base, .. } => {
                // Field-access typing needs the class/record system; a
                // fresh variable lets unification downstream still connect
                // consistent uses of the same field.
                self.infer_expr(scope, tscope, ValueCategory::Rvalue, base);
                self.pool.fresh_variable()
            }
            Expr::Anonymous {
                params,
                body,
                value_scope,
                ..
            } => self.infer_anonymous(tscope, params, body, *value_scope),
            Expr::ConcatList { elements, .. } => {
                let elem_tys: Vec<TypeId> = elements
                    .iter()
                    .map(|e| self.infer_expr(scope, tscope, ValueCategory::Rvalue, e))
                    .collect();
                let list = self.pool.alloc_list(elem_tys);
                self.apply_application(self.operators.concatenation(), vec![list])
            }
            Expr::Colon { .. } => self.pool.fresh_variable(),
            Expr::EndOfIndex { .. } => self.pool.alloc_scalar(self.operators.double, vec![]),
        }
    }

    fn infer_binary(&mut self, op: BinaryOp, lhs_ty: TypeId, rhs_ty: TypeId) -> TypeId {
        self.apply_application(self.operators.binary_scheme(op), vec![lhs_ty, rhs_ty])
    }

    fn infer_anonymous(
        &mut self,
        tscope: TypeScopeId,
        params: &[MatlabIdentifier],
        body: &Expr,
        value_scope: ValueScopeId,
    ) -> TypeId {
        let param_vars: Vec<TypeId> = params.iter().map(|_| self.pool.fresh_variable()).collect();
        for (param, var) in params.iter().zip(&param_vars) {
            self.define_local(value_scope, *param, *var);
        }
        let body_ty = self.infer_expr(value_scope, tscope, ValueCategory::Rvalue, body);
        let inputs = self
            .pool
            .alloc_destructured_tuple(DtKind::DefinitionInputs, param_vars.clone());
        let outputs = self
            .pool
            .alloc_destructured_tuple(DtKind::DefinitionOutputs, vec![body_ty]);
        self.pool
            .alloc_abstraction(inputs, outputs, AbstractionKind::Anonymous)
    }

    /// Resolves a bare identifier. If it is a known local, returns its
    /// type; on the rvalue side, an unknown identifier is treated as a
    /// niladic call (the MATLAB "bare name is a function call" rule); on
    /// the lvalue side it introduces a fresh binding.
    fn resolve_var(
        &mut self,
        scope: ValueScopeId,
        ident: MatlabIdentifier,
        token: &Token,
        category: ValueCategory,
    ) -> TypeId {
        if let Some(ty) = mtype_scope::lookup_value(self.value_scopes, scope, &ident.full_name()) {
            return *ty;
        }
        match category {
            ValueCategory::Lvalue => {
                let fresh = self.pool.fresh_variable();
                self.define_local(scope, ident, fresh);
                fresh
            }
            ValueCategory::Rvalue => {
                // `target` is what an external definition's type gets
                // unified against once the pipeline resolves `ident`
                // (spec §4.C.5); `result` is the call's own output.
                let target = self.pool.fresh_variable();
                self.unresolved_refs.push((ident, target, token.clone()));
                self.apply_application(target, Vec::new())
            }
        }
    }

    /// Resolves a call site's callee. A bare name in callee position binds
    /// directly to the call's `Application` target rather than going
    /// through [`Self::resolve_var`]'s implicit-niladic-call wrapping —
    /// `b(x)` is one call, not a call of a call.
    fn resolve_callee(&mut self, scope: ValueScopeId, tscope: TypeScopeId, callee: &Expr) -> TypeId {
        if let Expr::Var { ident, token, .. } = callee {
            if let Some(ty) = mtype_scope::lookup_value(self.value_scopes, scope, &ident.full_name())
            {
                return *ty;
            }
            let target = self.pool.fresh_variable();
            self.unresolved_refs.push((*ident, target, token.clone()));
            return target;
        }
        self.infer_expr(scope, tscope, ValueCategory::Rvalue, callee)
    }

    fn generate_function_def(&mut self, parent_scope: ValueScopeId, def: &FunctionDefNode) {
        let output_vars: Vec<TypeId> = def
            .header
            .outputs
            .iter()
            .map(|_| self.pool.fresh_variable())
            .collect();
        for (name, var) in def.header.outputs.iter().zip(&output_vars) {
            self.define_local(def.value_scope, *name, *var);
        }
        let input_vars: Vec<TypeId> = def
            .header
            .inputs
            .iter()
            .map(|_| self.pool.fresh_variable())
            .collect();
        for (param, var) in def.header.inputs.iter().zip(&input_vars) {
            if let Some(name) = param.name {
                self.define_local(def.value_scope, name, *var);
            }
        }

        // Bind the function's own name before walking its body, so a
        // self-recursive call (`y = r(x)` inside `function y = r(x)`)
        // resolves against this signature instead of being flagged
        // unresolved.
        let inputs = self
            .pool
            .alloc_destructured_tuple(DtKind::DefinitionInputs, input_vars.clone());
        let outputs = self
            .pool
            .alloc_destructured_tuple(DtKind::DefinitionOutputs, output_vars.clone());
        let abstraction = self
            .pool
            .alloc_abstraction(inputs, outputs, AbstractionKind::Function);
        // Quantify over every fresh variable this signature introduced —
        // inputs *and* outputs — so a free return type generalizes the same
        // way a free parameter does (spec §8 scenario 4: `r :: ∀α,β. α → β`).
        let mut scheme_params: Vec<TypeId> = input_vars;
        scheme_params.extend(output_vars);
        let fn_ty = self.pool.alloc_scheme(scheme_params, abstraction);
        self.define_local(parent_scope, def.header.name, fn_ty);

        self.generate_block(def.value_scope, def.type_scope, &def.body);

        if let Some(declared) = &def.declared_type {
            let declared_ty = self.resolve_type_node(def.type_scope, declared);
            self.subst.push_equation(fn_ty, declared_ty);
        }
    }

    fn generate_class_def(&mut self, parent_scope: ValueScopeId, def: &ClassDefNode) {
        let tscope = def.type_scope;
        let fields = def
            .properties
            .iter()
            .map(|prop| {
                let ty = match &prop.declared_type {
                    Some(node) => self.resolve_type_node(tscope, node),
                    None => self.pool.fresh_variable(),
                };
                (mtype_ir::TypeIdentifier::new(prop.name.full_name()), ty)
            })
            .collect();
        let record = self.pool.alloc_record(fields);
        let name = def.name.full_name();
        let class_ty = self.pool.alloc_class(name, record);
        self.define_local(parent_scope, def.name, class_ty);

        for method in &def.method_defs {
            self.generate_function_def(def.value_scope, method);
        }
    }

    fn resolve_type_node(&mut self, tscope: TypeScopeId, node: &TypeNode) -> TypeId {
        match node {
            TypeNode::Scalar { identifier, args, .. } => {
                if args.is_empty() {
                    if let Some(ty) = mtype_scope::lookup_type(self.type_scopes, tscope, &identifier.id())
                    {
                        return *ty;
                    }
                }
                let arg_tys: Vec<TypeId> = args.iter().map(|a| self.resolve_type_node(tscope, a)).collect();
                self.pool.alloc_scalar(identifier.id(), arg_tys)
            }
            TypeNode::Function { inputs, outputs, .. } => {
                let in_tys: Vec<TypeId> =
                    inputs.iter().map(|n| self.resolve_type_node(tscope, n)).collect();
                let out_tys: Vec<TypeId> =
                    outputs.iter().map(|n| self.resolve_type_node(tscope, n)).collect();
                let dt_in = self.pool.alloc_destructured_tuple(DtKind::DefinitionInputs, in_tys);
                let dt_out = self
                    .pool
                    .alloc_destructured_tuple(DtKind::DefinitionOutputs, out_tys);
                self.pool.alloc_abstraction(dt_in, dt_out, AbstractionKind::Function)
            }
            TypeNode::Record { fields, .. } => {
                let fields = fields
                    .iter()
                    .map(|f| (f.name, self.resolve_type_node(tscope, &f.ty)))
                    .collect();
                self.pool.alloc_record(fields)
            }
            TypeNode::Tuple { elements, .. } => {
                let tys = elements.iter().map(|e| self.resolve_type_node(tscope, e)).collect();
                self.pool.alloc_tuple(tys)
            }
            TypeNode::Union { members, .. } => {
                let tys = members.iter().map(|m| self.resolve_type_node(tscope, m)).collect();
                self.pool.alloc_union(tys)
            }
        }
    }

    /// Builds an `Application` term for a call site and pushes the equation
    /// that lets the unifier instantiate `target` (if it's a scheme) or
    /// unify directly (if it's already an `Abstraction`), per spec §4.C.2's
    /// `App, A`/`App, Σ` rows.
    fn apply_application(&mut self, target: TypeId, args: Vec<TypeId>) -> TypeId {
        let inputs = self.pool.alloc_destructured_tuple(DtKind::Rvalue, args);
        let result = self.pool.fresh_variable();
        let outputs = self
            .pool
            .alloc_destructured_tuple(DtKind::Rvalue, vec![result]);
        let application = self.pool.alloc_application(target, inputs, outputs);
        self.subst.push_equation(application, target);
        result
    }
}

/// Diagnoses free (unresolved) type variables left in a top-level
/// signature after unification has run to a fixed point (spec §4.E closing
/// paragraph, §4.C.5).
pub fn could_not_infer_type(
    pool: &Pool,
    subst: &Substitution,
    ty: TypeId,
    kind_string: &str,
) -> Option<TypeErrorKind> {
    let resolved = subst.resolve(ty);
    match pool.get(resolved) {
        mtype_types::Term::Variable { .. } => Some(TypeErrorKind::CouldNotInferType {
            site: resolved,
            kind_string: kind_string.to_string(),
        }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mtype_ir::ast::{FunctionHeader, FunctionInputParameter, MethodAttributes};
    use mtype_ir::{NodeIdGen, StringRegistry};
    use mtype_types::{Term, Unifier, WellKnownNames};

    fn scopes() -> (ValueScopes, TypeScopes) {
        (ValueScopes::new(), TypeScopes::new())
    }

    #[test]
    fn assigning_a_number_literal_binds_the_variable_to_double() {
        let registry = StringRegistry::new();
        let mut pool = Pool::default();
        let mut subst = Substitution::new();
        let operators = OperatorLibrary::build(&mut pool, &registry);
        let (mut value_scopes, mut type_scopes) = scopes();
        let scope = value_scopes.new_scope(None);
        let tscope = type_scopes.new_scope(None);

        let mut idgen = NodeIdGen::default();
        let ident = MatlabIdentifier::simple(registry.register("x"));
        let block = Block {
            stmts: vec![Stmt::Assign {
                targets: vec![AssignTarget::Var {
                    ident,
                    token: Token::synthetic("x"),
                    id: idgen.next(),
                }],
                value: Expr::Number {
                    value: 1.0,
                    id: idgen.next(),
                },
                token: Token::synthetic("="),
                id: idgen.next(),
            }],
        };

        {
            let mut gen = ConstraintGenerator::new(
                &mut pool,
                &mut subst,
                &registry,
                &operators,
                &mut value_scopes,
                &type_scopes,
            );
            gen.generate_block(scope, tscope, &block);
        }

        let x_ty = *mtype_scope::lookup_value(&value_scopes, scope, &ident.full_name()).unwrap();
        match pool.get(x_ty) {
            Term::Scalar { name, args } => {
                assert_eq!(*name, registry.register("double"));
                assert!(args.is_empty());
            }
            other => panic!("expected a scalar double, got {other:?}"),
        }
    }

    #[test]
    fn binary_addition_unifies_to_double_end_to_end() {
        let registry = StringRegistry::new();
        let mut pool = Pool::default();
        let mut subst = Substitution::new();
        let operators = OperatorLibrary::build(&mut pool, &registry);
        let (mut value_scopes, mut type_scopes) = scopes();
        let scope = value_scopes.new_scope(None);
        let tscope = type_scopes.new_scope(None);

        let mut idgen = NodeIdGen::default();
        let ident = MatlabIdentifier::simple(registry.register("y"));
        let block = Block {
            stmts: vec![Stmt::Assign {
                targets: vec![AssignTarget::Var {
                    ident,
                    token: Token::synthetic("y"),
                    id: idgen.next(),
                }],
                value: Expr::Binary {
                    op: BinaryOp::Add,
                    lhs: Box::new(Expr::Number {
                        value: 1.0,
                        id: idgen.next(),
                    }),
                    rhs: Box::new(Expr::Number {
                        value: 2.0,
                        id: idgen.next(),
                    }),
                    token: Token::synthetic("+"),
                    id: idgen.next(),
                },
                token: Token::synthetic("="),
                id: idgen.next(),
            }],
        };

        let y_ty = {
            let mut gen = ConstraintGenerator::new(
                &mut pool,
                &mut subst,
                &registry,
                &operators,
                &mut value_scopes,
                &type_scopes,
            );
            gen.generate_block(scope, tscope, &block);
            *mtype_scope::lookup_value(&value_scopes, scope, &ident.full_name()).unwrap()
        };

        let wk = WellKnownNames::intern(&registry);
        let mut unifier = Unifier::new(&mut pool, &mut subst, wk);
        unifier.run();
        assert!(unifier.errors().is_empty());

        let resolved = subst.resolve(y_ty);
        match pool.get(resolved) {
            Term::Scalar { name, .. } => assert_eq!(*name, registry.register("double")),
            other => panic!("expected double, got {other:?}"),
        }
    }

    #[test]
    fn unresolved_rvalue_identifier_is_flagged_as_could_not_infer() {
        let registry = StringRegistry::new();
        let mut pool = Pool::default();
        let mut subst = Substitution::new();
        let operators = OperatorLibrary::build(&mut pool, &registry);
        let (mut value_scopes, mut type_scopes) = scopes();
        let scope = value_scopes.new_scope(None);
        let tscope = type_scopes.new_scope(None);

        let mut idgen = NodeIdGen::default();
        let ident = MatlabIdentifier::simple(registry.register("undefined_fn"));
        let expr = Expr::Var {
            ident,
            token: Token::synthetic("undefined_fn"),
            id: idgen.next(),
        };

        let ty = {
            let mut gen = ConstraintGenerator::new(
                &mut pool,
                &mut subst,
                &registry,
                &operators,
                &mut value_scopes,
                &type_scopes,
            );
            gen.infer_expr(scope, tscope, ValueCategory::Rvalue, &expr)
        };

        let wk = WellKnownNames::intern(&registry);
        let mut unifier = Unifier::new(&mut pool, &mut subst, wk);
        unifier.run();

        assert!(could_not_infer_type(&pool, &subst, ty, "value").is_some());
    }

    #[test]
    fn destructured_assignment_binds_each_target() {
        let registry = StringRegistry::new();
        let mut pool = Pool::default();
        let mut subst = Substitution::new();
        let operators = OperatorLibrary::build(&mut pool, &registry);
        let (mut value_scopes, mut type_scopes) = scopes();
        let scope = value_scopes.new_scope(None);
        let tscope = type_scopes.new_scope(None);

        let mut idgen = NodeIdGen::default();
        let a = MatlabIdentifier::simple(registry.register("a"));
        let b = MatlabIdentifier::simple(registry.register("b"));
        let rhs_ident = MatlabIdentifier::simple(registry.register("pair"));

        let block = Block {
            stmts: vec![Stmt::Assign {
                targets: vec![
                    AssignTarget::Var {
                        ident: a,
                        token: Token::synthetic("a"),
                        id: idgen.next(),
                    },
                    AssignTarget::Var {
                        ident: b,
                        token: Token::synthetic("b"),
                        id: idgen.next(),
                    },
                ],
                value: Expr::Var {
                    ident: rhs_ident,
                    token: Token::synthetic("pair"),
                    id: idgen.next(),
                },
                token: Token::synthetic("="),
                id: idgen.next(),
            }],
        };

        {
            let mut gen = ConstraintGenerator::new(
                &mut pool,
                &mut subst,
                &registry,
                &operators,
                &mut value_scopes,
                &type_scopes,
            );
            gen.generate_block(scope, tscope, &block);
        }

        assert!(mtype_scope::lookup_value(&value_scopes, scope, &a.full_name()).is_some());
        assert!(mtype_scope::lookup_value(&value_scopes, scope, &b.full_name()).is_some());
    }

    /// `function y = r(x); y = r(x); end` — the self-call inside the body
    /// must resolve against `r`'s own signature, not be flagged as an
    /// unresolved external reference.
    #[test]
    fn a_function_can_call_itself() {
        let registry = StringRegistry::new();
        let mut pool = Pool::default();
        let mut subst = Substitution::new();
        let operators = OperatorLibrary::build(&mut pool, &registry);
        let (mut value_scopes, mut type_scopes) = scopes();
        let parent_scope = value_scopes.new_scope(None);
        let parent_tscope = type_scopes.new_scope(None);
        let fn_value_scope = value_scopes.new_scope(Some(parent_scope));
        let fn_type_scope = type_scopes.new_scope(Some(parent_tscope));

        let mut idgen = NodeIdGen::default();
        let r = MatlabIdentifier::simple(registry.register("r"));
        let x = MatlabIdentifier::simple(registry.register("x"));
        let y = MatlabIdentifier::simple(registry.register("y"));

        let self_call = Stmt::Assign {
            targets: vec![AssignTarget::Var {
                ident: y,
                token: Token::synthetic("y"),
                id: idgen.next(),
            }],
            value: Expr::Call {
                callee: Box::new(Expr::Var {
                    ident: r,
                    token: Token::synthetic("r"),
                    id: idgen.next(),
                }),
                args: vec![Expr::Var {
                    ident: x,
                    token: Token::synthetic("x"),
                    id: idgen.next(),
                }],
                token: Token::synthetic("r(x)"),
                id: idgen.next(),
            },
            token: Token::synthetic("="),
            id: idgen.next(),
        };

        let def = FunctionDefNode {
            header: FunctionHeader {
                name: r,
                name_token: Token::synthetic("r"),
                outputs: vec![y],
                inputs: vec![FunctionInputParameter { name: Some(x) }],
            },
            body: Block {
                stmts: vec![self_call],
            },
            attributes: MethodAttributes::default(),
            value_scope: fn_value_scope,
            type_scope: fn_type_scope,
            declared_type: None,
            id: idgen.next(),
        };

        let unresolved = {
            let mut gen = ConstraintGenerator::new(
                &mut pool,
                &mut subst,
                &registry,
                &operators,
                &mut value_scopes,
                &type_scopes,
            );
            gen.generate_function_def(parent_scope, &def);
            gen.take_unresolved_references()
        };

        assert!(
            unresolved.iter().all(|(ident, ..)| *ident != r),
            "self-call should not be treated as an unresolved external reference"
        );

        let wk = WellKnownNames::intern(&registry);
        let mut unifier = Unifier::new(&mut pool, &mut subst, wk);
        unifier.run();
        assert!(unifier.errors().is_empty());
    }
}
