//! The builtin library: the operator table plus the primitive scalar names
//! exported from a shared `base` type scope every file imports (spec §6.2).

use mtype_ir::{StringId, StringRegistry, TypeScopeId};
use mtype_scope::{ScopeArena, TypeScopeArena};
use mtype_types::{Pool, TypeId};

use mtype_infer::OperatorLibrary;

pub type TypeScopes = TypeScopeArena<TypeScopeId, StringId, TypeId>;

pub struct Library {
    pub operators: OperatorLibrary,
    pub double: StringId,
    pub char_: StringId,
    pub string: StringId,
    pub logical: StringId,
    pub base_type_scope: TypeScopeId,
}

impl Library {
    pub fn build(pool: &mut Pool, registry: &StringRegistry, type_scopes: &mut TypeScopes) -> Self {
        let operators = OperatorLibrary::build(pool, registry);
        let double = operators.double;
        let logical = operators.logical;
        let char_ = registry.register("char");
        let string = registry.register("string");

        let base_type_scope = type_scopes.new_scope(None);
        for name in [double, char_, string, logical] {
            let ty = pool.alloc_scalar(name, vec![]);
            type_scopes.define_local(base_type_scope, name, ty, mtype_ir::Token::synthetic("_"));
            type_scopes.export(base_type_scope, name);
        }

        Self {
            operators,
            double,
            char_,
            string,
            logical,
            base_type_scope,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_scope_exports_the_primitive_scalars() {
        let registry = StringRegistry::new();
        let mut pool = Pool::default();
        let mut type_scopes = TypeScopes::new();
        let lib = Library::build(&mut pool, &registry, &mut type_scopes);

        let user = type_scopes.new_scope(None);
        type_scopes.add_import(user, lib.base_type_scope, true, mtype_ir::Token::synthetic("_"));

        assert!(mtype_scope::lookup_type(&type_scopes, user, &lib.double).is_some());
        assert!(mtype_scope::lookup_type(&type_scopes, user, &lib.char_).is_some());
    }
}
