//! Seeds root identifiers — names the caller asked to compile, supplied on
//! the command line rather than found by walking an AST — as pending
//! external references before any file is visited (spec §4.F: "root
//! identifiers... are seeded as external functions before step 1").

use mtype_ir::{MatlabIdentifier, StringRegistry, Token};
use mtype_types::{Pool, TypeId};

/// One root identifier, with a synthetic token (no real source file — see
/// `CodeFileDescriptor::anonymous`) and fresh target variable already
/// attached — the same shape `ConstraintGenerator::take_unresolved_references`
/// produces for an in-file unresolved reference, so the pipeline's
/// resolution loop can treat both uniformly.
pub struct PreImport {
    pub identifier: MatlabIdentifier,
    pub target: TypeId,
    pub token: Token,
}

pub fn seed_roots(names: &[String], registry: &StringRegistry, pool: &mut Pool) -> Vec<PreImport> {
    names
        .iter()
        .map(|name| PreImport {
            identifier: MatlabIdentifier::simple(registry.register(name)),
            target: pool.fresh_variable(),
            token: Token::synthetic(name.clone()),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeds_one_pre_import_per_root_name() {
        let registry = StringRegistry::new();
        let mut pool = Pool::default();
        let roots = seed_roots(&["a".to_string(), "b".to_string()], &registry, &mut pool);
        assert_eq!(roots.len(), 2);
        assert_ne!(roots[0].target, roots[1].target);
    }
}
