//! Type scopes: local bindings, then imported scopes' exports, then the
//! lexical parent — each step cycle-guarded, directly modeled on
//! `type_scope.cpp`'s `lookup_type`/`lookup_exported_type`.

use std::hash::Hash;

use rustc_hash::FxHashSet;

use crate::error::ScopeError;
use crate::handle::ScopeHandle;
use crate::scope::ScopeArena;

pub type TypeScopeArena<Id, K, V> = ScopeArena<Id, K, V>;

/// Full lookup: local, then imports (recursively, via their exports), then
/// the lexical parent.
pub fn lookup_type<Id, K, V>(arena: &ScopeArena<Id, K, V>, id: Id, key: &K) -> Option<&V>
where
    Id: ScopeHandle,
    K: Copy + Eq + Hash,
    V: Clone,
{
    let mut visited = FxHashSet::default();
    lookup_type_guarded(arena, id, key, &mut visited)
}

fn lookup_type_guarded<Id, K, V>(
    arena: &ScopeArena<Id, K, V>,
    id: Id,
    key: &K,
    visited: &mut FxHashSet<Id>,
) -> Option<&V>
where
    Id: ScopeHandle,
    K: Copy + Eq + Hash,
    V: Clone,
{
    if !visited.insert(id) {
        return None;
    }
    if let Some((value, _)) = arena.lookup_local(id, key) {
        return Some(value);
    }
    for import in &arena.node(id).imports {
        if let Some(value) = lookup_exported_type(arena, import.source, key, visited) {
            return Some(value);
        }
    }
    match arena.node(id).parent {
        Some(parent) => lookup_type_guarded(arena, parent, key, visited),
        None => None,
    }
}

/// Looks up `key` among `id`'s *exported* bindings only, following `id`'s own
/// imports transitively — an imported scope's imports are themselves
/// visible, but its non-exported locals are not.
fn lookup_exported_type<Id, K, V>(
    arena: &ScopeArena<Id, K, V>,
    id: Id,
    key: &K,
    visited: &mut FxHashSet<Id>,
) -> Option<&V>
where
    Id: ScopeHandle,
    K: Copy + Eq + Hash,
    V: Clone,
{
    if !visited.insert(id) {
        return None;
    }
    if arena.node(id).exports.contains(key) {
        if let Some((value, _)) = arena.lookup_local(id, key) {
            return Some(value);
        }
    }
    for import in &arena.node(id).imports {
        if !import.is_exported {
            continue;
        }
        if let Some(value) = lookup_exported_type(arena, import.source, key, visited) {
            return Some(value);
        }
    }
    None
}

/// Eagerly checks `id`'s import set for identifiers that resolve to more
/// than one distinct binding — the error `type_import_resolution.cpp`
/// reports as "duplicate type identifier", citing whichever binding the
/// cycle-guarded walk reached first.
pub fn resolve_imports<Id, K, V>(arena: &ScopeArena<Id, K, V>, id: Id) -> Result<(), ScopeError>
where
    Id: ScopeHandle,
    K: Copy + Eq + Hash,
    V: Clone,
{
    let mut seen = rustc_hash::FxHashMap::default();
    let mut visited = FxHashSet::default();
    for import in &arena.node(id).imports {
        collect_exports(arena, import.source, &mut seen, &mut visited)?;
    }
    Ok(())
}

fn collect_exports<Id, K, V>(
    arena: &ScopeArena<Id, K, V>,
    id: Id,
    seen: &mut rustc_hash::FxHashMap<K, mtype_ir::Token>,
    visited: &mut FxHashSet<Id>,
) -> Result<(), ScopeError>
where
    Id: ScopeHandle,
    K: Copy + Eq + Hash,
    V: Clone,
{
    if !visited.insert(id) {
        return Ok(());
    }
    for key in &arena.node(id).exports {
        if let Some((_, token)) = arena.lookup_local(id, key) {
            if let Some(first) = seen.get(key) {
                return Err(ScopeError::DuplicateTypeIdentifier {
                    first: first.clone(),
                    second: token.clone(),
                });
            }
            seen.insert(*key, token.clone());
        }
    }
    for import in &arena.node(id).imports {
        if !import.is_exported {
            continue;
        }
        collect_exports(arena, import.source, seen, visited)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mtype_ir::{Token, TypeScopeId};

    fn tok() -> Token {
        Token::synthetic("Foo")
    }

    #[test]
    fn lookup_finds_imported_export() {
        let mut arena: TypeScopeArena<TypeScopeId, u32, &'static str> = ScopeArena::new();
        let lib = arena.new_scope(None);
        arena.define_local(lib, 1, "double", tok());
        arena.export(lib, 1);

        let user = arena.new_scope(None);
        arena.add_import(user, lib, true, tok());

        assert_eq!(lookup_type(&arena, user, &1), Some(&"double"));
    }

    #[test]
    fn non_exported_local_is_invisible_through_import() {
        let mut arena: TypeScopeArena<TypeScopeId, u32, &'static str> = ScopeArena::new();
        let lib = arena.new_scope(None);
        arena.define_local(lib, 1, "double", tok());
        // not exported

        let user = arena.new_scope(None);
        arena.add_import(user, lib, true, tok());

        assert_eq!(lookup_type(&arena, user, &1), None);
    }

    #[test]
    fn import_cycle_terminates() {
        let mut arena: TypeScopeArena<TypeScopeId, u32, &'static str> = ScopeArena::new();
        let a = arena.new_scope(None);
        let b = arena.new_scope(None);
        arena.add_import(a, b, true, tok());
        arena.add_import(b, a, true, tok());

        assert_eq!(lookup_type(&arena, a, &1), None);
    }

    #[test]
    fn non_exported_import_is_not_transitively_reexported() {
        let mut arena: TypeScopeArena<TypeScopeId, u32, &'static str> = ScopeArena::new();
        let lib = arena.new_scope(None);
        arena.define_local(lib, 1, "double", tok());
        arena.export(lib, 1);

        // `middle` imports `lib` privately (not re-exported).
        let middle = arena.new_scope(None);
        arena.add_import(middle, lib, false, tok());

        // `user` imports `middle`; `lib`'s export should not flow through,
        // because `middle`'s own import of `lib` was not marked exported.
        let user = arena.new_scope(None);
        arena.add_import(user, middle, true, tok());

        assert_eq!(lookup_type(&arena, user, &1), None);
    }

    #[test]
    fn exported_import_chains_transitively() {
        let mut arena: TypeScopeArena<TypeScopeId, u32, &'static str> = ScopeArena::new();
        let lib = arena.new_scope(None);
        arena.define_local(lib, 1, "double", tok());
        arena.export(lib, 1);

        let middle = arena.new_scope(None);
        arena.add_import(middle, lib, true, tok());

        let user = arena.new_scope(None);
        arena.add_import(user, middle, true, tok());

        assert_eq!(lookup_type(&arena, user, &1), Some(&"double"));
    }

    #[test]
    fn duplicate_export_across_imports_is_an_error() {
        let mut arena: TypeScopeArena<TypeScopeId, u32, &'static str> = ScopeArena::new();
        let lib_a = arena.new_scope(None);
        arena.define_local(lib_a, 1, "double", tok());
        arena.export(lib_a, 1);

        let lib_b = arena.new_scope(None);
        arena.define_local(lib_b, 1, "char", tok());
        arena.export(lib_b, 1);

        let user = arena.new_scope(None);
        arena.add_import(user, lib_a, true, tok());
        arena.add_import(user, lib_b, true, tok());

        assert!(matches!(
            resolve_imports(&arena, user),
            Err(ScopeError::DuplicateTypeIdentifier { .. })
        ));
    }
}
