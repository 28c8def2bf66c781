//! Per-file parse/resolution state, keyed by path (spec §3.6, modeled on
//! `bin/mtype/ast_store.hpp`). Each flag is append-only: once set, a later
//! pipeline pass must not need to unset it — a file that has, say, already
//! had its base scope added never needs that step repeated.

use std::path::{Path, PathBuf};

use mtype_ir::ast::RootBlock;
use rustc_hash::FxHashMap;

use crate::error::ParseError;

#[derive(Default)]
pub struct Entry {
    pub root: Option<RootBlock>,
    pub parse_errors: Vec<ParseError>,
    pub parsed_ok: bool,
    pub added_base_scope: bool,
    pub resolved_type_imports: bool,
    pub resolved_type_identifiers: bool,
    pub generated_constraints: bool,
}

impl Entry {
    /// Panics (in debug builds) if a flag is set twice — each stage in the
    /// pipeline's per-file machine should run at most once per file.
    fn set_once(flag: &mut bool) {
        debug_assert!(!*flag, "pipeline stage re-ran for a file that already completed it");
        *flag = true;
    }
}

#[derive(Default)]
pub struct AstStore {
    entries: FxHashMap<PathBuf, Entry>,
}

impl AstStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.entries.contains_key(path)
    }

    pub fn entry(&self, path: &Path) -> Option<&Entry> {
        self.entries.get(path)
    }

    pub fn entry_mut(&mut self, path: &Path) -> &mut Entry {
        self.entries.entry(path.to_path_buf()).or_default()
    }

    pub fn mark_parsed_ok(&mut self, path: &Path) {
        Entry::set_once(&mut self.entry_mut(path).parsed_ok);
    }

    pub fn mark_added_base_scope(&mut self, path: &Path) {
        Entry::set_once(&mut self.entry_mut(path).added_base_scope);
    }

    pub fn mark_resolved_type_imports(&mut self, path: &Path) {
        Entry::set_once(&mut self.entry_mut(path).resolved_type_imports);
    }

    pub fn mark_resolved_type_identifiers(&mut self, path: &Path) {
        Entry::set_once(&mut self.entry_mut(path).resolved_type_identifiers);
    }

    pub fn mark_generated_constraints(&mut self, path: &Path) {
        Entry::set_once(&mut self.entry_mut(path).generated_constraints);
    }

    pub fn paths(&self) -> impl Iterator<Item = &PathBuf> {
        self.entries.keys()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a_fresh_entry_has_every_flag_unset() {
        let mut store = AstStore::new();
        let path = Path::new("a.m");
        let entry = store.entry_mut(path);
        assert!(!entry.parsed_ok);
        assert!(!entry.generated_constraints);
    }

    #[test]
    fn marking_a_stage_is_idempotent_in_release_but_tracked() {
        let mut store = AstStore::new();
        let path = Path::new("a.m");
        store.mark_parsed_ok(path);
        assert!(store.entry(path).unwrap().parsed_ok);
    }
}
