//! Dedup for cross-file resolution attempts (spec §4.C.5, §4.F step 8): once
//! a `(reference, candidate_file)` pair has been tried, it is never
//! re-enqueued, even if the candidate file is still unresolved itself.

use std::path::{Path, PathBuf};

use mtype_ir::MatlabIdentifier;
use rustc_hash::FxHashSet;

#[derive(Default)]
pub struct VisitedResolutionPairs(FxHashSet<(MatlabIdentifier, PathBuf)>);

impl VisitedResolutionPairs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `(reference, candidate_file)` as attempted. Returns `true` the
    /// first time a pair is seen (the caller should proceed), `false` on any
    /// later call for the same pair (skip — already attempted).
    pub fn try_mark(&mut self, reference: MatlabIdentifier, candidate_file: &Path) -> bool {
        self.0.insert((reference, candidate_file.to_path_buf()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mtype_ir::StringRegistry;

    #[test]
    fn a_pair_is_only_ever_marked_once() {
        let registry = StringRegistry::new();
        let ident = MatlabIdentifier::simple(registry.register("b"));
        let mut visited = VisitedResolutionPairs::new();
        let path = PathBuf::from("/pkg/b.m");

        assert!(visited.try_mark(ident, &path));
        assert!(!visited.try_mark(ident, &path));
    }
}
