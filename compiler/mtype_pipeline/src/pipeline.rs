//! Drives the whole compilation: seed root identifiers, discover files
//! through the search path, run each file through the per-file stage
//! machine, and retry cross-file references to a fixed point before a
//! final unification pass (spec §4.F, §4.G).
//!
//! The stage machine per file, tracked in `AstStore::Entry`:
//!   1. read the source file from disk
//!   2. scan it into tokens
//!   3. splice in implicit list-element commas
//!   4. parse it into a `RootBlock`
//!   5. import the shared base type scope (primitive scalar names)
//!   6. resolve the file's own type imports (`resolve_imports`)
//!   7. check the file's `pending_type_imports` against the now-resolved
//!      type scope
//!   8. generate constraints for the file's top-level block, registering
//!      every top-level function into the definition store

use std::path::{Path, PathBuf};

use mtype_ir::ast::{FunctionDefNode, RootBlock, Stmt};
use mtype_ir::{MatlabIdentifier, NodeIdGen, StringId, StringRegistry, Token, TypeScopeId, ValueScopeId};
use mtype_scope::{TypeScopeArena, ValueScopeArena};
use mtype_types::{Pool, Substitution, TypeError, TypeId, Unifier, WellKnownNames};

use mtype_defs::{FunctionDef, Store};
use mtype_infer::{could_not_infer_type, ConstraintGenerator};

use crate::ast_store::AstStore;
use crate::delimiters::insert_implicit_expr_delimiters;
use crate::error::{ParseError, ParseErrorKind};
use crate::library::Library;
use crate::parse::{Parser, WorkspaceParser};
use crate::pre_import;
use crate::resolution::VisitedResolutionPairs;
use crate::scan::{Scanner, WorkspaceScanner};
use crate::search_path::SearchPath;

type ValueScopes = ValueScopeArena<ValueScopeId, StringId, TypeId>;
type TypeScopes = TypeScopeArena<TypeScopeId, StringId, TypeId>;

/// Everything a compilation run produced: the files it visited, references
/// it never managed to resolve, every parse error across those files, and
/// every type error the final unification pass found.
#[derive(Debug, Default)]
pub struct PipelineReport {
    pub visited_files: Vec<PathBuf>,
    pub unresolved_references: Vec<(MatlabIdentifier, Token)>,
    pub parse_errors: Vec<(PathBuf, ParseError)>,
    pub type_errors: Vec<TypeError>,
}

impl PipelineReport {
    pub fn is_clean(&self) -> bool {
        self.unresolved_references.is_empty() && self.parse_errors.is_empty() && self.type_errors.is_empty()
    }
}

/// Owns every arena the compilation touches. One `Pipeline` compiles one
/// set of root identifiers; it is not reused across runs.
pub struct Pipeline {
    pool: Pool,
    subst: Substitution,
    registry: StringRegistry,
    value_scopes: ValueScopes,
    type_scopes: TypeScopes,
    library: Library,
    search_path: SearchPath,
    ast_store: AstStore,
    store: Store,
    visited: VisitedResolutionPairs,
    idgen: NodeIdGen,
}

impl Pipeline {
    pub fn new(search_path: SearchPath) -> Self {
        Self::with_capacity(search_path, mtype_types::DEFAULT_CAPACITY)
    }

    /// Like [`Self::new`], but preallocates the type pool to `capacity`
    /// terms — the CLI's `--store-capacity` knob.
    pub fn with_capacity(search_path: SearchPath, capacity: usize) -> Self {
        let mut pool = Pool::with_capacity(capacity);
        let registry = StringRegistry::new();
        let value_scopes = ValueScopes::new();
        let mut type_scopes = TypeScopes::new();
        let library = Library::build(&mut pool, &registry, &mut type_scopes);

        Self {
            pool,
            subst: Substitution::new(),
            registry,
            value_scopes,
            type_scopes,
            library,
            search_path,
            ast_store: AstStore::new(),
            store: Store::new(),
            visited: VisitedResolutionPairs::new(),
            idgen: NodeIdGen::default(),
        }
    }

    pub fn registry(&self) -> &StringRegistry {
        &self.registry
    }

    pub fn pool(&self) -> &Pool {
        &self.pool
    }

    pub fn subst(&self) -> &Substitution {
        &self.subst
    }

    /// Looks up `name` as a top-level binding in the file that was visited
    /// under `path`, and resolves it through the substitution. `None` if the
    /// file was never visited or has no such binding.
    pub fn resolved_type_of(&self, path: &Path, name: &str) -> Option<TypeId> {
        let entry = self.ast_store.entry(path)?;
        let root = entry.root.as_ref()?;
        let key = self.registry.register(name);
        let ty = mtype_scope::lookup_value(&self.value_scopes, root.value_scope, &key)?;
        Some(self.subst.resolve(*ty))
    }

    /// Names of every top-level function defined in the file visited under
    /// `path`, in source order. Empty if the file was never visited.
    pub fn top_level_function_names(&self, path: &Path) -> Vec<String> {
        let Some(entry) = self.ast_store.entry(path) else { return Vec::new() };
        let Some(root) = &entry.root else { return Vec::new() };
        root.block
            .stmts
            .iter()
            .filter_map(|stmt| match stmt {
                Stmt::FunctionDef(def) => Some(self.registry.at(def.header.name.full_name()).to_string()),
                _ => None,
            })
            .collect()
    }

    /// Compiles starting from `root_names` — identifiers named on the
    /// command line rather than discovered from any file's body — and
    /// everything the search path reaches transitively from them.
    pub fn compile(&mut self, root_names: &[String]) -> PipelineReport {
        let roots = pre_import::seed_roots(root_names, &self.registry, &mut self.pool);
        let mut pending: Vec<(MatlabIdentifier, TypeId, Token)> = roots
            .into_iter()
            .map(|root| (root.identifier, root.target, root.token))
            .collect();

        loop {
            let candidate_files: Vec<PathBuf> = pending
                .iter()
                .filter_map(|(ident, _, _)| {
                    let name = self.registry.at(ident.full_name());
                    self.search_path
                        .search_for(&name, None)
                        .map(|candidate| candidate.defining_file)
                })
                .collect();

            let mut discovered_new_file = false;
            let mut freshly_unresolved = Vec::new();
            for path in candidate_files {
                if self.ast_store.contains(&path) {
                    continue;
                }
                discovered_new_file = true;
                freshly_unresolved.extend(self.visit_file(&path));
            }
            pending.extend(freshly_unresolved);

            let before = pending.len();
            pending = self.try_resolve_pending(pending);
            let resolved_something = pending.len() < before;

            if !discovered_new_file && !resolved_something {
                break;
            }
        }

        let well_known = WellKnownNames::intern(&self.registry);
        let mut unifier = Unifier::new(&mut self.pool, &mut self.subst, well_known);
        unifier.run();
        let mut type_errors = unifier.take_errors();

        let visited_files: Vec<PathBuf> = self.ast_store.paths().cloned().collect();
        let mut parse_errors = Vec::new();
        for path in &visited_files {
            if let Some(entry) = self.ast_store.entry(path) {
                parse_errors.extend(entry.parse_errors.iter().cloned().map(|e| (path.clone(), e)));
                if let Some(root) = &entry.root {
                    self.collect_uninferred_parameters(root, &mut type_errors);
                }
            }
        }

        PipelineReport {
            visited_files,
            unresolved_references: pending.into_iter().map(|(ident, _, token)| (ident, token)).collect(),
            parse_errors,
            type_errors,
        }
    }

    /// Top-level function parameters still bound to a bare type variable
    /// after unification has settled become `could_not_infer_type`
    /// diagnostics (spec §4.E closing paragraph, §8 scenario 4). Nested
    /// (non-top-level) function definitions are not walked here — the spec
    /// scopes this check to top-level signatures.
    fn collect_uninferred_parameters(&self, root: &RootBlock, out: &mut Vec<TypeError>) {
        for stmt in &root.block.stmts {
            let Stmt::FunctionDef(def) = stmt else { continue };
            self.collect_uninferred_parameters_of(def, out);
        }
    }

    fn collect_uninferred_parameters_of(&self, def: &FunctionDefNode, out: &mut Vec<TypeError>) {
        for param in &def.header.inputs {
            let Some(name) = param.name else { continue };
            let Some(&ty) =
                mtype_scope::lookup_value(&self.value_scopes, def.value_scope, &name.full_name())
            else {
                continue;
            };
            let display = self.registry.at(name.full_name()).to_string();
            if let Some(kind) = could_not_infer_type(
                &self.pool,
                &self.subst,
                ty,
                &format!("parameter `{display}`"),
            ) {
                out.push(TypeError::with_token(kind, def.header.name_token.clone()));
            }
        }
    }

    /// Runs the per-file stage machine once, top to bottom, and returns the
    /// rvalue references the file's own constraint generation pass could
    /// not resolve locally.
    fn visit_file(&mut self, path: &Path) -> Vec<(MatlabIdentifier, TypeId, Token)> {
        let source = match std::fs::read_to_string(path) {
            Ok(source) => source,
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "could not read source file");
                self.ast_store.entry_mut(path);
                return Vec::new();
            }
        };

        let scan = match WorkspaceScanner.scan(&source) {
            Ok(scan) => scan,
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "scan error");
                self.ast_store.entry_mut(path);
                return Vec::new();
            }
        };
        let tokens = insert_implicit_expr_delimiters(&scan.tokens);

        let parsed = WorkspaceParser.parse(
            &tokens,
            &self.registry,
            &mut self.idgen,
            &mut self.value_scopes,
            &mut self.type_scopes,
        );

        for err in &parsed.errors {
            self.ast_store.entry_mut(path).parse_errors.push(err.clone());
        }
        self.ast_store.mark_parsed_ok(path);

        let root = parsed.root;
        let import_token = Token::synthetic("_");
        self.type_scopes
            .add_import(root.type_scope, self.library.base_type_scope, true, import_token);
        self.ast_store.mark_added_base_scope(path);

        if let Err(mtype_scope::ScopeError::DuplicateTypeIdentifier { first: _, second }) =
            mtype_scope::resolve_imports(&self.type_scopes, root.type_scope)
        {
            self.ast_store
                .entry_mut(path)
                .parse_errors
                .push(ParseError::new(ParseErrorKind::DuplicateTypeIdentifier, second));
        }
        self.ast_store.mark_resolved_type_imports(path);

        for pending_import in &root.pending_type_imports {
            if mtype_scope::lookup_type(&self.type_scopes, pending_import.into_scope, &pending_import.identifier.id())
                .is_none()
            {
                self.ast_store.entry_mut(path).parse_errors.push(ParseError::new(
                    ParseErrorKind::UnresolvedTypeImport,
                    pending_import.token.clone(),
                ));
            }
        }
        self.ast_store.mark_resolved_type_identifiers(path);

        let unresolved = self.generate_constraints_for_file(&root);
        self.register_top_level_functions(&root);
        self.ast_store.mark_generated_constraints(path);

        self.ast_store.entry_mut(path).root = Some(root);
        unresolved
    }

    fn generate_constraints_for_file(&mut self, root: &RootBlock) -> Vec<(MatlabIdentifier, TypeId, Token)> {
        let mut generator = ConstraintGenerator::new(
            &mut self.pool,
            &mut self.subst,
            &self.registry,
            &self.library.operators,
            &mut self.value_scopes,
            &self.type_scopes,
        );
        generator.generate_block(root.value_scope, root.type_scope, &root.block);
        generator.take_unresolved_references()
    }

    /// Registers every top-level function definition into the shared
    /// `mtype_defs::Store` — bookkeeping only; the constraint generator
    /// tracks its own fresh type variables for each function independently
    /// of the store.
    fn register_top_level_functions(&mut self, root: &RootBlock) {
        for stmt in &root.block.stmts {
            let Stmt::FunctionDef(def) = stmt else { continue };
            self.store.write(|data| {
                data.push_function(FunctionDef {
                    handle: mtype_ir::FunctionDefHandle::INVALID,
                    name: def.header.name,
                    inputs: Vec::new(),
                    outputs: Vec::new(),
                    node: def.id,
                    value_scope: def.value_scope,
                    type_scope: def.type_scope,
                    ty: None,
                    token: def.header.name_token.clone(),
                })
            });
        }
    }

    /// Attempts to resolve each pending reference against every file
    /// visited so far, skipping any `(reference, file)` pair already tried.
    /// Returns the references still unresolved after this pass.
    fn try_resolve_pending(
        &mut self,
        pending: Vec<(MatlabIdentifier, TypeId, Token)>,
    ) -> Vec<(MatlabIdentifier, TypeId, Token)> {
        let visited_paths: Vec<PathBuf> = self.ast_store.paths().cloned().collect();
        let mut still_pending = Vec::new();

        for (ident, target, token) in pending {
            let mut resolved = false;
            for path in &visited_paths {
                if !self.visited.try_mark(ident, path) {
                    continue;
                }
                let Some(entry) = self.ast_store.entry(path) else { continue };
                let Some(root) = &entry.root else { continue };
                let found = mtype_scope::lookup_value(&self.value_scopes, root.value_scope, &ident.full_name());
                if let Some(found_ty) = found {
                    self.subst.push_equation(target, *found_ty);
                    resolved = true;
                    break;
                }
            }
            if !resolved {
                still_pending.push((ident, target, token));
            }
        }

        still_pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_source(dir: &Path, name: &str, contents: &str) {
        std::fs::write(dir.join(name), contents).unwrap();
    }

    fn scratch_dir(label: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("mtype_pipeline_test_{label}"));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn compiles_a_single_self_contained_function() {
        let dir = scratch_dir("single_fn");
        write_source(&dir, "widget.m", "function y = widget(x)\ny = x + 1;\nend\n");

        let mut path = SearchPath::default();
        path.push_dir(&dir);
        let mut pipeline = Pipeline::new(path);
        let report = pipeline.compile(&["widget".to_string()]);

        assert!(report.parse_errors.is_empty(), "{:?}", report.parse_errors);
        assert!(report.unresolved_references.is_empty());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn resolves_a_call_into_a_second_file() {
        let dir = scratch_dir("cross_file");
        write_source(&dir, "caller.m", "function y = caller(x)\ny = helper(x);\nend\n");
        write_source(&dir, "helper.m", "function y = helper(x)\ny = x;\nend\n");

        let mut path = SearchPath::default();
        path.push_dir(&dir);
        let mut pipeline = Pipeline::new(path);
        let report = pipeline.compile(&["caller".to_string()]);

        assert_eq!(report.visited_files.len(), 2);
        assert!(report.unresolved_references.is_empty(), "{:?}", report.unresolved_references);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn an_unresolvable_root_name_is_reported() {
        let dir = scratch_dir("missing_root");
        let mut path = SearchPath::default();
        path.push_dir(&dir);
        let mut pipeline = Pipeline::new(path);
        let report = pipeline.compile(&["nonexistent".to_string()]);

        assert_eq!(report.unresolved_references.len(), 1);
        assert!(report.visited_files.is_empty());

        std::fs::remove_dir_all(&dir).ok();
    }
}
