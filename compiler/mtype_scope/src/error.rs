//! Scope/import resolution errors (spec §4.D.3).

use mtype_ir::Token;

#[derive(Debug, Clone, thiserror::Error)]
pub enum ScopeError {
    /// Two imports (or an import and a local definition) both make the same
    /// type identifier visible in one scope. Cites the token that won —
    /// i.e. the first one resolved — so a diagnostic can point back at it.
    #[error("duplicate type identifier")]
    DuplicateTypeIdentifier { first: Token, second: Token },
}
