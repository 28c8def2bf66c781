//! Parse-time error taxonomy (spec §7). Distinct from
//! `mtype_types::TypeErrorKind` — parse errors and type errors are two taxa
//! with separate rendering paths; this module owns the former.

use mtype_ir::Token;

#[derive(Debug, Clone, thiserror::Error)]
pub enum ScanErrorKind {
    #[error("source is not valid UTF-8")]
    NotUtf8,
    #[error("unterminated string literal")]
    UnterminatedString,
    #[error("unrecognized character {0:?}")]
    UnrecognizedChar(char),
}

#[derive(Debug, Clone, thiserror::Error)]
#[error("{kind}")]
pub struct ScanError {
    pub kind: ScanErrorKind,
}

impl ScanError {
    pub fn new(kind: ScanErrorKind) -> Self {
        Self { kind }
    }
}

/// Parse error kinds (spec §7's taxonomy for this taxon).
#[derive(Debug, Clone, thiserror::Error)]
pub enum ParseErrorKind {
    #[error("unexpected token")]
    Lexical,
    #[error("unexpected token, expected {expected}")]
    Syntactic { expected: String },
    #[error("duplicate type identifier")]
    DuplicateTypeIdentifier,
    #[error("unresolved type import")]
    UnresolvedTypeImport,
    #[error("invalid assignment target")]
    InvalidAssignmentTarget,
    #[error("duplicate input parameter")]
    DuplicateInputParameter,
    #[error("import shadows an existing local")]
    ShadowedImport,
    #[error("variable referenced before its qualified form was declared")]
    PreDeclaredQualifiedVariable,
}

/// A single parse error, carrying the offending token so diagnostics can
/// recover a source slice without the error itself borrowing the file
/// (spec §7: "(source_slice, offending_token, message, file_descriptor)" —
/// the slice and file descriptor are reconstructed at render time from the
/// token's span and the `AstStore` entry, rather than duplicated here).
#[derive(Debug, Clone, thiserror::Error)]
#[error("{kind}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub token: Token,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, token: Token) -> Self {
        Self { kind, token }
    }
}
