//! Tokens produced by the scanner (external collaborator, see
//! `mtype_pipeline::scan`).

use crate::span::{CodeFileDescriptor, Span};
use std::sync::Arc;

/// The closed set of lexical categories the scanner can produce. Not
/// exhaustive of MATLAB's own grammar — just enough for the constructs
/// `mtype_ir::ast` models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Identifier,
    Number,
    Char,
    String,
    Keyword,
    Operator,
    Punctuation,
    /// A `%<...>` type-annotation comment block, scanned whole and handed to
    /// the type-annotation sub-parser.
    TypeAnnotBlock,
    Eof,
}

/// A single lexeme plus its location. `lexeme` is owned (rather than
/// borrowing the retained file contents) so tokens can outlive the scan
/// pass that produced them without threading a lifetime through the whole
/// AST.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: Arc<str>,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<Arc<str>>, span: Span) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
            span,
        }
    }

    /// A synthetic token for identifiers that never appeared in real source
    /// text (root identifiers seeded before any file is visited).
    pub fn synthetic(lexeme: impl Into<Arc<str>>) -> Self {
        Self::new(TokenKind::Identifier, lexeme, Span::default())
    }
}

/// Associates a token with the file and retained source text it came from,
/// so error rendering can recover a `(row, column)` and a source slice
/// without the token itself carrying a lifetime.
#[derive(Debug, Clone)]
pub struct TokenSourceData {
    pub file: Arc<CodeFileDescriptor>,
    pub source: Arc<str>,
}
