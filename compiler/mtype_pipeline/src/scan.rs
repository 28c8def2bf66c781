//! The scanner (external collaborator, spec §4.G): turns retained source
//! text into a flat token stream. A minimal hand-rolled lexer over the
//! construct set `mtype_ir::ast` models — not an attempt at full MATLAB
//! lexical fidelity (block comments, line-continuation `...`, and most
//! escape sequences are out of scope).

use std::sync::Arc;

use mtype_ir::{Span, Token, TokenKind};

use crate::error::{ScanError, ScanErrorKind};

const KEYWORDS: &[&str] = &[
    "function", "end", "if", "elseif", "else", "for", "while", "try", "catch", "return", "break",
    "continue", "classdef", "properties", "methods", "import", "true", "false",
];

fn is_keyword(word: &str) -> bool {
    KEYWORDS.contains(&word)
}

/// `{tokens, functions_are_end_terminated}` (spec §4.G). `row_column_index`
/// is folded into `locate`, computed lazily from the retained source rather
/// than precomputed eagerly for every token.
pub struct ScanOutput {
    pub tokens: Vec<Token>,
    pub functions_are_end_terminated: bool,
}

impl ScanOutput {
    /// 1-based `(row, column)` for a byte offset — used only when rendering
    /// a diagnostic, never by the parser itself.
    pub fn locate(source: &str, offset: u32) -> (u32, u32) {
        let offset = offset as usize;
        let mut row = 1u32;
        let mut col = 1u32;
        for ch in source[..offset.min(source.len())].chars() {
            if ch == '\n' {
                row += 1;
                col = 1;
            } else {
                col += 1;
            }
        }
        (row, col)
    }
}

pub trait Scanner {
    fn scan(&self, source: &str) -> Result<ScanOutput, ScanError>;
}

/// The in-workspace scanner. Every function in a compiled source is
/// expected to be `end`-terminated; the whole-file "last function runs
/// to EOF" convention MATLAB allows is out of scope.
#[derive(Default)]
pub struct WorkspaceScanner;

impl Scanner for WorkspaceScanner {
    fn scan(&self, source: &str) -> Result<ScanOutput, ScanError> {
        let chars: Vec<char> = source.chars().collect();
        let byte_offsets = byte_offsets(source, &chars);
        let mut tokens = Vec::new();
        let mut i = 0usize;

        while i < chars.len() {
            let c = chars[i];

            if c.is_whitespace() {
                i += 1;
                continue;
            }

            if c == '%' {
                if chars.get(i + 1) == Some(&'<') {
                    let (block, next) = scan_type_annot_block(&chars, &byte_offsets, i)?;
                    tokens.push(block);
                    i = next;
                    continue;
                }
                while i < chars.len() && chars[i] != '\n' {
                    i += 1;
                }
                continue;
            }

            if c.is_ascii_digit() {
                let (tok, next) = scan_number(&chars, &byte_offsets, i);
                tokens.push(tok);
                i = next;
                continue;
            }

            if c == '\'' || c == '"' {
                let (tok, next) = scan_quoted(&chars, &byte_offsets, i, c)?;
                tokens.push(tok);
                i = next;
                continue;
            }

            if is_ident_start(c) {
                let (tok, next) = scan_identifier(&chars, &byte_offsets, i);
                tokens.push(tok);
                i = next;
                continue;
            }

            let (tok, next) = scan_operator_or_punct(&chars, &byte_offsets, i)?;
            tokens.push(tok);
            i = next;
        }

        let eof_offset = byte_offsets[chars.len()];
        tokens.push(Token::new(
            TokenKind::Eof,
            "",
            Span::new(eof_offset, eof_offset),
        ));

        Ok(ScanOutput {
            tokens,
            functions_are_end_terminated: true,
        })
    }
}

fn byte_offsets(source: &str, chars: &[char]) -> Vec<u32> {
    let mut offsets = Vec::with_capacity(chars.len() + 1);
    let mut byte = 0u32;
    for ch in chars {
        offsets.push(byte);
        byte += ch.len_utf8() as u32;
    }
    offsets.push(source.len() as u32);
    offsets
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_ident_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn scan_identifier(chars: &[char], offsets: &[u32], start: usize) -> (Token, usize) {
    let mut end = start + 1;
    while end < chars.len() && is_ident_continue(chars[end]) {
        end += 1;
    }
    let lexeme: String = chars[start..end].iter().collect();
    let kind = if is_keyword(&lexeme) {
        TokenKind::Keyword
    } else {
        TokenKind::Identifier
    };
    let span = Span::new(offsets[start], offsets[end]);
    (Token::new(kind, lexeme, span), end)
}

fn scan_number(chars: &[char], offsets: &[u32], start: usize) -> (Token, usize) {
    let mut end = start + 1;
    while end < chars.len() && chars[end].is_ascii_digit() {
        end += 1;
    }
    if chars.get(end) == Some(&'.') && matches!(chars.get(end + 1), Some(c) if c.is_ascii_digit()) {
        end += 1;
        while end < chars.len() && chars[end].is_ascii_digit() {
            end += 1;
        }
    }
    if matches!(chars.get(end), Some('e') | Some('E')) {
        let mut lookahead = end + 1;
        if matches!(chars.get(lookahead), Some('+') | Some('-')) {
            lookahead += 1;
        }
        if matches!(chars.get(lookahead), Some(c) if c.is_ascii_digit()) {
            end = lookahead;
            while end < chars.len() && chars[end].is_ascii_digit() {
                end += 1;
            }
        }
    }
    let lexeme: String = chars[start..end].iter().collect();
    let span = Span::new(offsets[start], offsets[end]);
    (Token::new(TokenKind::Number, lexeme, span), end)
}

/// `'...'` (char vector) or `"..."` (string). `''`/`""` doubled quotes
/// escape the delimiter itself, matching MATLAB's own literal escaping.
fn scan_quoted(
    chars: &[char],
    offsets: &[u32],
    start: usize,
    quote: char,
) -> Result<(Token, usize), ScanError> {
    let mut end = start + 1;
    let mut value = String::new();
    loop {
        match chars.get(end) {
            None => return Err(ScanError::new(ScanErrorKind::UnterminatedString)),
            Some(&c) if c == quote => {
                if chars.get(end + 1) == Some(&quote) {
                    value.push(quote);
                    end += 2;
                } else {
                    end += 1;
                    break;
                }
            }
            Some(&c) => {
                value.push(c);
                end += 1;
            }
        }
    }
    let kind = if quote == '\'' {
        TokenKind::Char
    } else {
        TokenKind::String
    };
    let span = Span::new(offsets[start], offsets[end]);
    Ok((Token::new(kind, value, span), end))
}

const MULTI_CHAR_OPERATORS: &[&str] = &[
    "<=", ">=", "==", "~=", "&&", "||", ".*", "./", ".\\", ".^", ".'",
];

fn scan_operator_or_punct(
    chars: &[char],
    offsets: &[u32],
    start: usize,
) -> Result<(Token, usize), ScanError> {
    for op in MULTI_CHAR_OPERATORS {
        let op_chars: Vec<char> = op.chars().collect();
        if chars[start..].starts_with(&op_chars[..]) {
            let end = start + op_chars.len();
            let span = Span::new(offsets[start], offsets[end]);
            return Ok((Token::new(TokenKind::Operator, *op, span), end));
        }
    }

    let c = chars[start];
    let end = start + 1;
    let span = Span::new(offsets[start], offsets[end]);
    let lexeme = c.to_string();
    let kind = match c {
        '+' | '-' | '*' | '/' | '\\' | '^' | '<' | '>' | '=' | '&' | '|' | '~' | ':' | '\'' => {
            TokenKind::Operator
        }
        '(' | ')' | '[' | ']' | '{' | '}' | ',' | ';' | '.' | '@' => TokenKind::Punctuation,
        other => return Err(ScanError::new(ScanErrorKind::UnrecognizedChar(other))),
    };
    Ok((Token::new(kind, lexeme, span), end))
}

/// Scans a whole `%<...>` type-annotation block as one [`TokenKind::TypeAnnotBlock`]
/// token; `crate::type_annot` sub-parses its contents on demand.
fn scan_type_annot_block(
    chars: &[char],
    offsets: &[u32],
    start: usize,
) -> Result<(Token, usize), ScanError> {
    // Skip `%<`.
    let mut end = start + 2;
    let mut depth = 1usize;
    while end < chars.len() && depth > 0 {
        if chars[end..].starts_with(&['%', '<']) {
            depth += 1;
            end += 2;
        } else if chars[end] == '>' {
            depth -= 1;
            end += 1;
        } else {
            end += 1;
        }
    }
    let inner: String = chars[start + 2..end.saturating_sub(1)].iter().collect();
    let span = Span::new(offsets[start], offsets[end]);
    Ok((Token::new(TokenKind::TypeAnnotBlock, inner, span), end))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        WorkspaceScanner
            .scan(source)
            .unwrap()
            .tokens
            .iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn scans_a_simple_assignment() {
        let kinds = kinds("x = 1.0;");
        assert_eq!(
            kinds,
            vec![
                TokenKind::Identifier,
                TokenKind::Operator,
                TokenKind::Number,
                TokenKind::Punctuation,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn single_quoted_char_literal_is_scanned_without_quotes() {
        let tokens = WorkspaceScanner.scan("'c'").unwrap().tokens;
        assert_eq!(tokens[0].kind, TokenKind::Char);
        assert_eq!(&*tokens[0].lexeme, "c");
    }

    #[test]
    fn recognizes_function_keyword() {
        let tokens = WorkspaceScanner.scan("function y = f(x)\nend").unwrap().tokens;
        assert_eq!(tokens[0].kind, TokenKind::Keyword);
        assert_eq!(&*tokens[0].lexeme, "function");
    }

    #[test]
    fn unterminated_string_is_a_scan_error() {
        assert!(WorkspaceScanner.scan("'abc").is_err());
    }
}
