//! Sub-parser for `%<...>` type annotation blocks (spec §6.3). The scanner
//! hands the block's contents over as one opaque [`mtype_ir::TokenKind::TypeAnnotBlock`]
//! token; this module re-scans that text with [`crate::scan::WorkspaceScanner`]
//! and parses the small annotation grammar (`begin`/`let`/`given`/`fun`/
//! `namespace`/`struct`/`declare`/`constructor`, or a bare inline type) over
//! the resulting tokens.

use mtype_ir::ast::{RecordFieldType, TypeAnnotItem, TypeFunSignature, TypeNode};
use mtype_ir::{NodeIdGen, StringRegistry, Token, TokenKind, TypeIdentifier};

use crate::error::{ParseError, ParseErrorKind};
use crate::scan::{Scanner, WorkspaceScanner};

pub struct TypeAnnotParser<'a> {
    tokens: Vec<Token>,
    pos: usize,
    registry: &'a StringRegistry,
    idgen: &'a mut NodeIdGen,
    errors: Vec<ParseError>,
}

impl<'a> TypeAnnotParser<'a> {
    pub fn parse(
        block_contents: &str,
        registry: &'a StringRegistry,
        idgen: &'a mut NodeIdGen,
    ) -> Result<TypeAnnotItem, Vec<ParseError>> {
        let scanned = WorkspaceScanner
            .scan(block_contents)
            .map(|out| out.tokens)
            .unwrap_or_default();
        let mut parser = Self {
            tokens: scanned,
            pos: 0,
            registry,
            idgen,
            errors: Vec::new(),
        };
        let item = parser.parse_item();
        if parser.errors.is_empty() {
            Ok(item)
        } else {
            Err(parser.errors)
        }
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) -> Token {
        let tok = self.peek().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        tok
    }

    fn is_word(&self, word: &str) -> bool {
        matches!(self.peek().kind, TokenKind::Identifier | TokenKind::Keyword) && &*self.peek().lexeme == word
    }

    fn is_punct(&self, p: &str) -> bool {
        matches!(self.peek().kind, TokenKind::Punctuation | TokenKind::Operator) && &*self.peek().lexeme == p
    }

    fn eat_word(&mut self, word: &str) -> bool {
        if self.is_word(word) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn eat_punct(&mut self, p: &str) -> bool {
        if self.is_punct(p) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect_punct(&mut self, p: &str) {
        if !self.eat_punct(p) {
            self.errors.push(ParseError::new(
                ParseErrorKind::Syntactic { expected: p.to_string() },
                self.peek().clone(),
            ));
        }
    }

    fn type_ident(&mut self) -> TypeIdentifier {
        let tok = self.advance();
        TypeIdentifier::new(self.registry.register(&tok.lexeme))
    }

    fn parse_item(&mut self) -> TypeAnnotItem {
        let is_exported = self.eat_word("export");
        if self.eat_word("begin") {
            let mut contents = Vec::new();
            while !self.is_word("end") && self.peek().kind != TokenKind::Eof {
                contents.push(self.parse_item());
            }
            self.eat_word("end");
            return TypeAnnotItem::Begin { is_exported, contents };
        }
        if self.eat_word("let") {
            let name = self.type_ident();
            self.expect_punct("=");
            let equal_to = self.parse_type_expr();
            return TypeAnnotItem::Let { name, equal_to };
        }
        if self.eat_word("given") {
            self.expect_punct("<");
            let mut params = vec![self.type_ident()];
            while self.eat_punct(",") {
                params.push(self.type_ident());
            }
            self.expect_punct(">");
            let body = Box::new(self.parse_item());
            return TypeAnnotItem::Given { params, body };
        }
        if self.eat_word("fun") {
            return TypeAnnotItem::Fun(self.parse_fun_signature());
        }
        if self.eat_word("constructor") {
            return TypeAnnotItem::Constructor(self.parse_fun_signature_headless());
        }
        if self.eat_word("namespace") {
            let name = self.type_ident();
            let mut contents = Vec::new();
            while !self.is_word("end") && self.peek().kind != TokenKind::Eof {
                contents.push(self.parse_item());
            }
            self.eat_word("end");
            return TypeAnnotItem::Namespace { name, contents };
        }
        if self.eat_word("struct") {
            let name = self.type_ident();
            self.expect_punct("{");
            let mut fields = Vec::new();
            while !self.is_punct("}") && self.peek().kind != TokenKind::Eof {
                let field_name = self.type_ident();
                self.expect_punct(":");
                let ty = self.parse_type_expr();
                fields.push(RecordFieldType { name: field_name, ty });
                self.eat_punct(",");
            }
            self.expect_punct("}");
            return TypeAnnotItem::Struct { name, fields };
        }
        if self.eat_word("declare") {
            let name = self.type_ident();
            return TypeAnnotItem::Declare { name };
        }
        TypeAnnotItem::Inline(self.parse_type_expr())
    }

    fn parse_fun_signature(&mut self) -> TypeFunSignature {
        let name = self.type_ident();
        let generic_params = self.parse_optional_generic_params();
        let inputs = self.parse_paren_type_list();
        self.expect_punct("->");
        let outputs = self.parse_output_type_list();
        TypeFunSignature {
            name,
            generic_params,
            inputs,
            outputs,
        }
    }

    /// `constructor(...)` has no name of its own; the class name stands in.
    fn parse_fun_signature_headless(&mut self) -> TypeFunSignature {
        let name = TypeIdentifier::new(self.registry.register("constructor"));
        let inputs = self.parse_paren_type_list();
        self.expect_punct("->");
        let outputs = self.parse_output_type_list();
        TypeFunSignature {
            name,
            generic_params: Vec::new(),
            inputs,
            outputs,
        }
    }

    fn parse_optional_generic_params(&mut self) -> Vec<TypeIdentifier> {
        if !self.eat_punct("<") {
            return Vec::new();
        }
        let mut params = vec![self.type_ident()];
        while self.eat_punct(",") {
            params.push(self.type_ident());
        }
        self.expect_punct(">");
        params
    }

    fn parse_paren_type_list(&mut self) -> Vec<TypeNode> {
        self.expect_punct("(");
        let mut items = Vec::new();
        while !self.is_punct(")") && self.peek().kind != TokenKind::Eof {
            items.push(self.parse_type_expr());
            if !self.eat_punct(",") {
                break;
            }
        }
        self.expect_punct(")");
        items
    }

    fn parse_output_type_list(&mut self) -> Vec<TypeNode> {
        if self.is_punct("(") {
            self.parse_paren_type_list()
        } else {
            vec![self.parse_type_expr()]
        }
    }

    fn parse_type_expr(&mut self) -> TypeNode {
        let mut lhs = self.parse_primary_type();
        if self.is_punct("|") {
            let mut members = vec![lhs];
            while self.eat_punct("|") {
                members.push(self.parse_primary_type());
            }
            lhs = TypeNode::Union {
                members,
                id: self.idgen.next(),
            };
        }
        lhs
    }

    fn parse_primary_type(&mut self) -> TypeNode {
        if self.is_punct("{") {
            self.advance();
            let mut fields = Vec::new();
            while !self.is_punct("}") && self.peek().kind != TokenKind::Eof {
                let name = self.type_ident();
                self.expect_punct(":");
                let ty = self.parse_type_expr();
                fields.push(RecordFieldType { name, ty });
                self.eat_punct(",");
            }
            self.expect_punct("}");
            return TypeNode::Record {
                fields,
                id: self.idgen.next(),
            };
        }
        if self.is_punct("(") {
            let items = self.parse_paren_type_list();
            if self.eat_punct("->") {
                let outputs = self.parse_output_type_list();
                return TypeNode::Function {
                    inputs: items,
                    outputs,
                    id: self.idgen.next(),
                };
            }
            if items.len() == 1 {
                return items.into_iter().next().unwrap_or(TypeNode::Tuple {
                    elements: Vec::new(),
                    id: self.idgen.next(),
                });
            }
            return TypeNode::Tuple {
                elements: items,
                id: self.idgen.next(),
            };
        }

        let token = self.peek().clone();
        let identifier = self.type_ident();
        let args = self.parse_optional_scalar_args();
        TypeNode::Scalar {
            identifier,
            args,
            token,
            id: self.idgen.next(),
        }
    }

    fn parse_optional_scalar_args(&mut self) -> Vec<TypeNode> {
        if !self.eat_punct("<") {
            return Vec::new();
        }
        let mut args = vec![self.parse_type_expr()];
        while self.eat_punct(",") {
            args.push(self.parse_type_expr());
        }
        self.expect_punct(">");
        args
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_simple_let_alias() {
        let registry = StringRegistry::new();
        let mut idgen = NodeIdGen::default();
        let item = TypeAnnotParser::parse("let Meters = double", &registry, &mut idgen).unwrap();
        match item {
            TypeAnnotItem::Let { name, equal_to } => {
                assert_eq!(name.id(), registry.register("Meters"));
                assert!(matches!(equal_to, TypeNode::Scalar { .. }));
            }
            other => panic!("expected a let item, got {other:?}"),
        }
    }

    #[test]
    fn parses_a_generic_function_signature() {
        let registry = StringRegistry::new();
        let mut idgen = NodeIdGen::default();
        let item =
            TypeAnnotParser::parse("fun id<T>(T) -> T", &registry, &mut idgen).unwrap();
        match item {
            TypeAnnotItem::Fun(sig) => {
                assert_eq!(sig.generic_params.len(), 1);
                assert_eq!(sig.inputs.len(), 1);
                assert_eq!(sig.outputs.len(), 1);
            }
            other => panic!("expected a fun item, got {other:?}"),
        }
    }

    #[test]
    fn parses_a_union_type() {
        let registry = StringRegistry::new();
        let mut idgen = NodeIdGen::default();
        let item = TypeAnnotParser::parse("double | char", &registry, &mut idgen).unwrap();
        match item {
            TypeAnnotItem::Inline(TypeNode::Union { members, .. }) => {
                assert_eq!(members.len(), 2);
            }
            other => panic!("expected an inline union, got {other:?}"),
        }
    }
}
