//! The parser (external collaborator, spec §4.G): recursive descent over the
//! scanned, comma-normalized token stream, producing the plain
//! `mtype_ir::ast` tree the constraint generator walks. Parse errors are
//! collected, not thrown — a file with a syntax error still gets an
//! (incomplete) `RootBlock` back so the pipeline can report everything wrong
//! with a compilation in one pass (spec §7).

use mtype_ir::ast::{
    AssignTarget, BinaryOp, Block, ClassDefNode, Expr, FunctionDefNode, FunctionHeader,
    FunctionInputParameter, IndexKind, MethodAttributes, ModuleUseStmt, PendingTypeImport,
    PropertyDef, RootBlock, Stmt, TypeAnnotItem, TypeAnnotMacro, UnaryOp,
};
use mtype_ir::{MatlabIdentifier, NodeIdGen, StringId, StringRegistry, Token, TokenKind, TypeScopeId, ValueScopeId};
use mtype_scope::ScopeArena;
use mtype_types::TypeId;

use crate::error::{ParseError, ParseErrorKind};
use crate::type_annot::TypeAnnotParser;

type ValueScopes = ScopeArena<ValueScopeId, StringId, TypeId>;
type TypeScopes = ScopeArena<TypeScopeId, StringId, TypeId>;

pub struct ParseOutput {
    pub root: RootBlock,
    pub errors: Vec<ParseError>,
}

pub trait Parser {
    #[allow(clippy::too_many_arguments)]
    fn parse(
        &self,
        tokens: &[Token],
        registry: &StringRegistry,
        idgen: &mut NodeIdGen,
        value_scopes: &mut ValueScopes,
        type_scopes: &mut TypeScopes,
    ) -> ParseOutput;
}

#[derive(Default)]
pub struct WorkspaceParser;

impl Parser for WorkspaceParser {
    fn parse(
        &self,
        tokens: &[Token],
        registry: &StringRegistry,
        idgen: &mut NodeIdGen,
        value_scopes: &mut ValueScopes,
        type_scopes: &mut TypeScopes,
    ) -> ParseOutput {
        let value_scope = value_scopes.new_scope(None);
        let type_scope = type_scopes.new_scope(None);
        let mut state = State {
            tokens,
            pos: 0,
            registry,
            idgen,
            value_scopes,
            type_scopes,
            errors: Vec::new(),
            pending_type_imports: Vec::new(),
        };
        let block = state.parse_block_until_eof();
        ParseOutput {
            root: RootBlock {
                block,
                value_scope,
                type_scope,
                file_entry: None,
                pending_type_imports: state.pending_type_imports,
            },
            errors: state.errors,
        }
    }
}

struct State<'a> {
    tokens: &'a [Token],
    pos: usize,
    registry: &'a StringRegistry,
    idgen: &'a mut NodeIdGen,
    value_scopes: &'a mut ValueScopes,
    type_scopes: &'a mut TypeScopes,
    errors: Vec<ParseError>,
    pending_type_imports: Vec<PendingTypeImport>,
}

impl<'a> State<'a> {
    fn peek(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn peek_at(&self, ahead: usize) -> &Token {
        let idx = (self.pos + ahead).min(self.tokens.len() - 1);
        &self.tokens[idx]
    }

    fn at_eof(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    fn advance(&mut self) -> Token {
        let tok = self.peek().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        tok
    }

    fn is_kw(&self, word: &str) -> bool {
        self.peek().kind == TokenKind::Keyword && &*self.peek().lexeme == word
    }

    fn is_ident(&self) -> bool {
        self.peek().kind == TokenKind::Identifier
    }

    fn is_punct(&self, p: &str) -> bool {
        self.peek().kind == TokenKind::Punctuation && &*self.peek().lexeme == p
    }

    fn is_op(&self, o: &str) -> bool {
        self.peek().kind == TokenKind::Operator && &*self.peek().lexeme == o
    }

    fn eat_kw(&mut self, word: &str) -> bool {
        if self.is_kw(word) {
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

    fn eat_op(&mut self, o: &str) -> bool {
        if self.is_op(o) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect_punct(&mut self, p: &str) {
        if !self.eat_punct(p) {
            self.error_here(ParseErrorKind::Syntactic { expected: p.to_string() });
        }
    }

    fn error_here(&mut self, kind: ParseErrorKind) {
        self.errors.push(ParseError::new(kind, self.peek().clone()));
    }

    fn intern_ident(&self, tok: &Token) -> MatlabIdentifier {
        MatlabIdentifier::simple(self.registry.register(&tok.lexeme))
    }

    // -- statements ------------------------------------------------------

    fn parse_block_until(&mut self, terminators: &[&str]) -> Block {
        let mut stmts = Vec::new();
        while !self.at_eof() && !terminators.iter().any(|t| self.is_kw(t)) {
            if let Some(stmt) = self.parse_stmt() {
                stmts.push(stmt);
            } else {
                // Parse failure on this token: skip it so the loop still
                // terminates on malformed input instead of spinning.
                self.advance();
            }
        }
        Block { stmts }
    }

    fn parse_block_until_eof(&mut self) -> Block {
        self.parse_block_until(&[])
    }

    fn parse_stmt(&mut self) -> Option<Stmt> {
        if self.peek().kind == TokenKind::TypeAnnotBlock {
            return Some(self.parse_type_annot_stmt());
        }
        if self.is_kw("function") {
            let def = self.parse_function_def(None);
            return Some(Stmt::FunctionDef(Box::new(def)));
        }
        if self.is_kw("classdef") {
            return Some(self.parse_class_def());
        }
        if self.is_kw("if") {
            return Some(self.parse_if());
        }
        if self.is_kw("for") {
            return Some(self.parse_for());
        }
        if self.is_kw("while") {
            return Some(self.parse_while());
        }
        if self.is_kw("try") {
            return Some(self.parse_try());
        }
        if self.is_kw("return") {
            let id = self.idgen.next();
            self.advance();
            self.eat_terminators();
            return Some(Stmt::Return { id });
        }
        if self.is_kw("break") {
            let id = self.idgen.next();
            self.advance();
            self.eat_terminators();
            return Some(Stmt::Break { id });
        }
        if self.is_kw("continue") {
            let id = self.idgen.next();
            self.advance();
            self.eat_terminators();
            return Some(Stmt::Continue { id });
        }
        if self.is_kw("import") {
            return Some(self.parse_import());
        }

        if let Some(targets) = self.maybe_multi_assign() {
            let token = self.advance(); // '='
            let value = self.parse_expr();
            self.eat_terminators();
            return Some(Stmt::Assign {
                targets,
                value,
                token,
                id: self.idgen.next(),
            });
        }

        let expr = self.parse_expr();
        if self.is_op("=") {
            let token = self.advance();
            let Some(target) = self.expr_to_assign_target(expr) else {
                self.eat_terminators();
                return None;
            };
            let value = self.parse_expr();
            self.eat_terminators();
            return Some(Stmt::Assign {
                targets: vec![target],
                value,
                token,
                id: self.idgen.next(),
            });
        }
        self.eat_terminators();
        Some(Stmt::Expr(expr))
    }

    fn eat_terminators(&mut self) {
        while self.eat_punct(";") || self.eat_punct(",") {}
    }

    fn parse_type_annot_stmt(&mut self) -> Stmt {
        let tok = self.advance();
        let item = match TypeAnnotParser::parse(&tok.lexeme, self.registry, self.idgen) {
            Ok(item) => item,
            Err(errs) => {
                self.errors.extend(errs);
                TypeAnnotItem::Inline(mtype_ir::ast::TypeNode::Scalar {
                    identifier: mtype_ir::TypeIdentifier::new(self.registry.register("double")),
                    args: Vec::new(),
                    token: tok.clone(),
                    id: self.idgen.next(),
                })
            }
        };
        Stmt::TypeAnnot(TypeAnnotMacro {
            item,
            id: self.idgen.next(),
        })
    }

    fn maybe_multi_assign(&mut self) -> Option<Vec<AssignTarget>> {
        if !self.is_punct("[") {
            return None;
        }
        let checkpoint = self.pos;
        self.advance();
        let mut targets = Vec::new();
        loop {
            if self.is_punct("]") {
                break;
            }
            if self.is_op("~") {
                let tok = self.advance();
                targets.push(AssignTarget::Ignored {
                    token: tok,
                    id: self.idgen.next(),
                });
            } else if self.is_ident() {
                let tok = self.advance();
                targets.push(AssignTarget::Var {
                    ident: self.intern_ident(&tok),
                    token: tok,
                    id: self.idgen.next(),
                });
            } else {
                self.pos = checkpoint;
                return None;
            }
            if self.eat_punct(",") {
                continue;
            }
            break;
        }
        if !self.eat_punct("]") || !self.is_op("=") {
            self.pos = checkpoint;
            return None;
        }
        Some(targets)
    }

    fn expr_to_assign_target(&mut self, expr: Expr) -> Option<AssignTarget> {
        match expr {
            Expr::Var { ident, token, id } => Some(AssignTarget::Var { ident, token, id }),
            Expr::Index { target, kind, args, id, .. } => {
                Some(AssignTarget::Index { target, kind, args, id })
            }
            Expr::Field { base, field, id, .. } => Some(AssignTarget::Field { base, field, id }),
            _other => {
                let token = Token::new(TokenKind::Punctuation, "=", mtype_ir::Span::default());
                self.errors
                    .push(ParseError::new(ParseErrorKind::InvalidAssignmentTarget, token));
                None
            }
        }
    }

    fn parse_if(&mut self) -> Stmt {
        let id = self.idgen.next();
        self.advance(); // if
        let mut branches = Vec::new();
        let cond = self.parse_expr();
        self.eat_terminators();
        let body = self.parse_block_until(&["elseif", "else", "end"]);
        branches.push((cond, body));
        while self.eat_kw("elseif") {
            let cond = self.parse_expr();
            self.eat_terminators();
            let body = self.parse_block_until(&["elseif", "else", "end"]);
            branches.push((cond, body));
        }
        let else_branch = if self.eat_kw("else") {
            self.eat_terminators();
            Some(self.parse_block_until(&["end"]))
        } else {
            None
        };
        self.eat_kw("end");
        Stmt::If {
            branches,
            else_branch,
            id,
        }
    }

    fn parse_for(&mut self) -> Stmt {
        let id = self.idgen.next();
        self.advance(); // for
        let var_tok = self.advance();
        let var = self.intern_ident(&var_tok);
        self.eat_op("=");
        let iterable = self.parse_expr();
        self.eat_terminators();
        let body = self.parse_block_until(&["end"]);
        self.eat_kw("end");
        Stmt::For {
            var,
            iterable,
            body,
            id,
        }
    }

    fn parse_while(&mut self) -> Stmt {
        let id = self.idgen.next();
        self.advance(); // while
        let cond = self.parse_expr();
        self.eat_terminators();
        let body = self.parse_block_until(&["end"]);
        self.eat_kw("end");
        Stmt::While { cond, body, id }
    }

    fn parse_try(&mut self) -> Stmt {
        let id = self.idgen.next();
        self.advance(); // try
        self.eat_terminators();
        let body = self.parse_block_until(&["catch", "end"]);
        let mut catch_var = None;
        let catch_body = if self.eat_kw("catch") {
            if self.is_ident() {
                let tok = self.advance();
                catch_var = Some(self.intern_ident(&tok));
            }
            self.eat_terminators();
            self.parse_block_until(&["end"])
        } else {
            Block::default()
        };
        self.eat_kw("end");
        Stmt::Try {
            body,
            catch_var,
            catch_body,
            id,
        }
    }

    fn parse_import(&mut self) -> Stmt {
        let token = self.advance(); // import
        let mut path_components = Vec::new();
        let mut is_wildcard = false;
        loop {
            if self.is_ident() {
                let tok = self.advance();
                path_components.push(self.intern_ident(&tok));
            } else {
                break;
            }
            if self.eat_punct(".") {
                if self.eat_op("*") {
                    is_wildcard = true;
                    break;
                }
                continue;
            }
            break;
        }
        self.eat_terminators();
        Stmt::ModuleUse(ModuleUseStmt {
            path_components,
            is_wildcard,
            is_exported: false,
            token,
            id: self.idgen.next(),
        })
    }

    fn parse_function_def(&mut self, parent_value_scope: Option<ValueScopeId>) -> FunctionDefNode {
        self.advance(); // function
        let mut outputs = Vec::new();
        if self.is_punct("[") {
            self.advance();
            while !self.is_punct("]") && !self.at_eof() {
                let tok = self.advance();
                outputs.push(self.intern_ident(&tok));
                if !self.eat_punct(",") {
                    break;
                }
            }
            self.expect_punct("]");
            self.eat_op("=");
        } else if self.is_ident() && self.peek_at(1).kind == TokenKind::Operator && &*self.peek_at(1).lexeme == "="
        {
            let tok = self.advance();
            outputs.push(self.intern_ident(&tok));
            self.advance(); // =
        }

        let name_token = self.advance();
        let name = self.intern_ident(&name_token);

        let mut inputs = Vec::new();
        if self.eat_punct("(") {
            while !self.is_punct(")") && !self.at_eof() {
                if self.is_op("~") {
                    self.advance();
                    inputs.push(FunctionInputParameter { name: None });
                } else {
                    let tok = self.advance();
                    inputs.push(FunctionInputParameter {
                        name: Some(self.intern_ident(&tok)),
                    });
                }
                if !self.eat_punct(",") {
                    break;
                }
            }
            self.expect_punct(")");
        }
        self.eat_terminators();

        let value_scope = self.value_scopes.new_scope(parent_value_scope);
        let type_scope = self.type_scopes.new_scope(None);

        let mut declared_type = None;
        if self.peek().kind == TokenKind::TypeAnnotBlock {
            let tok = self.advance();
            if let Ok(item) = TypeAnnotParser::parse(&tok.lexeme, self.registry, self.idgen) {
                declared_type = match item {
                    TypeAnnotItem::Inline(node) => Some(node),
                    TypeAnnotItem::Fun(sig) => Some(mtype_ir::ast::TypeNode::Function {
                        inputs: sig.inputs,
                        outputs: sig.outputs,
                        id: self.idgen.next(),
                    }),
                    _ => None,
                };
            }
        }

        let body = self.parse_block_until(&["end"]);
        self.eat_kw("end");

        FunctionDefNode {
            header: FunctionHeader {
                name,
                name_token,
                outputs,
                inputs,
            },
            body,
            attributes: MethodAttributes::default(),
            value_scope,
            type_scope,
            declared_type,
            id: self.idgen.next(),
        }
    }

    fn parse_class_def(&mut self) -> Stmt {
        let id = self.idgen.next();
        self.advance(); // classdef
        let name_token = self.advance();
        let name = self.intern_ident(&name_token);
        let mut superclasses = Vec::new();
        if self.eat_op("<") {
            loop {
                let tok = self.advance();
                superclasses.push(self.intern_ident(&tok));
                if !self.eat_op("&") {
                    break;
                }
            }
        }
        self.eat_terminators();

        let value_scope = self.value_scopes.new_scope(None);
        let type_scope = self.type_scopes.new_scope(None);
        let mut properties = Vec::new();
        let mut method_defs = Vec::new();

        while !self.is_kw("end") && !self.at_eof() {
            if self.eat_kw("properties") {
                self.skip_access_specifier_block_header();
                self.eat_terminators();
                while !self.is_kw("end") && !self.at_eof() {
                    let tok = self.advance();
                    let prop_name = self.intern_ident(&tok);
                    let mut declared_type = None;
                    if self.peek().kind == TokenKind::TypeAnnotBlock {
                        let ann = self.advance();
                        if let Ok(TypeAnnotItem::Inline(node)) =
                            TypeAnnotParser::parse(&ann.lexeme, self.registry, self.idgen)
                        {
                            declared_type = Some(node);
                        }
                    }
                    self.eat_terminators();
                    properties.push(PropertyDef {
                        name: prop_name,
                        declared_type,
                    });
                }
                self.eat_kw("end");
            } else if self.eat_kw("methods") {
                self.skip_access_specifier_block_header();
                self.eat_terminators();
                while self.is_kw("function") {
                    method_defs.push(self.parse_function_def(Some(value_scope)));
                }
                self.eat_kw("end");
            } else {
                self.error_here(ParseErrorKind::Lexical);
                self.advance();
            }
        }
        self.eat_kw("end");

        Stmt::ClassDef(Box::new(ClassDefNode {
            name,
            name_token,
            superclasses,
            properties,
            method_defs,
            def_handle: mtype_ir::ClassDefHandle::INVALID,
            value_scope,
            type_scope,
            id,
        }))
    }

    /// `properties (Access = private)` / `methods (Static)` headers: the
    /// access-specifier parenthesized list is consumed but not modeled —
    /// `AccessSpecifier` is attached per-method, not tracked here.
    fn skip_access_specifier_block_header(&mut self) {
        if self.eat_punct("(") {
            let mut depth = 1;
            while depth > 0 && !self.at_eof() {
                if self.is_punct("(") {
                    depth += 1;
                } else if self.is_punct(")") {
                    depth -= 1;
                }
                self.advance();
            }
        }
    }

    // -- expressions -------------------------------------------------------

    fn parse_expr(&mut self) -> Expr {
        self.parse_or_or()
    }

    fn parse_or_or(&mut self) -> Expr {
        let mut lhs = self.parse_and_and();
        while self.is_op("||") {
            let token = self.advance();
            let rhs = self.parse_and_and();
            lhs = self.mk_binary(BinaryOp::ShortCircuitOr, lhs, rhs, token);
        }
        lhs
    }

    fn parse_and_and(&mut self) -> Expr {
        let mut lhs = self.parse_or();
        while self.is_op("&&") {
            let token = self.advance();
            let rhs = self.parse_or();
            lhs = self.mk_binary(BinaryOp::ShortCircuitAnd, lhs, rhs, token);
        }
        lhs
    }

    fn parse_or(&mut self) -> Expr {
        let mut lhs = self.parse_and();
        while self.is_op("|") {
            let token = self.advance();
            let rhs = self.parse_and();
            lhs = self.mk_binary(BinaryOp::Or, lhs, rhs, token);
        }
        lhs
    }

    fn parse_and(&mut self) -> Expr {
        let mut lhs = self.parse_rel();
        while self.is_op("&") {
            let token = self.advance();
            let rhs = self.parse_rel();
            lhs = self.mk_binary(BinaryOp::And, lhs, rhs, token);
        }
        lhs
    }

    fn parse_rel(&mut self) -> Expr {
        let mut lhs = self.parse_colon();
        loop {
            let op = match &*self.peek().lexeme {
                "<" if self.peek().kind == TokenKind::Operator => BinaryOp::Lt,
                "<=" if self.peek().kind == TokenKind::Operator => BinaryOp::Le,
                ">" if self.peek().kind == TokenKind::Operator => BinaryOp::Gt,
                ">=" if self.peek().kind == TokenKind::Operator => BinaryOp::Ge,
                "==" if self.peek().kind == TokenKind::Operator => BinaryOp::Eq,
                "~=" if self.peek().kind == TokenKind::Operator => BinaryOp::Ne,
                _ => break,
            };
            let token = self.advance();
            let rhs = self.parse_colon();
            lhs = self.mk_binary(op, lhs, rhs, token);
        }
        lhs
    }

    fn parse_colon(&mut self) -> Expr {
        let mut lhs = self.parse_additive();
        while self.is_op(":") {
            let token = self.advance();
            let rhs = self.parse_additive();
            lhs = self.mk_binary(BinaryOp::Colon, lhs, rhs, token);
        }
        lhs
    }

    fn parse_additive(&mut self) -> Expr {
        let mut lhs = self.parse_mul();
        loop {
            let op = match &*self.peek().lexeme {
                "+" if self.peek().kind == TokenKind::Operator => BinaryOp::Add,
                "-" if self.peek().kind == TokenKind::Operator => BinaryOp::Sub,
                _ => break,
            };
            let token = self.advance();
            let rhs = self.parse_mul();
            lhs = self.mk_binary(op, lhs, rhs, token);
        }
        lhs
    }

    fn parse_mul(&mut self) -> Expr {
        let mut lhs = self.parse_unary();
        loop {
            let op = if self.peek().kind != TokenKind::Operator {
                break;
            } else {
                match &*self.peek().lexeme {
                    "*" => BinaryOp::MatMul,
                    ".*" => BinaryOp::Mul,
                    "/" => BinaryOp::MatDiv,
                    "./" => BinaryOp::Div,
                    "\\" => BinaryOp::MatLeftDiv,
                    ".\\" => BinaryOp::LeftDiv,
                    _ => break,
                }
            };
            let token = self.advance();
            let rhs = self.parse_unary();
            lhs = self.mk_binary(op, lhs, rhs, token);
        }
        lhs
    }

    fn parse_unary(&mut self) -> Expr {
        let op = if self.peek().kind == TokenKind::Operator {
            match &*self.peek().lexeme {
                "-" => Some(UnaryOp::Neg),
                "+" => Some(UnaryOp::Plus),
                "~" => Some(UnaryOp::Not),
                _ => None,
            }
        } else {
            None
        };
        if let Some(op) = op {
            let token = self.advance();
            let operand = self.parse_unary();
            return Expr::Unary {
                op,
                operand: Box::new(operand),
                token,
                id: self.idgen.next(),
            };
        }
        self.parse_pow()
    }

    fn parse_pow(&mut self) -> Expr {
        let mut lhs = self.parse_postfix_expr();
        loop {
            let op = if self.peek().kind != TokenKind::Operator {
                break;
            } else {
                match &*self.peek().lexeme {
                    "^" => BinaryOp::MatPow,
                    ".^" => BinaryOp::Pow,
                    _ => break,
                }
            };
            let token = self.advance();
            let rhs = self.parse_unary();
            lhs = self.mk_binary(op, lhs, rhs, token);
        }
        lhs
    }

    fn mk_binary(&mut self, op: BinaryOp, lhs: Expr, rhs: Expr, token: Token) -> Expr {
        Expr::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
            token,
            id: self.idgen.next(),
        }
    }

    fn parse_postfix_expr(&mut self) -> Expr {
        let mut expr = self.parse_primary();
        loop {
            if self.is_punct("(") {
                let token = self.advance();
                let args = self.parse_args_until(")");
                self.expect_punct(")");
                let is_bare_head = matches!(expr, Expr::Var { .. });
                expr = if is_bare_head {
                    Expr::Call {
                        callee: Box::new(expr),
                        args,
                        token,
                        id: self.idgen.next(),
                    }
                } else {
                    Expr::Index {
                        target: Box::new(expr),
                        kind: IndexKind::Paren,
                        args,
                        token,
                        id: self.idgen.next(),
                    }
                };
            } else if self.is_punct("{") {
                let token = self.advance();
                let args = self.parse_args_until("}");
                self.expect_punct("}");
                expr = Expr::Index {
                    target: Box::new(expr),
                    kind: IndexKind::Brace,
                    args,
                    token,
                    id: self.idgen.next(),
                };
            } else if self.is_punct(".") {
                let token = self.advance();
                let field_tok = self.advance();
                let field = self.intern_ident(&field_tok);
                expr = Expr::Field {
                    base: Box::new(expr),
                    field,
                    token,
                    id: self.idgen.next(),
                };
            } else if self.is_op(".'") || self.is_op("'") {
                let op = if self.is_op(".'") {
                    UnaryOp::Transpose
                } else {
                    UnaryOp::ComplexTranspose
                };
                let token = self.advance();
                expr = Expr::Unary {
                    op,
                    operand: Box::new(expr),
                    token,
                    id: self.idgen.next(),
                };
            } else {
                break;
            }
        }
        expr
    }

    fn parse_args_until(&mut self, closer: &str) -> Vec<Expr> {
        let mut args = Vec::new();
        while !self.is_punct(closer) && !self.at_eof() {
            args.push(self.parse_expr());
            if !self.eat_punct(",") {
                break;
            }
        }
        args
    }

    fn parse_primary(&mut self) -> Expr {
        let tok = self.peek().clone();
        match tok.kind {
            TokenKind::Number => {
                self.advance();
                let value = tok.lexeme.parse::<f64>().unwrap_or(0.0);
                Expr::Number { value, id: self.idgen.next() }
            }
            TokenKind::Char => {
                self.advance();
                let mut chars = tok.lexeme.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Expr::Char { value: c, id: self.idgen.next() },
                    _ => Expr::Str {
                        value: tok.lexeme.to_string(),
                        id: self.idgen.next(),
                    },
                }
            }
            TokenKind::String => {
                self.advance();
                Expr::Str {
                    value: tok.lexeme.to_string(),
                    id: self.idgen.next(),
                }
            }
            TokenKind::Keyword if &*tok.lexeme == "true" => {
                self.advance();
                Expr::Bool { value: true, id: self.idgen.next() }
            }
            TokenKind::Keyword if &*tok.lexeme == "false" => {
                self.advance();
                Expr::Bool { value: false, id: self.idgen.next() }
            }
            TokenKind::Keyword if &*tok.lexeme == "end" => {
                self.advance();
                Expr::EndOfIndex { id: self.idgen.next() }
            }
            TokenKind::Identifier => {
                self.advance();
                Expr::Var {
                    ident: self.intern_ident(&tok),
                    token: tok,
                    id: self.idgen.next(),
                }
            }
            TokenKind::Operator if &*tok.lexeme == ":" => {
                self.advance();
                Expr::Colon { id: self.idgen.next() }
            }
            TokenKind::Punctuation if &*tok.lexeme == "@" => self.parse_anonymous(),
            TokenKind::Punctuation if &*tok.lexeme == "(" => {
                self.advance();
                let inner = self.parse_expr();
                self.expect_punct(")");
                inner
            }
            TokenKind::Punctuation if &*tok.lexeme == "[" => {
                self.advance();
                let elements = self.parse_args_until("]");
                self.expect_punct("]");
                Expr::ConcatList {
                    elements,
                    is_cell: false,
                    id: self.idgen.next(),
                }
            }
            TokenKind::Punctuation if &*tok.lexeme == "{" => {
                self.advance();
                let elements = self.parse_args_until("}");
                self.expect_punct("}");
                Expr::ConcatList {
                    elements,
                    is_cell: true,
                    id: self.idgen.next(),
                }
            }
            _ => {
                self.error_here(ParseErrorKind::Lexical);
                self.advance();
                Expr::Number { value: 0.0, id: self.idgen.next() }
            }
        }
    }

    fn parse_anonymous(&mut self) -> Expr {
        self.advance(); // @
        let mut params = Vec::new();
        if self.eat_punct("(") {
            while !self.is_punct(")") && !self.at_eof() {
                let tok = self.advance();
                params.push(self.intern_ident(&tok));
                if !self.eat_punct(",") {
                    break;
                }
            }
            self.expect_punct(")");
        }
        let value_scope = self.value_scopes.new_scope(None);
        let body = Box::new(self.parse_expr());
        Expr::Anonymous {
            params,
            body,
            value_scope,
            id: self.idgen.next(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delimiters::insert_implicit_expr_delimiters;
    use crate::scan::{Scanner, WorkspaceScanner};
    use mtype_ir::NodeIdGen;

    fn parse_source(source: &str) -> (ParseOutput, StringRegistry) {
        let registry = StringRegistry::new();
        let scanned = WorkspaceScanner.scan(source).unwrap().tokens;
        let tokens = insert_implicit_expr_delimiters(&scanned);
        let mut idgen = NodeIdGen::default();
        let mut value_scopes = ValueScopes::new();
        let mut type_scopes = TypeScopes::new();
        let output = WorkspaceParser.parse(&tokens, &registry, &mut idgen, &mut value_scopes, &mut type_scopes);
        (output, registry)
    }

    #[test]
    fn parses_a_simple_assignment() {
        let (output, _registry) = parse_source("x = 1;");
        assert!(output.errors.is_empty());
        assert_eq!(output.root.block.stmts.len(), 1);
        assert!(matches!(output.root.block.stmts[0], Stmt::Assign { .. }));
    }

    #[test]
    fn parses_a_function_with_a_call_in_its_body() {
        let (output, _registry) = parse_source("function y = r(x)\ny = r(x);\nend");
        assert!(output.errors.is_empty());
        assert_eq!(output.root.block.stmts.len(), 1);
        let Stmt::FunctionDef(def) = &output.root.block.stmts[0] else {
            panic!("expected a function def");
        };
        assert_eq!(def.header.inputs.len(), 1);
        assert_eq!(def.header.outputs.len(), 1);
        assert_eq!(def.body.stmts.len(), 1);
    }

    #[test]
    fn parses_a_multi_output_destructured_assignment() {
        let (output, _registry) = parse_source("[a, b] = pair;");
        assert_eq!(output.root.block.stmts.len(), 1);
        let Stmt::Assign { targets, .. } = &output.root.block.stmts[0] else {
            panic!("expected an assign");
        };
        assert_eq!(targets.len(), 2);
    }

    #[test]
    fn parses_an_implicit_list_without_commas() {
        let (output, _registry) = parse_source("a = [1 2 3];");
        let Stmt::Assign { value, .. } = &output.root.block.stmts[0] else {
            panic!("expected an assign");
        };
        let Expr::ConcatList { elements, .. } = value else {
            panic!("expected a concat list");
        };
        assert_eq!(elements.len(), 3);
    }

    #[test]
    fn parses_an_anonymous_function() {
        let (output, _registry) = parse_source("f = @(x) x + 1;");
        let Stmt::Assign { value, .. } = &output.root.block.stmts[0] else {
            panic!("expected an assign");
        };
        assert!(matches!(value, Expr::Anonymous { .. }));
    }

    #[test]
    fn binary_precedence_binds_mul_tighter_than_add() {
        let (output, _registry) = parse_source("y = 1 + 2 * 3;");
        let Stmt::Assign { value, .. } = &output.root.block.stmts[0] else {
            panic!("expected an assign");
        };
        let Expr::Binary { op, rhs, .. } = value else {
            panic!("expected a binary expr");
        };
        assert_eq!(*op, BinaryOp::Add);
        assert!(matches!(**rhs, Expr::Binary { op: BinaryOp::MatMul, .. }));
    }

    #[test]
    fn parses_an_if_else_statement() {
        let (output, _registry) = parse_source("if x > 0\ny = 1;\nelse\ny = 2;\nend");
        assert_eq!(output.root.block.stmts.len(), 1);
        let Stmt::If { branches, else_branch, .. } = &output.root.block.stmts[0] else {
            panic!("expected an if");
        };
        assert_eq!(branches.len(), 1);
        assert!(else_branch.is_some());
    }
}
