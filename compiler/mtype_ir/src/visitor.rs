//! Read-only AST traversal.
//!
//! The source's `StringVisitor`/accept-visitor hierarchy becomes a single
//! `Visitor` trait with default (no-op, recurse-into-children) methods, plus
//! free `walk_*` functions implementing the default recursion. A pass
//! overrides only the node kinds it cares about; everything else is walked
//! for it. Visitors never mutate the tree — passes that need to record
//! information thread it through `&mut self` on their own visitor type and
//! key it by [`NodeId`].

use crate::ast::{Block, Expr, RootBlock, Stmt, TypeAnnotItem, TypeNode};

#[allow(unused_variables)]
pub trait Visitor {
    fn visit_root_block(&mut self, root: &RootBlock) {
        walk_root_block(self, root);
    }

    fn visit_block(&mut self, block: &Block) {
        walk_block(self, block);
    }

    fn visit_stmt(&mut self, stmt: &Stmt) {
        walk_stmt(self, stmt);
    }

    fn visit_expr(&mut self, expr: &Expr) {
        walk_expr(self, expr);
    }

    fn visit_type_node(&mut self, ty: &TypeNode) {
        walk_type_node(self, ty);
    }

    fn visit_type_annot_item(&mut self, item: &TypeAnnotItem) {
        walk_type_annot_item(self, item);
    }
}

pub fn walk_root_block<V: Visitor + ?Sized>(v: &mut V, root: &RootBlock) {
    v.visit_block(&root.block);
}

pub fn walk_block<V: Visitor + ?Sized>(v: &mut V, block: &Block) {
    for stmt in &block.stmts {
        v.visit_stmt(stmt);
    }
}

pub fn walk_stmt<V: Visitor + ?Sized>(v: &mut V, stmt: &Stmt) {
    match stmt {
        Stmt::Assign { targets, value, .. } => {
            for target in targets {
                if let crate::ast::AssignTarget::Index { target, args, .. } = target {
                    v.visit_expr(target);
                    for arg in args {
                        v.visit_expr(arg);
                    }
                } else if let crate::ast::AssignTarget::Field { base, .. } = target {
                    v.visit_expr(base);
                }
            }
            v.visit_expr(value);
        }
        Stmt::Expr(e) => v.visit_expr(e),
        Stmt::If {
            branches,
            else_branch,
            ..
        } => {
            for (cond, body) in branches {
                v.visit_expr(cond);
                v.visit_block(body);
            }
            if let Some(else_branch) = else_branch {
                v.visit_block(else_branch);
            }
        }
        Stmt::For { iterable, body, .. } => {
            v.visit_expr(iterable);
            v.visit_block(body);
        }
        Stmt::While { cond, body, .. } => {
            v.visit_expr(cond);
            v.visit_block(body);
        }
        Stmt::Try {
            body, catch_body, ..
        } => {
            v.visit_block(body);
            v.visit_block(catch_body);
        }
        Stmt::Return { .. } | Stmt::Break { .. } | Stmt::Continue { .. } | Stmt::ModuleUse(_) => {}
        Stmt::FunctionDef(def) => v.visit_block(&def.body),
        Stmt::ClassDef(def) => {
            for method in &def.method_defs {
                v.visit_block(&method.body);
            }
        }
        Stmt::TypeAnnot(macro_) => v.visit_type_annot_item(&macro_.item),
    }
}

pub fn walk_expr<V: Visitor + ?Sized>(v: &mut V, expr: &Expr) {
    match expr {
        Expr::Number { .. }
        | Expr::Char { .. }
        | Expr::Str { .. }
        | Expr::Bool { .. }
        | Expr::Var { .. }
        | Expr::Colon { .. }
        | Expr::EndOfIndex { .. } => {}
        Expr::Unary { operand, .. } => v.visit_expr(operand),
        Expr::Binary { lhs, rhs, .. } => {
            v.visit_expr(lhs);
            v.visit_expr(rhs);
        }
        Expr::Call { callee, args, .. } => {
            v.visit_expr(callee);
            for arg in args {
                v.visit_expr(arg);
            }
        }
        Expr::Index { target, args, .. } => {
            v.visit_expr(target);
            for arg in args {
                v.visit_expr(arg);
            }
        }
        Expr::Field { base, .. } => v.visit_expr(base),
        Expr::Anonymous { body, .. } => v.visit_expr(body),
        Expr::ConcatList { elements, .. } => {
            for e in elements {
                v.visit_expr(e);
            }
        }
    }
}

pub fn walk_type_node<V: Visitor + ?Sized>(v: &mut V, ty: &TypeNode) {
    match ty {
        TypeNode::Scalar { args, .. } => {
            for arg in args {
                v.visit_type_node(arg);
            }
        }
        TypeNode::Function { inputs, outputs, .. } => {
            for i in inputs {
                v.visit_type_node(i);
            }
            for o in outputs {
                v.visit_type_node(o);
            }
        }
        TypeNode::Record { fields, .. } => {
            for field in fields {
                v.visit_type_node(&field.ty);
            }
        }
        TypeNode::Tuple { elements, .. } => {
            for e in elements {
                v.visit_type_node(e);
            }
        }
        TypeNode::Union { members, .. } => {
            for m in members {
                v.visit_type_node(m);
            }
        }
    }
}

pub fn walk_type_annot_item<V: Visitor + ?Sized>(v: &mut V, item: &TypeAnnotItem) {
    match item {
        TypeAnnotItem::Begin { contents, .. } | TypeAnnotItem::Namespace { contents, .. } => {
            for item in contents {
                v.visit_type_annot_item(item);
            }
        }
        TypeAnnotItem::Let { equal_to, .. } => v.visit_type_node(equal_to),
        TypeAnnotItem::Given { body, .. } => v.visit_type_annot_item(body),
        TypeAnnotItem::Fun(sig) | TypeAnnotItem::Constructor(sig) => {
            for i in &sig.inputs {
                v.visit_type_node(i);
            }
            for o in &sig.outputs {
                v.visit_type_node(o);
            }
        }
        TypeAnnotItem::Struct { fields, .. } => {
            for field in fields {
                v.visit_type_node(&field.ty);
            }
        }
        TypeAnnotItem::Declare { .. } => {}
        TypeAnnotItem::Inline(ty) => v.visit_type_node(ty),
    }
}
