//! Visitor dispatch over node kinds
//!
//! Implement [Visitor] to handle each kind of node. There are no default
//! methods: a visitor states what it does for every kind, and a new kind does not
//! compile until every visitor handles it. Visitors that treat most kinds alike
//! can generate the uniform methods with [`forward_visits!`].
//!
//! Dispatch goes through [Node::accept]; a visitor that wants to descend calls
//! [Node::traverse] from its own methods.

use super::node::{Node, NodeKind};

pub trait Visitor {
    fn visit_module(&mut self, node: &Node);
    fn visit_suite(&mut self, node: &Node);

    fn visit_expr(&mut self, node: &Node);
    fn visit_assign(&mut self, node: &Node);
    fn visit_aug_assign(&mut self, node: &Node);
    fn visit_print(&mut self, node: &Node);
    fn visit_del(&mut self, node: &Node);
    fn visit_pass(&mut self, node: &Node);
    fn visit_break(&mut self, node: &Node);
    fn visit_continue(&mut self, node: &Node);
    fn visit_return(&mut self, node: &Node);
    fn visit_raise(&mut self, node: &Node);
    fn visit_global(&mut self, node: &Node);
    fn visit_nonlocal(&mut self, node: &Node);
    fn visit_exec(&mut self, node: &Node);
    fn visit_assert(&mut self, node: &Node);
    fn visit_import(&mut self, node: &Node);
    fn visit_import_from(&mut self, node: &Node);
    fn visit_alias(&mut self, node: &Node);

    fn visit_if(&mut self, node: &Node);
    fn visit_elif(&mut self, node: &Node);
    fn visit_else(&mut self, node: &Node);
    fn visit_while(&mut self, node: &Node);
    fn visit_for(&mut self, node: &Node);
    fn visit_try(&mut self, node: &Node);
    fn visit_except_handler(&mut self, node: &Node);
    fn visit_finally(&mut self, node: &Node);
    fn visit_with(&mut self, node: &Node);
    fn visit_function_def(&mut self, node: &Node);
    fn visit_class_def(&mut self, node: &Node);
    fn visit_decorator(&mut self, node: &Node);
    fn visit_parameters(&mut self, node: &Node);
    fn visit_param(&mut self, node: &Node);

    fn visit_name(&mut self, node: &Node);
    fn visit_num(&mut self, node: &Node);
    fn visit_str(&mut self, node: &Node);
    fn visit_str_join(&mut self, node: &Node);
    fn visit_bool_op(&mut self, node: &Node);
    fn visit_bin_op(&mut self, node: &Node);
    fn visit_unary_op(&mut self, node: &Node);
    fn visit_compare(&mut self, node: &Node);
    fn visit_if_exp(&mut self, node: &Node);
    fn visit_lambda(&mut self, node: &Node);
    fn visit_call(&mut self, node: &Node);
    fn visit_keyword(&mut self, node: &Node);
    fn visit_starred(&mut self, node: &Node);
    fn visit_attribute(&mut self, node: &Node);
    fn visit_subscript(&mut self, node: &Node);
    fn visit_slice(&mut self, node: &Node);
    fn visit_ellipsis(&mut self, node: &Node);
    fn visit_tuple(&mut self, node: &Node);
    fn visit_list(&mut self, node: &Node);
    fn visit_dict(&mut self, node: &Node);
    fn visit_dict_item(&mut self, node: &Node);
    fn visit_set(&mut self, node: &Node);
    fn visit_list_comp(&mut self, node: &Node);
    fn visit_generator_exp(&mut self, node: &Node);
    fn visit_dict_comp(&mut self, node: &Node);
    fn visit_set_comp(&mut self, node: &Node);
    fn visit_comprehension(&mut self, node: &Node);
    fn visit_comp_if(&mut self, node: &Node);
    fn visit_repr(&mut self, node: &Node);
    fn visit_yield(&mut self, node: &Node);
    fn visit_paren(&mut self, node: &Node);

    fn visit_error(&mut self, node: &Node);
}

impl Node {
    /// Dispatch to the visitor method for this node's kind.
    pub fn accept(&self, visitor: &mut dyn Visitor) {
        match &self.kind {
            NodeKind::Module => visitor.visit_module(self),
            NodeKind::Suite => visitor.visit_suite(self),
            NodeKind::Expr => visitor.visit_expr(self),
            NodeKind::Assign => visitor.visit_assign(self),
            NodeKind::AugAssign { .. } => visitor.visit_aug_assign(self),
            NodeKind::Print => visitor.visit_print(self),
            NodeKind::Del => visitor.visit_del(self),
            NodeKind::Pass => visitor.visit_pass(self),
            NodeKind::Break => visitor.visit_break(self),
            NodeKind::Continue => visitor.visit_continue(self),
            NodeKind::Return => visitor.visit_return(self),
            NodeKind::Raise => visitor.visit_raise(self),
            NodeKind::Global { .. } => visitor.visit_global(self),
            NodeKind::Nonlocal { .. } => visitor.visit_nonlocal(self),
            NodeKind::Exec => visitor.visit_exec(self),
            NodeKind::Assert => visitor.visit_assert(self),
            NodeKind::Import => visitor.visit_import(self),
            NodeKind::ImportFrom { .. } => visitor.visit_import_from(self),
            NodeKind::Alias { .. } => visitor.visit_alias(self),
            NodeKind::If => visitor.visit_if(self),
            NodeKind::Elif => visitor.visit_elif(self),
            NodeKind::Else => visitor.visit_else(self),
            NodeKind::While => visitor.visit_while(self),
            NodeKind::For => visitor.visit_for(self),
            NodeKind::Try => visitor.visit_try(self),
            NodeKind::ExceptHandler => visitor.visit_except_handler(self),
            NodeKind::Finally => visitor.visit_finally(self),
            NodeKind::With => visitor.visit_with(self),
            NodeKind::FunctionDef { .. } => visitor.visit_function_def(self),
            NodeKind::ClassDef { .. } => visitor.visit_class_def(self),
            NodeKind::Decorator { .. } => visitor.visit_decorator(self),
            NodeKind::Parameters => visitor.visit_parameters(self),
            NodeKind::Param { .. } => visitor.visit_param(self),
            NodeKind::Name { .. } => visitor.visit_name(self),
            NodeKind::Num { .. } => visitor.visit_num(self),
            NodeKind::Str { .. } => visitor.visit_str(self),
            NodeKind::StrJoin => visitor.visit_str_join(self),
            NodeKind::BoolOp { .. } => visitor.visit_bool_op(self),
            NodeKind::BinOp { .. } => visitor.visit_bin_op(self),
            NodeKind::UnaryOp { .. } => visitor.visit_unary_op(self),
            NodeKind::Compare { .. } => visitor.visit_compare(self),
            NodeKind::IfExp => visitor.visit_if_exp(self),
            NodeKind::Lambda => visitor.visit_lambda(self),
            NodeKind::Call => visitor.visit_call(self),
            NodeKind::Keyword { .. } => visitor.visit_keyword(self),
            NodeKind::Starred { .. } => visitor.visit_starred(self),
            NodeKind::Attribute { .. } => visitor.visit_attribute(self),
            NodeKind::Subscript => visitor.visit_subscript(self),
            NodeKind::Slice => visitor.visit_slice(self),
            NodeKind::Ellipsis => visitor.visit_ellipsis(self),
            NodeKind::Tuple => visitor.visit_tuple(self),
            NodeKind::List => visitor.visit_list(self),
            NodeKind::Dict => visitor.visit_dict(self),
            NodeKind::DictItem => visitor.visit_dict_item(self),
            NodeKind::Set => visitor.visit_set(self),
            NodeKind::ListComp => visitor.visit_list_comp(self),
            NodeKind::GeneratorExp => visitor.visit_generator_exp(self),
            NodeKind::DictComp => visitor.visit_dict_comp(self),
            NodeKind::SetComp => visitor.visit_set_comp(self),
            NodeKind::Comprehension => visitor.visit_comprehension(self),
            NodeKind::CompIf => visitor.visit_comp_if(self),
            NodeKind::Repr => visitor.visit_repr(self),
            NodeKind::Yield => visitor.visit_yield(self),
            NodeKind::Paren => visitor.visit_paren(self),
            NodeKind::Error => visitor.visit_error(self),
        }
    }

    /// Accept the visitor on every child node, in source order.
    pub fn traverse(&self, visitor: &mut dyn Visitor) {
        for child in self.children() {
            child.accept(visitor);
        }
    }
}

/// Implement every [Visitor] method by calling `self.$handler(node)`.
#[macro_export]
macro_rules! forward_visits {
    ($handler:ident) => {
        $crate::forward_visits!(@methods $handler;
            visit_module, visit_suite, visit_expr, visit_assign, visit_aug_assign,
            visit_print, visit_del, visit_pass, visit_break, visit_continue, visit_return,
            visit_raise, visit_global, visit_nonlocal, visit_exec, visit_assert,
            visit_import, visit_import_from, visit_alias, visit_if, visit_elif, visit_else,
            visit_while, visit_for, visit_try, visit_except_handler, visit_finally,
            visit_with, visit_function_def, visit_class_def, visit_decorator,
            visit_parameters, visit_param, visit_name, visit_num, visit_str,
            visit_str_join, visit_bool_op, visit_bin_op, visit_unary_op, visit_compare,
            visit_if_exp, visit_lambda, visit_call, visit_keyword, visit_starred,
            visit_attribute, visit_subscript, visit_slice, visit_ellipsis, visit_tuple,
            visit_list, visit_dict, visit_dict_item, visit_set, visit_list_comp,
            visit_generator_exp, visit_dict_comp, visit_set_comp, visit_comprehension,
            visit_comp_if, visit_repr, visit_yield, visit_paren, visit_error
        );
    };
    (@methods $handler:ident; $($method:ident),*) => {
        $(
            fn $method(&mut self, node: &$crate::pysyn::ast::Node) {
                self.$handler(node)
            }
        )*
    };
}

struct Walker<F> {
    callback: F,
}

impl<F: FnMut(&Node)> Walker<F> {
    fn enter(&mut self, node: &Node) {
        (self.callback)(node);
        node.traverse(self);
    }
}

impl<F: FnMut(&Node)> Visitor for Walker<F> {
    forward_visits!(enter);
}

/// Call `callback` on `node` and every node below it, depth-first.
pub fn walk<F: FnMut(&Node)>(node: &Node, callback: F) {
    node.accept(&mut Walker { callback });
}
