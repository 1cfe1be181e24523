//! Node and element types of the syntax tree.

use super::range::Range;
use crate::pysyn::token::{Special, Token, TokenKind};

/// How a parameter binds its argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamKind {
    Positional,
    /// `*args`
    VarArgs,
    /// `**kwargs`
    KwArgs,
    /// `(a, b)` unpacking parameter of the 2.x grammars; holds nested params.
    Tuple,
    /// The bare `*` that starts keyword-only parameters.
    KeywordOnlyMarker,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Module,
    Suite,

    // Simple statements
    Expr,
    Assign,
    AugAssign { op: String },
    Print,
    Del,
    Pass,
    Break,
    Continue,
    Return,
    Raise,
    Global { names: Vec<String> },
    Nonlocal { names: Vec<String> },
    Exec,
    Assert,
    Import,
    ImportFrom { module: String, level: usize },
    Alias { name: String, asname: Option<String> },

    // Compound statements and their clauses
    If,
    Elif,
    Else,
    While,
    For,
    Try,
    ExceptHandler,
    Finally,
    With,
    FunctionDef { name: String },
    ClassDef { name: String },
    Decorator { name: String },
    Parameters,
    Param { name: String, kind: ParamKind },

    // Expressions
    Name { id: String },
    Num { text: String },
    Str { text: String },
    StrJoin,
    BoolOp { op: String },
    BinOp { op: String },
    UnaryOp { op: String },
    Compare { ops: Vec<String> },
    IfExp,
    Lambda,
    Call,
    Keyword { arg: String },
    Starred { double: bool },
    Attribute { attr: String },
    Subscript,
    Slice,
    Ellipsis,
    Tuple,
    List,
    Dict,
    DictItem,
    Set,
    ListComp,
    GeneratorExp,
    DictComp,
    SetComp,
    Comprehension,
    CompIf,
    Repr,
    Yield,
    Paren,

    /// Tokens no production could match.
    Error,
}

impl NodeKind {
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Module => "Module",
            NodeKind::Suite => "Suite",
            NodeKind::Expr => "Expr",
            NodeKind::Assign => "Assign",
            NodeKind::AugAssign { .. } => "AugAssign",
            NodeKind::Print => "Print",
            NodeKind::Del => "Del",
            NodeKind::Pass => "Pass",
            NodeKind::Break => "Break",
            NodeKind::Continue => "Continue",
            NodeKind::Return => "Return",
            NodeKind::Raise => "Raise",
            NodeKind::Global { .. } => "Global",
            NodeKind::Nonlocal { .. } => "Nonlocal",
            NodeKind::Exec => "Exec",
            NodeKind::Assert => "Assert",
            NodeKind::Import => "Import",
            NodeKind::ImportFrom { .. } => "ImportFrom",
            NodeKind::Alias { .. } => "Alias",
            NodeKind::If => "If",
            NodeKind::Elif => "Elif",
            NodeKind::Else => "Else",
            NodeKind::While => "While",
            NodeKind::For => "For",
            NodeKind::Try => "Try",
            NodeKind::ExceptHandler => "ExceptHandler",
            NodeKind::Finally => "Finally",
            NodeKind::With => "With",
            NodeKind::FunctionDef { .. } => "FunctionDef",
            NodeKind::ClassDef { .. } => "ClassDef",
            NodeKind::Decorator { .. } => "Decorator",
            NodeKind::Parameters => "Parameters",
            NodeKind::Param { .. } => "Param",
            NodeKind::Name { .. } => "Name",
            NodeKind::Num { .. } => "Num",
            NodeKind::Str { .. } => "Str",
            NodeKind::StrJoin => "StrJoin",
            NodeKind::BoolOp { .. } => "BoolOp",
            NodeKind::BinOp { .. } => "BinOp",
            NodeKind::UnaryOp { .. } => "UnaryOp",
            NodeKind::Compare { .. } => "Compare",
            NodeKind::IfExp => "IfExp",
            NodeKind::Lambda => "Lambda",
            NodeKind::Call => "Call",
            NodeKind::Keyword { .. } => "Keyword",
            NodeKind::Starred { .. } => "Starred",
            NodeKind::Attribute { .. } => "Attribute",
            NodeKind::Subscript => "Subscript",
            NodeKind::Slice => "Slice",
            NodeKind::Ellipsis => "Ellipsis",
            NodeKind::Tuple => "Tuple",
            NodeKind::List => "List",
            NodeKind::Dict => "Dict",
            NodeKind::DictItem => "DictItem",
            NodeKind::Set => "Set",
            NodeKind::ListComp => "ListComp",
            NodeKind::GeneratorExp => "GeneratorExp",
            NodeKind::DictComp => "DictComp",
            NodeKind::SetComp => "SetComp",
            NodeKind::Comprehension => "Comprehension",
            NodeKind::CompIf => "CompIf",
            NodeKind::Repr => "Repr",
            NodeKind::Yield => "Yield",
            NodeKind::Paren => "Paren",
            NodeKind::Error => "Error",
        }
    }

    /// Statements that own one or more suites.
    pub fn is_compound(&self) -> bool {
        matches!(
            self,
            NodeKind::If
                | NodeKind::While
                | NodeKind::For
                | NodeKind::Try
                | NodeKind::With
                | NodeKind::FunctionDef { .. }
                | NodeKind::ClassDef { .. }
        )
    }
}

/// One entry of a node's ordered contents.
#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    Node(Node),
    Token(Token),
}

impl Element {
    pub fn as_node(&self) -> Option<&Node> {
        match self {
            Element::Node(node) => Some(node),
            Element::Token(_) => None,
        }
    }

    pub fn as_token(&self) -> Option<&Token> {
        match self {
            Element::Token(token) => Some(token),
            Element::Node(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    pub range: Range,
    pub elements: Vec<Element>,
    /// Comments printed right before the node.
    pub before: Vec<Special>,
    /// Comments printed right after the node.
    pub after: Vec<Special>,
}

impl Node {
    pub fn new(kind: NodeKind, range: Range, elements: Vec<Element>) -> Self {
        Self {
            kind,
            range,
            elements,
            before: Vec::new(),
            after: Vec::new(),
        }
    }

    pub fn kind_name(&self) -> &'static str {
        self.kind.name()
    }

    /// Direct child nodes in source order.
    pub fn children(&self) -> impl Iterator<Item = &Node> {
        self.elements.iter().filter_map(Element::as_node)
    }

    /// Direct leaf tokens in source order.
    pub fn tokens(&self) -> impl Iterator<Item = &Token> {
        self.elements.iter().filter_map(Element::as_token)
    }

    /// Every leaf token of the subtree, in source order.
    pub fn leaves(&self) -> Vec<&Token> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a Token>) {
        for element in &self.elements {
            match element {
                Element::Token(token) => out.push(token),
                Element::Node(node) => node.collect_leaves(out),
            }
        }
    }

    /// The identifier a named node introduces or refers to.
    pub fn name(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::FunctionDef { name }
            | NodeKind::ClassDef { name }
            | NodeKind::Decorator { name }
            | NodeKind::Alias { name, .. } => Some(name),
            NodeKind::Param { name, .. } if !name.is_empty() => Some(name),
            NodeKind::Name { id } => Some(id),
            NodeKind::Keyword { arg } => Some(arg),
            NodeKind::Attribute { attr } => Some(attr),
            NodeKind::ImportFrom { module, .. } if !module.is_empty() => Some(module),
            _ => None,
        }
    }

    /// The first suite of a compound statement or clause.
    pub fn body(&self) -> Option<&Node> {
        self.children().find(|child| child.kind == NodeKind::Suite)
    }

    /// Statements of a module or suite; empty for other nodes.
    pub fn statements(&self) -> Vec<&Node> {
        match self.kind {
            NodeKind::Module | NodeKind::Suite => self.children().collect(),
            _ => Vec::new(),
        }
    }

    /// All nodes of the subtree (this one included) matching `predicate`,
    /// depth-first in source order.
    pub fn find_all<F>(&self, predicate: F) -> Vec<&Node>
    where
        F: Fn(&NodeKind) -> bool,
    {
        let mut out = Vec::new();
        self.collect_matching(&predicate, &mut out);
        out
    }

    fn collect_matching<'a, F>(&'a self, predicate: &F, out: &mut Vec<&'a Node>)
    where
        F: Fn(&NodeKind) -> bool,
    {
        if predicate(&self.kind) {
            out.push(self);
        }
        for child in self.children() {
            child.collect_matching(predicate, out);
        }
    }

    pub fn is_error(&self) -> bool {
        self.kind == NodeKind::Error
    }

    pub fn contains_errors(&self) -> bool {
        !self.find_all(|kind| *kind == NodeKind::Error).is_empty()
    }

    /// Source text of the node without comments, trivia in front of the first
    /// leaf and layout tokens.
    pub fn code(&self) -> String {
        let mut out = String::new();
        let mut first = true;
        for token in self.leaves() {
            if token.kind.is_layout() && token.text.is_empty() {
                continue;
            }
            if !first {
                out.push_str(&token.leading);
            }
            out.push_str(&token.text);
            first = false;
        }
        out
    }

    /// First leaf whose kind is `kind`, searching direct leaves only.
    pub fn token_of(&self, kind: TokenKind) -> Option<&Token> {
        self.tokens().find(|token| token.kind == kind)
    }
}
