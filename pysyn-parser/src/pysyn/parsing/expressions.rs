//! Expression productions.
//!
//! Precedence climbs from `test` (conditional expressions and lambdas) through the
//! boolean operators, comparisons, and the binary operator levels down to `power`
//! and atoms with their trailers. Binary levels share [Parser::binary] and fold to
//! the left.

use super::builder::{Attach, NodeBuilder, PResult, Salvage};
use super::Parser;
use crate::pysyn::ast::{Node, NodeKind};
use crate::pysyn::recovery::ErrorKind;
use crate::pysyn::token::TokenKind;

type Operand<'src> = fn(&mut Parser<'src>) -> PResult<Node>;

impl<'src> Parser<'src> {
    /// Comma-separated tests; a trailing comma or more than one item makes a `Tuple`.
    pub(super) fn testlist(&mut self) -> PResult<Node> {
        let first = self.test()?;
        self.sequence(first, Self::test, Self::at_expression_start)
    }

    /// Like [Parser::testlist] but items may be starred targets.
    pub(super) fn testlist_star_expr(&mut self) -> PResult<Node> {
        let first = self.star_or_test()?;
        self.sequence(first, Self::star_or_test, Self::at_star_or_expression)
    }

    /// Targets of `for` and `del`; stops below comparisons so `in` stays unread.
    pub(super) fn exprlist(&mut self) -> PResult<Node> {
        let first = self.star_or_expr()?;
        self.sequence(first, Self::star_or_expr, Self::at_star_or_expression)
    }

    /// The 2.x list comprehension source, which may be an unparenthesized tuple.
    fn testlist_safe(&mut self) -> PResult<Node> {
        let first = self.test_nocond()?;
        self.sequence(first, Self::test_nocond, Self::at_expression_start)
    }

    fn sequence(
        &mut self,
        first: Node,
        item: Operand<'src>,
        at_item: fn(&Self) -> bool,
    ) -> PResult<Node> {
        if !self.at(TokenKind::Comma) {
            return Ok(first);
        }
        let mut b = self.builder();
        b.node(first);
        while self.eat(&mut b, TokenKind::Comma) {
            if !at_item(self) {
                break;
            }
            item(self).attach(&mut b)?;
        }
        Ok(b.finish(NodeKind::Tuple))
    }

    fn at_star_or_expression(&self) -> bool {
        self.at(TokenKind::Star) || self.at_expression_start()
    }

    fn starred(&mut self, operand: Operand<'src>) -> PResult<Node> {
        self.gate(
            self.features.star_targets,
            ErrorKind::StatementMalformed,
            "starred expression",
        );
        let mut b = self.builder();
        b.token(self.bump());
        operand(self).attach(&mut b)?;
        Ok(b.finish(NodeKind::Starred { double: false }))
    }

    fn star_or_test(&mut self) -> PResult<Node> {
        if self.at(TokenKind::Star) {
            self.starred(Self::expr)
        } else {
            self.test()
        }
    }

    fn star_or_expr(&mut self) -> PResult<Node> {
        if self.at(TokenKind::Star) {
            self.starred(Self::expr)
        } else {
            self.expr()
        }
    }

    pub(super) fn test(&mut self) -> PResult<Node> {
        if self.at(TokenKind::Lambda) {
            return self.nested(|p| p.lambdef(false));
        }
        let body = self.or_test()?;
        if !self.at(TokenKind::If) {
            return Ok(body);
        }
        let mut b = self.builder();
        b.node(body);
        b.token(self.bump());
        self.or_test().attach(&mut b)?;
        self.expect(&mut b, TokenKind::Else)?;
        self.nested(Self::test).attach(&mut b)?;
        Ok(b.finish(NodeKind::IfExp))
    }

    /// A test without a conditional expression, as used after `if` in comprehensions.
    fn test_nocond(&mut self) -> PResult<Node> {
        if self.at(TokenKind::Lambda) {
            self.nested(|p| p.lambdef(true))
        } else {
            self.or_test()
        }
    }

    fn lambdef(&mut self, nocond: bool) -> PResult<Node> {
        let mut b = self.builder();
        b.token(self.bump());
        let mut params = self.builder();
        self.param_list(&mut params, false).salvage(&mut b)?;
        b.node(params.finish(NodeKind::Parameters));
        self.expect(&mut b, TokenKind::Colon)?;
        let body = if nocond { self.test_nocond() } else { self.test() };
        body.attach(&mut b)?;
        Ok(b.finish(NodeKind::Lambda))
    }

    fn or_test(&mut self) -> PResult<Node> {
        self.binary(&[TokenKind::Or], Self::and_test, |op| NodeKind::BoolOp { op })
    }

    fn and_test(&mut self) -> PResult<Node> {
        self.binary(&[TokenKind::And], Self::not_test, |op| NodeKind::BoolOp { op })
    }

    fn not_test(&mut self) -> PResult<Node> {
        if !self.at(TokenKind::Not) {
            return self.comparison();
        }
        let mut b = self.builder();
        b.token(self.bump());
        self.nested(Self::not_test).attach(&mut b)?;
        Ok(b.finish(NodeKind::UnaryOp { op: "not".into() }))
    }

    fn comparison(&mut self) -> PResult<Node> {
        let first = self.expr()?;
        if !self.at_comparison_operator() {
            return Ok(first);
        }
        let mut b = self.builder();
        b.node(first);
        let mut ops = Vec::new();
        while let Some(op) = self.comparison_operator(&mut b) {
            ops.push(op);
            self.expr().attach(&mut b)?;
        }
        Ok(b.finish(NodeKind::Compare { ops }))
    }

    fn at_comparison_operator(&mut self) -> bool {
        match self.kind() {
            TokenKind::Less
            | TokenKind::Greater
            | TokenKind::EqEqual
            | TokenKind::GreaterEqual
            | TokenKind::LessEqual
            | TokenKind::NotEqual
            | TokenKind::LegacyNotEqual
            | TokenKind::In
            | TokenKind::Is => true,
            TokenKind::Not => self.peek(1) == TokenKind::In,
            _ => false,
        }
    }

    /// Consume a comparison operator into `b`, returning its normalized text.
    fn comparison_operator(&mut self, b: &mut NodeBuilder) -> Option<String> {
        match self.kind() {
            TokenKind::Less
            | TokenKind::Greater
            | TokenKind::EqEqual
            | TokenKind::GreaterEqual
            | TokenKind::LessEqual
            | TokenKind::NotEqual
            | TokenKind::LegacyNotEqual
            | TokenKind::In => {
                let token = self.bump();
                let text = token.text.clone();
                b.token(token);
                Some(text)
            }
            TokenKind::Is => {
                b.token(self.bump());
                if self.eat(b, TokenKind::Not) {
                    Some("is not".into())
                } else {
                    Some("is".into())
                }
            }
            TokenKind::Not if self.peek(1) == TokenKind::In => {
                b.token(self.bump());
                b.token(self.bump());
                Some("not in".into())
            }
            _ => None,
        }
    }

    /// Left-folding binary level: `operand (op operand)*`.
    fn binary(
        &mut self,
        ops: &[TokenKind],
        operand: Operand<'src>,
        kind: fn(String) -> NodeKind,
    ) -> PResult<Node> {
        let mut left = operand(self)?;
        while ops.contains(&self.kind()) {
            let mut b = self.builder();
            b.node(left);
            let op = self.bump();
            let text = op.text.clone();
            b.token(op);
            operand(self).attach(&mut b)?;
            left = b.finish(kind(text));
        }
        Ok(left)
    }

    pub(super) fn expr(&mut self) -> PResult<Node> {
        self.binary(&[TokenKind::Vbar], Self::xor_expr, |op| NodeKind::BinOp { op })
    }

    fn xor_expr(&mut self) -> PResult<Node> {
        self.binary(&[TokenKind::Circumflex], Self::and_expr, |op| NodeKind::BinOp { op })
    }

    fn and_expr(&mut self) -> PResult<Node> {
        self.binary(&[TokenKind::Amper], Self::shift_expr, |op| NodeKind::BinOp { op })
    }

    fn shift_expr(&mut self) -> PResult<Node> {
        self.binary(
            &[TokenKind::LeftShift, TokenKind::RightShift],
            Self::arith_expr,
            |op| NodeKind::BinOp { op },
        )
    }

    fn arith_expr(&mut self) -> PResult<Node> {
        self.binary(&[TokenKind::Plus, TokenKind::Minus], Self::term, |op| {
            NodeKind::BinOp { op }
        })
    }

    fn term(&mut self) -> PResult<Node> {
        self.binary(
            &[
                TokenKind::Star,
                TokenKind::Slash,
                TokenKind::Percent,
                TokenKind::DoubleSlash,
            ],
            Self::factor,
            |op| NodeKind::BinOp { op },
        )
    }

    fn factor(&mut self) -> PResult<Node> {
        if !matches!(
            self.kind(),
            TokenKind::Plus | TokenKind::Minus | TokenKind::Tilde
        ) {
            return self.power();
        }
        let mut b = self.builder();
        let op = self.bump();
        let text = op.text.clone();
        b.token(op);
        self.nested(Self::factor).attach(&mut b)?;
        Ok(b.finish(NodeKind::UnaryOp { op: text }))
    }

    fn power(&mut self) -> PResult<Node> {
        let base = self.atom_expr()?;
        if !self.at(TokenKind::DoubleStar) {
            return Ok(base);
        }
        let mut b = self.builder();
        b.node(base);
        let op = self.bump();
        let text = op.text.clone();
        b.token(op);
        self.nested(Self::factor).attach(&mut b)?;
        Ok(b.finish(NodeKind::BinOp { op: text }))
    }

    fn atom_expr(&mut self) -> PResult<Node> {
        let mut node = self.atom()?;
        loop {
            node = match self.kind() {
                TokenKind::LParen => self.nested(|p| p.call(node))?,
                TokenKind::LBracket => self.nested(|p| p.subscription(node))?,
                TokenKind::Dot => self.attribute(node),
                _ => return Ok(node),
            };
        }
    }

    pub(super) fn call(&mut self, func: Node) -> PResult<Node> {
        let mut b = self.builder();
        b.node(func);
        b.token(self.bump());
        self.arguments(&mut b)?;
        self.close(&mut b, TokenKind::RParen);
        Ok(b.finish(NodeKind::Call))
    }

    /// Call arguments or class bases into `b`.
    ///
    /// Returns whether any keyword or star argument was among them.
    pub(super) fn arguments(&mut self, b: &mut NodeBuilder) -> PResult<bool> {
        let mut special = false;
        while self.at_star_or_expression() || self.at(TokenKind::DoubleStar) {
            let (argument, is_special) = self.argument().salvage(b)?;
            special |= is_special;
            b.node(argument);
            if !self.eat(b, TokenKind::Comma) {
                break;
            }
        }
        Ok(special)
    }

    fn argument(&mut self) -> PResult<(Node, bool)> {
        let mut b = self.builder();
        if self.at(TokenKind::Star) || self.at(TokenKind::DoubleStar) {
            let double = self.at(TokenKind::DoubleStar);
            b.token(self.bump());
            self.test().attach(&mut b)?;
            return Ok((b.finish(NodeKind::Starred { double }), true));
        }

        let value = self.test()?;
        if self.at(TokenKind::Equal) {
            if let NodeKind::Name { id } = &value.kind {
                let arg = id.clone();
                b.node(value);
                b.token(self.bump());
                self.test().attach(&mut b)?;
                return Ok((b.finish(NodeKind::Keyword { arg }), true));
            }
        }
        if self.at(TokenKind::For) {
            b.node(value);
            self.comprehensions(&mut b, false)?;
            return Ok((b.finish(NodeKind::GeneratorExp), false));
        }
        Ok((value, false))
    }

    fn subscription(&mut self, value: Node) -> PResult<Node> {
        let mut b = self.builder();
        b.node(value);
        b.token(self.bump());
        if !self.at_subscript_start() {
            return self.fail(&mut b, "subscript");
        }
        loop {
            self.subscript().attach(&mut b)?;
            if !self.eat(&mut b, TokenKind::Comma) || !self.at_subscript_start() {
                break;
            }
        }
        self.close(&mut b, TokenKind::RBracket);
        Ok(b.finish(NodeKind::Subscript))
    }

    fn at_subscript_start(&self) -> bool {
        self.at(TokenKind::Colon) || self.at_expression_start()
    }

    fn subscript(&mut self) -> PResult<Node> {
        let mut b = self.builder();
        if self.at(TokenKind::Ellipsis) && !self.features.ellipsis_atom {
            b.token(self.bump());
            return Ok(b.finish(NodeKind::Ellipsis));
        }
        if !self.at(TokenKind::Colon) {
            let lower = self.test()?;
            if !self.at(TokenKind::Colon) {
                return Ok(lower);
            }
            b.node(lower);
        }
        b.token(self.bump());
        if self.at_expression_start() {
            self.test().attach(&mut b)?;
        }
        if self.eat(&mut b, TokenKind::Colon) && self.at_expression_start() {
            self.test().attach(&mut b)?;
        }
        Ok(b.finish(NodeKind::Slice))
    }

    pub(super) fn attribute(&mut self, value: Node) -> Node {
        let mut b = self.builder();
        b.node(value);
        b.token(self.bump());
        let attr = self.name(&mut b);
        b.finish(NodeKind::Attribute { attr })
    }

    fn leaf(&mut self, kind: NodeKind) -> Node {
        let mut b = self.builder();
        b.token(self.bump());
        b.finish(kind)
    }

    fn atom(&mut self) -> PResult<Node> {
        let text = self.stream.current().text.clone();
        match self.kind() {
            TokenKind::Name => Ok(self.leaf(NodeKind::Name { id: text })),
            TokenKind::Number => Ok(self.leaf(NodeKind::Num { text })),
            TokenKind::String => Ok(self.strings()),
            TokenKind::LParen => self.nested(Self::paren_atom),
            TokenKind::LBracket => self.nested(Self::list_atom),
            TokenKind::LBrace => self.nested(Self::brace_atom),
            TokenKind::Backquote => self.nested(Self::repr_atom),
            TokenKind::Ellipsis if self.features.ellipsis_atom => {
                Ok(self.leaf(NodeKind::Ellipsis))
            }
            _ => {
                let mut b = self.builder();
                self.fail(&mut b, "expression")
            }
        }
    }

    /// One string, or adjacent strings joined into a `StrJoin`.
    fn strings(&mut self) -> Node {
        let mut parts = Vec::new();
        while self.at(TokenKind::String) {
            let text = self.stream.current().text.clone();
            parts.push(self.leaf(NodeKind::Str { text }));
        }
        if parts.len() == 1 {
            if let Some(single) = parts.pop() {
                return single;
            }
        }
        let mut b = self.builder();
        for part in parts {
            b.node(part);
        }
        b.finish(NodeKind::StrJoin)
    }

    fn paren_atom(&mut self) -> PResult<Node> {
        let mut b = self.builder();
        b.token(self.bump());
        if self.eat(&mut b, TokenKind::RParen) {
            return Ok(b.finish(NodeKind::Tuple));
        }
        if self.at(TokenKind::Yield) {
            self.yield_expr().attach(&mut b)?;
            self.close(&mut b, TokenKind::RParen);
            return Ok(b.finish(NodeKind::Paren));
        }

        self.star_or_test().attach(&mut b)?;
        let kind = match self.kind() {
            TokenKind::For => {
                self.comprehensions(&mut b, false)?;
                NodeKind::GeneratorExp
            }
            TokenKind::Comma => {
                self.items(&mut b, Self::star_or_test)?;
                NodeKind::Tuple
            }
            _ => NodeKind::Paren,
        };
        self.close(&mut b, TokenKind::RParen);
        Ok(b.finish(kind))
    }

    fn list_atom(&mut self) -> PResult<Node> {
        let mut b = self.builder();
        b.token(self.bump());
        if self.eat(&mut b, TokenKind::RBracket) {
            return Ok(b.finish(NodeKind::List));
        }
        self.star_or_test().attach(&mut b)?;
        let kind = if self.at(TokenKind::For) {
            self.comprehensions(&mut b, true)?;
            NodeKind::ListComp
        } else {
            self.items(&mut b, Self::star_or_test)?;
            NodeKind::List
        };
        self.close(&mut b, TokenKind::RBracket);
        Ok(b.finish(kind))
    }

    fn brace_atom(&mut self) -> PResult<Node> {
        let mut b = self.builder();
        b.token(self.bump());
        if self.eat(&mut b, TokenKind::RBrace) {
            return Ok(b.finish(NodeKind::Dict));
        }
        let key = self.test().salvage(&mut b)?;

        let kind = if self.at(TokenKind::Colon) || !self.features.set_literals {
            self.dict_item(key).attach(&mut b)?;
            if self.at(TokenKind::For) {
                self.gate(
                    self.features.dict_set_comprehensions,
                    ErrorKind::StatementMalformed,
                    "dict comprehension",
                );
                self.comprehensions(&mut b, false)?;
                NodeKind::DictComp
            } else {
                while self.eat(&mut b, TokenKind::Comma) {
                    if !self.at_expression_start() {
                        break;
                    }
                    let key = self.test().salvage(&mut b)?;
                    self.dict_item(key).attach(&mut b)?;
                }
                NodeKind::Dict
            }
        } else {
            b.node(key);
            if self.at(TokenKind::For) {
                self.gate(
                    self.features.dict_set_comprehensions,
                    ErrorKind::StatementMalformed,
                    "set comprehension",
                );
                self.comprehensions(&mut b, false)?;
                NodeKind::SetComp
            } else {
                self.items(&mut b, Self::test)?;
                NodeKind::Set
            }
        };
        self.close(&mut b, TokenKind::RBrace);
        Ok(b.finish(kind))
    }

    /// `key: value`, recording the value as missing when it is not there.
    fn dict_item(&mut self, key: Node) -> PResult<Node> {
        let mut b = self.builder();
        b.node(key);
        if !self.eat(&mut b, TokenKind::Colon) {
            self.recovery.report(
                &self.stream,
                ErrorKind::DictValueMissing,
                "expected ':' and a value after dictionary key",
            );
            return Ok(b.finish(NodeKind::DictItem));
        }
        if !self.at_expression_start() {
            self.recovery.report(
                &self.stream,
                ErrorKind::DictValueMissing,
                "expected a value after ':'",
            );
            return Ok(b.finish(NodeKind::DictItem));
        }
        self.test().attach(&mut b)?;
        Ok(b.finish(NodeKind::DictItem))
    }

    /// `(',' item)* [',']` after a first item already in `b`.
    fn items(&mut self, b: &mut NodeBuilder, item: Operand<'src>) -> PResult<()> {
        while self.eat(b, TokenKind::Comma) {
            if !self.at_star_or_expression() {
                break;
            }
            item(self).attach(b)?;
        }
        Ok(())
    }

    fn repr_atom(&mut self) -> PResult<Node> {
        let mut b = self.builder();
        b.token(self.bump());
        self.testlist().attach(&mut b)?;
        self.close(&mut b, TokenKind::Backquote);
        Ok(b.finish(NodeKind::Repr))
    }

    pub(super) fn yield_expr(&mut self) -> PResult<Node> {
        let mut b = self.builder();
        b.token(self.bump());
        if self.at_expression_start() {
            self.testlist().attach(&mut b)?;
        }
        Ok(b.finish(NodeKind::Yield))
    }

    /// `for ... in ...` clauses with their `if` filters, into `b`.
    ///
    /// List comprehensions of the 2.x grammars take an unparenthesized tuple as
    /// their source.
    fn comprehensions(&mut self, b: &mut NodeBuilder, list_style: bool) -> PResult<()> {
        while self.at(TokenKind::For) {
            self.comprehension(list_style).attach(b)?;
        }
        Ok(())
    }

    fn comprehension(&mut self, list_style: bool) -> PResult<Node> {
        let mut b = self.builder();
        b.token(self.bump());
        self.exprlist().attach(&mut b)?;
        self.expect(&mut b, TokenKind::In)?;
        let source = if list_style && self.features.tuple_comprehension_source {
            self.testlist_safe()
        } else {
            self.or_test()
        };
        source.attach(&mut b)?;
        while self.at(TokenKind::If) {
            let mut filter = self.builder();
            filter.token(self.bump());
            self.test_nocond().attach(&mut filter).salvage(&mut b)?;
            b.node(filter.finish(NodeKind::CompIf));
        }
        Ok(b.finish(NodeKind::Comprehension))
    }
}
