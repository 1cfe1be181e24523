//! Statement productions, suites and the statement-level backstops.
//!
//!     A simple statement line is `small (';' small)* [';'] NEWLINE`; the semicolons and the
//!     NEWLINE stay in the enclosing module or suite. Compound statements own their clauses
//!     (`Elif`, `Else`, `ExceptHandler`, `Finally`) and every clause owns its `Suite`.
//!
//!     Headers are parsed tolerantly: a header expression that fails keeps its tokens in an
//!     `Error` node and a missing `:` is searched for on the rest of the line, so one typo in
//!     a header does not cost the whole block.

use super::builder::{Attach, NodeBuilder, PResult, Salvage};
use super::Parser;
use crate::pysyn::ast::{Element, Node, NodeKind, ParamKind};
use crate::pysyn::recovery::ErrorKind;
use crate::pysyn::token::{Special, TokenKind};

type Production<'src> = fn(&mut Parser<'src>) -> PResult<Node>;

impl<'src> Parser<'src> {
    /// One statement at the cursor, which must not be a layout token.
    ///
    /// Always consumes at least one token. Simple statements come back together with
    /// their separators and the closing NEWLINE.
    pub(super) fn statement(&mut self) -> Vec<Element> {
        if self.at(TokenKind::ErrorToken) {
            let message = self
                .stream
                .current()
                .lex_error
                .map(|error| error.to_string())
                .unwrap_or_else(|| "unexpected token".to_string());
            self.recovery
                .report(&self.stream, ErrorKind::StatementMalformed, message);
            let token = self.bump();
            return vec![Element::Node(self.error_node(vec![Element::Token(token)]))];
        }

        let before = self.stream.take_specials(self.stream.current_id());
        let mut elements = if !self.at_compound_start() {
            self.simple_statement()
        } else if self.too_deep() {
            self.recovery.report(
                &self.stream,
                ErrorKind::CompoundStatementMalformed,
                format!("more than {} levels of nesting", self.max_nesting),
            );
            let skipped = self.skip_block();
            vec![Element::Node(self.error_node(skipped))]
        } else {
            match self.nested(Self::compound_statement) {
                Ok(node) => vec![Element::Node(node)],
                Err(failure) => {
                    self.record_failure(ErrorKind::CompoundStatementMalformed, &failure);
                    vec![Element::Node(self.error_node(failure.partial))]
                }
            }
        };
        self.attach_before(&mut elements, before);
        elements
    }

    fn attach_before(&self, elements: &mut Vec<Element>, mut before: Vec<Special>) {
        if before.is_empty() {
            return;
        }
        match elements.first_mut() {
            Some(Element::Node(node)) => {
                before.append(&mut node.before);
                node.before = before;
            }
            Some(Element::Token(token)) => {
                before.append(&mut token.specials);
                token.specials = before;
            }
            None => {
                let mut holder = self.error_node(Vec::new());
                holder.before = before;
                elements.push(Element::Node(holder));
            }
        }
    }

    /// The rest of a header line plus the block indented under it.
    fn skip_block(&mut self) -> Vec<Element> {
        let mut skipped = self.skip_to_line_end();
        if self.at(TokenKind::Newline) && self.peek(1) == TokenKind::Indent {
            skipped.push(Element::Token(self.bump()));
            skipped.extend(self.skip_indented());
        }
        skipped
    }

    fn at_compound_start(&self) -> bool {
        matches!(
            self.kind(),
            TokenKind::If
                | TokenKind::While
                | TokenKind::For
                | TokenKind::Try
                | TokenKind::With
                | TokenKind::Def
                | TokenKind::Class
                | TokenKind::At
        )
    }

    fn compound_statement(&mut self) -> PResult<Node> {
        match self.kind() {
            TokenKind::If => self.if_statement(),
            TokenKind::While => self.while_statement(),
            TokenKind::For => self.for_statement(),
            TokenKind::Try => self.try_statement(),
            TokenKind::With => self.with_statement(),
            _ => self.decorated(),
        }
    }

    pub(super) fn simple_statement(&mut self) -> Vec<Element> {
        let mut elements = Vec::new();
        loop {
            match self.small_statement() {
                Ok(node) => elements.push(Element::Node(node)),
                Err(failure) => {
                    self.record_failure(ErrorKind::StatementMalformed, &failure);
                    let mut partial = failure.partial;
                    partial.extend(self.skip_to_line_end());
                    elements.push(Element::Node(self.error_node(partial)));
                    break;
                }
            }
            if !self.at(TokenKind::Semicolon) {
                break;
            }
            elements.push(Element::Token(self.bump()));
            if self.kind().is_layout() {
                break;
            }
        }

        if !self.at(TokenKind::Newline) {
            let found = self.stream.current().describe();
            self.recovery.report(
                &self.stream,
                ErrorKind::NewlineExpected,
                format!("expected end of line, found {found}"),
            );
            let skipped = self.skip_to_line_end();
            if !skipped.is_empty() {
                elements.push(Element::Node(self.error_node(skipped)));
            }
        }
        if self.at(TokenKind::Newline) {
            let inline = self.stream.take_specials(self.stream.current_id());
            let last = elements.iter_mut().rev().find_map(|element| match element {
                Element::Node(node) => Some(node),
                Element::Token(_) => None,
            });
            match last {
                Some(node) => node.after.extend(inline),
                None => self.carry(inline),
            }
            elements.push(Element::Token(self.bump()));
        }
        elements
    }

    fn small_statement(&mut self) -> PResult<Node> {
        match self.kind() {
            TokenKind::Pass => Ok(self.keyword_statement(NodeKind::Pass)),
            TokenKind::Break => Ok(self.keyword_statement(NodeKind::Break)),
            TokenKind::Continue => Ok(self.keyword_statement(NodeKind::Continue)),
            TokenKind::Del => self.del_statement(),
            TokenKind::Return => self.return_statement(),
            TokenKind::Raise => self.raise_statement(),
            TokenKind::Global | TokenKind::Nonlocal => Ok(self.global_statement()),
            TokenKind::Exec => self.exec_statement(),
            TokenKind::Assert => self.assert_statement(),
            TokenKind::Import => self.import_statement(),
            TokenKind::From => self.from_import(),
            TokenKind::Print => self.print_statement(),
            _ => self.expression_statement(),
        }
    }

    fn keyword_statement(&mut self, kind: NodeKind) -> Node {
        let mut b = self.builder();
        b.token(self.bump());
        b.finish(kind)
    }

    fn del_statement(&mut self) -> PResult<Node> {
        let mut b = self.builder();
        b.token(self.bump());
        self.exprlist().attach(&mut b)?;
        Ok(b.finish(NodeKind::Del))
    }

    fn return_statement(&mut self) -> PResult<Node> {
        let mut b = self.builder();
        b.token(self.bump());
        if self.at_expression_start() {
            self.testlist().attach(&mut b)?;
        }
        Ok(b.finish(NodeKind::Return))
    }

    fn raise_statement(&mut self) -> PResult<Node> {
        let mut b = self.builder();
        b.token(self.bump());
        if !self.at_expression_start() {
            return Ok(b.finish(NodeKind::Raise));
        }
        self.test().attach(&mut b)?;
        if self.at(TokenKind::Comma) {
            self.gate(
                self.features.raise_commas,
                ErrorKind::StatementMalformed,
                "raise with a comma-separated value",
            );
            while self.eat(&mut b, TokenKind::Comma) {
                self.test().attach(&mut b)?;
            }
        } else if self.at(TokenKind::From) {
            self.gate(self.features.raise_from, ErrorKind::StatementMalformed, "raise ... from");
            b.token(self.bump());
            self.test().attach(&mut b)?;
        }
        Ok(b.finish(NodeKind::Raise))
    }

    fn global_statement(&mut self) -> Node {
        let nonlocal = self.at(TokenKind::Nonlocal);
        let mut b = self.builder();
        b.token(self.bump());
        let mut names = vec![self.name(&mut b)];
        while self.eat(&mut b, TokenKind::Comma) {
            names.push(self.name(&mut b));
        }
        if nonlocal {
            b.finish(NodeKind::Nonlocal { names })
        } else {
            b.finish(NodeKind::Global { names })
        }
    }

    fn exec_statement(&mut self) -> PResult<Node> {
        let mut b = self.builder();
        b.token(self.bump());
        self.expr().attach(&mut b)?;
        if self.eat(&mut b, TokenKind::In) {
            self.test().attach(&mut b)?;
            if self.eat(&mut b, TokenKind::Comma) {
                self.test().attach(&mut b)?;
            }
        }
        Ok(b.finish(NodeKind::Exec))
    }

    fn assert_statement(&mut self) -> PResult<Node> {
        let mut b = self.builder();
        b.token(self.bump());
        self.test().attach(&mut b)?;
        if self.eat(&mut b, TokenKind::Comma) {
            self.test().attach(&mut b)?;
        }
        Ok(b.finish(NodeKind::Assert))
    }

    fn print_statement(&mut self) -> PResult<Node> {
        let mut b = self.builder();
        b.token(self.bump());
        let redirected = self.eat(&mut b, TokenKind::RightShift);
        if redirected || self.at_expression_start() {
            self.test().attach(&mut b)?;
            while self.eat(&mut b, TokenKind::Comma) {
                if !self.at_expression_start() {
                    break;
                }
                self.test().attach(&mut b)?;
            }
        }
        Ok(b.finish(NodeKind::Print))
    }

    /// `a.b.c` into `b`, returning the dotted text.
    fn dotted_name(&mut self, b: &mut NodeBuilder) -> String {
        let mut name = self.name(b);
        while self.eat(b, TokenKind::Dot) {
            name.push('.');
            name.push_str(&self.name(b));
        }
        name
    }

    fn import_statement(&mut self) -> PResult<Node> {
        let mut b = self.builder();
        b.token(self.bump());
        loop {
            let mut alias = self.builder();
            let name = self.dotted_name(&mut alias);
            let asname = self.eat(&mut alias, TokenKind::As).then(|| self.name(&mut alias));
            b.node(alias.finish(NodeKind::Alias { name, asname }));
            if !self.eat(&mut b, TokenKind::Comma) {
                break;
            }
        }
        Ok(b.finish(NodeKind::Import))
    }

    fn import_as_name(&mut self) -> Node {
        let mut alias = self.builder();
        let name = self.name(&mut alias);
        let asname = self.eat(&mut alias, TokenKind::As).then(|| self.name(&mut alias));
        alias.finish(NodeKind::Alias { name, asname })
    }

    fn from_import(&mut self) -> PResult<Node> {
        let mut b = self.builder();
        b.token(self.bump());
        let mut level = 0;
        loop {
            match self.kind() {
                TokenKind::Dot => level += 1,
                TokenKind::Ellipsis => level += 3,
                _ => break,
            }
            b.token(self.bump());
        }
        let module = if level == 0 || self.at(TokenKind::Name) {
            self.dotted_name(&mut b)
        } else {
            String::new()
        };
        self.expect(&mut b, TokenKind::Import)?;

        if !self.eat(&mut b, TokenKind::Star) {
            let parenthesized = self.eat(&mut b, TokenKind::LParen);
            loop {
                b.node(self.import_as_name());
                if !self.eat(&mut b, TokenKind::Comma) {
                    break;
                }
                if parenthesized && !self.at(TokenKind::Name) {
                    break;
                }
            }
            if parenthesized {
                self.close(&mut b, TokenKind::RParen);
            }
        }
        Ok(b.finish(NodeKind::ImportFrom { module, level }))
    }

    fn expression_statement(&mut self) -> PResult<Node> {
        let mut b = self.builder();
        let target = if self.at(TokenKind::Yield) {
            self.yield_expr()?
        } else {
            self.testlist_star_expr()?
        };
        b.node(target);

        if self.kind().is_augmented_assign() {
            let op = self.bump();
            let text = op.text.clone();
            b.token(op);
            let value = if self.at(TokenKind::Yield) {
                self.yield_expr()
            } else {
                self.testlist()
            };
            value.attach(&mut b)?;
            return Ok(b.finish(NodeKind::AugAssign { op: text }));
        }

        if !self.at(TokenKind::Equal) {
            return Ok(b.finish(NodeKind::Expr));
        }
        while self.eat(&mut b, TokenKind::Equal) {
            let value = if self.at(TokenKind::Yield) {
                self.yield_expr()
            } else {
                self.testlist_star_expr()
            };
            value.attach(&mut b)?;
        }
        Ok(b.finish(NodeKind::Assign))
    }

    // ------------------------------------------------------------------
    // Compound statements
    // ------------------------------------------------------------------

    /// Parse a header expression, keeping whatever it consumed if it fails.
    fn header_expr(&mut self, b: &mut NodeBuilder, production: Production<'src>) {
        match production(self) {
            Ok(node) => b.node(node),
            Err(failure) => {
                self.record_failure(ErrorKind::CompoundStatementMalformed, &failure);
                if !failure.partial.is_empty() {
                    b.node(self.error_node(failure.partial));
                }
            }
        }
    }

    /// Consume `kind` in a header, skipping junk before it on the same line.
    fn header_token(&mut self, b: &mut NodeBuilder, kind: TokenKind) {
        if self.eat(b, kind) {
            return;
        }
        let found = self.stream.current().describe();
        self.recovery.report(
            &self.stream,
            ErrorKind::CompoundStatementMalformed,
            format!("expected {kind}, found {found}"),
        );
        let mut skipped = Vec::new();
        while !self.at(kind) && !self.at(TokenKind::Colon) && !self.kind().is_layout() {
            skipped.push(Element::Token(self.bump()));
        }
        if !skipped.is_empty() {
            b.node(self.error_node(skipped));
        }
        self.eat(b, kind);
    }

    /// Parse a clause body into `b`; returns the comments trailing the block.
    fn clause_suite(&mut self, b: &mut NodeBuilder, column: usize) -> PResult<Vec<Special>> {
        let (suite, trailing) = self.suite(column).salvage(b)?;
        b.node(suite);
        Ok(trailing)
    }

    /// `keyword ':' suite` clauses (`else`, `finally`), added to `b` when present.
    fn keyword_clause(
        &mut self,
        b: &mut NodeBuilder,
        keyword: TokenKind,
        kind: NodeKind,
        column: usize,
        trailing: Vec<Special>,
    ) -> PResult<Vec<Special>> {
        if !self.at(keyword) {
            return Ok(trailing);
        }
        self.carry(trailing);
        let mut clause = self.builder();
        clause.token(self.bump());
        self.header_token(&mut clause, TokenKind::Colon);
        let trailing = self.clause_suite(&mut clause, column).salvage(b)?;
        b.node(clause.finish(kind));
        Ok(trailing)
    }

    fn finish_compound(&self, b: NodeBuilder, kind: NodeKind, trailing: Vec<Special>) -> Node {
        let mut node = b.finish(kind);
        node.after = trailing;
        node
    }

    fn if_statement(&mut self) -> PResult<Node> {
        let column = self.column();
        let mut b = self.builder();
        b.token(self.bump());
        self.header_expr(&mut b, Self::test);
        self.header_token(&mut b, TokenKind::Colon);
        let mut trailing = self.clause_suite(&mut b, column)?;

        while self.at(TokenKind::Elif) {
            self.carry(trailing);
            let mut clause = self.builder();
            clause.token(self.bump());
            self.header_expr(&mut clause, Self::test);
            self.header_token(&mut clause, TokenKind::Colon);
            trailing = self.clause_suite(&mut clause, column).salvage(&mut b)?;
            b.node(clause.finish(NodeKind::Elif));
        }
        let trailing = self.keyword_clause(&mut b, TokenKind::Else, NodeKind::Else, column, trailing)?;
        Ok(self.finish_compound(b, NodeKind::If, trailing))
    }

    fn while_statement(&mut self) -> PResult<Node> {
        let column = self.column();
        let mut b = self.builder();
        b.token(self.bump());
        self.header_expr(&mut b, Self::test);
        self.header_token(&mut b, TokenKind::Colon);
        let trailing = self.clause_suite(&mut b, column)?;
        let trailing = self.keyword_clause(&mut b, TokenKind::Else, NodeKind::Else, column, trailing)?;
        Ok(self.finish_compound(b, NodeKind::While, trailing))
    }

    fn for_statement(&mut self) -> PResult<Node> {
        let column = self.column();
        let mut b = self.builder();
        b.token(self.bump());
        self.header_expr(&mut b, Self::exprlist);
        self.header_token(&mut b, TokenKind::In);
        self.header_expr(&mut b, Self::testlist);
        self.header_token(&mut b, TokenKind::Colon);
        let trailing = self.clause_suite(&mut b, column)?;
        let trailing = self.keyword_clause(&mut b, TokenKind::Else, NodeKind::Else, column, trailing)?;
        Ok(self.finish_compound(b, NodeKind::For, trailing))
    }

    fn try_statement(&mut self) -> PResult<Node> {
        let column = self.column();
        let mut b = self.builder();
        b.token(self.bump());
        self.header_token(&mut b, TokenKind::Colon);
        let mut trailing = self.clause_suite(&mut b, column)?;

        let mut handlers = 0;
        while self.at(TokenKind::Except) {
            self.carry(trailing);
            let mut clause = self.builder();
            clause.token(self.bump());
            if self.at_expression_start() {
                self.header_expr(&mut clause, Self::test);
                if self.at(TokenKind::As) {
                    self.gate(
                        self.features.except_as,
                        ErrorKind::CompoundStatementMalformed,
                        "'except ... as'",
                    );
                    clause.token(self.bump());
                    self.header_expr(&mut clause, Self::test);
                } else if self.at(TokenKind::Comma) {
                    self.gate(
                        self.features.except_comma,
                        ErrorKind::CompoundStatementMalformed,
                        "'except ..., name'",
                    );
                    clause.token(self.bump());
                    self.header_expr(&mut clause, Self::test);
                }
            }
            self.header_token(&mut clause, TokenKind::Colon);
            trailing = self.clause_suite(&mut clause, column).salvage(&mut b)?;
            b.node(clause.finish(NodeKind::ExceptHandler));
            handlers += 1;
        }

        if self.at(TokenKind::Else) && handlers == 0 {
            self.recovery.report(
                &self.stream,
                ErrorKind::CompoundStatementMalformed,
                "'else' clause without 'except'",
            );
        }
        let trailing = self.keyword_clause(&mut b, TokenKind::Else, NodeKind::Else, column, trailing)?;
        let has_finally = self.at(TokenKind::Finally);
        let trailing =
            self.keyword_clause(&mut b, TokenKind::Finally, NodeKind::Finally, column, trailing)?;
        if handlers == 0 && !has_finally {
            self.recovery.report(
                &self.stream,
                ErrorKind::CompoundStatementMalformed,
                "expected 'except' or 'finally'",
            );
        }
        Ok(self.finish_compound(b, NodeKind::Try, trailing))
    }

    fn with_statement(&mut self) -> PResult<Node> {
        let column = self.column();
        let mut b = self.builder();
        b.token(self.bump());
        self.header_expr(&mut b, Self::test);
        if self.eat(&mut b, TokenKind::As) {
            self.header_expr(&mut b, Self::expr);
        }
        self.header_token(&mut b, TokenKind::Colon);
        let trailing = self.clause_suite(&mut b, column)?;
        Ok(self.finish_compound(b, NodeKind::With, trailing))
    }

    /// `def` and `class`, with any decorators in front.
    fn decorated(&mut self) -> PResult<Node> {
        let column = self.column();
        let mut b = self.builder();
        let mut decorated = false;
        while self.at(TokenKind::At) {
            self.decorator().attach(&mut b)?;
            decorated = true;
        }
        match self.kind() {
            TokenKind::Def => self.function_def(b, column),
            TokenKind::Class => {
                if decorated {
                    self.gate(
                        self.features.class_decorators,
                        ErrorKind::CompoundStatementMalformed,
                        "class decorator",
                    );
                }
                self.class_def(b, column)
            }
            _ => self.fail(&mut b, "'def' or 'class'"),
        }
    }

    fn decorator(&mut self) -> PResult<Node> {
        let mut b = self.builder();
        b.token(self.bump());

        let mut target = self.builder();
        let mut name = self.name(&mut target);
        let mut expr = target.finish(NodeKind::Name { id: name.clone() });
        while self.at(TokenKind::Dot) {
            expr = self.attribute(expr);
            if let Some(attr) = expr.name() {
                name.push('.');
                name.push_str(attr);
            }
        }
        if self.at(TokenKind::LParen) {
            expr = self.call(expr).salvage(&mut b)?;
        }
        b.node(expr);

        if !self.at(TokenKind::Newline) {
            let found = self.stream.current().describe();
            self.recovery.report(
                &self.stream,
                ErrorKind::CompoundStatementMalformed,
                format!("expected end of line after decorator, found {found}"),
            );
            let skipped = self.skip_to_line_end();
            if !skipped.is_empty() {
                b.node(self.error_node(skipped));
            }
        }
        self.eat(&mut b, TokenKind::Newline);
        Ok(b.finish(NodeKind::Decorator { name }))
    }

    fn function_def(&mut self, mut b: NodeBuilder, column: usize) -> PResult<Node> {
        b.token(self.bump());
        let name = self.name(&mut b);
        match self.parameters() {
            Ok(parameters) => b.node(parameters),
            Err(failure) => {
                self.record_failure(ErrorKind::CompoundStatementMalformed, &failure);
                b.node(self.error_node(failure.partial));
            }
        }
        if self.eat(&mut b, TokenKind::Arrow) {
            self.header_expr(&mut b, Self::test);
        }
        self.header_token(&mut b, TokenKind::Colon);
        let trailing = self.clause_suite(&mut b, column)?;
        Ok(self.finish_compound(b, NodeKind::FunctionDef { name }, trailing))
    }

    fn class_def(&mut self, mut b: NodeBuilder, column: usize) -> PResult<Node> {
        b.token(self.bump());
        let name = self.name(&mut b);
        if self.eat(&mut b, TokenKind::LParen) {
            let special = self.arguments(&mut b)?;
            self.close(&mut b, TokenKind::RParen);
            if special {
                self.gate(
                    self.features.class_keywords,
                    ErrorKind::CompoundStatementMalformed,
                    "keyword or star arguments in class bases",
                );
            }
        }
        self.header_token(&mut b, TokenKind::Colon);
        let trailing = self.clause_suite(&mut b, column)?;
        Ok(self.finish_compound(b, NodeKind::ClassDef { name }, trailing))
    }

    /// `'(' params ')'` of a function definition.
    fn parameters(&mut self) -> PResult<Node> {
        let mut b = self.builder();
        if !self.eat(&mut b, TokenKind::LParen) {
            let found = self.stream.current().describe();
            self.recovery.report(
                &self.stream,
                ErrorKind::CompoundStatementMalformed,
                format!("expected '(', found {found}"),
            );
            return Ok(b.finish(NodeKind::Parameters));
        }
        self.param_list(&mut b, true)?;
        self.close(&mut b, TokenKind::RParen);
        Ok(b.finish(NodeKind::Parameters))
    }

    /// Parameters of a `def` (with annotations) or a `lambda` (without).
    pub(super) fn param_list(&mut self, b: &mut NodeBuilder, in_def: bool) -> PResult<()> {
        loop {
            let param = match self.kind() {
                TokenKind::Name => self.param(in_def, ParamKind::Positional),
                TokenKind::LParen => {
                    self.gate(
                        self.features.tuple_parameters,
                        ErrorKind::CompoundStatementMalformed,
                        "tuple parameter",
                    );
                    self.tuple_param()
                }
                TokenKind::Star => {
                    if matches!(self.peek(1), TokenKind::Name) {
                        self.param(in_def, ParamKind::VarArgs)
                    } else {
                        self.gate(
                            self.features.keyword_only_args,
                            ErrorKind::CompoundStatementMalformed,
                            "keyword-only parameters",
                        );
                        let mut marker = self.builder();
                        marker.token(self.bump());
                        Ok(marker.finish(NodeKind::Param {
                            name: String::new(),
                            kind: ParamKind::KeywordOnlyMarker,
                        }))
                    }
                }
                TokenKind::DoubleStar => self.param(in_def, ParamKind::KwArgs),
                _ => break,
            };
            param.attach(b)?;
            if !self.eat(b, TokenKind::Comma) {
                break;
            }
        }
        Ok(())
    }

    fn param(&mut self, in_def: bool, kind: ParamKind) -> PResult<Node> {
        let mut b = self.builder();
        if kind != ParamKind::Positional {
            b.token(self.bump());
        }
        let name = self.name(&mut b);
        if in_def && self.at(TokenKind::Colon) {
            self.gate(
                self.features.annotations,
                ErrorKind::CompoundStatementMalformed,
                "parameter annotation",
            );
            b.token(self.bump());
            self.test().attach(&mut b)?;
        }
        if kind == ParamKind::Positional && self.eat(&mut b, TokenKind::Equal) {
            self.test().attach(&mut b)?;
        }
        Ok(b.finish(NodeKind::Param { name, kind }))
    }

    /// `(a, (b, c))` parameters of the 2.x grammars.
    fn tuple_param(&mut self) -> PResult<Node> {
        let mut b = self.builder();
        b.token(self.bump());
        loop {
            let item = match self.kind() {
                TokenKind::Name => {
                    let mut p = self.builder();
                    let name = self.name(&mut p);
                    p.finish(NodeKind::Param {
                        name,
                        kind: ParamKind::Positional,
                    })
                }
                TokenKind::LParen => self.nested(Self::tuple_param).salvage(&mut b)?,
                _ => break,
            };
            b.node(item);
            if !self.eat(&mut b, TokenKind::Comma) {
                break;
            }
        }
        self.close(&mut b, TokenKind::RParen);
        if self.eat(&mut b, TokenKind::Equal) {
            self.test().attach(&mut b)?;
        }
        Ok(b.finish(NodeKind::Param {
            name: String::new(),
            kind: ParamKind::Tuple,
        }))
    }

    // ------------------------------------------------------------------
    // Suites
    // ------------------------------------------------------------------

    /// The body of a clause whose header starts at `header_column`.
    ///
    /// Returns the suite and the comments found in front of its closing Dedent that
    /// are indented at least as far as the header; the rest move on to the next
    /// token.
    pub(super) fn suite(&mut self, header_column: usize) -> PResult<(Node, Vec<Special>)> {
        let mut b = self.builder();
        if !self.at(TokenKind::Newline) {
            if self.at_statement_start() {
                b.extend(self.simple_statement());
            } else {
                let found = self.stream.current().describe();
                self.recovery.report(
                    &self.stream,
                    ErrorKind::SuiteMatchFailed,
                    format!("expected a statement or an indented block, found {found}"),
                );
            }
            return Ok((b.finish(NodeKind::Suite), Vec::new()));
        }

        b.token(self.bump());
        if !self.at(TokenKind::Indent) {
            self.recovery.indent_expected(&self.stream);
            self.recovery.empty_suite(&self.stream);
            return Ok((b.finish(NodeKind::Suite), Vec::new()));
        }
        let indent_specials = self.stream.take_specials(self.stream.current_id());
        b.token(self.bump());
        self.carry(indent_specials);

        loop {
            match self.kind() {
                TokenKind::Dedent | TokenKind::EndMarker => break,
                TokenKind::Newline => b.token(self.bump()),
                TokenKind::Indent => b.node(self.unexpected_indent()),
                _ if self.at_statement_start() => b.extend(self.statement()),
                _ => break,
            }
            if self.stream.is_poisoned() {
                break;
            }
        }

        if self.at(TokenKind::EndMarker) {
            if !self.stream.is_poisoned() {
                self.recovery.report(
                    &self.stream,
                    ErrorKind::DedentExpected,
                    "expected end of block, found end of file",
                );
            }
            return Ok((b.finish(NodeKind::Suite), Vec::new()));
        }
        if !self.at(TokenKind::Dedent) {
            match self.recovery.resync_dedent(&mut self.stream) {
                Some(target) => {
                    let mut skipped = Vec::new();
                    while self.stream.current_id() != target {
                        skipped.push(Element::Token(self.bump()));
                    }
                    b.node(self.error_node(skipped));
                }
                None => return self.fail(&mut b, "end of block"),
            }
        }

        let mut trailing = self.stream.take_specials(self.stream.current_id());
        b.token(self.bump());
        let split = trailing
            .iter()
            .position(|special| special.column() < header_column)
            .unwrap_or(trailing.len());
        let rest = trailing.split_off(split);
        self.carry(rest);
        Ok((b.finish(NodeKind::Suite), trailing))
    }

    /// An indented block where none may start; its statements are kept inside an
    /// `Error` node.
    pub(super) fn unexpected_indent(&mut self) -> Node {
        self.recovery
            .report(&self.stream, ErrorKind::StatementMalformed, "unexpected indent");
        if self.too_deep() {
            let skipped = self.skip_indented();
            return self.error_node(skipped);
        }
        self.depth += 1;
        let mut b = self.builder();
        b.token(self.bump());
        loop {
            if self.stream.is_poisoned() {
                break;
            }
            match self.kind() {
                TokenKind::Dedent => {
                    b.token(self.bump());
                    break;
                }
                TokenKind::EndMarker => break,
                TokenKind::Newline => b.token(self.bump()),
                TokenKind::Indent => b.node(self.unexpected_indent()),
                _ => b.extend(self.statement()),
            }
        }
        self.depth -= 1;
        b.finish(NodeKind::Error)
    }
}

#[cfg(test)]
mod tests {
    use crate::pysyn::ast::{Node, NodeKind, ParamKind};
    use crate::pysyn::grammar::GrammarVersion;
    use crate::pysyn::parsing::{ParseOutput, Parser};
    use crate::pysyn::recovery::{ErrorKind, RecoveryEngine};
    use crate::pysyn::stream::{StreamMode, TokenStream};

    fn parse(source: &str, version: GrammarVersion) -> ParseOutput {
        let stream = TokenStream::new(source, version, StreamMode::Fast).unwrap();
        Parser::new(stream, RecoveryEngine::default()).parse_module()
    }

    fn kinds(node: &Node) -> Vec<&'static str> {
        node.statements().iter().map(|n| n.kind_name()).collect()
    }

    #[test]
    fn test_semicolon_separated_statements() {
        let output = parse("a = 1; b += 2; pass\n", GrammarVersion::LATEST);
        assert!(output.errors.is_empty());
        assert_eq!(kinds(&output.tree), vec!["Assign", "AugAssign", "Pass"]);
        assert_eq!(
            output.tree.statements()[1].kind,
            NodeKind::AugAssign { op: "+=".into() }
        );
    }

    #[test]
    fn test_unclosed_call_in_function_body() {
        let output = parse("def m():\n    call(a,", GrammarVersion::LATEST);
        assert_eq!(output.errors.len(), 1);
        assert_eq!(output.errors[0].kind, ErrorKind::UnmatchedParenNearby);
        let def = output.tree.statements()[0];
        assert_eq!(def.kind, NodeKind::FunctionDef { name: "m".into() });
    }

    #[test]
    fn test_trailing_comment_belongs_to_class() {
        let output = parse("class C:\n    pass\n#end\n", GrammarVersion::LATEST);
        let class = output.tree.statements()[0];
        assert_eq!(class.name(), Some("C"));
        assert_eq!(class.after.len(), 1);
        assert_eq!(class.after[0].text, "#end");
    }

    #[test]
    fn test_leading_comment_becomes_before() {
        let output = parse("# lead\nx = 1  # inline\n", GrammarVersion::LATEST);
        let assign = output.tree.statements()[0];
        assert_eq!(assign.before[0].text, "# lead");
        assert_eq!(assign.after[0].text, "# inline");
    }

    #[test]
    fn test_if_elif_else_clauses() {
        let source = "if a:\n    x\nelif b:\n    y\nelse:\n    z\n";
        let output = parse(source, GrammarVersion::LATEST);
        assert!(output.errors.is_empty());
        let node = output.tree.statements()[0];
        let clauses: Vec<_> = node.children().map(|c| c.kind_name()).collect();
        assert_eq!(clauses, vec!["Name", "Suite", "Elif", "Else"]);
    }

    #[test]
    fn test_try_handlers_by_version() {
        let comma = "try:\n    pass\nexcept E, e:\n    pass\n";
        assert!(parse(comma, GrammarVersion::Python2_5).errors.is_empty());
        let errors = parse(comma, GrammarVersion::Python3_0).errors;
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ErrorKind::CompoundStatementMalformed);

        let as_form = "try:\n    pass\nexcept E as e:\n    pass\nfinally:\n    pass\n";
        assert!(parse(as_form, GrammarVersion::Python2_6).errors.is_empty());
        assert!(!parse(as_form, GrammarVersion::Python2_5).errors.is_empty());
    }

    #[test]
    fn test_try_without_handlers() {
        let output = parse("try:\n    pass\nx = 1\n", GrammarVersion::LATEST);
        assert_eq!(output.errors[0].kind, ErrorKind::CompoundStatementMalformed);
        assert_eq!(kinds(&output.tree), vec!["Try", "Assign"]);
    }

    #[test]
    fn test_missing_indent_gives_empty_suite() {
        let output = parse("if x:\npass\n", GrammarVersion::LATEST);
        let errors: Vec<_> = output.errors.iter().map(|e| e.kind).collect();
        assert_eq!(
            errors,
            vec![ErrorKind::IndentExpected, ErrorKind::EmptySuiteDetected]
        );
        let suite = output.tree.statements()[0].body().unwrap();
        assert!(suite.statements().is_empty());
        assert_eq!(kinds(&output.tree), vec!["If", "Pass"]);
    }

    #[test]
    fn test_unexpected_indent_is_kept() {
        let output = parse("x = 1\n    y = 2\nz = 3\n", GrammarVersion::LATEST);
        assert_eq!(output.errors[0].kind, ErrorKind::StatementMalformed);
        assert_eq!(kinds(&output.tree), vec!["Assign", "Error", "Assign"]);
        let error = output.tree.statements()[1];
        assert_eq!(error.statements().len(), 0);
        assert_eq!(error.children().next().unwrap().kind, NodeKind::Assign);
    }

    #[test]
    fn test_decorated_function() {
        let output = parse("@a.b(1)\n@c\ndef f(x, *args, **kw):\n    pass\n", GrammarVersion::Python2_4);
        assert!(output.errors.is_empty());
        let def = output.tree.statements()[0];
        let decorators: Vec<_> = def
            .find_all(|k| matches!(k, NodeKind::Decorator { .. }))
            .into_iter()
            .filter_map(|d| d.name())
            .collect();
        assert_eq!(decorators, vec!["a.b", "c"]);
        let params: Vec<_> = def
            .find_all(|k| matches!(k, NodeKind::Param { .. }))
            .into_iter()
            .map(|p| p.kind.clone())
            .collect();
        assert_eq!(
            params,
            vec![
                NodeKind::Param { name: "x".into(), kind: ParamKind::Positional },
                NodeKind::Param { name: "args".into(), kind: ParamKind::VarArgs },
                NodeKind::Param { name: "kw".into(), kind: ParamKind::KwArgs },
            ]
        );
    }

    #[test]
    fn test_class_decorator_needs_2_6() {
        let source = "@d\nclass C:\n    pass\n";
        assert!(parse(source, GrammarVersion::Python2_6).errors.is_empty());
        let errors = parse(source, GrammarVersion::Python2_5).errors;
        assert_eq!(errors[0].kind, ErrorKind::CompoundStatementMalformed);
    }

    #[test]
    fn test_function_signature_features_are_gated() {
        let source = "def f(a: int, *, b=1):\n    pass\n";
        assert!(parse(source, GrammarVersion::Python3_0).errors.is_empty());
        assert_eq!(parse(source, GrammarVersion::Python2_6).errors.len(), 2);
        assert!(parse("def f() -> str:\n    pass\n", GrammarVersion::Python3_0)
            .errors
            .is_empty());

        let tuple = "def g((a, b), c):\n    pass\n";
        assert!(parse(tuple, GrammarVersion::Python2_6).errors.is_empty());
        assert_eq!(parse(tuple, GrammarVersion::Python3_0).errors.len(), 1);
    }

    #[test]
    fn test_relative_imports() {
        let output = parse("from ..pkg import (a as b, c,)\nfrom . import d\n", GrammarVersion::Python2_5);
        assert!(output.errors.is_empty());
        let statements = output.tree.statements();
        assert_eq!(
            statements[0].kind,
            NodeKind::ImportFrom { module: "pkg".into(), level: 2 }
        );
        assert_eq!(
            statements[1].kind,
            NodeKind::ImportFrom { module: String::new(), level: 1 }
        );
        let alias = statements[0].children().next().unwrap();
        assert_eq!(
            alias.kind,
            NodeKind::Alias { name: "a".into(), asname: Some("b".into()) }
        );
    }

    #[test]
    fn test_print_and_exec_statements() {
        let source = "print >>f, a, b,\nexec code in ns\n";
        let output = parse(source, GrammarVersion::Python2_4);
        assert!(output.errors.is_empty());
        assert_eq!(kinds(&output.tree), vec!["Print", "Exec"]);
        assert!(!parse("print x\n", GrammarVersion::Python3_0).errors.is_empty());
    }

    #[test]
    fn test_nonlocal_only_in_3_0() {
        let output = parse("def f():\n    nonlocal a, b\n", GrammarVersion::Python3_0);
        assert!(output.errors.is_empty());
        let found = output.tree.find_all(|k| matches!(k, NodeKind::Nonlocal { .. }));
        assert_eq!(
            found[0].kind,
            NodeKind::Nonlocal { names: vec!["a".into(), "b".into()] }
        );
        assert!(!parse("nonlocal a\n", GrammarVersion::Python2_6).errors.is_empty());
    }

    #[test]
    fn test_missing_newline_is_reported() {
        let output = parse("x = 1 2\n", GrammarVersion::LATEST);
        assert_eq!(output.errors[0].kind, ErrorKind::NewlineExpected);
        assert_eq!(kinds(&output.tree), vec!["Assign", "Error"]);
    }

    #[test]
    fn test_broken_header_keeps_suite() {
        let output = parse("while x y:\n    pass\n", GrammarVersion::LATEST);
        assert_eq!(output.errors[0].kind, ErrorKind::CompoundStatementMalformed);
        let node = output.tree.statements()[0];
        assert_eq!(node.kind, NodeKind::While);
        assert_eq!(node.body().unwrap().statements()[0].kind, NodeKind::Pass);
    }
}
