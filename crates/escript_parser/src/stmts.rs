//! Directives and statements.
//!
//! A directive is anything that can appear in a block: definitions,
//! pragmas, and statements. Error recovery happens at this level; a
//! failed directive resynchronizes so its siblings still parse.

use crate::parser::{ParseResult, Parser};
use escript_ast::{CaseKind, Node, NodeKind, QName, TokenKind, VarKind};

impl Parser {
    /// Parse directives until a closing brace, end of input, or (at the
    /// top level of an interactive chunk) a console end-of-line marker.
    pub(crate) fn parse_directives(&mut self) -> Node {
        let mut directives = self.create_node(NodeKind::Directives);
        loop {
            if self.fatal {
                break;
            }
            match self.peek_token() {
                TokenKind::Eof | TokenKind::Rbrace => break,
                TokenKind::Nop => {
                    if self.state.block_nest_count == 0 {
                        break;
                    }
                    self.next_token();
                    continue;
                }
                TokenKind::Err => {
                    // Already reported by the lexer; skip and continue.
                    self.next_token();
                    self.errored = false;
                    continue;
                }
                _ => {}
            }
            let line = self.peek_ahead_token(1).line_number;
            match self.parse_directive() {
                Ok(node) => directives.append(node),
                Err(_) => self.reset_error(line),
            }
        }
        directives
    }

    pub(crate) fn parse_directive(&mut self) -> ParseResult<Node> {
        match self.peek_token() {
            TokenKind::Use => self.parse_use_directive(),
            TokenKind::Module => self.parse_module_definition(),
            TokenKind::Class
            | TokenKind::Interface
            | TokenKind::Function
            | TokenKind::Var
            | TokenKind::Const
            | TokenKind::Namespace
            | TokenKind::Type
            | TokenKind::Attribute
            | TokenKind::ReservedNamespace => self.parse_attributed_definition(),
            TokenKind::Let => {
                // `let (x = 1) expr` is an expression; `let x = 1` is a
                // definition.
                if self.peek_ahead(2) == TokenKind::Lparen {
                    self.parse_expression_statement()
                } else {
                    self.parse_attributed_definition()
                }
            }
            TokenKind::Id => {
                if self.starts_attributed_definition()? {
                    self.parse_attributed_definition()
                } else {
                    self.parse_statement()
                }
            }
            _ => self.parse_statement(),
        }
    }

    pub(crate) fn parse_statement(&mut self) -> ParseResult<Node> {
        match self.peek_token() {
            TokenKind::If => self.parse_if_statement(),
            TokenKind::While => self.parse_while_statement(),
            TokenKind::Do => self.parse_do_statement(),
            TokenKind::For => self.parse_for_statement(),
            TokenKind::Switch => self.parse_switch_statement(),
            TokenKind::Try => self.parse_try_statement(),
            TokenKind::Throw => self.parse_throw_statement(),
            TokenKind::Return => self.parse_return_statement(),
            TokenKind::Break => self.parse_break_statement(),
            TokenKind::Continue => self.parse_continue_statement(),
            TokenKind::With => self.parse_with_statement(),
            TokenKind::Hash => self.parse_hash_directive(),
            TokenKind::Lbrace => self.parse_block(),
            TokenKind::Semicolon => {
                self.next_token();
                Ok(self.create_node(NodeKind::Nop))
            }
            TokenKind::Id if self.peek_ahead(2) == TokenKind::Colon => {
                self.parse_labeled_statement()
            }
            _ => self.parse_expression_statement(),
        }
    }

    /// `{ directives }` opening a nested lexical context.
    pub(crate) fn parse_block(&mut self) -> ParseResult<Node> {
        self.expect(TokenKind::Lbrace)?;
        let mut block = self.create_node(NodeKind::Block);
        self.push_state();
        self.state.block_nest_count += 1;
        let directives = self.parse_directives();
        self.pop_state();
        self.expect(TokenKind::Rbrace)?;
        block.append(directives);
        Ok(block)
    }

    /// Consume a statement terminator. A newline before the next token,
    /// a closing brace, or end of input all act as a virtual semicolon.
    pub(crate) fn expect_semicolon(&mut self) -> ParseResult<()> {
        match self.peek_token() {
            TokenKind::Semicolon => {
                self.next_token();
                Ok(())
            }
            TokenKind::Rbrace | TokenKind::Eof | TokenKind::Nop | TokenKind::Err => Ok(()),
            _ => {
                let next = self.peek_ahead_token(1);
                if next.line_number > self.token.line_number {
                    return Ok(());
                }
                Err(self.parse_error("Expecting \";\""))
            }
        }
    }

    fn parse_expression_statement(&mut self) -> ParseResult<Node> {
        let expr = self.parse_expression()?;
        self.expect_semicolon()?;
        Ok(expr)
    }

    fn parse_if_statement(&mut self) -> ParseResult<Node> {
        self.next_token();
        let mut node = self.create_node(NodeKind::If);
        self.expect(TokenKind::Lparen)?;
        let cond = self.parse_expression()?;
        self.expect(TokenKind::Rparen)?;
        let then = self.parse_statement()?;
        node.append(cond);
        node.append(then);
        if self.accept(TokenKind::Else) {
            node.append(self.parse_statement()?);
        }
        Ok(node)
    }

    fn parse_while_statement(&mut self) -> ParseResult<Node> {
        self.next_token();
        let mut node = self.create_node(NodeKind::While);
        self.expect(TokenKind::Lparen)?;
        let cond = self.parse_expression()?;
        self.expect(TokenKind::Rparen)?;
        let body = self.parse_statement()?;
        node.append(cond);
        node.append(body);
        Ok(node)
    }

    fn parse_do_statement(&mut self) -> ParseResult<Node> {
        self.next_token();
        let mut node = self.create_node(NodeKind::Do);
        let body = self.parse_statement()?;
        self.expect(TokenKind::While)?;
        self.expect(TokenKind::Lparen)?;
        let cond = self.parse_expression()?;
        self.expect(TokenKind::Rparen)?;
        self.expect_semicolon()?;
        node.append(body);
        node.append(cond);
        Ok(node)
    }

    /// Classic and for-in forms. The iterand of a for-in is parsed with
    /// the `in` operator suppressed so `for (x in a in b)` cannot
    /// misgroup.
    fn parse_for_statement(&mut self) -> ParseResult<Node> {
        self.next_token();
        let for_loc = self.create_node(NodeKind::Nop).loc;
        let each = self.accept(TokenKind::Each);
        self.expect(TokenKind::Lparen)?;

        self.push_state();
        self.state.no_in = true;
        let init = match self.peek_token() {
            TokenKind::Semicolon => Node::new(NodeKind::Nop),
            TokenKind::Var | TokenKind::Let | TokenKind::Const => {
                let kind = match self.next_token() {
                    TokenKind::Let => VarKind::Let,
                    TokenKind::Const => VarKind::Const,
                    _ => VarKind::Var,
                };
                match self.parse_variable_bindings(kind) {
                    Ok(node) => node,
                    Err(e) => {
                        self.pop_state();
                        return Err(e);
                    }
                }
            }
            _ => match self.parse_expression() {
                Ok(node) => node,
                Err(e) => {
                    self.pop_state();
                    return Err(e);
                }
            },
        };
        self.pop_state();

        if self.peek_token() == TokenKind::In {
            self.next_token();
            let iterand = self.parse_expression()?;
            self.expect(TokenKind::Rparen)?;
            let (mut outer, body) = self.parse_loop_body()?;

            // Rewrite the iterand as a call on its iterator so later
            // phases see a uniform protocol. `for each` iterates values.
            let getter = if each { "getValues" } else { "get" };
            let mut node = Node::new(NodeKind::ForIn { each });
            node.loc = for_loc;
            let mut callee = Node::new(NodeKind::Dot);
            callee.loc = iterand.loc.clone();
            let name = self.synthetic_name(getter, Some("iterator"));
            callee.append(iterand);
            callee.append(name);
            let mut call = Node::new(NodeKind::Call);
            call.loc = callee.loc.clone();
            call.append(callee);
            call.append(Node::new(NodeKind::Args));

            node.append(init);
            node.append(call);
            node.append(body);
            outer.append(node);
            return Ok(outer);
        }

        if each {
            return Err(self.parse_error("Expecting \"in\" after \"for each\""));
        }

        self.expect(TokenKind::Semicolon)?;
        let cond = if self.peek_token() == TokenKind::Semicolon {
            Node::new(NodeKind::Nop)
        } else {
            self.parse_expression()?
        };
        self.expect(TokenKind::Semicolon)?;
        let incr = if self.peek_token() == TokenKind::Rparen {
            Node::new(NodeKind::Nop)
        } else {
            self.parse_expression()?
        };
        self.expect(TokenKind::Rparen)?;
        let (mut outer, body) = self.parse_loop_body()?;

        let mut node = Node::new(NodeKind::For);
        node.loc = for_loc;
        node.append(init);
        node.append(cond);
        node.append(incr);
        node.append(body);
        outer.append(node);
        Ok(outer)
    }

    /// Parse a loop body and hoist its block outside the loop. A block
    /// body is unwrapped one level and the emptied block wraps the loop
    /// node, so let-scoped loop variables bind outside the iteration.
    fn parse_loop_body(&mut self) -> ParseResult<(Node, Node)> {
        let body = self.parse_statement()?;
        if matches!(body.kind, NodeKind::Block) {
            let mut block = body;
            let inner = block
                .remove_left()
                .unwrap_or_else(|| Node::new(NodeKind::Nop));
            Ok((block, inner))
        } else {
            Ok((Node::new(NodeKind::Block), body))
        }
    }

    fn parse_switch_statement(&mut self) -> ParseResult<Node> {
        self.next_token();
        let mut node = self.create_node(NodeKind::Switch);
        self.expect(TokenKind::Lparen)?;
        let expr = self.parse_expression()?;
        self.expect(TokenKind::Rparen)?;
        self.expect(TokenKind::Lbrace)?;

        self.push_state();
        self.state.block_nest_count += 1;
        let mut cases = self.create_node(NodeKind::CaseElements);
        let mut seen_default = false;
        loop {
            match self.peek_token() {
                TokenKind::Case => {
                    self.next_token();
                    let mut label = self.create_node(NodeKind::CaseLabel(CaseKind::Case));
                    let case_expr = match self.parse_expression() {
                        Ok(e) => e,
                        Err(e) => {
                            self.pop_state();
                            return Err(e);
                        }
                    };
                    if self.expect(TokenKind::Colon).is_err() {
                        self.pop_state();
                        return Err(crate::parser::SyntaxError);
                    }
                    label.append(case_expr);
                    label.append(self.parse_case_directives());
                    cases.append(label);
                }
                TokenKind::Default => {
                    self.next_token();
                    if seen_default {
                        self.parse_warning("Duplicate default label in switch");
                    }
                    seen_default = true;
                    let mut label = self.create_node(NodeKind::CaseLabel(CaseKind::Default));
                    if self.expect(TokenKind::Colon).is_err() {
                        self.pop_state();
                        return Err(crate::parser::SyntaxError);
                    }
                    label.append(self.parse_case_directives());
                    cases.append(label);
                }
                _ => break,
            }
        }
        self.pop_state();
        self.expect(TokenKind::Rbrace)?;
        node.append(expr);
        node.append(cases);
        Ok(node)
    }

    /// Directives belonging to one case label, ending at the next label
    /// or the closing brace.
    fn parse_case_directives(&mut self) -> Node {
        let mut directives = self.create_node(NodeKind::Directives);
        loop {
            if self.fatal {
                break;
            }
            match self.peek_token() {
                TokenKind::Case | TokenKind::Default | TokenKind::Rbrace | TokenKind::Eof => break,
                TokenKind::Err => {
                    self.next_token();
                    self.errored = false;
                    continue;
                }
                _ => {}
            }
            let line = self.peek_ahead_token(1).line_number;
            match self.parse_directive() {
                Ok(node) => directives.append(node),
                Err(_) => self.reset_error(line),
            }
        }
        directives
    }

    fn parse_try_statement(&mut self) -> ParseResult<Node> {
        self.next_token();
        let mut node = self.create_node(NodeKind::Try { has_finally: false });
        let try_block = self.parse_block()?;
        node.append(try_block);

        let mut catches = self.create_node(NodeKind::CatchClauses);
        while self.peek_token() == TokenKind::Catch {
            catches.append(self.parse_catch_clause()?);
        }
        let num_catches = catches.num_children();
        node.append(catches);

        let has_finally = self.accept(TokenKind::Finally);
        if has_finally {
            node.kind = NodeKind::Try { has_finally: true };
            node.append(self.parse_block()?);
        }

        if num_catches == 0 && !has_finally {
            return Err(self.parse_error("Missing catch or finally after try"));
        }
        Ok(node)
    }

    /// A declared catch parameter is rewritten to an assignment from the
    /// caught value, placed at the front of the catch block.
    fn parse_catch_clause(&mut self) -> ParseResult<Node> {
        self.next_token();
        let mut clause = self.create_node(NodeKind::Catch);

        let binding = if self.accept(TokenKind::Lparen) {
            let name = self.parse_identifier()?;
            let type_node = if self.accept(TokenKind::Colon) {
                Some(self.parse_type_annotation()?.0)
            } else {
                None
            };
            self.expect(TokenKind::Rparen)?;
            Some((name, type_node))
        } else {
            None
        };

        let mut block = self.parse_block()?;
        if let Some((name, type_node)) = binding {
            let mut var = Node::new(NodeKind::VarDefinition(VarKind::Let));
            var.loc = clause.loc.clone();
            let mut assign = Node::new(NodeKind::AssignOp);
            assign.loc = clause.loc.clone();
            let mut name_node = Node::new(NodeKind::Name { attribute: false });
            name_node.qname = Some(QName::new(name));
            name_node.loc = clause.loc.clone();
            if let Some(ty) = type_node {
                name_node.append(ty);
            }
            assign.append(name_node);
            assign.append(Node::new(NodeKind::CatchArg));
            var.append(assign);
            if let Some(directives) = block.left_mut() {
                directives.prepend(var);
            }
        }
        clause.append(block);
        Ok(clause)
    }

    fn parse_throw_statement(&mut self) -> ParseResult<Node> {
        self.next_token();
        let mut node = self.create_node(NodeKind::Throw);
        node.append(self.parse_expression()?);
        self.expect_semicolon()?;
        Ok(node)
    }

    fn parse_return_statement(&mut self) -> ParseResult<Node> {
        self.next_token();
        if !self.state.in_function {
            return Err(self.parse_error("Return statement outside a function"));
        }
        let return_line = self.token.line_number;
        let mut node = self.create_node(NodeKind::Return { has_value: false });
        let next = self.peek_ahead_token(1);
        let has_value = !matches!(
            next.kind,
            TokenKind::Semicolon
                | TokenKind::Rbrace
                | TokenKind::Eof
                | TokenKind::Nop
                | TokenKind::Err
        ) && next.line_number == return_line;
        if has_value {
            node.kind = NodeKind::Return { has_value: true };
            node.append(self.parse_expression()?);
        }
        self.expect_semicolon()?;
        Ok(node)
    }

    fn parse_break_statement(&mut self) -> ParseResult<Node> {
        self.next_token();
        let line = self.token.line_number;
        let mut node = self.create_node(NodeKind::Break);
        let next = self.peek_ahead_token(1);
        if next.kind == TokenKind::Id && next.line_number == line {
            self.next_token();
            node.qname = Some(QName::new(self.interner.intern(&self.token.text)));
        }
        self.expect_semicolon()?;
        Ok(node)
    }

    fn parse_continue_statement(&mut self) -> ParseResult<Node> {
        self.next_token();
        let line = self.token.line_number;
        let mut node = self.create_node(NodeKind::Continue);
        let next = self.peek_ahead_token(1);
        if next.kind == TokenKind::Id && next.line_number == line {
            self.next_token();
            node.qname = Some(QName::new(self.interner.intern(&self.token.text)));
        }
        self.expect_semicolon()?;
        Ok(node)
    }

    fn parse_with_statement(&mut self) -> ParseResult<Node> {
        self.next_token();
        if self.state.mode == escript_ast::Mode::Strict {
            return Err(self.parse_error("\"with\" is not allowed in strict mode"));
        }
        let mut node = self.create_node(NodeKind::With);
        self.expect(TokenKind::Lparen)?;
        let object = self.parse_expression()?;
        self.expect(TokenKind::Rparen)?;
        let body = self.parse_statement()?;
        node.append(object);
        if matches!(body.kind, NodeKind::Block) {
            node.append(body);
        } else {
            let mut block = Node::new(NodeKind::Block);
            block.loc = body.loc.clone();
            let mut directives = Node::new(NodeKind::Directives);
            directives.loc = body.loc.clone();
            directives.append(body);
            block.append(directives);
            node.append(block);
        }
        Ok(node)
    }

    /// `# condition directive` conditional compilation.
    fn parse_hash_directive(&mut self) -> ParseResult<Node> {
        self.next_token();
        let kind = self.next_token();
        if !matches!(kind, TokenKind::Id | TokenKind::Number | TokenKind::String) {
            return Err(self.parse_error("Expecting a condition after \"#\""));
        }
        let condition = self.token.text.clone();
        let mut node = self.create_node(NodeKind::Hash { condition });
        let mut directives = Node::new(NodeKind::Directives);
        directives.loc = node.loc.clone();
        directives.append(self.parse_directive()?);
        node.append(directives);
        Ok(node)
    }

    fn parse_labeled_statement(&mut self) -> ParseResult<Node> {
        self.next_token();
        let label = self.interner.intern(&self.token.text);
        self.expect(TokenKind::Colon)?;
        let mut stmt = self.parse_statement()?;
        if stmt.qname.is_none() {
            stmt.qname = Some(QName::new(label));
        }
        Ok(stmt)
    }
}
