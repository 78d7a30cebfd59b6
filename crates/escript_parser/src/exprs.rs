//! Expression grammar.
//!
//! One function per precedence level, from comma lists down to primary
//! expressions. Compound assignments are rewritten here into a plain
//! assignment whose right side is the equivalent binary operation, so
//! later passes only ever see simple assignments.

use crate::parser::{ParseResult, Parser};
use escript_ast::{
    FieldInfo, FieldKind, Node, NodeKind, ThisKind, TokenGroups, TokenKind, VarKind,
};
use escript_core::Value;

impl Parser {
    /// Comma expression list. A single expression is returned bare; two
    /// or more are wrapped in an `Expressions` node.
    pub(crate) fn parse_expression(&mut self) -> ParseResult<Node> {
        let first = self.parse_assignment_expression()?;
        if self.peek_token() != TokenKind::Comma {
            return Ok(first);
        }
        let mut list = self.create_node(NodeKind::Expressions);
        list.loc = first.loc.clone();
        list.append(first);
        while self.accept(TokenKind::Comma) {
            list.append(self.parse_assignment_expression()?);
        }
        Ok(list)
    }

    /// Assignment is right associative. `lhs OP= rhs` is rewritten to
    /// `lhs = lhs OP rhs` using the compound operator table.
    pub(crate) fn parse_assignment_expression(&mut self) -> ParseResult<Node> {
        let left = self.parse_ternary_expression()?;
        if self.peek_token() != TokenKind::Assign {
            return Ok(left);
        }
        self.next_token();
        let sub = self.token.sub;
        let mut assign = self.create_node(NodeKind::AssignOp);
        let right = self.parse_assignment_expression()?;
        match sub.and_then(TokenKind::compound_base) {
            Some(base) => {
                let mut bin = Node::new(NodeKind::BinaryOp(base));
                bin.token = Some(base);
                bin.loc = assign.loc.clone();
                bin.append(left.clone());
                bin.append(right);
                assign.append(left);
                assign.append(bin);
            }
            None => {
                assign.append(left);
                assign.append(right);
            }
        }
        Ok(assign)
    }

    /// `cond ? then : else`, right associative through the recursive
    /// calls on both arms.
    fn parse_ternary_expression(&mut self) -> ParseResult<Node> {
        let cond = self.parse_logical_or_expression()?;
        if !self.accept(TokenKind::Query) {
            return Ok(cond);
        }
        let mut node = self.create_node(NodeKind::If);
        let then = self.parse_assignment_expression()?;
        self.expect(TokenKind::Colon)?;
        let other = self.parse_assignment_expression()?;
        node.append(cond);
        node.append(then);
        node.append(other);
        Ok(node)
    }

    fn parse_binary_level(
        &mut self,
        operators: &[TokenKind],
        next: fn(&mut Parser) -> ParseResult<Node>,
    ) -> ParseResult<Node> {
        let mut left = next(self)?;
        loop {
            let kind = self.peek_token();
            if !operators.contains(&kind) {
                return Ok(left);
            }
            self.next_token();
            let mut op = self.create_node(NodeKind::BinaryOp(kind));
            let right = next(self)?;
            op.append(left);
            op.append(right);
            left = op;
        }
    }

    fn parse_logical_or_expression(&mut self) -> ParseResult<Node> {
        self.parse_binary_level(
            &[TokenKind::LogicalOr, TokenKind::LogicalXor],
            Self::parse_logical_and_expression,
        )
    }

    fn parse_logical_and_expression(&mut self) -> ParseResult<Node> {
        self.parse_binary_level(&[TokenKind::LogicalAnd], Self::parse_bit_or_expression)
    }

    fn parse_bit_or_expression(&mut self) -> ParseResult<Node> {
        self.parse_binary_level(&[TokenKind::BitOr], Self::parse_bit_xor_expression)
    }

    fn parse_bit_xor_expression(&mut self) -> ParseResult<Node> {
        self.parse_binary_level(&[TokenKind::BitXor], Self::parse_bit_and_expression)
    }

    fn parse_bit_and_expression(&mut self) -> ParseResult<Node> {
        self.parse_binary_level(&[TokenKind::BitAnd], Self::parse_equality_expression)
    }

    fn parse_equality_expression(&mut self) -> ParseResult<Node> {
        self.parse_binary_level(
            &[
                TokenKind::Eq,
                TokenKind::Ne,
                TokenKind::StrictEq,
                TokenKind::StrictNe,
            ],
            Self::parse_relational_expression,
        )
    }

    /// Relational operators plus the type test operators. `in` is
    /// suppressed while parsing a for-in iterand.
    fn parse_relational_expression(&mut self) -> ParseResult<Node> {
        let mut left = self.parse_shift_expression()?;
        loop {
            let kind = self.peek_token();
            match kind {
                TokenKind::Lt | TokenKind::Gt | TokenKind::Le | TokenKind::Ge => {
                    self.next_token();
                    let mut op = self.create_node(NodeKind::BinaryOp(kind));
                    let right = self.parse_shift_expression()?;
                    op.append(left);
                    op.append(right);
                    left = op;
                }
                TokenKind::In if !self.state.no_in => {
                    self.next_token();
                    let mut op = self.create_node(NodeKind::BinaryOp(kind));
                    let right = self.parse_shift_expression()?;
                    op.append(left);
                    op.append(right);
                    left = op;
                }
                TokenKind::Instanceof | TokenKind::Is | TokenKind::Like | TokenKind::Cast => {
                    self.next_token();
                    let mut op = self.create_node(NodeKind::BinaryTypeOp(kind));
                    let (ty, _) = self.parse_type_annotation()?;
                    op.append(left);
                    op.append(ty);
                    left = op;
                }
                _ => return Ok(left),
            }
        }
    }

    fn parse_shift_expression(&mut self) -> ParseResult<Node> {
        self.parse_binary_level(
            &[TokenKind::Lsh, TokenKind::Rsh, TokenKind::RshZero],
            Self::parse_additive_expression,
        )
    }

    fn parse_additive_expression(&mut self) -> ParseResult<Node> {
        self.parse_binary_level(
            &[TokenKind::Plus, TokenKind::Minus],
            Self::parse_multiplicative_expression,
        )
    }

    fn parse_multiplicative_expression(&mut self) -> ParseResult<Node> {
        let mut left = self.parse_unary_expression()?;
        loop {
            let kind = self.peek_token();
            // `*` in name position is the wildcard, never multiplication,
            // but after a complete operand it is always the operator.
            if !matches!(kind, TokenKind::Mul | TokenKind::Div | TokenKind::Mod) {
                return Ok(left);
            }
            self.next_token();
            let mut op = self.create_node(NodeKind::BinaryOp(kind));
            let right = self.parse_unary_expression()?;
            op.append(left);
            op.append(right);
            left = op;
        }
    }

    fn parse_unary_expression(&mut self) -> ParseResult<Node> {
        let kind = self.peek_token();
        match kind {
            TokenKind::Plus
            | TokenKind::Minus
            | TokenKind::LogicalNot
            | TokenKind::Tilde
            | TokenKind::PlusPlus
            | TokenKind::MinusMinus
            | TokenKind::Typeof
            | TokenKind::Void
            | TokenKind::Delete => {
                self.next_token();
                let mut node = self.create_node(NodeKind::UnaryOp(kind));
                node.append(self.parse_unary_expression()?);
                Ok(node)
            }
            _ => self.parse_postfix_expression(),
        }
    }

    /// Member access, indexing, calls, and postfix increment, applied
    /// left to right to the primary expression.
    fn parse_postfix_expression(&mut self) -> ParseResult<Node> {
        let mut node = if self.peek_token() == TokenKind::New {
            self.parse_new_expression()?
        } else {
            self.parse_primary_expression()?
        };
        loop {
            match self.peek_token() {
                TokenKind::Dot | TokenKind::DotDot => {
                    node = self.parse_member_access(node)?;
                }
                TokenKind::Lbracket => {
                    node = self.parse_index_access(node)?;
                }
                TokenKind::Lparen => {
                    node = self.parse_call(node)?;
                }
                TokenKind::PlusPlus | TokenKind::MinusMinus => {
                    let kind = self.next_token();
                    let mut post = self.create_node(NodeKind::PostfixOp(kind));
                    post.append(node);
                    node = post;
                }
                _ => return Ok(node),
            }
        }
    }

    /// `a.b` or the descendants form `a..b`. Reserved words are allowed
    /// as property names after a dot.
    fn parse_member_access(&mut self, left: Node) -> ParseResult<Node> {
        self.next_token();
        let mut dot = self.create_node(NodeKind::Dot);
        let right = self.parse_property_name()?;
        dot.append(left);
        dot.append(right);
        Ok(dot)
    }

    fn parse_property_name(&mut self) -> ParseResult<Node> {
        if self.peek_token() == TokenKind::Lparen {
            // E4X filter predicate: a.(expr)
            if !self.xml_enabled {
                self.next_token();
                return Err(self.parse_error("XML filter expressions are not enabled"));
            }
            self.next_token();
            let expr = self.parse_expression()?;
            self.expect(TokenKind::Rparen)?;
            return Ok(expr);
        }
        if self.peek_ahead(2) == TokenKind::ColonColon {
            return self.parse_qualified_name();
        }
        let kind = self.next_token();
        let named = matches!(kind, TokenKind::Id | TokenKind::Mul)
            || self
                .token
                .groups
                .intersects(TokenGroups::CONREV | TokenGroups::RESERVED);
        if !named {
            return Err(self.parse_error(format!(
                "Expecting a property name, got \"{}\"",
                self.token.text
            )));
        }
        let name = self.interner.intern(&self.token.text);
        let mut node = self.create_node(NodeKind::Name { attribute: false });
        node.qname = Some(escript_ast::QName::new(name));
        Ok(node)
    }

    fn parse_index_access(&mut self, left: Node) -> ParseResult<Node> {
        self.next_token();
        let mut dot = self.create_node(NodeKind::Dot);
        let index = self.parse_expression()?;
        self.expect(TokenKind::Rbracket)?;
        dot.append(left);
        dot.append(index);
        Ok(dot)
    }

    pub(crate) fn parse_call(&mut self, callee: Node) -> ParseResult<Node> {
        self.next_token();
        let mut call = self.create_node(NodeKind::Call);
        let args = self.parse_argument_list()?;
        call.append(callee);
        call.append(args);
        Ok(call)
    }

    /// Arguments after a consumed `(`.
    fn parse_argument_list(&mut self) -> ParseResult<Node> {
        let mut args = self.create_node(NodeKind::Args);
        if self.peek_token() != TokenKind::Rparen {
            loop {
                args.append(self.parse_assignment_expression()?);
                if !self.accept(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenKind::Rparen)?;
        Ok(args)
    }

    /// `new` expressions. A bare `new X` gets a synthesized empty
    /// argument list so every constructor invocation is a call.
    fn parse_new_expression(&mut self) -> ParseResult<Node> {
        self.next_token();
        let mut new_node = self.create_node(NodeKind::New);

        let mut ctor = if self.peek_token() == TokenKind::New {
            self.parse_new_expression()?
        } else {
            self.parse_primary_expression()?
        };
        loop {
            match self.peek_token() {
                TokenKind::Dot | TokenKind::DotDot => ctor = self.parse_member_access(ctor)?,
                TokenKind::Lbracket => ctor = self.parse_index_access(ctor)?,
                _ => break,
            }
        }

        let call = if self.peek_token() == TokenKind::Lparen {
            self.parse_call(ctor)?
        } else {
            let mut call = Node::new(NodeKind::Call);
            call.loc = ctor.loc.clone();
            let mut args = Node::new(NodeKind::Args);
            args.loc = ctor.loc.clone();
            call.append(ctor);
            call.append(args);
            call
        };
        new_node.append(call);
        Ok(new_node)
    }

    fn parse_primary_expression(&mut self) -> ParseResult<Node> {
        match self.peek_token() {
            TokenKind::Number => {
                self.next_token();
                match Value::parse_number(&self.token.text) {
                    Some(value) => Ok(self.create_node(NodeKind::Literal(value))),
                    None => Err(self.parse_error(format!(
                        "Invalid numeric literal \"{}\"",
                        self.token.text
                    ))),
                }
            }
            TokenKind::String => {
                self.next_token();
                let value = Value::string(&self.token.text);
                Ok(self.create_node(NodeKind::Literal(value)))
            }
            TokenKind::True => {
                self.next_token();
                Ok(self.create_node(NodeKind::Literal(Value::Boolean(true))))
            }
            TokenKind::False => {
                self.next_token();
                Ok(self.create_node(NodeKind::Literal(Value::Boolean(false))))
            }
            TokenKind::Null => {
                self.next_token();
                Ok(self.create_node(NodeKind::Literal(Value::Null)))
            }
            TokenKind::Undefined => {
                self.next_token();
                Ok(self.create_node(NodeKind::Literal(Value::Undefined)))
            }
            TokenKind::Div => self.parse_regexp_literal(),
            TokenKind::Lparen => {
                self.next_token();
                let expr = self.parse_expression()?;
                self.expect(TokenKind::Rparen)?;
                Ok(expr)
            }
            TokenKind::Lbracket => self.parse_array_literal(),
            TokenKind::Lbrace => self.parse_object_literal(),
            TokenKind::Function => self.parse_function_expression(),
            TokenKind::This => self.parse_this_expression(),
            TokenKind::Super => self.parse_super_expression(),
            TokenKind::Yield => self.parse_yield_expression(),
            TokenKind::Let => self.parse_let_expression(),
            TokenKind::Lt | TokenKind::LtSlash => self.parse_xml_literal(),
            TokenKind::Err => {
                self.next_token();
                Err(self.parse_error("Invalid token"))
            }
            _ if self.peek_is_name() => self.parse_qualified_name(),
            _ => {
                self.next_token();
                Err(self.parse_error(format!(
                    "Syntax error, unexpected \"{}\"",
                    self.token.text
                )))
            }
        }
    }

    /// The `/` was lexed as division; ask the lexer to rescan it as a
    /// regular expression literal. Buffered lookahead is flushed first so
    /// the rescan starts from the stream, not behind stale tokens.
    fn parse_regexp_literal(&mut self) -> ParseResult<Node> {
        while self.lexer.has_put_back() {
            self.next_token();
        }
        if !self.regexp_enabled {
            return Err(self.parse_error("Regular expressions are not enabled"));
        }
        let kind = self.lexer.get_regexp_token();
        if !self.lexer.diagnostics.is_empty() {
            let pending = self.lexer.diagnostics.drain();
            self.reporter.report_all(pending);
        }
        if let Some(tok) = self.lexer.take_token() {
            self.token = tok;
        }
        if kind != TokenKind::Regexp {
            return Err(self.parse_error("Invalid regular expression"));
        }
        let value = Value::regexp(&self.token.text);
        Ok(self.create_node(NodeKind::Literal(value)))
    }

    fn parse_this_expression(&mut self) -> ParseResult<Node> {
        self.next_token();
        let kind = match self.peek_token() {
            TokenKind::Callee => {
                self.next_token();
                ThisKind::Callee
            }
            TokenKind::Generator => {
                self.next_token();
                ThisKind::Generator
            }
            TokenKind::Function => {
                self.next_token();
                ThisKind::Function
            }
            TokenKind::Type => {
                self.next_token();
                ThisKind::Type
            }
            _ => ThisKind::Default,
        };
        Ok(self.create_node(NodeKind::This(kind)))
    }

    fn parse_super_expression(&mut self) -> ParseResult<Node> {
        self.next_token();
        if !self.state.in_class {
            return Err(self.parse_error("Super is only valid inside a class"));
        }
        let mut node = self.create_node(NodeKind::Super);
        if self.peek_token() == TokenKind::Lparen {
            self.next_token();
            node.append(self.parse_argument_list()?);
        }
        Ok(node)
    }

    /// Generators are not implemented; the expression is parsed so
    /// surrounding code can still be checked, and later phases reject it.
    fn parse_yield_expression(&mut self) -> ParseResult<Node> {
        self.next_token();
        if !self.state.in_function {
            return Err(self.parse_error("Yield statement outside a function"));
        }
        let mut node = self.create_node(NodeKind::UnaryOp(TokenKind::Yield));
        match self.peek_token() {
            TokenKind::Semicolon
            | TokenKind::Rbrace
            | TokenKind::Rparen
            | TokenKind::Comma
            | TokenKind::Eof
            | TokenKind::Nop => node.append(Node::new(NodeKind::Nop)),
            _ => node.append(self.parse_assignment_expression()?),
        }
        Ok(node)
    }

    /// `let (x = 1, y = 2) expr` scoped bindings in expression position.
    fn parse_let_expression(&mut self) -> ParseResult<Node> {
        self.next_token();
        let mut list = self.create_node(NodeKind::Expressions);
        self.expect(TokenKind::Lparen)?;
        let bindings = self.parse_variable_bindings(VarKind::Let)?;
        self.expect(TokenKind::Rparen)?;
        list.append(bindings);
        list.append(self.parse_assignment_expression()?);
        Ok(list)
    }

    /// Raw XML literal capture. The document is not parsed here; the
    /// bracketed text is kept verbatim for the runtime's E4X support.
    fn parse_xml_literal(&mut self) -> ParseResult<Node> {
        self.next_token();
        if !self.xml_enabled {
            return Err(self.parse_error("XML literals are not enabled"));
        }
        let mut node = self.create_node(NodeKind::Literal(Value::Xml(String::new())));
        let mut text = self.token.text.clone();
        let mut depth = 1i32;
        loop {
            match self.next_token() {
                TokenKind::Eof | TokenKind::Nop | TokenKind::Err => {
                    return Err(self.parse_error("Unterminated XML literal"));
                }
                TokenKind::Lt => depth += 1,
                TokenKind::LtSlash => depth -= 1,
                TokenKind::SlashGt => {
                    depth -= 1;
                    text.push_str(&self.token.text);
                    if depth <= 0 {
                        break;
                    }
                    continue;
                }
                _ => {}
            }
            text.push_str(&self.token.text);
            if depth <= 0 && self.token.kind == TokenKind::Gt {
                break;
            }
        }
        node.kind = NodeKind::Literal(Value::Xml(text));
        Ok(node)
    }

    fn parse_object_literal(&mut self) -> ParseResult<Node> {
        self.next_token();
        let mut lit = self.create_node(NodeKind::ObjectLiteral);
        let type_name = self.synthetic_name("Object", None);
        lit.append(type_name);
        if self.peek_token() != TokenKind::Rbrace {
            loop {
                lit.append(self.parse_field()?);
                if !self.accept(TokenKind::Comma) {
                    break;
                }
                if self.peek_token() == TokenKind::Rbrace {
                    break;
                }
            }
        }
        self.expect(TokenKind::Rbrace)?;
        Ok(lit)
    }

    fn parse_field(&mut self) -> ParseResult<Node> {
        let const_field = self.accept(TokenKind::Const);

        // `get name() {...}` accessor fields; a lone `get` can still be
        // a plain field name, so look at the token after it.
        let accessor = match self.peek_token() {
            TokenKind::Get if self.peek_ahead(2) != TokenKind::Colon => Some(FieldKind::Get),
            TokenKind::Set if self.peek_ahead(2) != TokenKind::Colon => Some(FieldKind::Set),
            _ => None,
        };

        if let Some(kind) = accessor {
            self.next_token();
            let mut field = self.create_node(NodeKind::Field(FieldInfo { kind, const_field }));
            let name = self.parse_field_name()?;
            let func = self.parse_accessor_function(kind)?;
            field.append(name);
            field.append(func);
            return Ok(field);
        }

        let name = self.parse_field_name()?;
        let mut field = Node::new(NodeKind::Field(FieldInfo {
            kind: FieldKind::Value,
            const_field,
        }));
        field.loc = name.loc.clone();
        self.expect(TokenKind::Colon)?;
        let value = self.parse_assignment_expression()?;
        field.append(name);
        field.append(value);
        Ok(field)
    }

    /// A field name may be an identifier, string, or number.
    fn parse_field_name(&mut self) -> ParseResult<Node> {
        match self.peek_token() {
            TokenKind::String => {
                self.next_token();
                let value = Value::string(&self.token.text);
                Ok(self.create_node(NodeKind::Literal(value)))
            }
            TokenKind::Number => {
                self.next_token();
                match Value::parse_number(&self.token.text) {
                    Some(value) => Ok(self.create_node(NodeKind::Literal(value))),
                    None => Err(self.parse_error(format!(
                        "Invalid numeric literal \"{}\"",
                        self.token.text
                    ))),
                }
            }
            _ => {
                let kind = self.next_token();
                let named = matches!(kind, TokenKind::Id)
                    || self
                        .token
                        .groups
                        .intersects(TokenGroups::CONREV | TokenGroups::RESERVED);
                if !named {
                    return Err(self.parse_error("Expecting a field name"));
                }
                let name = self.interner.intern(&self.token.text);
                let mut node = self.create_node(NodeKind::Name { attribute: false });
                node.qname = Some(escript_ast::QName::new(name));
                Ok(node)
            }
        }
    }

    /// Array literals become a synthesized run of indexed assignments
    /// onto the object under construction, referenced by `Ref`.
    fn parse_array_literal(&mut self) -> ParseResult<Node> {
        self.next_token();
        let mut lit = self.create_node(NodeKind::ArrayLiteral);
        let type_name = self.synthetic_name("Array", None);
        lit.append(type_name);

        let mut exprs = self.create_node(NodeKind::Expressions);
        let mut index = 0.0f64;
        loop {
            match self.peek_token() {
                TokenKind::Rbracket => break,
                TokenKind::Comma => {
                    // Elision leaves a hole at this index.
                    self.next_token();
                    index += 1.0;
                }
                _ => {
                    let value = self.parse_assignment_expression()?;
                    let mut assign = Node::new(NodeKind::AssignOp);
                    assign.loc = value.loc.clone();
                    let mut dot = Node::new(NodeKind::Dot);
                    dot.token = Some(TokenKind::Lbracket);
                    dot.loc = value.loc.clone();
                    dot.append(Node::new(NodeKind::Ref));
                    dot.append(Node::new(NodeKind::Literal(Value::Number(index))));
                    assign.append(dot);
                    assign.append(value);
                    exprs.append(assign);
                    index += 1.0;
                    if self.peek_token() == TokenKind::Comma {
                        self.next_token();
                    } else {
                        break;
                    }
                }
            }
        }
        self.expect(TokenKind::Rbracket)?;
        // A trailing annotation overrides the default Array type.
        if self.peek_token() == TokenKind::Colon {
            self.next_token();
            lit.children[0] = self.parse_type_annotation()?.0;
        }
        lit.append(exprs);
        Ok(lit)
    }
}
