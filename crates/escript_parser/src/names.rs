//! Identifiers, qualified names, and type annotations.

use crate::parser::{ParseResult, Parser};
use escript_ast::{Node, NodeKind, QName, TokenGroups, TokenKind};
use escript_core::InternedString;

impl Parser {
    /// True when the next token can start a name: an identifier, a
    /// contextually reserved word, or an `@` attribute prefix.
    pub(crate) fn peek_is_name(&mut self) -> bool {
        let tok = self.peek_ahead_token(1);
        matches!(tok.kind, TokenKind::Id | TokenKind::At | TokenKind::Mul)
            || tok.groups.contains(TokenGroups::CONREV)
    }

    /// Consume an identifier, allowing contextually reserved words.
    pub(crate) fn parse_identifier(&mut self) -> ParseResult<InternedString> {
        let kind = self.next_token();
        if kind == TokenKind::Id || self.token.in_group(TokenGroups::CONREV) {
            return Ok(self.interner.intern(&self.token.text));
        }
        Err(self.parse_error(format!(
            "Expecting an identifier, got \"{}\"",
            self.token.text
        )))
    }

    /// Parse a possibly qualified name:
    ///
    /// ```text
    ///     name
    ///     qualifier :: name
    ///     "uri" :: name
    ///     @ name                  (attribute name)
    ///     *                       (wildcard)
    /// ```
    ///
    /// The qualifier check needs two tokens of lookahead, which is how
    /// `a :: b` is told apart from a plain reference to `a`.
    pub(crate) fn parse_qualified_name(&mut self) -> ParseResult<Node> {
        let attribute = self.accept(TokenKind::At);

        let space = if self.peek_ahead(2) == TokenKind::ColonColon {
            let kind = self.next_token();
            let ok = matches!(kind, TokenKind::Id | TokenKind::String)
                || self.token.in_group(TokenGroups::CONREV)
                || kind == TokenKind::ReservedNamespace;
            if !ok {
                return Err(self.parse_error("Expecting a namespace qualifier"));
            }
            let space = self.interner.intern(&self.token.text);
            self.expect(TokenKind::ColonColon)?;
            Some(space)
        } else {
            None
        };

        let kind = self.next_token();
        let named = matches!(kind, TokenKind::Id | TokenKind::Mul)
            || self.token.in_group(TokenGroups::CONREV)
            || (space.is_some() && self.token.in_group(TokenGroups::RESERVED));
        if !named {
            return Err(self.parse_error(format!(
                "Expecting a name, got \"{}\"",
                self.token.text
            )));
        }
        let name = self.interner.intern(&self.token.text);

        let mut node = self.create_node(NodeKind::Name { attribute });
        node.qname = Some(match space {
            Some(space) => QName::qualified(name, space),
            None => QName::new(name),
        });
        Ok(node)
    }

    /// Parse a type annotation after `:`. The annotation is a qualified
    /// name, possibly dotted (`ns.Type`), returned as a name or member
    /// access chain. A trailing `?` marks nullability and is reported to
    /// the caller rather than encoded in the type node.
    pub(crate) fn parse_type_annotation(&mut self) -> ParseResult<(Node, bool)> {
        let mut node = self.parse_qualified_name()?;
        while self.peek_token() == TokenKind::Dot && self.peek_ahead(2) == TokenKind::Id {
            self.next_token();
            let mut dot = self.create_node(NodeKind::Dot);
            let right = self.parse_qualified_name()?;
            dot.append(node);
            dot.append(right);
            node = dot;
        }
        let nullable = self.accept(TokenKind::Query);
        Ok((node, nullable))
    }

    /// Synthesized name node, used for default literal types and
    /// iterator calls.
    pub(crate) fn synthetic_name(&mut self, name: &'static str, space: Option<&'static str>) -> Node {
        let name = self.interner.intern_static(name);
        let mut node = self.create_node(NodeKind::Name { attribute: false });
        node.qname = Some(match space {
            Some(space) => QName::qualified(name, self.interner.intern_static(space)),
            None => QName::new(name),
        });
        node
    }
}
