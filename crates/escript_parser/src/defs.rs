//! Definitions: variables, functions, classes, interfaces, namespaces,
//! modules, and pragmas, together with the attribute prefix grammar.

use crate::parser::{ParseResult, Parser, DEFAULT_MODULE_NAME, MAX_LOOKAHEAD};
use escript_ast::{
    Attributes, ClassInfo, FieldKind, FunctionInfo, LangLevel, Mode, Node, NodeKind, PragmaKind,
    QName, TokenGroups, TokenKind, VarKind,
};
use escript_core::{InternedString, Value};

impl Parser {
    /// Decide whether an identifier opens an attributed definition such
    /// as `MySpace static var x`. The attribute run is bounded: a
    /// definition keyword must appear within the lookahead window, with
    /// only attribute-like tokens before it. Hitting the window's end
    /// while the decision is still open is an error, not a guess.
    pub(crate) fn starts_attributed_definition(&mut self) -> ParseResult<bool> {
        for k in 2..=MAX_LOOKAHEAD {
            let tok = self.peek_ahead_token(k);
            match tok.kind {
                TokenKind::Var
                | TokenKind::Let
                | TokenKind::Const
                | TokenKind::Function
                | TokenKind::Class
                | TokenKind::Interface
                | TokenKind::Namespace
                | TokenKind::Module => return Ok(true),
                TokenKind::Id | TokenKind::Attribute | TokenKind::ReservedNamespace => continue,
                _ => return Ok(false),
            }
        }
        self.next_token();
        Err(self.parse_error("Too many qualifiers before a declaration"))
    }

    /// Parse an optional attribute run followed by a definition. The
    /// attributes and namespace qualifier are merged onto the definition
    /// node.
    pub(crate) fn parse_attributed_definition(&mut self) -> ParseResult<Node> {
        let doc = self.lexer.take_doc();
        let mut attributes = Attributes::NONE;
        let mut namespace: Option<InternedString> = None;

        loop {
            match self.peek_token() {
                TokenKind::Attribute => {
                    self.next_token();
                    if let Some(bit) = self.token.sub.and_then(Attributes::from_attribute_token) {
                        if attributes.contains(bit) {
                            self.parse_warning(format!(
                                "Duplicate attribute \"{}\"",
                                self.token.text
                            ));
                        }
                        attributes |= bit;
                    }
                }
                TokenKind::ReservedNamespace => {
                    self.next_token();
                    let private = matches!(
                        self.token.sub,
                        Some(TokenKind::Private) | Some(TokenKind::Protected)
                    );
                    if private && !self.state.in_class {
                        return Err(self.parse_error(format!(
                            "\"{}\" is only valid inside a class",
                            self.token.text
                        )));
                    }
                    if namespace.is_some() {
                        return Err(self.parse_error("Conflicting namespace qualifiers"));
                    }
                    namespace = Some(self.interner.intern(&self.token.text));
                }
                TokenKind::Id => {
                    if !self.starts_attributed_definition()? {
                        break;
                    }
                    self.next_token();
                    if namespace.is_some() {
                        return Err(self.parse_error("Conflicting namespace qualifiers"));
                    }
                    namespace = Some(self.interner.intern(&self.token.text));
                }
                _ => break,
            }
        }

        let mut node = match self.peek_token() {
            TokenKind::Var => self.parse_variable_definition(VarKind::Var),
            TokenKind::Let => {
                if attributes.contains(Attributes::STATIC) {
                    self.next_token();
                    return Err(
                        self.parse_error("\"static\" is not valid with a let declaration")
                    );
                }
                self.parse_variable_definition(VarKind::Let)
            }
            TokenKind::Const => self.parse_variable_definition(VarKind::Const),
            TokenKind::Function => self.parse_function_definition(),
            TokenKind::Class => self.parse_class_definition(false),
            TokenKind::Interface => self.parse_class_definition(true),
            TokenKind::Namespace => self.parse_namespace_definition(),
            TokenKind::Module => self.parse_module_definition(),
            TokenKind::Type => {
                self.next_token();
                Err(self.parse_error("Unsupported feature \"type\""))
            }
            _ => {
                self.next_token();
                Err(self.parse_error("Expecting a declaration after attributes"))
            }
        }?;

        node.attributes = attributes;
        // An explicit qualifier wins; otherwise any namespace installed
        // by `use default namespace` applies.
        if let Some(space) = namespace.or(self.state.default_namespace) {
            apply_namespace(&mut node, space);
        }
        if node.doc.is_none() {
            node.doc = doc;
        }
        Ok(node)
    }

    fn parse_variable_definition(&mut self, kind: VarKind) -> ParseResult<Node> {
        self.next_token();
        let node = self.parse_variable_bindings(kind)?;
        self.expect_semicolon()?;
        Ok(node)
    }

    /// One or more `name [: Type] [= init]` bindings after a consumed
    /// `var`/`let`/`const` keyword. Shared with for-loop initializers
    /// and let expressions, which supply their own terminator.
    pub(crate) fn parse_variable_bindings(&mut self, kind: VarKind) -> ParseResult<Node> {
        let mut node = self.create_node(NodeKind::VarDefinition(kind));
        loop {
            let name = self.parse_identifier()?;
            let mut name_node = self.create_node(NodeKind::Name { attribute: false });
            name_node.qname = Some(QName::new(name));
            if self.accept(TokenKind::Colon) {
                let (ty, _) = self.parse_type_annotation()?;
                name_node.append(ty);
            }
            if self.peek_token() == TokenKind::Assign {
                self.next_token();
                if self.token.sub.is_some() {
                    return Err(
                        self.parse_error("Compound assignment is not valid in a declaration")
                    );
                }
                let mut assign = self.create_node(NodeKind::AssignOp);
                let init = self.parse_assignment_expression()?;
                assign.append(name_node);
                assign.append(init);
                node.append(assign);
            } else {
                node.append(name_node);
            }
            if !self.accept(TokenKind::Comma) {
                break;
            }
        }
        Ok(node)
    }

    // ------------------------------------------------------------------
    // Functions
    // ------------------------------------------------------------------

    fn parse_function_definition(&mut self) -> ParseResult<Node> {
        self.next_token();
        let mut info = FunctionInfo {
            is_method: self.state.in_class,
            ..FunctionInfo::default()
        };

        // `function get name()` / `function set name()` accessors. A
        // function actually named `get` is disambiguated by the paren.
        match self.peek_token() {
            TokenKind::Get if self.peek_ahead(2) != TokenKind::Lparen => {
                self.next_token();
                info.getter = true;
            }
            TokenKind::Set if self.peek_ahead(2) != TokenKind::Lparen => {
                self.next_token();
                info.setter = true;
            }
            _ => {}
        }

        let peeked = self.peek_ahead_token(1);
        let name = if peeked.groups.contains(TokenGroups::OPERATOR)
            && peeked.kind != TokenKind::Lparen
        {
            // Operator overload: `function + (other) {...}`.
            if !self.state.in_class {
                self.next_token();
                return Err(self.parse_error("Operator functions are only valid inside a class"));
            }
            self.next_token();
            info.operator = Some(self.token.text.clone());
            self.interner.intern(&self.token.text)
        } else {
            self.parse_identifier()?
        };

        if self.state.in_class && self.state.current_class_name == Some(name) {
            info.is_constructor = true;
        }

        let mut node = self.create_node(NodeKind::Function(FunctionInfo::default()));
        node.qname = Some(QName::new(name));
        node.doc = self.lexer.take_doc();

        self.push_state();
        self.state.in_function = true;
        self.state.default_namespace = None;
        let result = self.parse_function_signature_and_body(&mut info, &mut node);
        self.pop_state();
        result?;

        node.kind = NodeKind::Function(info);
        Ok(node)
    }

    /// Function expression: `function [name] (params) [: Type] {...}`.
    pub(crate) fn parse_function_expression(&mut self) -> ParseResult<Node> {
        self.next_token();
        let mut info = FunctionInfo {
            expression: true,
            ..FunctionInfo::default()
        };
        let mut node = self.create_node(NodeKind::Function(FunctionInfo::default()));
        if self.peek_token() != TokenKind::Lparen {
            let name = self.parse_identifier()?;
            node.qname = Some(QName::new(name));
        }
        self.push_state();
        self.state.in_function = true;
        self.state.default_namespace = None;
        let result = self.parse_function_signature_and_body(&mut info, &mut node);
        self.pop_state();
        result?;
        node.kind = NodeKind::Function(info);
        Ok(node)
    }

    /// Accessor body inside an object literal, after `get name` / `set
    /// name` has been consumed.
    pub(crate) fn parse_accessor_function(&mut self, kind: FieldKind) -> ParseResult<Node> {
        let mut info = FunctionInfo {
            getter: kind == FieldKind::Get,
            setter: kind == FieldKind::Set,
            expression: true,
            ..FunctionInfo::default()
        };
        let mut node = self.create_node(NodeKind::Function(FunctionInfo::default()));
        self.push_state();
        self.state.in_function = true;
        self.state.default_namespace = None;
        let result = self.parse_function_signature_and_body(&mut info, &mut node);
        self.pop_state();
        result?;
        node.kind = NodeKind::Function(info);
        Ok(node)
    }

    /// Parameters, result type, and body. Children are appended in the
    /// fixed order `[Args, result type, body]` with a `Nop` placeholder
    /// when no result type is declared. Bodyless declarations (native
    /// functions and interface methods) omit the body child.
    fn parse_function_signature_and_body(
        &mut self,
        info: &mut FunctionInfo,
        node: &mut Node,
    ) -> ParseResult<()> {
        let args = self.parse_parameters(info)?;
        node.append(args);

        if self.accept(TokenKind::Colon) {
            if self.accept(TokenKind::Void) {
                let mut void_node = self.create_node(NodeKind::Name { attribute: false });
                void_node.qname = Some(QName::new(self.interner.intern_static("Void")));
                node.append(void_node);
            } else {
                let (ty, nullable) = self.parse_type_annotation()?;
                info.nullable_result = nullable;
                node.append(ty);
            }
        } else {
            node.append(Node::new(NodeKind::Nop));
        }

        if self.peek_token() == TokenKind::Lbrace {
            if self.state.in_interface && !info.expression {
                self.next_token();
                return Err(self.parse_error("Interface functions cannot have bodies"));
            }
            self.next_token();
            self.push_state();
            self.state.block_nest_count += 1;
            let body = self.parse_directives();
            self.pop_state();
            self.expect(TokenKind::Rbrace)?;
            node.append(body);
        } else {
            // Bodyless: native function or interface method.
            self.expect_semicolon()?;
        }
        Ok(())
    }

    fn parse_parameters(&mut self, info: &mut FunctionInfo) -> ParseResult<Node> {
        self.expect(TokenKind::Lparen)?;
        let mut args = self.create_node(NodeKind::Args);
        let mut seen_default = false;
        if self.peek_token() != TokenKind::Rparen {
            loop {
                if self.accept(TokenKind::Ellipsis) {
                    info.has_rest = true;
                }
                let name = self.parse_identifier()?;
                let mut name_node = self.create_node(NodeKind::Name { attribute: false });
                name_node.qname = Some(QName::new(name));
                if self.accept(TokenKind::Colon) {
                    let (ty, _) = self.parse_type_annotation()?;
                    name_node.append(ty);
                }

                let mut param = Node::new(NodeKind::VarDefinition(VarKind::Var));
                param.loc = name_node.loc.clone();
                if self.peek_token() == TokenKind::Assign {
                    self.next_token();
                    if self.token.sub.is_some() {
                        return Err(
                            self.parse_error("Compound assignment is not valid in a declaration")
                        );
                    }
                    seen_default = true;
                    let mut assign = self.create_node(NodeKind::AssignOp);
                    let default = self.parse_assignment_expression()?;
                    assign.append(name_node);
                    assign.append(default);
                    param.append(assign);
                } else {
                    if seen_default && !info.has_rest {
                        return Err(self.parse_error(
                            "Cannot declare a required parameter after a default parameter",
                        ));
                    }
                    param.append(name_node);
                }
                args.append(param);

                if !self.accept(TokenKind::Comma) {
                    break;
                }
                if info.has_rest {
                    return Err(self.parse_error("The rest parameter must be last"));
                }
            }
        }
        self.expect(TokenKind::Rparen)?;
        Ok(args)
    }

    // ------------------------------------------------------------------
    // Classes and interfaces
    // ------------------------------------------------------------------

    fn parse_class_definition(&mut self, is_interface: bool) -> ParseResult<Node> {
        self.next_token();
        if self.state.in_class {
            return Err(self.parse_error("Classes cannot be nested"));
        }
        let doc = self.lexer.take_doc();
        let mut node = self.create_node(NodeKind::Class(ClassInfo::default()));
        let name = self.parse_identifier()?;
        node.qname = Some(QName::new(name));
        node.doc = doc;

        let mut info = ClassInfo {
            is_interface,
            ..ClassInfo::default()
        };

        if self.accept(TokenKind::Extends) {
            let base = self.parse_qualified_name()?;
            info.extends = base.qname;
        }

        let mut implements = self.create_node(NodeKind::TypeIdentifiers);
        if self.accept(TokenKind::Implements) {
            loop {
                implements.append(self.parse_qualified_name()?);
                if !self.accept(TokenKind::Comma) {
                    break;
                }
            }
        }

        self.expect(TokenKind::Lbrace)?;
        self.push_state();
        self.state.in_class = true;
        self.state.in_interface = is_interface;
        self.state.in_function = false;
        self.state.default_namespace = None;
        self.state.current_class_name = Some(name);
        self.state.block_nest_count += 1;
        let mut body = self.parse_directives();
        self.pop_state();
        self.expect(TokenKind::Rbrace)?;

        info.has_constructor = body
            .children
            .iter()
            .any(|d| d.function().is_some_and(|f| f.is_constructor));

        // A class with no constructor gets a synthesized empty one, so
        // instantiation is uniform downstream.
        if !info.has_constructor && !is_interface {
            let mut ctor = Node::new(NodeKind::Function(FunctionInfo {
                is_method: true,
                is_constructor: true,
                is_default_constructor: true,
                ..FunctionInfo::default()
            }));
            ctor.qname = Some(QName::new(name));
            ctor.loc = node.loc.clone();
            ctor.append(Node::new(NodeKind::Args));
            ctor.append(Node::new(NodeKind::Nop));
            ctor.append(Node::new(NodeKind::Directives));
            body.append(ctor);
        }

        node.kind = NodeKind::Class(info);
        node.append(implements);
        node.append(body);
        Ok(node)
    }

    // ------------------------------------------------------------------
    // Namespaces and modules
    // ------------------------------------------------------------------

    /// `namespace Name [= "uri"]` declares a namespace constant. The
    /// URI defaults to the declared name.
    fn parse_namespace_definition(&mut self) -> ParseResult<Node> {
        self.next_token();
        let mut node = self.create_node(NodeKind::VarDefinition(VarKind::Const));
        node.doc = self.lexer.take_doc();
        let name = self.parse_identifier()?;
        let mut name_node = self.create_node(NodeKind::Name { attribute: false });
        name_node.qname = Some(QName::new(name));

        let uri = if self.peek_token() == TokenKind::Assign {
            self.next_token();
            if self.token.sub.is_some() {
                return Err(self.parse_error("Compound assignment is not valid in a declaration"));
            }
            self.expect(TokenKind::String)?;
            self.token.text.clone()
        } else {
            self.interner.resolve(name).to_string()
        };

        let mut assign = Node::new(NodeKind::AssignOp);
        assign.loc = name_node.loc.clone();
        assign.append(name_node);
        assign.append(Node::new(NodeKind::Literal(Value::namespace(&uri))));
        node.append(assign);
        self.expect_semicolon()?;
        Ok(node)
    }

    /// `module [a.b.c] { directives }`. The module's namespace is opened
    /// by injecting a `UseNamespace` node at the front of its block.
    pub(crate) fn parse_module_definition(&mut self) -> ParseResult<Node> {
        self.next_token();
        let mut name = String::new();
        if self.peek_token() == TokenKind::Id {
            self.next_token();
            name.push_str(&self.token.text);
            while self.peek_token() == TokenKind::Dot && self.peek_ahead(2) == TokenKind::Id {
                self.next_token();
                self.next_token();
                name.push('.');
                name.push_str(&self.token.text);
            }
        }

        let default_module = name.is_empty();
        let mut node = self.create_node(NodeKind::Module { default_module });
        let interned = if default_module {
            self.interner.intern_static(DEFAULT_MODULE_NAME)
        } else {
            self.interner.intern(&name)
        };
        node.qname = Some(QName::new(interned));

        let mut block = self.parse_block()?;
        let mut use_ns = Node::new(NodeKind::UseNamespace {
            is_default: true,
            literal: true,
        });
        use_ns.qname = Some(QName::new(interned));
        use_ns.loc = node.loc.clone();
        if let Some(directives) = block.left_mut() {
            directives.prepend(use_ns);
        }
        node.append(block);
        Ok(node)
    }

    // ------------------------------------------------------------------
    // Pragmas
    // ------------------------------------------------------------------

    /// `use` directives. Mode and language pragmas take effect
    /// immediately and last to the end of the enclosing block via the
    /// state stack.
    pub(crate) fn parse_use_directive(&mut self) -> ParseResult<Node> {
        self.next_token();
        let mut pragmas = self.create_node(NodeKind::Pragmas);
        loop {
            let pragma = match self.peek_token() {
                TokenKind::Strict => {
                    self.next_token();
                    self.state.mode = Mode::Strict;
                    self.create_node(NodeKind::Pragma(PragmaKind::Mode(Mode::Strict)))
                }
                TokenKind::Standard => {
                    self.next_token();
                    self.state.mode = Mode::Standard;
                    self.create_node(NodeKind::Pragma(PragmaKind::Mode(Mode::Standard)))
                }
                TokenKind::Lang => {
                    self.next_token();
                    let level = self.parse_lang_level()?;
                    self.state.lang = level;
                    self.create_node(NodeKind::Pragma(PragmaKind::Lang(level)))
                }
                TokenKind::Module => {
                    self.next_token();
                    let name = self.parse_identifier()?;
                    let mut node = self.create_node(NodeKind::UseModule);
                    node.qname = Some(QName::new(name));
                    node
                }
                TokenKind::Default => {
                    self.next_token();
                    self.expect(TokenKind::Namespace)?;
                    self.parse_use_namespace(true)?
                }
                TokenKind::Namespace => {
                    self.next_token();
                    self.parse_use_namespace(false)?
                }
                _ => {
                    self.next_token();
                    return Err(self.parse_error(format!(
                        "Unknown pragma \"{}\"",
                        self.token.text
                    )));
                }
            };
            pragmas.append(pragma);
            if !self.accept(TokenKind::Comma) {
                break;
            }
        }
        self.expect_semicolon()?;
        Ok(pragmas)
    }

    fn parse_use_namespace(&mut self, is_default: bool) -> ParseResult<Node> {
        let literal = self.peek_token() == TokenKind::String;
        let space = if literal {
            self.next_token();
            self.interner.intern(&self.token.text)
        } else {
            self.parse_identifier()?
        };
        if is_default {
            self.state.default_namespace = Some(space);
        }
        let mut node = self.create_node(NodeKind::UseNamespace {
            is_default,
            literal,
        });
        node.qname = Some(QName::new(space));
        Ok(node)
    }

    fn parse_lang_level(&mut self) -> ParseResult<LangLevel> {
        let name = self.parse_identifier()?;
        let text = self.interner.resolve(name).to_string();
        match text.as_str() {
            "ecma" => Ok(LangLevel::Ecma),
            "plus" => Ok(LangLevel::Plus),
            "fixed" => Ok(LangLevel::Fixed),
            _ => Err(self.parse_error(format!("Unknown language level \"{}\"", text))),
        }
    }
}

/// Attach a namespace qualifier to the names a definition declares.
fn apply_namespace(node: &mut Node, space: InternedString) {
    if matches!(node.kind, NodeKind::VarDefinition(_)) {
        for child in &mut node.children {
            let is_assign = matches!(child.kind, NodeKind::AssignOp);
            let target = if is_assign { child.left_mut() } else { Some(child) };
            if let Some(name) = target {
                if let Some(qname) = &mut name.qname {
                    qname.space = Some(space);
                }
            }
        }
    } else if let Some(qname) = &mut node.qname {
        qname.space = Some(space);
    }
}
