//! Parser core: token plumbing, bounded lookahead, node construction,
//! error reporting, and directive-level error recovery.

use crate::state::State;
use escript_ast::{Node, NodeKind, QName, SourceLoc, TokenKind};
use escript_core::StringInterner;
use escript_diagnostics::{Diagnostic, Reporter};
use escript_lexer::{Lexer, Token};
use log::debug;

/// Parsing stops once this many errors have been reported.
pub const MAX_ERRORS: usize = 25;

/// Upper bound on token lookahead. The grammar never needs to see
/// further ahead than this, so `peek_ahead` asserts the bound.
pub const MAX_LOOKAHEAD: usize = 4;

/// Name given to the synthesized module wrapping top-level code.
pub const DEFAULT_MODULE_NAME: &str = "default";

/// Marker for a syntax error that has already been reported. Carrying no
/// payload keeps `?` propagation cheap; the diagnostics live in the
/// reporter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyntaxError;

pub(crate) type ParseResult<T = Node> = Result<T, SyntaxError>;

pub struct Parser {
    pub(crate) lexer: Lexer,
    pub(crate) reporter: Reporter,
    pub(crate) interner: StringInterner,
    /// Current lexical state; entered scopes push clones onto `saved`.
    pub(crate) state: State,
    saved: Vec<State>,
    /// Last consumed token.
    pub(crate) token: Token,
    /// An error was reported while parsing the current directive.
    pub(crate) errored: bool,
    /// Error cap reached; parsing unwinds without consuming more input.
    pub(crate) fatal: bool,
    pub(crate) interactive: bool,
    pub(crate) xml_enabled: bool,
    pub(crate) regexp_enabled: bool,
}

impl Parser {
    pub fn new(lexer: Lexer, interner: StringInterner, reporter: Reporter, state: State) -> Self {
        Self {
            lexer,
            reporter,
            interner,
            state,
            saved: Vec::new(),
            token: Token::default(),
            errored: false,
            fatal: false,
            interactive: false,
            xml_enabled: false,
            regexp_enabled: true,
        }
    }

    pub fn set_interactive(&mut self, interactive: bool) {
        self.interactive = interactive;
    }

    pub fn set_xml_enabled(&mut self, enabled: bool) {
        self.xml_enabled = enabled;
    }

    pub fn set_regexp_enabled(&mut self, enabled: bool) {
        self.regexp_enabled = enabled;
    }

    pub fn interner(&self) -> &StringInterner {
        &self.interner
    }

    pub fn reporter(&self) -> &Reporter {
        &self.reporter
    }

    pub fn reporter_mut(&mut self) -> &mut Reporter {
        &mut self.reporter
    }

    pub fn fatal(&self) -> bool {
        self.fatal
    }

    /// Parse one compilation unit into a `Program / Module / Block`
    /// shape. Interactive chunks reuse the same parser; each call parses
    /// until end of input or the console end-of-line marker.
    pub fn parse(&mut self, module_name: Option<&str>) -> Node {
        let mut program = self.create_node(NodeKind::Program);
        let mut module = self.create_node(NodeKind::Module {
            default_module: module_name.is_none(),
        });
        let name = module_name.unwrap_or(DEFAULT_MODULE_NAME);
        module.qname = Some(QName::new(self.interner.intern(name)));
        let mut block = self.create_node(NodeKind::Block);
        block.append(self.parse_directives());
        module.append(block);
        program.append(module);
        debug!(
            "parsed {} with {} errors",
            self.token.filename.as_deref().unwrap_or("stdin"),
            self.reporter.error_count()
        );
        program
    }

    /// Prepare for the next interactive chunk: discard buffered end
    /// markers and clear the console end-of-line latch.
    pub fn reset_input(&mut self) {
        self.lexer.reset_input();
        self.errored = false;
    }

    /// True once the input is exhausted and no tokens remain buffered.
    pub fn at_eof(&self) -> bool {
        !self.lexer.has_put_back() && self.lexer.stream().eof()
    }

    /// True once the underlying stream has hit end of input, even if
    /// buffered end markers remain.
    pub fn stream_exhausted(&self) -> bool {
        self.lexer.stream().eof()
    }

    // ------------------------------------------------------------------
    // Token plumbing
    // ------------------------------------------------------------------

    /// Consume the next token, making it current.
    pub(crate) fn next_token(&mut self) -> TokenKind {
        let kind = self.lexer.get_token();
        self.drain_lexical_errors();
        if let Some(tok) = self.lexer.take_token() {
            self.token = tok;
        }
        kind
    }

    /// Return the current token to the lexer's putback list.
    pub(crate) fn put_token(&mut self) {
        let tok = std::mem::take(&mut self.token);
        self.lexer.put_specific_token(tok);
    }

    /// Kind of the next token without consuming it.
    pub(crate) fn peek_token(&mut self) -> TokenKind {
        if let Some(head) = self.lexer.put_back_head() {
            return head.kind;
        }
        let save = std::mem::take(&mut self.token);
        let kind = self.next_token();
        self.put_token();
        self.token = save;
        kind
    }

    /// Full token `k` ahead without consuming anything. `k == 1` is the
    /// next token. Tokens seen are pushed back in order, so repeated
    /// peeks see the same stream.
    pub(crate) fn peek_ahead_token(&mut self, k: usize) -> Token {
        debug_assert!((1..=MAX_LOOKAHEAD).contains(&k));
        let save = std::mem::take(&mut self.token);
        let mut taken: Vec<Token> = Vec::with_capacity(k);
        for _ in 0..k {
            self.lexer.get_token();
            self.drain_lexical_errors();
            match self.lexer.take_token() {
                Some(tok) => taken.push(tok),
                None => break,
            }
        }
        let result = taken.last().cloned().unwrap_or_default();
        while let Some(tok) = taken.pop() {
            self.lexer.put_specific_token(tok);
        }
        self.token = save;
        result
    }

    pub(crate) fn peek_ahead(&mut self, k: usize) -> TokenKind {
        if k == 1 {
            return self.peek_token();
        }
        self.peek_ahead_token(k).kind
    }

    /// Consume the next token if it has the given kind.
    pub(crate) fn accept(&mut self, kind: TokenKind) -> bool {
        if self.peek_token() == kind {
            self.next_token();
            return true;
        }
        false
    }

    /// Consume the next token, requiring the given kind.
    pub(crate) fn expect(&mut self, kind: TokenKind) -> ParseResult<()> {
        if self.next_token() != kind {
            return Err(self.parse_error(format!("Expecting \"{}\"", kind.as_str())));
        }
        Ok(())
    }

    fn drain_lexical_errors(&mut self) {
        if !self.lexer.diagnostics.is_empty() {
            let pending = self.lexer.diagnostics.drain();
            self.reporter.report_all(pending);
        }
    }

    // ------------------------------------------------------------------
    // Node construction
    // ------------------------------------------------------------------

    /// Build a node stamped with the current token's classification and
    /// source position.
    pub(crate) fn create_node(&mut self, kind: NodeKind) -> Node {
        let mut node = Node::new(kind);
        node.token = Some(self.token.kind);
        node.groups = self.token.groups;
        node.sub = self.token.sub;
        node.loc = SourceLoc {
            filename: self.token.filename.clone(),
            line_number: self.token.line_number,
            column: self.token.column,
            current_line: self.token.current_line.clone(),
        };
        node
    }

    // ------------------------------------------------------------------
    // State stack
    // ------------------------------------------------------------------

    /// Enter a nested lexical context. The current state is saved and a
    /// clone becomes current for the production to mutate.
    pub(crate) fn push_state(&mut self) {
        self.saved.push(self.state.clone());
    }

    pub(crate) fn pop_state(&mut self) {
        if let Some(state) = self.saved.pop() {
            self.state = state;
        }
    }

    // ------------------------------------------------------------------
    // Errors and recovery
    // ------------------------------------------------------------------

    /// Report a syntax error at the current token. Error tokens were
    /// already reported by the lexer and produce no second message.
    pub(crate) fn parse_error(&mut self, message: impl Into<String>) -> SyntaxError {
        self.errored = true;
        if self.token.kind == TokenKind::Err {
            return SyntaxError;
        }
        if self.reporter.error_count() >= MAX_ERRORS {
            self.fatal = true;
            return SyntaxError;
        }
        let diagnostic = Diagnostic::error(message).at(
            self.token.filename.as_deref(),
            self.token.line_number,
            self.token.column,
            self.token.current_line.as_deref(),
        );
        self.reporter.report(diagnostic);
        if self.reporter.error_count() >= MAX_ERRORS {
            self.fatal = true;
        }
        SyntaxError
    }

    pub(crate) fn parse_warning(&mut self, message: impl Into<String>) {
        let diagnostic = Diagnostic::warning(message).at(
            self.token.filename.as_deref(),
            self.token.line_number,
            self.token.column,
            self.token.current_line.as_deref(),
        );
        self.reporter.report(diagnostic);
    }

    /// Resynchronize after a syntax error so sibling directives can still
    /// be parsed. Skips tokens until a directive boundary: a semicolon
    /// (consumed), a closer, end of input, or a token on a later line
    /// than the failed directive, which acts as a virtual semicolon.
    pub(crate) fn reset_error(&mut self, directive_line: u32) {
        if self.fatal {
            return;
        }
        self.errored = false;
        if self.interactive {
            return;
        }
        loop {
            let tok = self.peek_ahead_token(1);
            match tok.kind {
                TokenKind::Semicolon => {
                    self.next_token();
                    return;
                }
                TokenKind::Rbrace
                | TokenKind::Rbracket
                | TokenKind::Rparen
                | TokenKind::Err
                | TokenKind::Eof
                | TokenKind::Nop => return,
                _ => {
                    if tok.line_number > directive_line {
                        return;
                    }
                    self.next_token();
                }
            }
        }
    }
}
