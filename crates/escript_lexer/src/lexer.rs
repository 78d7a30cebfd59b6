//! The tokenizer.
//!
//! `get_token` classifies identifiers and reserved words through the
//! keyword table, lexes literals and comments, and recognizes operators
//! by maximal munch with single-character lookahead chains. Tokens put
//! back by the parser are replayed before the stream is consulted again.
//!
//! Regular expressions cannot be distinguished from division locally, so
//! the parser calls `get_regexp_token` to re-lex from a `/` when its
//! context expects a regex literal.

use crate::stream::Stream;
use crate::token::Token;
use escript_ast::{TokenGroups, TokenKind};
use escript_diagnostics::{Diagnostic, DiagnosticCollection};
use log::trace;
use rustc_hash::FxHashMap;
use std::sync::Arc;

struct Keyword {
    kind: TokenKind,
    sub: Option<TokenKind>,
    groups: TokenGroups,
}

/// Reserved and contextually reserved words. `true`, `false`, `null`,
/// and `undefined` lex as keywords here and become literals in the
/// parser.
#[rustfmt::skip]
const KEYWORDS: &[(&str, TokenKind, Option<TokenKind>, TokenGroups)] = &[
    ("abstract",     TokenKind::Abstract,          None,                          TokenGroups::RESERVED),
    ("break",        TokenKind::Break,             None,                          TokenGroups::RESERVED),
    ("callee",       TokenKind::Callee,            None,                          TokenGroups::CONREV),
    ("case",         TokenKind::Case,              None,                          TokenGroups::RESERVED),
    ("cast",         TokenKind::Cast,              None,                          TokenGroups::CONREV),
    ("catch",        TokenKind::Catch,             None,                          TokenGroups::RESERVED),
    ("class",        TokenKind::Class,             None,                          TokenGroups::RESERVED),
    ("const",        TokenKind::Const,             None,                          TokenGroups::CONREV),
    ("continue",     TokenKind::Continue,          None,                          TokenGroups::RESERVED),
    ("default",      TokenKind::Default,           None,                          TokenGroups::RESERVED),
    ("delete",       TokenKind::Delete,            None,                          TokenGroups::RESERVED),
    ("do",           TokenKind::Do,                None,                          TokenGroups::RESERVED),
    ("dynamic",      TokenKind::Attribute,         Some(TokenKind::Dynamic),      TokenGroups::CONREV),
    ("each",         TokenKind::Each,              None,                          TokenGroups::CONREV),
    ("else",         TokenKind::Else,              None,                          TokenGroups::RESERVED),
    ("enum",         TokenKind::Enum,              None,                          TokenGroups::RESERVED),
    ("enumerable",   TokenKind::Attribute,         Some(TokenKind::Enumerable),   TokenGroups::RESERVED),
    ("extends",      TokenKind::Extends,           None,                          TokenGroups::RESERVED),
    ("false",        TokenKind::False,             None,                          TokenGroups::RESERVED),
    ("final",        TokenKind::Attribute,         Some(TokenKind::Final),        TokenGroups::CONREV),
    ("finally",      TokenKind::Finally,           None,                          TokenGroups::RESERVED),
    ("for",          TokenKind::For,               None,                          TokenGroups::RESERVED),
    ("function",     TokenKind::Function,          None,                          TokenGroups::RESERVED),
    ("generator",    TokenKind::Generator,         None,                          TokenGroups::CONREV),
    ("get",          TokenKind::Get,               None,                          TokenGroups::CONREV),
    ("goto",         TokenKind::Goto,              None,                          TokenGroups::CONREV),
    ("has",          TokenKind::Has,               None,                          TokenGroups::CONREV),
    ("if",           TokenKind::If,                None,                          TokenGroups::RESERVED),
    ("implements",   TokenKind::Implements,        None,                          TokenGroups::CONREV),
    ("in",           TokenKind::In,                None,                          TokenGroups::RESERVED),
    ("include",      TokenKind::Include,           None,                          TokenGroups::CONREV),
    ("instanceof",   TokenKind::Instanceof,        None,                          TokenGroups::RESERVED),
    ("interface",    TokenKind::Interface,         None,                          TokenGroups::CONREV),
    ("internal",     TokenKind::ReservedNamespace, Some(TokenKind::Internal),     TokenGroups::CONREV),
    ("intrinsic",    TokenKind::ReservedNamespace, Some(TokenKind::Intrinsic),    TokenGroups::CONREV),
    ("is",           TokenKind::Is,                None,                          TokenGroups::CONREV),
    ("lang",         TokenKind::Lang,              None,                          TokenGroups::CONREV),
    ("let",          TokenKind::Let,               None,                          TokenGroups::CONREV),
    ("like",         TokenKind::Like,              None,                          TokenGroups::CONREV),
    ("module",       TokenKind::Module,            None,                          TokenGroups::RESERVED),
    ("namespace",    TokenKind::Namespace,         None,                          TokenGroups::CONREV),
    ("native",       TokenKind::Attribute,         Some(TokenKind::Native),       TokenGroups::CONREV),
    ("new",          TokenKind::New,               None,                          TokenGroups::RESERVED),
    ("null",         TokenKind::Null,              None,                          TokenGroups::RESERVED),
    ("override",     TokenKind::Attribute,         Some(TokenKind::Override),     TokenGroups::CONREV),
    ("private",      TokenKind::ReservedNamespace, Some(TokenKind::Private),      TokenGroups::CONREV),
    ("protected",    TokenKind::ReservedNamespace, Some(TokenKind::Protected),    TokenGroups::CONREV),
    ("prototype",    TokenKind::Attribute,         Some(TokenKind::Prototype),    TokenGroups::CONREV),
    ("public",       TokenKind::ReservedNamespace, Some(TokenKind::Public),       TokenGroups::CONREV),
    ("readonly",     TokenKind::Attribute,         Some(TokenKind::Readonly),     TokenGroups::RESERVED),
    ("return",       TokenKind::Return,            None,                          TokenGroups::RESERVED),
    ("set",          TokenKind::Set,               None,                          TokenGroups::CONREV),
    ("standard",     TokenKind::Standard,          None,                          TokenGroups::CONREV),
    ("static",       TokenKind::Attribute,         Some(TokenKind::Static),       TokenGroups::CONREV),
    ("strict",       TokenKind::Strict,            None,                          TokenGroups::CONREV),
    ("super",        TokenKind::Super,             None,                          TokenGroups::RESERVED),
    ("switch",       TokenKind::Switch,            None,                          TokenGroups::RESERVED),
    ("synchronized", TokenKind::Attribute,         Some(TokenKind::Synchronized), TokenGroups::RESERVED),
    ("this",         TokenKind::This,              None,                          TokenGroups::RESERVED),
    ("throw",        TokenKind::Throw,             None,                          TokenGroups::RESERVED),
    ("to",           TokenKind::To,                None,                          TokenGroups::CONREV),
    ("true",         TokenKind::True,              None,                          TokenGroups::RESERVED),
    ("try",          TokenKind::Try,               None,                          TokenGroups::RESERVED),
    ("type",         TokenKind::Type,              None,                          TokenGroups::CONREV),
    ("typeof",       TokenKind::Typeof,            None,                          TokenGroups::RESERVED),
    ("undefined",    TokenKind::Undefined,         None,                          TokenGroups::CONREV),
    ("use",          TokenKind::Use,               None,                          TokenGroups::CONREV),
    ("var",          TokenKind::Var,               None,                          TokenGroups::RESERVED),
    ("void",         TokenKind::Void,              None,                          TokenGroups::RESERVED),
    ("volatile",     TokenKind::Volatile,          None,                          TokenGroups::CONREV),
    ("while",        TokenKind::While,             None,                          TokenGroups::RESERVED),
    ("with",         TokenKind::With,              None,                          TokenGroups::RESERVED),
    ("yield",        TokenKind::Yield,             None,                          TokenGroups::CONREV),
];

pub struct Lexer {
    keywords: FxHashMap<&'static str, Keyword>,
    stream: Stream,
    /// The current token. At most one token is current at a time.
    token: Option<Token>,
    /// Most recently put back token last.
    put_back: Vec<Token>,
    free_tokens: Vec<Token>,
    /// Queued lexical diagnostics, drained by the parser.
    pub diagnostics: DiagnosticCollection,
    /// Last captured doc comment, waiting for its declaration.
    doc: Option<String>,
    doc_enabled: bool,
    warn_level: i32,
}

impl Lexer {
    pub fn new(stream: Stream) -> Self {
        let mut keywords = FxHashMap::default();
        for &(name, kind, sub, groups) in KEYWORDS {
            keywords.insert(name, Keyword { kind, sub, groups });
        }
        Self {
            keywords,
            stream,
            token: None,
            put_back: Vec::new(),
            free_tokens: Vec::new(),
            diagnostics: DiagnosticCollection::new(),
            doc: None,
            doc_enabled: false,
            warn_level: 0,
        }
    }

    pub fn set_doc_enabled(&mut self, enabled: bool) {
        self.doc_enabled = enabled;
    }

    pub fn set_warn_level(&mut self, level: i32) {
        self.warn_level = level;
    }

    pub fn stream(&self) -> &Stream {
        &self.stream
    }

    pub fn stream_mut(&mut self) -> &mut Stream {
        &mut self.stream
    }

    pub fn token(&self) -> Option<&Token> {
        self.token.as_ref()
    }

    /// Take the captured doc comment, clearing it.
    pub fn take_doc(&mut self) -> Option<String> {
        self.doc.take()
    }

    pub fn has_put_back(&self) -> bool {
        !self.put_back.is_empty()
    }

    pub fn put_back_head(&self) -> Option<&Token> {
        self.put_back.last()
    }

    /// Get the next token, preferring the putback list over the stream.
    pub fn get_token(&mut self) -> TokenKind {
        if let Some(tok) = self.put_back.pop() {
            if let Some(old) = self.token.replace(tok) {
                self.free_tokens.push(old);
            }
            return self.token.as_ref().map(|t| t.kind).unwrap_or(TokenKind::Err);
        }
        self.lex()
    }

    /// Return the current token to the putback list.
    pub fn put_token(&mut self) {
        if let Some(tok) = self.token.take() {
            self.put_back.push(tok);
        }
    }

    /// Put a specific token back. The current token is unaffected.
    pub fn put_specific_token(&mut self, token: Token) {
        self.put_back.push(token);
    }

    /// Detach the current token, transferring ownership to the caller.
    pub fn take_token(&mut self) -> Option<Token> {
        self.token.take()
    }

    pub fn free_token(&mut self, token: Token) {
        self.free_tokens.push(token);
    }

    /// Eat buffered end markers and clear the console end-of-line state.
    /// The driver calls this between interactive chunks.
    pub fn reset_input(&mut self) {
        while matches!(
            self.put_back.last().map(|t| t.kind),
            Some(TokenKind::Eof) | Some(TokenKind::Nop)
        ) {
            self.get_token();
        }
        self.stream.clear_eol();
    }

    fn fresh_token(&mut self) -> Token {
        let mut tok = self.free_tokens.pop().unwrap_or_default();
        tok.reset();
        tok
    }

    /// Record provenance when the token's first character arrives.
    fn push_char(&mut self, tok: &mut Token, c: char) {
        if tok.current_line.is_none() && tok.text.is_empty() {
            self.set_origin(tok, 1);
        }
        tok.text.push(c);
    }

    fn push_str(&mut self, tok: &mut Token, s: &str) {
        for c in s.chars() {
            self.push_char(tok, c);
        }
    }

    /// `consumed` is how many characters of the token the stream has
    /// already advanced past.
    fn set_origin(&self, tok: &mut Token, consumed: usize) {
        tok.line_number = self.stream.line_number();
        tok.column = self.stream.column().saturating_sub(consumed);
        tok.filename = Some(self.stream.name().clone());
        tok.current_line = self.stream.current_line().map(Arc::from);
    }

    fn finish(&mut self, mut tok: Token, kind: TokenKind, sub: Option<TokenKind>, groups: TokenGroups) -> TokenKind {
        if tok.current_line.is_none() && tok.text.is_empty() {
            self.set_origin(&mut tok, 0);
        }
        tok.kind = kind;
        tok.sub = sub;
        tok.groups = groups;
        trace!("lex line {} {:?} \"{}\"", tok.line_number, tok.kind, tok.text);
        if let Some(old) = self.token.replace(tok) {
            self.free_tokens.push(old);
        }
        kind
    }

    fn make(&mut self, mut tok: Token, text: &str, kind: TokenKind, groups: TokenGroups) -> TokenKind {
        self.push_str(&mut tok, text);
        self.finish(tok, kind, None, groups)
    }

    fn make_sub(&mut self, mut tok: Token, text: &str, sub: TokenKind) -> TokenKind {
        self.push_str(&mut tok, text);
        self.finish(
            tok,
            TokenKind::Assign,
            Some(sub),
            TokenGroups::OPERATOR | TokenGroups::COMPOUND_ASSIGN,
        )
    }

    fn end_marker(&mut self, tok: Token) -> TokenKind {
        if self.stream.at_eol() {
            self.finish(tok, TokenKind::Nop, None, TokenGroups::NONE)
        } else {
            self.finish(tok, TokenKind::Eof, None, TokenGroups::NONE)
        }
    }

    fn error_at_stream(&mut self, severity_error: bool, message: String) {
        let filename = self.stream.name().to_string();
        let line = self.stream.line_number();
        let column = self.stream.column();
        let current = self.stream.current_line();
        let d = if severity_error {
            Diagnostic::error(message)
        } else {
            Diagnostic::warning(message)
        };
        self.diagnostics
            .add(d.at(Some(&filename), line, column, current.as_deref()));
    }

    fn lex(&mut self) -> TokenKind {
        let mut tok = self.fresh_token();

        loop {
            let c = self.stream.next_char();
            match c {
                '\0' => return self.end_marker(tok),

                ' ' | '\t' | '\r' | '\n' => continue,

                '"' | '\'' => return self.quoted(tok, c),

                '#' => return self.make(tok, "#", TokenKind::Hash, TokenGroups::NONE),
                '[' => return self.make(tok, "[", TokenKind::Lbracket, TokenGroups::OPERATOR),
                ']' => return self.make(tok, "]", TokenKind::Rbracket, TokenGroups::NONE),
                '(' => return self.make(tok, "(", TokenKind::Lparen, TokenGroups::OPERATOR),
                ')' => return self.make(tok, ")", TokenKind::Rparen, TokenGroups::NONE),
                '{' => return self.make(tok, "{", TokenKind::Lbrace, TokenGroups::NONE),
                '}' => return self.make(tok, "}", TokenKind::Rbrace, TokenGroups::NONE),
                '@' => return self.make(tok, "@", TokenKind::At, TokenGroups::NONE),
                ';' => return self.make(tok, ";", TokenKind::Semicolon, TokenGroups::NONE),
                ',' => return self.make(tok, ",", TokenKind::Comma, TokenGroups::NONE),
                '?' => return self.make(tok, "?", TokenKind::Query, TokenGroups::NONE),
                '~' => return self.make(tok, "~", TokenKind::Tilde, TokenGroups::OPERATOR),

                '+' => {
                    let c2 = self.stream.next_char();
                    match c2 {
                        '+' => return self.make(tok, "++", TokenKind::PlusPlus, TokenGroups::OPERATOR),
                        '=' => return self.make_sub(tok, "+=", TokenKind::PlusAssign),
                        _ => {
                            self.stream.put_back_char(c2);
                            return self.make(tok, "+", TokenKind::Plus, TokenGroups::OPERATOR);
                        }
                    }
                }

                '-' => {
                    let c2 = self.stream.next_char();
                    match c2 {
                        '-' => return self.make(tok, "--", TokenKind::MinusMinus, TokenGroups::OPERATOR),
                        '=' => return self.make_sub(tok, "-=", TokenKind::MinusAssign),
                        _ => {
                            // A digit still lexes as minus then number.
                            self.stream.put_back_char(c2);
                            return self.make(tok, "-", TokenKind::Minus, TokenGroups::OPERATOR);
                        }
                    }
                }

                '*' => {
                    let c2 = self.stream.next_char();
                    if c2 == '=' {
                        return self.make_sub(tok, "*=", TokenKind::MulAssign);
                    }
                    self.stream.put_back_char(c2);
                    return self.make(tok, "*", TokenKind::Mul, TokenGroups::OPERATOR);
                }

                '/' => {
                    let c2 = self.stream.next_char();
                    match c2 {
                        '=' => return self.make_sub(tok, "/=", TokenKind::DivAssign),
                        '>' => return self.make(tok, "/>", TokenKind::SlashGt, TokenGroups::OPERATOR),
                        '*' | '/' => {
                            if let Some(kind) = self.comment(&mut tok, c2) {
                                return self.finish(tok, kind, None, TokenGroups::NONE);
                            }
                            if c2 == '*' && self.doc_enabled && tok.text.starts_with('*') {
                                self.doc = Some(tok.text.clone());
                            }
                            tok.reset();
                            continue;
                        }
                        _ => {
                            self.stream.put_back_char(c2);
                            return self.make(tok, "/", TokenKind::Div, TokenGroups::OPERATOR);
                        }
                    }
                }

                '%' => {
                    let c2 = self.stream.next_char();
                    if c2 == '=' {
                        return self.make_sub(tok, "%=", TokenKind::ModAssign);
                    }
                    self.stream.put_back_char(c2);
                    return self.make(tok, "%", TokenKind::Mod, TokenGroups::OPERATOR);
                }

                '.' => {
                    let c2 = self.stream.next_char();
                    match c2 {
                        '.' => {
                            let c3 = self.stream.next_char();
                            if c3 == '.' {
                                return self.make(tok, "...", TokenKind::Ellipsis, TokenGroups::NONE);
                            }
                            self.stream.put_back_char(c3);
                            return self.make(tok, "..", TokenKind::DotDot, TokenGroups::NONE);
                        }
                        '<' => return self.make(tok, ".<", TokenKind::DotLess, TokenGroups::NONE),
                        _ if c2.is_ascii_digit() => {
                            self.stream.put_back_char(c2);
                            return self.number(tok, '.');
                        }
                        _ => {
                            self.stream.put_back_char(c2);
                            return self.make(tok, ".", TokenKind::Dot, TokenGroups::OPERATOR);
                        }
                    }
                }

                ':' => {
                    let c2 = self.stream.next_char();
                    if c2 == ':' {
                        return self.make(tok, "::", TokenKind::ColonColon, TokenGroups::NONE);
                    }
                    self.stream.put_back_char(c2);
                    return self.make(tok, ":", TokenKind::Colon, TokenGroups::NONE);
                }

                '!' => {
                    let c2 = self.stream.next_char();
                    if c2 == '=' {
                        let c3 = self.stream.next_char();
                        if c3 == '=' {
                            return self.make(tok, "!==", TokenKind::StrictNe, TokenGroups::OPERATOR);
                        }
                        self.stream.put_back_char(c3);
                        return self.make(tok, "!=", TokenKind::Ne, TokenGroups::OPERATOR);
                    }
                    self.stream.put_back_char(c2);
                    return self.make(tok, "!", TokenKind::LogicalNot, TokenGroups::OPERATOR);
                }

                '&' => {
                    let c2 = self.stream.next_char();
                    match c2 {
                        '&' => {
                            let c3 = self.stream.next_char();
                            if c3 == '=' {
                                return self.make_sub(tok, "&&=", TokenKind::LogicalAndAssign);
                            }
                            self.stream.put_back_char(c3);
                            return self.make(tok, "&&", TokenKind::LogicalAnd, TokenGroups::OPERATOR);
                        }
                        '=' => return self.make_sub(tok, "&=", TokenKind::BitAndAssign),
                        _ => {
                            self.stream.put_back_char(c2);
                            return self.make(tok, "&", TokenKind::BitAnd, TokenGroups::OPERATOR);
                        }
                    }
                }

                '<' => {
                    let c2 = self.stream.next_char();
                    match c2 {
                        '=' => return self.make(tok, "<=", TokenKind::Le, TokenGroups::OPERATOR),
                        '<' => {
                            let c3 = self.stream.next_char();
                            if c3 == '=' {
                                return self.make_sub(tok, "<<=", TokenKind::LshAssign);
                            }
                            self.stream.put_back_char(c3);
                            return self.make(tok, "<<", TokenKind::Lsh, TokenGroups::OPERATOR);
                        }
                        '/' => return self.make(tok, "</", TokenKind::LtSlash, TokenGroups::NONE),
                        _ => {
                            self.stream.put_back_char(c2);
                            return self.make(tok, "<", TokenKind::Lt, TokenGroups::OPERATOR);
                        }
                    }
                }

                '=' => {
                    let c2 = self.stream.next_char();
                    if c2 == '=' {
                        let c3 = self.stream.next_char();
                        if c3 == '=' {
                            return self.make(tok, "===", TokenKind::StrictEq, TokenGroups::OPERATOR);
                        }
                        self.stream.put_back_char(c3);
                        return self.make(tok, "==", TokenKind::Eq, TokenGroups::OPERATOR);
                    }
                    self.stream.put_back_char(c2);
                    return self.make(tok, "=", TokenKind::Assign, TokenGroups::OPERATOR);
                }

                '>' => {
                    let c2 = self.stream.next_char();
                    match c2 {
                        '=' => return self.make(tok, ">=", TokenKind::Ge, TokenGroups::OPERATOR),
                        '>' => {
                            let c3 = self.stream.next_char();
                            match c3 {
                                '=' => return self.make_sub(tok, ">>=", TokenKind::RshAssign),
                                '>' => {
                                    let c4 = self.stream.next_char();
                                    if c4 == '=' {
                                        return self.make_sub(tok, ">>>=", TokenKind::RshZeroAssign);
                                    }
                                    self.stream.put_back_char(c4);
                                    return self.make(tok, ">>>", TokenKind::RshZero, TokenGroups::OPERATOR);
                                }
                                _ => {
                                    self.stream.put_back_char(c3);
                                    return self.make(tok, ">>", TokenKind::Rsh, TokenGroups::OPERATOR);
                                }
                            }
                        }
                        _ => {
                            self.stream.put_back_char(c2);
                            return self.make(tok, ">", TokenKind::Gt, TokenGroups::OPERATOR);
                        }
                    }
                }

                '^' => {
                    let c2 = self.stream.next_char();
                    match c2 {
                        '^' => {
                            let c3 = self.stream.next_char();
                            if c3 == '=' {
                                return self.make_sub(tok, "^^=", TokenKind::LogicalXorAssign);
                            }
                            self.stream.put_back_char(c3);
                            return self.make(tok, "^^", TokenKind::LogicalXor, TokenGroups::OPERATOR);
                        }
                        '=' => return self.make_sub(tok, "^=", TokenKind::BitXorAssign),
                        _ => {
                            self.stream.put_back_char(c2);
                            return self.make(tok, "^", TokenKind::BitXor, TokenGroups::OPERATOR);
                        }
                    }
                }

                '|' => {
                    let c2 = self.stream.next_char();
                    match c2 {
                        '|' => {
                            let c3 = self.stream.next_char();
                            if c3 == '=' {
                                return self.make_sub(tok, "||=", TokenKind::LogicalOrAssign);
                            }
                            self.stream.put_back_char(c3);
                            return self.make(tok, "||", TokenKind::LogicalOr, TokenGroups::OPERATOR);
                        }
                        '=' => return self.make_sub(tok, "|=", TokenKind::BitOrAssign),
                        _ => {
                            self.stream.put_back_char(c2);
                            return self.make(tok, "|", TokenKind::BitOr, TokenGroups::OPERATOR);
                        }
                    }
                }

                '\\' => {
                    let c2 = self.stream.next_char();
                    if c2 == '\n' {
                        // Line continuation.
                        continue;
                    }
                    self.stream.put_back_char(c2);
                    if c2 == 'u' {
                        return self.alpha(tok, '\\');
                    }
                    self.error_at_stream(true, "Illegal character \"\\\"".to_string());
                    return self.finish(tok, TokenKind::Err, None, TokenGroups::NONE);
                }

                _ if c.is_ascii_digit() => return self.number(tok, c),

                _ if c.is_alphabetic() || c == '_' || c == '$' => return self.alpha(tok, c),

                _ => {
                    self.error_at_stream(true, format!("Illegal character \"{}\"", c));
                    return self.finish(tok, TokenKind::Err, None, TokenGroups::NONE);
                }
            }
        }
    }

    /// Re-lex a regular expression literal. The parser has already seen
    /// the leading `/` and put nothing back; scanning restarts from the
    /// character after it.
    pub fn get_regexp_token(&mut self) -> TokenKind {
        let mut tok = self.fresh_token();
        self.push_char(&mut tok, '/');

        loop {
            let c = self.stream.next_char();
            match c {
                '\0' => return self.end_marker(tok),

                '/' => {
                    self.push_char(&mut tok, '/');
                    loop {
                        let f = self.stream.next_char();
                        if !matches!(f, 'g' | 'i' | 'm' | 'y') {
                            self.stream.put_back_char(f);
                            break;
                        }
                        self.push_char(&mut tok, f);
                    }
                    return self.finish(tok, TokenKind::Regexp, None, TokenGroups::NONE);
                }

                '\\' => {
                    let c2 = self.stream.next_char();
                    if matches!(c2, '\r' | '\n' | '\0') {
                        self.error_at_stream(false, "Illegal newline in regular expression".to_string());
                        return self.finish(tok, TokenKind::Err, None, TokenGroups::NONE);
                    }
                    self.push_char(&mut tok, '\\');
                    self.push_char(&mut tok, c2);
                }

                '\r' | '\n' => {
                    self.error_at_stream(false, "Illegal newline in regular expression".to_string());
                    return self.finish(tok, TokenKind::Err, None, TokenGroups::NONE);
                }

                _ => self.push_char(&mut tok, c),
            }
        }
    }

    fn number(&mut self, mut tok: Token, first: char) -> TokenKind {
        let mut c = first;
        if c == '0' {
            self.push_char(&mut tok, c);
            c = self.stream.next_char();
            if c == 'x' || c == 'X' {
                self.push_char(&mut tok, c);
                loop {
                    c = self.stream.next_char();
                    if !c.is_ascii_hexdigit() {
                        break;
                    }
                    self.push_char(&mut tok, c);
                }
                self.stream.put_back_char(c);
                return self.finish(tok, TokenKind::Number, None, TokenGroups::NONE);
            }
        }
        while c.is_ascii_digit() || matches!(c.to_ascii_lowercase(), '.' | 'e' | 'f') {
            self.push_char(&mut tok, c);
            c = self.stream.next_char();
        }
        self.stream.put_back_char(c);
        self.finish(tok, TokenKind::Number, None, TokenGroups::NONE)
    }

    fn alpha(&mut self, mut tok: Token, first: char) -> TokenKind {
        let mut c = first;
        while c.is_alphanumeric() || c == '_' || c == '$' || c == '\\' {
            if c == '\\' {
                c = self.stream.next_char();
                if c == '\n' || c == '\r' {
                    break;
                }
                if c == 'u' {
                    c = self.decode_number(16, 4);
                }
            }
            self.push_char(&mut tok, c);
            c = self.stream.next_char();
        }
        if c != '\0' {
            self.stream.put_back_char(c);
        }
        match self.keywords.get(tok.text.as_str()) {
            Some(kw) => {
                let (kind, sub, groups) = (kw.kind, kw.sub, kw.groups);
                self.finish(tok, kind, sub, groups)
            }
            None => self.finish(tok, TokenKind::Id, None, TokenGroups::NONE),
        }
    }

    fn quoted(&mut self, mut tok: Token, quote: char) -> TokenKind {
        // Ensure provenance points at the opening quote even for "".
        self.set_origin(&mut tok, 1);
        loop {
            let mut c = self.stream.next_char();
            if c == '\0' {
                self.error_at_stream(true, "Unterminated string literal".to_string());
                return self.finish(tok, TokenKind::Err, None, TokenGroups::NONE);
            }
            if c == quote {
                break;
            }
            if c == '\\' {
                c = self.stream.next_char();
                match c {
                    'b' => c = '\u{0008}',
                    'f' => c = '\u{000C}',
                    'n' => c = '\n',
                    'r' => c = '\r',
                    't' => c = '\t',
                    'u' | 'x' => c = self.decode_number(16, 4),
                    '0' => c = self.decode_number(8, 3),
                    _ => {}
                }
            }
            tok.text.push(c);
        }
        self.finish(tok, TokenKind::String, None, TokenGroups::NONE)
    }

    /// Decode up to `length` digits in `radix` into one character.
    fn decode_number(&mut self, radix: u32, length: usize) -> char {
        let mut digits = String::new();
        let mut last = '\0';
        for _ in 0..length {
            let c = self.stream.next_char();
            if c == '\0' {
                break;
            }
            if !c.is_digit(radix) {
                last = c;
                break;
            }
            digits.push(c);
        }
        if last != '\0' {
            self.stream.put_back_char(last);
        }
        u32::from_str_radix(&digits, radix)
            .ok()
            .and_then(char::from_u32)
            .unwrap_or('\u{FFFD}')
    }

    /// Skip a `//` or `/* */` comment, accumulating its interior text in
    /// `tok` for doc capture. Returns a token kind only on an
    /// unterminated block comment.
    fn comment(&mut self, tok: &mut Token, form: char) -> Option<TokenKind> {
        let start_line = self.stream.line_number();
        loop {
            let c = self.stream.next_char();
            if c == '\0' {
                if form == '/' {
                    return None;
                }
                self.error_at_stream(
                    true,
                    format!("Unterminated comment starting on line {}", start_line),
                );
                return Some(TokenKind::Err);
            }
            if form == '/' {
                if c == '\n' {
                    return None;
                }
                self.push_char(tok, c);
            } else {
                match c {
                    '*' => {
                        let c2 = self.stream.next_char();
                        if c2 == '/' {
                            return None;
                        }
                        self.push_char(tok, '*');
                        self.stream.put_back_char(c2);
                    }
                    '/' => {
                        let c2 = self.stream.next_char();
                        if c2 == '*' && self.warn_level > 0 {
                            self.error_at_stream(false, "Possible nested comment".to_string());
                        }
                        self.push_char(tok, '/');
                        self.stream.put_back_char(c2);
                    }
                    _ => self.push_char(tok, c),
                }
            }
        }
    }
}
