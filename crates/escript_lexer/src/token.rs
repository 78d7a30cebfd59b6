//! One lexical token with classification and source provenance.

use escript_ast::{TokenGroups, TokenKind};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    /// Sub-kind refining the primary kind: the concrete compound
    /// assignment operator, attribute word, or reserved namespace.
    pub sub: Option<TokenKind>,
    pub groups: TokenGroups,
    /// Lexeme text with escapes resolved.
    pub text: String,
    pub filename: Option<Arc<str>>,
    /// 1-based line the token started on.
    pub line_number: u32,
    /// 0-based column of the token's first character.
    pub column: usize,
    /// Snapshot of the source line, for caret diagnostics.
    pub current_line: Option<Arc<str>>,
}

impl Default for Token {
    fn default() -> Self {
        Self {
            kind: TokenKind::Eof,
            sub: None,
            groups: TokenGroups::NONE,
            text: String::new(),
            filename: None,
            line_number: 1,
            column: 0,
            current_line: None,
        }
    }
}

impl Token {
    /// Reset for reuse from the free list, keeping the text allocation.
    pub fn reset(&mut self) {
        self.kind = TokenKind::Eof;
        self.sub = None;
        self.groups = TokenGroups::NONE;
        self.text.clear();
        self.current_line = None;
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }

    pub fn in_group(&self, group: TokenGroups) -> bool {
        self.groups.contains(group)
    }
}
