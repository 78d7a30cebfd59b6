//! Token kinds produced by the lexer.
//!
//! Compound assignment operators and declaration attributes are carried
//! as sub-kinds of a primary token. `x += y` lexes as `Assign` with sub
//! `PlusAssign`; `private` lexes as `ReservedNamespace` with sub
//! `Private`. The primary kind drives parser dispatch while the sub-kind
//! selects the concrete operator or namespace.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Punctuation
    Assign,
    At,
    Colon,
    ColonColon,
    Comma,
    Dot,
    DotDot,
    DotLess,
    Ellipsis,
    Hash,
    Lbrace,
    Lbracket,
    Lparen,
    Query,
    Rbrace,
    Rbracket,
    Rparen,
    Semicolon,
    LtSlash,
    SlashGt,

    // Operators
    BitAnd,
    BitOr,
    BitXor,
    Div,
    Eq,
    Ge,
    Gt,
    Le,
    LogicalAnd,
    LogicalNot,
    LogicalOr,
    LogicalXor,
    Lsh,
    Lt,
    Minus,
    MinusMinus,
    Mod,
    Mul,
    Ne,
    Plus,
    PlusPlus,
    Rsh,
    RshZero,
    StrictEq,
    StrictNe,
    Tilde,

    // Compound assignment sub-kinds (primary kind is always `Assign`)
    PlusAssign,
    MinusAssign,
    MulAssign,
    DivAssign,
    ModAssign,
    BitAndAssign,
    BitOrAssign,
    BitXorAssign,
    LshAssign,
    RshAssign,
    RshZeroAssign,
    LogicalAndAssign,
    LogicalOrAssign,
    LogicalXorAssign,

    // Reserved words
    Abstract,
    Break,
    Case,
    Catch,
    Class,
    Continue,
    Default,
    Delete,
    Do,
    Else,
    Enum,
    Extends,
    False,
    Finally,
    For,
    Function,
    If,
    In,
    Instanceof,
    Module,
    New,
    Null,
    Return,
    Super,
    Switch,
    This,
    Throw,
    True,
    Try,
    Typeof,
    Var,
    Void,
    While,
    With,

    // Contextually reserved words
    Attribute,
    Callee,
    Cast,
    Const,
    Each,
    Generator,
    Get,
    Goto,
    Has,
    Implements,
    Include,
    Interface,
    Is,
    Lang,
    Let,
    Like,
    Namespace,
    ReservedNamespace,
    Set,
    Standard,
    Strict,
    To,
    Type,
    Undefined,
    Use,
    Volatile,
    Yield,

    // Attribute sub-kinds (primary kind is `Attribute`)
    Dynamic,
    Final,
    Native,
    Override,
    Prototype,
    Static,
    Enumerable,
    Readonly,
    Synchronized,

    // Reserved namespace sub-kinds (primary kind is `ReservedNamespace`)
    Internal,
    Intrinsic,
    Private,
    Protected,
    Public,

    // Literals and specials
    Id,
    Number,
    String,
    Regexp,
    /// Soft end of line from an interactive console stream.
    Nop,
    Eof,
    Err,
}

impl TokenKind {
    /// The base operator for a compound assignment sub-kind.
    ///
    /// This mapping is deliberately an explicit table. The parser uses it
    /// to rewrite `lhs OP= rhs` into `lhs = lhs OP rhs` and asserts the
    /// table is total over every compound sub-kind the lexer can emit.
    pub fn compound_base(self) -> Option<TokenKind> {
        use TokenKind::*;
        match self {
            PlusAssign => Some(Plus),
            MinusAssign => Some(Minus),
            MulAssign => Some(Mul),
            DivAssign => Some(Div),
            ModAssign => Some(Mod),
            BitAndAssign => Some(BitAnd),
            BitOrAssign => Some(BitOr),
            BitXorAssign => Some(BitXor),
            LshAssign => Some(Lsh),
            RshAssign => Some(Rsh),
            RshZeroAssign => Some(RshZero),
            LogicalAndAssign => Some(LogicalAnd),
            LogicalOrAssign => Some(LogicalOr),
            LogicalXorAssign => Some(LogicalXor),
            _ => None,
        }
    }

    /// Every compound assignment sub-kind the lexer can emit.
    pub const COMPOUND_ASSIGN_SUBS: [TokenKind; 14] = [
        TokenKind::PlusAssign,
        TokenKind::MinusAssign,
        TokenKind::MulAssign,
        TokenKind::DivAssign,
        TokenKind::ModAssign,
        TokenKind::BitAndAssign,
        TokenKind::BitOrAssign,
        TokenKind::BitXorAssign,
        TokenKind::LshAssign,
        TokenKind::RshAssign,
        TokenKind::RshZeroAssign,
        TokenKind::LogicalAndAssign,
        TokenKind::LogicalOrAssign,
        TokenKind::LogicalXorAssign,
    ];

    /// Canonical lexeme used in "Expecting" style diagnostics.
    pub fn as_str(self) -> &'static str {
        use TokenKind::*;
        match self {
            Assign => "=",
            At => "@",
            Colon => ":",
            ColonColon => "::",
            Comma => ",",
            Dot => ".",
            DotDot => "..",
            DotLess => ".<",
            Ellipsis => "...",
            Hash => "#",
            Lbrace => "{",
            Lbracket => "[",
            Lparen => "(",
            Query => "?",
            Rbrace => "}",
            Rbracket => "]",
            Rparen => ")",
            Semicolon => ";",
            LtSlash => "</",
            SlashGt => "/>",
            BitAnd => "&",
            BitOr => "|",
            BitXor => "^",
            Div => "/",
            Eq => "==",
            Ge => ">=",
            Gt => ">",
            Le => "<=",
            LogicalAnd => "&&",
            LogicalNot => "!",
            LogicalOr => "||",
            LogicalXor => "^^",
            Lsh => "<<",
            Lt => "<",
            Minus => "-",
            MinusMinus => "--",
            Mod => "%",
            Mul => "*",
            Ne => "!=",
            Plus => "+",
            PlusPlus => "++",
            Rsh => ">>",
            RshZero => ">>>",
            StrictEq => "===",
            StrictNe => "!==",
            Tilde => "~",
            PlusAssign => "+=",
            MinusAssign => "-=",
            MulAssign => "*=",
            DivAssign => "/=",
            ModAssign => "%=",
            BitAndAssign => "&=",
            BitOrAssign => "|=",
            BitXorAssign => "^=",
            LshAssign => "<<=",
            RshAssign => ">>=",
            RshZeroAssign => ">>>=",
            LogicalAndAssign => "&&=",
            LogicalOrAssign => "||=",
            LogicalXorAssign => "^^=",
            Abstract => "abstract",
            Break => "break",
            Case => "case",
            Catch => "catch",
            Class => "class",
            Continue => "continue",
            Default => "default",
            Delete => "delete",
            Do => "do",
            Else => "else",
            Enum => "enum",
            Extends => "extends",
            False => "false",
            Finally => "finally",
            For => "for",
            Function => "function",
            If => "if",
            In => "in",
            Instanceof => "instanceof",
            Module => "module",
            New => "new",
            Null => "null",
            Return => "return",
            Super => "super",
            Switch => "switch",
            This => "this",
            Throw => "throw",
            True => "true",
            Try => "try",
            Typeof => "typeof",
            Var => "var",
            Void => "void",
            While => "while",
            With => "with",
            Attribute => "attribute",
            Callee => "callee",
            Cast => "cast",
            Const => "const",
            Each => "each",
            Generator => "generator",
            Get => "get",
            Goto => "goto",
            Has => "has",
            Implements => "implements",
            Include => "include",
            Interface => "interface",
            Is => "is",
            Lang => "lang",
            Let => "let",
            Like => "like",
            Namespace => "namespace",
            ReservedNamespace => "namespace-qualifier",
            Set => "set",
            Standard => "standard",
            Strict => "strict",
            To => "to",
            Type => "type",
            Undefined => "undefined",
            Use => "use",
            Volatile => "volatile",
            Yield => "yield",
            Dynamic => "dynamic",
            Final => "final",
            Native => "native",
            Override => "override",
            Prototype => "prototype",
            Static => "static",
            Enumerable => "enumerable",
            Readonly => "readonly",
            Synchronized => "synchronized",
            Internal => "internal",
            Intrinsic => "intrinsic",
            Private => "private",
            Protected => "protected",
            Public => "public",
            Id => "identifier",
            Number => "number",
            String => "string",
            Regexp => "regular expression",
            Nop => "end of line",
            Eof => "end of file",
            Err => "error",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compound_base_table_is_total() {
        for sub in TokenKind::COMPOUND_ASSIGN_SUBS {
            assert!(
                sub.compound_base().is_some(),
                "no base operator mapped for {:?}",
                sub
            );
        }
    }

    #[test]
    fn test_compound_base_is_not_an_assignment() {
        for sub in TokenKind::COMPOUND_ASSIGN_SUBS {
            let base = sub.compound_base().unwrap();
            assert!(base.compound_base().is_none(), "{:?} mapped to {:?}", sub, base);
        }
    }
}
