//! Classification flags and small shared enums.

use crate::token_kind::TokenKind;
use std::fmt;

bitflags::bitflags! {
    /// Group classification of a token, set by the keyword table and the
    /// operator lexer.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct TokenGroups: u32 {
        const NONE            = 0;
        /// Fully reserved word.
        const RESERVED        = 1 << 0;
        /// Contextually reserved word, usable as an identifier.
        const CONREV          = 1 << 1;
        /// Compound assignment operator such as `<<=`.
        const COMPOUND_ASSIGN = 1 << 2;
        /// Overloadable operator.
        const OPERATOR        = 1 << 3;
    }
}

bitflags::bitflags! {
    /// Declaration attributes merged from an attribute chain.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Attributes: u32 {
        const NONE         = 0;
        const FINAL        = 1 << 0;
        const OVERRIDE     = 1 << 1;
        const DYNAMIC      = 1 << 2;
        const NATIVE       = 1 << 3;
        const PROTOTYPE    = 1 << 4;
        const STATIC       = 1 << 5;
        const ENUMERABLE   = 1 << 6;
        const READONLY     = 1 << 7;
        const SYNCHRONIZED = 1 << 8;
    }
}

impl Attributes {
    /// Map an attribute sub-token (`dynamic`, `final`, ...) to its bit.
    pub fn from_attribute_token(sub: TokenKind) -> Option<Attributes> {
        match sub {
            TokenKind::Dynamic => Some(Attributes::DYNAMIC),
            TokenKind::Final => Some(Attributes::FINAL),
            TokenKind::Native => Some(Attributes::NATIVE),
            TokenKind::Override => Some(Attributes::OVERRIDE),
            TokenKind::Prototype => Some(Attributes::PROTOTYPE),
            TokenKind::Static => Some(Attributes::STATIC),
            TokenKind::Enumerable => Some(Attributes::ENUMERABLE),
            TokenKind::Readonly => Some(Attributes::READONLY),
            TokenKind::Synchronized => Some(Attributes::SYNCHRONIZED),
            _ => None,
        }
    }
}

/// Variable declaration kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VarKind {
    Var,
    Let,
    Const,
}

impl fmt::Display for VarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VarKind::Var => write!(f, "var"),
            VarKind::Let => write!(f, "let"),
            VarKind::Const => write!(f, "const"),
        }
    }
}

/// Compilation mode selected by `use strict` / `use standard`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Mode {
    #[default]
    Standard,
    Strict,
}

/// Language dialect selected by `use lang`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LangLevel {
    Ecma,
    #[default]
    Plus,
    Fixed,
}
