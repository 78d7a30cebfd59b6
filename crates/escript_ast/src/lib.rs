//! escript_ast: Token kinds, classification flags, and the AST node
//! model for the escript front end.

pub mod node;
pub mod token_kind;
pub mod types;

pub use node::{
    CaseKind, ClassInfo, FieldInfo, FieldKind, FunctionInfo, Node, NodeKind, PragmaKind, QName,
    SourceLoc, ThisKind,
};
pub use token_kind::TokenKind;
pub use types::{Attributes, LangLevel, Mode, TokenGroups, VarKind};
