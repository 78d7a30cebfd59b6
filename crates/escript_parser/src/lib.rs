//! escript_parser: recursive descent parser producing the AST.
//!
//! The parser pulls classified tokens from `escript_lexer`, carries its
//! lexical context on a clone-on-enter state stack, and reports syntax
//! errors with source line and caret through `escript_diagnostics`.
//! Parsing continues after an error by resynchronizing at directive
//! boundaries, up to a fixed error cap.

mod defs;
mod exprs;
mod names;
mod parser;
mod state;
mod stmts;

pub use parser::{Parser, SyntaxError, MAX_ERRORS, MAX_LOOKAHEAD};
pub use state::State;
