//! escript_core: Core utilities for the escript compiler front end.
//!
//! Provides string interning, literal value construction, and the
//! library error type shared by the lexer, parser, and driver.

pub mod error;
pub mod intern;
pub mod value;

pub use error::EcError;
pub use intern::{InternedString, StringInterner};
pub use value::Value;
