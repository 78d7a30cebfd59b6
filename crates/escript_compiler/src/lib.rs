//! escript_compiler: the front-end driver.
//!
//! Owns compilation options, opens input streams, wires the lexer and
//! parser together, and returns the parsed program with its diagnostic
//! counts. File, in-memory, and interactive console compilation all go
//! through the same pipeline.

mod compiler;
mod options;

pub use compiler::{CompileResult, Compiler, ConsoleSession};
pub use options::CompilerOptions;
