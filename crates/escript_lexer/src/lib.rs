//! escript_lexer: Character streams and the tokenizer.
//!
//! `Stream` supplies characters with one-character putback from a file,
//! an in-memory buffer, or an interactive console. `Lexer` turns a
//! stream into classified tokens with a putback list supporting the
//! parser's bounded lookahead.

mod lexer;
mod stream;
mod token;

pub use lexer::Lexer;
pub use stream::{ConsoleGets, Stream, INPUT_STREAM_NAME, MAX_SOURCE_SIZE};
pub use token::Token;
