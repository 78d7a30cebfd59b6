//! Library error type for the compiler front end.
//!
//! Parse and lex errors are not surfaced through this type. They are
//! recorded as diagnostics and the offending production returns no node.
//! `EcError` covers the hard failures: I/O, oversized input, and the
//! error-count abort.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EcError {
    #[error("cannot open {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{path} is too large ({size} bytes, limit {limit})")]
    SourceTooLarge { path: String, size: u64, limit: u64 },

    #[error("duplicate source file \"{0}\"")]
    DuplicateSource(String),

    #[error("output file \"{0}\" is also an input file")]
    OutputIsInput(String),

    #[error("too many errors, aborting")]
    TooManyErrors,
}
