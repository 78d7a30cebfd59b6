//! Parser lexical state.

use escript_ast::{LangLevel, Mode};
use escript_core::InternedString;

/// Context the parser carries while descending. A production that opens
/// a new lexical context pushes a clone, mutates the copy, and pops on
/// exit, so inner scopes can never corrupt outer state.
#[derive(Debug, Clone, Default)]
pub struct State {
    pub in_function: bool,
    pub in_class: bool,
    pub in_interface: bool,
    /// Suppress the `in` operator while parsing a for-in iterand.
    pub no_in: bool,
    /// Nesting depth of braces within the current directive run. At
    /// depth zero a console NOP token ends the chunk.
    pub block_nest_count: u32,
    /// Name of the enclosing class, for constructor detection.
    pub current_class_name: Option<InternedString>,
    /// Namespace installed by `use default namespace`.
    pub default_namespace: Option<InternedString>,
    pub mode: Mode,
    pub lang: LangLevel,
}

impl State {
    pub fn new(mode: Mode, lang: LangLevel) -> Self {
        Self {
            mode,
            lang,
            ..Self::default()
        }
    }
}
