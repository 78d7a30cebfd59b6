//! Compilation options.

use escript_ast::{LangLevel, Mode};

#[derive(Debug, Clone)]
pub struct CompilerOptions {
    /// Program name used as the diagnostic prefix.
    pub app_name: String,
    pub lang: LangLevel,
    pub mode: Mode,
    /// Warnings below this level are suppressed; zero silences them.
    pub warn_level: i32,
    /// Optimization level handed to later phases; parsing ignores it.
    pub optimize_level: i32,
    /// Directories searched when resolving `use module` references.
    pub module_search_path: Vec<String>,
    /// Tab width for caret alignment in diagnostics.
    pub tab_width: usize,
    /// Modules to open before user code, front of every program block.
    pub preload_modules: Vec<String>,
    /// Skip a leading `#!interpreter` line in source files.
    pub shebang: bool,
    /// Capture `/** */` doc comments onto definitions.
    pub doc: bool,
    /// Allow E4X XML literals.
    pub xml_enabled: bool,
    /// Allow regular expression literals.
    pub regexp_enabled: bool,
    /// Planned output file, checked against the inputs.
    pub out_file: Option<String>,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            app_name: "ec".to_string(),
            lang: LangLevel::default(),
            mode: Mode::default(),
            warn_level: 0,
            optimize_level: 9,
            module_search_path: Vec::new(),
            tab_width: 4,
            preload_modules: Vec::new(),
            shebang: true,
            doc: false,
            xml_enabled: false,
            regexp_enabled: true,
            out_file: None,
        }
    }
}
