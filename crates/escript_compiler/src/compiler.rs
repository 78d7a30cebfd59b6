//! The compilation driver.

use crate::options::CompilerOptions;
use escript_ast::{Node, NodeKind, QName};
use escript_core::{EcError, StringInterner};
use escript_diagnostics::{Diagnostic, Reporter, StderrSink};
use escript_lexer::{ConsoleGets, Lexer, Stream};
use escript_parser::{Parser, State};
use log::info;
use std::path::Path;

/// Outcome of compiling one unit. Syntax errors do not abort the
/// pipeline; they are counted here and the program contains whatever
/// parsed.
#[derive(Debug)]
pub struct CompileResult {
    pub program: Node,
    pub errors: usize,
    pub warnings: usize,
    /// The error cap was reached and parsing was abandoned.
    pub fatal: bool,
    pub diagnostics: Vec<Diagnostic>,
}

pub struct Compiler {
    options: CompilerOptions,
    interner: StringInterner,
    /// Canonicalized paths of files already compiled, for duplicate
    /// detection.
    inputs: Vec<String>,
}

impl Compiler {
    pub fn new(options: CompilerOptions) -> Self {
        Self {
            options,
            interner: StringInterner::new(),
            inputs: Vec::new(),
        }
    }

    pub fn options(&self) -> &CompilerOptions {
        &self.options
    }

    pub fn interner(&self) -> &StringInterner {
        &self.interner
    }

    /// Compile a source file. Each file may be given only once, and the
    /// planned output file must not be among the inputs.
    pub fn compile_file(&mut self, path: &str) -> Result<CompileResult, EcError> {
        let canonical = canonical_path(path);
        if self.inputs.contains(&canonical) {
            return Err(EcError::DuplicateSource(path.to_string()));
        }
        if let Some(out) = &self.options.out_file {
            if canonical_path(out) == canonical {
                return Err(EcError::OutputIsInput(out.clone()));
            }
        }

        let mut stream = Stream::file(path)?;
        if self.options.shebang {
            stream.skip_shebang();
        }
        self.inputs.push(canonical);
        info!("compiling {}", path);
        let result = self.run(stream, false);
        if result.fatal {
            return Err(EcError::TooManyErrors);
        }
        Ok(result)
    }

    /// Compile an in-memory buffer under the given stream name.
    pub fn compile_memory(&mut self, name: &str, text: &str) -> CompileResult {
        self.run(Stream::memory(name, text), false)
    }

    /// Compile console input in one shot: the callback's lines are
    /// drained and compiled as a single unit.
    pub fn compile_command(&mut self, gets: ConsoleGets) -> CompileResult {
        self.run(Stream::console(gets, false), false)
    }

    /// Begin an interactive session. Each call to
    /// [`ConsoleSession::next_chunk`] compiles one line of input.
    pub fn console_session(&mut self, gets: ConsoleGets) -> ConsoleSession {
        let parser = self.build_parser(Stream::console(gets, true), true);
        ConsoleSession {
            parser,
            preload: self.options.preload_modules.clone(),
        }
    }

    fn build_parser(&self, stream: Stream, interactive: bool) -> Parser {
        let mut lexer = Lexer::new(stream);
        lexer.set_doc_enabled(self.options.doc);
        lexer.set_warn_level(self.options.warn_level);
        let reporter = Reporter::new(
            self.options.app_name.clone(),
            self.options.tab_width,
            Box::new(StderrSink),
        );
        let state = State::new(self.options.mode, self.options.lang);
        let mut parser = Parser::new(lexer, self.interner.clone(), reporter, state);
        parser.set_interactive(interactive);
        parser.set_xml_enabled(self.options.xml_enabled);
        parser.set_regexp_enabled(self.options.regexp_enabled);
        parser
    }

    fn run(&mut self, stream: Stream, interactive: bool) -> CompileResult {
        let mut parser = self.build_parser(stream, interactive);
        let mut program = parser.parse(None);
        inject_preloads(&mut program, &self.options.preload_modules, &self.interner);
        finish(&parser, program)
    }
}

/// One interactive console compilation. The parser persists across
/// chunks so pragmas and interned names carry forward.
pub struct ConsoleSession {
    parser: Parser,
    preload: Vec<String>,
}

impl ConsoleSession {
    /// Compile the next line of input. Returns `None` once the console
    /// callback reports end of input.
    pub fn next_chunk(&mut self) -> Option<CompileResult> {
        if self.parser.at_eof() {
            return None;
        }
        self.parser.reset_input();
        let mut program = self.parser.parse(None);
        if self.parser.stream_exhausted() && program_is_empty(&program) {
            return None;
        }
        // Preloads apply once, to the first chunk of the session.
        if !self.preload.is_empty() {
            let preload = std::mem::take(&mut self.preload);
            inject_preloads(&mut program, &preload, self.parser.interner());
        }
        Some(finish(&self.parser, program))
    }
}

fn finish(parser: &Parser, program: Node) -> CompileResult {
    CompileResult {
        program,
        errors: parser.reporter().error_count(),
        warnings: parser.reporter().warning_count(),
        fatal: parser.fatal(),
        diagnostics: parser.reporter().diagnostics().to_vec(),
    }
}

/// Open the configured modules at the front of the program's block, the
/// same shape a written `use module` directive produces.
fn inject_preloads(program: &mut Node, preload: &[String], interner: &StringInterner) {
    if preload.is_empty() {
        return;
    }
    let Some(directives) = program
        .left_mut()
        .and_then(Node::left_mut)
        .and_then(Node::left_mut)
    else {
        return;
    };
    for name in preload.iter().rev() {
        let mut node = Node::new(NodeKind::UseModule);
        node.qname = Some(QName::new(interner.intern(name)));
        directives.prepend(node);
    }
}

fn program_is_empty(program: &Node) -> bool {
    program
        .left()
        .and_then(Node::left)
        .and_then(Node::left)
        .map_or(true, |directives| directives.num_children() == 0)
}

fn canonical_path(path: &str) -> String {
    Path::new(path)
        .canonicalize()
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_else(|_| path.to_string())
}
